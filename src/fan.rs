// Copyright (C) 2019  Braiins Systems s.r.o.
//
// This file is part of Braiins Open-Source Initiative (BOSI).
//
// BOSI is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//
// Please, keep in mind that we may also license BOSI or any part thereof
// under a proprietary license. For more information on the terms and conditions
// of such proprietary license or if you have any other questions, please
// contact us at opensource@braiins.com.

//! Auto-fan control: a feed-forward term (solved from the board's
//! calibrated steady-state thermal model) plus a PI trim with
//! anti-windup, driving a rate-limited fan actuator.

use crate::math::{approach, clamp, rate_limit};

const KP: f64 = 0.9;
const KI: f64 = 0.06;
const INTEGRATOR_LIMIT: f64 = 50.0;
const INTEGRATOR_DECAY_TAU_S: f64 = 18.0;
const ACTUATOR_MAX_DELTA_PCT_PER_S: f64 = 18.0;
const ACTUATOR_TAU_S: f64 = 2.2;

/// Steady-state-model inputs needed to compute this tick's feed-forward
/// fan duty, kept separate from the controller's own state.
pub struct ControlInputs {
    pub base_fan_pct: f64,
    pub cooling_per_fan_pct: f64,
    pub base_temp_c: f64,
    pub base_power_w: f64,
    pub scenario_temp_offset_c: f64,
    pub scenario_power_multiplier: f64,
    pub temp_per_watt: f64,
    pub power_w: f64,
    pub chip_temp_c: f64,
    pub target_temp_c: f64,
    pub min_fan_pct: f64,
}

/// PI trim state for the auto-fan controller. One instance per miner,
/// carried across ticks; `manual` mode (autofanspeed off) bypasses it
/// entirely and just clamps the caller-set duty.
#[derive(Debug, Clone, Copy, Default)]
pub struct Controller {
    integrator: f64,
}

impl Controller {
    pub fn new() -> Self {
        Self { integrator: 0.0 }
    }

    /// Advance the controller by `dt` seconds and return the next fan
    /// duty (already rate-limited and clamped to `[min_fan_pct, 100]`).
    pub fn update(&mut self, inputs: &ControlInputs, current_duty_pct: f64, dt: f64) -> f64 {
        let cooling = inputs.cooling_per_fan_pct.max(0.01);
        let base_temp = inputs.base_temp_c + inputs.scenario_temp_offset_c;
        let base_power = inputs.base_power_w * inputs.scenario_power_multiplier;
        let chip_no_fan = base_temp + (inputs.power_w - base_power) * inputs.temp_per_watt;
        let feed_forward = inputs.base_fan_pct + (chip_no_fan - inputs.target_temp_c) / cooling;

        let err = inputs.chip_temp_c - inputs.target_temp_c;
        let at_min = current_duty_pct <= inputs.min_fan_pct + 1e-6;
        let at_max = current_duty_pct >= 100.0 - 1e-6;
        let integrate = !((at_max && err > 0.0) || (at_min && err < 0.0));

        if integrate {
            self.integrator = clamp(
                self.integrator + err * dt,
                -INTEGRATOR_LIMIT,
                INTEGRATOR_LIMIT,
            );
        } else {
            self.integrator = approach(self.integrator, 0.0, dt, INTEGRATOR_DECAY_TAU_S);
        }

        let desired = clamp(
            feed_forward + KP * err + KI * self.integrator,
            inputs.min_fan_pct,
            100.0,
        );

        let duty = rate_limit(current_duty_pct, desired, dt, ACTUATOR_MAX_DELTA_PCT_PER_S);
        let duty = approach(duty, desired, dt, ACTUATOR_TAU_S);
        clamp(duty, inputs.min_fan_pct, 100.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn inputs(chip_temp_c: f64, target_temp_c: f64) -> ControlInputs {
        ControlInputs {
            base_fan_pct: 50.0,
            cooling_per_fan_pct: 0.22,
            base_temp_c: 60.0,
            base_power_w: 76.0,
            scenario_temp_offset_c: 0.0,
            scenario_power_multiplier: 1.0,
            temp_per_watt: 0.28,
            power_w: 76.0,
            chip_temp_c,
            target_temp_c,
            min_fan_pct: 45.0,
        }
    }

    #[test]
    fn test_overtemp_drives_fan_up() {
        let mut ctrl = Controller::new();
        let duty = ctrl.update(&inputs(70.0, 60.0), 50.0, 1.0);
        assert!(duty > 50.0, "duty was {}", duty);
    }

    #[test]
    fn test_clamped_to_min_fan() {
        let mut ctrl = Controller::new();
        let duty = ctrl.update(&inputs(40.0, 60.0), 45.0, 1.0);
        assert!(duty >= 45.0, "duty was {}", duty);
    }

    #[test]
    fn test_actuator_does_not_jump_instantly() {
        let mut ctrl = Controller::new();
        let duty = ctrl.update(&inputs(90.0, 60.0), 45.0, 0.1);
        // one 0.1s tick under an 18%/s slew limit and a 2.2s lag can't reach 100%
        assert!(duty < 100.0);
        assert!(duty > 45.0);
    }

    #[test]
    fn test_converges_near_target_duty_over_many_ticks() {
        let mut ctrl = Controller::new();
        let mut duty = 50.0;
        let mut chip_temp = 70.0;
        for _ in 0..2000 {
            let i = inputs(chip_temp, 60.0);
            duty = ctrl.update(&i, duty, 0.25);
            // crude thermal feedback: more fan cools the chip a bit
            chip_temp = approach(chip_temp, 60.0 + (duty - 50.0) * -0.02, 0.25, 10.0);
        }
        assert!((chip_temp - 60.0).abs() < 2.0, "chip_temp settled at {}", chip_temp);
    }
}
