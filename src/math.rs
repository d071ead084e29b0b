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

//! Small numeric helpers shared by the fan controller and the miner's
//! physics pipeline: clamping, first-order lag ("approach"), slew-rate
//! limiting, and the Poisson/voltage-requirement formulas the tick
//! pipeline draws on.

use rand::Rng;

/// Clamp `value` into `[lo, hi]`.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Move `current` toward `target` along an exponential (first-order lag)
/// curve with time constant `tau` seconds. `tau <= 0.0` snaps straight to
/// `target`, matching an actuator with no thermal/electrical inertia.
pub fn approach(current: f64, target: f64, dt: f64, tau: f64) -> f64 {
    if tau <= 0.0 {
        return target;
    }
    let alpha = 1.0 - (-dt.max(0.0) / tau).exp();
    current + (target - current) * alpha
}

/// Move `current` toward `target` at no more than `max_delta_per_s * dt`
/// per call, in either direction.
pub fn rate_limit(current: f64, target: f64, dt: f64, max_delta_per_s: f64) -> f64 {
    if dt <= 0.0 {
        return current;
    }
    let max_delta = max_delta_per_s.abs() * dt;
    let delta = clamp(target - current, -max_delta, max_delta);
    current + delta
}

/// Sample a Poisson-distributed count with mean `lam` via Knuth's
/// multiplicative algorithm. Adequate for the small means (well under
/// a few hundred events per tick) this simulator ever draws.
pub fn poisson(rng: &mut impl Rng, lam: f64) -> u64 {
    if lam <= 0.0 {
        return 0;
    }
    let l = (-lam).exp();
    let mut k = 0u64;
    let mut p = 1.0;
    loop {
        k += 1;
        p *= rng.gen::<f64>();
        if p <= l {
            break;
        }
    }
    k - 1
}

/// Core voltage (mV) a chip nominally requires to sustain `freq_mhz`,
/// scaled from the board's stock frequency/voltage pair by `exponent`
/// (modeling the super-linear voltage/frequency curve real silicon
/// follows).
pub fn required_core_voltage_mv(
    stock_mv: f64,
    stock_mhz: f64,
    freq_mhz: f64,
    exponent: f64,
) -> f64 {
    if stock_mhz <= 0.0 {
        return stock_mv;
    }
    let ratio = (freq_mhz / stock_mhz).max(0.1);
    stock_mv * ratio.powf(exponent)
}

/// How far `actual_mv` falls short of `required_mv`, normalized to
/// `[0, 1)` by an exponential curve: no penalty within `deadband_mv`,
/// approaching 1.0 as the deficit grows past `soft_mv`.
pub fn undervolt_severity(required_mv: f64, actual_mv: f64, soft_mv: f64, deadband_mv: f64) -> f64 {
    let deficit = (required_mv - actual_mv - deadband_mv.max(0.0)).max(0.0);
    if soft_mv <= 0.0 {
        return if deficit > 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - (-deficit / soft_mv).exp()
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn test_approach_reaches_target_over_time() {
        let mut value = 0.0;
        for _ in 0..10_000 {
            value = approach(value, 100.0, 0.1, 5.0);
        }
        assert_relative_eq!(value, 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_approach_zero_tau_snaps() {
        assert_eq!(approach(0.0, 42.0, 1.0, 0.0), 42.0);
    }

    #[test]
    fn test_rate_limit_caps_delta() {
        assert_eq!(rate_limit(0.0, 100.0, 1.0, 10.0), 10.0);
        assert_eq!(rate_limit(0.0, 100.0, 0.5, 10.0), 5.0);
        assert_eq!(rate_limit(0.0, -100.0, 1.0, 10.0), -10.0);
    }

    #[test]
    fn test_poisson_zero_lambda() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(poisson(&mut rng, 0.0), 0);
    }

    #[test]
    fn test_poisson_mean_is_reasonable() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let total: u64 = (0..n).map(|_| poisson(&mut rng, 3.0)).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 3.0).abs() < 0.1, "mean was {}", mean);
    }

    #[test]
    fn test_undervolt_severity_within_deadband_is_zero() {
        assert_eq!(undervolt_severity(1200.0, 1195.0, 100.0, 10.0), 0.0);
    }

    #[test]
    fn test_undervolt_severity_saturates_near_one() {
        let sev = undervolt_severity(1200.0, 900.0, 50.0, 10.0);
        assert!(sev > 0.999 && sev < 1.0, "severity was {}", sev);
    }

    #[test]
    fn test_undervolt_severity_zero_soft_mv_is_step() {
        assert_eq!(undervolt_severity(1200.0, 1195.0, 0.0, 0.0), 1.0);
        assert_eq!(undervolt_severity(1200.0, 1200.0, 0.0, 0.0), 0.0);
    }
}
