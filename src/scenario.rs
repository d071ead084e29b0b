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

//! Scenario presets perturb a [`crate::model::ModelPreset`] to emulate a
//! fault condition (overheating board, flaky pool, degraded hashrate)
//! without having to define a whole new board model.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A perturbation profile layered on top of a model's baseline physics.
/// Fields left at `None` defer entirely to the model preset.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioPreset {
    pub scenario_id: &'static str,
    pub hashrate_multiplier: f64,
    pub power_multiplier: f64,
    pub temp_offset_c: f64,
    pub vr_temp_offset_c: f64,
    pub base_error_pct: Option<f64>,
    pub reject_rate: Option<f64>,
    pub min_fan_pct: Option<u32>,
    pub force_fallback: bool,
}

impl ScenarioPreset {
    const fn healthy(scenario_id: &'static str) -> Self {
        Self {
            scenario_id,
            hashrate_multiplier: 1.0,
            power_multiplier: 1.0,
            temp_offset_c: 0.0,
            vr_temp_offset_c: 0.0,
            base_error_pct: None,
            reject_rate: None,
            min_fan_pct: None,
            force_fallback: false,
        }
    }
}

static SCENARIOS: Lazy<HashMap<&'static str, ScenarioPreset>> = Lazy::new(|| {
    let mut s = HashMap::new();

    s.insert("healthy", ScenarioPreset::healthy("healthy"));

    s.insert(
        "low_hashrate",
        ScenarioPreset {
            hashrate_multiplier: 0.55,
            base_error_pct: Some(0.35),
            reject_rate: Some(0.008),
            min_fan_pct: Some(62),
            ..ScenarioPreset::healthy("low_hashrate")
        },
    );

    s.insert(
        "overheat",
        ScenarioPreset {
            hashrate_multiplier: 0.8,
            power_multiplier: 1.15,
            temp_offset_c: 20.0,
            vr_temp_offset_c: 20.0,
            base_error_pct: Some(0.9),
            reject_rate: Some(0.02),
            min_fan_pct: Some(92),
            ..ScenarioPreset::healthy("overheat")
        },
    );

    s.insert(
        "pool_down",
        ScenarioPreset {
            hashrate_multiplier: 0.3,
            base_error_pct: Some(0.5),
            reject_rate: Some(0.0),
            force_fallback: true,
            min_fan_pct: Some(60),
            ..ScenarioPreset::healthy("pool_down")
        },
    );

    s
});

pub const DEFAULT_SCENARIO_ID: &str = "healthy";

/// Look up a scenario preset by id, falling back to the healthy profile
/// for an unknown id — same "don't fail fleet startup over a typo"
/// reasoning as [`crate::model::get_model`].
pub fn get_scenario(scenario_id: &str) -> &'static ScenarioPreset {
    SCENARIOS
        .get(scenario_id)
        .unwrap_or_else(|| &SCENARIOS[DEFAULT_SCENARIO_ID])
}

pub fn scenario_ids() -> impl Iterator<Item = &'static str> {
    SCENARIOS.keys().copied()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_healthy_scenario_has_no_overrides() {
        let s = get_scenario("healthy");
        assert_eq!(s.hashrate_multiplier, 1.0);
        assert!(s.base_error_pct.is_none());
        assert!(!s.force_fallback);
    }

    #[test]
    fn test_pool_down_forces_fallback() {
        let s = get_scenario("pool_down");
        assert!(s.force_fallback);
        assert_eq!(s.reject_rate, Some(0.0));
    }

    #[test]
    fn test_unknown_scenario_falls_back_to_healthy() {
        let s = get_scenario("not-a-real-scenario");
        assert_eq!(s.scenario_id, DEFAULT_SCENARIO_ID);
    }
}
