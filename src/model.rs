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

//! Board/ASIC model presets. Each preset is an immutable bundle of the
//! physical constants `VirtualMiner` uses to derive power, thermal and
//! hashrate behavior; nothing here mutates at runtime.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Immutable physical constants for one board/ASIC combination.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPreset {
    pub model_id: &'static str,
    pub display_name: &'static str,
    pub asic_model: &'static str,
    pub asic_count: u32,
    pub small_core_count: u32,
    pub frequency_options_mhz: &'static [u32],
    pub voltage_options_mv: &'static [u32],
    pub stock_voltage_mv: u32,
    pub stock_frequency_mhz: u32,
    pub input_voltage_v: f64,
    pub target_hashrate_ghs: f64,
    pub base_power_w: f64,
    pub base_temp_c: f64,
    pub base_vr_temp_c: f64,
    pub base_fan_pct: u32,
    pub temp_target_c: f64,
    pub fan_rpm_max: u32,
    pub temp_per_watt: f64,
    pub cooling_per_fan_pct: f64,
    pub vr_temp_per_watt: f64,
    pub vr_cooling_per_fan_pct: f64,
    pub voltage_req_exponent: f64,
    pub voltage_deadband_mv: f64,
    pub voltage_margin_soft_mv: f64,
    pub base_error_pct: f64,
    pub base_share_rate_s: f64,
    pub reject_rate: f64,
    pub min_fan_pct: u32,
}

const FREQ_BM1397: &[u32] = &[400, 425, 450, 475, 485, 500, 525, 550, 575, 600];
const FREQ_BM1366: &[u32] = &[400, 425, 450, 475, 485, 500, 525, 550, 575];
const FREQ_BM1368: &[u32] = &[400, 425, 450, 475, 485, 490, 500, 525, 550, 575];
const FREQ_BM1370: &[u32] = &[400, 490, 525, 550, 600, 625];

const V_BM1397: &[u32] = &[1100, 1150, 1200, 1250, 1300, 1350, 1400, 1450, 1500];
const V_BM1366: &[u32] = &[1100, 1150, 1200, 1250, 1300];
const V_BM1368: &[u32] = &[1100, 1150, 1166, 1200, 1250, 1300];
const V_BM1370: &[u32] = &[1000, 1060, 1100, 1150, 1200, 1250];

fn target_hashrate_ghs(freq_mhz: u32, small_core_count: u32, asic_count: u32) -> f64 {
    (freq_mhz as f64) * (small_core_count as f64) * (asic_count as f64) / 1000.0
}

static MODEL_PRESETS: Lazy<HashMap<&'static str, ModelPreset>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert(
        "bm1397_1chip_5v",
        ModelPreset {
            model_id: "bm1397_1chip_5v",
            display_name: "Bitaxe Max (BM1397 x1, 5V)",
            asic_model: "BM1397",
            asic_count: 1,
            small_core_count: 672,
            frequency_options_mhz: FREQ_BM1397,
            voltage_options_mv: V_BM1397,
            stock_voltage_mv: 1400,
            stock_frequency_mhz: 425,
            input_voltage_v: 5.0,
            target_hashrate_ghs: target_hashrate_ghs(425, 672, 1),
            base_power_w: 25.0,
            base_temp_c: 60.0,
            base_vr_temp_c: 58.0,
            base_fan_pct: 50,
            temp_target_c: 60.0,
            fan_rpm_max: 8000,
            temp_per_watt: 0.28,
            cooling_per_fan_pct: 0.06,
            vr_temp_per_watt: 0.22,
            vr_cooling_per_fan_pct: 0.05,
            voltage_req_exponent: 0.35,
            voltage_deadband_mv: 20.0,
            voltage_margin_soft_mv: 90.0,
            base_error_pct: 0.15,
            base_share_rate_s: 0.010,
            reject_rate: 0.003,
            min_fan_pct: 35,
        },
    );

    m.insert(
        "bm1366_1chip_5v",
        ModelPreset {
            model_id: "bm1366_1chip_5v",
            display_name: "Bitaxe Ultra (BM1366 x1, 5V)",
            asic_model: "BM1366",
            asic_count: 1,
            small_core_count: 894,
            frequency_options_mhz: FREQ_BM1366,
            voltage_options_mv: V_BM1366,
            stock_voltage_mv: 1200,
            stock_frequency_mhz: 485,
            input_voltage_v: 5.0,
            target_hashrate_ghs: target_hashrate_ghs(485, 894, 1),
            base_power_w: 25.0,
            base_temp_c: 60.0,
            base_vr_temp_c: 56.0,
            base_fan_pct: 50,
            temp_target_c: 60.0,
            fan_rpm_max: 9000,
            temp_per_watt: 0.30,
            cooling_per_fan_pct: 0.06,
            vr_temp_per_watt: 0.24,
            vr_cooling_per_fan_pct: 0.05,
            voltage_req_exponent: 0.35,
            voltage_deadband_mv: 20.0,
            voltage_margin_soft_mv: 90.0,
            base_error_pct: 0.15,
            base_share_rate_s: 0.010,
            reject_rate: 0.003,
            min_fan_pct: 40,
        },
    );

    m.insert(
        "bm1366_6chip_12v",
        ModelPreset {
            model_id: "bm1366_6chip_12v",
            display_name: "Bitaxe Hex (BM1366 x6, 12V)",
            asic_model: "BM1366",
            asic_count: 6,
            small_core_count: 894,
            frequency_options_mhz: FREQ_BM1366,
            voltage_options_mv: V_BM1366,
            stock_voltage_mv: 1200,
            stock_frequency_mhz: 485,
            input_voltage_v: 12.0,
            target_hashrate_ghs: target_hashrate_ghs(485, 894, 6),
            base_power_w: 90.0,
            base_temp_c: 60.0,
            base_vr_temp_c: 66.0,
            base_fan_pct: 50,
            temp_target_c: 60.0,
            fan_rpm_max: 12000,
            temp_per_watt: 0.28,
            cooling_per_fan_pct: 0.20,
            vr_temp_per_watt: 0.22,
            vr_cooling_per_fan_pct: 0.16,
            voltage_req_exponent: 0.35,
            voltage_deadband_mv: 20.0,
            voltage_margin_soft_mv: 90.0,
            base_error_pct: 0.18,
            base_share_rate_s: 0.080,
            reject_rate: 0.003,
            min_fan_pct: 55,
        },
    );

    m.insert(
        "bm1368_1chip_5v",
        ModelPreset {
            model_id: "bm1368_1chip_5v",
            display_name: "Bitaxe Supra (BM1368 x1, 5V)",
            asic_model: "BM1368",
            asic_count: 1,
            small_core_count: 1276,
            frequency_options_mhz: FREQ_BM1368,
            voltage_options_mv: V_BM1368,
            stock_voltage_mv: 1166,
            stock_frequency_mhz: 490,
            input_voltage_v: 5.0,
            target_hashrate_ghs: target_hashrate_ghs(490, 1276, 1),
            base_power_w: 40.0,
            base_temp_c: 60.0,
            base_vr_temp_c: 58.0,
            base_fan_pct: 50,
            temp_target_c: 60.0,
            fan_rpm_max: 9000,
            temp_per_watt: 0.30,
            cooling_per_fan_pct: 0.06,
            vr_temp_per_watt: 0.24,
            vr_cooling_per_fan_pct: 0.05,
            voltage_req_exponent: 0.35,
            voltage_deadband_mv: 20.0,
            voltage_margin_soft_mv: 90.0,
            base_error_pct: 0.15,
            base_share_rate_s: 0.014,
            reject_rate: 0.003,
            min_fan_pct: 35,
        },
    );

    m.insert(
        "bm1368_6chip_12v",
        ModelPreset {
            model_id: "bm1368_6chip_12v",
            display_name: "Bitaxe SupraHex (BM1368 x6, 12V)",
            asic_model: "BM1368",
            asic_count: 6,
            small_core_count: 1276,
            frequency_options_mhz: FREQ_BM1368,
            voltage_options_mv: V_BM1368,
            stock_voltage_mv: 1166,
            stock_frequency_mhz: 490,
            input_voltage_v: 12.0,
            target_hashrate_ghs: target_hashrate_ghs(490, 1276, 6),
            base_power_w: 120.0,
            base_temp_c: 60.0,
            base_vr_temp_c: 70.0,
            base_fan_pct: 50,
            temp_target_c: 60.0,
            fan_rpm_max: 14000,
            temp_per_watt: 0.28,
            cooling_per_fan_pct: 0.22,
            vr_temp_per_watt: 0.22,
            vr_cooling_per_fan_pct: 0.18,
            voltage_req_exponent: 0.35,
            voltage_deadband_mv: 20.0,
            voltage_margin_soft_mv: 90.0,
            base_error_pct: 0.18,
            base_share_rate_s: 0.090,
            reject_rate: 0.003,
            min_fan_pct: 50,
        },
    );

    m.insert(
        "bm1370_1chip_5v",
        ModelPreset {
            model_id: "bm1370_1chip_5v",
            display_name: "Bitaxe Gamma (BM1370 x1, 5V)",
            asic_model: "BM1370",
            asic_count: 1,
            small_core_count: 2040,
            frequency_options_mhz: FREQ_BM1370,
            voltage_options_mv: V_BM1370,
            stock_voltage_mv: 1175,
            stock_frequency_mhz: 600,
            input_voltage_v: 5.0,
            target_hashrate_ghs: target_hashrate_ghs(600, 2040, 1),
            base_power_w: 20.0,
            base_temp_c: 60.0,
            base_vr_temp_c: 61.0,
            base_fan_pct: 50,
            temp_target_c: 60.0,
            fan_rpm_max: 15500,
            temp_per_watt: 0.35,
            cooling_per_fan_pct: 0.12,
            vr_temp_per_watt: 0.28,
            vr_cooling_per_fan_pct: 0.10,
            voltage_req_exponent: 0.30,
            voltage_deadband_mv: 15.0,
            voltage_margin_soft_mv: 80.0,
            base_error_pct: 0.10,
            base_share_rate_s: 0.024,
            reject_rate: 0.0015,
            min_fan_pct: 15,
        },
    );

    m.insert(
        "bm1370_2chip",
        ModelPreset {
            model_id: "bm1370_2chip",
            display_name: "Bitaxe Gamma Turbo (BM1370 x2, 12V)",
            asic_model: "BM1370",
            asic_count: 2,
            small_core_count: 2040,
            frequency_options_mhz: FREQ_BM1370,
            voltage_options_mv: V_BM1370,
            stock_voltage_mv: 1175,
            stock_frequency_mhz: 600,
            input_voltage_v: 12.0,
            target_hashrate_ghs: target_hashrate_ghs(600, 2040, 2),
            base_power_w: 60.0,
            base_temp_c: 60.0,
            base_vr_temp_c: 66.0,
            base_fan_pct: 50,
            temp_target_c: 60.0,
            fan_rpm_max: 12000,
            temp_per_watt: 0.30,
            cooling_per_fan_pct: 0.18,
            vr_temp_per_watt: 0.24,
            vr_cooling_per_fan_pct: 0.14,
            voltage_req_exponent: 0.30,
            voltage_deadband_mv: 15.0,
            voltage_margin_soft_mv: 80.0,
            base_error_pct: 0.12,
            base_share_rate_s: 0.050,
            reject_rate: 0.002,
            min_fan_pct: 35,
        },
    );

    m.insert(
        "bm1366_4chip",
        ModelPreset {
            model_id: "bm1366_4chip",
            display_name: "QAxe (BM1366 x4, 12V)",
            asic_model: "BM1366",
            asic_count: 4,
            small_core_count: 894,
            frequency_options_mhz: FREQ_BM1366,
            voltage_options_mv: V_BM1366,
            stock_voltage_mv: 1200,
            stock_frequency_mhz: 485,
            input_voltage_v: 12.0,
            target_hashrate_ghs: target_hashrate_ghs(485, 894, 4),
            base_power_w: 70.0,
            base_temp_c: 60.0,
            base_vr_temp_c: 66.0,
            base_fan_pct: 50,
            temp_target_c: 60.0,
            fan_rpm_max: 12000,
            temp_per_watt: 0.28,
            cooling_per_fan_pct: 0.18,
            vr_temp_per_watt: 0.22,
            vr_cooling_per_fan_pct: 0.14,
            voltage_req_exponent: 0.35,
            voltage_deadband_mv: 20.0,
            voltage_margin_soft_mv: 90.0,
            base_error_pct: 0.18,
            base_share_rate_s: 0.060,
            reject_rate: 0.003,
            min_fan_pct: 45,
        },
    );

    m.insert(
        "bm1368_4chip",
        ModelPreset {
            model_id: "bm1368_4chip",
            display_name: "QAxe+ / NerdQAxe+ (BM1368 x4, 12V)",
            asic_model: "BM1368",
            asic_count: 4,
            small_core_count: 1276,
            frequency_options_mhz: FREQ_BM1368,
            voltage_options_mv: V_BM1368,
            stock_voltage_mv: 1166,
            stock_frequency_mhz: 490,
            input_voltage_v: 12.0,
            target_hashrate_ghs: target_hashrate_ghs(490, 1276, 4),
            base_power_w: 55.0,
            base_temp_c: 60.0,
            base_vr_temp_c: 70.0,
            base_fan_pct: 50,
            temp_target_c: 60.0,
            fan_rpm_max: 14000,
            temp_per_watt: 0.28,
            cooling_per_fan_pct: 0.18,
            vr_temp_per_watt: 0.22,
            vr_cooling_per_fan_pct: 0.14,
            voltage_req_exponent: 0.35,
            voltage_deadband_mv: 20.0,
            voltage_margin_soft_mv: 90.0,
            base_error_pct: 0.18,
            base_share_rate_s: 0.070,
            reject_rate: 0.003,
            min_fan_pct: 45,
        },
    );

    m.insert(
        "bm1368_8chip",
        ModelPreset {
            model_id: "bm1368_8chip",
            display_name: "NerdOCTAXE+ (BM1368 x8, 12V)",
            asic_model: "BM1368",
            asic_count: 8,
            small_core_count: 1276,
            frequency_options_mhz: FREQ_BM1368,
            voltage_options_mv: V_BM1368,
            stock_voltage_mv: 1166,
            stock_frequency_mhz: 490,
            input_voltage_v: 12.0,
            target_hashrate_ghs: target_hashrate_ghs(490, 1276, 8),
            base_power_w: 100.0,
            base_temp_c: 60.0,
            base_vr_temp_c: 74.0,
            base_fan_pct: 50,
            temp_target_c: 60.0,
            fan_rpm_max: 16000,
            temp_per_watt: 0.26,
            cooling_per_fan_pct: 0.24,
            vr_temp_per_watt: 0.20,
            vr_cooling_per_fan_pct: 0.20,
            voltage_req_exponent: 0.35,
            voltage_deadband_mv: 20.0,
            voltage_margin_soft_mv: 90.0,
            base_error_pct: 0.18,
            base_share_rate_s: 0.140,
            reject_rate: 0.003,
            min_fan_pct: 50,
        },
    );

    m.insert(
        "bm1370_4chip",
        ModelPreset {
            model_id: "bm1370_4chip",
            display_name: "NerdQAxe++ (BM1370 x4, 12V)",
            asic_model: "BM1370",
            asic_count: 4,
            small_core_count: 2040,
            frequency_options_mhz: FREQ_BM1370,
            voltage_options_mv: V_BM1370,
            stock_voltage_mv: 1175,
            stock_frequency_mhz: 600,
            input_voltage_v: 12.0,
            target_hashrate_ghs: target_hashrate_ghs(600, 2040, 4),
            base_power_w: 76.0,
            base_temp_c: 60.0,
            base_vr_temp_c: 70.0,
            base_fan_pct: 50,
            temp_target_c: 60.0,
            fan_rpm_max: 16000,
            temp_per_watt: 0.28,
            cooling_per_fan_pct: 0.22,
            vr_temp_per_watt: 0.22,
            vr_cooling_per_fan_pct: 0.18,
            voltage_req_exponent: 0.30,
            voltage_deadband_mv: 15.0,
            voltage_margin_soft_mv: 80.0,
            base_error_pct: 0.14,
            base_share_rate_s: 0.120,
            reject_rate: 0.0025,
            min_fan_pct: 45,
        },
    );

    m.insert(
        "bm1370_8chip",
        ModelPreset {
            model_id: "bm1370_8chip",
            display_name: "NerdOCTAXE-Gamma (BM1370 x8, 12V)",
            asic_model: "BM1370",
            asic_count: 8,
            small_core_count: 2040,
            frequency_options_mhz: FREQ_BM1370,
            voltage_options_mv: V_BM1370,
            stock_voltage_mv: 1175,
            stock_frequency_mhz: 600,
            input_voltage_v: 12.0,
            target_hashrate_ghs: target_hashrate_ghs(600, 2040, 8),
            base_power_w: 155.0,
            base_temp_c: 60.0,
            base_vr_temp_c: 74.0,
            base_fan_pct: 50,
            temp_target_c: 60.0,
            fan_rpm_max: 18000,
            temp_per_watt: 0.26,
            cooling_per_fan_pct: 0.30,
            vr_temp_per_watt: 0.20,
            vr_cooling_per_fan_pct: 0.24,
            voltage_req_exponent: 0.30,
            voltage_deadband_mv: 15.0,
            voltage_margin_soft_mv: 80.0,
            base_error_pct: 0.14,
            base_share_rate_s: 0.220,
            reject_rate: 0.0025,
            min_fan_pct: 50,
        },
    );

    m
});

pub const DEFAULT_MODEL_ID: &str = "bm1370_4chip";

/// Look up a model preset by id, falling back to [`DEFAULT_MODEL_ID`] for
/// an unknown id rather than failing — a fleet given a typo'd or
/// future/unrecognized model id should still come up running.
pub fn get_model(model_id: &str) -> &'static ModelPreset {
    MODEL_PRESETS
        .get(model_id)
        .unwrap_or_else(|| &MODEL_PRESETS[DEFAULT_MODEL_ID])
}

/// All known model ids, for enumeration/validation callers.
pub fn model_ids() -> impl Iterator<Item = &'static str> {
    MODEL_PRESETS.keys().copied()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unknown_model_falls_back_to_default() {
        let fallback = get_model("does-not-exist");
        assert_eq!(fallback.model_id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn test_known_model_roundtrips() {
        let m = get_model("bm1397_1chip_5v");
        assert_eq!(m.asic_model, "BM1397");
        assert_eq!(m.asic_count, 1);
        assert_eq!(m.fan_rpm_max, 8000);
    }

    #[test]
    fn test_all_presets_have_nonempty_option_sets() {
        for id in model_ids() {
            let m = get_model(id);
            assert!(!m.frequency_options_mhz.is_empty());
            assert!(!m.voltage_options_mv.is_empty());
        }
    }
}
