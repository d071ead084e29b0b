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

//! The telemetry snapshot `VirtualMiner::telemetry()` hands back to a
//! caller. Field names intentionally match what a real device's status
//! endpoint would use (`camelCase` in several places, duplicated fields
//! under two names) so that a caller written against real hardware can't
//! tell the two apart.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    #[serde(rename = "miner_id")]
    pub miner_id: String,
    pub timestamp: i64,
    #[serde(rename = "uptimeSeconds")]
    pub uptime_seconds: u64,
    #[serde(rename = "hashRate")]
    pub hash_rate: f64,
    pub hashrate: f64,
    pub power: f64,
    pub temp: f64,
    #[serde(rename = "vrTemp")]
    pub vr_temp: f64,
    pub fanspeed: f64,
    pub fanrpm: i64,
    pub autofanspeed: u8,
    pub targettemp: f64,
    pub temptarget: f64,
    #[serde(rename = "coreVoltage")]
    pub core_voltage: i64,
    #[serde(rename = "coreVoltageActual")]
    pub core_voltage_actual: f64,
    pub frequency: i64,
    pub voltage: f64,
    #[serde(rename = "nominalVoltage")]
    pub nominal_voltage: i64,
    pub current: f64,
    #[serde(rename = "ASICModel")]
    pub asic_model_upper: String,
    #[serde(rename = "asicModel")]
    pub asic_model: String,
    #[serde(rename = "asicCount")]
    pub asic_count: u32,
    pub model: String,
    #[serde(rename = "errorPercentage")]
    pub error_percentage: f64,
    #[serde(rename = "expectedHashrate")]
    pub expected_hashrate: f64,
    #[serde(rename = "sharesAccepted")]
    pub shares_accepted: u64,
    #[serde(rename = "sharesRejected")]
    pub shares_rejected: u64,
    #[serde(rename = "asicErrors")]
    pub asic_errors: u64,
    #[serde(rename = "bestDiff")]
    pub best_diff: String,
    #[serde(rename = "bestSessionDiff")]
    pub best_session_diff: String,
    #[serde(rename = "stratumURL")]
    pub stratum_url: String,
    #[serde(rename = "stratumPort")]
    pub stratum_port: u16,
    #[serde(rename = "stratumUser")]
    pub stratum_user: String,
    #[serde(rename = "stratumPassword")]
    pub stratum_password: String,
    #[serde(rename = "fallbackStratumURL")]
    pub fallback_stratum_url: String,
    #[serde(rename = "fallbackStratumPort")]
    pub fallback_stratum_port: u16,
    #[serde(rename = "fallbackStratumUser")]
    pub fallback_stratum_user: String,
    #[serde(rename = "fallbackStratumPassword")]
    pub fallback_stratum_password: String,
    #[serde(rename = "isUsingFallback")]
    pub is_using_fallback: bool,
    #[serde(rename = "isUsingFallbackStratum")]
    pub is_using_fallback_stratum: u8,
    #[serde(rename = "poolState")]
    pub pool_state: String,
    #[serde(rename = "lastSubmitMs")]
    pub last_submit_ms: Option<i64>,
    #[serde(rename = "fanSpeed")]
    pub fan_speed: i64,
    #[serde(rename = "fanRpm")]
    pub fan_rpm: i64,
    #[serde(rename = "manualFanSpeed")]
    pub manual_fan_speed: i64,
    #[serde(rename = "minFanSpeed")]
    pub min_fan_speed: u32,
}
