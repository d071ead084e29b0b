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

//! `VirtualMiner`: the stateful physical/operational simulator for one
//! emulated board. All mutable state lives behind a single internal lock
//! so that `tick`, `apply_config`, `restart` and `telemetry` are each
//! linearizable with respect to one another, with no cross-miner
//! ordering guarantee (see [`crate::fleet::MinerFleet`]).

use std::sync::Mutex;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::Result;
use crate::fan;
use crate::math::{approach, clamp, poisson, required_core_voltage_mv, undervolt_severity};
use crate::model::ModelPreset;
use crate::patch::{self, Patch};
use crate::pool::{self, PoolConfig, PoolState};
use crate::rng;
use crate::scenario::ScenarioPreset;
use crate::telemetry::Telemetry;

const AMBIENT_C: f64 = 24.0;
const MIN_BEST_SESSION_DIFF: u64 = 50_000;
const MAX_BEST_SESSION_DIFF: u64 = 250_000;
const MIN_BEST_DIFF: u64 = 5_000_000;
const MAX_BEST_DIFF: u64 = 20_000_000;

fn now_epoch_s() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

struct State {
    core_voltage_mv: i64,
    frequency_mhz: i64,
    core_voltage_actual_mv: f64,
    input_voltage_mv: f64,
    hashrate_ghs: f64,
    hashrate_reported_ghs: f64,
    hashrate_noise: f64,
    power_w: f64,
    chip_temp_c: f64,
    vr_temp_c: f64,
    fan_mode_auto: bool,
    fan_duty_pct: f64,
    fan_rpm: i64,
    target_temp_c: f64,
    pool_primary: PoolConfig,
    pool_fallback: PoolConfig,
    using_fallback: bool,
    pool_state: PoolState,
    pool_state_since: f64,
    pool_last_submit_ms: Option<i64>,
    shares_accepted: u64,
    shares_rejected: u64,
    asic_errors: u64,
    best_diff: u64,
    best_session_diff: u64,
    start_time: f64,
    last_sim_time: Instant,
    last_config_change: f64,
    dynamic_error_pct: f64,
    freq_transition: Option<(f64, f64)>,
    fan_ctrl: fan::Controller,
    rng: StdRng,
}

/// A simulated ASIC miner: one board/ASIC model, under one scenario
/// perturbation, with its own lock-protected mutable state.
pub struct VirtualMiner {
    pub miner_id: String,
    model: &'static ModelPreset,
    scenario: &'static ScenarioPreset,
    warmup_s: f64,
    config_ramp_s: f64,
    state: Mutex<State>,
}

impl VirtualMiner {
    pub fn new(
        miner_id: impl Into<String>,
        model: &'static ModelPreset,
        scenario: &'static ScenarioPreset,
        warmup_s: f64,
        config_ramp_s: f64,
    ) -> Self {
        let miner_id = miner_id.into();
        let mut miner_rng = rng::miner_rng(&miner_id);

        let start_time = now_epoch_s();
        let base_error_pct = scenario.base_error_pct.unwrap_or(model.base_error_pct);

        let mut base_fan = model.base_fan_pct as f64;
        if let Some(min_fan) = scenario.min_fan_pct {
            base_fan = base_fan.max(min_fan as f64);
        }
        let fan_duty_pct = clamp(base_fan, model.min_fan_pct as f64, 100.0);
        let fan_rpm = (model.fan_rpm_max as f64 * (fan_duty_pct / 100.0)).round() as i64;

        let best_diff = miner_rng.gen_range(MIN_BEST_DIFF..=MAX_BEST_DIFF);
        let best_session_diff = miner_rng.gen_range(MIN_BEST_SESSION_DIFF..=MAX_BEST_SESSION_DIFF);

        let state = State {
            core_voltage_mv: model.stock_voltage_mv as i64,
            frequency_mhz: model.stock_frequency_mhz as i64,
            core_voltage_actual_mv: model.stock_voltage_mv as f64,
            input_voltage_mv: model.input_voltage_v * 1000.0,
            hashrate_ghs: 0.0,
            hashrate_reported_ghs: 0.0,
            hashrate_noise: 0.0,
            power_w: model.base_power_w,
            chip_temp_c: model.base_temp_c,
            vr_temp_c: model.base_vr_temp_c,
            fan_mode_auto: true,
            fan_duty_pct,
            fan_rpm,
            target_temp_c: model.temp_target_c,
            pool_primary: PoolConfig::primary_default(),
            pool_fallback: PoolConfig::fallback_default(),
            using_fallback: scenario.force_fallback,
            pool_state: PoolState::Alive,
            pool_state_since: start_time,
            pool_last_submit_ms: None,
            shares_accepted: 0,
            shares_rejected: 0,
            asic_errors: 0,
            best_diff,
            best_session_diff,
            start_time,
            last_sim_time: Instant::now(),
            last_config_change: start_time,
            dynamic_error_pct: base_error_pct,
            freq_transition: None,
            fan_ctrl: fan::Controller::new(),
            rng: miner_rng,
        };

        Self {
            miner_id,
            model,
            scenario,
            warmup_s,
            config_ramp_s,
            state: Mutex::new(state),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        let state = self.state.lock().unwrap();
        (now_epoch_s() - state.start_time).max(0.0) as u64
    }

    /// Reset runtime counters and force a pool reconnect. Setpoints
    /// (frequency, voltage, fan mode, target temp, pool identities) are
    /// preserved -- a restart is a power cycle, not a factory reset.
    pub fn restart(&self) {
        let mut s = self.state.lock().unwrap();
        let now = now_epoch_s();
        s.start_time = now;
        s.last_sim_time = Instant::now();
        s.last_config_change = now;
        s.shares_accepted = 0;
        s.shares_rejected = 0;
        s.asic_errors = 0;
        s.best_session_diff = s.rng.gen_range(MIN_BEST_SESSION_DIFF..=MAX_BEST_SESSION_DIFF);
        s.hashrate_ghs = 0.0;
        s.hashrate_reported_ghs = 0.0;
        s.hashrate_noise = 0.0;
        s.pool_state = PoolState::Connecting;
        s.pool_state_since = now;
        s.pool_last_submit_ms = None;
    }

    fn expected_hashrate(&self, frequency_mhz: i64) -> f64 {
        (frequency_mhz as f64) * (self.model.small_core_count as f64) * (self.model.asic_count as f64)
            / 1000.0
            * self.scenario.hashrate_multiplier
    }

    /// Apply a caller-supplied config patch. Returns the subset of keys
    /// that actually changed something, in the same shape they were
    /// given (this is the contract `apply_config` promises its callers).
    pub fn apply_config(&self, patch: &Patch) -> Result<Patch> {
        let mut s = self.state.lock().unwrap();
        let mut applied = Patch::new();

        let old_expected = self.expected_hashrate(s.frequency_mhz);

        let mut voltage_changed = false;
        let mut frequency_changed = false;

        if let Some(v) = patch.get("coreVoltage") {
            let next_v = patch::as_i64("coreVoltage", v)?;
            if next_v != s.core_voltage_mv {
                s.core_voltage_mv = next_v;
                applied.insert("coreVoltage".to_string(), (next_v).into());
                voltage_changed = true;
            }
        }
        if let Some(v) = patch.get("frequency") {
            let next_f = patch::as_i64("frequency", v)?;
            if next_f != s.frequency_mhz {
                s.frequency_mhz = next_f;
                applied.insert("frequency".to_string(), (next_f).into());
                frequency_changed = true;
            }
        }
        if let Some(v) = patch.get("autofanspeed") {
            let next_auto = patch::as_i64("autofanspeed", v)? == 1;
            if next_auto != s.fan_mode_auto {
                s.fan_mode_auto = next_auto;
                applied.insert(
                    "autofanspeed".to_string(),
                    (if s.fan_mode_auto { 1 } else { 0 }).into(),
                );
            }
        }
        if let Some(v) = patch.get("fanspeed") {
            let next_fan = clamp(patch::as_f64("fanspeed", v)?, 0.0, 100.0).round() as i64;
            if next_fan != s.fan_duty_pct.round() as i64 {
                s.fan_duty_pct = next_fan as f64;
                applied.insert("fanspeed".to_string(), next_fan.into());
            }
        }
        if let Some(v) = patch.get("targettemp") {
            let next_t = patch::as_f64("targettemp", v)?;
            if (next_t - s.target_temp_c).abs() > 1e-9 {
                s.target_temp_c = next_t;
                applied.insert("targettemp".to_string(), next_t.into());
            }
        } else if let Some(v) = patch.get("temptarget") {
            let next_t = patch::as_f64("temptarget", v)?;
            if (next_t - s.target_temp_c).abs() > 1e-9 {
                s.target_temp_c = next_t;
                applied.insert("temptarget".to_string(), next_t.into());
            }
        }

        if let Some(v) = patch.get("stratumURL") {
            s.pool_primary.url = patch::as_string("stratumURL", v)?;
            applied.insert("stratumURL".to_string(), v.clone());
        }
        if let Some(v) = patch.get("stratumPort") {
            s.pool_primary.port = patch::as_port("stratumPort", v)?;
            applied.insert("stratumPort".to_string(), v.clone());
        }
        if let Some(v) = patch.get("stratumUser") {
            s.pool_primary.user = patch::as_string("stratumUser", v)?;
            applied.insert("stratumUser".to_string(), v.clone());
        }
        if let Some(v) = patch.get("stratumPassword") {
            s.pool_primary.password = patch::as_string("stratumPassword", v)?;
            applied.insert("stratumPassword".to_string(), v.clone());
        }
        if let Some(v) = patch.get("fallbackStratumURL") {
            s.pool_fallback.url = patch::as_string("fallbackStratumURL", v)?;
            applied.insert("fallbackStratumURL".to_string(), v.clone());
        }
        if let Some(v) = patch.get("fallbackStratumPort") {
            s.pool_fallback.port = patch::as_port("fallbackStratumPort", v)?;
            applied.insert("fallbackStratumPort".to_string(), v.clone());
        }
        if let Some(v) = patch.get("fallbackStratumUser") {
            s.pool_fallback.user = patch::as_string("fallbackStratumUser", v)?;
            applied.insert("fallbackStratumUser".to_string(), v.clone());
        }
        if let Some(v) = patch.get("fallbackStratumPassword") {
            s.pool_fallback.password = patch::as_string("fallbackStratumPassword", v)?;
            applied.insert("fallbackStratumPassword".to_string(), v.clone());
        }

        let now = now_epoch_s();
        if frequency_changed {
            let new_expected = self.expected_hashrate(s.frequency_mhz);
            s.freq_transition = Some((old_expected, new_expected));
            s.last_config_change = now;
        } else if voltage_changed {
            s.last_config_change = now;
        }

        if patch.contains_key("stratumURL")
            || patch.contains_key("stratumUser")
            || patch.contains_key("stratumPort")
        {
            s.shares_accepted = 0;
            s.shares_rejected = 0;
            s.best_session_diff = s.rng.gen_range(MIN_BEST_SESSION_DIFF..=MAX_BEST_SESSION_DIFF);
            s.pool_state = PoolState::Connecting;
            s.pool_state_since = now;
        }

        Ok(applied)
    }

    /// Advance the simulator by one wall-clock tick. See the module
    /// docs and the top-level crate docs for the physics this walks
    /// through stage by stage.
    pub fn tick(&self) {
        let mut s = self.state.lock().unwrap();
        let model = self.model;
        let scenario = self.scenario;

        let now_mono = Instant::now();
        let dt = now_mono.duration_since(s.last_sim_time).as_secs_f64().max(0.0);
        s.last_sim_time = now_mono;
        let now = now_epoch_s();

        let is_pool_down = scenario.scenario_id == "pool_down";
        let (pool_state, force_fallback) =
            pool::transition(s.pool_state, s.pool_state_since, now, s.start_time, is_pool_down);
        s.pool_state = pool_state;
        if force_fallback {
            s.using_fallback = true;
        }

        let min_fan = scenario.min_fan_pct.unwrap_or(model.min_fan_pct) as f64;
        if s.fan_mode_auto {
            let inputs = fan::ControlInputs {
                base_fan_pct: model.base_fan_pct as f64,
                cooling_per_fan_pct: model.cooling_per_fan_pct,
                base_temp_c: model.base_temp_c,
                base_power_w: model.base_power_w,
                scenario_temp_offset_c: scenario.temp_offset_c,
                scenario_power_multiplier: scenario.power_multiplier,
                temp_per_watt: model.temp_per_watt,
                power_w: s.power_w,
                chip_temp_c: s.chip_temp_c,
                target_temp_c: s.target_temp_c,
                min_fan_pct: min_fan,
            };
            let current_duty = s.fan_duty_pct;
            let next_duty = s.fan_ctrl.update(&inputs, current_duty, dt);
            s.fan_duty_pct = next_duty.round();
        } else {
            s.fan_duty_pct = clamp(s.fan_duty_pct, min_fan, 100.0).round();
        }

        let freq_scale = s.frequency_mhz as f64 / (model.stock_frequency_mhz as f64).max(1.0);
        let volt_scale = s.core_voltage_mv as f64 / (model.stock_voltage_mv as f64).max(1.0);

        let base_power = model.base_power_w * scenario.power_multiplier;
        let power_target = base_power
            * volt_scale.powi(2)
            * (0.2 + 0.8 * freq_scale)
            * (1.0 + s.rng.gen_range(-0.015..=0.015));
        s.power_w = round_to(approach(s.power_w, power_target, dt, 6.0), 2);

        let chip_target = model.base_temp_c
            + (s.power_w - model.base_power_w) * model.temp_per_watt
            - (s.fan_duty_pct - model.base_fan_pct as f64) * model.cooling_per_fan_pct
            + scenario.temp_offset_c;
        let vr_target = model.base_vr_temp_c
            + (s.power_w - model.base_power_w) * model.vr_temp_per_watt
            - (s.fan_duty_pct - model.base_fan_pct as f64) * model.vr_cooling_per_fan_pct
            + scenario.vr_temp_offset_c;
        let chip_target = chip_target.max(AMBIENT_C);
        let vr_target = vr_target.max(AMBIENT_C);

        s.chip_temp_c = round_to(
            approach(s.chip_temp_c, chip_target, dt, 28.0) * (1.0 + s.rng.gen_range(-0.003..=0.003)),
            3,
        );
        s.vr_temp_c = round_to(
            approach(s.vr_temp_c, vr_target, dt, 34.0) * (1.0 + s.rng.gen_range(-0.003..=0.003)),
            3,
        );

        let rpm_target = clamp(
            model.fan_rpm_max as f64 * (s.fan_duty_pct / 100.0),
            0.0,
            model.fan_rpm_max as f64,
        );
        let rpm = approach(s.fan_rpm as f64, rpm_target, dt, 1.6);
        s.fan_rpm = (rpm * (1.0 + s.rng.gen_range(-0.01..=0.01))).round() as i64;

        let nominal_mv = model.input_voltage_v * 1000.0;
        let measured_mv = nominal_mv * (1.0 + s.rng.gen_range(-0.03..=0.03));
        s.input_voltage_mv = round_to(approach(s.input_voltage_mv, measured_mv, dt, 10.0), 3);

        let droop = (s.power_w / (model.base_power_w).max(1.0)) * s.rng.gen_range(0.0..=6.0);
        s.core_voltage_actual_mv =
            round_to(s.core_voltage_mv as f64 - droop + s.rng.gen_range(-1.5..=1.5), 3);

        let required_mv = required_core_voltage_mv(
            model.stock_voltage_mv as f64,
            model.stock_frequency_mhz as f64,
            s.frequency_mhz as f64,
            model.voltage_req_exponent,
        );
        let uv_sev = undervolt_severity(
            required_mv,
            s.core_voltage_actual_mv,
            model.voltage_margin_soft_mv,
            model.voltage_deadband_mv,
        );

        let overtemp = (s.chip_temp_c - s.target_temp_c).max(0.0);
        let temp_sev = clamp(overtemp / 25.0, 0.0, 1.0);

        let base_error = scenario.base_error_pct.unwrap_or(model.base_error_pct);
        s.dynamic_error_pct = clamp(base_error + uv_sev.powi(2) * 6.0 + temp_sev * 1.5, 0.0, 100.0);

        let base_reject = scenario.reject_rate.unwrap_or(model.reject_rate);
        let reject_prob = clamp(base_reject + uv_sev * 0.05 + temp_sev * 0.03, 0.0, 0.35);

        let throttle = if s.chip_temp_c >= 80.0 {
            clamp(1.0 - (s.chip_temp_c - 80.0) * 0.035, 0.15, 1.0)
        } else {
            1.0
        };

        let mut target_hash = self.expected_hashrate(s.frequency_mhz);

        if let Some((from, to)) = s.freq_transition {
            if self.config_ramp_s <= 0.0 {
                s.freq_transition = None;
            } else {
                let t = (now - s.last_config_change).max(0.0);
                let r = (t / self.config_ramp_s).min(1.0);
                target_hash = from + (to - from) * r;
                if r >= 1.0 {
                    s.freq_transition = None;
                }
            }
        }

        let mut effective = target_hash * throttle * clamp(1.0 - uv_sev * 0.65 - temp_sev * 0.25, 0.0, 1.0);

        let warmup = if self.warmup_s <= 0.0 {
            1.0
        } else {
            clamp((now - s.start_time) / self.warmup_s, 0.0, 1.0)
        };
        effective *= warmup;
        effective *= 1.0 + s.rng.gen_range(-0.02..=0.02);

        s.hashrate_ghs = round_to(approach(s.hashrate_ghs, effective, dt, 5.5).max(0.0), 2);

        let base_sigma = 0.026;
        let sigma = (base_sigma * (1.0 + uv_sev * 1.25 + temp_sev * 0.6)
            / (model.asic_count as f64).max(1.0).sqrt())
        .max(1e-9);
        let tau = 7.5;
        let alpha = (-dt.max(0.0) / tau).exp();
        let innovation_scale = (1.0 - alpha * alpha).max(0.0).sqrt();
        let normal = Normal::new(0.0, sigma).expect("sigma is always positive");
        let innovation = normal.sample(&mut s.rng) * innovation_scale;
        s.hashrate_noise = s.hashrate_noise * alpha + innovation;
        let reported = s.hashrate_ghs * clamp(1.0 + s.hashrate_noise, 0.0, 1.25);
        s.hashrate_reported_ghs = round_to(reported.max(0.0), 2);

        let mut rejected_delta: u64 = 0;
        if model.base_share_rate_s > 0.0 && target_hash > 0.0 && !is_pool_down {
            let share_rate_s = model.base_share_rate_s * (s.hashrate_ghs / target_hash);
            let total_shares = poisson(&mut s.rng, share_rate_s.max(0.0) * dt);
            let mut accepted = 0u64;
            let mut rejected = 0u64;
            for _ in 0..total_shares {
                if s.rng.gen::<f64>() < reject_prob {
                    rejected += 1;
                } else {
                    accepted += 1;
                    let r: f64 = s.rng.gen::<f64>().max(1e-9);
                    let candidate = clamp(r.powf(-3.0) * 10_000.0, 10_000.0, 50_000_000_000.0) as u64;
                    if candidate > s.best_session_diff {
                        s.best_session_diff = candidate;
                    }
                    if candidate > s.best_diff {
                        s.best_diff = candidate;
                    }
                }
            }
            s.shares_accepted += accepted;
            s.shares_rejected += rejected;
            rejected_delta = rejected;
            if accepted > 0 {
                s.pool_last_submit_ms = Some(now_epoch_ms());
            }
        }

        let hw_err = poisson(&mut s.rng, (uv_sev * 3.0 + temp_sev) * dt)
            + ((rejected_delta as f64) * 0.15) as u64;
        s.asic_errors += hw_err;
    }

    /// Snapshot the miner's current telemetry. Field names are chosen to
    /// match what a real device's status endpoint would return.
    pub fn telemetry(&self) -> Telemetry {
        let mut s = self.state.lock().unwrap();
        let model = self.model;

        let expected_hashrate = self.expected_hashrate(s.frequency_mhz);
        let current_ma = if s.input_voltage_mv > 0.0 {
            (s.power_w / (s.input_voltage_mv / 1000.0)) * 1000.0
        } else {
            0.0
        };
        let reported_hash = if s.hashrate_reported_ghs != 0.0 {
            s.hashrate_reported_ghs
        } else {
            s.hashrate_ghs
        };

        Telemetry {
            miner_id: self.miner_id.clone(),
            timestamp: now_epoch_s() as i64,
            uptime_seconds: (now_epoch_s() - s.start_time).max(0.0) as u64,
            hash_rate: reported_hash,
            hashrate: reported_hash,
            power: s.power_w,
            temp: s.chip_temp_c,
            vr_temp: s.vr_temp_c,
            fanspeed: round_to(s.fan_duty_pct + s.rng.gen_range(-0.35..=0.35), 6),
            fanrpm: s.fan_rpm,
            autofanspeed: if s.fan_mode_auto { 1 } else { 0 },
            targettemp: s.target_temp_c,
            temptarget: s.target_temp_c,
            core_voltage: s.core_voltage_mv,
            core_voltage_actual: s.core_voltage_actual_mv,
            frequency: s.frequency_mhz,
            voltage: s.input_voltage_mv,
            nominal_voltage: model.input_voltage_v.round() as i64,
            current: round_to(current_ma, 6),
            asic_model_upper: model.asic_model.to_string(),
            asic_model: model.asic_model.to_string(),
            asic_count: model.asic_count,
            model: model.display_name.to_string(),
            error_percentage: round_to(s.dynamic_error_pct, 3),
            expected_hashrate,
            shares_accepted: s.shares_accepted,
            shares_rejected: s.shares_rejected,
            asic_errors: s.asic_errors,
            best_diff: s.best_diff.to_string(),
            best_session_diff: s.best_session_diff.to_string(),
            stratum_url: s.pool_primary.url.clone(),
            stratum_port: s.pool_primary.port,
            stratum_user: s.pool_primary.user.clone(),
            stratum_password: s.pool_primary.password.clone(),
            fallback_stratum_url: s.pool_fallback.url.clone(),
            fallback_stratum_port: s.pool_fallback.port,
            fallback_stratum_user: s.pool_fallback.user.clone(),
            fallback_stratum_password: s.pool_fallback.password.clone(),
            is_using_fallback: s.using_fallback,
            is_using_fallback_stratum: if s.using_fallback { 1 } else { 0 },
            pool_state: s.pool_state.as_str().to_string(),
            last_submit_ms: s.pool_last_submit_ms,
            fan_speed: s.fan_duty_pct.round() as i64,
            fan_rpm: s.fan_rpm,
            manual_fan_speed: s.fan_duty_pct.round() as i64,
            min_fan_speed: model.min_fan_pct,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::get_model;
    use crate::scenario::get_scenario;
    use serde_json::json;

    fn new_miner(model_id: &str, scenario_id: &str) -> VirtualMiner {
        VirtualMiner::new(
            "test-miner",
            get_model(model_id),
            get_scenario(scenario_id),
            20.0,
            8.0,
        )
    }

    #[test]
    fn test_fresh_miner_starts_alive_and_at_stock_setpoints() {
        let miner = new_miner("bm1370_4chip", "healthy");
        let t = miner.telemetry();
        assert_eq!(t.pool_state, "alive");
        assert_eq!(t.frequency, 600);
        assert_eq!(t.core_voltage, 1175);
        assert_eq!(t.shares_accepted, 0);
    }

    #[test]
    fn test_tick_advances_hashrate_toward_target() {
        let miner = new_miner("bm1370_4chip", "healthy");
        for _ in 0..200 {
            miner.tick();
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        let t = miner.telemetry();
        assert!(t.hashrate > 0.0, "hashrate was {}", t.hashrate);
    }

    #[test]
    fn test_restart_resets_counters_but_not_setpoints() {
        let miner = new_miner("bm1370_4chip", "healthy");
        miner
            .apply_config(&serde_json::from_value(json!({"frequency": 625})).unwrap())
            .unwrap();
        for _ in 0..50 {
            miner.tick();
        }
        miner.restart();
        let t = miner.telemetry();
        assert_eq!(t.shares_accepted, 0);
        assert_eq!(t.frequency, 625);
        assert_eq!(t.pool_state, "connecting");
    }

    #[test]
    fn test_voltage_only_patch_does_not_arm_transition() {
        let miner = new_miner("bm1370_4chip", "healthy");
        let applied = miner
            .apply_config(&serde_json::from_value(json!({"coreVoltage": 1200})).unwrap())
            .unwrap();
        assert!(applied.contains_key("coreVoltage"));
        for _ in 0..5 {
            miner.tick();
        }
        // no panics, no stuck-at-zero hashrate from a bogus ramp
        let t = miner.telemetry();
        assert!(t.hashrate >= 0.0);
    }

    #[test]
    fn test_out_of_range_stratum_port_is_rejected_not_truncated() {
        let miner = new_miner("bm1370_4chip", "healthy");
        let before = miner.telemetry().stratum_port;
        let result = miner.apply_config(&serde_json::from_value(json!({"stratumPort": 70000})).unwrap());
        assert!(result.is_err());
        assert_eq!(miner.telemetry().stratum_port, before);
    }

    #[test]
    fn test_invalid_patch_value_is_rejected() {
        let miner = new_miner("bm1370_4chip", "healthy");
        let result = miner.apply_config(&serde_json::from_value(json!({"frequency": "not-a-number"})).unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_pool_down_scenario_reports_fallback() {
        let miner = new_miner("bm1370_4chip", "pool_down");
        for _ in 0..5 {
            miner.tick();
        }
        let t = miner.telemetry();
        assert!(t.is_using_fallback);
        assert!(t.pool_state == "reconnecting" || t.pool_state == "fallback");
    }
}
