//! End-to-end scenarios driven entirely through the public API: pick a
//! model and scenario preset, tick a `VirtualMiner` for real wall-clock
//! time, and check the telemetry it reports. No mocked clock -- `tick`
//! measures its own `dt` from `Instant::now()`, so these run for as many
//! real seconds as the scenario they reproduce.

use std::time::{Duration, Instant};

use serde_json::json;
use virtual_asic_miner::{get_model, get_scenario, rng, VirtualMiner};

/// Tick `miner` in small steps until at least `seconds` of wall-clock
/// time have passed, so multi-stage physics (ramps, first-order lags)
/// see a realistic sequence of small `dt`s rather than one huge one.
fn tick_for(miner: &VirtualMiner, seconds: f64) {
    let start = Instant::now();
    let deadline = Duration::from_secs_f64(seconds);
    let step = Duration::from_millis(250);
    while start.elapsed() < deadline {
        std::thread::sleep(step);
        miner.tick();
    }
}

#[test]
fn cold_start_healthy_settles_near_nominal() {
    rng::set_global_seed(101);
    let miner = VirtualMiner::new(
        "cold-start",
        get_model("bm1370_4chip"),
        get_scenario("healthy"),
        0.0,
        0.0,
    );

    tick_for(&miner, 60.0);
    let t = miner.telemetry();

    assert!(t.hash_rate >= 4400.0 && t.hash_rate <= 5400.0, "hashRate was {}", t.hash_rate);
    assert!(t.temp >= 55.0 && t.temp <= 68.0, "temp was {}", t.temp);
    assert!(t.shares_accepted >= 3, "sharesAccepted was {}", t.shares_accepted);
    assert_eq!(t.pool_state, "alive");
}

#[test]
fn frequency_step_ramps_then_settles_near_new_target() {
    rng::set_global_seed(102);
    let miner = VirtualMiner::new(
        "freq-step",
        get_model("bm1370_4chip"),
        get_scenario("healthy"),
        0.0,
        8.0,
    );

    // let the miner reach its stock steady state before stepping frequency.
    tick_for(&miner, 5.0);

    let applied = miner
        .apply_config(&serde_json::from_value(json!({"frequency": 490})).unwrap())
        .unwrap();
    assert!(applied.contains_key("frequency"));

    // halfway through the 8s ramp: 4896 + (3999 - 4896) * 0.5 = 4447.5
    tick_for(&miner, 4.0);
    let mid = miner.telemetry();
    assert!(
        mid.hash_rate > 4150.0 && mid.hash_rate < 4750.0,
        "mid-ramp hashRate was {}",
        mid.hash_rate
    );

    // well past the ramp: should have kept decaying toward ~3999.
    tick_for(&miner, 10.0);
    let settled = miner.telemetry();
    assert!(
        settled.hash_rate < mid.hash_rate,
        "expected continued decay toward 3999, mid={} settled={}",
        mid.hash_rate,
        settled.hash_rate
    );
    assert!(settled.hash_rate < 4300.0, "settled hashRate was {}", settled.hash_rate);
}

#[test]
fn undervolt_raises_error_rate_and_caps_hashrate() {
    rng::set_global_seed(103);
    let miner = VirtualMiner::new(
        "undervolt",
        get_model("bm1370_4chip"),
        get_scenario("healthy"),
        0.0,
        0.0,
    );

    miner
        .apply_config(&serde_json::from_value(json!({"coreVoltage": 1000})).unwrap())
        .unwrap();

    tick_for(&miner, 30.0);
    let t = miner.telemetry();

    assert!(t.error_percentage >= 2.0, "errorPercentage was {}", t.error_percentage);
    assert!(t.hash_rate <= 0.7 * 4896.0, "hashRate was {}", t.hash_rate);
}

#[test]
fn overheat_scenario_pins_temp_fan_and_error_rate() {
    rng::set_global_seed(104);
    let miner = VirtualMiner::new(
        "overheat",
        get_model("bm1370_4chip"),
        get_scenario("overheat"),
        0.0,
        0.0,
    );

    tick_for(&miner, 30.0);
    let t = miner.telemetry();

    assert!(t.temp >= 75.0, "temp was {}", t.temp);
    assert!(t.fan_speed >= 92, "fan duty was {}", t.fan_speed);
    assert!(t.error_percentage >= 0.9, "errorPercentage was {}", t.error_percentage);
}

#[test]
fn pool_down_scenario_reconnects_then_falls_back() {
    rng::set_global_seed(105);
    let miner = VirtualMiner::new(
        "pool-down",
        get_model("bm1370_4chip"),
        get_scenario("pool_down"),
        0.0,
        0.0,
    );

    tick_for(&miner, 2.0);
    let early = miner.telemetry();
    assert_eq!(early.pool_state, "reconnecting");
    assert!(early.is_using_fallback);
    assert_eq!(early.shares_accepted, 0);

    tick_for(&miner, 8.0);
    let late = miner.telemetry();
    assert_eq!(late.pool_state, "fallback");
    assert!(late.is_using_fallback);
    assert_eq!(late.shares_accepted, 0);
}

#[test]
fn restart_resets_runtime_state_but_keeps_setpoints() {
    rng::set_global_seed(106);
    let miner = VirtualMiner::new(
        "restart",
        get_model("bm1370_4chip"),
        get_scenario("healthy"),
        0.0,
        0.0,
    );
    miner
        .apply_config(&serde_json::from_value(json!({"frequency": 625, "coreVoltage": 1200})).unwrap())
        .unwrap();

    tick_for(&miner, 10.0);
    let before = miner.telemetry();
    assert_eq!(before.pool_state, "alive");
    assert!(before.uptime_seconds >= 9);

    miner.restart();
    let after = miner.telemetry();

    assert_eq!(after.shares_accepted, 0);
    assert_eq!(after.shares_rejected, 0);
    assert_eq!(after.uptime_seconds, 0);
    assert_eq!(after.hash_rate, 0.0);
    assert_eq!(after.pool_state, "connecting");
    assert_eq!(after.frequency, 625);
    assert_eq!(after.core_voltage, 1200);
}

#[test]
fn fan_duty_never_leaves_its_model_bounds() {
    rng::set_global_seed(107);
    let miner = VirtualMiner::new(
        "fan-bounds",
        get_model("bm1366_4chip"),
        get_scenario("low_hashrate"),
        0.0,
        0.0,
    );

    tick_for(&miner, 15.0);
    let t = miner.telemetry();
    assert!(t.fan_speed >= 0 && t.fan_speed <= 100, "fan duty was {}", t.fan_speed);
    assert!(t.hash_rate >= 0.0);
    assert!(t.temp > 0.0);
}

#[test]
fn best_session_diff_never_exceeds_best_diff() {
    rng::set_global_seed(108);
    let miner = VirtualMiner::new(
        "diff-tracking",
        get_model("bm1370_8chip"),
        get_scenario("healthy"),
        0.0,
        0.0,
    );

    tick_for(&miner, 20.0);
    let t = miner.telemetry();
    let best_diff: u64 = t.best_diff.parse().unwrap();
    let best_session_diff: u64 = t.best_session_diff.parse().unwrap();
    assert!(
        best_session_diff <= best_diff,
        "bestSessionDiff {} exceeded bestDiff {}",
        best_session_diff,
        best_diff
    );
}
