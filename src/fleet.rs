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

//! `MinerFleet`: a concurrent collection of [`VirtualMiner`]s ticked on a
//! single dedicated background thread. The fleet lock only ever guards
//! the miner map itself -- each miner's own lock (see [`crate::miner`])
//! guards its physics state, so the tick loop snapshots the miner list,
//! releases the fleet lock, and ticks miners one at a time outside it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::miner::VirtualMiner;

struct Inner {
    miners: Mutex<HashMap<String, Arc<VirtualMiner>>>,
    stop: AtomicBool,
    wake: Condvar,
    wake_lock: Mutex<()>,
    tick_period: Duration,
}

/// A collection of miners advanced together at a fixed cadence.
pub struct MinerFleet {
    inner: Arc<Inner>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl MinerFleet {
    pub fn new(tick_hz: f64) -> Self {
        let tick_period = Duration::from_secs_f64(1.0 / tick_hz.max(0.1));
        Self {
            inner: Arc::new(Inner {
                miners: Mutex::new(HashMap::new()),
                stop: AtomicBool::new(false),
                wake: Condvar::new(),
                wake_lock: Mutex::new(()),
                tick_period,
            }),
            thread: Mutex::new(None),
        }
    }

    /// Start the background tick loop. Idempotent: calling `start` while
    /// already running is a no-op, matching the reference fleet's
    /// behavior of never spawning a second worker thread.
    pub fn start(&self) {
        let mut thread = self.thread.lock().unwrap();
        if let Some(handle) = thread.as_ref() {
            if !handle.is_finished() {
                return;
            }
        }
        self.inner.stop.store(false, Ordering::SeqCst);
        let inner = Arc::clone(&self.inner);
        *thread = Some(
            thread::Builder::new()
                .name("virtual-asic-fleet".to_string())
                .spawn(move || run_loop(inner))
                .expect("failed to spawn fleet tick thread"),
        );
        info!("virtual-asic-fleet started");
    }

    /// Signal the tick loop to stop. Does not block waiting for the
    /// thread to exit -- the loop checks the stop flag once per period.
    pub fn stop(&self) {
        self.inner.stop.store(true, Ordering::SeqCst);
        let _guard = self.inner.wake_lock.lock().unwrap();
        self.inner.wake.notify_all();
    }

    pub fn add(&self, miner: VirtualMiner) {
        let mut miners = self.inner.miners.lock().unwrap();
        miners.insert(miner.miner_id.clone(), Arc::new(miner));
    }

    pub fn remove(&self, miner_id: &str) {
        let mut miners = self.inner.miners.lock().unwrap();
        miners.remove(miner_id);
    }

    pub fn get(&self, miner_id: &str) -> Option<Arc<VirtualMiner>> {
        let miners = self.inner.miners.lock().unwrap();
        miners.get(miner_id).cloned()
    }

    pub fn list_ids(&self) -> Vec<String> {
        let miners = self.inner.miners.lock().unwrap();
        miners.keys().cloned().collect()
    }
}

impl Drop for MinerFleet {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(inner: Arc<Inner>) {
    while !inner.stop.load(Ordering::SeqCst) {
        let start = Instant::now();

        let snapshot: Vec<Arc<VirtualMiner>> = {
            let miners = inner.miners.lock().unwrap();
            miners.values().cloned().collect()
        };
        for miner in &snapshot {
            miner.tick();
        }
        debug!("ticked {} miner(s)", snapshot.len());

        let elapsed = start.elapsed();
        let remaining = inner.tick_period.checked_sub(elapsed).unwrap_or_default();
        if remaining.is_zero() {
            continue;
        }
        let guard = inner.wake_lock.lock().unwrap();
        let _ = inner
            .wake
            .wait_timeout_while(guard, remaining, |_| !inner.stop.load(Ordering::SeqCst))
            .unwrap();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::get_model;
    use crate::scenario::get_scenario;
    use std::time::Duration;

    fn sample_miner(id: &str) -> VirtualMiner {
        VirtualMiner::new(id, get_model("bm1370_4chip"), get_scenario("healthy"), 1.0, 1.0)
    }

    #[test]
    fn test_add_get_remove_list() {
        let fleet = MinerFleet::new(10.0);
        fleet.add(sample_miner("a"));
        fleet.add(sample_miner("b"));
        assert!(fleet.get("a").is_some());
        let mut ids = fleet.list_ids();
        ids.sort();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
        fleet.remove("a");
        assert!(fleet.get("a").is_none());
    }

    #[test]
    fn test_start_is_idempotent() {
        let _ = env_logger::try_init();
        let fleet = MinerFleet::new(50.0);
        fleet.add(sample_miner("a"));
        fleet.start();
        fleet.start();
        std::thread::sleep(Duration::from_millis(60));
        fleet.stop();
        let t = fleet.get("a").unwrap().telemetry();
        assert!(t.uptime_seconds < 5);
    }

    #[test]
    fn test_ticking_advances_uptime_and_hashrate() {
        let _ = env_logger::try_init();
        let fleet = MinerFleet::new(50.0);
        fleet.add(sample_miner("a"));
        fleet.start();
        std::thread::sleep(Duration::from_millis(300));
        fleet.stop();
        let t = fleet.get("a").unwrap().telemetry();
        assert!(t.hashrate >= 0.0);
    }
}
