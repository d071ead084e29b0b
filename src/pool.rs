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

//! Stratum endpoint configuration and the pool connection state machine.

use serde::Serialize;

/// A stratum endpoint (primary or fallback). Holding credentials in plain
/// `String`s mirrors what a real miner's config page round-trips; nothing
/// here talks to an actual pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolConfig {
    pub url: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl PoolConfig {
    pub fn primary_default() -> Self {
        Self {
            url: "stratum.pool.example".to_string(),
            port: 3333,
            user: "worker.virtual".to_string(),
            password: "x".to_string(),
        }
    }

    pub fn fallback_default() -> Self {
        Self {
            url: "backup.pool.example".to_string(),
            port: 3334,
            user: "worker.virtual".to_string(),
            password: "x".to_string(),
        }
    }
}

/// Coarse connection state of the primary/active stratum link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Connecting,
    Alive,
    Reconnecting,
    Fallback,
}

impl PoolState {
    pub fn as_str(self) -> &'static str {
        match self {
            PoolState::Connecting => "connecting",
            PoolState::Alive => "alive",
            PoolState::Reconnecting => "reconnecting",
            PoolState::Fallback => "fallback",
        }
    }
}

/// Advance the pool state machine by one tick.
///
/// `pool_down` scenarios never settle: the link oscillates between
/// `Reconnecting` (first 8 seconds since miner start) and `Fallback`
/// (thereafter), and the miner is always reported as running on its
/// fallback pool. Outside that scenario, a `Connecting` link becomes
/// `Alive` 3 seconds after it started connecting; every other state is
/// left untouched (there is no spontaneous disconnect in this model —
/// only `restart()` or a primary-identity config change re-arms
/// `Connecting`).
pub fn transition(
    current: PoolState,
    state_since: f64,
    now: f64,
    start_time: f64,
    is_pool_down_scenario: bool,
) -> (PoolState, bool) {
    if is_pool_down_scenario {
        let elapsed = now - start_time;
        let state = if elapsed < 8.0 {
            PoolState::Reconnecting
        } else {
            PoolState::Fallback
        };
        return (state, true);
    }

    if current == PoolState::Connecting && (now - state_since) >= 3.0 {
        return (PoolState::Alive, false);
    }
    (current, false)
}
