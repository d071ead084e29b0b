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

//! A software emulator for a fleet of Bitcoin ASIC miners. Each
//! [`VirtualMiner`](miner::VirtualMiner) derives power, temperature, fan
//! behavior, hashrate and pool state from a [`model::ModelPreset`] board
//! definition and a [`scenario::ScenarioPreset`] fault profile, advanced
//! one [`miner::VirtualMiner::tick`] at a time. [`fleet::MinerFleet`] runs
//! a collection of them on a shared background thread.
//!
//! This crate has no network listener, no CLI, and no wire-format
//! opinions -- it exposes `tick`, `apply_config`, `restart`, `telemetry`
//! and `uptime_seconds` and leaves everything above that boundary
//! (HTTP, CORS, port publishing, CLI flags) to whatever embeds it.

pub mod error;
pub mod fan;
pub mod fleet;
pub mod math;
pub mod miner;
pub mod model;
pub mod patch;
pub mod pool;
pub mod rng;
pub mod scenario;
pub mod telemetry;

pub use error::{Error, ErrorKind, Result};
pub use fleet::MinerFleet;
pub use miner::VirtualMiner;
pub use model::{get_model, ModelPreset};
pub use patch::Patch;
pub use scenario::{get_scenario, ScenarioPreset};
pub use telemetry::Telemetry;
