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

//! Errors produced by the virtual miner simulator.
//!
//! The simulator has exactly one fallible operation: applying a config
//! patch with an unrecognized or malformed value. `tick`, `restart`,
//! `telemetry` and `uptime_seconds` are infallible by design.

use thiserror::Error;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum ErrorKind {
    /// A patch key was present but its value could not be interpreted
    /// as the type that key requires.
    #[error("invalid value for '{0}': {1}")]
    InvalidPatch(String, String),
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("{0}")]
pub struct Error(#[source] ErrorKind);

impl Error {
    pub fn invalid_patch(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self(ErrorKind::InvalidPatch(field.into(), reason.into()))
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self(kind)
    }
}

/// A specialized `Result` type bound to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_invalid_patch_message() {
        let err = Error::invalid_patch("frequency", "not a number");
        assert_eq!(
            err.to_string(),
            "invalid value for 'frequency': not a number"
        );
    }
}
