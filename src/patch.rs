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

//! `apply_config`'s patch type and the small coercion helpers it needs.
//! The patch itself is left as a loosely-typed JSON map -- callers come
//! from an HTTP layer outside this crate and may send any JSON scalar
//! for a given key, so coercion failures are reported per-key rather
//! than rejecting the whole patch.

use std::convert::TryFrom;

use crate::error::Error;
use serde_json::Value;

pub type Patch = serde_json::Map<String, Value>;

/// Pull an integer out of a patch value, accepting both JSON numbers and
/// numeric strings (some real device config UIs submit form fields as
/// strings).
pub fn as_i64(field: &str, value: &Value) -> Result<i64, Error> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| Error::invalid_patch(field, "not an integer")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(|f| f as i64)
            .map_err(|_| Error::invalid_patch(field, "not a numeric string")),
        _ => Err(Error::invalid_patch(field, "expected a number")),
    }
}

/// Pull a float out of a patch value, same string/number leniency as
/// [`as_i64`].
pub fn as_f64(field: &str, value: &Value) -> Result<f64, Error> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::invalid_patch(field, "not a number")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::invalid_patch(field, "not a numeric string")),
        _ => Err(Error::invalid_patch(field, "expected a number")),
    }
}

/// Pull a port number out of a patch value. Same leniency as [`as_i64`],
/// but rejects anything outside `0..=65535` instead of truncating it --
/// a caller submitting e.g. `70000` gets an error, not a silently
/// wrapped-around port.
pub fn as_port(field: &str, value: &Value) -> Result<u16, Error> {
    let n = as_i64(field, value)?;
    u16::try_from(n).map_err(|_| Error::invalid_patch(field, "out of range for a port (0-65535)"))
}

/// Pull a string out of a patch value. Non-string JSON scalars are
/// stringified rather than rejected, matching real config forms that
/// often submit everything as text.
pub fn as_string(field: &str, value: &Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(Error::invalid_patch(field, "expected a string")),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_i64_from_number_and_string() {
        assert_eq!(as_i64("f", &json!(600)).unwrap(), 600);
        assert_eq!(as_i64("f", &json!("600")).unwrap(), 600);
    }

    #[test]
    fn test_as_i64_rejects_garbage() {
        assert!(as_i64("f", &json!("not a number")).is_err());
        assert!(as_i64("f", &json!(null)).is_err());
    }

    #[test]
    fn test_as_f64_from_number_and_string() {
        assert_eq!(as_f64("t", &json!(60.5)).unwrap(), 60.5);
        assert_eq!(as_f64("t", &json!("60.5")).unwrap(), 60.5);
    }

    #[test]
    fn test_as_string_coerces_scalars() {
        assert_eq!(as_string("u", &json!("pool.example")).unwrap(), "pool.example");
        assert_eq!(as_string("u", &json!(3333)).unwrap(), "3333");
    }

    #[test]
    fn test_as_port_accepts_in_range_values() {
        assert_eq!(as_port("p", &json!(3333)).unwrap(), 3333);
        assert_eq!(as_port("p", &json!("3333")).unwrap(), 3333);
        assert_eq!(as_port("p", &json!(0)).unwrap(), 0);
        assert_eq!(as_port("p", &json!(65535)).unwrap(), 65535);
    }

    #[test]
    fn test_as_port_rejects_out_of_range_instead_of_truncating() {
        assert!(as_port("p", &json!(70000)).is_err());
        assert!(as_port("p", &json!(-1)).is_err());
    }
}
