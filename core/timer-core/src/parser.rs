//! State file parsing.
//!
//! The producer writes the file without coordinating with us, so a read can land
//! on an empty or half-written file at any time. Parsing is a pure function of
//! the bytes: decode, then validate, never coerce.
//!
//! Expected shape (unknown fields are ignored):
//!
//! ```json
//! { "minutes_left": 95, "preserve": false }
//! ```

use std::path::Path;

use fs_err as fs;
use serde_json::Value;

use crate::error::{ParseError, Result, TimerError};
use crate::types::SessionState;

const PRESERVE_KEY: &str = "preserve";
const MINUTES_LEFT_KEY: &str = "minutes_left";

/// Decodes and validates raw state file bytes.
pub fn parse(raw: &[u8]) -> std::result::Result<SessionState, ParseError> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|err| ParseError::Malformed(err.to_string()))?;

    let object = value
        .as_object()
        .ok_or(ParseError::InvalidShape("top-level value is not an object"))?;

    let preserve = match object.get(PRESERVE_KEY) {
        Some(Value::Bool(preserve)) => *preserve,
        Some(_) => return Err(ParseError::InvalidShape("preserve is not a boolean")),
        None => return Err(ParseError::InvalidShape("preserve is missing")),
    };

    if preserve {
        return Ok(SessionState::Preserved);
    }

    let minutes_left = object
        .get(MINUTES_LEFT_KEY)
        .and_then(Value::as_f64)
        .filter(|minutes| minutes.is_finite())
        .ok_or(ParseError::InvalidShape(
            "minutes_left is not a finite number",
        ))?;

    Ok(SessionState::Counting {
        minutes_left: normalize_minutes(minutes_left),
    })
}

/// Floors a raw countdown to whole minutes, clamping negatives to zero.
pub fn normalize_minutes(raw: f64) -> u64 {
    if raw <= 0.0 {
        return 0;
    }
    // `as` saturates at u64::MAX for absurdly large inputs.
    raw.floor() as u64
}

/// Reads and parses the state file at `path` in one step.
pub fn read_state(path: &Path) -> Result<SessionState> {
    let raw = fs::read(path).map_err(|err| TimerError::io("Failed to read state file", err))?;
    Ok(parse(&raw)?)
}
