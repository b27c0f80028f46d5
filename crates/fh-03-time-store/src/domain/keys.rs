//! # Key Encoding
//!
//! A key is the window end in ticks as 19 zero-padded decimal digits,
//! optionally followed by an entity name. Every non-negative `i64` fits in 19
//! digits, so byte order of keys equals chronological order.

use shared_types::Ticks;

use super::errors::StoreError;
use super::namespace::Namespace;

pub const TIME_KEY_LEN: usize = 19;

pub fn encode_time_key(ticks: Ticks) -> Result<String, StoreError> {
    if ticks < 0 {
        return Err(StoreError::NegativeTime(ticks));
    }
    Ok(format!("{:019}", ticks))
}

/// Time key followed by `suffix` (entity name or seek hint).
pub fn encode_key(ticks: Ticks, suffix: &str) -> Result<String, StoreError> {
    let mut key = encode_time_key(ticks)?;
    key.push_str(suffix);
    Ok(key)
}

/// A decoded key: window end plus the entity suffix, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey {
    pub time: Ticks,
    pub subkey: Option<String>,
}

pub fn decode_key(namespace: Namespace, key: &[u8]) -> Result<DecodedKey, StoreError> {
    let malformed = |reason: String| StoreError::MalformedKey {
        namespace: namespace.as_str(),
        reason,
    };

    if key.len() < TIME_KEY_LEN {
        return Err(malformed(format!("{} bytes, need {}", key.len(), TIME_KEY_LEN)));
    }
    let (time, rest) = key.split_at(TIME_KEY_LEN);
    if !time.iter().all(u8::is_ascii_digit) {
        return Err(malformed("time prefix is not decimal".into()));
    }
    let time = std::str::from_utf8(time)
        .ok()
        .and_then(|digits| digits.parse::<Ticks>().ok())
        .ok_or_else(|| malformed("time prefix out of range".into()))?;

    let subkey = if rest.is_empty() {
        None
    } else {
        Some(
            String::from_utf8(rest.to_vec())
                .map_err(|e| malformed(format!("entity is not UTF-8: {e}")))?,
        )
    };

    Ok(DecodedKey { time, subkey })
}
