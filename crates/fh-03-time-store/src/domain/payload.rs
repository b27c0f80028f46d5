//! Value encodings per namespace.

use shared_types::LeaderboardEntry;

use super::errors::StoreError;
use super::namespace::Namespace;

pub fn encode_count(count: u64) -> Vec<u8> {
    count.to_le_bytes().to_vec()
}

pub fn decode_count(bytes: &[u8]) -> Result<u64, StoreError> {
    let array: [u8; 8] = bytes.try_into().map_err(|_| StoreError::MalformedPayload {
        namespace: Namespace::Counts.as_str(),
        reason: format!("count is {} bytes, expected 8", bytes.len()),
    })?;
    Ok(u64::from_le_bytes(array))
}

pub fn encode_json<T: serde::Serialize + ?Sized>(
    namespace: Namespace,
    value: &T,
) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::MalformedPayload {
        namespace: namespace.as_str(),
        reason: e.to_string(),
    })
}

pub fn decode_entry(namespace: Namespace, bytes: &[u8]) -> Result<LeaderboardEntry, StoreError> {
    decode_json(namespace, bytes)
}

pub fn decode_board(
    namespace: Namespace,
    bytes: &[u8],
) -> Result<Vec<LeaderboardEntry>, StoreError> {
    decode_json(namespace, bytes)
}

fn decode_json<T: serde::de::DeserializeOwned>(
    namespace: Namespace,
    bytes: &[u8],
) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::MalformedPayload {
        namespace: namespace.as_str(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_is_little_endian() {
        assert_eq!(encode_count(1), vec![1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(decode_count(&encode_count(123_456)).unwrap(), 123_456);
    }

    #[test]
    fn test_short_count_rejected() {
        assert!(matches!(
            decode_count(&[1, 2, 3]),
            Err(StoreError::MalformedPayload { namespace: "counts", .. })
        ));
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(decode_entry(Namespace::Mentions, b"{").is_err());
        assert!(decode_board(Namespace::Retweets, b"[]").unwrap().is_empty());
    }
}
