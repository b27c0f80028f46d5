//! Keys, payloads and namespaces. Pure, no I/O.

pub mod errors;
pub mod keys;
pub mod namespace;
pub mod payload;
pub mod summary;

pub use errors::{KVStoreError, StoreError};
pub use keys::{decode_key, encode_key, encode_time_key, DecodedKey, TIME_KEY_LEN};
pub use namespace::Namespace;
pub use summary::StoreSummary;
