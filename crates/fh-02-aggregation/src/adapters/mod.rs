//! Wire-format adapters.

pub mod json_decoder;

pub use json_decoder::decode;
