pub mod store;
pub mod writers;

pub use store::{StoredEntry, TimeIndexedStore};
pub use writers::StoreWriters;
