//! In-memory project store.

pub mod store;

pub use store::MemoryProjectStore;
