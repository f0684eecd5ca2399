//! Core trait definitions.

pub mod storage;

pub use storage::StorageProvider;
