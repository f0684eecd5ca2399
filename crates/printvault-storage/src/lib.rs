//! # printvault-storage
//!
//! The managed storage root: a local-filesystem implementation of the
//! [`printvault_core::traits::StorageProvider`] trait, plus the path
//! conventions that decide which record paths the application owns.

pub mod local;
pub mod path;

pub use local::LocalStorageProvider;
