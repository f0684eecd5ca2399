//! # printvault-database
//!
//! The [`ProjectStore`] trait — the transactional persistence boundary for
//! projects, mesh records, and toolpath records — and its two
//! implementations: [`postgres::PgProjectStore`] for production and
//! [`memory::MemoryProjectStore`] for tests and embedded use.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod store;

pub use memory::MemoryProjectStore;
pub use postgres::PgProjectStore;
pub use store::ProjectStore;
