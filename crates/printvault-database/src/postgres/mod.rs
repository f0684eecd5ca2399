//! PostgreSQL-backed project store.

pub mod store;

pub use store::PgProjectStore;
