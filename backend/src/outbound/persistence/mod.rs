//! PostgreSQL persistence for preference documents.
//!
//! Diesel row structs and table definitions stay private to this module; the
//! domain only sees [`DieselPreferenceStore`] through the
//! [`PreferenceStore`](crate::domain::ports::PreferenceStore) port.
//!
//! ```ignore
//! use user_preferences::outbound::persistence::{DbPool, DieselPreferenceStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/prefs")).await?;
//! let store = DieselPreferenceStore::new(pool);
//! ```

mod diesel_preference_store;
mod models;
mod pool;
mod schema;

pub use diesel_preference_store::DieselPreferenceStore;
pub use pool::{DEFAULT_MAX_SIZE, DbPool, PoolConfig, PoolError};
