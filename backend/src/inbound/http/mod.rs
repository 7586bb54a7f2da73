//! HTTP inbound adapter exposing the preference endpoints.

pub mod error;
pub mod health;
pub mod preferences;
pub mod state;

pub use error::ApiResult;
