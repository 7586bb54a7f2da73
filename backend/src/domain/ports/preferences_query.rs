//! Driving port for reading preference documents.
//!
//! Inbound adapters call this port with a validated username and the shape the
//! caller asked for; they never touch the store directly.

use async_trait::async_trait;

use crate::domain::{Error, PreferenceShape, Username};

/// Domain use-case port for fetching a user's preferences.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferencesQuery: Send + Sync {
    /// Serialised JSON for the user's document in the requested shape.
    ///
    /// A user with no stored document yields an empty object.
    async fn fetch(&self, username: &Username, shape: PreferenceShape) -> Result<String, Error>;
}
