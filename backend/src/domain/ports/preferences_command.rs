//! Driving port for mutating preference documents.
//!
//! Writes fully replace the stored document; there is no merge. Whether a
//! write inserts or updates depends only on whether a document already exists,
//! never on the HTTP method.

use async_trait::async_trait;

use crate::domain::{Error, PreferenceDocument, Username, WriteMethod};

/// Domain use-case port for writing and removing preferences.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferencesCommand: Send + Sync {
    /// Validate `body` as a JSON object, store it, and return the normalised
    /// document. Malformed bodies leave the store untouched.
    async fn write(
        &self,
        username: &Username,
        body: &[u8],
        method: WriteMethod,
    ) -> Result<PreferenceDocument, Error>;

    /// Delete the user's document. Removing an absent document succeeds.
    async fn remove(&self, username: &Username) -> Result<(), Error>;
}
