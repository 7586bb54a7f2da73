//! Preference domain service.
//!
//! Implements the driving ports on top of a [`PreferenceStore`]: it checks the
//! user exists, normalises payloads, picks insert or update, and shapes stored
//! documents for responses.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::domain::ports::{
    PreferenceStore, PreferenceStoreError, PreferencesCommand, PreferencesQuery,
};
use crate::domain::{Error, PreferenceDocument, PreferenceShape, Username, WriteMethod};

/// Preference service implementing [`PreferencesQuery`] and
/// [`PreferencesCommand`].
#[derive(Clone)]
pub struct PreferencesService<S> {
    store: Arc<S>,
}

impl<S> PreferencesService<S> {
    /// Create a new service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> PreferencesService<S>
where
    S: PreferenceStore,
{
    fn map_store_error(error: PreferenceStoreError) -> Error {
        match error {
            PreferenceStoreError::UserNotFound { username } => {
                Error::internal(format!("user {username} disappeared during the request"))
            }
            other => Error::internal(other.to_string()),
        }
    }

    async fn ensure_user(&self, username: &Username) -> Result<(), Error> {
        let exists = self
            .store
            .is_user(username)
            .await
            .map_err(Self::map_store_error)?;
        if exists {
            Ok(())
        } else {
            debug!(%username, "rejecting request for unknown user");
            Err(Error::unknown_user(username))
        }
    }

    async fn store_document(&self, username: &Username, text: &str) -> Result<(), Error> {
        let present = self
            .store
            .has_preferences(username)
            .await
            .map_err(Self::map_store_error)?;
        if present {
            return self
                .store
                .update_preferences(username, text)
                .await
                .map_err(Self::map_store_error);
        }

        match self.store.insert_preferences(username, text).await {
            Ok(()) => Ok(()),
            Err(PreferenceStoreError::Conflict { message }) => {
                // Another write created the record first, or an empty record
                // already exists; replace it.
                warn!(%username, %message, "insert conflicted, updating instead");
                self.store
                    .update_preferences(username, text)
                    .await
                    .map_err(Self::map_store_error)
            }
            Err(err) => Err(Self::map_store_error(err)),
        }
    }
}

#[async_trait]
impl<S> PreferencesQuery for PreferencesService<S>
where
    S: PreferenceStore,
{
    async fn fetch(&self, username: &Username, shape: PreferenceShape) -> Result<String, Error> {
        self.ensure_user(username).await?;
        let records = self
            .store
            .get_preferences(username)
            .await
            .map_err(Self::map_store_error)?;
        if records.len() > 1 {
            warn!(%username, count = records.len(), "multiple preference records; using the last");
        }

        let stored = records
            .last()
            .and_then(|record| record.preferences.as_deref());
        let document = PreferenceDocument::from_stored(stored).map_err(|err| {
            error!(%username, error = %err, "stored preferences are unreadable");
            Error::internal(format!("stored preferences for {username} are unreadable: {err}"))
        })?;
        Ok(document.render(shape))
    }
}

#[async_trait]
impl<S> PreferencesCommand for PreferencesService<S>
where
    S: PreferenceStore,
{
    async fn write(
        &self,
        username: &Username,
        body: &[u8],
        method: WriteMethod,
    ) -> Result<PreferenceDocument, Error> {
        self.ensure_user(username).await?;
        let document = PreferenceDocument::from_payload(body)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.store_document(username, &document.to_canonical_text())
            .await?;
        debug!(%username, %method, keys = document.len(), "preferences stored");
        Ok(document)
    }

    async fn remove(&self, username: &Username) -> Result<(), Error> {
        self.ensure_user(username).await?;
        self.store
            .delete_preferences(username)
            .await
            .map_err(Self::map_store_error)?;
        debug!(%username, "preferences removed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "preferences_service_tests.rs"]
mod tests;
