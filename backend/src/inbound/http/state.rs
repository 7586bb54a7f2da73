//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and depend only on the driving ports,
//! so they can be exercised with mocks or the fixture store.

use std::sync::Arc;

use crate::domain::PreferencesService;
use crate::domain::ports::{PreferenceStore, PreferencesCommand, PreferencesQuery};

/// Dependency bundle for preference handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Read side: `GET /{username}`.
    pub query: Arc<dyn PreferencesQuery>,
    /// Write side: `PUT`, `POST` and `DELETE /{username}`.
    pub command: Arc<dyn PreferencesCommand>,
}

impl HttpState {
    /// Serve both ports from one [`PreferencesService`] over `store`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use user_preferences::domain::ports::FixturePreferenceStore;
    /// use user_preferences::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::from_store(Arc::new(FixturePreferenceStore::new()));
    /// let _query = state.query.clone();
    /// ```
    #[must_use]
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: PreferenceStore + 'static,
    {
        let service = Arc::new(PreferencesService::new(store));
        Self {
            query: service.clone(),
            command: service,
        }
    }
}
