//! Driven port for preference persistence.
//!
//! The [`PreferenceStore`] trait is the contract the relational adapter
//! fulfils. Every operation takes the external username; adapters resolve it
//! to the internal [`UserId`](crate::domain::UserId) themselves. The store
//! treats preference text as opaque and never parses it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{PreferenceRecord, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by preference store adapters.
    pub enum PreferenceStoreError {
        /// The username did not resolve to a user row during a write.
        UserNotFound { username: String } =>
            "user {username} does not exist",
        /// Storage connection could not be established.
        Connection { message: String } =>
            "preference store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "preference store query failed: {message}",
        /// A uniqueness constraint rejected the mutation.
        Conflict { message: String } =>
            "preference store conflict: {message}",
    }
}

/// Port for preference storage and retrieval.
///
/// # Insert versus update
///
/// At most one record exists per user. Callers choose between
/// [`insert_preferences`](Self::insert_preferences) and
/// [`update_preferences`](Self::update_preferences) using
/// [`has_preferences`](Self::has_preferences); an update that matches no
/// record is not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Whether a user with this username exists. Absence is `Ok(false)`.
    async fn is_user(&self, username: &Username) -> Result<bool, PreferenceStoreError>;

    /// Whether the user has a record with non-empty preference text.
    ///
    /// A missing record and an empty one both report `false`.
    async fn has_preferences(&self, username: &Username) -> Result<bool, PreferenceStoreError>;

    /// Fetch the user's records in ascending `id` order. Empty when none.
    async fn get_preferences(
        &self,
        username: &Username,
    ) -> Result<Vec<PreferenceRecord>, PreferenceStoreError>;

    /// Insert a new record.
    ///
    /// Fails with [`PreferenceStoreError::UserNotFound`] for unknown users and
    /// [`PreferenceStoreError::Conflict`] when a record already exists.
    async fn insert_preferences(
        &self,
        username: &Username,
        preferences: &str,
    ) -> Result<(), PreferenceStoreError>;

    /// Replace the text of the existing record in place.
    ///
    /// Fails with [`PreferenceStoreError::UserNotFound`] for unknown users.
    async fn update_preferences(
        &self,
        username: &Username,
        preferences: &str,
    ) -> Result<(), PreferenceStoreError>;

    /// Delete the user's record if present. Deleting nothing succeeds.
    async fn delete_preferences(&self, username: &Username) -> Result<(), PreferenceStoreError>;
}

#[derive(Debug, Default)]
struct FixtureState {
    users: HashMap<Username, UserId>,
    records: HashMap<UserId, PreferenceRecord>,
}

impl FixtureState {
    fn user_id(&self, username: &Username) -> Result<UserId, PreferenceStoreError> {
        self.users
            .get(username)
            .copied()
            .ok_or_else(|| PreferenceStoreError::user_not_found(username.as_ref()))
    }
}

/// In-memory store for tests and for running without a database.
///
/// Mirrors the relational adapter: users are registered up front and never
/// created by the port, records are unique per user.
#[derive(Debug, Default)]
pub struct FixturePreferenceStore {
    state: Mutex<FixtureState>,
}

impl FixturePreferenceStore {
    /// Create an empty store with no users.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given users registered.
    pub fn with_users<I>(usernames: I) -> Self
    where
        I: IntoIterator<Item = Username>,
    {
        let store = Self::new();
        for username in usernames {
            store.add_user(username);
        }
        store
    }

    /// Register a user, returning its identifier. Re-registering is a no-op.
    pub fn add_user(&self, username: Username) -> UserId {
        *self
            .lock()
            .users
            .entry(username)
            .or_insert_with(UserId::random)
    }

    /// Raw stored text for a user, if a record exists.
    pub fn stored_text(&self, username: &Username) -> Option<String> {
        let state = self.lock();
        let user_id = state.users.get(username)?;
        state
            .records
            .get(user_id)
            .and_then(|record| record.preferences.clone())
    }

    /// Write raw text for a user, bypassing the port. Used to seed corrupt or
    /// legacy documents.
    pub fn seed_text(
        &self,
        username: &Username,
        preferences: Option<&str>,
    ) -> Result<(), PreferenceStoreError> {
        let mut state = self.lock();
        let user_id = state.user_id(username)?;
        state.records.insert(
            user_id,
            PreferenceRecord {
                id: Uuid::new_v4(),
                user_id,
                preferences: preferences.map(str::to_owned),
            },
        );
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, FixtureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PreferenceStore for FixturePreferenceStore {
    async fn is_user(&self, username: &Username) -> Result<bool, PreferenceStoreError> {
        Ok(self.lock().users.contains_key(username))
    }

    async fn has_preferences(&self, username: &Username) -> Result<bool, PreferenceStoreError> {
        Ok(self
            .stored_text(username)
            .is_some_and(|text| !text.is_empty()))
    }

    async fn get_preferences(
        &self,
        username: &Username,
    ) -> Result<Vec<PreferenceRecord>, PreferenceStoreError> {
        let state = self.lock();
        let Some(user_id) = state.users.get(username) else {
            return Ok(Vec::new());
        };
        Ok(state.records.get(user_id).cloned().into_iter().collect())
    }

    async fn insert_preferences(
        &self,
        username: &Username,
        preferences: &str,
    ) -> Result<(), PreferenceStoreError> {
        let mut state = self.lock();
        let user_id = state.user_id(username)?;
        if state.records.contains_key(&user_id) {
            return Err(PreferenceStoreError::conflict(
                "preferences already exist for user",
            ));
        }
        state.records.insert(
            user_id,
            PreferenceRecord {
                id: Uuid::new_v4(),
                user_id,
                preferences: Some(preferences.to_owned()),
            },
        );
        Ok(())
    }

    async fn update_preferences(
        &self,
        username: &Username,
        preferences: &str,
    ) -> Result<(), PreferenceStoreError> {
        let mut state = self.lock();
        let user_id = state.user_id(username)?;
        if let Some(record) = state.records.get_mut(&user_id) {
            record.preferences = Some(preferences.to_owned());
        }
        Ok(())
    }

    async fn delete_preferences(&self, username: &Username) -> Result<(), PreferenceStoreError> {
        let mut state = self.lock();
        let user_id = state.user_id(username)?;
        state.records.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn username() -> Username {
        Username::new("test-user").expect("valid username")
    }

    #[fixture]
    fn store(username: Username) -> FixturePreferenceStore {
        FixturePreferenceStore::with_users([username])
    }

    #[rstest]
    #[tokio::test]
    async fn is_user_reports_registered_users(store: FixturePreferenceStore, username: Username) {
        assert!(store.is_user(&username).await.expect("lookup"));
        let stranger = Username::new("stranger").expect("valid username");
        assert!(!store.is_user(&stranger).await.expect("lookup"));
    }

    #[rstest]
    #[tokio::test]
    async fn insert_then_update_replaces_text(store: FixturePreferenceStore, username: Username) {
        store
            .insert_preferences(&username, r#"{"a":1}"#)
            .await
            .expect("insert");
        store
            .update_preferences(&username, r#"{"b":2}"#)
            .await
            .expect("update");

        let records = store.get_preferences(&username).await.expect("fetch");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].preferences.as_deref(), Some(r#"{"b":2}"#));
    }

    #[rstest]
    #[tokio::test]
    async fn second_insert_conflicts(store: FixturePreferenceStore, username: Username) {
        store.insert_preferences(&username, "{}").await.expect("insert");
        let err = store
            .insert_preferences(&username, "{}")
            .await
            .expect_err("duplicate insert");
        assert!(matches!(err, PreferenceStoreError::Conflict { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn update_without_record_matches_nothing(
        store: FixturePreferenceStore,
        username: Username,
    ) {
        store
            .update_preferences(&username, "{}")
            .await
            .expect("zero-row update is not an error");
        assert!(store.get_preferences(&username).await.expect("fetch").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn writes_for_unknown_users_fail(store: FixturePreferenceStore) {
        let stranger = Username::new("stranger").expect("valid username");

        let insert = store.insert_preferences(&stranger, "{}").await;
        let update = store.update_preferences(&stranger, "{}").await;
        let delete = store.delete_preferences(&stranger).await;

        for result in [insert, update, delete] {
            assert_eq!(result, Err(PreferenceStoreError::user_not_found("stranger")));
        }
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some(""), false)]
    #[case(Some("{}"), true)]
    #[tokio::test]
    async fn has_preferences_ignores_empty_text(
        store: FixturePreferenceStore,
        username: Username,
        #[case] text: Option<&str>,
        #[case] expected: bool,
    ) {
        store.seed_text(&username, text).expect("seed");
        assert_eq!(store.has_preferences(&username).await.expect("lookup"), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_is_idempotent(store: FixturePreferenceStore, username: Username) {
        store.insert_preferences(&username, "{}").await.expect("insert");
        store.delete_preferences(&username).await.expect("first delete");
        store.delete_preferences(&username).await.expect("second delete");
        assert!(!store.has_preferences(&username).await.expect("lookup"));
    }

    #[rstest]
    fn user_not_found_message_names_user() {
        let err = PreferenceStoreError::user_not_found("ghost");
        assert_eq!(err.to_string(), "user ghost does not exist");
    }
}
