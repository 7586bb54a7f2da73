//! Internal Diesel row structs for preference storage.
//!
//! These types never leave the persistence layer.

use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{PreferenceRecord, UserId};

use super::schema::user_preferences;

/// Row read from `user_preferences`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_preferences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PreferenceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub preferences: Option<String>,
}

impl From<PreferenceRow> for PreferenceRecord {
    fn from(row: PreferenceRow) -> Self {
        Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            preferences: row.preferences,
        }
    }
}

/// Insertable preference record; `id` is left to the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_preferences)]
pub(crate) struct NewPreferenceRow<'a> {
    pub user_id: Uuid,
    pub preferences: &'a str,
}

/// Changeset replacing the stored document text.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = user_preferences)]
pub(crate) struct PreferenceUpdate<'a> {
    pub preferences: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(r#"{"one":"two"}"#.to_owned()))]
    fn row_converts_to_record(#[case] preferences: Option<String>) {
        let row = PreferenceRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            preferences: preferences.clone(),
        };
        let (id, user_id) = (row.id, row.user_id);

        let record = PreferenceRecord::from(row);

        assert_eq!(record.id, id);
        assert_eq!(record.user_id, UserId::from_uuid(user_id));
        assert_eq!(record.preferences, preferences);
    }
}
