//! Diesel table definitions for the preference schema.
//!
//! The service reads `users` and owns `user_preferences`. Both must match
//! `backend/sql/schema.sql`; the service never creates or migrates them.

diesel::table! {
    /// Registered users. Managed outside this service.
    users (id) {
        /// Primary key.
        id -> Uuid,
        /// External identity used in request paths.
        username -> Text,
    }
}

diesel::table! {
    /// One preference document per user.
    user_preferences (id) {
        /// Primary key, assigned by the database.
        id -> Uuid,
        /// Owning user; unique.
        user_id -> Uuid,
        /// JSON document text.
        preferences -> Nullable<Text>,
    }
}

diesel::joinable!(user_preferences -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, user_preferences);
