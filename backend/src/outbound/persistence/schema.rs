//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts and their profile fields.
    users (id) {
        id -> Uuid,
        /// Lowercased login email; unique.
        email -> Varchar,
        password_hash -> Text,
        nickname -> Nullable<Varchar>,
        avatar_url -> Nullable<Text>,
        cover_url -> Nullable<Text>,
        bio -> Nullable<Varchar>,
        /// Serialised `SocialLinks` object.
        social_links -> Jsonb,
        sticker -> Nullable<Varchar>,
        created_at -> Timestamptz,
        /// Maintained by the `users_touch_updated_at` trigger.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Friendships, one row per direction.
    friendships (user_id, friend_id) {
        user_id -> Uuid,
        friend_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Pending friend requests.
    friend_requests (from_user_id, to_user_id) {
        from_user_id -> Uuid,
        to_user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-title list entries keyed by user and catalog id.
    anime_list_entries (user_id, title_id) {
        user_id -> Uuid,
        title_id -> Varchar,
        status -> Varchar,
        title -> Nullable<Text>,
        poster_url -> Nullable<Text>,
        episodes_total -> Nullable<Int4>,
        last_watched_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only log of watched episodes.
    watch_history (id) {
        id -> Int8,
        user_id -> Uuid,
        title_id -> Varchar,
        title -> Nullable<Text>,
        episode -> Int4,
        watched_at -> Timestamptz,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        recipient_id -> Uuid,
        kind -> Varchar,
        actor_id -> Nullable<Uuid>,
        read -> Bool,
        message -> Text,
        resolution -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(anime_list_entries -> users (user_id));
diesel::joinable!(watch_history -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    anime_list_entries,
    friend_requests,
    friendships,
    notifications,
    users,
    watch_history,
);
