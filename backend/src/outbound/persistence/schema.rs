//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation. Regenerate with `diesel print-schema`
//! after changing migrations.
//!
//! The meetup location is stored as plain `latitude`/`longitude` doubles;
//! spatial ranking builds PostGIS points from them on the fly (see the geo
//! index adapter), so no custom geometry SQL type is needed here.

diesel::table! {
    /// Registered users. Credentials live in the external identity
    /// provider; this table only carries the profile slice listings need.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name shown in attendee and comment listings.
        display_name -> Varchar,
        /// Avatar image reference.
        avatar -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Browsing categories, maintained out of band.
    categories (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// URL slug, unique.
        slug -> Varchar,
    }
}

diesel::table! {
    /// Interest groups hosting meetups.
    groups (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        owner_user_id -> Uuid,
        /// Category the group is listed under.
        category_id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Description shown on the group page.
        description -> Text,
        /// External website.
        url -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Scheduled events. `interested` is a UUID array with set semantics,
    /// mutated only through single-statement conditional updates.
    meetups (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Hosting group.
        group_id -> Uuid,
        /// Owner of the hosting group, denormalised for owner-scoped writes.
        owner_user_id -> Uuid,
        /// Event title.
        title -> Varchar,
        /// Featured guest.
        guest -> Nullable<Varchar>,
        /// Event description.
        description -> Text,
        /// Latitude in degrees.
        latitude -> Float8,
        /// Longitude in degrees.
        longitude -> Float8,
        /// Street address.
        address -> Varchar,
        /// City.
        city -> Varchar,
        /// State or region.
        state -> Varchar,
        /// Country.
        country -> Varchar,
        /// Maximum attendee count; 0 means unlimited.
        capacity -> Int4,
        /// Scheduled date and time.
        scheduled_at -> Timestamptz,
        /// Confirmed attendees (no duplicates).
        interested -> Array<Uuid>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments on meetup pages, removed with their meetup.
    comments (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Meetup the comment belongs to.
        meetup_id -> Uuid,
        /// Author.
        user_id -> Uuid,
        /// Comment text.
        body -> Text,
        /// Creation timestamp; listings order newest first.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(groups -> categories (category_id));
diesel::joinable!(meetups -> groups (group_id));
diesel::joinable!(comments -> meetups (meetup_id));
diesel::joinable!(comments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, categories, groups, meetups, comments);
