//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation. Regenerate with
//! `diesel print-schema` when migrations change.

diesel::table! {
    /// User accounts table.
    ///
    /// The `id` column is the primary key (UUID v4).
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Human-readable display name (max 32 characters).
        display_name -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Lampi device records.
    ///
    /// Devices are provisioned at the factory; `owner_id` and
    /// `associated_at` stay NULL until a user claims the lamp, and are
    /// always written together.
    lampi_devices (id) {
        /// Primary key: factory device id, 12 lowercase hex characters.
        id -> Varchar,
        /// Human label shown in listings (max 64 characters).
        name -> Varchar,
        /// Claim code printed on the lamp, 6 lowercase hex characters.
        association_code -> Varchar,
        /// Owning user; NULL until the lamp is claimed.
        owner_id -> Nullable<Uuid>,
        /// Claim timestamp; NULL until the lamp is claimed.
        associated_at -> Nullable<Timestamptz>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(lampi_devices -> users (owner_id));

diesel::allow_tables_to_appear_in_same_query!(lampi_devices, users);
