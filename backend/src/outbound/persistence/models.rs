//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{lampi_devices, users};

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
}

/// Row struct for reading from the lampi_devices table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lampi_devices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LampiRow {
    pub id: String,
    pub name: String,
    #[expect(dead_code, reason = "schema field used only as a query filter")]
    pub association_code: String,
    pub owner_id: Option<Uuid>,
    pub associated_at: Option<DateTime<Utc>>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub created_at: DateTime<Utc>,
}

/// Changeset stamping ownership onto a device record.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = lampi_devices)]
pub(crate) struct LampiAssociationUpdate {
    pub owner_id: Uuid,
    pub associated_at: DateTime<Utc>,
}
