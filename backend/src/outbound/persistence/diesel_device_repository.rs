//! PostgreSQL-backed `DeviceRepository` implementation using Diesel.
//!
//! Owner scoping happens in SQL: every read filters on `owner_id`, and the
//! association write carries an `owner_id IS NULL` guard so two claimants
//! racing for the same lamp cannot both win.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{DevicePersistenceError, DeviceRepository};
use crate::domain::{AssociationCode, DeviceId, DeviceName, Lampi, UserId};

use super::models::{LampiAssociationUpdate, LampiRow};
use super::pool::{DbPool, PoolError};
use super::schema::lampi_devices;

/// Diesel-backed implementation of the `DeviceRepository` port.
#[derive(Clone)]
pub struct DieselDeviceRepository {
    pool: DbPool,
}

impl DieselDeviceRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DevicePersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DevicePersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> DevicePersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DevicePersistenceError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => {
            DevicePersistenceError::query("database query error")
        }
        _ => DevicePersistenceError::query("database error"),
    }
}

/// Convert a database row to a domain device record.
///
/// Rows violating the domain invariants (a malformed id, a blank name) only
/// appear when the migrations and the validation rules have drifted apart;
/// they surface as query errors rather than panics.
fn row_to_device(row: LampiRow) -> Result<Lampi, DevicePersistenceError> {
    let id = DeviceId::new(&row.id)
        .map_err(|err| DevicePersistenceError::query(format!("corrupt device row: {err}")))?;
    let name = DeviceName::new(row.name)
        .map_err(|err| DevicePersistenceError::query(format!("corrupt device row: {err}")))?;
    let owner = row.owner_id.map(UserId::from);
    Ok(Lampi::from_parts(id, name, owner, row.associated_at))
}

#[async_trait]
impl DeviceRepository for DieselDeviceRepository {
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Lampi>, DevicePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = lampi_devices::table
            .filter(lampi_devices::owner_id.eq(*owner.as_uuid()))
            .order(lampi_devices::associated_at.asc())
            .select(LampiRow::as_select())
            .load::<LampiRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_device).collect()
    }

    async fn find_for_owner(
        &self,
        id: &DeviceId,
        owner: &UserId,
    ) -> Result<Option<Lampi>, DevicePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = lampi_devices::table
            .filter(lampi_devices::id.eq(id.as_str()))
            .filter(lampi_devices::owner_id.eq(*owner.as_uuid()))
            .select(LampiRow::as_select())
            .first::<LampiRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_device).transpose()
    }

    async fn find_by_association_code(
        &self,
        code: &AssociationCode,
    ) -> Result<Option<Lampi>, DevicePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = lampi_devices::table
            .filter(lampi_devices::association_code.eq(code.as_str()))
            .select(LampiRow::as_select())
            .first::<LampiRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_device).transpose()
    }

    async fn record_association(&self, device: &Lampi) -> Result<(), DevicePersistenceError> {
        let owner = device.owner().ok_or_else(|| {
            DevicePersistenceError::query("cannot record an association without an owner")
        })?;
        let associated_at = device.associated_at().ok_or_else(|| {
            DevicePersistenceError::query("cannot record an association without a timestamp")
        })?;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            lampi_devices::table
                .filter(lampi_devices::id.eq(device.id().as_str()))
                .filter(lampi_devices::owner_id.is_null()),
        )
        .set(LampiAssociationUpdate {
            owner_id: *owner.as_uuid(),
            associated_at,
        })
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if updated == 1 {
            return Ok(());
        }

        // The guarded update touched nothing: either the lamp does not exist
        // or another claimant got there first.
        let exists = lampi_devices::table
            .filter(lampi_devices::id.eq(device.id().as_str()))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if exists == 0 {
            Err(DevicePersistenceError::query(format!(
                "unknown device {}",
                device.id()
            )))
        } else {
            Err(DevicePersistenceError::conflict(device.id().as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    fn row(id: &str, name: &str, owner_id: Option<Uuid>) -> LampiRow {
        LampiRow {
            id: id.to_owned(),
            name: name.to_owned(),
            association_code: "9a1b2c".to_owned(),
            owner_id,
            associated_at: owner_id.map(|_| Utc::now()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_to_device_maps_claimed_rows() {
        let owner = Uuid::new_v4();
        let device = row_to_device(row("b827eb08451e", "Living Room", Some(owner)))
            .expect("valid row converts");
        assert_eq!(device.id().as_str(), "b827eb08451e");
        assert_eq!(device.owner().map(|o| *o.as_uuid()), Some(owner));
        assert!(device.is_associated());
    }

    #[test]
    fn row_to_device_maps_unclaimed_rows() {
        let device =
            row_to_device(row("b827eb08451e", "Workbench", None)).expect("valid row converts");
        assert!(!device.is_associated());
        assert!(device.associated_at().is_none());
    }

    #[rstest]
    #[case("not-a-mac", "Workbench")]
    #[case("b827eb08451e", "")]
    fn row_to_device_rejects_corrupt_rows(#[case] id: &str, #[case] name: &str) {
        let err = row_to_device(row(id, name, None)).expect_err("corrupt row must fail");
        assert!(matches!(err, DevicePersistenceError::Query { .. }));
    }
}
