//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the device store, the event broker, the credential backend). Each trait
//! exposes strongly typed errors so adapters map their failures into
//! predictable variants instead of returning `anyhow::Result`.
//!
//! Fixture implementations live here too; they back handler tests and let
//! the server run without PostgreSQL or Redis.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use thiserror::Error;
use tracing::debug;

use super::device::{AssociationCode, DeviceAssociated, DeviceId, DeviceName, Lampi};
use super::{Error as DomainError, LoginCredentials, UserId};

/// Errors surfaced by the device persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DevicePersistenceError {
    /// Store connectivity failures (pool checkout, broken connection).
    #[error("device store connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("device store query failed: {message}")]
    Query {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// An association write raced with another claimant.
    #[error("device {device_id} was claimed concurrently")]
    Conflict {
        /// The contested device id.
        device_id: String,
    },
}

impl DevicePersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for association races.
    pub fn conflict(device_id: impl Into<String>) -> Self {
        Self::Conflict {
            device_id: device_id.into(),
        }
    }
}

/// Errors surfaced by the association event publisher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// Broker is unreachable or the connection pool is exhausted.
    #[error("association broker is unavailable: {message}")]
    Unavailable {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// The broker refused the publish command.
    #[error("association event was rejected: {message}")]
    Rejected {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl PublishError {
    /// Helper for broker outages.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Helper for rejected publishes.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Persistence port for device records.
///
/// Every owner-facing query is scoped by the owning user in the adapter, so
/// a device another user claimed can never leak into a response.
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// List the devices owned by `owner`, oldest association first.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Lampi>, DevicePersistenceError>;

    /// Fetch one device matching `(id, owner)`, or `None`.
    async fn find_for_owner(
        &self,
        id: &DeviceId,
        owner: &UserId,
    ) -> Result<Option<Lampi>, DevicePersistenceError>;

    /// Resolve an association code to its device, claimed or not.
    async fn find_by_association_code(
        &self,
        code: &AssociationCode,
    ) -> Result<Option<Lampi>, DevicePersistenceError>;

    /// Persist the ownership stamp of an associated device.
    ///
    /// The write must be refused (with [`DevicePersistenceError::Conflict`])
    /// when the stored record already carries an owner.
    async fn record_association(&self, device: &Lampi) -> Result<(), DevicePersistenceError>;
}

/// Port publishing [`DeviceAssociated`] events to the device fleet.
#[async_trait]
pub trait AssociationPublisher: Send + Sync {
    /// Publish one association event.
    async fn publish(&self, event: &DeviceAssociated) -> Result<(), PublishError>;
}

/// Port authenticating login credentials.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, DomainError>;
}

/// Username accepted by the fixture login service.
pub const FIXTURE_USERNAME: &str = "admin";
/// Password accepted by the fixture login service.
pub const FIXTURE_PASSWORD: &str = "password";
/// User id issued by the fixture login service.
pub const FIXTURE_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

/// Fixture login accepting only the development credential pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, DomainError> {
        if credentials.username() != FIXTURE_USERNAME || credentials.password() != FIXTURE_PASSWORD
        {
            return Err(DomainError::unauthorized("invalid credentials"));
        }
        UserId::new(FIXTURE_USER_ID)
            .map_err(|err| DomainError::internal(format!("invalid fixture user id: {err}")))
    }
}

/// Id of the unclaimed fixture lamp.
pub const FIXTURE_UNCLAIMED_DEVICE_ID: &str = "b827eb08451e";
/// Id of the fixture lamp already owned by [`FIXTURE_USER_ID`].
pub const FIXTURE_CLAIMED_DEVICE_ID: &str = "b827ebf00dd1";

// Panics here would indicate broken compile-time constants; the fixture is
// only used in tests and credential-free development runs.
fn fixture_devices() -> Vec<Lampi> {
    let owner = UserId::new(FIXTURE_USER_ID).expect("fixture user id");
    let claimed_at = Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).single();
    vec![
        Lampi::unassociated(
            DeviceId::new(FIXTURE_UNCLAIMED_DEVICE_ID).expect("fixture device id"),
            DeviceName::new("Workbench").expect("fixture device name"),
        ),
        Lampi::from_parts(
            DeviceId::new(FIXTURE_CLAIMED_DEVICE_ID).expect("fixture device id"),
            DeviceName::new("Living Room").expect("fixture device name"),
            Some(owner),
            claimed_at,
        ),
    ]
}

/// In-memory device store seeded with two fixture lamps.
///
/// One lamp is unclaimed (its association code derives from
/// [`FIXTURE_UNCLAIMED_DEVICE_ID`]); the other belongs to the fixture user.
#[derive(Debug)]
pub struct FixtureDeviceRepository {
    devices: Mutex<Vec<Lampi>>,
}

impl FixtureDeviceRepository {
    /// Seed the store with the standard fixture lamps.
    #[must_use]
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(fixture_devices()),
        }
    }

    /// Seed the store with caller-provided records.
    #[must_use]
    pub fn with_devices(devices: Vec<Lampi>) -> Self {
        Self {
            devices: Mutex::new(devices),
        }
    }

    fn snapshot(&self) -> Result<Vec<Lampi>, DevicePersistenceError> {
        self.devices
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| DevicePersistenceError::query("fixture store poisoned"))
    }
}

impl Default for FixtureDeviceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceRepository for FixtureDeviceRepository {
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Lampi>, DevicePersistenceError> {
        let mut owned: Vec<Lampi> = self
            .snapshot()?
            .into_iter()
            .filter(|device| device.owner() == Some(owner))
            .collect();
        owned.sort_by_key(Lampi::associated_at);
        Ok(owned)
    }

    async fn find_for_owner(
        &self,
        id: &DeviceId,
        owner: &UserId,
    ) -> Result<Option<Lampi>, DevicePersistenceError> {
        Ok(self
            .snapshot()?
            .into_iter()
            .find(|device| device.id() == id && device.owner() == Some(owner)))
    }

    async fn find_by_association_code(
        &self,
        code: &AssociationCode,
    ) -> Result<Option<Lampi>, DevicePersistenceError> {
        Ok(self
            .snapshot()?
            .into_iter()
            .find(|device| AssociationCode::derive(device.id()) == *code))
    }

    async fn record_association(&self, device: &Lampi) -> Result<(), DevicePersistenceError> {
        let mut guard = self
            .devices
            .lock()
            .map_err(|_| DevicePersistenceError::query("fixture store poisoned"))?;
        let Some(stored) = guard.iter_mut().find(|stored| stored.id() == device.id()) else {
            return Err(DevicePersistenceError::query(format!(
                "unknown device {}",
                device.id()
            )));
        };
        if stored.is_associated() {
            return Err(DevicePersistenceError::conflict(device.id().as_str()));
        }
        *stored = device.clone();
        Ok(())
    }
}

/// Publisher that drops events, for tests and broker-less development runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureAssociationPublisher;

#[async_trait]
impl AssociationPublisher for FixtureAssociationPublisher {
    async fn publish(&self, event: &DeviceAssociated) -> Result<(), PublishError> {
        debug!(device_id = %event.device_id, user_id = %event.user_id, "dropping association event (fixture publisher)");
        Ok(())
    }
}
