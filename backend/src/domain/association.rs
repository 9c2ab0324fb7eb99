//! The device-association workflow.
//!
//! Claiming a lamp resolves the submitted association code to an unclaimed
//! device, stamps ownership, persists the stamp, and then publishes one
//! `DeviceAssociated` event for the fleet side. The event is advisory: it is
//! published after the ownership write commits and a broker failure does not
//! roll the write back.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::device::{AssociationCode, Lampi};
use super::ports::{
    AssociationPublisher, DevicePersistenceError, DeviceRepository, PublishError,
};
use super::UserId;

/// Failures of the association workflow, ordered from user error to outage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssociationError {
    /// No device carries the submitted code.
    #[error("no device matches this association code")]
    UnknownCode,
    /// The device was already claimed (possibly concurrently).
    #[error("this device is already associated with an account")]
    AlreadyAssociated,
    /// The device store failed.
    #[error(transparent)]
    Persistence(DevicePersistenceError),
    /// The ownership write committed but the event could not be published.
    #[error(transparent)]
    Publish(PublishError),
}

impl From<DevicePersistenceError> for AssociationError {
    fn from(err: DevicePersistenceError) -> Self {
        match err {
            DevicePersistenceError::Conflict { .. } => Self::AlreadyAssociated,
            other => Self::Persistence(other),
        }
    }
}

/// Associates devices with users and publishes the resulting events.
#[derive(Clone)]
pub struct AssociationService {
    devices: Arc<dyn DeviceRepository>,
    publisher: Arc<dyn AssociationPublisher>,
}

impl AssociationService {
    /// Build the service over its two driven ports.
    #[must_use]
    pub fn new(devices: Arc<dyn DeviceRepository>, publisher: Arc<dyn AssociationPublisher>) -> Self {
        Self { devices, publisher }
    }

    /// Claim the device identified by `code` for `user`.
    ///
    /// On success the updated record is returned and exactly one event has
    /// been published.
    ///
    /// # Errors
    /// - [`AssociationError::UnknownCode`] when no device carries the code.
    /// - [`AssociationError::AlreadyAssociated`] when the device has an
    ///   owner, detected up front or as a write race.
    /// - [`AssociationError::Persistence`] / [`AssociationError::Publish`]
    ///   for adapter failures. A publish failure leaves the ownership write
    ///   in place.
    pub async fn associate(
        &self,
        code: &AssociationCode,
        user: &UserId,
    ) -> Result<Lampi, AssociationError> {
        let Some(mut device) = self.devices.find_by_association_code(code).await? else {
            return Err(AssociationError::UnknownCode);
        };

        let event = device
            .associate(user.clone(), Utc::now())
            .map_err(|_| AssociationError::AlreadyAssociated)?;

        self.devices.record_association(&device).await?;

        self.publisher
            .publish(&event)
            .await
            .map_err(AssociationError::Publish)?;

        info!(
            device_id = %event.device_id,
            user_id = %event.user_id,
            "device associated"
        );
        Ok(device)
    }
}
