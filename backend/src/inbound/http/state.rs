//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AssociationPublisher, DeviceRepository, FixtureAssociationPublisher, FixtureDeviceRepository,
    FixtureLoginService, LoginService,
};
use crate::domain::AssociationService;

/// Parameter object bundling the port implementations handlers need.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Credential backend for `POST /login`.
    pub login: Arc<dyn LoginService>,
    /// Device store queried by the list and detail views.
    pub devices: Arc<dyn DeviceRepository>,
    /// Broker the association workflow publishes events to.
    pub publisher: Arc<dyn AssociationPublisher>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential backend for `POST /login`.
    pub login: Arc<dyn LoginService>,
    /// Device store queried by the list and detail views.
    pub devices: Arc<dyn DeviceRepository>,
    /// The device-association workflow.
    pub association: AssociationService,
}

impl HttpState {
    /// Construct state from a ports bundle; the association service is wired
    /// over the same repository and publisher.
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            devices,
            publisher,
        } = ports;
        let association = AssociationService::new(devices.clone(), publisher);
        Self {
            login,
            devices,
            association,
        }
    }

    /// State wired entirely from fixtures, for tests and broker-less runs.
    #[must_use]
    pub fn fixture() -> Self {
        Self::new(HttpStatePorts {
            login: Arc::new(FixtureLoginService),
            devices: Arc::new(FixtureDeviceRepository::new()),
            publisher: Arc::new(FixtureAssociationPublisher),
        })
    }
}
