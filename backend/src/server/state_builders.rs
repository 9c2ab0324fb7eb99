//! Builders selecting real or fixture ports for the HTTP state.

use std::sync::Arc;

use actix_web::web;

use lampi_web::domain::ports::{
    AssociationPublisher, DeviceRepository, FixtureAssociationPublisher, FixtureDeviceRepository,
    FixtureLoginService, LoginService,
};
use lampi_web::inbound::http::state::{HttpState, HttpStatePorts};
use lampi_web::outbound::persistence::{DbPool, DieselDeviceRepository, DieselLoginService};

use super::ServerConfig;

fn build_login_service(pool: &Option<DbPool>) -> Arc<dyn LoginService> {
    match pool {
        Some(pool) => Arc::new(DieselLoginService::new(pool.clone())),
        None => Arc::new(FixtureLoginService),
    }
}

fn build_device_repository(pool: &Option<DbPool>) -> Arc<dyn DeviceRepository> {
    match pool {
        Some(pool) => Arc::new(DieselDeviceRepository::new(pool.clone())),
        None => Arc::new(FixtureDeviceRepository::new()),
    }
}

/// Build the shared HTTP state from configured ports and fixture fallbacks.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let publisher: Arc<dyn AssociationPublisher> = match &config.publisher {
        Some(publisher) => publisher.clone(),
        None => Arc::new(FixtureAssociationPublisher),
    };

    web::Data::new(HttpState::new(HttpStatePorts {
        login: build_login_service(&config.db_pool),
        devices: build_device_repository(&config.db_pool),
        publisher,
    }))
}
