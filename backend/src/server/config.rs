//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use lampi_web::domain::ports::AssociationPublisher;
use lampi_web::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) publisher: Option<Arc<dyn AssociationPublisher>>,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            publisher: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one the server runs on the in-memory fixture store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach an association event publisher.
    ///
    /// Without one association events are dropped, which is only suitable
    /// for development runs.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn AssociationPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }
}
