//! Redis-backed `AssociationPublisher` implementation.
//!
//! Association events are serialised as JSON and PUBLISHed on
//! [`ASSOCIATION_CHANNEL`]; the device fleet side subscribes to the channel
//! and pushes the new ownership down to the lamp.

use async_trait::async_trait;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::RedisConnectionManager;
use tracing::debug;

use crate::domain::ports::{AssociationPublisher, PublishError};
use crate::domain::DeviceAssociated;

/// Channel association events are published on.
pub const ASSOCIATION_CHANNEL: &str = "lampi/associated";

/// Publisher broadcasting association events over Redis pub/sub.
#[derive(Clone, Debug)]
pub struct RedisAssociationPublisher {
    pool: Pool<RedisConnectionManager>,
}

impl RedisAssociationPublisher {
    /// Connect to the broker at `url`.
    ///
    /// Connections are established lazily; a wrong host only surfaces when
    /// the first event is published.
    ///
    /// # Errors
    /// Returns [`PublishError::Unavailable`] when the URL cannot be parsed
    /// or the pool cannot be built.
    pub async fn connect(url: &str) -> Result<Self, PublishError> {
        let manager = RedisConnectionManager::new(url)
            .map_err(|err| PublishError::unavailable(err.to_string()))?;
        let pool = Pool::builder()
            .build(manager)
            .await
            .map_err(|err| PublishError::unavailable(err.to_string()))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl AssociationPublisher for RedisAssociationPublisher {
    async fn publish(&self, event: &DeviceAssociated) -> Result<(), PublishError> {
        let payload = serde_json::to_string(event)
            .map_err(|err| PublishError::rejected(format!("failed to encode event: {err}")))?;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| PublishError::unavailable(err.to_string()))?;

        let receivers: i64 = conn
            .publish(ASSOCIATION_CHANNEL, payload.as_str())
            .await
            .map_err(|err| PublishError::rejected(err.to_string()))?;

        debug!(
            device_id = %event.device_id,
            receivers,
            "published association event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_rejects_malformed_urls() {
        let err = RedisAssociationPublisher::connect("not a url")
            .await
            .expect_err("malformed url must fail");
        assert!(matches!(err, PublishError::Unavailable { .. }));
    }
}
