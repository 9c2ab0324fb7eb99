//! Event publishing adapters.

pub mod redis_publisher;

pub use redis_publisher::{RedisAssociationPublisher, ASSOCIATION_CHANNEL};
