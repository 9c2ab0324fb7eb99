//! PostgreSQL persistence adapters built on Diesel.

pub mod diesel_device_repository;
pub mod diesel_login_service;
pub(crate) mod models;
pub mod pool;
pub mod schema;

pub use diesel_device_repository::DieselDeviceRepository;
pub use diesel_login_service::DieselLoginService;
pub use pool::{DbPool, PoolConfig, PoolError};
