//! HTTP inbound adapter exposing the Lampi web surface.

pub mod dashboard;
pub mod devices;
pub mod error;
pub mod health;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
