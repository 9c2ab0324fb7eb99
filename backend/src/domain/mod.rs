//! Domain primitives, aggregates, and ports.
//!
//! Types here are transport agnostic: HTTP handlers and persistence
//! adapters depend on this module, never the other way around. Each type
//! documents its invariants and serde contract in its own Rustdoc.

mod association;
pub mod auth;
pub mod device;
mod error;
pub mod ports;
mod trace_id;
pub mod user;

pub use self::association::{AssociationError, AssociationService};
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::device::{
    AssociationCode, DeviceAssociated, DeviceId, DeviceName, DeviceValidationError, Lampi,
};
pub use self::error::{Error, ErrorCode};
pub use self::trace_id::{TraceId, TRACE_ID_HEADER};
pub use self::user::{DisplayName, User, UserId, UserValidationError};

/// Convenient result alias for code returning the domain [`Error`].
pub type ApiResult<T> = Result<T, Error>;
