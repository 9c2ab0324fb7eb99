//! Lampi device views.
//!
//! ```text
//! GET  /lampi              owned devices, oldest association first
//! GET  /lampi/add          add-device form descriptor
//! POST /lampi/add          claim a device by association code
//! GET  /lampi/{device_id}  one owned device
//! ```
//!
//! All routes are login-gated via [`Authenticated`]; see the session module
//! for the redirect contract. `add` and `dashboard` are literal segments, so
//! the server registers them before the `{device_id}` route.

use actix_web::http::header;
use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{DevicePersistenceError, PublishError};
use crate::domain::{AssociationCode, AssociationError, DeviceId, Error, Lampi};
use crate::inbound::http::session::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Add-device form body for `POST /lampi/add`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddDeviceRequest {
    /// The short code printed on the lamp.
    #[schema(example = "9a1b2c")]
    pub association_code: String,
}

fn map_persistence_error(err: DevicePersistenceError) -> Error {
    match err {
        DevicePersistenceError::Connection { message } => Error::service_unavailable(message),
        DevicePersistenceError::Query { message } => Error::internal(message),
        DevicePersistenceError::Conflict { device_id } => {
            Error::conflict(format!("device {device_id} was claimed concurrently"))
        }
    }
}

fn map_association_error(err: AssociationError) -> Error {
    match err {
        AssociationError::UnknownCode => {
            Error::invalid_request("no device matches this association code")
                .with_details(json!({ "field": "associationCode", "code": "unknown_code" }))
        }
        AssociationError::AlreadyAssociated => {
            Error::invalid_request("this device is already associated with an account")
                .with_details(json!({ "field": "associationCode", "code": "already_associated" }))
        }
        AssociationError::Persistence(inner) => map_persistence_error(inner),
        AssociationError::Publish(PublishError::Unavailable { message }) => {
            Error::service_unavailable(message)
        }
        AssociationError::Publish(PublishError::Rejected { message }) => Error::internal(message),
    }
}

/// List the requesting user's devices.
#[utoipa::path(
    get,
    path = "/lampi",
    responses(
        (status = 200, description = "Owned devices", body = [Lampi]),
        (status = 303, description = "No session; redirect to the login flow"),
        (status = 503, description = "Device store unavailable", body = Error)
    ),
    tags = ["lampi"],
    operation_id = "listDevices"
)]
#[get("/lampi")]
pub async fn list_devices(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<web::Json<Vec<Lampi>>> {
    let devices = state
        .devices
        .list_for_owner(auth.user_id())
        .await
        .map_err(map_persistence_error)?;
    debug!(user_id = %auth.user_id(), count = devices.len(), "listing devices");
    Ok(web::Json(devices))
}

/// Show one owned device.
///
/// A malformed id cannot name an owned device, so it yields the same 404 as
/// an unknown or foreign one.
#[utoipa::path(
    get,
    path = "/lampi/{device_id}",
    params(
        ("device_id" = String, Path, description = "Factory device id (12 hex characters)")
    ),
    responses(
        (status = 200, description = "The device", body = Lampi),
        (status = 303, description = "No session; redirect to the login flow"),
        (status = 404, description = "No such device for this user", body = Error),
        (status = 503, description = "Device store unavailable", body = Error)
    ),
    tags = ["lampi"],
    operation_id = "deviceDetail"
)]
#[get("/lampi/{device_id}")]
pub async fn device_detail(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Lampi>> {
    let raw = path.into_inner();
    let device_id = DeviceId::new(&raw).map_err(|_| Error::not_found("no such device"))?;
    let device = state
        .devices
        .find_for_owner(&device_id, auth.user_id())
        .await
        .map_err(map_persistence_error)?
        .ok_or_else(|| Error::not_found("no such device"))?;
    Ok(web::Json(device))
}

/// Describe the add-device form so clients can render it.
#[utoipa::path(
    get,
    path = "/lampi/add",
    responses(
        (status = 200, description = "Form descriptor"),
        (status = 303, description = "No session; redirect to the login flow")
    ),
    tags = ["lampi"],
    operation_id = "addDeviceForm"
)]
#[get("/lampi/add")]
pub async fn add_device_form(_auth: Authenticated) -> web::Json<serde_json::Value> {
    web::Json(json!({
        "action": "/lampi/add",
        "fields": [
            {
                "name": "associationCode",
                "label": "Association code",
                "required": true,
                "pattern": "^[0-9a-fA-F]{6}$"
            }
        ]
    }))
}

/// Claim a device for the requesting user.
///
/// On success exactly one association event has been published and the
/// client is redirected to the device list.
#[utoipa::path(
    post,
    path = "/lampi/add",
    request_body = AddDeviceRequest,
    responses(
        (status = 303, description = "Device associated; redirect to /lampi"),
        (status = 400, description = "Invalid or unclaimable association code", body = Error),
        (status = 503, description = "Device store or broker unavailable", body = Error)
    ),
    tags = ["lampi"],
    operation_id = "addDevice"
)]
#[post("/lampi/add")]
pub async fn add_device(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: web::Json<AddDeviceRequest>,
) -> ApiResult<HttpResponse> {
    let code = AssociationCode::new(&payload.association_code).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "associationCode", "code": "malformed_code" }))
    })?;

    let device = state
        .association
        .associate(&code, auth.user_id())
        .await
        .map_err(map_association_error)?;
    debug!(device_id = %device.id(), "device associated; redirecting to list");

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/lampi"))
        .finish())
}
