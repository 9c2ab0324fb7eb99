//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the web surface:
//! session endpoints, the device views, the dashboard, and health probes.
//! The generated specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Lampi, User};
use crate::inbound::http::devices::AddDeviceRequest;
use crate::inbound::http::users::LoginRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /login.",
            ))),
        );
    }
}

/// OpenAPI document for the Lampi web surface.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Lampi web API",
        description = "Session-authenticated access to a user's connected lamps."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::devices::list_devices,
        crate::inbound::http::devices::device_detail,
        crate::inbound::http::devices::add_device_form,
        crate::inbound::http::devices::add_device,
        crate::inbound::http::dashboard::dashboard,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Lampi, User, Error, ErrorCode, LoginRequest, AddDeviceRequest)),
    tags(
        (name = "auth", description = "Session establishment and teardown"),
        (name = "lampi", description = "Device listing, detail, and association"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
