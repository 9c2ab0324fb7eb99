//! Dashboard view.

use actix_web::web;
use serde_json::json;

use crate::inbound::http::session::Authenticated;

/// Static dashboard descriptor.
///
/// The dashboard fetches nothing itself; clients hydrate the named panels
/// from the device list endpoint.
#[utoipa::path(
    get,
    path = "/lampi/dashboard",
    responses(
        (status = 200, description = "Dashboard descriptor"),
        (status = 303, description = "No session; redirect to the login flow")
    ),
    tags = ["lampi"],
    operation_id = "dashboard"
)]
#[actix_web::get("/lampi/dashboard")]
pub async fn dashboard(_auth: Authenticated) -> web::Json<serde_json::Value> {
    web::Json(json!({
        "title": "Lampi dashboard",
        "panels": [
            { "name": "devices", "source": "/lampi" }
        ]
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::{test as actix_test, web, App};
    use serde_json::Value;

    use super::*;
    use crate::inbound::http::state::HttpState;
    use crate::inbound::http::test_utils::test_session_middleware;
    use crate::inbound::http::users::{login, LoginRequest};

    #[actix_web::test]
    async fn dashboard_requires_a_session() {
        let app = actix_test::init_service(
            App::new().wrap(test_session_middleware()).service(dashboard),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/lampi/dashboard")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/login")
        );
    }

    #[actix_web::test]
    async fn dashboard_lists_its_panels() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::fixture()))
                .wrap(test_session_middleware())
                .service(login)
                .service(dashboard),
        )
        .await;

        let login_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/login")
                .set_json(&LoginRequest {
                    username: "admin".into(),
                    password: "password".into(),
                })
                .to_request(),
        )
        .await;
        let cookie = login_res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie")
            .into_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/lampi/dashboard")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value: Value = actix_test::read_body_json(res).await;
        assert_eq!(value["panels"][0]["source"], Value::from("/lampi"));
    }
}
