//! Session helpers keeping HTTP handlers free of framework-specific logic.
//!
//! [`SessionContext`] wraps the Actix session for login/logout handlers.
//! [`Authenticated`] is the extractor the device views use: it yields the
//! session's user id, or answers `303 See Other` to the login flow so an
//! unauthenticated browser never sees the underlying content.

use actix_session::Session;
use actix_web::http::header;
use actix_web::{dev::Payload, FromRequest, HttpRequest, HttpResponse, ResponseError};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Path of the login flow unauthenticated requests are sent to.
pub const LOGIN_PATH: &str = "/login";

/// Newtype wrapper exposing higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    ///
    /// # Errors
    /// Returns an internal error when the session store rejects the write.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop all session state, ending the login.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Fetch the current user id from the session, if present.
    ///
    /// A tampered or stale id is treated as an anonymous session rather than
    /// an error.
    ///
    /// # Errors
    /// Returns an internal error when the session store cannot be read.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match raw {
            Some(value) => match UserId::new(&value) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Rejection issued when a login-gated view is hit without a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("login required")]
pub struct LoginRequired;

impl ResponseError for LoginRequired {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((header::LOCATION, LOGIN_PATH))
            .finish()
    }
}

/// Extractor yielding the authenticated user id for login-gated views.
///
/// Mirrors the classic `LoginRequiredMixin` contract: no session, no
/// content, only a redirect to [`LOGIN_PATH`].
#[derive(Debug, Clone)]
pub struct Authenticated(pub UserId);

impl Authenticated {
    /// The authenticated user's id.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let session = fut.await?;
            match session.user_id() {
                Ok(Some(id)) => Ok(Authenticated(id)),
                Ok(None) => Err(LoginRequired.into()),
                Err(error) => Err(error.into()),
            }
        })
    }
}
