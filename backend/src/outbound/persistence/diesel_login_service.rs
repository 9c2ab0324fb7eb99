//! Diesel-backed `LoginService` adapter.
//!
//! Preserves the fixture login contract (`admin`/`password`) while making
//! sure the authenticated user has a row in PostgreSQL, so device ownership
//! writes always have a user to reference.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    LoginService, FIXTURE_PASSWORD, FIXTURE_USERNAME, FIXTURE_USER_ID,
};
use crate::domain::{Error, LoginCredentials, UserId};

use super::models::NewUserRow;
use super::pool::{DbPool, PoolError};
use super::schema::users;

const FIXTURE_DISPLAY_NAME: &str = "Ada Lovelace";

/// Diesel-backed `LoginService` that preserves fixture-authentication
/// semantics.
#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    /// Create a new service backed by the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn ensure_user_exists(&self, user_id: &UserId) -> Result<(), Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(NewUserRow {
                id: *user_id.as_uuid(),
                display_name: FIXTURE_DISPLAY_NAME,
            })
            .on_conflict(users::id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| Error::internal(format!("failed to ensure user row: {err}")))?;
        Ok(())
    }
}

fn map_pool_error(error: PoolError) -> Error {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            Error::service_unavailable(message)
        }
    }
}

fn fixture_user_id() -> Result<UserId, Error> {
    UserId::new(FIXTURE_USER_ID)
        .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        if credentials.username() != FIXTURE_USERNAME || credentials.password() != FIXTURE_PASSWORD
        {
            return Err(Error::unauthorized("invalid credentials"));
        }

        let user_id = fixture_user_id()?;
        self.ensure_user_exists(&user_id).await?;
        Ok(user_id)
    }
}
