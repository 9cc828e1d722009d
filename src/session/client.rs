//! Network boundary of the session controller. The trait is the seam tests use to
//! script server behavior; [`ApiClient`] is the production implementation.

use super::types::{SignInRequest, UserRecord};
use crate::api::{ApiClient, ApiError};
use async_trait::async_trait;

pub const SIGN_IN_PATH: &str = "/auth/signin";
pub const SIGN_OUT_PATH: &str = "/auth/signout";
pub const PROFILE_PATH: &str = "/profile";

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// POST `/auth/signin`; the server answers with a session cookie. Any 2xx
    /// is a success, whatever the body.
    async fn sign_in(&self, request: &SignInRequest<'_>) -> Result<(), ApiError>;

    /// GET `/profile`; succeeds only for a server-recognized session.
    async fn fetch_profile(&self) -> Result<UserRecord, ApiError>;

    /// GET `/auth/signout`; clears the session cookie server side.
    async fn sign_out(&self) -> Result<(), ApiError>;
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn sign_in(&self, request: &SignInRequest<'_>) -> Result<(), ApiError> {
        self.post_empty(SIGN_IN_PATH, request).await
    }

    async fn fetch_profile(&self) -> Result<UserRecord, ApiError> {
        self.get_json(PROFILE_PATH).await
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        self.get_empty(SIGN_OUT_PATH).await
    }
}
