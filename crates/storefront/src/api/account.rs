//! Login and registration endpoints.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use the_wind_core::account::{LoginRequest, RegisterRequest};
use the_wind_core::{AuthResponse, Email};
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// `POST /api/users/login`.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected, the request
    /// fails, or the body is not `{ user, token }`.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint(&["api", "users", "login"])?;
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        self.send(self.request(Method::POST, url).json(&body)).await
    }

    /// `POST /api/users/register`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the account, the request
    /// fails, or the body is not `{ user, token }`.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint(&["api", "users", "register"])?;
        let body = RegisterRequest {
            name,
            email,
            password: password.expose_secret(),
        };
        self.send(self.request(Method::POST, url).json(&body)).await
    }
}
