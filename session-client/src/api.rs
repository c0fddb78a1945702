// session-client/src/api.rs
//
// The remote REST endpoints the gateway orchestrates. Abstracted behind a
// trait so tests can substitute an in-memory backend; the live
// implementation wraps every transport failure into the AuthError taxonomy
// before it reaches a caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use common::models::user::User;
use common::Config;

use crate::error::AuthError;

/// Credentials submitted to the login endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for the admin registration endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// Successful login/registration response.
///
/// Only `token` is guaranteed; the remaining fields vary by issuer and are
/// accepted but not required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Remote auth endpoints consumed by the session gateway.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError>;
    async fn register_admin(&self, request: RegisterRequest) -> Result<LoginResponse, AuthError>;
    async fn get_user_by_email(&self, email: &str) -> Result<User, AuthError>;
    async fn logout(&self, token: &str) -> Result<(), AuthError>;
}

/// REST implementation against the backend API.
pub struct RestAuthApi {
    client: Client,
    base_url: String,
}

impl RestAuthApi {
    /// Build a client with the configured base URL and request timeout.
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a response to the typed body on 2xx, or to an [`AuthError`]
    /// keyed off the status code otherwise.
    async fn read_response<T>(response: reqwest::Response) -> Result<T, AuthError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| AuthError::Unknown(format!("unreadable response body: {}", e)))
        } else {
            let message = response.text().await.ok().filter(|m| !m.is_empty());
            Err(AuthError::from_status(status.as_u16(), message))
        }
    }
}

#[async_trait]
impl AuthApi for RestAuthApi {
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&request)
            .send()
            .await?;
        Self::read_response(response).await
    }

    async fn register_admin(&self, request: RegisterRequest) -> Result<LoginResponse, AuthError> {
        let response = self
            .client
            .post(self.url("/api/auth/register-admin"))
            .json(&request)
            .send()
            .await?;
        Self::read_response(response).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, AuthError> {
        let response = self
            .client
            .get(self.url("/api/users/by-email"))
            .query(&[("email", email)])
            .send()
            .await?;
        Self::read_response(response).await
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.url("/api/auth/logout"))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AuthError::from_status(status.as_u16(), None))
        }
    }
}
