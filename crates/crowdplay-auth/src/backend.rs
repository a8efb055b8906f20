//! The HTTP seam for authentication.
//!
//! Session logic never talks to `reqwest` directly — it goes through the
//! [`AuthBackend`] trait. Production wires in [`HttpAuthBackend`]; tests
//! substitute a scripted fake and exercise the full manager without a
//! server.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AuthError, UserProfile};

/// The `POST /auth/login` response.
///
/// Either `requires_otp` is set (and no tokens are issued), or the
/// response carries the full `user` + token set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The account needs a one-time code before tokens are issued.
    #[serde(default)]
    pub requires_otp: bool,
    /// The authenticated profile, absent when OTP is required.
    #[serde(default)]
    pub user: Option<UserProfile>,
    /// Fresh access token, absent when OTP is required.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Fresh refresh token, absent when OTP is required.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// The `POST /auth/verify-otp` response. Always a full session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpResponse {
    /// The authenticated profile.
    pub user: UserProfile,
    /// Fresh access token.
    pub access_token: String,
    /// Fresh refresh token.
    pub refresh_token: String,
}

/// Reaches the platform's auth endpoints.
///
/// Methods return `impl Future + Send` (rather than plain `async fn`) so
/// the futures can be driven from spawned tasks; implementations still
/// just write `async fn`.
pub trait AuthBackend: Send + Sync + 'static {
    /// `POST /auth/login` with the email and password *digest*.
    fn login(
        &self,
        email: &str,
        password_digest: &str,
    ) -> impl Future<Output = Result<LoginResponse, AuthError>> + Send;

    /// `POST /auth/verify-otp` with the email and one-time code.
    fn verify_otp(
        &self,
        email: &str,
        code: &str,
    ) -> impl Future<Output = Result<OtpResponse, AuthError>> + Send;

    /// `GET /user/profile` with the given access token.
    fn fetch_profile(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<UserProfile, AuthError>> + Send;
}

/// Decodes an HTTP response, mapping non-success statuses to
/// [`AuthError::Status`] (with the body's `message` when it has one) and
/// undecodable success bodies to [`AuthError::Parse`].
pub(crate) async fn decode_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, AuthError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message").and_then(Value::as_str).map(str::to_string)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        return Err(AuthError::Status {
            code: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| AuthError::Parse(e.to_string()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OtpRequest<'a> {
    email: &'a str,
    code: &'a str,
}

/// [`AuthBackend`] over the platform's REST API.
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
}

impl HttpAuthBackend {
    /// Creates a backend for the given API base URL and application id.
    pub fn new(base_url: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            app_id: app_id.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

impl AuthBackend for HttpAuthBackend {
    async fn login(
        &self,
        email: &str,
        password_digest: &str,
    ) -> Result<LoginResponse, AuthError> {
        tracing::debug!(email, "posting login");
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .header("x-app-id", &self.app_id)
            .json(&LoginRequest {
                email,
                password: password_digest,
            })
            .send()
            .await?;
        decode_response(resp).await
    }

    async fn verify_otp(
        &self,
        email: &str,
        code: &str,
    ) -> Result<OtpResponse, AuthError> {
        tracing::debug!(email, "posting otp verification");
        let resp = self
            .http
            .post(self.url("/auth/verify-otp"))
            .header("x-app-id", &self.app_id)
            .json(&OtpRequest { email, code })
            .send()
            .await?;
        decode_response(resp).await
    }

    async fn fetch_profile(
        &self,
        access_token: &str,
    ) -> Result<UserProfile, AuthError> {
        let resp = self
            .http
            .get(self.url("/user/profile"))
            .header("x-app-id", &self.app_id)
            .bearer_auth(access_token)
            .send()
            .await?;
        decode_response(resp).await
    }
}
