// ABOUTME: OAuth2 client-credentials token acquisition and caching for the feed API
// ABOUTME: Caches one bearer token and refreshes it shortly before the reported expiry
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::constants::oauth;
use crate::errors::AuthError;
use feed_core::Clock;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// Bearer token issued by the client-credentials grant
///
/// Tokens are replaced wholesale on refresh and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token_type: String,
    value: String,
    issued_at: i64,
    expires_on: i64,
}

impl AccessToken {
    /// Create a token from its parts (epoch seconds)
    #[must_use]
    pub fn new(
        token_type: impl Into<String>,
        value: impl Into<String>,
        issued_at: i64,
        expires_on: i64,
    ) -> Self {
        Self {
            token_type: token_type.into(),
            value: value.into(),
            issued_at,
            expires_on,
        }
    }

    /// Token type, usually `Bearer`
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Issue time in epoch seconds
    #[must_use]
    pub const fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Reported expiry in epoch seconds
    #[must_use]
    pub const fn expires_on(&self) -> i64 {
        self.expires_on
    }

    /// A token is expired once `now >= expires_on - 60s`
    #[must_use]
    pub const fn is_expired_at(&self, now_epoch: i64) -> bool {
        now_epoch >= self.expires_on.saturating_sub(oauth::EXPIRATION_BUFFER_SECS)
    }

    /// Value for the `Authorization` header: `"{type} {token}"`
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.value)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_type", &self.token_type)
            .field("value", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Token endpoint response
///
/// The v1 endpoint reports `expires_on` and `not_before` as strings holding
/// epoch seconds; numbers are accepted too.
#[derive(Deserialize)]
struct TokenResponse {
    token_type: String,
    access_token: String,
    #[serde(deserialize_with = "epoch_seconds")]
    expires_on: i64,
    #[serde(default, deserialize_with = "optional_epoch_seconds")]
    not_before: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EpochSeconds {
    Number(i64),
    Text(String),
}

impl EpochSeconds {
    fn into_seconds<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            Self::Number(secs) => Ok(secs),
            Self::Text(raw) => raw
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("`{raw}` is not an epoch timestamp"))),
        }
    }
}

fn epoch_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    EpochSeconds::deserialize(deserializer)?.into_seconds()
}

fn optional_epoch_seconds<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    Option::<EpochSeconds>::deserialize(deserializer)?
        .map(EpochSeconds::into_seconds)
        .transpose()
}

/// Client credentials and endpoints for the token grant
#[derive(Clone)]
pub struct ClientCredentials {
    /// Full token endpoint URL (may carry `api-version`)
    pub token_url: String,
    /// Resource the token is requested for
    pub resource: String,
    /// Application id
    pub client_id: String,
    /// Application secret
    pub client_secret: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("token_url", &self.token_url)
            .field("resource", &self.resource)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Obtains and caches the bearer token for the feed API
pub struct TokenManager {
    http: reqwest::Client,
    credentials: ClientCredentials,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    /// Create a token manager sharing the given HTTP client
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        credentials: ClientCredentials,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http,
            credentials,
            clock,
            cached: Mutex::new(None),
        }
    }

    /// Token endpoint with the query string stripped, safe to log
    #[must_use]
    pub fn target(&self) -> String {
        sanitize_target(&self.credentials.token_url)
    }

    /// Return the cached token, requesting a new one when absent or expired
    ///
    /// A failed refresh leaves the previously cached token in place.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the token endpoint is unreachable, answers
    /// with a non-200 status, or returns a body that is not a token
    pub async fn valid_token(&self) -> Result<AccessToken, AuthError> {
        let mut cached = self.cached.lock().await;
        let now = self.clock.now().timestamp();

        if let Some(token) = cached.as_ref() {
            if !token.is_expired_at(now) {
                return Ok(token.clone());
            }
            debug!(expires_on = token.expires_on, "Cached token expired, refreshing");
        }

        let token = self.request_token(now).await?;
        info!(
            endpoint = %self.target(),
            expires_on = token.expires_on,
            "Obtained access token"
        );
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token so the next call authenticates again
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn request_token(&self, now: i64) -> Result<AccessToken, AuthError> {
        let target = self.target();
        let params = [
            ("grant_type", oauth::GRANT_TYPE_CLIENT_CREDENTIALS),
            ("resource", self.credentials.resource.as_str()),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.credentials.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %target, "Token request did not complete");
                AuthError::failed(&target, transport_message(&e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::failed(&target, transport_message(&e)))?;

        if status != reqwest::StatusCode::OK {
            return Err(AuthError::rejected(
                &target,
                status.as_u16(),
                crate::errors::api::body_snippet(&body),
            ));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            AuthError::rejected(
                &target,
                status.as_u16(),
                format!("malformed token response: {e}"),
            )
        })?;

        Ok(AccessToken::new(
            parsed.token_type,
            parsed.access_token,
            parsed.not_before.unwrap_or(now),
            parsed.expires_on,
        ))
    }
}

/// Keep scheme, host and path only
fn sanitize_target(raw: &str) -> String {
    Url::parse(raw).map_or_else(
        |_| raw.split('?').next().unwrap_or_default().to_owned(),
        |mut url| {
            url.set_query(None);
            url.set_fragment(None);
            let _ = url.set_password(None);
            let _ = url.set_username("");
            url.to_string()
        },
    )
}

fn transport_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_owned()
    } else if error.is_connect() {
        "connection failed".to_owned()
    } else {
        "request failed".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let token = AccessToken::new("Bearer", "abc", 1_000, 10_000);
        assert!(!token.is_expired_at(10_000 - 61));
        assert!(token.is_expired_at(10_000 - 60));
        assert!(token.is_expired_at(10_000 - 59));
    }

    #[test]
    fn test_authorization_header() {
        let token = AccessToken::new("Bearer", "abc", 0, 1);
        assert_eq!(token.authorization_header(), "Bearer abc");
    }

    #[test]
    fn test_debug_redacts_token_value() {
        let token = AccessToken::new("Bearer", "super-secret-token", 0, 1);
        assert!(!format!("{token:?}").contains("super-secret-token"));
    }

    #[test]
    fn test_token_response_accepts_string_and_number_epochs() {
        let text: TokenResponse = serde_json::from_str(
            r#"{"token_type":"Bearer","access_token":"a","expires_on":"1700003600","not_before":"1700000000"}"#,
        )
        .unwrap();
        assert_eq!(text.expires_on, 1_700_003_600);
        assert_eq!(text.not_before, Some(1_700_000_000));

        let number: TokenResponse = serde_json::from_str(
            r#"{"token_type":"Bearer","access_token":"a","expires_on":1700003600}"#,
        )
        .unwrap();
        assert_eq!(number.expires_on, 1_700_003_600);
        assert_eq!(number.not_before, None);
    }

    #[test]
    fn test_token_response_rejects_garbage_expiry() {
        let parsed = serde_json::from_str::<TokenResponse>(
            r#"{"token_type":"Bearer","access_token":"a","expires_on":"soon"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_sanitize_target_drops_query() {
        assert_eq!(
            sanitize_target("https://login.example.com/contoso/oauth2/token?api-version=1.0"),
            "https://login.example.com/contoso/oauth2/token"
        );
    }
}
