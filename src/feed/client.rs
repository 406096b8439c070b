// ABOUTME: Authenticated HTTP client for the management activity feed API
// ABOUTME: Merges query parameters, attaches the publisher identifier and bearer token, classifies failures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::constants::{headers, query};
use crate::errors::{ApiError, FeedError, FeedResult};
use crate::oauth2_client::TokenManager;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Successful (HTTP 200) response from the feed API
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Request URL as sent
    pub url: String,
    /// HTTP status (always 200)
    pub status: u16,
    /// Raw response body
    pub body: String,
    /// Continuation URL from the `NextPageUri` header
    pub next_page_uri: Option<String>,
}

impl ApiResponse {
    /// Decode the body as JSON
    ///
    /// An empty body decodes as JSON `null`, which lets callers that expect a
    /// list treat it as empty through `Option`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] when the body is not the expected JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| ApiError::decode(&self.url, e.to_string()))
    }
}

/// Client for the tenant's activity feed
pub struct ApiClient {
    http: reqwest::Client,
    tokens: Arc<TokenManager>,
    api_root: Url,
    publisher_id: String,
}

impl ApiClient {
    /// Create a client rooted at the tenant's feed URL
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `api_root` is not an absolute URL
    pub fn new(
        http: reqwest::Client,
        tokens: Arc<TokenManager>,
        api_root: &str,
        publisher_id: impl Into<String>,
    ) -> FeedResult<Self> {
        let mut api_root = Url::parse(api_root)
            .map_err(|e| FeedError::config(format!("invalid API root `{api_root}`: {e}")))?;
        if !api_root.path().ends_with('/') {
            let path = format!("{}/", api_root.path());
            api_root.set_path(&path);
        }
        Ok(Self {
            http,
            tokens,
            api_root,
            publisher_id: publisher_id.into(),
        })
    }

    /// Feed root URL
    #[must_use]
    pub const fn api_root(&self) -> &Url {
        &self.api_root
    }

    /// Absolute URL of an endpoint below the feed root
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `path` cannot be joined onto the root
    pub fn endpoint(&self, path: &str) -> FeedResult<String> {
        self.api_root
            .join(path)
            .map(String::from)
            .map_err(|e| FeedError::config(format!("invalid endpoint path `{path}`: {e}")))
    }

    /// Issue a GET request
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn get(&self, url: &str, params: &[(&str, &str)]) -> FeedResult<ApiResponse> {
        self.request(Method::GET, url, params, None).await
    }

    /// Issue a POST request with an optional form body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn post(
        &self,
        url: &str,
        params: &[(&str, &str)],
        form: Option<&[(&str, &str)]>,
    ) -> FeedResult<ApiResponse> {
        self.request(Method::POST, url, params, form).await
    }

    /// Issue an authenticated request against the feed API
    ///
    /// # Errors
    ///
    /// - [`FeedError::Auth`] when no valid token can be obtained; nothing is sent
    /// - [`ApiError::Rejected`] on any status other than 200
    /// - [`ApiError::Transport`] on timeouts and connection failures
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        params: &[(&str, &str)],
        form: Option<&[(&str, &str)]>,
    ) -> FeedResult<ApiResponse> {
        let target = merge_query(url, &self.publisher_id, params)?;
        let token = self.tokens.valid_token().await?;

        debug!(method = %method, url = %target, "Feed API request");

        let mut builder = self
            .http
            .request(method, target.clone())
            .header(AUTHORIZATION, token.authorization_header());
        if let Some(form) = form {
            builder = builder.form(form);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_transport(target.as_str(), &e))?;

        let status = response.status();
        let next_page_uri = response
            .headers()
            .get(headers::NEXT_PAGE_URI)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned);
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(target.as_str(), &e))?;

        if status != StatusCode::OK {
            if status == StatusCode::UNAUTHORIZED {
                self.tokens.invalidate().await;
            }
            warn!(url = %target, status = status.as_u16(), "Feed API rejected request");
            return Err(ApiError::rejected(target.as_str(), status.as_u16(), &body).into());
        }

        Ok(ApiResponse {
            url: target.into(),
            status: status.as_u16(),
            body,
            next_page_uri,
        })
    }
}

/// Merge query parameters into a URL
///
/// Existing pairs keep their order; a caller-supplied key replaces every
/// existing pair with the same name. `PublisherIdentifier` is always set to
/// `publisher_id`.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if `url` is not an absolute URL
pub fn merge_query(url: &str, publisher_id: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
    let mut parsed =
        Url::parse(url).map_err(|e| ApiError::decode(url, format!("invalid request URL: {e}")))?;

    let overrides = params
        .iter()
        .copied()
        .chain(std::iter::once((query::PUBLISHER_IDENTIFIER, publisher_id)));

    let mut pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
    for (key, value) in overrides {
        pairs.retain(|(existing, _)| existing != key);
        pairs.push((key.to_owned(), value.to_owned()));
    }

    parsed.query_pairs_mut().clear().extend_pairs(&pairs);
    Ok(parsed)
}
