// ABOUTME: Constants module with domain-separated organization
// ABOUTME: API paths, query keys, header names, timestamp formats and configuration defaults
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Constants grouped by domain rather than collected in one flat list.

/// Management activity API paths, relative to the tenant's feed root
pub mod api {
    /// List current subscriptions
    pub const SUBSCRIPTIONS_LIST: &str = "subscriptions/list";
    /// Start a subscription
    pub const SUBSCRIPTIONS_START: &str = "subscriptions/start";
    /// List available content
    pub const SUBSCRIPTIONS_CONTENT: &str = "subscriptions/content";
    /// API version segment of the feed root
    pub const API_VERSION_PATH: &str = "api/v1.0";
    /// Token endpoint path suffix below the tenant domain
    pub const TOKEN_PATH: &str = "oauth2/token";
    /// Token endpoint API version query
    pub const TOKEN_API_VERSION: &str = "1.0";
}

/// Query parameter names
pub mod query {
    /// Tenant identifier attached to every request to reduce throttling
    pub const PUBLISHER_IDENTIFIER: &str = "PublisherIdentifier";
    /// Content type selector
    pub const CONTENT_TYPE: &str = "contentType";
    /// Window start
    pub const START_TIME: &str = "startTime";
    /// Window end
    pub const END_TIME: &str = "endTime";
}

/// HTTP header names
pub mod headers {
    /// Continuation pointer delivered by paginated listings
    pub const NEXT_PAGE_URI: &str = "NextPageUri";
}

/// OAuth2 client-credentials grant
pub mod oauth {
    /// Grant type form value
    pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";
    /// Seconds before reported expiry at which a token is treated as expired
    pub const EXPIRATION_BUFFER_SECS: i64 = 60;
}

/// Timestamp formats used on the wire
pub mod formats {
    /// Query timestamps: UTC without a zone suffix
    pub const API_QUERY_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S";
    /// Suffix appended to event `CreationTime` before RFC3339 parsing
    pub const CREATION_TIME_ZONE_SUFFIX: &str = "Z";
}

/// Event field names
pub mod fields {
    /// Event creation time (no zone designator)
    pub const CREATION_TIME: &str = "CreationTime";
    /// Source tag attached before publishing
    pub const TYPE: &str = "type";
    /// Timestamp key in serialized published events
    pub const TIMESTAMP: &str = "@timestamp";
}

/// Time windows and limits imposed by the API
pub mod windows {
    /// Longest span a single content listing may cover
    pub const MAX_WINDOW_HOURS: i64 = 24;
    /// Longest lookback the API serves
    pub const MAX_LOOKBACK_HOURS: u64 = 168;
}

/// Configuration defaults
pub mod defaults {
    /// Poll period
    pub const POLL_PERIOD_SECS: u64 = 300;
    /// Per-request timeout
    pub const API_TIMEOUT_SECS: u64 = 30;
    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Maximum lookback
    pub const CONTENT_MAX_AGE_HOURS: u64 = 168;
    /// Authorization base URL
    pub const LOGIN_URL: &str = "https://login.microsoftonline.com";
    /// Resource / API base URL
    pub const RESOURCE_URL: &str = "https://manage.office.com";
    /// Checkpoint file location
    pub const CHECKPOINT_PATH: &str = "./o365-feed-poller.checkpoint";
    /// Content types polled when none are configured
    pub const CONTENT_TYPES: &[&str] = &[
        "Audit.AzureActiveDirectory",
        "Audit.Exchange",
        "Audit.SharePoint",
        "Audit.General",
        "DLP.All",
    ];
}

/// Environment variable names
pub mod env_config {
    /// Poll period in seconds
    pub const POLL_PERIOD_SECS: &str = "O365_POLL_PERIOD_SECS";
    /// Tenant domain
    pub const TENANT_DOMAIN: &str = "O365_TENANT_DOMAIN";
    /// Application (client) id
    pub const CLIENT_ID: &str = "O365_CLIENT_ID";
    /// Client secret
    pub const CLIENT_SECRET: &str = "O365_CLIENT_SECRET";
    /// Directory (tenant) id
    pub const DIRECTORY_ID: &str = "O365_DIRECTORY_ID";
    /// Comma-separated content types
    pub const CONTENT_TYPES: &str = "O365_CONTENT_TYPES";
    /// Checkpoint file
    pub const CHECKPOINT_PATH: &str = "O365_CHECKPOINT_PATH";
    /// API timeout in seconds
    pub const API_TIMEOUT_SECS: &str = "O365_API_TIMEOUT_SECS";
    /// Maximum lookback in hours
    pub const CONTENT_MAX_AGE_HOURS: &str = "O365_CONTENT_MAX_AGE_HOURS";
    /// Authorization base URL
    pub const LOGIN_URL: &str = "O365_LOGIN_URL";
    /// Resource base URL
    pub const RESOURCE_URL: &str = "O365_RESOURCE_URL";
}

/// Service identification
pub mod service_names {
    /// Default service name used in logs
    pub const FEED_POLLER: &str = "o365-feed-poller";
}
