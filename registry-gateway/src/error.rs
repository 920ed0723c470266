//! # Error Handling
//!
//! Two error families live here:
//!
//! - [`ConfigError`]: startup validation failures. These are fatal; the
//!   binary exits before a listener is opened.
//! - [`GatewayError`]: failures while talking to the upstream registry or the
//!   hub at request time.
//!
//! Only upstream failures ever reach a client, as an empty `502 Bad Gateway`.
//! Hub failures are either tolerated (the existence check fails open) or only
//! logged (notifications).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Invalid or missing startup configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{0} is set but empty")]
    Empty(&'static str),

    #[error("{name} is not a valid URL ({value}): {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{name} must be an absolute http(s) URL with a host, got {value}")]
    UnsupportedUrl { name: &'static str, value: String },
}

/// Request-time failures talking to the registry or the hub.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to configure TLS for the upstream client: {0}")]
    Tls(#[source] rustls::Error),

    #[error("Upstream target {url} is not a valid request URI: {source}")]
    TargetUri {
        url: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    #[error("Upstream request to {url} failed: {source}")]
    Upstream {
        url: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("Hub request to {url} failed: {source}")]
    Hub {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl GatewayError {
    /// Status reported to the client when this error ends a request.
    ///
    /// Hub errors never end a request; they only get the generic status here.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::HttpClient(_)
            | GatewayError::Tls(_)
            | GatewayError::TargetUri { .. }
            | GatewayError::Hub { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        // Registry clients get the bare status, as from any reverse proxy.
        self.status_code().into_response()
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hub_error_is_not_reported_as_bad_gateway() {
        let client = reqwest::Client::new();
        let source = client
            .get("http://[::1")
            .send()
            .await
            .expect_err("invalid URL should fail");
        let err = GatewayError::Hub {
            url: "http://[::1".to_string(),
            source,
        };

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("Hub request to http://[::1 failed"));
    }

    #[test]
    fn test_target_uri_error_is_internal() {
        let source = "http://registry:5000/v2/a b"
            .parse::<axum::http::Uri>()
            .expect_err("spaces are not valid in a URI");
        let err = GatewayError::TargetUri {
            url: "http://registry:5000/v2/".to_string(),
            source,
        };

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
