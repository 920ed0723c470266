//! Registry wire types produced by the gateway itself.

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Header announcing the distribution API version
pub const DISTRIBUTION_API_VERSION_HEADER: HeaderName =
    HeaderName::from_static("docker-distribution-api-version");

/// Distribution API version spoken by the upstream registry
pub const DISTRIBUTION_API_VERSION: &str = "registry/2.0";

/// Content type of synthesized registry errors
pub const JSON_UTF8_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Error code for a missing tag or manifest
pub const MANIFEST_UNKNOWN_CODE: &str = "MANIFEST_UNKNOWN";

/// Registry error envelope: `{"errors": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryErrors {
    pub errors: Vec<RegistryError>,
}

/// One entry of the registry error envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryError {
    pub code: String,
    pub message: String,
    pub detail: Value,
}

impl RegistryError {
    pub fn manifest_unknown(tag: &str) -> Self {
        Self {
            code: MANIFEST_UNKNOWN_CODE.to_string(),
            message: "manifest unknown".to_string(),
            detail: json!({ "Tag": tag }),
        }
    }
}

/// `404 MANIFEST_UNKNOWN` answered on behalf of the registry when the hub
/// does not know the requested repository.
#[derive(Debug, Clone)]
pub struct ManifestUnknown {
    pub tag: String,
}

impl ManifestUnknown {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    pub fn body(&self) -> RegistryErrors {
        RegistryErrors {
            errors: vec![RegistryError::manifest_unknown(&self.tag)],
        }
    }
}

impl IntoResponse for ManifestUnknown {
    fn into_response(self) -> Response {
        let body = match serde_json::to_vec(&self.body()) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize registry error");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        (
            StatusCode::NOT_FOUND,
            [
                (
                    DISTRIBUTION_API_VERSION_HEADER,
                    HeaderValue::from_static(DISTRIBUTION_API_VERSION),
                ),
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(JSON_UTF8_CONTENT_TYPE),
                ),
            ],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_manifest_unknown_wire_format() {
        let body = serde_json::to_string(&ManifestUnknown::new("v1.0").body()).unwrap();
        assert_eq!(
            body,
            r#"{"errors":[{"code":"MANIFEST_UNKNOWN","message":"manifest unknown","detail":{"Tag":"v1.0"}}]}"#
        );
    }

    #[test]
    fn test_tag_is_json_escaped() {
        let body = serde_json::to_string(&ManifestUnknown::new(r#"we"ird"#).body()).unwrap();
        let parsed: RegistryErrors = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.errors[0].detail["Tag"], r#"we"ird"#);
    }

    #[tokio::test]
    async fn test_manifest_unknown_response() {
        let response = ManifestUnknown::new("latest").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[DISTRIBUTION_API_VERSION_HEADER],
            "registry/2.0"
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: RegistryErrors = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].code, MANIFEST_UNKNOWN_CODE);
        assert_eq!(parsed.errors[0].detail["Tag"], "latest");
    }
}
