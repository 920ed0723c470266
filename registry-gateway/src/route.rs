//! Route identity extraction for manifest requests.
//!
//! Both manifest route patterns share their first capture name so the router
//! can hold them side by side:
//!
//! ```text
//! /v2/{namespace}/manifests/{tag}                -> organization = d2hub, repository = namespace
//! /v2/{namespace}/{repository}/manifests/{tag}   -> organization = namespace
//! ```

use crate::ADMIN_ORG_NAME;
use axum::{
    extract::{rejection::PathRejection, FromRequestParts, Path},
    http::request::Parts,
};
use serde::Deserialize;

/// Route pattern for manifests addressed without an organization
pub const MANIFEST_ROUTE: &str = "/v2/{namespace}/manifests/{tag}";

/// Route pattern for manifests addressed with an organization
pub const ORG_MANIFEST_ROUTE: &str = "/v2/{namespace}/{repository}/manifests/{tag}";

/// Raw captures of a matched manifest route
#[derive(Debug, Deserialize)]
struct ManifestCaptures {
    namespace: String,
    #[serde(default)]
    repository: Option<String>,
    tag: String,
}

/// Organization, repository and tag addressed by a manifest request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteIdentity {
    pub organization: String,
    pub repository: String,
    pub tag: String,
}

impl RouteIdentity {
    pub fn new(
        organization: impl Into<String>,
        repository: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// Identity for a path without an organization segment
    pub fn in_admin_org(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::new(ADMIN_ORG_NAME, repository, tag)
    }
}

impl ManifestCaptures {
    fn into_identity(self) -> RouteIdentity {
        match self.repository {
            Some(repository) => RouteIdentity::new(self.namespace, repository, self.tag),
            None => RouteIdentity::in_admin_org(self.namespace, self.tag),
        }
    }
}

impl<S> FromRequestParts<S> for RouteIdentity
where
    S: Send + Sync,
{
    type Rejection = PathRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(captures) = Path::<ManifestCaptures>::from_request_parts(parts, state).await?;
        Ok(captures.into_identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use axum_test::TestServer;

    async fn describe(identity: RouteIdentity) -> String {
        format!(
            "{}|{}|{}",
            identity.organization, identity.repository, identity.tag
        )
    }

    fn create_test_server() -> TestServer {
        let app = Router::new()
            .route(MANIFEST_ROUTE, get(describe))
            .route(ORG_MANIFEST_ROUTE, get(describe));
        TestServer::new(app).expect("Failed to create test server")
    }

    #[tokio::test]
    async fn test_missing_organization_defaults_to_admin_org() {
        let server = create_test_server();

        let response = server.get("/v2/ubuntu/manifests/latest").await;
        response.assert_status_ok();
        response.assert_text("d2hub|ubuntu|latest");
    }

    #[tokio::test]
    async fn test_organization_segment_is_used_verbatim() {
        let server = create_test_server();

        let response = server.get("/v2/acme/web/manifests/v1.2.3").await;
        response.assert_status_ok();
        response.assert_text("acme|web|v1.2.3");
    }

    #[tokio::test]
    async fn test_special_characters_survive_extraction() {
        let server = create_test_server();

        let response = server
            .get("/v2/my-org_1/repo.name-2/manifests/sha256:0123abcd")
            .await;
        response.assert_text("my-org_1|repo.name-2|sha256:0123abcd");

        let response = server.get("/v2/org~x/re_po/manifests/1.0-rc~1").await;
        response.assert_text("org~x|re_po|1.0-rc~1");
    }

    #[tokio::test]
    async fn test_percent_encoded_segments_are_decoded() {
        let server = create_test_server();

        let response = server.get("/v2/my%20org/repo/manifests/latest").await;
        response.assert_text("my org|repo|latest");
    }

    #[test]
    fn test_admin_org_identity() {
        let identity = RouteIdentity::in_admin_org("busybox", "1.36");
        assert_eq!(identity, RouteIdentity::new("d2hub", "busybox", "1.36"));
    }
}
