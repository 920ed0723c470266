//! Client for the hub's bookkeeping API.
//!
//! The gateway uses three hub endpoints, all addressed by plain string
//! composition on the configured base URL:
//!
//! ```text
//! HEAD {hub}/api/orgs/{org}/repos/{repo}                              existence check
//! PUT  {hub}/api/orgs/{org}/repos/{repo}/pull/count                   pull counter
//! POST {hub}/api/public/orgs/{org}/repos/{repo}/tags/{tag}/push/event push event
//! ```

use crate::error::{GatewayError, GatewayResult};
use crate::route::RouteIdentity;
use axum::http::{Method, StatusCode};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Outcome of the repository existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryStatus {
    /// The hub answered `404 Not Found`
    Missing,
    /// The hub answered with any other status
    Present(StatusCode),
    /// The check could not be completed
    Unknown,
}

impl RepositoryStatus {
    /// Only an explicit 404 counts as missing; everything else fails open.
    pub fn is_missing(self) -> bool {
        matches!(self, RepositoryStatus::Missing)
    }
}

/// Bookkeeping call sent to the hub after a request was forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A manifest was pulled
    PullCount {
        organization: String,
        repository: String,
    },
    /// A manifest was pushed
    PushEvent {
        organization: String,
        repository: String,
        tag: String,
    },
}

impl Notification {
    pub fn pull_count(identity: &RouteIdentity) -> Self {
        Notification::PullCount {
            organization: identity.organization.clone(),
            repository: identity.repository.clone(),
        }
    }

    pub fn push_event(identity: &RouteIdentity) -> Self {
        Notification::PushEvent {
            organization: identity.organization.clone(),
            repository: identity.repository.clone(),
            tag: identity.tag.clone(),
        }
    }

    /// Short label used in log records
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::PullCount { .. } => "pull-count",
            Notification::PushEvent { .. } => "push-event",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Notification::PullCount { .. } => Method::PUT,
            Notification::PushEvent { .. } => Method::POST,
        }
    }

    pub fn url(&self, hub_base: &str) -> String {
        match self {
            Notification::PullCount {
                organization,
                repository,
            } => format!("{hub_base}/api/orgs/{organization}/repos/{repository}/pull/count"),
            Notification::PushEvent {
                organization,
                repository,
                tag,
            } => format!(
                "{hub_base}/api/public/orgs/{organization}/repos/{repository}/tags/{tag}/push/event"
            ),
        }
    }

    /// Whether the hub's answer counts as acknowledged.
    ///
    /// The pull counter answers exactly `200 OK`; push events accept any
    /// success status.
    pub fn is_acknowledged(&self, status: StatusCode) -> bool {
        match self {
            Notification::PullCount { .. } => status == StatusCode::OK,
            Notification::PushEvent { .. } => status.is_success(),
        }
    }
}

/// HTTP client for the hub.
pub struct HubClient {
    client: Client,
    base: String,
}

impl HubClient {
    /// Create a hub client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(base_url: &Url) -> GatewayResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("registry-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GatewayError::HttpClient)?;

        Ok(Self {
            client,
            base: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Hub base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn repository_url(&self, identity: &RouteIdentity) -> String {
        format!(
            "{}/api/orgs/{}/repos/{}",
            self.base, identity.organization, identity.repository
        )
    }

    /// Ask the hub whether the repository exists.
    ///
    /// Transport failures are logged and reported as
    /// [`RepositoryStatus::Unknown`]; they never block a pull.
    pub async fn check_repository(&self, identity: &RouteIdentity) -> RepositoryStatus {
        let url = self.repository_url(identity);
        debug!(url = %url, "Probing hub for repository");

        match self.client.head(&url).send().await {
            Ok(response) if response.status() == StatusCode::NOT_FOUND => RepositoryStatus::Missing,
            Ok(response) => RepositoryStatus::Present(response.status()),
            Err(e) => {
                warn!(url = %url, error = %e, "Hub existence check failed, assuming repository exists");
                RepositoryStatus::Unknown
            }
        }
    }

    /// Deliver a notification and return the hub's status code.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Hub`] if the request could not be completed.
    pub async fn send(&self, notification: &Notification) -> GatewayResult<StatusCode> {
        let url = notification.url(&self.base);
        let response = self
            .client
            .request(notification.method(), &url)
            .send()
            .await
            .map_err(|source| GatewayError::Hub { url, source })?;

        Ok(response.status())
    }
}
