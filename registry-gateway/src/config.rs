//! Gateway configuration, validated once at startup.
//!
//! The raw values come from CLI flags or their environment fallbacks
//! (`REGISTRY_URL`, `D2HUB_URL`, `LISTEN_HOST`, `PORT`). After
//! [`GatewayConfig::from_raw`] succeeds the configuration is never mutated;
//! it is shared with handlers through [`crate::AppState`].

use crate::error::ConfigError;
use crate::{DEFAULT_HOST, DEFAULT_PORT};
use url::Url;

/// Name reported for the upstream registry URL in configuration errors
pub const REGISTRY_URL_VAR: &str = "REGISTRY_URL";

/// Name reported for the hub URL in configuration errors
pub const HUB_URL_VAR: &str = "D2HUB_URL";

/// Immutable gateway configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Base URL of the upstream registry every request is forwarded to
    pub upstream_url: Url,
    /// Base URL of the hub used for bookkeeping side-calls
    pub hub_url: Url,
    /// Host/IP address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl GatewayConfig {
    /// Create a configuration with the default listen address.
    pub fn new(upstream_url: Url, hub_url: Url) -> Self {
        Self {
            upstream_url,
            hub_url,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Validate raw configuration values.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when either URL is absent, empty, fails to
    /// parse, or is not an absolute `http`/`https` URL with a host.
    pub fn from_raw(
        registry_url: Option<&str>,
        hub_url: Option<&str>,
        host: String,
        port: u16,
    ) -> Result<Self, ConfigError> {
        let upstream_url = parse_base_url(REGISTRY_URL_VAR, registry_url)?;
        let hub_url = parse_base_url(HUB_URL_VAR, hub_url)?;

        Ok(Self {
            upstream_url,
            hub_url,
            host,
            port,
        })
    }

    /// Socket address string the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_base_url(name: &'static str, raw: Option<&str>) -> Result<Url, ConfigError> {
    let value = raw.ok_or(ConfigError::Missing(name))?.trim();
    if value.is_empty() {
        return Err(ConfigError::Empty(name));
    }

    let url = Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })?;

    // "localhost:5000" parses with scheme "localhost", so check explicitly.
    let supported_scheme = matches!(url.scheme(), "http" | "https");
    if !supported_scheme || url.host_str().is_none() {
        return Err(ConfigError::UnsupportedUrl {
            name,
            value: value.to_string(),
        });
    }

    Ok(url)
}
