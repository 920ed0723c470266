//! Shared application state handed to every handler.

use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::hub::HubClient;
use crate::proxy::ReverseProxy;
use std::sync::Arc;

/// Read-only state shared across requests.
///
/// Built once from the validated [`GatewayConfig`]; cloning only bumps
/// reference counts.
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<ReverseProxy>,
    pub hub: Arc<HubClient>,
}

impl AppState {
    /// Build the proxy and hub clients for `config`.
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let proxy = ReverseProxy::new(config.upstream_url.clone())?;
        let hub = HubClient::new(&config.hub_url)?;

        Ok(Self {
            proxy: Arc::new(proxy),
            hub: Arc::new(hub),
        })
    }
}
