//! # Registry Gateway
//!
//! A thin reverse proxy placed in front of a container-image registry. Image
//! pulls and pushes pass straight through to the registry while the gateway
//! keeps the hub (the service that owns organizations, repositories and usage
//! counters) informed on the side.
//!
//! ## Features
//!
//! - **Transparent proxying**: every request reaches the upstream registry
//!   with its method, path, query, headers and body intact
//! - **Existence checks**: manifest pulls for repositories unknown to the hub
//!   are answered with a registry-style `MANIFEST_UNKNOWN` error
//! - **Pull counting**: forwarded manifest pulls bump the hub's pull counter
//! - **Push events**: manifest pushes are announced to the hub
//! - **Fire-and-forget notifications**: hub bookkeeping never delays or fails
//!   a client request
//!
//! ## Architecture
//!
//! ```text
//! docker client → registry-gateway (port 5001) → registry
//!                        ↓ (manifest GET/PUT only)
//!                       hub
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use registry_gateway::{run_server, GatewayConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GatewayConfig::from_raw(
//!     Some("http://registry:5000"),
//!     Some("http://hub:8080"),
//!     "0.0.0.0".to_string(),
//!     5001,
//! )?;
//! run_server(config).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod hub;
pub mod notify;
pub mod proxy;
pub mod route;
pub mod server;
pub mod state;
pub mod types;

// Re-export main types
pub use config::GatewayConfig;
pub use error::{ConfigError, GatewayError, GatewayResult};
pub use hub::{HubClient, Notification, RepositoryStatus};
pub use proxy::ReverseProxy;
pub use route::RouteIdentity;
pub use state::AppState;

// Re-export server functions
pub use server::{build_router, run_server, run_server_with_shutdown};

/// Default port the gateway listens on
pub const DEFAULT_PORT: u16 = 5001;

/// Default host the gateway binds to
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Organization used for manifest paths without an organization segment
pub const ADMIN_ORG_NAME: &str = "d2hub";

/// Service name reported in the startup log
pub const SERVICE_NAME: &str = "registry-gateway";
