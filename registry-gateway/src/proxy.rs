//! Single-host reverse proxy for the upstream registry.
//!
//! A request is mapped onto the upstream by swapping scheme, host and port
//! and joining the upstream's base path with the request path. Method,
//! headers (including `Host`) and body are passed through, and the upstream
//! answer is streamed back untouched apart from hop-by-hop headers.
//! Redirects are returned to the caller instead of being followed, and the
//! client adds no default headers of its own.

use crate::error::{GatewayError, GatewayResult};
use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{header, HeaderMap, HeaderName, HeaderValue, Uri, Version},
    response::{IntoResponse, Response},
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::debug;
use url::Url;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Headers that only apply to a single connection and are never forwarded.
const HOP_BY_HOP_HEADERS: [HeaderName; 9] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Reverse proxy bound to one upstream base URL.
pub struct ReverseProxy {
    client: UpstreamClient,
    upstream: Url,
}

impl ReverseProxy {
    /// Create a proxy forwarding to `upstream`.
    ///
    /// Plain `http` and `https` upstreams are both accepted.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Tls`] if the TLS connector cannot be built.
    pub fn new(upstream: Url) -> GatewayResult<Self> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let https = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(provider)
            .map_err(GatewayError::Tls)?
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(https);

        Ok(Self { client, upstream })
    }

    /// Map an inbound request URI onto the upstream.
    pub fn target_url(&self, uri: &Uri) -> Url {
        let mut target = self.upstream.clone();
        target.set_path(&single_joining_slash(self.upstream.path(), uri.path()));

        let query = [self.upstream.query(), uri.query()]
            .into_iter()
            .flatten()
            .filter(|query| !query.is_empty())
            .collect::<Vec<_>>()
            .join("&");
        target.set_query((!query.is_empty()).then_some(query.as_str()));

        target
    }

    /// Forward `request` upstream and return the upstream's answer.
    ///
    /// Upstream transport failures become an empty `502 Bad Gateway`.
    pub async fn forward(&self, request: Request) -> Response {
        match self.try_forward(request).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        }
    }

    async fn try_forward(&self, request: Request) -> GatewayResult<Response> {
        let (mut parts, body) = request.into_parts();
        let target = self.target_url(&parts.uri);

        strip_hop_by_hop(&mut parts.headers);
        if let Some(ConnectInfo(peer)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            append_forwarded_for(&mut parts.headers, peer.ip());
        }

        parts.uri = target
            .as_str()
            .parse()
            .map_err(|source| GatewayError::TargetUri {
                url: target.to_string(),
                source,
            })?;
        // The upstream connection is always HTTP/1.1, whatever the client spoke.
        parts.version = Version::HTTP_11;

        debug!(method = %parts.method, url = %target, "Forwarding request upstream");

        let upstream_response = self
            .client
            .request(Request::from_parts(parts, body))
            .await
            .map_err(|source| GatewayError::Upstream {
                url: target.to_string(),
                source,
            })?;

        let mut response = upstream_response.map(Body::new);
        strip_hop_by_hop(response.headers_mut());
        Ok(response)
    }
}

/// Join two URL paths with exactly one `/` between them.
fn single_joining_slash(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{base}{}", &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP_HEADERS.iter()) {
        headers.remove(name);
    }
}

/// Append the client address to `X-Forwarded-For`, keeping earlier hops.
fn append_forwarded_for(headers: &mut HeaderMap, client_ip: IpAddr) {
    let mut hops: Vec<String> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect();
    hops.push(client_ip.to_string());

    if let Ok(value) = HeaderValue::from_str(&hops.join(", ")) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
