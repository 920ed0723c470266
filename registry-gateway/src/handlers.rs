//! Request handlers: manifest pull, manifest push, and passthrough.

use crate::hub::Notification;
use crate::notify::spawn_notification;
use crate::route::RouteIdentity;
use crate::state::AppState;
use crate::types::ManifestUnknown;
use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use tracing::info;

/// `GET` a manifest.
///
/// Repositories the hub reports as missing are answered locally with
/// `MANIFEST_UNKNOWN`; the registry is not contacted and nothing is counted.
/// Every other pull is forwarded and then counted on a detached task.
pub async fn pull_manifest(
    State(state): State<AppState>,
    identity: RouteIdentity,
    request: Request,
) -> Response {
    info!(url = %request.uri(), method = %request.method(), "Received request");

    if state.hub.check_repository(&identity).await.is_missing() {
        info!(
            organization = %identity.organization,
            repository = %identity.repository,
            tag = %identity.tag,
            "Repository unknown to hub, answering manifest unknown"
        );
        return ManifestUnknown::new(identity.tag).into_response();
    }

    let response = state.proxy.forward(request).await;
    spawn_notification(state.hub.clone(), Notification::pull_count(&identity));
    response
}

/// `PUT` a manifest.
///
/// The registry's answer is authoritative and returned as-is. The push event
/// is sent afterwards whatever that answer was.
pub async fn push_manifest(
    State(state): State<AppState>,
    identity: RouteIdentity,
    request: Request,
) -> Response {
    info!(url = %request.uri(), method = %request.method(), "Received request");

    let response = state.proxy.forward(request).await;
    spawn_notification(state.hub.clone(), Notification::push_event(&identity));
    response
}

/// Anything else goes straight to the registry.
pub async fn passthrough(State(state): State<AppState>, request: Request) -> Response {
    info!(url = %request.uri(), method = %request.method(), "Received request");
    state.proxy.forward(request).await
}
