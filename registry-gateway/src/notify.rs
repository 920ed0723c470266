//! Fire-and-forget delivery of hub notifications.
//!
//! [`spawn_notification`] is the only place the gateway detaches work from a
//! request. The spawned task owns everything it needs, is never joined by
//! the request path, and reports its outcome to the log alone: a slow or
//! failing hub can neither delay nor change a client response.

use crate::hub::{HubClient, Notification};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Send `notification` to the hub on a detached task.
///
/// Handlers drop the returned handle; tests may await it to observe
/// completion. The call is attempted exactly once.
pub fn spawn_notification(hub: Arc<HubClient>, notification: Notification) -> JoinHandle<()> {
    tokio::spawn(async move {
        let url = notification.url(hub.base_url());
        let kind = notification.kind();

        match hub.send(&notification).await {
            Ok(status) if notification.is_acknowledged(status) => {
                info!(kind, url = %url, status = %status, "Called hub API");
            }
            Ok(status) => {
                warn!(kind, url = %url, status = %status, "Hub API returned an unexpected status");
            }
            Err(e) => {
                error!(kind, error = %e, "Hub notification failed");
            }
        }
    })
}
