use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info, warn};

use shared_api::PortalClient;

use crate::models::{Notification, NotificationEnvelope, NotificationError};
use crate::services::push::PushEvent;

/// Display cap for the unread badge. The count used for logic stays exact.
const UNREAD_BADGE_CAP: usize = 9;

#[derive(Debug, Deserialize)]
struct InAppListData {
    #[serde(default)]
    in_app_messages: Vec<NotificationEnvelope>,
}

/// Ordered in-app notification list with an unread counter. Pull and push
/// converge by construction: a push event triggers the same `refresh` a
/// manual pull would run.
pub struct NotificationFeed {
    api: Arc<PortalClient>,
    notifications: Vec<Notification>,
    unread: usize,
}

impl NotificationFeed {
    pub fn new(api: Arc<PortalClient>) -> Self {
        Self {
            api,
            notifications: Vec::new(),
            unread: 0,
        }
    }

    /// Newest first; ties keep the arrival order of the fetched page.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }

    pub fn unread_badge(&self) -> String {
        if self.unread > UNREAD_BADGE_CAP {
            format!("{}+", UNREAD_BADGE_CAP)
        } else {
            self.unread.to_string()
        }
    }

    /// Pull the current list and replace local state. On failure the
    /// last-known list stays in place (read paths degrade, they do not
    /// block).
    pub async fn refresh(&mut self, auth_token: &str) -> Result<(), NotificationError> {
        debug!("refreshing notification feed");
        let data: InAppListData = self
            .api
            .fetch_data(
                Method::GET,
                "/notifications?type=in_app",
                Some(auth_token),
                None,
            )
            .await?;

        let mut notifications: Vec<Notification> = data
            .in_app_messages
            .into_iter()
            .map(NotificationEnvelope::normalize)
            .collect();
        // Stable sort: arrival order breaks timestamp ties.
        notifications.sort_by(|a, b| b.sort_ts().cmp(&a.sort_ts()));

        self.unread = notifications.iter().filter(|n| !n.is_read).count();
        self.notifications = notifications;
        Ok(())
    }

    /// A live push event triggers a full re-pull rather than a local
    /// merge, so the two delivery paths can never diverge.
    pub async fn on_push(
        &mut self,
        auth_token: &str,
        event: PushEvent,
    ) -> Result<(), NotificationError> {
        debug!("push event received: {:?}", event);
        self.refresh(auth_token).await
    }

    /// Acknowledge one notification as read. No optimistic flip: local
    /// state changes only after the server acknowledgment. Re-marking an
    /// already-read notification is a no-op on both sides.
    pub async fn mark_read(
        &mut self,
        auth_token: &str,
        message_id: &str,
    ) -> Result<(), NotificationError> {
        let path = format!("/notifications/{}/read", message_id);
        self.api
            .fetch_ack(Method::PUT, &path, Some(auth_token), None)
            .await?;

        if let Some(notification) = self
            .notifications
            .iter_mut()
            .find(|n| n.message_id == message_id)
        {
            if !notification.is_read {
                info!("notification {} marked read", message_id);
            }
            notification.is_read = true;
        }
        self.unread = self.notifications.iter().filter(|n| !n.is_read).count();

        // Reconcile with the backend; a failed re-pull keeps the acknowledged
        // local state.
        if let Err(e) = self.refresh(auth_token).await {
            warn!("post-ack refresh failed: {}", e);
        }
        Ok(())
    }
}
