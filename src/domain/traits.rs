//! # Domain Traits
//!
//! Abstract interfaces for core system components (Chat, Notifications, HTTP).
//! Allows for pluggable implementations in the Infrastructure layer.

use async_trait::async_trait;

use crate::domain::types::TransportResponse;

/// Abstract interface for a Chat Provider (e.g., Matrix, Slack, Console)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to the room, returning the new message's event ID
    async fn send_message(&self, content: &str) -> Result<String, String>;

    /// Edit a message in the room
    async fn edit_message(&self, message_id: &str, content: &str) -> Result<(), String>;

    /// Send a notification (not tracked/editable)
    async fn send_notification(&self, content: &str) -> Result<(), String>;

    /// Send a typing indicator
    async fn typing(&self, active: bool) -> Result<(), String>;

    /// Get the current room ID
    fn room_id(&self) -> String;
}

/// Fan-out capability for relay notifications. Injected wherever something
/// needs to send, instead of ambient owner/channel lists.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Post to every notification channel
    async fn broadcast(&self, content: &str) -> Result<(), String>;

    /// Post to every owner room (falls back to the channels when none are set)
    async fn notify_owners(&self, content: &str) -> Result<(), String>;
}

/// One request/response exchange against a third-party API. The retry policy
/// lives above this seam so tests can script statuses without a network.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, method: &str, url: &str) -> Result<TransportResponse, String>;
}
