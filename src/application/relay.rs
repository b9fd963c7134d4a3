//! # Relay Engine
//!
//! The inbound half of the relay: takes raw lines the automation process
//! posted in the bot room, classifies them, resolves partner names, and hands
//! formatted notifications to the injected sink. Also keeps the pending user
//! message that `.acknowledged` clears and the reminder loop re-pings.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::Mutex;

use crate::application::classifier::classify;
use crate::application::formatter::{
    format_offer_description, format_trade_description, human_join,
};
use crate::domain::config::RelayConfig;
use crate::domain::traits::NotificationSink;
use crate::domain::types::{
    Classification, InboundMessage, OfferReviewUpdate, TradeUpdate, UserMessage,
};
use crate::infrastructure::lookup::{PlayerLookup, to_id64};
use crate::strings::messages;

pub struct RelayEngine {
    config: RelayConfig,
    sink: Arc<dyn NotificationSink>,
    lookup: PlayerLookup,
    pending_user_message: Mutex<Option<UserMessage>>,
}

impl RelayEngine {
    pub fn new(config: RelayConfig, sink: Arc<dyn NotificationSink>, lookup: PlayerLookup) -> Self {
        Self {
            config,
            sink,
            lookup,
            pending_user_message: Mutex::new(None),
        }
    }

    pub async fn handle_bot_message(&self, msg: InboundMessage) -> Result<()> {
        tracing::debug!("Classifying a line from {}", msg.sender);
        let timestamp = msg.received_at.format("%c").to_string();

        match classify(&msg.raw_text) {
            Classification::Trade(update) => self.relay_trade(update, &timestamp).await,
            Classification::OfferReview(update) => self.relay_offer(update, &timestamp).await,
            Classification::User(user) => self.relay_user_message(user).await,
            Classification::Unrecognized { raw } => {
                tracing::warn!("Unrecognized line from the bot: {raw}");
                self.sink
                    .broadcast(&messages::generic_notification(&raw, &timestamp))
                    .await
                    .map_err(|e| anyhow!(e))
            }
        }
    }

    async fn relay_trade(&self, update: TradeUpdate, timestamp: &str) -> Result<()> {
        let partner = self.lookup.display_name_or_id(update.partner_id).await;
        let description =
            format_trade_description(&update.raw, update.trade_id, update.partner_id, &partner);
        self.sink
            .broadcast(&messages::trade_notification(
                &partner,
                &description,
                update.accepted,
                update.trade_id,
                timestamp,
            ))
            .await
            .map_err(|e| anyhow!(e))
    }

    async fn relay_offer(&self, update: OfferReviewUpdate, timestamp: &str) -> Result<()> {
        match update {
            OfferReviewUpdate::Status { raw } => self
                .sink
                .broadcast(&messages::offer_status_notification(&raw, timestamp))
                .await
                .map_err(|e| anyhow!(e)),
            OfferReviewUpdate::Pending {
                offer_id,
                partner_id,
                raw,
            } => {
                let partner = self.lookup.display_name_or_id(partner_id).await;
                let description = format_offer_description(
                    &raw,
                    offer_id,
                    partner_id,
                    &partner,
                    to_id64(partner_id),
                );

                // Offers waiting for review need a human decision, so the
                // owners get pinged before the channels see the details.
                let mentions = human_join(&self.config.owners, ", ", "and");
                let _ = self
                    .sink
                    .notify_owners(&messages::owners_check_this(&mentions))
                    .await;

                self.sink
                    .broadcast(&messages::offer_pending_notification(
                        &partner,
                        &description,
                        offer_id,
                        timestamp,
                    ))
                    .await
                    .map_err(|e| anyhow!(e))
            }
        }
    }

    async fn relay_user_message(&self, user: UserMessage) -> Result<()> {
        tracing::debug!("Holding a user message for acknowledgement: {}", user.raw);
        let alert = messages::user_message_alert(&user.sender, &user.body);
        {
            // A newer user message replaces whatever was pending.
            *self.pending_user_message.lock().await = Some(user);
        }
        self.sink
            .notify_owners(&alert)
            .await
            .map_err(|e| anyhow!(e))
    }

    /// Clears the pending user message. Returns whether there was one.
    pub async fn acknowledge(&self) -> bool {
        self.pending_user_message.lock().await.take().is_some()
    }

    pub async fn has_pending_user_message(&self) -> bool {
        self.pending_user_message.lock().await.is_some()
    }

    /// Re-pings the owners about an unacknowledged user message.
    /// Called by the reminder loop in main.
    pub async fn remind_pending(&self) {
        let pending = self.pending_user_message.lock().await.clone();
        if let Some(user) = pending {
            let alert = messages::user_message_alert(&user.sender, &user.body);
            if let Err(e) = self.sink.notify_owners(&alert).await {
                tracing::warn!("Failed to re-send the user message reminder: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::config::PricingConfig;
    use crate::domain::traits::HttpTransport;
    use crate::domain::types::TransportResponse;
    use crate::infrastructure::http::RetryClient;

    #[derive(Default)]
    struct RecordingSink {
        broadcasts: StdMutex<Vec<String>>,
        owner_notes: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn broadcast(&self, content: &str) -> Result<(), String> {
            self.broadcasts.lock().unwrap().push(content.to_string());
            Ok(())
        }

        async fn notify_owners(&self, content: &str) -> Result<(), String> {
            self.owner_notes.lock().unwrap().push(content.to_string());
            Ok(())
        }
    }

    struct NoTransport;

    #[async_trait]
    impl HttpTransport for NoTransport {
        async fn execute(&self, _method: &str, _url: &str) -> Result<TransportResponse, String> {
            Ok(TransportResponse {
                status: 404,
                retry_after: None,
                content_type: None,
                body: String::new(),
            })
        }
    }

    fn engine() -> (Arc<RecordingSink>, RelayEngine) {
        let sink = Arc::new(RecordingSink::default());
        let config = RelayConfig {
            bot_room: "!bot:example.org".to_string(),
            bot_users: vec!["@automatic:example.org".to_string()],
            channels: vec!["!team:example.org".to_string()],
            owner_rooms: vec![],
            owners: vec!["@alice:example.org".to_string()],
            reminder_minutes: 10,
            send_delay_secs: 0,
        };
        // No API key configured, so partner lookups fall back to IDs.
        let lookup = PlayerLookup::new(
            RetryClient::new(Arc::new(NoTransport)),
            &PricingConfig::default(),
        );
        let relay = RelayEngine::new(config, sink.clone(), lookup);
        (sink, relay)
    }

    #[tokio::test]
    async fn trades_are_broadcast_formatted() {
        let (sink, relay) = engine();
        relay
            .handle_bot_message(InboundMessage::new(
                "@automatic:example.org",
                "Trade #100 with 456 is accepted. Summary: fine",
            ))
            .await
            .unwrap();

        let broadcasts = sink.broadcasts.lock().unwrap();
        assert_eq!(broadcasts.len(), 1);
        assert!(broadcasts[0].contains("✅"));
        assert!(broadcasts[0].contains("has been marked as accepted"));
        assert!(broadcasts[0].contains("Trade #100"));
        // Lookup fell back to the 64-bit ID.
        assert!(broadcasts[0].contains("76561197960266184"));
    }

    #[tokio::test]
    async fn pending_offers_ping_the_owners_first() {
        let (sink, relay) = engine();
        relay
            .handle_bot_message(InboundMessage::new(
                "@automatic:example.org",
                "Offer #5 from 456 is waiting for review. Summary: a hat",
            ))
            .await
            .unwrap();

        let owner_notes = sink.owner_notes.lock().unwrap();
        assert_eq!(owner_notes.len(), 1);
        assert!(owner_notes[0].contains("@alice:example.org check this!"));

        let broadcasts = sink.broadcasts.lock().unwrap();
        assert_eq!(broadcasts.len(), 1);
        assert!(broadcasts[0].contains("An offer (#5)"));
    }

    #[tokio::test]
    async fn status_offers_skip_the_owner_ping() {
        let (sink, relay) = engine();
        relay
            .handle_bot_message(InboundMessage::new(
                "@automatic:example.org",
                "Offer #5 from 456 is not active",
            ))
            .await
            .unwrap();

        assert!(sink.owner_notes.lock().unwrap().is_empty());
        let broadcasts = sink.broadcasts.lock().unwrap();
        assert!(broadcasts[0].contains("Offer review status:"));
        assert!(broadcasts[0].contains("Offer #5 from 456 is not active"));
    }

    #[tokio::test]
    async fn user_messages_go_to_owners_and_stay_pending() {
        let (sink, relay) = engine();
        relay
            .handle_bot_message(InboundMessage::new(
                "@automatic:example.org",
                "Message from Alice: hello there",
            ))
            .await
            .unwrap();

        assert!(sink.broadcasts.lock().unwrap().is_empty());
        {
            let owner_notes = sink.owner_notes.lock().unwrap();
            assert!(owner_notes[0].contains("Message from Alice"));
            assert!(owner_notes[0].contains("> hello there"));
        }

        assert!(relay.has_pending_user_message().await);
        relay.remind_pending().await;
        assert_eq!(sink.owner_notes.lock().unwrap().len(), 2);

        assert!(relay.acknowledge().await);
        assert!(!relay.has_pending_user_message().await);
        relay.remind_pending().await;
        assert_eq!(sink.owner_notes.lock().unwrap().len(), 2);
        assert!(!relay.acknowledge().await);
    }

    #[tokio::test]
    async fn unrecognized_lines_are_broadcast_verbatim() {
        let (sink, relay) = engine();
        relay
            .handle_bot_message(InboundMessage::new(
                "@automatic:example.org",
                "Polling 3 offers",
            ))
            .await
            .unwrap();

        let broadcasts = sink.broadcasts.lock().unwrap();
        assert!(broadcasts[0].contains("New message:"));
        assert!(broadcasts[0].contains("Polling 3 offers"));
    }
}
