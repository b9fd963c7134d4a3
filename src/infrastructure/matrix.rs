//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` and `NotificationSink` traits for the Matrix
//! protocol using the `matrix_sdk`. This module acts as the bridge between the
//! generic interfaces used by the relay's core logic and the specific
//! implementation details of the Matrix SDK.

use std::convert::TryFrom;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use matrix_sdk::Client;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::relation::Replacement;
use matrix_sdk::ruma::events::room::message::{
    Relation, RoomMessageEventContent, RoomMessageEventContentWithoutRelation,
};
use matrix_sdk::ruma::{EventId, OwnedRoomId, RoomId};

use crate::domain::config::RelayConfig;
use crate::domain::traits::{ChatProvider, NotificationSink};

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self { room }
    }

    /// Helper to send markdown edits
    async fn internal_edit(&self, event_id: &str, new_content: &str) -> Result<()> {
        let event_id = <&EventId>::try_from(event_id)?;
        let mut content = RoomMessageEventContent::text_markdown(new_content);
        let replacement_content = RoomMessageEventContentWithoutRelation::from(content.clone());

        content.relates_to = Some(Relation::Replacement(Replacement::new(
            event_id.to_owned(),
            replacement_content,
        )));

        self.room.send(content).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    async fn send_message(&self, content: &str) -> Result<String, String> {
        tracing::debug!("Sending message to {}: {}", self.room_id(), content);
        self.room
            .send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }

    async fn edit_message(&self, message_id: &str, content: &str) -> Result<(), String> {
        self.internal_edit(message_id, content)
            .await
            .map_err(|e| e.to_string())
    }

    async fn send_notification(&self, content: &str) -> Result<(), String> {
        // Notifications are also markdown messages for now
        self.send_message(content).await.map(|_| ())
    }

    async fn typing(&self, active: bool) -> Result<(), String> {
        self.room
            .typing_notice(active)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Fans relay notifications out to the configured channel and owner rooms.
/// Rooms are resolved per send so delivery starts working as soon as the
/// initial sync has brought them in.
pub struct MatrixSink {
    client: Client,
    channels: Vec<OwnedRoomId>,
    owner_rooms: Vec<OwnedRoomId>,
}

impl MatrixSink {
    pub fn new(client: Client, config: &RelayConfig) -> Self {
        Self {
            channels: parse_room_ids(&config.channels),
            owner_rooms: parse_room_ids(&config.owner_rooms),
            client,
        }
    }

    async fn deliver(&self, rooms: &[OwnedRoomId], content: &str) -> Result<(), String> {
        for room_id in rooms {
            match self.client.get_room(room_id) {
                Some(room) => {
                    if let Err(e) = room
                        .send(RoomMessageEventContent::text_markdown(content))
                        .await
                    {
                        tracing::warn!("Failed to deliver to {room_id}: {e}");
                    }
                }
                None => tracing::warn!("Room {room_id} is not joined yet, skipping delivery"),
            }
        }
        Ok(())
    }
}

fn parse_room_ids(ids: &[String]) -> Vec<OwnedRoomId> {
    ids.iter()
        .filter_map(|id| match RoomId::parse(id) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::error!("Invalid room ID in config: {id}: {e}");
                None
            }
        })
        .collect()
}

#[async_trait]
impl NotificationSink for MatrixSink {
    async fn broadcast(&self, content: &str) -> Result<(), String> {
        self.deliver(&self.channels, content).await
    }

    async fn notify_owners(&self, content: &str) -> Result<(), String> {
        if self.owner_rooms.is_empty() {
            return self.deliver(&self.channels, content).await;
        }
        self.deliver(&self.owner_rooms, content).await
    }
}

/// The relay's link back to the automation process: forwards command lines
/// into the bot room, pacing batches so the process isn't flooded.
pub struct BotLink {
    client: Client,
    room_id: OwnedRoomId,
    send_delay: Duration,
}

impl BotLink {
    pub fn new(client: Client, config: &RelayConfig) -> Result<Self, String> {
        let room_id = RoomId::parse(&config.bot_room)
            .map_err(|e| format!("Invalid bot room ID {}: {e}", config.bot_room))?;
        Ok(Self {
            client,
            room_id,
            send_delay: Duration::from_secs(config.send_delay_secs),
        })
    }

    pub async fn send_command(&self, command: &str) -> Result<(), String> {
        let room = self
            .client
            .get_room(&self.room_id)
            .ok_or_else(|| format!("Bot room {} is not joined", self.room_id))?;
        tracing::info!("Forwarding to the bot: {command}");
        room.send(RoomMessageEventContent::text_plain(command))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    pub async fn send_commands(&self, commands: &[String]) -> Result<usize, String> {
        for (i, command) in commands.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.send_delay).await;
            }
            self.send_command(command).await?;
        }
        Ok(commands.len())
    }
}
