//! # Miscellaneous Commands
//!
//! Handles `.acknowledged`, `.status`, `.uptime` and `.ping`.

use chrono::{DateTime, Local};

use anyhow::Result;

use crate::application::formatter::human_delta;
use crate::application::relay::RelayEngine;
use crate::domain::config::AppConfig;
use crate::domain::traits::ChatProvider;
use crate::strings::messages;

pub async fn handle_acknowledged(relay: &RelayEngine, chat: &impl ChatProvider) -> Result<()> {
    let message = if relay.acknowledge().await {
        messages::ACKNOWLEDGED
    } else {
        messages::NO_USER_MESSAGE
    };
    chat.send_message(message)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}

pub async fn handle_status(
    config: &AppConfig,
    relay: &RelayEngine,
    chat: &impl ChatProvider,
    launch_time: DateTime<Local>,
) -> Result<()> {
    let uptime = human_delta((Local::now() - launch_time).num_seconds());
    let msg = messages::relay_status_msg(
        &config.relay.bot_room,
        config.relay.channels.len(),
        relay.has_pending_user_message().await,
        &uptime,
    );
    chat.send_message(&msg)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}

pub async fn handle_uptime(chat: &impl ChatProvider, launch_time: DateTime<Local>) -> Result<()> {
    let uptime = human_delta((Local::now() - launch_time).num_seconds());
    chat.send_message(&messages::uptime_msg(&uptime))
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}

/// Round-trips one message and edits the measured latency into it.
pub async fn handle_ping(chat: &impl ChatProvider) -> Result<()> {
    let start = std::time::Instant::now();
    let event_id = chat
        .send_message("🏓 Pong!")
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    let millis = start.elapsed().as_secs_f64() * 1000.0;

    chat.edit_message(&event_id, &messages::pong(millis))
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
