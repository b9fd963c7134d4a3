#![recursion_limit = "256"]
//! # Main Entry Point
//!
//! Initializes the relay:
//! - Domain: Configuration and Types
//! - Infrastructure: Matrix, Retrying HTTP client, Lookups
//! - Application: Relay Engine, Router, State
//! - Interface: Command Handlers
//!
//! The bot room carries the automation process's raw lines and receives
//! forwarded commands; every other room is routed as team-chat commands.

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent},
        message::{MessageType, SyncRoomMessageEvent},
    },
};
use tokio::sync::Mutex;

use crate::application::relay::RelayEngine;
use crate::application::report::{self, ProfitHistory, ProfitSummary};
use crate::application::router::CommandRouter;
use crate::application::state::BotState;
use crate::domain::config::AppConfig;
use crate::domain::traits::NotificationSink;
use crate::domain::types::InboundMessage;
use crate::infrastructure::http::{ReqwestTransport, RetryClient};
use crate::infrastructure::lookup::PlayerLookup;
use crate::infrastructure::matrix::{BotLink, MatrixService, MatrixSink};
use crate::infrastructure::{pricing, update_check};
use crate::strings::messages;

#[derive(Parser)]
#[command(name = "autorelay", about = "Relay between a trading bot and a team-chat space")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "data/config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config_content = fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read {}", cli.config))?;
    let config: AppConfig =
        serde_yaml::from_str(&config_content).context("Failed to parse the config file")?;

    // 2. Logging Setup
    // Ensure data directory exists
    if !std::path::Path::new("data").exists() {
        fs::create_dir("data").context("Failed to create data directory")?;
    }

    // Clear previous session log
    let log_path = std::path::Path::new("data/session.log");
    if log_path.exists() {
        let _ = fs::remove_file(log_path);
    }

    let file_appender = tracing_appender::rolling::never("data", "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("Starting autorelay...");

    // 3. Initialize Infrastructure
    let transport = Arc::new(ReqwestTransport::new().map_err(|e| anyhow!(e))?);
    let http = RetryClient::new(transport);
    let lookup = PlayerLookup::new(http.clone(), &config.pricing);

    // 4. Application State
    let state = Arc::new(Mutex::new(BotState::load()));

    // 5. Matrix Setup
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .send()
        .await?;

    tracing::info!("Logged in as {}", config.services.matrix.username);

    let sink: Arc<dyn NotificationSink> = Arc::new(MatrixSink::new(client.clone(), &config.relay));
    let bot_link = Arc::new(BotLink::new(client.clone(), &config.relay).map_err(|e| anyhow!(e))?);
    let relay = Arc::new(RelayEngine::new(
        config.relay.clone(),
        sink.clone(),
        lookup,
    ));

    let launch_time = Local::now();
    let start_time = std::time::SystemTime::now();

    // 6. Background Loops
    // Re-ping the owners about unacknowledged user messages
    let reminder_relay = relay.clone();
    let reminder_secs = config.relay.reminder_minutes.max(1) * 60;
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(reminder_secs)).await;
            reminder_relay.remind_pending().await;
        }
    });

    // Daily profit snapshot at 23:59 local
    let snapshot_config = config.clone();
    let snapshot_http = http.clone();
    let snapshot_state = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;

            let now = Local::now();
            if now.format("%H:%M").to_string() != "23:59"
                || snapshot_config.reporting.polldata_paths.is_empty()
            {
                continue;
            }
            let today = report::today_key(now);
            let already_recorded = {
                let guard = snapshot_state.lock().await;
                guard.last_snapshot_date.as_deref() == Some(today.as_str())
            };
            if already_recorded {
                continue;
            }

            match daily_snapshot(&snapshot_config, &snapshot_http, &today).await {
                Ok(()) => {
                    let mut guard = snapshot_state.lock().await;
                    guard.last_snapshot_date = Some(today);
                    guard.save();
                }
                Err(e) => tracing::warn!("Daily profit snapshot failed: {e}"),
            }
        }
    });

    // Daily upstream update check
    if config.update_check.enabled && !config.update_check.repo.is_empty() {
        let update_http = http.clone();
        let update_sink = sink.clone();
        let update_state = state.clone();
        let repo = config.update_check.repo.clone();
        tokio::spawn(async move {
            loop {
                if let Some(info) = update_check::latest_commit(&update_http, &repo).await {
                    let known = {
                        let guard = update_state.lock().await;
                        guard.last_seen_commit.clone()
                    };
                    // The first check only records a baseline.
                    if let Some(known_sha) = known
                        && known_sha != info.sha
                    {
                        let _ = update_sink
                            .notify_owners(&messages::update_available(&info.sha, &info.message))
                            .await;
                    }
                    let mut guard = update_state.lock().await;
                    guard.last_seen_commit = Some(info.sha);
                    guard.save();
                }
                tokio::time::sleep(std::time::Duration::from_secs(60 * 60 * 24)).await;
            }
        });
    }

    // 7. Event Handlers
    let loop_config = config.clone();
    let loop_state = state.clone();
    let loop_relay = relay.clone();
    let loop_bot_link = bot_link.clone();
    let loop_http = http.clone();

    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let config = loop_config.clone();
        let state = loop_state.clone();
        let relay = loop_relay.clone();
        let bot_link = loop_bot_link.clone();
        let http = loop_http.clone();

        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };

            // Ignore events older than start_time
            let ts = ev.origin_server_ts();
            let event_time =
                std::time::UNIX_EPOCH + std::time::Duration::from_millis(ts.get().into());
            if event_time < start_time {
                return;
            }

            let MessageType::Text(text_content) = &original_msg.content.msgtype else {
                return;
            };
            let body = &text_content.body;
            if original_msg.sender == room.own_user_id() {
                return;
            }
            let sender = original_msg.sender.as_str();

            // Lines the automation process posts in its room go to the relay
            // engine; everything else is routed as a command.
            if room.room_id().as_str() == config.relay.bot_room {
                if config.relay.bot_users.iter().any(|u| u == sender) {
                    tracing::info!("Received a line from the bot: {body}");
                    if let Err(e) = relay
                        .handle_bot_message(InboundMessage::new(sender, body))
                        .await
                    {
                        tracing::error!("Failed to relay a bot message: {e}");
                    }
                }
                return;
            }

            let chat = MatrixService::new(room);
            let router = CommandRouter::new(config, state, relay, bot_link, http, launch_time);
            if let Err(e) = router.route(&chat, body, sender).await {
                tracing::error!("Failed to route message: {e}");
            }
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            let _ = room.join().await;
        }
    });

    // 8. Sync Loop
    let sync_client = client.clone();
    let sync_handle = tokio::spawn(async move { sync_client.sync(SyncSettings::default()).await });
    match sync_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Matrix sync failed: {e}"),
        Err(e) => tracing::error!("Matrix sync panic: {e}"),
    }

    Ok(())
}

/// Recomputes the day's totals and appends them to the history file. The
/// snapshot is skipped (and retried next minute) when the key price can't be
/// fetched, since history rows are stored in keys.
async fn daily_snapshot(config: &AppConfig, http: &RetryClient, today: &str) -> Result<()> {
    let midnight = report::local_midnight_ms();
    let mut summary = ProfitSummary::default();
    for path in &config.reporting.polldata_paths {
        let data = report::load_polldata(path)?;
        summary.absorb(&report::compute_profit(&data, midnight));
    }

    let key_price = pricing::fetch_key_price(http, &config.pricing)
        .await
        .map_err(|e| anyhow!(e))?
        .ok_or_else(|| anyhow!("key price unavailable"))?;

    let mut history = ProfitHistory::load(&config.reporting.history_path);
    history.record(today, &summary, key_price.sell_metal);
    history.save(&config.reporting.history_path)?;
    tracing::info!("Recorded the daily profit snapshot for {today}");
    Ok(())
}
