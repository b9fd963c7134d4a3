//! # Command Router
//!
//! Routes incoming messages from the team rooms to the appropriate command
//! handler (in `interface/commands`). It parses the command string
//! (e.g., `.profit`) and dispatches it with the necessary context. Owner-only
//! commands are gated against the configured owner list before dispatch.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local};
use tokio::sync::Mutex;

use crate::application::relay::RelayEngine;
use crate::application::state::BotState;
use crate::domain::config::AppConfig;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::http::RetryClient;
use crate::infrastructure::matrix::BotLink;
use crate::interface::commands;
use crate::interface::commands::classifieds::ClassifiedsAction;
use crate::interface::commands::report::PageNav;
use crate::interface::commands::wizard::WizardAction;
use crate::strings::messages;

pub struct CommandRouter {
    config: AppConfig,
    state: Arc<Mutex<BotState>>,
    relay: Arc<RelayEngine>,
    bot_link: Arc<BotLink>,
    http: RetryClient,
    launch_time: DateTime<Local>,
}

impl CommandRouter {
    pub fn new(
        config: AppConfig,
        state: Arc<Mutex<BotState>>,
        relay: Arc<RelayEngine>,
        bot_link: Arc<BotLink>,
        http: RetryClient,
        launch_time: DateTime<Local>,
    ) -> Self {
        Self {
            config,
            state,
            relay,
            bot_link,
            http,
            launch_time,
        }
    }

    fn is_owner(&self, sender: &str) -> bool {
        self.config
            .relay
            .owners
            .iter()
            .any(|o| o.eq_ignore_ascii_case(sender))
    }

    pub async fn route<C>(&self, chat: &C, message: &str, sender: &str) -> Result<()>
    where
        C: ChatProvider,
    {
        let msg = message.trim();

        // An active wizard intercepts everything in its room.
        let is_wizard_active = {
            let guard = self.state.lock().await;
            guard
                .rooms
                .get(&chat.room_id())
                .is_some_and(|room| room.wizard.active)
        };
        if is_wizard_active {
            match commands::wizard::handle_step(&self.state, chat, msg).await? {
                WizardAction::Forward { command } => match self.bot_link.send_command(&command).await {
                    Ok(()) => {
                        let _ = chat.send_message(crate::strings::wizard::SENT).await;
                    }
                    Err(e) => {
                        let _ = chat
                            .send_notification(&messages::forward_failed(&e))
                            .await;
                    }
                },
                WizardAction::Continue => {}
            }
            return Ok(());
        }

        if !msg.starts_with('.') {
            return Ok(());
        }

        let (cmd, args) = if let Some(idx) = msg.find(' ') {
            (&msg[..idx], msg[idx + 1..].trim())
        } else {
            (msg, "")
        };
        tracing::info!("Router dispatching cmd='{cmd}' args='{args}' sender='{sender}'");

        let owner_only = matches!(
            cmd,
            ".add"
                | ".update"
                | ".remove"
                | ".yes"
                | ".y"
                | ".ok"
                | ".approve"
                | ".no"
                | ".deny"
                | ".send"
                | ".acknowledged"
                | ".ack"
                | ".scc"
                | ".profit"
                | ".last"
        );
        if owner_only && !self.is_owner(sender) {
            let _ = chat.send_notification(messages::AUTH_DENIED).await;
            return Ok(());
        }

        match cmd {
            ".add" | ".update" | ".remove" => {
                let action = match cmd {
                    ".add" => ClassifiedsAction::Add,
                    ".update" => ClassifiedsAction::Update,
                    _ => ClassifiedsAction::Remove,
                };
                commands::classifieds::handle_classifieds(&self.state, chat, action, args).await?;
            }
            ".yes" | ".y" | ".ok" | ".approve" => {
                if !commands::classifieds::handle_approval(&self.state, &self.bot_link, chat, true)
                    .await?
                {
                    let _ = chat.send_notification(messages::NOTHING_PENDING).await;
                }
            }
            ".no" | ".deny" => {
                if !commands::classifieds::handle_approval(&self.state, &self.bot_link, chat, false)
                    .await?
                {
                    let _ = chat.send_notification(messages::NOTHING_PENDING).await;
                }
            }
            ".send" => {
                commands::send::handle_send(&self.bot_link, chat, args).await?;
            }
            ".acknowledged" | ".ack" => {
                commands::misc::handle_acknowledged(&self.relay, chat).await?;
            }
            ".scc" => {
                commands::wizard::start(&self.state, chat).await?;
            }
            ".profit" => {
                commands::report::handle_profit(&self.config, &self.http, chat).await?;
            }
            ".last" => {
                commands::report::handle_last(&self.config, &self.state, chat, args).await?;
            }
            ".next" => {
                commands::report::handle_page_nav(&self.state, chat, PageNav::Next).await?;
            }
            ".prev" => {
                commands::report::handle_page_nav(&self.state, chat, PageNav::Prev).await?;
            }
            ".close" => {
                commands::report::handle_page_nav(&self.state, chat, PageNav::Close).await?;
            }
            ".status" => {
                commands::misc::handle_status(&self.config, &self.relay, chat, self.launch_time)
                    .await?;
            }
            ".uptime" => {
                commands::misc::handle_uptime(chat, self.launch_time).await?;
            }
            ".ping" => {
                commands::misc::handle_ping(chat).await?;
            }
            ".help" => {
                commands::help::handle_help(chat).await?;
            }
            _ => {
                let _ = chat.send_message(messages::UNKNOWN_COMMAND).await;
            }
        }

        Ok(())
    }
}
