//! # Classifieds Commands
//!
//! Handles `.add`, `.update` and `.remove`. Items are turned into the
//! automation process's `!<verb> name=<item>` command lines and queued behind
//! a `.yes`/`.no` confirmation before anything is forwarded.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::application::formatter::human_join;
use crate::application::state::BotState;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::matrix::BotLink;
use crate::strings::messages;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassifiedsAction {
    Add,
    Update,
    Remove,
}

impl ClassifiedsAction {
    pub fn verb(self) -> &'static str {
        match self {
            ClassifiedsAction::Add => "add",
            ClassifiedsAction::Update => "update",
            ClassifiedsAction::Remove => "remove",
        }
    }
}

/// One `!verb name=item` line per comma-separated item.
pub fn build_commands(action: ClassifiedsAction, args: &str) -> Vec<String> {
    args.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| format!("!{} name={}", action.verb(), item))
        .collect()
}

pub async fn handle_classifieds(
    state: &Arc<Mutex<BotState>>,
    chat: &impl ChatProvider,
    action: ClassifiedsAction,
    args: &str,
) -> Result<()> {
    let commands = build_commands(action, args);
    if commands.is_empty() {
        chat.send_notification(&messages::classifieds_usage(action.verb()))
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let pretty = human_join(&commands, "`, `", "` and `");
    {
        let mut guard = state.lock().await;
        guard.get_room_state(&chat.room_id()).pending_commands = Some(commands.clone());
        guard.save();
    }

    chat.send_message(&messages::confirm_send(&pretty, commands.len()))
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

/// Resolves the room's pending approval. Returns false when nothing was
/// queued, so the router can tell the user.
pub async fn handle_approval(
    state: &Arc<Mutex<BotState>>,
    bot_link: &BotLink,
    chat: &impl ChatProvider,
    approve: bool,
) -> Result<bool> {
    let pending = {
        let mut guard = state.lock().await;
        let taken = guard.get_room_state(&chat.room_id()).pending_commands.take();
        if taken.is_some() {
            guard.save();
        }
        taken
    };

    let Some(commands) = pending else {
        return Ok(false);
    };

    if !approve {
        chat.send_message(messages::COMMAND_NOT_SENT)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(true);
    }

    let _ = chat.typing(true).await;
    let outcome = bot_link.send_commands(&commands).await;
    let _ = chat.typing(false).await;

    match outcome {
        Ok(count) => {
            chat.send_message(&messages::commands_sent(count))
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        Err(e) => {
            chat.send_notification(&messages::forward_failed(&e))
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_item_builds_one_command() {
        assert_eq!(
            build_commands(ClassifiedsAction::Add, "The Team Captain"),
            vec!["!add name=The Team Captain".to_string()]
        );
    }

    #[test]
    fn comma_separated_items_build_a_batch() {
        assert_eq!(
            build_commands(ClassifiedsAction::Update, "This&intent=sell, That , The other"),
            vec![
                "!update name=This&intent=sell".to_string(),
                "!update name=That".to_string(),
                "!update name=The other".to_string(),
            ]
        );
    }

    #[test]
    fn remove_uses_the_remove_verb() {
        assert_eq!(
            build_commands(ClassifiedsAction::Remove, "A Hat"),
            vec!["!remove name=A Hat".to_string()]
        );
    }

    #[test]
    fn blank_input_builds_nothing() {
        assert!(build_commands(ClassifiedsAction::Add, "  , ,").is_empty());
        assert!(build_commands(ClassifiedsAction::Add, "").is_empty());
    }
}
