//! # Send Command
//!
//! Handles `.send`: forwards a raw command line to the automation process
//! verbatim, e.g. `.send !message 76561198248053954 Get on steam`.

use anyhow::Result;

use crate::domain::traits::ChatProvider;
use crate::infrastructure::matrix::BotLink;
use crate::strings::messages;

pub async fn handle_send(bot_link: &BotLink, chat: &impl ChatProvider, args: &str) -> Result<()> {
    let line = args.trim();
    if line.is_empty() {
        chat.send_notification(messages::SEND_USAGE)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let _ = chat.typing(true).await;
    let outcome = bot_link.send_command(line).await;
    let _ = chat.typing(false).await;

    match outcome {
        Ok(()) => {
            chat.send_message(&messages::sent_to_bot(line))
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        Err(e) => {
            chat.send_notification(&messages::forward_failed(&e))
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }
    Ok(())
}
