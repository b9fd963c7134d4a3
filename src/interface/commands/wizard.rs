//! # Command-Creator Wizard
//!
//! Handles `.scc`, a stepwise builder for classifieds commands. While a
//! wizard is active the router sends every message in the room here; the
//! steps collect an action, an item name and optional pricing/stock
//! modifiers, then ask for confirmation before forwarding the result.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::application::formatter::human_join;
use crate::application::state::{BotState, WizardState, WizardStep};
use crate::domain::traits::ChatProvider;
use crate::strings::wizard as texts;

const OPTIONS: &[&str] = &["price", "limit", "quality", "intent", "craftable", "autoprice"];
const QUALITIES: &[&str] = &["unique", "strange", "vintage", "genuine", "haunted", "collector's"];
const INTENTS: &[&str] = &["bank", "buy", "sell"];

/// What the router should do after a wizard step.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardAction {
    Continue,
    /// Forward the finished command line to the bot room.
    Forward { command: String },
}

/// The permissive yes/no vocabulary users actually type.
pub fn parse_bool(input: &str) -> Option<bool> {
    match input {
        "yes" | "y" | "ye" | "yea" | "yeah" | "true" | "t" | "on" | "enable" | "1" => Some(true),
        "no" | "n" | "nop" | "nope" | "false" | "f" | "off" | "disable" | "0" => Some(false),
        _ => None,
    }
}

pub async fn start(state: &Arc<Mutex<BotState>>, chat: &impl ChatProvider) -> Result<()> {
    {
        let mut guard = state.lock().await;
        let wizard = &mut guard.get_room_state(&chat.room_id()).wizard;
        wizard.reset();
        wizard.active = true;
        wizard.step = Some(WizardStep::Action);
    }
    chat.send_message(texts::WHAT_DO)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}

pub async fn handle_step(
    state: &Arc<Mutex<BotState>>,
    chat: &impl ChatProvider,
    message: &str,
) -> Result<WizardAction> {
    let input = message.trim();
    let lowered = input.to_lowercase();

    let mut replies: Vec<String> = Vec::new();
    let mut action = WizardAction::Continue;

    {
        let mut guard = state.lock().await;
        let wizard = &mut guard.get_room_state(&chat.room_id()).wizard;
        if !wizard.active {
            return Ok(WizardAction::Continue);
        }

        if lowered == ".cancel" {
            wizard.reset();
            replies.push(texts::WIZARD_CANCELLED.to_string());
        } else {
            action = step(wizard, input, &lowered, &mut replies);
        }
    }

    for reply in replies {
        chat.send_message(&reply)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    Ok(action)
}

fn step(
    wizard: &mut WizardState,
    input: &str,
    lowered: &str,
    replies: &mut Vec<String>,
) -> WizardAction {
    match wizard.step.clone() {
        Some(WizardStep::Action) => {
            let action = match lowered {
                "update" | "u" => Some("update"),
                "add" | "a" => Some("add"),
                "remove" | "r" => Some("remove"),
                _ => None,
            };
            match action {
                Some(action) => {
                    wizard.data.insert("action".to_string(), action.to_string());
                    wizard.step = Some(WizardStep::ItemName);
                    replies.push(texts::item_prompt(action));
                }
                None => replies.push(texts::invalid_option(input, "update/add/remove")),
            }
            WizardAction::Continue
        }
        Some(WizardStep::ItemName) => {
            if input.is_empty() {
                let action = wizard.data.get("action").cloned().unwrap_or_default();
                replies.push(texts::item_prompt(&action));
                return WizardAction::Continue;
            }
            wizard.data.insert("item".to_string(), input.to_string());
            wizard.data.insert("command".to_string(), input.to_string());

            let action = wizard.data.get("action").cloned().unwrap_or_default();
            if action == "remove" {
                finalize(wizard, replies);
            } else {
                wizard.step = Some(WizardStep::OptionKey);
                replies.push(texts::options_prompt(&remaining_options(wizard)));
            }
            WizardAction::Continue
        }
        Some(WizardStep::OptionKey) => {
            if lowered == "done" || lowered == "escape" || lowered == "esc" {
                finalize(wizard, replies);
                return WizardAction::Continue;
            }
            let known = OPTIONS.contains(&lowered);
            let used = wizard.used_options.iter().any(|o| o == &lowered);
            if known && !used {
                wizard.current_option = Some(lowered.to_string());
                wizard.option_buffer.clear();
                wizard.step = Some(WizardStep::OptionValue);
                replies.push(option_prompt(&lowered, 0).to_string());
            } else {
                replies.push(texts::invalid_option(input, &remaining_options(wizard)));
            }
            WizardAction::Continue
        }
        Some(WizardStep::OptionValue) => {
            handle_option_value(wizard, input, lowered, replies);
            WizardAction::Continue
        }
        Some(WizardStep::Confirm) => match parse_bool(lowered) {
            Some(true) => {
                let command = wizard.data.get("final").cloned().unwrap_or_default();
                wizard.reset();
                WizardAction::Forward { command }
            }
            Some(false) => {
                wizard.reset();
                replies.push(texts::NOT_SENT.to_string());
                WizardAction::Continue
            }
            None => {
                replies.push(texts::invalid_bool(input));
                WizardAction::Continue
            }
        },
        None => WizardAction::Continue,
    }
}

fn handle_option_value(
    wizard: &mut WizardState,
    input: &str,
    lowered: &str,
    replies: &mut Vec<String>,
) {
    let Some(option) = wizard.current_option.clone() else {
        wizard.step = Some(WizardStep::OptionKey);
        return;
    };
    let action = wizard.data.get("action").cloned().unwrap_or_default();

    match option.as_str() {
        "price" => {
            if lowered.parse::<f64>().is_err() {
                replies.push(texts::not_a_digit(input));
                return;
            }
            wizard.option_buffer.push(lowered.to_string());
            if wizard.option_buffer.len() < 4 {
                replies.push(option_prompt("price", wizard.option_buffer.len()).to_string());
                return;
            }
            let suffix = format!(
                "&buy.metal={}&buy.keys={}&sell.metal={}&sell.keys={}",
                wizard.option_buffer[0],
                wizard.option_buffer[1],
                wizard.option_buffer[2],
                wizard.option_buffer[3],
            );
            append_suffix(wizard, &suffix);
            complete_option(wizard, "price", replies);
        }
        "limit" => {
            if lowered.parse::<u64>().is_err() {
                replies.push(texts::not_a_digit(input));
                return;
            }
            append_suffix(wizard, &format!("&limit={lowered}"));
            complete_option(wizard, "limit", replies);
        }
        "quality" => {
            if !QUALITIES.contains(&lowered) {
                let qualities: Vec<String> = QUALITIES.iter().map(|q| q.to_string()).collect();
                replies.push(texts::invalid_option(input, &human_join(&qualities, "/", "or")));
                return;
            }
            // Updates address the listing by its prefixed name; additions
            // carry the quality as a modifier instead.
            if action == "update" {
                prepend_prefix(wizard, lowered);
            } else {
                append_suffix(wizard, &format!("&quality={lowered}"));
            }
            complete_option(wizard, "quality", replies);
        }
        "intent" => {
            if !INTENTS.contains(&lowered) {
                let intents: Vec<String> = INTENTS.iter().map(|i| i.to_string()).collect();
                replies.push(texts::invalid_option(input, &human_join(&intents, "/", "or")));
                return;
            }
            append_suffix(wizard, &format!("&intent={lowered}"));
            complete_option(wizard, "intent", replies);
        }
        "craftable" => {
            let Some(craftable) = parse_bool(lowered) else {
                replies.push(texts::invalid_bool(input));
                return;
            };
            if action == "update" {
                prepend_prefix(wizard, if craftable { "Craftable" } else { "Non-Craftable" });
            } else {
                append_suffix(wizard, &format!("&craftable={craftable}"));
            }
            complete_option(wizard, "craftable", replies);
        }
        "autoprice" => {
            let Some(enabled) = parse_bool(lowered) else {
                replies.push(texts::invalid_bool(input));
                return;
            };
            append_suffix(wizard, &format!("&autoprice={enabled}"));
            complete_option(wizard, "autoprice", replies);
        }
        _ => {
            wizard.current_option = None;
            wizard.step = Some(WizardStep::OptionKey);
        }
    }
}

fn append_suffix(wizard: &mut WizardState, suffix: &str) {
    let command = wizard.data.entry("command".to_string()).or_default();
    command.push_str(suffix);
}

fn prepend_prefix(wizard: &mut WizardState, prefix: &str) {
    let command = wizard.data.entry("command".to_string()).or_default();
    *command = format!("{prefix} {command}");
}

fn complete_option(wizard: &mut WizardState, option: &str, replies: &mut Vec<String>) {
    wizard.used_options.push(option.to_string());
    wizard.current_option = None;
    wizard.option_buffer.clear();
    wizard.step = Some(WizardStep::OptionKey);
    replies.push(texts::options_prompt(&remaining_options(wizard)));
}

fn finalize(wizard: &mut WizardState, replies: &mut Vec<String>) {
    let action = wizard.data.get("action").cloned().unwrap_or_default();
    let item = wizard.data.get("item").cloned().unwrap_or_default();
    let command = wizard.data.get("command").cloned().unwrap_or_default();
    let final_command = format!("!{action} name={command}");
    replies.push(texts::confirm_command(&action, &item, &final_command));
    wizard.data.insert("final".to_string(), final_command);
    wizard.step = Some(WizardStep::Confirm);
}

fn remaining_options(wizard: &WizardState) -> String {
    let remaining: Vec<String> = OPTIONS
        .iter()
        .filter(|o| !wizard.used_options.iter().any(|u| u == *o))
        .map(|o| o.to_string())
        .collect();
    human_join(&remaining, "/", "or")
}

fn option_prompt(option: &str, answers_so_far: usize) -> &'static str {
    match (option, answers_so_far) {
        ("price", 0) => texts::BUY_METAL,
        ("price", 1) => texts::BUY_KEYS,
        ("price", 2) => texts::SELL_METAL,
        ("price", _) => texts::SELL_KEYS,
        ("limit", _) => texts::LIMIT,
        ("quality", _) => texts::QUALITY,
        ("intent", _) => texts::INTENT,
        ("craftable", _) => texts::CRAFTABLE,
        _ => texts::AUTOPRICE,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct MockChat {
        sent: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatProvider for MockChat {
        fn room_id(&self) -> String {
            "!room:example.org".to_string()
        }

        async fn send_message(&self, content: &str) -> Result<String, String> {
            self.sent.lock().unwrap().push(content.to_string());
            Ok("$event".to_string())
        }

        async fn edit_message(&self, _message_id: &str, _content: &str) -> Result<(), String> {
            Ok(())
        }

        async fn send_notification(&self, content: &str) -> Result<(), String> {
            self.sent.lock().unwrap().push(content.to_string());
            Ok(())
        }

        async fn typing(&self, _active: bool) -> Result<(), String> {
            Ok(())
        }
    }

    async fn drive(
        state: &Arc<Mutex<BotState>>,
        chat: &MockChat,
        inputs: &[&str],
    ) -> WizardAction {
        let mut last = WizardAction::Continue;
        for input in inputs {
            last = handle_step(state, chat, input).await.unwrap();
        }
        last
    }

    #[tokio::test]
    async fn add_with_intent_builds_the_full_command() {
        let state = Arc::new(Mutex::new(BotState::default()));
        let chat = MockChat::default();
        start(&state, &chat).await.unwrap();

        let action = drive(
            &state,
            &chat,
            &["add", "The Team Captain", "intent", "sell", "done", "yes"],
        )
        .await;

        assert_eq!(
            action,
            WizardAction::Forward {
                command: "!add name=The Team Captain&intent=sell".to_string()
            }
        );
        // The wizard is finished afterwards.
        let guard = state.lock().await;
        assert!(!guard.rooms["!room:example.org"].wizard.active);
    }

    #[tokio::test]
    async fn remove_skips_the_option_loop() {
        let state = Arc::new(Mutex::new(BotState::default()));
        let chat = MockChat::default();
        start(&state, &chat).await.unwrap();

        drive(&state, &chat, &["remove", "A Hat"]).await;
        let sent = chat.sent.lock().unwrap();
        assert!(
            sent.last()
                .unwrap()
                .contains("Command to remove A Hat is `!remove name=A Hat`")
        );
    }

    #[tokio::test]
    async fn declining_the_confirmation_sends_nothing() {
        let state = Arc::new(Mutex::new(BotState::default()));
        let chat = MockChat::default();
        start(&state, &chat).await.unwrap();

        let action = drive(&state, &chat, &["remove", "A Hat", "no"]).await;
        assert_eq!(action, WizardAction::Continue);
        let sent = chat.sent.lock().unwrap();
        assert_eq!(sent.last().unwrap(), texts::NOT_SENT);
    }

    #[tokio::test]
    async fn price_collects_four_numbers() {
        let state = Arc::new(Mutex::new(BotState::default()));
        let chat = MockChat::default();
        start(&state, &chat).await.unwrap();

        let action = drive(
            &state,
            &chat,
            &["add", "A Hat", "price", "10", "0", "12.5", "0", "done", "yes"],
        )
        .await;

        assert_eq!(
            action,
            WizardAction::Forward {
                command: "!add name=A Hat&buy.metal=10&buy.keys=0&sell.metal=12.5&sell.keys=0"
                    .to_string()
            }
        );
    }

    #[tokio::test]
    async fn update_quality_prefixes_the_name() {
        let state = Arc::new(Mutex::new(BotState::default()));
        let chat = MockChat::default();
        start(&state, &chat).await.unwrap();

        let action = drive(
            &state,
            &chat,
            &["update", "Team Captain", "quality", "strange", "done", "yes"],
        )
        .await;

        assert_eq!(
            action,
            WizardAction::Forward {
                command: "!update name=strange Team Captain".to_string()
            }
        );
    }

    #[tokio::test]
    async fn unknown_option_reprompts() {
        let state = Arc::new(Mutex::new(BotState::default()));
        let chat = MockChat::default();
        start(&state, &chat).await.unwrap();

        drive(&state, &chat, &["add", "A Hat", "colour"]).await;
        let sent = chat.sent.lock().unwrap();
        assert!(sent.last().unwrap().contains("not a recognised option"));
    }

    #[tokio::test]
    async fn each_option_is_usable_once() {
        let state = Arc::new(Mutex::new(BotState::default()));
        let chat = MockChat::default();
        start(&state, &chat).await.unwrap();

        drive(&state, &chat, &["add", "A Hat", "limit", "3", "limit"]).await;
        let sent = chat.sent.lock().unwrap();
        assert!(sent.last().unwrap().contains("not a recognised option"));
    }

    #[tokio::test]
    async fn cancel_aborts_the_wizard() {
        let state = Arc::new(Mutex::new(BotState::default()));
        let chat = MockChat::default();
        start(&state, &chat).await.unwrap();

        drive(&state, &chat, &["add", ".cancel"]).await;
        assert!(!state.lock().await.rooms["!room:example.org"].wizard.active);
        let sent = chat.sent.lock().unwrap();
        assert_eq!(sent.last().unwrap(), texts::WIZARD_CANCELLED);
    }

    #[test]
    fn bool_vocabulary() {
        assert_eq!(parse_bool("yeah"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("dunno"), None);
    }
}
