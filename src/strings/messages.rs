//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes error messages, status updates, and notification templates.

pub const AUTH_DENIED: &str = "🚫 **Authorization Denied**.";
pub const UNKNOWN_COMMAND: &str = "❓ Unknown command. Try `.help`.";

pub const SEND_USAGE: &str = "Usage: `.send <command>`";
pub const LAST_USAGE: &str = "Usage: `.last [days]` (days has to be an integer)";

pub fn classifieds_usage(verb: &str) -> String {
    format!("Usage: `.{verb} <item>[, <item>, ...]`")
}

pub fn confirm_send(pretty: &str, count: usize) -> String {
    if count == 1 {
        format!("Do you want to send this `{pretty}` command to the bot? Type `.yes` or `.no`.")
    } else {
        format!("Do you want to send these `{pretty}` commands to the bot? Type `.yes` or `.no`.")
    }
}

pub fn commands_sent(count: usize) -> String {
    if count == 1 {
        "Sent the command to the bot.".to_string()
    } else {
        format!("Sent {count} commands to the bot.")
    }
}

pub const COMMAND_NOT_SENT: &str = "The command hasn't been sent.";
pub const NOTHING_PENDING: &str = "Nothing is waiting for approval.";

pub fn sent_to_bot(command: &str) -> String {
    format!("Sent `{command}` to the bot.")
}

pub fn forward_failed(err: &str) -> String {
    format!("⚠️ Could not reach the bot room: {err}")
}

pub const ACKNOWLEDGED: &str = "✅ Acknowledged the user's message.";
pub const NO_USER_MESSAGE: &str = "No user message is waiting to be acknowledged.";

pub fn user_message_alert(sender: &str, body: &str) -> String {
    format!(
        "📨 **Message from {sender}**\nYou have a message from a user:\n> {body}\n\nType `.acknowledged` to stop receiving these messages."
    )
}

pub fn trade_notification(
    partner: &str,
    description: &str,
    accepted: bool,
    trade_id: u64,
    timestamp: &str,
) -> String {
    let icon = if accepted { "✅" } else { "❌" };
    format!("{icon} **Received a trade from: {partner}**\n{description}\n\n_Trade #{trade_id} • {timestamp}_")
}

pub fn offer_pending_notification(
    partner: &str,
    description: &str,
    offer_id: u64,
    timestamp: &str,
) -> String {
    format!("📋 **Offer from: {partner}**\n{description}\n\n_Offer #{offer_id} • {timestamp}_")
}

pub fn offer_status_notification(raw: &str, timestamp: &str) -> String {
    format!("**Offer review status:**\n{raw}\n\n_• {timestamp}_")
}

pub fn generic_notification(raw: &str, timestamp: &str) -> String {
    format!("**New message:**\n{raw}\n\n_• {timestamp}_")
}

pub fn owners_check_this(mentions: &str) -> String {
    format!("{mentions} check this!")
}

pub const NO_ACTIVE_PAGER: &str = "There is no open list to scroll.";

pub fn polldata_unreadable(path: &str, err: &str) -> String {
    format!("⚠️ Could not read polldata at `{path}`: {err}")
}

pub const NO_POLLDATA: &str =
    "⚠️ No polldata paths are configured. Set `reporting.polldata_paths` in the config.";

pub const NO_HISTORY: &str = "No profit history has been recorded yet.";

pub const KEY_PRICE_UNAVAILABLE: &str = "key price unavailable, amounts are in refined metal";

pub fn relay_status_msg(
    bot_room: &str,
    channels: usize,
    pending_user_message: bool,
    uptime: &str,
) -> String {
    let pending = if pending_user_message {
        "a user message awaits `.acknowledged`"
    } else {
        "none"
    };
    format!(
        "**Bot room**: {bot_room}\n**Channels**: {channels}\n**Pending**: {pending}\n**Uptime**: {uptime}"
    )
}

pub fn uptime_msg(uptime: &str) -> String {
    format!("🤖 Online for {uptime}.")
}

pub fn pong(millis: f64) -> String {
    format!("🏓 Pong! Message latency is `{millis:.2}` ms.")
}

pub fn update_available(sha: &str, message: &str) -> String {
    let short = &sha[..sha.len().min(7)];
    format!("⬆️ A new commit (`{short}`) has been pushed upstream:\n```\n{message}\n```")
}
