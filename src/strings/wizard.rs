//! # Wizard Text
//!
//! Prompts and notices for the interactive command-creator wizard.

pub const WHAT_DO: &str = "What do you want to do? `update`, `add` or `remove`?";
pub const WIZARD_CANCELLED: &str = "❌ Wizard cancelled.";
pub const SENT: &str = "👌 sent";
pub const NOT_SENT: &str = "👎 you didn't send the command";

pub fn item_prompt(action: &str) -> String {
    format!("What item do you want to {action}?")
}

pub fn options_prompt(remaining: &str) -> String {
    format!(
        "__You can change the:__ {remaining}\nType an option, or `done` if you don't want to change anything else."
    )
}

pub fn invalid_option(input: &str, options: &str) -> String {
    format!("\"{input}\" is not a recognised option. Please try again with any of {options}")
}

pub fn invalid_bool(input: &str) -> String {
    format!("\"{input}\" is not a recognised boolean option. Please try again")
}

pub fn not_a_digit(input: &str) -> String {
    format!("\"{input}\" is not a digit.")
}

pub const BUY_METAL: &str = "Buy price in refined metal";
pub const BUY_KEYS: &str = "Buy price in keys";
pub const SELL_METAL: &str = "Sell price in refined metal";
pub const SELL_KEYS: &str = "Sell price in keys";
pub const LIMIT: &str = "Max stock is";
pub const QUALITY: &str = "Quality (enter Unique/Strange/Vintage/Genuine/Haunted/Collector's)";
pub const INTENT: &str = "Intent is to (Bank, Buy or Sell)";
pub const CRAFTABLE: &str = "Is the item craftable?";
pub const AUTOPRICE: &str = "Is auto-pricing enabled?";

pub fn confirm_command(action: &str, item: &str, command: &str) -> String {
    format!(
        "Command to {action} {item} is `{command}`\nDo you want to send the command to the bot?\nType yes or no"
    )
}
