//! # Help Text
//!
//! Help messages and documentation for relay commands.
//! Displayed to the user via the `.help` command.

pub const MAIN: &str = concat!(
    "**🤖 autorelay Help**\n",
    "Use: .command _args_\n",
    "\n",
    "**📦 Classifieds**\n",
    "* add <item>[, <item>, ...]: queue `!add` commands\n",
    "* update <item>[, ...]: queue `!update` commands\n",
    "* remove <item>[, ...]: queue `!remove` commands\n",
    "* yes / no: approve or discard the queued commands\n",
    "* scc: interactive command creator\n",
    "* send <line>: forward a raw line to the bot\n",
    "\n",
    "**📈 Reports**\n",
    "* profit: profit report\n",
    "* last [days]: browse the profit history\n",
    "* next / prev / close: scroll the open list\n",
    "\n",
    "**⚡ Misc**\n",
    "* acknowledged: clear the pending user message\n",
    "* status\n",
    "* uptime\n",
    "* ping\n",
);
