#![allow(dead_code)]
//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for connected services, relay routing, and reporting setup.

use serde::Deserialize;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    pub relay: RelayConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub update_check: UpdateCheckConfig,
}

/// Configuration for various connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Routing between the automation process's room and the team rooms.
#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Room the automation process posts into and commands are forwarded to.
    pub bot_room: String,
    /// User IDs recognized as the automation process.
    pub bot_users: Vec<String>,
    /// Rooms receiving formatted notifications.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Rooms where owners are pinged directly.
    #[serde(default)]
    pub owner_rooms: Vec<String>,
    /// User IDs allowed to run owner commands.
    #[serde(default)]
    pub owners: Vec<String>,
    /// Minutes between repeated owner pings for an unacknowledged user message.
    #[serde(default = "default_reminder_minutes")]
    pub reminder_minutes: u64,
    /// Pause between forwarded commands when sending a batch.
    #[serde(default = "default_send_delay")]
    pub send_delay_secs: u64,
}

fn default_reminder_minutes() -> u64 {
    10
}
fn default_send_delay() -> u64 {
    3
}

/// Third-party pricing/info API endpoints.
#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    #[serde(default = "default_key_price_url")]
    pub key_price_url: String,
    #[serde(default = "default_player_summary_url")]
    pub player_summary_url: String,
    /// Environment variable holding the player-API key. Lookups are skipped when unset.
    #[serde(default)]
    pub player_api_key_env: Option<String>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            key_price_url: default_key_price_url(),
            player_summary_url: default_player_summary_url(),
            player_api_key_env: None,
        }
    }
}

fn default_key_price_url() -> String {
    "https://api.prices.tf/items/5021;6?src=bptf".to_string()
}
fn default_player_summary_url() -> String {
    "https://api.steampowered.com/ISteamUser/GetPlayerSummaries/v2/".to_string()
}

/// Profit reporting inputs and history placement.
#[derive(Debug, Deserialize, Clone)]
pub struct ReportingConfig {
    /// One polldata.json per automation bot.
    #[serde(default)]
    pub polldata_paths: Vec<String>,
    #[serde(default = "default_history_path")]
    pub history_path: String,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            polldata_paths: Vec::new(),
            history_path: default_history_path(),
            per_page: default_per_page(),
        }
    }
}

fn default_history_path() -> String {
    "data/profit_history.json".to_string()
}
fn default_per_page() -> usize {
    10
}

/// Daily check for new commits on the upstream repository.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct UpdateCheckConfig {
    #[serde(default)]
    pub enabled: bool,
    /// "owner/repo" slug on GitHub.
    #[serde(default)]
    pub repo: String,
}
