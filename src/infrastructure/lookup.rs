//! # Partner Name Resolution
//!
//! Resolves a trade partner's display name from the platform's
//! player-summary API. Best effort by design: a failed or unconfigured
//! lookup falls back to showing the numeric ID, never an error.

use crate::domain::config::PricingConfig;
use crate::infrastructure::http::RetryClient;

/// Offset between 32-bit account IDs and 64-bit SteamIDs.
pub const STEAM64_OFFSET: u64 = 76_561_197_960_265_728;

/// Account IDs below the offset are promoted to the 64-bit form.
pub fn to_id64(id: u64) -> u64 {
    if id >= STEAM64_OFFSET {
        id
    } else {
        id + STEAM64_OFFSET
    }
}

pub struct PlayerLookup {
    client: RetryClient,
    summary_url: String,
    api_key: Option<String>,
}

impl PlayerLookup {
    pub fn new(client: RetryClient, config: &PricingConfig) -> Self {
        let api_key = config
            .player_api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok());
        if api_key.is_none() {
            tracing::info!("no player API key configured, partners will show as numeric IDs");
        }
        Self {
            client,
            summary_url: config.player_summary_url.clone(),
            api_key,
        }
    }

    pub async fn display_name(&self, partner_id: u64) -> Option<String> {
        let key = self.api_key.as_ref()?;
        let id64 = to_id64(partner_id);
        let url = format!("{}?key={}&steamids={}", self.summary_url, key, id64);

        let payload = self.client.request("GET", &url).await.ok()??;
        let name = payload
            .as_json()?
            .get("response")?
            .get("players")?
            .get(0)?
            .get("personaname")?
            .as_str()?;
        Some(name.to_string())
    }

    /// The resolved name, or the 64-bit ID as text when resolution fails.
    pub async fn display_name_or_id(&self, partner_id: u64) -> String {
        match self.display_name(partner_id).await {
            Some(name) => name,
            None => to_id64(partner_id).to_string(),
        }
    }
}
