//! # Key Price Lookup
//!
//! Fetches the current key price (in refined metal) used to convert profit
//! totals into keys. A malformed or missing quote yields `None` and the
//! caller renders amounts in metal; only transport contract violations
//! surface as errors.

use serde::Deserialize;

use crate::domain::config::PricingConfig;
use crate::infrastructure::http::RetryClient;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPrice {
    pub sell_metal: f64,
    pub buy_metal: f64,
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    sell: PricePoint,
    buy: PricePoint,
}

#[derive(Debug, Deserialize)]
struct PricePoint {
    metal: f64,
}

pub async fn fetch_key_price(
    client: &RetryClient,
    config: &PricingConfig,
) -> Result<Option<KeyPrice>, String> {
    let Some(payload) = client.request("GET", &config.key_price_url).await? else {
        return Ok(None);
    };

    let Some(value) = payload.as_json() else {
        tracing::warn!("key price endpoint returned a non-JSON body");
        return Ok(None);
    };

    match serde_json::from_value::<PriceResponse>(value.clone()) {
        Ok(parsed) => Ok(Some(KeyPrice {
            sell_metal: parsed.sell.metal,
            buy_metal: parsed.buy.metal,
        })),
        Err(e) => {
            tracing::warn!("key price response did not match the expected shape: {e}");
            Ok(None)
        }
    }
}
