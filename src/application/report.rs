//! # Profit Reporting
//!
//! Reads the automation process's `polldata.json`, sums realized and
//! predicted profit in refined metal, and keeps a daily history file the
//! `.last` command browses. Key-price conversion is best effort: when the
//! pricing API yields nothing the report stays in metal and says so.

use std::collections::{BTreeMap, HashMap};
use std::fs;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::application::formatter::human_delta;
use crate::strings::messages;

/// The slice of `polldata.json` the report needs. Everything is defaulted so
/// records written by other automation versions still deserialize.
#[derive(Debug, Default, Deserialize)]
pub struct PollData {
    #[serde(default, rename = "offerData")]
    pub offer_data: HashMap<String, OfferRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OfferRecord {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, rename = "isAccepted")]
    pub is_accepted: bool,
    #[serde(default)]
    pub value: Option<OfferValue>,
    #[serde(default)]
    pub prices: HashMap<String, ItemPricing>,
    /// Milliseconds since the epoch.
    #[serde(default, rename = "finishTimestamp")]
    pub finish_timestamp: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OfferValue {
    /// Key price in metal at the time of the trade.
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub their: Currency,
}

#[derive(Debug, Default, Deserialize, Clone, Copy)]
pub struct Currency {
    #[serde(default)]
    pub metal: f64,
    #[serde(default)]
    pub keys: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemPricing {
    #[serde(default)]
    pub buy: Currency,
    #[serde(default)]
    pub sell: Currency,
}

/// Aggregated profit, in refined metal.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProfitSummary {
    pub total: f64,
    pub today: f64,
    pub predicted: f64,
    pub trades: usize,
    /// Earliest finish timestamp seen, milliseconds.
    pub since_ms: Option<i64>,
}

impl ProfitSummary {
    /// Folds another bot's summary into this one.
    pub fn absorb(&mut self, other: &ProfitSummary) {
        self.total += other.total;
        self.today += other.today;
        self.predicted += other.predicted;
        self.trades += other.trades;
        self.since_ms = match (self.since_ms, other.since_ms) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
}

pub fn load_polldata(path: &str) -> Result<PollData> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read polldata at {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse polldata at {path}"))
}

/// Millisecond timestamp of the most recent local midnight, for the
/// today/total split.
pub fn local_midnight_ms() -> i64 {
    let now = Local::now();
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).single())
        .map(|midnight| midnight.timestamp_millis())
        .unwrap_or_else(|| now.timestamp_millis())
}

/// Walks accepted, non-admin offers and sums realized profit (what the other
/// side paid minus what the items were bought for), today's share, and the
/// predicted profit if remaining stock sold at the recorded sell prices.
pub fn compute_profit(data: &PollData, midnight_ms: i64) -> ProfitSummary {
    let mut summary = ProfitSummary::default();

    for record in data.offer_data.values() {
        let counted = record.action.as_deref().is_some_and(|a| a != "ADMIN") && record.is_accepted;
        if !counted {
            continue;
        }
        let Some(value) = &record.value else {
            continue;
        };

        summary.trades += 1;
        for item in record.prices.values() {
            let bought_for = item.buy.metal + item.buy.keys * value.rate;
            let sold_for = value.their.metal + value.their.keys * value.rate;
            let realized = floor2(sold_for - bought_for);
            summary.total += realized;
            if record.finish_timestamp.is_some_and(|ts| ts >= midnight_ms) {
                summary.today += realized;
            }

            let sell_for = item.sell.metal + item.sell.keys * value.rate;
            summary.predicted += floor2(sell_for - bought_for);
        }
        summary.since_ms = match (summary.since_ms, record.finish_timestamp) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }

    summary
}

fn floor2(x: f64) -> f64 {
    (x * 100.0).floor() / 100.0
}

/// The one-line report. With a key price the totals are converted to keys;
/// without one the report stays in metal and flags the gap instead of
/// failing (a missing quote must never abort the report).
pub fn render_report(summary: &ProfitSummary, key_price_metal: Option<f64>) -> String {
    let span = summary
        .since_ms
        .map(|ms| human_delta(Local::now().timestamp() - ms / 1000))
        .unwrap_or_else(|| "ever".to_string());

    match key_price_metal {
        Some(rate) if rate > 0.0 => format!(
            "You've made {:.2} ref today. {:.2} keys in total over the last {}. ({:.2} keys more if all items sold at current price)",
            summary.today,
            summary.total / rate,
            span,
            summary.predicted / rate,
        ),
        _ => format!(
            "You've made {:.2} ref today. {:.2} ref in total over the last {}. ({:.2} ref more if all items sold at current price) ({})",
            summary.today, summary.total, span, summary.predicted, messages::KEY_PRICE_UNAVAILABLE,
        ),
    }
}

/// One `[today, total, predicted, trades]` row per day, keyed by "%Y-%m-%d"
/// so the map iterates chronologically. Amounts are stored in keys.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfitHistory {
    #[serde(flatten)]
    pub days: BTreeMap<String, [f64; 4]>,
}

impl ProfitHistory {
    pub fn load(path: &str) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write history at {path}"))
    }

    pub fn record(&mut self, date: &str, summary: &ProfitSummary, key_rate: f64) {
        let row = [
            summary.today / key_rate,
            summary.total / key_rate,
            summary.predicted / key_rate,
            summary.trades as f64,
        ];
        self.days.insert(date.to_string(), row);
    }

    /// Rendered history lines, newest first, at most `days` of them.
    pub fn entries_desc(&self, days: usize) -> Vec<String> {
        self.days
            .iter()
            .rev()
            .take(days)
            .map(|(date, [today, total, predicted, trades])| {
                format!(
                    "**{date}** - Days profit **{today:.2}** keys. Total profit **{total:.2}** keys. Predicted profit **{predicted:.2}** keys. Total trades **{trades:.0}**"
                )
            })
            .collect()
    }
}

pub fn today_key(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d").to_string()
}
