//! # Domain Types
//!
//! Common data structures and enums used across the relay logic.

use chrono::{DateTime, Local};

/// A raw text line received from the trading-automation process.
/// Immutable once received; consumed exactly once by the classifier.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub sender: String,
    pub raw_text: String,
    pub received_at: DateTime<Local>,
}

impl InboundMessage {
    pub fn new(sender: &str, raw_text: &str) -> Self {
        Self {
            sender: sender.to_string(),
            raw_text: raw_text.to_string(),
            received_at: Local::now(),
        }
    }
}

/// The outcome of classifying one inbound line.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Trade(TradeUpdate),
    OfferReview(OfferReviewUpdate),
    User(UserMessage),
    Unrecognized { raw: String },
}

/// A completed (accepted or declined) trade reported by the automation process.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeUpdate {
    pub trade_id: u64,
    pub partner_id: u64,
    pub accepted: bool,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OfferReviewUpdate {
    /// "not active" / "not exist" notices. Carried verbatim, no ID extraction.
    Status { raw: String },
    /// An offer waiting for manual review by the owners.
    Pending {
        offer_id: u64,
        partner_id: u64,
        raw: String,
    },
}

/// A message a human sent to the automation process, forwarded for the owners.
#[derive(Debug, Clone, PartialEq)]
pub struct UserMessage {
    pub sender: String,
    pub body: String,
    pub raw: String,
}

/// One HTTP attempt's outcome as reported by an `HttpTransport`.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed `Retry-After` header, in seconds, if the server sent one.
    pub retry_after: Option<u64>,
    pub content_type: Option<String>,
    pub body: String,
}

/// A successful response body, decoded by content type.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
}

impl Payload {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }
}
