//! # Message Classifier
//!
//! Maps raw lines from the automation process to a tagged [`Classification`].
//! Pure and stateless: no IO, no errors. Anything that fails extraction
//! degrades to `Unrecognized` so the caller decides whether to warn.

use regex::Regex;

use crate::domain::types::{Classification, OfferReviewUpdate, TradeUpdate, UserMessage};

type Predicate = fn(&str) -> bool;
type Extractor = fn(&str) -> Option<Classification>;

/// Priority-ordered rule table. The first matching predicate wins; an
/// extractor returning `None` degrades that message to `Unrecognized`
/// rather than falling through to later rules.
const RULES: &[(Predicate, Extractor)] = &[
    (is_user_message, extract_user_message),
    (is_trade_update, extract_trade_update),
    (is_offer_review, extract_offer_review),
];

pub fn classify(raw_text: &str) -> Classification {
    for (predicate, extract) in RULES {
        if predicate(raw_text) {
            return extract(raw_text).unwrap_or_else(|| Classification::Unrecognized {
                raw: raw_text.to_string(),
            });
        }
    }
    Classification::Unrecognized {
        raw: raw_text.to_string(),
    }
}

fn is_user_message(text: &str) -> bool {
    text.starts_with("Message from")
}

fn is_trade_update(text: &str) -> bool {
    text.starts_with("Trade ")
}

fn is_offer_review(text: &str) -> bool {
    text.starts_with("Offer ")
}

fn extract_user_message(text: &str) -> Option<Classification> {
    let rest = text.strip_prefix("Message from")?;
    let (sender, body) = rest.split_once(':')?;
    Some(Classification::User(UserMessage {
        sender: sender.trim().to_string(),
        body: body.trim().to_string(),
        raw: text.to_string(),
    }))
}

fn extract_trade_update(text: &str) -> Option<Classification> {
    let ids = digit_runs(text);
    if ids.len() < 2 {
        return None;
    }
    Some(Classification::Trade(TradeUpdate {
        trade_id: ids[0],
        partner_id: ids[1],
        accepted: text.contains("accepted"),
        raw: text.to_string(),
    }))
}

fn extract_offer_review(text: &str) -> Option<Classification> {
    // Status notices carry no usable IDs, so no extraction is attempted.
    if text.contains("not active") || text.contains("not exist") {
        return Some(Classification::OfferReview(OfferReviewUpdate::Status {
            raw: text.to_string(),
        }));
    }
    let ids = digit_runs(text);
    if ids.len() < 2 {
        return None;
    }
    Some(Classification::OfferReview(OfferReviewUpdate::Pending {
        offer_id: ids[0],
        partner_id: ids[1],
        raw: text.to_string(),
    }))
}

/// All decimal digit runs in the text, in order. Runs too large for a u64
/// are dropped, which downstream arity checks treat as a failed extraction.
fn digit_runs(text: &str) -> Vec<u64> {
    let digits = Regex::new(r"\d+").unwrap();
    digits
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_with_two_ids() {
        let result = classify("Trade #100 with 200 is accepted. Summary: stuff");
        assert_eq!(
            result,
            Classification::Trade(TradeUpdate {
                trade_id: 100,
                partner_id: 200,
                accepted: true,
                raw: "Trade #100 with 200 is accepted. Summary: stuff".to_string(),
            })
        );
    }

    #[test]
    fn trade_declined() {
        match classify("Trade #7 with 9 is declined.") {
            Classification::Trade(update) => assert!(!update.accepted),
            other => panic!("expected TradeUpdate, got {other:?}"),
        }
    }

    #[test]
    fn trade_takes_first_two_digit_runs() {
        match classify("Trade #1 with 2 is accepted, 3 items") {
            Classification::Trade(update) => {
                assert_eq!(update.trade_id, 1);
                assert_eq!(update.partner_id, 2);
            }
            other => panic!("expected TradeUpdate, got {other:?}"),
        }
    }

    #[test]
    fn trade_with_one_id_degrades() {
        let raw = "Trade #100 went through";
        assert_eq!(
            classify(raw),
            Classification::Unrecognized {
                raw: raw.to_string()
            }
        );
    }

    #[test]
    fn offer_not_active_is_status_only() {
        let raw = "Offer #123 from 456 is not active";
        assert_eq!(
            classify(raw),
            Classification::OfferReview(OfferReviewUpdate::Status {
                raw: raw.to_string()
            })
        );
    }

    #[test]
    fn offer_not_exist_is_status_only() {
        let raw = "Offer #123 does not exist";
        assert_eq!(
            classify(raw),
            Classification::OfferReview(OfferReviewUpdate::Status {
                raw: raw.to_string()
            })
        );
    }

    #[test]
    fn offer_pending_extracts_ids() {
        let raw = "Offer #123 from 456 is waiting for review. Summary: things";
        assert_eq!(
            classify(raw),
            Classification::OfferReview(OfferReviewUpdate::Pending {
                offer_id: 123,
                partner_id: 456,
                raw: raw.to_string(),
            })
        );
    }

    #[test]
    fn offer_without_ids_degrades() {
        let raw = "Offer is waiting for review";
        assert_eq!(
            classify(raw),
            Classification::Unrecognized {
                raw: raw.to_string()
            }
        );
    }

    #[test]
    fn user_message_extracts_sender() {
        match classify("Message from Alice: hello") {
            Classification::User(msg) => {
                assert_eq!(msg.sender, "Alice");
                assert_eq!(msg.body, "hello");
            }
            other => panic!("expected UserMessage, got {other:?}"),
        }
    }

    #[test]
    fn user_message_without_colon_degrades() {
        let raw = "Message from nowhere";
        assert_eq!(
            classify(raw),
            Classification::Unrecognized {
                raw: raw.to_string()
            }
        );
    }

    #[test]
    fn user_message_rule_wins_over_trade_words() {
        // Rule order matters: the "Message from" prefix is checked first even
        // when the body mentions a trade.
        match classify("Message from Bob: Trade #1 with 2 is accepted") {
            Classification::User(msg) => assert_eq!(msg.sender, "Bob"),
            other => panic!("expected UserMessage, got {other:?}"),
        }
    }

    #[test]
    fn everything_else_is_unrecognized() {
        let raw = "Polling 3 offers";
        assert_eq!(
            classify(raw),
            Classification::Unrecognized {
                raw: raw.to_string()
            }
        );
    }

    #[test]
    fn oversized_digit_runs_are_dropped() {
        // A run longer than u64::MAX cannot be parsed, so only one usable id
        // remains and the message degrades.
        let raw = "Trade #99999999999999999999999999 with 5";
        assert_eq!(
            classify(raw),
            Classification::Unrecognized {
                raw: raw.to_string()
            }
        );
    }
}
