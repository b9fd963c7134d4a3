//! # Notification Formatting
//!
//! Pure rewriting of the automation process's terse status lines into the
//! markdown shown in the team rooms. Formatting never touches the structured
//! fields the classifier extracted; it only produces the description string.

/// Rewrites a trade line for display. The ` #<id>` suffix is dropped (it
/// moves to the footer) and the lead-in is rephrased around the partner's
/// display name.
pub fn format_trade_description(
    raw: &str,
    trade_id: u64,
    partner_id: u64,
    partner_name: &str,
) -> String {
    let text = raw.replace(&format!(" #{trade_id}"), "");
    let text = text.replace(
        &format!("Trade with {partner_id} is"),
        &format!("A trade with {partner_name} has been marked as"),
    );
    rewrite_summary(&text)
}

/// Rewrites an offer-review line for display, embedding the offer ID and the
/// partner's resolved name and 64-bit ID in the lead-in.
pub fn format_offer_description(
    raw: &str,
    offer_id: u64,
    partner_id: u64,
    partner_name: &str,
    partner_id64: u64,
) -> String {
    let text = raw.replace(&format!(" #{offer_id}"), "");
    let text = text.replace(
        &format!("Offer from {partner_id} is waiting for review"),
        &format!("An offer (#{offer_id}) sent by {partner_name} ({partner_id64}) is waiting for review"),
    );
    rewrite_summary(&text)
}

fn rewrite_summary(text: &str) -> String {
    text.replace("Summary:", "\n**Summary:**")
        .replace("Asked:", "- **Asked:**")
        .replace("Offered:", "- **Offered:**")
}

/// "a", "a and b", "a, b and c". Mirrors how the owners are addressed in
/// pings and how queued commands are listed back for confirmation.
pub fn human_join(seq: &[String], delimiter: &str, last: &str) -> String {
    match seq.len() {
        0 => String::new(),
        1 => seq[0].clone(),
        2 => format!("{} {last} {}", seq[0], seq[1]),
        _ => format!(
            "{} {last} {}",
            seq[..seq.len() - 1].join(delimiter),
            seq[seq.len() - 1]
        ),
    }
}

/// Rough natural-language duration, largest unit only.
pub fn human_delta(seconds: i64) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("{n} {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };

    if seconds >= DAY {
        plural(seconds / DAY, "day")
    } else if seconds >= HOUR {
        plural(seconds / HOUR, "hour")
    } else if seconds >= MINUTE {
        plural(seconds / MINUTE, "minute")
    } else {
        "moments".to_string()
    }
}
