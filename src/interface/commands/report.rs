//! # Report Commands
//!
//! Handles `.profit` (one-shot report), `.last` (paginated history browser)
//! and the `.next`/`.prev`/`.close` navigation for the open list.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::application::paginator::Paginator;
use crate::application::report::{self, ProfitHistory, ProfitSummary};
use crate::application::state::BotState;
use crate::domain::config::AppConfig;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::http::RetryClient;
use crate::infrastructure::pricing;
use crate::strings::messages;

pub async fn handle_profit(
    config: &AppConfig,
    http: &RetryClient,
    chat: &impl ChatProvider,
) -> Result<()> {
    if config.reporting.polldata_paths.is_empty() {
        chat.send_notification(messages::NO_POLLDATA)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let _ = chat.typing(true).await;

    let midnight = report::local_midnight_ms();
    let mut summary = ProfitSummary::default();
    for path in &config.reporting.polldata_paths {
        match report::load_polldata(path) {
            Ok(data) => summary.absorb(&report::compute_profit(&data, midnight)),
            Err(e) => {
                let _ = chat
                    .send_notification(&messages::polldata_unreadable(path, &e.to_string()))
                    .await;
            }
        }
    }

    // A missing quote degrades the report to metal; it never aborts it.
    let key_price = pricing::fetch_key_price(http, &config.pricing)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    let _ = chat.typing(false).await;
    chat.send_message(&report::render_report(
        &summary,
        key_price.map(|p| p.buy_metal),
    ))
    .await
    .map(|_| ())
    .map_err(|e| anyhow::anyhow!(e))
}

pub async fn handle_last(
    config: &AppConfig,
    state: &Arc<Mutex<BotState>>,
    chat: &impl ChatProvider,
    args: &str,
) -> Result<()> {
    let requested = args.trim();
    let requested: Option<usize> = if requested.is_empty() {
        None
    } else {
        match requested.parse() {
            Ok(days) => Some(days),
            Err(_) => {
                chat.send_notification(messages::LAST_USAGE)
                    .await
                    .map_err(|e| anyhow::anyhow!(e))?;
                return Ok(());
            }
        }
    };

    let history = ProfitHistory::load(&config.reporting.history_path);
    if history.days.is_empty() {
        chat.send_notification(messages::NO_HISTORY)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let available = history.days.len();
    let days = match requested {
        Some(days) if days > 0 && days < available => days,
        _ => available,
    };

    let pager = Paginator::new(
        &format!("Last {days} days profit"),
        history.entries_desc(days),
        config.reporting.per_page,
    );
    let event_id = chat
        .send_message(&pager.render())
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    let mut guard = state.lock().await;
    let room = guard.get_room_state(&chat.room_id());
    room.pager = Some(pager);
    room.pager_event_id = Some(event_id);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageNav {
    Next,
    Prev,
    Close,
}

pub async fn handle_page_nav(
    state: &Arc<Mutex<BotState>>,
    chat: &impl ChatProvider,
    nav: PageNav,
) -> Result<()> {
    // Work out the edit under the lock, apply it after releasing.
    let edit: Option<(String, String)> = {
        let mut guard = state.lock().await;
        let room = guard.get_room_state(&chat.room_id());
        let Some(pager) = room.pager.as_mut() else {
            drop(guard);
            chat.send_notification(messages::NO_ACTIVE_PAGER)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            return Ok(());
        };

        match nav {
            PageNav::Close => {
                let rendered = pager.render_closed();
                let event_id = room.pager_event_id.take();
                room.pager = None;
                event_id.map(|id| (id, rendered))
            }
            PageNav::Next | PageNav::Prev => {
                let moved = match nav {
                    PageNav::Next => pager.next(),
                    _ => pager.prev(),
                };
                if moved {
                    tracing::debug!("Scrolled to page {}", pager.current_page() + 1);
                    let rendered = pager.render();
                    room.pager_event_id.clone().map(|id| (id, rendered))
                } else {
                    None
                }
            }
        }
    };

    if let Some((event_id, rendered)) = edit {
        chat.edit_message(&event_id, &rendered)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    Ok(())
}
