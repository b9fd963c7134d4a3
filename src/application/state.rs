//! # Bot State
//!
//! Defines the persistent state of the relay (`BotState`) and per-room state
//! (`RoomState`): pending approvals, wizard progress, and the active paginator.
//! It handles serialization and deserialization to/from JSON.

use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};

use crate::application::paginator::Paginator;

const STATE_PATH: &str = "data/state.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WizardStep {
    Action,
    ItemName,
    OptionKey,
    OptionValue,
    Confirm,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct WizardState {
    pub active: bool,
    pub step: Option<WizardStep>,
    pub data: HashMap<String, String>,
    /// Options already applied in this run; each may only be used once.
    pub used_options: Vec<String>,
    pub current_option: Option<String>,
    /// Collected answers for the option currently being filled in
    /// (price needs four, most need one).
    pub option_buffer: Vec<String>,
}

impl WizardState {
    pub fn reset(&mut self) {
        *self = WizardState::default();
    }
}

/// State for a single chat room.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct RoomState {
    /// Commands queued behind a `.yes`/`.no` confirmation.
    #[serde(default)]
    pub pending_commands: Option<Vec<String>>,
    #[serde(default)]
    pub wizard: WizardState,
    #[serde(default)]
    pub pager: Option<Paginator>,
    /// Event ID of the message the pager controls.
    #[serde(default)]
    pub pager_event_id: Option<String>,
}

/// Persistent state of the relay, mapping Room IDs to their respective room
/// states. Saved to `data/state.json`.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct BotState {
    #[serde(default)]
    pub rooms: HashMap<String, RoomState>,
    /// Date ("%Y-%m-%d") of the last profit snapshot, to keep the daily
    /// recorder from double-writing.
    #[serde(default)]
    pub last_snapshot_date: Option<String>,
    /// SHA of the newest upstream commit the owners were told about.
    #[serde(default)]
    pub last_seen_commit: Option<String>,
}

impl BotState {
    /// Gets or creates the state for a specific room.
    pub fn get_room_state(&mut self, room_id: &str) -> &mut RoomState {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(RoomState::default)
    }

    /// Loads the state from `data/state.json` or returns default.
    pub fn load() -> Self {
        if let Ok(content) = fs::read_to_string(STATE_PATH)
            && let Ok(mut state) = serde_json::from_str::<Self>(&content)
        {
            // Sanitize: interactive flows don't survive a restart
            for room in state.rooms.values_mut() {
                room.wizard.reset();
                room.pending_commands = None;
                room.pager = None;
                room.pager_event_id = None;
            }
            return state;
        }
        Self::default()
    }

    /// Persists the current state to `data/state.json`.
    pub fn save(&self) {
        if let Ok(content) = serde_json::to_string_pretty(self) {
            let _ = fs::write(STATE_PATH, content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_room_state_creates_rooms() {
        let mut state = BotState::default();
        state.get_room_state("!a:example.org").pending_commands = Some(vec!["x".to_string()]);
        assert_eq!(state.rooms.len(), 1);
        assert!(
            state
                .get_room_state("!a:example.org")
                .pending_commands
                .is_some()
        );
    }

    #[test]
    fn wizard_reset_clears_everything() {
        let mut wizard = WizardState {
            active: true,
            step: Some(WizardStep::Confirm),
            ..Default::default()
        };
        wizard.data.insert("item".to_string(), "hat".to_string());
        wizard.reset();
        assert!(!wizard.active);
        assert!(wizard.step.is_none());
        assert!(wizard.data.is_empty());
    }
}
