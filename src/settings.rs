//! Game settings and key bindings
//!
//! Persisted as JSON next to the binary. Key bindings map each action to a
//! list of key names; the simulation only ever sees the resulting
//! `TickInput`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::TickInput;

/// Player actions that can be bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Jump,
    Dash,
    Climb,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveUp,
        Action::MoveDown,
        Action::Jump,
        Action::Dash,
        Action::Climb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::MoveLeft => "MOVE_LEFT",
            Action::MoveRight => "MOVE_RIGHT",
            Action::MoveUp => "MOVE_UP",
            Action::MoveDown => "MOVE_DOWN",
            Action::Jump => "JUMP",
            Action::Dash => "DASH",
            Action::Climb => "CLIMB",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "MOVE_LEFT" | "LEFT" => Some(Action::MoveLeft),
            "MOVE_RIGHT" | "RIGHT" => Some(Action::MoveRight),
            "MOVE_UP" | "UP" => Some(Action::MoveUp),
            "MOVE_DOWN" | "DOWN" => Some(Action::MoveDown),
            "JUMP" => Some(Action::Jump),
            "DASH" => Some(Action::Dash),
            "CLIMB" => Some(Action::Climb),
            _ => None,
        }
    }

    /// Set this action's intent flag
    pub fn apply(&self, input: &mut TickInput) {
        match self {
            Action::MoveLeft => input.left = true,
            Action::MoveRight => input.right = true,
            Action::MoveUp => input.up = true,
            Action::MoveDown => input.down = true,
            Action::Jump => input.jump = true,
            Action::Dash => input.dash = true,
            Action::Climb => input.climb = true,
        }
    }
}

/// One action to many keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub move_left: Vec<String>,
    pub move_right: Vec<String>,
    pub move_up: Vec<String>,
    pub move_down: Vec<String>,
    pub jump: Vec<String>,
    pub dash: Vec<String>,
    pub climb: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = |k: &str| vec![k.to_string()];
        Self {
            move_left: keys("A"),
            move_right: keys("D"),
            move_up: keys("W"),
            move_down: keys("S"),
            jump: keys("K"),
            dash: keys("J"),
            climb: keys("L"),
        }
    }
}

impl KeyBindings {
    pub fn keys_for_action(&self, action: Action) -> &[String] {
        match action {
            Action::MoveLeft => &self.move_left,
            Action::MoveRight => &self.move_right,
            Action::MoveUp => &self.move_up,
            Action::MoveDown => &self.move_down,
            Action::Jump => &self.jump,
            Action::Dash => &self.dash,
            Action::Climb => &self.climb,
        }
    }

    fn keys_mut(&mut self, action: Action) -> &mut Vec<String> {
        match action {
            Action::MoveLeft => &mut self.move_left,
            Action::MoveRight => &mut self.move_right,
            Action::MoveUp => &mut self.move_up,
            Action::MoveDown => &mut self.move_down,
            Action::Jump => &mut self.jump,
            Action::Dash => &mut self.dash,
            Action::Climb => &mut self.climb,
        }
    }

    /// Action bound to `key` (case-insensitive)
    pub fn action_for_key(&self, key: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|&action| {
            self.keys_for_action(action)
                .iter()
                .any(|k| k.eq_ignore_ascii_case(key))
        })
    }

    /// Bind `key` to `action`, removing it from any other action
    pub fn bind(&mut self, action: Action, key: &str) {
        for other in Action::ALL {
            self.keys_mut(other).retain(|k| !k.eq_ignore_ascii_case(key));
        }
        self.keys_mut(action).push(key.to_string());
    }

    pub fn unbind(&mut self, key: &str) {
        for action in Action::ALL {
            self.keys_mut(action).retain(|k| !k.eq_ignore_ascii_case(key));
        }
    }

    /// Intents for the set of currently held keys
    pub fn intents<'a>(&self, held: impl IntoIterator<Item = &'a str>) -> TickInput {
        let mut input = TickInput::default();
        for key in held {
            match self.action_for_key(key) {
                Some(action) => action.apply(&mut input),
                None => log::trace!("Unbound key: {}", key),
            }
        }
        input
    }

    /// "ACTION: keys" lines for help output
    pub fn describe(&self) -> Vec<String> {
        Action::ALL
            .iter()
            .map(|&action| format!("{}: {}", action.as_str(), self.keys_for_action(action).join(", ")))
            .collect()
    }
}

/// Settings load/save errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bindings: KeyBindings,
    /// Map loaded at startup
    pub map_path: String,
    /// Length of a headless session in ticks
    pub session_ticks: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bindings: KeyBindings::default(),
            map_path: "maps/default.json".to_string(),
            session_ticks: 600,
        }
    }
}

impl Settings {
    pub const FILE_NAME: &'static str = "summit_dash_settings.json";

    pub fn try_load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load settings, falling back to defaults
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("Using default settings");
            return Self::default();
        }
        match Self::try_load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
