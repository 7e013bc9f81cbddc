//! Input events and the remappable hand-controller binding table.

use serde::{Deserialize, Serialize};

/// Key text the host reports for the escape key.
pub const ESCAPE_KEY: &str = "ESC";

/// Name under which the controller registers its binding table with the
/// host's input system.
pub const AWAY_MAPPING_NAME: &str = "away.controller-bindings";

/// A keyboard press as delivered by the host input system. `is_auto_repeat`
/// is set for held keys (or whenever the platform feels like it) and such
/// events never drive state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub text: String,
    #[serde(default)]
    pub is_auto_repeat: bool,
}

impl KeyInput {
    pub fn press(text: &str) -> Self {
        KeyInput {
            text: text.to_string(),
            is_auto_repeat: false,
        }
    }

    pub fn auto_repeat(text: &str) -> Self {
        KeyInput {
            text: text.to_string(),
            is_auto_repeat: true,
        }
    }
}

/// Named hardware inputs the binding table can map from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardInput {
    LeftPrimaryThumb,
    RightPrimaryThumb,
    LeftSecondaryThumb,
    RightSecondaryThumb,
}

/// Whether a binding consumes the input or only observes it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingMode {
    Exclusive,
    /// Observe without interfering with other mappings of the same input.
    Peek,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappedAction {
    GoActive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    pub source: StandardInput,
    pub mode: BindingMode,
    pub action: MappedAction,
}

/// A named, remappable binding table. The host enables and disables the
/// whole table by name; while disabled its entries are inert.
#[derive(Debug, Clone, Serialize)]
pub struct InputMapping {
    name: String,
    entries: Vec<MappingEntry>,
    enabled: bool,
}

impl InputMapping {
    pub fn new(name: &str) -> Self {
        InputMapping {
            name: name.to_string(),
            entries: Vec::new(),
            enabled: false,
        }
    }

    /// Append a non-exclusive binding from `source` to `action`.
    pub fn peek(mut self, source: StandardInput, action: MappedAction) -> Self {
        self.entries.push(MappingEntry {
            source,
            mode: BindingMode::Peek,
            action,
        });
        self
    }

    /// The default table: every thumb button peeks to go-active, so waking
    /// up never steals the press from whatever else is bound to it.
    pub fn away_defaults() -> Self {
        InputMapping::new(AWAY_MAPPING_NAME)
            .peek(StandardInput::LeftPrimaryThumb, MappedAction::GoActive)
            .peek(StandardInput::RightPrimaryThumb, MappedAction::GoActive)
            .peek(StandardInput::LeftSecondaryThumb, MappedAction::GoActive)
            .peek(StandardInput::RightSecondaryThumb, MappedAction::GoActive)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Resolve a hardware input to its mapped action; `None` while the table
    /// is disabled or when the input is unbound.
    pub fn action_for(&self, source: StandardInput) -> Option<MappedAction> {
        if !self.enabled {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.source == source)
            .map(|entry| entry.action)
    }
}

#[cfg(test)]
mod tests {
    use super::{InputMapping, MappedAction, StandardInput};

    #[test]
    fn default_table_binds_all_four_thumbs() {
        let mut mapping = InputMapping::away_defaults();
        mapping.set_enabled(true);
        for source in [
            StandardInput::LeftPrimaryThumb,
            StandardInput::RightPrimaryThumb,
            StandardInput::LeftSecondaryThumb,
            StandardInput::RightSecondaryThumb,
        ] {
            assert_eq!(mapping.action_for(source), Some(MappedAction::GoActive));
        }
    }

    #[test]
    fn disabled_table_resolves_nothing() {
        let mapping = InputMapping::away_defaults();
        assert_eq!(mapping.action_for(StandardInput::LeftPrimaryThumb), None);
    }
}
