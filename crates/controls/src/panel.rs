use foundation::level::LevelId;
use serde::Serialize;

use crate::position::ControlPosition;

pub const PANEL_FONT: &str = "18px 'Lucida Console',Monaco,monospace";
pub const ACTIVE_BACKGROUND: &str = "#b0b0b0";
pub const INACTIVE_BACKGROUND: &str = "#FFFFFF";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlStyle {
    pub font: String,
    pub active_background: String,
    pub inactive_background: String,
}

impl Default for ControlStyle {
    fn default() -> Self {
        Self {
            font: PANEL_FONT.to_string(),
            active_background: ACTIVE_BACKGROUND.to_string(),
            inactive_background: INACTIVE_BACKGROUND.to_string(),
        }
    }
}

/// What pressing a level button does. Bound per button at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelCommand {
    pub level: LevelId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelButton {
    pub level: LevelId,
    pub label: String,
    pub highlighted: bool,
    pub command: LevelCommand,
}

/// Rendered state of a level control: buttons top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlPanel {
    pub position: ControlPosition,
    pub style: ControlStyle,
    buttons: Vec<LevelButton>,
}

impl ControlPanel {
    pub(crate) fn new(
        position: ControlPosition,
        style: ControlStyle,
        buttons: Vec<LevelButton>,
    ) -> Self {
        Self {
            position,
            style,
            buttons,
        }
    }

    pub fn buttons(&self) -> &[LevelButton] {
        &self.buttons
    }

    pub fn button(&self, index: usize) -> Option<&LevelButton> {
        self.buttons.get(index)
    }

    pub fn button_for(&self, level: &LevelId) -> Option<&LevelButton> {
        self.buttons.iter().find(|b| &b.level == level)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.buttons.iter().map(|b| b.label.as_str()).collect()
    }

    pub fn highlighted(&self) -> Vec<&LevelButton> {
        self.buttons.iter().filter(|b| b.highlighted).collect()
    }

    pub fn background(&self, button: &LevelButton) -> &str {
        if button.highlighted {
            &self.style.active_background
        } else {
            &self.style.inactive_background
        }
    }

    pub(crate) fn set_highlight(&mut self, level: &LevelId, on: bool) {
        if let Some(button) = self.buttons.iter_mut().find(|b| &b.level == level) {
            button.highlighted = on;
        }
    }
}
