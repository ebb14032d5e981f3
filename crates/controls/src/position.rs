use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Corner of the map a control is placed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl ControlPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlPosition::TopLeft => "topleft",
            ControlPosition::TopRight => "topright",
            ControlPosition::BottomLeft => "bottomleft",
            ControlPosition::BottomRight => "bottomright",
        }
    }
}

impl FromStr for ControlPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "topleft" => Ok(ControlPosition::TopLeft),
            "topright" => Ok(ControlPosition::TopRight),
            "bottomleft" => Ok(ControlPosition::BottomLeft),
            "bottomright" => Ok(ControlPosition::BottomRight),
            other => Err(format!("unknown control position: {other}")),
        }
    }
}
