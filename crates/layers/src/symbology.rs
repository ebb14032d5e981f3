use serde::{Deserialize, Serialize};

/// Per-feature drawing style handed through to the renderer.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub visible: bool,
    pub fill_color: [f32; 4],
    pub stroke_color: [f32; 4],
    /// Outline width in screen pixels.
    pub stroke_width: f32,
}

impl LayerStyle {
    pub const fn new(visible: bool, fill_color: [f32; 4], stroke_width: f32) -> Self {
        Self {
            visible,
            fill_color,
            stroke_color: [0.2, 0.2, 0.2, 1.0],
            stroke_width,
        }
    }

    pub const fn hidden() -> Self {
        let mut style = Self::new(false, [0.0, 0.0, 0.0, 0.0], 0.0);
        style.stroke_color = [0.0, 0.0, 0.0, 0.0];
        style
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            visible: true,
            fill_color: [0.2, 0.4, 1.0, 0.2],
            stroke_color: [0.2, 0.4, 1.0, 1.0],
            stroke_width: 3.0,
        }
    }
}
