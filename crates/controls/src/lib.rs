pub mod level_control;
pub mod panel;
pub mod position;

pub use level_control::*;
pub use panel::*;
pub use position::*;
