pub mod event_bus;
pub mod level;
pub mod link;

pub use event_bus::*;
pub use level::*;
pub use link::*;
