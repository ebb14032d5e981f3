use foundation::error::IndoorError;
use foundation::ids::ListenerId;
use foundation::level::LevelId;

/// Payload of a level change: the level that was active before (if any) and
/// the level that is active now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelChange {
    pub old_level: Option<LevelId>,
    pub new_level: LevelId,
}

impl LevelChange {
    pub fn new(old_level: Option<LevelId>, new_level: LevelId) -> Self {
        Self {
            old_level,
            new_level,
        }
    }
}

// Lets a level change be handed straight to a `set_level` that accepts
// `impl Into<LevelId>`.
impl From<&LevelChange> for LevelId {
    fn from(change: &LevelChange) -> Self {
        change.new_level.clone()
    }
}

impl From<LevelChange> for LevelId {
    fn from(change: LevelChange) -> Self {
        change.new_level
    }
}

/// Anything that has an active level, can be asked to switch it, and reports
/// when it switched.
///
/// Both the indoor layer set and the level control implement this, which is
/// all [`crate::link::LevelLink`] needs to keep them in step.
pub trait LevelSwitch {
    fn current_level(&self) -> Option<&LevelId>;

    /// Switches to `level`. Requesting the current level is a no-op.
    fn request_level(&mut self, level: &LevelId) -> Result<(), IndoorError>;

    fn watch_level(&mut self, listener: Box<dyn FnMut(&LevelChange)>) -> ListenerId;

    fn unwatch_level(&mut self, id: ListenerId) -> bool;
}
