use foundation::level::LevelId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// A drawable unit the map surface can show or hide as a whole.
pub trait Layer {
    fn id(&self) -> LayerId;

    /// The floor whose features this layer draws.
    fn level(&self) -> &LevelId;
}
