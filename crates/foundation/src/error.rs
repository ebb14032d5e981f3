use crate::level::LevelId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndoorError {
    /// A level was requested that has no backing layer or button.
    InvalidLevel(LevelId),
    /// A map was required but the component is not attached to one.
    NotAttached,
    AlreadyAttached,
    /// The level control already has a rendered panel.
    AlreadyRendered,
    DuplicateLevel(LevelId),
    EmptyLevelList,
    UnknownFeature,
    UnknownMarker,
    UnknownButton(usize),
}

impl std::fmt::Display for IndoorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndoorError::InvalidLevel(level) => write!(f, "unknown level: {level}"),
            IndoorError::NotAttached => write!(f, "not attached to a map"),
            IndoorError::AlreadyAttached => write!(f, "already attached to a map"),
            IndoorError::AlreadyRendered => write!(f, "level control already rendered"),
            IndoorError::DuplicateLevel(level) => write!(f, "duplicate level label: {level}"),
            IndoorError::EmptyLevelList => write!(f, "level control needs at least one level"),
            IndoorError::UnknownFeature => write!(f, "feature reference does not resolve"),
            IndoorError::UnknownMarker => write!(f, "marker reference does not resolve"),
            IndoorError::UnknownButton(index) => write!(f, "no level button at index {index}"),
        }
    }
}

impl std::error::Error for IndoorError {}
