use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of one floor of an indoor map.
///
/// Equality is by the raw string. `"0"` and `"00"` are different levels even
/// though both parse to the same number; numeric interpretation only happens
/// where a caller supplies an explicit parse function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(String);

impl LevelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts a scalar JSON value into a level id.
    ///
    /// Numbers use their shortest decimal form so that `1` and `1.0` both map
    /// to `"1"`, matching the string a feature author would write.
    pub fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Some(Self(i.to_string()));
                }
                let f = n.as_f64()?;
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(Self((f as i64).to_string()))
                } else {
                    Some(Self(f.to_string()))
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LevelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LevelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&LevelId> for LevelId {
    fn from(id: &LevelId) -> Self {
        id.clone()
    }
}

impl From<i64> for LevelId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl From<i32> for LevelId {
    fn from(n: i32) -> Self {
        Self(n.to_string())
    }
}

impl AsRef<str> for LevelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Level assignment of a single feature: one floor, or a feature spanning
/// several floors (stairs, elevator shafts, atria).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSpec {
    One(LevelId),
    Many(Vec<LevelId>),
}

impl LevelSpec {
    /// Reads a level assignment out of a property value.
    ///
    /// `null`, booleans and objects are not levels. Array members that are not
    /// scalars are ignored, and repeats keep only their first occurrence.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => {
                let mut ids: Vec<LevelId> = Vec::with_capacity(items.len());
                for id in items.iter().filter_map(LevelId::from_scalar) {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                Some(LevelSpec::Many(ids))
            }
            other => LevelId::from_scalar(other).map(LevelSpec::One),
        }
    }

    pub fn levels(&self) -> &[LevelId] {
        match self {
            LevelSpec::One(id) => std::slice::from_ref(id),
            LevelSpec::Many(ids) => ids,
        }
    }
}

impl From<LevelId> for LevelSpec {
    fn from(id: LevelId) -> Self {
        LevelSpec::One(id)
    }
}

impl From<&str> for LevelSpec {
    fn from(s: &str) -> Self {
        LevelSpec::One(LevelId::from(s))
    }
}

impl From<Vec<LevelId>> for LevelSpec {
    fn from(ids: Vec<LevelId>) -> Self {
        LevelSpec::Many(ids)
    }
}
