//! In-memory feature model.
//!
//! The shapes mirror GeoJSON closely enough that a host can hand over
//! already-decoded data with serde, but nothing here validates or transforms
//! geometry.

use foundation::level::LevelId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `[longitude, latitude]`.
pub type Position = [f64; 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    /// First vertex in coordinate order. Hosts use it to place a marker
    /// without doing any geometry work.
    pub fn first_position(&self) -> Option<Position> {
        match self {
            Geometry::Point(p) => Some(*p),
            Geometry::MultiPoint(points) | Geometry::LineString(points) => points.first().copied(),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().flatten().next().copied()
            }
            Geometry::MultiPolygon(polygons) => polygons.iter().flatten().flatten().next().copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties: Map::new(),
        }
    }

    /// A feature without geometry. It carries properties only and is never
    /// drawn.
    pub fn without_geometry() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl From<Vec<Feature>> for FeatureCollection {
    fn from(features: Vec<Feature>) -> Self {
        Self { features }
    }
}

impl From<Feature> for FeatureCollection {
    fn from(feature: Feature) -> Self {
        Self {
            features: vec![feature],
        }
    }
}

/// Input accepted by `add_data`: a wrapped collection or a bare list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureData {
    Collection(FeatureCollection),
    List(Vec<Feature>),
}

impl From<FeatureData> for FeatureCollection {
    fn from(data: FeatureData) -> Self {
        match data {
            FeatureData::Collection(collection) => collection,
            FeatureData::List(features) => FeatureCollection { features },
        }
    }
}

/// Point annotation attached to a feature, e.g. a room label or an icon.
///
/// `level` places the marker on a specific floor; when absent it joins the
/// floor the annotated feature is being added to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: Position,
    #[serde(default)]
    pub level: Option<LevelId>,
    #[serde(default)]
    pub label: Option<String>,
}

impl Marker {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            level: None,
            label: None,
        }
    }

    pub fn on_level(mut self, level: impl Into<LevelId>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
