use foundation::level::LevelId;

use crate::feature::{Feature, Marker};
use crate::layer::{Layer, LayerId};
use crate::symbology::LayerStyle;

/// Address of one feature inside one drawable layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FeatureRef {
    pub layer: LayerId,
    pub index: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MarkerRef {
    pub layer: LayerId,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledFeature {
    pub feature: Feature,
    pub style: LayerStyle,
}

/// A marker together with the feature its clicks are forwarded to.
///
/// The target may live in a different layer than the marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub marker: Marker,
    pub target: FeatureRef,
}

/// Feature-collection-backed drawable layer holding one floor's features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayer {
    id: LayerId,
    level: LevelId,
    features: Vec<StyledFeature>,
    markers: Vec<PlacedMarker>,
}

impl FeatureLayer {
    pub fn new(id: LayerId, level: LevelId) -> Self {
        Self {
            id,
            level,
            features: Vec::new(),
            markers: Vec::new(),
        }
    }

    pub fn add_feature(&mut self, feature: Feature, style: LayerStyle) -> FeatureRef {
        self.features.push(StyledFeature { feature, style });
        FeatureRef {
            layer: self.id,
            index: self.features.len() - 1,
        }
    }

    pub fn add_marker(&mut self, marker: Marker, target: FeatureRef) -> MarkerRef {
        self.markers.push(PlacedMarker { marker, target });
        MarkerRef {
            layer: self.id,
            index: self.markers.len() - 1,
        }
    }

    pub fn features(&self) -> &[StyledFeature] {
        &self.features
    }

    pub fn feature(&self, index: usize) -> Option<&StyledFeature> {
        self.features.get(index)
    }

    pub fn markers(&self) -> &[PlacedMarker] {
        &self.markers
    }

    pub fn marker(&self, index: usize) -> Option<&PlacedMarker> {
        self.markers.get(index)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Layer for FeatureLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn level(&self) -> &LevelId {
        &self.level
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureLayer, FeatureRef};
    use crate::feature::{Feature, Geometry, Marker};
    use crate::layer::LayerId;
    use crate::symbology::LayerStyle;
    use foundation::level::LevelId;

    #[test]
    fn refs_point_back_into_the_layer() {
        let mut layer = FeatureLayer::new(LayerId(3), LevelId::from("1"));
        let a = layer.add_feature(Feature::new(Geometry::Point([0.0, 0.0])), LayerStyle::default());
        let b = layer.add_feature(Feature::new(Geometry::Point([1.0, 1.0])), LayerStyle::hidden());
        assert_eq!(a, FeatureRef { layer: LayerId(3), index: 0 });
        assert_eq!(b.index, 1);
        assert!(!layer.feature(1).unwrap().style.visible);

        let m = layer.add_marker(Marker::new([0.5, 0.5]), a);
        assert_eq!(layer.marker(m.index).unwrap().target, a);
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.markers().len(), 1);
    }
}
