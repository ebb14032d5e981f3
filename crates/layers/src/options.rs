use foundation::level::{LevelId, LevelSpec};

use crate::feature::{Feature, Marker};
use crate::feature_layer::FeatureRef;
use crate::symbology::LayerStyle;

pub type GetLevelFn = Box<dyn Fn(&Feature) -> Option<LevelSpec>>;
pub type OnEachFeatureFn = Box<dyn FnMut(&Feature, FeatureRef)>;
pub type MarkerForFeatureFn = Box<dyn Fn(&Feature) -> Option<Marker>>;
pub type StyleFn = Box<dyn Fn(&Feature) -> LayerStyle>;

pub const DEFAULT_LEVEL_PROPERTY: &str = "level";

/// Level extractor reading the property `name`.
///
/// Strings and numbers name one level, arrays name several; anything else
/// leaves the feature without a level.
pub fn level_property(name: impl Into<String>) -> GetLevelFn {
    let name = name.into();
    Box::new(move |feature: &Feature| feature.property(&name).and_then(LevelSpec::from_value))
}

/// Configuration of an [`crate::indoor::IndoorLayerSet`].
pub struct IndoorOptions {
    pub get_level: GetLevelFn,
    /// Level shown first. When unset, attaching picks the first known level.
    pub level: Option<LevelId>,
    /// Called for every feature each time it is added to a level layer.
    pub on_each_feature: Option<OnEachFeatureFn>,
    pub marker_for_feature: Option<MarkerForFeatureFn>,
    pub style: Option<StyleFn>,
}

impl IndoorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_get_level(
        mut self,
        get_level: impl Fn(&Feature) -> Option<LevelSpec> + 'static,
    ) -> Self {
        self.get_level = Box::new(get_level);
        self
    }

    pub fn with_level_property(mut self, name: impl Into<String>) -> Self {
        self.get_level = level_property(name);
        self
    }

    pub fn with_level(mut self, level: impl Into<LevelId>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_on_each_feature(
        mut self,
        hook: impl FnMut(&Feature, FeatureRef) + 'static,
    ) -> Self {
        self.on_each_feature = Some(Box::new(hook));
        self
    }

    pub fn with_marker_for_feature(
        mut self,
        factory: impl Fn(&Feature) -> Option<Marker> + 'static,
    ) -> Self {
        self.marker_for_feature = Some(Box::new(factory));
        self
    }

    pub fn with_style(mut self, style: impl Fn(&Feature) -> LayerStyle + 'static) -> Self {
        self.style = Some(Box::new(style));
        self
    }

    pub(crate) fn style_for(&self, feature: &Feature) -> LayerStyle {
        self.style
            .as_ref()
            .map(|style| style(feature))
            .unwrap_or_default()
    }
}

impl Default for IndoorOptions {
    fn default() -> Self {
        Self {
            get_level: level_property(DEFAULT_LEVEL_PROPERTY),
            level: None,
            on_each_feature: None,
            marker_for_feature: None,
            style: None,
        }
    }
}

impl std::fmt::Debug for IndoorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndoorOptions")
            .field("level", &self.level)
            .field("on_each_feature", &self.on_each_feature.is_some())
            .field("marker_for_feature", &self.marker_for_feature.is_some())
            .field("style", &self.style.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{IndoorOptions, level_property};
    use crate::feature::{Feature, Geometry};
    use foundation::level::{LevelId, LevelSpec};

    #[test]
    fn default_reads_level_property() {
        let opts = IndoorOptions::default();
        let f = Feature::new(Geometry::Point([0.0, 0.0])).with_property("level", 2);
        assert_eq!((opts.get_level)(&f), Some(LevelSpec::One(LevelId::from("2"))));
        assert_eq!(
            (opts.get_level)(&Feature::new(Geometry::Point([0.0, 0.0]))),
            None
        );
    }

    #[test]
    fn custom_property() {
        let get = level_property("floor");
        let f = Feature::new(Geometry::Point([0.0, 0.0])).with_property("floor", "B1");
        assert_eq!(get(&f), Some(LevelSpec::One(LevelId::from("B1"))));
    }
}
