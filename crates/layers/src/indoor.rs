use std::collections::BTreeMap;

use foundation::error::IndoorError;
use foundation::ids::{IdAllocator, ListenerId};
use foundation::level::LevelId;
use runtime::event_bus::Emitter;
use runtime::level::{LevelChange, LevelSwitch};
use tracing::{debug, trace};

use crate::feature::{Feature, FeatureCollection};
use crate::feature_layer::{FeatureLayer, FeatureRef, MarkerRef};
use crate::layer::{Layer, LayerId};
use crate::map::SharedMap;
use crate::options::IndoorOptions;

/// Click on a drawn feature, either direct or forwarded from one of its
/// markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureClick {
    pub feature: FeatureRef,
    /// Level of the layer holding the clicked feature.
    pub level: LevelId,
    pub marker: Option<MarkerRef>,
}

/// Indoor map data partitioned by level, showing one level at a time.
///
/// Each level owns a [`FeatureLayer`] with exactly the features assigned to
/// it; a feature on several levels is copied into each of them. While attached
/// to a map, the layer of the active level is the only one on the map.
pub struct IndoorLayerSet {
    options: IndoorOptions,
    layers: BTreeMap<LevelId, FeatureLayer>,
    layer_ids: IdAllocator,
    level: Option<LevelId>,
    map: Option<SharedMap>,
    level_changes: Emitter<LevelChange>,
    clicks: Emitter<FeatureClick>,
}

impl IndoorLayerSet {
    pub fn new(data: impl Into<FeatureCollection>, options: IndoorOptions) -> Self {
        let level = options.level.clone();
        let mut set = Self {
            options,
            layers: BTreeMap::new(),
            layer_ids: IdAllocator::new(),
            level,
            map: None,
            level_changes: Emitter::new(),
            clicks: Emitter::new(),
        };
        set.add_data(data);
        set
    }

    /// Sorts features into their level layers.
    ///
    /// Features without geometry or without a level are skipped. Returns the
    /// number of features that were placed on at least one level.
    pub fn add_data(&mut self, data: impl Into<FeatureCollection>) -> usize {
        let mut placed = 0usize;
        for feature in data.into().features {
            let Some(spec) = (self.options.get_level)(&feature) else {
                trace!(id = ?feature.id, "skipping feature without level");
                continue;
            };
            if !feature.has_geometry() {
                trace!(id = ?feature.id, "skipping feature without geometry");
                continue;
            }
            // Custom extractors may repeat a level; place once per distinct level.
            let mut levels: Vec<&LevelId> = Vec::new();
            for level in spec.levels() {
                if !levels.contains(&level) {
                    levels.push(level);
                }
            }
            if levels.is_empty() {
                trace!(id = ?feature.id, "skipping feature with an empty level list");
                continue;
            }
            for level in levels {
                self.add_to_level(level, &feature);
            }
            placed += 1;
        }
        placed
    }

    fn add_to_level(&mut self, level: &LevelId, feature: &Feature) {
        let style = self.options.style_for(feature);
        let feature_ref = self.ensure_layer(level).add_feature(feature.clone(), style);

        if let Some(hook) = self.options.on_each_feature.as_mut() {
            hook(feature, feature_ref);
        }

        let marker = self
            .options
            .marker_for_feature
            .as_ref()
            .and_then(|factory| factory(feature));
        if let Some(marker) = marker {
            // Markers never introduce a level of their own: a tag naming a level
            // without features falls back to the feature's level.
            let marker_level = match &marker.level {
                Some(tagged) if self.layers.contains_key(tagged) => tagged.clone(),
                Some(tagged) => {
                    debug!(%tagged, %level, "marker level has no layer, using feature level");
                    level.clone()
                }
                None => level.clone(),
            };
            if let Some(layer) = self.layers.get_mut(&marker_level) {
                layer.add_marker(marker, feature_ref);
            }
        }
    }

    fn ensure_layer(&mut self, level: &LevelId) -> &mut FeatureLayer {
        let ids = &mut self.layer_ids;
        self.layers.entry(level.clone()).or_insert_with(|| {
            let id = LayerId(ids.next_raw());
            debug!(%level, layer = id.0, "created level layer");
            FeatureLayer::new(id, level.clone())
        })
    }

    /// Puts the set on `map`, showing the active level.
    ///
    /// With no active level the first entry of [`Self::levels`] becomes
    /// active and a [`LevelChange`] without `old_level` is emitted.
    pub fn attach(&mut self, map: SharedMap) -> Result<(), IndoorError> {
        if self.map.is_some() {
            return Err(IndoorError::AlreadyAttached);
        }

        let defaulted = match &self.level {
            Some(_) => None,
            None => self.layers.keys().next().cloned(),
        };
        let active = self.level.as_ref().or(defaulted.as_ref());
        if let Some(level) = active {
            let layer = self
                .layers
                .get(level)
                .ok_or_else(|| IndoorError::InvalidLevel(level.clone()))?;
            map.borrow_mut().add_layer(layer);
            debug!(%level, "attached indoor layers");
        }

        self.map = Some(map);
        if let Some(level) = defaulted {
            self.level = Some(level.clone());
            self.level_changes.emit(&LevelChange::new(None, level));
        }
        Ok(())
    }

    /// Takes the active layer off the map and releases the map handle.
    pub fn detach(&mut self) -> Result<SharedMap, IndoorError> {
        let map = self.map.take().ok_or(IndoorError::NotAttached)?;
        if let Some(layer) = self.active_layer() {
            map.borrow_mut().remove_layer(layer);
            debug!(level = %layer.level(), "detached indoor layers");
        }
        Ok(map)
    }

    pub fn is_attached(&self) -> bool {
        self.map.is_some()
    }

    /// Known levels in key order (not numeric order).
    pub fn levels(&self) -> Vec<LevelId> {
        self.layers.keys().cloned().collect()
    }

    pub fn level(&self) -> Option<&LevelId> {
        self.level.as_ref()
    }

    /// Switches the visible level.
    ///
    /// Accepts a level id or a [`LevelChange`] (its `new_level` is used), so a
    /// level control's events can be fed straight in. Requesting the active
    /// level does nothing; requesting a level without a layer fails and leaves
    /// the set untouched.
    pub fn set_level(&mut self, level: impl Into<LevelId>) -> Result<(), IndoorError> {
        let level = level.into();
        if self.level.as_ref() == Some(&level) {
            return Ok(());
        }
        let next = self
            .layers
            .get(&level)
            .ok_or_else(|| IndoorError::InvalidLevel(level.clone()))?;

        if let Some(map) = &self.map {
            let mut map = map.borrow_mut();
            if let Some(current) = self.level.as_ref().and_then(|l| self.layers.get(l)) {
                map.remove_layer(current);
            }
            map.add_layer(next);
        }

        let change = LevelChange::new(self.level.replace(level.clone()), level);
        debug!(old = ?change.old_level, new = %change.new_level, "indoor level changed");
        self.level_changes.emit(&change);
        Ok(())
    }

    pub fn layer(&self, level: &LevelId) -> Option<&FeatureLayer> {
        self.layers.get(level)
    }

    pub fn layer_by_id(&self, id: LayerId) -> Option<&FeatureLayer> {
        self.layers.values().find(|layer| layer.id() == id)
    }

    pub fn active_layer(&self) -> Option<&FeatureLayer> {
        self.level.as_ref().and_then(|level| self.layers.get(level))
    }

    pub fn on_level_change(&mut self, listener: impl FnMut(&LevelChange) + 'static) -> ListenerId {
        self.level_changes.subscribe(listener)
    }

    pub fn off_level_change(&mut self, id: ListenerId) -> bool {
        self.level_changes.unsubscribe(id)
    }

    pub fn on_click(&mut self, listener: impl FnMut(&FeatureClick) + 'static) -> ListenerId {
        self.clicks.subscribe(listener)
    }

    pub fn off_click(&mut self, id: ListenerId) -> bool {
        self.clicks.unsubscribe(id)
    }

    /// Fires a click on a feature.
    pub fn click_feature(&mut self, feature: FeatureRef) -> Result<(), IndoorError> {
        let click = self.resolve_click(feature, None)?;
        self.clicks.emit(&click);
        Ok(())
    }

    /// Fires a click on a marker, delivered as a click on the feature it
    /// annotates.
    pub fn click_marker(&mut self, marker: MarkerRef) -> Result<(), IndoorError> {
        let target = self
            .layer_by_id(marker.layer)
            .and_then(|layer| layer.marker(marker.index))
            .map(|placed| placed.target)
            .ok_or(IndoorError::UnknownMarker)?;
        let click = self.resolve_click(target, Some(marker))?;
        self.clicks.emit(&click);
        Ok(())
    }

    fn resolve_click(
        &self,
        feature: FeatureRef,
        marker: Option<MarkerRef>,
    ) -> Result<FeatureClick, IndoorError> {
        let layer = self
            .layer_by_id(feature.layer)
            .filter(|layer| layer.feature(feature.index).is_some())
            .ok_or(IndoorError::UnknownFeature)?;
        Ok(FeatureClick {
            feature,
            level: layer.level().clone(),
            marker,
        })
    }
}

impl LevelSwitch for IndoorLayerSet {
    fn current_level(&self) -> Option<&LevelId> {
        self.level()
    }

    fn request_level(&mut self, level: &LevelId) -> Result<(), IndoorError> {
        self.set_level(level)
    }

    fn watch_level(&mut self, listener: Box<dyn FnMut(&LevelChange)>) -> ListenerId {
        self.level_changes.subscribe_boxed(listener)
    }

    fn unwatch_level(&mut self, id: ListenerId) -> bool {
        self.level_changes.unsubscribe(id)
    }
}

impl std::fmt::Debug for IndoorLayerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndoorLayerSet")
            .field("levels", &self.layers.keys().collect::<Vec<_>>())
            .field("level", &self.level)
            .field("attached", &self.map.is_some())
            .finish_non_exhaustive()
    }
}
