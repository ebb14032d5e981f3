use std::cell::RefCell;
use std::rc::Rc;

use foundation::level::LevelId;

use crate::layer::{Layer, LayerId};

/// The host map's layer stack.
///
/// Implementations only decide what is shown; drawing a layer's contents is the
/// host's business. Adding a layer that is already shown and removing one that
/// is not are no-ops.
pub trait MapSurface {
    fn add_layer(&mut self, layer: &dyn Layer);
    fn remove_layer(&mut self, layer: &dyn Layer);
    fn has_layer(&self, id: LayerId) -> bool;
}

/// Map handle shared between the host and the components attached to it.
pub type SharedMap = Rc<RefCell<dyn MapSurface>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapOp {
    Add(LayerId),
    Remove(LayerId),
}

/// Headless map surface: an ordered layer stack plus an operation log.
#[derive(Debug, Default)]
pub struct MapView {
    shown: Vec<(LayerId, LevelId)>,
    history: Vec<MapOp>,
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<RefCell<MapView>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn layers(&self) -> Vec<LayerId> {
        self.shown.iter().map(|(id, _)| *id).collect()
    }

    /// Levels of the shown layers, bottom to top.
    pub fn levels(&self) -> Vec<LevelId> {
        self.shown.iter().map(|(_, level)| level.clone()).collect()
    }

    pub fn history(&self) -> &[MapOp] {
        &self.history
    }
}

impl MapSurface for MapView {
    fn add_layer(&mut self, layer: &dyn Layer) {
        if self.has_layer(layer.id()) {
            return;
        }
        self.shown.push((layer.id(), layer.level().clone()));
        self.history.push(MapOp::Add(layer.id()));
    }

    fn remove_layer(&mut self, layer: &dyn Layer) {
        let before = self.shown.len();
        self.shown.retain(|(id, _)| *id != layer.id());
        if self.shown.len() != before {
            self.history.push(MapOp::Remove(layer.id()));
        }
    }

    fn has_layer(&self, id: LayerId) -> bool {
        self.shown.iter().any(|(shown, _)| *shown == id)
    }
}
