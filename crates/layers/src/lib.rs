pub mod feature;
pub mod feature_layer;
pub mod indoor;
pub mod layer;
pub mod map;
pub mod options;
pub mod symbology;

pub use feature::*;
pub use feature_layer::*;
pub use indoor::*;
pub use layer::*;
pub use map::*;
pub use options::*;
pub use symbology::*;
