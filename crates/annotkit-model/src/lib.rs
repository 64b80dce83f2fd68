//! Live annotation model: items owned by layers, selection, events, hit testing and brush
//! painting.

pub mod error;
pub mod hit;
pub mod item;
pub mod layer;
pub mod paint;
pub mod raster;
pub mod scene;
pub mod style;

pub use error::ModelError;
pub use hit::{Hit, HitKind, HitOptions, area_query, hit_item, hit_test};
pub use item::{AnnotationItem, Geometry, GeometryKind, ItemData, ItemId, LayerId};
pub use layer::{ItemEvent, Layer, SubscriptionToken};
pub use paint::{bounding_region, paint_stroke};
pub use raster::{MaskChild, Raster};
pub use scene::Scene;
pub use style::{Color, Style};
