//! 2D geometry for annotation items: regions with boolean set semantics, rotated rectangles and
//! freehand stroke fattening.

pub mod primitives;
pub mod rectangle;
pub mod region;
pub mod stroke;

pub use cavalier_contours::polyline::{PlineVertex, Polyline};
pub use rectangle::Rectangle;
pub use region::{Polygon, Region};
pub use stroke::{CompositeMode, Stroke, composite, fatten_stroke};

/// Default angular step used when arcs are flattened into line segments.
pub const DEFAULT_ARC_STEP_DEG: f64 = 5.0;
