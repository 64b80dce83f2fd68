//! Shared math and view primitives for the annotation editing core.

pub mod bounds;
pub mod view;

pub use bounds::Bounds;
pub use glam::{DAffine2, DVec2};
pub use view::{Tolerance, ViewMapper, ViewTransform};

/// Rotate `v` by `angle_deg` (counter-clockwise in a y-up frame).
#[must_use]
pub fn rotate_vec(v: DVec2, angle_deg: f64) -> DVec2 {
    DVec2::from_angle(angle_deg.to_radians()).rotate(v)
}

/// Angle of `v` in degrees, measured from the positive x axis.
#[must_use]
pub fn angle_deg(v: DVec2) -> f64 {
    v.y.atan2(v.x).to_degrees()
}
