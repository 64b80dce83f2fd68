use annotkit_core::{Bounds, DVec2, angle_deg, rotate_vec};
use serde::{Deserialize, Serialize};

use crate::Polyline;
use crate::primitives::polygon;

/// Smallest side length a corner drag may shrink a rectangle to.
pub const MIN_SIDE: f64 = 1e-3;

/// Rotated rectangle stored as its four corners plus the rotation of its own frame.
///
/// Corners run top-left, top-right, bottom-right, bottom-left in the rectangle's own frame, so
/// `corners[1] - corners[0]` points along the frame's x axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    corners: [DVec2; 4],
    rotation: f64,
}

impl Rectangle {
    /// Rectangle spanned by two opposite corners in a frame rotated by `rotation_deg`.
    #[must_use]
    pub fn spanning(anchor: DVec2, opposite: DVec2, rotation_deg: f64) -> Self {
        let local = Bounds::from_corners(
            rotate_vec(anchor, -rotation_deg),
            rotate_vec(opposite, -rotation_deg),
        );
        Self {
            corners: local.corners().map(|c| rotate_vec(c, rotation_deg)),
            rotation: rotation_deg,
        }
    }

    /// Rectangle from stored corners. The rotation is taken from the top edge when not given.
    #[must_use]
    pub fn from_corners(corners: [DVec2; 4], rotation_deg: Option<f64>) -> Self {
        let rotation = rotation_deg.unwrap_or_else(|| {
            let top = corners[1] - corners[0];
            if top.length_squared() > 0.0 {
                angle_deg(top)
            } else {
                0.0
            }
        });
        Self { corners, rotation }
    }

    #[must_use]
    pub fn corners(&self) -> [DVec2; 4] {
        self.corners
    }

    /// Rotation of the rectangle's frame in degrees.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[must_use]
    pub fn center(&self) -> DVec2 {
        (self.corners[0] + self.corners[2]) * 0.5
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.corners[0].distance(self.corners[1])
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.corners[0].distance(self.corners[3])
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        let c = &self.corners;
        let twice: f64 = (0..4)
            .map(|i| {
                let (a, b) = (c[i], c[(i + 1) % 4]);
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice.abs() * 0.5
    }

    /// True when a side is shorter than [`MIN_SIDE`], the smallest size a corner drag produces.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        // Slack absorbs the rounding of a rotated clamp landing exactly on MIN_SIDE.
        self.width().min(self.height()) < MIN_SIDE * (1.0 - 1e-6)
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let [a, b, c, d] = self.corners;
        Bounds::from_corners(a, c).union(&Bounds::from_corners(b, d))
    }

    /// Inclusive containment test in the rectangle's own frame.
    #[must_use]
    pub fn contains_point(&self, p: DVec2) -> bool {
        let local = |v: DVec2| rotate_vec(v, -self.rotation);
        Bounds::from_corners(local(self.corners[0]), local(self.corners[2]))
            .contains_point(local(p))
    }

    pub fn translate(&mut self, delta: DVec2) {
        for c in &mut self.corners {
            *c += delta;
        }
    }

    /// Index of the first corner within `tolerance` of `p`.
    #[must_use]
    pub fn corner_near(&self, p: DVec2, tolerance: f64) -> Option<usize> {
        self.corners.iter().position(|c| c.distance(p) <= tolerance)
    }

    /// Resize by moving corner `index` towards `target` while the opposite corner stays put.
    ///
    /// With `constrain` the target is projected onto the corner↔opposite diagonal, keeping the
    /// aspect ratio. The dragged corner never crosses the anchor: each side is clamped to at
    /// least [`MIN_SIDE`] on the corner's original side.
    #[must_use]
    pub fn drag_corner(&self, index: usize, target: DVec2, constrain: bool) -> Rectangle {
        let index = index % 4;
        let anchor = self.corners[(index + 2) % 4];
        let handle = self.corners[index];
        let axis = handle - anchor;

        let mut offset = target - anchor;
        if constrain && axis.length_squared() > 0.0 {
            offset = offset.project_onto(axis);
        }

        let side = rotate_vec(axis, -self.rotation);
        let mut local = rotate_vec(offset, -self.rotation);
        local.x = clamp_side(local.x, side.x);
        local.y = clamp_side(local.y, side.y);

        Rectangle::spanning(anchor, anchor + rotate_vec(local, self.rotation), self.rotation)
    }

    /// Closed counter-clockwise ring through the corners.
    #[must_use]
    pub fn to_ring(&self) -> Polyline<f64> {
        polygon(&self.corners)
    }
}

fn clamp_side(value: f64, original: f64) -> f64 {
    let sign = if original < 0.0 { -1.0 } else { 1.0 };
    sign * (value * sign).max(MIN_SIDE)
}

/// Opposite corner for a square drag from `anchor` towards `pointer`.
///
/// The drag is snapped to whichever of the four diagonals of the frame rotated by `rotation_deg`
/// lies closest to it, and the square's side is the shorter of the drag's two extents in that
/// frame, so the corner never passes the pointer on either axis.
#[must_use]
pub fn square_corner(anchor: DVec2, pointer: DVec2, rotation_deg: f64) -> DVec2 {
    let delta = pointer - anchor;
    let axis = [(1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0)]
        .map(|(x, y)| rotate_vec(DVec2::new(x, y), rotation_deg))
        .into_iter()
        .max_by(|a, b| a.dot(delta).total_cmp(&b.dot(delta)))
        .unwrap_or(DVec2::ZERO);
    let local = rotate_vec(delta, -rotation_deg);
    let side = local.x.abs().min(local.y.abs());
    anchor + axis * side
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_point(p: DVec2, x: f64, y: f64) {
        assert_abs_diff_eq!(p.x, x, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, y, epsilon = 1e-9);
    }

    #[test]
    fn spanning_orders_corners_in_own_frame() {
        let r = Rectangle::spanning(DVec2::new(10.0, 20.0), DVec2::new(0.0, 0.0), 0.0);
        let [tl, tr, br, bl] = r.corners();
        assert_point(tl, 0.0, 0.0);
        assert_point(tr, 10.0, 0.0);
        assert_point(br, 10.0, 20.0);
        assert_point(bl, 0.0, 20.0);
        assert_abs_diff_eq!(r.area(), 200.0, epsilon = 1e-9);
    }

    #[test]
    fn rotated_rectangle_keeps_area_and_rotation() {
        let r = Rectangle::spanning(DVec2::ZERO, DVec2::new(0.0, 10.0), 45.0);
        assert_abs_diff_eq!(r.rotation(), 45.0);
        assert_abs_diff_eq!(r.area(), 50.0, epsilon = 1e-9);
        assert!(r.contains_point(DVec2::new(0.0, 5.0)));
        assert!(!r.contains_point(DVec2::new(4.0, 1.0)));
        let again = Rectangle::from_corners(r.corners(), None);
        assert_abs_diff_eq!(again.rotation(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let p = DVec2::new(3.0, 3.0);
        assert!(Rectangle::spanning(p, p, 0.0).is_degenerate());
        assert!(Rectangle::spanning(p, DVec2::new(3.0, 8.0), 0.0).is_degenerate());
    }

    #[test]
    fn degeneracy_follows_min_side() {
        let origin = DVec2::ZERO;
        let sliver = Rectangle::spanning(origin, DVec2::new(1e-4, 1e-4), 0.0);
        assert!(sliver.is_degenerate());
        let thin = Rectangle::spanning(origin, DVec2::new(500.0, MIN_SIDE * 0.5), 0.0);
        assert!(thin.is_degenerate());
        let corner = rotate_vec(DVec2::new(MIN_SIDE, MIN_SIDE), 30.0);
        let smallest = Rectangle::spanning(origin, corner, 30.0);
        assert!(!smallest.is_degenerate());
        let clamped = Rectangle::spanning(origin, DVec2::new(10.0, 10.0), 30.0).drag_corner(
            2,
            DVec2::new(-5.0, -5.0),
            false,
        );
        assert!(!clamped.is_degenerate());
    }

    #[test]
    fn corner_drag_resizes_around_opposite_corner() {
        let r = Rectangle::spanning(DVec2::ZERO, DVec2::new(10.0, 10.0), 0.0);
        let out = r.drag_corner(2, DVec2::new(20.0, 15.0), false);
        assert_point(out.corners()[0], 0.0, 0.0);
        assert_point(out.corners()[2], 20.0, 15.0);
    }

    #[test]
    fn corner_drag_past_anchor_is_clamped() {
        let r = Rectangle::spanning(DVec2::ZERO, DVec2::new(10.0, 10.0), 0.0);
        let out = r.drag_corner(2, DVec2::new(-5.0, -8.0), false);
        assert!(!out.is_degenerate());
        assert_point(out.corners()[0], 0.0, 0.0);
        assert_point(out.corners()[2], MIN_SIDE, MIN_SIDE);
    }

    #[test]
    fn constrained_corner_drag_keeps_aspect() {
        let r = Rectangle::spanning(DVec2::ZERO, DVec2::new(20.0, 10.0), 0.0);
        let out = r.drag_corner(2, DVec2::new(40.0, 10.0), true);
        assert_abs_diff_eq!(out.width() / out.height(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn square_corner_locks_to_shorter_side() {
        let c = square_corner(DVec2::ZERO, DVec2::new(10.0, 20.0), 0.0);
        assert_point(c, 10.0, 10.0);
        let c = square_corner(DVec2::ZERO, DVec2::new(-30.0, 5.0), 0.0);
        assert_point(c, -5.0, 5.0);
    }
}
