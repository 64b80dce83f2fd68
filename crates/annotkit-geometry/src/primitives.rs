use annotkit_core::{Bounds, DVec2};
use cavalier_contours::polyline::{
    PlineOrientation, PlineSource, PlineSourceMut, seg_arc_radius_and_center,
};

use crate::{PlineVertex, Polyline};

/// Full circle as two 180° arcs (two vertices, both bulge=1), counter-clockwise.
pub fn circle(center: DVec2, radius: f64) -> Polyline<f64> {
    let mut pl = Polyline::new_closed();
    pl.vertex_data
        .push(PlineVertex::new(center.x - radius, center.y, 1.0));
    pl.vertex_data
        .push(PlineVertex::new(center.x + radius, center.y, 1.0));
    pl
}

/// Segment `a -> b` thickened by `radius` with round caps: two straight sides joined by two
/// semicircles. Counter-clockwise. `a` and `b` must be distinct.
pub fn capsule(a: DVec2, b: DVec2, radius: f64) -> Polyline<f64> {
    let dir = (b - a).normalize_or_zero();
    let n = dir.perp() * radius;
    let mut pl = Polyline::new_closed();
    for (p, bulge) in [(a - n, 0.0), (b - n, 1.0), (b + n, 0.0), (a + n, 1.0)] {
        pl.vertex_data.push(PlineVertex::new(p.x, p.y, bulge));
    }
    pl
}

/// Closed straight-edged ring through `vertices`, oriented counter-clockwise.
pub fn polygon(vertices: &[DVec2]) -> Polyline<f64> {
    let mut pl = Polyline::new_closed();
    for v in vertices {
        pl.vertex_data.push(PlineVertex::new(v.x, v.y, 0.0));
    }
    orient_ccw(pl)
}

/// Axis-aligned box as a counter-clockwise ring.
pub fn bounds_ring(bounds: &Bounds) -> Polyline<f64> {
    polygon(&bounds.corners())
}

pub fn orient_ccw(mut pl: Polyline<f64>) -> Polyline<f64> {
    if pl.vertex_count() >= 2 && pl.orientation() == PlineOrientation::Clockwise {
        pl.invert_direction_mut();
    }
    pl
}

/// Replace every arc segment with line segments no wider than `step_deg` of sweep.
pub fn flatten_arcs(pl: &Polyline<f64>, step_deg: f64) -> Polyline<f64> {
    let step = step_deg.abs().max(0.1).to_radians();
    let count = pl.vertex_count();
    let mut out = Polyline::new_closed();
    out.is_closed = pl.is_closed;
    for i in 0..count {
        let v1 = pl.at(i);
        out.vertex_data.push(PlineVertex::new(v1.x, v1.y, 0.0));
        if v1.bulge_is_zero() || (!pl.is_closed && i + 1 == count) {
            continue;
        }
        let v2 = pl.at((i + 1) % count);
        let (radius, center) = seg_arc_radius_and_center(v1, v2);
        let sweep = 4.0 * v1.bulge.atan();
        let start = (v1.y - center.y).atan2(v1.x - center.x);
        let steps = (sweep.abs() / step).ceil().max(1.0) as usize;
        for k in 1..steps {
            let a = start + sweep * (k as f64) / (steps as f64);
            out.vertex_data.push(PlineVertex::new(
                center.x + radius * a.cos(),
                center.y + radius * a.sin(),
                0.0,
            ));
        }
    }
    out
}

/// Vertex positions of a ring (arcs are not expanded, flatten first when that matters).
pub fn ring_points(pl: &Polyline<f64>) -> Vec<DVec2> {
    pl.vertex_data
        .iter()
        .map(|v| DVec2::new(v.x, v.y))
        .collect()
}

/// Arc-aware extents of a ring.
pub fn ring_bounds(pl: &Polyline<f64>) -> Option<Bounds> {
    let aabb = pl.extents()?;
    Some(Bounds {
        min: DVec2::new(aabb.min_x, aabb.min_y),
        max: DVec2::new(aabb.max_x, aabb.max_y),
    })
}

pub fn translate_ring(pl: &mut Polyline<f64>, delta: DVec2) {
    for v in &mut pl.vertex_data {
        v.x += delta.x;
        v.y += delta.y;
    }
}

/// Distance from `p` to the closed straight-edged ring through `points`.
pub fn distance_to_ring(points: &[DVec2], p: DVec2) -> f64 {
    let n = points.len();
    if n == 0 {
        return f64::INFINITY;
    }
    (0..n)
        .map(|i| distance_to_segment(p, points[i], points[(i + 1) % n]))
        .fold(f64::INFINITY, f64::min)
}

pub fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
