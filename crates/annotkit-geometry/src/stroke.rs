use annotkit_core::DVec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::primitives::{capsule, circle};
use crate::region::Region;

/// Radius substituted for non-positive or non-finite brush radii.
pub const MIN_RADIUS: f64 = 1e-3;

/// Points closer than this are treated as the same stroke sample.
const SAME_POINT_EPS: f64 = 1e-9;

/// Freehand path captured during one brush drag. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<DVec2>,
    radius: f64,
}

impl Stroke {
    #[must_use]
    pub fn new(start: DVec2, radius: f64) -> Self {
        Self {
            points: vec![start],
            radius,
        }
    }

    #[must_use]
    pub fn from_points(points: Vec<DVec2>, radius: f64) -> Self {
        Self { points, radius }
    }

    #[must_use]
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn last(&self) -> Option<DVec2> {
        self.points.last().copied()
    }

    pub fn push(&mut self, p: DVec2) {
        self.points.push(p);
    }

    /// Sample `p` into the stroke using a `[min, max]` distance band in model units.
    ///
    /// Points closer than `min` to the last sample are skipped. Jumps longer than `max` are split
    /// into evenly spaced samples no further apart than `max`. Returns the number of samples added.
    pub fn extend_within_band(&mut self, p: DVec2, min: f64, max: f64) -> usize {
        let Some(last) = self.last() else {
            self.points.push(p);
            return 1;
        };
        let dist = last.distance(p);
        if dist < min {
            return 0;
        }
        let steps = if max > 0.0 {
            (dist / max).ceil().max(1.0) as usize
        } else {
            1
        };
        for k in 1..=steps {
            self.points.push(last.lerp(p, k as f64 / steps as f64));
        }
        steps
    }
}

/// How a fattened stroke combines with its target region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeMode {
    Draw,
    Erase,
}

/// Closed shape covering every point within `radius` of the stroke path.
///
/// Each segment becomes a capsule and the capsules are united, so joins and caps are round. Where
/// the path crosses itself the result is the plain Minkowski sum of path and disc: overlapping
/// lobes merge, a loop that closes around an uncovered area leaves that area as a hole, and a
/// sharp reversal is covered by the cap at the turning point.
#[must_use]
pub fn fatten_stroke(stroke: &Stroke) -> Region {
    let radius = if stroke.radius.is_finite() && stroke.radius > 0.0 {
        stroke.radius
    } else {
        warn!(radius = stroke.radius, "non-positive brush radius, using minimal circle");
        MIN_RADIUS
    };

    let mut path: Vec<DVec2> = Vec::with_capacity(stroke.points.len());
    for &p in &stroke.points {
        if path.last().is_none_or(|last| last.distance(p) > SAME_POINT_EPS) {
            path.push(p);
        }
    }

    match path.as_slice() {
        [] => Region::empty(),
        [p] => Region::from_ring(circle(*p, radius)),
        _ => path.windows(2).fold(Region::empty(), |acc, seg| {
            acc.union(&Region::from_ring(capsule(seg[0], seg[1], radius)))
        }),
    }
}

/// Combine a stroke with `target`.
///
/// When `bounds` is given the fattened stroke is first clipped to it; callers pass `None` when the
/// target is itself a bounding element. Erasing everything yields an empty region.
#[must_use]
pub fn composite(
    target: &Region,
    stroke: &Stroke,
    mode: CompositeMode,
    bounds: Option<&Region>,
) -> Region {
    let mut shape = fatten_stroke(stroke);
    if let Some(bounds) = bounds {
        shape = shape.intersection(bounds);
    }
    let out = match mode {
        CompositeMode::Draw => target.union(&shape),
        CompositeMode::Erase => target.difference(&shape),
    };
    debug!(
        ?mode,
        samples = stroke.points.len(),
        radius = stroke.radius,
        polygons = out.polygons().len(),
        "composited stroke"
    );
    out
}
