use annotkit_core::{Bounds, DVec2};
use cavalier_contours::core::math::Vector2;
use cavalier_contours::polyline::{BooleanOp, BooleanResultInfo, PlineSource, Polyline};
use tracing::warn;

use crate::primitives::{bounds_ring, flatten_arcs, orient_ccw, ring_bounds, translate_ring};

/// Rings whose absolute area falls below this are boolean-op slivers and get dropped.
const AREA_EPS: f64 = 1e-9;
const REDUNDANT_EPS: f64 = 1e-6;

/// One filled area: an outer ring minus its holes.
///
/// Every ring is stored counter-clockwise; which rings are holes is carried by the structure.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub outer: Polyline<f64>,
    pub holes: Vec<Polyline<f64>>,
}

impl Polygon {
    #[must_use]
    pub fn solid(outer: Polyline<f64>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.outer.area().abs() - self.holes.iter().map(|h| h.area().abs()).sum::<f64>()
    }

    #[must_use]
    pub fn contains_point(&self, p: DVec2) -> bool {
        winding(&self.outer, p) != 0 && self.holes.iter().all(|h| winding(h, p) == 0)
    }
}

/// Closed 2D area made of polygon rings, combined with boolean set semantics.
///
/// The canonical form is a list of pairwise disjoint polygons. A polygon sitting inside another
/// polygon's hole is an island and is listed on its own. An empty list is a valid empty region.
#[derive(Debug, Clone, Default)]
pub struct Region {
    polygons: Vec<Polygon>,
}

impl Region {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Region bounded by a single ring; degenerate rings produce an empty region.
    #[must_use]
    pub fn from_ring(ring: Polyline<f64>) -> Self {
        Self {
            polygons: normalize_ring(ring).map(Polygon::solid).into_iter().collect(),
        }
    }

    /// Build a region from non-crossing rings, classifying each by nesting depth: rings at even
    /// depth are outers, rings at odd depth are holes of their immediate parent.
    #[must_use]
    pub fn from_rings<I>(rings: I) -> Self
    where
        I: IntoIterator<Item = Polyline<f64>>,
    {
        let rings: Vec<Polyline<f64>> = rings.into_iter().filter_map(normalize_ring).collect();
        let areas: Vec<f64> = rings.iter().map(|r| r.area().abs()).collect();
        let extents: Vec<Option<Bounds>> = rings.iter().map(ring_bounds).collect();

        let mut parent: Vec<Option<usize>> = vec![None; rings.len()];
        for i in 0..rings.len() {
            for j in 0..rings.len() {
                if i == j || areas[j] <= areas[i] {
                    continue;
                }
                let fits = match (&extents[i], &extents[j]) {
                    (Some(inner), Some(outer)) => outer.expand(REDUNDANT_EPS).contains(inner),
                    _ => false,
                };
                if !fits || !ring_inside(&rings[i], &rings[j]) {
                    continue;
                }
                if parent[i].is_none_or(|p| areas[j] < areas[p]) {
                    parent[i] = Some(j);
                }
            }
        }

        let depth: Vec<usize> = (0..rings.len())
            .map(|i| {
                let mut d = 0;
                let mut cur = parent[i];
                while let Some(p) = cur {
                    d += 1;
                    cur = parent[p];
                }
                d
            })
            .collect();

        let mut slots: Vec<Option<Polygon>> = vec![None; rings.len()];
        for (i, ring) in rings.iter().enumerate() {
            if depth[i] % 2 == 0 {
                slots[i] = Some(Polygon::solid(ring.clone()));
            }
        }
        for (i, ring) in rings.into_iter().enumerate() {
            if depth[i] % 2 == 0 {
                continue;
            }
            if let Some(poly) = parent[i].and_then(|p| slots[p].as_mut()) {
                poly.holes.push(ring);
            }
        }

        Self {
            polygons: slots.into_iter().flatten().collect(),
        }
    }

    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Every ring, outers and holes alike.
    pub fn rings(&self) -> impl Iterator<Item = &Polyline<f64>> {
        self.polygons
            .iter()
            .flat_map(|p| std::iter::once(&p.outer).chain(p.holes.iter()))
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        self.polygons
            .iter()
            .filter_map(|p| ring_bounds(&p.outer))
            .reduce(|a, b| a.union(&b))
    }

    #[must_use]
    pub fn contains_point(&self, p: DVec2) -> bool {
        self.polygons.iter().any(|poly| poly.contains_point(p))
    }

    pub fn translate(&mut self, delta: DVec2) {
        for poly in &mut self.polygons {
            translate_ring(&mut poly.outer, delta);
            for h in &mut poly.holes {
                translate_ring(h, delta);
            }
        }
    }

    /// Same region with every arc replaced by line segments.
    #[must_use]
    pub fn flattened(&self, step_deg: f64) -> Region {
        Region {
            polygons: self
                .polygons
                .iter()
                .map(|p| Polygon {
                    outer: orient_ccw(flatten_arcs(&p.outer, step_deg)),
                    holes: p
                        .holes
                        .iter()
                        .map(|h| orient_ccw(flatten_arcs(h, step_deg)))
                        .collect(),
                })
                .collect(),
        }
    }

    /// Points in `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Region) -> Region {
        let mut polygons = self.polygons.clone();
        for cutter in &other.polygons {
            if polygons.is_empty() {
                break;
            }
            polygons = subtract_polygon(&polygons, cutter);
        }
        Region { polygons }
    }

    /// Points in `self` or `other`. Computed as the complement of the complement minus `other`
    /// inside a frame enclosing both operands.
    #[must_use]
    pub fn union(&self, other: &Region) -> Region {
        if other.is_empty() {
            return self.clone();
        }
        let frame = frame_ring(self, other);
        self.complement_within(&frame)
            .difference(other)
            .without_frame(&frame)
    }

    /// Points in both `self` and `other`.
    #[must_use]
    pub fn intersection(&self, other: &Region) -> Region {
        if self.is_empty() || other.is_empty() {
            return Region::empty();
        }
        let frame = frame_ring(self, other);
        self.difference(&other.complement_within(&frame))
    }

    fn complement_within(&self, frame: &Polyline<f64>) -> Region {
        Region::from_rings(std::iter::once(frame.clone()).chain(self.rings().cloned()))
    }

    fn without_frame(&self, frame: &Polyline<f64>) -> Region {
        Region::from_rings(self.rings().filter(|r| !same_ring(r, frame)).cloned())
    }
}

fn normalize_ring(pl: Polyline<f64>) -> Option<Polyline<f64>> {
    if !pl.is_closed() || pl.vertex_count() < 2 {
        return None;
    }
    // Boolean results often carry collinear runs; collapse them like the inputs would have been.
    let pl = pl.remove_redundant(REDUNDANT_EPS).unwrap_or(pl);
    if pl.vertex_count() < 2 || pl.area().abs() < AREA_EPS {
        return None;
    }
    Some(orient_ccw(pl))
}

fn winding(ring: &Polyline<f64>, p: DVec2) -> i32 {
    ring.winding_number(Vector2::new(p.x, p.y))
}

/// `inner` lies inside `outer` when most of its vertices do; a vertex exactly on the boundary
/// can report either side.
fn ring_inside(inner: &Polyline<f64>, outer: &Polyline<f64>) -> bool {
    let inside = inner
        .vertex_data
        .iter()
        .filter(|v| outer.winding_number(Vector2::new(v.x, v.y)) != 0)
        .count();
    inside * 2 > inner.vertex_count()
}

fn same_ring(a: &Polyline<f64>, b: &Polyline<f64>) -> bool {
    a.vertex_count() == b.vertex_count()
        && a
            .vertex_data
            .iter()
            .zip(b.vertex_data.iter())
            .all(|(u, v)| u.x == v.x && u.y == v.y && u.bulge == v.bulge)
}

fn extents_overlap(a: &Polyline<f64>, b: &Polyline<f64>) -> bool {
    match (ring_bounds(a), ring_bounds(b)) {
        (Some(a), Some(b)) => a.overlaps(&b),
        _ => false,
    }
}

fn frame_ring(a: &Region, b: &Region) -> Polyline<f64> {
    let bounds = match (a.bounds(), b.bounds()) {
        (Some(x), Some(y)) => x.union(&y),
        (Some(x), None) | (None, Some(x)) => x,
        (None, None) => Bounds::from_corners(DVec2::ZERO, DVec2::ONE),
    };
    let margin = bounds.width().max(bounds.height()) * 0.5 + 1.0;
    bounds_ring(&bounds.expand(margin))
}

/// `polygons \ cutter`, using `P \ (O \ H) = (P \ O) ∪ ⋃ (P ∩ h)`.
fn subtract_polygon(polygons: &[Polygon], cutter: &Polygon) -> Vec<Polygon> {
    let mut out: Vec<Polygon> = polygons
        .iter()
        .flat_map(|p| subtract_ring(p, &cutter.outer))
        .collect();
    for hole in &cutter.holes {
        out.extend(polygons.iter().flat_map(|p| intersect_ring(p, hole)));
    }
    out
}

/// `poly \ cutter` for a hole-free cutter ring.
fn subtract_ring(poly: &Polygon, cutter: &Polyline<f64>) -> Vec<Polygon> {
    if !extents_overlap(&poly.outer, cutter) {
        return vec![poly.clone()];
    }
    let res = poly.outer.boolean(cutter, BooleanOp::Not);
    match res.result_info {
        BooleanResultInfo::Disjoint => return vec![poly.clone()],
        BooleanResultInfo::InvalidInput => {
            warn!("skipping boolean subtract on invalid input");
            return vec![poly.clone()];
        }
        _ => {}
    }
    if !res.neg_plines.is_empty() {
        // The cutter sits strictly inside the outer ring.
        return punch_hole(poly, cutter);
    }

    let mut out = Vec::new();
    for piece in res.pos_plines.into_iter().filter_map(|p| normalize_ring(p.pline)) {
        let mut pieces = vec![Polygon::solid(piece)];
        for hole in &poly.holes {
            pieces = pieces.iter().flat_map(|p| subtract_ring(p, hole)).collect();
        }
        out.extend(pieces);
    }
    out
}

/// Add `cutter` (strictly inside `poly.outer`) as a hole, merging it with any hole it overlaps.
/// Areas enclosed by the merged hole but not covered by it stay filled as islands.
fn punch_hole(poly: &Polygon, cutter: &Polyline<f64>) -> Vec<Polygon> {
    let mut merged = cutter.clone();
    let mut holes: Vec<Polyline<f64>> = Vec::new();
    let mut islands: Vec<Polyline<f64>> = Vec::new();

    for hole in &poly.holes {
        if !extents_overlap(&merged, hole) {
            holes.push(hole.clone());
            continue;
        }
        let res = merged.boolean(hole, BooleanOp::Or);
        if matches!(
            res.result_info,
            BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput
        ) {
            holes.push(hole.clone());
            continue;
        }
        let mut pos = res.pos_plines.into_iter().filter_map(|p| normalize_ring(p.pline));
        let Some(next) = pos.next() else {
            holes.push(hole.clone());
            continue;
        };
        merged = next;
        islands = islands
            .iter()
            .flat_map(|island| subtract_simple(island, hole))
            .collect();
        islands.extend(res.neg_plines.into_iter().filter_map(|p| normalize_ring(p.pline)));
    }
    holes.push(merged);

    let mut out = vec![Polygon {
        outer: poly.outer.clone(),
        holes,
    }];
    out.extend(islands.into_iter().map(Polygon::solid));
    out
}

fn subtract_simple(ring: &Polyline<f64>, cutter: &Polyline<f64>) -> Vec<Polyline<f64>> {
    if !extents_overlap(ring, cutter) {
        return vec![ring.clone()];
    }
    let res = ring.boolean(cutter, BooleanOp::Not);
    match res.result_info {
        BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput => vec![ring.clone()],
        _ => res
            .pos_plines
            .into_iter()
            .filter_map(|p| normalize_ring(p.pline))
            .collect(),
    }
}

/// `poly ∩ ring` for a hole-free ring.
fn intersect_ring(poly: &Polygon, ring: &Polyline<f64>) -> Vec<Polygon> {
    if !extents_overlap(&poly.outer, ring) {
        return Vec::new();
    }
    let res = poly.outer.boolean(ring, BooleanOp::And);
    if matches!(
        res.result_info,
        BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput
    ) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for piece in res.pos_plines.into_iter().filter_map(|p| normalize_ring(p.pline)) {
        let mut pieces = vec![Polygon::solid(piece)];
        for hole in &poly.holes {
            pieces = pieces.iter().flat_map(|p| subtract_ring(p, hole)).collect();
        }
        out.extend(pieces);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{circle, polygon};
    use approx::assert_abs_diff_eq;

    fn square(min: (f64, f64), size: f64) -> Polyline<f64> {
        polygon(&[
            DVec2::new(min.0, min.1),
            DVec2::new(min.0 + size, min.1),
            DVec2::new(min.0 + size, min.1 + size),
            DVec2::new(min.0, min.1 + size),
        ])
    }

    #[test]
    fn from_rings_classifies_holes_and_islands() {
        let region = Region::from_rings(vec![
            square((0.0, 0.0), 10.0),
            square((2.0, 2.0), 6.0),
            square((4.0, 4.0), 2.0),
        ]);
        assert_eq!(region.polygons().len(), 2);
        assert_abs_diff_eq!(region.area(), 100.0 - 36.0 + 4.0, epsilon = 1e-9);
        assert!(region.contains_point(DVec2::new(1.0, 1.0)));
        assert!(!region.contains_point(DVec2::new(3.0, 3.0)));
        assert!(region.contains_point(DVec2::new(5.0, 5.0)));
    }

    #[test]
    fn difference_with_inner_square_makes_hole() {
        let outer = Region::from_ring(square((0.0, 0.0), 10.0));
        let inner = Region::from_ring(square((3.0, 3.0), 2.0));
        let out = outer.difference(&inner);
        assert_eq!(out.polygons().len(), 1);
        assert_eq!(out.polygons()[0].holes.len(), 1);
        assert_abs_diff_eq!(out.area(), 96.0, epsilon = 1e-6);
        assert!(!out.contains_point(DVec2::new(4.0, 4.0)));
    }

    #[test]
    fn union_of_overlapping_squares() {
        let a = Region::from_ring(square((0.0, 0.0), 10.0));
        let b = Region::from_ring(square((5.0, 5.0), 10.0));
        let out = a.union(&b);
        assert_eq!(out.polygons().len(), 1);
        assert_abs_diff_eq!(out.area(), 175.0, epsilon = 1e-6);
    }

    #[test]
    fn union_fills_an_existing_hole() {
        let with_hole = Region::from_rings(vec![square((0.0, 0.0), 10.0), square((3.0, 3.0), 4.0)]);
        let patch = Region::from_ring(square((2.0, 2.0), 6.0));
        let out = with_hole.union(&patch);
        assert_eq!(out.polygons().len(), 1);
        assert!(out.polygons()[0].holes.is_empty());
        assert_abs_diff_eq!(out.area(), 100.0, epsilon = 1e-6);
    }

    #[test]
    fn union_inside_a_hole_creates_an_island() {
        let with_hole = Region::from_rings(vec![square((0.0, 0.0), 10.0), square((2.0, 2.0), 6.0)]);
        let dot = Region::from_ring(circle(DVec2::new(5.0, 5.0), 1.0));
        let out = with_hole.union(&dot);
        assert_eq!(out.polygons().len(), 2);
        assert!(out.contains_point(DVec2::new(5.0, 5.0)));
        assert!(!out.contains_point(DVec2::new(3.0, 3.0)));
    }

    #[test]
    fn intersection_clips_to_overlap() {
        let a = Region::from_ring(square((0.0, 0.0), 10.0));
        let b = Region::from_ring(square((5.0, -5.0), 10.0));
        let out = a.intersection(&b);
        assert_abs_diff_eq!(out.area(), 25.0, epsilon = 1e-6);
        let bounds = out.bounds().unwrap();
        assert_abs_diff_eq!(bounds.min.x, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bounds.max.y, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn subtracting_everything_leaves_empty_region() {
        let a = Region::from_ring(square((0.0, 0.0), 4.0));
        let b = Region::from_ring(square((-1.0, -1.0), 6.0));
        assert!(a.difference(&b).is_empty());
    }

    #[test]
    fn degenerate_ring_is_dropped() {
        let line = polygon(&[DVec2::ZERO, DVec2::new(1.0, 0.0), DVec2::new(2.0, 0.0)]);
        assert!(Region::from_ring(line).is_empty());
    }
}
