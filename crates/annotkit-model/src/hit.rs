//! Point and area queries against the scene.
//!
//! Tolerances are screen-space pixels converted with [`Tolerance::model`], so a query made at
//! the same screen position hits the same item at every zoom level.

use annotkit_core::{Bounds, DVec2, Tolerance};
use annotkit_geometry::DEFAULT_ARC_STEP_DEG;
use annotkit_geometry::primitives::{distance_to_ring, flatten_arcs, ring_points};
use tracing::trace;

use crate::item::{AnnotationItem, Geometry, ItemId};
use crate::raster::MIN_DETERMINANT;
use crate::scene::Scene;
use crate::style::Style;

/// Which part of an item was hit, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Segment,
    Stroke,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub item: ItemId,
    pub kind: HitKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOptions {
    pub tolerance: Tolerance,
    pub segments: bool,
    pub stroke: bool,
    pub fill: bool,
    pub arc_step_deg: f64,
}

impl HitOptions {
    /// Test segments, strokes and fills.
    #[must_use]
    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            segments: true,
            stroke: true,
            fill: true,
            arc_step_deg: DEFAULT_ARC_STEP_DEG,
        }
    }

    /// Test vertices only, as used for rectangle corner handles.
    #[must_use]
    pub fn segments_only(tolerance: Tolerance) -> Self {
        Self {
            stroke: false,
            fill: false,
            ..Self::new(tolerance)
        }
    }
}

/// Topmost item under `p`. Hits on clip-mask children resolve to the raster that owns them.
#[must_use]
pub fn hit_test(scene: &Scene, p: DVec2, options: &HitOptions) -> Option<Hit> {
    let hit = scene.items().rev().find_map(|item| {
        hit_item(item, p, options).map(|kind| Hit {
            item: item.id(),
            kind,
        })
    });
    trace!(x = p.x, y = p.y, ?hit, "hit test");
    hit
}

#[must_use]
pub fn hit_item(item: &AnnotationItem, p: DVec2, options: &HitOptions) -> Option<HitKind> {
    hit_geometry(
        item.geometry(),
        item.style(),
        p,
        options,
        options.tolerance.model(),
        options.tolerance.zoom,
    )
}

fn hit_geometry(
    geometry: &Geometry,
    style: &Style,
    p: DVec2,
    options: &HitOptions,
    tolerance: f64,
    zoom: f64,
) -> Option<HitKind> {
    let stroke_reach = tolerance + style.half_stroke(zoom);
    match geometry {
        Geometry::Rectangle(rect) => {
            if options.segments && rect.corner_near(p, tolerance).is_some() {
                return Some(HitKind::Segment);
            }
            if options.stroke && distance_to_ring(&rect.corners(), p) <= stroke_reach {
                return Some(HitKind::Stroke);
            }
            (options.fill && rect.contains_point(p)).then_some(HitKind::Fill)
        }
        Geometry::Region(region) => {
            if options.segments
                && region
                    .rings()
                    .flat_map(ring_points)
                    .any(|v| v.distance(p) <= tolerance)
            {
                return Some(HitKind::Segment);
            }
            if options.stroke
                && region.rings().any(|ring| {
                    let flat = flatten_arcs(ring, options.arc_step_deg);
                    distance_to_ring(&ring_points(&flat), p) <= stroke_reach
                })
            {
                return Some(HitKind::Stroke);
            }
            (options.fill && region.contains_point(p)).then_some(HitKind::Fill)
        }
        Geometry::Raster(raster) => {
            let local = raster.to_group(p)?;
            if !raster.is_clipped() {
                return (options.fill && raster.contains_point(p)).then_some(HitKind::Fill);
            }
            // Mask children live in the group's frame; tolerances scale with it.
            let scale = raster.transform.matrix2.determinant().abs().sqrt();
            if scale < MIN_DETERMINANT {
                return None;
            }
            raster.clip_mask.iter().rev().find_map(|child| {
                hit_geometry(
                    &child.geometry,
                    &child.style,
                    local,
                    options,
                    tolerance / scale,
                    zoom * scale,
                )
            })
        }
    }
}

/// Items whose bounds overlap `area`, or lie fully inside it when `fully_contained` is set.
/// Bottom to top.
#[must_use]
pub fn area_query(scene: &Scene, area: &Bounds, fully_contained: bool) -> Vec<ItemId> {
    scene
        .items()
        .filter(|item| {
            item.geometry().bounds().is_some_and(|b| {
                if fully_contained {
                    area.contains(&b)
                } else {
                    area.overlaps(&b)
                }
            })
        })
        .map(AnnotationItem::id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemData;
    use crate::raster::{MaskChild, Raster};
    use annotkit_core::DAffine2;
    use annotkit_geometry::{Rectangle, Region, primitives::circle};

    fn rect(a: (f64, f64), b: (f64, f64)) -> Geometry {
        Geometry::Rectangle(Rectangle::spanning(
            DVec2::new(a.0, a.1),
            DVec2::new(b.0, b.1),
            0.0,
        ))
    }

    fn scene_with(geoms: Vec<Geometry>) -> (Scene, Vec<ItemId>) {
        let mut scene = Scene::new();
        let layer = scene.add_layer(None);
        let ids = geoms
            .into_iter()
            .map(|g| scene.insert_item(layer, ItemData::new(g)).unwrap())
            .collect();
        (scene, ids)
    }

    #[test]
    fn topmost_item_wins() {
        let (scene, ids) = scene_with(vec![
            rect((0.0, 0.0), (10.0, 10.0)),
            rect((5.0, 5.0), (15.0, 15.0)),
        ]);
        let opts = HitOptions::new(Tolerance::new(1.0, 1.0));
        let hit = hit_test(&scene, DVec2::new(7.0, 7.0), &opts);
        assert_eq!(hit.map(|h| h.item), Some(ids[1]));
    }

    #[test]
    fn corner_beats_fill() {
        let (scene, ids) = scene_with(vec![rect((0.0, 0.0), (40.0, 40.0))]);
        let opts = HitOptions::new(Tolerance::new(5.0, 1.0));
        let hit = hit_test(&scene, DVec2::new(39.0, 39.0), &opts).unwrap();
        assert_eq!(
            hit,
            Hit {
                item: ids[0],
                kind: HitKind::Segment,
            }
        );
        let hit = hit_test(&scene, DVec2::new(20.0, 38.0), &opts).unwrap();
        assert_eq!(hit.kind, HitKind::Stroke);
        let hit = hit_test(&scene, DVec2::new(20.0, 20.0), &opts).unwrap();
        assert_eq!(hit.kind, HitKind::Fill);
    }

    #[test]
    fn tolerance_shrinks_when_zoomed_in() {
        let disc = Region::from_ring(circle(DVec2::ZERO, 10.0));
        let (scene, _) = scene_with(vec![Geometry::Region(disc)]);
        let p = DVec2::new(13.0, 0.0);
        assert!(hit_test(&scene, p, &HitOptions::new(Tolerance::new(5.0, 1.0))).is_some());
        assert!(hit_test(&scene, p, &HitOptions::new(Tolerance::new(5.0, 4.0))).is_none());
    }

    #[test]
    fn mask_hit_redirects_to_raster() {
        let raster = Raster {
            data: String::new(),
            width: 100,
            height: 100,
            center: DVec2::new(50.0, 50.0),
            scaling: DVec2::ONE,
            rotation: 0.0,
            transform: DAffine2::from_translation(DVec2::new(100.0, 0.0)),
            clip_mask: vec![MaskChild {
                geometry: rect((10.0, 10.0), (20.0, 20.0)),
                style: Style::default(),
            }],
        };
        let (scene, ids) = scene_with(vec![Geometry::Raster(raster)]);
        let opts = HitOptions::new(Tolerance::new(1.0, 1.0));
        let hit = hit_test(&scene, DVec2::new(115.0, 15.0), &opts).unwrap();
        assert_eq!(hit.item, ids[0]);
        assert_eq!(hit.kind, HitKind::Fill);
        assert!(hit_test(&scene, DVec2::new(150.0, 50.0), &opts).is_none());
    }

    #[test]
    fn area_query_overlap_versus_containment() {
        let (scene, ids) = scene_with(vec![
            rect((0.0, 0.0), (10.0, 10.0)),
            rect((8.0, 8.0), (30.0, 30.0)),
        ]);
        let area = Bounds::from_corners(DVec2::new(-1.0, -1.0), DVec2::new(12.0, 12.0));
        assert_eq!(area_query(&scene, &area, false), ids);
        assert_eq!(area_query(&scene, &area, true), vec![ids[0]]);
    }
}
