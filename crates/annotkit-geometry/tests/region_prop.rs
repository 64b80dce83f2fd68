use annotkit_core::DVec2;
use annotkit_geometry::primitives::polygon;
use annotkit_geometry::{CompositeMode, Region, Stroke, composite, fatten_stroke};
use proptest::prelude::*;

fn rect(x: f64, y: f64, w: f64, h: f64) -> Region {
    Region::from_ring(polygon(&[
        DVec2::new(x, y),
        DVec2::new(x + w, y),
        DVec2::new(x + w, y + h),
        DVec2::new(x, y + h),
    ]))
}

proptest! {
    #[test]
    fn union_contains_original(
        w in 1.0f64..50.0,
        h in 1.0f64..50.0,
        sx in -20.0f64..60.0,
        sy in -20.0f64..60.0,
        r in 0.5f64..15.0,
    ) {
        let region = rect(0.0, 0.0, w, h);
        let shape = fatten_stroke(&Stroke::new(DVec2::new(sx, sy), r));
        let out = region.union(&shape);
        prop_assert!(out.area() + 1e-6 >= region.area());
        prop_assert!(out.area() + 1e-6 >= shape.area());
        prop_assert!(out.contains_point(DVec2::new(w * 0.5, h * 0.5)));
        prop_assert!(out.contains_point(DVec2::new(sx, sy)));
    }

    #[test]
    fn difference_is_contained_in_original(
        w in 1.0f64..50.0,
        h in 1.0f64..50.0,
        sx in -20.0f64..60.0,
        sy in -20.0f64..60.0,
        r in 0.5f64..15.0,
    ) {
        let region = rect(0.0, 0.0, w, h);
        let shape = fatten_stroke(&Stroke::new(DVec2::new(sx, sy), r));
        let out = region.difference(&shape);
        prop_assert!(out.area() <= region.area() + 1e-6);
        prop_assert!(!out.contains_point(DVec2::new(sx, sy)));
        if let Some(b) = out.bounds() {
            prop_assert!(b.min.x >= -1e-6 && b.min.y >= -1e-6);
            prop_assert!(b.max.x <= w + 1e-6 && b.max.y <= h + 1e-6);
        }
    }

    #[test]
    fn paint_then_erase_restores_region(
        w in 1.0f64..30.0,
        h in 1.0f64..30.0,
        len in 0.0f64..40.0,
        r in 0.5f64..5.0,
    ) {
        let region = rect(0.0, 0.0, w, h);
        let start = DVec2::new(w + r + 5.0, 0.0);
        let stroke = Stroke::from_points(vec![start, start + DVec2::new(len, h)], r);

        let painted = composite(&region, &stroke, CompositeMode::Draw, None);
        prop_assert_eq!(painted.polygons().len(), 2);
        let erased = composite(&painted, &stroke, CompositeMode::Erase, None);

        prop_assert_eq!(erased.polygons().len(), 1);
        prop_assert!((erased.area() - region.area()).abs() < 1e-6);
    }
}

#[test]
fn erasing_a_hole_then_filling_it_back() {
    let region = rect(0.0, 0.0, 40.0, 40.0);
    let stroke = Stroke::from_points(vec![DVec2::new(10.0, 20.0), DVec2::new(30.0, 20.0)], 4.0);

    let erased = composite(&region, &stroke, CompositeMode::Erase, None);
    assert_eq!(erased.polygons().len(), 1);
    assert_eq!(erased.polygons()[0].holes.len(), 1);
    assert!(!erased.contains_point(DVec2::new(20.0, 20.0)));

    let filled = composite(&erased, &stroke, CompositeMode::Draw, None);
    assert_eq!(filled.polygons().len(), 1);
    assert!(filled.polygons()[0].holes.is_empty());
    assert!((filled.area() - 1600.0).abs() < 1e-6);
}

#[test]
fn erasing_across_splits_region() {
    let region = rect(0.0, 0.0, 40.0, 10.0);
    let stroke = Stroke::from_points(vec![DVec2::new(20.0, -10.0), DVec2::new(20.0, 20.0)], 2.0);
    let out = composite(&region, &stroke, CompositeMode::Erase, None);
    assert_eq!(out.polygons().len(), 2);
    assert!(out.contains_point(DVec2::new(5.0, 5.0)));
    assert!(out.contains_point(DVec2::new(35.0, 5.0)));
    assert!(!out.contains_point(DVec2::new(20.0, 5.0)));
}
