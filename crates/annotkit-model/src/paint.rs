use annotkit_geometry::{CompositeMode, Region, Stroke, composite};
use tracing::debug;

use crate::error::ModelError;
use crate::item::{Geometry, GeometryKind, ItemId};
use crate::scene::Scene;

/// Apply a brush stroke to a region item and publish the geometry change.
///
/// Non-bounding items are clipped to the union of the bounding elements in their layer; a
/// bounding element itself is painted unconstrained.
pub fn paint_stroke(
    scene: &mut Scene,
    id: ItemId,
    stroke: &Stroke,
    mode: CompositeMode,
) -> Result<(), ModelError> {
    let item = scene.item(id).ok_or(ModelError::UnknownItem(id))?;
    let Geometry::Region(target) = item.geometry() else {
        return Err(ModelError::VariantMismatch {
            expected: GeometryKind::Region,
            found: item.geometry().kind(),
        });
    };

    let constraint = if item.is_bounding() {
        None
    } else {
        bounding_region(scene, id)
    };
    debug!(item = %id, ?mode, constrained = constraint.is_some(), "painting stroke");

    let result = composite(target, stroke, mode, constraint.as_ref());
    scene.set_geometry(id, Geometry::Region(result))
}

/// Union of every bounding element sharing a layer with `id`, `None` when there are none.
#[must_use]
pub fn bounding_region(scene: &Scene, id: ItemId) -> Option<Region> {
    let layer = scene.layer(scene.item(id)?.layer())?;
    layer
        .items()
        .filter(|other| other.id() != id && other.is_bounding())
        .filter_map(|other| other.geometry().to_region())
        .reduce(|acc, r| acc.union(&r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemData;
    use crate::layer::ItemEvent;
    use annotkit_core::DVec2;
    use annotkit_geometry::Rectangle;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn painting_empty_region_emits_change() {
        let mut scene = Scene::new();
        let layer = scene.add_layer(None);
        let id = scene
            .insert_item(layer, ItemData::new(Geometry::Region(Region::empty())))
            .unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        scene
            .layer_mut(layer)
            .unwrap()
            .subscribe(move |e| sink.borrow_mut().push(e.clone()));

        let stroke = Stroke::from_points(vec![DVec2::ZERO, DVec2::new(10.0, 0.0)], 5.0);
        paint_stroke(&mut scene, id, &stroke, CompositeMode::Draw).unwrap();

        assert_eq!(*log.borrow(), vec![ItemEvent::GeometryChanged(id)]);
        let Geometry::Region(region) = scene.item(id).unwrap().geometry() else {
            panic!("region expected");
        };
        assert!(region.contains_point(DVec2::new(5.0, 0.0)));
    }

    #[test]
    fn bounding_element_clips_other_items() {
        let mut scene = Scene::new();
        let layer = scene.add_layer(None);
        let mut bound = ItemData::new(Geometry::Rectangle(Rectangle::spanning(
            DVec2::ZERO,
            DVec2::new(20.0, 20.0),
            0.0,
        )));
        bound.bounding = true;
        scene.insert_item(layer, bound).unwrap();
        let id = scene
            .insert_item(layer, ItemData::new(Geometry::Region(Region::empty())))
            .unwrap();

        let stroke = Stroke::from_points(vec![DVec2::new(10.0, 10.0), DVec2::new(40.0, 10.0)], 3.0);
        paint_stroke(&mut scene, id, &stroke, CompositeMode::Draw).unwrap();

        let bounds = scene.item(id).unwrap().geometry().bounds().unwrap();
        assert!(bounds.max.x <= 20.0 + 1e-6);
        assert!(bounds.min.x >= 7.0 - 1e-6);
    }

    #[test]
    fn painting_a_rectangle_is_rejected() {
        let mut scene = Scene::new();
        let layer = scene.add_layer(None);
        let id = scene
            .insert_item(
                layer,
                ItemData::new(Geometry::Rectangle(Rectangle::spanning(
                    DVec2::ZERO,
                    DVec2::ONE,
                    0.0,
                ))),
            )
            .unwrap();
        let stroke = Stroke::new(DVec2::ZERO, 1.0);
        let err = paint_stroke(&mut scene, id, &stroke, CompositeMode::Draw).unwrap_err();
        assert_eq!(
            err,
            ModelError::VariantMismatch {
                expected: GeometryKind::Region,
                found: GeometryKind::Rectangle,
            }
        );
        assert_eq!(
            err.to_string(),
            "geometry variant mismatch: expected a region, found a rectangle"
        );
    }
}
