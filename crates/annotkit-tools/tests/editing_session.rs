use std::cell::RefCell;
use std::rc::Rc;

use annotkit_core::{DVec2, ViewTransform};
use annotkit_geometry::{Rectangle, Region, primitives::polygon};
use annotkit_model::{Geometry, ItemData, ItemEvent, ItemId, Scene};
use annotkit_tools::{EditorConfig, Key, Modifiers, ToolController, ToolEvent, ToolKind, ToolTarget};
use approx::assert_abs_diff_eq;

fn pt(x: f64, y: f64) -> DVec2 {
    DVec2::new(x, y)
}

fn rect_item(a: DVec2, b: DVec2) -> ItemData {
    ItemData::new(Geometry::Rectangle(Rectangle::spanning(a, b, 0.0)))
}

fn editor(scene: Scene) -> ToolController<ViewTransform> {
    ToolController::new(scene, ViewTransform::default(), EditorConfig::default())
}

fn selected(controller: &ToolController<ViewTransform>) -> Vec<ItemId> {
    controller.scene().selected()
}

#[test]
fn click_selection_follows_modifier_rules() {
    let mut scene = Scene::new();
    let layer = scene.add_layer(Some("annotations".into()));
    let a = scene.insert_item(layer, rect_item(pt(0.0, 0.0), pt(20.0, 20.0))).unwrap();
    let b = scene.insert_item(layer, rect_item(pt(50.0, 0.0), pt(70.0, 20.0))).unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    scene
        .layer_mut(layer)
        .unwrap()
        .subscribe(move |event: &ItemEvent| sink.borrow_mut().push(event.clone()));

    let mut controller = editor(scene);
    controller.activate(ToolKind::Select, None);
    let plain = Modifiers::default();
    let command = Modifiers::control();

    controller.press(pt(10.0, 10.0), plain);
    controller.release(pt(10.0, 10.0), plain);
    assert_eq!(selected(&controller), vec![a]);

    controller.press(pt(10.0, 10.0), plain);
    controller.release(pt(10.0, 10.0), plain);
    assert!(selected(&controller).is_empty());

    controller.press(pt(10.0, 10.0), plain);
    controller.release(pt(10.0, 10.0), plain);
    controller.press(pt(60.0, 10.0), command);
    controller.release(pt(60.0, 10.0), command);
    assert_eq!(selected(&controller), vec![a, b]);

    // a plain click clears the others first, then toggles the clicked item
    controller.press(pt(60.0, 10.0), plain);
    controller.release(pt(60.0, 10.0), plain);
    assert!(selected(&controller).is_empty());

    controller.press(pt(60.0, 10.0), plain);
    controller.release(pt(60.0, 10.0), plain);
    assert_eq!(selected(&controller), vec![b]);

    controller.handle(&ToolEvent::KeyUp(Key::Escape));
    assert!(selected(&controller).is_empty());

    let recorded = events.borrow();
    assert!(recorded.contains(&ItemEvent::Selected(a)));
    assert!(recorded.contains(&ItemEvent::Deselected(a)));
    assert!(recorded.contains(&ItemEvent::Deselected(b)));
}

#[test]
fn rubber_band_replaces_selection_unless_command_held() {
    let mut scene = Scene::new();
    let layer = scene.add_layer(None);
    let a = scene.insert_item(layer, rect_item(pt(0.0, 0.0), pt(20.0, 20.0))).unwrap();
    let b = scene.insert_item(layer, rect_item(pt(50.0, 0.0), pt(70.0, 20.0))).unwrap();
    let mut controller = editor(scene);
    controller.activate(ToolKind::Select, None);

    controller.press(pt(10.0, 10.0), Modifiers::default());
    controller.release(pt(10.0, 10.0), Modifiers::default());

    controller.press(pt(45.0, -5.0), Modifiers::default());
    controller.move_to(pt(80.0, 30.0), Modifiers::default());
    assert!(controller.feedback().selection_rect.is_some());
    controller.release(pt(80.0, 30.0), Modifiers::default());
    assert!(controller.feedback().selection_rect.is_none());
    assert_eq!(selected(&controller), vec![b]);

    controller.press(pt(-5.0, -5.0), Modifiers::control());
    controller.move_to(pt(25.0, 25.0), Modifiers::control());
    controller.release(pt(25.0, 25.0), Modifiers::control());
    assert_eq!(selected(&controller), vec![a, b]);
}

#[test]
fn constrained_rectangle_drag_locks_to_square() {
    let mut scene = Scene::new();
    let layer = scene.add_layer(None);
    let mut controller = editor(scene);
    controller.activate(ToolKind::Rectangle, Some(ToolTarget::New { layer }));

    controller.press(pt(0.0, 0.0), Modifiers::control());
    controller.move_to(pt(10.0, 20.0), Modifiers::control());
    controller.release(pt(10.0, 20.0), Modifiers::control());

    let id = controller.rectangle().item().unwrap();
    let Geometry::Rectangle(rect) = controller.scene().item(id).unwrap().geometry() else {
        panic!("rectangle expected");
    };
    let far = rect.corners()[2];
    assert_abs_diff_eq!(far.x, 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(far.y, 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(rect.area(), 100.0, epsilon = 1e-9);

    controller.deactivate(true);
    assert!(controller.scene().item(id).is_some());
    assert!(controller.feedback().crosshair.is_none());
}

#[test]
fn cancelled_rectangle_creation_leaves_no_item() {
    let mut scene = Scene::new();
    let layer = scene.add_layer(None);
    let mut controller = editor(scene);
    controller.activate(ToolKind::Rectangle, Some(ToolTarget::New { layer }));
    controller.press(pt(0.0, 0.0), Modifiers::default());
    controller.move_to(pt(10.0, 5.0), Modifiers::default());
    controller.deactivate(false);
    assert_eq!(controller.scene().items().count(), 0);
}

#[test]
fn brush_respects_bounding_element() {
    let mut scene = Scene::new();
    let layer = scene.add_layer(None);
    let mut bound = ItemData::new(Geometry::Region(Region::from_ring(polygon(&[
        pt(0.0, 0.0),
        pt(10.0, 0.0),
        pt(10.0, 10.0),
        pt(0.0, 10.0),
    ]))));
    bound.bounding = true;
    scene.insert_item(layer, bound).unwrap();
    let target = scene
        .insert_item(layer, ItemData::new(Geometry::Region(Region::empty())))
        .unwrap();

    let mut controller = editor(scene);
    controller.brush_mut().set_radius_px(3.0);
    controller.activate(ToolKind::Brush, Some(ToolTarget::Item(target)));
    controller.press(pt(5.0, 5.0), Modifiers::default());
    controller.move_to(pt(20.0, 5.0), Modifiers::default());
    controller.release(pt(20.0, 5.0), Modifiers::default());

    let Geometry::Region(region) = controller.scene().item(target).unwrap().geometry() else {
        panic!("region expected");
    };
    assert!(region.contains_point(pt(8.0, 5.0)));
    assert!(!region.contains_point(pt(15.0, 5.0)));
    let bounds = region.bounds().unwrap();
    assert!(bounds.max.x <= 10.0 + 1e-6);

    controller.handle(&ToolEvent::KeyDown(Key::Char('e')));
    controller.press(pt(5.0, 5.0), Modifiers::default());
    controller.release(pt(5.0, 5.0), Modifiers::default());
    let Geometry::Region(region) = controller.scene().item(target).unwrap().geometry() else {
        panic!("region expected");
    };
    assert!(!region.contains_point(pt(5.0, 5.0)));
    assert!(region.contains_point(pt(9.0, 5.0)));
}
