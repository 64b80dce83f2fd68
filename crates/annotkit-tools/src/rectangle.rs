//! Rectangle tool: create rectangles aligned with the view, then resize or move them.

use annotkit_core::{DVec2, ViewMapper};
use annotkit_geometry::Rectangle;
use annotkit_geometry::rectangle::square_corner;
use annotkit_model::{Geometry, ItemData, ItemId};
use tracing::{debug, warn};

use crate::effect::{Crosshair, CursorHint, Feedback, ToolEffect};
use crate::event::{Pointer, ToolEvent};
use crate::fsm::{Fsm, Tool, ToolContext, ToolTarget};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RectangleFsmState {
    #[default]
    Idle,
    Creating,
    CornerDrag,
    FillDrag,
    Modifying,
}

#[derive(Debug, Clone, Default)]
pub struct RectangleToolData {
    target: Option<ToolTarget>,
    item: Option<ItemId>,
    created: bool,
    create_pending: bool,
    /// The rectangle got past its initial degenerate state at least once.
    committed: bool,
    anchor: DVec2,
    rotation: f64,
    current: Option<Rectangle>,
    drag_corner: usize,
    /// Geometry when the current corner or fill drag began.
    drag_start: Option<Rectangle>,
    translated: DVec2,
}

impl RectangleToolData {
    fn rectangle(&self, ctx: &ToolContext) -> Option<Rectangle> {
        let id = self.item?;
        match ctx.scene.item(id)?.geometry() {
            Geometry::Rectangle(rect) => Some(rect.clone()),
            other => {
                warn!(item = %id, kind = %other.kind(), "rectangle tool target is not a rectangle");
                None
            }
        }
    }

    fn set_geometry(&mut self, rect: Rectangle, responses: &mut Vec<ToolEffect>) {
        if let Some(item) = self.item {
            responses.push(ToolEffect::SetGeometry {
                item,
                geometry: Geometry::Rectangle(rect.clone()),
            });
        }
        self.current = Some(rect);
    }
}

/// Guides through `point` running across the whole viewport, in model coordinates.
///
/// The pointer is taken to view space, the four viewport edges are crossed at its screen
/// position and the crossings are mapped back, so the guides follow the view's rotation.
#[must_use]
pub fn crosshair(view: &dyn ViewMapper, point: DVec2) -> Crosshair {
    let v = view.model_to_view(point);
    let size = view.view_size();
    Crosshair {
        horizontal: [
            view.view_to_model(DVec2::new(0.0, v.y)),
            view.view_to_model(DVec2::new(size.x, v.y)),
        ],
        vertical: [
            view.view_to_model(DVec2::new(v.x, 0.0)),
            view.view_to_model(DVec2::new(v.x, size.y)),
        ],
    }
}

fn crosshair_feedback(ctx: &ToolContext, pointer: &Pointer, responses: &mut Vec<ToolEffect>) {
    responses.push(ToolEffect::Feedback(Feedback::Crosshair(Some(crosshair(
        ctx.view,
        pointer.point,
    )))));
}

impl Fsm for RectangleFsmState {
    type ToolData = RectangleToolData;
    type ToolOptions = ();

    fn transition(
        self,
        event: &ToolEvent,
        data: &mut Self::ToolData,
        ctx: &ToolContext,
        _options: &Self::ToolOptions,
        responses: &mut Vec<ToolEffect>,
    ) -> Self {
        let tolerance = ctx.tolerance().model();
        match (self, event) {
            (RectangleFsmState::Idle, ToolEvent::PointerDown(pointer)) => {
                let Some(ToolTarget::New { layer }) = data.target else {
                    return RectangleFsmState::Idle;
                };
                crosshair_feedback(ctx, pointer, responses);
                data.anchor = pointer.point;
                data.rotation = -ctx.view.rotation();
                let rect = Rectangle::spanning(data.anchor, data.anchor, data.rotation);
                data.current = Some(rect.clone());
                data.create_pending = true;
                responses.push(ToolEffect::CreateItem {
                    layer,
                    data: ItemData::new(Geometry::Rectangle(rect)),
                });
                RectangleFsmState::Creating
            }
            (RectangleFsmState::Creating, ToolEvent::PointerDrag(pointer)) => {
                crosshair_feedback(ctx, pointer, responses);
                let opposite = if pointer.modifiers.command() {
                    square_corner(data.anchor, pointer.point, data.rotation)
                } else {
                    pointer.point
                };
                let rect = Rectangle::spanning(data.anchor, opposite, data.rotation);
                data.set_geometry(rect, responses);
                RectangleFsmState::Creating
            }
            (RectangleFsmState::Creating, ToolEvent::PointerUp(_)) => {
                if data.current.as_ref().is_none_or(Rectangle::is_degenerate) {
                    debug!("discarding zero-area rectangle");
                    if let Some(item) = data.item.take() {
                        responses.push(ToolEffect::RemoveItem(item));
                    }
                    data.created = false;
                    data.current = None;
                    return RectangleFsmState::Idle;
                }
                data.committed = true;
                RectangleFsmState::Modifying
            }
            (RectangleFsmState::Modifying, ToolEvent::PointerDown(pointer)) => {
                let Some(rect) = data.rectangle(ctx) else {
                    return RectangleFsmState::Modifying;
                };
                data.translated = DVec2::ZERO;
                if let Some(corner) = rect.corner_near(pointer.point, tolerance) {
                    data.drag_corner = corner;
                    data.drag_start = Some(rect);
                    RectangleFsmState::CornerDrag
                } else if rect.contains_point(pointer.point) {
                    data.drag_start = Some(rect);
                    RectangleFsmState::FillDrag
                } else {
                    RectangleFsmState::Modifying
                }
            }
            (RectangleFsmState::CornerDrag, ToolEvent::PointerDrag(pointer)) => {
                crosshair_feedback(ctx, pointer, responses);
                if let Some(start) = &data.drag_start {
                    let constrain = pointer.modifiers.command();
                    let rect = start.drag_corner(data.drag_corner, pointer.point, constrain);
                    data.set_geometry(rect, responses);
                }
                RectangleFsmState::CornerDrag
            }
            (RectangleFsmState::FillDrag, ToolEvent::PointerDrag(pointer)) => {
                crosshair_feedback(ctx, pointer, responses);
                if let Some(item) = data.item {
                    data.translated += pointer.delta;
                    responses.push(ToolEffect::Translate {
                        item,
                        delta: pointer.delta,
                    });
                }
                RectangleFsmState::FillDrag
            }
            (
                RectangleFsmState::CornerDrag | RectangleFsmState::FillDrag,
                ToolEvent::PointerUp(_),
            ) => {
                data.drag_start = None;
                data.translated = DVec2::ZERO;
                RectangleFsmState::Modifying
            }
            (RectangleFsmState::Modifying, ToolEvent::PointerMove(pointer)) => {
                crosshair_feedback(ctx, pointer, responses);
                let hint = match data.rectangle(ctx) {
                    Some(rect) if rect.corner_near(pointer.point, tolerance).is_some() => {
                        CursorHint::Resize
                    }
                    Some(rect) if rect.contains_point(pointer.point) => CursorHint::Move,
                    _ => CursorHint::Default,
                };
                responses.push(ToolEffect::Feedback(Feedback::Cursor(hint)));
                RectangleFsmState::Modifying
            }
            (state, ToolEvent::PointerMove(pointer)) => {
                crosshair_feedback(ctx, pointer, responses);
                state
            }
            (state, _) => state,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RectangleTool {
    fsm_state: RectangleFsmState,
    data: RectangleToolData,
}

impl RectangleTool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> RectangleFsmState {
        self.fsm_state
    }

    #[must_use]
    pub fn item(&self) -> Option<ItemId> {
        self.data.item
    }
}

impl Tool for RectangleTool {
    fn name(&self) -> &'static str {
        "rectangle"
    }

    fn activate(
        &mut self,
        target: Option<ToolTarget>,
        ctx: &ToolContext,
        _responses: &mut Vec<ToolEffect>,
    ) {
        self.data = RectangleToolData {
            target,
            ..RectangleToolData::default()
        };
        self.fsm_state = match target {
            Some(ToolTarget::Item(id)) => {
                self.data.item = Some(id);
                self.data.current = self.data.rectangle(ctx);
                if self.data.current.is_some() {
                    self.data.committed = true;
                    RectangleFsmState::Modifying
                } else {
                    self.data.item = None;
                    RectangleFsmState::Idle
                }
            }
            _ => RectangleFsmState::Idle,
        };
        debug!(state = ?self.fsm_state, "rectangle tool activated");
    }

    fn deactivate(&mut self, finished: bool, _ctx: &ToolContext, responses: &mut Vec<ToolEffect>) {
        if let Some(item) = self.data.item {
            let degenerate = self.data.current.as_ref().is_none_or(Rectangle::is_degenerate);
            if self.data.created && (!self.data.committed || (finished && degenerate)) {
                responses.push(ToolEffect::RemoveItem(item));
            } else if !finished {
                match self.fsm_state {
                    RectangleFsmState::CornerDrag => {
                        if let Some(start) = self.data.drag_start.take() {
                            responses.push(ToolEffect::SetGeometry {
                                item,
                                geometry: Geometry::Rectangle(start),
                            });
                        }
                    }
                    RectangleFsmState::FillDrag if self.data.translated != DVec2::ZERO => {
                        responses.push(ToolEffect::Translate {
                            item,
                            delta: -self.data.translated,
                        });
                    }
                    _ => {}
                }
            }
        }
        responses.push(ToolEffect::Feedback(Feedback::Crosshair(None)));
        responses.push(ToolEffect::Feedback(Feedback::Cursor(CursorHint::Default)));
        self.fsm_state = RectangleFsmState::Idle;
        self.data = RectangleToolData::default();
    }

    fn handle(&mut self, event: &ToolEvent, ctx: &ToolContext, responses: &mut Vec<ToolEffect>) {
        let next = self.fsm_state.transition(event, &mut self.data, ctx, &(), responses);
        if next != self.fsm_state {
            debug!(from = ?self.fsm_state, to = ?next, "rectangle tool");
        }
        self.fsm_state = next;
    }

    fn on_item_created(&mut self, id: ItemId) {
        if self.data.create_pending {
            self.data.create_pending = false;
            self.data.created = true;
            self.data.item = Some(id);
        }
    }
}
