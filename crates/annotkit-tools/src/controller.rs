//! Drives one active tool and applies the effects it asks for.

use annotkit_core::{Bounds, DVec2, ViewMapper};
use annotkit_model::{ModelError, Scene, paint_stroke};
use tracing::{debug, trace, warn};

use crate::brush::BrushTool;
use crate::config::EditorConfig;
use crate::effect::{BrushCursor, Crosshair, CursorHint, Feedback, ToolEffect};
use crate::event::{Modifiers, Pointer, ToolEvent};
use crate::fsm::{Tool, ToolContext, ToolTarget};
use crate::rectangle::RectangleTool;
use crate::select::SelectTool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Select,
    Rectangle,
    Brush,
}

/// Latest overlay state reported by the active tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackState {
    pub cursor: CursorHint,
    pub crosshair: Option<Crosshair>,
    pub selection_rect: Option<Bounds>,
    pub brush_cursor: Option<BrushCursor>,
}

impl FeedbackState {
    fn apply(&mut self, feedback: Feedback) {
        match feedback {
            Feedback::Cursor(hint) => self.cursor = hint,
            Feedback::Crosshair(c) => self.crosshair = c,
            Feedback::SelectionRect(r) => self.selection_rect = r,
            Feedback::BrushCursor(b) => self.brush_cursor = b,
        }
    }
}

/// Owns the scene and routes input to at most one active tool.
pub struct ToolController<V: ViewMapper> {
    scene: Scene,
    view: V,
    config: EditorConfig,
    select: SelectTool,
    rectangle: RectangleTool,
    brush: BrushTool,
    active: Option<ToolKind>,
    feedback: FeedbackState,
    down_point: DVec2,
    last_point: DVec2,
    pressed: bool,
}

fn tool_mut<'a>(
    kind: ToolKind,
    select: &'a mut SelectTool,
    rectangle: &'a mut RectangleTool,
    brush: &'a mut BrushTool,
) -> &'a mut dyn Tool {
    match kind {
        ToolKind::Select => select,
        ToolKind::Rectangle => rectangle,
        ToolKind::Brush => brush,
    }
}

impl<V: ViewMapper> ToolController<V> {
    #[must_use]
    pub fn new(scene: Scene, view: V, config: EditorConfig) -> Self {
        Self {
            select: SelectTool::new(config.select.clone()),
            rectangle: RectangleTool::new(),
            brush: BrushTool::new(config.brush.clone()),
            scene,
            view,
            config,
            active: None,
            feedback: FeedbackState::default(),
            down_point: DVec2::ZERO,
            last_point: DVec2::ZERO,
            pressed: false,
        }
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct scene access for host-side edits between events.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[must_use]
    pub fn into_scene(self) -> Scene {
        self.scene
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn feedback(&self) -> &FeedbackState {
        &self.feedback
    }

    #[must_use]
    pub fn active(&self) -> Option<ToolKind> {
        self.active
    }

    #[must_use]
    pub fn brush(&self) -> &BrushTool {
        &self.brush
    }

    /// Brush settings such as radius and latched erase mode.
    pub fn brush_mut(&mut self) -> &mut BrushTool {
        &mut self.brush
    }

    #[must_use]
    pub fn rectangle(&self) -> &RectangleTool {
        &self.rectangle
    }

    /// Switch tools. The previous tool is finished, not cancelled.
    pub fn activate(&mut self, kind: ToolKind, target: Option<ToolTarget>) {
        self.deactivate(true);
        debug!(tool = ?kind, ?target, "activate tool");
        self.active = Some(kind);
        self.dispatch(|tool, ctx, out| tool.activate(target, ctx, out));
    }

    /// Deactivate the active tool; `finished = false` rolls back uncommitted edits.
    pub fn deactivate(&mut self, finished: bool) {
        if self.active.is_none() {
            return;
        }
        self.dispatch(|tool, ctx, out| tool.deactivate(finished, ctx, out));
        debug!(tool = ?self.active, finished, "deactivate tool");
        self.active = None;
        self.pressed = false;
    }

    pub fn handle(&mut self, event: &ToolEvent) {
        trace!(?event, "tool event");
        self.dispatch(|tool, ctx, out| tool.handle(event, ctx, out));
    }

    pub fn press(&mut self, point: DVec2, modifiers: Modifiers) {
        self.down_point = point;
        self.last_point = point;
        self.pressed = true;
        let pointer = Pointer::at(point).with_modifiers(modifiers);
        self.handle(&ToolEvent::PointerDown(pointer));
    }

    /// Pointer motion: a drag while pressed, otherwise a hover move.
    pub fn move_to(&mut self, point: DVec2, modifiers: Modifiers) {
        let pointer = self.track(point, modifiers);
        let event = if self.pressed {
            ToolEvent::PointerDrag(pointer)
        } else {
            ToolEvent::PointerMove(pointer)
        };
        self.handle(&event);
    }

    pub fn release(&mut self, point: DVec2, modifiers: Modifiers) {
        let pointer = self.track(point, modifiers);
        self.pressed = false;
        self.handle(&ToolEvent::PointerUp(pointer));
    }

    fn track(&mut self, point: DVec2, modifiers: Modifiers) -> Pointer {
        let pointer = Pointer::at(point)
            .down_at(if self.pressed { self.down_point } else { point })
            .moved_by(point - self.last_point)
            .with_modifiers(modifiers);
        self.last_point = point;
        pointer
    }

    fn dispatch<F>(&mut self, f: F)
    where
        F: FnOnce(&mut dyn Tool, &ToolContext, &mut Vec<ToolEffect>),
    {
        let Some(kind) = self.active else {
            return;
        };
        let mut effects = Vec::new();
        {
            let ctx = ToolContext {
                scene: &self.scene,
                view: &self.view,
                config: &self.config,
            };
            let tool = tool_mut(kind, &mut self.select, &mut self.rectangle, &mut self.brush);
            f(tool, &ctx, &mut effects);
        }
        for effect in effects {
            if let Err(err) = self.apply(kind, effect) {
                warn!(%err, "tool effect ignored");
            }
        }
    }

    fn apply(&mut self, kind: ToolKind, effect: ToolEffect) -> Result<(), ModelError> {
        match effect {
            ToolEffect::CreateItem { layer, data } => {
                let id = self.scene.insert_item(layer, data)?;
                tool_mut(kind, &mut self.select, &mut self.rectangle, &mut self.brush)
                    .on_item_created(id);
            }
            ToolEffect::SetGeometry { item, geometry } => self.scene.set_geometry(item, geometry)?,
            ToolEffect::Translate { item, delta } => self.scene.translate(item, delta)?,
            ToolEffect::Paint { item, stroke, mode } => {
                paint_stroke(&mut self.scene, item, &stroke, mode)?
            }
            ToolEffect::RemoveItem(item) => {
                self.scene.remove_item(item)?;
            }
            ToolEffect::ToggleSelection { item, exclusive } => {
                if exclusive {
                    for other in self.scene.selected().into_iter().filter(|id| *id != item) {
                        self.scene.deselect(other)?;
                    }
                }
                self.scene.toggle(item)?;
            }
            ToolEffect::SelectArea { items, keep_existing } => {
                if !keep_existing {
                    self.scene.deselect_all();
                }
                for item in items {
                    self.scene.select(item)?;
                }
            }
            ToolEffect::DeselectAll => {
                self.scene.deselect_all();
            }
            ToolEffect::Hover { item, entered } => self.scene.hover(item, entered)?,
            ToolEffect::Feedback(feedback) => self.feedback.apply(feedback),
        }
        Ok(())
    }
}
