//! Selection by click, rubber band and keyboard, plus hover tracking.

use annotkit_core::{Bounds, DVec2};
use annotkit_model::{ItemId, area_query, hit_test};
use tracing::debug;

use crate::config::SelectConfig;
use crate::effect::{Feedback, ToolEffect};
use crate::event::{Key, Pointer, ToolEvent};
use crate::fsm::{Fsm, Tool, ToolContext, ToolTarget};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectFsmState {
    #[default]
    Ready,
    Dragging,
}

#[derive(Debug, Clone, Default)]
pub struct SelectToolData {
    hovered: Option<ItemId>,
}

impl SelectToolData {
    fn hover(&mut self, ctx: &ToolContext, point: DVec2, responses: &mut Vec<ToolEffect>) {
        let hit = hit_test(ctx.scene, point, &ctx.hit_options()).map(|hit| hit.item);
        if hit == self.hovered {
            return;
        }
        if let Some(item) = self.hovered.filter(|id| ctx.scene.item(*id).is_some()) {
            responses.push(ToolEffect::Hover {
                item,
                entered: false,
            });
        }
        if let Some(item) = hit {
            responses.push(ToolEffect::Hover {
                item,
                entered: true,
            });
        }
        self.hovered = hit;
    }
}

fn release(
    pointer: &Pointer,
    ctx: &ToolContext,
    options: &SelectConfig,
    responses: &mut Vec<ToolEffect>,
) {
    let command = pointer.modifiers.command();
    if pointer.point == pointer.down_point {
        if let Some(hit) = hit_test(ctx.scene, pointer.point, &ctx.hit_options()) {
            debug!(item = %hit.item, kind = ?hit.kind, additive = command, "select click");
            responses.push(ToolEffect::ToggleSelection {
                item: hit.item,
                exclusive: !command,
            });
        }
    } else {
        let area = Bounds::from_corners(pointer.down_point, pointer.point);
        let items = area_query(ctx.scene, &area, options.fully_contained);
        debug!(count = items.len(), keep_existing = command, "select area");
        responses.push(ToolEffect::SelectArea {
            items,
            keep_existing: command,
        });
    }
}

impl Fsm for SelectFsmState {
    type ToolData = SelectToolData;
    type ToolOptions = SelectConfig;

    fn transition(
        self,
        event: &ToolEvent,
        data: &mut Self::ToolData,
        ctx: &ToolContext,
        options: &Self::ToolOptions,
        responses: &mut Vec<ToolEffect>,
    ) -> Self {
        match (self, event) {
            (_, ToolEvent::PointerDown(_)) => SelectFsmState::Dragging,
            (SelectFsmState::Dragging, ToolEvent::PointerDrag(pointer)) => {
                let rect = Bounds::from_corners(pointer.down_point, pointer.point);
                responses.push(ToolEffect::Feedback(Feedback::SelectionRect(Some(rect))));
                SelectFsmState::Dragging
            }
            (SelectFsmState::Dragging, ToolEvent::PointerUp(pointer)) => {
                responses.push(ToolEffect::Feedback(Feedback::SelectionRect(None)));
                release(pointer, ctx, options, responses);
                SelectFsmState::Ready
            }
            (state, ToolEvent::PointerMove(pointer)) => {
                data.hover(ctx, pointer.point, responses);
                state
            }
            (state, ToolEvent::KeyUp(Key::Escape)) => {
                responses.push(ToolEffect::DeselectAll);
                state
            }
            (state, _) => state,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectTool {
    fsm_state: SelectFsmState,
    data: SelectToolData,
    options: SelectConfig,
}

impl SelectTool {
    #[must_use]
    pub fn new(options: SelectConfig) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn state(&self) -> SelectFsmState {
        self.fsm_state
    }
}

impl Tool for SelectTool {
    fn name(&self) -> &'static str {
        "select"
    }

    fn activate(
        &mut self,
        _target: Option<ToolTarget>,
        _ctx: &ToolContext,
        _responses: &mut Vec<ToolEffect>,
    ) {
        self.fsm_state = SelectFsmState::Ready;
        self.data = SelectToolData::default();
    }

    fn deactivate(&mut self, _finished: bool, ctx: &ToolContext, responses: &mut Vec<ToolEffect>) {
        if let Some(item) = self.data.hovered.take().filter(|id| ctx.scene.item(*id).is_some()) {
            responses.push(ToolEffect::Hover {
                item,
                entered: false,
            });
        }
        responses.push(ToolEffect::Feedback(Feedback::SelectionRect(None)));
        self.fsm_state = SelectFsmState::Ready;
    }

    fn handle(&mut self, event: &ToolEvent, ctx: &ToolContext, responses: &mut Vec<ToolEffect>) {
        let state = self.fsm_state;
        self.fsm_state = state.transition(event, &mut self.data, ctx, &self.options, responses);
    }
}
