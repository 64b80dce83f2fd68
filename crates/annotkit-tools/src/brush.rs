//! Freehand brush: paints strokes into a region item, or erases them out of it.

use annotkit_core::DVec2;
use annotkit_geometry::{CompositeMode, Region, Stroke};
use annotkit_model::{Geometry, ItemData, ItemId};
use tracing::{debug, trace, warn};

use crate::config::BrushConfig;
use crate::effect::{BrushCursor, Feedback, ToolEffect};
use crate::event::{Key, ToolEvent};
use crate::fsm::{Fsm, Tool, ToolContext, ToolTarget};

/// Key that toggles erasing while held.
pub const ERASE_KEY: char = 'e';

/// Erase flag with a momentary state: `Held` lasts only while the erase key is down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EraseMode {
    #[default]
    Off,
    On,
    Held,
}

impl EraseMode {
    #[must_use]
    pub fn is_erasing(self) -> bool {
        !matches!(self, EraseMode::Off)
    }

    #[must_use]
    pub fn key_down(self) -> Self {
        match self {
            EraseMode::Off => EraseMode::Held,
            other => other,
        }
    }

    #[must_use]
    pub fn key_up(self) -> Self {
        match self {
            EraseMode::Held => EraseMode::Off,
            other => other,
        }
    }

    #[must_use]
    pub fn composite_mode(self) -> CompositeMode {
        if self.is_erasing() {
            CompositeMode::Erase
        } else {
            CompositeMode::Draw
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrushFsmState {
    #[default]
    Idle,
    Painting,
}

#[derive(Debug, Clone, Default)]
pub struct BrushToolData {
    target: Option<ToolTarget>,
    item: Option<ItemId>,
    /// The item was created by this activation.
    created: bool,
    create_pending: bool,
    stroke: Option<Stroke>,
    /// Display pixels; the model radius follows the zoom at stroke start.
    radius_px: f64,
    erase: EraseMode,
    cursor: Option<DVec2>,
}

impl BrushToolData {
    fn cursor_feedback(&self, ctx: &ToolContext) -> ToolEffect {
        ToolEffect::Feedback(Feedback::BrushCursor(self.cursor.map(|center| BrushCursor {
            center,
            radius: ctx.px_to_model(self.radius_px),
            erase: self.erase.is_erasing(),
        })))
    }

    fn paint(&mut self, responses: &mut Vec<ToolEffect>) {
        let Some(stroke) = self.stroke.take() else {
            return;
        };
        match self.item {
            Some(item) => {
                debug!(
                    %item,
                    points = stroke.points().len(),
                    erase = self.erase.is_erasing(),
                    "brush stroke"
                );
                responses.push(ToolEffect::Paint {
                    item,
                    stroke,
                    mode: self.erase.composite_mode(),
                });
            }
            None => warn!("brush stroke dropped: no target item"),
        }
    }
}

impl Fsm for BrushFsmState {
    type ToolData = BrushToolData;
    type ToolOptions = BrushConfig;

    fn transition(
        self,
        event: &ToolEvent,
        data: &mut Self::ToolData,
        ctx: &ToolContext,
        options: &Self::ToolOptions,
        responses: &mut Vec<ToolEffect>,
    ) -> Self {
        match (self, event) {
            (BrushFsmState::Idle, ToolEvent::PointerDown(pointer)) => {
                data.cursor = Some(pointer.point);
                if data.item.is_none() && !data.create_pending {
                    if let Some(ToolTarget::New { layer }) = data.target {
                        data.create_pending = true;
                        responses.push(ToolEffect::CreateItem {
                            layer,
                            data: ItemData::new(Geometry::Region(Region::empty())),
                        });
                    }
                }
                data.stroke = Some(Stroke::new(pointer.point, ctx.px_to_model(data.radius_px)));
                responses.push(data.cursor_feedback(ctx));
                BrushFsmState::Painting
            }
            (
                BrushFsmState::Painting,
                ToolEvent::PointerDrag(pointer) | ToolEvent::PointerMove(pointer),
            ) => {
                data.cursor = Some(pointer.point);
                if let Some(stroke) = data.stroke.as_mut() {
                    let added = stroke.extend_within_band(
                        pointer.point,
                        ctx.px_to_model(options.min_distance_px),
                        ctx.px_to_model(options.max_distance_px),
                    );
                    trace!(added, "brush sample");
                }
                responses.push(data.cursor_feedback(ctx));
                BrushFsmState::Painting
            }
            (BrushFsmState::Painting, ToolEvent::PointerUp(pointer)) => {
                data.cursor = Some(pointer.point);
                data.paint(responses);
                BrushFsmState::Idle
            }
            (state, ToolEvent::PointerMove(pointer)) => {
                data.cursor = Some(pointer.point);
                responses.push(data.cursor_feedback(ctx));
                state
            }
            (state, ToolEvent::Wheel { delta_y, .. }) => {
                if *delta_y == 0.0 {
                    return state;
                }
                let step = if *delta_y < 0.0 { 1.0 } else { -1.0 };
                data.radius_px = options.clamp_radius(data.radius_px + step);
                responses.push(data.cursor_feedback(ctx));
                state
            }
            (state, ToolEvent::KeyDown(Key::Char(c))) if c.eq_ignore_ascii_case(&ERASE_KEY) => {
                data.erase = data.erase.key_down();
                responses.push(data.cursor_feedback(ctx));
                state
            }
            (state, ToolEvent::KeyUp(Key::Char(c))) if c.eq_ignore_ascii_case(&ERASE_KEY) => {
                data.erase = data.erase.key_up();
                responses.push(data.cursor_feedback(ctx));
                state
            }
            (state, _) => state,
        }
    }
}

/// Brush tool: draws into, or erases from, one region item.
#[derive(Debug, Clone)]
pub struct BrushTool {
    fsm_state: BrushFsmState,
    data: BrushToolData,
    options: BrushConfig,
}

impl BrushTool {
    #[must_use]
    pub fn new(options: BrushConfig) -> Self {
        let data = BrushToolData {
            radius_px: options.default_radius_px,
            ..BrushToolData::default()
        };
        Self {
            fsm_state: BrushFsmState::Idle,
            data,
            options,
        }
    }

    #[must_use]
    pub fn state(&self) -> BrushFsmState {
        self.fsm_state
    }

    #[must_use]
    pub fn radius_px(&self) -> f64 {
        self.data.radius_px
    }

    /// Direct radius input, clamped to the configured range.
    pub fn set_radius_px(&mut self, radius_px: f64) {
        if radius_px.is_finite() {
            self.data.radius_px = self.options.clamp_radius(radius_px);
        }
    }

    #[must_use]
    pub fn erase_mode(&self) -> EraseMode {
        self.data.erase
    }

    /// Latch erasing on or off, overriding a held key.
    pub fn set_erasing(&mut self, erasing: bool) {
        self.data.erase = if erasing { EraseMode::On } else { EraseMode::Off };
    }

    #[must_use]
    pub fn item(&self) -> Option<ItemId> {
        self.data.item
    }
}

impl Tool for BrushTool {
    fn name(&self) -> &'static str {
        "brush"
    }

    fn activate(
        &mut self,
        target: Option<ToolTarget>,
        _ctx: &ToolContext,
        _responses: &mut Vec<ToolEffect>,
    ) {
        self.fsm_state = BrushFsmState::Idle;
        self.data = BrushToolData {
            target,
            item: match target {
                Some(ToolTarget::Item(id)) => Some(id),
                _ => None,
            },
            radius_px: self.data.radius_px,
            erase: self.data.erase,
            ..BrushToolData::default()
        };
    }

    fn deactivate(&mut self, finished: bool, ctx: &ToolContext, responses: &mut Vec<ToolEffect>) {
        if finished {
            self.data.paint(responses);
        } else {
            self.data.stroke = None;
        }
        if let Some(id) = self.data.item.filter(|_| self.data.created) {
            let empty = matches!(
                ctx.scene.item(id).map(|item| item.geometry()),
                Some(Geometry::Region(region)) if region.is_empty()
            );
            // a pending stroke on finish still has to land first
            let paint_pending =
                finished && responses.iter().any(|e| matches!(e, ToolEffect::Paint { .. }));
            if empty && !paint_pending {
                debug!(item = %id, "removing empty brush item");
                responses.push(ToolEffect::RemoveItem(id));
            }
        }
        self.data.cursor = None;
        responses.push(ToolEffect::Feedback(Feedback::BrushCursor(None)));
        self.fsm_state = BrushFsmState::Idle;
        self.data.target = None;
        self.data.item = None;
        self.data.created = false;
        self.data.create_pending = false;
    }

    fn handle(&mut self, event: &ToolEvent, ctx: &ToolContext, responses: &mut Vec<ToolEffect>) {
        let state = self.fsm_state;
        self.fsm_state = state.transition(event, &mut self.data, ctx, &self.options, responses);
    }

    fn on_item_created(&mut self, id: ItemId) {
        if self.data.create_pending {
            self.data.create_pending = false;
            self.data.created = true;
            self.data.item = Some(id);
        }
    }
}
