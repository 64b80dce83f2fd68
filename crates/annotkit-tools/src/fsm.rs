use annotkit_core::{Tolerance, ViewMapper};
use annotkit_model::{HitOptions, ItemId, LayerId, Scene};

use crate::config::EditorConfig;
use crate::effect::ToolEffect;
use crate::event::ToolEvent;

/// Read-only view of the world a transition may consult.
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    pub scene: &'a Scene,
    pub view: &'a dyn ViewMapper,
    pub config: &'a EditorConfig,
}

impl ToolContext<'_> {
    /// Configured hit tolerance at the current zoom.
    #[must_use]
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::for_view(self.config.hit_tolerance_px, self.view)
    }

    /// Hit options for a full point query: vertices, strokes and fills.
    #[must_use]
    pub fn hit_options(&self) -> HitOptions {
        HitOptions {
            arc_step_deg: self.config.geometry.arc_step_deg,
            ..HitOptions::new(self.tolerance())
        }
    }

    /// Screen pixels to model units at the current zoom.
    #[must_use]
    pub fn px_to_model(&self, px: f64) -> f64 {
        Tolerance::for_view(px, self.view).model()
    }
}

/// A tool's finite state machine.
///
/// `transition` is the whole behaviour: given the current state and one event it returns the next
/// state and pushes the effects the event causes. It never mutates the scene, so it can be driven
/// directly in tests.
pub trait Fsm {
    /// Values kept across transitions, such as the drag anchor.
    type ToolData;
    /// Values the user configures.
    type ToolOptions;

    #[must_use]
    fn transition(
        self,
        event: &ToolEvent,
        data: &mut Self::ToolData,
        ctx: &ToolContext,
        options: &Self::ToolOptions,
        responses: &mut Vec<ToolEffect>,
    ) -> Self;
}

/// What a tool edits: a new item in a layer, or an existing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolTarget {
    New { layer: LayerId },
    Item(ItemId),
}

/// Object-safe surface the controller drives.
pub trait Tool {
    fn name(&self) -> &'static str;

    fn activate(
        &mut self,
        target: Option<ToolTarget>,
        ctx: &ToolContext,
        responses: &mut Vec<ToolEffect>,
    );

    /// `finished = false` cancels: anything never committed past a degenerate state is removed.
    fn deactivate(&mut self, finished: bool, ctx: &ToolContext, responses: &mut Vec<ToolEffect>);

    fn handle(&mut self, event: &ToolEvent, ctx: &ToolContext, responses: &mut Vec<ToolEffect>);

    /// Called after a `CreateItem` effect from this tool has been applied.
    fn on_item_created(&mut self, _id: ItemId) {}
}
