use annotkit_core::{Bounds, DVec2};
use annotkit_geometry::{CompositeMode, Stroke};
use annotkit_model::{Geometry, ItemData, ItemId, LayerId};

/// Mutation or feedback requested by a tool transition. The controller applies effects in
/// order once the transition returns.
#[derive(Debug, Clone)]
pub enum ToolEffect {
    /// Insert a new item; the controller reports its id back through `Tool::on_item_created`.
    CreateItem { layer: LayerId, data: ItemData },
    SetGeometry { item: ItemId, geometry: Geometry },
    Translate { item: ItemId, delta: DVec2 },
    Paint {
        item: ItemId,
        stroke: Stroke,
        mode: CompositeMode,
    },
    RemoveItem(ItemId),
    /// Flip one item's selection, first deselecting everything else when `exclusive`.
    ToggleSelection { item: ItemId, exclusive: bool },
    /// Select `items`, first deselecting everything else unless `keep_existing`.
    SelectArea {
        items: Vec<ItemId>,
        keep_existing: bool,
    },
    DeselectAll,
    Hover { item: ItemId, entered: bool },
    Feedback(Feedback),
}

/// Transient overlay state for the host to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    Cursor(CursorHint),
    Crosshair(Option<Crosshair>),
    SelectionRect(Option<Bounds>),
    BrushCursor(Option<BrushCursor>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorHint {
    #[default]
    Default,
    Resize,
    Move,
}

/// Alignment guides through the pointer, running edge to edge across the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crosshair {
    pub horizontal: [DVec2; 2],
    pub vertical: [DVec2; 2],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushCursor {
    pub center: DVec2,
    /// Model units.
    pub radius: f64,
    pub erase: bool,
}
