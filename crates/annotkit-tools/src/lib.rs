//! Pointer-driven editing tools.
//!
//! Each tool is a finite state machine whose transitions turn input events into [`ToolEffect`]s
//! without touching the scene. [`ToolController`] owns the scene, keeps one tool active and
//! applies the effects in order.

pub mod brush;
pub mod config;
pub mod controller;
pub mod effect;
pub mod event;
pub mod fsm;
pub mod rectangle;
pub mod select;

pub use brush::{BrushFsmState, BrushTool, EraseMode};
pub use config::{BrushConfig, ConfigError, EditorConfig, GeometryConfig, SelectConfig};
pub use controller::{FeedbackState, ToolController, ToolKind};
pub use effect::{BrushCursor, Crosshair, CursorHint, Feedback, ToolEffect};
pub use event::{Key, Modifiers, Pointer, ToolEvent};
pub use fsm::{Fsm, Tool, ToolContext, ToolTarget};
pub use rectangle::{RectangleFsmState, RectangleTool, crosshair};
pub use select::{SelectFsmState, SelectTool};
