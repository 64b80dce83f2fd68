use annotkit_core::DVec2;

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    /// Control or meta: multi-select and axis constraint.
    #[must_use]
    pub fn command(&self) -> bool {
        self.control || self.meta
    }

    #[must_use]
    pub fn control() -> Self {
        Self {
            control: true,
            ..Self::default()
        }
    }
}

/// Pointer state in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub point: DVec2,
    /// Where the current press started.
    pub down_point: DVec2,
    /// Movement since the previous pointer event.
    pub delta: DVec2,
    pub modifiers: Modifiers,
}

impl Pointer {
    #[must_use]
    pub fn at(point: DVec2) -> Self {
        Self {
            point,
            down_point: point,
            delta: DVec2::ZERO,
            modifiers: Modifiers::default(),
        }
    }

    #[must_use]
    pub fn down_at(mut self, down_point: DVec2) -> Self {
        self.down_point = down_point;
        self
    }

    #[must_use]
    pub fn moved_by(mut self, delta: DVec2) -> Self {
        self.delta = delta;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Char(char),
}

/// Input delivered to the active tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolEvent {
    PointerDown(Pointer),
    PointerDrag(Pointer),
    PointerMove(Pointer),
    PointerUp(Pointer),
    /// Wheel notches; negative `delta_y` scrolls up.
    Wheel { delta_x: f64, delta_y: f64 },
    KeyDown(Key),
    KeyUp(Key),
}
