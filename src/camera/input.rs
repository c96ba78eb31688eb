/// Pointer buttons the controllers react to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Keys with a meaning somewhere in the simulation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    Tab,
    G,
    R,
    C,
    N,
    P,
    I,
    Digit(u8),
    BracketLeft,
    BracketRight,
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Discrete input events, independent of the windowing library.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    PointerMoved { x: f32, y: f32 },
    Button { button: PointerButton, pressed: bool },
    /// Positive scrolls zoom in, one unit per notch.
    Scroll { amount: f32 },
    Key { key: Key, pressed: bool },
}
