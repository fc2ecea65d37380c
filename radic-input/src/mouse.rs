//! Pointer events and their remote flag encoding.

use radic_session::PointerFlags;
use winit::event::{MouseButton, MouseScrollDelta};

/// Rotation units per wheel notch.
pub const WHEEL_DELTA: i32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

impl PointerButton {
    pub fn flag(self) -> PointerFlags {
        match self {
            Self::Left => PointerFlags::BUTTON1,
            Self::Right => PointerFlags::BUTTON2,
            Self::Middle => PointerFlags::BUTTON3,
        }
    }
}

/// A local pointer event, positioned separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Move,
    Press(PointerButton),
    Release(PointerButton),
    /// Signed rotation; positive is away from the user (or to the right).
    Wheel { horizontal: bool, delta: i32 },
}

/// Remote flags for `kind`; `None` for events that carry nothing.
pub fn pointer_flags(kind: PointerEventKind) -> Option<PointerFlags> {
    match kind {
        PointerEventKind::Move => Some(PointerFlags::MOVE),
        PointerEventKind::Press(button) => Some(PointerFlags::DOWN | button.flag()),
        PointerEventKind::Release(button) => Some(button.flag()),
        PointerEventKind::Wheel { delta: 0, .. } => None,
        PointerEventKind::Wheel { horizontal, delta } => {
            Some(PointerFlags::wheel(horizontal, delta))
        }
    }
}

pub fn map_mouse_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Left),
        MouseButton::Right => Some(PointerButton::Right),
        MouseButton::Middle => Some(PointerButton::Middle),
        MouseButton::Other(_) => None,
    }
}

/// Wheel event for a winit scroll delta. Line deltas are converted to
/// rotation units. A vertical rotation wins over a horizontal one; `None`
/// when neither axis moved.
pub fn wheel_event(delta: MouseScrollDelta) -> Option<PointerEventKind> {
    let (dx, dy) = match delta {
        MouseScrollDelta::LineDelta(x, y) => (
            (x * WHEEL_DELTA as f32).round() as i32,
            (y * WHEEL_DELTA as f32).round() as i32,
        ),
        MouseScrollDelta::PixelDelta(pos) => (pos.x.round() as i32, pos.y.round() as i32),
    };

    if dy != 0 {
        Some(PointerEventKind::Wheel {
            horizontal: false,
            delta: dy,
        })
    } else if dx != 0 {
        Some(PointerEventKind::Wheel {
            horizontal: true,
            delta: dx,
        })
    } else {
        None
    }
}
