//! Key events, transitions and the mapping from winit key codes to remote
//! virtual keys.

use bitflags::bitflags;
use radic_session::VirtualKey;
use std::collections::HashSet;
use tracing::trace;
use winit::event::{ElementState, KeyboardInput, ModifiersState, VirtualKeyCode};

bitflags! {
    /// Modifier keys held while a key event was generated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const CTRL = 1 << 0;
        const SHIFT = 1 << 1;
        const ALT = 1 << 2;
    }
}

impl Modifiers {
    /// Ctrl, alt and shift together mark a viewer shortcut.
    pub const CHORD: Self = Self::CTRL.union(Self::ALT).union(Self::SHIFT);

    pub fn is_chord(self) -> bool {
        self.contains(Self::CHORD)
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        let mut mods = Modifiers::empty();
        mods.set(Modifiers::CTRL, state.ctrl());
        mods.set(Modifiers::SHIFT, state.shift());
        mods.set(Modifiers::ALT, state.alt());
        mods
    }
}

/// A local key event after platform mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: VirtualKey,
    pub pressed: bool,
    pub autorepeat: bool,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn press(key: VirtualKey, modifiers: Modifiers) -> Self {
        Self {
            key,
            pressed: true,
            autorepeat: false,
            modifiers,
        }
    }

    pub fn release(key: VirtualKey, modifiers: Modifiers) -> Self {
        Self {
            key,
            pressed: false,
            autorepeat: false,
            modifiers,
        }
    }

    pub fn repeat(key: VirtualKey, modifiers: Modifiers) -> Self {
        Self {
            key,
            pressed: true,
            autorepeat: true,
            modifiers,
        }
    }

    pub fn transition(&self) -> KeyTransition {
        KeyTransition {
            key: self.key,
            pressed: self.pressed,
            autorepeat: self.autorepeat,
        }
    }
}

/// One key state change as sent to the remote session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTransition {
    pub key: VirtualKey,
    pub pressed: bool,
    pub autorepeat: bool,
}

impl KeyTransition {
    pub fn new(key: VirtualKey, pressed: bool) -> Self {
        Self {
            key,
            pressed,
            autorepeat: false,
        }
    }

    pub fn down(key: VirtualKey) -> Self {
        Self::new(key, true)
    }

    pub fn up(key: VirtualKey) -> Self {
        Self::new(key, false)
    }
}

/// Transitions that must reach the session back to back, in order.
pub type KeyChunk = Vec<KeyTransition>;

/// Map a winit key code to the remote virtual key. Unmapped keys give
/// [`VirtualKey::NONE`].
pub fn map_virtual_keycode(vk: VirtualKeyCode) -> VirtualKey {
    use VirtualKeyCode as VK;
    match vk {
        VK::A => VirtualKey::letter(b'A'),
        VK::B => VirtualKey::letter(b'B'),
        VK::C => VirtualKey::letter(b'C'),
        VK::D => VirtualKey::letter(b'D'),
        VK::E => VirtualKey::letter(b'E'),
        VK::F => VirtualKey::letter(b'F'),
        VK::G => VirtualKey::letter(b'G'),
        VK::H => VirtualKey::letter(b'H'),
        VK::I => VirtualKey::letter(b'I'),
        VK::J => VirtualKey::letter(b'J'),
        VK::K => VirtualKey::letter(b'K'),
        VK::L => VirtualKey::letter(b'L'),
        VK::M => VirtualKey::letter(b'M'),
        VK::N => VirtualKey::letter(b'N'),
        VK::O => VirtualKey::letter(b'O'),
        VK::P => VirtualKey::letter(b'P'),
        VK::Q => VirtualKey::letter(b'Q'),
        VK::R => VirtualKey::letter(b'R'),
        VK::S => VirtualKey::letter(b'S'),
        VK::T => VirtualKey::letter(b'T'),
        VK::U => VirtualKey::letter(b'U'),
        VK::V => VirtualKey::letter(b'V'),
        VK::W => VirtualKey::letter(b'W'),
        VK::X => VirtualKey::letter(b'X'),
        VK::Y => VirtualKey::letter(b'Y'),
        VK::Z => VirtualKey::letter(b'Z'),

        VK::Key0 => VirtualKey::digit(0),
        VK::Key1 => VirtualKey::digit(1),
        VK::Key2 => VirtualKey::digit(2),
        VK::Key3 => VirtualKey::digit(3),
        VK::Key4 => VirtualKey::digit(4),
        VK::Key5 => VirtualKey::digit(5),
        VK::Key6 => VirtualKey::digit(6),
        VK::Key7 => VirtualKey::digit(7),
        VK::Key8 => VirtualKey::digit(8),
        VK::Key9 => VirtualKey::digit(9),

        VK::Space => VirtualKey::SPACE,
        VK::Return => VirtualKey::RETURN,
        VK::Escape => VirtualKey::ESCAPE,
        VK::Back => VirtualKey::BACK,
        VK::Tab => VirtualKey::TAB,
        VK::Delete => VirtualKey::DELETE,
        VK::Insert => VirtualKey::INSERT,
        VK::Home => VirtualKey::HOME,
        VK::End => VirtualKey::END,
        VK::PageUp => VirtualKey::PRIOR,
        VK::PageDown => VirtualKey::NEXT,
        VK::Pause => VirtualKey::PAUSE,
        VK::Capital => VirtualKey::CAPITAL,
        VK::Numlock => VirtualKey::NUMLOCK,

        VK::Left => VirtualKey::LEFT,
        VK::Up => VirtualKey::UP,
        VK::Right => VirtualKey::RIGHT,
        VK::Down => VirtualKey::DOWN,

        VK::F1 => VirtualKey::function(1),
        VK::F2 => VirtualKey::function(2),
        VK::F3 => VirtualKey::function(3),
        VK::F4 => VirtualKey::function(4),
        VK::F5 => VirtualKey::function(5),
        VK::F6 => VirtualKey::function(6),
        VK::F7 => VirtualKey::function(7),
        VK::F8 => VirtualKey::function(8),
        VK::F9 => VirtualKey::function(9),
        VK::F10 => VirtualKey::function(10),
        VK::F11 => VirtualKey::function(11),
        VK::F12 => VirtualKey::function(12),

        VK::LShift => VirtualKey::LSHIFT,
        VK::RShift => VirtualKey::RSHIFT,
        VK::LControl => VirtualKey::LCONTROL,
        VK::RControl => VirtualKey::RCONTROL,
        VK::LAlt => VirtualKey::LMENU,
        VK::RAlt => VirtualKey::RMENU,
        VK::LWin => VirtualKey::LWIN,
        VK::RWin => VirtualKey::RWIN,

        VK::Semicolon => VirtualKey::OEM_1,
        VK::Equals => VirtualKey::OEM_PLUS,
        VK::Comma => VirtualKey::OEM_COMMA,
        VK::Minus => VirtualKey::OEM_MINUS,
        VK::Period => VirtualKey::OEM_PERIOD,
        VK::Slash => VirtualKey::OEM_2,
        VK::Grave => VirtualKey::OEM_3,
        VK::LBracket => VirtualKey::OEM_4,
        VK::Backslash => VirtualKey::OEM_5,
        VK::RBracket => VirtualKey::OEM_6,
        VK::Apostrophe => VirtualKey::OEM_7,

        _ => VirtualKey::NONE,
    }
}

/// Turns winit keyboard input into [`KeyEvent`]s.
///
/// winit does not flag autorepeat, so a press of a key that is already
/// held is reported as a repeat.
#[derive(Debug, Default)]
pub struct KeyMapper {
    held: HashSet<VirtualKey>,
    modifiers: Modifiers,
}

impl KeyMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = state.into();
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Map one keyboard input. Keys without a virtual key code are dropped.
    pub fn process_key(&mut self, input: &KeyboardInput) -> Option<KeyEvent> {
        let key = map_virtual_keycode(input.virtual_keycode?);
        if key.is_none() {
            trace!("Unmapped key {:?}", input.virtual_keycode);
            return None;
        }

        let event = match input.state {
            ElementState::Pressed if !self.held.insert(key) => {
                KeyEvent::repeat(key, self.modifiers)
            }
            ElementState::Pressed => KeyEvent::press(key, self.modifiers),
            ElementState::Released => {
                self.held.remove(&key);
                KeyEvent::release(key, self.modifiers)
            }
        };
        Some(event)
    }

    /// Forget held keys, e.g. after focus loss.
    pub fn reset(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(deprecated)]
    fn input(state: ElementState, vk: VirtualKeyCode) -> KeyboardInput {
        KeyboardInput {
            scancode: 0,
            state,
            virtual_keycode: Some(vk),
            modifiers: ModifiersState::empty(),
        }
    }

    #[test]
    fn test_letters_and_controls() {
        assert_eq!(map_virtual_keycode(VirtualKeyCode::A), VirtualKey(0x41));
        assert_eq!(map_virtual_keycode(VirtualKeyCode::Return), VirtualKey::RETURN);
        assert_eq!(map_virtual_keycode(VirtualKeyCode::F12), VirtualKey(0x7B));
        assert_eq!(map_virtual_keycode(VirtualKeyCode::LAlt), VirtualKey::LMENU);
        assert_eq!(map_virtual_keycode(VirtualKeyCode::Capital), VirtualKey::CAPITAL);
        assert_eq!(map_virtual_keycode(VirtualKeyCode::Mute), VirtualKey::NONE);
    }

    #[test]
    fn test_modifiers_from_winit() {
        let state = ModifiersState::CTRL | ModifiersState::ALT;
        assert_eq!(Modifiers::from(state), Modifiers::CTRL | Modifiers::ALT);
        assert!(!Modifiers::from(state).is_chord());
        assert!(Modifiers::from(state | ModifiersState::SHIFT).is_chord());
    }

    #[test]
    fn test_repeat_detection() {
        let mut mapper = KeyMapper::new();
        let first = mapper
            .process_key(&input(ElementState::Pressed, VirtualKeyCode::A))
            .unwrap();
        assert!(!first.autorepeat);
        let second = mapper
            .process_key(&input(ElementState::Pressed, VirtualKeyCode::A))
            .unwrap();
        assert!(second.autorepeat);
        let up = mapper
            .process_key(&input(ElementState::Released, VirtualKeyCode::A))
            .unwrap();
        assert!(!up.pressed);
        let again = mapper
            .process_key(&input(ElementState::Pressed, VirtualKeyCode::A))
            .unwrap();
        assert!(!again.autorepeat);
    }

    #[test]
    fn test_unmapped_key_is_dropped() {
        let mut mapper = KeyMapper::new();
        assert_eq!(
            mapper.process_key(&input(ElementState::Pressed, VirtualKeyCode::Mute)),
            None
        );
    }
}
