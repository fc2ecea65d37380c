//! Classification of local key events before they reach the session.
//!
//! A press with ctrl, alt and shift held is a viewer shortcut. CapsLock and
//! the Eisu toggle double as a sticky alt key when pressed on their own.

use crate::keyboard::{KeyEvent, KeyTransition, Modifiers};
use crate::InputDispatcher;
use radic_session::VirtualKey;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Actions the viewer shell performs for a shortcut chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    /// Ctrl+Alt+Shift+Backspace
    ToggleCommandSurface,
    /// Ctrl+Alt+Shift+F
    ToggleFullscreen,
    /// Ctrl+Alt+Shift+D
    ToggleScale,
}

/// What the router did with one key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Queued unchanged as its own chunk.
    Forwarded,
    /// Left to the shell; nothing was queued.
    Shortcut(ShortcutAction),
    /// Queued the caps lock toggle script.
    CapsLockToggled,
    /// Queued ctrl+alt+`key` with shift released.
    Chord(VirtualKey),
    /// Queued an alt press that is held until the next key release.
    StickyAltLatched,
    /// Release or repeat of a key whose press was consumed.
    Swallowed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Recognise ctrl+alt+shift chords.
    #[serde(default = "default_true")]
    pub shortcuts: bool,
    /// Let CapsLock and Eisu act as a sticky alt key.
    #[serde(default = "default_true")]
    pub sticky_alt: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            shortcuts: true,
            sticky_alt: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct KeyRouter {
    config: RouterConfig,
    alt_latched: bool,
    /// Keys whose press was consumed; their repeats and release are too.
    consumed: HashSet<VirtualKey>,
}

fn is_caps_key(key: VirtualKey) -> bool {
    key == VirtualKey::CAPITAL || key == VirtualKey::DBE_ALPHANUMERIC
}

impl KeyRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            alt_latched: false,
            consumed: HashSet::new(),
        }
    }

    pub fn is_alt_latched(&self) -> bool {
        self.alt_latched
    }

    /// Forget the sticky alt latch and consumed keys, e.g. for a new session.
    pub fn reset(&mut self) {
        self.alt_latched = false;
        self.consumed.clear();
    }

    /// Classify `event` and queue whatever it turns into.
    pub fn route(&mut self, event: &KeyEvent, dispatcher: &mut InputDispatcher) -> KeyOutcome {
        if self.consumed.contains(&event.key) {
            if !event.pressed {
                self.consumed.remove(&event.key);
                return KeyOutcome::Swallowed;
            }
            if event.autorepeat {
                return KeyOutcome::Swallowed;
            }
            self.consumed.remove(&event.key);
        }

        if event.pressed && !event.autorepeat {
            if self.config.shortcuts && event.modifiers.is_chord() {
                self.consumed.insert(event.key);
                return self.chord(event.key, dispatcher);
            }
            if self.config.sticky_alt && is_caps_key(event.key) && !self.alt_latched {
                debug!("Sticky alt latched by {:?}", event.key);
                self.consumed.insert(event.key);
                self.alt_latched = true;
                dispatcher.begin_chunk();
                dispatcher.append_key(VirtualKey::LMENU, true);
                return KeyOutcome::StickyAltLatched;
            }
        }

        if !event.pressed && self.alt_latched && !is_caps_key(event.key) {
            debug!("Sticky alt released by {:?}", event.key);
            self.alt_latched = false;
            dispatcher.begin_chunk();
            dispatcher.append_key(VirtualKey::LMENU, false);
        }

        trace!("Forwarding {:?}", event);
        dispatcher.begin_chunk();
        dispatcher.append_transition(KeyTransition {
            key: event.key,
            pressed: event.pressed,
            autorepeat: event.autorepeat,
        });
        KeyOutcome::Forwarded
    }

    fn chord(&mut self, key: VirtualKey, dispatcher: &mut InputDispatcher) -> KeyOutcome {
        let action = match key {
            VirtualKey::BACK => Some(ShortcutAction::ToggleCommandSurface),
            VirtualKey::F => Some(ShortcutAction::ToggleFullscreen),
            VirtualKey::D => Some(ShortcutAction::ToggleScale),
            _ => None,
        };
        if let Some(action) = action {
            debug!("Shortcut {:?}", action);
            return KeyOutcome::Shortcut(action);
        }
        if is_caps_key(key) {
            dispatcher.toggle_caps_lock();
            return KeyOutcome::CapsLockToggled;
        }

        dispatcher.send_modifier_state(Modifiers::CTRL | Modifiers::ALT);
        dispatcher.begin_chunk();
        dispatcher.append_key(key, true);
        dispatcher.begin_chunk();
        dispatcher.append_key(key, false);
        KeyOutcome::Chord(key)
    }
}
