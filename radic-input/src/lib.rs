//! radic-input: local keyboard and pointer input for a remote session.
//!
//! Key events are classified by a [`KeyRouter`] (shortcut chords, sticky
//! alt) and queued as ordered chunks on an [`InputDispatcher`], which
//! drains one chunk per tick into the session. Pointer events are encoded
//! directly with [`pointer_flags`].

mod keyboard;
mod mouse;
mod shortcuts;

use radic_session::{RemoteSession, VirtualKey};
use std::collections::VecDeque;
use tracing::{debug, trace};

pub use keyboard::{
    map_virtual_keycode, KeyChunk, KeyEvent, KeyMapper, KeyTransition, Modifiers,
};
pub use mouse::{
    map_mouse_button, pointer_flags, wheel_event, PointerButton, PointerEventKind, WHEEL_DELTA,
};
pub use shortcuts::{KeyOutcome, KeyRouter, RouterConfig, ShortcutAction};

/// FIFO queue of key chunks waiting to be sent.
///
/// A chunk is delivered whole, in order, before the next one starts.
#[derive(Debug, Default)]
pub struct InputDispatcher {
    chunks: VecDeque<KeyChunk>,
    closed: bool,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new, empty chunk at the back of the queue.
    pub fn begin_chunk(&mut self) {
        if self.closed {
            return;
        }
        self.chunks.push_back(KeyChunk::new());
    }

    pub fn append_key(&mut self, key: VirtualKey, pressed: bool) {
        self.append_transition(KeyTransition::new(key, pressed));
    }

    /// Append to the newest chunk, opening one if the queue is empty.
    pub fn append_transition(&mut self, transition: KeyTransition) {
        if self.closed {
            return;
        }
        match self.chunks.back_mut() {
            Some(chunk) => chunk.push(transition),
            None => self.chunks.push_back(vec![transition]),
        }
    }

    /// Send the oldest chunk. Returns whether any key went to the session.
    ///
    /// [`VirtualKey::NONE`] entries are skipped. Refused transitions are
    /// not retried.
    pub fn tick(&mut self, session: &dyn RemoteSession) -> bool {
        let Some(chunk) = self.chunks.pop_front() else {
            return false;
        };

        let mut sent = false;
        for transition in chunk.into_iter().filter(|t| !t.key.is_none()) {
            trace!(
                "Key {:?} {}",
                transition.key,
                if transition.pressed { "down" } else { "up" }
            );
            if !session.send_key_transition(transition.key, transition.pressed, transition.autorepeat)
            {
                debug!("Session refused key {:?}", transition.key);
            }
            sent = true;
        }
        sent
    }

    /// Queue a chunk that brings ctrl, shift and alt on the remote side to
    /// exactly `mods`.
    ///
    /// Absent modifiers are released in their generic, left and right forms;
    /// present ones are pressed using the left key.
    pub fn send_modifier_state(&mut self, mods: Modifiers) {
        const KEYS: [(Modifiers, [VirtualKey; 3]); 3] = [
            (
                Modifiers::CTRL,
                [VirtualKey::CONTROL, VirtualKey::LCONTROL, VirtualKey::RCONTROL],
            ),
            (
                Modifiers::SHIFT,
                [VirtualKey::SHIFT, VirtualKey::LSHIFT, VirtualKey::RSHIFT],
            ),
            (
                Modifiers::ALT,
                [VirtualKey::MENU, VirtualKey::LMENU, VirtualKey::RMENU],
            ),
        ];

        if self.closed {
            return;
        }
        self.begin_chunk();
        for (flag, keys) in KEYS {
            if !mods.contains(flag) {
                for key in keys {
                    self.append_key(key, false);
                }
            }
        }
        for (flag, [_, left, _]) in KEYS {
            if mods.contains(flag) {
                self.append_key(left, true);
            }
        }
    }

    /// Toggle caps lock on the remote side with all modifiers released.
    pub fn toggle_caps_lock(&mut self) {
        if self.closed {
            return;
        }
        self.send_modifier_state(Modifiers::empty());
        self.begin_chunk();
        self.append_key(VirtualKey::LSHIFT, true);
        self.append_key(VirtualKey::CAPITAL, true);
        self.append_key(VirtualKey::CAPITAL, false);
        self.append_key(VirtualKey::LSHIFT, false);
    }

    pub fn pending_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Drop everything queued; later calls are ignored.
    pub fn close(&mut self) {
        self.closed = true;
        self.chunks.clear();
    }

    /// Accept keys again after [`close`](Self::close), starting from an
    /// empty queue.
    pub fn reopen(&mut self) {
        self.chunks.clear();
        self.closed = false;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
