use pretty_assertions::assert_eq;
use radic_common::Size;
use radic_input::{
    InputDispatcher, KeyEvent, KeyMapper, KeyOutcome, KeyRouter, KeyTransition, Modifiers,
};
use radic_session::{LoopbackSession, VirtualKey};
use std::collections::HashSet;
use winit::event::{ElementState, KeyboardInput, ModifiersState, VirtualKeyCode};

fn session() -> LoopbackSession {
    LoopbackSession::new(Size::new(800, 600))
}

fn drain(dispatcher: &mut InputDispatcher, session: &LoopbackSession) {
    while dispatcher.pending_chunks() > 0 {
        dispatcher.tick(session);
    }
}

/// Keys held down on the remote side after replaying `transitions`.
fn remote_state(transitions: &[(VirtualKey, bool)]) -> HashSet<VirtualKey> {
    let mut held = HashSet::new();
    for &(key, pressed) in transitions {
        if pressed {
            held.insert(key);
        } else {
            held.remove(&key);
        }
    }
    held
}

#[test]
fn test_chunks_are_delivered_back_to_back() {
    let session = session();
    let mut dispatcher = InputDispatcher::new();
    let first = [
        KeyTransition::down(VirtualKey::LCONTROL),
        KeyTransition::down(VirtualKey::letter(b'c')),
        KeyTransition::up(VirtualKey::letter(b'c')),
        KeyTransition::up(VirtualKey::LCONTROL),
    ];
    let second = [
        KeyTransition::down(VirtualKey::RETURN),
        KeyTransition::up(VirtualKey::RETURN),
    ];

    for chunk in [&first[..], &second[..]] {
        dispatcher.begin_chunk();
        for &t in chunk {
            dispatcher.append_transition(t);
        }
    }
    drain(&mut dispatcher, &session);

    let expected: Vec<_> = first
        .iter()
        .chain(second.iter())
        .map(|t| (t.key, t.pressed))
        .collect();
    assert_eq!(session.key_transitions(), expected);
}

#[test]
fn test_modifier_state_is_idempotent() {
    for mods in [
        Modifiers::empty(),
        Modifiers::CTRL,
        Modifiers::SHIFT | Modifiers::ALT,
        Modifiers::CHORD,
    ] {
        let once = session();
        let mut dispatcher = InputDispatcher::new();
        dispatcher.send_modifier_state(mods);
        drain(&mut dispatcher, &once);

        let twice = session();
        dispatcher.send_modifier_state(mods);
        dispatcher.send_modifier_state(mods);
        drain(&mut dispatcher, &twice);

        assert_eq!(
            remote_state(&once.key_transitions()),
            remote_state(&twice.key_transitions()),
            "modifiers {:?}",
            mods
        );
    }
}

#[test]
#[allow(deprecated)]
fn test_winit_input_through_router() {
    let session = session();
    let mut mapper = KeyMapper::new();
    let mut router = KeyRouter::default();
    let mut dispatcher = InputDispatcher::new();

    mapper.set_modifiers(ModifiersState::CTRL | ModifiersState::ALT | ModifiersState::SHIFT);
    let input = KeyboardInput {
        scancode: 0,
        state: ElementState::Pressed,
        virtual_keycode: Some(VirtualKeyCode::End),
        modifiers: ModifiersState::empty(),
    };
    let event = mapper.process_key(&input).unwrap();
    assert_eq!(event, KeyEvent::press(VirtualKey::END, Modifiers::CHORD));
    assert_eq!(
        router.route(&event, &mut dispatcher),
        KeyOutcome::Chord(VirtualKey::END)
    );
    drain(&mut dispatcher, &session);

    let sent = session.key_transitions();
    assert_eq!(
        &sent[sent.len() - 2..],
        &[(VirtualKey::END, true), (VirtualKey::END, false)]
    );
    let held = remote_state(&sent);
    assert!(held.contains(&VirtualKey::LCONTROL));
    assert!(held.contains(&VirtualKey::LMENU));
    assert!(!held.contains(&VirtualKey::LSHIFT));
}
