use crate::event::Key;
use nutshell_common::Intent;

/// What a bound key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Move(Intent),
    Quit,
}

/// Arrow keys and WASD both drive the four directions; Escape quits.
const BINDINGS: &[(Key, Binding)] = &[
    (Key::ArrowUp, Binding::Move(Intent::Forward)),
    (Key::W, Binding::Move(Intent::Forward)),
    (Key::ArrowDown, Binding::Move(Intent::Backward)),
    (Key::S, Binding::Move(Intent::Backward)),
    (Key::ArrowLeft, Binding::Move(Intent::Left)),
    (Key::A, Binding::Move(Intent::Left)),
    (Key::ArrowRight, Binding::Move(Intent::Right)),
    (Key::D, Binding::Move(Intent::Right)),
    (Key::Escape, Binding::Quit),
];

/// Look up the binding for a key.
pub fn binding_for(key: Key) -> Option<Binding> {
    BINDINGS
        .iter()
        .find(|(bound, _)| *bound == key)
        .map(|(_, binding)| *binding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_share_directions() {
        let pairs = [
            (Key::ArrowUp, Key::W),
            (Key::ArrowDown, Key::S),
            (Key::ArrowLeft, Key::A),
            (Key::ArrowRight, Key::D),
        ];
        for (arrow, letter) in pairs {
            assert_eq!(binding_for(arrow), binding_for(letter));
            assert!(matches!(binding_for(arrow), Some(Binding::Move(_))));
        }
    }

    #[test]
    fn every_intent_is_bound() {
        for intent in Intent::ALL {
            let bound = BINDINGS
                .iter()
                .filter(|(_, b)| *b == Binding::Move(intent))
                .count();
            assert_eq!(bound, 2, "{intent:?} should have an arrow and a letter key");
        }
    }

    #[test]
    fn escape_quits() {
        assert_eq!(binding_for(Key::Escape), Some(Binding::Quit));
        assert_eq!(binding_for(Key::Other), None);
    }
}
