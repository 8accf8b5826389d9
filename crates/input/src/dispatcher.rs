use crate::action::Action;
use crate::binding::{Binding, binding_for};
use crate::event::{InputEvent, MouseButton};

/// Result of dispatching one input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch {
    /// Nothing to apply; keep running.
    Continue,
    /// Apply this action to the camera and keep running.
    Apply(Action),
    /// The quit key was pressed.
    Stop,
}

impl Dispatch {
    /// `false` when the render loop has to terminate.
    pub fn should_continue(&self) -> bool {
        !matches!(self, Dispatch::Stop)
    }
}

/// Translates raw input events into camera actions.
///
/// The only state it keeps is whether the primary mouse button is held,
/// which gates mouse look.
#[derive(Debug, Default)]
pub struct InputDispatcher {
    primary_held: bool,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary_held(&self) -> bool {
        self.primary_held
    }

    pub fn dispatch(&mut self, event: &InputEvent) -> Dispatch {
        match *event {
            InputEvent::KeyDown(key) => match binding_for(key) {
                Some(Binding::Move(intent)) => Dispatch::Apply(Action::SetIntent {
                    intent,
                    active: true,
                }),
                Some(Binding::Quit) => {
                    tracing::info!(?key, "quit key pressed");
                    Dispatch::Stop
                }
                None => Dispatch::Continue,
            },
            InputEvent::KeyUp(key) => match binding_for(key) {
                Some(Binding::Move(intent)) => Dispatch::Apply(Action::SetIntent {
                    intent,
                    active: false,
                }),
                Some(Binding::Quit) | None => Dispatch::Continue,
            },
            InputEvent::MouseDown(MouseButton::Primary) => {
                self.primary_held = true;
                Dispatch::Continue
            }
            InputEvent::MouseUp(MouseButton::Primary) => {
                self.primary_held = false;
                Dispatch::Continue
            }
            InputEvent::MouseMotion { dx, dy } => {
                let (yaw, pitch) = if self.primary_held { (dx, dy) } else { (0.0, 0.0) };
                Dispatch::Apply(Action::Pointer { yaw, pitch })
            }
            InputEvent::MouseDown(_) | InputEvent::MouseUp(_) | InputEvent::Other => {
                Dispatch::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Key;
    use nutshell_common::camera::MAX_PITCH;
    use nutshell_common::{CameraState, Intent};

    fn feed(dispatcher: &mut InputDispatcher, camera: &mut CameraState, events: &[InputEvent]) {
        for event in events {
            if let Dispatch::Apply(action) = dispatcher.dispatch(event) {
                action.apply(camera);
            }
        }
    }

    #[test]
    fn key_down_and_up_toggle_intents() {
        let mut d = InputDispatcher::new();
        let mut cam = CameraState::new();
        feed(
            &mut d,
            &mut cam,
            &[InputEvent::KeyDown(Key::W), InputEvent::KeyDown(Key::ArrowLeft)],
        );
        assert!(cam.intents.forward);
        assert!(cam.intents.left);
        feed(&mut d, &mut cam, &[InputEvent::KeyUp(Key::ArrowUp)]);
        assert!(!cam.intents.forward);
        assert!(cam.intents.left);
    }

    #[test]
    fn key_up_without_press_is_idempotent() {
        let mut d = InputDispatcher::new();
        let mut cam = CameraState::new();
        feed(&mut d, &mut cam, &[InputEvent::KeyDown(Key::D)]);
        let before = cam.intents;
        feed(
            &mut d,
            &mut cam,
            &[InputEvent::KeyUp(Key::S), InputEvent::KeyUp(Key::S)],
        );
        assert_eq!(cam.intents, before);
    }

    #[test]
    fn escape_stops_on_press_only() {
        let mut d = InputDispatcher::new();
        let down = d.dispatch(&InputEvent::KeyDown(Key::Escape));
        assert_eq!(down, Dispatch::Stop);
        assert!(!down.should_continue());
        assert_eq!(d.dispatch(&InputEvent::KeyUp(Key::Escape)), Dispatch::Continue);
    }

    #[test]
    fn unbound_events_continue() {
        let mut d = InputDispatcher::new();
        assert_eq!(d.dispatch(&InputEvent::KeyDown(Key::Other)), Dispatch::Continue);
        assert_eq!(
            d.dispatch(&InputEvent::MouseDown(MouseButton::Secondary)),
            Dispatch::Continue
        );
        assert!(!d.primary_held());
        assert_eq!(d.dispatch(&InputEvent::Other), Dispatch::Continue);
    }

    #[test]
    fn motion_without_button_only_calibrates() {
        let mut d = InputDispatcher::new();
        let mut cam = CameraState::new();
        feed(
            &mut d,
            &mut cam,
            &[InputEvent::MouseMotion { dx: 5.0, dy: 3.0 }],
        );
        assert!(cam.first_motion_captured);
        feed(
            &mut d,
            &mut cam,
            &[InputEvent::MouseMotion { dx: -2.0, dy: 0.0 }],
        );
        assert_eq!(cam.rotation.x, 0.0);
        assert_eq!(cam.rotation.y, 0.0);
    }

    #[test]
    fn held_button_enables_mouse_look() {
        let mut d = InputDispatcher::new();
        let mut cam = CameraState::new();
        feed(
            &mut d,
            &mut cam,
            &[
                InputEvent::MouseDown(MouseButton::Primary),
                InputEvent::MouseMotion { dx: 12.0, dy: -4.0 },
                InputEvent::MouseUp(MouseButton::Primary),
                InputEvent::MouseMotion { dx: 50.0, dy: 50.0 },
            ],
        );
        assert_eq!(cam.rotation.y, 12.0);
        assert_eq!(cam.rotation.x, -4.0);
    }

    #[test]
    fn calibration_keeps_first_sample() {
        let mut d = InputDispatcher::new();
        let mut cam = CameraState::new();
        feed(
            &mut d,
            &mut cam,
            &[
                InputEvent::MouseDown(MouseButton::Primary),
                InputEvent::MouseMotion { dx: 7.0, dy: 3.0 },
            ],
        );
        let first = cam.rotation_shift;
        for i in 0..20 {
            feed(
                &mut d,
                &mut cam,
                &[InputEvent::MouseMotion {
                    dx: i as f32,
                    dy: -(i as f32),
                }],
            );
        }
        assert_eq!(cam.rotation_shift, first);
        assert_eq!(first.x, 3.0);
        assert_eq!(first.y, 7.0);
    }

    #[test]
    fn pitch_stays_bounded_for_any_motion() {
        let mut d = InputDispatcher::new();
        let mut cam = CameraState::new();
        feed(&mut d, &mut cam, &[InputEvent::MouseDown(MouseButton::Primary)]);
        let deltas = [90.0, -400.0, 13.5, 71.0, -0.5, 300.0, -140.0, 2.0];
        for dy in deltas {
            feed(
                &mut d,
                &mut cam,
                &[InputEvent::MouseMotion { dx: 1.0, dy }],
            );
            assert!((-MAX_PITCH..=MAX_PITCH).contains(&cam.rotation.x));
        }
    }

    #[test]
    fn dispatcher_does_not_hold_intents() {
        let mut d = InputDispatcher::new();
        let action = d.dispatch(&InputEvent::KeyDown(Key::ArrowDown));
        assert_eq!(
            action,
            Dispatch::Apply(Action::SetIntent {
                intent: Intent::Backward,
                active: true,
            })
        );
    }
}
