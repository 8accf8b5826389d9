use crate::clock::{Clock, MonotonicTimeSource, TimeSource};
use nutshell_common::CameraState;
use nutshell_input::{Dispatch, InputDispatcher, InputEvent};
use nutshell_render::{FrameRenderer, Renderer};
use std::collections::VecDeque;
use std::fmt::Display;

/// Lifecycle of the render loop. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// An event delivered by the window system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformEvent {
    Input(InputEvent),
    /// The application was asked to close, e.g. by the window manager.
    Quit,
}

impl From<InputEvent> for PlatformEvent {
    fn from(event: InputEvent) -> Self {
        PlatformEvent::Input(event)
    }
}

/// Queue of pending platform events, polled until empty each iteration.
pub trait EventSource {
    fn poll_event(&mut self) -> Option<PlatformEvent>;
}

impl EventSource for VecDeque<PlatformEvent> {
    fn poll_event(&mut self) -> Option<PlatformEvent> {
        self.pop_front()
    }
}

/// The per-frame cycle: sample the clock, draw, present, then drain input.
///
/// Owns the camera, the dispatcher and the frame renderer. Input drained in
/// one iteration is visible from the next iteration's frame.
#[derive(Debug)]
pub struct RenderLoop<S = MonotonicTimeSource> {
    clock: Clock<S>,
    camera: CameraState,
    dispatcher: InputDispatcher,
    frame_renderer: FrameRenderer,
    state: LoopState,
    frames_rendered: u64,
}

impl RenderLoop<MonotonicTimeSource> {
    /// Loop driven by the wall clock.
    pub fn monotonic(frame_renderer: FrameRenderer) -> Self {
        Self::new(Clock::monotonic(), frame_renderer)
    }
}

impl<S: TimeSource> RenderLoop<S> {
    pub fn new(clock: Clock<S>, frame_renderer: FrameRenderer) -> Self {
        Self {
            clock,
            camera: CameraState::new(),
            dispatcher: InputDispatcher::new(),
            frame_renderer,
            state: LoopState::Running,
            frames_rendered: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn dispatcher(&self) -> &InputDispatcher {
        &self.dispatcher
    }

    pub fn frame_renderer(&self) -> &FrameRenderer {
        &self.frame_renderer
    }

    pub fn frame_renderer_mut(&mut self) -> &mut FrameRenderer {
        &mut self.frame_renderer
    }

    /// Run one iteration and return the resulting state.
    ///
    /// Does nothing once stopped. A renderer failure stops the loop before
    /// presenting; a stop from input ends draining immediately, leaving later
    /// events unread.
    pub fn iterate<R, E>(&mut self, renderer: &mut R, events: &mut E) -> LoopState
    where
        R: Renderer + ?Sized,
        E: EventSource + ?Sized,
    {
        if !self.is_running() {
            return self.state;
        }

        let elapsed = self.clock.sample();
        if !self
            .frame_renderer
            .render_frame(&mut self.camera, elapsed, renderer)
        {
            tracing::error!("renderer reported an unrecoverable failure");
            self.stop();
            return self.state;
        }
        self.frames_rendered += 1;
        renderer.present();

        while let Some(event) = events.poll_event() {
            if !self.handle_event(event) {
                self.stop();
                break;
            }
        }
        self.state
    }

    /// Iterate until stopped. Returns the number of frames rendered.
    pub fn run<R, E>(&mut self, renderer: &mut R, events: &mut E) -> u64
    where
        R: Renderer + ?Sized,
        E: EventSource + ?Sized,
    {
        while self.iterate(renderer, events) == LoopState::Running {}
        self.frames_rendered
    }

    /// Record a failed window or context setup and stop without drawing.
    pub fn abort_setup(&mut self, error: &dyn Display) {
        tracing::error!("setup failed: {error}");
        self.stop();
    }

    /// Stop the loop and report the frame count. Idempotent.
    pub fn stop(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.state = LoopState::Stopped;
        tracing::info!(
            frames = self.frames_rendered,
            "{} Frames rendered",
            self.frames_rendered
        );
    }

    fn handle_event(&mut self, event: PlatformEvent) -> bool {
        match event {
            PlatformEvent::Quit => {
                tracing::info!("application quit requested");
                false
            }
            PlatformEvent::Input(input) => match self.dispatcher.dispatch(&input) {
                Dispatch::Continue => true,
                Dispatch::Apply(action) => {
                    action.apply(&mut self.camera);
                    true
                }
                Dispatch::Stop => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedStepTimeSource, ManualTimeSource};
    use nutshell_input::{Key, MouseButton};
    use nutshell_render::{DebugTextRenderer, FramePlan, SceneTextures};
    use std::time::Duration;

    /// Renderer that fails after a number of successful frames.
    struct FailingRenderer {
        remaining: u32,
        presented: u32,
    }

    impl Renderer for FailingRenderer {
        fn render(&mut self, _plan: &FramePlan) -> bool {
            if self.remaining == 0 {
                return false;
            }
            self.remaining -= 1;
            true
        }

        fn present(&mut self) {
            self.presented += 1;
        }
    }

    fn key_down(key: Key) -> PlatformEvent {
        InputEvent::KeyDown(key).into()
    }

    #[test]
    fn quit_key_stops_before_next_draw() {
        let mut lp = RenderLoop::new(
            Clock::new(FixedStepTimeSource::from_hz(60)),
            FrameRenderer::default(),
        );
        let mut renderer = DebugTextRenderer::new();
        let mut events = VecDeque::from([key_down(Key::Escape), key_down(Key::ArrowUp)]);

        assert_eq!(lp.iterate(&mut renderer, &mut events), LoopState::Stopped);
        assert_eq!(lp.iterate(&mut renderer, &mut events), LoopState::Stopped);
        assert_eq!(renderer.frames_rendered(), 1);
        assert_eq!(renderer.frames_presented(), 1);
        assert_eq!(lp.frames_rendered(), 1);
        // draining ends at the stop
        assert_eq!(events.len(), 1);
        assert!(!lp.camera().intents.forward);
    }

    #[test]
    fn window_close_stops() {
        let mut lp = RenderLoop::new(Clock::new(ManualTimeSource::new()), FrameRenderer::default());
        let mut renderer = DebugTextRenderer::new();
        let mut events = VecDeque::from([PlatformEvent::Quit]);
        assert_eq!(lp.run(&mut renderer, &mut events), 1);
        assert!(!lp.is_running());
    }

    #[test]
    fn input_shows_from_next_frame() {
        let source = ManualTimeSource::new();
        let mut lp = RenderLoop::new(Clock::new(&source), FrameRenderer::default());
        let mut renderer = DebugTextRenderer::new();
        let mut events = VecDeque::new();

        lp.iterate(&mut renderer, &mut events);
        events.push_back(key_down(Key::ArrowUp));
        source.advance(Duration::from_secs(1));
        lp.iterate(&mut renderer, &mut events);
        // the key was drained after this frame was drawn
        assert_eq!(lp.camera().translation.z, 0.0);
        assert!(lp.camera().intents.forward);

        source.advance(Duration::from_secs(1));
        lp.iterate(&mut renderer, &mut events);
        assert!((lp.camera().translation.z - 16.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_depends_only_on_total_time() {
        let coarse = ManualTimeSource::new();
        let fine = ManualTimeSource::new();
        let mut a = RenderLoop::new(Clock::new(&coarse), FrameRenderer::default());
        let mut b = RenderLoop::new(Clock::new(&fine), FrameRenderer::default());
        let mut renderer = DebugTextRenderer::new();
        let mut events = VecDeque::new();

        a.iterate(&mut renderer, &mut events);
        for _ in 0..4 {
            coarse.advance(Duration::from_millis(500));
            a.iterate(&mut renderer, &mut events);
        }

        b.iterate(&mut renderer, &mut events);
        for step in [1u64, 7, 300, 92, 600, 1000] {
            fine.advance(Duration::from_millis(step));
            b.iterate(&mut renderer, &mut events);
        }

        // rotation advances after drawing, so it covers every elapsed sample
        assert!((a.frame_renderer().rotation().degrees() - 6.0).abs() < 1e-9);
        assert!((b.frame_renderer().rotation().degrees() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn renderer_failure_stops_without_present() {
        let mut lp = RenderLoop::new(
            Clock::new(FixedStepTimeSource::from_hz(30)),
            FrameRenderer::default(),
        );
        let mut renderer = FailingRenderer {
            remaining: 2,
            presented: 0,
        };
        let mut events = VecDeque::new();
        assert_eq!(lp.run(&mut renderer, &mut events), 2);
        assert_eq!(renderer.presented, 2);
        assert_eq!(lp.state(), LoopState::Stopped);
    }

    #[test]
    fn missing_textures_render_every_frame() {
        let mut lp = RenderLoop::new(
            Clock::new(FixedStepTimeSource::from_hz(60)),
            FrameRenderer::new(SceneTextures::default()),
        );
        let mut renderer = DebugTextRenderer::new();
        let mut events = VecDeque::new();
        for _ in 0..2 {
            assert_eq!(lp.iterate(&mut renderer, &mut events), LoopState::Running);
            assert!(renderer.last_output().contains("draws=5"));
        }
    }

    #[test]
    fn mouse_look_only_while_primary_held() {
        let mut lp = RenderLoop::new(Clock::new(ManualTimeSource::new()), FrameRenderer::default());
        let mut renderer = DebugTextRenderer::new();
        let mut events: VecDeque<PlatformEvent> = VecDeque::from([
            InputEvent::MouseMotion { dx: 5.0, dy: 3.0 }.into(),
            InputEvent::MouseMotion { dx: -2.0, dy: 0.0 }.into(),
        ]);
        lp.iterate(&mut renderer, &mut events);
        assert_eq!(lp.camera().rotation.x, 0.0);
        assert_eq!(lp.camera().rotation.y, 0.0);
        assert!(lp.camera().first_motion_captured);

        events.extend([
            PlatformEvent::from(InputEvent::MouseDown(MouseButton::Primary)),
            InputEvent::MouseMotion { dx: 4.0, dy: 100.0 }.into(),
        ]);
        lp.iterate(&mut renderer, &mut events);
        assert!(lp.dispatcher().primary_held());
        assert_eq!(lp.camera().rotation.y, 4.0);
        assert_eq!(lp.camera().rotation.x, 70.0);
    }

    #[test]
    fn stop_is_terminal() {
        let mut lp = RenderLoop::new(Clock::new(ManualTimeSource::new()), FrameRenderer::default());
        lp.stop();
        lp.stop();
        let mut renderer = DebugTextRenderer::new();
        let mut events = VecDeque::new();
        assert_eq!(lp.run(&mut renderer, &mut events), 0);
        assert_eq!(renderer.frames_rendered(), 0);
    }

    #[test]
    fn failed_setup_never_draws() {
        let mut lp = RenderLoop::new(Clock::new(ManualTimeSource::new()), FrameRenderer::default());
        lp.abort_setup(&"no graphics adapter");
        assert_eq!(lp.state(), LoopState::Stopped);
        let mut renderer = DebugTextRenderer::new();
        assert_eq!(lp.run(&mut renderer, &mut VecDeque::new()), 0);
        assert_eq!(renderer.frames_rendered(), 0);
    }
}
