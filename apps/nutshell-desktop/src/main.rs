use anyhow::Result;
use clap::Parser;
use nutshell_assets::ResourceLocator;
use nutshell_assets::locator::DEFAULT_ROOTS;
use nutshell_input::{InputEvent, Key, MouseButton};
use nutshell_kernel::settings::DEFAULT_TITLE;
use nutshell_kernel::{LoopState, PlatformEvent, RenderLoop, WindowSettings};
use nutshell_render::FrameRenderer;
use nutshell_render_wgpu::{RendererSettings, WgpuRenderer};
use std::collections::VecDeque;
use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "nutshell-desktop", about = "A rotating Earth in a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Window width in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 768)]
    height: u32,

    /// Anti-aliasing samples (1, 2, 4 or 8)
    #[arg(long, default_value_t = 1)]
    samples: u32,

    /// Window title
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// Do not allow the window to be resized
    #[arg(long)]
    fixed_size: bool,

    /// Media directory searched for textures; repeat to add more, searched in order
    #[arg(long = "media", value_name = "DIR")]
    media: Vec<PathBuf>,

    /// File that receives a copy of the log
    #[arg(long, default_value = "runtime.log")]
    log_file: PathBuf,

    /// Log to the terminal only
    #[arg(long)]
    no_log_file: bool,
}

/// Translate a physical key into the keys the dispatcher knows.
fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::Escape => Key::Escape,
        _ => Key::Other,
    }
}

fn map_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Primary,
        winit::event::MouseButton::Right => MouseButton::Secondary,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        _ => MouseButton::Other,
    }
}

/// Window, renderer and render loop. Events from winit are queued and
/// drained by the loop after each frame.
struct GpuApp {
    settings: WindowSettings,
    locator: ResourceLocator,
    window: Option<Arc<Window>>,
    renderer: Option<WgpuRenderer>,
    render_loop: RenderLoop,
    pending: VecDeque<PlatformEvent>,
}

impl GpuApp {
    fn new(settings: WindowSettings, locator: ResourceLocator) -> Self {
        Self {
            settings,
            locator,
            window: None,
            renderer: None,
            render_loop: RenderLoop::monotonic(FrameRenderer::default()),
            pending: VecDeque::new(),
        }
    }

    fn fail_setup(&mut self, event_loop: &ActiveEventLoop, error: &dyn std::fmt::Display) {
        self.render_loop.abort_setup(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || !self.render_loop.is_running() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(PhysicalSize::new(self.settings.width, self.settings.height))
            .with_resizable(self.settings.resizable);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail_setup(event_loop, &e);
                return;
            }
        };

        let size = window.inner_size();
        let mut renderer = match WgpuRenderer::new(
            window.clone(),
            RendererSettings {
                width: size.width,
                height: size.height,
                samples: self.settings.samples,
            },
        ) {
            Ok(renderer) => renderer,
            Err(e) => {
                self.fail_setup(event_loop, &e);
                return;
            }
        };

        let textures = renderer.load_scene_textures(&self.locator);
        self.render_loop.frame_renderer_mut().set_textures(textures);
        tracing::info!(
            width = size.width,
            height = size.height,
            samples = renderer.sample_count(),
            "window opened"
        );

        window.request_redraw();
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.pending.push_back(PlatformEvent::Quit);
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let key = map_key(code);
                let event = match key_state {
                    ElementState::Pressed => InputEvent::KeyDown(key),
                    ElementState::Released => InputEvent::KeyUp(key),
                };
                self.pending.push_back(event.into());
            }
            WindowEvent::MouseInput {
                button,
                state: btn_state,
                ..
            } => {
                let button = map_button(button);
                let event = match btn_state {
                    ElementState::Pressed => InputEvent::MouseDown(button),
                    ElementState::Released => InputEvent::MouseUp(button),
                };
                self.pending.push_back(event.into());
            }
            WindowEvent::RedrawRequested => {
                let Some(renderer) = &mut self.renderer else {
                    return;
                };
                if self.render_loop.iterate(renderer, &mut self.pending) == LoopState::Stopped {
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.pending.push_back(
                InputEvent::MouseMotion {
                    dx: delta.0 as f32,
                    dy: delta.1 as f32,
                }
                .into(),
            );
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.render_loop.stop();
    }
}

fn init_logging(cli: &Cli) {
    let filter = if cli.verbose { "debug" } else { "info" };

    let mut file_error = None;
    let file_layer = if cli.no_log_file {
        None
    } else {
        match File::create(&cli.log_file) {
            Ok(file) => Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            ),
            Err(e) => {
                file_error = Some(e);
                None
            }
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!(path = %cli.log_file.display(), "could not open log file: {e}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    tracing::info!("nutshell-desktop starting");

    let settings = WindowSettings::new(
        cli.width,
        cli.height,
        cli.samples,
        !cli.fixed_size,
        cli.title.clone(),
    );
    let locator = if cli.media.is_empty() {
        ResourceLocator::with_roots(DEFAULT_ROOTS)
    } else {
        ResourceLocator::with_roots(cli.media.iter().cloned())
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(settings, locator);
    event_loop.run_app(&mut app)?;

    Ok(())
}
