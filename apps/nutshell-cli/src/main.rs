use anyhow::bail;
use clap::{Parser, Subcommand};
use nutshell_assets::ResourceLocator;
use nutshell_assets::locator::DEFAULT_ROOTS;
use nutshell_input::{InputEvent, Key};
use nutshell_kernel::{Clock, FixedStepTimeSource, LoopState, PlatformEvent, RenderLoop};
use nutshell_render::{DebugTextRenderer, FrameRenderer, SceneTextures};
use std::collections::VecDeque;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nutshell-cli", about = "Headless tools for the nutshell demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the render loop without a window, on a fixed-step clock
    Simulate {
        /// Maximum number of frames to render
        #[arg(short, long, default_value = "120")]
        frames: u64,
        /// Simulated frames per second
        #[arg(long, default_value = "60")]
        hz: u32,
        /// Key held from the first frame on (up, down, left, right, w, a, s, d)
        #[arg(long = "hold", value_name = "KEY")]
        hold: Vec<String>,
        /// Press the quit key after this frame
        #[arg(long, value_name = "FRAME")]
        quit_at: Option<u64>,
        /// Print the draw list of every frame
        #[arg(long)]
        trace: bool,
    },
    /// Look up files in the media directories
    Resolve {
        /// File names to look up
        #[arg(required = true)]
        names: Vec<String>,
        /// Media directory, searched in the order given
        #[arg(long = "media", value_name = "DIR")]
        media: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("nutshell-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", nutshell_common::crate_info());
            println!("input: {}", nutshell_input::crate_info());
            println!("assets: {}", nutshell_assets::crate_info());
            println!("render: {}", nutshell_render::crate_info());
            println!("kernel: {}", nutshell_kernel::crate_info());
        }
        Commands::Simulate {
            frames,
            hz,
            hold,
            quit_at,
            trace,
        } => simulate(frames, hz, &hold, quit_at, trace)?,
        Commands::Resolve { names, media } => {
            let locator = if media.is_empty() {
                ResourceLocator::with_roots(DEFAULT_ROOTS)
            } else {
                ResourceLocator::with_roots(media)
            };
            for name in &names {
                match locator.resolve(name) {
                    Some(path) => println!("{name}: {}", path.display()),
                    None => println!("{name}: not found"),
                }
            }
        }
    }

    Ok(())
}

fn simulate(frames: u64, hz: u32, hold: &[String], quit_at: Option<u64>, trace: bool) -> anyhow::Result<()> {
    let mut events = VecDeque::new();
    for name in hold {
        let Some(key) = Key::from_name(name) else {
            bail!("unknown key '{name}', expected one of up, down, left, right, w, a, s, d");
        };
        tracing::debug!(?key, "holding key from the first frame");
        events.push_back(PlatformEvent::Input(InputEvent::KeyDown(key)));
    }

    println!("Simulating {frames} frames at {hz} Hz");

    // placeholder ids, so the trace shows which layers are textured
    let textures = SceneTextures {
        starfield: Some(nutshell_assets::TextureId(0)),
        surface: Some(nutshell_assets::TextureId(1)),
        clouds: Some(nutshell_assets::TextureId(2)),
    };
    let mut render_loop = RenderLoop::new(
        Clock::new(FixedStepTimeSource::from_hz(hz)),
        FrameRenderer::new(textures),
    );
    let mut renderer = DebugTextRenderer::new();

    for frame in 1..=frames {
        if quit_at == Some(frame) {
            events.push_back(PlatformEvent::Input(InputEvent::KeyDown(Key::Escape)));
        }
        let state = render_loop.iterate(&mut renderer, &mut events);
        if trace {
            print!("{}", renderer.last_output());
        }
        if state == LoopState::Stopped {
            break;
        }
    }
    render_loop.stop();

    let camera = render_loop.camera();
    println!("Frames rendered: {}", render_loop.frames_rendered());
    println!(
        "Camera: rotation=({:.2}, {:.2}, {:.2}) translation=({:.2}, {:.2}, {:.2})",
        camera.rotation.x,
        camera.rotation.y,
        camera.rotation.z,
        camera.translation.x,
        camera.translation.y,
        camera.translation.z
    );
    println!(
        "Scene rotation: {:.2} degrees",
        render_loop.frame_renderer().rotation().degrees()
    );
    Ok(())
}
