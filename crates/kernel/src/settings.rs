/// Multisample counts a window may request.
pub const VALID_SAMPLE_COUNTS: [u32; 4] = [1, 2, 4, 8];

pub const DEFAULT_WIDTH: u32 = 1024;
pub const DEFAULT_HEIGHT: u32 = 768;
pub const DEFAULT_TITLE: &str = "Universe in a nut-shell";

/// Parameters of the window and its rendering context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub resizable: bool,
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            samples: 1,
            resizable: true,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl WindowSettings {
    /// Settings with invalid values corrected.
    ///
    /// A zero height becomes one so the aspect ratio stays finite, and sample
    /// counts other than 1, 2, 4 or 8 become 1.
    pub fn new(width: u32, height: u32, samples: u32, resizable: bool, title: impl Into<String>) -> Self {
        let height = if height == 0 {
            tracing::warn!("window height of 0 requested, using 1");
            1
        } else {
            height
        };
        let samples = if VALID_SAMPLE_COUNTS.contains(&samples) {
            samples
        } else {
            tracing::warn!(samples, "invalid anti-aliasing sample count, using 1");
            1
        };
        Self {
            width: width.max(1),
            height,
            samples,
            resizable,
            title: title.into(),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
