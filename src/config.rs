use log::Level;

pub const THEME_STORAGE_KEY: &str = "theme";
pub const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

pub const PARTICLE_COUNT: usize = 30;

pub const NAVBAR_SCROLL_THRESHOLD: f64 = 50.0;
pub const NAVBAR_HEIGHT: f64 = 80.0;

pub const REVEAL_THRESHOLD: f64 = 0.1;
pub const REVEAL_ROOT_MARGIN: &str = "0px 0px -50px 0px";

pub const COUNTER_THRESHOLD: f64 = 0.5;
pub const COUNTER_DURATION_MS: f64 = 1500.0;

pub const LAZY_IMAGE_ROOT_MARGIN: &str = "50px";
pub const RESIZE_DEBOUNCE_MS: u32 = 150;

// Card tilt is a desktop-only effect
pub const TILT_MIN_VIEWPORT_WIDTH: f64 = 1024.0;

pub const DEFAULT_PARALLAX_SPEED: f64 = 0.5;

pub const TOOL_CARD_SELECTOR: &str = ".tool-card";
pub const CTA_SELECTOR: &str = ".cta-button";
pub const DETAILS_BUTTON_SELECTOR: &str = ".tool-details-btn";
pub const MODAL_ROOT_ID: &str = "tool-modal-root";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose while running under `trunk serve`
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}
