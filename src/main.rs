use log::{info, warn};
use wasm_bindgen::JsValue;
use web_sys::Event;
use yew::Callback;

mod analytics;
mod config;
mod dom;
mod footer;
mod keyboard;
mod performance;
mod theme;
mod effects {
    pub mod counter;
    pub mod particles;
    pub mod pointer;
    pub mod scroll;
}
mod components {
    pub mod tool_modal;
}

use components::tool_modal::{self, ModalController};
use effects::particles::ParticleSystem;
use effects::{counter, pointer, scroll};
use theme::{Theme, ThemeManager};

/// A failing enhancement is logged and the rest of the page keeps going.
fn report(component: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        warn!("{} failed to mount: {:?}", component, err);
    }
}

fn start() {
    footer::update_copyright_year();

    let theme = match ThemeManager::mount() {
        Ok(theme) => Some(theme),
        Err(err) => {
            warn!("ThemeManager failed to mount: {:?}", err);
            None
        }
    };

    report("NavbarScroll", scroll::mount_navbar());
    report("SmoothScroll", scroll::mount_smooth_anchors());
    report("ScrollAnimations", scroll::mount_reveal());
    report("CounterAnimation", counter::mount());

    let mut particles = None;
    if dom::prefers_reduced_motion() {
        info!("Reduced motion requested, skipping motion effects");
    } else {
        let initial = theme.as_ref().map(ThemeManager::current).unwrap_or(Theme::Light);
        particles = match ParticleSystem::mount(initial) {
            Ok(particles) => particles,
            Err(err) => {
                warn!("ParticleSystem failed to mount: {:?}", err);
                None
            }
        };
        report("MagneticButtons", pointer::mount_magnetic_buttons());
        report("CardTilt", pointer::mount_card_tilt());
        report("ParallaxEffect", scroll::mount_parallax());
    }

    if let (Some(theme), Some(particles)) = (&theme, &particles) {
        let particles = particles.clone();
        theme.subscribe(Callback::from(move |next: Theme| particles.update_colors(next)));
    }

    let modal = ModalController::default();
    report("ToolModal", tool_modal::mount(&modal));
    report("KeyboardNavigation", keyboard::mount(&modal));
    report("PerformanceOptimizer", performance::mount(particles.as_ref()));
    report("Analytics", analytics::mount());

    info!("Botle - Open source tools for everyone!");
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    console_log::init_with_level(config::log_level()).expect("error initializing log");

    let Some(document) = dom::document() else {
        return;
    };
    if document.ready_state() == "loading" {
        report(
            "App",
            dom::listen(&document, "DOMContentLoaded", |_: Event| start()),
        );
    } else {
        start();
    }
}
