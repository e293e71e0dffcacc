use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{debug, info};
use wasm_bindgen::JsValue;
use web_sys::{Element, Event};

use crate::config;
use crate::dom;
use crate::effects::particles::ParticleSystem;

fn load_image(img: &Element) {
    if let Some(src) = img.get_attribute("data-src") {
        let _ = img.set_attribute("src", &src);
        let _ = img.remove_attribute("data-src");
        let _ = img.class_list().add_1("loaded");
    }
}

/// Swaps `data-src` into `src` shortly before each image scrolls into view.
fn mount_lazy_images() -> Result<(), JsValue> {
    let images = dom::query_all("img[data-src]");
    if images.is_empty() {
        return Ok(());
    }

    let observer = dom::observe_visibility(0.0, Some(config::LAZY_IMAGE_ROOT_MARGIN), |img, observer| {
        observer.unobserve(&img);
        load_image(&img);
    });

    match observer {
        Ok(observer) => {
            for img in &images {
                observer.observe(img);
            }
            debug!("Lazy loading {} images", images.len());
        }
        Err(_) => {
            info!("IntersectionObserver unavailable, loading images eagerly");
            for img in &images {
                load_image(img);
            }
        }
    }
    Ok(())
}

/// Keeps the particle loop off while the tab is hidden.
fn pause_when_hidden(particles: &ParticleSystem) -> Result<(), JsValue> {
    let Some(document) = dom::document() else {
        return Ok(());
    };
    let particles = particles.clone();
    let watched = document.clone();
    dom::listen(&document, "visibilitychange", move |_: Event| {
        if watched.hidden() {
            particles.stop();
        } else {
            particles.start();
        }
    })
}

fn debounce_resize(particles: &ParticleSystem) -> Result<(), JsValue> {
    let Some(window) = web_sys::window() else {
        return Ok(());
    };
    let pending: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
    let particles = particles.clone();
    dom::listen(&window, "resize", move |_: Event| {
        let particles = particles.clone();
        // Replacing the timeout drops, and so cancels, the previous one.
        *pending.borrow_mut() = Some(Timeout::new(config::RESIZE_DEBOUNCE_MS, move || {
            particles.resize();
        }));
    })
}

pub fn mount(particles: Option<&ParticleSystem>) -> Result<(), JsValue> {
    mount_lazy_images()?;
    if let Some(particles) = particles {
        pause_when_hidden(particles)?;
        debounce_resize(particles)?;
    }
    Ok(())
}
