use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlElement, MouseEvent, ScrollBehavior, ScrollToOptions};

use crate::config;
use crate::dom;

/// Reveal delay from `data-delay`; unusable values mean no delay.
pub fn reveal_delay(raw: Option<&str>) -> u32 {
    raw.and_then(dom::parse_int_prefix)
        .and_then(|ms| u32::try_from(ms).ok())
        .unwrap_or(0)
}

/// Adds `visible` to `[data-animation]` elements as they scroll into view.
pub fn mount_reveal() -> Result<(), JsValue> {
    let elements = dom::query_all("[data-animation]");
    if elements.is_empty() {
        return Ok(());
    }

    let observer = dom::observe_visibility(
        config::REVEAL_THRESHOLD,
        Some(config::REVEAL_ROOT_MARGIN),
        |target, observer| {
            observer.unobserve(&target);
            let delay = reveal_delay(target.get_attribute("data-delay").as_deref());
            Timeout::new(delay, move || {
                let _ = target.class_list().add_1("visible");
            })
            .forget();
        },
    )?;

    for element in &elements {
        observer.observe(element);
    }
    debug!("Watching {} reveal elements", elements.len());
    Ok(())
}

pub fn mount_navbar() -> Result<(), JsValue> {
    let Some(window) = web_sys::window() else {
        return Ok(());
    };
    let Some(navbar) = dom::document().and_then(|d| d.get_element_by_id("navbar")) else {
        return Ok(());
    };

    let update = {
        let window = window.clone();
        move || {
            let scrolled = window.scroll_y().unwrap_or(0.0) > config::NAVBAR_SCROLL_THRESHOLD;
            let _ = navbar.class_list().toggle_with_force("scrolled", scrolled);
        }
    };
    update();
    dom::on_scroll_frame(&window, update)
}

/// Fragment id an in-page link points at. Bare `#` and `#!` are
/// placeholders and get no scrolling.
pub fn anchor_target(href: &str) -> Option<&str> {
    match href {
        "#" | "#!" => None,
        _ => href.strip_prefix('#').filter(|id| !id.is_empty()),
    }
}

pub fn mount_smooth_anchors() -> Result<(), JsValue> {
    for anchor in dom::query_all("a[href^=\"#\"]") {
        let link = anchor.clone();
        dom::listen(&anchor, "click", move |e: MouseEvent| {
            let Some(href) = link.get_attribute("href") else {
                return;
            };
            let Some(id) = anchor_target(&href) else {
                return;
            };
            e.prevent_default();
            scroll_to_section(id);
        })?;
    }
    Ok(())
}

/// Smooth-scrolls to `#id`, leaving room for the fixed navbar.
pub fn scroll_to_section(id: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let target = dom::document()
        .and_then(|d| d.get_element_by_id(id))
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    if let Some(target) = target {
        let options = ScrollToOptions::new();
        options.set_top(f64::from(target.offset_top()) - config::NAVBAR_HEIGHT);
        options.set_behavior(ScrollBehavior::Smooth);
        window.scroll_to_with_scroll_to_options(&options);
    }
}

pub fn parallax_speed(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|speed| speed.is_finite())
        .unwrap_or(config::DEFAULT_PARALLAX_SPEED)
}

pub fn parallax_transform(scroll_y: f64, speed: f64) -> String {
    format!("translate3d(0, {}px, 0)", scroll_y * speed)
}

/// Shifts `[data-parallax]` layers by a fraction of the scroll distance.
pub fn mount_parallax() -> Result<(), JsValue> {
    let Some(window) = web_sys::window() else {
        return Ok(());
    };
    let layers: Vec<(HtmlElement, f64)> = dom::query_all("[data-parallax]")
        .into_iter()
        .map(|el| {
            let speed = parallax_speed(el.get_attribute("data-parallax").as_deref());
            (el, speed)
        })
        .collect();
    if layers.is_empty() {
        return Ok(());
    }

    let scroll_window = window.clone();
    dom::on_scroll_frame(&window, move || {
        let scroll_y = scroll_window.scroll_y().unwrap_or(0.0);
        for (layer, speed) in &layers {
            let _ = layer
                .style()
                .set_property("transform", &parallax_transform(scroll_y, *speed));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_anchors_are_ignored() {
        assert_eq!(anchor_target("#"), None);
        assert_eq!(anchor_target("#!"), None);
    }

    #[test]
    fn section_anchors_yield_their_id() {
        assert_eq!(anchor_target("#features"), Some("features"));
        assert_eq!(anchor_target("#tools-grid"), Some("tools-grid"));
        assert_eq!(anchor_target("/about#team"), None);
    }

    #[test]
    fn reveal_delay_parses_milliseconds() {
        assert_eq!(reveal_delay(Some("200")), 200);
        assert_eq!(reveal_delay(Some("150ms")), 150);
        assert_eq!(reveal_delay(None), 0);
        assert_eq!(reveal_delay(Some("soon")), 0);
        assert_eq!(reveal_delay(Some("-40")), 0);
    }

    #[test]
    fn parallax_speed_defaults_when_missing_or_bad() {
        assert_eq!(parallax_speed(Some("0.25")), 0.25);
        assert_eq!(parallax_speed(Some("")), config::DEFAULT_PARALLAX_SPEED);
        assert_eq!(parallax_speed(Some("fast")), config::DEFAULT_PARALLAX_SPEED);
        assert_eq!(parallax_speed(Some("NaN")), config::DEFAULT_PARALLAX_SPEED);
        assert_eq!(parallax_speed(None), config::DEFAULT_PARALLAX_SPEED);
    }

    #[test]
    fn parallax_moves_with_scroll() {
        assert_eq!(parallax_transform(0.0, 0.5), "translate3d(0, 0px, 0)");
        assert_eq!(parallax_transform(300.0, 0.5), "translate3d(0, 150px, 0)");
        assert_eq!(parallax_transform(100.0, -0.2), "translate3d(0, -20px, 0)");
    }
}
