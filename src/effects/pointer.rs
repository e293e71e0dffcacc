use wasm_bindgen::JsValue;
use web_sys::{DomRect, HtmlElement, MouseEvent};

use crate::config;
use crate::dom;

const MAGNETIC_PULL: f64 = 0.1;
const TILT_DAMPING: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl From<DomRect> for Bounds {
    fn from(rect: DomRect) -> Self {
        Self {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        }
    }
}

/// Nudges a button a tenth of the way toward the cursor.
pub fn magnetic_transform(bounds: Bounds, client_x: f64, client_y: f64) -> String {
    let x = client_x - bounds.left - bounds.width / 2.0;
    let y = client_y - bounds.top - bounds.height / 2.0;
    format!(
        "translateY(-2px) translate({}px, {}px)",
        x * MAGNETIC_PULL,
        y * MAGNETIC_PULL
    )
}

pub fn tilt_transform(bounds: Bounds, client_x: f64, client_y: f64) -> String {
    let x = client_x - bounds.left;
    let y = client_y - bounds.top;
    let rotate_x = (y - bounds.height / 2.0) / TILT_DAMPING;
    let rotate_y = (bounds.width / 2.0 - x) / TILT_DAMPING;
    format!(
        "perspective(1000px) rotateX({rotate_x}deg) rotateY({rotate_y}deg) translateY(-6px)"
    )
}

fn follow_pointer(
    elements: Vec<HtmlElement>,
    transform: fn(Bounds, f64, f64) -> String,
) -> Result<(), JsValue> {
    for element in elements {
        let moving = element.clone();
        dom::listen(&element, "mousemove", move |e: MouseEvent| {
            let bounds = Bounds::from(moving.get_bounding_client_rect());
            let value = transform(bounds, f64::from(e.client_x()), f64::from(e.client_y()));
            let _ = moving.style().set_property("transform", &value);
        })?;

        let leaving = element.clone();
        dom::listen(&element, "mouseleave", move |_: MouseEvent| {
            let _ = leaving.style().remove_property("transform");
        })?;
    }
    Ok(())
}

pub fn mount_magnetic_buttons() -> Result<(), JsValue> {
    follow_pointer(dom::query_all(config::CTA_SELECTOR), magnetic_transform)
}

/// Desktop only; narrow viewports keep cards flat.
pub fn mount_card_tilt() -> Result<(), JsValue> {
    let Some(window) = web_sys::window() else {
        return Ok(());
    };
    let (width, _) = dom::viewport_size(&window);
    if width < config::TILT_MIN_VIEWPORT_WIDTH {
        return Ok(());
    }
    follow_pointer(dom::query_all(".tool-card, .feature-card"), tilt_transform)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: Bounds = Bounds {
        left: 100.0,
        top: 50.0,
        width: 200.0,
        height: 100.0,
    };

    #[test]
    fn magnetic_button_rests_when_cursor_is_centered() {
        assert_eq!(
            magnetic_transform(CARD, 200.0, 100.0),
            "translateY(-2px) translate(0px, 0px)"
        );
    }

    #[test]
    fn magnetic_button_leans_toward_cursor() {
        assert_eq!(
            magnetic_transform(CARD, 300.0, 150.0),
            "translateY(-2px) translate(10px, 5px)"
        );
        assert_eq!(
            magnetic_transform(CARD, 100.0, 50.0),
            "translateY(-2px) translate(-10px, -5px)"
        );
    }

    #[test]
    fn tilt_is_flat_at_center() {
        assert_eq!(
            tilt_transform(CARD, 200.0, 100.0),
            "perspective(1000px) rotateX(0deg) rotateY(0deg) translateY(-6px)"
        );
    }

    #[test]
    fn tilt_follows_corner() {
        // top-left, then bottom-right
        assert_eq!(
            tilt_transform(CARD, 100.0, 50.0),
            "perspective(1000px) rotateX(-2.5deg) rotateY(5deg) translateY(-6px)"
        );
        assert_eq!(
            tilt_transform(CARD, 300.0, 150.0),
            "perspective(1000px) rotateX(2.5deg) rotateY(-5deg) translateY(-6px)"
        );
    }
}
