use wasm_bindgen::JsValue;
use web_sys::{KeyboardEvent, MouseEvent};

use crate::components::tool_modal::{ModalController, ToolDetails};
use crate::config;
use crate::dom;

pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

/// Makes tool cards reachable and operable from the keyboard, closes the
/// modal on Escape and marks keyboard users with a `keyboard-nav` body class.
pub fn mount(modal: &ModalController) -> Result<(), JsValue> {
    for card in dom::query_all(config::TOOL_CARD_SELECTOR) {
        card.set_tab_index(0);

        let target = card.clone();
        let modal = modal.clone();
        dom::listen(&card, "keydown", move |e: KeyboardEvent| {
            if !is_activation_key(&e.key()) {
                return;
            }
            // Leave keys pressed on links and buttons inside the card alone.
            let pressed_on_card = dom::event_element(&e).map_or(false, |el| el == *target);
            if !pressed_on_card {
                return;
            }

            if modal.is_mounted() {
                e.prevent_default();
                modal.open(ToolDetails::from_card(&target), Some(target.clone()));
            } else if let Some(link) = dom::query_within(&target, ".tool-link-primary") {
                e.prevent_default();
                link.click();
            }
        })?;
    }

    let Some(window) = web_sys::window() else {
        return Ok(());
    };
    let body = dom::document().and_then(|d| d.body());

    {
        let modal = modal.clone();
        let body = body.clone();
        dom::listen(&window, "keydown", move |e: KeyboardEvent| match e.key().as_str() {
            "Escape" if modal.is_open() => modal.close(),
            "Tab" => {
                if let Some(body) = &body {
                    let _ = body.class_list().add_1("keyboard-nav");
                }
            }
            _ => {}
        })?;
    }

    dom::listen(&window, "mousedown", move |_: MouseEvent| {
        if let Some(body) = &body {
            let _ = body.class_list().remove_1("keyboard-nav");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::is_activation_key;

    #[test]
    fn enter_and_space_activate() {
        assert!(is_activation_key("Enter"));
        assert!(is_activation_key(" "));
    }

    #[test]
    fn other_keys_do_not_activate() {
        for key in ["Tab", "Escape", "Spacebar", "a", "ArrowDown", ""] {
            assert!(!is_activation_key(key), "{key:?} should not activate");
        }
    }
}
