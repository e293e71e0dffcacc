use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, NodeList, Storage, Window,
};

use crate::config;

pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

pub fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn media_matches(query: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.match_media(query).ok().flatten())
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

pub fn prefers_reduced_motion() -> bool {
    media_matches(config::REDUCED_MOTION_QUERY)
}

pub fn viewport_size(window: &Window) -> (f64, f64) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (width, height)
}

fn collect_html(list: NodeList) -> Vec<HtmlElement> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

/// Every `HtmlElement` in the document matching `selector`.
pub fn query_all(selector: &str) -> Vec<HtmlElement> {
    document()
        .and_then(|d| d.query_selector_all(selector).ok())
        .map(collect_html)
        .unwrap_or_default()
}

pub fn query_within(root: &Element, selector: &str) -> Option<HtmlElement> {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// Trimmed text of the first `selector` match under `root`.
pub fn text_within(root: &Element, selector: &str) -> Option<String> {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.text_content())
        .map(|text| text.trim().to_string())
}

pub fn event_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

/// Attach `handler` to `target` for the rest of the page session.
pub fn listen<E, F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Runs `handler` at most once per animation frame while the window scrolls.
pub fn on_scroll_frame<F>(window: &Window, mut handler: F) -> Result<(), JsValue>
where
    F: FnMut() + 'static,
{
    let ticking = Rc::new(Cell::new(false));
    let frame = {
        let ticking = ticking.clone();
        Closure::<dyn FnMut()>::new(move || {
            ticking.set(false);
            handler();
        })
    };

    let scroll_window = window.clone();
    listen(window, "scroll", move |_: Event| {
        if ticking.replace(true) {
            return;
        }
        if scroll_window
            .request_animation_frame(frame.as_ref().unchecked_ref())
            .is_err()
        {
            ticking.set(false);
        }
    })
}

/// Builds an observer that calls `on_visible` for every entry that starts
/// intersecting. The observer is passed along so callers can unobserve.
pub fn observe_visibility<F>(
    threshold: f64,
    root_margin: Option<&str>,
    mut on_visible: F,
) -> Result<IntersectionObserver, JsValue>
where
    F: FnMut(Element, &IntersectionObserver) + 'static,
{
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                if entry.is_intersecting() {
                    on_visible(entry.target(), &observer);
                }
            }
        },
    );

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    if let Some(margin) = root_margin {
        options.set_root_margin(margin);
    }

    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    callback.forget();
    Ok(observer)
}

/// Parses a leading integer the way the page's data attributes are
/// written (`"300"`, `"50+"`, `" -12px"`). Anything else is `None`.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::parse_int_prefix;

    #[test]
    fn parses_plain_and_signed_integers() {
        assert_eq!(parse_int_prefix("300"), Some(300));
        assert_eq!(parse_int_prefix("-12"), Some(-12));
        assert_eq!(parse_int_prefix("+7"), Some(7));
        assert_eq!(parse_int_prefix("  42"), Some(42));
    }

    #[test]
    fn stops_at_first_non_digit() {
        assert_eq!(parse_int_prefix("50+"), Some(50));
        assert_eq!(parse_int_prefix("200ms"), Some(200));
        assert_eq!(parse_int_prefix("1,200"), Some(1));
    }

    #[test]
    fn rejects_text_without_leading_digits() {
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("px12"), None);
    }
}
