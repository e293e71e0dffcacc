use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement};

use crate::config;
use crate::dom;

pub fn ease_out_cubic(progress: f64) -> f64 {
    1.0 - (1.0 - progress).powi(3)
}

/// Value to show `elapsed` ms into the count-up, and whether it is done.
/// The last frame always lands exactly on `target`.
pub fn counter_value(target: i64, elapsed: f64, duration: f64) -> (i64, bool) {
    let progress = if duration > 0.0 {
        (elapsed / duration).clamp(0.0, 1.0)
    } else {
        1.0
    };
    if progress >= 1.0 {
        return (target, true);
    }
    ((target as f64 * ease_out_cubic(progress)).floor() as i64, false)
}

pub fn counter_text(value: i64, suffix: &str) -> String {
    format!("{value}{suffix}")
}

/// Remembers which items were already handled.
#[derive(Debug)]
pub struct AnimatedSet<T> {
    seen: Vec<T>,
}

impl<T: PartialEq> AnimatedSet<T> {
    pub fn new() -> Self {
        Self { seen: Vec::new() }
    }

    /// `true` the first time `item` is offered, `false` afterwards.
    pub fn insert(&mut self, item: T) -> bool {
        if self.seen.contains(&item) {
            return false;
        }
        self.seen.push(item);
        true
    }
}

impl<T: PartialEq> Default for AnimatedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts `[data-count]` elements up from zero once each, when half visible.
pub fn mount() -> Result<(), JsValue> {
    let counters = dom::query_all("[data-count]");
    if counters.is_empty() {
        return Ok(());
    }

    let animated = Rc::new(RefCell::new(AnimatedSet::<Element>::new()));
    let observer = dom::observe_visibility(config::COUNTER_THRESHOLD, None, move |target, observer| {
        if !animated.borrow_mut().insert(target.clone()) {
            return;
        }
        observer.unobserve(&target);
        if let Ok(element) = target.dyn_into::<HtmlElement>() {
            animate(element);
        }
    })?;

    for counter in &counters {
        observer.observe(counter);
    }
    Ok(())
}

fn animate(element: HtmlElement) {
    let Some(target) = element
        .get_attribute("data-count")
        .as_deref()
        .and_then(dom::parse_int_prefix)
    else {
        debug!("Ignoring counter without a numeric data-count");
        return;
    };
    let suffix = element.get_attribute("data-suffix").unwrap_or_default();
    let show = move |element: &HtmlElement, value: i64| {
        element.set_text_content(Some(&counter_text(value, &suffix)));
    };

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(start) = window.performance().map(|p| p.now()) else {
        show(&element, target);
        return;
    };

    let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let handle = frame.clone();
    let frame_window = window.clone();
    *frame.borrow_mut() = Some(Closure::new(move |now: f64| {
        let (value, done) = counter_value(target, now - start, config::COUNTER_DURATION_MS);
        show(&element, value);
        if done {
            // Dropping the closure mid-call is deferred until it returns.
            handle.borrow_mut().take();
            return;
        }
        if let Some(next) = handle.borrow().as_ref() {
            let _ = frame_window.request_animation_frame(next.as_ref().unchecked_ref());
        }
    }));

    if let Some(first) = frame.borrow().as_ref() {
        let _ = window.request_animation_frame(first.as_ref().unchecked_ref());
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn easing_front_loads_progress() {
        assert!(ease_out_cubic(0.25) > 0.25);
        let samples: Vec<f64> = (0..=10).map(|i| ease_out_cubic(i as f64 / 10.0)).collect();
        assert!(samples.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn counter_starts_at_zero_and_ends_on_target() {
        assert_eq!(counter_value(500, 0.0, 1500.0), (0, false));
        assert_eq!(counter_value(500, 750.0, 1500.0), (437, false));
        assert_eq!(counter_value(500, 1500.0, 1500.0), (500, true));
        assert_eq!(counter_value(500, 9000.0, 1500.0), (500, true));
    }

    #[test]
    fn counter_never_overshoots() {
        for ms in (0..1500).step_by(16) {
            let (value, done) = counter_value(1234, ms as f64, 1500.0);
            assert!(value <= 1234);
            assert!(!done);
        }
    }

    #[test]
    fn counter_text_appends_the_suffix() {
        assert_eq!(counter_text(12, ""), "12");
        assert_eq!(counter_text(0, "+"), "0+");
        assert_eq!(counter_text(99, "%"), "99%");
    }

    #[test]
    fn final_frame_shows_the_exact_target_with_suffix() {
        let (value, done) = counter_value(2400, 1500.0, 1500.0);
        assert!(done);
        assert_eq!(counter_text(value, "+"), "2400+");

        let (value, done) = counter_value(2400, 1499.0, 1500.0);
        assert!(!done);
        assert_ne!(counter_text(value, "+"), "2400+");
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        assert_eq!(counter_value(42, 0.0, 0.0), (42, true));
    }

    #[test]
    fn animated_set_admits_each_item_once() {
        let mut set = AnimatedSet::new();
        assert!(set.insert("users"));
        assert!(set.insert("tools"));
        assert!(!set.insert("users"));
        assert!(!set.insert("tools"));
    }
}
