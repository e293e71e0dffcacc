use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlElement, MediaQueryListEvent, MouseEvent};
use yew::Callback;

use crate::config;
use crate::dom;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn toggle_label(self) -> String {
        format!("Switch to {} theme", self.toggled().as_str())
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// A stored preference wins; otherwise follow the system colour scheme.
pub fn resolve_initial(stored: Option<Theme>, system_prefers_dark: bool) -> Theme {
    stored.unwrap_or_else(|| Theme::from_system(system_prefers_dark))
}

fn stored_preference() -> Option<Theme> {
    let value = dom::local_storage()?
        .get_item(config::THEME_STORAGE_KEY)
        .ok()
        .flatten()?;
    Theme::parse(&value)
}

fn persist(theme: Theme) {
    if let Some(storage) = dom::local_storage() {
        if let Err(err) = storage.set_item(config::THEME_STORAGE_KEY, theme.as_str()) {
            debug!("Could not persist theme preference: {:?}", err);
        }
    }
}

/// Owns the `data-theme` attribute on `<html>` and the toggle button.
#[derive(Clone)]
pub struct ThemeManager {
    current: Rc<Cell<Theme>>,
    toggle: Option<HtmlElement>,
    listeners: Rc<RefCell<Vec<Callback<Theme>>>>,
}

impl ThemeManager {
    pub fn mount() -> Result<Self, JsValue> {
        let initial = resolve_initial(
            stored_preference(),
            dom::media_matches(config::DARK_SCHEME_QUERY),
        );

        let toggle = dom::document()
            .and_then(|d| d.get_element_by_id("theme-toggle"))
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        let manager = Self {
            current: Rc::new(Cell::new(initial)),
            toggle,
            listeners: Rc::new(RefCell::new(Vec::new())),
        };
        manager.apply(initial);

        if let Some(button) = &manager.toggle {
            let manager = manager.clone();
            dom::listen(button, "click", move |_: MouseEvent| manager.toggle())?;
        }

        let scheme = web_sys::window()
            .and_then(|w| w.match_media(config::DARK_SCHEME_QUERY).ok().flatten());
        if let Some(scheme) = scheme {
            let manager = manager.clone();
            dom::listen(&scheme, "change", move |e: MediaQueryListEvent| {
                if stored_preference().is_none() {
                    debug!("System colour scheme changed, following it");
                    manager.apply(Theme::from_system(e.matches()));
                }
            })?;
        }

        info!("Theme initialized: {}", initial.as_str());
        Ok(manager)
    }

    pub fn current(&self) -> Theme {
        self.current.get()
    }

    /// Called with the new theme after every change.
    pub fn subscribe(&self, listener: Callback<Theme>) {
        self.listeners.borrow_mut().push(listener);
    }

    pub fn apply(&self, theme: Theme) {
        if let Some(root) = dom::document().and_then(|d| d.document_element()) {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
        if let Some(button) = &self.toggle {
            let _ = button.set_attribute("aria-pressed", &theme.is_dark().to_string());
            let _ = button.set_attribute("aria-label", &theme.toggle_label());
        }
        self.current.set(theme);

        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener.emit(theme);
        }
    }

    pub fn toggle(&self) {
        let next = self.current().toggled();
        self.apply(next);
        persist(next);
        debug!("Theme toggled to {}", next.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_preference_wins_over_system() {
        assert_eq!(resolve_initial(Some(Theme::Light), true), Theme::Light);
        assert_eq!(resolve_initial(Some(Theme::Dark), false), Theme::Dark);
    }

    #[test]
    fn falls_back_to_system_scheme() {
        assert_eq!(resolve_initial(None, true), Theme::Dark);
        assert_eq!(resolve_initial(None, false), Theme::Light);
    }

    #[test]
    fn unknown_stored_value_is_ignored() {
        assert_eq!(resolve_initial(Theme::parse("sepia"), true), Theme::Dark);
        assert_eq!(resolve_initial(Theme::parse(""), false), Theme::Light);
    }

    #[test]
    fn toggling_flips_and_labels_the_other_theme() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
        assert_eq!(Theme::Light.toggle_label(), "Switch to dark theme");
        assert_eq!(Theme::Dark.toggle_label(), "Switch to light theme");
    }

    #[test]
    fn string_forms_round_trip() {
        for theme in [Theme::Light, Theme::Dark] {
            assert_eq!(Theme::parse(theme.as_str()), Some(theme));
        }
    }
}
