use log::warn;
use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::{Element, MouseEvent};

use crate::config;
use crate::dom;

const UNKNOWN_TOOL: &str = "Unknown";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalyticsEvent {
    CtaClick { text: String },
    ToolLinkClick { tool: String },
    ToolDetailsOpen { tool: String },
}

impl AnalyticsEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CtaClick { .. } => "CTA Click",
            Self::ToolLinkClick { .. } => "Tool Link Click",
            Self::ToolDetailsOpen { .. } => "Tool Details Open",
        }
    }

    pub fn tool_link_click(tool: &str) -> Self {
        Self::ToolLinkClick {
            tool: tool_label(tool),
        }
    }

    pub fn label(&self) -> String {
        format!("[Analytics] {}:", self.name())
    }
}

pub fn log_event(event: &AnalyticsEvent) {
    match serde_wasm_bindgen::to_value(event) {
        Ok(payload) => gloo_console::log!(event.label(), payload),
        Err(err) => warn!("Could not serialize analytics event {}: {}", event.name(), err),
    }
}

fn tool_label(name: &str) -> String {
    match name.trim() {
        "" => UNKNOWN_TOOL.to_string(),
        name => name.to_string(),
    }
}

/// Name shown on the `.tool-card` around `element`.
fn tool_name(element: &Element) -> String {
    let name = element
        .closest(config::TOOL_CARD_SELECTOR)
        .ok()
        .flatten()
        .and_then(|card| dom::text_within(&card, ".tool-name"))
        .unwrap_or_default();
    tool_label(&name)
}

fn track<F>(selector: &str, build: F) -> Result<(), JsValue>
where
    F: Fn(&Element) -> AnalyticsEvent + Clone + 'static,
{
    for element in dom::query_all(selector) {
        let build = build.clone();
        let source = element.clone();
        dom::listen(&element, "click", move |_: MouseEvent| {
            log_event(&build(&source));
        })?;
    }
    Ok(())
}

pub fn mount() -> Result<(), JsValue> {
    track(config::CTA_SELECTOR, |button| AnalyticsEvent::CtaClick {
        text: button.text_content().unwrap_or_default().trim().to_string(),
    })?;
    track(".tool-link", |link| AnalyticsEvent::tool_link_click(&tool_name(link)))?;
    track(config::DETAILS_BUTTON_SELECTOR, |button| {
        AnalyticsEvent::ToolDetailsOpen {
            tool: tool_name(button),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_carry_their_display_names() {
        let cta = AnalyticsEvent::CtaClick { text: "Get started".into() };
        assert_eq!(cta.name(), "CTA Click");
        assert_eq!(cta.label(), "[Analytics] CTA Click:");

        let link = AnalyticsEvent::ToolLinkClick { tool: "Notes".into() };
        assert_eq!(link.label(), "[Analytics] Tool Link Click:");
    }

    #[test]
    fn tool_link_click_falls_back_to_unknown() {
        assert_eq!(
            AnalyticsEvent::tool_link_click(" Notes "),
            AnalyticsEvent::ToolLinkClick { tool: "Notes".into() }
        );
        assert_eq!(
            AnalyticsEvent::tool_link_click(""),
            AnalyticsEvent::ToolLinkClick { tool: UNKNOWN_TOOL.into() }
        );
    }

    #[test]
    fn payload_is_a_flat_object() {
        let cta = AnalyticsEvent::CtaClick { text: "Get started".into() };
        assert_eq!(serde_json::to_value(&cta).unwrap(), json!({ "text": "Get started" }));

        let open = AnalyticsEvent::ToolDetailsOpen { tool: UNKNOWN_TOOL.into() };
        assert_eq!(serde_json::to_value(&open).unwrap(), json!({ "tool": "Unknown" }));
    }
}
