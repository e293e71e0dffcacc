use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info};
use serde::Deserialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement};
use yew::prelude::*;

use crate::analytics::{self, AnalyticsEvent};
use crate::config;
use crate::dom;
use crate::effects::scroll;

#[derive(Clone, Debug, PartialEq)]
pub struct ToolLink {
    pub label: String,
    pub href: String,
    pub primary: bool,
}

impl ToolLink {
    pub fn is_external(&self) -> bool {
        self.href.starts_with("http://") || self.href.starts_with("https://")
    }

    /// Id of the page section this link jumps to, if it is an in-page anchor.
    pub fn section(&self) -> Option<&str> {
        scroll::anchor_target(&self.href)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolDetails {
    pub name: String,
    pub description: String,
    pub features: Vec<String>,
    pub links: Vec<ToolLink>,
}

#[derive(Deserialize)]
#[serde(transparent)]
struct FeatureList(Vec<String>);

/// Reads the `data-features` JSON array. Malformed input yields no features.
pub fn parse_features(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|json| serde_json::from_str::<FeatureList>(json).ok())
        .map(|FeatureList(items)| {
            items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

impl ToolDetails {
    /// Event logged when one of this tool's links is followed from the modal.
    pub fn link_click_event(&self) -> AnalyticsEvent {
        AnalyticsEvent::tool_link_click(&self.name)
    }

    /// Collects what the modal shows from a `.tool-card`.
    pub fn from_card(card: &Element) -> Self {
        let links = card
            .query_selector_all(".tool-link")
            .ok()
            .map(|list| {
                (0..list.length())
                    .filter_map(|i| list.get(i))
                    .filter_map(|node| node.dyn_into::<Element>().ok())
                    .filter_map(|anchor| {
                        let href = anchor.get_attribute("href")?;
                        Some(ToolLink {
                            label: anchor.text_content().unwrap_or_default().trim().to_string(),
                            primary: anchor.class_list().contains("tool-link-primary"),
                            href,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: dom::text_within(card, ".tool-name").unwrap_or_default(),
            description: dom::text_within(card, ".tool-description").unwrap_or_default(),
            features: parse_features(card.get_attribute("data-features").as_deref()),
            links,
        }
    }
}

#[derive(Default)]
struct ControllerState {
    show: RefCell<Option<Callback<Option<ToolDetails>>>>,
    opener: RefCell<Option<HtmlElement>>,
    mounted: Cell<bool>,
    open: Cell<bool>,
}

/// Lets plain DOM listeners drive the Yew-rendered modal.
#[derive(Clone, Default)]
pub struct ModalController {
    state: Rc<ControllerState>,
}

impl PartialEq for ModalController {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl ModalController {
    pub fn is_mounted(&self) -> bool {
        self.state.mounted.get()
    }

    pub fn is_open(&self) -> bool {
        self.state.open.get()
    }

    /// Shows `details`; focus goes back to `opener` when the modal closes.
    pub fn open(&self, details: ToolDetails, opener: Option<HtmlElement>) {
        let Some(show) = self.state.show.borrow().clone() else {
            return;
        };
        debug!("Opening details for {}", details.name);
        *self.state.opener.borrow_mut() = opener;
        self.state.open.set(true);
        show.emit(Some(details));
    }

    pub fn close(&self) {
        if !self.state.open.replace(false) {
            return;
        }
        if let Some(show) = self.state.show.borrow().clone() {
            show.emit(None);
        }
        if let Some(opener) = self.state.opener.borrow_mut().take() {
            let _ = opener.focus();
        }
    }

    fn register(&self, show: Callback<Option<ToolDetails>>) {
        *self.state.show.borrow_mut() = Some(show);
    }

    fn unregister(&self) {
        self.state.show.borrow_mut().take();
        self.state.open.set(false);
    }
}

fn set_body_scroll_locked(locked: bool) {
    if let Some(body) = dom::document().and_then(|d| d.body()) {
        let style = body.style();
        let _ = if locked {
            style.set_property("overflow", "hidden")
        } else {
            style.remove_property("overflow").map(|_| ())
        };
    }
}

#[derive(Properties, PartialEq)]
pub struct ToolModalProps {
    pub controller: ModalController,
}

#[function_component(ToolModal)]
pub fn tool_modal(props: &ToolModalProps) -> Html {
    let details = use_state(|| None::<ToolDetails>);
    let close_ref = use_node_ref();

    {
        let details = details.clone();
        use_effect_with_deps(
            move |controller: &ModalController| {
                controller.register(Callback::from(move |next| details.set(next)));
                let controller = controller.clone();
                move || controller.unregister()
            },
            props.controller.clone(),
        );
    }

    {
        let close_ref = close_ref.clone();
        use_effect_with_deps(
            move |open: &bool| {
                set_body_scroll_locked(*open);
                if *open {
                    if let Some(button) = close_ref.cast::<HtmlElement>() {
                        let _ = button.focus();
                    }
                }
                || ()
            },
            details.is_some(),
        );
    }

    let on_close = {
        let controller = props.controller.clone();
        Callback::from(move |_: MouseEvent| controller.close())
    };

    // Only clicks on the backdrop itself close; clicks inside the dialog bubble here too.
    let on_backdrop = {
        let controller = props.controller.clone();
        Callback::from(move |e: MouseEvent| {
            if e.target() == e.current_target() {
                controller.close();
            }
        })
    };

    let Some(tool) = (*details).clone() else {
        return html! {};
    };

    html! {
        <div class="modal-overlay active" onclick={on_backdrop}>
            <div class="modal" role="dialog" aria-modal="true" aria-labelledby="tool-modal-title">
                <button
                    ref={close_ref}
                    class="modal-close"
                    aria-label="Close details"
                    onclick={on_close}
                >
                    {"×"}
                </button>
                <h2 id="tool-modal-title" class="modal-title">{tool.name.clone()}</h2>
                if !tool.description.is_empty() {
                    <p class="modal-description">{tool.description.clone()}</p>
                }
                if !tool.features.is_empty() {
                    <ul class="modal-features">
                        { for tool.features.iter().map(|feature| html! { <li>{feature.clone()}</li> }) }
                    </ul>
                }
                <div class="modal-links">
                    { for tool.links.iter().map(|link| {
                        let external = link.is_external();
                        let on_link = {
                            let controller = props.controller.clone();
                            let event = tool.link_click_event();
                            let section = link.section().map(str::to_string);
                            Callback::from(move |e: MouseEvent| {
                                analytics::log_event(&event);
                                if external {
                                    return;
                                }
                                if section.is_some() {
                                    e.prevent_default();
                                }
                                controller.close();
                                if let Some(id) = &section {
                                    scroll::scroll_to_section(id);
                                }
                            })
                        };
                        html! {
                            <a
                                class={classes!("modal-link", link.primary.then_some("modal-link-primary"))}
                                href={link.href.clone()}
                                target={external.then_some("_blank")}
                                rel={external.then_some("noopener noreferrer")}
                                onclick={on_link}
                            >
                                {link.label.clone()}
                            </a>
                        }
                    }) }
                </div>
            </div>
        </div>
    }
}

/// Renders the modal into `#tool-modal-root` and wires the card buttons.
pub fn mount(controller: &ModalController) -> Result<(), JsValue> {
    let Some(document) = dom::document() else {
        return Ok(());
    };
    let cards = dom::query_all(config::TOOL_CARD_SELECTOR);
    if cards.is_empty() {
        return Ok(());
    }

    let root = match document.get_element_by_id(config::MODAL_ROOT_ID) {
        Some(root) => root,
        None => {
            let root = document.create_element("div")?;
            root.set_id(config::MODAL_ROOT_ID);
            document
                .body()
                .ok_or_else(|| JsValue::from_str("document has no body"))?
                .append_child(&root)?;
            root
        }
    };

    yew::Renderer::<ToolModal>::with_root_and_props(
        root,
        ToolModalProps {
            controller: controller.clone(),
        },
    )
    .render();
    controller.state.mounted.set(true);

    for button in dom::query_all(config::DETAILS_BUTTON_SELECTOR) {
        let Some(card) = button.closest(config::TOOL_CARD_SELECTOR)? else {
            continue;
        };
        let controller = controller.clone();
        let opener = button.clone();
        dom::listen(&button, "click", move |e: web_sys::MouseEvent| {
            e.prevent_default();
            controller.open(ToolDetails::from_card(&card), Some(opener.clone()));
        })?;
    }

    info!("Tool details modal ready for {} cards", cards.len());
    Ok(())
}
