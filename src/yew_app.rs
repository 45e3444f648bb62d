//! Yew components for the tilt card: declarative markup around the
//! imperative [`CardView`] driver.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlImageElement, KeyboardEvent};
use yew::prelude::*;

use katamuki_core::{PermissionState, TiltOptions};

use crate::card_view::CardView;

#[derive(Properties, PartialEq)]
pub struct TiltCardProps {
    #[prop_or(AttrValue::Static("assets/avatar.jpg"))]
    pub avatar_url: AttrValue,
    #[prop_or_default]
    pub mini_avatar_url: Option<AttrValue>,
    #[prop_or(AttrValue::Static("Katamuki"))]
    pub name: AttrValue,
    #[prop_or(AttrValue::Static("Tilt card"))]
    pub title: AttrValue,
    #[prop_or(AttrValue::Static("katamuki"))]
    pub handle: AttrValue,
    #[prop_or(AttrValue::Static("Available"))]
    pub status: AttrValue,
    #[prop_or(AttrValue::Static("Contact"))]
    pub contact_text: AttrValue,
    #[prop_or(true)]
    pub show_user_info: bool,
    #[prop_or(true)]
    pub enable_tilt: bool,
    #[prop_or(false)]
    pub enable_orientation: bool,
    #[prop_or(1.0)]
    pub sensitivity: f64,
    #[prop_or_default]
    pub on_contact_click: Callback<()>,
}

#[function_component(TiltCard)]
pub fn tilt_card(props: &TiltCardProps) -> Html {
    let wrap_ref = use_node_ref();
    let card_ref = use_node_ref();
    let view_handle = use_mut_ref(|| None::<Rc<CardView>>);
    let permission = use_state(|| PermissionState::Unrequested);

    {
        let wrap_ref = wrap_ref.clone();
        let card_ref = card_ref.clone();
        let view_handle = Rc::clone(&view_handle);
        let permission = permission.clone();
        use_effect_with(
            (
                props.enable_tilt,
                props.enable_orientation,
                props.sensitivity,
            ),
            move |(enable_tilt, enable_orientation, sensitivity)| {
                let options = TiltOptions {
                    tilt_enabled: *enable_tilt,
                    orientation_enabled: *enable_orientation,
                    sensitivity: *sensitivity,
                };
                let view = match (
                    wrap_ref.cast::<HtmlElement>(),
                    card_ref.cast::<HtmlElement>(),
                ) {
                    (Some(wrap), Some(card)) => {
                        let on_permission: Rc<dyn Fn(PermissionState)> =
                            Rc::new(move |state| permission.set(state));
                        Some(CardView::mount(wrap, card, options, Some(on_permission)))
                    }
                    _ => None,
                };
                *view_handle.borrow_mut() = view;
                let view_handle = Rc::clone(&view_handle);
                move || {
                    if let Some(view) = view_handle.borrow_mut().take() {
                        view.unmount();
                    }
                }
            },
        );
    }

    let on_contact = {
        let on_contact_click = props.on_contact_click.clone();
        Callback::from(move |_: MouseEvent| on_contact_click.emit(()))
    };
    let on_contact_key = {
        let on_contact_click = props.on_contact_click.clone();
        Callback::from(move |event: KeyboardEvent| {
            if event.key() == "Enter" || event.key() == " " {
                event.prevent_default();
                on_contact_click.emit(());
            }
        })
    };
    let hide_on_error = Callback::from(|event: Event| {
        if let Some(target) = event
            .target()
            .and_then(|target| target.dyn_into::<HtmlImageElement>().ok())
        {
            let _ = target.style().set_property("display", "none");
        }
    });
    // A broken mini avatar dims and falls back to the main avatar instead
    // of disappearing.
    let mini_avatar_fallback = {
        let avatar_url = props.avatar_url.clone();
        Callback::from(move |event: Event| {
            if let Some(target) = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlImageElement>().ok())
            {
                let _ = target.style().set_property("opacity", "0.5");
                target.set_src(&avatar_url);
            }
        })
    };

    let enable_affordance = enable_tilt_affordance(props, &view_handle, *permission);

    let mini_avatar = props
        .mini_avatar_url
        .clone()
        .unwrap_or_else(|| props.avatar_url.clone());

    html! {
        <div ref={wrap_ref} class="pc-card-wrapper">
            <section ref={card_ref} class="pc-card">
                <div class="pc-inside">
                    <div class="pc-shine" />
                    <div class="pc-glare" />
                    <div class="pc-content pc-avatar-content">
                        <img
                            class="avatar"
                            src={props.avatar_url.clone()}
                            alt={format!("{} avatar", props.name)}
                            loading="lazy"
                            onerror={hide_on_error}
                        />
                        if props.show_user_info {
                            <div class="pc-user-info">
                                <div class="pc-user-details">
                                    <div class="pc-mini-avatar">
                                        <img
                                            src={mini_avatar}
                                            alt={format!("{} mini avatar", props.name)}
                                            loading="lazy"
                                            onerror={mini_avatar_fallback}
                                        />
                                    </div>
                                    <div class="pc-user-text">
                                        <div class="pc-handle">{format!("@{}", props.handle)}</div>
                                        <div class="pc-status">{props.status.clone()}</div>
                                    </div>
                                </div>
                                <div class="pc-actions">
                                    <button
                                        class="pc-contact-btn"
                                        type="button"
                                        aria-label={format!("Contact {}", props.name)}
                                        tabindex="0"
                                        onclick={on_contact}
                                        onkeydown={on_contact_key}
                                    >
                                        {props.contact_text.clone()}
                                    </button>
                                </div>
                            </div>
                        }
                        {enable_affordance}
                    </div>
                    <div class="pc-content">
                        <div class="pc-details">
                            <h3>{props.name.clone()}</h3>
                            <p>{props.title.clone()}</p>
                        </div>
                    </div>
                </div>
            </section>
        </div>
    }
}

/// The explicit "enable tilt" button, shown only while a gated platform has
/// not yet been asked for orientation permission.
fn enable_tilt_affordance(
    props: &TiltCardProps,
    view_handle: &Rc<RefCell<Option<Rc<CardView>>>>,
    permission: PermissionState,
) -> Html {
    if !props.enable_orientation || permission != PermissionState::Unrequested {
        return Html::default();
    }
    let view_handle = Rc::clone(view_handle);
    let onclick = Callback::from(move |_: MouseEvent| {
        if let Some(view) = view_handle.borrow().as_ref() {
            view.request_orientation_permission();
        }
    });
    html! {
        <div class="pc-enable-tilt">
            <button type="button" {onclick}>{"Enable Tilt"}</button>
            <div class="pc-enable-tilt-hint">{"Tap to enable motion"}</div>
        </div>
    }
}

/// Demo host: one card with default content.
#[function_component(App)]
pub fn app() -> Html {
    html! {
        <main class="demo-page">
            <TiltCard enable_orientation={true} />
        </main>
    }
}
