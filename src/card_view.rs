//! Imperative DOM driver for one tilt card.
//!
//! Owns the engine, the scoped pointer listeners, the orientation
//! subscription, and the single animation-frame handle. All visual output
//! goes through [`CardView::apply_state`], which writes the derived
//! parameters as CSS custom properties on the wrapper element.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlElement, PointerEvent};

use katamuki_core::{
    EngineEffect, InputSource, OrientationVector, PermissionState, ReturnSession, TiltEngine,
    TiltOptions, SETTLE_DURATION_MS, SETTLE_X_OFFSET_PX, SETTLE_Y_OFFSET_PX,
};

use crate::capability;
use crate::orientation::OrientationSampler;
use crate::telemetry::{self, TiltEvent};

const CENTER_PERCENT: (f64, f64) = (50.0, 50.0);
const ACTIVE_CLASS: &str = "active";

type PermissionHook = Rc<dyn Fn(PermissionState)>;

struct AnimationState {
    session: Option<ReturnSession>,
    frame: Option<AnimationFrame>,
}

pub struct CardView {
    wrap: HtmlElement,
    card: HtmlElement,
    engine: RefCell<TiltEngine>,
    listeners: RefCell<Vec<EventListener>>,
    animation: RefCell<AnimationState>,
    sampler: Rc<OrientationSampler>,
    on_permission: RefCell<Option<PermissionHook>>,
}

impl CardView {
    pub fn mount(
        wrap: HtmlElement,
        card: HtmlElement,
        options: TiltOptions,
        on_permission: Option<PermissionHook>,
    ) -> Rc<Self> {
        let profile = capability::probe_device();
        let sampler = OrientationSampler::new();
        let mut engine = TiltEngine::new(options, profile);
        engine.set_permission(sampler.state());

        let view = Rc::new(Self {
            wrap,
            card,
            engine: RefCell::new(engine),
            listeners: RefCell::new(Vec::new()),
            animation: RefCell::new(AnimationState {
                session: None,
                frame: None,
            }),
            sampler,
            on_permission: RefCell::new(on_permission),
        });

        view.notify_permission(view.sampler.state());
        if view.engine.borrow().orientation_preferred() {
            telemetry::emit(TiltEvent::AuthoritySelected {
                source: InputSource::Orientation,
            });
            view.enable_orientation();
        } else if view.engine.borrow().pointer_listening() {
            telemetry::emit(TiltEvent::AuthoritySelected {
                source: InputSource::Pointer,
            });
            view.install_pointer_listeners();
            view.begin_settle();
        }
        view.apply_state();
        view
    }

    /// Releases every scoped resource: listeners, the orientation
    /// subscription, and any pending frame. Idempotent; also breaks the
    /// reference cycles the listener closures hold.
    pub fn unmount(&self) {
        self.listeners.borrow_mut().clear();
        self.sampler.unsubscribe();
        self.on_permission.borrow_mut().take();
        let mut animation = self.animation.borrow_mut();
        animation.session.take();
        animation.frame.take();
    }

    pub fn permission(&self) -> PermissionState {
        self.sampler.state()
    }

    /// User-triggered permission request, for the explicit enable affordance
    /// on gated platforms. Safe to invoke repeatedly.
    pub fn request_orientation_permission(self: &Rc<Self>) {
        let view = Rc::clone(self);
        spawn_local(async move {
            Rc::clone(&view.sampler).request_permission().await;
            let state = view.sampler.state();
            view.engine.borrow_mut().set_permission(state);
            view.notify_permission(state);
        });
    }

    fn enable_orientation(self: &Rc<Self>) {
        let view = Rc::clone(self);
        self.sampler.set_sink(Some(Rc::new(move |vector| {
            view.on_orientation_sample(vector);
        })));
        self.request_orientation_permission();
    }

    fn on_orientation_sample(self: &Rc<Self>, vector: OrientationVector) {
        let effect = self.engine.borrow_mut().orientation_sample(vector);
        self.apply_effect(effect);
        self.apply_state();
    }

    fn install_pointer_listeners(self: &Rc<Self>) {
        let mut listeners = Vec::new();

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.card, "pointerenter", move |_| {
            let effect = view.engine.borrow_mut().pointer_enter();
            view.apply_effect(effect);
            view.apply_state();
        }));

        let view = Rc::clone(self);
        let card = self.card.clone();
        listeners.push(EventListener::new(&self.card, "pointermove", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let (offset_x, offset_y, width, height) = pointer_geometry(&card, event);
            view.engine
                .borrow_mut()
                .pointer_move(offset_x, offset_y, width, height);
            view.apply_state();
        }));

        let view = Rc::clone(self);
        let card = self.card.clone();
        listeners.push(EventListener::new(&self.card, "pointerleave", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let (offset_x, offset_y, width, height) = pointer_geometry(&card, event);
            let effect = view
                .engine
                .borrow_mut()
                .pointer_leave(offset_x, offset_y, width, height);
            view.apply_effect(effect);
            view.apply_state();
        }));

        *self.listeners.borrow_mut() = listeners;
    }

    /// Entrance run: pose the card off-center, then ease it home over the
    /// long settle duration.
    fn begin_settle(self: &Rc<Self>) {
        let wrap_width = f64::from(self.wrap.client_width());
        let card_width = f64::from(self.card.client_width());
        let card_height = f64::from(self.card.client_height());
        let from = katamuki_core::percent_from_pointer(
            wrap_width - SETTLE_X_OFFSET_PX,
            SETTLE_Y_OFFSET_PX,
            card_width,
            card_height,
        );
        let effect = self.engine.borrow_mut().begin_settle(from, SETTLE_DURATION_MS);
        self.apply_effect(effect);
    }

    fn apply_effect(self: &Rc<Self>, effect: EngineEffect) {
        match effect {
            EngineEffect::None => {}
            EngineEffect::CancelReturn => self.cancel_return(),
            EngineEffect::StartReturn { duration_ms, from } => {
                self.start_return(duration_ms, from)
            }
        }
    }

    /// Stops the running session, if any. A no-op when idle.
    fn cancel_return(&self) {
        let mut animation = self.animation.borrow_mut();
        if animation.session.take().is_some() {
            telemetry::emit(TiltEvent::ReturnCanceled);
        }
        animation.frame.take();
    }

    /// Starts a session toward center. Replacing the session and frame in
    /// one borrow keeps the single-flight invariant: the superseded frame
    /// handle is dropped, so its callback never fires.
    fn start_return(self: &Rc<Self>, duration_ms: f64, from: (f64, f64)) {
        let session = ReturnSession::new(now_ms(), duration_ms, from, CENTER_PERCENT);
        {
            let mut animation = self.animation.borrow_mut();
            animation.session = Some(session);
            animation.frame.take();
        }
        telemetry::emit(TiltEvent::ReturnStarted { duration_ms });
        self.schedule_frame();
    }

    fn schedule_frame(self: &Rc<Self>) {
        let view = Rc::clone(self);
        let handle = request_animation_frame(move |timestamp| {
            view.animation_frame(timestamp);
        });
        self.animation.borrow_mut().frame = Some(handle);
    }

    fn animation_frame(self: &Rc<Self>, timestamp: f64) {
        let sample = {
            let mut animation = self.animation.borrow_mut();
            animation.frame.take();
            animation.session.map(|session| session.sample(timestamp))
        };
        let Some((percent, done)) = sample else {
            return;
        };
        self.engine.borrow_mut().animation_tick(percent, done);
        self.apply_state();
        if done {
            self.animation.borrow_mut().session.take();
            telemetry::emit(TiltEvent::ReturnCompleted);
        } else {
            self.schedule_frame();
        }
    }

    /// The single write point for visual state: one call per input sample or
    /// animation tick, so the rendering layer never sees a torn update.
    fn apply_state(&self) {
        let (params, active) = {
            let engine = self.engine.borrow();
            (engine.params(), engine.active())
        };
        let style = self.wrap.style();
        let properties = [
            ("--pointer-x", format!("{}%", params.pointer_x)),
            ("--pointer-y", format!("{}%", params.pointer_y)),
            ("--background-x", format!("{}%", params.background_x)),
            ("--background-y", format!("{}%", params.background_y)),
            (
                "--pointer-from-center",
                format!("{}", params.pointer_from_center),
            ),
            ("--pointer-from-top", format!("{}", params.pointer_from_top)),
            (
                "--pointer-from-left",
                format!("{}", params.pointer_from_left),
            ),
            ("--rotate-x", format!("{}deg", params.rotate_x)),
            ("--rotate-y", format!("{}deg", params.rotate_y)),
        ];
        for (name, value) in properties {
            let _ = style.set_property(name, &value);
        }
        for element in [&self.wrap, &self.card] {
            let class_list = element.class_list();
            let _ = if active {
                class_list.add_1(ACTIVE_CLASS)
            } else {
                class_list.remove_1(ACTIVE_CLASS)
            };
        }
    }

    fn notify_permission(&self, state: PermissionState) {
        if let Some(hook) = self.on_permission.borrow().clone() {
            hook(state);
        }
    }
}

/// Offsets relative to the card's bounding box, re-read per event so a
/// reflowed card stays accurate.
fn pointer_geometry(card: &HtmlElement, event: &PointerEvent) -> (f64, f64, f64, f64) {
    let rect = card.get_bounding_client_rect();
    (
        f64::from(event.client_x()) - rect.left(),
        f64::from(event.client_y()) - rect.top(),
        rect.width(),
        rect.height(),
    )
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or(0.0)
}
