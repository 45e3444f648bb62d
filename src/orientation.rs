//! Orientation sampler: owns the permission gate and the window-level
//! `deviceorientation` subscription, and converts raw angles into the
//! normalized input space.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::DeviceOrientationEvent;

use katamuki_core::{
    orientation_vector, OrientationAngles, OrientationVector, PermissionGate, PermissionState,
    RequestDisposition,
};

use crate::capability;
use crate::telemetry::{self, TiltEvent};

type SampleSink = Rc<dyn Fn(OrientationVector)>;

pub struct OrientationSampler {
    gate: RefCell<PermissionGate>,
    listener: RefCell<Option<EventListener>>,
    sink: RefCell<Option<SampleSink>>,
}

impl OrientationSampler {
    pub fn new() -> Rc<Self> {
        let gate = PermissionGate::new(
            capability::orientation_supported(),
            capability::permission_gated(),
        );
        Rc::new(Self {
            gate: RefCell::new(gate),
            listener: RefCell::new(None),
            sink: RefCell::new(None),
        })
    }

    pub fn state(&self) -> PermissionState {
        self.gate.borrow().state()
    }

    /// Registers the consumer of normalized samples. Passing `None` detaches
    /// the consumer but keeps the permission state.
    pub fn set_sink(&self, sink: Option<SampleSink>) {
        *self.sink.borrow_mut() = sink;
    }

    /// Requests the platform permission. Idempotent: once the state has
    /// settled, repeat calls answer from cache without re-prompting. Promise
    /// rejection and non-"granted" answers both settle as denied.
    pub async fn request_permission(self: Rc<Self>) -> bool {
        let disposition = self.gate.borrow().begin_request();
        let state = match disposition {
            RequestDisposition::UseCached(state) => state,
            RequestDisposition::Prompt => {
                let granted = prompt_platform().await;
                let state = self.gate.borrow_mut().settle(granted);
                telemetry::emit(TiltEvent::PermissionSettled { state });
                state
            }
        };
        if state.allows_sampling() {
            self.subscribe();
        }
        state.allows_sampling()
    }

    /// Attaches the capture-phase window listener. Harmless when already
    /// attached or when sampling is not permitted.
    pub fn subscribe(self: &Rc<Self>) {
        if self.listener.borrow().is_some() || !self.state().allows_sampling() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let sampler = Rc::clone(self);
        let listener = EventListener::new_with_options(
            &window,
            "deviceorientation",
            EventListenerOptions {
                phase: EventListenerPhase::Capture,
                passive: true,
            },
            move |event| {
                let Some(event) = event.dyn_ref::<DeviceOrientationEvent>() else {
                    return;
                };
                let angles = OrientationAngles {
                    alpha: event.alpha(),
                    beta: event.beta(),
                    gamma: event.gamma(),
                };
                let vector = orientation_vector(angles);
                if let Some(sink) = sampler.sink.borrow().clone() {
                    sink(vector);
                }
            },
        );
        *self.listener.borrow_mut() = Some(listener);
    }

    /// Drops the window listener and the sink. Safe to call repeatedly.
    pub fn unsubscribe(&self) {
        self.listener.borrow_mut().take();
        self.sink.borrow_mut().take();
    }
}

/// Calls the platform's gating API. Returns false on any failure path so a
/// rejected promise reads as a denial, never an error.
async fn prompt_platform() -> bool {
    let Some(constructor) = capability::orientation_constructor() else {
        return false;
    };
    let request = match Reflect::get(&constructor, &JsValue::from_str("requestPermission")) {
        Ok(value) => value,
        Err(_) => return false,
    };
    let Some(request) = request.dyn_ref::<Function>() else {
        // Supported but ungated; the gate grants this case up front, so
        // reaching here means the API vanished mid-session.
        return true;
    };
    let promise = match request.call0(&constructor) {
        Ok(value) => match value.dyn_into::<Promise>() {
            Ok(promise) => promise,
            Err(_) => return false,
        },
        Err(_) => return false,
    };
    match JsFuture::from(promise).await {
        Ok(answer) => answer.as_string().as_deref() == Some("granted"),
        Err(_) => false,
    }
}
