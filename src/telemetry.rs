//! Observability hook for the tilt engine.
//!
//! The engine's control flow never logs directly; it emits structured
//! events through a thread-local hook the host may install. With no hook
//! installed, emission is free.

use std::cell::RefCell;
use std::rc::Rc;

use katamuki_core::{InputSource, PermissionState};

#[derive(Clone, Copy, Debug)]
pub enum TiltEvent {
    PermissionSettled { state: PermissionState },
    AuthoritySelected { source: InputSource },
    ReturnStarted { duration_ms: f64 },
    ReturnCanceled,
    ReturnCompleted,
}

thread_local! {
    static HOOK: RefCell<Option<Rc<dyn Fn(&TiltEvent)>>> = RefCell::new(None);
}

pub fn set_telemetry_hook(hook: Option<Rc<dyn Fn(&TiltEvent)>>) {
    HOOK.with(|slot| {
        *slot.borrow_mut() = hook;
    });
}

pub(crate) fn emit(event: TiltEvent) {
    HOOK.with(|slot| {
        if let Some(hook) = slot.borrow().as_ref() {
            hook(&event);
        }
    });
}

/// A hook that mirrors events to the browser console; installed by the demo
/// entry point in debug builds.
pub fn console_hook() -> Rc<dyn Fn(&TiltEvent)> {
    Rc::new(|event| {
        gloo::console::log!(format!("tilt: {event:?}"));
    })
}
