//! Runtime capability probe: form factor and orientation-event support.
//!
//! The probe reads only the viewport width and touch support; it never
//! parses the user agent. Detection of the permission-gating API inspects
//! the constructor reflectively without calling it.

use js_sys::Reflect;
use wasm_bindgen::JsValue;

use katamuki_core::DeviceProfile;

pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;
pub const TABLET_BREAKPOINT_PX: f64 = 1024.0;

const ORIENTATION_EVENT_GLOBAL: &str = "DeviceOrientationEvent";
const REQUEST_PERMISSION_KEY: &str = "requestPermission";

/// Classifies the current runtime. Outside a browser window everything
/// reads false, which leaves the card inert rather than failing.
pub fn probe_device() -> DeviceProfile {
    let Some(window) = web_sys::window() else {
        return DeviceProfile::default();
    };
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let has_touch = window.navigator().max_touch_points() > 0
        || Reflect::has(&window, &JsValue::from_str("ontouchstart")).unwrap_or(false);
    DeviceProfile {
        is_mobile: has_touch && width < MOBILE_BREAKPOINT_PX,
        is_tablet: has_touch && width >= MOBILE_BREAKPOINT_PX && width < TABLET_BREAKPOINT_PX,
        has_orientation: orientation_supported(),
    }
}

/// Whether the global orientation event type exists at all.
pub fn orientation_supported() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    Reflect::has(&window, &JsValue::from_str(ORIENTATION_EVENT_GLOBAL)).unwrap_or(false)
}

/// Whether the platform gates orientation events behind an explicit
/// user-triggered permission request.
pub fn permission_gated() -> bool {
    let Some(constructor) = orientation_constructor() else {
        return false;
    };
    Reflect::get(&constructor, &JsValue::from_str(REQUEST_PERMISSION_KEY))
        .map(|value| value.is_function())
        .unwrap_or(false)
}

pub(crate) fn orientation_constructor() -> Option<JsValue> {
    let window = web_sys::window()?;
    let constructor =
        Reflect::get(&window, &JsValue::from_str(ORIENTATION_EVENT_GLOBAL)).ok()?;
    if constructor.is_undefined() || constructor.is_null() {
        None
    } else {
        Some(constructor)
    }
}
