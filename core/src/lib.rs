pub mod animation;
pub mod engine;
pub mod normalize;
pub mod orientation;

pub use animation::{
    ease_in_out_cubic, ReturnSession, RETURN_DURATION_MS, SETTLE_DURATION_MS, SETTLE_X_OFFSET_PX,
    SETTLE_Y_OFFSET_PX,
};
pub use engine::{DeviceProfile, EngineEffect, EngineMode, InputSource, TiltEngine, TiltOptions};
pub use normalize::{derive_tilt, percent_from_normalized, percent_from_pointer, TiltParameters};
pub use orientation::{
    orientation_vector, OrientationAngles, OrientationVector, PermissionGate, PermissionState,
    RequestDisposition,
};
