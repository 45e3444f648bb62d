//! Device-orientation angle normalization and the permission state machine.

use std::fmt;

/// Native angle ranges per the platform event definition.
pub const ALPHA_RANGE_DEG: f64 = 360.0;
pub const BETA_RANGE_DEG: f64 = 180.0;
pub const GAMMA_RANGE_DEG: f64 = 90.0;

/// One raw sample as the platform delivers it. Any angle may be absent;
/// absent angles read as 0.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrientationAngles {
    /// Z-axis rotation, 0..360.
    pub alpha: Option<f64>,
    /// Front-to-back tilt, -180..180.
    pub beta: Option<f64>,
    /// Left-to-right tilt, -90..90.
    pub gamma: Option<f64>,
}

/// The normalized form of a sample: `x` and `y` clamped to [-1, 1].
/// `z` carries the alpha fraction, tracked but unused by tilt; reserved for
/// compass-style features.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrientationVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Converts raw angles into the shared normalized space.
pub fn orientation_vector(angles: OrientationAngles) -> OrientationVector {
    let alpha = angles.alpha.unwrap_or(0.0);
    let beta = angles.beta.unwrap_or(0.0);
    let gamma = angles.gamma.unwrap_or(0.0);
    OrientationVector {
        x: (gamma / GAMMA_RANGE_DEG).clamp(-1.0, 1.0),
        y: (beta / BETA_RANGE_DEG).clamp(-1.0, 1.0),
        z: alpha / ALPHA_RANGE_DEG,
    }
}

/// Where the platform permission stands. Once settled to anything but
/// `Unrequested`, the state is final for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    Unrequested,
    Granted,
    Denied,
    Unsupported,
}

impl PermissionState {
    pub fn is_settled(self) -> bool {
        self != PermissionState::Unrequested
    }

    /// True when orientation events may be subscribed.
    pub fn allows_sampling(self) -> bool {
        self == PermissionState::Granted
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PermissionState::Unrequested => "unrequested",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
            PermissionState::Unsupported => "unsupported",
        };
        f.write_str(label)
    }
}

/// What a caller of `begin_request` should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestDisposition {
    /// The state is final; answer from cache without touching the platform.
    UseCached(PermissionState),
    /// First request: ask the platform and feed the answer to `settle`.
    Prompt,
}

/// Single owner of the permission state. Enforces the never-re-prompt rule:
/// the platform is consulted at most once per session.
#[derive(Clone, Copy, Debug)]
pub struct PermissionGate {
    state: PermissionState,
}

impl PermissionGate {
    /// `supported` is whether the orientation event type exists at all;
    /// `gated` is whether the platform requires an explicit request. An
    /// ungated platform with support grants immediately.
    pub fn new(supported: bool, gated: bool) -> Self {
        let state = if !supported {
            PermissionState::Unsupported
        } else if !gated {
            PermissionState::Granted
        } else {
            PermissionState::Unrequested
        };
        Self { state }
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    pub fn begin_request(&self) -> RequestDisposition {
        if self.state.is_settled() {
            RequestDisposition::UseCached(self.state)
        } else {
            RequestDisposition::Prompt
        }
    }

    /// Records the platform's answer. Ignored once settled, so a late or
    /// duplicate resolution can never flip a final state.
    pub fn settle(&mut self, granted: bool) -> PermissionState {
        if !self.state.is_settled() {
            self.state = if granted {
                PermissionState::Granted
            } else {
                PermissionState::Denied
            };
        }
        self.state
    }
}
