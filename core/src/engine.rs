//! The tilt engine: selects the authoritative input source, funnels samples
//! through the normalizer, and decides when the return-to-center run starts
//! and stops. Scheduling side effects are expressed as [`EngineEffect`]
//! values so the DOM layer stays a thin executor.

use crate::animation::RETURN_DURATION_MS;
use crate::normalize::{derive_tilt, percent_from_normalized, percent_from_pointer, TiltParameters};
use crate::orientation::{OrientationVector, PermissionState};

/// Coarse form-factor and sensor capabilities, as reported by the probe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceProfile {
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub has_orientation: bool,
}

/// Host configuration for one card.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct TiltOptions {
    pub tilt_enabled: bool,
    pub orientation_enabled: bool,
    /// Multiplier applied to orientation-derived rotation only. Pointer
    /// rotation always runs at scale 1.
    pub sensitivity: f64,
}

impl TiltOptions {
    /// Replaces a non-positive or non-finite sensitivity with the default.
    pub fn sanitized(mut self) -> Self {
        if !(self.sensitivity.is_finite() && self.sensitivity > 0.0) {
            self.sensitivity = 1.0;
        }
        self
    }
}

impl Default for TiltOptions {
    fn default() -> Self {
        Self {
            tilt_enabled: true,
            orientation_enabled: false,
            sensitivity: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineMode {
    Idle,
    PointerActive,
    OrientationActive,
    Returning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSource {
    Pointer,
    Orientation,
}

/// Scheduling command for the host-side animator. The engine never issues
/// a `StartReturn` without the previous session being superseded, which
/// keeps exactly one session live.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EngineEffect {
    None,
    CancelReturn,
    StartReturn { duration_ms: f64, from: (f64, f64) },
}

pub struct TiltEngine {
    options: TiltOptions,
    profile: DeviceProfile,
    permission: PermissionState,
    mode: EngineMode,
    params: TiltParameters,
    active: bool,
}

impl TiltEngine {
    pub fn new(options: TiltOptions, profile: DeviceProfile) -> Self {
        Self {
            options: options.sanitized(),
            profile,
            permission: PermissionState::Unrequested,
            mode: EngineMode::Idle,
            params: TiltParameters::centered(),
            active: false,
        }
    }

    pub fn options(&self) -> TiltOptions {
        self.options
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    pub fn params(&self) -> TiltParameters {
        self.params
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn set_permission(&mut self, state: PermissionState) {
        self.permission = state;
    }

    /// Authority rule: orientation owns the card outright when it is enabled
    /// by configuration, the form factor is mobile or tablet, and the device
    /// exposes orientation events. Pointer listeners are never attached in
    /// that case, so the two sources cannot race.
    pub fn orientation_preferred(&self) -> bool {
        self.options.tilt_enabled
            && self.options.orientation_enabled
            && (self.profile.is_mobile || self.profile.is_tablet)
            && self.profile.has_orientation
    }

    /// Whether orientation samples actually drive the card right now.
    pub fn orientation_driving(&self) -> bool {
        self.orientation_preferred() && self.permission.allows_sampling()
    }

    pub fn pointer_listening(&self) -> bool {
        self.options.tilt_enabled && !self.orientation_preferred()
    }

    pub fn pointer_enter(&mut self) -> EngineEffect {
        let effect = if self.mode == EngineMode::Returning {
            EngineEffect::CancelReturn
        } else {
            EngineEffect::None
        };
        self.mode = EngineMode::PointerActive;
        self.active = true;
        effect
    }

    /// Applies one pointer sample. Geometry is re-read per event by the
    /// caller, so a reflowing card stays accurate.
    pub fn pointer_move(&mut self, offset_x: f64, offset_y: f64, width: f64, height: f64) {
        let percent = percent_from_pointer(offset_x, offset_y, width, height);
        self.mode = EngineMode::PointerActive;
        self.apply_percent(percent, 1.0);
    }

    /// The pointer left: the last offset becomes the return run's start.
    pub fn pointer_leave(
        &mut self,
        offset_x: f64,
        offset_y: f64,
        width: f64,
        height: f64,
    ) -> EngineEffect {
        let from = percent_from_pointer(offset_x, offset_y, width, height);
        self.mode = EngineMode::Returning;
        self.active = false;
        EngineEffect::StartReturn {
            duration_ms: RETURN_DURATION_MS,
            from,
        }
    }

    /// Applies one orientation sample. The Y axis is inverted so tilting the
    /// device forward tilts the card forward. Orientation tracks the device
    /// continuously; there is no return run while it is authoritative.
    pub fn orientation_sample(&mut self, vector: OrientationVector) -> EngineEffect {
        if !self.orientation_driving() {
            return EngineEffect::None;
        }
        let effect = if self.mode == EngineMode::Returning {
            EngineEffect::CancelReturn
        } else {
            EngineEffect::None
        };
        let percent = percent_from_normalized(vector.x, -vector.y);
        self.mode = EngineMode::OrientationActive;
        self.active = true;
        self.apply_percent(percent, self.options.sensitivity);
        effect
    }

    /// Entrance run from the fixed off-center pose to center. The start pose
    /// is applied immediately so the first painted frame already shows it.
    pub fn begin_settle(&mut self, from: (f64, f64), duration_ms: f64) -> EngineEffect {
        self.apply_percent(from, 1.0);
        self.mode = EngineMode::Returning;
        self.active = false;
        EngineEffect::StartReturn { duration_ms, from }
    }

    /// One animator tick. `done` retires the session and the engine goes
    /// idle; a tick landing after new input claimed the card is ignored.
    pub fn animation_tick(&mut self, percent: (f64, f64), done: bool) {
        if self.mode != EngineMode::Returning {
            return;
        }
        self.apply_percent(percent, 1.0);
        if done {
            self.mode = EngineMode::Idle;
        }
    }

    fn apply_percent(&mut self, percent: (f64, f64), multiplier: f64) {
        self.params = derive_tilt(percent.0, percent.1, multiplier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::OrientationVector;

    fn touch_profile() -> DeviceProfile {
        DeviceProfile {
            is_mobile: true,
            is_tablet: false,
            has_orientation: true,
        }
    }

    #[test]
    fn sanitize_rejects_non_positive_sensitivity() {
        let options = TiltOptions {
            sensitivity: 0.0,
            ..TiltOptions::default()
        };
        assert_eq!(options.sanitized().sensitivity, 1.0);
        let options = TiltOptions {
            sensitivity: f64::NAN,
            ..TiltOptions::default()
        };
        assert_eq!(options.sanitized().sensitivity, 1.0);
    }

    #[test]
    fn pointer_has_authority_on_desktop() {
        let engine = TiltEngine::new(
            TiltOptions {
                orientation_enabled: true,
                ..TiltOptions::default()
            },
            DeviceProfile::default(),
        );
        assert!(!engine.orientation_preferred());
        assert!(engine.pointer_listening());
    }

    #[test]
    fn orientation_takes_exclusive_authority_on_touch_devices() {
        let engine = TiltEngine::new(
            TiltOptions {
                orientation_enabled: true,
                ..TiltOptions::default()
            },
            touch_profile(),
        );
        assert!(engine.orientation_preferred());
        assert!(!engine.pointer_listening());
        // Driving still waits on the permission grant.
        assert!(!engine.orientation_driving());
    }

    #[test]
    fn disabled_tilt_listens_to_nothing() {
        let engine = TiltEngine::new(
            TiltOptions {
                tilt_enabled: false,
                orientation_enabled: true,
                ..TiltOptions::default()
            },
            touch_profile(),
        );
        assert!(!engine.pointer_listening());
        assert!(!engine.orientation_preferred());
    }

    #[test]
    fn enter_while_returning_cancels_the_run() {
        let mut engine = TiltEngine::new(TiltOptions::default(), DeviceProfile::default());
        let effect = engine.pointer_leave(150.0, 100.0, 300.0, 200.0);
        assert_eq!(
            effect,
            EngineEffect::StartReturn {
                duration_ms: RETURN_DURATION_MS,
                from: (50.0, 50.0),
            }
        );
        assert_eq!(engine.mode(), EngineMode::Returning);
        assert_eq!(engine.pointer_enter(), EngineEffect::CancelReturn);
        assert_eq!(engine.mode(), EngineMode::PointerActive);
        assert!(engine.active());
    }

    #[test]
    fn enter_from_idle_has_nothing_to_cancel() {
        let mut engine = TiltEngine::new(TiltOptions::default(), DeviceProfile::default());
        assert_eq!(engine.pointer_enter(), EngineEffect::None);
    }

    #[test]
    fn pointer_move_rederives_parameters() {
        let mut engine = TiltEngine::new(TiltOptions::default(), DeviceProfile::default());
        engine.pointer_enter();
        engine.pointer_move(0.0, 0.0, 300.0, 200.0);
        let params = engine.params();
        assert_eq!(params.rotate_x, 10.0);
        assert_eq!(params.rotate_y, -12.5);
    }

    #[test]
    fn orientation_sample_inverts_y_and_scales_by_sensitivity() {
        let mut engine = TiltEngine::new(
            TiltOptions {
                orientation_enabled: true,
                sensitivity: 2.0,
                ..TiltOptions::default()
            },
            touch_profile(),
        );
        engine.set_permission(PermissionState::Granted);
        let effect = engine.orientation_sample(OrientationVector {
            x: 1.0,
            y: 1.0,
            z: 0.0,
        });
        assert_eq!(effect, EngineEffect::None);
        assert_eq!(engine.mode(), EngineMode::OrientationActive);
        assert!(engine.active());
        let params = engine.params();
        // x=1 -> percent 100; y inverted to -1 -> percent 0.
        assert_eq!(params.pointer_x, 100.0);
        assert_eq!(params.pointer_y, 0.0);
        assert_eq!(params.rotate_x, -20.0);
        assert_eq!(params.rotate_y, -25.0);
    }

    #[test]
    fn orientation_sample_without_grant_is_ignored() {
        let mut engine = TiltEngine::new(
            TiltOptions {
                orientation_enabled: true,
                ..TiltOptions::default()
            },
            touch_profile(),
        );
        let before = engine.params();
        let effect = engine.orientation_sample(OrientationVector {
            x: 0.5,
            y: 0.5,
            z: 0.0,
        });
        assert_eq!(effect, EngineEffect::None);
        assert_eq!(engine.params(), before);
        assert_eq!(engine.mode(), EngineMode::Idle);
    }

    #[test]
    fn settle_applies_the_start_pose_immediately() {
        let mut engine = TiltEngine::new(TiltOptions::default(), DeviceProfile::default());
        let effect = engine.begin_settle((80.0, 30.0), 1500.0);
        assert_eq!(
            effect,
            EngineEffect::StartReturn {
                duration_ms: 1500.0,
                from: (80.0, 30.0),
            }
        );
        assert_eq!(engine.params().pointer_x, 80.0);
        assert_eq!(engine.mode(), EngineMode::Returning);
        assert!(!engine.active());
    }

    #[test]
    fn tick_after_new_input_is_ignored() {
        let mut engine = TiltEngine::new(TiltOptions::default(), DeviceProfile::default());
        engine.pointer_leave(0.0, 0.0, 300.0, 200.0);
        engine.pointer_enter();
        engine.pointer_move(150.0, 100.0, 300.0, 200.0);
        let before = engine.params();
        engine.animation_tick((10.0, 10.0), false);
        assert_eq!(engine.params(), before);
        assert_eq!(engine.mode(), EngineMode::PointerActive);
    }

    #[test]
    fn completed_tick_retires_to_idle() {
        let mut engine = TiltEngine::new(TiltOptions::default(), DeviceProfile::default());
        engine.pointer_leave(0.0, 0.0, 300.0, 200.0);
        engine.animation_tick((50.0, 50.0), true);
        assert_eq!(engine.mode(), EngineMode::Idle);
        assert_eq!(engine.params(), TiltParameters::centered());
    }
}
