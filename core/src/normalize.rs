//! Shared percent coordinate space and tilt-parameter derivation.
//!
//! Both input adapters (pointer and device orientation) funnel through this
//! module before any visual parameter exists, so the derivation logic never
//! needs to know which source produced a sample.

/// Rotation feel constants. Empirically chosen; the X axis is deliberately
/// more sensitive than Y.
pub const ROTATE_X_DIVISOR: f64 = 5.0;
pub const ROTATE_Y_DIVISOR: f64 = 4.0;

/// Background travel range, narrower than the pointer range so the
/// background never clips at the card edges.
pub const BACKGROUND_MIN_PERCENT: f64 = 35.0;
pub const BACKGROUND_MAX_PERCENT: f64 = 65.0;

const CENTER_PERCENT: f64 = 50.0;

/// Rounds to three decimal digits so downstream equality checks stay stable
/// across repeated derivations.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Remaps `value` from one range to another, rounded. The input is not
/// clamped; callers clamp first where the spec requires it.
pub fn adjust(value: f64, from_min: f64, from_max: f64, to_min: f64, to_max: f64) -> f64 {
    round3(to_min + ((to_max - to_min) * (value - from_min)) / (from_max - from_min))
}

/// Maps a pixel offset inside the card to percent space. A zero or negative
/// extent (mid-reflow geometry) degrades to dead center instead of dividing
/// by zero.
pub fn percent_from_pointer(offset_x: f64, offset_y: f64, width: f64, height: f64) -> (f64, f64) {
    let percent_x = if width > 0.0 {
        (100.0 * offset_x / width).clamp(0.0, 100.0)
    } else {
        CENTER_PERCENT
    };
    let percent_y = if height > 0.0 {
        (100.0 * offset_y / height).clamp(0.0, 100.0)
    } else {
        CENTER_PERCENT
    };
    (percent_x, percent_y)
}

/// Maps a normalized [-1, 1] input axis pair to percent space via the affine
/// bijection `((v + 1) / 2) * 100`.
pub fn percent_from_normalized(x: f64, y: f64) -> (f64, f64) {
    let percent = |v: f64| (((v.clamp(-1.0, 1.0) + 1.0) / 2.0) * 100.0).clamp(0.0, 100.0);
    (percent(x), percent(y))
}

/// The full derived visual state for one input sample or animation tick.
/// Owned by the engine; the rendering layer only reads it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TiltParameters {
    pub pointer_x: f64,
    pub pointer_y: f64,
    pub background_x: f64,
    pub background_y: f64,
    pub pointer_from_center: f64,
    pub pointer_from_top: f64,
    pub pointer_from_left: f64,
    pub rotate_x: f64,
    pub rotate_y: f64,
}

impl TiltParameters {
    /// The resting pose: dead center, no rotation.
    pub fn centered() -> Self {
        derive_tilt(CENTER_PERCENT, CENTER_PERCENT, 1.0)
    }
}

impl Default for TiltParameters {
    fn default() -> Self {
        Self::centered()
    }
}

/// Derives every visual parameter from a percent-space position.
/// `rotation_multiplier` is 1 for pointer input and the configured
/// sensitivity for orientation input.
pub fn derive_tilt(percent_x: f64, percent_y: f64, rotation_multiplier: f64) -> TiltParameters {
    let center_x = percent_x - CENTER_PERCENT;
    let center_y = percent_y - CENTER_PERCENT;
    TiltParameters {
        pointer_x: round3(percent_x),
        pointer_y: round3(percent_y),
        background_x: adjust(
            percent_x,
            0.0,
            100.0,
            BACKGROUND_MIN_PERCENT,
            BACKGROUND_MAX_PERCENT,
        ),
        background_y: adjust(
            percent_y,
            0.0,
            100.0,
            BACKGROUND_MIN_PERCENT,
            BACKGROUND_MAX_PERCENT,
        ),
        pointer_from_center: round3((center_x.hypot(center_y) / CENTER_PERCENT).clamp(0.0, 1.0)),
        pointer_from_top: round3(percent_y / 100.0),
        pointer_from_left: round3(percent_x / 100.0),
        rotate_x: round3(-(center_x / ROTATE_X_DIVISOR) * rotation_multiplier),
        rotate_y: round3((center_y / ROTATE_Y_DIVISOR) * rotation_multiplier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let delta = (actual - expected).abs();
        assert!(delta < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn pointer_percent_stays_in_range() {
        for &(x, y) in &[(0.0, 0.0), (150.0, 100.0), (300.0, 200.0), (299.9, 0.1)] {
            let (px, py) = percent_from_pointer(x, y, 300.0, 200.0);
            assert!((0.0..=100.0).contains(&px));
            assert!((0.0..=100.0).contains(&py));
        }
    }

    #[test]
    fn pointer_percent_clamps_outside_offsets() {
        let (px, py) = percent_from_pointer(-40.0, 260.0, 300.0, 200.0);
        assert_close(px, 0.0);
        assert_close(py, 100.0);
    }

    #[test]
    fn zero_extent_degrades_to_center() {
        let (px, py) = percent_from_pointer(17.0, 4.0, 0.0, 0.0);
        assert_close(px, 50.0);
        assert_close(py, 50.0);
    }

    #[test]
    fn normalized_mapping_is_the_affine_bijection() {
        assert_close(percent_from_normalized(-1.0, 0.0).0, 0.0);
        assert_close(percent_from_normalized(0.0, 0.0).0, 50.0);
        assert_close(percent_from_normalized(1.0, 0.0).0, 100.0);
        let (px, py) = percent_from_normalized(2.5, -7.0);
        assert_close(px, 100.0);
        assert_close(py, 0.0);
    }

    #[test]
    fn dead_center_is_a_fixed_point_for_any_multiplier() {
        for &m in &[0.25, 1.0, 3.5] {
            let params = derive_tilt(50.0, 50.0, m);
            assert_close(params.rotate_x, 0.0);
            assert_close(params.rotate_y, 0.0);
            assert_close(params.pointer_from_center, 0.0);
        }
    }

    #[test]
    fn corner_scenario_on_300_by_200_card() {
        let (px, py) = percent_from_pointer(0.0, 0.0, 300.0, 200.0);
        assert_close(px, 0.0);
        assert_close(py, 0.0);
        let params = derive_tilt(px, py, 1.0);
        assert_close(params.rotate_x, 10.0);
        assert_close(params.rotate_y, -12.5);
        assert_close(params.pointer_from_center, 1.0);
    }

    #[test]
    fn background_travel_is_narrower_than_pointer_travel() {
        let near = derive_tilt(0.0, 0.0, 1.0);
        let far = derive_tilt(100.0, 100.0, 1.0);
        assert_close(near.background_x, 35.0);
        assert_close(far.background_x, 65.0);
        assert_close(derive_tilt(50.0, 50.0, 1.0).background_y, 50.0);
    }

    #[test]
    fn outputs_are_rounded_to_three_digits() {
        let params = derive_tilt(33.3333333, 66.6666666, 1.0);
        assert_close(params.pointer_x, 33.333);
        assert_close(params.rotate_x, 3.333);
        assert_close(params.pointer_from_left, 0.333);
    }
}
