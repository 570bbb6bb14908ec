//! Bidirectional angle/value mapping.
//!
//! Bounded configs map `[start, start + span]` linearly onto `[min, max]`.
//! Continuous configs map `[0, 360]` onto `[min, max]`; angles outside that
//! interval wrap first, so 360° is the top of the range and 361° is 1°.

use crate::angle::{FULL_TURN, normalize_degrees};
use crate::config::{RotaryConfig, ValueRange};

/// Position of `value` within `range` as a fraction, unclamped.
///
/// A zero-width range or a non-finite value yields `0.0`.
pub fn normalized_value(value: f64, range: &ValueRange) -> f64 {
    let extent = range.extent();
    if extent == 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value - range.min()) / extent
}

/// Round `value` to the nearest step counted from `min`, then clamp.
///
/// Rounding past the top of the range lands on the last whole step at or
/// below `max`, so the result is always `min + k * step`.
pub fn quantize(value: f64, range: &ValueRange) -> f64 {
    if !value.is_finite() {
        return range.min();
    }
    let steps = ((value - range.min()) / range.step()).round();
    let steps = steps.clamp(0.0, range.step_count());
    range.clamp(range.min() + steps * range.step())
}

/// Fraction of the dial swept by `angle`.
fn angle_fraction(angle: f64, config: &RotaryConfig) -> f64 {
    if config.is_continuous() {
        let angle = if (0.0..=FULL_TURN).contains(&angle) {
            angle
        } else {
            normalize_degrees(angle)
        };
        return angle / FULL_TURN;
    }

    let arc = config.angles();
    let span = arc.span();
    if span <= 0.0 || !span.is_finite() {
        return 0.0;
    }
    // Angles already in the arc's own frame are used as-is so the end of the
    // arc is distinguishable from its start on full-circle arcs.
    let raw = angle - arc.start;
    let relative = if (0.0..=span).contains(&raw) {
        raw
    } else {
        arc.relative(angle)
    };
    relative / span
}

/// Quantized value for a dial angle.
pub fn angle_to_value(angle: f64, config: &RotaryConfig) -> f64 {
    let values = config.values();
    let raw = values.min() + angle_fraction(angle, config) * values.extent();
    quantize(raw, values)
}

/// Dial angle for a value, in the arc's own frame.
///
/// Values outside the range extrapolate past the ends of the arc.
pub fn value_to_angle(value: f64, config: &RotaryConfig) -> f64 {
    let fraction = normalized_value(value, config.values());
    if config.is_continuous() {
        fraction * FULL_TURN
    } else {
        config.angles().lerp(fraction)
    }
}

/// Unquantized value for a dial angle on a bounded arc, extrapolating past
/// its ends. Used for live readouts that follow an animated needle.
pub fn angle_to_raw_value(angle: f64, config: &RotaryConfig) -> f64 {
    let values = config.values();
    let fraction = if config.is_continuous() {
        angle_fraction(angle, config)
    } else {
        let span = config.angles().span();
        if span > 0.0 {
            (angle - config.angles().start) / span
        } else {
            0.0
        }
    };
    values.min() + fraction * values.extent()
}
