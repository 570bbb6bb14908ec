//! Angle primitives in degrees.
//!
//! Every angle in this crate uses the dial convention: 0° points up and angles
//! grow clockwise. Pointer offsets are in screen space, where y grows downward.

use serde::{Deserialize, Serialize};

/// One full revolution in degrees.
pub const FULL_TURN: f64 = 360.0;
/// Half a revolution in degrees.
pub const HALF_TURN: f64 = 180.0;
/// A quarter revolution in degrees.
pub const QUARTER_TURN: f64 = 90.0;

/// Rotation from the screen-space bearing (0° = right) to the dial frame (0° = up).
pub const VISUAL_OFFSET: f64 = QUARTER_TURN;

/// Wrap an angle into `[0, 360)`.
///
/// Non-finite input yields `0.0`.
pub fn normalize_degrees(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(FULL_TURN);
    // rem_euclid rounds tiny negative inputs up to exactly FULL_TURN
    if wrapped >= FULL_TURN { 0.0 } else { wrapped }
}

/// Clockwise bearing of a screen-space offset measured from the positive x axis.
pub fn screen_bearing(dx: f64, dy: f64) -> f64 {
    normalize_degrees(dy.atan2(dx).to_degrees())
}

/// Dial angle of the vector from a widget center to a pointer.
///
/// The offset is `pointer - center` in screen space. The result is in
/// `[0, 360)` with 0° straight up. Offsets lying on an axis resolve exactly,
/// and a zero offset resolves to 0°.
pub fn angle_from_offset(dx: f64, dy: f64) -> f64 {
    if dx == 0.0 {
        return if dy > 0.0 { HALF_TURN } else { 0.0 };
    }
    if dy == 0.0 {
        return if dx > 0.0 {
            QUARTER_TURN
        } else {
            FULL_TURN - QUARTER_TURN
        };
    }
    normalize_degrees(screen_bearing(dx, dy) + VISUAL_OFFSET)
}

/// Shortest distance between two angles around the circle, in `[0, 180]`.
pub fn circular_distance(a: f64, b: f64) -> f64 {
    let diff = normalize_degrees(a - b);
    diff.min(FULL_TURN - diff)
}

/// An angular span from `start` to `end`, swept clockwise.
///
/// When `end <= start` the range wraps through 0°, giving an effective span of
/// `end - start + 360`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    /// Start angle in degrees.
    pub start: f64,
    /// End angle in degrees.
    pub end: f64,
}

impl Default for AngleRange {
    fn default() -> Self {
        Self::FULL_CIRCLE
    }
}

impl AngleRange {
    /// The whole dial, starting and ending straight up.
    pub const FULL_CIRCLE: AngleRange = AngleRange {
        start: 0.0,
        end: FULL_TURN,
    };

    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Effective clockwise span in degrees.
    pub fn span(&self) -> f64 {
        let raw = self.end - self.start;
        if raw > 0.0 { raw } else { raw + FULL_TURN }
    }

    /// Whether `end <= start`, i.e. the span is measured through 0°.
    pub fn wraps(&self) -> bool {
        self.end <= self.start
    }

    /// Whether the range covers the whole circle.
    pub fn is_full_circle(&self) -> bool {
        self.span() >= FULL_TURN
    }

    /// Clockwise offset of `angle` from `start`, in `[0, 360)`.
    pub fn relative(&self, angle: f64) -> f64 {
        normalize_degrees(angle - self.start)
    }

    /// Angle at fraction `t` of the span, in the range's own frame.
    pub fn lerp(&self, t: f64) -> f64 {
        self.start + t * self.span()
    }

    /// Lower and upper end of the range in its own frame: `(start, start + span)`.
    pub fn bounds(&self) -> (f64, f64) {
        (self.start, self.start + self.span())
    }

    /// Whether `angle` lies in `[start, start + span)`.
    pub fn contains(&self, angle: f64) -> bool {
        arc_contains(angle, self)
    }
}

/// True when `angle` lies in `[start, start + span)` of `range`, modulo 360°.
pub fn arc_contains(angle: f64, range: &AngleRange) -> bool {
    range.relative(angle) < range.span()
}
