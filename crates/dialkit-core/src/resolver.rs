//! Pointer position to dial angle.

use kurbo::{Point, Rect};

use crate::angle::{AngleRange, angle_from_offset, circular_distance, normalize_degrees};
use crate::config::RotaryConfig;

/// Pivot of a widget in screen coordinates.
///
/// Captured once when a drag starts; the widget is assumed not to move while
/// the pointer is held down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetCenter(pub Point);

impl WidgetCenter {
    /// Center of the widget's on-screen bounding box.
    pub fn from_bounds(bounds: Rect) -> Self {
        Self(bounds.center())
    }

    pub fn point(&self) -> Point {
        self.0
    }
}

/// Resolve a pointer position to a dial angle for `config`.
///
/// Bounded configs return an angle in the arc's own frame (`start..=start + span`),
/// snapping positions outside the arc to whichever end is closer around the
/// circle. Continuous configs return an angle in `[0, 360)`.
///
/// Without a center, or when the pointer sits exactly on it, there is no
/// direction to read and `previous_angle` is returned.
pub fn resolve(
    pointer: Point,
    center: Option<WidgetCenter>,
    config: &RotaryConfig,
    previous_angle: f64,
) -> f64 {
    let Some(center) = center else {
        return previous_angle;
    };
    let offset = pointer - center.point();
    if offset.x == 0.0 && offset.y == 0.0 {
        return previous_angle;
    }
    if !offset.x.is_finite() || !offset.y.is_finite() {
        return previous_angle;
    }

    let angle = angle_from_offset(offset.x, offset.y);
    let resolved = if config.is_continuous() {
        normalize_degrees(angle)
    } else {
        clamp_to_arc(angle, config.angles())
    };
    log::trace!(
        "pointer ({:.1}, {:.1}) -> raw {:.2}° -> resolved {:.2}°",
        offset.x,
        offset.y,
        angle,
        resolved
    );
    resolved
}

/// Express `angle` in the arc's frame, snapping to the nearer end when it
/// falls outside the arc.
///
/// Distances to the ends are measured around the circle, so a pointer swinging
/// behind the widget stays on the end it left from instead of jumping across.
pub fn clamp_to_arc(angle: f64, arc: &AngleRange) -> f64 {
    let span = arc.span();
    let relative = arc.relative(angle);
    if relative <= span {
        return arc.start + relative;
    }
    let to_start = circular_distance(relative, 0.0);
    let to_end = circular_distance(relative, span);
    if to_start <= to_end {
        arc.start
    } else {
        arc.start + span
    }
}
