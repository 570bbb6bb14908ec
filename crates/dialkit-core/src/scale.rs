//! Scale-mark and arc geometry for drawing a dial face.
//!
//! Coordinates are relative to the dial's pivot with y growing downward, using
//! the same 0° = up, clockwise convention as the rest of the crate.

use kurbo::{Line, Point};
use serde::{Deserialize, Serialize};

use crate::angle::{FULL_TURN, HALF_TURN};
use crate::config::RotaryConfig;

/// Layout of the tick marks around a dial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleStyle {
    /// Number of marks, including both ends. Fewer than two draws nothing.
    pub count: usize,
    /// Every n-th mark (and the last) is a major mark.
    pub highlight_every: usize,
    pub minor_inner_radius: f64,
    pub minor_outer_radius: f64,
    pub major_inner_radius: f64,
    pub major_outer_radius: f64,
}

impl ScaleStyle {
    /// Small knob face (16 unit box).
    pub fn knob() -> Self {
        Self {
            count: 11,
            highlight_every: 2,
            minor_inner_radius: 6.0,
            minor_outer_radius: 7.5,
            major_inner_radius: 6.0,
            major_outer_radius: 8.0,
        }
    }

    /// Tone arm face, marks inside a radius-35 arc.
    pub fn tone_arm() -> Self {
        Self {
            count: 21,
            highlight_every: 5,
            minor_inner_radius: 31.0,
            minor_outer_radius: 34.0,
            major_inner_radius: 27.0,
            major_outer_radius: 34.0,
        }
    }

    /// Meter face, marks straddling a radius-35 arc.
    pub fn meter() -> Self {
        Self {
            count: 21,
            highlight_every: 5,
            minor_inner_radius: 35.0,
            minor_outer_radius: 40.0,
            major_inner_radius: 33.0,
            major_outer_radius: 42.0,
        }
    }
}

/// One tick mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMark {
    pub index: usize,
    /// Dial angle of the mark.
    pub angle: f64,
    /// Value the mark stands for.
    pub value: f64,
    pub major: bool,
    pub segment: Line,
}

/// Point at `radius` from `center` in direction `angle`.
pub fn polar_point(center: Point, radius: f64, angle: f64) -> Point {
    let rad = angle.to_radians();
    Point::new(center.x + radius * rad.sin(), center.y - radius * rad.cos())
}

/// Tick marks spread evenly over the dial.
///
/// Bounded configs cover the arc; continuous ones cover the whole circle, so
/// the first and last marks coincide.
pub fn scale_marks(config: &RotaryConfig, style: &ScaleStyle) -> Vec<ScaleMark> {
    if style.count < 2 {
        return Vec::new();
    }
    let highlight_every = style.highlight_every.max(1);
    let last = style.count - 1;
    let values = config.values();

    (0..style.count)
        .map(|index| {
            let t = index as f64 / last as f64;
            let angle = if config.is_continuous() {
                t * FULL_TURN
            } else {
                config.angles().lerp(t)
            };
            let major = index % highlight_every == 0 || index == last;
            let (inner, outer) = if major {
                (style.major_inner_radius, style.major_outer_radius)
            } else {
                (style.minor_inner_radius, style.minor_outer_radius)
            };
            ScaleMark {
                index,
                angle,
                value: values.min() + t * values.extent(),
                major,
                segment: Line::new(
                    polar_point(Point::ZERO, inner, angle),
                    polar_point(Point::ZERO, outer, angle),
                ),
            }
        })
        .collect()
}

/// End points and flags for drawing the dial's arc as an SVG-style elliptical arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub start: Point,
    pub end: Point,
    pub radius: f64,
    /// Whether the arc sweeps more than 180°.
    pub large_arc: bool,
    /// Whether the arc is a full circle (draw a circle instead).
    pub full_circle: bool,
}

/// Arc of `config` at `radius` around the origin.
pub fn arc_geometry(config: &RotaryConfig, radius: f64) -> ArcGeometry {
    let arc = config.angles();
    let span = if config.is_continuous() {
        FULL_TURN
    } else {
        arc.span()
    };
    let (start, end) = arc.bounds();
    ArcGeometry {
        start: polar_point(Point::ZERO, radius, start),
        end: polar_point(Point::ZERO, radius, end),
        radius,
        large_arc: span > HALF_TURN,
        full_circle: span >= FULL_TURN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn test_polar_point() {
        assert!(close(polar_point(Point::ZERO, 10.0, 0.0), Point::new(0.0, -10.0)));
        assert!(close(polar_point(Point::ZERO, 10.0, 90.0), Point::new(10.0, 0.0)));
        assert!(close(polar_point(Point::new(8.0, 8.0), 2.0, 180.0), Point::new(8.0, 10.0)));
    }

    #[test]
    fn test_meter_marks() {
        let marks = scale_marks(&RotaryConfig::meter(), &ScaleStyle::meter());
        assert_eq!(marks.len(), 21);
        assert!((marks[0].angle + 130.0).abs() < EPS);
        assert!((marks[10].angle - 0.0).abs() < EPS);
        assert!((marks[20].angle - 130.0).abs() < EPS);
        assert!((marks[10].value - 50.0).abs() < EPS);

        let majors: Vec<usize> = marks.iter().filter(|m| m.major).map(|m| m.index).collect();
        assert_eq!(majors, vec![0, 5, 10, 15, 20]);

        // Middle mark points straight up
        let middle = marks[10].segment;
        assert!(close(middle.p0, Point::new(0.0, -33.0)));
        assert!(close(middle.p1, Point::new(0.0, -42.0)));
    }

    #[test]
    fn test_last_mark_is_always_major() {
        let style = ScaleStyle {
            count: 12,
            highlight_every: 5,
            ..ScaleStyle::meter()
        };
        let marks = scale_marks(&RotaryConfig::tone_arm(), &style);
        assert!(marks[11].major);
        assert!(!marks[9].major);
    }

    #[test]
    fn test_continuous_marks_cover_circle() {
        let marks = scale_marks(&RotaryConfig::knob(), &ScaleStyle::knob());
        assert_eq!(marks.len(), 11);
        assert!((marks[0].angle - 0.0).abs() < EPS);
        assert!((marks[10].angle - 360.0).abs() < EPS);
        assert!(close(marks[0].segment.p0, marks[10].segment.p0));
    }

    #[test]
    fn test_degenerate_styles() {
        let style = ScaleStyle {
            count: 1,
            ..ScaleStyle::knob()
        };
        assert!(scale_marks(&RotaryConfig::knob(), &style).is_empty());

        let style = ScaleStyle {
            highlight_every: 0,
            ..ScaleStyle::knob()
        };
        assert!(scale_marks(&RotaryConfig::knob(), &style).iter().all(|m| m.major));
    }

    #[test]
    fn test_arc_geometry() {
        let arc = arc_geometry(&RotaryConfig::meter(), 35.0);
        assert!(arc.large_arc);
        assert!(!arc.full_circle);
        assert!((arc.start.x + arc.end.x).abs() < EPS);
        assert!((arc.start.y - arc.end.y).abs() < EPS);

        let half = arc_geometry(&RotaryConfig::tone_arm(), 35.0);
        assert!(!half.large_arc);
        assert!(close(half.start, Point::new(-35.0, 0.0)));
        assert!(close(half.end, Point::new(35.0, 0.0)));

        assert!(arc_geometry(&RotaryConfig::knob(), 6.5).full_circle);
    }
}
