//! Widget configuration: value ranges, arcs and their validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::angle::{AngleRange, FULL_TURN};

/// Configuration errors, raised when a widget is constructed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Empty value range: max ({max}) must be greater than min ({min})")]
    EmptyValueRange { min: f64, max: f64 },
    #[error("Step must be positive, got {0}")]
    NonPositiveStep(f64),
    #[error("Arc from {start}° to {end}° has zero length")]
    DegenerateArc { start: f64, end: f64 },
    #[error("Arc from {start}° to {end}° spans more than a full turn")]
    ArcTooWide { start: f64, end: f64 },
    #[error("Non-finite value for {0}")]
    NonFinite(&'static str),
    #[error("Invalid spring parameter {name}: {value}")]
    InvalidSpring { name: &'static str, value: f64 },
    #[error("Invalid config JSON: {0}")]
    Json(String),
}

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

pub(crate) fn ensure_finite(name: &'static str, value: f64) -> ConfigResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite(name))
    }
}

/// Tolerance used when counting whole steps in a range.
const STEP_EPSILON: f64 = 1e-9;

/// A numeric range with a quantization step.
///
/// Always satisfies `max > min` and `step > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ValueRangeFields", into = "ValueRangeFields")]
pub struct ValueRange {
    min: f64,
    max: f64,
    step: f64,
}

#[derive(Serialize, Deserialize)]
struct ValueRangeFields {
    min: f64,
    max: f64,
    #[serde(default = "default_step")]
    step: f64,
}

fn default_step() -> f64 {
    1.0
}

impl TryFrom<ValueRangeFields> for ValueRange {
    type Error = ConfigError;

    fn try_from(fields: ValueRangeFields) -> ConfigResult<Self> {
        Self::new(fields.min, fields.max, fields.step)
    }
}

impl From<ValueRange> for ValueRangeFields {
    fn from(range: ValueRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
            step: range.step,
        }
    }
}

impl ValueRange {
    pub fn new(min: f64, max: f64, step: f64) -> ConfigResult<Self> {
        ensure_finite("min", min)?;
        ensure_finite("max", max)?;
        ensure_finite("step", step)?;
        if max <= min {
            return Err(ConfigError::EmptyValueRange { min, max });
        }
        if step <= 0.0 {
            return Err(ConfigError::NonPositiveStep(step));
        }
        Ok(Self { min, max, step })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// `max - min`.
    pub fn extent(&self) -> f64 {
        self.max - self.min
    }

    /// Number of whole steps from `min` that still fit at or below `max`.
    pub fn step_count(&self) -> f64 {
        (self.extent() / self.step + STEP_EPSILON).floor()
    }

    /// Clamp a raw value into `[min, max]`.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Full configuration of a rotary widget.
///
/// Immutable once built; every constructor validates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RotaryConfigFields", into = "RotaryConfigFields")]
pub struct RotaryConfig {
    angles: AngleRange,
    values: ValueRange,
    continuous: bool,
}

/// Flat on-disk shape of a [`RotaryConfig`].
#[derive(Serialize, Deserialize)]
struct RotaryConfigFields {
    min: f64,
    max: f64,
    #[serde(default = "default_step")]
    step: f64,
    #[serde(default)]
    start_angle: f64,
    #[serde(default = "default_end_angle")]
    end_angle: f64,
    #[serde(default)]
    continuous: bool,
}

fn default_end_angle() -> f64 {
    FULL_TURN
}

impl TryFrom<RotaryConfigFields> for RotaryConfig {
    type Error = ConfigError;

    fn try_from(fields: RotaryConfigFields) -> ConfigResult<Self> {
        let values = ValueRange::new(fields.min, fields.max, fields.step)?;
        let angles = AngleRange::new(fields.start_angle, fields.end_angle);
        Self::new(angles, values, fields.continuous)
    }
}

impl From<RotaryConfig> for RotaryConfigFields {
    fn from(config: RotaryConfig) -> Self {
        Self {
            min: config.values.min,
            max: config.values.max,
            step: config.values.step,
            start_angle: config.angles.start,
            end_angle: config.angles.end,
            continuous: config.continuous,
        }
    }
}

impl RotaryConfig {
    /// Build a config, rejecting arcs that cannot be mapped onto the value range.
    ///
    /// In continuous mode the arc is kept for scale geometry only; the value
    /// range maps onto the whole circle.
    pub fn new(angles: AngleRange, values: ValueRange, continuous: bool) -> ConfigResult<Self> {
        ensure_finite("start_angle", angles.start)?;
        ensure_finite("end_angle", angles.end)?;
        if !continuous {
            if angles.end == angles.start {
                return Err(ConfigError::DegenerateArc {
                    start: angles.start,
                    end: angles.end,
                });
            }
            if angles.span() > FULL_TURN {
                return Err(ConfigError::ArcTooWide {
                    start: angles.start,
                    end: angles.end,
                });
            }
        }
        Ok(Self {
            angles,
            values,
            continuous,
        })
    }

    /// Bounded config over `[start, end]`.
    pub fn bounded(min: f64, max: f64, step: f64, start: f64, end: f64) -> ConfigResult<Self> {
        Self::new(AngleRange::new(start, end), ValueRange::new(min, max, step)?, false)
    }

    /// Continuous config mapping the whole circle onto `[min, max]`.
    pub fn continuous(min: f64, max: f64, step: f64) -> ConfigResult<Self> {
        Self::new(AngleRange::FULL_CIRCLE, ValueRange::new(min, max, step)?, true)
    }

    /// Free-spinning angle knob: 0..360 in whole degrees.
    pub fn knob() -> Self {
        Self {
            angles: AngleRange::FULL_CIRCLE,
            values: ValueRange {
                min: 0.0,
                max: 360.0,
                step: 1.0,
            },
            continuous: true,
        }
    }

    /// Tone arm dial: 0..100 over the upper half circle.
    pub fn tone_arm() -> Self {
        Self {
            angles: AngleRange::new(-90.0, 90.0),
            values: ValueRange {
                min: 0.0,
                max: 100.0,
                step: 1.0,
            },
            continuous: false,
        }
    }

    /// Analog meter: 0..100 over a 260° sweep.
    pub fn meter() -> Self {
        Self {
            angles: AngleRange::new(-130.0, 130.0),
            values: ValueRange {
                min: 0.0,
                max: 100.0,
                step: 1.0,
            },
            continuous: false,
        }
    }

    pub fn angles(&self) -> &AngleRange {
        &self.angles
    }

    pub fn values(&self) -> &ValueRange {
        &self.values
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string(self).map_err(|e| ConfigError::Json(e.to_string()))
    }
}

impl Default for RotaryConfig {
    fn default() -> Self {
        Self::knob()
    }
}
