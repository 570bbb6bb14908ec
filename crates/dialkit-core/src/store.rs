//! Host-side value and presentation state for widgets.

use serde::{Deserialize, Serialize};

/// Value plus the presentation fields a host shows next to a widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialState {
    pub value: f64,
    pub label: String,
    /// Suffix for the numeric readout, e.g. `"%"` or `"°"`.
    pub unit: String,
    /// Decimal places in the numeric readout.
    pub precision: usize,
}

impl Default for DialState {
    fn default() -> Self {
        Self {
            value: 0.0,
            label: String::new(),
            unit: String::new(),
            precision: 0,
        }
    }
}

impl DialState {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            value,
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    /// Update only the fields set in `patch`.
    pub fn apply(&mut self, patch: DialStatePatch) {
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(unit) = patch.unit {
            self.unit = unit;
        }
        if let Some(precision) = patch.precision {
            self.precision = precision;
        }
    }

    /// Numeric readout, e.g. `"75%"`.
    pub fn readout(&self) -> String {
        format!("{:.*}{}", self.precision, self.value, self.unit)
    }
}

/// Partial update for a [`DialState`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialStatePatch {
    pub value: Option<f64>,
    pub label: Option<String>,
    pub unit: Option<String>,
    pub precision: Option<usize>,
}

impl DialStatePatch {
    /// Patch that only changes the value.
    pub fn value(value: f64) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }
}
