//! Drag-to-rotate input for knobs and tone arms.

use kurbo::{Point, Rect};

use crate::angle::AngleRange;
use crate::config::RotaryConfig;
use crate::quantize::{angle_to_value, quantize, value_to_angle};
use crate::resolver::resolve;
use crate::session::{DragSession, ListenerRegistry};
use crate::WidgetId;

/// Drag state of a rotary control.
#[derive(Debug, Default)]
pub enum DragState {
    /// No pointer held.
    #[default]
    Idle,
    /// Pointer held since a pointer-down on the widget.
    Dragging(DragSession),
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }
}

/// Emitted synchronously for every pointer move that resolves a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueChanged {
    pub id: WidgetId,
    /// Quantized value.
    pub value: f64,
    /// Resolved (unquantized) control angle.
    pub angle: f64,
}

/// Turns pointer gestures on one widget into quantized values.
#[derive(Debug)]
pub struct RotaryInputController {
    id: WidgetId,
    config: RotaryConfig,
    state: DragState,
    angle: f64,
    value: f64,
}

impl RotaryInputController {
    /// Create an idle controller showing `value`.
    pub fn new(id: WidgetId, config: RotaryConfig, value: f64) -> Self {
        let value = quantize(value, config.values());
        Self {
            id,
            config,
            state: DragState::Idle,
            angle: value_to_angle(value, &config),
            value,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn config(&self) -> &RotaryConfig {
        &self.config
    }

    /// Configured arc, for scale-mark geometry.
    pub fn angle_range(&self) -> &AngleRange {
        self.config.angles()
    }

    /// Angle to draw the control at.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Last quantized value.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging()
    }

    /// Begin a drag. `bounds` is the widget's on-screen rectangle.
    ///
    /// A pointer-down during an existing drag restarts it with a fresh center.
    pub fn pointer_down(&mut self, pointer: Point, bounds: Rect, listeners: &ListenerRegistry) {
        // Release the old registration before registering again under the same id
        self.state = DragState::Idle;
        self.state = DragState::Dragging(DragSession::begin(self.id, bounds, listeners));
        log::debug!(
            "drag start on {} at ({:.1}, {:.1}), center ({:.1}, {:.1})",
            self.id,
            pointer.x,
            pointer.y,
            bounds.center().x,
            bounds.center().y
        );
    }

    /// Follow the pointer. Returns the new value, or `None` when idle.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<ValueChanged> {
        let DragState::Dragging(session) = &self.state else {
            log::trace!("ignoring pointer move on idle {}", self.id);
            return None;
        };
        let angle = resolve(pointer, Some(session.center()), &self.config, self.angle);
        let value = angle_to_value(angle, &self.config);
        self.angle = angle;
        self.value = value;
        Some(ValueChanged {
            id: self.id,
            value,
            angle,
        })
    }

    /// End the drag. Returns whether a drag was in progress.
    pub fn pointer_up(&mut self) -> bool {
        self.end_drag("up")
    }

    /// Abort the drag, keeping the last value. Returns whether a drag was in progress.
    pub fn pointer_cancel(&mut self) -> bool {
        self.end_drag("cancel")
    }

    fn end_drag(&mut self, reason: &str) -> bool {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(_session) => {
                log::debug!("drag {} on {} at value {}", reason, self.id, self.value);
                true
            }
            DragState::Idle => {
                log::trace!("ignoring pointer {} on idle {}", reason, self.id);
                false
            }
        }
    }

    /// Apply a value set from outside the widget.
    ///
    /// Ignored while dragging. Returns whether the control moved.
    pub fn set_value(&mut self, value: f64) -> bool {
        if self.is_dragging() {
            log::trace!("ignoring external value {} on {} during drag", value, self.id);
            return false;
        }
        let value = quantize(value, self.config.values());
        let angle = value_to_angle(value, &self.config);
        let moved = value != self.value || angle != self.angle;
        self.value = value;
        self.angle = angle;
        moved
    }
}
