//! A board of mounted dials sharing one pointer scope and one frame scheduler.
//!
//! The board is what a host talks to: it routes pointer-down to the widget
//! under the pointer, routes document-scope move/up/cancel to whichever
//! widgets are dragging, keeps each widget's [`DialState`] in step with its
//! controller and forwards frames to the needle animators.

use std::collections::HashMap;

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::animator::{NeedleAnimator, SpringParams};
use crate::config::{ConfigResult, RotaryConfig};
use crate::controller::{RotaryInputController, ValueChanged};
use crate::quantize::quantize;
use crate::scheduler::{FrameClock, FrameHandle, FrameScheduler, ManualScheduler};
use crate::session::ListenerRegistry;
use crate::store::{DialState, DialStatePatch};
use crate::WidgetId;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// What a dial is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialKind {
    /// Rotary input knob.
    Knob,
    /// Needle-style rotary input.
    ToneArm,
    /// Read-only animated gauge.
    Meter,
}

impl DialKind {
    /// Whether the dial accepts pointer input.
    pub fn is_input(self) -> bool {
        !matches!(self, DialKind::Meter)
    }
}

/// Everything needed to mount a dial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialSetup {
    pub kind: DialKind,
    pub config: RotaryConfig,
    #[serde(default)]
    pub state: DialState,
    /// Animate the displayed angle with a needle simulation.
    /// Meters always animate and fall back to [`SpringParams::meter`].
    #[serde(default)]
    pub spring: Option<SpringParams>,
}

impl DialSetup {
    pub fn knob(config: RotaryConfig, state: DialState) -> Self {
        Self {
            kind: DialKind::Knob,
            config,
            state,
            spring: None,
        }
    }

    pub fn tone_arm(config: RotaryConfig, state: DialState) -> Self {
        Self {
            kind: DialKind::ToneArm,
            config,
            state,
            spring: None,
        }
    }

    pub fn meter(config: RotaryConfig, state: DialState) -> Self {
        Self {
            kind: DialKind::Meter,
            config,
            state,
            spring: Some(SpringParams::meter()),
        }
    }

    pub fn with_spring(mut self, spring: SpringParams) -> Self {
        self.spring = Some(spring);
        self
    }
}

/// A mounted dial.
#[derive(Debug)]
pub struct Dial {
    kind: DialKind,
    config: RotaryConfig,
    state: DialState,
    controller: Option<RotaryInputController>,
    animator: Option<NeedleAnimator>,
}

impl Dial {
    fn build(id: WidgetId, setup: DialSetup) -> ConfigResult<Self> {
        let DialSetup {
            kind,
            config,
            mut state,
            spring,
        } = setup;
        let controller = kind
            .is_input()
            .then(|| RotaryInputController::new(id, config, state.value));
        let value = match &controller {
            Some(controller) => controller.value(),
            None => quantize(state.value, config.values()),
        };
        state.set_value(value);
        let spring = match kind {
            DialKind::Meter => Some(spring.unwrap_or_default()),
            _ => spring,
        };
        let animator = spring
            .map(|params| NeedleAnimator::new(config, params, state.value))
            .transpose()?;
        Ok(Self {
            kind,
            config,
            state,
            controller,
            animator,
        })
    }

    pub fn kind(&self) -> DialKind {
        self.kind
    }

    pub fn config(&self) -> &RotaryConfig {
        &self.config
    }

    pub fn state(&self) -> &DialState {
        &self.state
    }

    pub fn controller(&self) -> Option<&RotaryInputController> {
        self.controller.as_ref()
    }

    pub fn animator(&self) -> Option<&NeedleAnimator> {
        self.animator.as_ref()
    }

    /// Current value from the store.
    pub fn value(&self) -> f64 {
        self.state.value()
    }

    /// Angle to draw the needle or pointer at.
    pub fn display_angle(&self) -> f64 {
        if let Some(animator) = &self.animator {
            animator.angle()
        } else if let Some(controller) = &self.controller {
            controller.angle()
        } else {
            0.0
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.as_ref().is_some_and(|c| c.is_dragging())
    }
}

/// Manages the dials of one host surface.
#[derive(Debug)]
pub struct DialBoard<S: FrameScheduler = FrameClock> {
    dials: HashMap<WidgetId, Dial>,
    /// Value forwarding: changes on the key are mirrored onto each target.
    links: HashMap<WidgetId, Vec<WidgetId>>,
    listeners: ListenerRegistry,
    scheduler: S,
}

impl Default for DialBoard<FrameClock> {
    fn default() -> Self {
        Self::new(FrameClock::default())
    }
}

impl<S: FrameScheduler> DialBoard<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            dials: HashMap::new(),
            links: HashMap::new(),
            listeners: ListenerRegistry::new(),
            scheduler,
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn dial(&self, id: WidgetId) -> Option<&Dial> {
        self.dials.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.dials.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.dials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dials.is_empty()
    }

    /// Mount a dial and return its id.
    pub fn mount(&mut self, setup: DialSetup) -> ConfigResult<WidgetId> {
        let id = Uuid::new_v4();
        let dial = Dial::build(id, setup)?;
        log::debug!("mounted {:?} {} at value {}", dial.kind, id, dial.value());
        self.dials.insert(id, dial);
        Ok(id)
    }

    /// Remove a dial, ending any drag and cancelling its animation.
    pub fn unmount(&mut self, id: WidgetId) -> Option<Dial> {
        let mut dial = self.dials.remove(&id)?;
        if let Some(animator) = &mut dial.animator {
            animator.stop(&mut self.scheduler);
        }
        // Dropping the drag session releases the document listeners
        dial.controller = None;
        self.links.remove(&id);
        for targets in self.links.values_mut() {
            targets.retain(|t| *t != id);
        }
        log::debug!("unmounted {:?} {}", dial.kind, id);
        Some(dial)
    }

    /// Mirror every value change of `source` onto `target`.
    pub fn link(&mut self, source: WidgetId, target: WidgetId) -> bool {
        if source == target || !self.dials.contains_key(&source) || !self.dials.contains_key(&target) {
            log::warn!("cannot link {} -> {}", source, target);
            return false;
        }
        let targets = self.links.entry(source).or_default();
        if !targets.contains(&target) {
            targets.push(target);
        }
        true
    }

    /// Pointer pressed on the dial `id`, whose on-screen rectangle is `bounds`.
    pub fn pointer_down(&mut self, id: WidgetId, pointer: Point, bounds: Rect) -> bool {
        let Some(dial) = self.dials.get_mut(&id) else {
            log::warn!("pointer down on unknown dial {}", id);
            return false;
        };
        match &mut dial.controller {
            Some(controller) => {
                controller.pointer_down(pointer, bounds, &self.listeners);
                true
            }
            None => false,
        }
    }

    /// Document-scope pointer move. Returns the values emitted by dragging dials.
    pub fn pointer_move(&mut self, pointer: Point) -> Vec<ValueChanged> {
        let mut changes = Vec::new();
        for id in self.listeners.listeners() {
            let Some(dial) = self.dials.get_mut(&id) else {
                continue;
            };
            let Some(change) = dial.controller.as_mut().and_then(|c| c.pointer_move(pointer)) else {
                continue;
            };
            dial.state.set_value(change.value);
            if let Some(animator) = &mut dial.animator {
                animator.set_value(change.value, &mut self.scheduler);
            }
            self.forward(id, change.value);
            changes.push(change);
        }
        changes
    }

    /// Document-scope pointer release. Returns how many drags ended.
    pub fn pointer_up(&mut self) -> usize {
        self.end_drags(RotaryInputController::pointer_up)
    }

    /// Document-scope pointer cancel. Returns how many drags ended.
    pub fn pointer_cancel(&mut self) -> usize {
        self.end_drags(RotaryInputController::pointer_cancel)
    }

    fn end_drags(&mut self, end: fn(&mut RotaryInputController) -> bool) -> usize {
        let mut ended = 0;
        for id in self.listeners.listeners() {
            if let Some(controller) = self.dials.get_mut(&id).and_then(|d| d.controller.as_mut()) {
                if end(controller) {
                    ended += 1;
                }
            }
        }
        ended
    }

    /// Set a dial's value from outside. Ignored while the dial is being dragged.
    pub fn set_value(&mut self, id: WidgetId, value: f64) -> bool {
        if !self.apply_external(id, value) {
            return false;
        }
        let applied = self.dials.get(&id).map(Dial::value).unwrap_or(value);
        self.forward(id, applied);
        true
    }

    /// Apply a partial state update. A value in the patch goes through [`Self::set_value`].
    pub fn patch(&mut self, id: WidgetId, mut patch: DialStatePatch) -> bool {
        let value = patch.value.take();
        let Some(dial) = self.dials.get_mut(&id) else {
            log::warn!("patch for unknown dial {}", id);
            return false;
        };
        dial.state.apply(patch);
        match value {
            Some(value) => self.set_value(id, value),
            None => true,
        }
    }

    fn apply_external(&mut self, id: WidgetId, value: f64) -> bool {
        let Some(dial) = self.dials.get_mut(&id) else {
            log::warn!("value for unknown dial {}", id);
            return false;
        };
        if dial.is_dragging() {
            log::trace!("dial {} is dragging, ignoring value {}", id, value);
            return false;
        }
        let value = match &mut dial.controller {
            Some(controller) => {
                controller.set_value(value);
                controller.value()
            }
            None => quantize(value, dial.config.values()),
        };
        dial.state.set_value(value);
        if let Some(animator) = &mut dial.animator {
            animator.set_value(value, &mut self.scheduler);
        }
        true
    }

    /// Push `value` to the dials linked from `source`. One hop only.
    fn forward(&mut self, source: WidgetId, value: f64) {
        let Some(targets) = self.links.get(&source).cloned() else {
            return;
        };
        for target in targets {
            self.apply_external(target, value);
        }
    }

    /// Deliver fired frames to the animators. Returns how many ticked.
    pub fn frame(&mut self, handles: &[FrameHandle]) -> usize {
        let mut ticked = 0;
        for &handle in handles {
            for dial in self.dials.values_mut() {
                let Some(animator) = &mut dial.animator else {
                    continue;
                };
                if animator.on_frame(handle, &mut self.scheduler).is_some() {
                    ticked += 1;
                    break;
                }
            }
        }
        if ticked > 0 {
            log::trace!("frame ticked {} animator(s)", ticked);
        }
        ticked
    }

    /// Whether any animator is waiting for a frame.
    pub fn is_animating(&self) -> bool {
        self.dials
            .values()
            .any(|d| d.animator.as_ref().is_some_and(NeedleAnimator::is_animating))
    }
}

impl DialBoard<FrameClock> {
    /// Run a frame if the clock says one is due.
    pub fn poll(&mut self, now: Instant) -> usize {
        let handles = self.scheduler.poll(now);
        self.frame(&handles)
    }
}

impl DialBoard<ManualScheduler> {
    /// Fire one frame immediately.
    pub fn fire(&mut self) -> usize {
        let handles = self.scheduler.fire();
        self.frame(&handles)
    }
}

impl<S: FrameScheduler> Drop for DialBoard<S> {
    fn drop(&mut self) {
        for dial in self.dials.values_mut() {
            if let Some(animator) = &mut dial.animator {
                animator.stop(&mut self.scheduler);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    const LEFT: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);
    const RIGHT: Rect = Rect::new(200.0, 0.0, 300.0, 100.0);

    fn pointer_at(bounds: Rect, angle: f64) -> Point {
        let rad = angle.to_radians();
        let c = bounds.center();
        Point::new(c.x + 40.0 * rad.sin(), c.y - 40.0 * rad.cos())
    }

    fn board() -> DialBoard<ManualScheduler> {
        DialBoard::new(ManualScheduler::new())
    }

    fn settle(board: &mut DialBoard<ManualScheduler>) -> usize {
        let mut frames = 0;
        while board.is_animating() {
            board.fire();
            frames += 1;
            assert!(frames < 10_000, "animation never settled");
        }
        frames
    }

    #[test]
    fn test_mount_quantizes_initial_value() {
        let mut board = board();
        let id = board
            .mount(DialSetup::tone_arm(RotaryConfig::tone_arm(), DialState::new("Arm", 25.4)))
            .unwrap();
        let dial = board.dial(id).unwrap();
        assert_eq!(dial.kind(), DialKind::ToneArm);
        assert_eq!(dial.value(), 25.0);
        assert!((dial.display_angle() + 45.0).abs() < 1e-9);
        assert!(dial.animator().is_none());
    }

    #[test]
    fn test_mount_rejects_bad_spring() {
        let mut board = board();
        let spring = SpringParams {
            damping: 1.5,
            ..SpringParams::meter()
        };
        let result = board.mount(DialSetup::meter(RotaryConfig::meter(), DialState::default()).with_spring(spring));
        assert_eq!(result, Err(ConfigError::InvalidSpring { name: "damping", value: 1.5 }));
        assert!(board.is_empty());
    }

    #[test]
    fn test_drag_updates_store() {
        let mut board = board();
        let id = board
            .mount(DialSetup::knob(RotaryConfig::meter(), DialState::new("Level", 50.0)))
            .unwrap();
        assert!(board.pointer_down(id, pointer_at(LEFT, 0.0), LEFT));

        let changes = board.pointer_move(pointer_at(LEFT, 65.0));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].value, 75.0);
        assert_eq!(board.dial(id).unwrap().value(), 75.0);

        assert_eq!(board.pointer_up(), 1);
        assert!(board.listeners().is_empty());
        assert!(board.pointer_move(pointer_at(LEFT, 0.0)).is_empty());
        assert_eq!(board.dial(id).unwrap().value(), 75.0);
    }

    #[test]
    fn test_no_cross_talk_between_dials() {
        let mut board = board();
        let left = board
            .mount(DialSetup::knob(RotaryConfig::meter(), DialState::new("Left", 50.0)))
            .unwrap();
        let right = board
            .mount(DialSetup::knob(RotaryConfig::meter(), DialState::new("Right", 50.0)))
            .unwrap();

        board.pointer_down(left, pointer_at(LEFT, 0.0), LEFT);
        board.pointer_move(pointer_at(LEFT, -130.0));
        board.pointer_up();

        board.pointer_down(right, pointer_at(RIGHT, 0.0), RIGHT);
        let changes = board.pointer_move(pointer_at(RIGHT, 130.0));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id, right);
        board.pointer_up();

        assert_eq!(board.dial(left).unwrap().value(), 0.0);
        assert_eq!(board.dial(right).unwrap().value(), 100.0);
    }

    #[test]
    fn test_meter_ignores_pointer() {
        let mut board = board();
        let id = board
            .mount(DialSetup::meter(RotaryConfig::meter(), DialState::default()))
            .unwrap();
        assert!(!board.pointer_down(id, pointer_at(LEFT, 0.0), LEFT));
        assert!(board.listeners().is_empty());
        assert!(!board.pointer_down(Uuid::new_v4(), Point::ZERO, LEFT));
    }

    #[test]
    fn test_external_value_animates_meter() {
        let mut board = board();
        let id = board
            .mount(DialSetup::meter(RotaryConfig::meter(), DialState::new("GSR", 0.0)))
            .unwrap();
        assert!(board.set_value(id, 50.0));
        assert!(board.is_animating());
        let frames = settle(&mut board);
        assert!(frames > 1 && frames < 1_000);
        let dial = board.dial(id).unwrap();
        assert_eq!(dial.value(), 50.0);
        assert!(dial.display_angle().abs() < 0.5);
    }

    #[test]
    fn test_meter_value_is_quantized() {
        let mut board = board();
        let id = board
            .mount(DialSetup::meter(RotaryConfig::meter(), DialState::new("GSR", 10.4)))
            .unwrap();
        assert_eq!(board.dial(id).unwrap().value(), 10.0);

        assert!(board.set_value(id, f64::NAN));
        let dial = board.dial(id).unwrap();
        assert_eq!(dial.value(), 0.0);
        assert_eq!(dial.state().readout(), "0");
        assert_eq!(dial.animator().unwrap().target(), -130.0);

        assert!(board.set_value(id, 150.0));
        let dial = board.dial(id).unwrap();
        assert_eq!(dial.value(), 100.0);
        assert_eq!(dial.animator().unwrap().target(), 130.0);
    }

    #[test]
    fn test_forwarded_value_is_quantized_for_target() {
        let mut board = board();
        let knob = board
            .mount(DialSetup::knob(RotaryConfig::knob(), DialState::new("Angle", 0.0)))
            .unwrap();
        let meter = board
            .mount(DialSetup::meter(RotaryConfig::meter(), DialState::default()))
            .unwrap();
        board.link(knob, meter);
        assert!(board.set_value(knob, 270.0));
        assert_eq!(board.dial(knob).unwrap().value(), 270.0);
        assert_eq!(board.dial(meter).unwrap().value(), 100.0);
    }

    #[test]
    fn test_external_value_ignored_while_dragging() {
        let mut board = board();
        let id = board
            .mount(DialSetup::knob(RotaryConfig::meter(), DialState::new("Level", 50.0)))
            .unwrap();
        board.pointer_down(id, pointer_at(LEFT, 0.0), LEFT);
        assert!(!board.set_value(id, 10.0));
        assert_eq!(board.dial(id).unwrap().value(), 50.0);
        board.pointer_cancel();
        assert!(board.set_value(id, 10.0));
        assert_eq!(board.dial(id).unwrap().value(), 10.0);
    }

    #[test]
    fn test_linked_meter_follows_tone_arm() {
        let mut board = board();
        let arm = board
            .mount(DialSetup::tone_arm(RotaryConfig::tone_arm(), DialState::new("Arm", 25.0)))
            .unwrap();
        let meter = board
            .mount(DialSetup::meter(
                RotaryConfig::bounded(0.0, 100.0, 1.0, -90.0, 90.0).unwrap(),
                DialState::new("Meter", 25.0),
            ))
            .unwrap();
        assert!(board.link(arm, meter));
        assert!(!board.link(arm, arm));

        board.pointer_down(arm, pointer_at(LEFT, 0.0), LEFT);
        board.pointer_move(pointer_at(LEFT, 90.0));
        board.pointer_up();
        assert_eq!(board.dial(arm).unwrap().value(), 100.0);
        assert_eq!(board.dial(meter).unwrap().value(), 100.0);

        settle(&mut board);
        assert!((board.dial(meter).unwrap().display_angle() - 90.0).abs() < 0.5);
    }

    #[test]
    fn test_patch_updates_fields_and_value() {
        let mut board = board();
        let id = board
            .mount(DialSetup::knob(RotaryConfig::knob(), DialState::new("Angle", 45.0)))
            .unwrap();
        assert!(board.patch(
            id,
            DialStatePatch {
                value: Some(90.4),
                unit: Some("°".to_string()),
                ..Default::default()
            }
        ));
        let state = board.dial(id).unwrap().state();
        assert_eq!(state.value, 90.0);
        assert_eq!(state.label, "Angle");
        assert_eq!(state.readout(), "90°");
    }

    #[test]
    fn test_unmount_releases_everything() {
        let mut board = board();
        let knob = board
            .mount(DialSetup::knob(RotaryConfig::meter(), DialState::new("Level", 0.0)).with_spring(SpringParams::snappy()))
            .unwrap();
        let meter = board
            .mount(DialSetup::meter(RotaryConfig::meter(), DialState::default()))
            .unwrap();
        board.link(knob, meter);

        board.pointer_down(knob, pointer_at(LEFT, 0.0), LEFT);
        board.pointer_move(pointer_at(LEFT, 100.0));
        assert!(board.is_animating());
        assert!(!board.scheduler().pending().is_empty());

        let dial = board.unmount(knob).unwrap();
        assert!(!dial.is_dragging());
        assert!(board.listeners().is_empty());
        assert!(board.unmount(knob).is_none());

        board.unmount(meter);
        assert!(board.scheduler().pending().is_empty());
        assert!(board.is_empty());
    }

    #[test]
    fn test_animated_knob_tracks_drag() {
        let mut board = board();
        let id = board
            .mount(DialSetup::knob(RotaryConfig::meter(), DialState::new("Level", 50.0)).with_spring(SpringParams::snappy()))
            .unwrap();
        board.pointer_down(id, pointer_at(LEFT, 0.0), LEFT);
        board.pointer_move(pointer_at(LEFT, -130.0));
        board.pointer_up();
        // Needle lags the value until frames run
        assert_eq!(board.dial(id).unwrap().display_angle(), 0.0);
        settle(&mut board);
        assert!((board.dial(id).unwrap().display_angle() + 130.0).abs() < 0.5);
    }

    #[test]
    fn test_setup_from_json() {
        let setup: DialSetup = serde_json::from_str(
            r#"{
                "kind": "meter",
                "config": {"min": 0, "max": 100, "start_angle": -130, "end_angle": 130},
                "state": {"value": 10, "label": "GSR", "unit": "%"}
            }"#,
        )
        .unwrap();
        assert_eq!(setup.kind, DialKind::Meter);
        assert_eq!(setup.config, RotaryConfig::meter());
        assert_eq!(setup.spring, None);

        let mut board = board();
        let id = board.mount(setup).unwrap();
        let dial = board.dial(id).unwrap();
        assert_eq!(dial.animator().unwrap().params(), &SpringParams::meter());
        assert_eq!(dial.state().readout(), "10%");
    }
}
