//! Spring-damper needle animation with mechanical end stops.
//!
//! The needle accelerates toward its target in proportion to the remaining
//! distance, loses a fraction of its velocity every tick and bounces off the
//! pegs at either end of a bounded arc.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigResult, RotaryConfig, ensure_finite};
use crate::quantize::{angle_to_raw_value, value_to_angle};
use crate::scheduler::{FrameHandle, FrameScheduler};

/// Tuning constants for the needle simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringParams {
    /// Fraction of the remaining distance added to velocity each tick.
    pub spring_strength: f64,
    /// Velocity multiplier applied each tick.
    pub damping: f64,
    /// Fraction of speed kept after hitting a peg.
    pub restitution: f64,
    /// Animation continues while speed exceeds this (degrees per tick).
    pub min_velocity: f64,
    /// Animation continues while the distance to target exceeds this (degrees).
    pub min_delta: f64,
    /// Scales the velocity kick applied when the target jumps.
    pub impulse_gain: f64,
    /// Growth of the kick multiplier per degree of jump.
    pub boost_rate: f64,
    /// Upper limit on the kick multiplier.
    pub boost_cap: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::meter()
    }
}

impl SpringParams {
    /// Heavy, slow-settling galvanometer needle.
    pub fn meter() -> Self {
        Self {
            spring_strength: 0.0325,
            damping: 0.925,
            restitution: 0.6,
            min_velocity: 0.01,
            min_delta: 0.1,
            impulse_gain: 0.125,
            boost_rate: 0.0125,
            boost_cap: 2.0,
        }
    }

    /// Stiffer spring that settles quickly.
    pub fn snappy() -> Self {
        Self {
            spring_strength: 0.125,
            damping: 0.875,
            ..Self::meter()
        }
    }

    /// Check that the constants describe a stable, terminating simulation.
    pub fn validate(&self) -> ConfigResult<()> {
        let fields = [
            ("spring_strength", self.spring_strength),
            ("damping", self.damping),
            ("restitution", self.restitution),
            ("min_velocity", self.min_velocity),
            ("min_delta", self.min_delta),
            ("impulse_gain", self.impulse_gain),
            ("boost_rate", self.boost_rate),
            ("boost_cap", self.boost_cap),
        ];
        for (name, value) in fields {
            ensure_finite(name, value)?;
            if value < 0.0 {
                return Err(ConfigError::InvalidSpring { name, value });
            }
        }
        if self.spring_strength == 0.0 || self.spring_strength > 1.0 {
            return Err(ConfigError::InvalidSpring {
                name: "spring_strength",
                value: self.spring_strength,
            });
        }
        if self.damping == 0.0 || self.damping >= 1.0 {
            return Err(ConfigError::InvalidSpring {
                name: "damping",
                value: self.damping,
            });
        }
        if self.restitution > 1.0 {
            return Err(ConfigError::InvalidSpring {
                name: "restitution",
                value: self.restitution,
            });
        }
        if self.min_velocity == 0.0 || self.min_delta == 0.0 {
            return Err(ConfigError::InvalidSpring {
                name: if self.min_velocity == 0.0 { "min_velocity" } else { "min_delta" },
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Simulation state of the needle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Displayed angle in degrees.
    pub current: f64,
    /// Degrees per tick.
    pub velocity: f64,
    /// Target the animation was last started toward.
    pub last_target: f64,
}

impl DisplayState {
    /// Needle resting at `angle`.
    pub fn at_rest(angle: f64) -> Self {
        Self {
            current: angle,
            velocity: 0.0,
            last_target: angle,
        }
    }
}

/// Animates a needle toward the angle of the latest value.
#[derive(Debug, Clone)]
pub struct NeedleAnimator {
    config: RotaryConfig,
    params: SpringParams,
    state: DisplayState,
    target: f64,
    pending: Option<FrameHandle>,
}

impl NeedleAnimator {
    /// Create an animator with the needle resting at `value`.
    pub fn new(config: RotaryConfig, params: SpringParams, value: f64) -> ConfigResult<Self> {
        params.validate()?;
        let mut animator = Self {
            config,
            params,
            state: DisplayState::at_rest(0.0),
            target: 0.0,
            pending: None,
        };
        let target = animator.target_for(value);
        animator.state = DisplayState::at_rest(target);
        animator.target = target;
        Ok(animator)
    }

    /// Needle angle for `value`, held at the pegs when the value is out of range.
    fn target_for(&self, value: f64) -> f64 {
        let angle = value_to_angle(value, &self.config);
        match self.bounds() {
            Some((lower, upper)) => angle.clamp(lower, upper),
            None => angle,
        }
    }

    pub fn config(&self) -> &RotaryConfig {
        &self.config
    }

    pub fn params(&self) -> &SpringParams {
        &self.params
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Angle to draw the needle at.
    pub fn angle(&self) -> f64 {
        self.state.current
    }

    pub fn velocity(&self) -> f64 {
        self.state.velocity
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Whether a frame is scheduled.
    pub fn is_animating(&self) -> bool {
        self.pending.is_some()
    }

    /// Peg positions, or `None` in continuous mode where the dial wraps.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        if self.config.is_continuous() {
            None
        } else {
            Some(self.config.angles().bounds())
        }
    }

    /// Value under the needle, unquantized, for a live numeric readout.
    pub fn readout(&self) -> f64 {
        angle_to_raw_value(self.state.current, &self.config)
    }

    /// Retarget the needle at `value`.
    ///
    /// Returns `false` when the target is unchanged. Otherwise the needle gets
    /// a velocity kick toward the new target, any pending frame is cancelled
    /// and a fresh one is requested.
    pub fn set_value(&mut self, value: f64, scheduler: &mut dyn FrameScheduler) -> bool {
        let target = self.target_for(value);
        if !target.is_finite() || target == self.state.last_target {
            return false;
        }
        self.target = target;
        self.state.last_target = target;

        let jump = target - self.state.current;
        let boost = (jump.abs() * self.params.boost_rate).min(self.params.boost_cap);
        self.state.velocity += jump * self.params.impulse_gain * boost;

        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        self.pending = Some(scheduler.request_frame());
        log::debug!(
            "needle retarget {:.2}° -> {:.2}° (kick {:.3})",
            self.state.current,
            target,
            self.state.velocity
        );
        true
    }

    /// Handle a fired frame. Returns the new angle if `handle` was ours.
    ///
    /// Stale handles are ignored, so a superseded request never produces a
    /// second tick in the same frame.
    pub fn on_frame(&mut self, handle: FrameHandle, scheduler: &mut dyn FrameScheduler) -> Option<f64> {
        if self.pending != Some(handle) {
            return None;
        }
        self.pending = None;
        if self.step() {
            self.pending = Some(scheduler.request_frame());
        } else {
            log::debug!("needle settled at {:.2}°", self.state.current);
        }
        Some(self.state.current)
    }

    /// Advance the simulation by one tick. Returns whether it should keep going.
    pub fn step(&mut self) -> bool {
        let delta = self.target - self.state.current;
        let acceleration = delta * self.params.spring_strength;
        let velocity = (self.state.velocity + acceleration) * self.params.damping;
        let candidate = self.state.current + velocity;

        match self.bounds() {
            Some((lower, _)) if candidate < lower => {
                self.state.current = lower;
                self.state.velocity = velocity.abs() * self.params.restitution;
                log::trace!("needle hit lower peg at {:.2}°", lower);
            }
            Some((_, upper)) if candidate > upper => {
                self.state.current = upper;
                self.state.velocity = -velocity.abs() * self.params.restitution;
                log::trace!("needle hit upper peg at {:.2}°", upper);
            }
            _ => {
                self.state.current = candidate;
                self.state.velocity = velocity;
            }
        }

        log::trace!(
            "needle tick at {:.2}° (velocity {:.3}, target {:.2}°)",
            self.state.current,
            self.state.velocity,
            self.target
        );
        self.state.velocity.abs() > self.params.min_velocity || delta.abs() > self.params.min_delta
    }

    /// Cancel any scheduled frame, leaving the needle where it is.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
    }
}
