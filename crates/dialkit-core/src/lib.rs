//! DialKit Core Library
//!
//! Platform-agnostic logic for rotary widgets: drag-to-rotate knobs and tone
//! arms, and spring-animated analog meters. Angles are in degrees with 0° at
//! the top of the dial, increasing clockwise.

pub mod angle;
pub mod animator;
pub mod board;
pub mod config;
pub mod controller;
pub mod quantize;
pub mod resolver;
pub mod scale;
pub mod scheduler;
pub mod session;
pub mod store;

/// Identifies a mounted widget.
pub type WidgetId = uuid::Uuid;

pub use angle::{AngleRange, angle_from_offset, normalize_degrees};
pub use animator::{DisplayState, NeedleAnimator, SpringParams};
pub use board::{Dial, DialBoard, DialKind, DialSetup};
pub use config::{ConfigError, ConfigResult, RotaryConfig, ValueRange};
pub use controller::{DragState, RotaryInputController, ValueChanged};
pub use quantize::{angle_to_value, quantize, value_to_angle};
pub use resolver::{WidgetCenter, clamp_to_arc, resolve};
pub use scale::{ArcGeometry, ScaleMark, ScaleStyle, arc_geometry, scale_marks};
pub use scheduler::{FrameClock, FrameHandle, FrameScheduler, ManualScheduler};
pub use session::{DragSession, ListenerGuard, ListenerRegistry};
pub use store::{DialState, DialStatePatch};
