//! Headless DialKit host.
//!
//! Mounts a knob, a tone arm and a meter linked to the arm, replays a scripted
//! drag on each input and steps the needle animation on a simulated clock.
//! Run with `RUST_LOG=debug` to see the widgets' own logging.

use std::process::ExitCode;
use std::time::Instant;

use dialkit_core::{DialBoard, DialKind, DialSetup, FrameClock, ScaleStyle, WidgetId, scale_marks};
use kurbo::{Point, Rect};

const PANEL: &str = r#"[
    {
        "kind": "knob",
        "config": {"min": 0, "max": 360, "step": 1, "continuous": true},
        "state": {"value": 45, "label": "Angle", "unit": "°"}
    },
    {
        "kind": "tone_arm",
        "config": {"min": 0, "max": 100, "start_angle": -90, "end_angle": 90},
        "state": {"value": 25, "label": "Arm", "unit": "%"}
    },
    {
        "kind": "meter",
        "config": {"min": 0, "max": 100, "start_angle": -130, "end_angle": 130},
        "state": {"value": 25, "label": "Level", "unit": "%"}
    }
]"#;

/// Frames to run before giving up on the needle settling.
const MAX_FRAMES: usize = 2_000;

fn pointer_at(bounds: Rect, angle: f64) -> Point {
    let rad = angle.to_radians();
    let center = bounds.center();
    let radius = bounds.width().min(bounds.height()) * 0.4;
    Point::new(center.x + radius * rad.sin(), center.y - radius * rad.cos())
}

fn drag(board: &mut DialBoard, id: WidgetId, bounds: Rect, angles: &[f64]) {
    let Some(first) = angles.first() else {
        return;
    };
    board.pointer_down(id, pointer_at(bounds, *first), bounds);
    for &angle in angles {
        for change in board.pointer_move(pointer_at(bounds, angle)) {
            log::info!("pointer at {:6.1}° -> value {}", change.angle, change.value);
        }
    }
    board.pointer_up();
}

fn run_frames(board: &mut DialBoard, meter: WidgetId) -> usize {
    let interval = board.scheduler().interval();
    let mut now = Instant::now();
    let mut frames = 0;
    while board.is_animating() && frames < MAX_FRAMES {
        now += interval;
        if board.poll(now) > 0 {
            frames += 1;
            if frames % 10 == 0 {
                if let Some(dial) = board.dial(meter) {
                    let readout = dial.animator().map(|a| a.readout()).unwrap_or_default();
                    log::info!("frame {:4}: needle {:7.2}° reads {:5.1}", frames, dial.display_angle(), readout);
                }
            }
        }
    }
    frames
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting DialKit demo");

    let setups: Vec<DialSetup> = match serde_json::from_str(PANEL) {
        Ok(setups) => setups,
        Err(e) => {
            log::error!("Invalid panel description: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut board = DialBoard::new(FrameClock::default());
    let mut ids = Vec::with_capacity(setups.len());
    for setup in setups {
        let kind = setup.kind;
        match board.mount(setup) {
            Ok(id) => ids.push((kind, id)),
            Err(e) => {
                log::error!("Failed to mount {:?}: {}", kind, e);
                return ExitCode::FAILURE;
            }
        }
    }
    let find = |kind: DialKind| ids.iter().find(|(k, _)| *k == kind).map(|(_, id)| *id);
    let (Some(knob), Some(arm), Some(meter)) = (find(DialKind::Knob), find(DialKind::ToneArm), find(DialKind::Meter))
    else {
        log::error!("Panel must contain a knob, a tone arm and a meter");
        return ExitCode::FAILURE;
    };
    board.link(arm, meter);

    if let Some(dial) = board.dial(meter) {
        let majors: Vec<String> = scale_marks(dial.config(), &ScaleStyle::meter())
            .into_iter()
            .filter(|m| m.major)
            .map(|m| format!("{}@{:.0}°", m.value, m.angle))
            .collect();
        log::info!("meter scale: {}", majors.join(" "));
    }

    let knob_bounds = Rect::new(0.0, 0.0, 16.0, 16.0);
    log::info!("Dragging knob once around");
    drag(&mut board, knob, knob_bounds, &[45.0, 135.0, 225.0, 315.0, 359.0, 10.0]);

    let arm_bounds = Rect::new(40.0, 0.0, 120.0, 80.0);
    log::info!("Swinging tone arm to the far end, past the stop");
    drag(&mut board, arm, arm_bounds, &[-45.0, 0.0, 45.0, 90.0, 150.0]);
    let frames = run_frames(&mut board, meter);
    log::info!("Meter settled after {} frames", frames);

    log::info!("Dropping tone arm back to zero");
    drag(&mut board, arm, arm_bounds, &[90.0, -90.0]);
    let frames = run_frames(&mut board, meter);
    log::info!("Meter settled after {} frames", frames);

    for (kind, id) in &ids {
        if let Some(dial) = board.dial(*id) {
            log::info!(
                "{:?} {}: {} at {:.1}°",
                kind,
                dial.state().label,
                dial.state().readout(),
                dial.display_angle()
            );
        }
    }

    if board.is_animating() {
        log::warn!("Needle still moving after {} frames", MAX_FRAMES);
    }
    ExitCode::SUCCESS
}
