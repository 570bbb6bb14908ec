//! Frame scheduling for animations.
//!
//! Animations ask for "the next frame" and may cancel that request. A host
//! decides when frames fire: from a display refresh callback, a fixed-rate
//! timer, or by hand in tests.

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// Default frame interval (~60 Hz).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Identifies one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Schedules one-shot frame callbacks.
pub trait FrameScheduler {
    /// Request a callback on the next frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a pending request. Unknown or already-fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Bookkeeping shared by the scheduler implementations.
#[derive(Debug, Clone, Default)]
struct PendingFrames {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl PendingFrames {
    fn request(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
    }

    fn take(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }
}

/// Scheduler whose frames fire only when the caller says so.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    frames: PendingFrames,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that have not fired or been cancelled.
    pub fn pending(&self) -> &[FrameHandle] {
        &self.frames.pending
    }

    /// Fire the current frame: returns and clears every pending request.
    pub fn fire(&mut self) -> Vec<FrameHandle> {
        self.frames.take()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.frames.request()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.cancel(handle);
    }
}

/// Fixed-rate scheduler on a monotonic clock.
///
/// Requests made during a frame fire on the next one, no sooner than
/// `interval` after the previous frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    last_frame: Option<Instant>,
    frames: PendingFrames,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_frame: None,
            frames: PendingFrames::default(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether any request is waiting for a frame.
    pub fn has_pending(&self) -> bool {
        !self.frames.pending.is_empty()
    }

    /// Earliest instant at which the next frame may fire.
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.has_pending() {
            return None;
        }
        Some(match self.last_frame {
            Some(last) => last + self.interval,
            None => Instant::now(),
        })
    }

    /// Fire a frame if one is due at `now`, returning the requests it serves.
    pub fn poll(&mut self, now: Instant) -> Vec<FrameHandle> {
        if !self.has_pending() {
            return Vec::new();
        }
        if let Some(last) = self.last_frame {
            if now.saturating_duration_since(last) < self.interval {
                return Vec::new();
            }
        }
        self.last_frame = Some(now);
        self.frames.take()
    }
}

impl FrameScheduler for FrameClock {
    fn request_frame(&mut self) -> FrameHandle {
        self.frames.request()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.cancel(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_request_and_fire() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.request_frame();
        let b = scheduler.request_frame();
        assert_ne!(a, b);
        assert_eq!(scheduler.pending(), &[a, b]);
        assert_eq!(scheduler.fire(), vec![a, b]);
        assert!(scheduler.pending().is_empty());
        assert!(scheduler.fire().is_empty());
    }

    #[test]
    fn test_manual_cancel() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.request_frame();
        let b = scheduler.request_frame();
        scheduler.cancel_frame(a);
        scheduler.cancel_frame(a);
        assert_eq!(scheduler.fire(), vec![b]);
    }

    #[test]
    fn test_clock_paces_frames() {
        let mut clock = FrameClock::new(Duration::from_millis(16));
        let start = Instant::now();
        assert!(clock.poll(start).is_empty());

        let first = clock.request_frame();
        assert_eq!(clock.poll(start), vec![first]);

        let second = clock.request_frame();
        assert!(clock.poll(start + Duration::from_millis(5)).is_empty());
        assert!(clock.has_pending());
        assert_eq!(clock.next_deadline(), Some(start + Duration::from_millis(16)));
        assert_eq!(clock.poll(start + Duration::from_millis(16)), vec![second]);
        assert!(!clock.has_pending());
        assert_eq!(clock.next_deadline(), None);
    }

    #[test]
    fn test_clock_cancel() {
        let mut clock = FrameClock::default();
        let handle = clock.request_frame();
        clock.cancel_frame(handle);
        assert!(!clock.has_pending());
        assert!(clock.poll(Instant::now()).is_empty());
    }
}
