use std::time::{Duration, Instant};

use tracing::trace;

/// Outcome of feeding one frame to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoldUpdate {
    /// Fraction of the hold duration elapsed, in [0, 1].
    pub progress: f64,
    /// A fresh hold began on this frame.
    pub started: bool,
    /// The hold reached full duration on this frame. Fires once per hold.
    pub completed: bool,
    /// A hold in progress was broken by motion or lost input.
    pub cancelled: bool,
    /// Dimensions changed since last frame, or there is no shape.
    pub moved: bool,
}

/// Stillness detection over quantized dimensions. A hold is a run of frames
/// with identical non-zero unit dimensions; any change, or losing the shape,
/// restarts timing from zero.
#[derive(Debug, Clone)]
pub struct HoldTracker {
    hold_duration: Duration,
    hold_start: Option<Instant>,
    prev_dims: (u32, u32),
}

impl HoldTracker {
    pub fn new(hold_duration: Duration) -> Self {
        Self {
            hold_duration,
            hold_start: None,
            prev_dims: (0, 0),
        }
    }

    pub fn hold_duration(&self) -> Duration {
        self.hold_duration
    }

    pub fn is_holding(&self) -> bool {
        self.hold_start.is_some()
    }

    pub fn previous_dims(&self) -> (u32, u32) {
        self.prev_dims
    }

    /// Feed this frame's dimensions; `(0, 0)` means no shape.
    pub fn update(&mut self, dims: (u32, u32), now: Instant) -> HoldUpdate {
        let mut out = HoldUpdate::default();
        let still = dims == self.prev_dims && dims.0 != 0 && dims.1 != 0;

        if still {
            let start = match self.hold_start {
                Some(start) => start,
                None => {
                    self.hold_start = Some(now);
                    out.started = true;
                    trace!(w = dims.0, h = dims.1, "hold started");
                    now
                }
            };

            out.progress = self.progress_since(start, now);
            if out.progress >= 1.0 {
                out.completed = true;
                self.hold_start = None;
            }
        } else {
            out.moved = true;
            out.cancelled = self.hold_start.take().is_some();
        }

        self.prev_dims = dims;
        out
    }

    fn progress_since(&self, start: Instant, now: Instant) -> f64 {
        if self.hold_duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(start);
        (elapsed.as_secs_f64() / self.hold_duration.as_secs_f64()).min(1.0)
    }

    /// Back to neutral: no hold, no remembered dimensions.
    pub fn reset(&mut self) {
        self.hold_start = None;
        self.prev_dims = (0, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Feed `dims` every 20ms from `from` up to and including `to`.
    fn feed(
        tracker: &mut HoldTracker,
        t0: Instant,
        dims: (u32, u32),
        from: u64,
        to: u64,
    ) -> Vec<(u64, HoldUpdate)> {
        (from..=to)
            .step_by(20)
            .map(|t| (t, tracker.update(dims, t0 + ms(t))))
            .collect()
    }

    #[test]
    fn first_frame_only_primes_previous_dims() {
        let mut tracker = HoldTracker::new(ms(1000));
        let t0 = Instant::now();
        let out = tracker.update((3, 4), t0);
        assert!(!out.started);
        assert!(!tracker.is_holding());
        assert_eq!(tracker.previous_dims(), (3, 4));

        let out = tracker.update((3, 4), t0 + ms(20));
        assert!(out.started);
        assert_eq!(out.progress, 0.0);
    }

    #[test]
    fn full_hold_completes_exactly_once() {
        let mut tracker = HoldTracker::new(ms(1000));
        let t0 = Instant::now();
        let updates = feed(&mut tracker, t0, (3, 4), 0, 1040);
        let completions: Vec<u64> = updates
            .iter()
            .filter(|(_, u)| u.completed)
            .map(|(t, _)| *t)
            .collect();
        // hold starts on the second frame (t=20), completes at t=1020
        assert_eq!(completions, vec![1020]);
        assert!(!tracker.is_holding());
    }

    #[test]
    fn short_hold_never_completes() {
        let mut tracker = HoldTracker::new(ms(1000));
        let t0 = Instant::now();
        let updates = feed(&mut tracker, t0, (2, 5), 0, 900);
        assert!(updates.iter().all(|(_, u)| !u.completed));
        let (_, last) = updates.last().copied().unwrap_or_default();
        assert!(last.progress > 0.8 && last.progress < 1.0);
    }

    #[test]
    fn dimension_change_restarts_progress() {
        let mut tracker = HoldTracker::new(ms(1000));
        let t0 = Instant::now();
        feed(&mut tracker, t0, (3, 4), 0, 600);
        assert!(tracker.is_holding());

        let switched = tracker.update((3, 5), t0 + ms(620));
        assert!(switched.cancelled);
        assert_eq!(switched.progress, 0.0);

        // the original hold would have completed around t=1000
        let updates = feed(&mut tracker, t0, (3, 5), 640, 1200);
        assert!(updates.iter().all(|(_, u)| !u.completed));
        let restarted = updates[0].1;
        assert!(restarted.started);
        assert_eq!(restarted.progress, 0.0);
    }

    #[test]
    fn losing_shape_cancels_and_zero_dims_never_hold() {
        let mut tracker = HoldTracker::new(ms(1000));
        let t0 = Instant::now();
        feed(&mut tracker, t0, (2, 2), 0, 200);
        let lost = tracker.update((0, 0), t0 + ms(220));
        assert!(lost.cancelled);
        assert!(lost.moved);

        let updates = feed(&mut tracker, t0, (0, 0), 240, 2000);
        assert!(updates.iter().all(|(_, u)| !u.started && !u.completed));
    }

    #[test]
    fn static_shape_after_completion_needs_a_fresh_hold() {
        let mut tracker = HoldTracker::new(ms(1000));
        let t0 = Instant::now();
        feed(&mut tracker, t0, (4, 4), 0, 1020);

        let next = tracker.update((4, 4), t0 + ms(1040));
        assert!(next.started);
        assert!(!next.completed);

        let updates = feed(&mut tracker, t0, (4, 4), 1060, 2040);
        let count = updates.iter().filter(|(_, u)| u.completed).count();
        assert_eq!(count, 1);
    }

    #[test]
    fn reset_forgets_previous_dims() {
        let mut tracker = HoldTracker::new(ms(1000));
        let t0 = Instant::now();
        feed(&mut tracker, t0, (3, 3), 0, 100);
        tracker.reset();
        assert_eq!(tracker.previous_dims(), (0, 0));
        let out = tracker.update((3, 3), t0 + ms(120));
        assert!(!out.started);
    }
}
