use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::celebration::Celebration;
use crate::config::{ConfigError, GameConfig};
use crate::countdown::{Countdown, CountdownStatus};
use crate::geometry::{quantize, QuantizedRect};
use crate::puzzle::{Puzzle, PuzzleError, PuzzleSequence};
use crate::stability::HoldTracker;
use crate::tracking::HandFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    WaitingForInput,
    Holding,
    Success,
    FailFlashing,
}

/// What a completed hold led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldOutcome {
    Solved,
    Missed,
    /// Already celebrating, or nothing on screen to judge.
    Ignored,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
}

/// Timed "wrong answer" marker. Purely visual; never blocks input.
///
/// The session keeps two: the red tint on the live shape, which motion or a
/// fresh hold wipes, and the "wrong" notice, which always runs its full window.
#[derive(Debug, Clone)]
pub struct FailFlash {
    set_at: Option<Instant>,
    duration: Duration,
}

impl FailFlash {
    pub fn new(duration: Duration) -> Self {
        Self {
            set_at: None,
            duration,
        }
    }

    /// Starts the window, overwriting any window already running.
    pub fn trigger(&mut self, now: Instant) {
        self.set_at = Some(now);
    }

    pub fn clear(&mut self) {
        self.set_at = None;
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.set_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.duration)
    }

    /// Drop the window once it has run its course. Returns true if it just expired.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.set_at.is_some() && !self.is_active(now) {
            self.set_at = None;
            return true;
        }
        false
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub phase: SessionPhase,
    /// Pixel positions of every detected fingertip.
    pub fingertips: Vec<(f64, f64)>,
    /// Live shape, or the frozen one while celebrating.
    pub shape: Option<QuantizedRect>,
    pub area: u32,
    pub perimeter: u32,
    pub area_matches: bool,
    pub perimeter_matches: bool,
    pub hold_progress: f64,
    /// Red tint on the live shape.
    pub fail_flash: bool,
    /// "Wrong" label; unaffected by input until it times out.
    pub fail_notice: bool,
    pub frozen: Option<QuantizedRect>,
    pub target: Puzzle,
    /// 1-based.
    pub level: usize,
    pub total: usize,
    pub level_progress: f64,
    pub countdown: Option<u32>,
    pub celebration: Option<Celebration>,
}

/// Everything that lives across frames: the puzzle order, the hold tracker,
/// the fail flash, the success countdown and the frozen shape.
///
/// Hosts call [`Session::process_frame`] once per video frame and
/// [`Session::tick_countdown`] from whatever repeating timer they have. Both
/// must run on the same thread, or behind a single lock.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    sequence: PuzzleSequence,
    tracker: HoldTracker,
    fail_flash: FailFlash,
    fail_notice: FailFlash,
    countdown: Countdown,
    frozen: Option<QuantizedRect>,
    celebration: Option<Celebration>,
    shape: Option<QuantizedRect>,
    fingertips: Vec<(f64, f64)>,
    hold_progress: f64,
    solved: u64,
}

impl Session {
    pub fn new(config: GameConfig, seed: Option<u64>) -> Result<Self, SessionError> {
        config.validate()?;
        let sequence = match seed {
            Some(seed) => PuzzleSequence::with_seed(config.puzzles.clone(), seed)?,
            None => PuzzleSequence::from_entropy(config.puzzles.clone())?,
        };
        Ok(Self::with_sequence(config, sequence))
    }

    /// Build around an existing sequence; its catalog wins over `config.puzzles`.
    pub fn with_sequence(config: GameConfig, sequence: PuzzleSequence) -> Self {
        Self {
            tracker: HoldTracker::new(config.hold_duration()),
            fail_flash: FailFlash::new(config.fail_flash_duration()),
            fail_notice: FailFlash::new(config.fail_flash_duration()),
            countdown: Countdown::new(),
            frozen: None,
            celebration: None,
            shape: None,
            fingertips: Vec::new(),
            hold_progress: 0.0,
            solved: 0,
            sequence,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn target(&self) -> Puzzle {
        self.sequence.current()
    }

    pub fn sequence(&self) -> &PuzzleSequence {
        &self.sequence
    }

    pub fn solved(&self) -> u64 {
        self.solved
    }

    pub fn is_success(&self) -> bool {
        self.frozen.is_some()
    }

    pub fn frozen_shape(&self) -> Option<&QuantizedRect> {
        self.frozen.as_ref()
    }

    pub fn tracker(&self) -> &HoldTracker {
        &self.tracker
    }

    pub fn fail_flash_active(&self, now: Instant) -> bool {
        self.fail_flash.is_active(now)
    }

    pub fn fail_notice_active(&self, now: Instant) -> bool {
        self.fail_notice.is_active(now)
    }

    pub fn phase(&self, now: Instant) -> SessionPhase {
        if self.is_success() {
            SessionPhase::Success
        } else if self.tracker.is_holding() {
            SessionPhase::Holding
        } else if self.fail_flash.is_active(now) {
            SessionPhase::FailFlashing
        } else {
            SessionPhase::WaitingForInput
        }
    }

    /// Run one frame of gesture input.
    pub fn process_frame(&mut self, frame: &HandFrame, now: Instant) -> FrameReport {
        self.expire_fail_flash(now);

        if self.is_success() {
            return self.report(now);
        }

        let mirrored;
        let frame = if self.config.mirror {
            mirrored = frame.mirrored();
            &mirrored
        } else {
            frame
        };

        let canvas = self.config.canvas();
        self.fingertips = frame
            .fingertips()
            .into_iter()
            .map(|p| canvas.project(p))
            .collect();

        let Some([a, b]) = frame.fingertip_pair() else {
            self.shape = None;
            self.hold_progress = 0.0;
            self.tracker.update((0, 0), now);
            self.fail_flash.clear();
            return self.report(now);
        };

        let rect = quantize(a, b, canvas, self.config.unit_px);
        self.shape = Some(rect);

        let hold = self.tracker.update(rect.dims(), now);
        if hold.started || hold.moved {
            self.fail_flash.clear();
        }
        self.hold_progress = hold.progress;

        if hold.completed {
            self.complete_hold(rect, now);
        }

        self.report(now)
    }

    /// Judge the current shape as if a hold had just completed.
    ///
    /// A no-op while celebrating, so a late or duplicate signal cannot
    /// restart the countdown.
    pub fn signal_hold_complete(&mut self, now: Instant) -> HoldOutcome {
        match self.shape {
            Some(rect) => self.complete_hold(rect, now),
            None => HoldOutcome::Ignored,
        }
    }

    fn complete_hold(&mut self, rect: QuantizedRect, now: Instant) -> HoldOutcome {
        if self.is_success() {
            debug!("hold complete while celebrating, ignored");
            return HoldOutcome::Ignored;
        }

        let target = self.sequence.current();
        if target.is_solved_by(rect.area(), rect.perimeter()) {
            let celebration = Celebration::start(rect.dimension_label());
            info!(
                area = target.area,
                perimeter = target.perimeter,
                shape = %rect.dimension_label(),
                praise = celebration.message,
                "puzzle solved"
            );
            self.frozen = Some(rect);
            self.shape = Some(rect);
            self.celebration = Some(celebration);
            self.countdown.start(self.config.countdown_ticks);
            self.fail_flash.clear();
            self.fail_notice.clear();
            self.solved += 1;
            HoldOutcome::Solved
        } else {
            debug!(
                area = rect.area(),
                perimeter = rect.perimeter(),
                target_area = target.area,
                target_perimeter = target.perimeter,
                "held shape does not match"
            );
            self.fail_flash.trigger(now);
            self.fail_notice.trigger(now);
            HoldOutcome::Missed
        }
    }

    /// One tick of the success countdown. Reaching zero moves on to the
    /// next puzzle.
    pub fn tick_countdown(&mut self, now: Instant) -> CountdownStatus {
        self.expire_fail_flash(now);
        if !self.is_success() {
            return CountdownStatus::Idle;
        }
        let status = self.countdown.tick();
        if status == CountdownStatus::Finished {
            self.advance();
        }
        status
    }

    fn advance(&mut self) {
        self.countdown.cancel();
        self.frozen = None;
        self.celebration = None;
        self.shape = None;
        self.fingertips.clear();
        self.hold_progress = 0.0;
        self.tracker.reset();
        let next = self.sequence.advance();
        info!(
            level = self.sequence.position() + 1,
            area = next.area,
            perimeter = next.perimeter,
            "next puzzle"
        );
    }

    fn expire_fail_flash(&mut self, now: Instant) {
        if self.fail_flash.expire(now) {
            debug!("fail flash expired");
        }
        self.fail_notice.expire(now);
    }

    pub fn report(&self, now: Instant) -> FrameReport {
        let target = self.sequence.current();
        let success = self.is_success();
        let shape = if success { self.frozen } else { self.shape };
        let (area, perimeter) = shape.map_or((0, 0), |r| (r.area(), r.perimeter()));
        let position = self.sequence.position();
        let total = self.sequence.len();

        FrameReport {
            phase: self.phase(now),
            fingertips: if success {
                Vec::new()
            } else {
                self.fingertips.clone()
            },
            shape,
            area,
            perimeter,
            area_matches: shape.is_some() && target.area_matches(area),
            perimeter_matches: shape.is_some() && target.perimeter_matches(perimeter),
            hold_progress: if success { 1.0 } else { self.hold_progress },
            fail_flash: self.fail_flash.is_active(now),
            fail_notice: self.fail_notice.is_active(now),
            frozen: self.frozen,
            target,
            level: position + 1,
            total,
            level_progress: if success {
                (position + 1) as f64 / total as f64
            } else {
                self.sequence.completed_fraction()
            },
            countdown: self.countdown.remaining(),
            celebration: self.celebration.clone(),
        }
    }
}
