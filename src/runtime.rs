use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

use crate::tracking::HandFrame;

#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    /// A tracked frame pushed by an external detector or a recording.
    Frame(HandFrame),
    /// The frame deadline passed at this instant.
    Tick(Instant),
}

/// Anything the game loop can wait on for input.
pub trait InputSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

impl InputSource for Receiver<GameEvent> {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        Receiver::recv_timeout(self, timeout)
    }
}

/// Spawn a reader thread that forwards key presses and resizes.
/// Key releases are dropped so platforms that report them do not move a
/// fingertip twice per press.
pub fn terminal_events() -> Receiver<GameEvent> {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || loop {
        let ev = match event::read() {
            Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => GameEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => GameEvent::Resize,
            Ok(_) => continue,
            Err(_) => break,
        };
        if tx.send(ev).is_err() {
            break;
        }
    });

    rx
}

/// Interleaves input events with frame ticks on a fixed cadence.
///
/// The frame deadline is absolute: a stream of key repeats cannot push it
/// back, so virtual hands keep producing frames while a key is held.
pub struct Runner<S: InputSource> {
    source: S,
    frame_interval: Duration,
    next_frame: Instant,
}

impl<S: InputSource> Runner<S> {
    pub fn new(source: S, frame_interval: Duration) -> Self {
        Self {
            source,
            frame_interval,
            next_frame: Instant::now() + frame_interval,
        }
    }

    /// Next input event, or `Tick` once the frame deadline has passed.
    pub fn step(&mut self) -> GameEvent {
        let now = Instant::now();
        if now < self.next_frame {
            match self.source.recv_timeout(self.next_frame - now) {
                Ok(ev) => return ev,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    std::thread::sleep(self.next_frame.saturating_duration_since(Instant::now()));
                }
            }
        }

        let now = Instant::now();
        self.next_frame += self.frame_interval;
        if self.next_frame <= now {
            // stalled for more than a frame; skip the missed ones
            self.next_frame = now + self.frame_interval;
        }
        GameEvent::Tick(now)
    }
}

/// Repeating timer polled from the frame loop.
///
/// Hosts without a native interval timer ask it how many ticks fell due
/// since the last poll and deliver them in order.
#[derive(Clone, Copy, Debug)]
pub struct IntervalTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Start counting from `now`; the first tick falls due one interval later.
    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Number of ticks that fell due up to `now`.
    pub fn due(&mut self, now: Instant) -> u32 {
        let mut ticks = 0;
        while let Some(at) = self.next_due {
            if at > now || self.interval.is_zero() {
                break;
            }
            ticks += 1;
            self.next_due = Some(at + self.interval);
        }
        ticks
    }
}
