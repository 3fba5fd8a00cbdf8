/// Result of a single countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStatus {
    /// Still counting; the value is what is left to show.
    Running(u32),
    /// This tick reached zero. Reported once.
    Finished,
    /// Nothing is counting.
    Idle,
}

/// Discrete countdown driven by an external timer.
///
/// The owner decides when a tick happens; this only keeps the count.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    remaining: Option<u32>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, ticks: u32) {
        self.remaining = Some(ticks);
    }

    pub fn tick(&mut self) -> CountdownStatus {
        match self.remaining {
            None => CountdownStatus::Idle,
            Some(n) if n <= 1 => {
                self.remaining = None;
                CountdownStatus::Finished
            }
            Some(n) => {
                self.remaining = Some(n - 1);
                CountdownStatus::Running(n - 1)
            }
        }
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_ticks_to_finish() {
        let mut countdown = Countdown::new();
        countdown.start(5);
        assert_eq!(countdown.remaining(), Some(5));

        let statuses: Vec<_> = (0..5).map(|_| countdown.tick()).collect();
        assert_eq!(
            statuses,
            vec![
                CountdownStatus::Running(4),
                CountdownStatus::Running(3),
                CountdownStatus::Running(2),
                CountdownStatus::Running(1),
                CountdownStatus::Finished,
            ]
        );
        assert!(!countdown.is_active());
        assert_eq!(countdown.tick(), CountdownStatus::Idle);
    }

    #[test]
    fn cancel_stops_counting() {
        let mut countdown = Countdown::new();
        countdown.start(3);
        countdown.tick();
        countdown.cancel();
        assert_eq!(countdown.remaining(), None);
        assert_eq!(countdown.tick(), CountdownStatus::Idle);
    }

    #[test]
    fn zero_length_finishes_on_first_tick() {
        let mut countdown = Countdown::new();
        countdown.start(0);
        assert_eq!(countdown.tick(), CountdownStatus::Finished);
    }
}
