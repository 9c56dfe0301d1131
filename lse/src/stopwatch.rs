use web_time::{Duration, Instant};

/// A clock used to time the stages of a selection run.
///
/// Timings are only logged, they never change the outcome of a run.
pub trait Stopwatch: Send {
    /// Time since the previous lap (or since start for the first one)
    fn lap(&mut self) -> Duration;

    /// Time since start
    fn elapsed(&self) -> Duration;
}

/// A stopwatch backed by a monotonic clock
#[derive(Clone, Debug)]
pub struct InstantStopwatch {
    start: Instant,
    last: Instant,
}

impl Default for InstantStopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl InstantStopwatch {
    /// Start a new stopwatch
    pub fn new() -> Self {
        let now = Instant::now();
        InstantStopwatch {
            start: now,
            last: now,
        }
    }
}

impl Stopwatch for InstantStopwatch {
    fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let lap = now.duration_since(self.last);
        self.last = now;
        lap
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// A stopwatch that always reads zero
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStopwatch;

impl Stopwatch for NoStopwatch {
    fn lap(&mut self) -> Duration {
        Duration::ZERO
    }

    fn elapsed(&self) -> Duration {
        Duration::ZERO
    }
}
