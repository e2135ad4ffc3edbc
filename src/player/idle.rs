use std::time::{Duration, Instant};

pub const IDLE_PERIOD: Duration = Duration::from_millis(2_000);

/// A cancellable one-shot deadline. Rescheduling replaces the pending deadline.
#[derive(Debug, Clone, Copy)]
pub struct IdleTimer {
    period: Duration,
    deadline: Option<Instant>,
}

impl IdleTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for IdleTimer {
    fn default() -> Self {
        Self::new(IDLE_PERIOD)
    }
}

/// Open/closed state of the expanded player controls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlPanel {
    open: bool,
    show_playlist: bool,
    idle: IdleTimer,
}

impl ControlPanel {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn shows_playlist(&self) -> bool {
        self.show_playlist
    }

    pub fn idle_deadline(&self) -> Option<Instant> {
        self.idle.deadline()
    }

    pub fn open(&mut self, now: Instant) {
        self.open = true;
        self.idle.schedule(now);
    }

    pub fn close(&mut self) {
        self.open = false;
        self.idle.cancel();
    }

    /// Any interaction with an open panel restarts the idle period.
    pub fn touch(&mut self, now: Instant) {
        if self.open {
            self.idle.schedule(now);
        }
    }

    pub fn toggle_playlist(&mut self, now: Instant) {
        self.show_playlist = !self.show_playlist;
        self.touch(now);
    }

    /// Closes the panel when the idle period has elapsed. Returns true if it closed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.open && self.idle.poll(now) {
            self.open = false;
            return true;
        }
        false
    }
}
