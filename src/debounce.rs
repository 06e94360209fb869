use std::time::Duration;

/// Holds at most one pending timer.
///
/// `T` is the timer handle (a yew `TimeoutTask` in the app); replacing it
/// drops the old handle, which cancels the old timer. Each timer is tagged
/// with a generation so a callback that still slips through is ignored.
pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Starts a new timer through `spawn(generation, delay)`, cancelling the
    /// pending one.
    pub fn restart<F>(&mut self, spawn: F)
    where
        F: FnOnce(u64, Duration) -> T,
    {
        self.pending = None;
        self.generation += 1;
        self.pending = Some(spawn(self.generation, self.delay));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Called when the timer for `generation` fires. True only for the live
    /// timer, which is consumed.
    pub fn fire(&mut self, generation: u64) -> bool {
        if self.pending.is_some() && generation == self.generation {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
