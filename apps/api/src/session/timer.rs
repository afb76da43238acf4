//! Cancellable one-shot countdown.
//!
//! A `Countdown` holds at most one pending expiry. `start` replaces whatever
//! was running, `tick` yields the expiry payload exactly once when the count
//! reaches zero, and `cancel` drops it. It has no clock of its own: the
//! session runtime ticks it once per second.

#[derive(Debug, Clone)]
pub struct Countdown<E> {
    remaining: u32,
    on_expire: Option<E>,
}

impl<E> Default for Countdown<E> {
    fn default() -> Self {
        Self {
            remaining: 0,
            on_expire: None,
        }
    }
}

impl<E> Countdown<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new countdown, superseding any running one.
    pub fn start(&mut self, seconds: u32, on_expire: E) {
        self.remaining = seconds;
        self.on_expire = Some(on_expire);
    }

    /// Advances one second. Returns the payload on the tick that reaches zero.
    pub fn tick(&mut self) -> Option<E> {
        self.on_expire.as_ref()?;
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.on_expire.take()
        } else {
            None
        }
    }

    /// Stops the countdown. Safe to call when nothing is running.
    pub fn cancel(&mut self) {
        self.remaining = 0;
        self.on_expire = None;
    }

    pub fn is_active(&self) -> bool {
        self.on_expire.is_some()
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}
