use std::time::Duration;

/// A single pending "run this after D" slot.
///
/// The session only ever waits on one timer at a time, so scheduling replaces
/// whatever was pending. Deadlines are monotonic nanoseconds from a [`Timer`].
///
/// [`Timer`]: crate::Timer
#[derive(Debug, Clone)]
pub struct Schedule<A> {
    pending: Option<(u64, A)>,
}

impl<A> Schedule<A> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    pub fn after(&mut self, now_ns: u64, delay: Duration, action: A) {
        let due = now_ns.saturating_add(delay.as_nanos() as u64);
        self.pending = Some((due, action));
    }

    /// Removes and returns the pending action once its deadline has passed.
    pub fn take_due(&mut self, now_ns: u64) -> Option<A> {
        match self.pending {
            Some((due, _)) if now_ns >= due => self.pending.take().map(|(_, a)| a),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    pub fn remaining(&self, now_ns: u64) -> Option<Duration> {
        self.deadline()
            .map(|due| Duration::from_nanos(due.saturating_sub(now_ns)))
    }

    pub fn cancel(&mut self) -> Option<A> {
        self.pending.take().map(|(_, a)| a)
    }
}

impl<A> Default for Schedule<A> {
    fn default() -> Self {
        Self::new()
    }
}
