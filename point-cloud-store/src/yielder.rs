/// Hand-off point to the host scheduler.
///
/// Long scans and bulk imports call [`yield_now`](CooperativeYield::yield_now)
/// every few thousand elements so a single-threaded host can run other ready
/// work. Implementations must not touch the container being scanned; a host
/// without a scheduler simply does nothing.
pub trait CooperativeYield {
    fn yield_now(&mut self);
}

impl<F: FnMut()> CooperativeYield for F {
    fn yield_now(&mut self) {
        self()
    }
}

/// Yield that is always skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoYield;

impl CooperativeYield for NoYield {
    fn yield_now(&mut self) {}
}

/// Counts work done since the last yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct YieldBudget {
    interval: usize,
    spent: usize,
}

impl YieldBudget {
    pub(crate) fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            spent: 0,
        }
    }

    pub(crate) fn interval(&self) -> usize {
        self.interval
    }

    /// Records `units` of work and reports whether the interval was crossed.
    pub(crate) fn spend(&mut self, units: usize) -> bool {
        self.spent = self.spent.saturating_add(units);
        if self.spent >= self.interval {
            self.spent %= self.interval;
            true
        } else {
            false
        }
    }

    pub(crate) fn reset(&mut self) {
        self.spent = 0;
    }
}
