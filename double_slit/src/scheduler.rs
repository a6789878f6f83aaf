//! Cancellable fixed-interval recurrence.
//!
//! The host feeds elapsed time in through [`RecurringTimer::advance`]; the
//! timer answers how many intervals became due. Only one schedule is active
//! at a time and it is addressed through a [`TimerHandle`], so a handle kept
//! from an earlier schedule can never cancel or drive a newer one.

use std::time::Duration;

/// Identifies one schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Schedule {
    handle: TimerHandle,
    interval: Duration,
    accumulator: Duration,
}

/// Single-slot recurring timer driven by explicit time steps.
#[derive(Debug, Default)]
pub struct RecurringTimer {
    active: Option<Schedule>,
    next_id: u64,
}

impl RecurringTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a recurrence every `interval`, replacing any active one.
    ///
    /// The first occurrence is due one full interval from now.
    pub fn schedule(&mut self, interval: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.active = Some(Schedule {
            handle,
            interval: interval.max(Duration::from_millis(1)),
            accumulator: Duration::ZERO,
        });
        handle
    }

    /// Cancel the schedule identified by `handle`.
    ///
    /// Returns `false` if the handle is stale or nothing is scheduled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match &self.active {
            Some(schedule) if schedule.handle == handle => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_handle(&self) -> Option<TimerHandle> {
        self.active.as_ref().map(|s| s.handle)
    }

    /// Accumulate `elapsed` and return how many occurrences are due.
    ///
    /// At most `limit` occurrences are reported; time owed beyond that is
    /// dropped so a long stall does not turn into a burst of ticks.
    pub fn advance(&mut self, elapsed: Duration, limit: u32) -> u32 {
        let Some(schedule) = self.active.as_mut() else {
            return 0;
        };

        schedule.accumulator += elapsed;
        let mut due = 0;
        while schedule.accumulator >= schedule.interval && due < limit {
            schedule.accumulator -= schedule.interval;
            due += 1;
        }
        if schedule.accumulator >= schedule.interval {
            log::debug!(
                "Dropping {:?} of backlog after {} ticks",
                schedule.accumulator,
                due
            );
            schedule.accumulator = Duration::ZERO;
        }
        due
    }
}
