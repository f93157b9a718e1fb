//! Pure schedule state: when is the next run due.
//!
//! Runs that fall due while a previous run is still in flight are skipped, not
//! queued: after a run, the schedule moves to the first boundary strictly after
//! the time the run finished.

use std::num::NonZeroU32;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every `n` minutes, first run one period after start.
    EveryMinutes(NonZeroU32),
    /// Once a day at the given local time.
    DailyAt(NaiveTime),
}

impl Trigger {
    fn first_due(self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Trigger::EveryMinutes(minutes) => now + period(minutes),
            Trigger::DailyAt(time) => next_daily(now, time),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    trigger: Trigger,
    next_due: NaiveDateTime,
}

impl Schedule {
    pub fn new(trigger: Trigger, now: NaiveDateTime) -> Self {
        Self {
            trigger,
            next_due: trigger.first_due(now),
        }
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn next_due(&self) -> NaiveDateTime {
        self.next_due
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.next_due
    }

    /// Moves past `now`; returns how many due instants were skipped on the way.
    pub fn advance(&mut self, now: NaiveDateTime) -> u32 {
        match self.trigger {
            Trigger::EveryMinutes(minutes) => {
                let step = period(minutes);
                let mut next = self.next_due + step;
                let mut skipped = 0;
                while next <= now {
                    next += step;
                    skipped += 1;
                }
                self.next_due = next;
                skipped
            }
            Trigger::DailyAt(time) => {
                let mut skipped = 0;
                let mut next = self.next_due + TimeDelta::days(1);
                while next <= now {
                    next += TimeDelta::days(1);
                    skipped += 1;
                }
                self.next_due = next.date().and_time(time);
                skipped
            }
        }
    }
}

fn period(minutes: NonZeroU32) -> TimeDelta {
    TimeDelta::minutes(i64::from(minutes.get()))
}

fn next_daily(now: NaiveDateTime, time: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(time);
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}
