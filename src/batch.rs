use crate::calculations::PhaseWindowCalculator;
use crate::calendar::{CalendarError, WorkCalendar};
use crate::phase::PhaseDurations;
use crate::schedule::{BatchSchedule, ScheduleDates};
use crate::status::BatchStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A trainee batch with its scheduling inputs and the dates derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: u32,
    pub name: String,
    pub start_date: NaiveDate,
    pub durations: PhaseDurations,
    #[serde(flatten)]
    pub dates: ScheduleDates,
    pub status: BatchStatus,
}

impl Batch {
    pub fn plan(
        id: u32,
        name: impl Into<String>,
        start_date: NaiveDate,
        durations: PhaseDurations,
        calendar: &WorkCalendar,
        today: NaiveDate,
    ) -> Result<Self, CalendarError> {
        let schedule = PhaseWindowCalculator::new(calendar).execute(start_date, &durations)?;
        Ok(Self {
            id,
            name: name.into(),
            start_date,
            durations,
            dates: schedule.dates(),
            status: schedule.status_on(today),
        })
    }

    /// Recompute every date field from the stored inputs, then the status.
    pub fn replan(&mut self, calendar: &WorkCalendar, today: NaiveDate) -> Result<(), CalendarError> {
        let schedule =
            PhaseWindowCalculator::new(calendar).execute(self.start_date, &self.durations)?;
        self.dates = schedule.dates();
        self.status = schedule.status_on(today);
        Ok(())
    }

    pub fn schedule(&self) -> BatchSchedule {
        self.dates.to_schedule()
    }

    pub fn status_on(&self, today: NaiveDate) -> BatchStatus {
        self.schedule().status_on(today)
    }

    /// Re-resolve the stored status for `today`. Returns true when it changed.
    pub fn refresh_status(&mut self, today: NaiveDate) -> bool {
        let status = self.status_on(today);
        let changed = status != self.status;
        self.status = status;
        changed
    }

    pub fn end_date(&self) -> NaiveDate {
        self.dates.end_date
    }
}
