use crate::schedule::BatchSchedule;
use crate::status::BatchStatus;
use chrono::NaiveDate;
use log::debug;

pub struct BatchStatusResolver<'a> {
    schedule: &'a BatchSchedule,
}

impl<'a> BatchStatusResolver<'a> {
    pub fn new(schedule: &'a BatchSchedule) -> Self {
        Self { schedule }
    }

    pub fn execute(&self, now: NaiveDate) -> BatchStatus {
        if now < self.schedule.start_date() {
            return BatchStatus::Planned;
        }

        if let Some(window) = self.schedule.windows().iter().find(|w| w.contains(now)) {
            return BatchStatus::from(window.phase);
        }

        if now >= self.schedule.handover_to_ops() {
            return BatchStatus::Completed;
        }

        // Off days between two phases belong to no window.
        debug!("{now} falls between phase windows, reporting planned");
        BatchStatus::Planned
    }
}

pub fn determine_status(schedule: &BatchSchedule, now: NaiveDate) -> BatchStatus {
    BatchStatusResolver::new(schedule).execute(now)
}
