//! Boundary checks run before anything reaches the scheduler, and on batch
//! records coming back from storage.

use crate::batch::Batch;
use crate::calculations::PhaseWindowCalculator;
use crate::calendar::{CalendarError, Holiday, WeeklyOffDays, WorkCalendar};
use crate::phase::{Phase, PhaseDurations};
use crate::schedule::BatchSchedule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Upper bound on the summed working days of all five phases.
pub const MAX_PROGRAM_WORKING_DAYS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("start date is required")]
    MissingStartDate,
    #[error("invalid {field} '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },
    #[error("{phase} duration must not be negative (got {value})")]
    NegativeDuration { phase: Phase, value: i64 },
    #[error(
        "{phase} duration {value} is out of range (a program spans at most {} working days)",
        MAX_PROGRAM_WORKING_DAYS
    )]
    DurationOutOfRange { phase: Phase, value: i64 },
    #[error("batch name must not be empty")]
    EmptyName,
    #[error("duplicate batch id {0}")]
    DuplicateBatchId(u32),
    #[error("batch {id} has an inconsistent schedule: {reason}")]
    InconsistentSchedule { id: u32, reason: String },
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

pub fn parse_iso_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field: field.to_string(),
        value: value.trim().to_string(),
    })
}

/// Phase durations as they arrive from a form, before sign checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationsInput {
    #[serde(default)]
    pub induction: i64,
    #[serde(default)]
    pub training: i64,
    #[serde(default)]
    pub certification: i64,
    #[serde(default)]
    pub ojt: i64,
    #[serde(default)]
    pub ojt_certification: i64,
}

impl DurationsInput {
    pub fn new(induction: i64, training: i64, certification: i64, ojt: i64, ojt_certification: i64) -> Self {
        Self {
            induction,
            training,
            certification,
            ojt,
            ojt_certification,
        }
    }

    fn get(&self, phase: Phase) -> i64 {
        match phase {
            Phase::Induction => self.induction,
            Phase::Training => self.training,
            Phase::Certification => self.certification,
            Phase::Ojt => self.ojt,
            Phase::OjtCertification => self.ojt_certification,
        }
    }

    pub fn validate(&self) -> Result<PhaseDurations, ValidationError> {
        let mut durations = PhaseDurations::default();
        let mut total: u64 = 0;
        for phase in Phase::ALL {
            let value = self.get(phase);
            if value < 0 {
                return Err(ValidationError::NegativeDuration { phase, value });
            }
            let out_of_range = ValidationError::DurationOutOfRange { phase, value };
            let days = u32::try_from(value).map_err(|_| out_of_range.clone())?;
            total += u64::from(days);
            if total > MAX_PROGRAM_WORKING_DAYS {
                return Err(out_of_range);
            }
            durations.set(phase, days);
        }
        Ok(durations)
    }
}

impl From<PhaseDurations> for DurationsInput {
    fn from(durations: PhaseDurations) -> Self {
        Self {
            induction: i64::from(durations.induction),
            training: i64::from(durations.training),
            certification: i64::from(durations.certification),
            ojt: i64::from(durations.ojt),
            ojt_certification: i64::from(durations.ojt_certification),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayInput {
    pub date: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "isRecurring")]
    pub is_recurring: bool,
}

impl HolidayInput {
    pub fn validate(&self) -> Result<Holiday, ValidationError> {
        let date = parse_iso_date("holiday date", &self.date)?;
        Ok(Holiday {
            date,
            name: self.name.trim().to_string(),
            is_recurring: self.is_recurring,
        })
    }
}

/// Raw scheduling inputs. Calendar fields left out fall back to the organization calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlanRequest {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub durations: DurationsInput,
    #[serde(default)]
    pub weekly_off_days: Option<Vec<String>>,
    #[serde(default)]
    pub consider_holidays: Option<bool>,
    #[serde(default)]
    pub holidays: Option<Vec<HolidayInput>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPlan {
    pub start_date: NaiveDate,
    pub durations: PhaseDurations,
    pub calendar: WorkCalendar,
}

impl ValidatedPlan {
    pub fn schedule(&self) -> Result<BatchSchedule, CalendarError> {
        PhaseWindowCalculator::new(&self.calendar).execute(self.start_date, &self.durations)
    }
}

impl BatchPlanRequest {
    pub fn validate(&self, base: &WorkCalendar) -> Result<ValidatedPlan, ValidationError> {
        let start_date = match self.start_date.as_deref().map(str::trim) {
            None | Some("") => return Err(ValidationError::MissingStartDate),
            Some(raw) => parse_iso_date("start date", raw)?,
        };
        let durations = self.durations.validate()?;

        let weekly_off_days = match &self.weekly_off_days {
            Some(names) => WeeklyOffDays::from_names(names)?,
            None => base.weekly_off_days().clone(),
        };
        let consider_holidays = self.consider_holidays.unwrap_or(base.consider_holidays());
        let holidays = match &self.holidays {
            Some(inputs) => inputs
                .iter()
                .map(HolidayInput::validate)
                .collect::<Result<Vec<_>, _>>()?,
            None => base.holidays().to_vec(),
        };
        let calendar = WorkCalendar::new(weekly_off_days, consider_holidays, holidays)?;

        Ok(ValidatedPlan {
            start_date,
            durations,
            calendar,
        })
    }
}

/// Structural checks on a stored schedule: ordered, contiguous, zero-length phases collapsed.
pub fn check_schedule_shape(
    schedule: &BatchSchedule,
    durations: &PhaseDurations,
) -> Result<(), String> {
    let mut previous_end: Option<NaiveDate> = None;
    for window in schedule.windows() {
        if window.end < window.start {
            return Err(format!(
                "{} ends {} before it starts {}",
                window.phase, window.end, window.start
            ));
        }
        if durations.get(window.phase) == 0 && window.start != window.end {
            return Err(format!(
                "{} has zero duration but spans {}..{}",
                window.phase, window.start, window.end
            ));
        }
        if let Some(prev) = previous_end {
            if window.start <= prev {
                return Err(format!(
                    "{} starts {} on or before the previous phase ends {}",
                    window.phase, window.start, prev
                ));
            }
        }
        previous_end = Some(window.end);
    }
    if let Some(last_end) = previous_end {
        if schedule.handover_to_ops() <= last_end {
            return Err(format!(
                "handover {} is not after the last phase end {}",
                schedule.handover_to_ops(),
                last_end
            ));
        }
    }
    Ok(())
}

pub fn validate_batch(batch: &Batch) -> Result<(), ValidationError> {
    if batch.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    DurationsInput::from(batch.durations).validate()?;
    let inconsistent = |reason: String| ValidationError::InconsistentSchedule {
        id: batch.id,
        reason,
    };
    if batch.dates.end_date != batch.dates.handover_to_ops {
        return Err(inconsistent(format!(
            "end date {} differs from handover {}",
            batch.dates.end_date, batch.dates.handover_to_ops
        )));
    }
    if batch.dates.induction_start < batch.start_date {
        return Err(inconsistent(format!(
            "induction starts {} before the batch start date {}",
            batch.dates.induction_start, batch.start_date
        )));
    }
    check_schedule_shape(&batch.schedule(), &batch.durations).map_err(inconsistent)
}

pub fn validate_batch_collection(batches: &[Batch]) -> Result<(), ValidationError> {
    let mut seen_ids = HashSet::with_capacity(batches.len());
    for batch in batches {
        if !seen_ids.insert(batch.id) {
            return Err(ValidationError::DuplicateBatchId(batch.id));
        }
        validate_batch(batch)?;
    }
    Ok(())
}
