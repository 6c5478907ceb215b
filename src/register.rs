use crate::batch::Batch;
use crate::calendar::{CalendarError, WorkCalendar, WorkCalendarConfig};
use crate::phase::PhaseDurations;
use crate::schedule::date_to_i32;
use crate::status::BatchStatus;
use crate::validation::{self, ValidationError};
use chrono::NaiveDate;
use log::info;
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("batch {0} not found")]
    NotFound(u32),
    #[error("batch {0} already exists")]
    AlreadyExists(u32),
    #[error("no batch id left: id {} is already taken", u32::MAX)]
    IdsExhausted,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub batch_count: usize,
    pub planned_count: usize,
    pub in_progress_count: usize,
    pub completed_count: usize,
    pub status_changes: usize,
    pub latest_handover: Option<NaiveDate>,
}

impl RefreshSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("batches={}", self.batch_count));
        parts.push(format!("planned={}", self.planned_count));
        parts.push(format!("in_progress={}", self.in_progress_count));
        parts.push(format!("completed={}", self.completed_count));
        if self.status_changes > 0 {
            parts.push(format!("changed={}", self.status_changes));
        }
        if let Some(date) = self.latest_handover {
            parts.push(format!("last_handover={}", date));
        }
        parts.join(", ")
    }
}

/// Fields of a batch that may change after creation. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchUpdate {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub durations: Option<PhaseDurations>,
}

/// Batches of one organization, scheduled against that organization's calendar.
#[derive(Debug, Clone, Default)]
pub struct BatchRegister {
    calendar: WorkCalendar,
    batches: BTreeMap<u32, Batch>,
}

impl BatchRegister {
    pub fn new(calendar: WorkCalendar) -> Self {
        Self {
            calendar,
            batches: BTreeMap::new(),
        }
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn calendar_config(&self) -> WorkCalendarConfig {
        self.calendar.to_config()
    }

    /// Swap the calendar and replan every batch against it. Nothing changes if
    /// any batch cannot be replanned.
    pub fn set_calendar(&mut self, calendar: WorkCalendar, today: NaiveDate) -> Result<(), BatchError> {
        let mut batches = self.batches.clone();
        for batch in batches.values_mut() {
            batch.replan(&calendar, today)?;
        }
        self.calendar = calendar;
        self.batches = batches;
        info!("calendar replaced, replanned {} batches", self.batches.len());
        Ok(())
    }

    /// Apply an in-place edit to a copy of the calendar, then replan.
    pub fn update_calendar<F>(&mut self, today: NaiveDate, edit: F) -> Result<(), BatchError>
    where
        F: FnOnce(&mut WorkCalendar) -> Result<(), CalendarError>,
    {
        let mut calendar = self.calendar.clone();
        edit(&mut calendar)?;
        self.set_calendar(calendar, today)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// One past the highest id in use.
    pub fn next_id(&self) -> Result<u32, BatchError> {
        match self.batches.keys().next_back() {
            Some(last) => last.checked_add(1).ok_or(BatchError::IdsExhausted),
            None => Ok(1),
        }
    }

    pub fn batches(&self) -> impl Iterator<Item = &Batch> {
        self.batches.values()
    }

    pub fn find_batch(&self, id: u32) -> Option<&Batch> {
        self.batches.get(&id)
    }

    pub fn create_batch(
        &mut self,
        id: u32,
        name: impl Into<String>,
        start_date: NaiveDate,
        durations: PhaseDurations,
        today: NaiveDate,
    ) -> Result<&Batch, BatchError> {
        if self.batches.contains_key(&id) {
            return Err(BatchError::AlreadyExists(id));
        }
        let batch = Batch::plan(id, name, start_date, durations, &self.calendar, today)?;
        validation::validate_batch(&batch)?;
        info!(
            "created batch {} '{}' ({} -> {}, {})",
            batch.id, batch.name, batch.start_date, batch.dates.end_date, batch.status
        );
        Ok(self.batches.entry(id).or_insert(batch))
    }

    pub fn update_batch(
        &mut self,
        id: u32,
        update: BatchUpdate,
        today: NaiveDate,
    ) -> Result<&Batch, BatchError> {
        let current = self.batches.get(&id).ok_or(BatchError::NotFound(id))?;
        let mut batch = current.clone();
        if let Some(name) = update.name {
            batch.name = name;
        }
        if let Some(start_date) = update.start_date {
            batch.start_date = start_date;
        }
        if let Some(durations) = update.durations {
            batch.durations = durations;
        }
        batch.replan(&self.calendar, today)?;
        validation::validate_batch(&batch)?;
        info!(
            "updated batch {} ({} -> {}, {})",
            batch.id, batch.start_date, batch.dates.end_date, batch.status
        );
        self.batches.insert(id, batch);
        self.batches.get(&id).ok_or(BatchError::NotFound(id))
    }

    /// Insert a stored record as is, without rescheduling it.
    pub fn insert_record(&mut self, batch: Batch) -> Result<(), BatchError> {
        if self.batches.contains_key(&batch.id) {
            return Err(ValidationError::DuplicateBatchId(batch.id).into());
        }
        validation::validate_batch(&batch)?;
        self.batches.insert(batch.id, batch);
        Ok(())
    }

    pub fn delete_batch(&mut self, id: u32) -> bool {
        let removed = self.batches.remove(&id).is_some();
        if removed {
            info!("deleted batch {id}");
        }
        removed
    }

    /// Re-resolve each batch's status for `today` from its stored dates.
    pub fn refresh(&mut self, today: NaiveDate) -> RefreshSummary {
        let mut summary = RefreshSummary {
            batch_count: self.batches.len(),
            planned_count: 0,
            in_progress_count: 0,
            completed_count: 0,
            status_changes: 0,
            latest_handover: None,
        };
        for batch in self.batches.values_mut() {
            if batch.refresh_status(today) {
                summary.status_changes += 1;
            }
            match batch.status {
                BatchStatus::Planned => summary.planned_count += 1,
                BatchStatus::Completed => summary.completed_count += 1,
                _ => summary.in_progress_count += 1,
            }
            let handover = batch.dates.handover_to_ops;
            if summary.latest_handover.is_none_or(|latest| handover > latest) {
                summary.latest_handover = Some(handover);
            }
        }
        summary
    }

    pub fn dataframe(&self) -> PolarsResult<DataFrame> {
        let ids: Vec<i64> = self.batches.values().map(|b| i64::from(b.id)).collect();
        let names: Vec<&str> = self.batches.values().map(|b| b.name.as_str()).collect();
        let starts: Vec<i32> = self
            .batches
            .values()
            .map(|b| date_to_i32(b.start_date))
            .collect();
        let ends: Vec<i32> = self
            .batches
            .values()
            .map(|b| date_to_i32(b.dates.end_date))
            .collect();
        let statuses: Vec<&str> = self.batches.values().map(|b| b.status.as_str()).collect();

        let columns: Vec<Column> = vec![
            Series::new(PlSmallStr::from_static("id"), ids).into_column(),
            Series::new(PlSmallStr::from_static("name"), names).into_column(),
            Series::new(PlSmallStr::from_static("start_date"), starts)
                .cast(&DataType::Date)?
                .into_column(),
            Series::new(PlSmallStr::from_static("end_date"), ends)
                .cast(&DataType::Date)?
                .into_column(),
            Series::new(PlSmallStr::from_static("status"), statuses).into_column(),
        ];
        DataFrame::new(columns)
    }
}
