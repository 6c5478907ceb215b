use crate::calculations::status::BatchStatusResolver;
use crate::phase::Phase;
use crate::status::BatchStatus;
use chrono::{Datelike, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Days from 0001-01-01 to 1970-01-01, the epoch polars counts `Date` values from.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Inclusive date range a batch spends in one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseWindow {
    pub phase: Phase,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PhaseWindow {
    pub fn new(phase: Phase, start: NaiveDate, end: NaiveDate) -> Self {
        Self { phase, start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn calendar_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// The five phase windows of a batch, in phase order, followed by the handover date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSchedule {
    windows: [PhaseWindow; 5],
    handover_to_ops: NaiveDate,
}

impl BatchSchedule {
    pub fn new(windows: [PhaseWindow; 5], handover_to_ops: NaiveDate) -> Self {
        Self {
            windows,
            handover_to_ops,
        }
    }

    pub fn windows(&self) -> &[PhaseWindow] {
        &self.windows
    }

    pub fn window(&self, phase: Phase) -> &PhaseWindow {
        &self.windows[phase.index()]
    }

    /// First day of induction, after any adjustment off a non-working start date.
    pub fn start_date(&self) -> NaiveDate {
        self.windows[0].start
    }

    pub fn handover_to_ops(&self) -> NaiveDate {
        self.handover_to_ops
    }

    /// The batch end date is the handover date.
    pub fn end_date(&self) -> NaiveDate {
        self.handover_to_ops
    }

    pub fn status_on(&self, now: NaiveDate) -> BatchStatus {
        BatchStatusResolver::new(self).execute(now)
    }

    pub fn dates(&self) -> ScheduleDates {
        ScheduleDates::from(self)
    }

    /// One row per phase plus a closing handover row.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut phases: Vec<&str> = self.windows.iter().map(|w| w.phase.as_str()).collect();
        let mut starts: Vec<i32> = self.windows.iter().map(|w| date_to_i32(w.start)).collect();
        let mut ends: Vec<i32> = self.windows.iter().map(|w| date_to_i32(w.end)).collect();
        let mut days: Vec<i64> = self.windows.iter().map(|w| w.calendar_days()).collect();

        phases.push("handover_to_ops");
        starts.push(date_to_i32(self.handover_to_ops));
        ends.push(date_to_i32(self.handover_to_ops));
        days.push(1);

        let columns: Vec<Column> = vec![
            Series::new(PlSmallStr::from_static("phase"), phases).into_column(),
            Series::new(PlSmallStr::from_static("start"), starts)
                .cast(&DataType::Date)?
                .into_column(),
            Series::new(PlSmallStr::from_static("end"), ends)
                .cast(&DataType::Date)?
                .into_column(),
            Series::new(PlSmallStr::from_static("calendar_days"), days).into_column(),
        ];
        DataFrame::new(columns)
    }
}

pub(crate) fn date_to_i32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Flat per-phase date fields as written onto a batch record.
///
/// Dates serialize as `YYYY-MM-DD`; `end_date` always equals `handover_to_ops`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDates {
    pub induction_start: NaiveDate,
    pub induction_end: NaiveDate,
    pub training_start: NaiveDate,
    pub training_end: NaiveDate,
    pub certification_start: NaiveDate,
    pub certification_end: NaiveDate,
    pub ojt_start: NaiveDate,
    pub ojt_end: NaiveDate,
    pub ojt_certification_start: NaiveDate,
    pub ojt_certification_end: NaiveDate,
    pub handover_to_ops: NaiveDate,
    pub end_date: NaiveDate,
}

impl ScheduleDates {
    pub fn window(&self, phase: Phase) -> PhaseWindow {
        let (start, end) = match phase {
            Phase::Induction => (self.induction_start, self.induction_end),
            Phase::Training => (self.training_start, self.training_end),
            Phase::Certification => (self.certification_start, self.certification_end),
            Phase::Ojt => (self.ojt_start, self.ojt_end),
            Phase::OjtCertification => (self.ojt_certification_start, self.ojt_certification_end),
        };
        PhaseWindow::new(phase, start, end)
    }

    pub fn to_schedule(&self) -> BatchSchedule {
        BatchSchedule::new(Phase::ALL.map(|phase| self.window(phase)), self.handover_to_ops)
    }
}

impl From<&BatchSchedule> for ScheduleDates {
    fn from(schedule: &BatchSchedule) -> Self {
        let w = |phase: Phase| *schedule.window(phase);
        Self {
            induction_start: w(Phase::Induction).start,
            induction_end: w(Phase::Induction).end,
            training_start: w(Phase::Training).start,
            training_end: w(Phase::Training).end,
            certification_start: w(Phase::Certification).start,
            certification_end: w(Phase::Certification).end,
            ojt_start: w(Phase::Ojt).start,
            ojt_end: w(Phase::Ojt).end,
            ojt_certification_start: w(Phase::OjtCertification).start,
            ojt_certification_end: w(Phase::OjtCertification).end,
            handover_to_ops: schedule.handover_to_ops(),
            end_date: schedule.end_date(),
        }
    }
}
