use crate::calendar::{CalendarError, Holiday, WeeklyOffDays, WorkCalendar};
use crate::phase::{Phase, PhaseDurations};
use crate::schedule::{BatchSchedule, PhaseWindow};
use chrono::NaiveDate;
use log::debug;

/// Walks a batch forward through its phases, counting only working days.
pub struct PhaseWindowCalculator<'a> {
    calendar: &'a WorkCalendar,
}

impl<'a> PhaseWindowCalculator<'a> {
    pub fn new(calendar: &'a WorkCalendar) -> Self {
        Self { calendar }
    }

    /// Fails only when the walk would run past the last date chrono can represent.
    pub fn execute(
        &self,
        start_date: NaiveDate,
        durations: &PhaseDurations,
    ) -> Result<BatchSchedule, CalendarError> {
        let mut cursor = self.calendar.first_working_day_on_or_after(start_date)?;
        if cursor != start_date {
            debug!("batch start {start_date} is not a working day, moved to {cursor}");
        }

        let mut windows = [PhaseWindow::new(Phase::Induction, cursor, cursor); 5];
        for (slot, phase) in windows.iter_mut().zip(Phase::ALL) {
            *slot = self.window_from(cursor, phase, durations.get(phase))?;
            cursor = self.calendar.next_working_day(slot.end)?;
        }

        // After the last phase the cursor already sits on the first working day past its end.
        let schedule = BatchSchedule::new(windows, cursor);
        debug!(
            "scheduled batch from {} to handover {}",
            schedule.start_date(),
            schedule.handover_to_ops()
        );
        Ok(schedule)
    }

    /// `start` is a working day; a phase of `days` working days ends on the
    /// (`days` - 1)-th working day after it. Zero days collapses to a marker on `start`.
    fn window_from(
        &self,
        start: NaiveDate,
        phase: Phase,
        days: u32,
    ) -> Result<PhaseWindow, CalendarError> {
        let end = match days {
            0 => start,
            n => self.calendar.advance_working_days(start, n - 1)?,
        };
        Ok(PhaseWindow::new(phase, start, end))
    }
}

/// Compute a batch schedule straight from raw calendar inputs.
///
/// Fails when the weekly-off set and holidays leave no working day at all, or when
/// the walk would run past the last supported date.
pub fn calculate_phase_dates(
    start_date: NaiveDate,
    durations: &PhaseDurations,
    weekly_off_days: &WeeklyOffDays,
    consider_holidays: bool,
    holidays: &[Holiday],
) -> Result<BatchSchedule, CalendarError> {
    let calendar = WorkCalendar::new(weekly_off_days.clone(), consider_holidays, holidays.to_vec())?;
    PhaseWindowCalculator::new(&calendar).execute(start_date, durations)
}
