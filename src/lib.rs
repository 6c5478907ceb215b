pub mod batch;
pub mod calculations;
pub mod calendar;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod phase;
pub mod register;
pub mod schedule;
pub mod status;
pub mod validation;

pub use batch::Batch;
pub use calculations::{
    BatchStatusResolver, PhaseWindowCalculator, calculate_phase_dates, determine_status,
};
pub use calendar::{
    CalendarError, Holiday, WeeklyOffDays, WorkCalendar, WorkCalendarConfig, is_non_working_day,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteBatchStore;
pub use persistence::{
    PersistenceError, ScheduleStore, load_calendar_config, load_holidays_from_csv,
    load_register_from_csv, load_register_from_json, save_calendar_config, save_register_to_csv,
    save_register_to_json, validate_batches,
};
pub use phase::{Phase, PhaseDurations};
pub use register::{BatchError, BatchRegister, BatchUpdate, RefreshSummary};
pub use schedule::{BatchSchedule, PhaseWindow, ScheduleDates};
pub use status::BatchStatus;
pub use validation::{BatchPlanRequest, DurationsInput, HolidayInput, ValidatedPlan, ValidationError};
