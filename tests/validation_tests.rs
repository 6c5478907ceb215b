use batch_scheduler::{
    Batch, BatchPlanRequest, DurationsInput, HolidayInput, Phase, PhaseDurations,
    PhaseWindowCalculator, ValidationError, WorkCalendar, validation,
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn negative_duration_is_rejected() {
    let err = DurationsInput::new(5, -1, 0, 0, 0).validate().unwrap_err();
    assert_eq!(
        err,
        ValidationError::NegativeDuration {
            phase: Phase::Training,
            value: -1
        }
    );
    assert_eq!(err.to_string(), "training duration must not be negative (got -1)");
}

#[test]
fn oversized_duration_is_rejected() {
    let err = DurationsInput::new(0, 0, i64::from(u32::MAX) + 1, 0, 0)
        .validate()
        .unwrap_err();
    assert!(matches!(
        err,
        ValidationError::DurationOutOfRange {
            phase: Phase::Certification,
            ..
        }
    ));
}

#[test]
fn duration_beyond_program_cap_is_rejected() {
    let err = DurationsInput::new(100_000_000, 0, 0, 0, 0)
        .validate()
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::DurationOutOfRange {
            phase: Phase::Induction,
            value: 100_000_000
        }
    );
    assert_eq!(
        err.to_string(),
        "induction duration 100000000 is out of range (a program spans at most 5000 working days)"
    );
}

#[test]
fn program_cap_applies_to_the_summed_durations() {
    let err = DurationsInput::new(3000, 3000, 0, 0, 0).validate().unwrap_err();
    assert_eq!(
        err,
        ValidationError::DurationOutOfRange {
            phase: Phase::Training,
            value: 3000
        }
    );

    let at_cap = validation::MAX_PROGRAM_WORKING_DAYS as i64;
    let durations = DurationsInput::new(at_cap, 0, 0, 0, 0).validate().unwrap();
    assert_eq!(durations.total_working_days(), validation::MAX_PROGRAM_WORKING_DAYS);
    assert!(DurationsInput::new(at_cap, 0, 0, 0, 1).validate().is_err());
}

#[test]
fn longest_accepted_program_plans_without_error() {
    let durations = DurationsInput::new(1000, 1000, 1000, 1000, 1000).validate().unwrap();
    let schedule = PhaseWindowCalculator::new(&WorkCalendar::default())
        .execute(d(2025, 1, 6), &durations)
        .unwrap();
    assert!(schedule.handover_to_ops() > d(2044, 1, 1));
}

#[test]
fn valid_durations_convert() {
    let durations = DurationsInput::new(5, 10, 0, 3, 0).validate().unwrap();
    assert_eq!(durations, PhaseDurations::new(5, 10, 0, 3, 0));
    assert_eq!(durations.total_working_days(), 18);
}

#[test]
fn missing_start_date_is_rejected() {
    let request = BatchPlanRequest::default();
    let err = request.validate(&WorkCalendar::default()).unwrap_err();
    assert_eq!(err, ValidationError::MissingStartDate);

    let blank = BatchPlanRequest {
        start_date: Some("  ".into()),
        ..BatchPlanRequest::default()
    };
    assert_eq!(
        blank.validate(&WorkCalendar::default()).unwrap_err(),
        ValidationError::MissingStartDate
    );
}

#[test]
fn malformed_start_date_is_rejected() {
    let request = BatchPlanRequest {
        start_date: Some("06/01/2025".into()),
        ..BatchPlanRequest::default()
    };
    let err = request.validate(&WorkCalendar::default()).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidDate { .. }));
}

#[test]
fn request_overrides_fall_back_to_base_calendar() {
    let request = BatchPlanRequest {
        start_date: Some("2025-01-06".into()),
        durations: DurationsInput::new(5, 10, 0, 3, 0),
        ..BatchPlanRequest::default()
    };
    let plan = request.validate(&WorkCalendar::default()).unwrap();
    assert_eq!(plan.calendar, WorkCalendar::default());
    assert_eq!(plan.schedule().unwrap().handover_to_ops(), d(2025, 2, 3));
}

#[test]
fn request_holidays_shift_the_schedule() {
    let request = BatchPlanRequest {
        start_date: Some("2025-01-06".into()),
        durations: DurationsInput::new(5, 10, 0, 3, 0),
        weekly_off_days: Some(vec!["Saturday".into(), "Sunday".into()]),
        consider_holidays: Some(true),
        holidays: Some(vec![HolidayInput {
            date: "2025-01-08".into(),
            name: "Offsite".into(),
            is_recurring: false,
        }]),
    };
    let plan = request.validate(&WorkCalendar::default()).unwrap();
    assert_eq!(plan.schedule().unwrap().window(Phase::Induction).end, d(2025, 1, 13));
}

#[test]
fn request_with_unknown_weekday_is_rejected() {
    let request = BatchPlanRequest {
        start_date: Some("2025-01-06".into()),
        weekly_off_days: Some(vec!["Caturday".into()]),
        ..BatchPlanRequest::default()
    };
    let err = request.validate(&WorkCalendar::default()).unwrap_err();
    assert!(matches!(err, ValidationError::Calendar(_)));
}

#[test]
fn request_deserializes_from_json() {
    let request: BatchPlanRequest = serde_json::from_str(
        r#"{
            "start_date": "2025-01-06",
            "durations": {"induction": 5, "training": 10, "ojt": 3},
            "holidays": [{"date": "2024-03-31", "name": "Close", "isRecurring": true}]
        }"#,
    )
    .unwrap();
    let plan = request.validate(&WorkCalendar::default()).unwrap();
    assert_eq!(plan.durations, PhaseDurations::new(5, 10, 0, 3, 0));
    assert!(plan.calendar.holidays()[0].is_recurring);
}

#[test]
fn planned_batch_passes_record_checks() {
    let batch = Batch::plan(
        1,
        "Cohort A",
        d(2025, 1, 4),
        PhaseDurations::new(5, 10, 0, 3, 0),
        &WorkCalendar::default(),
        d(2025, 1, 1),
    )
    .unwrap();
    assert!(validation::validate_batch(&batch).is_ok());
}

#[test]
fn tampered_record_is_flagged() {
    let mut batch = Batch::plan(
        1,
        "Cohort A",
        d(2025, 1, 6),
        PhaseDurations::new(5, 10, 0, 3, 0),
        &WorkCalendar::default(),
        d(2025, 1, 1),
    )
    .unwrap();
    batch.dates.end_date = d(2025, 2, 10);
    assert!(matches!(
        validation::validate_batch(&batch),
        Err(ValidationError::InconsistentSchedule { id: 1, .. })
    ));

    let mut overlapping = Batch::plan(
        2,
        "Cohort B",
        d(2025, 1, 6),
        PhaseDurations::new(5, 10, 0, 3, 0),
        &WorkCalendar::default(),
        d(2025, 1, 1),
    )
    .unwrap();
    overlapping.dates.training_start = d(2025, 1, 10);
    assert!(validation::validate_batch(&overlapping).is_err());
}

#[test]
fn empty_name_and_duplicate_ids_are_flagged() {
    let cal = WorkCalendar::default();
    let durations = PhaseDurations::new(1, 1, 1, 1, 1);
    let unnamed = Batch::plan(1, "  ", d(2025, 1, 6), durations, &cal, d(2025, 1, 1)).unwrap();
    assert_eq!(validation::validate_batch(&unnamed), Err(ValidationError::EmptyName));

    let first = Batch::plan(7, "A", d(2025, 1, 6), durations, &cal, d(2025, 1, 1)).unwrap();
    let second = Batch::plan(7, "B", d(2025, 2, 3), durations, &cal, d(2025, 1, 1)).unwrap();
    assert_eq!(
        validation::validate_batch_collection(&[first, second]),
        Err(ValidationError::DuplicateBatchId(7))
    );
}

#[test]
fn stored_batch_with_oversized_duration_is_flagged() {
    let mut batch = Batch::plan(
        3,
        "Cohort C",
        d(2025, 1, 6),
        PhaseDurations::new(5, 10, 0, 3, 0),
        &WorkCalendar::default(),
        d(2025, 1, 1),
    )
    .unwrap();
    batch.durations.training = 1_000_000;
    assert_eq!(
        validation::validate_batch(&batch),
        Err(ValidationError::DurationOutOfRange {
            phase: Phase::Training,
            value: 1_000_000
        })
    );
}
