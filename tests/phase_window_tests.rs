use batch_scheduler::{
    CalendarError, Holiday, Phase, PhaseDurations, PhaseWindowCalculator, WeeklyOffDays,
    WorkCalendar, calculate_phase_dates,
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_durations() -> PhaseDurations {
    PhaseDurations::new(5, 10, 0, 3, 0)
}

#[test]
fn computes_contiguous_windows_for_reference_batch() {
    let schedule = calculate_phase_dates(
        d(2025, 1, 6),
        &sample_durations(),
        &WeeklyOffDays::weekends(),
        false,
        &[],
    )
    .unwrap();

    let expected = [
        (Phase::Induction, d(2025, 1, 6), d(2025, 1, 10)),
        (Phase::Training, d(2025, 1, 13), d(2025, 1, 24)),
        (Phase::Certification, d(2025, 1, 27), d(2025, 1, 27)),
        (Phase::Ojt, d(2025, 1, 28), d(2025, 1, 30)),
        (Phase::OjtCertification, d(2025, 1, 31), d(2025, 1, 31)),
    ];
    for (window, (phase, start, end)) in schedule.windows().iter().zip(expected) {
        assert_eq!(window.phase, phase);
        assert_eq!(window.start, start, "{phase} start");
        assert_eq!(window.end, end, "{phase} end");
    }
    assert_eq!(schedule.handover_to_ops(), d(2025, 2, 3));
    assert_eq!(schedule.end_date(), d(2025, 2, 3));
}

#[test]
fn blocking_holiday_pushes_induction_end() {
    let holidays = vec![Holiday::new(d(2025, 1, 8), "Offsite")];
    let schedule = calculate_phase_dates(
        d(2025, 1, 6),
        &sample_durations(),
        &WeeklyOffDays::weekends(),
        true,
        &holidays,
    )
    .unwrap();

    let induction = schedule.window(Phase::Induction);
    assert_eq!(induction.start, d(2025, 1, 6));
    // Five working days without Wednesday the 8th end on the following Monday.
    assert_eq!(induction.end, d(2025, 1, 13));
    assert_eq!(schedule.window(Phase::Training).start, d(2025, 1, 14));
}

#[test]
fn holiday_start_moves_induction_to_next_working_day() {
    // Wednesday 2025-01-08
    let holidays = vec![Holiday::new(d(2025, 1, 8), "Offsite")];
    let schedule = calculate_phase_dates(
        d(2025, 1, 8),
        &sample_durations(),
        &WeeklyOffDays::weekends(),
        true,
        &holidays,
    )
    .unwrap();
    let induction = schedule.window(Phase::Induction);
    assert_eq!(induction.start, d(2025, 1, 9));
    assert_eq!(induction.end, d(2025, 1, 15));
    assert_eq!(schedule.window(Phase::Training).start, d(2025, 1, 16));

    let ignored = calculate_phase_dates(
        d(2025, 1, 8),
        &sample_durations(),
        &WeeklyOffDays::weekends(),
        false,
        &holidays,
    )
    .unwrap();
    assert_eq!(ignored.window(Phase::Induction).start, d(2025, 1, 8));
    assert_eq!(ignored.window(Phase::Induction).end, d(2025, 1, 14));
}

#[test]
fn holiday_ignored_when_not_considered() {
    let holidays = vec![Holiday::new(d(2025, 1, 8), "Offsite")];
    let with = calculate_phase_dates(
        d(2025, 1, 6),
        &sample_durations(),
        &WeeklyOffDays::weekends(),
        false,
        &holidays,
    )
    .unwrap();
    let without = calculate_phase_dates(
        d(2025, 1, 6),
        &sample_durations(),
        &WeeklyOffDays::weekends(),
        false,
        &[],
    )
    .unwrap();
    assert_eq!(with, without);
}

#[test]
fn weekend_start_moves_to_next_working_day() {
    let cal = WorkCalendar::default();
    // Saturday 2025-01-04
    let schedule = PhaseWindowCalculator::new(&cal).execute(d(2025, 1, 4), &sample_durations()).unwrap();
    assert_eq!(schedule.start_date(), d(2025, 1, 6));
    assert_eq!(schedule.window(Phase::Induction).end, d(2025, 1, 10));
}

#[test]
fn all_zero_durations_give_consecutive_markers() {
    let cal = WorkCalendar::default();
    let schedule = PhaseWindowCalculator::new(&cal).execute(d(2025, 1, 9), &PhaseDurations::default()).unwrap();
    let starts: Vec<NaiveDate> = schedule.windows().iter().map(|w| w.start).collect();
    // Thu, Fri, Mon, Tue, Wed
    assert_eq!(
        starts,
        vec![d(2025, 1, 9), d(2025, 1, 10), d(2025, 1, 13), d(2025, 1, 14), d(2025, 1, 15)]
    );
    for window in schedule.windows() {
        assert_eq!(window.start, window.end);
    }
    assert_eq!(schedule.handover_to_ops(), d(2025, 1, 16));
}

#[test]
fn calculation_is_deterministic() {
    let holidays = vec![
        Holiday::recurring(d(2020, 1, 26), "Republic Day"),
        Holiday::new(d(2025, 2, 14), "Offsite"),
    ];
    let off = WeeklyOffDays::from_names(["Sunday"]).unwrap();
    let durations = PhaseDurations::new(3, 20, 2, 15, 1);
    let first = calculate_phase_dates(d(2025, 1, 20), &durations, &off, true, &holidays).unwrap();
    let second = calculate_phase_dates(d(2025, 1, 20), &durations, &off, true, &holidays).unwrap();
    assert_eq!(first, second);
}

#[test]
fn windows_are_ordered_and_land_on_working_days() {
    let cal = WorkCalendar::new(
        WeeklyOffDays::from_names(["Friday", "Saturday"]).unwrap(),
        true,
        vec![
            Holiday::recurring(d(2000, 3, 3), "Spring"),
            Holiday::new(d(2025, 3, 10), "Audit"),
        ],
    )
    .unwrap();

    for (offset, durations) in [
        PhaseDurations::new(1, 1, 1, 1, 1),
        PhaseDurations::new(0, 7, 0, 12, 0),
        PhaseDurations::new(4, 0, 3, 0, 2),
        PhaseDurations::new(10, 30, 5, 25, 5),
    ]
    .into_iter()
    .enumerate()
    {
        let start = d(2025, 2, 25) + chrono::Duration::days(offset as i64 * 3);
        let schedule = PhaseWindowCalculator::new(&cal).execute(start, &durations).unwrap();
        let mut previous_end: Option<NaiveDate> = None;
        for window in schedule.windows() {
            assert!(window.start <= window.end);
            assert!(cal.is_working_day(window.start), "{} start {}", window.phase, window.start);
            assert!(cal.is_working_day(window.end), "{} end {}", window.phase, window.end);
            if durations.get(window.phase) == 0 {
                assert_eq!(window.start, window.end);
            } else {
                let counted = cal.count_working_days(window.start, window.end);
                assert_eq!(counted, durations.get(window.phase) as usize);
            }
            if let Some(prev) = previous_end {
                assert!(window.start > prev);
                assert_eq!(window.start, cal.next_working_day(prev).unwrap());
            }
            previous_end = Some(window.end);
        }
        let last_end = previous_end.unwrap();
        assert_eq!(schedule.handover_to_ops(), cal.next_working_day(last_end).unwrap());
    }
}

#[test]
fn changed_holiday_list_recomputes_from_scratch() {
    let durations = sample_durations();
    let off = WeeklyOffDays::weekends();
    let before = calculate_phase_dates(d(2025, 1, 6), &durations, &off, true, &[]).unwrap();
    let after = calculate_phase_dates(
        d(2025, 1, 6),
        &durations,
        &off,
        true,
        &[Holiday::new(d(2025, 1, 20), "Offsite")],
    )
    .unwrap();
    assert_eq!(before.window(Phase::Induction), after.window(Phase::Induction));
    assert_eq!(after.window(Phase::Training).end, d(2025, 1, 27));
    assert_eq!(after.handover_to_ops(), d(2025, 2, 4));
}

#[test]
fn schedule_without_any_working_day_is_rejected() {
    let every_day = WeeklyOffDays::from_names([
        "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun",
    ])
    .unwrap();
    let result = calculate_phase_dates(d(2025, 1, 6), &sample_durations(), &every_day, false, &[]);
    assert!(result.is_err());
}

#[test]
fn walk_past_the_last_date_is_an_error() {
    let start = NaiveDate::MAX.pred_opt().unwrap().pred_opt().unwrap();
    let result = calculate_phase_dates(
        start,
        &PhaseDurations::new(5, 0, 0, 0, 0),
        &WeeklyOffDays::default(),
        false,
        &[],
    );
    assert!(matches!(result, Err(CalendarError::DateOutOfRange(_))));

    // Five markers fit exactly; only the handover step runs off the end.
    let cal = WorkCalendar::new(WeeklyOffDays::default(), false, Vec::new()).unwrap();
    let last_five = NaiveDate::MAX - chrono::Duration::days(4);
    let result = PhaseWindowCalculator::new(&cal).execute(last_five, &PhaseDurations::default());
    assert_eq!(result, Err(CalendarError::DateOutOfRange(NaiveDate::MAX)));
}

#[test]
fn schedule_renders_as_dataframe() {
    let cal = WorkCalendar::default();
    let schedule = PhaseWindowCalculator::new(&cal).execute(d(2025, 1, 6), &sample_durations()).unwrap();
    let df = schedule.to_dataframe().unwrap();
    assert_eq!(df.height(), 6);
    let phases: Vec<&str> = df
        .column("phase")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(
        phases,
        vec!["induction", "training", "certification", "ojt", "ojt_certification", "handover_to_ops"]
    );
    let days: Vec<i64> = df
        .column("calendar_days")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(days, vec![5, 12, 1, 3, 1, 1]);
}
