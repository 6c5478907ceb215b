use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("unknown weekday name '{0}'")]
    UnknownWeekday(String),
    #[error("calendar has no working days: every weekday is off")]
    NoWorkingDays,
    #[error("calendar has no working days: recurring holidays cover the whole year")]
    HolidaysCoverYear,
    #[error("walking forward from {0} runs past the last supported date")]
    DateOutOfRange(NaiveDate),
}

/// A named day off. Recurring holidays repeat every year on the same month and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    #[serde(default, alias = "isRecurring")]
    pub is_recurring: bool,
}

impl Holiday {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            is_recurring: false,
        }
    }

    pub fn recurring(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            is_recurring: true,
        }
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        if self.is_recurring {
            self.date.month() == date.month() && self.date.day() == date.day()
        } else {
            self.date == date
        }
    }
}

/// Set of weekdays on which the organization does not work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyOffDays(HashSet<Weekday>);

impl WeeklyOffDays {
    pub fn new<I>(days: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        Self(days.into_iter().collect())
    }

    pub fn weekends() -> Self {
        Self::new([Weekday::Sat, Weekday::Sun])
    }

    /// Parse weekday names such as `Saturday` or `sun` (case-insensitive).
    pub fn from_names<I, S>(names: I) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut days = HashSet::new();
        for name in names {
            days.insert(parse_weekday(name.as_ref())?);
        }
        Ok(Self(days))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Off days in Monday-first order.
    pub fn days(&self) -> Vec<Weekday> {
        ALL_WEEKDAYS
            .into_iter()
            .filter(|day| self.0.contains(day))
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.days()
            .into_iter()
            .map(|day| weekday_name(day).to_string())
            .collect()
    }

    fn covers_whole_week(&self) -> bool {
        ALL_WEEKDAYS.iter().all(|day| self.0.contains(day))
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn parse_weekday(name: &str) -> Result<Weekday, CalendarError> {
    name.trim()
        .parse::<Weekday>()
        .map_err(|_| CalendarError::UnknownWeekday(name.trim().to_string()))
}

/// Decide whether `date` is a day off under the given weekly-off set and holiday list.
///
/// Holidays only apply when `consider_holidays` is set.
pub fn is_non_working_day(
    date: NaiveDate,
    weekly_off_days: &WeeklyOffDays,
    consider_holidays: bool,
    holidays: &[Holiday],
) -> bool {
    if weekly_off_days.contains(date.weekday()) {
        return true;
    }
    consider_holidays && holidays.iter().any(|holiday| holiday.matches(date))
}

/// Organization working calendar: weekly off days plus an optional holiday list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkCalendar {
    weekly_off_days: WeeklyOffDays,
    consider_holidays: bool,
    holidays: Vec<Holiday>,
}

/// Serializable form of [`WorkCalendar`], with weekdays written as names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    pub weekly_off_days: Vec<String>,
    #[serde(default = "default_consider_holidays")]
    pub consider_holidays: bool,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
}

fn default_consider_holidays() -> bool {
    true
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            weekly_off_days: WeeklyOffDays::weekends(),
            consider_holidays: true,
            holidays: Vec::new(),
        }
    }
}

impl WorkCalendar {
    pub fn new(
        weekly_off_days: WeeklyOffDays,
        consider_holidays: bool,
        holidays: Vec<Holiday>,
    ) -> Result<Self, CalendarError> {
        let calendar = Self {
            weekly_off_days,
            consider_holidays,
            holidays,
        };
        calendar.ensure_has_working_days()?;
        Ok(calendar)
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, CalendarError> {
        let weekly_off_days = WeeklyOffDays::from_names(&config.weekly_off_days)?;
        Self::new(
            weekly_off_days,
            config.consider_holidays,
            config.holidays.clone(),
        )
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    pub fn weekly_off_days(&self) -> &WeeklyOffDays {
        &self.weekly_off_days
    }

    pub fn consider_holidays(&self) -> bool {
        self.consider_holidays
    }

    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    pub fn set_weekly_off_days(&mut self, days: WeeklyOffDays) -> Result<(), CalendarError> {
        let previous = std::mem::replace(&mut self.weekly_off_days, days);
        if let Err(err) = self.ensure_has_working_days() {
            self.weekly_off_days = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn set_consider_holidays(&mut self, consider: bool) -> Result<(), CalendarError> {
        let previous = self.consider_holidays;
        self.consider_holidays = consider;
        if let Err(err) = self.ensure_has_working_days() {
            self.consider_holidays = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn add_holiday(&mut self, holiday: Holiday) -> Result<(), CalendarError> {
        self.holidays.push(holiday);
        if let Err(err) = self.ensure_has_working_days() {
            self.holidays.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Remove every holiday dated exactly `date`. Returns how many were removed.
    pub fn remove_holidays_on(&mut self, date: NaiveDate) -> usize {
        let before = self.holidays.len();
        self.holidays.retain(|holiday| holiday.date != date);
        before - self.holidays.len()
    }

    pub fn is_non_working_day(&self, date: NaiveDate) -> bool {
        is_non_working_day(
            date,
            &self.weekly_off_days,
            self.consider_holidays,
            &self.holidays,
        )
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.is_non_working_day(date)
    }

    /// `date` itself when it is a working day, otherwise the next one.
    pub fn first_working_day_on_or_after(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        let mut current = date;
        while self.is_non_working_day(current) {
            current = step(current)?;
        }
        Ok(current)
    }

    /// First working day strictly after `from`.
    pub fn next_working_day(&self, from: NaiveDate) -> Result<NaiveDate, CalendarError> {
        self.first_working_day_on_or_after(step(from)?)
    }

    /// The `days_ahead`-th working day after `from`; `from` itself when `days_ahead` is 0.
    pub fn advance_working_days(
        &self,
        from: NaiveDate,
        days_ahead: u32,
    ) -> Result<NaiveDate, CalendarError> {
        let mut current = from;
        for _ in 0..days_ahead {
            current = self.next_working_day(current)?;
        }
        Ok(current)
    }

    /// Working days between `start` and `end`, both ends included.
    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> usize {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| self.is_working_day(*day))
            .count()
    }

    /// Holiday occurrences between `start` and `end` inclusive, paired with the date they fall on.
    /// Empty when holidays are not considered.
    pub fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, &Holiday)> {
        if !self.consider_holidays {
            return Vec::new();
        }
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter_map(|day| {
                self.holidays
                    .iter()
                    .find(|holiday| holiday.matches(day))
                    .map(|holiday| (day, holiday))
            })
            .collect()
    }

    fn ensure_has_working_days(&self) -> Result<(), CalendarError> {
        if self.weekly_off_days.covers_whole_week() {
            return Err(CalendarError::NoWorkingDays);
        }
        if self.consider_holidays {
            // Feb 29 alone cannot block a year, so a full cover needs the other 365 month/days.
            let covered: HashSet<(u32, u32)> = self
                .holidays
                .iter()
                .filter(|holiday| holiday.is_recurring)
                .map(|holiday| (holiday.date.month(), holiday.date.day()))
                .filter(|&(month, day)| !(month == 2 && day == 29))
                .collect();
            if covered.len() >= 365 {
                return Err(CalendarError::HolidaysCoverYear);
            }
        }
        Ok(())
    }
}

fn step(date: NaiveDate) -> Result<NaiveDate, CalendarError> {
    date.succ_opt().ok_or(CalendarError::DateOutOfRange(date))
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        WorkCalendarConfig::from(&WorkCalendar::default())
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let mut holidays = calendar.holidays.clone();
        holidays.sort_by_key(|holiday| holiday.date);

        Self {
            weekly_off_days: calendar.weekly_off_days.names(),
            consider_holidays: calendar.consider_holidays,
            holidays,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_names_parse_short_and_long_forms() {
        let days = WeeklyOffDays::from_names(["Saturday", "sun", "SATURDAY"]).unwrap();
        assert_eq!(days.days(), vec![Weekday::Sat, Weekday::Sun]);
        assert_eq!(days.names(), vec!["Saturday", "Sunday"]);
    }

    #[test]
    fn unknown_weekday_name_is_rejected() {
        let err = WeeklyOffDays::from_names(["Funday"]).unwrap_err();
        assert_eq!(err, CalendarError::UnknownWeekday("Funday".into()));
    }

    #[test]
    fn calendar_without_working_days_is_rejected() {
        let err = WorkCalendar::new(WeeklyOffDays::new(ALL_WEEKDAYS), false, Vec::new()).unwrap_err();
        assert_eq!(err, CalendarError::NoWorkingDays);
    }

    #[test]
    fn failed_update_leaves_calendar_unchanged() {
        let mut cal = WorkCalendar::default();
        assert!(cal.set_weekly_off_days(WeeklyOffDays::new(ALL_WEEKDAYS)).is_err());
        assert_eq!(cal.weekly_off_days(), &WeeklyOffDays::weekends());
    }

    #[test]
    fn stepping_past_the_last_date_is_an_error() {
        let cal = WorkCalendar::new(WeeklyOffDays::default(), false, Vec::new()).unwrap();
        assert_eq!(
            cal.next_working_day(NaiveDate::MAX),
            Err(CalendarError::DateOutOfRange(NaiveDate::MAX))
        );
        assert_eq!(cal.first_working_day_on_or_after(NaiveDate::MAX), Ok(NaiveDate::MAX));
    }

    #[test]
    fn leap_day_recurring_holiday_only_matches_leap_years() {
        let leap = Holiday::recurring(d(2024, 2, 29), "Leap");
        assert!(leap.matches(d(2028, 2, 29)));
        assert!(!leap.matches(d(2025, 2, 28)));
        assert!(!leap.matches(d(2025, 3, 1)));
    }
}
