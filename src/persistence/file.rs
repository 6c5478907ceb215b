use super::{PersistenceError, PersistenceResult};
use crate::{
    batch::Batch,
    calendar::{Holiday, WorkCalendar, WorkCalendarConfig},
    phase::PhaseDurations,
    register::BatchRegister,
    schedule::ScheduleDates,
    status::BatchStatus,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

const CALENDAR_ROW_MARKER: &str = "__calendar__";

#[derive(Serialize, Deserialize)]
struct RegisterSnapshot {
    calendar: WorkCalendarConfig,
    batches: Vec<Batch>,
}

impl RegisterSnapshot {
    fn from_register(register: &BatchRegister) -> PersistenceResult<Self> {
        let batches: Vec<Batch> = register.batches().cloned().collect();
        super::validate_batches(&batches)?;
        Ok(Self {
            calendar: register.calendar_config(),
            batches,
        })
    }

    fn into_register(self) -> PersistenceResult<BatchRegister> {
        super::validate_batches(&self.batches)?;
        let calendar = WorkCalendar::from_config(&self.calendar)?;
        let mut register = BatchRegister::new(calendar);
        for batch in self.batches {
            register.insert_record(batch)?;
        }
        Ok(register)
    }
}

pub fn save_register_to_json<P: AsRef<Path>>(
    register: &BatchRegister,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = RegisterSnapshot::from_register(register)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_register_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<BatchRegister> {
    let file = File::open(path)?;
    let snapshot: RegisterSnapshot = serde_json::from_reader(file)?;
    snapshot.into_register()
}

pub fn save_calendar_config<P: AsRef<Path>>(
    config: &WorkCalendarConfig,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, config)?;
    Ok(())
}

pub fn load_calendar_config<P: AsRef<Path>>(path: P) -> PersistenceResult<WorkCalendarConfig> {
    let file = File::open(path)?;
    let config: WorkCalendarConfig = serde_json::from_reader(file)?;
    // Reject configs that could never schedule anything.
    WorkCalendar::from_config(&config)?;
    Ok(config)
}

#[derive(Deserialize)]
struct HolidayCsvRecord {
    date: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_recurring: String,
}

/// Read a holiday list with a `date,name,is_recurring` header.
pub fn load_holidays_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Holiday>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut holidays = Vec::new();
    for record in reader.deserialize::<HolidayCsvRecord>() {
        let record = record?;
        let date = parse_date(&record.date)?
            .ok_or_else(|| PersistenceError::InvalidData("holiday row without a date".into()))?;
        holidays.push(Holiday {
            date,
            name: record.name.trim().to_string(),
            is_recurring: parse_flag(&record.is_recurring)?,
        });
    }
    Ok(holidays)
}

#[derive(Default, Serialize, Deserialize)]
struct BatchCsvRecord {
    id: u32,
    name: String,
    start_date: String,
    induction_days: u32,
    training_days: u32,
    certification_days: u32,
    ojt_days: u32,
    ojt_certification_days: u32,
    induction_start: String,
    induction_end: String,
    training_start: String,
    training_end: String,
    certification_start: String,
    certification_end: String,
    ojt_start: String,
    ojt_end: String,
    ojt_certification_start: String,
    ojt_certification_end: String,
    handover_to_ops: String,
    end_date: String,
    status: String,
    #[serde(default)]
    calendar_json: String,
}

impl From<&Batch> for BatchCsvRecord {
    fn from(batch: &Batch) -> Self {
        let dates = &batch.dates;
        Self {
            id: batch.id,
            name: batch.name.clone(),
            start_date: format_date(batch.start_date),
            induction_days: batch.durations.induction,
            training_days: batch.durations.training,
            certification_days: batch.durations.certification,
            ojt_days: batch.durations.ojt,
            ojt_certification_days: batch.durations.ojt_certification,
            induction_start: format_date(dates.induction_start),
            induction_end: format_date(dates.induction_end),
            training_start: format_date(dates.training_start),
            training_end: format_date(dates.training_end),
            certification_start: format_date(dates.certification_start),
            certification_end: format_date(dates.certification_end),
            ojt_start: format_date(dates.ojt_start),
            ojt_end: format_date(dates.ojt_end),
            ojt_certification_start: format_date(dates.ojt_certification_start),
            ojt_certification_end: format_date(dates.ojt_certification_end),
            handover_to_ops: format_date(dates.handover_to_ops),
            end_date: format_date(dates.end_date),
            status: batch.status.as_str().to_string(),
            calendar_json: String::new(),
        }
    }
}

impl BatchCsvRecord {
    fn calendar_row(register: &BatchRegister) -> PersistenceResult<Self> {
        let mut record = BatchCsvRecord::default();
        record.name = CALENDAR_ROW_MARKER.to_string();
        record.calendar_json = serde_json::to_string(&register.calendar_config())?;
        Ok(record)
    }

    fn is_calendar_row(&self) -> bool {
        !self.calendar_json.trim().is_empty()
    }

    fn into_batch(self) -> PersistenceResult<Batch> {
        if self.is_calendar_row() {
            return Err(PersistenceError::InvalidData(
                "calendar row cannot be converted to a batch".into(),
            ));
        }
        let dates = ScheduleDates {
            induction_start: required_date("induction_start", &self.induction_start)?,
            induction_end: required_date("induction_end", &self.induction_end)?,
            training_start: required_date("training_start", &self.training_start)?,
            training_end: required_date("training_end", &self.training_end)?,
            certification_start: required_date("certification_start", &self.certification_start)?,
            certification_end: required_date("certification_end", &self.certification_end)?,
            ojt_start: required_date("ojt_start", &self.ojt_start)?,
            ojt_end: required_date("ojt_end", &self.ojt_end)?,
            ojt_certification_start: required_date(
                "ojt_certification_start",
                &self.ojt_certification_start,
            )?,
            ojt_certification_end: required_date(
                "ojt_certification_end",
                &self.ojt_certification_end,
            )?,
            handover_to_ops: required_date("handover_to_ops", &self.handover_to_ops)?,
            end_date: required_date("end_date", &self.end_date)?,
        };
        let status = self
            .status
            .parse::<BatchStatus>()
            .map_err(PersistenceError::InvalidData)?;
        Ok(Batch {
            id: self.id,
            start_date: required_date("start_date", &self.start_date)?,
            name: self.name,
            durations: PhaseDurations::new(
                self.induction_days,
                self.training_days,
                self.certification_days,
                self.ojt_days,
                self.ojt_certification_days,
            ),
            dates,
            status,
        })
    }
}

pub fn save_register_to_csv<P: AsRef<Path>>(
    register: &BatchRegister,
    path: P,
) -> PersistenceResult<()> {
    super::validate_register(register)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(BatchCsvRecord::calendar_row(register)?)?;
    for batch in register.batches() {
        writer.serialize(BatchCsvRecord::from(batch))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_register_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<BatchRegister> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut batches = Vec::new();
    let mut calendar_config: Option<WorkCalendarConfig> = None;
    for record in reader.deserialize::<BatchCsvRecord>() {
        let record = record?;
        if record.is_calendar_row() {
            if calendar_config.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple calendar rows".into(),
                ));
            }
            calendar_config = Some(serde_json::from_str(&record.calendar_json).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid calendar json: {err}"))
            })?);
            continue;
        }
        batches.push(record.into_batch()?);
    }

    super::validate_batches(&batches)?;

    let calendar = match calendar_config {
        Some(config) => WorkCalendar::from_config(&config)?,
        None => WorkCalendar::default(),
    };
    let mut register = BatchRegister::new(calendar);
    for batch in batches {
        register.insert_record(batch)?;
    }
    Ok(register)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn required_date(field: &str, input: &str) -> PersistenceResult<NaiveDate> {
    parse_date(input)?.ok_or_else(|| PersistenceError::InvalidData(format!("missing {field}")))
}

fn parse_flag(input: &str) -> PersistenceResult<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "0" => Ok(false),
        "true" | "yes" | "1" => Ok(true),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid boolean '{other}'"
        ))),
    }
}
