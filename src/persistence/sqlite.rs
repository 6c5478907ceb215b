use super::{PersistenceResult, ScheduleStore};
use crate::{
    batch::Batch,
    calendar::{WorkCalendar, WorkCalendarConfig},
    register::BatchRegister,
};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

pub struct SqliteBatchStore {
    connection: Mutex<Connection>,
}

impl SqliteBatchStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS organization_calendar (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                calendar_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS batches (
                id INTEGER PRIMARY KEY,
                status TEXT NOT NULL,
                end_date TEXT NOT NULL,
                batch_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| super::PersistenceError::InvalidData("sqlite connection poisoned".into()))
    }

    fn save_calendar(
        &self,
        tx: &rusqlite::Transaction,
        config: &WorkCalendarConfig,
    ) -> PersistenceResult<()> {
        let json = serde_json::to_string(config)?;
        tx.execute("DELETE FROM organization_calendar", [])?;
        tx.execute(
            "INSERT INTO organization_calendar (id, calendar_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_batches(
        &self,
        tx: &rusqlite::Transaction,
        register: &BatchRegister,
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM batches", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO batches (id, status, end_date, batch_json) VALUES (?1, ?2, ?3, ?4)")?;
        for batch in register.batches() {
            let json = serde_json::to_string(batch)?;
            stmt.execute(params![
                batch.id,
                batch.status.as_str(),
                batch.dates.end_date.format("%Y-%m-%d").to_string(),
                json
            ])?;
        }
        Ok(())
    }
}

impl ScheduleStore for SqliteBatchStore {
    fn save_register(&self, register: &BatchRegister) -> PersistenceResult<()> {
        super::validate_register(register)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        self.save_calendar(&tx, &register.calendar_config())?;
        self.save_batches(&tx, register)?;
        tx.commit()?;
        Ok(())
    }

    fn load_register(&self) -> PersistenceResult<Option<BatchRegister>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT calendar_json FROM organization_calendar WHERE id = 1")?;
        let calendar_json_opt: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(calendar_json) = calendar_json_opt else {
            return Ok(None);
        };

        let config: WorkCalendarConfig = serde_json::from_str(&calendar_json)?;
        let calendar = WorkCalendar::from_config(&config)?;

        let mut stmt = conn.prepare("SELECT batch_json FROM batches ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut batches = Vec::new();
        for json in rows {
            let json = json?;
            let batch: Batch = serde_json::from_str(&json)?;
            batches.push(batch);
        }

        super::validate_batches(&batches)?;

        let mut register = BatchRegister::new(calendar);
        for batch in batches {
            register.insert_record(batch)?;
        }

        Ok(Some(register))
    }
}
