use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use log::info;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::validation::parse_iso_date;
use crate::{
    Batch, BatchError, BatchPlanRequest, BatchRegister, BatchSchedule, BatchStatus, BatchUpdate,
    CalendarError, DurationsInput, RefreshSummary, ScheduleDates, ValidationError, WorkCalendar,
    WorkCalendarConfig,
};

type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    register: Arc<RwLock<BatchRegister>>,
    clock: Clock,
}

impl AppState {
    pub fn new(register: BatchRegister) -> Self {
        Self {
            register: Arc::new(RwLock::new(register)),
            clock: Arc::new(|| Local::now().date_naive()),
        }
    }

    /// State whose notion of "today" is pinned to `today`.
    pub fn with_fixed_date(register: BatchRegister, today: NaiveDate) -> Self {
        Self {
            register: Arc::new(RwLock::new(register)),
            clock: Arc::new(move || today),
        }
    }

    fn register(&self) -> Arc<RwLock<BatchRegister>> {
        self.register.clone()
    }

    fn today(&self) -> NaiveDate {
        (self.clock)()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<BatchError> for ApiError {
    fn from(value: BatchError) -> Self {
        match value {
            BatchError::NotFound(_) => ApiError::NotFound(value.to_string()),
            BatchError::AlreadyExists(_) | BatchError::IdsExhausted => {
                ApiError::Conflict(value.to_string())
            }
            BatchError::Invalid(_) | BatchError::Calendar(_) => ApiError::Invalid(value.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<CalendarError> for ApiError {
    fn from(value: CalendarError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBatchPayload {
    #[serde(default)]
    pub id: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub durations: DurationsInput,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBatchPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub durations: Option<DurationsInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchedulePreview {
    pub schedule: BatchSchedule,
    pub dates: ScheduleDates,
    pub status: BatchStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: u32,
    pub on: NaiveDate,
    pub status: BatchStatus,
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    on: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/calendar", get(get_calendar).put(update_calendar))
        .route("/schedule", post(preview_schedule))
        .route("/batches", get(list_batches).post(create_batch))
        .route(
            "/batches/:id",
            get(get_batch).put(update_batch).delete(delete_batch),
        )
        .route("/batches/:id/status", get(batch_status))
        .route("/refresh", post(refresh_statuses))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, register: BatchRegister) -> std::io::Result<()> {
    let state = AppState::new(register);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_calendar(State(state): State<AppState>) -> Json<WorkCalendarConfig> {
    let register = state.register();
    let config = register.read().calendar_config();
    Json(config)
}

async fn update_calendar(
    State(state): State<AppState>,
    Json(config): Json<WorkCalendarConfig>,
) -> Result<Json<WorkCalendarConfig>, ApiError> {
    let calendar = WorkCalendar::from_config(&config)?;
    let today = state.today();
    let register = state.register();
    let current = {
        let mut guard = register.write();
        guard.set_calendar(calendar, today)?;
        guard.calendar_config()
    };
    Ok(Json(current))
}

async fn preview_schedule(
    State(state): State<AppState>,
    Json(request): Json<BatchPlanRequest>,
) -> Result<Json<SchedulePreview>, ApiError> {
    let register = state.register();
    let plan = {
        let guard = register.read();
        request.validate(guard.calendar())?
    };
    let schedule = plan.schedule()?;
    let status = schedule.status_on(state.today());
    Ok(Json(SchedulePreview {
        dates: schedule.dates(),
        schedule,
        status,
    }))
}

async fn list_batches(State(state): State<AppState>) -> Json<Vec<Batch>> {
    let register = state.register();
    let batches = register.read().batches().cloned().collect();
    Json(batches)
}

async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Batch>, ApiError> {
    let register = state.register();
    let found = register.read().find_batch(id).cloned();
    found
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("batch {id} not found")))
}

async fn create_batch(
    State(state): State<AppState>,
    Json(payload): Json<CreateBatchPayload>,
) -> Result<(StatusCode, Json<Batch>), ApiError> {
    let start_date = match payload.start_date.as_deref().map(str::trim) {
        None | Some("") => return Err(ValidationError::MissingStartDate.into()),
        Some(raw) => parse_iso_date("start date", raw)?,
    };
    let durations = payload.durations.validate()?;
    let today = state.today();
    let register = state.register();
    let created = {
        let mut guard = register.write();
        let id = match payload.id {
            Some(id) => id,
            None => guard.next_id()?,
        };
        guard
            .create_batch(id, payload.name, start_date, durations, today)?
            .clone()
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_batch(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(payload): Json<UpdateBatchPayload>,
) -> Result<Json<Batch>, ApiError> {
    let update = BatchUpdate {
        name: payload.name,
        start_date: payload
            .start_date
            .as_deref()
            .map(|raw| parse_iso_date("start date", raw))
            .transpose()?,
        durations: payload
            .durations
            .map(|input| input.validate())
            .transpose()?,
    };
    let today = state.today();
    let register = state.register();
    let updated = {
        let mut guard = register.write();
        guard.update_batch(id, update, today)?.clone()
    };
    Ok(Json(updated))
}

async fn delete_batch(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    let register = state.register();
    let removed = register.write().delete_batch(id);
    if !removed {
        return Err(ApiError::not_found(format!("batch {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn batch_status(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    let on = match query.on.as_deref() {
        Some(raw) => parse_iso_date("status date", raw)?,
        None => state.today(),
    };
    let register = state.register();
    let status = {
        let guard = register.read();
        guard
            .find_batch(id)
            .map(|batch| batch.status_on(on))
            .ok_or_else(|| ApiError::not_found(format!("batch {id} not found")))?
    };
    Ok(Json(StatusResponse { id, on, status }))
}

async fn refresh_statuses(State(state): State<AppState>) -> Json<RefreshSummary> {
    let today = state.today();
    let register = state.register();
    let summary = register.write().refresh(today);
    Json(summary)
}
