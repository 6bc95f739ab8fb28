use crate::advisor::{Advice, Strategy};
use crate::api::{AppState, AuthSession};
use crate::data::{date_bounds, filter_by_date, load_history, series, SeriesPoint};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{Dimension, HistoricalRecord, PartialReading};
use crate::thresholds::Classification;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        model_loaded: state.advisor.model_loaded(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_loaded: bool,
}

/// Prometheus exposition
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

/// Open a session
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    request.validate()?;

    let session = state
        .sessions
        .login(state.credentials.as_ref(), &request.username, &request.password)?;

    Ok(Json(LoginResponse {
        token: session.token,
        username: session.username,
        expires_at: session.expires_at,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Close the caller's session
pub async fn logout(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> StatusCode {
    state.sessions.logout(&session.token);
    StatusCode::NO_CONTENT
}

/// Register a new user
pub async fn create_user(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    request.validate()?;
    state
        .credentials
        .add_user(&request.username, &request.password)?;

    info!(created_by = %session.username, username = %request.username, "User created");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            username: request.username.trim().to_string(),
        }),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

async fn filtered_history(
    state: &AppState,
    query: &DateQuery,
) -> Result<(NaiveDate, NaiveDate, Vec<HistoricalRecord>)> {
    let path = state.history_path.clone();
    let records = tokio::task::spawn_blocking(move || load_history(path.as_path()))
        .await
        .map_err(|e| AppError::Internal(format!("History loader failed: {}", e)))??;

    let range = date_bounds(&records)?.with_overrides(query.start, query.end)?;
    let filtered = filter_by_date(&records, &range);
    Ok((range.start(), range.end(), filtered))
}

/// Historical readings in a date range (defaults to the full history)
pub async fn list_readings(
    State(state): State<AppState>,
    _session: AuthSession,
    Query(query): Query<DateQuery>,
) -> Result<Json<ReadingsResponse>> {
    let (start, end, records) = filtered_history(&state, &query).await?;

    Ok(Json(ReadingsResponse {
        start,
        end,
        count: records.len(),
        records,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadingsResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: usize,
    pub records: Vec<HistoricalRecord>,
}

/// Time series of one dimension for charting
pub async fn dimension_series(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(dimension): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<SeriesResponse>> {
    let dimension: Dimension = dimension
        .parse()
        .map_err(|_| AppError::Validation(format!("Unknown dimension: {}", dimension)))?;

    let (start, end, records) = filtered_history(&state, &query).await?;

    Ok(Json(SeriesResponse {
        dimension,
        column: dimension.column().to_string(),
        unit: dimension.unit().to_string(),
        start,
        end,
        points: series(&records, dimension),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeriesResponse {
    pub dimension: Dimension,
    pub column: String,
    pub unit: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub points: Vec<SeriesPoint>,
}

/// Rule classification of a possibly incomplete reading
pub async fn classify(
    State(state): State<AppState>,
    _session: AuthSession,
    Json(reading): Json<PartialReading>,
) -> Result<Json<Classification>> {
    Ok(Json(state.advisor.classify(&reading)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct PredictQuery {
    pub strategy: Option<Strategy>,
}

/// Recommendations for a manually entered reading
pub async fn predict(
    State(state): State<AppState>,
    _session: AuthSession,
    Query(query): Query<PredictQuery>,
    Json(reading): Json<PartialReading>,
) -> Result<Json<Advice>> {
    let strategy = query.strategy.unwrap_or_default();
    let reading = reading.complete()?;
    Ok(Json(state.advisor.advise_manual(reading.into(), strategy)?))
}

/// Unknown routes answer with the standard error body
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
