// HTTP request handlers - session, reports and notifications
use crate::domain::id::EntityId;
use crate::domain::report::{ReportKind, ReportQuery, UnknownReportKind};
use crate::domain::session::Credentials;
use crate::infrastructure::http_response::{accepts_brotli, attachment_response, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::AppError;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use chrono::NaiveDate;
use futures::stream::Stream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// JSON body honoring the client's Accept-Encoding
pub(crate) async fn respond<T: Serialize>(headers: &HeaderMap, status: StatusCode, data: &T) -> Response {
    match json_response(status, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn login(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, AppError> {
    let profile = state.auth_service.login(credentials).await?;
    Ok(respond(&headers, StatusCode::OK, &profile).await)
}

pub async fn logout(State(state): State<Arc<AppState>>) -> StatusCode {
    state.auth_service.logout();
    // Clears the feed that belonged to the previous user
    if let Err(e) = state.notification_service.refresh().await {
        tracing::warn!(error = %e, "notification feed reset failed");
    }
    StatusCode::NO_CONTENT
}

pub async fn current_session(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let profile = state.auth_service.profile()?;
    Ok(respond(&headers, StatusCode::OK, &profile).await)
}

pub async fn forgot_password(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Response, AppError> {
    let message = state.auth_service.forgot_password(&request.email).await?;
    Ok(respond(&headers, StatusCode::OK, &json!({ "message": message })).await)
}

pub async fn reset_password(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Response, AppError> {
    let message = state
        .auth_service
        .reset_password(&request.token, &request.password)
        .await?;
    Ok(respond(&headers, StatusCode::OK, &json!({ "message": message })).await)
}

fn report_query(kind: &str, params: ReportParams) -> Result<ReportQuery, AppError> {
    let kind: ReportKind = kind
        .parse()
        .map_err(|e: UnknownReportKind| AppError::BadRequest(e.to_string()))?;
    Ok(ReportQuery::new(kind)
        .with_range(params.start_date, params.end_date)
        .with_search(params.search))
}

/// Rendered screen view of a report
pub async fn view_report(
    Path(kind): Path<String>,
    Query(params): Query<ReportParams>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let query = report_query(&kind, params)?;
    let view = state.report_service.view(&query).await?;
    Ok(respond(&headers, StatusCode::OK, &view).await)
}

/// Complete document download
pub async fn export_report(
    Path(kind): Path<String>,
    Query(params): Query<ReportParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let query = report_query(&kind, params)?;
    let exported = state.report_service.export(&query).await?;
    Ok(
        match attachment_response(exported.bytes, &exported.filename, exported.content_type) {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
    )
}

pub async fn list_notifications(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    respond(&headers, StatusCode::OK, &state.notification_service.latest()).await
}

/// Server-sent events carrying each new notification feed
pub async fn stream_notifications(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let updates = WatchStream::new(state.notification_service.subscribe())
        .map(|feed| Event::default().event("notifications").json_data(&feed));
    Sse::new(updates).keep_alive(KeepAlive::default())
}

pub async fn mark_notification_read(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let feed = state.notification_service.mark_read(&EntityId::new(id)).await?;
    Ok(respond(&headers, StatusCode::OK, &feed).await)
}

pub async fn delete_notification(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let feed = state.notification_service.delete(&EntityId::new(id)).await?;
    Ok(respond(&headers, StatusCode::OK, &feed).await)
}
