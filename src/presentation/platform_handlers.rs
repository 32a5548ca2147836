// HTTP request handlers - forum, success stories, dashboard, appointments and users
use crate::domain::appointment::{AppointmentStatus, AvailabilitySlot};
use crate::domain::community::{NewPost, NewStory, NewTopic};
use crate::domain::id::EntityId;
use crate::domain::user::{NewUser, UserUpdate};
use crate::presentation::app_state::AppState;
use crate::presentation::error::AppError;
use crate::presentation::handlers::respond;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub slots: Vec<AvailabilitySlot>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: AppointmentStatus,
}

pub async fn list_topics(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let topics = state.community_service.topics().await?;
    Ok(respond(&headers, StatusCode::OK, &topics).await)
}

pub async fn create_topic(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(topic): Json<NewTopic>,
) -> Result<Response, AppError> {
    let topic = state.community_service.create_topic(topic).await?;
    Ok(respond(&headers, StatusCode::CREATED, &topic).await)
}

pub async fn list_posts(
    Path(topic_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let posts = state.community_service.posts(&EntityId::new(topic_id)).await?;
    Ok(respond(&headers, StatusCode::OK, &posts).await)
}

pub async fn create_post(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(post): Json<NewPost>,
) -> Result<Response, AppError> {
    let post = state.community_service.create_post(post).await?;
    Ok(respond(&headers, StatusCode::CREATED, &post).await)
}

pub async fn like_post(
    Path(post_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    state.community_service.like_post(&EntityId::new(post_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_stories(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let stories = state.community_service.stories().await?;
    Ok(respond(&headers, StatusCode::OK, &stories).await)
}

pub async fn create_story(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(story): Json<NewStory>,
) -> Result<Response, AppError> {
    let story = state.community_service.share_story(story).await?;
    Ok(respond(&headers, StatusCode::CREATED, &story).await)
}

/// Analytics dashboard (tiles + charts)
pub async fn get_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let dashboard = state.dashboard_service.get_dashboard().await?;
    Ok(respond(&headers, StatusCode::OK, &dashboard).await)
}

pub async fn get_availability(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let availability = state.appointment_service.my_availability().await?;
    Ok(respond(&headers, StatusCode::OK, &availability).await)
}

pub async fn put_availability(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Response, AppError> {
    let availability = state.appointment_service.set_availability(request.slots).await?;
    Ok(respond(&headers, StatusCode::OK, &availability).await)
}

pub async fn put_appointment_status(
    Path(appointment_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<StatusRequest>,
) -> Result<StatusCode, AppError> {
    state
        .appointment_service
        .update_status(&EntityId::new(appointment_id), request.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_users(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let users = state.user_service.list().await?;
    Ok(respond(&headers, StatusCode::OK, &users).await)
}

pub async fn create_user(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(user): Json<NewUser>,
) -> Result<Response, AppError> {
    let user = state.user_service.create(user).await?;
    Ok(respond(&headers, StatusCode::CREATED, &user).await)
}

pub async fn update_user(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(update): Json<UserUpdate>,
) -> Result<Response, AppError> {
    let user = state.user_service.update(&EntityId::new(id), update).await?;
    Ok(respond(&headers, StatusCode::OK, &user).await)
}

pub async fn delete_user(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    state.user_service.delete(&EntityId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
