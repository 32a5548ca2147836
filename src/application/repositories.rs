// Repository traits for the MedConnect backend
use crate::application::errors::ApiError;
use crate::domain::appointment::{AppointmentStatus, AvailabilitySlot, DoctorAvailability};
use crate::domain::community::{NewPost, NewStory, NewTopic, Post, PostLike, SuccessStory, Topic};
use crate::domain::id::EntityId;
use crate::domain::notification::Notification;
use crate::domain::report::{ReportPayload, ReportQuery};
use crate::domain::session::{Credentials, Session};
use crate::domain::user::{ManagedUser, NewUser, UserUpdate};
use async_trait::async_trait;

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Single read of `GET /reports/{kind}`; no retry
    async fn fetch_report(&self, query: &ReportQuery) -> Result<ReportPayload, ApiError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn list_for_user(&self, user_id: &EntityId) -> Result<Vec<Notification>, ApiError>;

    async fn mark_read(&self, id: &EntityId) -> Result<(), ApiError>;

    async fn delete(&self, id: &EntityId) -> Result<(), ApiError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError>;

    /// Returns the backend's confirmation message
    async fn forgot_password(&self, email: &str) -> Result<String, ApiError>;

    async fn reset_password(&self, token: &str, password: &str) -> Result<String, ApiError>;
}

#[async_trait]
pub trait CommunityRepository: Send + Sync {
    async fn list_topics(&self) -> Result<Vec<Topic>, ApiError>;

    async fn create_topic(&self, topic: &NewTopic) -> Result<Topic, ApiError>;

    async fn list_posts(&self, topic_id: &EntityId) -> Result<Vec<Post>, ApiError>;

    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError>;

    async fn like_post(&self, like: &PostLike) -> Result<(), ApiError>;

    async fn list_stories(&self) -> Result<Vec<SuccessStory>, ApiError>;

    async fn create_story(&self, story: &NewStory) -> Result<SuccessStory, ApiError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn availability(&self, doctor_id: &EntityId) -> Result<DoctorAvailability, ApiError>;

    async fn update_availability(
        &self,
        doctor_id: &EntityId,
        slots: &[AvailabilitySlot],
    ) -> Result<DoctorAvailability, ApiError>;

    async fn update_status(&self, appointment_id: &EntityId, status: AppointmentStatus) -> Result<(), ApiError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_users(&self) -> Result<Vec<ManagedUser>, ApiError>;

    async fn create_user(&self, user: &NewUser) -> Result<ManagedUser, ApiError>;

    async fn update_user(&self, id: &EntityId, update: &UserUpdate) -> Result<ManagedUser, ApiError>;

    async fn delete_user(&self, id: &EntityId) -> Result<(), ApiError>;
}

#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// Raw `GET /dashboard` body; shape is owned by the backend
    async fn fetch_dashboard(&self) -> Result<serde_json::Value, ApiError>;
}
