// MedConnect REST client - implements every repository seam over reqwest
use crate::application::errors::ApiError;
use crate::application::repositories::{
    AppointmentRepository, AuthRepository, CommunityRepository, DashboardRepository,
    NotificationRepository, ReportRepository, UserRepository,
};
use crate::application::session_context::SessionContext;
use crate::domain::appointment::{AppointmentStatus, AvailabilitySlot, DoctorAvailability};
use crate::domain::community::{NewPost, NewStory, NewTopic, Post, PostLike, SuccessStory, Topic};
use crate::domain::id::EntityId;
use crate::domain::notification::Notification;
use crate::domain::report::{ReportPayload, ReportQuery};
use crate::domain::session::{Credentials, Session, UserProfile};
use crate::domain::user::{ManagedUser, NewUser, UserUpdate};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub struct MedConnectApi {
    http: Client,
    base_url: String,
    session: Arc<SessionContext>,
}

/// Collections arrive either bare or wrapped in an envelope object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Plain(Vec<T>),
    Wrapped {
        #[serde(alias = "items", alias = "results", alias = "notifications")]
        data: Vec<T>,
    },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Plain(items) => items,
            Listing::Wrapped { data } => data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Single<T> {
    Wrapped { data: T },
    Plain(T),
}

impl<T> Single<T> {
    fn into_inner(self) -> T {
        match self {
            Single::Wrapped { data } => data,
            Single::Plain(item) => item,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AvailabilityBody {
    Schedule(DoctorAvailability),
    Slots(Vec<AvailabilitySlot>),
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: UserProfile,
}

#[derive(Debug, Default, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
struct SlotsBody<'a> {
    slots: &'a [AvailabilitySlot],
}

impl MedConnectApi {
    pub fn new(base_url: &str, timeout: Duration, session: Arc<SessionContext>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("Accept", "application/json")
    }

    /// Attach the session's bearer token; fails before any I/O when logged out
    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let session = self.session.require()?;
        Ok(self.request(method, path).bearer_auth(session.token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<bytes::Bytes, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            let parsed: MessageBody = serde_json::from_slice(&body).unwrap_or_default();
            let message = parsed
                .message
                .or(parsed.error)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            tracing::debug!(status = status.as_u16(), %message, "backend rejected request");
            return Err(ApiError::Application {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute_unit(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }

    async fn execute_message(&self, request: RequestBuilder, fallback: &str) -> Result<String, ApiError> {
        let body = self.send(request).await?;
        let parsed: MessageBody = serde_json::from_slice(&body).unwrap_or_default();
        Ok(parsed.message.unwrap_or_else(|| fallback.to_string()))
    }
}

fn segment(id: &EntityId) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id.as_str())
}

/// Strip a `{ data: ... }` envelope when present
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("data").is_some_and(|d| d.is_object()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[async_trait]
impl ReportRepository for MedConnectApi {
    async fn fetch_report(&self, query: &ReportQuery) -> Result<ReportPayload, ApiError> {
        let path = format!("/reports/{}", query.kind.slug());
        tracing::debug!(kind = %query.kind, params = ?query.query_pairs(), "fetching report");

        let request = self.authorized(Method::GET, &path)?.query(&query.query_pairs());
        let value: Value = self.execute(request).await?;

        ReportPayload::from_value(query.kind, unwrap_data(value))
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl NotificationRepository for MedConnectApi {
    async fn list_for_user(&self, user_id: &EntityId) -> Result<Vec<Notification>, ApiError> {
        let path = format!("/notifications/user/{}", segment(user_id));
        let listing: Listing<Notification> = self.execute(self.authorized(Method::GET, &path)?).await?;
        Ok(listing.into_vec())
    }

    async fn mark_read(&self, id: &EntityId) -> Result<(), ApiError> {
        let path = format!("/notifications/{}/read", segment(id));
        self.execute_unit(self.authorized(Method::PUT, &path)?).await
    }

    async fn delete(&self, id: &EntityId) -> Result<(), ApiError> {
        let path = format!("/notifications/{}", segment(id));
        self.execute_unit(self.authorized(Method::DELETE, &path)?).await
    }
}

#[async_trait]
impl AuthRepository for MedConnectApi {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let request = self.request(Method::POST, "/users/login").json(credentials);
        let response: Single<LoginResponse> = self.execute(request).await?;
        let response = response.into_inner();
        Ok(Session::new(response.token, response.user))
    }

    async fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
        let request = self
            .request(Method::POST, "/users/forgot-password")
            .json(&json!({ "email": email }));
        self.execute_message(request, "Password reset instructions sent").await
    }

    async fn reset_password(&self, token: &str, password: &str) -> Result<String, ApiError> {
        let request = self
            .request(Method::POST, "/users/reset-password")
            .json(&json!({ "token": token, "password": password }));
        self.execute_message(request, "Password has been reset").await
    }
}

#[async_trait]
impl CommunityRepository for MedConnectApi {
    async fn list_topics(&self) -> Result<Vec<Topic>, ApiError> {
        let listing: Listing<Topic> = self.execute(self.authorized(Method::GET, "/forum/topics")?).await?;
        Ok(listing.into_vec())
    }

    async fn create_topic(&self, topic: &NewTopic) -> Result<Topic, ApiError> {
        let request = self.authorized(Method::POST, "/forum/topics")?.json(topic);
        let created: Single<Topic> = self.execute(request).await?;
        Ok(created.into_inner())
    }

    async fn list_posts(&self, topic_id: &EntityId) -> Result<Vec<Post>, ApiError> {
        let path = format!("/forum/topics/{}/posts", segment(topic_id));
        let listing: Listing<Post> = self.execute(self.authorized(Method::GET, &path)?).await?;
        Ok(listing.into_vec())
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        let request = self.authorized(Method::POST, "/forum/posts")?.json(post);
        let created: Single<Post> = self.execute(request).await?;
        Ok(created.into_inner())
    }

    async fn like_post(&self, like: &PostLike) -> Result<(), ApiError> {
        let request = self.authorized(Method::POST, "/post-likes")?.json(like);
        self.execute_unit(request).await
    }

    async fn list_stories(&self) -> Result<Vec<SuccessStory>, ApiError> {
        let listing: Listing<SuccessStory> =
            self.execute(self.authorized(Method::GET, "/success-stories")?).await?;
        Ok(listing.into_vec())
    }

    async fn create_story(&self, story: &NewStory) -> Result<SuccessStory, ApiError> {
        let request = self.authorized(Method::POST, "/success-stories")?.json(story);
        let created: Single<SuccessStory> = self.execute(request).await?;
        Ok(created.into_inner())
    }
}

#[async_trait]
impl AppointmentRepository for MedConnectApi {
    async fn availability(&self, doctor_id: &EntityId) -> Result<DoctorAvailability, ApiError> {
        let path = format!("/appointments/doctor/{}/availability", segment(doctor_id));
        let body: Single<AvailabilityBody> = self.execute(self.authorized(Method::GET, &path)?).await?;
        Ok(availability_from(doctor_id, body.into_inner()))
    }

    async fn update_availability(
        &self,
        doctor_id: &EntityId,
        slots: &[AvailabilitySlot],
    ) -> Result<DoctorAvailability, ApiError> {
        let path = format!("/appointments/doctor/{}/availability", segment(doctor_id));
        let request = self.authorized(Method::PUT, &path)?.json(&SlotsBody { slots });
        let body: Single<AvailabilityBody> = self.execute(request).await?;
        Ok(availability_from(doctor_id, body.into_inner()))
    }

    async fn update_status(&self, appointment_id: &EntityId, status: AppointmentStatus) -> Result<(), ApiError> {
        let path = format!("/appointments/{}/status", segment(appointment_id));
        let request = self.authorized(Method::PUT, &path)?.json(&json!({ "status": status }));
        self.execute_unit(request).await
    }
}

fn availability_from(doctor_id: &EntityId, body: AvailabilityBody) -> DoctorAvailability {
    match body {
        AvailabilityBody::Schedule(mut schedule) => {
            schedule.doctor_id.get_or_insert_with(|| doctor_id.clone());
            schedule
        }
        AvailabilityBody::Slots(slots) => DoctorAvailability {
            doctor_id: Some(doctor_id.clone()),
            slots,
        },
    }
}

#[async_trait]
impl UserRepository for MedConnectApi {
    async fn list_users(&self) -> Result<Vec<ManagedUser>, ApiError> {
        let listing: Listing<ManagedUser> = self.execute(self.authorized(Method::GET, "/users")?).await?;
        Ok(listing.into_vec())
    }

    async fn create_user(&self, user: &NewUser) -> Result<ManagedUser, ApiError> {
        let request = self.authorized(Method::POST, "/users")?.json(user);
        let created: Single<ManagedUser> = self.execute(request).await?;
        Ok(created.into_inner())
    }

    async fn update_user(&self, id: &EntityId, update: &UserUpdate) -> Result<ManagedUser, ApiError> {
        let path = format!("/users/{}", segment(id));
        let request = self.authorized(Method::PUT, &path)?.json(update);
        let updated: Single<ManagedUser> = self.execute(request).await?;
        Ok(updated.into_inner())
    }

    async fn delete_user(&self, id: &EntityId) -> Result<(), ApiError> {
        let path = format!("/users/{}", segment(id));
        self.execute_unit(self.authorized(Method::DELETE, &path)?).await
    }
}

#[async_trait]
impl DashboardRepository for MedConnectApi {
    async fn fetch_dashboard(&self) -> Result<Value, ApiError> {
        let value: Value = self.execute(self.authorized(Method::GET, "/dashboard")?).await?;
        Ok(unwrap_data(value))
    }
}
