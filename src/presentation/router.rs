// Router - the local HTTP surface
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    current_session, delete_notification, export_report, forgot_password, health_check,
    list_notifications, login, logout, mark_notification_read, reset_password,
    stream_notifications, view_report,
};
use crate::presentation::platform_handlers::{
    create_post, create_story, create_topic, create_user, delete_user, get_availability,
    get_dashboard, like_post, list_posts, list_stories, list_topics, list_users,
    put_appointment_status, put_availability, update_user,
};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Compression is handled in the response builders, so no CompressionLayer here
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/session", get(current_session))
        .route("/session/login", post(login))
        .route("/session/logout", post(logout))
        .route("/password/forgot", post(forgot_password))
        .route("/password/reset", post(reset_password))
        .route("/reports/:kind", get(view_report))
        .route("/reports/:kind/export", get(export_report))
        .route("/notifications", get(list_notifications))
        .route("/notifications/stream", get(stream_notifications))
        .route("/notifications/:id/read", put(mark_notification_read))
        .route("/notifications/:id", delete(delete_notification))
        .route("/forum/topics", get(list_topics).post(create_topic))
        .route("/forum/topics/:id/posts", get(list_posts))
        .route("/forum/posts", post(create_post))
        .route("/forum/posts/:id/like", post(like_post))
        .route("/success-stories", get(list_stories).post(create_story))
        .route("/dashboard", get(get_dashboard))
        .route("/appointments/availability", get(get_availability).put(put_availability))
        .route("/appointments/:id/status", put(put_appointment_status))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::{
        ApiSettings, DashboardConfig, NotificationSettings, ReportSettings, ServerSettings, Settings,
    };
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    // None of these requests reach the backend, so nothing listens on this port
    fn router() -> Router {
        let settings = Settings {
            api: ApiSettings {
                base_url: "http://127.0.0.1:9/api".to_string(),
                timeout_secs: 1,
            },
            server: ServerSettings::default(),
            notifications: NotificationSettings::default(),
            report: ReportSettings::default(),
        };
        let state = AppState::wire(&settings, DashboardConfig::default()).unwrap();
        build_router(Arc::new(state))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = router()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_logged_out_session_is_401_banner() {
        let response = router()
            .oneshot(Request::get("/session").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let banner = json_body(response).await;
        assert_eq!(banner["message"], "not logged in");
        assert_eq!(banner["dismissible"], true);
        assert_eq!(banner["expires_in_ms"], 5000);
    }

    #[tokio::test]
    async fn test_user_management_requires_login() {
        let response = router()
            .oneshot(Request::get("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_report_parameters_are_checked_locally() {
        let response = router()
            .oneshot(Request::get("/reports/billing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router()
            .oneshot(
                Request::get("/reports/user-overview/export?startDate=2024-02-01&endDate=2024-01-01")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let banner = json_body(response).await;
        assert_eq!(banner["level"], "warning");
    }

    #[tokio::test]
    async fn test_notifications_honor_brotli() {
        let response = router()
            .oneshot(
                Request::get("/notifications")
                    .header(header::ACCEPT_ENCODING, "gzip, br")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "br");

        let response = router()
            .oneshot(Request::get("/notifications").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let feed = json_body(response).await;
        assert_eq!(feed["unread"], 0);
    }

    #[tokio::test]
    async fn test_blank_login_is_rejected_before_backend() {
        let response = router()
            .oneshot(
                Request::post("/session/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"email":"","password":"secret"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "email must not be empty");
    }
}
