// Auth service - login, logout and password recovery
use crate::application::errors::{require_text, ServiceError};
use crate::application::repositories::AuthRepository;
use crate::application::session_context::SessionContext;
use crate::domain::session::{Credentials, UserProfile};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthService {
    repository: Arc<dyn AuthRepository>,
    session: Arc<SessionContext>,
}

impl AuthService {
    pub fn new(repository: Arc<dyn AuthRepository>, session: Arc<SessionContext>) -> Self {
        Self {
            repository,
            session,
        }
    }

    pub async fn login(&self, credentials: Credentials) -> Result<UserProfile, ServiceError> {
        require_text("email", &credentials.email)?;
        require_text("password", &credentials.password)?;

        let session = self.repository.login(&credentials).await?;
        let profile = session.user.clone();
        tracing::info!(user = %profile.id, role = ?session.role, "session established");
        self.session.establish(session);

        Ok(profile)
    }

    pub fn logout(&self) {
        if let Some(session) = self.session.current() {
            tracing::info!(user = %session.user.id, "session invalidated");
        }
        self.session.invalidate();
    }

    pub fn profile(&self) -> Result<UserProfile, ServiceError> {
        Ok(self.session.require()?.user)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String, ServiceError> {
        require_text("email", email)?;
        Ok(self.repository.forgot_password(email.trim()).await?)
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<String, ServiceError> {
        require_text("token", token)?;
        require_text("password", password)?;
        Ok(self.repository.reset_password(token, password).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::ApiError;
    use crate::application::session_context::tests::session_for;
    use crate::domain::session::{Role, Session};
    use async_trait::async_trait;

    struct FakeAuth;

    #[async_trait]
    impl AuthRepository for FakeAuth {
        async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
            if credentials.password == "secret" {
                Ok(session_for(Role::Admin))
            } else {
                Err(ApiError::Application {
                    status: 401,
                    message: "Invalid credentials".to_string(),
                })
            }
        }

        async fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
            Ok(format!("Reset link sent to {}", email))
        }

        async fn reset_password(&self, _token: &str, _password: &str) -> Result<String, ApiError> {
            Ok("Password updated".to_string())
        }
    }

    fn service() -> (AuthService, Arc<SessionContext>) {
        let session = Arc::new(SessionContext::new());
        (AuthService::new(Arc::new(FakeAuth), session.clone()), session)
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "alice@example.rw".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let (auth, session) = service();

        let profile = auth.login(credentials("secret")).await.unwrap();
        assert_eq!(profile.email, "alice@example.rw");
        assert!(session.current().is_some());

        auth.logout();
        assert!(session.current().is_none());
        assert!(auth.profile().is_err());
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_session_empty() {
        let (auth, session) = service();

        let err = auth.login(credentials("wrong")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn test_blank_email_is_rejected_locally() {
        let (auth, _) = service();
        let err = auth.forgot_password("  ").await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));

        let message = auth.forgot_password(" bob@example.rw ").await.unwrap();
        assert_eq!(message, "Reset link sent to bob@example.rw");
    }
}
