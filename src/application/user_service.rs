// User service - account administration, restricted to admins
use crate::application::errors::{require_text, ServiceError};
use crate::application::repositories::UserRepository;
use crate::application::session_context::SessionContext;
use crate::domain::id::EntityId;
use crate::domain::session::Role;
use crate::domain::user::{ManagedUser, NewUser, UserUpdate};
use std::sync::Arc;

#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    session: Arc<SessionContext>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, session: Arc<SessionContext>) -> Self {
        Self {
            repository,
            session,
        }
    }

    pub async fn list(&self) -> Result<Vec<ManagedUser>, ServiceError> {
        self.session.require_role(Role::Admin)?;
        Ok(self.repository.list_users().await?)
    }

    pub async fn create(&self, user: NewUser) -> Result<ManagedUser, ServiceError> {
        self.session.require_role(Role::Admin)?;
        require_text("name", &user.name)?;
        require_text("email", &user.email)?;
        require_text("password", &user.password)?;

        let created = self.repository.create_user(&user).await?;
        tracing::info!(user = %created.id, role = ?created.role, "user created");
        Ok(created)
    }

    pub async fn update(&self, id: &EntityId, update: UserUpdate) -> Result<ManagedUser, ServiceError> {
        self.session.require_role(Role::Admin)?;
        if let Some(name) = &update.name {
            require_text("name", name)?;
        }
        if let Some(email) = &update.email {
            require_text("email", email)?;
        }

        Ok(self.repository.update_user(id, &update).await?)
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), ServiceError> {
        let session = self.session.require_role(Role::Admin)?;
        if session.user.id == *id {
            return Err(ServiceError::Invalid(
                "administrators cannot delete their own account".to_string(),
            ));
        }

        self.repository.delete_user(id).await?;
        tracing::info!(user = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::ApiError;
    use crate::application::session_context::tests::session_for;
    use crate::domain::session::SessionError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeUsers {
        deleted: AtomicUsize,
    }

    fn alice() -> ManagedUser {
        ManagedUser {
            id: EntityId::new("u2"),
            name: "Jean Habimana".to_string(),
            email: "jean@example.rw".to_string(),
            role: Role::Doctor,
            phone: None,
            active: Some(true),
        }
    }

    #[async_trait]
    impl UserRepository for FakeUsers {
        async fn list_users(&self) -> Result<Vec<ManagedUser>, ApiError> {
            Ok(vec![alice()])
        }

        async fn create_user(&self, _user: &NewUser) -> Result<ManagedUser, ApiError> {
            Ok(alice())
        }

        async fn update_user(&self, _id: &EntityId, _update: &UserUpdate) -> Result<ManagedUser, ApiError> {
            Ok(alice())
        }

        async fn delete_user(&self, _id: &EntityId) -> Result<(), ApiError> {
            self.deleted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn service(role: Role) -> (UserService, Arc<FakeUsers>) {
        let session = Arc::new(SessionContext::new());
        session.establish(session_for(role));
        let repository = Arc::new(FakeUsers::default());
        (UserService::new(repository.clone(), session), repository)
    }

    #[tokio::test]
    async fn test_only_admins_manage_users() {
        let (users, _) = service(Role::Doctor);
        let err = users.list().await.unwrap_err();
        assert!(matches!(err, ServiceError::Session(SessionError::Forbidden(Role::Admin))));

        let (users, _) = service(Role::Admin);
        assert_eq!(users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let (users, repository) = service(Role::Admin);
        assert!(users.delete(&EntityId::new("u1")).await.is_err());
        users.delete(&EntityId::new("u2")).await.unwrap();
        assert_eq!(repository.deleted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_rename_is_rejected() {
        let (users, _) = service(Role::Admin);
        let update = UserUpdate {
            name: Some(" ".to_string()),
            ..UserUpdate::default()
        };
        assert!(matches!(
            users.update(&EntityId::new("u2"), update).await,
            Err(ServiceError::Invalid(_))
        ));
    }
}
