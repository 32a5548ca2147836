// Session context - the one place this client keeps its authenticated identity
use crate::domain::session::{Role, Session, SessionError};
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct SessionContext {
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn require(&self) -> Result<Session, SessionError> {
        self.current().ok_or(SessionError::NotAuthenticated)
    }

    pub fn require_role(&self, role: Role) -> Result<Session, SessionError> {
        let session = self.require()?;
        if !session.is(&role) {
            return Err(SessionError::Forbidden(role));
        }
        Ok(session)
    }

    pub fn establish(&self, session: Session) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session);
    }

    /// Drop the token, role and profile together
    pub fn invalidate(&self) {
        self.current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
    }
}
