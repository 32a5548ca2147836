// Session domain model - the authenticated identity held by this client
use super::id::EntityId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Patient,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: EntityId,
    #[serde(alias = "fullName", alias = "full_name")]
    pub name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Patient
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub user: UserProfile,
}

impl Session {
    pub fn new(token: String, user: UserProfile) -> Self {
        Self {
            token,
            role: user.role.clone(),
            user,
        }
    }

    pub fn is(&self, role: &Role) -> bool {
        &self.role == role
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("not logged in")]
    NotAuthenticated,
    #[error("this action requires the {0:?} role")]
    Forbidden(Role),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_accepts_backend_variants() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"_id": 7, "fullName": "Dr. Uwase", "email": "uwase@example.rw", "role": "doctor"}"#,
        )
        .unwrap();

        assert_eq!(profile.id.as_str(), "7");
        assert_eq!(profile.role, Role::Doctor);

        let unknown: UserProfile = serde_json::from_str(
            r#"{"id": "a1", "name": "Nurse", "email": "n@example.rw", "role": "nurse"}"#,
        )
        .unwrap();
        assert_eq!(unknown.role, Role::Other);
    }
}
