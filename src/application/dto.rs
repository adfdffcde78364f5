use serde::Serialize;

use crate::domain::user::User;

// ============================================================================
// Application DTOs
// ============================================================================

/// Raw registration input, before value-object validation.
#[derive(Debug, Clone)]
pub struct RegisterUserData {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Response projection of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().as_str().to_string(),
            email: user.email().as_str().to_string(),
            email_verified_at: user.email_verified_at().map(|at| at.to_rfc3339()),
            created_at: user.created_at().to_rfc3339(),
            updated_at: user.updated_at().to_rfc3339(),
        }
    }
}
