use super::dto::RegisterUserData;

// ============================================================================
// Commands - One Per State-Changing Use Case
// ============================================================================

#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub data: RegisterUserData,
}

#[derive(Debug, Clone)]
pub struct VerifyEmailCommand {
    pub user_id: String,
}
