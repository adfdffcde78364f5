use std::sync::Arc;

use crate::application::handlers::{
    GetUserHandler, GetUsersHandler, RegisterUserHandler, VerifyEmailHandler,
};
use crate::metrics::Metrics;

// ============================================================================
// HTTP API - Collaborator Layer
// ============================================================================

mod responses;
mod routes;

pub use responses::ApiResponse;
pub use routes::configure;

/// Shared handler graph, built once at startup and handed to every worker.
pub struct AppContext {
    pub register_user: Arc<RegisterUserHandler>,
    pub verify_email: Arc<VerifyEmailHandler>,
    pub get_user: Arc<GetUserHandler>,
    pub get_users: Arc<GetUsersHandler>,
    pub metrics: Arc<Metrics>,
}
