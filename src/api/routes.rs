use actix_web::{web, HttpResponse};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::responses::ApiResponse;
use super::AppContext;
use crate::application::{
    GetUserQuery, GetUsersQuery, RegisterUserCommand, RegisterUserData, VerifyEmailCommand,
};
use crate::domain::user::UserError;
use crate::event_sourcing::EventStoreError;

// ============================================================================
// HTTP Routes
// ============================================================================
//
// Thin boundary: request validation, use-case handler invocation, status
// mapping. No business logic here.
//
// ============================================================================

const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 2, max = 255))]
    pub name: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/users")
            .route("", web::post().to(register))
            .route("", web::get().to(index))
            .route("/{id}", web::get().to(show))
            .route("/{id}/verify-email", web::patch().to(verify_email)),
    )
    .route("/health", web::get().to(health))
    .route("/metrics", web::get().to(metrics));
}

async fn register(ctx: web::Data<AppContext>, body: web::Json<RegisterUserRequest>) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::UnprocessableEntity().json(ApiResponse::validation_failed(
            serde_json::to_value(errors).unwrap_or(Value::Null),
        ));
    }

    let command = RegisterUserCommand {
        data: RegisterUserData {
            name: body.name.clone(),
            email: body.email.clone(),
            password: body.password.clone(),
        },
    };

    match ctx.register_user.handle(command).await {
        Ok(user) => {
            ctx.metrics.record_registration();
            HttpResponse::Created().json(ApiResponse::ok_with_message(
                "User registered successfully",
                serde_json::to_value(user).unwrap_or(Value::Null),
            ))
        }
        Err(err @ UserError::EmailAlreadyExists(_)) => {
            HttpResponse::Conflict().json(ApiResponse::error(err.to_string()))
        }
        Err(err @ (UserError::InvalidEmail(_) | UserError::InvalidName(_))) => {
            HttpResponse::UnprocessableEntity().json(ApiResponse::error(err.to_string()))
        }
        Err(err) => unexpected_error(&ctx, "register", err),
    }
}

async fn show(ctx: web::Data<AppContext>, path: web::Path<String>) -> HttpResponse {
    let query = GetUserQuery {
        user_id: path.into_inner(),
    };

    match ctx.get_user.handle(query).await {
        Ok(Some(user)) => {
            HttpResponse::Ok().json(ApiResponse::ok(serde_json::to_value(user).unwrap_or(Value::Null)))
        }
        Ok(None) => HttpResponse::NotFound().json(ApiResponse::error("User not found")),
        Err(UserError::InvalidIdentifier(_)) => {
            HttpResponse::BadRequest().json(ApiResponse::error("Invalid user ID format"))
        }
        Err(err) => unexpected_error(&ctx, "show", err),
    }
}

async fn index(ctx: web::Data<AppContext>, params: web::Query<ListUsersParams>) -> HttpResponse {
    let limit = params.limit.unwrap_or(50).clamp(0, MAX_PAGE_SIZE);
    let offset = params.offset.unwrap_or(0).max(0);

    let query = GetUsersQuery {
        limit,
        offset,
        search_term: params.search.clone(),
    };

    match ctx.get_users.handle(query).await {
        Ok(users) => {
            let meta = json!({
                "limit": limit,
                "offset": offset,
                "count": users.len(),
            });
            HttpResponse::Ok().json(ApiResponse::ok_with_meta(
                serde_json::to_value(users).unwrap_or(Value::Null),
                meta,
            ))
        }
        Err(err) => unexpected_error(&ctx, "index", err),
    }
}

async fn verify_email(ctx: web::Data<AppContext>, path: web::Path<String>) -> HttpResponse {
    let command = VerifyEmailCommand {
        user_id: path.into_inner(),
    };

    match ctx.verify_email.handle(command).await {
        Ok(user) => {
            ctx.metrics.record_verification();
            HttpResponse::Ok().json(ApiResponse::ok_with_message(
                "Email verified successfully",
                serde_json::to_value(user).unwrap_or(Value::Null),
            ))
        }
        Err(UserError::InvalidIdentifier(_)) => {
            HttpResponse::BadRequest().json(ApiResponse::error("Invalid user ID format"))
        }
        Err(err @ (UserError::AlreadyVerified | UserError::UserNotFound(_))) => {
            HttpResponse::Conflict().json(ApiResponse::error(err.to_string()))
        }
        Err(err) => unexpected_error(&ctx, "verify_email", err),
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "user-management",
    }))
}

async fn metrics(ctx: web::Data<AppContext>) -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = ctx.metrics.registry().gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %err, "failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

/// A concurrency conflict is a retryable 409; everything else unexpected is
/// logged with full context and becomes a generic 500.
fn unexpected_error(ctx: &AppContext, operation: &str, err: UserError) -> HttpResponse {
    if is_concurrency_conflict(&err) {
        ctx.metrics.record_conflict();
        return HttpResponse::Conflict().json(ApiResponse::error(
            "Concurrent update detected, please retry",
        ));
    }

    tracing::error!(operation, error = ?err, "request failed");
    HttpResponse::InternalServerError().json(ApiResponse::error("Internal server error"))
}

fn is_concurrency_conflict(err: &UserError) -> bool {
    match err {
        UserError::EventStore(EventStoreError::ConcurrencyConflict { .. }) => true,
        UserError::Dispatch(source) => matches!(
            source.downcast_ref::<EventStoreError>(),
            Some(EventStoreError::ConcurrencyConflict { .. })
        ),
        _ => false,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::event_handlers::{UserEmailVerifiedHandler, UserRegisteredHandler};
    use crate::application::handlers::{
        GetUserHandler, GetUsersHandler, RegisterUserHandler, VerifyEmailHandler,
    };
    use crate::domain::user::{UserDomainEvent, UserDomainService, UserId};
    use crate::event_sourcing::EventDispatcher;
    use crate::metrics::Metrics;
    use crate::testing::{InMemoryEventStore, InMemoryReadModelStore, InMemoryUserRepository};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use std::sync::Arc;

    fn test_context() -> AppContext {
        let repository = Arc::new(InMemoryUserRepository::new());
        let event_store = Arc::new(InMemoryEventStore::new());
        let read_models = Arc::new(InMemoryReadModelStore::new());
        let metrics = Arc::new(Metrics::new().unwrap());

        let mut dispatcher: EventDispatcher<UserDomainEvent> = EventDispatcher::new();
        dispatcher.register(Arc::new(UserRegisteredHandler::new(
            event_store.clone(),
            read_models.clone(),
            metrics.clone(),
        )));
        dispatcher.register(Arc::new(UserEmailVerifiedHandler::new(
            event_store,
            read_models,
            metrics.clone(),
        )));
        let dispatcher = Arc::new(dispatcher);

        let domain_service = Arc::new(UserDomainService::new(repository.clone()));

        AppContext {
            register_user: Arc::new(RegisterUserHandler::new(
                repository.clone(),
                domain_service,
                dispatcher.clone(),
            )),
            verify_email: Arc::new(VerifyEmailHandler::new(repository.clone(), dispatcher)),
            get_user: Arc::new(GetUserHandler::new(repository.clone())),
            get_users: Arc::new(GetUsersHandler::new(repository)),
            metrics,
        }
    }

    macro_rules! test_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(test_context()))
                    .configure(configure),
            )
            .await
        };
    }

    fn register_body(name: &str, email: &str) -> Value {
        json!({"name": name, "email": email, "password": "secret123"})
    }

    #[actix_web::test]
    async fn test_register_returns_201_with_envelope() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/v1/users")
            .set_json(register_body("Jane Doe", "jane@example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "User registered successfully");
        assert_eq!(body["data"]["email"], "jane@example.com");
        assert!(body["data"]["id"].is_string());
    }

    #[actix_web::test]
    async fn test_register_validation_returns_422_with_field_errors() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/v1/users")
            .set_json(json!({"name": "Jane Doe", "email": "jane@example.com", "password": "short"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["errors"].get("password").is_some());
    }

    #[actix_web::test]
    async fn test_register_duplicate_email_returns_409() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/v1/users")
            .set_json(register_body("Jane Doe", "jane@example.com"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/v1/users")
            .set_json(register_body("Jane Impostor", "jane@example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_show_maps_malformed_and_missing_ids() {
        let app = test_app!();

        let req = test::TestRequest::get()
            .uri("/v1/users/not-a-uuid")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri(&format!("/v1/users/{}", UserId::generate()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_verify_email_then_conflict_on_second_call() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/v1/users")
            .set_json(register_body("Jane Doe", "jane@example.com"))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::patch()
            .uri(&format!("/v1/users/{id}/verify-email"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["data"]["email_verified_at"].is_string());

        let req = test::TestRequest::patch()
            .uri(&format!("/v1/users/{id}/verify-email"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_verify_email_unknown_user_returns_409() {
        let app = test_app!();

        let req = test::TestRequest::patch()
            .uri(&format!("/v1/users/{}/verify-email", UserId::generate()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_index_caps_limit_and_reports_meta() {
        let app = test_app!();

        for i in 0..3 {
            let req = test::TestRequest::post()
                .uri("/v1/users")
                .set_json(register_body("Jane Doe", &format!("jane{i}@example.com")))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri("/v1/users?limit=500&offset=-2")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["meta"]["limit"], 100);
        assert_eq!(body["meta"]["offset"], 0);
        assert_eq!(body["meta"]["count"], 3);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
    }

    #[actix_web::test]
    async fn test_metrics_endpoint_exposes_counters() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/v1/users")
            .set_json(register_body("Jane Doe", "jane@example.com"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("users_registered_total"));
    }
}
