use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use user_management::api::{self, AppContext};
use user_management::application::event_handlers::{
    UserEmailVerifiedHandler, UserRegisteredHandler,
};
use user_management::application::handlers::{
    GetUserHandler, GetUsersHandler, RegisterUserHandler, VerifyEmailHandler,
};
use user_management::config::Config;
use user_management::domain::user::{UserDomainEvent, UserDomainService, UserRepository};
use user_management::event_sourcing::{EventDispatcher, EventStore};
use user_management::infrastructure::read_model::UserReadModelStore;
use user_management::infrastructure::{
    PostgresEventStore, PostgresUserReadModelStore, PostgresUserRepository,
};
use user_management::metrics::Metrics;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging with environment-based filtering.
    // Default to INFO, overridable with RUST_LOG (e.g. RUST_LOG=debug).
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,user_management=debug")),
        )
        .init();

    let config = Config::from_env();

    tracing::info!("connecting to PostgreSQL");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let metrics = Arc::new(Metrics::new()?);
    let context = web::Data::new(build_context(pool, metrics));

    tracing::info!(
        host = %config.http_host,
        port = config.http_port,
        "starting user-management HTTP server"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(context.clone())
            .configure(api::configure)
    })
    .bind((config.http_host.as_str(), config.http_port))?
    .run()
    .await?;

    Ok(())
}

/// Composition root: builds the whole dependency graph top-down, explicitly.
fn build_context(pool: PgPool, metrics: Arc<Metrics>) -> AppContext {
    let repository: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool.clone()));
    let event_store: Arc<dyn EventStore<UserDomainEvent>> =
        Arc::new(PostgresEventStore::new(pool.clone()));
    let read_models: Arc<dyn UserReadModelStore> = Arc::new(PostgresUserReadModelStore::new(pool));

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
