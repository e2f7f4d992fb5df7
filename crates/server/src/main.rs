//! Resgate server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use resgate_api::{AppState, router as api_router, session_middleware};
use resgate_common::Config;
use resgate_core::{
    AccountService, AddressService, CaseService, CityCatalog, DirectoryService, SessionService,
    WorkflowService,
};
use resgate_db::repositories::{
    OrganizationRepository, ReportRepository, RescueRepository, SessionRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resgate=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting resgate server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = resgate_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    resgate_db::migrate(&db).await?;
    info!("Migrations completed");

    // Load the city catalog once at startup; a failure leaves it empty
    let city_catalog = CityCatalog::load(&config).await;

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let org_repo = OrganizationRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let rescue_repo = RescueRepository::new(Arc::clone(&db));
    let session_repo = SessionRepository::new(Arc::clone(&db));

    // Initialize services
    let account_service = AccountService::new(
        user_repo.clone(),
        org_repo.clone(),
        session_repo.clone(),
    );
    let session_service = SessionService::new(account_service.clone(), session_repo);
    let case_service = CaseService::new(
        report_repo.clone(),
        rescue_repo.clone(),
        user_repo,
        org_repo.clone(),
    );
    let workflow_service = WorkflowService::new(report_repo, rescue_repo, org_repo.clone());
    let directory_service = DirectoryService::new(org_repo);
    let address_service = AddressService::new(&config)?;

    // Create app state
    let state = AppState {
        account_service,
        session_service,
        case_service,
        workflow_service,
        directory_service,
        address_service,
        city_catalog,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
