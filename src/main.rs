use library_loans::{
    adapters::{mock, postgres},
    api::{handlers::AppState, router::create_router},
    application::loan::{ServiceDependencies, run_overdue_sweeper},
    config::{AppConfig, DatabaseConfig},
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_loans=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Initialize adapters
    let service_deps = match &config.database {
        Some(database) => connect_postgres(database).await?,
        None => {
            tracing::warn!("DATABASE_URL is not set, using in-memory storage");
            in_memory_dependencies()
        }
    };

    // Background overdue sweep, independent of request handling
    let shutdown = CancellationToken::new();
    let sweeper = config.sweep_interval.map(|period| {
        tokio::spawn(run_overdue_sweeper(
            service_deps.clone(),
            period,
            shutdown.clone(),
        ))
    });

    // Create application state
    let app_state = Arc::new(AppState {
        service_deps,
        default_loan_days: config.default_loan_days,
    });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    if let Some(handle) = sweeper {
        shutdown.cancel();
        handle.await?;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_postgres(
    database: &DatabaseConfig,
) -> Result<ServiceDependencies, Box<dyn std::error::Error + Send + Sync>> {
    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(database.max_connections)
        .connect(&database.url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database migrations completed");

    let notifications = Arc::new(postgres::PostgresNotificationSink::new(pool.clone()));

    Ok(ServiceDependencies {
        book_store: Arc::new(postgres::PostgresBookStore::new(pool.clone())),
        loan_repository: Arc::new(postgres::PostgresLoanRepository::new(pool.clone())),
        member_lookup: Arc::new(postgres::PostgresMemberLookup::new(pool.clone())),
        notification_sink: notifications.clone(),
        notification_inbox: notifications,
    })
}

fn in_memory_dependencies() -> ServiceDependencies {
    let notifications = Arc::new(mock::NotificationSink::new());

    ServiceDependencies {
        book_store: Arc::new(mock::BookStore::new()),
        loan_repository: Arc::new(mock::LoanRepository::new()),
        member_lookup: Arc::new(mock::MemberLookup::new()),
        notification_sink: notifications.clone(),
        notification_inbox: notifications,
    }
}

/// Resolves on Ctrl-C and stops the background tasks
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
