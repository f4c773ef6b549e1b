use anyhow::Context;
use library_rental::{
    adapters::{
        mock::{
            notification_service::NotificationService as LogNotificationService,
            payment_gateway::PaymentGateway as MockPaymentGateway,
        },
        postgres::{
            PostgresBookRepository, PostgresBorrowingRepository, PostgresPaymentRepository,
            PostgresUserRepository,
        },
        stripe::StripeClient,
        telegram::TelegramNotifier,
    },
    api::{AppState, create_router},
    application::{
        ServiceDependencies, account, borrowing::detect_overdue_borrowings,
        notification::Notifier,
    },
    auth::TokenIssuer,
    config::{config_loader, config_model::AppConfig},
    ports::{NotificationService, PaymentGateway},
};
use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn payment_gateway(config: &AppConfig) -> Arc<dyn PaymentGateway> {
    match &config.stripe.api_key {
        Some(api_key) => Arc::new(StripeClient::new(
            api_key.clone(),
            config.stripe.success_url.clone(),
            config.stripe.cancel_url.clone(),
        )),
        None => {
            tracing::warn!("STRIPE_API_KEY is not set; using the in-process mock payment gateway");
            Arc::new(MockPaymentGateway::new())
        }
    }
}

fn notification_providers(config: &AppConfig) -> anyhow::Result<Vec<Arc<dyn NotificationService>>> {
    let provider: Arc<dyn NotificationService> = match &config.telegram {
        Some(telegram) => Arc::new(
            TelegramNotifier::new(&telegram.bot_token, telegram.chat_id.clone())
                .map_err(|e| anyhow::anyhow!(e))
                .context("Failed to build Telegram client")?,
        ),
        None => {
            tracing::info!("Telegram is not configured; notifications are only logged");
            Arc::new(LogNotificationService::new())
        }
    };
    Ok(vec![provider])
}

/// 延滞チェックを一定間隔で実行する
fn spawn_overdue_sweep(deps: ServiceDependencies, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = detect_overdue_borrowings(&deps, chrono::Utc::now()).await {
                tracing::error!(error = %e, "Overdue sweep failed");
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_rental=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config_loader::load()?;

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    // Initialize adapters
    let service_deps = ServiceDependencies {
        books: Arc::new(PostgresBookRepository::new(pool.clone())),
        borrowings: Arc::new(PostgresBorrowingRepository::new(pool.clone())),
        payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        payment_gateway: payment_gateway(&config),
        notifier: Notifier::new(notification_providers(&config)?),
    };

    if let Some(admin) = &config.admin {
        account::ensure_staff_account(&service_deps, &admin.email, &admin.password)
            .await
            .context("Failed to create the staff account")?;
    }

    spawn_overdue_sweep(
        service_deps.clone(),
        Duration::from_secs(config.overdue_sweep_interval_secs.max(1)),
    );

    let tokens = TokenIssuer::new(
        &config.auth.jwt_secret,
        chrono::Duration::minutes(config.auth.access_token_ttl_minutes),
        chrono::Duration::minutes(config.auth.refresh_token_ttl_minutes),
    );

    // Create application state
    let app_state = Arc::new(AppState {
        service_deps,
        tokens,
    });

    let app = create_router(app_state);

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
