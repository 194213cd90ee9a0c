use std::sync::Arc;

use account_service::config::Config;
use account_service::config::SecretSource;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::cookie::CookieConfig;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::Authenticator;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        run_mode = %config.run_mode,
        http_port = config.server.http_port,
        token_lifetime_hours = config.auth.token_lifetime_hours,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let (secret, source) = config.auth.signing_secret();
    if source == SecretSource::Ephemeral {
        tracing::warn!(
            run_mode = %config.run_mode,
            "No AUTH__SECRET configured; using an ephemeral signing secret. \
             Sessions will not survive a restart"
        );
    }

    let token_lifetime = config.auth.token_lifetime();
    let authenticator = Arc::new(Authenticator::new(&secret, token_lifetime));
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let user_service = Arc::new(UserService::new(user_repository, authenticator));

    let cookie_config = CookieConfig {
        secure: config.is_production(),
        max_age: token_lifetime,
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, cookie_config);
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
