pub mod api;
pub mod domain;
pub mod routes;
pub mod shared;
pub mod system;

use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::{header, Method};
    use axum::middleware::{self, Next};
    use axum::response::Response;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("backend.log"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                // Keep application logs, silence per-query SQL noise
                "info,sqlx=warn,sea_orm=warn".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    async fn request_logger(req: Request<Body>, next: Next) -> Response {
        let start = std::time::Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let response = next.run(req).await;

        tracing::info!(
            "{} {} {} in {}ms",
            response.status().as_u16(),
            method,
            path,
            start.elapsed().as_millis()
        );
        response
    }

    let config = shared::config::load_config()?;
    let db_path = shared::config::get_database_path(&config)?;
    let db = shared::data::db::initialize_database(&db_path.to_string_lossy()).await?;

    let jwt_secret = if config.auth.jwt_secret.is_empty() {
        tracing::warn!("No jwt_secret configured; using a generated one, sessions will not survive a restart");
        system::auth::jwt::generate_jwt_secret()
    } else {
        config.auth.jwt_secret.clone()
    };

    let classifier: Arc<dyn shared::llm::IntentClassifier> = match &config.llm.api_base {
        Some(api_base) => Arc::new(shared::llm::OpenAiIntentClassifier::new_with_endpoint(
            api_base.clone(),
            config.llm.api_key.clone(),
            config.llm.model.clone(),
        )),
        None => Arc::new(shared::llm::OpenAiIntentClassifier::new(
            config.llm.api_key.clone(),
            config.llm.model.clone(),
        )),
    };

    let state = shared::state::AppState {
        db: db.clone(),
        config: Arc::new(config.clone()),
        classifier,
        jwt_secret: Arc::new(jwt_secret),
    };

    let sweeper = system::sweeper::BookingSweeper::new(db, &config.sweeper).spawn();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let app = routes::configure_routes(state)
        .layer(middleware::from_fn(request_logger))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Starting server on http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!("Port {} is already in use", config.server.port);
            } else {
                tracing::error!("Failed to bind to {}: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    // Let the sweeper finish its in-flight pass before exiting
    sweeper.stop().await;

    Ok(())
}
