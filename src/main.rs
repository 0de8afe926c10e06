// src/main.rs
use aura_backend::config::Config;
use aura_backend::gemini_client::GeminiClient;
use aura_backend::services::auth::AuthService;
use aura_backend::services::chat::ChatProvider;
use aura_backend::services::conversation_log::ConversationLog;
use aura_backend::{app, db, AppState};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging()?;

    let config = Config::from_env()?;

    let db_pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database ready");

    let auth = AuthService::new(
        db_pool.clone(),
        config.jwt_secret.clone(),
        config.token_ttl_days,
        config.bcrypt_cost,
    );

    // Chat is disabled without an API key; the endpoint then answers 500
    let chat_provider: Option<Arc<dyn ChatProvider>> = match config.gemini_api_key.clone() {
        Some(api_key) => {
            tracing::info!("Initializing Gemini client ({})...", config.gemini_model);
            Some(Arc::new(GeminiClient::new(
                api_key,
                config.gemini_base_url.clone(),
                config.gemini_model.clone(),
            )))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not found. Chat will be unavailable.");
            None
        }
    };

    let conversation_log = ConversationLog::new(config.conversation_log_path.clone());
    tracing::info!("Conversation log: {}", conversation_log.path().display());

    let shared_state = Arc::new(AppState {
        db_pool,
        auth,
        chat_provider,
        conversation_log,
        analytics_window: config.analytics_window,
    });

    let app = app(shared_state, config.cors_origin.as_deref());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

// Logging configuration: RUST_LOG filter, JSON lines when LOG_FORMAT=json
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,aura_backend=trace,sqlx=info,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,aura_backend=info,sqlx=warn,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()?;

    tracing::info!("Aura backend starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log level: {}", log_level);

    Ok(())
}
