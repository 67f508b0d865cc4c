use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use echonote::{
    ai::{gemini::GeminiConfig, GeminiClient, TextGenerator},
    api::{create_router, AppState},
    config::Config,
    crypto::TokenService,
    db,
    error::AppError,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,echonote=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting EchoNote server v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    tracing::info!("✅ Configuration loaded");

    // Database connection failure aborts startup
    let pool = db::connect(
        &config.database_url,
        config.db_max_connections,
        config.db_min_connections,
    )
    .await?;
    tracing::info!("✅ Database connected: {}", config.database_url);

    db::migrate(&pool).await?;
    tracing::info!("✅ Database migrations completed");

    let tokens = Arc::new(TokenService::new(&config.jwt_secret, config.token_expiry_secs));
    tracing::info!("✅ Token service ready ({}s expiry)", config.token_expiry_secs);

    let ai: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
        Some(api_key) => {
            let client: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(GeminiConfig {
                api_key: api_key.clone(),
                model: config.gemini_model.clone(),
                base_url: config.gemini_base_url.clone(),
            })?);
            tracing::info!("✅ AI bridge configured (model {})", config.gemini_model);
            Some(client)
        }
        None => {
            tracing::warn!("⚠️ GEMINI_API_KEY not set, AI endpoints will be unavailable");
            None
        }
    };

    // Create shared application state
    let state = AppState {
        db: pool,
        tokens,
        ai,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("🌐 Server listening on http://{}", addr);
    tracing::info!("🏥 Health check: http://{}/api/health", addr);
    tracing::info!("");
    tracing::info!("📚 API Endpoints:");
    tracing::info!("  POST   /api/signup         - Register new user");
    tracing::info!("  POST   /api/login          - Login, returns bearer token");
    tracing::info!("  GET    /api/dashboard      - Welcome message (requires auth)");
    tracing::info!("  GET    /api/user           - Profile (requires auth)");
    tracing::info!("  PUT    /api/user           - Update profile (requires auth)");
    tracing::info!("  POST   /api/user/avatar    - Upload avatar (requires auth)");
    tracing::info!("  POST   /api/notes          - Create note (requires auth)");
    tracing::info!("  GET    /api/notes          - List notes (requires auth)");
    tracing::info!("  GET    /api/notes/:id      - Get note (requires auth)");
    tracing::info!("  PUT    /api/notes/:id      - Update note (requires auth)");
    tracing::info!("  DELETE /api/notes/:id      - Delete note (requires auth)");
    tracing::info!("  POST   /api/notes/:id/ai   - Summarize / ask (requires auth)");
    tracing::info!("  POST   /api/upload-audio   - Transcribe audio (requires auth)");
    tracing::info!("  POST   /api/ai-process     - Process text with AI (requires auth)");
    tracing::info!("");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
