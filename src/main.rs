use std::sync::Arc;

use anyhow::Context;

use movie_dna::api::{ApiState, api_routes};
use movie_dna::config::AppConfig;
use movie_dna::quiz::QuestionBank;
use movie_dna::recommend::{MovieCatalog, TmdbClient};
use movie_dna::service::QuizService;
use movie_dna::store::{LibSqlBackend, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    eprintln!("🎬 MovieDNA v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/", config.port);

    // ── Quiz ─────────────────────────────────────────────────────────────
    let bank = Arc::new(QuestionBank::standard().context("built-in question bank is invalid")?);
    eprintln!("   Questions: {}", bank.len());

    // ── Database ─────────────────────────────────────────────────────────
    let store: Arc<dyn SessionStore> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("failed to open database at {}", config.db_path.display()))?,
    );
    eprintln!("   Database: {}", config.db_path.display());

    // ── TMDB ─────────────────────────────────────────────────────────────
    let tmdb = TmdbClient::new(config.tmdb.clone()).context("failed to build TMDB client")?;
    if tmdb.has_credential() {
        eprintln!("   TMDB: {}", config.tmdb.base_url);
    } else {
        eprintln!("   TMDB: TMDB_API_KEY not set, /api/recommend will fail");
        tracing::warn!("TMDB_API_KEY is not configured");
    }
    let catalog: Arc<dyn MovieCatalog> = Arc::new(tmdb);

    // ── Server ───────────────────────────────────────────────────────────
    let service = Arc::new(QuizService::new(store, bank, catalog));
    let app = api_routes(ApiState { service }, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "MovieDNA server started");
    axum::serve(listener, app).await?;

    Ok(())
}
