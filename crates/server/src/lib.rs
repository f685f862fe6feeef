//! helmios server: invite-gated signup, password login and a
//! session-protected dashboard over Axum + SQLite.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod storage;
pub mod views;

use axum::{
    Router,
    extract::FromRef,
    http::{HeaderValue, header},
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use auth::AuthService;
use config::AppConfig;
use session::SessionManager;
use storage::Db;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub auth: AuthService,
    pub sessions: SessionManager,
    pub config: AppConfig,
}

impl AppState {
    /// Wire the components from an open database and the loaded config.
    pub fn new(db: Db, config: AppConfig) -> Self {
        Self {
            auth: AuthService::new(db.clone(), config.password_rounds),
            sessions: SessionManager::new(db.clone(), config.session_ttl_secs, config.cookie_secure),
            db,
            config,
        }
    }
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// Build the full router: pages, auth routes, static assets and headers.
pub fn app(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(routes::pages::home))
        .route(
            "/signup",
            get(routes::auth::signup_form).post(routes::auth::signup),
        )
        .route(
            "/login",
            get(routes::auth::login_form).post(routes::auth::login),
        )
        .route("/logout", get(routes::auth::logout))
        .route("/dashboard", get(routes::pages::dashboard))
        .route("/health", get(routes::health::health));

    // Serve static files from the public directory if present
    let public_dir = &state.config.public_dir;
    if public_dir.exists() {
        tracing::info!("serving static files from {}", public_dir.display());
        app = app.fallback_service(ServeDir::new(public_dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .with_state(state)
}

/// Open the database, bind, and serve until the process is stopped.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("data directory: {}", config.data_dir.display());
    let db = storage::init_db(&config.data_dir)?;
    tracing::info!("database initialized ({} users)", db.count_users()?);

    let addr = config.bind_addr();
    let app = app(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("server is running at http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
