use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::pages::PageRenderer;
use crate::planner::TripPlanner;
use crate::session::PlannerSession;
use crate::{api, pages};

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TripPlanner>,
    pub session: Arc<RwLock<PlannerSession>>,
    pub pages: Arc<PageRenderer>,
}

impl AppState {
    pub fn new(planner: TripPlanner) -> crate::Result<Self> {
        Ok(Self {
            planner: Arc::new(planner),
            session: Arc::new(RwLock::new(PlannerSession::default())),
            pages: Arc::new(PageRenderer::new()?),
        })
    }
}

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(pages::router())
        .nest("/api", api::router())
        .route("/health", get(|| async { "ok" }))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_seconds.into(),
        )))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(state: AppState, config: &ServerConfig) -> Result<()> {
    let app = router(state, config);
    let addr = format!("{}:{}", config.host, config.port);

    if let (Some(cert), Some(key)) = (&config.tls_cert, &config.tls_key) {
        return run_tls(app, &addr, cert, key).await;
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app).await.context("Web server failed")?;
    Ok(())
}

#[cfg(feature = "tls")]
async fn run_tls(app: Router, addr: &str, cert: &str, key: &str) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| format!("Failed to load TLS certificate {cert} / key {key}"))?;
    let addr: std::net::SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid listen address {addr}"))?;

    tracing::info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")?;
    Ok(())
}

#[cfg(not(feature = "tls"))]
async fn run_tls(_app: Router, _addr: &str, _cert: &str, _key: &str) -> Result<()> {
    Err(crate::PlannerError::config("TLS is configured but the `tls` feature is disabled").into())
}
