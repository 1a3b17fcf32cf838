use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::{middleware, Extension, Router};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::filter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
pub use envelope::Envelope;
pub use error::ApiError;
pub use json::ApiJson;
pub use rate_limit::RateLimiter;
use crate::config::{AppEnv, Config};
use crate::db::SiteDb;
use crate::plugins::PluginCatalogSource;

mod error;
mod envelope;
mod json;
mod controllers;
pub mod auth;
pub mod rate_limit;

pub const MAX_BODY_SIZE_IN_BYTES: usize = 10_485_760; // 10 MB

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Clone)]
pub struct ApiContext {
    pub cfg: Arc<Config>,
    pub db: Arc<RwLock<SiteDb>>,
    pub plugins: Arc<dyn PluginCatalogSource>,
    pub limiter: RateLimiter,
}

impl ApiContext {
    pub fn new(config: Config, db: SiteDb, plugins: Arc<dyn PluginCatalogSource>) -> Self {
        let limiter = RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window);
        Self {
            cfg: Arc::new(config),
            db: Arc::new(RwLock::new(db)),
            plugins,
            limiter,
        }
    }
}

pub fn init_tracing() {
    let tracing_layer = tracing_subscriber::fmt::layer();
    let filter = filter::Targets::new()
        .with_target("tower_http::trace::on_response", Level::DEBUG)
        .with_target("tower_http::trace::make_span", Level::DEBUG)
        .with_default(Level::INFO);
    tracing_subscriber::registry()
        .with(tracing_layer)
        .with(filter)
        .init();
}

/// The whole application: routes, fallback and middleware.
pub fn app(ctx: ApiContext) -> Router {
    let mut router = controllers::router()
        .fallback(route_not_found);
    if ctx.cfg.server.app_env == AppEnv::Development {
        router = router.layer(middleware::from_fn(error::expose_internal_errors));
    }
    router
        .layer(middleware::from_fn(rate_limit::enforce_rate_limit))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE_IN_BYTES))
        .layer(CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(Any))
        .layer(
            ServiceBuilder::new()
                .layer(Extension(ctx))
                .layer(TraceLayer::new_for_http()),
        )
}

pub async fn serve(ctx: ApiContext) -> anyhow::Result<()> {
    let port = ctx.cfg.server.port;
    ctx.limiter.clone().start_cleanup_task();
    let app = app(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind to {}", addr))?;
    info!("listening on {}", &addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("error running HTTP server")
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
