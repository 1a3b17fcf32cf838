use axum::extract::{Extension, Query};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use crate::api::controllers::LimitQuery;
use crate::api::{ApiContext, Envelope, Result};
use crate::entities::Plugin;
use crate::plugins;

pub fn router() -> Router {
    Router::new()
        .route("/api/plugins", get(get_all_plugins))
        .route("/api/plugins/trending", get(get_trending_plugins))
        .route("/api/plugins/search", get(search_plugins))
}

#[derive(Deserialize, Debug, Default)]
struct SearchQuery {
    q: Option<String>,
}

async fn get_all_plugins(
    ctx: Extension<ApiContext>,
) -> Result<Envelope<Vec<Plugin>>> {
    let catalog = plugins::get_all(ctx.plugins.as_ref()).await?;
    Ok(Envelope::list(catalog.plugins).with("lastFetched", catalog.last_fetched))
}

async fn get_trending_plugins(
    ctx: Extension<ApiContext>,
    Query(query): Query<LimitQuery>,
) -> Result<Envelope<Vec<Plugin>>> {
    let trending = plugins::trending(ctx.plugins.as_ref(), query.limit()).await?;
    Ok(Envelope::list(trending))
}

async fn search_plugins(
    ctx: Extension<ApiContext>,
    Query(query): Query<SearchQuery>,
) -> Result<Envelope<Vec<Plugin>>> {
    let found = plugins::search(ctx.plugins.as_ref(), query.q.as_deref()).await?;
    let envelope = Envelope::list(found);
    Ok(match query.q.filter(|x| !x.trim().is_empty()) {
        Some(q) => envelope.with("searchTerm", q),
        None => envelope,
    })
}
