use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use crate::api::auth::ClientId;
use crate::api::controllers::{parse_number, LikeCount, LimitQuery, ListQuery};
use crate::api::{ApiContext, ApiJson, Envelope, Result};
use crate::entities::{PublicItem, Term, TermCategory};
use crate::mentions::Suggestion;
use crate::services::terms::{NewTerm, RenderedTerm, TermFilter};
use crate::services::{self, terms};

pub fn router() -> Router {
    Router::new()
        .route("/api/terms", get(list_terms).post(create_term))
        .route("/api/terms/categories/list", get(get_categories))
        .route("/api/terms/trending/limit", get(get_trending))
        .route("/api/terms/suggest", get(suggest_terms))
        .route("/api/terms/slug/:slug", get(get_term_by_slug))
        .route("/api/terms/:id", get(get_term))
        .route("/api/terms/:id/rendered", get(get_rendered_term))
        .route("/api/terms/:id/like", post(like_term).delete(unlike_term))
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct TermsQuery {
    category: Option<String>,
    skill_level: Option<String>,
    #[serde(flatten)]
    list: ListQuery,
}

#[derive(Deserialize, Debug, Default)]
struct SuggestQuery {
    q: Option<String>,
    cursor: Option<String>,
    limit: Option<String>,
}

async fn list_terms(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Query(query): Query<TermsQuery>,
) -> Result<Envelope<Vec<PublicItem<Term>>>> {
    let filter = TermFilter {
        category: query.category.filter(|x| !x.trim().is_empty()),
        skill_level: query.skill_level.filter(|x| !x.trim().is_empty()),
    };
    let params = query.list.into_params(client_id);
    let db = ctx.db.read().await;
    Ok(Envelope::page(terms::list(&db, &filter, &params)))
}

async fn get_categories(
    ctx: Extension<ApiContext>,
) -> Result<Envelope<Vec<TermCategory>>> {
    let db = ctx.db.read().await;
    Ok(Envelope::list(terms::categories(&db)))
}

async fn get_trending(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Query(query): Query<LimitQuery>,
) -> Result<Envelope<Vec<PublicItem<Term>>>> {
    let db = ctx.db.read().await;
    let trending: Vec<_> = services::trending::<Term>(&db, query.limit())
        .into_iter()
        .map(|x| PublicItem::new(x, Some(client_id.as_str())))
        .collect();
    Ok(Envelope::list(trending))
}

async fn suggest_terms(
    ctx: Extension<ApiContext>,
    Query(query): Query<SuggestQuery>,
) -> Result<Envelope<Vec<Suggestion>>> {
    let text = query.q.unwrap_or_default();
    let cursor = query.cursor.as_deref().and_then(|x| x.trim().parse::<usize>().ok());
    let limit = parse_number(query.limit.as_deref());
    let db = ctx.db.read().await;
    Ok(Envelope::list(terms::suggest(&db, &text, cursor, limit)))
}

async fn get_term_by_slug(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Path(slug): Path<String>,
) -> Result<Envelope<PublicItem<Term>>> {
    let db = ctx.db.read().await;
    let term = terms::get_by_slug(&db, &slug)?;
    Ok(Envelope::data(PublicItem::new(term, Some(client_id.as_str()))))
}

async fn get_term(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Path(id): Path<String>,
) -> Result<Envelope<PublicItem<Term>>> {
    let db = ctx.db.read().await;
    let term = terms::get(&db, &id)?;
    Ok(Envelope::data(PublicItem::new(term, Some(client_id.as_str()))))
}

async fn get_rendered_term(
    ctx: Extension<ApiContext>,
    Path(id): Path<String>,
) -> Result<Envelope<RenderedTerm>> {
    let db = ctx.db.read().await;
    Ok(Envelope::data(terms::rendered(&db, &id)?))
}

async fn create_term(
    ctx: Extension<ApiContext>,
    ApiJson(req): ApiJson<NewTerm>,
) -> Result<(StatusCode, Envelope<Term>)> {
    let mut db = ctx.db.write().await;
    let term = terms::create(&mut db, req).await?;
    Ok((StatusCode::CREATED, Envelope::data(term).message("Term submitted successfully and is under review")))
}

async fn like_term(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Path(id): Path<String>,
) -> Result<Envelope<LikeCount>> {
    let mut db = ctx.db.write().await;
    let like_count = terms::like(&mut db, &id, &client_id).await?;
    Ok(Envelope::data(LikeCount { like_count }).message("Term liked successfully"))
}

async fn unlike_term(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Path(id): Path<String>,
) -> Result<Envelope<LikeCount>> {
    let mut db = ctx.db.write().await;
    let like_count = terms::unlike(&mut db, &id, &client_id).await?;
    Ok(Envelope::data(LikeCount { like_count }).message("Term unliked successfully"))
}
