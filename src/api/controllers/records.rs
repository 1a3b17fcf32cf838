use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use crate::api::auth::ClientId;
use crate::api::controllers::{LikeCount, LimitQuery, ListQuery};
use crate::api::{ApiContext, ApiJson, Envelope, Result};
use crate::entities::{PublicItem, Record, RecordCategory};
use crate::services::records::NewRecord;
use crate::services::{self, records};

pub fn router() -> Router {
    Router::new()
        .route("/api/records", get(list_records).post(create_record))
        .route("/api/records/categories/list", get(get_categories))
        .route("/api/records/trending/limit", get(get_trending))
        .route("/api/records/:id", get(get_record))
        .route("/api/records/:id/like", post(like_record).delete(unlike_record))
}

#[derive(Deserialize, Debug, Default)]
struct RecordsQuery {
    category: Option<String>,
    #[serde(flatten)]
    list: ListQuery,
}

async fn list_records(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Query(query): Query<RecordsQuery>,
) -> Result<Envelope<Vec<PublicItem<Record>>>> {
    let category = query.category.filter(|x| !x.trim().is_empty());
    let params = query.list.into_params(client_id);
    let db = ctx.db.read().await;
    Ok(Envelope::page(records::list(&db, category.as_deref(), &params)))
}

async fn get_categories(
    ctx: Extension<ApiContext>,
) -> Result<Envelope<Vec<RecordCategory>>> {
    let db = ctx.db.read().await;
    Ok(Envelope::list(records::categories(&db)))
}

async fn get_trending(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Query(query): Query<LimitQuery>,
) -> Result<Envelope<Vec<PublicItem<Record>>>> {
    let db = ctx.db.read().await;
    let trending: Vec<_> = services::trending::<Record>(&db, query.limit())
        .into_iter()
        .map(|x| PublicItem::new(x, Some(client_id.as_str())))
        .collect();
    Ok(Envelope::list(trending))
}

async fn get_record(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Path(id): Path<String>,
) -> Result<Envelope<PublicItem<Record>>> {
    let db = ctx.db.read().await;
    let record = records::get(&db, &id)?;
    Ok(Envelope::data(PublicItem::new(record, Some(client_id.as_str()))))
}

async fn create_record(
    ctx: Extension<ApiContext>,
    ApiJson(req): ApiJson<NewRecord>,
) -> Result<(StatusCode, Envelope<Record>)> {
    let mut db = ctx.db.write().await;
    let record = records::create(&mut db, req).await?;
    Ok((StatusCode::CREATED, Envelope::data(record).message("Record submitted successfully and is under review")))
}

async fn like_record(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Path(id): Path<String>,
) -> Result<Envelope<LikeCount>> {
    let mut db = ctx.db.write().await;
    let like_count = records::like(&mut db, &id, &client_id).await?;
    Ok(Envelope::data(LikeCount { like_count }).message("Record liked successfully"))
}

async fn unlike_record(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Path(id): Path<String>,
) -> Result<Envelope<LikeCount>> {
    let mut db = ctx.db.write().await;
    let like_count = records::unlike(&mut db, &id, &client_id).await?;
    Ok(Envelope::data(LikeCount { like_count }).message("Record unliked successfully"))
}
