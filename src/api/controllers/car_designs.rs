use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use crate::api::auth::ClientId;
use crate::api::controllers::{LikeCount, LimitQuery, ListQuery};
use crate::api::{ApiContext, ApiJson, Envelope, Result};
use crate::entities::{CarDesign, PublicItem};
use crate::services::car_designs::NewCarDesign;
use crate::services::{self, car_designs};

pub fn router() -> Router {
    Router::new()
        .route("/api/car-designs", get(list_car_designs).post(create_car_design))
        .route("/api/car-designs/trending", get(get_trending))
        .route("/api/car-designs/trending/limit", get(get_trending))
        .route("/api/car-designs/:id", get(get_car_design))
        .route("/api/car-designs/:id/like", post(like_car_design).delete(unlike_car_design))
}

async fn list_car_designs(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Query(query): Query<ListQuery>,
) -> Result<Envelope<Vec<PublicItem<CarDesign>>>> {
    let params = query.into_params(client_id);
    let db = ctx.db.read().await;
    Ok(Envelope::page(car_designs::list(&db, &params)))
}

async fn get_trending(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Query(query): Query<LimitQuery>,
) -> Result<Envelope<Vec<PublicItem<CarDesign>>>> {
    let db = ctx.db.read().await;
    let trending: Vec<_> = services::trending::<CarDesign>(&db, query.limit())
        .into_iter()
        .map(|x| PublicItem::new(x, Some(client_id.as_str())))
        .collect();
    Ok(Envelope::list(trending))
}

async fn get_car_design(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Path(id): Path<String>,
) -> Result<Envelope<PublicItem<CarDesign>>> {
    let db = ctx.db.read().await;
    let design = car_designs::get(&db, &id)?;
    Ok(Envelope::data(PublicItem::new(design, Some(client_id.as_str()))))
}

async fn create_car_design(
    ctx: Extension<ApiContext>,
    ApiJson(req): ApiJson<NewCarDesign>,
) -> Result<(StatusCode, Envelope<CarDesign>)> {
    let mut db = ctx.db.write().await;
    let design = car_designs::create(&mut db, req).await?;
    Ok((StatusCode::CREATED, Envelope::data(design).message("Car design submitted successfully and is under review")))
}

async fn like_car_design(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Path(id): Path<String>,
) -> Result<Envelope<LikeCount>> {
    let mut db = ctx.db.write().await;
    let like_count = car_designs::like(&mut db, &id, &client_id).await?;
    Ok(Envelope::data(LikeCount { like_count }).message("Car design liked successfully"))
}

async fn unlike_car_design(
    ctx: Extension<ApiContext>,
    ClientId(client_id): ClientId,
    Path(id): Path<String>,
) -> Result<Envelope<LikeCount>> {
    let mut db = ctx.db.write().await;
    let like_count = car_designs::unlike(&mut db, &id, &client_id).await?;
    Ok(Envelope::data(LikeCount { like_count }).message("Car design unliked successfully"))
}
