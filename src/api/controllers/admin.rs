use axum::extract::{Extension, Path, Query};
use axum::routing::{delete, get, put};
use axum::{middleware, Router};
use serde::Deserialize;
use crate::api::auth::require_admin_key;
use crate::api::{ApiContext, ApiJson, Envelope, Result};
use crate::db::AnySubmission;
use crate::services::admin::{self, Dashboard, StatusUpdate, Submissions};

pub fn router() -> Router {
    Router::new()
        .route("/api/admin/dashboard", get(get_dashboard))
        .route("/api/admin/submissions", get(get_all_submissions))
        .route("/api/admin/submissions/status", put(update_submission_status))
        // first segment is a status for GET and a submission type for DELETE
        .route("/api/admin/submissions/:group", get(get_submissions_by_status))
        .route("/api/admin/submissions/:group/:id", delete(delete_submission))
        .route_layer(middleware::from_fn(require_admin_key))
}

#[derive(Deserialize, Debug, Default)]
struct TypeQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

async fn get_dashboard(
    ctx: Extension<ApiContext>,
) -> Result<Envelope<Dashboard>> {
    let db = ctx.db.read().await;
    Ok(Envelope::data(admin::dashboard(&db)))
}

async fn get_all_submissions(
    ctx: Extension<ApiContext>,
) -> Result<Envelope<Submissions>> {
    let db = ctx.db.read().await;
    let all = admin::submissions(&db);
    Ok(Envelope::data(all.data).with("counts", all.counts))
}

async fn get_submissions_by_status(
    ctx: Extension<ApiContext>,
    Path(status): Path<String>,
    Query(query): Query<TypeQuery>,
) -> Result<Envelope<Submissions>> {
    let db = ctx.db.read().await;
    let result = admin::submissions_by_status(&db, &status, query.kind.as_deref())?;
    Ok(Envelope::data(result.data)
        .with("counts", result.counts)
        .with("status", result.status))
}

async fn update_submission_status(
    ctx: Extension<ApiContext>,
    ApiJson(req): ApiJson<StatusUpdate>,
) -> Result<Envelope<AnySubmission>> {
    let mut db = ctx.db.write().await;
    let (updated, status) = admin::update_status(&mut db, req).await?;
    Ok(Envelope::data(updated).message(format!("Submission status updated to {}", status)))
}

async fn delete_submission(
    ctx: Extension<ApiContext>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Envelope<()>> {
    let mut db = ctx.db.write().await;
    admin::delete(&mut db, &kind, &id).await?;
    Ok(Envelope::ok().message("Submission deleted successfully"))
}
