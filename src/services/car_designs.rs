use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::info;
use crate::db::SiteDb;
use crate::entities::*;
use crate::error::{SiteError, SiteResult};
use crate::services::{check_len, check_submitted_by, into_page, published_matching, required, sort_submissions, ListParams, Page};

pub const TITLE_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 1000;
pub const INVALID_IMAGE: &str = "Invalid image format. Please upload a valid image.";

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewCarDesign {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub submitted_by: Option<String>,
}

pub fn list(db: &SiteDb, params: &ListParams) -> Page<PublicItem<CarDesign>> {
    let mut designs = published_matching::<CarDesign>(db, params, |_| true);
    sort_submissions(&mut designs, params.sort);
    into_page(designs, params)
}

pub fn get(db: &SiteDb, id: &str) -> SiteResult<CarDesign> {
    super::get_published(db, id)
}

/// Checks that `image` is a `data:image/...;base64,` URL with a decodable payload.
pub fn validate_image(image: &str) -> SiteResult<()> {
    let invalid = || SiteError::validation(INVALID_IMAGE);
    let rest = image.strip_prefix("data:image/").ok_or_else(invalid)?;
    let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
    if !header.ends_with(";base64") || payload.is_empty() {
        return Err(invalid());
    }
    STANDARD.decode(payload).map_err(|_| invalid())?;
    Ok(())
}

pub async fn create(db: &mut SiteDb, req: NewCarDesign) -> SiteResult<CarDesign> {
    let (Some(title), Some(description), Some(image)) = (
        required(req.title.as_deref()),
        required(req.description.as_deref()),
        required(req.image.as_deref()),
    ) else {
        return Err(SiteError::MissingFields);
    };
    validate_image(&image)?;
    check_len("Title", &title, TITLE_MAX_LEN)?;
    check_len("Description", &description, DESCRIPTION_MAX_LEN)?;
    let submitted_by = check_submitted_by(req.submitted_by.as_deref())?;

    let design = CarDesign {
        meta: SubmissionMeta::new(submitted_by),
        title,
        description,
        image,
    };
    let design = db.create(design).await?;
    info!("Car design '{}' submitted for review", design.title);
    Ok(design)
}

pub async fn like(db: &mut SiteDb, id: &str, client_id: &str) -> SiteResult<u64> {
    db.like::<CarDesign>(id, client_id).await
}

pub async fn unlike(db: &mut SiteDb, id: &str, client_id: &str) -> SiteResult<u64> {
    db.unlike::<CarDesign>(id, client_id).await
}
