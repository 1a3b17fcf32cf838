use std::cmp::Reverse;
use std::sync::OnceLock;
use chrono::{DateTime, NaiveDate, Utc};
use itertools::Itertools;
use regex::Regex;
use serde::Deserialize;
use tracing::info;
use crate::db::SiteDb;
use crate::entities::*;
use crate::error::{SiteError, SiteResult};
use crate::services::{check_len, check_submitted_by, into_page, published_matching, required, sort_submissions, ListParams, Page, SortOrder};

pub const TITLE_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 1000;
pub const HOLDER_MAX_LEN: usize = 100;

fn proof_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://.+").expect("proof url regex is valid"))
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub record_holder_name: Option<String>,
    pub proof_url: Option<String>,
    pub date_achieved: Option<String>,
    pub submitted_by: Option<String>,
}

pub fn list(db: &SiteDb, category: Option<&str>, params: &ListParams) -> Page<PublicItem<Record>> {
    let mut records = published_matching::<Record>(db, params, |x| {
        category.map(|c| x.category.as_str().eq_ignore_ascii_case(c.trim())).unwrap_or(true)
    });
    match params.sort {
        SortOrder::RecentAchieved => records.sort_by_key(|x| Reverse(x.date_achieved)),
        sort => sort_submissions(&mut records, sort),
    }
    into_page(records, params)
}

pub fn categories(db: &SiteDb) -> Vec<RecordCategory> {
    db.records().find(|x| x.meta.is_published())
        .into_iter()
        .map(|x| x.category)
        .sorted_by_key(|x| x.as_str())
        .dedup()
        .collect()
}

pub fn get(db: &SiteDb, id: &str) -> SiteResult<Record> {
    super::get_published(db, id)
}

/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date_achieved(value: &str) -> SiteResult<DateTime<Utc>> {
    let value = value.trim();
    let parsed = DateTime::parse_from_rfc3339(value)
        .map(|x| x.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
                .and_then(|x| x.and_hms_opt(0, 0, 0))
                .map(|x| x.and_utc())
        })
        .ok_or_else(|| SiteError::validation("Date achieved must be a valid date"))?;
    if parsed > Utc::now() {
        return Err(SiteError::validation("Date achieved cannot be in the future"));
    }
    Ok(parsed)
}

pub async fn create(db: &mut SiteDb, req: NewRecord) -> SiteResult<Record> {
    let (Some(title), Some(description), Some(category), Some(record_holder_name), Some(proof_url), Some(date_achieved)) = (
        required(req.title.as_deref()),
        required(req.description.as_deref()),
        required(req.category.as_deref()),
        required(req.record_holder_name.as_deref()),
        required(req.proof_url.as_deref()),
        required(req.date_achieved.as_deref()),
    ) else {
        return Err(SiteError::MissingFields);
    };
    let category: RecordCategory = category.parse()?;
    check_len("Title", &title, TITLE_MAX_LEN)?;
    check_len("Description", &description, DESCRIPTION_MAX_LEN)?;
    check_len("Record holder name", &record_holder_name, HOLDER_MAX_LEN)?;
    if !proof_url_regex().is_match(&proof_url) {
        return Err(SiteError::validation("Proof URL must be a valid HTTP/HTTPS URL"));
    }
    let date_achieved = parse_date_achieved(&date_achieved)?;
    let submitted_by = check_submitted_by(req.submitted_by.as_deref())?;

    let record = Record {
        meta: SubmissionMeta::new(submitted_by),
        title,
        description,
        category,
        record_holder_name,
        proof_url,
        date_achieved,
    };
    let record = db.create(record).await?;
    info!("Record '{}' submitted for review", record.title);
    Ok(record)
}

pub async fn like(db: &mut SiteDb, id: &str, client_id: &str) -> SiteResult<u64> {
    db.like::<Record>(id, client_id).await
}

pub async fn unlike(db: &mut SiteDb, id: &str, client_id: &str) -> SiteResult<u64> {
    db.unlike::<Record>(id, client_id).await
}
