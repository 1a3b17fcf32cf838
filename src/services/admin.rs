use serde::{Deserialize, Serialize};
use tracing::info;
use crate::db::{AnySubmission, SiteDb, Stored};
use crate::entities::*;
use crate::error::{SiteError, SiteResult};
use crate::services::{sort_submissions, SortOrder};

pub const RECENT_LIMIT: usize = 5;

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub review: usize,
    pub published: usize,
    pub rejected: usize,
}

impl StatusCounts {
    fn of<T: Submission>(items: &[T]) -> Self {
        let count = |status: Status| items.iter().filter(|x| x.meta().status == status).count();
        Self {
            total: items.len(),
            review: count(Status::Review),
            published: count(Status::Published),
            rejected: count(Status::Rejected),
        }
    }
}

/// One value per moderated collection.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PerType<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_designs: Option<T>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Submissions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<Vec<Term>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Record>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_designs: Option<Vec<CarDesign>>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub terms: StatusCounts,
    pub records: StatusCounts,
    pub car_designs: StatusCounts,
    pub recent: Submissions,
}

#[derive(Serialize, Clone, Debug)]
pub struct AllSubmissions {
    pub data: Submissions,
    pub counts: PerType<StatusCounts>,
}

#[derive(Serialize, Clone, Debug)]
pub struct SubmissionsByStatus {
    pub data: Submissions,
    pub counts: PerType<usize>,
    pub status: Status,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct StatusUpdate {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
}

fn newest_first<T: Stored>(db: &SiteDb, predicate: impl Fn(&T) -> bool) -> Vec<T> {
    let mut items = db.collection::<T>().find(predicate);
    sort_submissions(&mut items, SortOrder::Newest);
    items
}

fn recent<T: Stored>(db: &SiteDb) -> Vec<T> {
    let mut items = newest_first::<T>(db, |_| true);
    items.truncate(RECENT_LIMIT);
    items
}

pub fn dashboard(db: &SiteDb) -> Dashboard {
    Dashboard {
        terms: StatusCounts::of(&db.terms().all()),
        records: StatusCounts::of(&db.records().all()),
        car_designs: StatusCounts::of(&db.car_designs().all()),
        recent: Submissions {
            terms: Some(recent(db)),
            records: Some(recent(db)),
            car_designs: Some(recent(db)),
        },
    }
}

/// Every submission in every state, newest first.
pub fn submissions(db: &SiteDb) -> AllSubmissions {
    let terms = newest_first::<Term>(db, |_| true);
    let records = newest_first::<Record>(db, |_| true);
    let car_designs = newest_first::<CarDesign>(db, |_| true);
    AllSubmissions {
        counts: PerType {
            terms: Some(StatusCounts::of(&terms)),
            records: Some(StatusCounts::of(&records)),
            car_designs: Some(StatusCounts::of(&car_designs)),
        },
        data: Submissions {
            terms: Some(terms),
            records: Some(records),
            car_designs: Some(car_designs),
        },
    }
}

/// Submissions in `status`, limited to one collection when `kind` is given.
pub fn submissions_by_status(db: &SiteDb, status: &str, kind: Option<&str>) -> SiteResult<SubmissionsByStatus> {
    let status: Status = status.parse()?;
    let kind = kind.map(str::trim).filter(|x| !x.is_empty())
        .map(str::parse::<SubmissionType>)
        .transpose()?;
    let wanted = |x: SubmissionType| kind.map(|k| k == x).unwrap_or(true);

    let mut data = Submissions::default();
    let mut counts = PerType::default();
    if wanted(SubmissionType::Terms) {
        let items = newest_first::<Term>(db, |x| x.meta.status == status);
        counts.terms = Some(items.len());
        data.terms = Some(items);
    }
    if wanted(SubmissionType::Records) {
        let items = newest_first::<Record>(db, |x| x.meta.status == status);
        counts.records = Some(items.len());
        data.records = Some(items);
    }
    if wanted(SubmissionType::CarDesigns) {
        let items = newest_first::<CarDesign>(db, |x| x.meta.status == status);
        counts.car_designs = Some(items.len());
        data.car_designs = Some(items);
    }
    Ok(SubmissionsByStatus { data, counts, status })
}

pub async fn update_status(db: &mut SiteDb, req: StatusUpdate) -> SiteResult<(AnySubmission, Status)> {
    let (Some(id), Some(kind), Some(status)) = (req.id, req.kind, req.status) else {
        return Err(SiteError::validation("Missing required fields: id, type, status"));
    };
    let kind: SubmissionType = kind.parse()?;
    let status: Status = status.parse()?;
    let updated = db.set_status(kind, &id, status).await?;
    info!("Submission {} ({}) moved to {}", id, kind.as_str(), status);
    Ok((updated, status))
}

pub async fn delete(db: &mut SiteDb, kind: &str, id: &str) -> SiteResult<AnySubmission> {
    let kind: SubmissionType = kind.parse()?;
    let deleted = db.delete(kind, id).await?;
    info!("Submission {} ({}) deleted", id, kind.as_str());
    Ok(deleted)
}
