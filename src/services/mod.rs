//! Use cases behind the HTTP endpoints. Reads take a `&SiteDb`, writes take
//! `&mut SiteDb` so callers hold the write lock for the whole check-then-update.

use std::cmp::Reverse;
use crate::db::{SiteDb, Stored};
use crate::entities::{PublicItem, Submission};
use crate::error::{SiteError, SiteResult};
use crate::utils::vec_utils::{total_pages, PageExtensions};

pub mod terms;
pub mod records;
pub mod car_designs;
pub mod admin;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_TRENDING: usize = 10;
pub const SUBMITTED_BY_MAX_LEN: usize = 50;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    /// Most likes first, newest first among equals.
    Trending,
    /// Most likes first.
    MostLiked,
    /// Latest `dateAchieved` first. Only records have one; elsewhere it means newest.
    RecentAchieved,
}

impl SortOrder {
    /// Unknown or missing values fall back to [`SortOrder::Newest`].
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("oldest") => SortOrder::Oldest,
            Some("trending") => SortOrder::Trending,
            Some("mostLiked") => SortOrder::MostLiked,
            Some("recentAchieved") => SortOrder::RecentAchieved,
            _ => SortOrder::Newest,
        }
    }
}

/// Query parameters shared by every public listing.
#[derive(Clone, Debug, Default)]
pub struct ListParams {
    pub sort: SortOrder,
    pub limit: Option<usize>,
    pub page: Option<usize>,
    /// Already normalized with [`crate::utils::normalize_query`].
    pub search: Option<String>,
    pub client_id: Option<String>,
}

impl ListParams {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
}

/// One page of a listing plus the totals needed to page through the rest.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: usize,
    pub page: usize,
    pub total_pages: usize,
}

pub fn sort_submissions<T: Submission>(items: &mut [T], sort: SortOrder) {
    match sort {
        SortOrder::Oldest => items.sort_by_key(|x| x.meta().created_at),
        SortOrder::Newest | SortOrder::RecentAchieved => items.sort_by_key(|x| Reverse(x.meta().created_at)),
        SortOrder::Trending => items.sort_by_key(|x| (Reverse(x.meta().like_count), Reverse(x.meta().created_at))),
        SortOrder::MostLiked => {
            items.sort_by_key(|x| x.meta().created_at);
            items.sort_by_key(|x| Reverse(x.meta().like_count));
        }
    }
}

/// Published items of `T` passing `filter` and the search query, unsorted.
pub(crate) fn published_matching<T: Stored>(db: &SiteDb, params: &ListParams, filter: impl Fn(&T) -> bool) -> Vec<T> {
    db.collection::<T>().find(|x| {
        x.meta().is_published()
            && filter(x)
            && params.search.as_deref().map(|q| x.matches_search(q)).unwrap_or(true)
    })
}

/// Pages already sorted items and marks the ones the caller liked.
pub(crate) fn into_page<T: Submission>(items: Vec<T>, params: &ListParams) -> Page<PublicItem<T>> {
    let limit = params.limit();
    let page = params.page();
    let count = items.len();
    let items = items.page(page, limit)
        .into_iter()
        .map(|x| PublicItem::new(x, params.client_id.as_deref()))
        .collect();
    Page { items, count, page, total_pages: total_pages(count, limit) }
}

/// The `limit` most liked published items, newest first among equals.
pub fn trending<T: Stored>(db: &SiteDb, limit: Option<usize>) -> Vec<T> {
    let mut items = db.collection::<T>().find(|x| x.meta().is_published());
    sort_submissions(&mut items, SortOrder::Trending);
    items.truncate(limit.unwrap_or(DEFAULT_TRENDING));
    items
}

pub fn get_published<T: Stored>(db: &SiteDb, id: &str) -> SiteResult<T> {
    db.collection::<T>().get_published(id)
        .ok_or(SiteError::NotFound(T::TYPE.label()))
}

/// Trimmed value of a required field, `None` when absent or blank.
pub(crate) fn required(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|x| !x.is_empty()).map(str::to_string)
}

pub(crate) fn check_len(label: &str, value: &str, max: usize) -> SiteResult<()> {
    if value.chars().count() > max {
        return Err(SiteError::validation(format!("{} cannot exceed {} characters", label, max)));
    }
    Ok(())
}

pub(crate) fn check_submitted_by(value: Option<&str>) -> SiteResult<Option<String>> {
    let value = required(value);
    if let Some(x) = &value {
        check_len("Submitted by name", x, SUBMITTED_BY_MAX_LEN)?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use super::*;
    use crate::db::tests::term;
    use crate::entities::{Status, Term};

    fn aged(title: &str, likes: u64, minutes_ago: i64) -> Term {
        let mut x = term(title, Status::Published);
        x.meta.like_count = likes;
        x.meta.created_at = chrono::Utc::now() - Duration::minutes(minutes_ago);
        x
    }

    fn titles(items: &[Term]) -> Vec<&str> {
        items.iter().map(|x| x.title.as_str()).collect()
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse(None), SortOrder::Newest);
        assert_eq!(SortOrder::parse(Some("mostLiked")), SortOrder::MostLiked);
        assert_eq!(SortOrder::parse(Some("bogus")), SortOrder::Newest);
    }

    #[test]
    fn test_sort_submissions() {
        let mut items = vec![aged("a", 1, 30), aged("b", 5, 20), aged("c", 5, 10), aged("d", 0, 0)];

        sort_submissions(&mut items, SortOrder::Newest);
        assert_eq!(titles(&items), vec!["d", "c", "b", "a"]);
        sort_submissions(&mut items, SortOrder::Oldest);
        assert_eq!(titles(&items), vec!["a", "b", "c", "d"]);
        sort_submissions(&mut items, SortOrder::Trending);
        assert_eq!(titles(&items), vec!["c", "b", "a", "d"]);
        sort_submissions(&mut items, SortOrder::MostLiked);
        assert_eq!(titles(&items), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_into_page() {
        let items: Vec<Term> = (0..7).map(|i| aged(&i.to_string(), 0, i)).collect();
        let params = ListParams { limit: Some(3), page: Some(3), ..Default::default() };
        let page = into_page(items, &params);
        assert_eq!(page.count, 7);
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 1);
        assert!(!page.items[0].is_liked);
    }

    #[test]
    fn test_field_checks() {
        assert_eq!(required(Some("  x ")), Some("x".to_string()));
        assert_eq!(required(Some("   ")), None);
        assert!(check_len("Term", &"a".repeat(100), 100).is_ok());
        let err = check_len("Term", &"a".repeat(101), 100).unwrap_err();
        assert_eq!(err.to_string(), "Term cannot exceed 100 characters");
        assert_eq!(check_submitted_by(Some(" ")).unwrap(), None);
        assert!(check_submitted_by(Some(&"n".repeat(51))).is_err());
    }
}
