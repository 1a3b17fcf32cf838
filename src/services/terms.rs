use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::info;
use crate::db::SiteDb;
use crate::entities::*;
use crate::error::{SiteError, SiteResult};
use crate::mentions::{self, Segment, Suggestion};
use crate::services::{check_len, check_submitted_by, into_page, published_matching, required, sort_submissions, ListParams, Page};
use crate::utils::str_utils::StringExtensions;

pub const TITLE_MAX_LEN: usize = 100;
pub const DEFINITION_MAX_LEN: usize = 1000;
pub const EXAMPLE_USAGE_MAX_LEN: usize = 500;

/// A term as submitted by a visitor, before validation.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewTerm {
    pub title: Option<String>,
    pub definition: Option<String>,
    pub category: Option<String>,
    pub example_usage: Option<String>,
    pub skill_level: Option<String>,
    pub submitted_by: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct TermFilter {
    pub category: Option<String>,
    pub skill_level: Option<String>,
}

impl TermFilter {
    fn matches(&self, term: &Term) -> bool {
        let category_ok = self.category.as_deref()
            .map(|x| term.category.as_str().eq_ignore_ascii_case(x.trim()))
            .unwrap_or(true);
        let skill_ok = self.skill_level.as_deref()
            .map(|x| term.skill_level.as_str().eq_ignore_ascii_case(x.trim()))
            .unwrap_or(true);
        category_ok && skill_ok
    }
}

/// A term with its placeholders resolved into text and link segments.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTerm {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub title: String,
    pub definition: Vec<Segment>,
    pub example_usage: Vec<Segment>,
    pub definition_text: String,
    pub example_usage_text: String,
}

pub fn list(db: &SiteDb, filter: &TermFilter, params: &ListParams) -> Page<PublicItem<Term>> {
    let mut terms = published_matching::<Term>(db, params, |x| filter.matches(x));
    sort_submissions(&mut terms, params.sort);
    into_page(terms, params)
}

/// Distinct categories in use by published terms, alphabetically.
pub fn categories(db: &SiteDb) -> Vec<TermCategory> {
    db.terms().find(|x| x.meta.is_published())
        .into_iter()
        .map(|x| x.category)
        .sorted_by_key(|x| x.as_str())
        .dedup()
        .collect()
}

pub fn get(db: &SiteDb, id: &str) -> SiteResult<Term> {
    super::get_published(db, id)
}

/// Looks a published term up by the slug its mention links point at, ignoring case.
pub fn get_by_slug(db: &SiteDb, slug: &str) -> SiteResult<Term> {
    let slug = slug.trim().to_lowercase();
    db.terms()
        .find(|x| x.meta.is_published() && x.title.slugify() == slug)
        .into_iter()
        .min_by_key(|x| x.meta.created_at)
        .ok_or(SiteError::NotFound(SubmissionType::Terms.label()))
}

pub fn rendered(db: &SiteDb, id: &str) -> SiteResult<RenderedTerm> {
    let term = get(db, id)?;
    Ok(RenderedTerm {
        definition: mentions::render(&term.definition, &term.tags),
        example_usage: mentions::render(&term.example_usage, &term.tags),
        definition_text: mentions::render_plain(&term.definition, &term.tags),
        example_usage_text: mentions::render_plain(&term.example_usage, &term.tags),
        id: term.meta.id,
        title: term.title,
    })
}

/// Suggestions for the mention being typed. With a `cursor`, `text` is the
/// whole field and the fragment is taken from the open `@` before the cursor;
/// without one, `text` is the fragment itself.
pub fn suggest(db: &SiteDb, text: &str, cursor: Option<usize>, limit: Option<usize>) -> Vec<Suggestion> {
    let fragment = match cursor {
        Some(cursor) => match mentions::active_mention(text, cursor) {
            Some(x) => x,
            None => return vec![],
        },
        None => text.trim(),
    };
    let limit = limit.unwrap_or(mentions::DEFAULT_SUGGESTIONS).clamp(1, mentions::MAX_SUGGESTIONS);
    let titles = db.terms().find(|x| x.meta.is_published())
        .into_iter()
        .map(|x| x.title)
        .sorted()
        .dedup()
        .collect::<Vec<_>>();
    mentions::suggest(fragment, titles.iter().map(String::as_str), limit)
}

/// Validates a submission, rewrites its mentions and stores it for review.
pub async fn create(db: &mut SiteDb, req: NewTerm) -> SiteResult<Term> {
    let (Some(title), Some(definition), Some(category), Some(example_usage), Some(skill_level)) = (
        required(req.title.as_deref()),
        required(req.definition.as_deref()),
        required(req.category.as_deref()),
        required(req.example_usage.as_deref()),
        required(req.skill_level.as_deref()),
    ) else {
        return Err(SiteError::MissingFields);
    };
    let category: TermCategory = category.parse()?;
    let skill_level: SkillLevel = skill_level.parse()?;
    check_len("Term", &title, TITLE_MAX_LEN)?;
    check_len("Definition", &definition, DEFINITION_MAX_LEN)?;
    check_len("Example usage", &example_usage, EXAMPLE_USAGE_MAX_LEN)?;
    let submitted_by = check_submitted_by(req.submitted_by.as_deref())?;

    let extracted = mentions::extract_mentions(&definition, &example_usage);
    let term = Term {
        meta: SubmissionMeta::new(submitted_by),
        title,
        definition: extracted.definition,
        category,
        example_usage: extracted.example_usage,
        skill_level,
        tags: extracted.tags,
    };
    let term = db.create(term).await?;
    info!("Term '{}' submitted for review with {} mentions", term.title, term.tags.len());
    Ok(term)
}

pub async fn like(db: &mut SiteDb, id: &str, client_id: &str) -> SiteResult<u64> {
    db.like::<Term>(id, client_id).await
}

pub async fn unlike(db: &mut SiteDb, id: &str, client_id: &str) -> SiteResult<u64> {
    db.unlike::<Term>(id, client_id).await
}
