//! Inline mentions between dictionary terms.
//!
//! Authors write mentions as `@Exact Term Title@`. On submission every mention
//! is numbered and replaced by a positional placeholder `@N@`, and the term
//! keeps a side list of [`MentionTag`]s mapping each position to the title and
//! dictionary page it points at. Definition and example usage share one
//! numbering space, definition first.
//!
//! At read time [`render`] turns placeholders back into link segments. A
//! placeholder with no matching tag is kept as literal text.

use std::sync::OnceLock;
use regex::{Captures, Regex};
use serde::Serialize;
use crate::entities::MentionTag;
use crate::utils::str_utils::StringExtensions;

pub const DICTIONARY_PAGE_PREFIX: &str = "/dictionary/";
pub const DEFAULT_SUGGESTIONS: usize = 5;
pub const MAX_SUGGESTIONS: usize = 10;

fn mention_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // inner text: no '@', at least one non-whitespace character
    RE.get_or_init(|| Regex::new(r"@([^@]*[^@\s][^@]*)@").expect("mention regex is valid"))
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@(\d+)@").expect("placeholder regex is valid"))
}

/// Dictionary page a mention of `title` links to.
pub fn page_for(title: &str) -> String {
    format!("{}{}", DICTIONARY_PAGE_PREFIX, title.slugify())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedMentions {
    pub definition: String,
    pub example_usage: String,
    pub tags: Vec<MentionTag>,
}

/// Numbers every `@Title@` span in `definition`, then in `example_usage`, and
/// rewrites each to `@N@`. A title mentioned twice gets two positions.
pub fn extract_mentions(definition: &str, example_usage: &str) -> ExtractedMentions {
    let mut tags = Vec::new();
    let definition = rewrite_mentions(definition, &mut tags);
    let example_usage = rewrite_mentions(example_usage, &mut tags);
    ExtractedMentions { definition, example_usage, tags }
}

fn rewrite_mentions(text: &str, tags: &mut Vec<MentionTag>) -> String {
    mention_regex()
        .replace_all(text, |caps: &Captures| {
            let tag_title = caps[1].trim().to_string();
            let position = tags.len() as u32 + 1;
            let page = page_for(&tag_title);
            tags.push(MentionTag { position, tag_title, page });
            format!("@{position}@")
        })
        .into_owned()
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Segment {
    Text { text: String },
    Link { label: String, page: String },
}

/// Splits stored text into plain and link segments. Adjacent plain text,
/// including orphaned placeholders, is merged into one segment.
pub fn render(text: &str, tags: &[MentionTag]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pending = String::new();
    let mut last_end = 0;

    for caps in placeholder_regex().captures_iter(text) {
        let whole = caps.get(0).expect("group 0 is always present");
        pending.push_str(&text[last_end..whole.start()]);
        last_end = whole.end();

        let tag = caps[1].parse::<u32>().ok()
            .and_then(|position| tags.iter().find(|x| x.position == position));
        match tag {
            Some(tag) => {
                if !pending.is_empty() {
                    segments.push(Segment::Text { text: std::mem::take(&mut pending) });
                }
                segments.push(Segment::Link { label: tag.tag_title.clone(), page: tag.page.clone() });
            }
            None => pending.push_str(whole.as_str()),
        }
    }

    pending.push_str(&text[last_end..]);
    if !pending.is_empty() {
        segments.push(Segment::Text { text: pending });
    }
    segments
}

/// Stored text with every resolvable placeholder replaced by its title.
pub fn render_plain(text: &str, tags: &[MentionTag]) -> String {
    render(text, tags)
        .into_iter()
        .map(|x| match x {
            Segment::Text { text } => text,
            Segment::Link { label, .. } => label,
        })
        .collect()
}

/// The partial title typed after an unterminated `@` that ends at `cursor`
/// (a char offset into `text`).
///
/// Returns `None` when the cursor sits inside a closed `@Title@` span, when
/// there is no open `@` before it, or when the open `@` is followed by a space.
pub fn active_mention(text: &str, cursor: usize) -> Option<&str> {
    let cursor = text.char_indices().nth(cursor).map(|(i, _)| i).unwrap_or(text.len());

    let mut open_from = 0;
    for m in mention_regex().find_iter(text) {
        if m.start() < cursor && cursor < m.end() {
            return None;
        }
        if m.end() <= cursor {
            open_from = m.end();
        }
    }

    let before = &text[open_from..cursor];
    let at = before.rfind('@')?;
    let fragment = &before[at + 1..];
    if fragment.starts_with(char::is_whitespace) {
        return None;
    }
    Some(fragment)
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub title: String,
    pub page: String,
}

/// Up to `limit` of `titles` containing `fragment`, ignoring case. A title
/// equal to the fragment is skipped since it is already fully typed.
pub fn suggest<'a>(fragment: &str, titles: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<Suggestion> {
    let needle = fragment.to_lowercase();
    if needle.trim().is_empty() {
        return vec![];
    }
    titles.into_iter()
        .filter(|x| x.contains_ignore_case(&needle))
        .filter(|x| x.to_lowercase() != needle)
        .take(limit)
        .map(|x| Suggestion { title: x.to_string(), page: page_for(x) })
        .collect()
}
