use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::entities::submission::{Submission, SubmissionMeta, SubmissionType};
use crate::error::SiteError;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TermCategory {
    Mechanics,
    Slang,
    Strategy,
    Tactics,
    Equipment,
    Other,
}

impl TermCategory {
    pub const ALL: [TermCategory; 6] = [
        TermCategory::Mechanics,
        TermCategory::Slang,
        TermCategory::Strategy,
        TermCategory::Tactics,
        TermCategory::Equipment,
        TermCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TermCategory::Mechanics => "Mechanics",
            TermCategory::Slang => "Slang",
            TermCategory::Strategy => "Strategy",
            TermCategory::Tactics => "Tactics",
            TermCategory::Equipment => "Equipment",
            TermCategory::Other => "Other",
        }
    }
}

impl FromStr for TermCategory {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter()
            .find(|x| x.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(SiteError::InvalidCategory)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Pro,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 3] = [SkillLevel::Beginner, SkillLevel::Intermediate, SkillLevel::Pro];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Pro => "Pro",
        }
    }
}

impl FromStr for SkillLevel {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter()
            .find(|x| x.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(SiteError::InvalidSkillLevel)
    }
}

/// Maps a `@N@` placeholder in a term's stored text to the term it mentions.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MentionTag {
    pub position: u32,
    pub tag_title: String,
    pub page: String,
}

/// A dictionary entry. `definition` and `example_usage` are stored with
/// mentions already rewritten to `@N@` placeholders indexing into `tags`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    #[serde(flatten)]
    pub meta: SubmissionMeta,
    pub title: String,
    pub definition: String,
    pub category: TermCategory,
    pub example_usage: String,
    pub skill_level: SkillLevel,
    #[serde(default)]
    pub tags: Vec<MentionTag>,
}

impl Submission for Term {
    const TYPE: SubmissionType = SubmissionType::Terms;

    fn meta(&self) -> &SubmissionMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SubmissionMeta {
        &mut self.meta
    }

    fn matches_search(&self, query: &str) -> bool {
        [&self.title, &self.definition, &self.example_usage]
            .iter()
            .any(|x| x.to_lowercase().contains(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!("Mechanics".parse::<TermCategory>().unwrap(), TermCategory::Mechanics);
        assert_eq!(" slang ".parse::<TermCategory>().unwrap(), TermCategory::Slang);
        assert!(matches!("Memes".parse::<TermCategory>(), Err(SiteError::InvalidCategory)));
        assert_eq!("pro".parse::<SkillLevel>().unwrap(), SkillLevel::Pro);
        assert!(matches!("Grand Champ".parse::<SkillLevel>(), Err(SiteError::InvalidSkillLevel)));
    }

    #[test]
    fn test_term_json_shape() {
        let term = Term {
            meta: SubmissionMeta::new(None),
            title: "Flip Reset".to_string(),
            definition: "A @1@ is advanced.".to_string(),
            category: TermCategory::Mechanics,
            example_usage: "Nice one".to_string(),
            skill_level: SkillLevel::Pro,
            tags: vec![MentionTag { position: 1, tag_title: "Flip Reset".to_string(), page: "/dictionary/flip-reset".to_string() }],
        };
        let value = serde_json::to_value(&term).unwrap();
        assert_eq!(value["_id"], serde_json::json!(term.meta.id));
        assert_eq!(value["exampleUsage"], "Nice one");
        assert_eq!(value["skillLevel"], "Pro");
        assert_eq!(value["status"], "review");
        assert_eq!(value["likeCount"], 0);
        assert_eq!(value["tags"][0]["tagTitle"], "Flip Reset");

        let parsed: Term = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, term);
    }
}
