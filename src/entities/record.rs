use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::entities::submission::{Submission, SubmissionMeta, SubmissionType};
use crate::error::SiteError;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordCategory {
    #[serde(rename = "Fastest Goal")]
    FastestGoal,
    #[serde(rename = "Longest Air Dribble")]
    LongestAirDribble,
    #[serde(rename = "Highest MMR")]
    HighestMmr,
    #[serde(rename = "Most Goals in Match")]
    MostGoalsInMatch,
    #[serde(rename = "Longest Win Streak")]
    LongestWinStreak,
    #[serde(rename = "Fastest Aerial Goal")]
    FastestAerialGoal,
    #[serde(rename = "Most Saves in Match")]
    MostSavesInMatch,
    Other,
}

impl RecordCategory {
    pub const ALL: [RecordCategory; 8] = [
        RecordCategory::FastestGoal,
        RecordCategory::LongestAirDribble,
        RecordCategory::HighestMmr,
        RecordCategory::MostGoalsInMatch,
        RecordCategory::LongestWinStreak,
        RecordCategory::FastestAerialGoal,
        RecordCategory::MostSavesInMatch,
        RecordCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordCategory::FastestGoal => "Fastest Goal",
            RecordCategory::LongestAirDribble => "Longest Air Dribble",
            RecordCategory::HighestMmr => "Highest MMR",
            RecordCategory::MostGoalsInMatch => "Most Goals in Match",
            RecordCategory::LongestWinStreak => "Longest Win Streak",
            RecordCategory::FastestAerialGoal => "Fastest Aerial Goal",
            RecordCategory::MostSavesInMatch => "Most Saves in Match",
            RecordCategory::Other => "Other",
        }
    }
}

impl FromStr for RecordCategory {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter()
            .find(|x| x.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(SiteError::InvalidCategory)
    }
}

/// A claimed world record with a link to its proof.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(flatten)]
    pub meta: SubmissionMeta,
    pub title: String,
    pub description: String,
    pub category: RecordCategory,
    pub record_holder_name: String,
    pub proof_url: String,
    pub date_achieved: DateTime<Utc>,
}

impl Submission for Record {
    const TYPE: SubmissionType = SubmissionType::Records;

    fn meta(&self) -> &SubmissionMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SubmissionMeta {
        &mut self.meta
    }

    fn matches_search(&self, query: &str) -> bool {
        [&self.title, &self.description, &self.record_holder_name]
            .iter()
            .any(|x| x.to_lowercase().contains(query))
    }
}

#[test]
fn test_record_category_names() {
    assert_eq!("Highest MMR".parse::<RecordCategory>().unwrap(), RecordCategory::HighestMmr);
    assert_eq!(serde_json::to_value(RecordCategory::MostSavesInMatch).unwrap(), "Most Saves in Match");
    assert!("Fastest Save".parse::<RecordCategory>().is_err());
}
