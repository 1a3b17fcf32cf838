use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the external plugin catalog. Not persisted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub id: usize,
    pub name: String,
    pub author: String,
    pub description: String,
    pub views: u64,
    pub downloads: u64,
    pub last_updated: String,
    pub url: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plugin {
    /// `query` is already lowercased.
    pub fn matches_search(&self, query: &str) -> bool {
        [&self.name, &self.description, &self.author]
            .iter()
            .any(|x| x.to_lowercase().contains(query))
    }
}
