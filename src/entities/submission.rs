use std::fmt::{Display, Formatter};
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;
use crate::error::SiteError;

pub type EntityId = String;

pub const ANONYMOUS: &str = "Anonymous";

/// Moderation state of a submission.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Review,
    Published,
    Rejected,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Review, Status::Published, Status::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Review => "review",
            Status::Published => "published",
            Status::Rejected => "rejected",
        }
    }
}

impl FromStr for Status {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter()
            .find(|x| x.as_str() == s)
            .ok_or(SiteError::InvalidStatus)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The moderated collections, named the way the admin API names them.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmissionType {
    #[serde(rename = "terms")]
    Terms,
    #[serde(rename = "records")]
    Records,
    #[serde(rename = "carDesigns")]
    CarDesigns,
}

impl SubmissionType {
    pub const ALL: [SubmissionType; 3] = [SubmissionType::Terms, SubmissionType::Records, SubmissionType::CarDesigns];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionType::Terms => "terms",
            SubmissionType::Records => "records",
            SubmissionType::CarDesigns => "carDesigns",
        }
    }

    /// Capitalized singular, used in "... not found" messages.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionType::Terms => "Term",
            SubmissionType::Records => "Record",
            SubmissionType::CarDesigns => "Car design",
        }
    }

    /// Lowercase singular, used in like/unlike messages.
    pub fn noun(&self) -> &'static str {
        match self {
            SubmissionType::Terms => "term",
            SubmissionType::Records => "record",
            SubmissionType::CarDesigns => "car design",
        }
    }
}

impl FromStr for SubmissionType {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter()
            .find(|x| x.as_str() == s)
            .ok_or(SiteError::InvalidType)
    }
}

/// Fields every moderated submission carries.
///
/// `like_count` always equals `liked_by.len()`; both are only changed through
/// [`SubmissionMeta::add_like`] and [`SubmissionMeta::remove_like`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMeta {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub submitted_by: String,
    pub status: Status,
    pub like_count: u64,
    pub liked_by: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubmissionMeta {
    pub fn new(submitted_by: Option<String>) -> Self {
        let now = Utc::now();
        let submitted_by = submitted_by
            .map(|x| x.trim().to_string())
            .filter(|x| !x.is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());
        Self {
            id: Uuid::new_v4().simple().to_string(),
            submitted_by,
            status: Status::Review,
            like_count: 0,
            liked_by: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == Status::Published
    }

    pub fn is_liked_by(&self, client_id: &str) -> bool {
        self.liked_by.iter().any(|x| x == client_id)
    }

    /// Returns `false` and changes nothing when the client already liked it.
    pub fn add_like(&mut self, client_id: &str) -> bool {
        if self.is_liked_by(client_id) {
            return false;
        }
        self.liked_by.push(client_id.to_string());
        self.like_count = self.liked_by.len() as u64;
        self.touch();
        true
    }

    /// Returns `false` and changes nothing when the client never liked it.
    pub fn remove_like(&mut self, client_id: &str) -> bool {
        if !self.is_liked_by(client_id) {
            return false;
        }
        self.liked_by.retain(|x| x != client_id);
        self.like_count = self.liked_by.len() as u64;
        self.touch();
        true
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

pub trait Submission: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TYPE: SubmissionType;

    fn meta(&self) -> &SubmissionMeta;
    fn meta_mut(&mut self) -> &mut SubmissionMeta;

    /// `query` is already lowercased.
    fn matches_search(&self, query: &str) -> bool;

    fn id(&self) -> &str {
        &self.meta().id
    }
}

/// A submission as the public endpoints show it: without the list of client
/// ids that liked it, but with whether the calling client did.
#[derive(Clone, Debug)]
pub struct PublicItem<T> {
    pub item: T,
    pub is_liked: bool,
}

impl<T: Submission> PublicItem<T> {
    pub fn new(item: T, client_id: Option<&str>) -> Self {
        let is_liked = client_id.map(|x| item.meta().is_liked_by(x)).unwrap_or(false);
        Self { item, is_liked }
    }
}

impl<T: Submission> Serialize for PublicItem<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = serde_json::to_value(&self.item).map_err(serde::ser::Error::custom)?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("likedBy");
            obj.insert("isLiked".to_string(), serde_json::Value::Bool(self.is_liked));
        }
        value.serialize(serializer)
    }
}
