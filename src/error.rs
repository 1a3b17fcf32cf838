use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("{0}")]
    Validation(String),
    #[error("Invalid category")]
    InvalidCategory,
    #[error("Invalid skill level")]
    InvalidSkillLevel,
    #[error("Invalid status. Must be 'rejected', 'review', or 'published'")]
    InvalidStatus,
    #[error("Invalid type. Must be 'terms', 'records', or 'carDesigns'")]
    InvalidType,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("You have already liked this {0}")]
    AlreadyLiked(&'static str),
    #[error("You have not liked this {0}")]
    NotLiked(&'static str),
    #[error("Failed to read/write DB file: {0}")]
    DbIOError(std::io::Error),
    #[error("Failed to serialize/deserialize DB operation: {0}")]
    DbSerializationError(serde_json::Error),
    #[error("Failed to fetch plugins: {0}")]
    PluginFetchError(String),
}

impl SiteError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type SiteResult<T> = Result<T, SiteError>;
