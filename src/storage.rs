use std::path::{Path, PathBuf};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use crate::entities::{CarDesign, EntityId, Record, Status, SubmissionType, Term};
use crate::error::SiteError;

/// One line of the operation log. Replaying every operation in order
/// rebuilds the collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DbOperation {
    CreateTerm { term: Term },
    CreateRecord { record: Record },
    CreateCarDesign { car_design: CarDesign },
    Like { kind: SubmissionType, id: EntityId, client_id: String, at: DateTime<Utc> },
    Unlike { kind: SubmissionType, id: EntityId, client_id: String, at: DateTime<Utc> },
    SetStatus { kind: SubmissionType, id: EntityId, status: Status, at: DateTime<Utc> },
    Delete { kind: SubmissionType, id: EntityId },
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn read_all(&self) -> Result<Vec<DbOperation>, SiteError>;
    async fn write(&mut self, operation: DbOperation) -> Result<(), SiteError>;
}

/// Append-only JSON-lines file, one [`DbOperation`] per line.
pub struct FileStorage {
    db_path: PathBuf,
}

impl FileStorage {
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        if db_path.exists() && !db_path.is_file() {
            anyhow::bail!("db_path is not a file");
        }
        if let Some(parent) = db_path.parent().filter(|x| !x.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            std::fs::write(db_path, "")?;
        }
        Ok(Self { db_path: db_path.to_path_buf() })
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn read_all(&self) -> Result<Vec<DbOperation>, SiteError> {
        let file_str = tokio::fs::read_to_string(&self.db_path).await
            .map_err(SiteError::DbIOError)?;
        let operations = file_str.split('\n')
            .filter(|x| !x.trim().is_empty())
            .map(|x| serde_json::from_str(x).map_err(SiteError::DbSerializationError))
            .collect::<Result<Vec<DbOperation>, SiteError>>()?;
        Ok(operations)
    }

    async fn write(&mut self, operation: DbOperation) -> Result<(), SiteError> {
        let serialized_operation = serde_json::to_string(&operation)
            .map_err(SiteError::DbSerializationError)?;
        let line = format!("{}\n", serialized_operation);
        let mut file = tokio::fs::OpenOptions::new().append(true).open(&self.db_path).await
            .map_err(SiteError::DbIOError)?;
        file.write_all(line.as_bytes()).await
            .map_err(SiteError::DbIOError)?;
        file.flush().await
            .map_err(SiteError::DbIOError)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStorage {
    operations: Vec<DbOperation>,
}

impl InMemoryStorage {
    pub fn with_operations(operations: Vec<DbOperation>) -> Self {
        Self { operations }
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn read_all(&self) -> Result<Vec<DbOperation>, SiteError> {
        Ok(self.operations.clone())
    }

    async fn write(&mut self, operation: DbOperation) -> Result<(), SiteError> {
        self.operations.push(operation);
        Ok(())
    }
}
