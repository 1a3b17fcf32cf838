use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info, warn};
use crate::entities::*;
use crate::error::{SiteError, SiteResult};
use crate::storage::{DbOperation, Storage};

/// One in-memory collection of submissions keyed by id.
pub struct Collection<T> {
    map: DashMap<EntityId, T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { map: DashMap::new() }
    }
}

impl<T: Submission> Collection<T> {
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.map.get(id).map(|x| x.value().clone())
    }

    pub fn get_published(&self, id: &str) -> Option<T> {
        self.get(id).filter(|x| x.meta().is_published())
    }

    /// Every item matching `predicate`, in no particular order.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.map.iter()
            .filter(|x| predicate(x.value()))
            .map(|x| x.value().clone())
            .collect()
    }

    pub fn all(&self) -> Vec<T> {
        self.find(|_| true)
    }

    fn insert(&self, item: T) -> bool {
        let id = item.id().to_string();
        if self.map.contains_key(&id) {
            return false;
        }
        self.map.insert(id, item);
        true
    }

    fn update<R>(&self, id: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.map.get_mut(id).map(|mut x| f(x.value_mut()))
    }

    fn remove(&self, id: &str) -> Option<T> {
        self.map.remove(id).map(|x| x.1)
    }
}

/// Any stored submission, serialized as the plain document.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum AnySubmission {
    Term(Term),
    Record(Record),
    CarDesign(CarDesign),
}

/// Submission types that live in a [`SiteDb`] collection.
pub trait Stored: Submission {
    fn collection(db: &SiteDb) -> &Collection<Self>;
    fn create_operation(self) -> DbOperation;
    fn into_any(self) -> AnySubmission;
}

impl Stored for Term {
    fn collection(db: &SiteDb) -> &Collection<Self> {
        &db.terms
    }

    fn create_operation(self) -> DbOperation {
        DbOperation::CreateTerm { term: self }
    }

    fn into_any(self) -> AnySubmission {
        AnySubmission::Term(self)
    }
}

impl Stored for Record {
    fn collection(db: &SiteDb) -> &Collection<Self> {
        &db.records
    }

    fn create_operation(self) -> DbOperation {
        DbOperation::CreateRecord { record: self }
    }

    fn into_any(self) -> AnySubmission {
        AnySubmission::Record(self)
    }
}

impl Stored for CarDesign {
    fn collection(db: &SiteDb) -> &Collection<Self> {
        &db.car_designs
    }

    fn create_operation(self) -> DbOperation {
        DbOperation::CreateCarDesign { car_design: self }
    }

    fn into_any(self) -> AnySubmission {
        AnySubmission::CarDesign(self)
    }
}

/// All moderated content, held in memory and rebuilt from the operation log.
///
/// Every mutation is applied in memory first and then appended to storage.
/// Callers serialize mutations through the `&mut self` receiver.
pub struct SiteDb {
    terms: Collection<Term>,
    records: Collection<Record>,
    car_designs: Collection<CarDesign>,
    storage: Box<dyn Storage>,
}

impl SiteDb {
    pub async fn init(storage: Box<dyn Storage>) -> SiteResult<Self> {
        let db = Self {
            terms: Collection::default(),
            records: Collection::default(),
            car_designs: Collection::default(),
            storage,
        };
        info!("Starting DB import from operation log...");
        let operations = db.storage.read_all().await?;
        let total = operations.len();
        let mut skipped = 0;
        for operation in &operations {
            if !db.apply(operation) {
                skipped += 1;
            }
        }
        if skipped > 0 {
            warn!("{} of {} logged operations did not apply", skipped, total);
        }
        info!("DB imported: {} terms, {} records, {} car designs", db.terms.len(), db.records.len(), db.car_designs.len());
        Ok(db)
    }

    pub fn terms(&self) -> &Collection<Term> {
        &self.terms
    }

    pub fn records(&self) -> &Collection<Record> {
        &self.records
    }

    pub fn car_designs(&self) -> &Collection<CarDesign> {
        &self.car_designs
    }

    pub fn collection<T: Stored>(&self) -> &Collection<T> {
        T::collection(self)
    }

    pub fn get_any(&self, kind: SubmissionType, id: &str) -> Option<AnySubmission> {
        match kind {
            SubmissionType::Terms => self.terms.get(id).map(AnySubmission::Term),
            SubmissionType::Records => self.records.get(id).map(AnySubmission::Record),
            SubmissionType::CarDesigns => self.car_designs.get(id).map(AnySubmission::CarDesign),
        }
    }

    pub async fn create<T: Stored>(&mut self, item: T) -> SiteResult<T> {
        self.write(item.clone().create_operation()).await?;
        Ok(item)
    }

    /// Adds `client_id` to the likes of a published item and returns the new count.
    pub async fn like<T: Stored>(&mut self, id: &str, client_id: &str) -> SiteResult<u64> {
        let item = self.collection::<T>().get_published(id)
            .ok_or(SiteError::NotFound(T::TYPE.label()))?;
        if item.meta().is_liked_by(client_id) {
            return Err(SiteError::AlreadyLiked(T::TYPE.noun()));
        }
        self.write(DbOperation::Like { kind: T::TYPE, id: id.to_string(), client_id: client_id.to_string(), at: Utc::now() }).await?;
        Ok(item.meta().like_count + 1)
    }

    /// Removes `client_id` from the likes of a published item and returns the new count.
    pub async fn unlike<T: Stored>(&mut self, id: &str, client_id: &str) -> SiteResult<u64> {
        let item = self.collection::<T>().get_published(id)
            .ok_or(SiteError::NotFound(T::TYPE.label()))?;
        if !item.meta().is_liked_by(client_id) {
            return Err(SiteError::NotLiked(T::TYPE.noun()));
        }
        self.write(DbOperation::Unlike { kind: T::TYPE, id: id.to_string(), client_id: client_id.to_string(), at: Utc::now() }).await?;
        Ok(item.meta().like_count.saturating_sub(1))
    }

    pub async fn set_status(&mut self, kind: SubmissionType, id: &str, status: Status) -> SiteResult<AnySubmission> {
        if self.get_any(kind, id).is_none() {
            return Err(SiteError::NotFound("Submission"));
        }
        self.write(DbOperation::SetStatus { kind, id: id.to_string(), status, at: Utc::now() }).await?;
        self.get_any(kind, id).ok_or(SiteError::NotFound("Submission"))
    }

    pub async fn delete(&mut self, kind: SubmissionType, id: &str) -> SiteResult<AnySubmission> {
        let existing = self.get_any(kind, id).ok_or(SiteError::NotFound("Submission"))?;
        self.write(DbOperation::Delete { kind, id: id.to_string() }).await?;
        Ok(existing)
    }

    /// Appends to storage, then applies in memory. A failed append leaves
    /// memory untouched.
    async fn write(&mut self, operation: DbOperation) -> SiteResult<()> {
        debug!("Writing to operation log: {:?}", operation);
        self.storage.write(operation.clone()).await?;
        if !self.apply(&operation) {
            warn!("Operation did not apply: {:?}", operation);
        }
        Ok(())
    }

    /// Applies one operation in memory. Returns `false` when it refers to a
    /// missing item or would not change anything.
    fn apply(&self, operation: &DbOperation) -> bool {
        match operation {
            DbOperation::CreateTerm { term } => self.terms.insert(term.clone()),
            DbOperation::CreateRecord { record } => self.records.insert(record.clone()),
            DbOperation::CreateCarDesign { car_design } => self.car_designs.insert(car_design.clone()),
            DbOperation::Like { kind, id, client_id, at } => {
                self.update_meta(*kind, id, |meta| meta.add_like(client_id), *at)
            }
            DbOperation::Unlike { kind, id, client_id, at } => {
                self.update_meta(*kind, id, |meta| meta.remove_like(client_id), *at)
            }
            DbOperation::SetStatus { kind, id, status, at } => {
                self.update_meta(*kind, id, |meta| { meta.status = *status; true }, *at)
            }
            DbOperation::Delete { kind, id } => match kind {
                SubmissionType::Terms => self.terms.remove(id).is_some(),
                SubmissionType::Records => self.records.remove(id).is_some(),
                SubmissionType::CarDesigns => self.car_designs.remove(id).is_some(),
            },
        }
    }

    fn update_meta(&self, kind: SubmissionType, id: &str, f: impl FnOnce(&mut SubmissionMeta) -> bool, at: DateTime<Utc>) -> bool {
        let f = |meta: &mut SubmissionMeta| {
            let changed = f(meta);
            if changed {
                meta.updated_at = at;
            }
            changed
        };
        let result = match kind {
            SubmissionType::Terms => self.terms.update(id, |x| f(x.meta_mut())),
            SubmissionType::Records => self.records.update(id, |x| f(x.meta_mut())),
            SubmissionType::CarDesigns => self.car_designs.update(id, |x| f(x.meta_mut())),
        };
        result.unwrap_or(false)
    }
}
