use crate::model::worker::Worker;
use crate::repository::mongo::{contains_regex, page_window};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info};

/// Filter for the admin worker listing
#[derive(Debug, Clone, Default)]
pub struct WorkerQuery {
    /// Matched against name and phone
    pub search: Option<String>,
    /// Workers serving any of these apartments also match the search
    pub serving_any: Vec<ObjectId>,
}

#[async_trait]
pub trait WorkerRepository: Send + Sync {
    async fn insert(&self, worker: Worker) -> RepositoryResult<Worker>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Worker>>;
    async fn update(&self, id: &ObjectId, worker: Worker) -> RepositoryResult<Worker>;
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()>;
    async fn list(&self, query: &WorkerQuery, page: u64, limit: u64) -> RepositoryResult<(Vec<Worker>, u64)>;
    async fn count(&self) -> RepositoryResult<u64>;
}

pub struct MongoWorkerRepository {
    collection: mongodb::Collection<Worker>,
}

impl MongoWorkerRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        MongoWorkerRepository { collection: db.collection::<Worker>("workers") }
    }

    fn filter_for(query: &WorkerQuery) -> Document {
        let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Document::new();
        };
        let re = contains_regex(search);
        let mut any = vec![doc! { "name": re.clone() }, doc! { "phone": re }];
        if !query.serving_any.is_empty() {
            any.push(doc! { "areas": { "$in": query.serving_any.clone() } });
        }
        doc! { "$or": any }
    }
}

#[async_trait]
impl WorkerRepository for MongoWorkerRepository {
    #[tracing::instrument(skip(self, worker), fields(name = %worker.name))]
    async fn insert(&self, mut worker: Worker) -> RepositoryResult<Worker> {
        worker.id = Some(ObjectId::new());
        let now = Utc::now().to_rfc3339();
        worker.created_at = Some(now.clone());
        worker.updated_at = Some(now);
        match self.collection.insert_one(worker.clone(), None).await {
            Ok(_) => {
                info!("Worker created");
                Ok(worker)
            }
            Err(e) => {
                error!("Failed to create worker: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Worker>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    #[tracing::instrument(skip(self, worker), fields(id = %id))]
    async fn update(&self, id: &ObjectId, mut worker: Worker) -> RepositoryResult<Worker> {
        worker.id = Some(*id);
        worker.updated_at = Some(Utc::now().to_rfc3339());
        let mut doc = bson::to_document(&worker)?;
        doc.remove("_id");
        doc.remove("createdAt");
        let result = self.collection.update_one(doc! { "_id": id }, doc! { "$set": doc }, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Worker not found for ID: {}", id)));
        }
        Ok(worker)
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("Worker not found for ID: {}", id)));
        }
        Ok(())
    }

    async fn list(&self, query: &WorkerQuery, page: u64, limit: u64) -> RepositoryResult<(Vec<Worker>, u64)> {
        let filter = Self::filter_for(query);
        let (skip, limit) = page_window(page, limit);
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).skip(skip).limit(limit).build();
        let total = self.collection.count_documents(filter.clone(), None).await?;
        let items: Vec<Worker> = self.collection.find(filter, options).await?.try_collect().await?;
        Ok((items, total))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(None, None).await?)
    }
}
