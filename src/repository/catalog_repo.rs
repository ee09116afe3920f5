use crate::model::catalog::{CatalogEntry, PricingLine, ServiceKind};
use crate::repository::legacy_catalog::fold_legacy;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::options::{FindOptions, UpdateOptions};
use tracing::{error, info, warn};

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn insert(&self, entry: CatalogEntry) -> RepositoryResult<CatalogEntry>;
    /// Single lookup across every kind.
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<CatalogEntry>>;
    async fn find_first_by_kind(&self, kind: ServiceKind) -> RepositoryResult<Option<CatalogEntry>>;
    async fn list(&self, active_only: bool) -> RepositoryResult<Vec<CatalogEntry>>;
    async fn update(&self, id: &ObjectId, entry: CatalogEntry) -> RepositoryResult<CatalogEntry>;
    async fn set_active(&self, id: &ObjectId, active: bool) -> RepositoryResult<()>;
    async fn replace_pricing(&self, id: &ObjectId, pricing: Vec<PricingLine>) -> RepositoryResult<()>;
}

pub struct MongoCatalogRepository {
    db: mongodb::Database,
    collection: mongodb::Collection<CatalogEntry>,
}

impl MongoCatalogRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        MongoCatalogRepository {
            db: db.clone(),
            collection: db.collection::<CatalogEntry>("catalog"),
        }
    }

    /// Copies entries from the per-kind collections into the catalog, keeping
    /// their ids. Entries already present are left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn import_legacy(&self) -> RepositoryResult<usize> {
        let mut batches = Vec::with_capacity(ServiceKind::IMPORT_ORDER.len());
        for kind in ServiceKind::IMPORT_ORDER {
            let legacy = self.db.collection::<Document>(kind.legacy_collection());
            let docs: Vec<Document> = legacy.find(None, None).await?.try_collect().await?;
            info!(kind = %kind, count = docs.len(), "Read legacy service documents");
            batches.push((kind, docs));
        }

        let mut imported = 0;
        for entry in fold_legacy(batches) {
            let Some(id) = entry.id else { continue };
            let doc = bson::to_document(&entry)?;
            let options = UpdateOptions::builder().upsert(true).build();
            let result = self
                .collection
                .update_one(doc! { "_id": id }, doc! { "$setOnInsert": doc }, options)
                .await?;
            if result.upserted_id.is_some() {
                imported += 1;
            }
        }
        info!("Imported {} legacy catalog entries", imported);
        Ok(imported)
    }
}

#[async_trait]
impl CatalogRepository for MongoCatalogRepository {
    #[tracing::instrument(skip(self, entry), fields(kind = %entry.kind, name = %entry.name))]
    async fn insert(&self, mut entry: CatalogEntry) -> RepositoryResult<CatalogEntry> {
        entry.id = Some(ObjectId::new());
        let now = Utc::now().to_rfc3339();
        entry.created_at = Some(now.clone());
        entry.updated_at = Some(now);
        match self.collection.insert_one(entry.clone(), None).await {
            Ok(_) => {
                info!("Catalog entry created");
                Ok(entry)
            }
            Err(e) => {
                error!("Failed to create catalog entry: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<CatalogEntry>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_first_by_kind(&self, kind: ServiceKind) -> RepositoryResult<Option<CatalogEntry>> {
        let options = mongodb::options::FindOneOptions::builder()
            .sort(doc! { "createdAt": 1 })
            .build();
        Ok(self.collection.find_one(doc! { "kind": kind.as_str() }, options).await?)
    }

    async fn list(&self, active_only: bool) -> RepositoryResult<Vec<CatalogEntry>> {
        let filter = if active_only { doc! { "isActive": true } } else { Document::new() };
        let options = FindOptions::builder().sort(doc! { "kind": 1, "name": 1 }).build();
        Ok(self.collection.find(filter, options).await?.try_collect().await?)
    }

    #[tracing::instrument(skip(self, entry), fields(id = %id))]
    async fn update(&self, id: &ObjectId, mut entry: CatalogEntry) -> RepositoryResult<CatalogEntry> {
        entry.id = Some(*id);
        entry.updated_at = Some(Utc::now().to_rfc3339());
        let mut doc = bson::to_document(&entry)?;
        doc.remove("_id");
        doc.remove("createdAt");
        let result = self.collection.update_one(doc! { "_id": id }, doc! { "$set": doc }, None).await?;
        if result.matched_count == 0 {
            warn!("No catalog entry found to update for ID: {}", id);
            return Err(RepositoryError::not_found(format!("Service not found for ID: {}", id)));
        }
        Ok(entry)
    }

    async fn set_active(&self, id: &ObjectId, active: bool) -> RepositoryResult<()> {
        let update = doc! { "$set": { "isActive": active, "updatedAt": Utc::now().to_rfc3339() } };
        let result = self.collection.update_one(doc! { "_id": id }, update, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Service not found for ID: {}", id)));
        }
        Ok(())
    }

    async fn replace_pricing(&self, id: &ObjectId, pricing: Vec<PricingLine>) -> RepositoryResult<()> {
        let lines = bson::to_bson(&pricing)?;
        let update = doc! { "$set": { "pricing": lines, "updatedAt": Utc::now().to_rfc3339() } };
        let result = self.collection.update_one(doc! { "_id": id }, update, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Service not found for ID: {}", id)));
        }
        Ok(())
    }
}
