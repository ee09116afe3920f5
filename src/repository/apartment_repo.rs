use crate::model::apartment::Apartment;
use crate::repository::mongo::{contains_regex, page_window};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info};

#[async_trait]
pub trait ApartmentRepository: Send + Sync {
    async fn insert(&self, apartment: Apartment) -> RepositoryResult<Apartment>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Apartment>>;
    async fn find_many(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Apartment>>;
    async fn update(&self, id: &ObjectId, apartment: Apartment) -> RepositoryResult<Apartment>;
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()>;
    /// Admin listing; search matches name, area or pincode.
    async fn list(&self, search: Option<&str>, page: u64, limit: u64) -> RepositoryResult<(Vec<Apartment>, u64)>;
    /// Active apartments, optionally narrowed by area (case-insensitive) and pincode.
    async fn list_available(&self, area: Option<&str>, pincode: Option<&str>) -> RepositoryResult<Vec<Apartment>>;
    async fn distinct_areas(&self) -> RepositoryResult<Vec<String>>;
    async fn pincodes_for_area(&self, area: &str) -> RepositoryResult<Vec<String>>;
    async fn count(&self) -> RepositoryResult<u64>;
}

pub struct MongoApartmentRepository {
    collection: mongodb::Collection<Apartment>,
}

impl MongoApartmentRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        MongoApartmentRepository { collection: db.collection::<Apartment>("apartments") }
    }

    fn exact_ci(value: &str) -> bson::Regex {
        let mut re = contains_regex(value);
        re.pattern = format!("^{}$", re.pattern);
        re
    }

    async fn distinct_strings(&self, field: &str, filter: Document) -> RepositoryResult<Vec<String>> {
        let values = self.collection.distinct(field, filter, None).await?;
        let mut out: Vec<String> = values.into_iter().filter_map(|b| b.as_str().map(str::to_string)).collect();
        out.sort();
        Ok(out)
    }
}

#[async_trait]
impl ApartmentRepository for MongoApartmentRepository {
    #[tracing::instrument(skip(self, apartment), fields(name = %apartment.name))]
    async fn insert(&self, mut apartment: Apartment) -> RepositoryResult<Apartment> {
        apartment.id = Some(ObjectId::new());
        let now = Utc::now().to_rfc3339();
        apartment.created_at = Some(now.clone());
        apartment.updated_at = Some(now);
        match self.collection.insert_one(apartment.clone(), None).await {
            Ok(_) => {
                info!("Apartment created");
                Ok(apartment)
            }
            Err(e) => {
                error!("Failed to create apartment: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Apartment>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_many(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Apartment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.collection.find(doc! { "_id": { "$in": ids.to_vec() } }, None).await?.try_collect().await?)
    }

    #[tracing::instrument(skip(self, apartment), fields(id = %id))]
    async fn update(&self, id: &ObjectId, mut apartment: Apartment) -> RepositoryResult<Apartment> {
        apartment.id = Some(*id);
        apartment.updated_at = Some(Utc::now().to_rfc3339());
        let mut doc = bson::to_document(&apartment)?;
        doc.remove("_id");
        doc.remove("createdAt");
        let result = self.collection.update_one(doc! { "_id": id }, doc! { "$set": doc }, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Apartment not found for ID: {}", id)));
        }
        Ok(apartment)
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("Apartment not found for ID: {}", id)));
        }
        Ok(())
    }

    async fn list(&self, search: Option<&str>, page: u64, limit: u64) -> RepositoryResult<(Vec<Apartment>, u64)> {
        let mut filter = Document::new();
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            let re = contains_regex(search);
            filter.insert("$or", vec![
                doc! { "name": re.clone() },
                doc! { "area": re.clone() },
                doc! { "pincode": re },
            ]);
        }
        let (skip, limit) = page_window(page, limit);
        let options = FindOptions::builder().sort(doc! { "name": 1 }).skip(skip).limit(limit).build();
        let total = self.collection.count_documents(filter.clone(), None).await?;
        let items: Vec<Apartment> = self.collection.find(filter, options).await?.try_collect().await?;
        Ok((items, total))
    }

    async fn list_available(&self, area: Option<&str>, pincode: Option<&str>) -> RepositoryResult<Vec<Apartment>> {
        let mut filter = doc! { "isActive": true };
        if let Some(area) = area.filter(|a| !a.trim().is_empty()) {
            filter.insert("area", Self::exact_ci(area));
        }
        if let Some(pincode) = pincode.filter(|p| !p.trim().is_empty()) {
            filter.insert("pincode", pincode.trim());
        }
        let options = FindOptions::builder().sort(doc! { "area": 1, "name": 1 }).build();
        Ok(self.collection.find(filter, options).await?.try_collect().await?)
    }

    async fn distinct_areas(&self) -> RepositoryResult<Vec<String>> {
        self.distinct_strings("area", doc! { "isActive": true }).await
    }

    async fn pincodes_for_area(&self, area: &str) -> RepositoryResult<Vec<String>> {
        self.distinct_strings("pincode", doc! { "isActive": true, "area": Self::exact_ci(area) }).await
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(None, None).await?)
    }
}
