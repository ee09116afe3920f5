use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{info, instrument};

use crate::dto::catalog_dto::{CatalogEntryRequest, DetailedCatalog, PricingLineInput};
use crate::model::catalog::{CatalogEntry, PricingLine, ServiceKind};
use crate::repository::catalog_repo::CatalogRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_active(&self) -> Result<Vec<CatalogEntry>, ServiceError>;
    async fn get_active(&self, id: ObjectId) -> Result<CatalogEntry, ServiceError>;
    async fn detailed(&self, kind: &str) -> Result<CatalogEntry, ServiceError>;

    async fn list_all(&self) -> Result<Vec<CatalogEntry>, ServiceError>;
    async fn create(&self, request: CatalogEntryRequest) -> Result<CatalogEntry, ServiceError>;
    async fn update(&self, id: ObjectId, request: CatalogEntryRequest) -> Result<CatalogEntry, ServiceError>;
    async fn deactivate(&self, id: ObjectId) -> Result<(), ServiceError>;

    async fn detailed_all(&self) -> Result<DetailedCatalog, ServiceError>;
    async fn pricing(&self, kind: &str) -> Result<Vec<PricingLine>, ServiceError>;
    async fn add_pricing(&self, kind: &str, input: PricingLineInput) -> Result<Vec<PricingLine>, ServiceError>;
    async fn update_pricing(&self, kind: &str, line_id: ObjectId, input: PricingLineInput) -> Result<PricingLine, ServiceError>;
    async fn delete_pricing(&self, kind: &str, line_id: ObjectId) -> Result<Vec<PricingLine>, ServiceError>;
}

pub struct CatalogServiceImpl {
    pub catalog_repo: Arc<dyn CatalogRepository>,
}

impl CatalogServiceImpl {
    pub fn new(catalog_repo: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog_repo }
    }

    fn parse_kind(slug: &str) -> Result<ServiceKind, ServiceError> {
        ServiceKind::from_slug(slug).ok_or_else(|| ServiceError::InvalidInput("Invalid service type".to_string()))
    }

    async fn entry_of_kind(&self, kind: ServiceKind) -> Result<CatalogEntry, ServiceError> {
        self.catalog_repo
            .find_first_by_kind(kind)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Service not found".to_string()))
    }

    fn entry_id(entry: &CatalogEntry) -> Result<ObjectId, ServiceError> {
        entry.id.ok_or_else(|| ServiceError::InternalError("Catalog entry without id".to_string()))
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn list_active(&self) -> Result<Vec<CatalogEntry>, ServiceError> {
        Ok(self.catalog_repo.list(true).await?)
    }

    async fn get_active(&self, id: ObjectId) -> Result<CatalogEntry, ServiceError> {
        match self.catalog_repo.find_by_id(&id).await? {
            Some(entry) if entry.is_active => Ok(entry),
            _ => Err(ServiceError::NotFound("Service not found".to_string())),
        }
    }

    async fn detailed(&self, kind: &str) -> Result<CatalogEntry, ServiceError> {
        let kind = Self::parse_kind(kind)?;
        self.entry_of_kind(kind).await
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>, ServiceError> {
        Ok(self.catalog_repo.list(false).await?)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create(&self, request: CatalogEntryRequest) -> Result<CatalogEntry, ServiceError> {
        let entry = request.into_entry(None).map_err(ServiceError::InvalidInput)?;
        let entry = self.catalog_repo.insert(entry).await?;
        info!(kind = %entry.kind, "Catalog entry created");
        Ok(entry)
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update(&self, id: ObjectId, request: CatalogEntryRequest) -> Result<CatalogEntry, ServiceError> {
        let existing = self
            .catalog_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Service not found".to_string()))?;
        let entry = request.into_entry(Some(&existing)).map_err(ServiceError::InvalidInput)?;
        let entry = self.catalog_repo.update(&id, entry).await?;
        info!("Catalog entry updated");
        Ok(entry)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn deactivate(&self, id: ObjectId) -> Result<(), ServiceError> {
        self.catalog_repo.set_active(&id, false).await?;
        info!("Catalog entry deactivated");
        Ok(())
    }

    async fn detailed_all(&self) -> Result<DetailedCatalog, ServiceError> {
        let mut detailed = DetailedCatalog::new();
        for kind in ServiceKind::SPECIALIZED {
            let entry = self.catalog_repo.find_first_by_kind(kind).await?;
            detailed.insert(kind.as_str().to_string(), entry);
        }
        Ok(detailed)
    }

    /// Creates an empty entry for the kind on first access.
    #[instrument(skip(self))]
    async fn pricing(&self, kind: &str) -> Result<Vec<PricingLine>, ServiceError> {
        let kind = Self::parse_kind(kind)?;
        match self.catalog_repo.find_first_by_kind(kind).await? {
            Some(entry) => Ok(entry.pricing),
            None => {
                self.catalog_repo.insert(CatalogEntry::empty(kind)).await?;
                info!(kind = %kind, "Created empty catalog entry");
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip(self, input))]
    async fn add_pricing(&self, kind: &str, input: PricingLineInput) -> Result<Vec<PricingLine>, ServiceError> {
        let entry = self.entry_of_kind(Self::parse_kind(kind)?).await?;
        let id = Self::entry_id(&entry)?;
        let line = input.into_line(ObjectId::new()).map_err(ServiceError::InvalidInput)?;
        let mut pricing = entry.pricing;
        pricing.push(line);
        self.catalog_repo.replace_pricing(&id, pricing.clone()).await?;
        info!("Pricing line added");
        Ok(pricing)
    }

    #[instrument(skip(self, input), fields(line = %line_id))]
    async fn update_pricing(&self, kind: &str, line_id: ObjectId, input: PricingLineInput) -> Result<PricingLine, ServiceError> {
        let entry = self.entry_of_kind(Self::parse_kind(kind)?).await?;
        let id = Self::entry_id(&entry)?;
        let mut pricing = entry.pricing;
        let line = pricing
            .iter_mut()
            .find(|line| line.id == line_id)
            .ok_or_else(|| ServiceError::NotFound("Pricing rule not found".to_string()))?;
        input.apply_to(line).map_err(ServiceError::InvalidInput)?;
        let updated = line.clone();
        self.catalog_repo.replace_pricing(&id, pricing).await?;
        info!("Pricing line updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(line = %line_id))]
    async fn delete_pricing(&self, kind: &str, line_id: ObjectId) -> Result<Vec<PricingLine>, ServiceError> {
        let entry = self.entry_of_kind(Self::parse_kind(kind)?).await?;
        let id = Self::entry_id(&entry)?;
        let before = entry.pricing.len();
        let pricing: Vec<PricingLine> = entry.pricing.into_iter().filter(|line| line.id != line_id).collect();
        if pricing.len() == before {
            return Err(ServiceError::NotFound("Pricing rule not found".to_string()));
        }
        self.catalog_repo.replace_pricing(&id, pricing.clone()).await?;
        info!("Pricing line removed");
        Ok(pricing)
    }
}
