//! Apartment and worker directories.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{info, instrument, warn};

use crate::dto::directory_dto::{
    ApartmentPage, ApartmentRef, ApartmentRequest, AvailableApartmentsQuery, ServiceRef, WorkerPage, WorkerRequest,
    WorkerView,
};
use crate::dto::pagination::{PageQuery, Pagination, MAX_PAGE_SIZE};
use crate::model::apartment::{is_valid_pincode, Apartment};
use crate::model::worker::Worker;
use crate::repository::apartment_repo::ApartmentRepository;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::worker_repo::{WorkerQuery, WorkerRepository};
use crate::util::error::ServiceError;

const ADMIN_PAGE_SIZE: u64 = 20;

#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn available_apartments(&self, query: AvailableApartmentsQuery) -> Result<Vec<Apartment>, ServiceError>;
    async fn get_apartment(&self, id: ObjectId) -> Result<Apartment, ServiceError>;
    async fn areas(&self) -> Result<Vec<String>, ServiceError>;
    async fn pincodes(&self, area: &str) -> Result<Vec<String>, ServiceError>;

    async fn list_apartments(&self, query: PageQuery) -> Result<ApartmentPage, ServiceError>;
    async fn create_apartment(&self, request: ApartmentRequest) -> Result<Apartment, ServiceError>;
    async fn update_apartment(&self, id: ObjectId, request: ApartmentRequest) -> Result<Apartment, ServiceError>;
    async fn delete_apartment(&self, id: ObjectId) -> Result<(), ServiceError>;

    async fn list_workers(&self, query: PageQuery) -> Result<WorkerPage, ServiceError>;
    async fn get_worker(&self, id: ObjectId) -> Result<WorkerView, ServiceError>;
    async fn create_worker(&self, request: WorkerRequest) -> Result<WorkerView, ServiceError>;
    async fn update_worker(&self, id: ObjectId, request: WorkerRequest) -> Result<WorkerView, ServiceError>;
    async fn delete_worker(&self, id: ObjectId) -> Result<(), ServiceError>;
}

pub struct DirectoryServiceImpl {
    pub apartment_repo: Arc<dyn ApartmentRepository>,
    pub worker_repo: Arc<dyn WorkerRepository>,
    pub catalog_repo: Arc<dyn CatalogRepository>,
}

impl DirectoryServiceImpl {
    pub fn new(
        apartment_repo: Arc<dyn ApartmentRepository>,
        worker_repo: Arc<dyn WorkerRepository>,
        catalog_repo: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self { apartment_repo, worker_repo, catalog_repo }
    }

    fn check_apartment(request: &ApartmentRequest) -> Result<(), ServiceError> {
        if !is_valid_pincode(request.pincode.trim()) {
            return Err(ServiceError::InvalidInput("Pincode must be 6 digits".to_string()));
        }
        Ok(())
    }

    fn parse_ids(raw: &[String], what: &str) -> Result<Vec<ObjectId>, ServiceError> {
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(raw.len());
        for value in raw {
            let id = ObjectId::parse_str(value.trim())
                .map_err(|_| ServiceError::InvalidInput(format!("Invalid {} id: {}", what, value)))?;
            if seen.insert(id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Every referenced apartment and catalog entry must exist.
    async fn resolve_references(&self, request: &WorkerRequest) -> Result<(Vec<ObjectId>, Vec<ObjectId>), ServiceError> {
        let services = Self::parse_ids(&request.services, "service")?;
        let areas = Self::parse_ids(&request.areas, "apartment")?;

        for id in &services {
            if self.catalog_repo.find_by_id(id).await?.is_none() {
                return Err(ServiceError::InvalidInput(format!("Unknown service: {}", id)));
            }
        }
        if !areas.is_empty() {
            let found: HashSet<ObjectId> = self
                .apartment_repo
                .find_many(&areas)
                .await?
                .into_iter()
                .filter_map(|a| a.id)
                .collect();
            if let Some(missing) = areas.iter().find(|id| !found.contains(id)) {
                return Err(ServiceError::InvalidInput(format!("Unknown apartment: {}", missing)));
            }
        }
        Ok((services, areas))
    }

    async fn build_worker(&self, request: WorkerRequest, existing: Option<&Worker>) -> Result<Worker, ServiceError> {
        let (services, areas) = self.resolve_references(&request).await?;
        Ok(Worker {
            id: existing.and_then(|w| w.id),
            name: request.name.trim().to_string(),
            phone: request.phone.trim().to_string(),
            email: request.email,
            services,
            specializations: request.specializations,
            areas,
            rating: existing.map(|w| w.rating).unwrap_or_default(),
            total_ratings: existing.map(|w| w.total_ratings).unwrap_or_default(),
            completed_jobs: existing.map(|w| w.completed_jobs).unwrap_or_default(),
            is_active: request.is_active.unwrap_or(true),
            created_at: existing.and_then(|w| w.created_at.clone()),
            updated_at: None,
        })
    }

    async fn view(&self, worker: Worker) -> Result<WorkerView, ServiceError> {
        let mut service_details = Vec::with_capacity(worker.services.len());
        for id in &worker.services {
            match self.catalog_repo.find_by_id(id).await? {
                Some(entry) => service_details.push(ServiceRef { id: *id, name: entry.name }),
                None => warn!(service = %id, "Worker references a missing service"),
            }
        }
        let area_details = if worker.areas.is_empty() {
            Vec::new()
        } else {
            self.apartment_repo
                .find_many(&worker.areas)
                .await?
                .iter()
                .filter_map(ApartmentRef::of)
                .collect()
        };
        Ok(WorkerView { worker, service_details, area_details })
    }
}

#[async_trait]
impl DirectoryService for DirectoryServiceImpl {
    async fn available_apartments(&self, query: AvailableApartmentsQuery) -> Result<Vec<Apartment>, ServiceError> {
        let area = query.area.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let pincode = query.pincode.as_deref().map(str::trim).filter(|s| !s.is_empty());
        Ok(self.apartment_repo.list_available(area, pincode).await?)
    }

    async fn get_apartment(&self, id: ObjectId) -> Result<Apartment, ServiceError> {
        self.apartment_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Apartment not found".to_string()))
    }

    async fn areas(&self) -> Result<Vec<String>, ServiceError> {
        let mut areas = self.apartment_repo.distinct_areas().await?;
        areas.sort();
        Ok(areas)
    }

    async fn pincodes(&self, area: &str) -> Result<Vec<String>, ServiceError> {
        let mut pincodes = self.apartment_repo.pincodes_for_area(area.trim()).await?;
        pincodes.sort();
        Ok(pincodes)
    }

    async fn list_apartments(&self, query: PageQuery) -> Result<ApartmentPage, ServiceError> {
        let (page, limit) = query.resolve(ADMIN_PAGE_SIZE);
        let (apartments, total) = self.apartment_repo.list(query.search.as_deref(), page, limit).await?;
        Ok(ApartmentPage { apartments, pagination: Pagination::new(total, page, limit) })
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_apartment(&self, request: ApartmentRequest) -> Result<Apartment, ServiceError> {
        Self::check_apartment(&request)?;
        let apartment = self.apartment_repo.insert(request.into_apartment(None)).await?;
        info!("Apartment created");
        Ok(apartment)
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_apartment(&self, id: ObjectId, request: ApartmentRequest) -> Result<Apartment, ServiceError> {
        Self::check_apartment(&request)?;
        let existing = self.get_apartment(id).await?;
        let apartment = self.apartment_repo.update(&id, request.into_apartment(Some(&existing))).await?;
        info!("Apartment updated");
        Ok(apartment)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_apartment(&self, id: ObjectId) -> Result<(), ServiceError> {
        self.apartment_repo.delete(&id).await?;
        info!("Apartment deleted");
        Ok(())
    }

    async fn list_workers(&self, query: PageQuery) -> Result<WorkerPage, ServiceError> {
        let (page, limit) = query.resolve(ADMIN_PAGE_SIZE);
        let search = query.search.clone().filter(|s| !s.trim().is_empty());
        let serving_any = match search.as_deref() {
            Some(term) => self
                .apartment_repo
                .list(Some(term), 1, MAX_PAGE_SIZE)
                .await?
                .0
                .into_iter()
                .filter_map(|a| a.id)
                .collect(),
            None => Vec::new(),
        };
        let (workers, total) = self
            .worker_repo
            .list(&WorkerQuery { search, serving_any }, page, limit)
            .await?;
        let mut views = Vec::with_capacity(workers.len());
        for worker in workers {
            views.push(self.view(worker).await?);
        }
        Ok(WorkerPage { workers: views, pagination: Pagination::new(total, page, limit) })
    }

    async fn get_worker(&self, id: ObjectId) -> Result<WorkerView, ServiceError> {
        let worker = self
            .worker_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Worker not found".to_string()))?;
        self.view(worker).await
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_worker(&self, request: WorkerRequest) -> Result<WorkerView, ServiceError> {
        let worker = self.build_worker(request, None).await?;
        let worker = self.worker_repo.insert(worker).await?;
        info!("Worker created");
        self.view(worker).await
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_worker(&self, id: ObjectId, request: WorkerRequest) -> Result<WorkerView, ServiceError> {
        let existing = self
            .worker_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Worker not found".to_string()))?;
        let worker = self.build_worker(request, Some(&existing)).await?;
        let worker = self.worker_repo.update(&id, worker).await?;
        info!("Worker updated");
        self.view(worker).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_worker(&self, id: ObjectId) -> Result<(), ServiceError> {
        self.worker_repo.delete(&id).await?;
        info!("Worker deleted");
        Ok(())
    }
}
