use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{info, instrument};

use crate::dto::admin_dto::{AdminUserUpdate, DashboardCounts, DashboardStats, UserDetails, UserPage};
use crate::dto::pagination::{PageQuery, Pagination, MAX_PAGE_SIZE};
use crate::dto::user_dto::PublicUser;
use crate::model::order::OrderStatus;
use crate::model::user::{User, ROLE_USER};
use crate::repository::apartment_repo::ApartmentRepository;
use crate::repository::order_repo::OrderRepository;
use crate::repository::repository_error::RepositoryError;
use crate::repository::user_repo::{UserQuery, UserRepository};
use crate::repository::visitor_repo::VisitorRepository;
use crate::repository::worker_repo::WorkerRepository;
use crate::service::order_service::OrderServiceImpl;
use crate::util::error::ServiceError;

const RECENT_ORDERS: i64 = 5;
const USERS_PAGE_SIZE: u64 = 20;

#[async_trait]
pub trait AdminService: Send + Sync {
    async fn dashboard(&self) -> Result<DashboardStats, ServiceError>;
    async fn list_users(&self, query: PageQuery) -> Result<UserPage, ServiceError>;
    async fn user_details(&self, id: ObjectId) -> Result<UserDetails, ServiceError>;
    async fn update_user(&self, id: ObjectId, update: AdminUserUpdate) -> Result<PublicUser, ServiceError>;
    async fn delete_user(&self, id: ObjectId) -> Result<(), ServiceError>;
}

pub struct AdminServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub order_repo: Arc<dyn OrderRepository>,
    pub worker_repo: Arc<dyn WorkerRepository>,
    pub apartment_repo: Arc<dyn ApartmentRepository>,
    pub visitor_repo: Arc<dyn VisitorRepository>,
    pub orders: Arc<OrderServiceImpl>,
}

impl AdminServiceImpl {
    async fn find_user(&self, id: &ObjectId) -> Result<User, ServiceError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}

fn set_if_present(target: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        *target = Some(v.trim().to_string()).filter(|s| !s.is_empty());
    }
}

#[async_trait]
impl AdminService for AdminServiceImpl {
    #[instrument(skip(self))]
    async fn dashboard(&self) -> Result<DashboardStats, ServiceError> {
        let stats = DashboardCounts {
            total_users: self.user_repo.count_by_role(ROLE_USER).await?,
            total_workers: self.worker_repo.count().await?,
            total_orders: self.order_repo.count(None).await?,
            total_apartments: self.apartment_repo.count().await?,
            pending_orders: self.order_repo.count(Some(OrderStatus::Pending)).await?,
            total_unique_visitors: self.visitor_repo.total_unique_visitors().await?,
        };
        let mut recent_orders = Vec::new();
        for order in self.order_repo.recent(RECENT_ORDERS).await? {
            recent_orders.push(self.orders.admin_view(order).await?);
        }
        Ok(DashboardStats { stats, recent_orders })
    }

    async fn list_users(&self, query: PageQuery) -> Result<UserPage, ServiceError> {
        let (page, limit) = query.resolve(USERS_PAGE_SIZE);
        let filter = UserQuery { role: Some(ROLE_USER.to_string()), search: query.search };
        let (users, total) = self.user_repo.list(&filter, page, limit).await?;
        Ok(UserPage {
            users: users.into_iter().map(PublicUser::from).collect(),
            pagination: Pagination::new(total, page, limit),
        })
    }

    async fn user_details(&self, id: ObjectId) -> Result<UserDetails, ServiceError> {
        let user = self.find_user(&id).await?;
        let (orders, _) = self.order_repo.list_for_user(&id, 1, MAX_PAGE_SIZE).await?;
        Ok(UserDetails { user: PublicUser::from(user), orders })
    }

    #[instrument(skip(self, update), fields(id = %id))]
    async fn update_user(&self, id: ObjectId, update: AdminUserUpdate) -> Result<PublicUser, ServiceError> {
        let mut user = self.find_user(&id).await?;

        if let Some(email) = update.email {
            let email = email.trim().to_lowercase();
            if email.is_empty() {
                return Err(ServiceError::InvalidInput("Email cannot be empty".to_string()));
            }
            if let Some(other) = self.user_repo.find_by_email(&email).await? {
                if other.id != user.id {
                    return Err(ServiceError::Conflict("Email is already in use".to_string()));
                }
            }
            user.email = email;
        }
        if let Some(name) = update.full_name.filter(|n| !n.trim().is_empty()) {
            user.full_name = name.trim().to_string();
        }
        if let Some(phone) = update.phone {
            user.phone = phone.trim().to_string();
        }
        if let Some(verified) = update.is_verified {
            user.is_verified = verified;
        }
        set_if_present(&mut user.profile.apartment_name, update.apartment_name);
        set_if_present(&mut user.profile.flat_number, update.flat_number);
        set_if_present(&mut user.profile.area, update.area);
        set_if_present(&mut user.profile.landmark, update.landmark);
        set_if_present(&mut user.profile.pincode, update.pincode);
        if let Some(complete) = update.is_profile_complete {
            user.profile.is_profile_complete = complete;
        }

        let user = self.user_repo.update(id, user).await.map_err(|e| match e {
            RepositoryError::AlreadyExists(_) => ServiceError::Conflict("Email is already in use".to_string()),
            e => ServiceError::from(e),
        })?;
        info!("User updated by admin");
        Ok(PublicUser::from(user))
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_user(&self, id: ObjectId) -> Result<(), ServiceError> {
        self.find_user(&id).await?;
        if self.order_repo.count_active_for_user(&id).await? > 0 {
            return Err(ServiceError::InvalidInput("Cannot delete user with active orders".to_string()));
        }
        self.user_repo.delete(&id).await?;
        info!("User deleted by admin");
        Ok(())
    }
}
