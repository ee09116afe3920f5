#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;

use woostaa_backend::app::app::{build_router, Services};
use woostaa_backend::config::{AccountConfig, AppConfig, JwtConfig};
use woostaa_backend::model::apartment::Apartment;
use woostaa_backend::model::catalog::{CatalogEntry, PricingLine, ServiceKind};
use woostaa_backend::model::order::{Order, OrderStatus, PaymentStatus};
use woostaa_backend::model::user::{PageVisit, User, UserProfile, ROLE_ADMIN, ROLE_USER};
use woostaa_backend::model::visitor::Visit;
use woostaa_backend::model::worker::Worker;
use woostaa_backend::repository::apartment_repo::ApartmentRepository;
use woostaa_backend::repository::catalog_repo::CatalogRepository;
use woostaa_backend::repository::order_repo::OrderRepository;
use woostaa_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use woostaa_backend::repository::user_repo::{UserQuery, UserRepository};
use woostaa_backend::repository::visitor_repo::VisitorRepository;
use woostaa_backend::repository::worker_repo::{WorkerQuery, WorkerRepository};
use woostaa_backend::service::admin_service::AdminServiceImpl;
use woostaa_backend::service::catalog_service::CatalogServiceImpl;
use woostaa_backend::service::directory_service::DirectoryServiceImpl;
use woostaa_backend::service::order_service::OrderServiceImpl;
use woostaa_backend::service::user_service::UserServiceImpl;
use woostaa_backend::service::visitor_service::VisitorServiceImpl;
use woostaa_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use woostaa_backend::util::notification::{Notification, NotificationDispatcher, Notifier, NotifyError};
use woostaa_backend::util::password::{PasswordUtils, PasswordUtilsImpl};
use woostaa_backend::util::payment::{checkout_signature, PaymentError, PaymentGateway};

pub const TEST_PASSWORD: &str = "secret123";
pub const GATEWAY_SECRET: &str = "test_gateway_secret";

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

fn window<T: Clone>(items: &[T], page: u64, limit: u64) -> Vec<T> {
    let limit = limit.max(1) as usize;
    let skip = usize::try_from(page.max(1) - 1).unwrap_or(usize::MAX).saturating_mul(limit);
    items.iter().skip(skip).take(limit).cloned().collect()
}

fn now_string() -> Option<String> {
    Some(Utc::now().to_rfc3339())
}

// ---------------------------------------------------------------- users

#[derive(Default)]
pub struct InMemoryUsers {
    pub users: Mutex<Vec<User>>,
    /// Email lookups miss, as when a concurrent request inserts between lookup and write.
    pub stale_email_lookups: AtomicBool,
}

fn email_taken(users: &[User], email: &str, except: Option<ObjectId>) -> bool {
    users.iter().any(|u| u.email == email && u.id != except)
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        if email_taken(&users, &user.email, None) {
            return Err(RepositoryError::already_exists("Duplicate key: email"));
        }
        user.id = Some(ObjectId::new());
        user.created_at = now_string();
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: ObjectId, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        if email_taken(&users, &user.email, Some(id)) {
            return Err(RepositoryError::already_exists("Duplicate key: email"));
        }
        let slot = users
            .iter_mut()
            .find(|u| u.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("User not found"))?;
        user.id = Some(id);
        user.updated_at = now_string();
        // visit stats are only written by record_visit
        user.visit_stats = slot.visit_stats.clone();
        *slot = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        self.users.lock().unwrap().retain(|u| u.id != Some(*id));
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        if self.stale_email_lookups.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == Some(*id)).cloned())
    }

    async fn find_by_verification_token(&self, token: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.password_reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn list(&self, query: &UserQuery, page: u64, limit: u64) -> RepositoryResult<(Vec<User>, u64)> {
        let users = self.users.lock().unwrap();
        let matching: Vec<User> = users
            .iter()
            .rev()
            .filter(|u| query.role.as_deref().map_or(true, |r| u.role == r))
            .filter(|u| {
                query.search.as_deref().map_or(true, |s| {
                    contains_ci(&u.full_name, s) || contains_ci(&u.email, s) || contains_ci(&u.phone, s)
                })
            })
            .cloned()
            .collect();
        Ok((window(&matching, page, limit), matching.len() as u64))
    }

    async fn count_by_role(&self, role: &str) -> RepositoryResult<u64> {
        Ok(self.users.lock().unwrap().iter().filter(|u| u.role == role).count() as u64)
    }

    async fn record_visit(&self, id: &ObjectId, visit: PageVisit, history_limit: i32) -> RepositoryResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == Some(*id)) {
            let stats = &mut user.visit_stats;
            stats.total_visits += 1;
            stats.last_visit = Some(visit.timestamp);
            stats.visit_history.push(visit);
            let excess = stats.visit_history.len().saturating_sub(history_limit as usize);
            stats.visit_history.drain(..excess);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------- orders

#[derive(Default)]
pub struct InMemoryOrders {
    pub orders: Mutex<Vec<Order>>,
    sequence: AtomicI64,
}

impl InMemoryOrders {
    pub fn all(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }

    fn modify(&self, id: &ObjectId, f: impl FnOnce(&mut Order)) -> RepositoryResult<Order> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == Some(*id))
            .ok_or_else(|| RepositoryError::not_found("Order not found"))?;
        f(order);
        order.updated_at = now_string();
        Ok(order.clone())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn next_sequence(&self) -> RepositoryResult<i64> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn insert(&self, mut order: Order) -> RepositoryResult<Order> {
        let mut orders = self.orders.lock().unwrap();
        if orders.iter().any(|o| o.order_number == order.order_number) {
            return Err(RepositoryError::already_exists("Duplicate order number"));
        }
        order.id = Some(ObjectId::new());
        order.created_at = now_string();
        orders.push(order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Order>> {
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == Some(*id)).cloned())
    }

    async fn find_for_user(&self, id: &ObjectId, user: &ObjectId) -> RepositoryResult<Option<Order>> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == Some(*id) && o.user == *user)
            .cloned())
    }

    async fn list_for_user(&self, user: &ObjectId, page: u64, limit: u64) -> RepositoryResult<(Vec<Order>, u64)> {
        let orders = self.orders.lock().unwrap();
        let mine: Vec<Order> = orders.iter().rev().filter(|o| o.user == *user).cloned().collect();
        Ok((window(&mine, page, limit), mine.len() as u64))
    }

    async fn list(&self, status: Option<OrderStatus>, page: u64, limit: u64) -> RepositoryResult<(Vec<Order>, u64)> {
        let orders = self.orders.lock().unwrap();
        let matching: Vec<Order> = orders
            .iter()
            .rev()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        Ok((window(&matching, page, limit), matching.len() as u64))
    }

    async fn recent(&self, limit: i64) -> RepositoryResult<Vec<Order>> {
        let orders = self.orders.lock().unwrap();
        Ok(orders.iter().rev().take(limit.max(0) as usize).cloned().collect())
    }

    async fn count(&self, status: Option<OrderStatus>) -> RepositoryResult<u64> {
        let orders = self.orders.lock().unwrap();
        Ok(orders.iter().filter(|o| status.map_or(true, |s| o.status == s)).count() as u64)
    }

    async fn count_active_for_user(&self, user: &ObjectId) -> RepositoryResult<u64> {
        let orders = self.orders.lock().unwrap();
        Ok(orders.iter().filter(|o| o.user == *user && o.status.is_active()).count() as u64)
    }

    async fn update_status(&self, id: &ObjectId, status: OrderStatus, notes: Option<String>) -> RepositoryResult<Order> {
        self.modify(id, |order| {
            order.status = status;
            if notes.is_some() {
                order.admin_notes = notes;
            }
        })
    }

    async fn mark_paid(&self, id: &ObjectId, payment_id: &str) -> RepositoryResult<Order> {
        self.modify(id, |order| {
            order.payment_status = PaymentStatus::Completed;
            order.payment_id = Some(payment_id.to_string());
            order.status = OrderStatus::Confirmed;
        })
    }
}

// ---------------------------------------------------------------- catalog

#[derive(Default)]
pub struct InMemoryCatalog {
    pub entries: Mutex<Vec<CatalogEntry>>,
}

impl InMemoryCatalog {
    pub fn all(&self) -> Vec<CatalogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn insert(&self, mut entry: CatalogEntry) -> RepositoryResult<CatalogEntry> {
        entry.id = Some(ObjectId::new());
        entry.created_at = now_string();
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<CatalogEntry>> {
        Ok(self.entries.lock().unwrap().iter().find(|e| e.id == Some(*id)).cloned())
    }

    async fn find_first_by_kind(&self, kind: ServiceKind) -> RepositoryResult<Option<CatalogEntry>> {
        Ok(self.entries.lock().unwrap().iter().find(|e| e.kind == kind).cloned())
    }

    async fn list(&self, active_only: bool) -> RepositoryResult<Vec<CatalogEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.iter().filter(|e| !active_only || e.is_active).cloned().collect())
    }

    async fn update(&self, id: &ObjectId, mut entry: CatalogEntry) -> RepositoryResult<CatalogEntry> {
        let mut entries = self.entries.lock().unwrap();
        let slot = entries
            .iter_mut()
            .find(|e| e.id == Some(*id))
            .ok_or_else(|| RepositoryError::not_found("Service not found"))?;
        entry.id = Some(*id);
        *slot = entry.clone();
        Ok(entry)
    }

    async fn set_active(&self, id: &ObjectId, active: bool) -> RepositoryResult<()> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == Some(*id))
            .ok_or_else(|| RepositoryError::not_found("Service not found"))?;
        entry.is_active = active;
        Ok(())
    }

    async fn replace_pricing(&self, id: &ObjectId, pricing: Vec<PricingLine>) -> RepositoryResult<()> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == Some(*id))
            .ok_or_else(|| RepositoryError::not_found("Service not found"))?;
        entry.pricing = pricing;
        Ok(())
    }
}

// ---------------------------------------------------------------- apartments

#[derive(Default)]
pub struct InMemoryApartments {
    pub apartments: Mutex<Vec<Apartment>>,
}

#[async_trait]
impl ApartmentRepository for InMemoryApartments {
    async fn insert(&self, mut apartment: Apartment) -> RepositoryResult<Apartment> {
        apartment.id = Some(ObjectId::new());
        apartment.created_at = now_string();
        self.apartments.lock().unwrap().push(apartment.clone());
        Ok(apartment)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Apartment>> {
        Ok(self.apartments.lock().unwrap().iter().find(|a| a.id == Some(*id)).cloned())
    }

    async fn find_many(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Apartment>> {
        let apartments = self.apartments.lock().unwrap();
        Ok(apartments.iter().filter(|a| a.id.map_or(false, |id| ids.contains(&id))).cloned().collect())
    }

    async fn update(&self, id: &ObjectId, mut apartment: Apartment) -> RepositoryResult<Apartment> {
        let mut apartments = self.apartments.lock().unwrap();
        let slot = apartments
            .iter_mut()
            .find(|a| a.id == Some(*id))
            .ok_or_else(|| RepositoryError::not_found("Apartment not found"))?;
        apartment.id = Some(*id);
        *slot = apartment.clone();
        Ok(apartment)
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let mut apartments = self.apartments.lock().unwrap();
        let before = apartments.len();
        apartments.retain(|a| a.id != Some(*id));
        if apartments.len() == before {
            return Err(RepositoryError::not_found("Apartment not found"));
        }
        Ok(())
    }

    async fn list(&self, search: Option<&str>, page: u64, limit: u64) -> RepositoryResult<(Vec<Apartment>, u64)> {
        let apartments = self.apartments.lock().unwrap();
        let matching: Vec<Apartment> = apartments
            .iter()
            .filter(|a| {
                search.filter(|s| !s.trim().is_empty()).map_or(true, |s| {
                    contains_ci(&a.name, s) || contains_ci(&a.area, s) || contains_ci(&a.pincode, s)
                })
            })
            .cloned()
            .collect();
        Ok((window(&matching, page, limit), matching.len() as u64))
    }

    async fn list_available(&self, area: Option<&str>, pincode: Option<&str>) -> RepositoryResult<Vec<Apartment>> {
        let apartments = self.apartments.lock().unwrap();
        let mut matching: Vec<Apartment> = apartments
            .iter()
            .filter(|a| a.is_active)
            .filter(|a| area.filter(|s| !s.trim().is_empty()).map_or(true, |s| a.area.eq_ignore_ascii_case(s.trim())))
            .filter(|a| pincode.filter(|p| !p.trim().is_empty()).map_or(true, |p| a.pincode == p.trim()))
            .cloned()
            .collect();
        matching.sort_by(|a, b| (&a.area, &a.name).cmp(&(&b.area, &b.name)));
        Ok(matching)
    }

    async fn distinct_areas(&self) -> RepositoryResult<Vec<String>> {
        let apartments = self.apartments.lock().unwrap();
        let mut areas: Vec<String> = apartments.iter().filter(|a| a.is_active).map(|a| a.area.clone()).collect();
        areas.sort();
        areas.dedup();
        Ok(areas)
    }

    async fn pincodes_for_area(&self, area: &str) -> RepositoryResult<Vec<String>> {
        let apartments = self.apartments.lock().unwrap();
        let mut pincodes: Vec<String> = apartments
            .iter()
            .filter(|a| a.is_active && a.area.eq_ignore_ascii_case(area))
            .map(|a| a.pincode.clone())
            .collect();
        pincodes.sort();
        pincodes.dedup();
        Ok(pincodes)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.apartments.lock().unwrap().len() as u64)
    }
}

// ---------------------------------------------------------------- workers

#[derive(Default)]
pub struct InMemoryWorkers {
    pub workers: Mutex<Vec<Worker>>,
}

#[async_trait]
impl WorkerRepository for InMemoryWorkers {
    async fn insert(&self, mut worker: Worker) -> RepositoryResult<Worker> {
        worker.id = Some(ObjectId::new());
        worker.created_at = now_string();
        self.workers.lock().unwrap().push(worker.clone());
        Ok(worker)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Worker>> {
        Ok(self.workers.lock().unwrap().iter().find(|w| w.id == Some(*id)).cloned())
    }

    async fn update(&self, id: &ObjectId, mut worker: Worker) -> RepositoryResult<Worker> {
        let mut workers = self.workers.lock().unwrap();
        let slot = workers
            .iter_mut()
            .find(|w| w.id == Some(*id))
            .ok_or_else(|| RepositoryError::not_found("Worker not found"))?;
        worker.id = Some(*id);
        *slot = worker.clone();
        Ok(worker)
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let mut workers = self.workers.lock().unwrap();
        let before = workers.len();
        workers.retain(|w| w.id != Some(*id));
        if workers.len() == before {
            return Err(RepositoryError::not_found("Worker not found"));
        }
        Ok(())
    }

    async fn list(&self, query: &WorkerQuery, page: u64, limit: u64) -> RepositoryResult<(Vec<Worker>, u64)> {
        let workers = self.workers.lock().unwrap();
        let matching: Vec<Worker> = workers
            .iter()
            .rev()
            .filter(|w| match query.search.as_deref().filter(|s| !s.trim().is_empty()) {
                None => true,
                Some(s) => {
                    contains_ci(&w.name, s)
                        || contains_ci(&w.phone, s)
                        || w.areas.iter().any(|a| query.serving_any.contains(a))
                }
            })
            .cloned()
            .collect();
        Ok((window(&matching, page, limit), matching.len() as u64))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.workers.lock().unwrap().len() as u64)
    }
}

// ---------------------------------------------------------------- visitors

#[derive(Default)]
pub struct InMemoryVisitors {
    pub visits: Mutex<Vec<(String, Visit, Option<ObjectId>)>>,
    pub unique: AtomicI64,
}

#[async_trait]
impl VisitorRepository for InMemoryVisitors {
    async fn record_visit(&self, visitor_id: &str, visit: Visit, user: Option<ObjectId>, _history_limit: i32) -> RepositoryResult<bool> {
        let mut visits = self.visits.lock().unwrap();
        let is_new = !visits.iter().any(|(id, _, _)| id == visitor_id);
        visits.push((visitor_id.to_string(), visit, user));
        Ok(is_new)
    }

    async fn increment_unique_visitors(&self) -> RepositoryResult<()> {
        self.unique.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn total_unique_visitors(&self) -> RepositoryResult<i64> {
        Ok(self.unique.load(Ordering::SeqCst))
    }
}

// ---------------------------------------------------------------- notifiers

#[derive(Default)]
pub struct RecordingNotifier {
    pub delivered: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }

    /// Waits until at least `count` notifications went through the worker.
    pub async fn wait_for(&self, count: usize) -> Vec<Notification> {
        for _ in 0..100 {
            if self.delivered.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.delivered()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn deliver(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError("SMTP connection refused".to_string()))
    }
}

// ---------------------------------------------------------------- gateway

pub struct FakeGateway {
    pub fail: bool,
    pub created: Mutex<Vec<(i64, String, String)>>,
}

impl FakeGateway {
    pub fn working() -> Self {
        FakeGateway { fail: false, created: Mutex::new(Vec::new()) }
    }

    pub fn failing() -> Self {
        FakeGateway { fail: true, created: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, amount_minor: i64, currency: &str, receipt: &str) -> Result<String, PaymentError> {
        if self.fail {
            return Err(PaymentError::Rejected { status: 502, body: "gateway down".to_string() });
        }
        self.created
            .lock()
            .unwrap()
            .push((amount_minor, currency.to_string(), receipt.to_string()));
        Ok(format!("order_fake{}", self.created.lock().unwrap().len()))
    }

    fn verify_signature(&self, gateway_order_id: &str, payment_id: &str, signature: &str) -> bool {
        checkout_signature(GATEWAY_SECRET, gateway_order_id, payment_id).as_deref() == Some(signature)
    }

    fn currency(&self) -> &str {
        "INR"
    }
}

// ---------------------------------------------------------------- wiring

pub struct TestContext {
    pub users: Arc<InMemoryUsers>,
    pub orders: Arc<InMemoryOrders>,
    pub catalog: Arc<InMemoryCatalog>,
    pub apartments: Arc<InMemoryApartments>,
    pub workers: Arc<InMemoryWorkers>,
    pub visitors: Arc<InMemoryVisitors>,
    pub services: Services,
}

pub struct ContextOptions {
    pub notifier: Arc<dyn Notifier>,
    pub gateway: Option<Arc<dyn PaymentGateway>>,
    pub operator_email: Option<String>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        ContextOptions {
            notifier: Arc::new(RecordingNotifier::default()),
            gateway: None,
            operator_email: Some("ops@woostaa.test".to_string()),
        }
    }
}

pub fn test_app_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        base_url: "https://woostaa.test".to_string(),
        import_legacy_catalog: false,
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with(ContextOptions::default())
    }

    pub fn with(options: ContextOptions) -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let orders = Arc::new(InMemoryOrders::default());
        let catalog = Arc::new(InMemoryCatalog::default());
        let apartments = Arc::new(InMemoryApartments::default());
        let workers = Arc::new(InMemoryWorkers::default());
        let visitors = Arc::new(InMemoryVisitors::default());

        let notifications = NotificationDispatcher::spawn(options.notifier, 64);
        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()));

        let user_service = Arc::new(UserServiceImpl::new(
            users.clone(),
            jwt_utils.clone(),
            notifications.clone(),
            test_app_config(),
            AccountConfig::default(),
        ));
        let order_service = Arc::new(OrderServiceImpl::new(
            orders.clone(),
            users.clone(),
            catalog.clone(),
            notifications,
            options.gateway,
            options.operator_email,
        ));
        let catalog_service = Arc::new(CatalogServiceImpl::new(catalog.clone()));
        let directory_service = Arc::new(DirectoryServiceImpl::new(
            apartments.clone(),
            workers.clone(),
            catalog.clone(),
        ));
        let admin_service = Arc::new(AdminServiceImpl {
            user_repo: users.clone(),
            order_repo: orders.clone(),
            worker_repo: workers.clone(),
            apartment_repo: apartments.clone(),
            visitor_repo: visitors.clone(),
            orders: order_service.clone(),
        });
        let visitor_service = Arc::new(VisitorServiceImpl::new(visitors.clone(), users.clone()));

        let services = Services {
            user_service,
            order_service,
            catalog_service,
            directory_service,
            admin_service,
            visitor_service,
            jwt_utils,
            user_repo: users.clone(),
        };
        TestContext { users, orders, catalog, apartments, workers, visitors, services }
    }

    pub fn router(&self) -> axum::Router {
        build_router(&self.services)
    }

    pub async fn add_user(&self, email: &str, phone: &str, profile_complete: bool) -> User {
        let user = User {
            email: email.to_string(),
            password_hash: PasswordUtilsImpl::hash_password(TEST_PASSWORD).unwrap(),
            full_name: "Asha Rao".to_string(),
            phone: phone.to_string(),
            is_verified: true,
            role: ROLE_USER.to_string(),
            profile: UserProfile {
                apartment_name: Some("Prestige Lakeside".to_string()),
                flat_number: Some("B-1204".to_string()),
                area: Some("Whitefield".to_string()),
                landmark: None,
                pincode: Some("560066".to_string()),
                is_profile_complete: profile_complete,
                ..Default::default()
            },
            ..Default::default()
        };
        self.users.insert(user).await.unwrap()
    }

    pub async fn add_customer(&self) -> User {
        self.add_user("asha@example.com", "9876543210", true).await
    }

    pub async fn add_admin(&self) -> User {
        let admin = User {
            email: "admin@woostaa.test".to_string(),
            password_hash: PasswordUtilsImpl::hash_password(TEST_PASSWORD).unwrap(),
            full_name: "Ops Admin".to_string(),
            phone: "9000000000".to_string(),
            is_verified: true,
            role: ROLE_ADMIN.to_string(),
            profile: UserProfile { is_profile_complete: true, ..Default::default() },
            ..Default::default()
        };
        self.users.insert(admin).await.unwrap()
    }

    pub async fn add_service(&self, kind: ServiceKind, base_price: Option<f64>) -> CatalogEntry {
        let mut entry = CatalogEntry::empty(kind);
        entry.base_price = base_price;
        self.catalog.insert(entry).await.unwrap()
    }

    pub fn access_token(&self, user: &User) -> String {
        self.services
            .jwt_utils
            .generate_token_pair(&user.id.unwrap().to_hex(), &user.email, &user.role)
            .unwrap()
            .access_token
    }
}
