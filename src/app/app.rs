use axum::{Router, routing::get};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::admin_user_conf::AdminUserConfig;
use crate::config::{AccountConfig, AppConfig, EmailConfig, JwtConfig, MongoConfig, PaymentConfig};
use crate::middlewares::auth_middleware::AuthState;
use crate::middlewares::visitor_middleware::{track_visits, VisitorState};
use crate::repository::apartment_repo::{ApartmentRepository, MongoApartmentRepository};
use crate::repository::catalog_repo::{CatalogRepository, MongoCatalogRepository};
use crate::repository::mongo;
use crate::repository::order_repo::{MongoOrderRepository, OrderRepository};
use crate::repository::user_repo::{UserRepository, UserRepositoryImpl};
use crate::repository::visitor_repo::{MongoVisitorRepository, VisitorRepository};
use crate::repository::worker_repo::{MongoWorkerRepository, WorkerRepository};
use crate::router::admin_router::admin_router;
use crate::router::catalog_router::catalog_router;
use crate::router::directory_router::directory_router;
use crate::router::order_router::order_router;
use crate::router::user_router::user_router;
use crate::service::admin_service::AdminServiceImpl;
use crate::service::catalog_service::CatalogServiceImpl;
use crate::service::directory_service::DirectoryServiceImpl;
use crate::service::order_service::OrderServiceImpl;
use crate::service::user_service::UserServiceImpl;
use crate::service::visitor_service::{VisitorService, VisitorServiceImpl};
use crate::util::email::SmtpEmailService;
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::notification::{LogOnlyNotifier, NotificationDispatcher, Notifier};
use crate::util::payment::{PaymentGateway, RazorpayGateway};

const NOTIFICATION_QUEUE_SIZE: usize = 256;

/// Every service the HTTP surface needs, already wired to its repositories.
pub struct Services {
    pub user_service: Arc<UserServiceImpl>,
    pub order_service: Arc<OrderServiceImpl>,
    pub catalog_service: Arc<CatalogServiceImpl>,
    pub directory_service: Arc<DirectoryServiceImpl>,
    pub admin_service: Arc<AdminServiceImpl>,
    pub visitor_service: Arc<dyn VisitorService>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    /// Auth layers reload the account behind each token.
    pub user_repo: Arc<dyn UserRepository>,
}

pub fn build_router(services: &Services) -> Router {
    let auth_state = Arc::new(AuthState {
        jwt_utils: services.jwt_utils.clone(),
        user_repo: services.user_repo.clone(),
    });
    let visitor_state = Arc::new(VisitorState {
        visitor_service: services.visitor_service.clone(),
        jwt_utils: services.jwt_utils.clone(),
    });

    Router::new()
        .merge(user_router(services.user_service.clone(), auth_state.clone()))
        .merge(order_router(services.order_service.clone(), auth_state.clone()))
        .merge(catalog_router(services.catalog_service.clone(), auth_state.clone()))
        .merge(directory_router(services.directory_service.clone(), auth_state.clone()))
        .merge(admin_router(services.admin_service.clone(), auth_state))
        .route("/health", get(|| async { "OK" }))
        .layer(axum::middleware::from_fn_with_state(visitor_state, track_visits))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub struct App {
    config: AppConfig,
    router: Router,
    pub services: Services,
}

impl App {
    pub async fn new() -> Result<Self, Box<dyn Error>> {
        let config = AppConfig::from_env();
        let jwt_config = JwtConfig::from_env()?;
        let mongo_config = MongoConfig::from_env()?;
        let account_config = AccountConfig::from_env()?;

        let db = mongo::connect(&mongo_config).await?;
        info!("✅ Connected to MongoDB database {}", mongo_config.database);

        let order_store = MongoOrderRepository::new(&db);
        order_store.ensure_indexes().await?;
        let catalog_store = MongoCatalogRepository::new(&db);
        if config.import_legacy_catalog {
            let imported = catalog_store.import_legacy().await?;
            info!("📦 Imported {} legacy catalog entries", imported);
        }

        let user_store = UserRepositoryImpl::new(&db);
        user_store.ensure_indexes().await?;
        let visitor_store = MongoVisitorRepository::new(&db);
        visitor_store.ensure_indexes().await?;

        let user_repo: Arc<dyn UserRepository> = Arc::new(user_store);
        let order_repo: Arc<dyn OrderRepository> = Arc::new(order_store);
        let catalog_repo: Arc<dyn CatalogRepository> = Arc::new(catalog_store);
        let apartment_repo: Arc<dyn ApartmentRepository> = Arc::new(MongoApartmentRepository::new(&db));
        let worker_repo: Arc<dyn WorkerRepository> = Arc::new(MongoWorkerRepository::new(&db));
        let visitor_repo: Arc<dyn VisitorRepository> = Arc::new(visitor_store);

        let (notifier, operator_email) = Self::notifier();
        let notifications = NotificationDispatcher::spawn(notifier, NOTIFICATION_QUEUE_SIZE);
        let gateway = Self::payment_gateway();

        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let user_service = Arc::new(UserServiceImpl::new(
            user_repo.clone(),
            jwt_utils.clone(),
            notifications.clone(),
            config.clone(),
            account_config,
        ));
        let order_service = Arc::new(OrderServiceImpl::new(
            order_repo.clone(),
            user_repo.clone(),
            catalog_repo.clone(),
            notifications,
            gateway,
            operator_email,
        ));
        let catalog_service = Arc::new(CatalogServiceImpl::new(catalog_repo.clone()));
        let directory_service = Arc::new(DirectoryServiceImpl::new(
            apartment_repo.clone(),
            worker_repo.clone(),
            catalog_repo,
        ));
        let admin_service = Arc::new(AdminServiceImpl {
            user_repo: user_repo.clone(),
            order_repo,
            worker_repo,
            apartment_repo,
            visitor_repo: visitor_repo.clone(),
            orders: order_service.clone(),
        });
        let visitor_service: Arc<dyn VisitorService> = Arc::new(VisitorServiceImpl::new(visitor_repo, user_repo.clone()));

        let services = Services {
            user_service,
            order_service,
            catalog_service,
            directory_service,
            admin_service,
            visitor_service,
            jwt_utils,
            user_repo,
        };
        let router = build_router(&services);
        let app = App { config, router, services };
        app.create_first_admin_user().await;
        Ok(app)
    }

    /// SMTP when configured, otherwise notifications are only logged.
    fn notifier() -> (Arc<dyn Notifier>, Option<String>) {
        let email_config = match EmailConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("⚠️ Email disabled, notifications will only be logged: {}", e);
                return (Arc::new(LogOnlyNotifier), None);
            }
        };
        let operator_email = email_config.admin_email.clone();
        match SmtpEmailService::new(email_config) {
            Ok(smtp) => (Arc::new(smtp), operator_email),
            Err(e) => {
                error!("Failed to set up SMTP transport: {}", e);
                (Arc::new(LogOnlyNotifier), operator_email)
            }
        }
    }

    fn payment_gateway() -> Option<Arc<dyn PaymentGateway>> {
        let config = match PaymentConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("⚠️ Payment gateway disabled: {}", e);
                return None;
            }
        };
        match RazorpayGateway::new(config) {
            Ok(gateway) => Some(Arc::new(gateway)),
            Err(e) => {
                error!("Failed to set up payment gateway: {}", e);
                None
            }
        }
    }

    pub async fn start(self) -> Result<(), Box<dyn Error>> {
        let addr = SocketAddr::new(self.config.host.parse()?, self.config.port);
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router.into_make_service_with_connect_info::<SocketAddr>()).await?;
        Ok(())
    }

    async fn create_first_admin_user(&self) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Admin user config not loaded: {e}");
                return;
            }
        };
        match self.services.user_service.ensure_admin(&admin_conf).await {
            Ok(true) => info!("First admin user created."),
            Ok(false) => info!("Admin user already exists, skipping creation."),
            Err(e) => error!("Failed to create admin user: {e}"),
        }
    }
}
