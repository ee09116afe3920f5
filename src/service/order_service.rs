use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::dto::order_dto::{
    AdminOrderQuery, AdminOrderView, CreateOrderRequest, CreateOrderResponse, CreatedOrder, CustomerSummary, OrderPage,
    UpdateOrderStatusRequest, VerifyPaymentRequest,
};
use crate::dto::pagination::{PageQuery, Pagination};
use crate::model::order::{Order, OrderAddress, OrderStatus, PaymentMethod, PaymentStatus};
use crate::model::user::User;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::order_repo::OrderRepository;
use crate::repository::user_repo::UserRepository;
use crate::service::pricing::{self, PricingError};
use crate::util::error::{Requirements, ServiceError};
use crate::util::notification::{Notification, NotificationDispatcher, OrderSummary};
use crate::util::payment::PaymentGateway;

pub const UNKNOWN_SERVICE: &str = "Unknown Service";
const MY_ORDERS_PAGE_SIZE: u64 = 10;
const ADMIN_ORDERS_PAGE_SIZE: u64 = 20;

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, user_id: ObjectId, request: CreateOrderRequest) -> Result<CreateOrderResponse, ServiceError>;
    async fn my_orders(&self, user_id: ObjectId, query: PageQuery) -> Result<OrderPage<Order>, ServiceError>;
    async fn get_order(&self, user_id: ObjectId, order_id: ObjectId) -> Result<Order, ServiceError>;
    async fn cancel_order(&self, user_id: ObjectId, order_id: ObjectId) -> Result<Order, ServiceError>;
    async fn verify_payment(&self, user_id: ObjectId, request: VerifyPaymentRequest) -> Result<Order, ServiceError>;
    async fn list_all(&self, query: AdminOrderQuery) -> Result<OrderPage<AdminOrderView>, ServiceError>;
    async fn order_details(&self, order_id: ObjectId) -> Result<AdminOrderView, ServiceError>;
    async fn update_status(&self, order_id: ObjectId, request: UpdateOrderStatusRequest) -> Result<Order, ServiceError>;
}

pub struct OrderServiceImpl {
    pub order_repo: Arc<dyn OrderRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub catalog_repo: Arc<dyn CatalogRepository>,
    pub notifications: NotificationDispatcher,
    /// Absent when no gateway credentials are configured.
    pub gateway: Option<Arc<dyn PaymentGateway>>,
    /// Receives the operator copy of every new order.
    pub operator_email: Option<String>,
}

impl OrderServiceImpl {
    pub fn new(
        order_repo: Arc<dyn OrderRepository>,
        user_repo: Arc<dyn UserRepository>,
        catalog_repo: Arc<dyn CatalogRepository>,
        notifications: NotificationDispatcher,
        gateway: Option<Arc<dyn PaymentGateway>>,
        operator_email: Option<String>,
    ) -> Self {
        Self { order_repo, user_repo, catalog_repo, notifications, gateway, operator_email }
    }

    /// Phone first, then profile. Both flags are reported when the phone is
    /// missing and the profile is incomplete.
    fn check_eligibility(user: &User) -> Result<(), ServiceError> {
        let needs_profile = !user.profile.is_profile_complete;
        if !user.has_phone() {
            return Err(ServiceError::unmet(
                "Phone number is required to place an order. Please update your profile.",
                Requirements { needs_phone: true, needs_profile, ..Default::default() },
            ));
        }
        if needs_profile {
            return Err(ServiceError::unmet(
                "Please complete your profile before placing an order.",
                Requirements { needs_profile: true, ..Default::default() },
            ));
        }
        Ok(())
    }

    /// Best effort. Any failure leaves the order without a gateway id.
    async fn open_gateway_order(&self, method: PaymentMethod, amount: f64, receipt: &str) -> Option<String> {
        if !method.is_online() {
            return None;
        }
        let Some(gateway) = self.gateway.as_ref() else {
            warn!("Online payment requested but no gateway is configured");
            return None;
        };
        match gateway
            .create_order(pricing::to_minor_units(amount), gateway.currency(), receipt)
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                error!("Gateway order creation failed: {}", e);
                None
            }
        }
    }

    fn notify_order_placed(&self, order: &Order, user: &User, service_name: &str) {
        let summary = OrderSummary {
            order_number: order.order_number.clone(),
            service_name: service_name.to_string(),
            customer_name: user.full_name.clone(),
            customer_email: user.email.clone(),
            customer_phone: user.phone.clone(),
            scheduled_date: order.scheduled_date.format("%Y-%m-%d").to_string(),
            scheduled_time: order.scheduled_time.clone(),
            total_amount: order.total_amount,
            payment_method: order.payment_method,
            address: order.address.clone(),
            special_instructions: order.special_instructions.clone(),
        };
        if let Some(operator) = self.operator_email.as_ref() {
            self.notifications.dispatch(Notification::OrderPlaced {
                to: operator.clone(),
                operator_copy: true,
                order: summary.clone(),
            });
        }
        self.notifications.dispatch(Notification::OrderPlaced {
            to: user.email.clone(),
            operator_copy: false,
            order: summary,
        });
    }

    async fn service_name(&self, service_id: &ObjectId) -> String {
        match self.catalog_repo.find_by_id(service_id).await {
            Ok(Some(entry)) => entry.name,
            Ok(None) => UNKNOWN_SERVICE.to_string(),
            Err(e) => {
                warn!("Could not resolve service name for {}: {}", service_id, e);
                UNKNOWN_SERVICE.to_string()
            }
        }
    }

    pub async fn admin_view(&self, order: Order) -> Result<AdminOrderView, ServiceError> {
        let service_name = self.service_name(&order.service).await;
        let customer = self.user_repo.find_by_id(&order.user).await?.map(|u| CustomerSummary {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            phone: u.phone,
            profile: u.profile,
        });
        Ok(AdminOrderView { order, service_name, customer })
    }
}

fn address_snapshot(user: &User) -> OrderAddress {
    let p = &user.profile;
    OrderAddress {
        apartment_name: p.apartment_name.clone(),
        flat_number: p.flat_number.clone(),
        area: p.area.clone(),
        landmark: p.landmark.clone(),
        pincode: p.pincode.clone(),
    }
}

impl From<PricingError> for ServiceError {
    fn from(err: PricingError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

#[async_trait]
impl OrderService for OrderServiceImpl {
    #[instrument(skip(self, request), fields(user = %user_id, service = %request.service_id))]
    async fn create_order(&self, user_id: ObjectId, request: CreateOrderRequest) -> Result<CreateOrderResponse, ServiceError> {
        let not_found = || ServiceError::NotFound("Service not found".to_string());
        let service_id = ObjectId::parse_str(request.service_id.trim()).map_err(|_| not_found())?;
        let service = self.catalog_repo.find_by_id(&service_id).await?.ok_or_else(not_found)?;

        let user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        Self::check_eligibility(&user)?;

        let payment_method = PaymentMethod::from_request(request.payment_method.as_deref()).ok_or_else(|| {
            ServiceError::InvalidInput(format!(
                "Unsupported payment method: {}",
                request.payment_method.as_deref().unwrap_or_default()
            ))
        })?;

        let shape = request.shape();
        let total_amount = pricing::resolve_amount(&shape, service.base_price)?;
        let (scheduled_date, scheduled_time) = pricing::resolve_schedule(&shape)?;

        let sequence = self.order_repo.next_sequence().await?;
        let order_number = pricing::format_order_number(Utc::now().timestamp_millis(), sequence);

        let razorpay_order_id = self.open_gateway_order(payment_method, total_amount, &order_number).await;

        let order = Order {
            id: None,
            order_number,
            user: user_id,
            service: service_id,
            booking_type: request.booking_type.unwrap_or_default(),
            plan_type: request.plan_type.unwrap_or_default(),
            scheduled_date,
            scheduled_time,
            duration: request.duration.unwrap_or_else(crate::model::order::default_duration),
            selected_factors: request.selected_factors.clone().unwrap_or_default(),
            pricing_option: request.pricing_option.clone(),
            total_amount,
            special_instructions: request.instructions(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method,
            payment_id: None,
            razorpay_order_id,
            address: address_snapshot(&user),
            assigned_worker: None,
            admin_notes: None,
            customer_feedback: None,
            created_at: None,
            updated_at: None,
        };
        let order = self.order_repo.insert(order).await?;
        info!(order_number = %order.order_number, total_amount, "Order created");

        self.notify_order_placed(&order, &user, &service.name);

        Ok(CreateOrderResponse {
            message: "Order created successfully".to_string(),
            order: CreatedOrder {
                id: order.id.map(|id| id.to_hex()).unwrap_or_default(),
                order_number: order.order_number,
                total_amount: order.total_amount,
                razorpay_order_id: order.razorpay_order_id,
                payment_method: order.payment_method,
            },
        })
    }

    #[instrument(skip(self, query), fields(user = %user_id))]
    async fn my_orders(&self, user_id: ObjectId, query: PageQuery) -> Result<OrderPage<Order>, ServiceError> {
        let (page, limit) = query.resolve(MY_ORDERS_PAGE_SIZE);
        let (orders, total) = self.order_repo.list_for_user(&user_id, page, limit).await?;
        Ok(OrderPage { orders, pagination: Pagination::new(total, page, limit) })
    }

    async fn get_order(&self, user_id: ObjectId, order_id: ObjectId) -> Result<Order, ServiceError> {
        self.order_repo
            .find_for_user(&order_id, &user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))
    }

    #[instrument(skip(self), fields(user = %user_id, order = %order_id))]
    async fn cancel_order(&self, user_id: ObjectId, order_id: ObjectId) -> Result<Order, ServiceError> {
        let order = self.get_order(user_id, order_id).await?;
        if !order.status.is_cancellable() {
            return Err(ServiceError::InvalidInput("Cannot cancel order at this stage".to_string()));
        }
        let order = self.order_repo.update_status(&order_id, OrderStatus::Cancelled, None).await?;
        info!("Order cancelled by customer");
        Ok(order)
    }

    #[instrument(skip(self, request), fields(user = %user_id, order = %request.order_id))]
    async fn verify_payment(&self, user_id: ObjectId, request: VerifyPaymentRequest) -> Result<Order, ServiceError> {
        let order_id = ObjectId::parse_str(&request.order_id)
            .map_err(|_| ServiceError::NotFound("Order not found".to_string()))?;
        let order = self.get_order(user_id, order_id).await?;

        if let (Some(gateway), Some(gateway_order_id)) = (self.gateway.as_ref(), order.razorpay_order_id.as_deref()) {
            let signature = request.signature.as_deref().unwrap_or_default();
            if !gateway.verify_signature(gateway_order_id, &request.payment_id, signature) {
                warn!("Payment signature mismatch");
                return Err(ServiceError::InvalidInput("Invalid payment signature".to_string()));
            }
        }

        let order = self.order_repo.mark_paid(&order_id, &request.payment_id).await?;
        info!("Payment verified");
        Ok(order)
    }

    #[instrument(skip(self, query))]
    async fn list_all(&self, query: AdminOrderQuery) -> Result<OrderPage<AdminOrderView>, ServiceError> {
        let paging = PageQuery { page: query.page, limit: query.limit, search: None };
        let (page, limit) = paging.resolve(ADMIN_ORDERS_PAGE_SIZE);
        let (orders, total) = self.order_repo.list(query.status, page, limit).await?;
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(self.admin_view(order).await?);
        }
        Ok(OrderPage { orders: views, pagination: Pagination::new(total, page, limit) })
    }

    async fn order_details(&self, order_id: ObjectId) -> Result<AdminOrderView, ServiceError> {
        let order = self
            .order_repo
            .find_by_id(&order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
        self.admin_view(order).await
    }

    #[instrument(skip(self, request), fields(order = %order_id, status = %request.status))]
    async fn update_status(&self, order_id: ObjectId, request: UpdateOrderStatusRequest) -> Result<Order, ServiceError> {
        if self.order_repo.find_by_id(&order_id).await?.is_none() {
            return Err(ServiceError::NotFound("Order not found".to_string()));
        }
        let order = self
            .order_repo
            .update_status(&order_id, request.status, request.notes.clone())
            .await?;

        match self.user_repo.find_by_id(&order.user).await {
            Ok(Some(user)) => self.notifications.dispatch(Notification::OrderStatusChanged {
                to: user.email,
                name: user.full_name,
                order_number: order.order_number.clone(),
                status: order.status,
                notes: request.notes,
            }),
            Ok(None) => warn!("Order owner no longer exists, skipping status email"),
            Err(e) => error!("Could not load order owner for status email: {}", e),
        }

        info!("Order status updated");
        Ok(order)
    }
}
