use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::pagination::Pagination;
use crate::model::order::{BookingType, Order, OrderStatus, PaymentMethod, PlanType, SelectedFactor};
use crate::model::user::UserProfile;
use crate::service::pricing::BookingShape;

/// Booking request. A present `totalAmount` selects the direct shape,
/// otherwise the legacy plan/duration/factor fields are used.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "serviceId is required"))]
    pub service_id: String,

    // direct shape
    pub pricing_option: Option<serde_json::Value>,
    pub total_amount: Option<f64>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub special_requests: Option<String>,

    // legacy shape
    pub booking_type: Option<BookingType>,
    pub plan_type: Option<PlanType>,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    #[validate(range(min = 1, max = 1440))]
    pub duration: Option<u32>,
    pub selected_factors: Option<Vec<SelectedFactor>>,
    pub special_instructions: Option<String>,

    pub payment_method: Option<String>,
}

impl CreateOrderRequest {
    pub fn shape(&self) -> BookingShape {
        match self.total_amount {
            Some(total_amount) => BookingShape::Direct {
                total_amount,
                preferred_date: self.preferred_date.clone(),
                preferred_time: self.preferred_time.clone(),
            },
            None => BookingShape::Legacy {
                plan_type: self.plan_type.unwrap_or_default(),
                duration_minutes: self.duration.unwrap_or_else(crate::model::order::default_duration),
                selected_factors: self.selected_factors.clone().unwrap_or_default(),
                scheduled_date: self.scheduled_date.clone(),
                scheduled_time: self.scheduled_time.clone(),
            },
        }
    }

    pub fn instructions(&self) -> Option<String> {
        let raw = if self.total_amount.is_some() {
            self.special_requests.as_ref().or(self.special_instructions.as_ref())
        } else {
            self.special_instructions.as_ref()
        };
        raw.filter(|s| !s.trim().is_empty()).cloned()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub message: String,
    pub order: CreatedOrder,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub id: String,
    pub order_number: String,
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razorpay_order_id: Option<String>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[validate(length(equal = 24))]
    pub order_id: String,
    #[validate(length(min = 1))]
    pub payment_id: String,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminOrderQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPage<T> {
    pub orders: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: Option<ObjectId>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub profile: UserProfile,
}

/// Order as shown in the admin console.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderView {
    #[serde(flatten)]
    pub order: Order,
    pub service_name: String,
    pub customer: Option<CustomerSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}
