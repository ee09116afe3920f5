use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    #[default]
    Webapp,
    Whatsapp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Hourly,
    Weekly,
    Monthly,
    #[default]
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the customer may still cancel the order themselves.
    pub fn is_cancellable(&self) -> bool {
        !matches!(self, OrderStatus::Completed | OrderStatus::InProgress)
    }

    /// Orders in these states block deleting the owning user.
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::InProgress)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Upi,
    Wallet,
    #[default]
    Cod,
}

impl PaymentMethod {
    /// Parses a client supplied method. `cash` is an alias for cash on delivery.
    pub fn from_request(raw: Option<&str>) -> Option<Self> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("cash") | Some("cod") => Some(PaymentMethod::Cod),
            Some("card") => Some(PaymentMethod::Card),
            Some("upi") => Some(PaymentMethod::Upi),
            Some("wallet") => Some(PaymentMethod::Wallet),
            Some(_) => None,
        }
    }

    /// Methods settled online through the gateway
    pub fn is_online(&self) -> bool {
        matches!(self, PaymentMethod::Card | PaymentMethod::Upi)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFactor {
    #[serde(default)]
    pub factor_name: String,
    #[serde(default)]
    pub selected_option: String,
    pub additional_cost: Option<f64>,
}

/// Service address copied from the customer profile when the order is placed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    pub apartment_name: Option<String>,
    pub flat_number: Option<String>,
    pub area: Option<String>,
    pub landmark: Option<String>,
    pub pincode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFeedback {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub order_number: String,
    pub user: ObjectId,
    pub service: ObjectId,
    #[serde(default)]
    pub booking_type: BookingType,
    #[serde(default)]
    pub plan_type: PlanType,
    pub scheduled_date: DateTime<Utc>,
    pub scheduled_time: String,
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default)]
    pub selected_factors: Vec<SelectedFactor>,
    pub pricing_option: Option<serde_json::Value>,
    pub total_amount: f64,
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub address: OrderAddress,
    pub assigned_worker: Option<ObjectId>,
    pub admin_notes: Option<String>,
    pub customer_feedback: Option<CustomerFeedback>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

pub fn default_duration() -> u32 {
    60
}
