use serde::{Deserialize, Serialize};

use crate::dto::order_dto::AdminOrderView;
use crate::dto::pagination::Pagination;
use crate::dto::user_dto::PublicUser;
use crate::model::order::Order;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total_users: u64,
    pub total_workers: u64,
    pub total_orders: u64,
    pub total_apartments: u64,
    pub pending_orders: u64,
    pub total_unique_visitors: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub stats: DashboardCounts,
    pub recent_orders: Vec<AdminOrderView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<PublicUser>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetails {
    pub user: PublicUser,
    pub orders: Vec<Order>,
}

/// Admin edit of a customer account. Password and role are not editable here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_verified: Option<bool>,
    pub apartment_name: Option<String>,
    pub flat_number: Option<String>,
    pub area: Option<String>,
    pub landmark: Option<String>,
    pub pincode: Option<String>,
    pub is_profile_complete: Option<bool>,
}
