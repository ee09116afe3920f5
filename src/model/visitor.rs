use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of visits kept per visitor.
pub const VISIT_HISTORY_LIMIT: i32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub timestamp: DateTime<Utc>,
    pub page: String,
    pub user_agent: Option<String>,
    /// SHA-256 of the client address, hex encoded
    pub ip_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub visitor_id: String,
    pub user: Option<ObjectId>,
    #[serde(default)]
    pub visits: Vec<Visit>,
    #[serde(default)]
    pub total_visits: i64,
    pub first_visit: DateTime<Utc>,
    pub last_visit: DateTime<Utc>,
    #[serde(default)]
    pub is_logged_in: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStats {
    #[serde(default)]
    pub total_unique_visitors: i64,
}
