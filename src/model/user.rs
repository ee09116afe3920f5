use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub apartment_name: Option<String>,
    pub flat_number: Option<String>,
    pub area: Option<String>,
    pub landmark: Option<String>,
    pub pincode: Option<String>,
    pub emergency_contact: Option<String>,
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub is_profile_complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVisit {
    pub timestamp: DateTime<Utc>,
    pub page: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitStats {
    #[serde(default)]
    pub total_visits: i64,
    pub last_visit: Option<DateTime<Utc>>,
    #[serde(default)]
    pub visit_history: Vec<PageVisit>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub last_verification_email_sent: Option<DateTime<Utc>>,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,
    #[serde(default = "default_role")]
    pub role: String, // "user" or "admin"
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub visit_stats: VisitStats,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

fn default_role() -> String {
    ROLE_USER.to_string()
}

impl User {
    pub fn has_phone(&self) -> bool {
        !self.phone.trim().is_empty()
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
