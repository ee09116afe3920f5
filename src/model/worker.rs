use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::catalog::ServiceKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialization {
    pub service_type: ServiceKind,
    #[serde(default)]
    pub sub_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    /// Catalog entries this worker can be assigned to
    #[serde(default)]
    pub services: Vec<ObjectId>,
    #[serde(default)]
    pub specializations: Vec<Specialization>,
    /// Apartments served
    #[serde(default)]
    pub areas: Vec<ObjectId>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub total_ratings: u32,
    #[serde(default)]
    pub completed_jobs: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

fn default_true() -> bool {
    true
}
