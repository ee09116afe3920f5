use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::pagination::Pagination;
use crate::model::apartment::{Apartment, ManagementContact};
use crate::model::worker::{Specialization, Worker};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailableApartmentsQuery {
    pub area: Option<String>,
    pub pincode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentRequest {
    #[validate(length(min = 1, max = 120, message = "Apartment name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 120, message = "Area is required"))]
    pub area: String,
    pub pincode: String,
    pub landmark: Option<String>,
    #[serde(default)]
    pub total_units: u32,
    #[serde(default)]
    pub management_contact: ManagementContact,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

impl ApartmentRequest {
    pub fn into_apartment(self, existing: Option<&Apartment>) -> Apartment {
        Apartment {
            id: existing.and_then(|a| a.id),
            name: self.name.trim().to_string(),
            area: self.area.trim().to_string(),
            pincode: self.pincode.trim().to_string(),
            landmark: self.landmark,
            total_units: self.total_units,
            management_contact: self.management_contact,
            amenities: self.amenities,
            is_active: self.is_active.unwrap_or(true),
            notes: self.notes,
            created_at: existing.and_then(|a| a.created_at.clone()),
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRequest {
    #[validate(length(min = 1, max = 120, message = "Worker name is required"))]
    pub name: String,
    #[validate(length(min = 10, max = 20, message = "Phone number must be at least 10 digits"))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    /// Catalog entry ids
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub specializations: Vec<Specialization>,
    /// Apartment ids
    #[serde(default)]
    pub areas: Vec<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApartmentPage {
    pub apartments: Vec<Apartment>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceRef {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentRef {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub area: String,
    pub pincode: String,
}

impl ApartmentRef {
    pub fn of(a: &Apartment) -> Option<Self> {
        a.id.map(|id| ApartmentRef {
            id,
            name: a.name.clone(),
            area: a.area.clone(),
            pincode: a.pincode.clone(),
        })
    }
}

/// Worker with its service and apartment references expanded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerView {
    #[serde(flatten)]
    pub worker: Worker,
    pub service_details: Vec<ServiceRef>,
    pub area_details: Vec<ApartmentRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerPage {
    pub workers: Vec<WorkerView>,
    pub pagination: Pagination,
}
