use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Kind tag of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    General,
    Maid,
    Cook,
    Driver,
    CarWash,
    DeepCleaning,
    PestControl,
}

impl ServiceKind {
    /// Lookup precedence used when folding the old per-kind collections together.
    pub const IMPORT_ORDER: [ServiceKind; 7] = [
        ServiceKind::General,
        ServiceKind::Maid,
        ServiceKind::Cook,
        ServiceKind::Driver,
        ServiceKind::CarWash,
        ServiceKind::DeepCleaning,
        ServiceKind::PestControl,
    ];

    pub const SPECIALIZED: [ServiceKind; 6] = [
        ServiceKind::Maid,
        ServiceKind::Cook,
        ServiceKind::Driver,
        ServiceKind::CarWash,
        ServiceKind::DeepCleaning,
        ServiceKind::PestControl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::General => "general",
            ServiceKind::Maid => "maid",
            ServiceKind::Cook => "cook",
            ServiceKind::Driver => "driver",
            ServiceKind::CarWash => "car-wash",
            ServiceKind::DeepCleaning => "deep-cleaning",
            ServiceKind::PestControl => "pest-control",
        }
    }

    /// Accepts `car-wash`, `carwash`, `car_wash`, `CarWash` and the like.
    pub fn from_slug(slug: &str) -> Option<Self> {
        let normalized: String = slug
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "general" | "service" => Some(ServiceKind::General),
            "maid" => Some(ServiceKind::Maid),
            "cook" => Some(ServiceKind::Cook),
            "driver" => Some(ServiceKind::Driver),
            "carwash" => Some(ServiceKind::CarWash),
            "deepcleaning" => Some(ServiceKind::DeepCleaning),
            "pestcontrol" => Some(ServiceKind::PestControl),
            _ => None,
        }
    }

    /// Collection that held this kind before the catalog was unified.
    pub fn legacy_collection(&self) -> &'static str {
        match self {
            ServiceKind::General => "services",
            ServiceKind::Maid => "maidservices",
            ServiceKind::Cook => "cookservices",
            ServiceKind::Driver => "driverservices",
            ServiceKind::CarWash => "carwashservices",
            ServiceKind::DeepCleaning => "deepcleaningservices",
            ServiceKind::PestControl => "pestcontrolservices",
        }
    }

    pub fn default_name(&self) -> &'static str {
        match self {
            ServiceKind::General => "Service",
            ServiceKind::Maid => "Maid Service",
            ServiceKind::Cook => "Cook Service",
            ServiceKind::Driver => "Driver Service",
            ServiceKind::CarWash => "Car Wash",
            ServiceKind::DeepCleaning => "Deep Cleaning",
            ServiceKind::PestControl => "Pest Control",
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorOption {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub additional_cost: f64,
}

/// A surcharge dimension offered with legacy-shape bookings (e.g. BHK size).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingFactor {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<FactorOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingLine {
    pub id: ObjectId,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub variant: Option<String>,
    pub plan_type: Option<String>,
    pub duration: Option<u32>,
    pub price: f64,
    #[serde(default)]
    pub price_after_visit: bool,
    pub starting_price: Option<f64>,
    #[serde(default)]
    pub apartment_ids: Vec<ObjectId>,
    #[serde(default)]
    pub apartment_names: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl PricingLine {
    /// Lines without an apartment scope apply everywhere.
    pub fn applies_to(&self, apartment_id: &ObjectId) -> bool {
        self.apartment_ids.is_empty() || self.apartment_ids.contains(apartment_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub kind: ServiceKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    pub icon: Option<String>,
    /// Unit price used by legacy-shape bookings
    pub base_price: Option<f64>,
    pub pricing_type: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub pricing: Vec<PricingLine>,
    #[serde(default)]
    pub factors: Vec<PricingFactor>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl CatalogEntry {
    pub fn empty(kind: ServiceKind) -> Self {
        CatalogEntry {
            id: None,
            kind,
            name: kind.default_name().to_string(),
            description: String::new(),
            category: None,
            icon: None,
            base_price: None,
            pricing_type: None,
            is_active: true,
            pricing: Vec::new(),
            factors: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

fn default_true() -> bool {
    true
}
