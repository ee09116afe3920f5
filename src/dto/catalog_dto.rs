use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::catalog::{CatalogEntry, PricingFactor, PricingLine, ServiceKind};
use crate::service::pricing::canonical_price;

/// Create or update body for a catalog entry.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryRequest {
    /// Kind slug; defaults to `general`
    pub kind: Option<String>,
    #[validate(length(min = 1, max = 120, message = "Service name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    pub icon: Option<String>,
    #[validate(range(min = 0.0))]
    pub base_price: Option<f64>,
    pub pricing_type: Option<String>,
    pub is_active: Option<bool>,
    pub factors: Option<Vec<PricingFactor>>,
    pub pricing: Option<Vec<PricingLineInput>>,
}

impl CatalogEntryRequest {
    pub fn kind(&self) -> Result<ServiceKind, String> {
        match self.kind.as_deref() {
            None => Ok(ServiceKind::General),
            Some(slug) => ServiceKind::from_slug(slug).ok_or_else(|| format!("Invalid service type: {}", slug)),
        }
    }

    /// Builds the stored entry, keeping `id` and `created_at` from `existing`.
    pub fn into_entry(self, existing: Option<&CatalogEntry>) -> Result<CatalogEntry, String> {
        let kind = self.kind()?;
        let pricing = match self.pricing {
            Some(lines) => lines
                .into_iter()
                .map(|line| line.into_line(ObjectId::new()))
                .collect::<Result<Vec<_>, _>>()?,
            None => existing.map(|e| e.pricing.clone()).unwrap_or_default(),
        };
        Ok(CatalogEntry {
            id: existing.and_then(|e| e.id),
            kind,
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category,
            icon: self.icon,
            base_price: self.base_price,
            pricing_type: self.pricing_type,
            is_active: self.is_active.unwrap_or(true),
            pricing,
            factors: self
                .factors
                .or_else(|| existing.map(|e| e.factors.clone()))
                .unwrap_or_default(),
            created_at: existing.and_then(|e| e.created_at.clone()),
            updated_at: None,
        })
    }
}

/// Pricing line as sent by the admin console. The amount may arrive as
/// `price`, `baseRate` or `basePrice`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingLineInput {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub variant: Option<String>,
    pub plan_type: Option<String>,
    pub duration: Option<u32>,
    pub price: Option<f64>,
    pub base_rate: Option<f64>,
    pub base_price: Option<f64>,
    pub price_after_visit: Option<bool>,
    pub starting_price: Option<f64>,
    pub apartment_ids: Option<Vec<String>>,
    pub apartment_names: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl PricingLineInput {
    fn amount(&self) -> Option<f64> {
        canonical_price(self.price, self.base_rate, self.base_price)
    }

    fn apartment_ids(&self) -> Result<Option<Vec<ObjectId>>, String> {
        self.apartment_ids
            .as_ref()
            .map(|ids| {
                ids.iter()
                    .filter(|id| !id.trim().is_empty())
                    .map(|id| ObjectId::parse_str(id.trim()).map_err(|_| format!("Invalid apartment id: {}", id)))
                    .collect()
            })
            .transpose()
    }

    pub fn into_line(self, id: ObjectId) -> Result<PricingLine, String> {
        let price_after_visit = self.price_after_visit.unwrap_or(false);
        let price = match self.amount() {
            Some(p) if p.is_finite() && p >= 0.0 => p,
            Some(p) => return Err(format!("Invalid price: {}", p)),
            None if price_after_visit => 0.0,
            None => return Err("Price is required".to_string()),
        };
        let apartment_ids = self.apartment_ids()?.unwrap_or_default();
        Ok(PricingLine {
            id,
            display_name: self.display_name,
            description: self.description,
            variant: self.variant,
            plan_type: self.plan_type,
            duration: self.duration,
            price,
            price_after_visit,
            starting_price: self.starting_price,
            apartment_ids,
            apartment_names: self.apartment_names.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
        })
    }

    /// Overwrites only the fields present in the request.
    pub fn apply_to(self, line: &mut PricingLine) -> Result<(), String> {
        if let Some(price) = self.amount() {
            if !price.is_finite() || price < 0.0 {
                return Err(format!("Invalid price: {}", price));
            }
            line.price = price;
        }
        if let Some(ids) = self.apartment_ids()? {
            line.apartment_ids = ids;
        }
        if self.display_name.is_some() {
            line.display_name = self.display_name;
        }
        if self.description.is_some() {
            line.description = self.description;
        }
        if self.variant.is_some() {
            line.variant = self.variant;
        }
        if self.plan_type.is_some() {
            line.plan_type = self.plan_type;
        }
        if self.duration.is_some() {
            line.duration = self.duration;
        }
        if let Some(v) = self.price_after_visit {
            line.price_after_visit = v;
        }
        if self.starting_price.is_some() {
            line.starting_price = self.starting_price;
        }
        if let Some(names) = self.apartment_names {
            line.apartment_names = names;
        }
        if let Some(active) = self.is_active {
            line.is_active = active;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PricingResponse {
    pub message: String,
    pub pricing: Vec<PricingLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricingLineResponse {
    pub message: String,
    pub rule: PricingLine,
}

/// One entry per specialized kind, keyed by kind slug.
pub type DetailedCatalog = std::collections::BTreeMap<String, Option<CatalogEntry>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_rate_becomes_price() {
        let input = PricingLineInput { base_rate: Some(300.0), base_price: Some(999.0), ..Default::default() };
        let line = input.into_line(ObjectId::new()).unwrap();
        assert_eq!(line.price, 300.0);
        assert!(line.is_active);
    }

    #[test]
    fn test_price_after_visit_without_price() {
        let input = PricingLineInput { price_after_visit: Some(true), starting_price: Some(499.0), ..Default::default() };
        let line = input.into_line(ObjectId::new()).unwrap();
        assert_eq!(line.price, 0.0);
        assert_eq!(line.starting_price, Some(499.0));

        assert!(PricingLineInput::default().into_line(ObjectId::new()).is_err());
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let mut line = PricingLineInput {
            price: Some(500.0),
            variant: Some("2 BHK".into()),
            ..Default::default()
        }
        .into_line(ObjectId::new())
        .unwrap();
        PricingLineInput { base_price: Some(650.0), ..Default::default() }
            .apply_to(&mut line)
            .unwrap();
        assert_eq!(line.price, 650.0);
        assert_eq!(line.variant.as_deref(), Some("2 BHK"));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let req = CatalogEntryRequest { kind: Some("plumbing".into()), name: "X".into(), ..Default::default() };
        assert!(req.kind().is_err());
    }
}
