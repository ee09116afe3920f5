//! Conversion of the old per-kind service documents into catalog entries.

use std::collections::HashSet;

use bson::{oid::ObjectId, Bson, Document};
use tracing::warn;

use crate::model::catalog::{CatalogEntry, PricingFactor, PricingLine, ServiceKind};
use crate::service::pricing::canonical_price;

/// Folds legacy batches into catalog entries. Batches are walked in the order
/// given; when two collections hold the same id the earlier one wins.
pub fn fold_legacy(batches: Vec<(ServiceKind, Vec<Document>)>) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for (kind, docs) in batches {
        for doc in docs {
            let Ok(id) = doc.get_object_id("_id") else {
                warn!(kind = %kind, "Skipping legacy service without ObjectId");
                continue;
            };
            if !seen.insert(id) {
                warn!(kind = %kind, id = %id, "Duplicate legacy service id, keeping earlier entry");
                continue;
            }
            entries.push(legacy_entry(kind, id, &doc));
        }
    }
    entries
}

fn legacy_entry(kind: ServiceKind, id: ObjectId, doc: &Document) -> CatalogEntry {
    let lines_key = if kind == ServiceKind::General { "pricingOptions" } else { "pricingMatrix" };
    let pricing = doc
        .get_array(lines_key)
        .map(|arr| {
            arr.iter()
                .filter_map(Bson::as_document)
                .filter_map(legacy_line)
                .collect()
        })
        .unwrap_or_default();

    let factors = doc
        .get_array("pricingOptions")
        .map(|arr| {
            arr.iter()
                .filter_map(Bson::as_document)
                .filter_map(|opt| opt.get_array("factors").ok())
                .flatten()
                .filter_map(|f| bson::from_bson::<PricingFactor>(f.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    CatalogEntry {
        id: Some(id),
        kind,
        name: text(doc, "name").unwrap_or_else(|| kind.default_name().to_string()),
        description: text(doc, "description").unwrap_or_default(),
        category: text(doc, "category"),
        icon: text(doc, "icon"),
        base_price: number(doc, "basePrice"),
        pricing_type: text(doc, "pricingType"),
        is_active: doc.get_bool("isActive").unwrap_or(true),
        pricing,
        factors,
        created_at: timestamp(doc, "createdAt"),
        updated_at: timestamp(doc, "updatedAt"),
    }
}

fn legacy_line(doc: &Document) -> Option<PricingLine> {
    let price_after_visit = doc.get_bool("priceAfterVisit").unwrap_or(false);
    let price = canonical_price(number(doc, "price"), number(doc, "baseRate"), number(doc, "basePrice"));
    let price = match (price, price_after_visit) {
        (Some(p), _) => p,
        (None, true) => 0.0,
        (None, false) => {
            warn!("Skipping legacy pricing line without a price");
            return None;
        }
    };

    let mut apartment_ids: Vec<ObjectId> = doc
        .get_array("apartmentIds")
        .map(|arr| arr.iter().filter_map(Bson::as_object_id).collect())
        .unwrap_or_default();
    if let Ok(single) = doc.get_object_id("apartmentId") {
        if !apartment_ids.contains(&single) {
            apartment_ids.push(single);
        }
    }

    Some(PricingLine {
        id: doc.get_object_id("_id").unwrap_or_else(|_| ObjectId::new()),
        display_name: text(doc, "displayName").or_else(|| text(doc, "subType")),
        description: text(doc, "description"),
        variant: text(doc, "serviceVariant").or_else(|| text(doc, "subType")),
        plan_type: text(doc, "planType").or_else(|| text(doc, "serviceType")),
        duration: number(doc, "duration").map(|d| d.max(0.0) as u32),
        price,
        price_after_visit,
        starting_price: number(doc, "startingPrice"),
        apartment_ids,
        apartment_names: doc
            .get_array("apartmentNames")
            .map(|arr| arr.iter().filter_map(|b| b.as_str().map(str::to_string)).collect())
            .unwrap_or_default(),
        is_active: doc.get_bool("isActive").unwrap_or(true),
    })
}

fn text(doc: &Document, key: &str) -> Option<String> {
    doc.get_str(key).ok().map(str::to_string).filter(|s| !s.is_empty())
}

fn number(doc: &Document, key: &str) -> Option<f64> {
    match doc.get(key)? {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn timestamp(doc: &Document, key: &str) -> Option<String> {
    match doc.get(key)? {
        Bson::DateTime(dt) => dt.try_to_rfc3339_string().ok(),
        Bson::String(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_first_collection_wins_on_duplicate_id() {
        let shared = ObjectId::new();
        let batches = vec![
            (ServiceKind::General, vec![doc! { "_id": shared, "name": "General cleaning", "basePrice": 300 }]),
            (ServiceKind::Maid, vec![doc! { "_id": shared, "name": "Maid" }]),
        ];
        let entries = fold_legacy(batches);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ServiceKind::General);
        assert_eq!(entries[0].base_price, Some(300.0));
    }

    #[test]
    fn test_pricing_lines_are_normalized() {
        let apartment = ObjectId::new();
        let batches = vec![(
            ServiceKind::Maid,
            vec![doc! {
                "_id": ObjectId::new(),
                "pricingMatrix": [
                    { "_id": ObjectId::new(), "displayName": "2 hours", "baseRate": 450, "apartmentId": apartment },
                    { "_id": ObjectId::new(), "basePrice": 300.5, "price": 320 },
                    { "_id": ObjectId::new(), "priceAfterVisit": true, "startingPrice": 999 },
                    { "_id": ObjectId::new(), "description": "no price at all" },
                ],
            }],
        )];
        let entries = fold_legacy(batches);
        let lines = &entries[0].pricing;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].price, 450.0);
        assert_eq!(lines[0].apartment_ids, vec![apartment]);
        assert_eq!(lines[1].price, 320.0);
        assert!(lines[2].price_after_visit);
        assert_eq!(lines[2].starting_price, Some(999.0));
        assert_eq!(entries[0].name, "Maid Service");
    }

    #[test]
    fn test_documents_without_object_id_are_skipped() {
        let batches = vec![(ServiceKind::Cook, vec![doc! { "_id": "not-an-oid", "name": "Cook" }])];
        assert!(fold_legacy(batches).is_empty());
    }
}
