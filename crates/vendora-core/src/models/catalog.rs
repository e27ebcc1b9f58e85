//! Catalog row and draft models produced by bulk/single-product ingestion.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::product::ProductStatus;

/// One untyped record of a bulk catalog file, in file order.
///
/// `index` is the zero-based position among the file's data records (header excluded).
/// Blank records are dropped but still count, so indexes may skip.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCatalogRow {
    pub index: usize,
    pub fields: Map<String, Value>,
}

impl RawCatalogRow {
    pub fn new(index: usize, fields: Map<String, Value>) -> Self {
        Self { index, fields }
    }

    /// Look up a field by name; exact match first, then case-insensitive.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).or_else(|| {
            self.fields
                .iter()
                .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    /// True when every field is null or blank text.
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| match v {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Specification {
    pub name: String,
    pub value: String,
}

/// Type-safe form of one catalog row, ready for persistence.
///
/// `vendor_id` is always set by the normalizer from the authenticated identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedProductDraft {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[validate(length(min = 1, max = 100, message = "category must be 1-100 characters"))]
    pub category: String,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i64,
    pub dimensions: Dimensions,
    pub specifications: Vec<Specification>,
    pub tags: BTreeSet<String>,
    pub status: ProductStatus,
    pub vendor_id: Uuid,
}

/// A row excluded from a bulk insert, with the reason it was excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub row_index: usize,
    pub reason: String,
}

/// Outcome of one bulk catalog upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkIngestionReport {
    pub inserted_count: usize,
    pub total_rows: usize,
    pub row_errors: Vec<RowError>,
}

impl BulkIngestionReport {
    /// `inserted_count + row_errors.len() == total_rows`
    pub fn is_consistent(&self) -> bool {
        self.inserted_count + self.row_errors.len() == self.total_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RawCatalogRow {
        match value {
            Value::Object(map) => RawCatalogRow::new(0, map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let r = row(json!({"Name": "Lamp", "price": "12.5"}));
        assert_eq!(r.get("name"), Some(&json!("Lamp")));
        assert_eq!(r.get("price"), Some(&json!("12.5")));
        assert_eq!(r.get("stock"), None);
    }

    #[test]
    fn test_is_blank() {
        assert!(row(json!({"name": "", "price": null})).is_blank());
        assert!(!row(json!({"name": "", "price": 0})).is_blank());
    }

    #[test]
    fn test_draft_validation_rejects_negative_price() {
        let draft = NormalizedProductDraft {
            name: "Lamp".to_string(),
            description: "A lamp".to_string(),
            price: -1.0,
            category: "Lighting".to_string(),
            stock: 3,
            dimensions: Dimensions::default(),
            specifications: vec![],
            tags: BTreeSet::new(),
            status: ProductStatus::Draft,
            vendor_id: Uuid::new_v4(),
        };
        let err = draft.validate().unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_report_consistency() {
        let report = BulkIngestionReport {
            inserted_count: 2,
            total_rows: 3,
            row_errors: vec![RowError {
                row_index: 1,
                reason: "price is not a number".to_string(),
            }],
        };
        assert!(report.is_consistent());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["insertedCount"], 2);
        assert_eq!(json["rowErrors"][0]["rowIndex"], 1);
    }
}
