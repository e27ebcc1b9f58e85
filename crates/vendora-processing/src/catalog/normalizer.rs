//! Row normalization
//!
//! Turns one untyped [`RawCatalogRow`] into a [`NormalizedProductDraft`]. Rows come from
//! CSV (all text), spreadsheets (text and numbers), JSON (anything) and the single-product
//! multipart form (text, with nested values as JSON text), so every field accepts several
//! shapes. The vendor always comes from the authenticated identity, never from the row.

use std::collections::BTreeSet;

use serde_json::Value;
use uuid::Uuid;
use validator::Validate;
use vendora_core::models::{
    Dimensions, NormalizedProductDraft, ProductStatus, RawCatalogRow, RowError, Specification,
};

use crate::error::RowNormalizationError;

/// A draft together with the index of the row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDraft {
    pub row_index: usize,
    pub draft: NormalizedProductDraft,
}

/// Outcome of normalizing every row of a parsed catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedCatalog {
    pub drafts: Vec<IndexedDraft>,
    pub row_errors: Vec<RowError>,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct RowNormalizer {
    vendor_id: Uuid,
}

impl RowNormalizer {
    pub fn new(vendor_id: Uuid) -> Self {
        Self { vendor_id }
    }

    /// Normalize every row; failing rows become row errors and never stop the others.
    pub fn normalize_all(&self, rows: &[RawCatalogRow]) -> NormalizedCatalog {
        let mut catalog = NormalizedCatalog {
            total_rows: rows.len(),
            ..NormalizedCatalog::default()
        };

        for row in rows {
            match self.normalize(row) {
                Ok(draft) => catalog.drafts.push(IndexedDraft {
                    row_index: row.index,
                    draft,
                }),
                Err(e) => {
                    tracing::debug!(row_index = e.row_index, reason = %e.reason, "Row rejected");
                    catalog.row_errors.push(e.into());
                }
            }
        }

        catalog
    }

    pub fn normalize(&self, row: &RawCatalogRow) -> Result<NormalizedProductDraft, RowNormalizationError> {
        let fail = |reason: String| RowNormalizationError {
            row_index: row.index,
            reason,
        };

        let name = required_text(row, "name").map_err(fail)?;
        let description = required_text(row, "description").map_err(fail)?;
        let category = required_text(row, "category").map_err(fail)?;
        let price = parse_price(row.get("price")).map_err(fail)?;
        let stock = parse_stock(row.get("stock")).map_err(fail)?;
        let dimensions = parse_dimensions(row).map_err(fail)?;
        let specifications = row
            .get("specifications")
            .map(parse_specifications)
            .transpose()
            .map_err(fail)?
            .unwrap_or_default();
        let tags = row.get("tags").map(parse_tags).unwrap_or_default();
        let status = text(row.get("status"))
            .and_then(|s| ProductStatus::parse(&s))
            .unwrap_or_default();

        let draft = NormalizedProductDraft {
            name,
            description,
            price,
            category,
            stock,
            dimensions,
            specifications,
            tags,
            status,
            vendor_id: self.vendor_id,
        };
        draft.validate().map_err(|e| fail(e.to_string()))?;

        Ok(draft)
    }
}

/// Non-empty trimmed text form of a scalar value.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn required_text(row: &RawCatalogRow, key: &str) -> Result<String, String> {
    text(row.get(key)).ok_or_else(|| format!("{} is required", key))
}

/// Parse a number from a JSON number or numeric text.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn parse_price(value: Option<&Value>) -> Result<f64, String> {
    let value = value
        .filter(|v| text(Some(*v)).is_some())
        .ok_or_else(|| "price is required".to_string())?;
    let price = number(value).ok_or_else(|| format!("price '{}' is not a number", display(value)))?;
    if price < 0.0 {
        return Err("price must not be negative".to_string());
    }
    Ok(price)
}

fn parse_stock(value: Option<&Value>) -> Result<i64, String> {
    let value = match value.filter(|v| text(Some(*v)).is_some()) {
        Some(value) => value,
        None => return Ok(0),
    };

    let stock = match value {
        Value::Number(n) if n.is_i64() => n.as_i64(),
        Value::String(s) if s.trim().parse::<i64>().is_ok() => s.trim().parse::<i64>().ok(),
        other => number(other)
            .filter(|n| n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64)
            .map(|n| n as i64),
    }
    .ok_or_else(|| format!("stock '{}' is not a whole number", display(value)))?;

    if stock < 0 {
        return Err("stock must not be negative".to_string());
    }
    Ok(stock)
}

/// Dimensions from a nested `dimensions` object (or its JSON text), falling back to
/// top-level `length`/`width`/`height`/`weight` columns. Missing or unparseable values are 0.
fn parse_dimensions(row: &RawCatalogRow) -> Result<Dimensions, String> {
    let nested = match row.get("dimensions") {
        Some(Value::Object(map)) => Some(map.clone()),
        Some(Value::String(s)) if !s.trim().is_empty() => {
            match serde_json::from_str::<Value>(s.trim()) {
                Ok(Value::Object(map)) => Some(map),
                _ => return Err("dimensions must be an object of numbers".to_string()),
            }
        }
        _ => None,
    };

    let field = |key: &str| -> f64 {
        nested
            .as_ref()
            .and_then(|map| map.get(key))
            .or_else(|| row.get(key))
            .and_then(number)
            .unwrap_or(0.0)
    };

    Ok(Dimensions {
        length: field("length"),
        width: field("width"),
        height: field("height"),
        weight: field("weight"),
    })
}

fn parse_specifications(value: &Value) -> Result<Vec<Specification>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(specification_from_item).collect(),
        Value::Object(map) => Ok(map
            .iter()
            .filter_map(|(name, value)| {
                text(Some(value)).map(|value| Specification {
                    name: name.trim().to_string(),
                    value,
                })
            })
            .collect()),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(Vec::new())
            } else if s.starts_with('[') || s.starts_with('{') {
                let parsed: Value = serde_json::from_str(s)
                    .map_err(|e| format!("specifications is not valid JSON: {}", e))?;
                parse_specifications(&parsed)
            } else {
                s.split([';', '|'])
                    .map(str::trim)
                    .filter(|pair| !pair.is_empty())
                    .map(specification_from_pair)
                    .collect()
            }
        }
        other => Err(format!("specifications '{}' is not supported", display(other))),
    }
}

fn specification_from_item(item: &Value) -> Result<Specification, String> {
    match item {
        Value::Object(map) => {
            let name = text(map.get("name").or_else(|| map.get("key")))
                .ok_or_else(|| "specification is missing a name".to_string())?;
            let value = text(map.get("value")).unwrap_or_default();
            Ok(Specification { name, value })
        }
        Value::String(pair) => specification_from_pair(pair.trim()),
        other => Err(format!("specification '{}' is not supported", display(other))),
    }
}

fn specification_from_pair(pair: &str) -> Result<Specification, String> {
    match pair.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok(Specification {
            name: name.trim().to_string(),
            value: value.trim().to_string(),
        }),
        _ => Err(format!("specification '{}' must look like name:value", pair)),
    }
}

fn parse_tags(value: &Value) -> BTreeSet<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(|v| text(Some(v))).collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
