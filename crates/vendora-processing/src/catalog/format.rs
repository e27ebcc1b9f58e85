//! Bulk catalog file parsing
//!
//! The parser is picked from the upload's file extension. Parsing itself is a pure
//! function of the bytes ([`FormatDispatcher::parse_bytes`]); [`FormatDispatcher::dispatch`]
//! adds the file handling around it and always removes the staged upload.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::{Map, Number, Value};
use vendora_core::models::RawCatalogRow;

use crate::error::DispatchError;
use crate::staging::StagedFile;

/// Supported bulk catalog formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Csv,
    Tsv,
    Xlsx,
    Xls,
    Xlsm,
    Ods,
    Json,
}

impl CatalogFormat {
    /// Pick a format from a filename's extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, DispatchError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(CatalogFormat::Csv),
            "tsv" => Ok(CatalogFormat::Tsv),
            "xlsx" => Ok(CatalogFormat::Xlsx),
            "xls" => Ok(CatalogFormat::Xls),
            "xlsm" => Ok(CatalogFormat::Xlsm),
            "ods" => Ok(CatalogFormat::Ods),
            "json" => Ok(CatalogFormat::Json),
            _ => Err(DispatchError::UnsupportedFormat { extension }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CatalogFormat::Csv => "csv",
            CatalogFormat::Tsv => "tsv",
            CatalogFormat::Xlsx => "xlsx",
            CatalogFormat::Xls => "xls",
            CatalogFormat::Xlsm => "xlsm",
            CatalogFormat::Ods => "ods",
            CatalogFormat::Json => "json",
        }
    }

    fn parse_error(self, diagnostic: impl ToString) -> DispatchError {
        DispatchError::Parse {
            format: self.name(),
            diagnostic: diagnostic.to_string(),
        }
    }
}

/// Rows parsed out of one bulk file, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCatalog {
    pub format: CatalogFormat,
    pub rows: Vec<RawCatalogRow>,
}

pub struct FormatDispatcher;

impl FormatDispatcher {
    /// Parse a staged bulk upload. The staged file is removed whatever the outcome.
    pub async fn dispatch(
        file: StagedFile,
        original_filename: &str,
    ) -> Result<ParsedCatalog, DispatchError> {
        let format = match CatalogFormat::from_filename(original_filename) {
            Ok(format) => format,
            Err(e) => {
                drop(file);
                return Err(e);
            }
        };

        tracing::debug!(
            format = format.name(),
            path = %file.path().display(),
            "Parsing catalog file"
        );

        let rows = tokio::task::spawn_blocking(move || {
            let data = std::fs::read(file.path())?;
            drop(file);
            Self::parse_bytes(format, &data)
        })
        .await
        .map_err(|e| DispatchError::Io(std::io::Error::other(e)))??;

        Ok(ParsedCatalog { format, rows })
    }

    /// Parse `data` as `format`. Deterministic: the same bytes always give the same rows.
    pub fn parse_bytes(
        format: CatalogFormat,
        data: &[u8],
    ) -> Result<Vec<RawCatalogRow>, DispatchError> {
        let data = strip_bom(data);
        match format {
            CatalogFormat::Csv => parse_delimited(format, data, b','),
            CatalogFormat::Tsv => parse_delimited(format, data, b'\t'),
            CatalogFormat::Xlsx | CatalogFormat::Xls | CatalogFormat::Xlsm | CatalogFormat::Ods => {
                parse_spreadsheet(format, data)
            }
            CatalogFormat::Json => parse_json(format, data),
        }
    }
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(data)
}

fn parse_delimited(
    format: CatalogFormat,
    data: &[u8],
    delimiter: u8,
) -> Result<Vec<RawCatalogRow>, DispatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| format.parse_error(e))?
        .clone();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| format.parse_error(e))?;
        let fields: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();
        push_row(&mut rows, index, fields);
    }

    Ok(rows)
}

fn parse_spreadsheet(
    format: CatalogFormat,
    data: &[u8],
) -> Result<Vec<RawCatalogRow>, DispatchError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(data)).map_err(|e| format.parse_error(e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| format.parse_error("workbook has no worksheets"))?
        .map_err(|e| format.parse_error(e))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for (index, sheet_row) in sheet_rows.enumerate() {
        let fields: Map<String, Value> = headers
            .iter()
            .zip(sheet_row.iter())
            .filter(|(header, _)| !header.is_empty())
            .filter_map(|(header, cell)| cell_value(cell).map(|v| (header.clone(), v)))
            .collect();
        push_row(&mut rows, index, fields);
    }

    Ok(rows)
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(Value::String(s.trim().to_string())),
        Data::Int(i) => Some(Value::Number((*i).into())),
        Data::Float(f) => Number::from_f64(*f).map(Value::Number),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => Number::from_f64(dt.as_f64()).map(Value::Number),
        other => Some(Value::String(other.to_string())),
    }
}

fn parse_json(format: CatalogFormat, data: &[u8]) -> Result<Vec<RawCatalogRow>, DispatchError> {
    let document: Value = serde_json::from_slice(data).map_err(|e| format.parse_error(e))?;

    let elements = match document {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("products") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                object.insert("products".to_string(), other);
                vec![Value::Object(object)]
            }
            None => vec![Value::Object(object)],
        },
        _ => {
            return Err(format.parse_error(
                "expected an array of products or an object with a \"products\" array",
            ))
        }
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| match element {
            Value::Object(fields) => Ok(RawCatalogRow::new(index, fields)),
            _ => Err(format.parse_error(format!("element {} is not an object", index))),
        })
        .collect()
}

/// Append a row unless every cell is blank. Skipped records still use up their index.
fn push_row(rows: &mut Vec<RawCatalogRow>, index: usize, fields: Map<String, Value>) {
    let row = RawCatalogRow::new(index, fields);
    if !row.is_blank() {
        rows.push(row);
    }
}
