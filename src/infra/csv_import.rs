//! CSV ingestion for the inventory import flow.
//!
//! - Headers are normalized, then matched to fields by substring.
//! - Bad cells never reject a row: defaults are substituted and the
//!   problem is recorded on the row's `__errors` list.
//! - Only an unreadable file aborts the import.

use std::{fmt, io, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Product, ProductStatus, Sku};

/// Liquidity index assumed when the column is absent or unparseable.
pub const DEFAULT_LIQUIDITY_INDEX: f64 = 50.0;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read file: {0}")]
    Io(#[from] io::Error),
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportIssue {
    #[serde(rename = "Missing SKU")]
    MissingSku,
    #[serde(rename = "Invalid Quantity")]
    InvalidQuantity,
    #[serde(rename = "Invalid Cost")]
    InvalidCost,
}

impl fmt::Display for ImportIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingSku => "Missing SKU",
            Self::InvalidQuantity => "Invalid Quantity",
            Self::InvalidCost => "Invalid Cost",
        })
    }
}

/// One data row after field mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImportedRecord {
    pub id: String,
    pub sku: Sku,
    pub name: String,
    pub category: String,
    pub unit_cost: f64,
    pub selling_price: f64,
    pub quantity: f64,
    pub liquidity_index: f64,
    pub status: ProductStatus,
    #[serde(rename = "__errors", default)]
    pub errors: Vec<ImportIssue>,
}

impl ImportedRecord {
    pub fn has_issues(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_product(self) -> Product {
        Product {
            id: self.id,
            sku: self.sku,
            name: self.name,
            category: self.category,
            cost_basis: self.unit_cost,
            market_price: self.selling_price,
            stock_level: self.quantity,
            velocity: 0.0,
            days_on_hand: 0.0,
            elasticity: -1.5,
            liquidity_score: self.liquidity_index,
            status: self.status,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Sku,
    Name,
    Category,
    Cost,
    Price,
    Quantity,
    Liquidity,
    Status,
}

impl Field {
    /// Substring rules, checked in this order against each header.
    fn classify(header: &str) -> Option<Self> {
        const RULES: &[(Field, &[&str])] = &[
            (Field::Sku, &["sku"]),
            (Field::Cost, &["cost"]),
            (Field::Price, &["price"]),
            (Field::Quantity, &["qty", "quantity", "on_hand"]),
            (Field::Liquidity, &["liquidity", "score"]),
            (Field::Status, &["status"]),
            (Field::Category, &["category"]),
            (Field::Name, &["name", "product"]),
        ];

        RULES
            .iter()
            .find(|(_, needles)| needles.iter().any(|needle| header.contains(needle)))
            .map(|(field, _)| *field)
    }
}

/// Column index per field; the first matching header claims a field.
#[derive(Debug, Default)]
struct ColumnMap {
    sku: Option<usize>,
    name: Option<usize>,
    category: Option<usize>,
    cost: Option<usize>,
    price: Option<usize>,
    quantity: Option<usize>,
    liquidity: Option<usize>,
    status: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Self {
        let mut map = Self::default();
        for (idx, header) in headers.iter().enumerate() {
            let Some(field) = Field::classify(header) else {
                debug!(target: "import", header = %header, "unmapped column");
                continue;
            };
            let slot = match field {
                Field::Sku => &mut map.sku,
                Field::Name => &mut map.name,
                Field::Category => &mut map.category,
                Field::Cost => &mut map.cost,
                Field::Price => &mut map.price,
                Field::Quantity => &mut map.quantity,
                Field::Liquidity => &mut map.liquidity,
                Field::Status => &mut map.status,
            };
            slot.get_or_insert(idx);
        }
        map
    }
}

/// Lower-cases, strips quotes and turns whitespace runs into underscores.
pub fn normalize_header(raw: &str) -> String {
    raw.replace('"', "")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Parses CSV text into records. The first non-blank row is the header.
pub fn parse_csv(text: &str) -> Result<Vec<ImportedRecord>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut columns: Option<ColumnMap> = None;
    let mut records = Vec::new();

    for result in reader.records() {
        let row = result?;
        if is_blank(&row) {
            continue;
        }

        let Some(map) = columns.as_ref() else {
            let headers: Vec<String> = row.iter().map(normalize_header).collect();
            debug!(target: "import", ?headers, "normalized headers");
            columns = Some(ColumnMap::from_headers(&headers));
            continue;
        };

        records.push(map_row(map, &row));
    }

    info!(
        target: "import",
        rows = records.len(),
        with_issues = records.iter().filter(|r| r.has_issues()).count(),
        "parsed csv"
    );
    Ok(records)
}

/// Reads and parses a CSV file. Read failures are the only fatal error.
pub async fn read_csv_file(path: impl AsRef<Path>) -> Result<Vec<ImportedRecord>, ImportError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path).await?;
    debug!(target: "import", path = %path.display(), bytes = text.len(), "read csv file");
    parse_csv(&text)
}

fn is_blank(row: &StringRecord) -> bool {
    row.iter().all(str::is_empty)
}

fn map_row(map: &ColumnMap, row: &StringRecord) -> ImportedRecord {
    let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("");
    let mut errors = Vec::new();

    let sku = cell(map.sku).to_string();
    if sku.is_empty() {
        errors.push(ImportIssue::MissingSku);
    }

    let quantity = match parse_number(cell(map.quantity)) {
        Some(value) => value.trunc(),
        None => {
            errors.push(ImportIssue::InvalidQuantity);
            0.0
        }
    };

    let unit_cost = parse_number(cell(map.cost)).unwrap_or_else(|| {
        errors.push(ImportIssue::InvalidCost);
        0.0
    });

    let selling_price = parse_number(cell(map.price)).unwrap_or(0.0);
    let liquidity_index = parse_number(cell(map.liquidity)).unwrap_or(DEFAULT_LIQUIDITY_INDEX);

    let name = match cell(map.name) {
        "" => sku.clone(),
        name => name.to_string(),
    };

    ImportedRecord {
        id: format!("imp-{}", Uuid::new_v4()),
        sku,
        name,
        category: cell(map.category).to_string(),
        unit_cost,
        selling_price,
        quantity,
        liquidity_index,
        status: ProductStatus::from_import(cell(map.status)),
        errors,
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_start_matches('$');
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}
