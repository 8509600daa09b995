//! CSV output in the import template layout, so exports can be re-imported.

use std::io;

use csv::Writer;
use thiserror::Error;

use crate::domain::Product;

pub const TEMPLATE_HEADERS: [&str; 6] = [
    "sku",
    "product_name",
    "unit_cost",
    "quantity_on_hand",
    "liquidity_index",
    "status",
];

const TEMPLATE_SAMPLE: [&str; 6] = ["SKU-001", "Sample Product", "12.50", "100", "50", "active"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("export is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Header row plus one sample row.
pub fn template_csv() -> Result<String, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(TEMPLATE_HEADERS)?;
    writer.write_record(TEMPLATE_SAMPLE)?;
    finish(writer)
}

pub fn export_inventory(products: &[Product]) -> Result<String, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());
    write_inventory(&mut writer, products)?;
    finish(writer)
}

pub fn write_inventory<W: io::Write>(
    writer: &mut Writer<W>,
    products: &[Product],
) -> Result<(), ExportError> {
    writer.write_record(TEMPLATE_HEADERS)?;
    for product in products {
        writer.write_record([
            product.sku.clone(),
            product.name.clone(),
            format_number(product.cost_basis),
            format_number(product.stock_level),
            format_number(product.liquidity_score),
            product.status.label().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Shortest form that parses back to the same `f64`.
fn format_number(value: f64) -> String {
    value.to_string()
}
