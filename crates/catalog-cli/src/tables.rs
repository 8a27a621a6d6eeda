//! CSV glue: product codes in, product and characteristic tables out.

use std::io::{Read, Write};

use anyhow::{Context, Result, bail};
use catalog_core::models::{CharacteristicRow, ProductSummary};
use catalog_core::report::SkippedCode;
use serde::Serialize;

#[derive(Serialize)]
struct ProductRecord<'a> {
    #[serde(rename = "Product Name")]
    name: &'a str,
    #[serde(rename = "Product Price")]
    price: &'a str,
    #[serde(rename = "Stock Code")]
    stock_code: &'a str,
    #[serde(rename = "Categories")]
    categories: String,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Image Links")]
    images: String,
}

impl<'a> From<&'a ProductSummary> for ProductRecord<'a> {
    fn from(summary: &'a ProductSummary) -> Self {
        Self {
            name: &summary.name,
            price: &summary.display_price,
            stock_code: &summary.stock_code,
            categories: summary.joined_categories(),
            description: &summary.long_description,
            images: summary.joined_images(),
        }
    }
}

#[derive(Serialize)]
struct CharacteristicRecord<'a> {
    #[serde(rename = "Product Code")]
    code: &'a str,
    #[serde(rename = "Product Link")]
    url: &'a str,
    #[serde(rename = "Stock Code")]
    stock_code: &'a str,
    #[serde(rename = "Characteristic")]
    name: &'a str,
    #[serde(rename = "Value")]
    value: &'a str,
}

impl<'a> From<&'a CharacteristicRow> for CharacteristicRecord<'a> {
    fn from(row: &'a CharacteristicRow) -> Self {
        Self {
            code: &row.source_product_code,
            url: &row.source_url,
            stock_code: &row.stock_code,
            name: &row.characteristic_name,
            value: &row.characteristic_value,
        }
    }
}

#[derive(Serialize)]
struct SkippedRecord<'a> {
    code: &'a str,
    kind: String,
    reason: &'a str,
}

/// Read product codes from `column` of a CSV with a header row.
///
/// Cells are trimmed; blank cells are ignored.
pub fn read_codes<R: Read>(input: R, column: &str) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let Some(index) = headers.iter().position(|h| h.trim() == column) else {
        bail!(
            "Column '{}' not found (available: {})",
            column,
            headers.iter().collect::<Vec<_>>().join(", ")
        );
    };

    let mut codes = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Invalid CSV record {}", line + 1))?;
        if let Some(code) = record.get(index).map(str::trim).filter(|c| !c.is_empty()) {
            codes.push(code.to_string());
        }
    }
    Ok(codes)
}

pub fn write_products<W: Write>(output: W, products: &[ProductSummary]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    for product in products {
        writer.serialize(ProductRecord::from(product))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_characteristics<W: Write>(output: W, rows: &[CharacteristicRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    for row in rows {
        writer.serialize(CharacteristicRecord::from(row))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_skipped<W: Write>(output: W, skipped: &[SkippedCode]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    for entry in skipped {
        writer.serialize(SkippedRecord {
            code: &entry.code,
            kind: entry.kind.to_string(),
            reason: &entry.reason,
        })?;
    }
    writer.flush()?;
    Ok(())
}
