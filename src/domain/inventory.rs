//! In-memory inventory keyed by SKU.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::infra::csv_import::ImportedRecord;
use crate::util::settings::Settings;

use super::entities::{Product, ProductStatus, Sku};

/// Counts produced by [`Inventory::merge_imported`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub added: usize,
    pub updated: usize,
    /// Rows without a SKU; they cannot be keyed.
    pub skipped: usize,
}

/// Wholesale changes applied to a selection of products.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkEdit {
    pub status: Option<ProductStatus>,
    pub market_price: Option<f64>,
    /// Percentage taken off the current market price, applied after `market_price`.
    /// Values above 100 floor the price at zero.
    pub markdown_percent: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    products: Vec<Product>,
}

impl Inventory {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, sku: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.sku == sku)
    }

    /// Merges imported rows by SKU, last write wins.
    ///
    /// A SKU already present is overwritten in place; new SKUs are appended
    /// in import order.
    pub fn merge_imported(&mut self, records: Vec<ImportedRecord>) -> MergeReport {
        let mut positions: HashMap<Sku, usize> = self
            .products
            .iter()
            .enumerate()
            .map(|(idx, product)| (product.sku.clone(), idx))
            .collect();
        let mut report = MergeReport::default();

        for record in records {
            if record.sku.is_empty() {
                report.skipped += 1;
                continue;
            }
            let product = record.into_product();
            match positions.get(&product.sku) {
                Some(&idx) => {
                    self.products[idx] = product;
                    report.updated += 1;
                }
                None => {
                    positions.insert(product.sku.clone(), self.products.len());
                    self.products.push(product);
                    report.added += 1;
                }
            }
        }

        debug!(target: "inventory", ?report, total = self.products.len(), "merged import");
        report
    }

    /// Applies `edit` to every product whose SKU is listed. Returns how many changed.
    pub fn bulk_edit(&mut self, skus: &[Sku], edit: &BulkEdit) -> usize {
        let mut touched = 0;
        for product in self.products.iter_mut().filter(|p| skus.contains(&p.sku)) {
            if let Some(status) = edit.status {
                product.status = status;
            }
            if let Some(price) = edit.market_price {
                product.market_price = price;
            }
            if let Some(pct) = edit.markdown_percent {
                product.market_price *= (1.0 - pct / 100.0).max(0.0);
            }
            touched += 1;
        }
        touched
    }

    pub fn rescore(&mut self, settings: &Settings) {
        for product in &mut self.products {
            product.refresh_liquidity_score(settings);
        }
    }

    pub fn at_risk(&self, threshold: f64) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |p| p.liquidity_score < threshold)
    }

    pub fn total_value(&self) -> f64 {
        self.products.iter().map(Product::market_value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::csv_import::parse_csv;

    const FIRST: &str = "sku,product_name,unit_cost,quantity_on_hand,liquidity_index,status\n\
        A,Alpha,1,10,80,active\n\
        B,Bravo,2,20,30,at-risk\n";

    fn seeded() -> Inventory {
        let mut inventory = Inventory::default();
        inventory.merge_imported(parse_csv(FIRST).unwrap());
        inventory
    }

    #[test]
    fn overwrite_keeps_length_and_position() {
        let mut inventory = seeded();
        let again = "sku,product_name,unit_cost,quantity_on_hand\nA,Alpha v2,5,99\n";
        let report = inventory.merge_imported(parse_csv(again).unwrap());

        assert_eq!(report, MergeReport { added: 0, updated: 1, skipped: 0 });
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.products()[0].name, "Alpha v2");
        assert_eq!(inventory.products()[0].stock_level, 99.0);
    }

    #[test]
    fn last_duplicate_in_one_file_wins() {
        let mut inventory = Inventory::default();
        let csv = "sku,cost,qty\nX,1,1\nY,1,1\nX,3,3\n";
        let report = inventory.merge_imported(parse_csv(csv).unwrap());

        assert_eq!(report.added, 2);
        assert_eq!(report.updated, 1);
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.get("X").unwrap().cost_basis, 3.0);
    }

    #[test]
    fn rows_without_sku_are_skipped() {
        let mut inventory = seeded();
        let report = inventory.merge_imported(parse_csv("sku,cost,qty\n,1,1\nC,1,1\n").unwrap());
        assert_eq!(report.skipped, 1);
        assert_eq!(report.added, 1);
        assert_eq!(inventory.len(), 3);
    }

    #[test]
    fn bulk_edit_applies_price_then_markdown() {
        let mut inventory = seeded();
        let edit = BulkEdit {
            status: Some(ProductStatus::Liquidating),
            market_price: Some(200.0),
            markdown_percent: Some(25.0),
        };
        let touched = inventory.bulk_edit(&["B".to_string(), "missing".to_string()], &edit);

        assert_eq!(touched, 1);
        let bravo = inventory.get("B").unwrap();
        assert_eq!(bravo.status, ProductStatus::Liquidating);
        assert_eq!(bravo.market_price, 150.0);
        assert_eq!(inventory.get("A").unwrap().status, ProductStatus::Active);
    }

    #[test]
    fn markdown_beyond_full_price_floors_at_zero() {
        let mut inventory = seeded();
        let edit = BulkEdit {
            markdown_percent: Some(150.0),
            market_price: Some(40.0),
            ..BulkEdit::default()
        };
        inventory.bulk_edit(&["A".to_string()], &edit);
        assert_eq!(inventory.get("A").unwrap().market_price, 0.0);
    }

    #[test]
    fn at_risk_and_total_value() {
        let mut inventory = seeded();
        let skus: Vec<Sku> = vec!["A".into(), "B".into()];
        inventory.bulk_edit(&skus, &BulkEdit { market_price: Some(10.0), ..BulkEdit::default() });

        let risky: Vec<_> = inventory.at_risk(40.0).map(|p| p.sku.as_str()).collect();
        assert_eq!(risky, ["B"]);
        assert_eq!(inventory.total_value(), 300.0);
    }

    #[test]
    fn serializes_as_plain_array() {
        let inventory = seeded();
        let json = serde_json::to_value(&inventory).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(2));
        let back: Inventory = serde_json::from_value(json).unwrap();
        assert_eq!(back, inventory);
    }
}
