use std::collections::BTreeSet;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// SaleRecord – one row of the sales table
// ---------------------------------------------------------------------------

/// A single sales transaction line (one row of the source table).
///
/// The loader guarantees every numeric field parsed cleanly; rows that fail
/// coercion never make it into a [`SalesDataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    pub invoice_id: String,
    pub branch: String,
    pub product_line: String,
    pub customer_type: String,
    /// Payment method, e.g. "Cash", "Credit card", "Ewallet".
    pub payment: String,
    pub unit_price: f64,
    pub quantity: i64,
    /// Tax amount of the line (the "Tax 5%" column).
    pub tax: f64,
    /// unit price × quantity + tax.
    pub total: f64,
    /// Cost of goods sold.
    pub cogs: f64,
    pub gross_income: f64,
    /// Customer rating on the 0–10 scale of the source data.
    pub rating: f64,
    /// Calendar day of the sale; no time component.
    pub date: NaiveDate,
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed category indices.
///
/// Immutable after load for the duration of a session; filtering produces
/// index-based views instead of mutating it.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    /// All sales (rows), in file order.
    pub records: Vec<SaleRecord>,
    /// Sorted unique branch names.
    pub branches: Vec<String>,
    /// Sorted unique product lines.
    pub product_lines: Vec<String>,
    /// Sorted unique customer types.
    pub customer_types: Vec<String>,
    /// Sorted unique payment methods.
    pub payment_methods: Vec<String>,
    /// Min/max sale date, None when the dataset has no rows.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

impl SalesDataset {
    /// Build the category indices and date span from the loaded records.
    pub fn from_records(records: Vec<SaleRecord>) -> Self {
        let mut branches = BTreeSet::new();
        let mut product_lines = BTreeSet::new();
        let mut customer_types = BTreeSet::new();
        let mut payment_methods = BTreeSet::new();
        let mut date_span: Option<(NaiveDate, NaiveDate)> = None;

        for r in &records {
            branches.insert(r.branch.clone());
            product_lines.insert(r.product_line.clone());
            customer_types.insert(r.customer_type.clone());
            payment_methods.insert(r.payment.clone());
            date_span = Some(match date_span {
                None => (r.date, r.date),
                Some((min, max)) => (min.min(r.date), max.max(r.date)),
            });
        }

        SalesDataset {
            records,
            branches: branches.into_iter().collect(),
            product_lines: product_lines.into_iter().collect(),
            customer_types: customer_types.into_iter().collect(),
            payment_methods: payment_methods.into_iter().collect(),
            date_span,
        }
    }

    /// Number of sales.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(branch: &str, line: &str, date: NaiveDate) -> SaleRecord {
        SaleRecord {
            invoice_id: "000-00-0000".into(),
            branch: branch.into(),
            product_line: line.into(),
            customer_type: "Member".into(),
            payment: "Cash".into(),
            unit_price: 10.0,
            quantity: 2,
            tax: 1.0,
            total: 21.0,
            cogs: 20.0,
            gross_income: 1.0,
            rating: 7.0,
            date,
        }
    }

    #[test]
    fn from_records_builds_sorted_unique_indices() {
        let d1 = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let ds = SalesDataset::from_records(vec![
            sale("B", "Food", d1),
            sale("A", "Electronics", d2),
            sale("B", "Electronics", d1),
        ]);

        assert_eq!(ds.branches, vec!["A", "B"]);
        assert_eq!(ds.product_lines, vec!["Electronics", "Food"]);
        assert_eq!(ds.customer_types, vec!["Member"]);
        assert_eq!(ds.date_span, Some((d2, d1)));
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn empty_dataset_has_no_span() {
        let ds = SalesDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.date_span, None);
        assert!(ds.branches.is_empty());
    }
}
