use std::fmt;

use chrono::NaiveDate;

use super::model::{SaleRecord, SalesDataset};

// ---------------------------------------------------------------------------
// FilterSelection – the user-chosen constraints
// ---------------------------------------------------------------------------

/// One sidebar control: a single category value, or no constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    One(String),
}

impl CategoryFilter {
    /// Exact, case-sensitive match; `All` passes everything.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::One(v) => v == value,
        }
    }

    /// The selected value, if the filter is constrained to one.
    pub fn selected(&self) -> Option<&str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::One(v) => Some(v),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "All"),
            CategoryFilter::One(v) => write!(f, "{v}"),
        }
    }
}

/// The active set of constraints. A value object: created from dataset
/// defaults, replaced wholesale whenever a control changes.
///
/// The date endpoints are independent options; the range only applies when
/// both are present (a half-picked range filters nothing).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSelection {
    pub branch: CategoryFilter,
    pub product_line: CategoryFilter,
    pub customer_type: CategoryFilter,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

impl FilterSelection {
    /// Default selection for a dataset: no category constraint, full span.
    pub fn full_span(dataset: &SalesDataset) -> Self {
        let (date_start, date_end) = match dataset.date_span {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };
        FilterSelection {
            branch: CategoryFilter::All,
            product_line: CategoryFilter::All,
            customer_type: CategoryFilter::All,
            date_start,
            date_end,
        }
    }

    /// Both endpoints of the date range, or None when the filter is skipped.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.date_start, self.date_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the matching subset of the dataset
// ---------------------------------------------------------------------------

/// A read-only subset of the dataset matching one selection.
///
/// Holds indices into the dataset rather than copies; recomputed fully on
/// every selection change.
#[derive(Debug)]
pub struct FilteredView<'a> {
    dataset: &'a SalesDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Iterate the matching records in dataset order.
    pub fn records(&self) -> impl Iterator<Item = &'a SaleRecord> + '_ {
        self.indices.iter().map(move |&i| &self.dataset.records[i])
    }

    /// Indices of the matching records.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Consume the view, keeping only its indices.
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Apply a selection to the dataset.
///
/// All predicates are AND-combined. An empty result is a valid empty view,
/// not an error. No record is excluded by a control left on `All`.
pub fn apply_filters<'a>(
    dataset: &'a SalesDataset,
    selection: &FilterSelection,
) -> FilteredView<'a> {
    let date_bounds = selection.date_bounds();

    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            selection.branch.matches(&r.branch)
                && selection.product_line.matches(&r.product_line)
                && selection.customer_type.matches(&r.customer_type)
                && date_bounds.map_or(true, |(start, end)| start <= r.date && r.date <= end)
        })
        .map(|(i, _)| i)
        .collect();

    FilteredView { dataset, indices }
}
