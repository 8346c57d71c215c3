use std::path::Path;

use crate::color::CategoryColors;
use crate::data::aggregate::DashboardAggregates;
use crate::data::filter::{apply_filters, FilterSelection};
use crate::data::loader::LoadCache;
use crate::data::model::SalesDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<SalesDataset>,

    /// Current filter selection; replaced wholesale on every control change.
    pub selection: FilterSelection,

    /// Indices of sales passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Chart inputs derived from the current view, recomputed with it.
    pub aggregates: Option<DashboardAggregates>,

    /// Colour assignments per categorical column.
    pub product_colors: CategoryColors,
    pub customer_colors: CategoryColors,
    pub payment_colors: CategoryColors,

    /// Memoized file loading keyed by path + mtime.
    pub load_cache: LoadCache,

    /// Row accounting from the last successful load.
    pub rows_read: usize,
    pub rows_dropped: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            selection: FilterSelection::default(),
            visible_indices: Vec::new(),
            aggregates: None,
            product_colors: CategoryColors::default(),
            customer_colors: CategoryColors::default(),
            payment_colors: CategoryColors::default(),
            load_cache: LoadCache::default(),
            rows_read: 0,
            rows_dropped: 0,
            status_message: None,
        }
    }
}

impl AppState {
    /// Load a file through the cache and ingest it on success.
    pub fn load_path(&mut self, path: &Path) {
        match self.load_cache.load(path) {
            Ok(loaded) => {
                log::info!(
                    "loaded {} sales from {} ({} of {} rows dropped)",
                    loaded.dataset.len(),
                    path.display(),
                    loaded.rows_dropped,
                    loaded.rows_read,
                );
                self.rows_read = loaded.rows_read;
                self.rows_dropped = loaded.rows_dropped;
                self.set_dataset(loaded.dataset);
            }
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset: default selection, fresh colours.
    pub fn set_dataset(&mut self, dataset: SalesDataset) {
        self.selection = FilterSelection::full_span(&dataset);
        self.product_colors = CategoryColors::new(&dataset.product_lines);
        self.customer_colors = CategoryColors::new(&dataset.customer_types);
        self.payment_colors = CategoryColors::new(&dataset.payment_methods);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the filtered view and every chart aggregate.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            let view = apply_filters(ds, &self.selection);
            self.aggregates = Some(DashboardAggregates::compute(&view, &self.selection));
            self.visible_indices = view.into_indices();
        }
    }

    /// Replace the whole selection and refilter.
    pub fn set_selection(&mut self, selection: FilterSelection) {
        self.selection = selection;
        self.refilter();
    }

    /// Back to the all-pass defaults for the loaded dataset.
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection = FilterSelection::full_span(ds);
            self.refilter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::CategoryFilter;
    use crate::data::model::SaleRecord;
    use chrono::NaiveDate;

    fn sale(branch: &str, total: f64, day: u32) -> SaleRecord {
        SaleRecord {
            invoice_id: format!("{branch}-{day}"),
            branch: branch.into(),
            product_line: "Food".into(),
            customer_type: "Member".into(),
            payment: "Cash".into(),
            unit_price: total,
            quantity: 1,
            tax: 0.0,
            total,
            cogs: total,
            gross_income: 0.0,
            rating: 7.0,
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
        }
    }

    fn dataset() -> SalesDataset {
        SalesDataset::from_records(vec![
            sale("A", 100.0, 1),
            sale("B", 50.0, 2),
        ])
    }

    #[test]
    fn set_dataset_selects_everything() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.selection.branch, CategoryFilter::All);
        assert_eq!(
            state.selection.date_bounds(),
            Some((
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
            ))
        );
        let aggregates = state.aggregates.as_ref().unwrap();
        assert_eq!(aggregates.kpis.as_ref().unwrap().total_revenue, 150.0);
    }

    #[test]
    fn selection_change_recomputes_view_and_aggregates() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        let mut selection = state.selection.clone();
        selection.branch = CategoryFilter::One("A".into());
        state.set_selection(selection);

        assert_eq!(state.visible_indices, vec![0]);
        let aggregates = state.aggregates.as_ref().unwrap();
        assert_eq!(aggregates.kpis.as_ref().unwrap().total_revenue, 100.0);
    }

    #[test]
    fn reset_restores_the_full_view() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        let mut selection = state.selection.clone();
        selection.branch = CategoryFilter::One("B".into());
        state.set_selection(selection);
        assert_eq!(state.visible_indices.len(), 1);

        state.reset_filters();
        assert_eq!(state.visible_indices.len(), 2);
    }

    #[test]
    fn empty_match_keeps_aggregates_in_no_data_state() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        let mut selection = state.selection.clone();
        selection.branch = CategoryFilter::One("Z".into());
        state.set_selection(selection);

        assert!(state.visible_indices.is_empty());
        let aggregates = state.aggregates.as_ref().unwrap();
        assert!(aggregates.kpis.is_none());
        assert!(aggregates.revenue_over_time.is_none());
    }
}
