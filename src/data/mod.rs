/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SalesDataset (bad rows dropped + counted)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ SalesDataset │  Vec<SaleRecord>, category indices, date span
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterSelection → FilteredView (indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs + one chart-ready table per chart
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
