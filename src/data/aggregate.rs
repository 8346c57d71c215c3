use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::filter::{CategoryFilter, FilterSelection, FilteredView};
use super::model::SaleRecord;

// ---------------------------------------------------------------------------
// Chart aggregations
//
// Every function here is a pure function of a FilteredView: nothing is
// mutated, order of evaluation does not matter, and `None` is the explicit
// "no data / insufficient data" result. The guards never substitute zeros
// for undefined quantities (the mean of an empty set stays undefined).
// ---------------------------------------------------------------------------

/// Number of histogram buckets for the rating distribution.
pub const RATING_BUCKETS: usize = 10;

/// The four top-line numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiSummary {
    pub total_revenue: f64,
    pub gross_income: f64,
    pub mean_rating: f64,
    /// Count of distinct invoice identifiers.
    pub transactions: usize,
}

/// KPI summary, `None` when the view is empty.
pub fn kpi_summary(view: &FilteredView) -> Option<KpiSummary> {
    if view.is_empty() {
        return None;
    }
    let mut total_revenue = 0.0;
    let mut gross_income = 0.0;
    let mut rating_sum = 0.0;
    let mut invoices: BTreeSet<&str> = BTreeSet::new();
    for r in view.records() {
        total_revenue += r.total;
        gross_income += r.gross_income;
        rating_sum += r.rating;
        invoices.insert(r.invoice_id.as_str());
    }
    Some(KpiSummary {
        total_revenue,
        gross_income,
        mean_rating: rating_sum / view.len() as f64,
        transactions: invoices.len(),
    })
}

/// Sum of `total` per calendar day, ascending by day.
pub fn revenue_over_time(view: &FilteredView) -> Option<Vec<(NaiveDate, f64)>> {
    if view.is_empty() {
        return None;
    }
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in view.records() {
        *by_day.entry(r.date).or_insert(0.0) += r.total;
    }
    Some(by_day.into_iter().collect())
}

/// Sum of `total` per product line, descending by sum.
pub fn revenue_by_product_line(view: &FilteredView) -> Option<Vec<(String, f64)>> {
    if view.is_empty() {
        return None;
    }
    Some(sum_by_key(view, |r| r.product_line.clone(), |r| r.total))
}

/// Group-by-and-sum helper; descending by sum, name as tie-break so the
/// output is deterministic.
fn sum_by_key(
    view: &FilteredView,
    key: impl Fn(&SaleRecord) -> String,
    value: impl Fn(&SaleRecord) -> f64,
) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for r in view.records() {
        *sums.entry(key(r)).or_insert(0.0) += value(r);
    }
    let mut out: Vec<(String, f64)> = sums.into_iter().collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

// ---------------------------------------------------------------------------
// Rating distribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RatingBucket {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

/// Min, quartiles, max of a distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    /// `values` must be sorted ascending and non-empty.
    fn from_sorted(values: &[f64]) -> Self {
        FiveNumberSummary {
            min: values[0],
            q1: quantile(values, 0.25),
            median: quantile(values, 0.5),
            q3: quantile(values, 0.75),
            max: values[values.len() - 1],
        }
    }
}

/// Quantile by linear interpolation between closest ranks.
/// `sorted` must be ascending and non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingDistribution {
    /// Fixed-count histogram over the observed rating range.
    pub buckets: Vec<RatingBucket>,
    /// All ratings, ascending; feeds the marginal box rendering.
    pub sorted_ratings: Vec<f64>,
    pub summary: FiveNumberSummary,
}

pub fn rating_distribution(view: &FilteredView) -> Option<RatingDistribution> {
    let mut ratings: Vec<f64> = view.records().map(|r| r.rating).collect();
    if ratings.is_empty() {
        return None;
    }
    ratings.sort_by(f64::total_cmp);
    let min = ratings[0];
    let max = ratings[ratings.len() - 1];
    let width = (max - min) / RATING_BUCKETS as f64;

    let mut buckets: Vec<RatingBucket> = (0..RATING_BUCKETS)
        .map(|i| RatingBucket {
            lo: min + i as f64 * width,
            hi: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();
    for &r in &ratings {
        // Degenerate range (all ratings equal) collapses into bucket 0.
        let idx = if width > 0.0 {
            (((r - min) / width) as usize).min(RATING_BUCKETS - 1)
        } else {
            0
        };
        buckets[idx].count += 1;
    }

    let summary = FiveNumberSummary::from_sorted(&ratings);
    Some(RatingDistribution {
        buckets,
        sorted_ratings: ratings,
        summary,
    })
}

// ---------------------------------------------------------------------------
// Spending by customer type
// ---------------------------------------------------------------------------

/// One box-plot group: the full distribution, not just a mean.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingGroup {
    pub customer_type: String,
    /// Every `total` in the group, ascending.
    pub totals: Vec<f64>,
    pub summary: FiveNumberSummary,
    /// Extreme values still within 1.5 IQR of the box (Tukey fences).
    pub whisker_low: f64,
    pub whisker_high: f64,
    /// Values outside the fences.
    pub outliers: Vec<f64>,
}

pub fn spending_by_customer_type(view: &FilteredView) -> Option<Vec<SpendingGroup>> {
    if view.is_empty() {
        return None;
    }
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in view.records() {
        groups.entry(r.customer_type.clone()).or_default().push(r.total);
    }
    Some(
        groups
            .into_iter()
            .map(|(customer_type, mut totals)| {
                totals.sort_by(f64::total_cmp);
                let summary = FiveNumberSummary::from_sorted(&totals);
                let iqr = summary.q3 - summary.q1;
                let lo_fence = summary.q1 - 1.5 * iqr;
                let hi_fence = summary.q3 + 1.5 * iqr;
                let whisker_low = totals
                    .iter()
                    .copied()
                    .find(|v| *v >= lo_fence)
                    .unwrap_or(summary.min);
                let whisker_high = totals
                    .iter()
                    .rev()
                    .copied()
                    .find(|v| *v <= hi_fence)
                    .unwrap_or(summary.max);
                let outliers = totals
                    .iter()
                    .copied()
                    .filter(|v| *v < lo_fence || *v > hi_fence)
                    .collect();
                SpendingGroup {
                    customer_type,
                    totals,
                    summary,
                    whisker_low,
                    whisker_high,
                    outliers,
                }
            })
            .collect(),
    )
}

/// Row count per payment method, descending.
pub fn payment_method_counts(view: &FilteredView) -> Option<Vec<(String, usize)>> {
    if view.is_empty() {
        return None;
    }
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for r in view.records() {
        *counts.entry(r.payment.clone()).or_insert(0) += 1;
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Some(out)
}

// ---------------------------------------------------------------------------
// Gross income composition
// ---------------------------------------------------------------------------

/// Per-branch stacked segments for the all-branches rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchComposition {
    pub branch: String,
    /// (product line, gross income), one entry per line present in the
    /// branch, ordered by product line name.
    pub segments: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IncomeComposition {
    /// A single branch is selected: gross income per product line, descending.
    ByProductLine(Vec<(String, f64)>),
    /// All branches: stacked by product line within each branch.
    Stacked(Vec<BranchComposition>),
}

/// Gross income composition; the mode follows the branch filter.
pub fn gross_income_composition(
    view: &FilteredView,
    branch: &CategoryFilter,
) -> Option<IncomeComposition> {
    if view.is_empty() {
        return None;
    }
    match branch {
        CategoryFilter::One(_) => Some(IncomeComposition::ByProductLine(sum_by_key(
            view,
            |r| r.product_line.clone(),
            |r| r.gross_income,
        ))),
        CategoryFilter::All => {
            let mut by_branch: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
            for r in view.records() {
                *by_branch
                    .entry(r.branch.clone())
                    .or_default()
                    .entry(r.product_line.clone())
                    .or_insert(0.0) += r.gross_income;
            }
            Some(IncomeComposition::Stacked(
                by_branch
                    .into_iter()
                    .map(|(branch, lines)| BranchComposition {
                        branch,
                        segments: lines.into_iter().collect(),
                    })
                    .collect(),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Cost vs. gross income
// ---------------------------------------------------------------------------

/// One scatter point with its hover/colour context.
#[derive(Debug, Clone, PartialEq)]
pub struct CogsIncomePoint {
    pub cogs: f64,
    pub gross_income: f64,
    pub product_line: String,
    pub branch: String,
    pub total: f64,
}

/// y = intercept + slope·x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares fit of y on x.
///
/// `None` with fewer than two points or zero variance in x.
pub fn fit_linear_trend(xs: &[f64], ys: &[f64]) -> Option<LinearTrend> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearTrend {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Pass-through of the relevant columns plus an optional fitted trend.
#[derive(Debug, Clone, PartialEq)]
pub struct CogsIncomeRelation {
    pub points: Vec<CogsIncomePoint>,
    pub trend: Option<LinearTrend>,
}

pub fn cogs_income_relation(view: &FilteredView) -> Option<CogsIncomeRelation> {
    if view.is_empty() {
        return None;
    }
    let points: Vec<CogsIncomePoint> = view
        .records()
        .map(|r| CogsIncomePoint {
            cogs: r.cogs,
            gross_income: r.gross_income,
            product_line: r.product_line.clone(),
            branch: r.branch.clone(),
            total: r.total,
        })
        .collect();
    let xs: Vec<f64> = points.iter().map(|p| p.cogs).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.gross_income).collect();
    let trend = fit_linear_trend(&xs, &ys);
    Some(CogsIncomeRelation { points, trend })
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// The fixed numeric columns of the correlation heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    UnitPrice,
    Quantity,
    Tax,
    Total,
    Cogs,
    GrossIncome,
    Rating,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 7] = [
        NumericColumn::UnitPrice,
        NumericColumn::Quantity,
        NumericColumn::Tax,
        NumericColumn::Total,
        NumericColumn::Cogs,
        NumericColumn::GrossIncome,
        NumericColumn::Rating,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NumericColumn::UnitPrice => "Unit price",
            NumericColumn::Quantity => "Quantity",
            NumericColumn::Tax => "Tax",
            NumericColumn::Total => "Total",
            NumericColumn::Cogs => "COGS",
            NumericColumn::GrossIncome => "Gross income",
            NumericColumn::Rating => "Rating",
        }
    }

    /// Abbreviated label for tight heatmap headers.
    pub fn short_label(self) -> &'static str {
        match self {
            NumericColumn::UnitPrice => "Price",
            NumericColumn::Quantity => "Qty",
            NumericColumn::Tax => "Tax",
            NumericColumn::Total => "Total",
            NumericColumn::Cogs => "COGS",
            NumericColumn::GrossIncome => "Income",
            NumericColumn::Rating => "Rating",
        }
    }

    fn value(self, r: &SaleRecord) -> f64 {
        match self {
            NumericColumn::UnitPrice => r.unit_price,
            NumericColumn::Quantity => r.quantity as f64,
            NumericColumn::Tax => r.tax,
            NumericColumn::Total => r.total,
            NumericColumn::Cogs => r.cogs,
            NumericColumn::GrossIncome => r.gross_income,
            NumericColumn::Rating => r.rating,
        }
    }
}

/// Symmetric Pearson correlation matrix over [`NumericColumn::ALL`].
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    /// Row-major, `columns.len()` squared.
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.columns.len() + j]
    }
}

/// Pairwise Pearson correlation across the fixed numeric columns.
///
/// The typed record makes every column present, so the remaining guard is
/// on rows: `None` under two. The diagonal is exactly 1.0; a zero-variance
/// pair yields NaN (rendered as a blank cell), as the source data would.
pub fn correlation_matrix(view: &FilteredView) -> Option<CorrelationMatrix> {
    if view.len() < 2 {
        return None;
    }
    let series: Vec<Vec<f64>> = NumericColumn::ALL
        .iter()
        .map(|c| view.records().map(|r| c.value(r)).collect())
        .collect();

    let n = NumericColumn::ALL.len();
    let mut values = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..=i {
            let r = if i == j {
                1.0
            } else {
                pearson(&series[i], &series[j])
            };
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }
    Some(CorrelationMatrix {
        columns: NumericColumn::ALL.to_vec(),
        values,
    })
}

/// Pearson r; NaN when either series has zero variance.
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        sxx += (x - mean_x) * (x - mean_x);
        syy += (y - mean_y) * (y - mean_y);
        sxy += (x - mean_x) * (y - mean_y);
    }
    sxy / (sxx.sqrt() * syy.sqrt())
}

// ---------------------------------------------------------------------------
// The full recomputation bundle
// ---------------------------------------------------------------------------

/// Everything the dashboard renders, recomputed in one pass whenever the
/// selection changes. Each field is independently `None` when its data
/// guard fails.
#[derive(Debug, Clone)]
pub struct DashboardAggregates {
    pub kpis: Option<KpiSummary>,
    pub revenue_over_time: Option<Vec<(NaiveDate, f64)>>,
    pub revenue_by_product_line: Option<Vec<(String, f64)>>,
    pub rating_distribution: Option<RatingDistribution>,
    pub spending_by_customer_type: Option<Vec<SpendingGroup>>,
    pub payment_counts: Option<Vec<(String, usize)>>,
    pub income_composition: Option<IncomeComposition>,
    pub cogs_income: Option<CogsIncomeRelation>,
    pub correlation: Option<CorrelationMatrix>,
}

impl DashboardAggregates {
    pub fn compute(view: &FilteredView, selection: &FilterSelection) -> Self {
        DashboardAggregates {
            kpis: kpi_summary(view),
            revenue_over_time: revenue_over_time(view),
            revenue_by_product_line: revenue_by_product_line(view),
            rating_distribution: rating_distribution(view),
            spending_by_customer_type: spending_by_customer_type(view),
            payment_counts: payment_method_counts(view),
            income_composition: gross_income_composition(view, &selection.branch),
            cogs_income: cogs_income_relation(view),
            correlation: correlation_matrix(view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::apply_filters;
    use crate::data::model::SalesDataset;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    struct Row {
        invoice: &'static str,
        branch: &'static str,
        line: &'static str,
        customer: &'static str,
        payment: &'static str,
        total: f64,
        gross: f64,
        rating: f64,
        day: u32,
    }

    fn record(r: Row) -> SaleRecord {
        SaleRecord {
            invoice_id: r.invoice.into(),
            branch: r.branch.into(),
            product_line: r.line.into(),
            customer_type: r.customer.into(),
            payment: r.payment.into(),
            unit_price: (r.total - r.gross) / 2.0,
            quantity: 2,
            tax: r.gross,
            total: r.total,
            cogs: r.total - r.gross,
            gross_income: r.gross,
            rating: r.rating,
            date: date(r.day),
        }
    }

    fn dataset() -> SalesDataset {
        SalesDataset::from_records(vec![
            record(Row { invoice: "1", branch: "A", line: "Electronics", customer: "Member", payment: "Cash", total: 100.0, gross: 5.0, rating: 8.0, day: 1 }),
            record(Row { invoice: "2", branch: "B", line: "Electronics", customer: "Normal", payment: "Ewallet", total: 50.0, gross: 2.5, rating: 6.0, day: 2 }),
            record(Row { invoice: "3", branch: "A", line: "Food", customer: "Member", payment: "Cash", total: 30.0, gross: 1.5, rating: 9.0, day: 3 }),
            record(Row { invoice: "3", branch: "A", line: "Food", customer: "Normal", payment: "Credit card", total: 20.0, gross: 1.0, rating: 4.0, day: 3 }),
        ])
    }

    fn full_view(ds: &SalesDataset) -> FilteredView<'_> {
        apply_filters(ds, &FilterSelection::default())
    }

    #[test]
    fn kpis_sum_and_count_distinct_invoices() {
        let ds = dataset();
        let k = kpi_summary(&full_view(&ds)).unwrap();
        assert_eq!(k.total_revenue, 200.0);
        assert_eq!(k.gross_income, 10.0);
        assert!((k.mean_rating - 6.75).abs() < 1e-12);
        // Invoice "3" appears twice but counts once.
        assert_eq!(k.transactions, 3);
    }

    #[test]
    fn kpis_are_undefined_on_empty_view() {
        let ds = dataset();
        let selection = FilterSelection {
            branch: CategoryFilter::One("nope".into()),
            ..Default::default()
        };
        let view = apply_filters(&ds, &selection);
        assert!(kpi_summary(&view).is_none());
        assert!(revenue_over_time(&view).is_none());
        assert!(payment_method_counts(&view).is_none());
        assert!(correlation_matrix(&view).is_none());
    }

    #[test]
    fn product_line_revenue_sums_match_view_total() {
        let ds = dataset();
        let view = full_view(&ds);
        let groups = revenue_by_product_line(&view).unwrap();
        let grouped: f64 = groups.iter().map(|(_, v)| v).sum();
        let direct: f64 = view.records().map(|r| r.total).sum();
        assert!((grouped - direct).abs() < 1e-9);
        // Descending by sum.
        assert_eq!(groups[0].0, "Electronics");
        assert_eq!(groups[0].1, 150.0);
        assert_eq!(groups[1], ("Food".to_string(), 50.0));
    }

    #[test]
    fn single_product_line_selection_yields_one_group() {
        let ds = dataset();
        let selection = FilterSelection {
            product_line: CategoryFilter::One("Electronics".into()),
            ..Default::default()
        };
        let view = apply_filters(&ds, &selection);
        let groups = revenue_by_product_line(&view).unwrap();
        assert_eq!(groups, vec![("Electronics".to_string(), 150.0)]);
    }

    #[test]
    fn revenue_over_time_groups_by_day_ascending() {
        let ds = dataset();
        let series = revenue_over_time(&full_view(&ds)).unwrap();
        assert_eq!(
            series,
            vec![(date(1), 100.0), (date(2), 50.0), (date(3), 50.0)]
        );
    }

    #[test]
    fn rating_histogram_covers_every_rating_once() {
        let ds = dataset();
        let dist = rating_distribution(&full_view(&ds)).unwrap();
        assert_eq!(dist.buckets.len(), RATING_BUCKETS);
        let counted: usize = dist.buckets.iter().map(|b| b.count).sum();
        assert_eq!(counted, 4);
        assert_eq!(dist.sorted_ratings, vec![4.0, 6.0, 8.0, 9.0]);
        assert_eq!(dist.summary.min, 4.0);
        assert_eq!(dist.summary.max, 9.0);
        assert_eq!(dist.summary.median, 7.0);
    }

    #[test]
    fn spending_groups_keep_full_distributions() {
        let ds = dataset();
        let groups = spending_by_customer_type(&full_view(&ds)).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].customer_type, "Member");
        assert_eq!(groups[0].totals, vec![30.0, 100.0]);
        assert_eq!(groups[1].totals, vec![20.0, 50.0]);
        for g in &groups {
            assert!(g.whisker_low <= g.summary.q1);
            assert!(g.whisker_high >= g.summary.q3);
        }
    }

    #[test]
    fn payment_counts_descend() {
        let ds = dataset();
        let counts = payment_method_counts(&full_view(&ds)).unwrap();
        assert_eq!(counts[0], ("Cash".to_string(), 2));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn income_composition_switches_mode_with_branch_filter() {
        let ds = dataset();
        let view = full_view(&ds);

        match gross_income_composition(&view, &CategoryFilter::All).unwrap() {
            IncomeComposition::Stacked(branches) => {
                assert_eq!(branches.len(), 2);
                assert_eq!(branches[0].branch, "A");
                assert_eq!(
                    branches[0].segments,
                    vec![("Electronics".to_string(), 5.0), ("Food".to_string(), 2.5)]
                );
            }
            other => panic!("expected stacked composition, got {other:?}"),
        }

        let selection = FilterSelection {
            branch: CategoryFilter::One("A".into()),
            ..Default::default()
        };
        let view = apply_filters(&ds, &selection);
        match gross_income_composition(&view, &selection.branch).unwrap() {
            IncomeComposition::ByProductLine(groups) => {
                assert_eq!(groups[0], ("Electronics".to_string(), 5.0));
                assert_eq!(groups[1], ("Food".to_string(), 2.5));
            }
            other => panic!("expected per-line composition, got {other:?}"),
        }
    }

    #[test]
    fn trend_recovers_exactly_linear_data() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [2.0, 5.0, 8.0, 11.0];
        let t = fit_linear_trend(&xs, &ys).unwrap();
        assert!((t.slope - 3.0).abs() < 1e-12);
        assert!((t.intercept - 2.0).abs() < 1e-12);
        assert!((t.at(10.0) - 32.0).abs() < 1e-12);
    }

    #[test]
    fn trend_needs_spread_in_x() {
        assert!(fit_linear_trend(&[1.0], &[2.0]).is_none());
        assert!(fit_linear_trend(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn cogs_income_is_a_passthrough_with_trend() {
        let ds = dataset();
        let rel = cogs_income_relation(&full_view(&ds)).unwrap();
        assert_eq!(rel.points.len(), 4);
        assert_eq!(rel.points[0].product_line, "Electronics");
        // gross income is proportional to cogs in the fixture.
        let t = rel.trend.unwrap();
        assert!(t.slope > 0.0);
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let ds = dataset();
        let m = correlation_matrix(&full_view(&ds)).unwrap();
        let n = m.columns.len();
        assert_eq!(n, 7);
        for i in 0..n {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..n {
                let a = m.get(i, j);
                let b = m.get(j, i);
                assert!(a.is_nan() && b.is_nan() || a == b);
            }
        }
        // cogs and gross income are exactly proportional in the fixture.
        let cogs = m.columns.iter().position(|c| *c == NumericColumn::Cogs).unwrap();
        let income = m
            .columns
            .iter()
            .position(|c| *c == NumericColumn::GrossIncome)
            .unwrap();
        assert!((m.get(cogs, income) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_variance_column_yields_nan_off_diagonal() {
        // quantity is constant in the fixture.
        let ds = dataset();
        let m = correlation_matrix(&full_view(&ds)).unwrap();
        let qty = m
            .columns
            .iter()
            .position(|c| *c == NumericColumn::Quantity)
            .unwrap();
        let total = m.columns.iter().position(|c| *c == NumericColumn::Total).unwrap();
        assert!(m.get(qty, total).is_nan());
        assert_eq!(m.get(qty, qty), 1.0);
    }

    #[test]
    fn single_row_view_has_no_correlation() {
        let ds = dataset();
        let selection = FilterSelection {
            branch: CategoryFilter::One("B".into()),
            ..Default::default()
        };
        let view = apply_filters(&ds, &selection);
        assert_eq!(view.len(), 1);
        assert!(correlation_matrix(&view).is_none());
        // KPIs still defined for one row.
        assert!(kpi_summary(&view).is_some());
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&values, 0.0), 1.0);
        assert_eq!(quantile(&values, 0.25), 1.75);
        assert_eq!(quantile(&values, 0.5), 2.5);
        assert_eq!(quantile(&values, 1.0), 4.0);
    }
}
