use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use arrow::array::{
    Array, AsArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
    TimestampMicrosecondArray, TimestampMillisecondArray, TimestampNanosecondArray,
    TimestampSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{SaleRecord, SalesDataset};

// ---------------------------------------------------------------------------
// Errors and load summary
// ---------------------------------------------------------------------------

/// File-level load failure. Bad individual rows never produce one of these;
/// they are dropped and counted instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("{0}")]
    Malformed(String),
}

/// A successful load: the dataset plus row accounting.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: SalesDataset,
    /// Data rows seen in the file.
    pub rows_read: usize,
    /// Rows dropped for an unparseable date or a failed numeric coercion.
    pub rows_dropped: usize,
}

// Header names of the source table.
const COL_INVOICE: &str = "Invoice ID";
const COL_BRANCH: &str = "Branch";
const COL_PRODUCT_LINE: &str = "Product line";
const COL_CUSTOMER_TYPE: &str = "Customer type";
const COL_PAYMENT: &str = "Payment";
const COL_UNIT_PRICE: &str = "Unit price";
const COL_QUANTITY: &str = "Quantity";
const COL_TAX: &str = "Tax 5%";
const COL_TOTAL: &str = "Total";
const COL_COGS: &str = "cogs";
const COL_GROSS_INCOME: &str = "gross income";
const COL_RATING: &str = "Rating";
const COL_DATE: &str = "Date";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – comma separated, header row with the original column names
/// * `.json`    – `[{ "Invoice ID": ..., "Branch": ..., ... }, ...]`
/// * `.parquet` – the same table written by Pandas/Polars
pub fn load_file(path: &Path) -> Result<LoadedDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

/// Accepted date formats: the source dataset's `%m/%d/%Y` plus ISO.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_i64(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// Assemble the load summary, logging the drop count once.
fn finalize(
    records: Vec<SaleRecord>,
    rows_read: usize,
    rows_dropped: usize,
    source: &str,
) -> LoadedDataset {
    if rows_dropped > 0 {
        log::warn!(
            "{source}: dropped {rows_dropped} of {rows_read} rows (unparseable date or numeric field)"
        );
    }
    LoadedDataset {
        dataset: SalesDataset::from_records(records),
        rows_read,
        rows_dropped,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Column positions resolved from the header row.
struct Columns {
    invoice_id: usize,
    branch: usize,
    product_line: usize,
    customer_type: usize,
    payment: usize,
    unit_price: usize,
    quantity: usize,
    tax: usize,
    total: usize,
    cogs: usize,
    gross_income: usize,
    rating: usize,
    date: usize,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let map: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim(), i))
            .collect();
        let require = |name: &str| -> Result<usize, LoadError> {
            map.get(name)
                .copied()
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };
        Ok(Columns {
            invoice_id: require(COL_INVOICE)?,
            branch: require(COL_BRANCH)?,
            product_line: require(COL_PRODUCT_LINE)?,
            customer_type: require(COL_CUSTOMER_TYPE)?,
            payment: require(COL_PAYMENT)?,
            unit_price: require(COL_UNIT_PRICE)?,
            quantity: require(COL_QUANTITY)?,
            tax: require(COL_TAX)?,
            total: require(COL_TOTAL)?,
            cogs: require(COL_COGS)?,
            gross_income: require(COL_GROSS_INCOME)?,
            rating: require(COL_RATING)?,
            date: require(COL_DATE)?,
        })
    }
}

fn load_csv(path: &Path) -> Result<LoadedDataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv(file)
}

/// CSV parsing over any reader, so tests can feed in-memory strings.
fn parse_csv<R: Read>(reader: R) -> Result<LoadedDataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let cols = Columns::resolve(reader.headers()?)?;

    let mut records = Vec::new();
    let mut rows_read = 0;
    let mut rows_dropped = 0;

    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        rows_read += 1;
        match csv_row_to_record(&row, &cols) {
            Ok(record) => records.push(record),
            Err(reason) => {
                rows_dropped += 1;
                log::debug!("csv row {row_no}: dropped ({reason})");
            }
        }
    }

    Ok(finalize(records, rows_read, rows_dropped, "csv"))
}

fn csv_row_to_record(row: &csv::StringRecord, cols: &Columns) -> Result<SaleRecord, String> {
    let field = |idx: usize| row.get(idx).unwrap_or("");
    let numeric = |idx: usize, name: &str| {
        parse_f64(field(idx)).ok_or_else(|| format!("{name} '{}' is not numeric", field(idx)))
    };

    // Order matters: date first, then the two columns the source data is
    // known to be dirty in, then the rest.
    let date = parse_date(field(cols.date))
        .ok_or_else(|| format!("unparseable date '{}'", field(cols.date)))?;
    let gross_income = numeric(cols.gross_income, COL_GROSS_INCOME)?;
    let cogs = numeric(cols.cogs, COL_COGS)?;
    let unit_price = numeric(cols.unit_price, COL_UNIT_PRICE)?;
    let quantity = parse_i64(field(cols.quantity))
        .ok_or_else(|| format!("quantity '{}' is not an integer", field(cols.quantity)))?;
    let tax = numeric(cols.tax, COL_TAX)?;
    let total = numeric(cols.total, COL_TOTAL)?;
    let rating = numeric(cols.rating, COL_RATING)?;

    Ok(SaleRecord {
        invoice_id: field(cols.invoice_id).to_string(),
        branch: field(cols.branch).to_string(),
        product_line: field(cols.product_line).to_string(),
        customer_type: field(cols.customer_type).to_string(),
        payment: field(cols.payment).to_string(),
        unit_price,
        quantity,
        tax,
        total,
        cogs,
        gross_income,
        rating,
        date,
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// One record of the records-oriented JSON export
/// (`df.to_json(orient='records')`). Numeric fields stay as raw values so
/// a single bad cell drops the row instead of failing the whole file.
#[derive(Debug, Deserialize)]
struct JsonSale {
    #[serde(rename = "Invoice ID")]
    invoice_id: String,
    #[serde(rename = "Branch")]
    branch: String,
    #[serde(rename = "Product line")]
    product_line: String,
    #[serde(rename = "Customer type")]
    customer_type: String,
    #[serde(rename = "Payment")]
    payment: String,
    #[serde(rename = "Unit price")]
    unit_price: JsonValue,
    #[serde(rename = "Quantity")]
    quantity: JsonValue,
    #[serde(rename = "Tax 5%")]
    tax: JsonValue,
    #[serde(rename = "Total")]
    total: JsonValue,
    #[serde(rename = "cogs")]
    cogs: JsonValue,
    #[serde(rename = "gross income")]
    gross_income: JsonValue,
    #[serde(rename = "Rating")]
    rating: JsonValue,
    #[serde(rename = "Date")]
    date: String,
}

fn load_json(path: &Path) -> Result<LoadedDataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<LoadedDataset, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected a top-level JSON array of sales".into()))?;

    let mut records = Vec::with_capacity(rows.len());
    let mut rows_dropped = 0;
    let rows_read = rows.len();

    for (row_no, row) in rows.iter().enumerate() {
        let parsed = serde_json::from_value::<JsonSale>(row.clone())
            .map_err(|e| e.to_string())
            .and_then(json_sale_to_record);
        match parsed {
            Ok(record) => records.push(record),
            Err(reason) => {
                rows_dropped += 1;
                log::debug!("json row {row_no}: dropped ({reason})");
            }
        }
    }

    Ok(finalize(records, rows_read, rows_dropped, "json"))
}

fn json_sale_to_record(sale: JsonSale) -> Result<SaleRecord, String> {
    let numeric = |v: &JsonValue, name: &str| {
        json_f64(v).ok_or_else(|| format!("{name} {v} is not numeric"))
    };

    let date =
        parse_date(&sale.date).ok_or_else(|| format!("unparseable date '{}'", sale.date))?;
    let gross_income = numeric(&sale.gross_income, COL_GROSS_INCOME)?;
    let cogs = numeric(&sale.cogs, COL_COGS)?;
    let unit_price = numeric(&sale.unit_price, COL_UNIT_PRICE)?;
    let quantity = json_i64(&sale.quantity)
        .ok_or_else(|| format!("quantity {} is not an integer", sale.quantity))?;
    let tax = numeric(&sale.tax, COL_TAX)?;
    let total = numeric(&sale.total, COL_TOTAL)?;
    let rating = numeric(&sale.rating, COL_RATING)?;

    Ok(SaleRecord {
        invoice_id: sale.invoice_id,
        branch: sale.branch,
        product_line: sale.product_line,
        customer_type: sale.customer_type,
        payment: sale.payment,
        unit_price,
        quantity,
        tax,
        total,
        cogs,
        gross_income,
        rating,
        date,
    })
}

/// Numeric coercion: JSON numbers plus numeric strings.
fn json_f64(v: &JsonValue) -> Option<f64> {
    match v {
        JsonValue::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        JsonValue::String(s) => parse_f64(s),
        _ => None,
    }
}

fn json_i64(v: &JsonValue) -> Option<i64> {
    match v {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        JsonValue::String(s) => parse_i64(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load the sales table from a Parquet file.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`): dates may arrive as strings, `Date32`,
/// or timestamps, and numeric columns as any of the common int/float widths.
fn load_parquet(path: &Path) -> Result<LoadedDataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    let mut rows_read = 0;
    let mut rows_dropped = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        let col = |name: &str| -> Result<usize, LoadError> {
            schema
                .index_of(name)
                .map_err(|_| LoadError::MissingColumn(name.to_string()))
        };
        let invoice_id = batch.column(col(COL_INVOICE)?);
        let branch = batch.column(col(COL_BRANCH)?);
        let product_line = batch.column(col(COL_PRODUCT_LINE)?);
        let customer_type = batch.column(col(COL_CUSTOMER_TYPE)?);
        let payment = batch.column(col(COL_PAYMENT)?);
        let unit_price = batch.column(col(COL_UNIT_PRICE)?);
        let quantity = batch.column(col(COL_QUANTITY)?);
        let tax = batch.column(col(COL_TAX)?);
        let total = batch.column(col(COL_TOTAL)?);
        let cogs = batch.column(col(COL_COGS)?);
        let gross_income = batch.column(col(COL_GROSS_INCOME)?);
        let rating = batch.column(col(COL_RATING)?);
        let date = batch.column(col(COL_DATE)?);

        for row in 0..batch.num_rows() {
            rows_read += 1;
            let record = (|| {
                Some(SaleRecord {
                    date: date_at(date, row)?,
                    gross_income: f64_at(gross_income, row)?,
                    cogs: f64_at(cogs, row)?,
                    invoice_id: string_at(invoice_id, row)?,
                    branch: string_at(branch, row)?,
                    product_line: string_at(product_line, row)?,
                    customer_type: string_at(customer_type, row)?,
                    payment: string_at(payment, row)?,
                    unit_price: f64_at(unit_price, row)?,
                    quantity: i64_at(quantity, row)?,
                    tax: f64_at(tax, row)?,
                    total: f64_at(total, row)?,
                    rating: f64_at(rating, row)?,
                })
            })();
            match record {
                Some(record) => records.push(record),
                None => {
                    rows_dropped += 1;
                    log::debug!("parquet row {row}: dropped (null or non-coercible field)");
                }
            }
        }
    }

    Ok(finalize(records, rows_read, rows_dropped, "parquet"))
}

// -- Arrow scalar helpers --

fn string_at(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        _ => None,
    }
}

fn f64_at(col: &Arc<dyn Array>, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        // Numeric coercion from string columns, same as the CSV path.
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .and_then(|a| parse_f64(a.value(row))),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn i64_at(col: &Arc<dyn Array>, row: usize) -> Option<i64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row)),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as i64),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row))
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i64),
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .and_then(|a| parse_i64(a.value(row))),
        _ => None,
    }
}

fn date_at(col: &Arc<dyn Array>, row: usize) -> Option<NaiveDate> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .and_then(|a| parse_date(a.value(row))),
        DataType::Date32 => {
            let days = col.as_any().downcast_ref::<Date32Array>()?.value(row);
            NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(chrono::Duration::days(days as i64))
        }
        DataType::Timestamp(unit, _) => {
            let value = match unit {
                TimeUnit::Second => col
                    .as_any()
                    .downcast_ref::<TimestampSecondArray>()?
                    .value(row),
                TimeUnit::Millisecond => col
                    .as_any()
                    .downcast_ref::<TimestampMillisecondArray>()?
                    .value(row)
                    .div_euclid(1_000),
                TimeUnit::Microsecond => col
                    .as_any()
                    .downcast_ref::<TimestampMicrosecondArray>()?
                    .value(row)
                    .div_euclid(1_000_000),
                TimeUnit::Nanosecond => col
                    .as_any()
                    .downcast_ref::<TimestampNanosecondArray>()?
                    .value(row)
                    .div_euclid(1_000_000_000),
            };
            chrono::DateTime::from_timestamp(value, 0).map(|dt| dt.date_naive())
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Load cache
// ---------------------------------------------------------------------------

/// Memoized load keyed by path and modification time. A changed mtime
/// invalidates the entry and reloads.
#[derive(Default)]
pub struct LoadCache {
    entry: Option<CacheEntry>,
}

struct CacheEntry {
    path: PathBuf,
    modified: SystemTime,
    data: LoadedDataset,
}

impl LoadCache {
    /// Load through the cache.
    pub fn load(&mut self, path: &Path) -> Result<LoadedDataset, LoadError> {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(entry) = &self.entry {
            if entry.path == path && entry.modified == modified {
                log::debug!("load cache hit for {}", path.display());
                return Ok(entry.data.clone());
            }
        }

        let data = load_file(path)?;
        self.entry = Some(CacheEntry {
            path: path.to_path_buf(),
            modified,
            data: data.clone(),
        });
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Invoice ID,Branch,Product line,Customer type,Payment,Unit price,Quantity,Tax 5%,Total,cogs,gross income,Rating,Date";

    fn csv_with_rows(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn parses_a_clean_csv() {
        let text = csv_with_rows(&[
            "750-67-8428,A,Health and beauty,Member,Ewallet,74.69,7,26.14,548.97,522.83,26.14,9.1,1/5/2019",
            "226-31-3081,C,Electronic accessories,Normal,Cash,15.28,5,3.82,80.22,76.40,3.82,9.6,2019-03-08",
        ]);
        let loaded = parse_csv(text.as_bytes()).unwrap();
        assert_eq!(loaded.rows_read, 2);
        assert_eq!(loaded.rows_dropped, 0);
        assert_eq!(loaded.dataset.len(), 2);

        let first = &loaded.dataset.records[0];
        assert_eq!(first.invoice_id, "750-67-8428");
        assert_eq!(first.branch, "A");
        assert_eq!(first.quantity, 7);
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2019, 1, 5).unwrap());
        // Both date formats land on the same calendar type.
        assert_eq!(
            loaded.dataset.records[1].date,
            NaiveDate::from_ymd_opt(2019, 3, 8).unwrap()
        );
        assert_eq!(loaded.dataset.branches, vec!["A", "C"]);
    }

    #[test]
    fn drops_rows_with_bad_numerics_or_dates() {
        let text = csv_with_rows(&[
            "1,A,Food,Member,Cash,10.0,1,0.5,10.5,10.0,0.5,7.0,1/5/2019",
            // gross income not numeric
            "2,A,Food,Member,Cash,10.0,1,0.5,10.5,10.0,oops,7.0,1/6/2019",
            // cogs not numeric
            "3,A,Food,Member,Cash,10.0,1,0.5,10.5,n/a,0.5,7.0,1/7/2019",
            // unparseable date
            "4,A,Food,Member,Cash,10.0,1,0.5,10.5,10.0,0.5,7.0,sometime",
        ]);
        let loaded = parse_csv(text.as_bytes()).unwrap();
        assert_eq!(loaded.rows_read, 4);
        assert_eq!(loaded.rows_dropped, 3);
        assert_eq!(loaded.dataset.len(), 1);
        assert_eq!(loaded.dataset.records[0].invoice_id, "1");
    }

    #[test]
    fn missing_column_fails_the_whole_load() {
        let text = "Invoice ID,Branch\n1,A";
        match parse_csv(text.as_bytes()) {
            Err(LoadError::MissingColumn(col)) => assert_eq!(col, "Product line"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn json_records_load_with_string_coercion() {
        let text = r#"[
            {"Invoice ID": "1", "Branch": "A", "Product line": "Food",
             "Customer type": "Member", "Payment": "Cash",
             "Unit price": "10.0", "Quantity": 2, "Tax 5%": 1.0,
             "Total": 21.0, "cogs": 20.0, "gross income": 1.0,
             "Rating": 7.5, "Date": "2019-01-05"},
            {"Invoice ID": "2", "Branch": "B", "Product line": "Food",
             "Customer type": "Member", "Payment": "Cash",
             "Unit price": 10.0, "Quantity": 2, "Tax 5%": 1.0,
             "Total": 21.0, "cogs": "not a number", "gross income": 1.0,
             "Rating": 7.5, "Date": "2019-01-06"}
        ]"#;
        let loaded = parse_json(text).unwrap();
        assert_eq!(loaded.rows_read, 2);
        assert_eq!(loaded.rows_dropped, 1);
        assert_eq!(loaded.dataset.records[0].unit_price, 10.0);
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(matches!(
            parse_json(r#"{"not": "an array"}"#),
            Err(LoadError::Malformed(_))
        ));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(matches!(
            load_file(Path::new("sales.xlsx")),
            Err(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn cache_reloads_when_the_file_changes() {
        let path = std::env::temp_dir().join(format!(
            "salesdash_cache_test_{}.csv",
            std::process::id()
        ));
        let mut cache = LoadCache::default();

        std::fs::write(
            &path,
            csv_with_rows(&["1,A,Food,Member,Cash,10.0,1,0.5,10.5,10.0,0.5,7.0,1/5/2019"]),
        )
        .unwrap();
        let first = cache.load(&path).unwrap();
        assert_eq!(first.dataset.len(), 1);

        // Unchanged file: the cached dataset comes back.
        let again = cache.load(&path).unwrap();
        assert_eq!(again.dataset.len(), 1);

        // mtime granularity on some filesystems is coarse.
        std::thread::sleep(std::time::Duration::from_millis(30));
        std::fs::write(
            &path,
            csv_with_rows(&[
                "1,A,Food,Member,Cash,10.0,1,0.5,10.5,10.0,0.5,7.0,1/5/2019",
                "2,B,Food,Member,Cash,10.0,1,0.5,10.5,10.0,0.5,7.0,1/6/2019",
            ]),
        )
        .unwrap();
        let reloaded = cache.load(&path).unwrap();
        assert_eq!(reloaded.dataset.len(), 2);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut cache = LoadCache::default();
        assert!(matches!(
            cache.load(Path::new("/nonexistent/sales.csv")),
            Err(LoadError::Io { .. })
        ));
    }
}
