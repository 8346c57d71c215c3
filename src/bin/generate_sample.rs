use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

// Generates a deterministic synthetic supermarket sales dataset and writes
// it as both `sample_sales.csv` and `sample_sales.parquet`, so every loader
// path of the dashboard can be exercised with the same data.

const BRANCHES: [&str; 3] = ["A", "B", "C"];
const PRODUCT_LINES: [&str; 6] = [
    "Electronic accessories",
    "Fashion accessories",
    "Food and beverages",
    "Health and beauty",
    "Home and lifestyle",
    "Sports and travel",
];
const CUSTOMER_TYPES: [&str; 2] = ["Member", "Normal"];
const PAYMENTS: [&str; 3] = ["Cash", "Credit card", "Ewallet"];

const HEADERS: [&str; 13] = [
    "Invoice ID",
    "Branch",
    "Product line",
    "Customer type",
    "Payment",
    "Unit price",
    "Quantity",
    "Tax 5%",
    "Total",
    "cogs",
    "gross income",
    "Rating",
    "Date",
];

struct SaleRow {
    invoice_id: String,
    branch: &'static str,
    product_line: &'static str,
    customer_type: &'static str,
    payment: &'static str,
    unit_price: f64,
    quantity: i64,
    tax: f64,
    total: f64,
    cogs: f64,
    gross_income: f64,
    rating: f64,
    date: NaiveDate,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[(self.next_f64() * options.len() as f64) as usize]
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).expect("valid calendar date");

    let mut rows = Vec::with_capacity(1000);
    for _ in 0..1000 {
        let unit_price = round2(10.0 + rng.next_f64() * 89.99);
        let quantity = 1 + (rng.next_f64() * 10.0) as i64;
        let cogs = round2(unit_price * quantity as f64);
        let tax = round2(cogs * 0.05);
        let total = round2(cogs + tax);
        let rating = (rng.gauss(7.0, 1.4).clamp(4.0, 10.0) * 10.0).round() / 10.0;
        let date = start + chrono::Duration::days((rng.next_f64() * 90.0) as i64);
        let invoice_id = format!(
            "{:03}-{:02}-{:04}",
            100 + rng.next_u64() % 900,
            10 + rng.next_u64() % 90,
            1000 + rng.next_u64() % 9000,
        );

        rows.push(SaleRow {
            invoice_id,
            branch: rng.pick(&BRANCHES),
            product_line: rng.pick(&PRODUCT_LINES),
            customer_type: rng.pick(&CUSTOMER_TYPES),
            payment: rng.pick(&PAYMENTS),
            unit_price,
            quantity,
            tax,
            total,
            cogs,
            gross_income: tax,
            rating,
            date,
        });
    }

    write_csv(&rows).context("writing sample_sales.csv")?;
    write_parquet(&rows).context("writing sample_sales.parquet")?;

    println!(
        "Wrote {} sales to sample_sales.csv and sample_sales.parquet",
        rows.len()
    );
    Ok(())
}

fn write_csv(rows: &[SaleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path("sample_sales.csv")?;
    writer.write_record(HEADERS)?;
    for r in rows {
        writer.write_record([
            r.invoice_id.clone(),
            r.branch.to_string(),
            r.product_line.to_string(),
            r.customer_type.to_string(),
            r.payment.to_string(),
            format!("{:.2}", r.unit_price),
            r.quantity.to_string(),
            format!("{:.2}", r.tax),
            format!("{:.2}", r.total),
            format!("{:.2}", r.cogs),
            format!("{:.2}", r.gross_income),
            format!("{:.1}", r.rating),
            r.date.format("%m/%d/%Y").to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[SaleRow]) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid calendar date");

    let schema = Arc::new(Schema::new(vec![
        Field::new("Invoice ID", DataType::Utf8, false),
        Field::new("Branch", DataType::Utf8, false),
        Field::new("Product line", DataType::Utf8, false),
        Field::new("Customer type", DataType::Utf8, false),
        Field::new("Payment", DataType::Utf8, false),
        Field::new("Unit price", DataType::Float64, false),
        Field::new("Quantity", DataType::Int64, false),
        Field::new("Tax 5%", DataType::Float64, false),
        Field::new("Total", DataType::Float64, false),
        Field::new("cogs", DataType::Float64, false),
        Field::new("gross income", DataType::Float64, false),
        Field::new("Rating", DataType::Float64, false),
        Field::new("Date", DataType::Date32, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.invoice_id.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.branch).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.product_line).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.customer_type).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.payment).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.unit_price).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.quantity).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.tax).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.total).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.cogs).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.gross_income).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.rating).collect::<Vec<_>>(),
            )),
            Arc::new(Date32Array::from(
                rows.iter()
                    .map(|r| (r.date - epoch).num_days() as i32)
                    .collect::<Vec<_>>(),
            )),
        ],
    )?;

    let file = File::create("sample_sales.parquet")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
