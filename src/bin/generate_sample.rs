use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const HEADER: [&str; 9] = [
    "股票代码",
    "企业名称",
    "年份",
    "数字化转型指数(0-100分)",
    "人工智能词频数",
    "大数据词频数",
    "云计算词频数",
    "区块链词频数",
    "数字技术运用词频数",
];

/// (code, name, first listed year, digital affinity 0..1)
const COMPANIES: [(&str, &str, i64, f64); 8] = [
    ("000001", "平安银行", 1999, 0.9),
    ("000002", "万科A", 1999, 0.3),
    ("000333", "美的集团", 2013, 0.7),
    ("000651", "格力电器", 1999, 0.5),
    ("002415", "海康威视", 2010, 0.95),
    ("600000", "浦发银行", 1999, 0.8),
    ("600519", "贵州茅台", 2001, 0.2),
    ("601318", "中国平安", 2007, 0.85),
];

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

    /// Non-negative count around `mean`.
    fn count(&mut self, mean: f64) -> i64 {
        self.gauss(mean, mean.sqrt().max(0.5)).round().max(0.0) as i64
    }
}

#[derive(Default)]
struct Columns {
    code: Vec<String>,
    name: Vec<String>,
    year: Vec<i64>,
    index: Vec<f64>,
    ai: Vec<i64>,
    big_data: Vec<i64>,
    cloud: Vec<i64>,
    blockchain: Vec<i64>,
    digital: Vec<i64>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();

    for &(code, name, listed, affinity) in &COMPANIES {
        let mut index = 5.0 + 10.0 * affinity;
        for year in listed..=2023 {
            // Adoption picks up after 2012.
            let era = ((year - 2012) as f64 / 11.0).clamp(0.0, 1.0);
            index = (index + rng.gauss(1.5 * affinity + 3.0 * era * affinity, 1.5)).clamp(0.0, 100.0);

            let scale = affinity * (1.0 + 40.0 * era);
            let ai = rng.count(scale * 0.8);
            let big_data = rng.count(scale);
            let cloud = rng.count(scale * 0.6);
            let blockchain = if year >= 2016 { rng.count(scale * 0.2) } else { 0 };

            cols.code.push(code.to_string());
            cols.name.push(name.to_string());
            cols.year.push(year);
            cols.index.push((index * 100.0).round() / 100.0);
            cols.ai.push(ai);
            cols.big_data.push(big_data);
            cols.cloud.push(cloud);
            cols.blockchain.push(blockchain);
            // The published aggregate also counts keywords outside the four families.
            cols.digital.push(ai + big_data + cloud + blockchain + rng.count(scale * 0.3));
        }
    }
    cols
}

fn write_csv(cols: &Columns, path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADER)?;
    for i in 0..cols.code.len() {
        writer.write_record([
            cols.code[i].clone(),
            cols.name[i].clone(),
            cols.year[i].to_string(),
            cols.index[i].to_string(),
            cols.ai[i].to_string(),
            cols.big_data[i].to_string(),
            cols.cloud[i].to_string(),
            cols.blockchain[i].to_string(),
            cols.digital[i].to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(cols: &Columns, path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADER[0], DataType::Utf8, false),
        Field::new(HEADER[1], DataType::Utf8, false),
        Field::new(HEADER[2], DataType::Int64, false),
        Field::new(HEADER[3], DataType::Float64, false),
        Field::new(HEADER[4], DataType::Int64, false),
        Field::new(HEADER[5], DataType::Int64, false),
        Field::new(HEADER[6], DataType::Int64, false),
        Field::new(HEADER[7], DataType::Int64, false),
        Field::new(HEADER[8], DataType::Int64, false),
    ]));

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(cols.code.clone())),
        Arc::new(StringArray::from(cols.name.clone())),
        Arc::new(Int64Array::from(cols.year.clone())),
        Arc::new(Float64Array::from(cols.index.clone())),
        Arc::new(Int64Array::from(cols.ai.clone())),
        Arc::new(Int64Array::from(cols.big_data.clone())),
        Arc::new(Int64Array::from(cols.cloud.clone())),
        Arc::new(Int64Array::from(cols.blockchain.clone())),
        Arc::new(Int64Array::from(cols.digital.clone())),
    ];
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let cols = generate(&mut rng);

    let csv_path = "sample_index.csv";
    let parquet_path = "sample_index.parquet";
    write_csv(&cols, csv_path)?;
    write_parquet(&cols, parquet_path)?;

    println!(
        "Wrote {} company-years for {} companies to {csv_path} and {parquet_path}",
        cols.code.len(),
        COMPANIES.len()
    );
    Ok(())
}
