use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{
    CoercionIssue, CoercionReport, Dataset, MetricRecord, TechCategory, TechCounts, columns,
};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the index table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the published table, UTF-8 with Chinese headers
/// * `.json`    – `[{ "股票代码": "600000", "年份": 2001, ... }, ...]`
/// * `.parquet` – same columns as the CSV
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    if dataset.is_empty() {
        log::warn!("{} contains no data rows", path.display());
    }
    log::info!(
        "Loaded {} records for {} companies from {}",
        dataset.len(),
        dataset.company_count(),
        path.display()
    );
    let report = dataset.coercion();
    if !report.is_clean() {
        log::warn!(
            "{} cells could not be read and were defaulted: {:?}",
            report.total(),
            report.per_column()
        );
        for issue in report.samples() {
            log::debug!("row {} column {}: {:?}", issue.row, issue.column, issue.raw);
        }
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Cells and row assembly
// ---------------------------------------------------------------------------

/// A single untyped cell as read from any source format.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Cell {
    fn raw(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Integer(i) => i.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Null => String::new(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Cell::Integer(i) => *i as f64,
            Cell::Float(v) => *v,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Bool(_) | Cell::Null => return None,
        };
        v.is_finite().then_some(v)
    }
}

/// Column positions of the fields a [`MetricRecord`] is built from.
/// Count columns are optional; absent ones read as zero.
struct Layout {
    code: usize,
    name: usize,
    year: usize,
    index: usize,
    tech: [Option<usize>; 4],
    digital_tech: Option<usize>,
}

impl Layout {
    fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.as_ref().trim_start_matches('\u{feff}').trim() == name)
        };
        let require = |name: &str| find(name).with_context(|| format!("missing '{name}' column"));

        let tech = TechCategory::ALL.map(|c| find(c.column()));
        for (category, pos) in TechCategory::ALL.iter().zip(&tech) {
            if pos.is_none() {
                log::warn!("column '{}' not found; {} counts read as 0", category.column(), category);
            }
        }

        Ok(Layout {
            code: require(columns::CODE)?,
            name: require(columns::NAME)?,
            year: require(columns::YEAR)?,
            index: require(columns::INDEX)?,
            tech,
            digital_tech: find(columns::DIGITAL_TECH),
        })
    }
}

/// Largest keyword count accepted from a cell.
const MAX_COUNT: f64 = u32::MAX as f64;

/// Coerces cells into records, noting every defaulted value.
#[derive(Default)]
struct RecordBuilder {
    records: Vec<MetricRecord>,
    report: CoercionReport,
}

impl RecordBuilder {
    /// `cell(i)` yields the cell at column position `i` of data row `row`.
    fn push(&mut self, row: usize, layout: &Layout, cell: impl Fn(usize) -> Cell) {
        let code = text(cell(layout.code));
        let name = text(cell(layout.name));
        let year = self.year(row, cell(layout.year));
        let index = self.number(row, columns::INDEX, cell(layout.index));

        let mut tech = TechCounts::default();
        for (category, pos) in TechCategory::ALL.into_iter().zip(layout.tech) {
            if let Some(pos) = pos {
                tech.set(category, self.count(row, category.column(), cell(pos)));
            }
        }
        let digital_tech = layout
            .digital_tech
            .map(|pos| self.count(row, columns::DIGITAL_TECH, cell(pos)))
            .unwrap_or(0);

        self.records.push(MetricRecord {
            code,
            name,
            year,
            index,
            tech,
            digital_tech,
        });
    }

    fn finish(self) -> Dataset {
        Dataset::from_records(self.records, self.report)
    }

    fn note(&mut self, row: usize, column: &'static str, cell: &Cell) {
        self.report.record(CoercionIssue {
            row,
            column,
            raw: cell.raw(),
        });
    }

    /// Unreadable or fractional years become missing.
    fn year(&mut self, row: usize, cell: Cell) -> Option<i32> {
        let year = cell
            .as_f64()
            .filter(|v| v.fract() == 0.0 && *v >= i32::MIN as f64 && *v <= i32::MAX as f64)
            .map(|v| v as i32);
        if year.is_none() {
            self.note(row, columns::YEAR, &cell);
        }
        year
    }

    fn number(&mut self, row: usize, column: &'static str, cell: Cell) -> f64 {
        cell.as_f64().unwrap_or_else(|| {
            self.note(row, column, &cell);
            0.0
        })
    }

    /// Counts are truncated toward zero; negatives and values above
    /// [`MAX_COUNT`] are rejected.
    fn count(&mut self, row: usize, column: &'static str, cell: Cell) -> u64 {
        match cell.as_f64() {
            Some(v) if (0.0..=MAX_COUNT).contains(&v) => v.trunc() as u64,
            _ => {
                self.note(row, column, &cell);
                0
            }
        }
    }
}

/// Identifiers are kept verbatim; integral numbers are printed without a fraction.
fn text(cell: Cell) -> String {
    match cell {
        Cell::Float(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Cell::Null => String::new(),
        other => other.raw(),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the published column names, one company-year
/// per row. Every cell is read as text so stock codes keep their leading zeros.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let layout = Layout::from_headers(&headers)?;

    let mut builder = RecordBuilder::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        builder.push(row_no, &layout, |i| match record.get(i) {
            Some(s) if !s.is_empty() => Cell::Text(s.to_string()),
            _ => Cell::Null,
        });
    }

    Ok(builder.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "股票代码": "600000", "企业名称": "浦发银行", "年份": 2001,
///     "数字化转型指数(0-100分)": 12.5, "人工智能词频数": 3, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    // Union of keys over all rows, in first-seen order.
    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    if headers.is_empty() {
        return Ok(RecordBuilder::default().finish());
    }
    let layout = Layout::from_headers(&headers)?;

    let mut builder = RecordBuilder::default();
    for (i, obj) in records.iter().filter_map(JsonValue::as_object).enumerate() {
        builder.push(i, &layout, |pos| {
            obj.get(&headers[pos]).map(json_to_cell).unwrap_or(Cell::Null)
        });
    }

    Ok(builder.finish())
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) if s.is_empty() => Cell::Null,
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same columns as the CSV.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Store `股票代码` as a string column;
/// integer codes have already lost their leading zeros.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let layout = {
        let schema = builder.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        Layout::from_headers(&names)?
    };
    let reader = builder.build().context("building parquet reader")?;

    let mut records = RecordBuilder::default();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            records.push(row_offset + row, &layout, |pos| {
                extract_cell(batch.column(pos), row)
            });
        }
        row_offset += batch.num_rows();
    }

    Ok(records.finish())
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Cell::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Cell::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Cell::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Cell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Cell::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Cell::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Cell::Bool(col.as_boolean().value(row)),
        other => Cell::Text(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "股票代码,企业名称,年份,数字化转型指数(0-100分),人工智能词频数,大数据词频数,云计算词频数,区块链词频数,数字技术运用词频数";

    fn write_temp(ext: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(ext)
            .tempfile()
            .expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn loads_csv_and_keeps_leading_zeros() {
        let csv = format!(
            "{HEADER}\n000001,平安银行,2022,40.5,3,4,5,6,18\n600000,浦发银行,2001,12.5,0,1,0,0,1\n"
        );
        let file = write_temp(".csv", &csv);
        let ds = load_file(file.path()).expect("load csv");

        assert_eq!(ds.len(), 2);
        let first = &ds.records()[0];
        assert_eq!(first.code, "000001");
        assert_eq!(first.year, Some(2022));
        assert_eq!(first.index, 40.5);
        assert_eq!(first.tech.total(), 18);
        assert_eq!(first.digital_tech, 18);
        assert!(ds.coercion().is_clean());
    }

    #[test]
    fn invalid_numbers_default_and_are_counted() {
        let csv = format!("{HEADER}\n600000,浦发银行,n/a,bad,,2.9,-1,x,\n");
        let file = write_temp(".csv", &csv);
        let ds = load_file(file.path()).expect("load csv");

        let rec = &ds.records()[0];
        assert_eq!(rec.year, None);
        assert_eq!(rec.index, 0.0);
        assert_eq!(rec.tech.ai, 0);
        assert_eq!(rec.tech.big_data, 2);
        assert_eq!(rec.tech.cloud, 0);
        assert_eq!(rec.tech.blockchain, 0);

        let report = ds.coercion();
        assert_eq!(report.count_for(columns::YEAR), 1);
        assert_eq!(report.count_for(columns::INDEX), 1);
        assert_eq!(report.count_for(columns::AI), 1);
        assert_eq!(report.count_for(columns::BIG_DATA), 0);
        assert_eq!(report.count_for(columns::CLOUD), 1);
        assert_eq!(report.total(), 6);
    }

    #[test]
    fn oversized_counts_are_rejected() {
        let csv = format!("{HEADER}\n600000,浦发银行,2000,10,1e20,1,0,0,18446744073709551616\n");
        let file = write_temp(".csv", &csv);
        let ds = load_file(file.path()).expect("load csv");

        let rec = &ds.records()[0];
        assert_eq!(rec.tech.ai, 0);
        assert_eq!(rec.tech.total(), 1);
        assert_eq!(rec.digital_tech, 0);
        assert_eq!(ds.coercion().count_for(columns::AI), 1);
        assert_eq!(ds.coercion().count_for(columns::DIGITAL_TECH), 1);
    }

    #[test]
    fn strips_byte_order_mark_from_header() {
        let csv = format!("\u{feff}{HEADER}\n600000,浦发银行,2000,10,0,0,0,0,0\n");
        let file = write_temp(".csv", &csv);
        let ds = load_file(file.path()).expect("load csv");
        assert_eq!(ds.records()[0].code, "600000");
    }

    #[test]
    fn missing_count_columns_read_as_zero() {
        let csv = "股票代码,企业名称,年份,数字化转型指数(0-100分)\n600000,浦发银行,2000,10\n";
        let file = write_temp(".csv", csv);
        let ds = load_file(file.path()).expect("load csv");
        assert_eq!(ds.records()[0].tech, TechCounts::default());
        assert!(ds.coercion().is_clean());
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let csv = "股票代码,年份\n600000,2000\n";
        let file = write_temp(".csv", csv);
        let err = load_file(file.path()).expect_err("should fail");
        assert!(format!("{err:#}").contains(columns::NAME));
    }

    #[test]
    fn loads_json_records() {
        let json = r#"[
            {"股票代码": "600000", "企业名称": "浦发银行", "年份": 2000,
             "数字化转型指数(0-100分)": 10.0, "人工智能词频数": 2, "大数据词频数": 1,
             "云计算词频数": 0, "区块链词频数": 0, "数字技术运用词频数": 3},
            {"股票代码": "600000", "企业名称": "浦发银行", "年份": 2001.0,
             "数字化转型指数(0-100分)": "12.5", "人工智能词频数": null}
        ]"#;
        let file = write_temp(".json", json);
        let ds = load_file(file.path()).expect("load json");

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].tech.ai, 2);
        assert_eq!(ds.records()[1].year, Some(2001));
        assert_eq!(ds.records()[1].index, 12.5);
        assert_eq!(ds.coercion().count_for(columns::AI), 1);
    }

    #[test]
    fn json_columns_come_from_every_row() {
        let json = r#"[
            {"股票代码": "600000", "企业名称": "浦发银行", "年份": 2000,
             "数字化转型指数(0-100分)": 10.0},
            {"股票代码": "600000", "企业名称": "浦发银行", "年份": 2001,
             "数字化转型指数(0-100分)": 11.0, "云计算词频数": 7}
        ]"#;
        let file = write_temp(".json", json);
        let ds = load_file(file.path()).expect("load json");

        assert_eq!(ds.records()[0].tech.cloud, 0);
        assert_eq!(ds.records()[1].tech.cloud, 7);
        assert_eq!(ds.coercion().count_for(columns::CLOUD), 1);
    }

    #[test]
    fn loads_parquet_columns() {
        use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new(columns::CODE, DataType::Utf8, false),
            Field::new(columns::NAME, DataType::Utf8, false),
            Field::new(columns::YEAR, DataType::Int64, false),
            Field::new(columns::INDEX, DataType::Float64, false),
            Field::new(columns::AI, DataType::Int64, true),
            Field::new(columns::BIG_DATA, DataType::Int64, true),
        ]));
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["000001", "000001"])),
            Arc::new(StringArray::from(vec!["平安银行", "平安银行"])),
            Arc::new(Int64Array::from(vec![2022, 2023])),
            Arc::new(Float64Array::from(vec![40.0, 45.5])),
            Arc::new(Int64Array::from(vec![Some(12), None])),
            Arc::new(Int64Array::from(vec![Some(30), Some(31)])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), arrays).expect("batch");

        let mut file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .expect("create temp file");
        let mut writer = ArrowWriter::try_new(file.as_file_mut(), schema, None).expect("writer");
        writer.write(&batch).expect("write batch");
        writer.close().expect("close writer");

        let ds = load_file(file.path()).expect("load parquet");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.company_count(), 1);

        let first = &ds.records()[0];
        assert_eq!(first.code, "000001");
        assert_eq!(first.name, "平安银行");
        assert_eq!(first.year, Some(2022));
        assert_eq!(first.index, 40.0);
        assert_eq!(first.tech.ai, 12);
        assert_eq!(first.tech.big_data, 30);

        let second = &ds.records()[1];
        assert_eq!(second.year, Some(2023));
        assert_eq!(second.index, 45.5);
        assert_eq!(second.tech.ai, 0);
        assert_eq!(second.tech.big_data, 31);

        assert_eq!(ds.coercion().count_for(columns::AI), 1);
        assert_eq!(ds.coercion().total(), 1);
    }

    #[test]
    fn numeric_json_codes_print_without_fraction() {
        assert_eq!(text(Cell::Float(600000.0)), "600000");
        assert_eq!(text(Cell::Integer(600519)), "600519");
        assert_eq!(text(Cell::Null), "");
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = write_temp(".xlsx", "");
        assert!(load_file(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_file(Path::new("/nonexistent/table.csv")).is_err());
    }
}
