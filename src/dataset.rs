/// Station tables: loading, preview, and strict conversion to typed records.
///
/// A `Dataset` is the raw table handed over by whatever reads the user's
/// file: ordered column names plus rows of loosely typed cells. Nothing in
/// the analysis touches a `Dataset` directly. `StationTable::from_dataset`
/// is the single, fail-fast parse step that turns it into
/// `StationRecord`s, reporting the first bad cell by row and column.
///
/// Supported sources:
///   - CSV with a header row (`from_csv_reader`, `from_csv_path`)
///   - JSON array of row objects, "records" orientation (`from_json_records`)
///   - Spreadsheets, first worksheet (`from_spreadsheet_path`)

use crate::model::{AnalysisError, RatioColumn, RatioMap, StationRecord};
use calamine::{open_workbook_auto, Data, Reader};
use csv::{ReaderBuilder, Trim};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";
pub const COL_SPECIFIC_DISCHARGE: &str = "specificDischarge";
pub const COL_STATION_NUMBER: &str = "stationNumber";
pub const COL_STATION_ID: &str = "stationId";
pub const COL_STATION_NAME: &str = "stationName";

/// Columns every station table must carry, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 3] = [COL_LATITUDE, COL_LONGITUDE, COL_SPECIFIC_DISCHARGE];

/// Identifier and name columns, always read as text.
const LABEL_COLUMNS: [&str; 3] = [COL_STATION_NUMBER, COL_STATION_ID, COL_STATION_NAME];

/// Number of rows included in a preview.
pub const PREVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures while reading a table from its source format.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON array of row objects, found {0}")]
    NotRecords(String),

    #[error("Failed to read spreadsheet {path}: {source}")]
    Spreadsheet {
        path: String,
        #[source]
        source: calamine::Error,
    },

    #[error("Spreadsheet {0} has no worksheets")]
    NoWorksheet(String),

    #[error("Row {row} has {found} cells but the header has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported dataset format '{0}' (expected .csv, .json, .xlsx, .xlsm, .xlsb, .xls or .ods)")]
    UnsupportedFormat(String),
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A single raw table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A typed number: a JSON number or a numeric spreadsheet cell.
    Number(f64),
    /// Text that reads as a number. The source text is kept so identifier
    /// and name columns print exactly as written (`0012`, `12.70`, `Inf`).
    NumericText(String),
    Text(String),
    Empty,
}

impl CellValue {
    /// Classifies a text field: blank is `Empty`, anything that parses as
    /// `f64` is `NumericText`, the rest is `Text`.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else if trimmed.parse::<f64>().is_ok() {
            CellValue::NumericText(trimmed.to_string())
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    /// Converts a JSON scalar. Strings stay text even when they look
    /// numeric; booleans become text; nested values are rejected.
    pub fn from_json(value: &Value) -> Result<Self, DatasetError> {
        match value {
            Value::Null => Ok(CellValue::Empty),
            Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .ok_or_else(|| DatasetError::NotRecords(format!("unrepresentable number {}", n))),
            Value::String(s) if s.trim().is_empty() => Ok(CellValue::Empty),
            Value::String(s) => Ok(CellValue::Text(s.clone())),
            Value::Bool(b) => Ok(CellValue::Text(b.to_string())),
            Value::Array(_) | Value::Object(_) => Err(DatasetError::NotRecords(
                "a nested array or object inside a row".to_string(),
            )),
        }
    }

    /// Converts a spreadsheet cell. String cells are classified like CSV
    /// fields; dates, durations and error cells keep their display text.
    pub fn from_spreadsheet(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::String(s) => CellValue::from_text(s),
            Data::Bool(b) => CellValue::Text(b.to_string()),
            other => CellValue::Text(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric value of a `Number` or `NumericText` cell. May be
    /// non-finite.
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::NumericText(s) => s.parse().ok(),
            CellValue::Text(_) | CellValue::Empty => None,
        }
    }

    /// String form for identifier/name columns. Text is returned as
    /// written; typed numbers print without a fractional part when
    /// integral (`12` rather than `12.0`).
    pub fn to_label(&self) -> Option<String> {
        match self {
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::NumericText(s) | CellValue::Text(s) => Some(s.clone()),
            CellValue::Empty => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::NumericText(s) => s
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(s.clone())),
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Empty => Value::Null,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw table
// ---------------------------------------------------------------------------

/// An ordered table of raw cells, one row per station.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

/// Shallow look at a table: size, header, and the first few rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetPreview {
    pub total_rows: usize,
    pub columns: Vec<String>,
    pub sample_data: Vec<Map<String, Value>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from a header and rows. Short rows are padded with
    /// `Empty`; a row wider than the header is an error.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, DatasetError> {
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) -> Result<(), DatasetError> {
        if row.len() > self.columns.len() {
            return Err(DatasetError::RowWidth {
                row: self.rows.len() + 1,
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Reads a CSV table with a header row. Fields are trimmed and a
    /// leading byte-order mark on the first header is ignored.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| if i == 0 { h.trim_start_matches('\u{feff}') } else { h })
            .map(str::to_string)
            .collect();

        let mut dataset = Self::new(columns);
        for record in rdr.records() {
            let record = record?;
            dataset.push_row(record.iter().map(CellValue::from_text).collect())?;
        }

        Ok(dataset)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_csv_reader(file)
    }

    /// Parses a JSON array of row objects. Column order is the order in
    /// which keys are first seen; a key missing from a row reads as `Empty`.
    pub fn from_json_records(text: &str) -> Result<Self, DatasetError> {
        let items = match serde_json::from_str::<Value>(text)? {
            Value::Array(items) => items,
            other => return Err(DatasetError::NotRecords(json_kind(&other).to_string())),
        };

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Object(map) => records.push(map),
                other => return Err(DatasetError::NotRecords(format!("an array of {}", json_kind(&other)))),
            }
        }
        Self::from_records(&records)
    }

    /// Builds a table from already-decoded row objects.
    pub fn from_records(records: &[Map<String, Value>]) -> Result<Self, DatasetError> {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut dataset = Self::new(columns);
        for record in records {
            let mut row = Vec::with_capacity(dataset.columns.len());
            for column in &dataset.columns {
                let cell = match record.get(column) {
                    Some(value) => CellValue::from_json(value)?,
                    None => CellValue::Empty,
                };
                row.push(cell);
            }
            dataset.rows.push(row);
        }

        Ok(dataset)
    }

    /// Reads the first worksheet of a spreadsheet. Its first row is the
    /// header; fully blank rows are skipped.
    pub fn from_spreadsheet_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let spreadsheet_error = |source| DatasetError::Spreadsheet {
            path: path.display().to_string(),
            source,
        };

        let mut workbook = open_workbook_auto(path).map_err(spreadsheet_error)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| DatasetError::NoWorksheet(path.display().to_string()))?
            .map_err(spreadsheet_error)?;

        let mut rows = range.rows();
        let columns: Vec<String> = rows
            .next()
            .map(|header| header.iter().map(|c| c.to_string().trim().to_string()).collect())
            .unwrap_or_default();

        let mut dataset = Self::new(columns);
        for row in rows {
            let cells: Vec<CellValue> = row.iter().map(CellValue::from_spreadsheet).collect();
            if cells.iter().all(CellValue::is_empty) {
                continue;
            }
            dataset.push_row(cells)?;
        }

        Ok(dataset)
    }

    /// Loads a table, choosing the parser from the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Self::from_csv_path(path),
            "json" => {
                let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_json_records(&text)
            }
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::from_spreadsheet_path(path),
            other => Err(DatasetError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Row count, column names, and the first `PREVIEW_ROWS` rows as
    /// ordered JSON objects.
    pub fn preview(&self) -> DatasetPreview {
        let sample_data = self
            .rows
            .iter()
            .take(PREVIEW_ROWS)
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row.iter())
                    .map(|(column, cell)| {
                        let value = if LABEL_COLUMNS.contains(&column.as_str()) {
                            cell.to_label().map(Value::String).unwrap_or(Value::Null)
                        } else {
                            cell.to_json()
                        };
                        (column.clone(), value)
                    })
                    .collect::<Map<String, Value>>()
            })
            .collect();

        DatasetPreview {
            total_rows: self.rows.len(),
            columns: self.columns.clone(),
            sample_data,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Typed station table
// ---------------------------------------------------------------------------

/// Station records parsed from a `Dataset`, plus the ratio columns its
/// header carries.
#[derive(Debug, Clone, PartialEq)]
pub struct StationTable {
    stations: Vec<StationRecord>,
    ratio_columns: Vec<RatioColumn>,
}

impl StationTable {
    /// Validates and converts a raw table.
    ///
    /// Checks run in order: required columns (all missing names reported
    /// together), non-empty, then each row. Station numbers come from
    /// `stationNumber`, else `stationId`, else the 1-based row index;
    /// names from `stationName`, else `"Station {n}"`. Blank ratio cells
    /// mean "no value for this station"; any other non-numeric cell in a
    /// numeric column is an error.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, AnalysisError> {
        let (Some(lat_idx), Some(lon_idx), Some(discharge_idx)) = (
            dataset.column_index(COL_LATITUDE),
            dataset.column_index(COL_LONGITUDE),
            dataset.column_index(COL_SPECIFIC_DISCHARGE),
        ) else {
            let missing = REQUIRED_COLUMNS
                .iter()
                .filter(|c| !dataset.has_column(c))
                .map(|c| c.to_string())
                .collect();
            return Err(AnalysisError::MissingColumns(missing));
        };

        if dataset.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }

        let number_idx = dataset
            .column_index(COL_STATION_NUMBER)
            .or_else(|| dataset.column_index(COL_STATION_ID));
        let name_idx = dataset.column_index(COL_STATION_NAME);
        let ratio_indices: Vec<(RatioColumn, usize)> = RatioColumn::ALL
            .into_iter()
            .filter_map(|c| dataset.column_index(c.as_str()).map(|idx| (c, idx)))
            .collect();

        let mut stations = Vec::with_capacity(dataset.len());
        for (i, row) in dataset.rows.iter().enumerate() {
            let n = i + 1;

            let station_number = number_idx
                .and_then(|idx| row[idx].to_label())
                .unwrap_or_else(|| n.to_string());
            let station_name = name_idx
                .and_then(|idx| row[idx].to_label())
                .unwrap_or_else(|| format!("Station {}", n));

            let mut ratios = RatioMap::new();
            for &(column, idx) in &ratio_indices {
                if let Some(value) = optional_number(&row[idx], n, column.as_str())? {
                    ratios.insert(column, value);
                }
            }

            stations.push(StationRecord {
                station_number,
                station_name,
                latitude: required_number(&row[lat_idx], n, COL_LATITUDE)?,
                longitude: required_number(&row[lon_idx], n, COL_LONGITUDE)?,
                specific_discharge: required_number(&row[discharge_idx], n, COL_SPECIFIC_DISCHARGE)?,
                ratios,
            });
        }

        Ok(Self {
            stations,
            ratio_columns: ratio_indices.into_iter().map(|(c, _)| c).collect(),
        })
    }

    pub fn stations(&self) -> &[StationRecord] {
        &self.stations
    }

    /// Ratio columns present in the source header, in fixed column order.
    pub fn ratio_columns(&self) -> &[RatioColumn] {
        &self.ratio_columns
    }
}

fn required_number(cell: &CellValue, row: usize, column: &str) -> Result<f64, AnalysisError> {
    match optional_number(cell, row, column)? {
        Some(value) => Ok(value),
        None => Err(invalid_cell(row, column, "value is missing".to_string())),
    }
}

fn optional_number(cell: &CellValue, row: usize, column: &str) -> Result<Option<f64>, AnalysisError> {
    let found = cell.to_label().unwrap_or_default();
    match (cell, cell.numeric_value()) {
        (CellValue::Empty, _) => Ok(None),
        (_, Some(value)) if value.is_finite() => Ok(Some(value)),
        (_, Some(_)) => Err(invalid_cell(
            row,
            column,
            format!("expected a finite number, found {}", found),
        )),
        (_, None) => Err(invalid_cell(
            row,
            column,
            format!("expected a number, found '{}'", found),
        )),
    }
}

fn invalid_cell(row: usize, column: &str, reason: String) -> AnalysisError {
    AnalysisError::InvalidCell {
        row,
        column: column.to_string(),
        reason,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
stationNumber,stationName,latitude,longitude,specificDischarge,Qm/Qn,Q5/Qn
2.11.0,Narsjø,62.36,11.47,18.2,1.8,2.4
2.13.0,Sundsfossbru,61.92,10.83,21.5,,2.9
2.25.0,Losna,61.33,10.14,24.0,2.1,3.1
";

    fn sample_dataset() -> Dataset {
        Dataset::from_csv_reader(SAMPLE_CSV.as_bytes()).expect("sample CSV should parse")
    }

    // --- Cells ---------------------------------------------------------------

    #[test]
    fn test_cell_from_text_classifies_fields() {
        assert_eq!(CellValue::from_text("  "), CellValue::Empty);
        assert_eq!(CellValue::from_text("18.2"), CellValue::NumericText("18.2".to_string()));
        assert_eq!(CellValue::from_text(" 0012 ").numeric_value(), Some(12.0));
        assert_eq!(CellValue::from_text("2.11.0"), CellValue::Text("2.11.0".to_string()));
    }

    #[test]
    fn test_integral_number_labels_drop_fraction() {
        assert_eq!(CellValue::Number(12345.0).to_label(), Some("12345".to_string()));
        assert_eq!(CellValue::Number(12.5).to_label(), Some("12.5".to_string()));
        assert_eq!(CellValue::Empty.to_label(), None);
    }

    #[test]
    fn test_cell_from_json_rejects_nested_values() {
        assert!(CellValue::from_json(&serde_json::json!([1, 2])).is_err());
        assert_eq!(
            CellValue::from_json(&serde_json::json!(true)).expect("bool should convert"),
            CellValue::Text("true".to_string())
        );
    }

    // --- Loading -------------------------------------------------------------

    #[test]
    fn test_csv_preserves_column_and_row_order() {
        let dataset = sample_dataset();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.columns()[0], "stationNumber");
        assert_eq!(dataset.columns()[6], "Q5/Qn");
        assert_eq!(dataset.rows()[2][1], CellValue::Text("Losna".to_string()));
        assert_eq!(dataset.rows()[1][5], CellValue::Empty);
    }

    #[test]
    fn test_csv_strips_byte_order_mark() {
        let csv = "\u{feff}latitude,longitude,specificDischarge\n60.0,10.0,20.0\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).expect("CSV should parse");
        assert!(dataset.has_column("latitude"));
    }

    #[test]
    fn test_csv_ragged_rows_are_errors() {
        let csv = "latitude,longitude,specificDischarge\n60.0,10.0\n";
        let result = Dataset::from_csv_reader(csv.as_bytes());
        assert!(matches!(result, Err(DatasetError::Csv(_))), "got {:?}", result);
    }

    #[test]
    fn test_json_records_use_first_seen_key_order() {
        let json = r#"[
            {"stationId": 101, "latitude": 60.1, "longitude": 10.2, "specificDischarge": 20.0},
            {"latitude": 60.3, "longitude": 10.4, "specificDischarge": 22.0, "Q5/Qn": 2.5}
        ]"#;
        let dataset = Dataset::from_json_records(json).expect("records should parse");
        assert_eq!(
            dataset.columns(),
            &["stationId", "latitude", "longitude", "specificDischarge", "Q5/Qn"]
        );
        assert_eq!(dataset.rows()[0][4], CellValue::Empty, "missing key reads as Empty");
        assert_eq!(dataset.rows()[1][0], CellValue::Empty);
    }

    #[test]
    fn test_json_must_be_array_of_objects() {
        assert!(matches!(
            Dataset::from_json_records(r#"{"latitude": 1}"#),
            Err(DatasetError::NotRecords(_))
        ));
        assert!(matches!(
            Dataset::from_json_records("[1, 2]"),
            Err(DatasetError::NotRecords(_))
        ));
    }

    #[test]
    fn test_from_path_rejects_unknown_extensions() {
        let result = Dataset::from_path("attached/Data.parquet");
        match result {
            Err(DatasetError::UnsupportedFormat(ext)) => assert_eq!(ext, "parquet"),
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_spreadsheet_is_reported() {
        let result = Dataset::from_path("attached/Data.xlsx");
        assert!(
            matches!(result, Err(DatasetError::Spreadsheet { .. })),
            "got {:?}",
            result
        );
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let dataset = Dataset::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![CellValue::Number(1.0)]],
        )
        .expect("short rows are padded");
        assert_eq!(dataset.rows()[0], vec![CellValue::Number(1.0), CellValue::Empty]);
    }

    #[test]
    fn test_rows_wider_than_header_are_errors() {
        let result = Dataset::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec![CellValue::Number(1.0), CellValue::Number(2.0)],
                vec![CellValue::Number(1.0), CellValue::Number(2.0), CellValue::Number(3.0)],
            ],
        );
        match result {
            Err(DatasetError::RowWidth { row, expected, found }) => {
                assert_eq!((row, expected, found), (2, 2, 3));
            }
            other => panic!("expected RowWidth, got {:?}", other),
        }
    }

    // --- Preview -------------------------------------------------------------

    #[test]
    fn test_preview_limits_sample_to_five_rows() {
        let mut csv = String::from("latitude,longitude,specificDischarge\n");
        for i in 0..8 {
            csv.push_str(&format!("60.{},10.0,{}\n", i, 20 + i));
        }
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).expect("CSV should parse");
        let preview = dataset.preview();

        assert_eq!(preview.total_rows, 8);
        assert_eq!(preview.sample_data.len(), PREVIEW_ROWS);
        assert_eq!(preview.columns, vec!["latitude", "longitude", "specificDischarge"]);
    }

    #[test]
    fn test_preview_rows_keep_column_order_and_nulls() {
        let preview = sample_dataset().preview();
        let second = &preview.sample_data[1];
        let keys: Vec<&String> = second.keys().collect();
        assert_eq!(keys[0], "stationNumber");
        assert_eq!(keys[6], "Q5/Qn");
        assert_eq!(second["Qm/Qn"], Value::Null);
        assert_eq!(second["stationName"], "Sundsfossbru");
    }

    // --- Strict conversion ---------------------------------------------------

    #[test]
    fn test_station_table_parses_records_and_ratio_columns() {
        let table = StationTable::from_dataset(&sample_dataset()).expect("table should convert");
        assert_eq!(table.stations().len(), 3);
        assert_eq!(table.ratio_columns(), &[RatioColumn::Qm, RatioColumn::Q5]);

        let sundsfossbru = &table.stations()[1];
        assert_eq!(sundsfossbru.station_number, "2.13.0");
        assert_eq!(sundsfossbru.specific_discharge, 21.5);
        assert!(sundsfossbru.ratios.get(RatioColumn::Qm).is_none(), "blank ratio cell is skipped");
        assert_eq!(sundsfossbru.ratios.get(RatioColumn::Q5), Some(&2.9));
    }

    #[test]
    fn test_missing_required_columns_are_all_reported() {
        let csv = "stationName,longitude\nA,10.0\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).expect("CSV should parse");
        assert_eq!(
            StationTable::from_dataset(&dataset),
            Err(AnalysisError::MissingColumns(vec![
                "latitude".to_string(),
                "specificDischarge".to_string(),
            ]))
        );
    }

    #[test]
    fn test_header_only_table_is_empty_dataset() {
        let csv = "latitude,longitude,specificDischarge\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).expect("CSV should parse");
        assert_eq!(StationTable::from_dataset(&dataset), Err(AnalysisError::EmptyDataset));
    }

    #[test]
    fn test_station_identity_falls_back_to_id_then_index() {
        let csv = "stationId,latitude,longitude,specificDischarge\n\
                   101,60.0,10.0,20.0\n\
                   ,60.1,10.1,21.0\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).expect("CSV should parse");
        let table = StationTable::from_dataset(&dataset).expect("table should convert");

        assert_eq!(table.stations()[0].station_number, "101");
        assert_eq!(table.stations()[1].station_number, "2");
        assert_eq!(table.stations()[0].station_name, "Station 1");
        assert_eq!(table.stations()[1].station_name, "Station 2");
    }

    #[test]
    fn test_numeric_looking_labels_keep_their_text() {
        let csv = "stationNumber,stationName,latitude,longitude,specificDischarge\n\
                   0012,Inf,60.0,10.0,20.0\n\
                   12.70,Nan,60.1,10.1,21.0\n\
                   12.7,1e3,60.2,10.2,22.0\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).expect("CSV should parse");
        let table = StationTable::from_dataset(&dataset).expect("table should convert");

        let labels: Vec<(&str, &str)> = table
            .stations()
            .iter()
            .map(|s| (s.station_number.as_str(), s.station_name.as_str()))
            .collect();
        assert_eq!(labels, vec![("0012", "Inf"), ("12.70", "Nan"), ("12.7", "1e3")]);
        assert_eq!(table.stations()[0].label(), "Inf (0012)");
        assert_ne!(
            table.stations()[1].station_number,
            table.stations()[2].station_number,
            "12.70 and 12.7 are different stations"
        );

        let preview = dataset.preview();
        assert_eq!(preview.sample_data[0]["stationNumber"], "0012");
        assert_eq!(preview.sample_data[0]["stationName"], "Inf");
        assert_eq!(preview.sample_data[0]["latitude"], 60.0);
    }

    #[test]
    fn test_non_finite_text_in_numeric_column_fails() {
        let csv = "latitude,longitude,specificDischarge\n60.0,10.0,Inf\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).expect("CSV should parse");
        match StationTable::from_dataset(&dataset) {
            Err(AnalysisError::InvalidCell { column, reason, .. }) => {
                assert_eq!(column, "specificDischarge");
                assert!(reason.contains("finite"), "got {}", reason);
                assert!(reason.contains("Inf"), "reason should quote the cell: {}", reason);
            }
            other => panic!("expected InvalidCell, got {:?}", other),
        }
    }

    #[test]
    fn test_station_number_preferred_over_station_id() {
        let csv = "stationId,stationNumber,latitude,longitude,specificDischarge\n\
                   101,A-7,60.0,10.0,20.0\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).expect("CSV should parse");
        let table = StationTable::from_dataset(&dataset).expect("table should convert");
        assert_eq!(table.stations()[0].station_number, "A-7");
    }

    #[test]
    fn test_text_in_numeric_column_fails_with_location() {
        let csv = "latitude,longitude,specificDischarge\n\
                   60.0,10.0,20.0\n\
                   60.1,ten,21.0\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).expect("CSV should parse");
        match StationTable::from_dataset(&dataset) {
            Err(AnalysisError::InvalidCell { row, column, reason }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "longitude");
                assert!(reason.contains("ten"), "reason should quote the cell: {}", reason);
            }
            other => panic!("expected InvalidCell, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_required_cell_fails() {
        let csv = "latitude,longitude,specificDischarge\n60.0,10.0,\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).expect("CSV should parse");
        assert!(matches!(
            StationTable::from_dataset(&dataset),
            Err(AnalysisError::InvalidCell { row: 1, .. })
        ));
    }

    #[test]
    fn test_non_numeric_ratio_cell_fails() {
        let csv = "latitude,longitude,specificDischarge,Q10/Qn\n60.0,10.0,20.0,n/a\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).expect("CSV should parse");
        match StationTable::from_dataset(&dataset) {
            Err(AnalysisError::InvalidCell { column, .. }) => assert_eq!(column, "Q10/Qn"),
            other => panic!("expected InvalidCell, got {:?}", other),
        }
    }

    #[test]
    fn test_json_string_numbers_are_not_coerced() {
        let json = r#"[{"latitude": "60.0", "longitude": 10.0, "specificDischarge": 20.0}]"#;
        let dataset = Dataset::from_json_records(json).expect("records should parse");
        assert!(matches!(
            StationTable::from_dataset(&dataset),
            Err(AnalysisError::InvalidCell { .. })
        ));
    }
}
