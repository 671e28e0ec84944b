/// Core data types for the flood-discharge calculation service.
///
/// This module defines the shared domain model imported by all other
/// modules. It contains no I/O: only types, the error enum, and the
/// parameter checks that must run before any numeric work.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Ratio columns
// ---------------------------------------------------------------------------

/// Number of flood-frequency ratio columns recognized in station tables.
pub const RATIO_COLUMN_COUNT: usize = 7;

/// Station-level flood-frequency indicators: the ratio of an x-year
/// return-period discharge to the mean discharge.
///
/// Declaration order is the order in which metrics are computed, reported
/// and charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RatioColumn {
    Qm,
    Q5,
    Q10,
    Q20,
    Q50,
    Q100,
    Q200,
}

impl RatioColumn {
    pub const ALL: [RatioColumn; RATIO_COLUMN_COUNT] = [
        RatioColumn::Qm,
        RatioColumn::Q5,
        RatioColumn::Q10,
        RatioColumn::Q20,
        RatioColumn::Q50,
        RatioColumn::Q100,
        RatioColumn::Q200,
    ];

    /// Column header as it appears in station tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            RatioColumn::Qm => "Qm/Qn",
            RatioColumn::Q5 => "Q5/Qn",
            RatioColumn::Q10 => "Q10/Qn",
            RatioColumn::Q20 => "Q20/Qn",
            RatioColumn::Q50 => "Q50/Qn",
            RatioColumn::Q100 => "Q100/Qn",
            RatioColumn::Q200 => "Q200/Qn",
        }
    }

    /// Looks up a ratio column by its exact header. Returns `None` for
    /// any other column name.
    pub fn from_column_name(name: &str) -> Option<Self> {
        RatioColumn::ALL.into_iter().find(|c| c.as_str() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RatioColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RatioColumn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A mapping from the fixed ratio-column key set to optional values.
///
/// Absent keys are simply `None`; iteration only visits present keys, in
/// `RatioColumn::ALL` order. Serializes as a JSON object keyed by column
/// header.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioMap<T> {
    slots: [Option<T>; RATIO_COLUMN_COUNT],
}

impl<T> Default for RatioMap<T> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl<T> RatioMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `column`, returning the previous value if any.
    pub fn insert(&mut self, column: RatioColumn, value: T) -> Option<T> {
        self.slots[column.index()].replace(value)
    }

    pub fn get(&self, column: RatioColumn) -> Option<&T> {
        self.slots[column.index()].as_ref()
    }

    pub fn contains(&self, column: RatioColumn) -> bool {
        self.slots[column.index()].is_some()
    }

    /// Present entries in fixed column order.
    pub fn iter(&self) -> impl Iterator<Item = (RatioColumn, &T)> + '_ {
        RatioColumn::ALL
            .into_iter()
            .zip(self.slots.iter())
            .filter_map(|(column, slot)| slot.as_ref().map(|value| (column, value)))
    }

    /// Present keys in fixed column order.
    pub fn columns(&self) -> impl Iterator<Item = RatioColumn> + '_ {
        self.iter().map(|(column, _)| column)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Serialize> Serialize for RatioMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column.as_str(), value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Station types
// ---------------------------------------------------------------------------

/// One gauging station row after strict ingestion.
///
/// Field names serialize with the headers used in the station tables so
/// the filtered station list echoes its input columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    #[serde(rename = "stationNumber")]
    pub station_number: String,
    #[serde(rename = "stationName")]
    pub station_name: String,
    /// WGS84 latitude, decimal degrees.
    pub latitude: f64,
    /// WGS84 longitude, decimal degrees.
    pub longitude: f64,
    /// Specific discharge (l/s/km²).
    #[serde(rename = "specificDischarge")]
    pub specific_discharge: f64,
    /// Ratio values this station reports. A station may lack a value for a
    /// column other stations carry.
    #[serde(flatten)]
    pub ratios: RatioMap<f64>,
}

impl StationRecord {
    /// Display label used in charts and reports: `"{name} ({number})"`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.station_name, self.station_number)
    }
}

/// A station inside the search radius, with its locality weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredStation {
    #[serde(flatten)]
    pub record: StationRecord,
    /// Great-circle distance to the user's location, km.
    pub distance_to_user: f64,
    pub locality_weight: f64,
    pub locality_weight_scaled: f64,
    /// Sums to 1 across the filtered set.
    pub locality_weight_normalized: f64,
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// The eight scalar inputs of one analysis.
///
/// Serialized names match the `user_inputs` echo of the result; the
/// camelCase web-form field names are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParameters {
    #[serde(rename = "latitude", alias = "user_latitude")]
    pub user_latitude: f64,
    #[serde(rename = "longitude", alias = "user_longitude")]
    pub user_longitude: f64,
    #[serde(alias = "radius")]
    pub radius_km: f64,
    #[serde(alias = "catchmentArea")]
    pub catchment_area_km2: f64,
    #[serde(alias = "climateFactor")]
    pub climate_factor: f64,
    #[serde(alias = "safetyFactor")]
    pub safety_factor: f64,
    #[serde(alias = "localityScalingFactor")]
    pub locality_scaling_factor: f64,
    #[serde(alias = "distanceScalingFactor")]
    pub distance_scaling_factor: f64,
}

impl AnalysisParameters {
    /// Each parameter paired with the name used in error messages.
    pub fn named_values(&self) -> [(&'static str, f64); 8] {
        [
            ("latitude", self.user_latitude),
            ("longitude", self.user_longitude),
            ("radius_km", self.radius_km),
            ("catchment_area_km2", self.catchment_area_km2),
            ("climate_factor", self.climate_factor),
            ("safety_factor", self.safety_factor),
            ("locality_scaling_factor", self.locality_scaling_factor),
            ("distance_scaling_factor", self.distance_scaling_factor),
        ]
    }

    /// Rejects non-finite values and a zero distance scaling factor.
    ///
    /// Physical plausibility (negative areas, factors below one, ...) is
    /// left to the caller.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (name, value) in self.named_values() {
            if !value.is_finite() {
                return Err(AnalysisError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("must be a finite number, got {}", value),
                });
            }
        }
        if self.distance_scaling_factor == 0.0 {
            return Err(zero_distance_scaling_factor());
        }
        Ok(())
    }
}

pub(crate) fn zero_distance_scaling_factor() -> AnalysisError {
    AnalysisError::InvalidParameter {
        name: "distance_scaling_factor".to_string(),
        reason: "must be non-zero (division by zero in locality weighting)".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Specific-discharge statistics over the filtered set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DischargeSummary {
    pub weighted_avg_specific_discharge: f64,
    pub average_discharge: f64,
    pub std_discharge: f64,
    /// Mean discharge scaled to the catchment, m³/s.
    pub average_discharge_catchment: f64,
}

/// Quantities derived for one ratio column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FloodMetric {
    pub average_value: f64,
    pub std_dev: f64,
    pub result_ratio: f64,
    pub flood_discharge: f64,
    pub deviated_flood_discharge: f64,
    pub dimensioned_flood_discharge: f64,
    pub dimensioned_deviated_flood_discharge: f64,
}

/// Per-station chart series, one entry per filtered station.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StationChart {
    pub labels: Vec<String>,
    pub distances: Vec<f64>,
    pub weights: Vec<f64>,
    pub specific_discharge: Vec<f64>,
}

/// Per-column chart series, one entry per present ratio column.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FloodMetricChart {
    pub labels: Vec<String>,
    pub flood_discharge: Vec<f64>,
    pub dimensioned_flood_discharge: Vec<f64>,
    pub deviated_flood_discharge: Vec<f64>,
    pub dimensioned_deviated_flood_discharge: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartData {
    pub stations: StationChart,
    pub flood_metrics: FloodMetricChart,
}

/// Everything one analysis produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub filtered_stations: Vec<FilteredStation>,
    pub user_inputs: AnalysisParameters,
    pub discharge_summary: DischargeSummary,
    pub flood_metrics: RatioMap<FloodMetric>,
    pub chart_data: ChartData,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that abort an analysis. No partial result is ever produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// One or more required columns are absent from the table header.
    #[error("Required column(s) not found in the input data: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The table has the required columns but no rows.
    #[error("Input dataset contains no station rows")]
    EmptyDataset,

    /// A cell could not be read as the type its column requires.
    /// `row` is 1-based.
    #[error("Invalid value in row {row}, column '{column}': {reason}")]
    InvalidCell {
        row: usize,
        column: String,
        reason: String,
    },

    /// Every station lies outside the search radius (km).
    #[error("No stations found within {0} km radius")]
    NoStationsInRadius(f64),

    /// A parameter makes the calculation undefined.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A ratio column averages to zero, so its result ratio is undefined.
    #[error("Column '{column}' has a mean of zero across the stations in radius; result ratio is undefined")]
    ZeroMeanRatio { column: RatioColumn },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
