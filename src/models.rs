//! Data models for prefix aggregation.
//!
//! This module contains the core data structures shared by the aggregator,
//! the history log, and the CSV exporter.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bounding-box dimensions of an entity.
///
/// Serialized as a `[x, y, z]` array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Dimensions {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Dimensions {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Dimensions {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Dimensions> for [f64; 3] {
    fn from(d: Dimensions) -> Self {
        [d.x, d.y, d.z]
    }
}

/// A named scene object supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Object name, matched against the prefix.
    pub name: String,
    /// Whether the object is visible in the scene.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Bounding-box dimensions.
    pub dimensions: Dimensions,
}

fn default_visible() -> bool {
    true
}

impl Entity {
    /// Creates a visible entity.
    pub fn new(name: impl Into<String>, dimensions: Dimensions) -> Self {
        Self {
            name: name.into(),
            visible: true,
            dimensions,
        }
    }

    /// Creates a hidden entity.
    pub fn hidden(name: impl Into<String>, dimensions: Dimensions) -> Self {
        Self {
            visible: false,
            ..Self::new(name, dimensions)
        }
    }
}

/// Error returned when an operation name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown operation '{0}' (expected one of: X, Y, Z, AREA_XY, AREA_XZ, AREA_YZ, AREA_XYZ, BIGGEST)")]
pub struct UnknownOperation(pub String);

/// The per-entity scalar to aggregate.
/// Serialized as its code. Deserialized through `FromStr`, so every
/// spelling accepted on the command line is accepted in files too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Operation {
    /// Sum of X dimensions
    #[default]
    #[serde(rename = "X")]
    SumX,
    /// Sum of Y dimensions
    #[serde(rename = "Y")]
    SumY,
    /// Sum of Z dimensions
    #[serde(rename = "Z")]
    SumZ,
    /// Sum of XY areas
    #[serde(rename = "AREA_XY")]
    AreaXY,
    /// Sum of XZ areas
    #[serde(rename = "AREA_XZ")]
    AreaXZ,
    /// Sum of YZ areas
    #[serde(rename = "AREA_YZ")]
    AreaYZ,
    /// Sum of XYZ volumes
    #[serde(rename = "AREA_XYZ")]
    VolumeXYZ,
    /// Sum of the biggest dimension of each object
    #[serde(rename = "BIGGEST")]
    MaxDimension,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::SumX,
        Operation::SumY,
        Operation::SumZ,
        Operation::AreaXY,
        Operation::AreaXZ,
        Operation::AreaYZ,
        Operation::VolumeXYZ,
        Operation::MaxDimension,
    ];

    /// Computes this operation's scalar for one entity.
    pub fn scalar(&self, d: &Dimensions) -> f64 {
        match self {
            Operation::SumX => d.x,
            Operation::SumY => d.y,
            Operation::SumZ => d.z,
            Operation::AreaXY => d.x * d.y,
            Operation::AreaXZ => d.x * d.z,
            Operation::AreaYZ => d.y * d.z,
            Operation::VolumeXYZ => d.x * d.y * d.z,
            Operation::MaxDimension => max_propagating_nan(max_propagating_nan(d.x, d.y), d.z),
        }
    }

    /// Stable identifier used in history lines and exports.
    pub fn code(&self) -> &'static str {
        match self {
            Operation::SumX => "X",
            Operation::SumY => "Y",
            Operation::SumZ => "Z",
            Operation::AreaXY => "AREA_XY",
            Operation::AreaXZ => "AREA_XZ",
            Operation::AreaYZ => "AREA_YZ",
            Operation::VolumeXYZ => "AREA_XYZ",
            Operation::MaxDimension => "BIGGEST",
        }
    }

    /// Kebab-case name accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SumX => "sum-x",
            Operation::SumY => "sum-y",
            Operation::SumZ => "sum-z",
            Operation::AreaXY => "area-xy",
            Operation::AreaXZ => "area-xz",
            Operation::AreaYZ => "area-yz",
            Operation::VolumeXYZ => "volume-xyz",
            Operation::MaxDimension => "max-dimension",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::SumX => "X",
            Operation::SumY => "Y",
            Operation::SumZ => "Z",
            Operation::AreaXY => "Area XY",
            Operation::AreaXZ => "Area XZ",
            Operation::AreaYZ => "Area YZ",
            Operation::VolumeXYZ => "Area XYZ",
            Operation::MaxDimension => "Bigger Size",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Operation::SumX => "Sum of X dimensions",
            Operation::SumY => "Sum of Y dimensions",
            Operation::SumZ => "Sum of Z dimensions",
            Operation::AreaXY => "Sum of XY areas",
            Operation::AreaXZ => "Sum of XZ areas",
            Operation::AreaYZ => "Sum of YZ areas",
            Operation::VolumeXYZ => "Sum of XYZ volumes",
            Operation::MaxDimension => "Sum of the biggest dimension for each object",
        }
    }
}

/// Like `f64::max`, but NaN in either operand yields NaN.
fn max_propagating_nan(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Operation::ALL
            .into_iter()
            .find(|op| {
                wanted.eq_ignore_ascii_case(op.code())
                    || wanted.eq_ignore_ascii_case(op.name())
                    || wanted.eq_ignore_ascii_case(op.label())
            })
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Decimal separator used when formatting numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecimalStyle {
    /// `12.50`
    #[default]
    Dot,
    /// `12,50`
    Comma,
}

impl DecimalStyle {
    pub fn from_comma_flag(use_comma: bool) -> Self {
        if use_comma {
            DecimalStyle::Comma
        } else {
            DecimalStyle::Dot
        }
    }

    /// Formats a number with exactly two fractional digits.
    pub fn format(&self, number: f64) -> String {
        let formatted = format!("{:.2}", number);
        match self {
            DecimalStyle::Dot => formatted,
            DecimalStyle::Comma => formatted.replace('.', ","),
        }
    }
}

impl fmt::Display for DecimalStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalStyle::Dot => write!(f, "dot"),
            DecimalStyle::Comma => write!(f, "comma"),
        }
    }
}

/// Outcome of one aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    /// Sum of the per-entity scalar over all matched entities.
    pub value: f64,
    /// Number of matched entities.
    pub matched_count: usize,
    /// Matched entities in input order.
    pub matched_entities: Vec<Entity>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.matched_count == 0
    }
}

/// One line of calculation history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Formatted one-line summary.
    pub summary: String,
    /// When the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)
    }
}
