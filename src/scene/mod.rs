//! Scene snapshot loading.
//!
//! A snapshot is the host's list of objects at one point in time, stored
//! either as a JSON array of entities or as a CSV table with the columns
//! `name,visible,x,y,z`.

use crate::models::{Dimensions, Entity};
use serde::{de, Deserialize, Deserializer};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Failure to load a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid CSV snapshot: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unsupported snapshot format '{extension}' for {} (expected .json or .csv)", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },
}

/// On-disk snapshot encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Csv,
}

impl SnapshotFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "json" => Ok(SnapshotFormat::Json),
            "csv" => Ok(SnapshotFormat::Csv),
            _ => Err(SnapshotError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext,
            }),
        }
    }
}

/// One row of a CSV snapshot.
///
/// `name` is kept verbatim; the other cells may carry padding.
#[derive(Debug, Deserialize)]
struct SnapshotRow {
    name: String,
    #[serde(default, deserialize_with = "trimmed_bool")]
    visible: Option<bool>,
    #[serde(deserialize_with = "trimmed_f64")]
    x: f64,
    #[serde(deserialize_with = "trimmed_f64")]
    y: f64,
    #[serde(deserialize_with = "trimmed_f64")]
    z: f64,
}

fn trimmed_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.trim()
        .parse()
        .map_err(|_| de::Error::custom(format!("invalid number '{}'", raw)))
}

fn trimmed_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid visible flag '{}'", value))),
    }
}

impl From<SnapshotRow> for Entity {
    fn from(row: SnapshotRow) -> Self {
        Entity {
            name: row.name,
            visible: row.visible.unwrap_or(true),
            dimensions: Dimensions::new(row.x, row.y, row.z),
        }
    }
}

/// Load every entity from a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<Vec<Entity>, SnapshotError> {
    let format = SnapshotFormat::from_path(path)?;
    debug!("Loading {:?} snapshot from {}", format, path.display());

    let file = File::open(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let entities = match format {
        SnapshotFormat::Json => {
            let mut content = String::new();
            io::BufReader::new(file)
                .read_to_string(&mut content)
                .map_err(|source| SnapshotError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
            parse_json(&content)?
        }
        SnapshotFormat::Csv => parse_csv(file)?,
    };

    info!("Loaded {} entities from {}", entities.len(), path.display());
    Ok(entities)
}

/// Parse a JSON array of entities.
pub fn parse_json(content: &str) -> Result<Vec<Entity>, SnapshotError> {
    Ok(serde_json::from_str(content)?)
}

/// Parse a CSV table with a `name,visible,x,y,z` header.
///
/// An empty `visible` cell counts as visible. Names are not trimmed, since
/// prefix matching is exact.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Entity>, SnapshotError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut entities = Vec::new();
    for row in reader.deserialize::<SnapshotRow>() {
        entities.push(row?.into());
    }

    Ok(entities)
}

/// Find an entity by exact name.
pub fn find_entity<'a>(entities: &'a [Entity], name: &str) -> Option<&'a Entity> {
    entities.iter().find(|e| e.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIXTURE_JSON: &str = include_str!("../../fixtures/scene.json");
    const FIXTURE_CSV: &str = include_str!("../../fixtures/scene.csv");

    #[test]
    fn test_parse_json_fixture() {
        let entities = parse_json(FIXTURE_JSON).unwrap();
        assert_eq!(entities.len(), 6);
        assert_eq!(entities[0].name, "Box1");
        assert_eq!(entities[0].dimensions, Dimensions::new(1.0, 2.0, 3.0));
        assert!(entities.iter().any(|e| !e.visible));
    }

    #[test]
    fn test_parse_csv_fixture() {
        let entities = parse_csv(FIXTURE_CSV.as_bytes()).unwrap();
        let from_json = parse_json(FIXTURE_JSON).unwrap();
        assert_eq!(entities, from_json);
    }

    #[test]
    fn test_parse_csv_blank_visible_defaults_to_true() {
        let csv = "name,visible,x,y,z\nPlate, ,4,4,0.5\n";
        let entities = parse_csv(csv.as_bytes()).unwrap();
        assert!(entities[0].visible);
        assert_eq!(entities[0].dimensions.z, 0.5);
    }

    #[test]
    fn test_parse_csv_keeps_name_whitespace() {
        let csv = "name , visible ,x,y,z\n  Box1 , true , 1 ,2, 3\nBox2,false,4,5,6\n";
        let entities = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(entities[0].name, "  Box1 ");
        assert!(entities[0].visible);
        assert_eq!(entities[0].dimensions, Dimensions::new(1.0, 2.0, 3.0));
        assert!(!entities[1].visible);
        assert!(find_entity(&entities, "Box1").is_none());
    }

    #[test]
    fn test_parse_csv_rejects_bad_visible_flag() {
        let csv = "name,visible,x,y,z\nPlate,maybe,4,4,0.5\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_parse_csv_rejects_bad_number() {
        let csv = "name,visible,x,y,z\nPlate,true,wide,4,0.5\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(SnapshotError::Csv(_))
        ));
    }

    #[test]
    fn test_parse_json_rejects_missing_dimensions() {
        let err = parse_json(r#"[{"name": "Box1"}]"#).unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
    }

    #[test]
    fn test_load_snapshot_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let json_path = temp_dir.path().join("scene.JSON");
        let csv_path = temp_dir.path().join("scene.csv");
        std::fs::write(&json_path, FIXTURE_JSON).unwrap();
        std::fs::write(&csv_path, FIXTURE_CSV).unwrap();

        assert_eq!(load_snapshot(&json_path).unwrap().len(), 6);
        assert_eq!(load_snapshot(&csv_path).unwrap().len(), 6);
    }

    #[test]
    fn test_load_snapshot_errors() {
        let temp_dir = TempDir::new().unwrap();

        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(
            load_snapshot(&missing),
            Err(SnapshotError::Read { .. })
        ));

        let unsupported = temp_dir.path().join("scene.blend");
        std::fs::write(&unsupported, "").unwrap();
        let err = load_snapshot(&unsupported).unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedFormat { .. }));
        assert!(err.to_string().contains("blend"));
    }

    #[test]
    fn test_find_entity() {
        let entities = parse_json(FIXTURE_JSON).unwrap();
        assert_eq!(find_entity(&entities, "Box2").map(|e| e.dimensions.x), Some(4.0));
        assert!(find_entity(&entities, "box2").is_none());
    }
}
