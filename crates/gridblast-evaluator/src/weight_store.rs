//! Persistence of named weight vectors.
//!
//! A weight file is a JSON document:
//!
//! ```json
//! {
//!   "name": "trained",
//!   "trained_at": "2026-01-01T00:00:00Z",
//!   "fitness": 1234.5,
//!   "generation": 17,
//!   "weights": { "holes": -8.0, "max_height": -3.0, ... }
//! }
//! ```
//!
//! Only `name` and `weights` are required. Files are replaced atomically: the
//! new content is written next to the target and renamed over it.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::weights::{InvalidWeightData, WeightVector};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum WeightStoreError {
    #[display("failed to access weight file {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to parse weight file {}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("invalid weights in {}", path.display())]
    InvalidWeightData {
        path: PathBuf,
        source: InvalidWeightData,
    },
}

impl WeightStoreError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::Parse { path, .. }
            | Self::InvalidWeightData { path, .. } => path,
        }
    }
}

/// A weight vector with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<usize>,
    pub weights: WeightVector,
}

impl WeightFile {
    #[must_use]
    pub fn new(name: impl Into<String>, weights: WeightVector) -> Self {
        Self {
            name: name.into(),
            trained_at: None,
            fitness: None,
            generation: None,
            weights,
        }
    }
}

/// On-disk layout, with weights kept as a plain map so that semantic errors
/// are reported separately from JSON syntax errors.
#[derive(Debug, Deserialize)]
struct RawWeightFile {
    name: String,
    #[serde(default)]
    trained_at: Option<DateTime<Utc>>,
    #[serde(default)]
    fitness: Option<f32>,
    #[serde(default)]
    generation: Option<usize>,
    weights: BTreeMap<String, f64>,
}

/// Reads and writes one weight file.
#[derive(Debug, Clone)]
pub struct WeightStore {
    path: PathBuf,
}

impl WeightStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<WeightFile, WeightStoreError> {
        let path = &self.path;
        let file = File::open(path).map_err(|source| WeightStoreError::Io {
            path: path.clone(),
            source,
        })?;
        let raw: RawWeightFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                WeightStoreError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;
        let weights = WeightVector::from_named(raw.weights).map_err(|source| {
            WeightStoreError::InvalidWeightData {
                path: path.clone(),
                source,
            }
        })?;
        tracing::debug!(path = %path.display(), name = %raw.name, "loaded weights");

        Ok(WeightFile {
            name: raw.name,
            trained_at: raw.trained_at,
            fitness: raw.fitness,
            generation: raw.generation,
            weights,
        })
    }

    /// Writes `file`, replacing any previous content atomically.
    ///
    /// Non-finite coefficients are rejected before anything is written, so a
    /// saved file always loads back.
    pub fn save(&self, file: &WeightFile) -> Result<(), WeightStoreError> {
        let path = &self.path;
        file.weights
            .check_finite()
            .map_err(|source| WeightStoreError::InvalidWeightData {
                path: path.clone(),
                source,
            })?;
        let io_error = |source| WeightStoreError::Io {
            path: path.clone(),
            source,
        };

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_error)?;
        }

        let tmp_path = tmp_path_for(path);
        let mut writer = BufWriter::new(File::create(&tmp_path).map_err(io_error)?);
        serde_json::to_writer_pretty(&mut writer, file).map_err(|e| io_error(e.into()))?;
        writeln!(writer).map_err(io_error)?;
        writer.flush().map_err(io_error)?;
        drop(writer);
        fs::rename(&tmp_path, path).map_err(io_error)?;

        tracing::debug!(path = %path.display(), name = %file.name, "saved weights");
        Ok(())
    }
}

/// Sibling path used while a file is being replaced.
#[must_use]
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use chrono::TimeZone as _;

    use super::*;
    use crate::board_feature::BoardFeature;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "gridblast-weight-store-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_save_then_load_is_exact() {
        let dir = temp_dir("roundtrip");
        let store = WeightStore::new(dir.join("nested").join("best.json"));

        let weights = WeightVector::from_fn(|f| {
            #[expect(clippy::cast_precision_loss)]
            let i = f.index() as f32;
            (i - 6.5) / 3.0
        });
        let file = WeightFile {
            name: "trained".to_owned(),
            trained_at: Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()),
            fitness: Some(1234.5),
            generation: Some(7),
            weights,
        };
        store.save(&file).unwrap();
        assert!(!tmp_path_for(store.path()).exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded, file);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_extreme_finite_weights_roundtrip() {
        let dir = temp_dir("extreme");
        let store = WeightStore::new(dir.join("best.json"));
        let extremes = [f32::MAX, f32::MIN, f32::MIN_POSITIVE, -1.0e-30, 2.0e38, -2.0e38];
        let weights = WeightVector::from_fn(|f| extremes[f.index() % extremes.len()]);

        let file = WeightFile::new("extreme", weights);
        store.save(&file).unwrap();
        assert_eq!(store.load().unwrap(), file);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_non_finite_weights_are_not_saved() {
        let dir = temp_dir("non-finite");
        let store = WeightStore::new(dir.join("best.json"));
        let mut weights = WeightVector::default();
        weights[BoardFeature::HeightSpread] = f32::NEG_INFINITY;

        let err = store.save(&WeightFile::new("bad", weights)).unwrap_err();
        assert!(err.is_invalid_weight_data());
        assert_eq!(
            err.source().unwrap().to_string(),
            InvalidWeightData::NonFinite {
                feature: BoardFeature::HeightSpread
            }
            .to_string()
        );
        assert!(!store.path().exists());
        assert!(!tmp_path_for(store.path()).exists());
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let dir = temp_dir("minimal");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("w.json");
        let weights = serde_json::to_string(&WeightVector::default()).unwrap();
        fs::write(&path, format!(r#"{{"name":"hand","weights":{weights}}}"#)).unwrap();

        let loaded = WeightStore::new(&path).load().unwrap();
        assert_eq!(loaded, WeightFile::new("hand", WeightVector::default()));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = temp_dir("errors");
        fs::create_dir_all(&dir).unwrap();

        let missing = WeightStore::new(dir.join("missing.json")).load().unwrap_err();
        assert!(missing.is_io());
        assert!(missing.to_string().contains("missing.json"));

        let garbage = dir.join("garbage.json");
        fs::write(&garbage, "not json").unwrap();
        let err = WeightStore::new(&garbage).load().unwrap_err();
        assert!(err.is_parse());
        assert_eq!(err.path(), garbage);

        let short = dir.join("short.json");
        fs::write(&short, r#"{"name":"x","weights":{"holes":-1.0}}"#).unwrap();
        let err = WeightStore::new(&short).load().unwrap_err();
        assert!(err.is_invalid_weight_data());
        let reason = err.source().unwrap().to_string();
        assert_eq!(
            reason,
            InvalidWeightData::MissingFeature {
                feature: BoardFeature::MaxHeight
            }
            .to_string()
        );

        fs::remove_dir_all(&dir).unwrap();
    }
}
