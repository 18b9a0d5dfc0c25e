use std::fs;
use std::path::Path;

use ndarray::{arr1, Array1, Array4};
use serde::Deserialize;

use crate::error::PredictionError;
use crate::preprocessing::domain::preprocessor::Preprocessor;

/// Per-channel mean of the training data, as stored in the mean file.
#[derive(Debug, Clone, Copy, Deserialize)]
struct MeanRgb {
    #[serde(alias = "R")]
    r: f32,
    #[serde(alias = "G")]
    g: f32,
    #[serde(alias = "B")]
    b: f32,
}

/// Subtracts a fixed per-channel mean to zero-center the input.
///
/// The mean vector is read once at construction; an unreadable or
/// malformed file aborts pipeline construction rather than failing per
/// call.
#[derive(Debug)]
pub struct MeanNormalizer {
    mean: Array1<f32>,
}

impl MeanNormalizer {
    pub fn new(mean: [f32; 3]) -> Self {
        Self { mean: arr1(&mean) }
    }

    /// Read the channel means from a JSON file of the form
    /// `{"r": _, "g": _, "b": _}`.
    pub fn from_json(path: &Path) -> Result<Self, PredictionError> {
        let text = fs::read_to_string(path).map_err(|e| PredictionError::Configuration {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mean: MeanRgb =
            serde_json::from_str(&text).map_err(|e| PredictionError::Configuration {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self::new([mean.r, mean.g, mean.b]))
    }
}

impl Preprocessor for MeanNormalizer {
    fn apply(&self, inputs: Array4<f32>) -> Array4<f32> {
        // Broadcasts (3,) across the trailing channel axis of (N, H, W, 3).
        inputs - &self.mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn write_mean_file(dir: &Path, contents: &str) -> std::path::PathBuf {
        let path = dir.join("mean.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_subtracts_per_channel() {
        let normalizer = MeanNormalizer::new([1.0, 2.0, 3.0]);
        let tensor = Array4::from_elem((2, 1, 1, 3), 10.0);
        let out = normalizer.apply(tensor);
        assert_relative_eq!(out[[0, 0, 0, 0]], 9.0);
        assert_relative_eq!(out[[0, 0, 0, 1]], 8.0);
        assert_relative_eq!(out[[1, 0, 0, 2]], 7.0);
    }

    #[test]
    fn test_from_json_lowercase_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_mean_file(dir.path(), r#"{"r": 123.5, "g": 110.0, "b": 99.25}"#);
        let normalizer = MeanNormalizer::from_json(&path).unwrap();
        let out = normalizer.apply(Array4::zeros((1, 1, 1, 3)));
        assert_relative_eq!(out[[0, 0, 0, 0]], -123.5);
        assert_relative_eq!(out[[0, 0, 0, 1]], -110.0);
        assert_relative_eq!(out[[0, 0, 0, 2]], -99.25);
    }

    #[test]
    fn test_from_json_uppercase_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_mean_file(dir.path(), r#"{"R": 1.0, "G": 2.0, "B": 3.0}"#);
        let normalizer = MeanNormalizer::from_json(&path).unwrap();
        let out = normalizer.apply(Array4::zeros((1, 1, 1, 3)));
        assert_relative_eq!(out[[0, 0, 0, 2]], -3.0);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let result = MeanNormalizer::from_json(Path::new("/nonexistent/mean.json"));
        match result {
            Err(PredictionError::Configuration { path, .. }) => {
                assert_eq!(path, Path::new("/nonexistent/mean.json"));
            }
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_mean_file(dir.path(), "not json at all");
        let result = MeanNormalizer::from_json(&path);
        assert!(matches!(
            result,
            Err(PredictionError::Configuration { .. })
        ));
    }

    #[test]
    fn test_missing_channel_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_mean_file(dir.path(), r#"{"r": 1.0, "g": 2.0}"#);
        let result = MeanNormalizer::from_json(&path);
        assert!(matches!(
            result,
            Err(PredictionError::Configuration { .. })
        ));
    }
}
