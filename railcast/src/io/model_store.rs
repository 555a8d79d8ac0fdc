use std::path::{Path, PathBuf};

use railcast_core::{
    feature::{FeatureConfig, RouteEncoder},
    forecast::{ForecastError, LinearForecaster},
};
use serde::{Deserialize, Serialize};

use super::fs::{read_json, write_json};
use crate::RailcastError;

pub const MODEL_FILENAME: &str = "model.json";

/// a trained forecaster together with the route encoding and feature options it was
/// trained with. predictions are only meaningful for features derived the same way.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelArtifact {
    pub model: LinearForecaster,
    pub encoder: RouteEncoder,
    pub feature_config: FeatureConfig,
}

pub fn model_path(models_dir: &Path) -> PathBuf {
    models_dir.join(MODEL_FILENAME)
}

pub fn save_model(artifact: &ModelArtifact, models_dir: &Path) -> Result<PathBuf, RailcastError> {
    super::fs::create_dirs(models_dir)?;
    let path = model_path(models_dir);
    write_json(artifact, &path)?;
    log::info!("saved forecast model to {}", path.display());
    Ok(path)
}

/// loads the trained model. a missing model file is a [`ForecastError::ModelUnavailable`]
/// since no plan can be produced without a forecast.
pub fn load_model(models_dir: &Path) -> Result<ModelArtifact, RailcastError> {
    let path = model_path(models_dir);
    if !path.is_file() {
        return Err(ForecastError::ModelUnavailable(format!(
            "no model file at '{}', run the train operation first",
            path.display()
        ))
        .into());
    }
    read_json(&path)
}

#[cfg(test)]
mod test {
    use railcast_core::forecast::FeatureMatrix;

    use super::*;

    #[test]
    fn test_missing_model_is_unavailable() {
        let dir = std::env::temp_dir().join("railcast-model-store-test").join("empty");
        let result = load_model(&dir);
        assert!(matches!(
            result,
            Err(RailcastError::Forecast(ForecastError::ModelUnavailable(_)))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join("railcast-model-store-test").join("saved");
        let matrix = FeatureMatrix::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0, 0.0], vec![2.0, 1.0], vec![3.0, 0.0]],
        )
        .expect("test invariant failed: matrix should build");
        let model = LinearForecaster::fit(&matrix, &[2.0, 4.5, 6.0], 1.0)
            .expect("test invariant failed: model should fit");
        let artifact = ModelArtifact {
            model,
            encoder: RouteEncoder::new(["A", "B"]),
            feature_config: FeatureConfig::default(),
        };
        save_model(&artifact, &dir).expect("test invariant failed: save should succeed");
        let loaded = load_model(&dir).expect("test invariant failed: load should succeed");
        assert_eq!(loaded.encoder, artifact.encoder);
        assert_eq!(
            loaded.model.columns(),
            artifact.model.columns()
        );
    }
}
