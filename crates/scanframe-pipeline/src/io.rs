//! JSON configuration helpers for the pipeline.

use std::{fs, path::Path};

use crate::PipelineParams;

#[derive(thiserror::Error, Debug)]
pub enum PipelineIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PipelineParams {
    /// Load params from a JSON file; missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PipelineIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write params to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PipelineIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pipeline.json");
        let params = PipelineParams {
            pause_on_failure: false,
            capture_preview: true,
            ..PipelineParams::default()
        };
        params.write_json(&path).expect("write");
        assert_eq!(PipelineParams::load_json(&path).expect("load"), params);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "crop_to_reticle": true }"#).expect("write");
        let params = PipelineParams::load_json(&path).expect("load");
        assert!(params.crop_to_reticle);
        assert!(params.pause_on_failure);
        assert_eq!(params.outline_expand, 1.2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = PipelineParams::load_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PipelineIoError::Io(_)));
    }
}
