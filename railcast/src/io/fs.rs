use std::{fs::File, io::BufWriter, path::Path};

use serde::{de::DeserializeOwned, Serialize};

use crate::RailcastError;

/// helper function to "mkdir -p path" - make all directories along a path
pub fn create_dirs<P>(path: P) -> Result<(), RailcastError>
where
    P: AsRef<Path>,
{
    let dirspath = path.as_ref();
    if !dirspath.is_dir() {
        std::fs::create_dir_all(dirspath).map_err(|e| {
            let msg = format!(
                "error building output directory '{}': {e}",
                dirspath.to_str().unwrap_or_default()
            );
            RailcastError::InvalidUserInput(msg)
        })
    } else {
        Ok(())
    }
}

/// writes a value as pretty-printed JSON, replacing any existing file.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), RailcastError> {
    let file = File::create(path).map_err(|e| RailcastError::WriteError {
        path: path.to_path_buf(),
        message: format!("unable to create file: {e}"),
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|e| {
        RailcastError::WriteError {
            path: path.to_path_buf(),
            message: format!("unable to serialize JSON: {e}"),
        }
    })
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, RailcastError> {
    let contents = std::fs::read_to_string(path).map_err(|e| RailcastError::ReadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|e| RailcastError::ReadError {
        path: path.to_path_buf(),
        message: format!("unable to deserialize JSON: {e}"),
    })
}
