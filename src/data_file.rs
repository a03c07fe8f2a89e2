//! JSON files shared between generation steps
//!
//! Every step reads the output of an earlier step from the data directory.
//! A missing file means that step was skipped, so the error names it.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum DataFileError {
    #[error("Cannot read {path:?}. Run {generated_by} first! ({source})")]
    Missing {
        generated_by: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn data_file_path(data_dir: &Path, filename: &str) -> PathBuf {
    data_dir.join(filename)
}

/// Read `filename` from the data directory.
///
/// `generated_by` names the step that writes the file.
pub fn read_data_file<T: DeserializeOwned>(
    data_dir: &Path,
    generated_by: &str,
    filename: &str,
) -> Result<T, DataFileError> {
    read_file_and_warn(generated_by, &data_file_path(data_dir, filename))
}

/// If the file doesn't exist, log which step should have generated it.
pub fn read_file_and_warn<T: DeserializeOwned>(
    generated_by: &str,
    path: &Path,
) -> Result<T, DataFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        error!("Run {} first!", generated_by);
        DataFileError::Missing {
            generated_by: generated_by.to_string(),
            path: path.to_path_buf(),
            source,
        }
    })?;

    serde_json::from_str(&content).map_err(|source| DataFileError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `content` as pretty-printed JSON, creating the data directory if needed.
pub fn write_data_file<T: Serialize + ?Sized>(
    data_dir: &Path,
    filename: &str,
    content: &T,
) -> Result<(), DataFileError> {
    write_file(&data_file_path(data_dir, filename), content)
}

/// Write `content` as pretty-printed JSON to `path`, creating its parent directory if needed.
pub fn write_file<T: Serialize + ?Sized>(path: &Path, content: &T) -> Result<(), DataFileError> {
    stage_file(path, content)?.commit()
}

/// A fully written file waiting to replace its destination
///
/// Dropping it without calling [`StagedFile::commit`] removes the temporary
/// file and leaves the destination untouched.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    path: PathBuf,
}

impl StagedFile {
    /// Rename the staged file over its destination
    pub fn commit(self) -> Result<(), DataFileError> {
        let Self { file, path } = self;
        file.persist(&path).map_err(|e| DataFileError::Io {
            path: path.clone(),
            source: e.error,
        })?;

        debug!("Wrote {:?}", path);
        Ok(())
    }
}

/// Write `content` to a temporary file next to `data_dir/filename`
pub fn stage_data_file<T: Serialize + ?Sized>(
    data_dir: &Path,
    filename: &str,
    content: &T,
) -> Result<StagedFile, DataFileError> {
    stage_file(&data_file_path(data_dir, filename), content)
}

/// Write `content` as pretty-printed JSON to a temporary file in the
/// directory of `path`.
pub fn stage_file<T: Serialize + ?Sized>(
    path: &Path,
    content: &T,
) -> Result<StagedFile, DataFileError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let io_error = |source| DataFileError::Io {
        path: dir.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(io_error)?;

    let mut json = serde_json::to_string_pretty(content).map_err(|source| DataFileError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');

    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(json.as_bytes()).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;

    Ok(StagedFile {
        file,
        path: path.to_path_buf(),
    })
}
