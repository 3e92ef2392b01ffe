use std::path::PathBuf;
use synctone_common::Tick;
use thiserror::Error;

pub type RecordingResult<T> = Result<T, RecordingError>;

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("HDF5 error at {path}: {error}")]
    Hdf5 { error: hdf5::Error, path: String },
    #[error("no channel with a label containing {label:?} in any analog stream of {file}")]
    ChannelNotFound { label: String, file: PathBuf },
    #[error("required dataset {name:?} missing from {path}")]
    MissingDataset { name: String, path: String },
    #[error("required attribute {name:?} missing from {path}")]
    AttributeMissing { name: String, path: String },
    #[error("channel index {index} out of range for {path} ({channels} channels)")]
    ChannelIndexOutOfRange {
        index: usize,
        path: String,
        channels: usize,
    },
    #[error("non-positive sampling tick {tick} on channel {label:?} of {path}")]
    InvalidTick {
        tick: Tick,
        label: String,
        path: String,
    },
}

/// Attaches the container path at which an hdf5 operation failed.
pub(crate) trait ErrAt<T> {
    fn err_at(self, path: &str) -> RecordingResult<T>;
}

impl<T> ErrAt<T> for Result<T, hdf5::Error> {
    fn err_at(self, path: &str) -> RecordingResult<T> {
        self.map_err(|error| RecordingError::Hdf5 {
            error,
            path: path.to_string(),
        })
    }
}
