//! Read access to multichannel electrophysiology recordings exported as
//! HDF5 containers (MCS DataManager layout).
//!
//! Every read copies channel data into owned buffers before returning, so
//! nothing borrowed from the underlying file handle escapes this crate.

mod error;
mod explore;
mod locator;

pub use error::{RecordingError, RecordingResult};
pub use locator::{LocatedChannel, TieBreak, locate_channel};

use error::ErrAt;
use hdf5::{File, Group, H5Type, types::VarLenUnicode};
use ndarray::s;
use std::path::{Path, PathBuf};
use synctone_common::{Real, Tick};

pub const ANALOG_STREAM_ROOT: &str = "Data/Recording_0/AnalogStream";
pub const TIMESTAMP_STREAM_PATH: &str = "Data/Recording_0/TimeStampStream/Stream_0";

pub(crate) const INFO_CHANNEL_DATASET: &str = "InfoChannel";
pub(crate) const CHANNEL_DATA_DATASET: &str = "ChannelData";
pub(crate) const STREAM_LABEL_MARKER: &str = "Analog Data";

/// One row of the per-channel info table. Field names map directly to
/// the compound member names in the exported file, which capitalizes
/// `Label` and `Tick`.
#[derive(H5Type, Clone, Debug)]
#[repr(C)]
#[allow(non_snake_case)]
pub struct ChannelInfo {
    pub Label: VarLenUnicode,
    pub Tick: Tick,
}

#[derive(Debug, Clone)]
pub struct RecordingMetadata {
    pub date: String,
    pub duration_us: i64,
}

/// Spike timestamps of one timestamp-stream entity, in microseconds.
#[derive(Debug, Clone)]
pub struct SpikeEntity {
    pub name: String,
    pub timestamps_us: Vec<i64>,
}

/// An open recording container. Holds the hdf5 file handle for the
/// lifetime of one analysis run; dropped on scope exit.
pub struct Recording {
    file: File,
    path: PathBuf,
}

impl Recording {
    pub fn open(path: &Path) -> RecordingResult<Self> {
        let file = File::open(path).err_at(&path.display().to_string())?;
        Ok(Recording {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recording date and duration, read from the `Date` attribute of the
    /// `Data` group and the `Duration` attribute of `Data/Recording_0`.
    pub fn metadata(&self) -> RecordingResult<RecordingMetadata> {
        let date = self.string_attribute("Data", "Date")?;
        let duration_us = self.integer_attribute("Data/Recording_0", "Duration")?;
        Ok(RecordingMetadata { date, duration_us })
    }

    /// Names of the `Stream_*` groups under the analog-stream root, in
    /// ascending name order.
    pub fn analog_stream_keys(&self) -> RecordingResult<Vec<String>> {
        let root = self.group(ANALOG_STREAM_ROOT)?;
        let mut keys = root.member_names().err_at(ANALOG_STREAM_ROOT)?;
        keys.retain(|key| key.starts_with("Stream_"));
        keys.sort();
        Ok(keys)
    }

    /// The stream group's `Label` attribute, or `None` when absent.
    pub fn stream_label(&self, stream_path: &str) -> RecordingResult<Option<String>> {
        let group = self.group(stream_path)?;
        if !attribute_exists(&group, "Label", stream_path)? {
            return Ok(None);
        }
        let label: VarLenUnicode = group
            .attr("Label")
            .err_at(stream_path)?
            .read_scalar()
            .err_at(stream_path)?;
        Ok(Some(label.as_str().to_owned()))
    }

    /// Whether the stream group carries both the channel-info table and
    /// the channel-data table.
    pub fn has_channel_tables(&self, stream_path: &str) -> RecordingResult<bool> {
        let group = self.group(stream_path)?;
        Ok(group.link_exists(INFO_CHANNEL_DATASET) && group.link_exists(CHANNEL_DATA_DATASET))
    }

    pub fn read_channel_info(&self, stream_path: &str) -> RecordingResult<Vec<ChannelInfo>> {
        let group = self.group(stream_path)?;
        if !group.link_exists(INFO_CHANNEL_DATASET) {
            return Err(RecordingError::MissingDataset {
                name: INFO_CHANNEL_DATASET.to_string(),
                path: stream_path.to_string(),
            });
        }
        let dataset = group.dataset(INFO_CHANNEL_DATASET).err_at(stream_path)?;
        dataset.read_raw::<ChannelInfo>().err_at(stream_path)
    }

    /// Copies one channel's sample row out of the 2-D channel-data table
    /// into an owned buffer.
    pub fn read_channel_data(
        &self,
        stream_path: &str,
        channel_index: usize,
    ) -> RecordingResult<Vec<Real>> {
        let group = self.group(stream_path)?;
        if !group.link_exists(CHANNEL_DATA_DATASET) {
            return Err(RecordingError::MissingDataset {
                name: CHANNEL_DATA_DATASET.to_string(),
                path: stream_path.to_string(),
            });
        }
        let dataset = group.dataset(CHANNEL_DATA_DATASET).err_at(stream_path)?;
        let channels = dataset.shape().first().copied().unwrap_or(0);
        if channel_index >= channels {
            return Err(RecordingError::ChannelIndexOutOfRange {
                index: channel_index,
                path: stream_path.to_string(),
                channels,
            });
        }
        let row = dataset
            .read_slice_1d::<Real, _>(s![channel_index, ..])
            .err_at(stream_path)?;
        Ok(row.to_vec())
    }

    /// Reads every `TimeStampEntity_*` dataset under the timestamp stream.
    pub fn read_spike_entities(&self) -> RecordingResult<Vec<SpikeEntity>> {
        let group =
            self.file
                .group(TIMESTAMP_STREAM_PATH)
                .map_err(|_| RecordingError::MissingDataset {
                    name: "TimeStampStream".to_string(),
                    path: self.path.display().to_string(),
                })?;
        let mut entities = Vec::new();
        for name in group.member_names().err_at(TIMESTAMP_STREAM_PATH)? {
            if !name.starts_with("TimeStampEntity") {
                continue;
            }
            let dataset = group.dataset(&name).err_at(TIMESTAMP_STREAM_PATH)?;
            let timestamps_us = dataset.read_raw::<i64>().err_at(TIMESTAMP_STREAM_PATH)?;
            entities.push(SpikeEntity {
                name,
                timestamps_us,
            });
        }
        Ok(entities)
    }

    fn group(&self, path: &str) -> RecordingResult<Group> {
        self.file.group(path).err_at(path)
    }

    fn string_attribute(&self, path: &str, name: &str) -> RecordingResult<String> {
        let group = self.group(path)?;
        if !attribute_exists(&group, name, path)? {
            return Err(RecordingError::AttributeMissing {
                name: name.to_string(),
                path: path.to_string(),
            });
        }
        let value: VarLenUnicode = group.attr(name).err_at(path)?.read_scalar().err_at(path)?;
        Ok(value.as_str().to_owned())
    }

    fn integer_attribute(&self, path: &str, name: &str) -> RecordingResult<i64> {
        let group = self.group(path)?;
        if !attribute_exists(&group, name, path)? {
            return Err(RecordingError::AttributeMissing {
                name: name.to_string(),
                path: path.to_string(),
            });
        }
        group.attr(name).err_at(path)?.read_scalar().err_at(path)
    }
}

fn attribute_exists(group: &Group, name: &str, path: &str) -> RecordingResult<bool> {
    Ok(group
        .attr_names()
        .err_at(path)?
        .iter()
        .any(|attr| attr == name))
}
