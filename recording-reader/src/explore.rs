//! Read-only structure dump of a recording container, for finding channel
//! labels and stream layouts in unfamiliar exports.

use crate::error::ErrAt;
use crate::{ChannelInfo, INFO_CHANNEL_DATASET, Recording, RecordingResult};
use hdf5::{Group, types::VarLenUnicode};
use tracing::info;

impl Recording {
    /// Walks the container and logs groups, dataset shapes, attributes and
    /// per-stream channel labels, down to `max_depth` levels.
    pub fn explore(&self, max_depth: usize) -> RecordingResult<()> {
        info!("structure of {}", self.path().display());
        walk(&self.file, 0, max_depth)
    }
}

fn walk(group: &Group, depth: usize, max_depth: usize) -> RecordingResult<()> {
    if depth > max_depth {
        return Ok(());
    }
    let indent = "  ".repeat(depth);
    let path = group.name();
    info!("{indent}{path}/");

    for attr_name in group.attr_names().err_at(&path)? {
        let attr = group.attr(&attr_name).err_at(&path)?;
        if let Ok(value) = attr.read_scalar::<VarLenUnicode>() {
            info!("{indent}  @{attr_name} = {value:?}");
        } else if let Ok(value) = attr.read_scalar::<i64>() {
            info!("{indent}  @{attr_name} = {value}");
        } else {
            info!("{indent}  @{attr_name}");
        }
    }

    for name in group.member_names().err_at(&path)? {
        if let Ok(subgroup) = group.group(&name) {
            walk(&subgroup, depth + 1, max_depth)?;
        } else if let Ok(dataset) = group.dataset(&name) {
            info!("{indent}  {name} shape {:?}", dataset.shape());
            if name == INFO_CHANNEL_DATASET {
                if let Ok(rows) = dataset.read_raw::<ChannelInfo>() {
                    for (index, row) in rows.iter().enumerate() {
                        info!("{indent}    channel {index}: {:?}", row.Label.as_str());
                    }
                }
            }
        }
    }
    Ok(())
}
