//! CSV export of located event timestamps.

use std::path::{Path, PathBuf};
use synctone_common::Real;

pub const TIMESTAMP_HEADER: &str = "Synctone Timestamp (s)";

/// Sibling CSV path derived from the recording path: the file stem with
/// a `_synctones.csv` suffix, in the same directory.
pub fn default_csv_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording".to_owned());
    input.with_file_name(format!("{stem}_synctones.csv"))
}

/// Writes one timestamp per row under a single header column.
pub fn write_timestamps(path: &Path, timestamps_s: &[Real]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([TIMESTAMP_HEADER])?;
    for timestamp in timestamps_s {
        writer.write_record([timestamp.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn default_path_appends_suffix_next_to_input() {
        let path = default_csv_path(Path::new("/data/session_3.h5"));
        assert_eq!(path, PathBuf::from("/data/session_3_synctones.csv"));
    }

    #[test]
    fn written_file_has_header_and_one_row_per_timestamp() {
        let path = env::temp_dir().join("write_timestamps_test.csv");
        write_timestamps(&path, &[0.1, 1.1005, 2.1]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec![
            "Synctone Timestamp (s)",
            "0.1",
            "1.1005",
            "2.1"
        ]);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn empty_sequence_writes_header_only() {
        let path = env::temp_dir().join("write_timestamps_empty_test.csv");
        write_timestamps(&path, &[]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim_end(), TIMESTAMP_HEADER);
        fs::remove_file(path).unwrap();
    }
}
