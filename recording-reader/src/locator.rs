use crate::{
    ANALOG_STREAM_ROOT, Recording, RecordingError, RecordingResult, STREAM_LABEL_MARKER,
};
use std::str::FromStr;
use synctone_common::{Real, SampleRate, sample_rate_from_tick};
use tracing::{debug, info};

/// Which channel wins when several labels in a stream group match the
/// target substring.
///
/// `Last` reproduces the historical overwrite-on-match scan: ties resolve
/// to the *highest* matching channel index within a group, which can be
/// surprising when a group carries e.g. both "audio_L" and "audio_R".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    First,
    #[default]
    Last,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(TieBreak::First),
            "last" => Ok(TieBreak::Last),
            other => Err(format!(
                "unknown tie-break policy {other:?}, expected 'first' or 'last'"
            )),
        }
    }
}

/// A channel located by label search, with its samples copied out of the
/// container.
#[derive(Debug, Clone)]
pub struct LocatedChannel {
    pub stream_path: String,
    pub channel_index: usize,
    pub label: String,
    pub sample_rate: SampleRate,
    pub samples: Vec<Real>,
}

/// Searches every analog stream group for a channel whose label contains
/// `target_label` (case-insensitive).
///
/// The first group yielding any match wins and the search stops there;
/// within that group ties resolve per `tie_break`. Groups lacking the
/// channel tables or the "Analog Data" label marker are skipped.
pub fn locate_channel(
    recording: &Recording,
    target_label: &str,
    tie_break: TieBreak,
) -> RecordingResult<LocatedChannel> {
    let target = target_label.to_lowercase();
    for key in recording.analog_stream_keys()? {
        let stream_path = format!("{ANALOG_STREAM_ROOT}/{key}");
        debug!("checking {stream_path}");

        if !recording.has_channel_tables(&stream_path)? {
            debug!("skipping {stream_path}: missing channel info or data table");
            continue;
        }
        match recording.stream_label(&stream_path)? {
            Some(label) if label.contains(STREAM_LABEL_MARKER) => {}
            _ => {
                debug!("skipping {stream_path}: not an analog data stream");
                continue;
            }
        }

        let info = recording.read_channel_info(&stream_path)?;
        debug!("found {} analog channels in {stream_path}", info.len());

        let mut matched: Option<(usize, String, synctone_common::Tick)> = None;
        for (index, channel) in info.iter().enumerate() {
            let label = channel.Label.as_str();
            debug!("channel {index}: {label:?}");
            if !label.to_lowercase().contains(&target) {
                continue;
            }
            // Later matches overwrite earlier ones under TieBreak::Last.
            if matched.is_none() || tie_break == TieBreak::Last {
                matched = Some((index, label.to_owned(), channel.Tick));
            }
        }

        if let Some((channel_index, label, tick)) = matched {
            if tick <= 0 {
                return Err(RecordingError::InvalidTick {
                    tick,
                    label,
                    path: stream_path,
                });
            }
            let sample_rate = sample_rate_from_tick(tick);
            let samples = recording.read_channel_data(&stream_path, channel_index)?;
            let duration_seconds = samples.len() as Real / sample_rate as Real;
            info!(
                "using channel {channel_index} {label:?} from {stream_path}: \
                 {} samples @{sample_rate}Hz, duration {duration_seconds:.1}s",
                samples.len(),
            );
            return Ok(LocatedChannel {
                stream_path,
                channel_index,
                label,
                sample_rate,
                samples,
            });
        }
    }

    Err(RecordingError::ChannelNotFound {
        label: target_label.to_string(),
        file: recording.path().to_path_buf(),
    })
}
