//! Locates synchronization events in multichannel recordings: audio
//! synctone pulses via an energy envelope and photodiode square-wave
//! transitions via denoised differencing, with cross-channel delay
//! reconciliation between the two.

pub mod output;
pub mod reconcile;
pub mod signal;

use recording_reader::{Recording, RecordingError, TieBreak, locate_channel};
use signal::{
    EnvelopeParameters, PeakParameters, SignalError, StepParameters, envelope, find_peaks,
    find_steps, min_max_scale,
};
use synctone_common::{EventIndexSequence, SampleRate};
use thiserror::Error;
use tracing::info;

pub type LocateResult<T> = Result<T, LocateError>;

#[derive(Debug, Error)]
pub enum LocateError {
    #[error(transparent)]
    Recording(#[from] RecordingError),
    #[error(transparent)]
    Signal(#[from] SignalError),
}

/// Events located on one channel, with the context needed to convert
/// sample indices to seconds and to report which channel was used.
#[derive(Debug, Clone)]
pub struct LocatedEvents {
    pub indices: EventIndexSequence,
    pub sample_rate: SampleRate,
    pub channel_label: String,
}

/// Locates synctone pulses on the audio channel matching `label`.
///
/// The channel is reduced to a normalized energy envelope and pulse
/// onsets are taken as the envelope peaks.
pub fn locate_tones(
    recording: &Recording,
    label: &str,
    tie_break: TieBreak,
    envelope_parameters: &EnvelopeParameters,
    peak_parameters: &PeakParameters,
) -> LocateResult<LocatedEvents> {
    let channel = locate_channel(recording, label, tie_break)?;
    let normalized = envelope(&channel.samples, envelope_parameters)?;
    let indices = find_peaks(&normalized, peak_parameters);
    info!(
        channel = channel.label.as_str(),
        tones = indices.len(),
        "located synctone pulses"
    );
    Ok(LocatedEvents {
        indices,
        sample_rate: channel.sample_rate,
        channel_label: channel.label,
    })
}

/// Locates square-wave transitions on the photodiode channel matching
/// `label`. The raw trace is scaled to [0, 1] before step detection so
/// amplifier gain does not affect the half-level threshold.
pub fn locate_transitions(
    recording: &Recording,
    label: &str,
    tie_break: TieBreak,
    step_parameters: &StepParameters,
) -> LocateResult<LocatedEvents> {
    let channel = locate_channel(recording, label, tie_break)?;
    let normalized = min_max_scale(&channel.samples)?;
    let indices = find_steps(&normalized, step_parameters)?;
    info!(
        channel = channel.label.as_str(),
        transitions = indices.len(),
        "located square-wave transitions"
    );
    Ok(LocatedEvents {
        indices,
        sample_rate: channel.sample_rate,
        channel_label: channel.label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{interval_statistics, reconcile};
    use assert_approx_eq::assert_approx_eq;
    use hdf5::{File, types::VarLenUnicode};
    use ndarray::{Array2, ArrayView1};
    use recording_reader::ChannelInfo;
    use std::{
        env, fs,
        path::{Path, PathBuf},
    };
    use synctone_common::Real;

    const SAMPLES: usize = 42_000;
    const TICK: i64 = 100;
    const TONE_CENTERS: [usize; 5] = [1_000, 11_000, 21_000, 31_000, 41_000];
    const PDA_TRANSITIONS: [usize; 5] = [1_050, 11_050, 21_050, 31_050, 41_050];

    fn test_file_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("{name}.h5"))
    }

    fn write_recording(path: &Path, channels: &[(&str, Vec<Real>)]) {
        let file = File::create(path).unwrap();
        let data = file.create_group("Data").unwrap();
        let date: VarLenUnicode = "2024-03-18T09:30:00".parse().unwrap();
        data.new_attr::<VarLenUnicode>()
            .create("Date")
            .unwrap()
            .write_scalar(&date)
            .unwrap();
        let recording = data.create_group("Recording_0").unwrap();
        recording
            .new_attr::<i64>()
            .create("Duration")
            .unwrap()
            .write_scalar(&4_200_000i64)
            .unwrap();
        let stream = recording
            .create_group("AnalogStream")
            .unwrap()
            .create_group("Stream_0")
            .unwrap();
        let label: VarLenUnicode = "Analog Data".parse().unwrap();
        stream
            .new_attr::<VarLenUnicode>()
            .create("Label")
            .unwrap()
            .write_scalar(&label)
            .unwrap();
        let info: Vec<ChannelInfo> = channels
            .iter()
            .map(|(label, _)| ChannelInfo {
                Label: label.parse().unwrap(),
                Tick: TICK,
            })
            .collect();
        stream
            .new_dataset_builder()
            .with_data(&info)
            .create("InfoChannel")
            .unwrap();
        let mut table = Array2::<Real>::zeros((channels.len(), SAMPLES));
        for (row, (_, samples)) in channels.iter().enumerate() {
            table.row_mut(row).assign(&ArrayView1::from(samples));
        }
        stream
            .new_dataset_builder()
            .with_data(&table)
            .create("ChannelData")
            .unwrap();
    }

    /// Raised-cosine bumps around each tone center, zero elsewhere.
    fn tone_channel() -> Vec<Real> {
        let half_width = 200i64;
        let mut samples = vec![0.0; SAMPLES];
        for &center in &TONE_CENTERS {
            for offset in -half_width..=half_width {
                let index = center as i64 + offset;
                let phase = std::f64::consts::PI * offset as Real / (2.0 * half_width as Real);
                samples[index as usize] = phase.cos() * phase.cos();
            }
        }
        samples
    }

    /// Square wave flipping level at each transition index, with a gain
    /// and offset that normalization must undo.
    fn pda_channel() -> Vec<Real> {
        let mut samples = vec![0.0; SAMPLES];
        let mut level = 0.0;
        let mut next = PDA_TRANSITIONS.iter().peekable();
        for (index, sample) in samples.iter_mut().enumerate() {
            if next.peek().is_some_and(|&&t| t == index) {
                level = 1.0 - level;
                next.next();
            }
            *sample = 0.2 + 3.0 * level;
        }
        samples
    }

    fn envelope_parameters() -> EnvelopeParameters {
        EnvelopeParameters {
            smoothing_window: 401,
            polynomial_order: 3,
        }
    }

    #[test]
    fn tone_pulses_are_located_at_bump_centers() {
        let path = test_file_path("locator_tone_pulses");
        write_recording(&path, &[("audio channel", tone_channel())]);

        let recording = Recording::open(&path).unwrap();
        let events = locate_tones(
            &recording,
            "audio",
            TieBreak::Last,
            &envelope_parameters(),
            &PeakParameters::default(),
        )
        .unwrap();

        assert_eq!(events.channel_label, "audio channel");
        assert_eq!(events.sample_rate, 10_000);
        assert_eq!(events.indices, TONE_CENTERS.to_vec());

        let stats = interval_statistics(&events.indices, events.sample_rate, 1_000.0).unwrap();
        assert_eq!(stats.intervals, 4);
        assert_approx_eq!(stats.mean_deviation_ms, 0.0, 1e-9);
        assert_approx_eq!(stats.std_dev_ms, 0.0, 1e-9);

        drop(recording);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn transitions_are_located_despite_gain_and_offset() {
        let path = test_file_path("locator_pda_transitions");
        write_recording(&path, &[("pda", pda_channel())]);

        let recording = Recording::open(&path).unwrap();
        let events = locate_transitions(
            &recording,
            "pda",
            TieBreak::Last,
            &StepParameters::default(),
        )
        .unwrap();

        assert_eq!(events.indices, PDA_TRANSITIONS.to_vec());

        drop(recording);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn audio_and_pda_events_reconcile_to_a_constant_delay() {
        let path = test_file_path("locator_reconcile");
        write_recording(
            &path,
            &[("audio channel", tone_channel()), ("pda", pda_channel())],
        );

        let recording = Recording::open(&path).unwrap();
        let tones = locate_tones(
            &recording,
            "audio",
            TieBreak::Last,
            &envelope_parameters(),
            &PeakParameters::default(),
        )
        .unwrap();
        let transitions = locate_transitions(
            &recording,
            "pda",
            TieBreak::Last,
            &StepParameters::default(),
        )
        .unwrap();

        let delays = reconcile(
            &tones.indices,
            &transitions.indices,
            tones.sample_rate,
            transitions.sample_rate,
        )
        .unwrap();
        assert_eq!(delays.pairs, 5);
        // photodiode lags the audio by 50 samples, 5 ms at 10 kHz
        assert_approx_eq!(delays.mean_ms, 5.0, 1e-9);
        assert_approx_eq!(delays.std_dev_ms, 0.0, 1e-9);
        assert_approx_eq!(delays.jitter_min_ms, 0.0, 1e-9);
        assert_approx_eq!(delays.jitter_max_ms, 0.0, 1e-9);

        drop(recording);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_channel_surfaces_the_reader_error() {
        let path = test_file_path("locator_missing_channel");
        write_recording(&path, &[("pda", pda_channel())]);

        let recording = Recording::open(&path).unwrap();
        let result = locate_tones(
            &recording,
            "audio",
            TieBreak::Last,
            &envelope_parameters(),
            &PeakParameters::default(),
        );
        assert!(matches!(
            result,
            Err(LocateError::Recording(RecordingError::ChannelNotFound { .. }))
        ));

        drop(recording);
        let _ = fs::remove_file(path);
    }
}
