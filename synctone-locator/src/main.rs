use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use recording_reader::{Recording, TieBreak};
use std::path::PathBuf;
use synctone_common::{Real, indices_to_seconds};
use synctone_locator::{
    locate_tones, locate_transitions,
    output::{default_csv_path, write_timestamps},
    reconcile::{DEFAULT_EXPECTED_INTERVAL_MS, interval_statistics, reconcile},
    signal::{EnvelopeParameters, PeakParameters, StepParameters},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Locate synctone pulses (and optionally photodiode transitions) in a recording.
    Locate(LocateOpts),
    /// Dump the group and dataset structure of a recording container.
    Explore(ExploreOpts),
    /// Summarize the spike timestamp entities of a recording.
    Spikes(SpikesOpts),
}

#[derive(Parser)]
struct LocateOpts {
    /// Path of the recording container (.h5).
    file: PathBuf,

    /// Substring matched against channel labels to find the audio channel.
    #[clap(long, default_value = "audio")]
    audio_label: String,

    /// Substring matched against channel labels to find the photodiode
    /// channel. When given, transitions are located and reconciled against
    /// the audio pulses.
    #[clap(long)]
    pda_label: Option<String>,

    /// Which channel wins when several labels match: 'first' or 'last'.
    #[clap(long, default_value = "last")]
    tie_break: TieBreak,

    /// Savitzky-Golay window length for the energy envelope, in samples (odd).
    #[clap(long, default_value = "1801")]
    smoothing_window: usize,

    /// Savitzky-Golay polynomial order for the energy envelope.
    #[clap(long, default_value = "3")]
    polynomial_order: usize,

    /// Minimum normalized envelope height of a pulse peak.
    #[clap(long, default_value = "0.5")]
    peak_height: Real,

    /// Minimum spacing between pulse peaks, in samples.
    #[clap(long, default_value = "2000")]
    peak_distance: usize,

    /// Moving-average window for square-wave denoising, in samples (odd).
    #[clap(long, default_value = "101")]
    denoise_window: usize,

    /// Minimum level change registered as a square-wave transition.
    #[clap(long, default_value = "0.1")]
    step_threshold: Real,

    /// Nominal spacing between consecutive pulses, for regularity checks.
    #[clap(long, default_value_t = DEFAULT_EXPECTED_INTERVAL_MS)]
    expected_interval_ms: Real,

    /// CSV output path. Defaults to the recording path with a
    /// `_synctones.csv` suffix.
    #[clap(long)]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct ExploreOpts {
    /// Path of the recording container (.h5).
    file: PathBuf,

    /// Deepest group level to descend into.
    #[clap(long, default_value = "6")]
    max_depth: usize,
}

#[derive(Parser)]
struct SpikesOpts {
    /// Path of the recording container (.h5).
    file: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Locate(opts) => locate(opts),
        Command::Explore(opts) => explore(opts),
        Command::Spikes(opts) => spikes(opts),
    }
}

fn open_recording(path: &PathBuf) -> Result<Recording> {
    if path.extension().is_none_or(|ext| ext != "h5") {
        bail!("expected an .h5 recording container, got {}", path.display());
    }
    let recording = Recording::open(path)?;
    let metadata = recording.metadata()?;
    info!(
        date = metadata.date.as_str(),
        duration_s = metadata.duration_us as Real / 1e6,
        "opened {}",
        path.display()
    );
    Ok(recording)
}

fn locate(opts: LocateOpts) -> Result<()> {
    let recording = open_recording(&opts.file)?;

    let envelope_parameters = EnvelopeParameters {
        smoothing_window: opts.smoothing_window,
        polynomial_order: opts.polynomial_order,
    };
    let peak_parameters = PeakParameters {
        height: opts.peak_height,
        distance: opts.peak_distance,
    };
    let tones = locate_tones(
        &recording,
        &opts.audio_label,
        opts.tie_break,
        &envelope_parameters,
        &peak_parameters,
    )?;

    match interval_statistics(&tones.indices, tones.sample_rate, opts.expected_interval_ms) {
        Some(stats) => info!(
            intervals = stats.intervals,
            mean_deviation_ms = stats.mean_deviation_ms,
            min_deviation_ms = stats.min_deviation_ms,
            max_deviation_ms = stats.max_deviation_ms,
            std_dev_ms = stats.std_dev_ms,
            "pulse interval regularity"
        ),
        None => warn!(
            tones = tones.indices.len(),
            "too few pulses for interval statistics"
        ),
    }

    let timestamps_s = indices_to_seconds(&tones.indices, tones.sample_rate);
    let csv_path = opts
        .output
        .unwrap_or_else(|| default_csv_path(&opts.file));
    write_timestamps(&csv_path, &timestamps_s)?;
    info!(
        tones = timestamps_s.len(),
        "wrote timestamps to {}",
        csv_path.display()
    );

    if let Some(pda_label) = &opts.pda_label {
        let step_parameters = StepParameters {
            denoise_window: opts.denoise_window,
            threshold: opts.step_threshold,
        };
        let transitions =
            locate_transitions(&recording, pda_label, opts.tie_break, &step_parameters)?;
        let delays = reconcile(
            &tones.indices,
            &transitions.indices,
            tones.sample_rate,
            transitions.sample_rate,
        )?;
        info!(
            pairs = delays.pairs,
            mean_ms = delays.mean_ms,
            median_ms = delays.median_ms,
            std_dev_ms = delays.std_dev_ms,
            jitter_min_ms = delays.jitter_min_ms,
            jitter_max_ms = delays.jitter_max_ms,
            "audio to photodiode delay"
        );
    }
    Ok(())
}

fn explore(opts: ExploreOpts) -> Result<()> {
    let recording = Recording::open(&opts.file)?;
    recording.explore(opts.max_depth)?;
    Ok(())
}

fn spikes(opts: SpikesOpts) -> Result<()> {
    let recording = open_recording(&opts.file)?;
    let entities = recording.read_spike_entities()?;
    if entities.is_empty() {
        bail!("no spike timestamp entities in {}", opts.file.display());
    }
    for entity in entities {
        let count = entity.timestamps_us.len();
        let span_s = match (entity.timestamps_us.first(), entity.timestamps_us.last()) {
            (Some(first), Some(last)) => (last - first) as Real / 1e6,
            _ => 0.0,
        };
        let mean_interval_ms = if count > 1 {
            span_s * 1e3 / (count - 1) as Real
        } else {
            0.0
        };
        info!(
            name = entity.name.as_str(),
            spikes = count,
            span_s,
            mean_interval_ms,
            "spike entity"
        );
    }
    Ok(())
}
