pub type Real = f64;
pub type SampleIndex = usize;
pub type SampleRate = u64;

/// Sampling interval in microseconds per sample.
pub type Tick = i64;

/// Ordered, strictly increasing sample indices of detected events
/// in a single channel's sample-index space.
pub type EventIndexSequence = Vec<SampleIndex>;

pub const MICROSECONDS_PER_SECOND: Real = 1_000_000.0;
pub const MILLISECONDS_PER_SECOND: Real = 1_000.0;

/// Derives the sampling rate in Hz from the channel tick.
pub fn sample_rate_from_tick(tick: Tick) -> SampleRate {
    (MICROSECONDS_PER_SECOND / tick as Real).round() as SampleRate
}

/// Converts event sample-indices to timestamps in seconds.
pub fn indices_to_seconds(indices: &[SampleIndex], sample_rate: SampleRate) -> Vec<Real> {
    indices
        .iter()
        .map(|&index| index as Real / sample_rate as Real)
        .collect()
}
