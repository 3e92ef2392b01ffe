//! Interval regularity checks within one event sequence and delay
//! statistics between two sequences recorded on different channels.

use std::cmp::Ordering;
use synctone_common::{
    EventIndexSequence, MILLISECONDS_PER_SECOND, Real, SampleRate, indices_to_seconds,
};
use thiserror::Error;

pub const DEFAULT_EXPECTED_INTERVAL_MS: Real = 1_000.0;

pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("sequences must pair one to one, got {lhs} and {rhs} events")]
    LengthMismatch { lhs: usize, rhs: usize },
}

/// Regularity of the gaps between consecutive events in one sequence.
/// Deviations are signed: positive when the gap came up short of the
/// expected interval.
#[derive(Debug, Clone)]
pub struct IntervalStatistics {
    pub mean_deviation_ms: Real,
    pub min_deviation_ms: Real,
    pub max_deviation_ms: Real,
    pub std_dev_ms: Real,
    pub intervals: usize,
}

/// Per-event delay of one sequence behind another, in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayStatistics {
    pub mean_ms: Real,
    pub median_ms: Real,
    pub std_dev_ms: Real,
    pub jitter_min_ms: Real,
    pub jitter_max_ms: Real,
    pub pairs: usize,
}

/// Deviation of consecutive event gaps from the expected interval.
/// Returns `None` for sequences with fewer than two events, which have
/// no gaps to measure.
pub fn interval_statistics(
    indices: &EventIndexSequence,
    sample_rate: SampleRate,
    expected_interval_ms: Real,
) -> Option<IntervalStatistics> {
    if indices.len() < 2 {
        return None;
    }
    let ms_per_sample = MILLISECONDS_PER_SECOND / sample_rate as Real;
    let deviations: Vec<Real> = indices
        .windows(2)
        .map(|pair| expected_interval_ms - (pair[1] - pair[0]) as Real * ms_per_sample)
        .collect();

    let mean = mean(&deviations);
    let (min, max) = extrema(&deviations);
    Some(IntervalStatistics {
        mean_deviation_ms: mean,
        min_deviation_ms: min,
        max_deviation_ms: max,
        std_dev_ms: population_std_dev(&deviations, mean),
        intervals: deviations.len(),
    })
}

/// Pairs two event sequences element by element and summarizes how far
/// the second lags the first. Jitter bounds are the extreme delays
/// centered on the mean.
pub fn reconcile(
    first: &EventIndexSequence,
    second: &EventIndexSequence,
    first_rate: SampleRate,
    second_rate: SampleRate,
) -> ReconcileResult<DelayStatistics> {
    if first.len() != second.len() {
        return Err(ReconcileError::LengthMismatch {
            lhs: first.len(),
            rhs: second.len(),
        });
    }
    let first_s = indices_to_seconds(first, first_rate);
    let second_s = indices_to_seconds(second, second_rate);
    let delays_ms: Vec<Real> = first_s
        .iter()
        .zip(&second_s)
        .map(|(a, b)| (b - a) * MILLISECONDS_PER_SECOND)
        .collect();

    if delays_ms.is_empty() {
        return Ok(DelayStatistics {
            mean_ms: 0.0,
            median_ms: 0.0,
            std_dev_ms: 0.0,
            jitter_min_ms: 0.0,
            jitter_max_ms: 0.0,
            pairs: 0,
        });
    }

    let mean = mean(&delays_ms);
    let (min, max) = extrema(&delays_ms);
    Ok(DelayStatistics {
        mean_ms: mean,
        median_ms: median(delays_ms.clone()),
        std_dev_ms: population_std_dev(&delays_ms, mean),
        jitter_min_ms: min - mean,
        jitter_max_ms: max - mean,
        pairs: delays_ms.len(),
    })
}

fn mean(values: &[Real]) -> Real {
    values.iter().sum::<Real>() / values.len() as Real
}

fn population_std_dev(values: &[Real], mean: Real) -> Real {
    let variance = values
        .iter()
        .map(|value| {
            let delta = value - mean;
            delta * delta
        })
        .sum::<Real>()
        / values.len() as Real;
    variance.sqrt()
}

fn extrema(values: &[Real]) -> (Real, Real) {
    values.iter().fold((Real::MAX, Real::MIN), |(min, max), &v| {
        (Real::min(min, v), Real::max(max, v))
    })
}

fn median(mut values: Vec<Real>) -> Real {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}
