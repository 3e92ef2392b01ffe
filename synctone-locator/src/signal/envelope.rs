use super::{SignalError, SignalResult, savgol::savgol_filter};
use itertools::Itertools;
use itertools::MinMaxResult;
use synctone_common::Real;

pub const DEFAULT_SMOOTHING_WINDOW: usize = 1801;
pub const DEFAULT_POLYNOMIAL_ORDER: usize = 3;

#[derive(Debug, Clone)]
pub struct EnvelopeParameters {
    pub smoothing_window: usize,
    pub polynomial_order: usize,
}

impl Default for EnvelopeParameters {
    fn default() -> Self {
        EnvelopeParameters {
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            polynomial_order: DEFAULT_POLYNOMIAL_ORDER,
        }
    }
}

/// Smoothed, normalized energy envelope of a raw waveform.
///
/// Mean-centers the signal, squares it to remove sign and emphasize
/// pulse energy, smooths with a Savitzky–Golay filter and min-max
/// scales the result to [0, 1] by its global extrema.
pub fn envelope(raw: &[Real], parameters: &EnvelopeParameters) -> SignalResult<Vec<Real>> {
    let squared = centered_square(raw);
    let smoothed = savgol_filter(
        &squared,
        parameters.smoothing_window,
        parameters.polynomial_order,
    )?;
    min_max_scale(&smoothed)
}

/// Mean-centered, squared copy of the waveform. Shared by the envelope
/// path and the diagnostic scaled-squared sequence.
pub fn centered_square(raw: &[Real]) -> Vec<Real> {
    let mean = raw.iter().sum::<Real>() / raw.len() as Real;
    raw.iter()
        .map(|value| {
            let centered = value - mean;
            centered * centered
        })
        .collect()
}

/// Scales a sequence to the closed interval [0, 1] by its global minimum
/// and maximum. Fails when the sequence has no dynamic range.
pub fn min_max_scale(data: &[Real]) -> SignalResult<Vec<Real>> {
    let (min, max) = match data.iter().copied().minmax() {
        MinMaxResult::MinMax(min, max) if max > min => (min, max),
        _ => return Err(SignalError::DegenerateSignal),
    };
    let range = max - min;
    Ok(data.iter().map(|value| (value - min) / range).collect())
}
