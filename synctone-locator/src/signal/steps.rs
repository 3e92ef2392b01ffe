use super::{SignalResult, smoothing::centered_moving_average};
use itertools::Itertools;
use synctone_common::{Real, SampleIndex};

pub const DEFAULT_DENOISE_WINDOW: usize = 101;
pub const DEFAULT_STEP_THRESHOLD: Real = 0.1;

#[derive(Debug, Clone)]
pub struct StepParameters {
    pub denoise_window: usize,
    pub threshold: Real,
}

impl Default for StepParameters {
    fn default() -> Self {
        StepParameters {
            denoise_window: DEFAULT_DENOISE_WINDOW,
            threshold: DEFAULT_STEP_THRESHOLD,
        }
    }
}

/// Locates level transitions in a normalized square wave.
///
/// The wave is squared, denoised with a centered moving average,
/// re-quantized to {0, 1} at the half-level, and differenced. A
/// transition is reported at the first sample of the new level. Squaring
/// pushes intermediate noise and edge samples toward zero so they weigh
/// less in the averaged level; isolated glitches shorter than half the
/// denoise window are averaged away before quantization.
pub fn find_steps(square: &[Real], parameters: &StepParameters) -> SignalResult<Vec<SampleIndex>> {
    let squared: Vec<Real> = square.iter().map(|value| value * value).collect();
    let denoised = centered_moving_average(&squared, parameters.denoise_window)?;
    let quantized = denoised
        .into_iter()
        .map(|value| if value >= 0.5 { 1.0 } else { 0.0 });
    Ok(quantized
        .tuple_windows()
        .enumerate()
        .filter_map(|(i, (previous, current)): (usize, (Real, Real))| {
            ((current - previous).abs() > parameters.threshold).then_some(i + 1)
        })
        .collect())
}
