use super::{SignalError, SignalResult};
use synctone_common::Real;

/// Centered moving average with same-mode zero-padded convolution.
///
/// Output has the same length as the input. Boundary windows extend past
/// the signal; out-of-range samples contribute zero while the divisor
/// stays the full window length, so edge values are pulled toward zero
/// rather than the window being truncated.
pub fn centered_moving_average(data: &[Real], window: usize) -> SignalResult<Vec<Real>> {
    if window % 2 == 0 {
        return Err(SignalError::InvalidWindowSize { window });
    }
    let half = window / 2;
    let weight = 1.0 / window as Real;

    let mut prefix = Vec::with_capacity(data.len() + 1);
    let mut running = 0.0;
    prefix.push(running);
    for &value in data {
        running += value;
        prefix.push(running);
    }

    Ok((0..data.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = usize::min(i + half + 1, data.len());
            (prefix[hi] - prefix[lo]) * weight
        })
        .collect())
}
