//! Turns raw analog waveforms into sequences of event sample-indices:
//! an energy-envelope/peak path for tone pulses and a denoise/difference
//! path for square-wave transitions.

pub mod envelope;
pub mod peaks;
pub mod savgol;
pub mod smoothing;
pub mod steps;

pub use envelope::{EnvelopeParameters, envelope, min_max_scale};
pub use peaks::{PeakParameters, find_peaks};
pub use savgol::savgol_filter;
pub use smoothing::centered_moving_average;
pub use steps::{StepParameters, find_steps};

use thiserror::Error;

pub type SignalResult<T> = Result<T, SignalError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error(
        "smoothing filter window must be odd, longer than the polynomial order \
         and no longer than the signal (window {window}, order {order}, signal length {len})"
    )]
    InvalidFilterWindow {
        window: usize,
        order: usize,
        len: usize,
    },
    #[error("moving average window must be odd for a centered average, got {window}")]
    InvalidWindowSize { window: usize },
    #[error("signal has zero dynamic range and cannot be normalized")]
    DegenerateSignal,
}
