use super::{SignalError, SignalResult};
use synctone_common::Real;

/// Savitzky–Golay polynomial smoothing.
///
/// Interior samples are the least-squares fit of an `order`-degree
/// polynomial over the window, evaluated at the window center. Boundary
/// samples evaluate the polynomial fitted to the first (or last) full
/// window at the boundary offsets, so the output keeps the input length
/// without zero-padding artifacts.
///
/// The window must be odd, longer than the polynomial order and no
/// longer than the signal.
pub fn savgol_filter(input: &[Real], window: usize, order: usize) -> SignalResult<Vec<Real>> {
    let len = input.len();
    if window % 2 == 0 || window <= order || window > len {
        return Err(SignalError::InvalidFilterWindow { window, order, len });
    }
    let half = window / 2;
    let projection = PolynomialProjection::new(window, order).ok_or(
        SignalError::InvalidFilterWindow { window, order, len },
    )?;

    let mut output = vec![0.0; len];
    let center_weights = projection.weights_at(0.0);
    let last_center = len - 1 - half;
    for i in half..=last_center {
        output[i] = dot(&center_weights, &input[i - half..i + half + 1]);
    }
    for i in 0..half {
        let offset = i as Real - half as Real;
        output[i] = dot(&projection.weights_at(offset), &input[..window]);
    }
    for i in last_center + 1..len {
        let offset = i as Real - last_center as Real;
        output[i] = dot(&projection.weights_at(offset), &input[len - window..]);
    }
    Ok(output)
}

/// Least-squares projection of a window of samples onto polynomial
/// coefficients: row k holds the weights producing the k-th coefficient
/// of the fitted polynomial in the offset-from-center variable.
struct PolynomialProjection {
    coefficient_rows: Vec<Vec<Real>>,
}

impl PolynomialProjection {
    fn new(window: usize, order: usize) -> Option<Self> {
        let half = (window / 2) as Real;
        let design: Vec<Vec<Real>> = (0..window)
            .map(|j| {
                let x = j as Real - half;
                let mut row = Vec::with_capacity(order + 1);
                let mut power = 1.0;
                for _ in 0..=order {
                    row.push(power);
                    power *= x;
                }
                row
            })
            .collect();

        let size = order + 1;
        let mut normal = vec![vec![0.0; size]; size];
        for row in &design {
            for k in 0..size {
                for l in 0..size {
                    normal[k][l] += row[k] * row[l];
                }
            }
        }
        let inverse = invert(normal)?;

        let coefficient_rows = (0..size)
            .map(|k| {
                (0..window)
                    .map(|j| (0..size).map(|l| inverse[k][l] * design[j][l]).sum())
                    .collect()
            })
            .collect();
        Some(PolynomialProjection { coefficient_rows })
    }

    /// Weights giving the fitted polynomial's value at `offset` samples
    /// from the window center, as a linear combination of the window.
    fn weights_at(&self, offset: Real) -> Vec<Real> {
        let window = self
            .coefficient_rows
            .first()
            .map(Vec::len)
            .unwrap_or_default();
        let mut weights = vec![0.0; window];
        let mut power = 1.0;
        for row in &self.coefficient_rows {
            for (weight, coefficient) in weights.iter_mut().zip(row) {
                *weight += power * coefficient;
            }
            power *= offset;
        }
        weights
    }
}

/// Gauss–Jordan inversion with partial pivoting. Small systems only:
/// the matrix is (order + 1) square.
fn invert(mut matrix: Vec<Vec<Real>>) -> Option<Vec<Vec<Real>>> {
    let n = matrix.len();
    let mut inverse: Vec<Vec<Real>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for column in 0..n {
        let pivot_row = (column..n)
            .max_by(|&a, &b| {
                matrix[a][column]
                    .abs()
                    .total_cmp(&matrix[b][column].abs())
            })?;
        if matrix[pivot_row][column].abs() < 1e-12 {
            return None;
        }
        matrix.swap(column, pivot_row);
        inverse.swap(column, pivot_row);

        let pivot = matrix[column][column];
        for j in 0..n {
            matrix[column][j] /= pivot;
            inverse[column][j] /= pivot;
        }
        for row in 0..n {
            if row == column {
                continue;
            }
            let factor = matrix[row][column];
            for j in 0..n {
                matrix[row][j] -= factor * matrix[column][j];
                inverse[row][j] -= factor * inverse[column][j];
            }
        }
    }
    Some(inverse)
}

fn dot(weights: &[Real], samples: &[Real]) -> Real {
    weights.iter().zip(samples).map(|(w, s)| w * s).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn even_window_is_rejected() {
        let data = vec![0.0; 100];
        let result = savgol_filter(&data, 10, 3);
        assert_eq!(
            result,
            Err(SignalError::InvalidFilterWindow {
                window: 10,
                order: 3,
                len: 100
            })
        );
    }

    #[test]
    fn window_longer_than_signal_is_rejected() {
        let data = vec![0.0; 5];
        let result = savgol_filter(&data, 7, 3);
        assert!(matches!(
            result,
            Err(SignalError::InvalidFilterWindow { window: 7, .. })
        ));
    }

    #[test]
    fn window_not_exceeding_order_is_rejected() {
        let data = vec![0.0; 100];
        let result = savgol_filter(&data, 3, 3);
        assert!(matches!(
            result,
            Err(SignalError::InvalidFilterWindow { window: 3, .. })
        ));
    }

    #[test]
    fn constant_sequence_is_preserved_everywhere() {
        let data = vec![4.2; 50];
        let smoothed = savgol_filter(&data, 11, 3).unwrap();
        assert_eq!(smoothed.len(), data.len());
        for value in smoothed {
            assert_approx_eq!(value, 4.2, 1e-9);
        }
    }

    #[test]
    fn cubic_polynomial_passes_through_unchanged() {
        // An order-3 fit reproduces any cubic exactly, edges included.
        let data: Vec<Real> = (0..60)
            .map(|i| {
                let x = i as Real;
                0.5 * x * x * x - 2.0 * x * x + 3.0 * x - 7.0
            })
            .collect();
        let smoothed = savgol_filter(&data, 9, 3).unwrap();
        for (raw, fit) in data.iter().zip(&smoothed) {
            assert_approx_eq!(raw, fit, 1e-6);
        }
    }

    #[test]
    fn linear_ramp_is_preserved_by_first_order_fit() {
        let data: Vec<Real> = (0..40).map(|i| 2.0 * i as Real + 1.0).collect();
        let smoothed = savgol_filter(&data, 7, 1).unwrap();
        for (raw, fit) in data.iter().zip(&smoothed) {
            assert_approx_eq!(raw, fit, 1e-9);
        }
    }

    #[test]
    fn symmetric_pulse_keeps_its_center() {
        let mut data = vec![0.0; 101];
        for (offset, value) in [(0usize, 1.0), (1, 0.75), (2, 0.3), (3, 0.05)] {
            data[50 + offset] = value;
            data[50 - offset] = value;
        }
        let smoothed = savgol_filter(&data, 21, 3).unwrap();
        let peak = smoothed
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 50);
    }
}
