use synctone_common::{Real, SampleIndex};

pub const DEFAULT_PEAK_HEIGHT: Real = 0.5;
pub const DEFAULT_PEAK_DISTANCE: usize = 2_000;

#[derive(Debug, Clone)]
pub struct PeakParameters {
    pub height: Real,
    pub distance: usize,
}

impl Default for PeakParameters {
    fn default() -> Self {
        PeakParameters {
            height: DEFAULT_PEAK_HEIGHT,
            distance: DEFAULT_PEAK_DISTANCE,
        }
    }
}

/// Locates strict local maxima at or above the height threshold, then
/// prunes any peak closer than `distance` samples to a taller one.
///
/// Pruning keeps the globally tallest peaks: candidates are visited in
/// descending height (earliest index first among equals) and each kept
/// peak suppresses smaller neighbours within the exclusion distance.
/// Peaks spaced exactly `distance` apart both survive. Returned indices
/// are ascending.
pub fn find_peaks(data: &[Real], parameters: &PeakParameters) -> Vec<SampleIndex> {
    let candidates: Vec<SampleIndex> = data
        .windows(3)
        .enumerate()
        .filter_map(|(i, w)| {
            (w[1] > w[0] && w[1] > w[2] && w[1] >= parameters.height).then_some(i + 1)
        })
        .collect();

    let mut priority: Vec<usize> = (0..candidates.len()).collect();
    priority.sort_by(|&a, &b| {
        data[candidates[b]]
            .total_cmp(&data[candidates[a]])
            .then(candidates[a].cmp(&candidates[b]))
    });

    let mut keep = vec![true; candidates.len()];
    for &rank in &priority {
        if !keep[rank] {
            continue;
        }
        let center = candidates[rank];
        for neighbour in (0..rank).rev() {
            if center - candidates[neighbour] >= parameters.distance {
                break;
            }
            keep[neighbour] = false;
        }
        for neighbour in rank + 1..candidates.len() {
            if candidates[neighbour] - center >= parameters.distance {
                break;
            }
            keep[neighbour] = false;
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(index, kept)| kept.then_some(index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peaks_at(positions: &[(usize, Real)], len: usize) -> Vec<Real> {
        let mut data = vec![0.0; len];
        for &(index, height) in positions {
            data[index] = height;
        }
        data
    }

    #[test]
    fn empty_signal_yields_no_peaks() {
        assert!(find_peaks(&[], &PeakParameters::default()).is_empty());
    }

    #[test]
    fn sub_threshold_maxima_are_ignored() {
        let data = peaks_at(&[(10, 0.4), (40, 0.9)], 60);
        let parameters = PeakParameters {
            height: 0.5,
            distance: 5,
        };
        assert_eq!(find_peaks(&data, &parameters), vec![40]);
    }

    #[test]
    fn plateau_samples_are_not_strict_maxima() {
        let mut data = vec![0.0; 30];
        data[10] = 1.0;
        data[11] = 1.0;
        let parameters = PeakParameters {
            height: 0.5,
            distance: 3,
        };
        assert!(find_peaks(&data, &parameters).is_empty());
    }

    #[test]
    fn peaks_at_exact_minimum_spacing_both_survive() {
        let data = peaks_at(&[(10, 0.8), (15, 0.9)], 30);
        let parameters = PeakParameters {
            height: 0.5,
            distance: 5,
        };
        assert_eq!(find_peaks(&data, &parameters), vec![10, 15]);
    }

    #[test]
    fn closer_peaks_collapse_to_the_tallest() {
        let data = peaks_at(&[(10, 0.8), (14, 0.9)], 30);
        let parameters = PeakParameters {
            height: 0.5,
            distance: 5,
        };
        assert_eq!(find_peaks(&data, &parameters), vec![14]);
    }

    #[test]
    fn equal_heights_keep_the_earliest() {
        let data = peaks_at(&[(10, 0.9), (14, 0.9)], 30);
        let parameters = PeakParameters {
            height: 0.5,
            distance: 5,
        };
        assert_eq!(find_peaks(&data, &parameters), vec![10]);
    }

    #[test]
    fn tall_peak_suppresses_both_neighbours() {
        // middle peak outranks both sides even though the sides clear
        // each other's exclusion zone
        let data = peaks_at(&[(10, 0.7), (14, 0.95), (18, 0.7)], 30);
        let parameters = PeakParameters {
            height: 0.5,
            distance: 5,
        };
        assert_eq!(find_peaks(&data, &parameters), vec![14]);
    }

    #[test]
    fn well_separated_train_is_kept_in_order() {
        let data = peaks_at(&[(100, 0.9), (300, 0.8), (500, 0.95)], 600);
        let parameters = PeakParameters {
            height: 0.5,
            distance: 100,
        };
        assert_eq!(find_peaks(&data, &parameters), vec![100, 300, 500]);
    }
}
