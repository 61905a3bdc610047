// SPDX-License-Identifier: Apache-2.0

//! Reference SNR statistics.
//!
//! Two things live here. [`LanePartial`] models the per-thread partial
//! statistic the generated kernels maintain (count, online mean, central
//! second moment, max) together with the exact pairwise combine used by the
//! slot merge and the tree reduction; it doubles as the host-side correctness
//! oracle. [`RunningSnr`] and [`folded_snr`] are the single-threaded
//! reference computations used for validation and for non-accelerated runs.

use crate::observation::Observation;

/// Partial statistic of one execution lane: element count, online mean,
/// central second-moment accumulator, and running maximum.
///
/// The pairwise [`merge`](LanePartial::merge) is exact and associative, so
/// any partition of a sequence into lanes, merged in any association order,
/// reproduces the direct single-pass result up to floating rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanePartial {
    pub count: u64,
    pub mean: f64,
    pub m2: f64,
    pub max: f64,
}

impl LanePartial {
    /// Seed a partial from the first element a lane reads.
    pub fn seed(value: f64) -> Self {
        Self {
            count: 1,
            mean: value,
            m2: 0.0,
            max: value,
        }
    }

    /// Standard Welford update with one more element.
    pub fn observe(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        if value > self.max {
            self.max = value;
        }
    }

    /// Exact pairwise combine of two partials:
    /// `n = nA+nB`, `mean = (nA*mA + nB*mB)/n`, `max = max(xA, xB)`,
    /// `m2 = vA + vB + (mA-mB)^2 * nA*nB/n`.
    pub fn merge(self, other: Self) -> Self {
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let delta = self.mean - other.mean;
        Self {
            count: self.count + other.count,
            mean: (n_a * self.mean + n_b * other.mean) / n,
            m2: self.m2 + other.m2 + delta * delta * (n_a * n_b / n),
            max: self.max.max(other.max),
        }
    }

    /// Variance with `ddof` delta degrees of freedom. A count of `ddof` or
    /// fewer elements divides by zero or a negative number; that degenerate
    /// case is deliberately not guarded, matching the generated kernels.
    pub fn variance(&self, ddof: u64) -> f64 {
        self.m2 / (self.count as f64 - ddof as f64)
    }

    /// `(max - mean) / sqrt(m2 / (count - 1))`, the value the reduction
    /// leader writes per output cell. Undefined for a single element.
    pub fn snr(&self) -> f64 {
        (self.max - self.mean) / self.variance(1).sqrt()
    }
}

/// Direct single-pass evaluation of the partial statistic over a slice.
pub fn partial_of(values: &[f32]) -> Option<LanePartial> {
    let (&first, rest) = values.split_first()?;
    let mut partial = LanePartial::seed(first as f64);
    for &value in rest {
        partial.observe(value as f64);
    }
    Some(partial)
}

/// Binary-tree reduction over a power-of-two number of lane partials,
/// mirroring the barrier-separated rounds of the generated kernels: each
/// round merges lane `i` with lane `i + threshold`, halving `threshold`.
pub fn tree_reduce(lanes: &mut [LanePartial]) -> LanePartial {
    debug_assert!(lanes.len().is_power_of_two());
    let mut threshold = lanes.len() / 2;
    while threshold > 0 {
        for i in 0..threshold {
            lanes[i] = lanes[i].merge(lanes[i + threshold]);
        }
        threshold /= 2;
    }
    lanes[0]
}

/// Running per-second SNR statistics over successive one-second windows of a
/// dedispersed time series, one slot per DM trial.
///
/// The update is a weighted running average keyed by elapsed sample count; it
/// assumes every window carries the same number of samples. That assumption
/// is inherited from the kernel it validates and is not checked here.
#[derive(Debug, Clone)]
pub struct RunningSnr {
    max: Vec<f32>,
    mean: Vec<f32>,
    rms: Vec<f32>,
}

impl RunningSnr {
    pub fn new(observation: &Observation) -> Self {
        let nr_dms = observation.nr_dms(false) as usize;
        Self {
            max: vec![0.0; nr_dms],
            mean: vec![0.0; nr_dms],
            rms: vec![0.0; nr_dms],
        }
    }

    /// Fold one one-second window into the running totals. `window` is laid
    /// out DM-major with the padded per-second stride; `second` is the
    /// zero-based window index.
    pub fn fold_window(&mut self, second: u32, observation: &Observation, window: &[f32]) {
        let samples = observation.nr_samples_per_second();
        let stride = observation.nr_samples_per_padded_second() as usize;
        for dm in 0..observation.nr_dms(false) as usize {
            let mut max = 0.0f32;
            let mut mean = 0.0f32;
            let mut rms = 0.0f32;
            for sample in 0..samples as usize {
                let value = window[dm * stride + sample];
                mean += value;
                rms += value * value;
                if value > max {
                    max = value;
                }
            }
            if max > self.max[dm] {
                self.max[dm] = max;
            }
            let elapsed = (samples * second) as f32;
            let total = (samples * (second + 1)) as f32;
            self.mean[dm] = (self.mean[dm] * elapsed + mean) / total;
            self.rms[dm] = (self.rms[dm] * elapsed + rms) / total;
        }
    }

    /// Running maxima, one per DM.
    pub fn max(&self) -> &[f32] {
        &self.max
    }

    /// Running means, one per DM.
    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    /// Running mean squares (sum of squares over sample count), one per DM.
    pub fn rms(&self) -> &[f32] {
        &self.rms
    }

    /// `(max - mean) / sqrt(rms)` per DM, the per-second SNR estimate.
    pub fn snr(&self) -> Vec<f32> {
        self.max
            .iter()
            .zip(&self.mean)
            .zip(&self.rms)
            .map(|((&max, &mean), &rms)| (max - mean) / rms.sqrt())
            .collect()
    }
}

/// Single-pass folded-profile SNR: per (period, DM) pair,
/// `(max - average) / rms` over the phase bins, where `average = sum/bins`
/// and `rms = sqrt(sum_of_squares/bins)`. The output is addressed
/// `period * nr_padded_dms + dm` like the kernel's output buffer.
pub fn folded_snr(observation: &Observation, folded: &[f32]) -> Vec<f32> {
    let nr_periods = observation.nr_periods() as usize;
    let nr_dms = observation.nr_dms(false) as usize;
    let padded_dms = observation.nr_padded_dms(false) as usize;
    let nr_bins = observation.nr_bins() as usize;

    let mut snrs = vec![0.0f32; nr_periods * padded_dms];
    for period in 0..nr_periods {
        for dm in 0..nr_dms {
            let mut max = 0.0f32;
            let mut average = 0.0f32;
            let mut rms = 0.0f32;
            for bin in 0..nr_bins {
                let value = folded[bin * nr_periods * padded_dms + period * padded_dms + dm];
                average += value;
                rms += value * value;
                if value > max {
                    max = value;
                }
            }
            average /= nr_bins as f32;
            rms = (rms / nr_bins as f32).sqrt();
            snrs[period * padded_dms + dm] = (max - average) / rms;
        }
    }
    snrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sequence() -> Vec<f32> {
        // Deterministic, irregular data; values chosen to exercise both the
        // mean drift and the maximum tracking.
        (0..256)
            .map(|i| {
                let x = i as f32;
                (x * 0.37).sin() * 3.0 + (x * 0.011).cos() * 7.0 + x * 0.02
            })
            .collect()
    }

    #[test]
    fn merge_is_associative_over_block_partitions() {
        let data = sequence();
        let direct = partial_of(&data).unwrap();

        let blocks: Vec<LanePartial> = data.chunks(37).map(|c| partial_of(c).unwrap()).collect();

        let left = blocks[1..]
            .iter()
            .fold(blocks[0], |acc, &block| acc.merge(block));
        let right = blocks[..blocks.len() - 1]
            .iter()
            .rev()
            .fold(blocks[blocks.len() - 1], |acc, &block| block.merge(acc));

        for merged in [left, right] {
            assert_eq!(merged.count, direct.count);
            assert_relative_eq!(merged.mean, direct.mean, max_relative = 1e-10);
            assert_relative_eq!(merged.m2, direct.m2, max_relative = 1e-9);
            assert_eq!(merged.max, direct.max);
        }
    }

    #[test]
    fn tree_reduction_matches_sequential_merge() {
        let data = sequence();
        let lane_len = data.len() / 16;
        let mut lanes: Vec<LanePartial> = data
            .chunks(lane_len)
            .map(|c| partial_of(c).unwrap())
            .collect();
        assert_eq!(lanes.len(), 16);

        let sequential = lanes[1..]
            .iter()
            .fold(lanes[0], |acc, &lane| acc.merge(lane));
        let tree = tree_reduce(&mut lanes);

        assert_eq!(tree.count, sequential.count);
        assert_relative_eq!(tree.mean, sequential.mean, max_relative = 1e-10);
        assert_relative_eq!(tree.m2, sequential.m2, max_relative = 1e-9);
        assert_eq!(tree.max, sequential.max);
    }

    #[test]
    fn welford_matches_two_pass_moments() {
        let data = sequence();
        let partial = partial_of(&data).unwrap();

        let n = data.len() as f64;
        let mean = data.iter().map(|&x| x as f64).sum::<f64>() / n;
        let m2 = data
            .iter()
            .map(|&x| (x as f64 - mean).powi(2))
            .sum::<f64>();

        assert_relative_eq!(partial.mean, mean, max_relative = 1e-12);
        assert_relative_eq!(partial.m2, m2, max_relative = 1e-9);
        assert_relative_eq!(partial.variance(1), m2 / (n - 1.0), max_relative = 1e-9);
    }

    #[test]
    fn running_average_over_two_windows() {
        // One DM, four samples per second: [1, 5, 3, 7] then [2, 2, 2, 2].
        let obs = Observation::new(1).with_dms(1, 1).with_samples(4, 4);
        let mut running = RunningSnr::new(&obs);

        running.fold_window(0, &obs, &[1.0, 5.0, 3.0, 7.0]);
        assert_relative_eq!(running.mean()[0], 4.0);
        assert_relative_eq!(running.rms()[0], 21.0);
        assert_eq!(running.max()[0], 7.0);

        running.fold_window(1, &obs, &[2.0, 2.0, 2.0, 2.0]);
        assert_relative_eq!(running.mean()[0], 3.0);
        assert_relative_eq!(running.rms()[0], 12.5);
        assert_eq!(running.max()[0], 7.0);
        assert_relative_eq!(running.snr()[0], (7.0 - 3.0) / 12.5f32.sqrt());
    }

    #[test]
    fn running_average_equals_true_mean_of_all_windows() {
        let obs = Observation::new(1).with_dms(1, 1).with_samples(8, 8);
        let data = sequence();
        let mut running = RunningSnr::new(&obs);
        for (second, window) in data.chunks(8).take(8).enumerate() {
            running.fold_window(second as u32, &obs, window);
        }
        let all: Vec<f32> = data[..64].to_vec();
        let true_mean = all.iter().sum::<f32>() / 64.0;
        assert_relative_eq!(running.mean()[0], true_mean, max_relative = 1e-5);
    }

    #[test]
    fn folded_profile_concrete_scenario() {
        // Bins [2, 8, 4, 2] for one (period, DM): average 4, rms sqrt(22).
        let obs = Observation::new(1).with_dms(1, 1).with_periods(1, 4);
        let snrs = folded_snr(&obs, &[2.0, 8.0, 4.0, 2.0]);
        let expected = (8.0 - 4.0) / 22.0f32.sqrt();
        assert_relative_eq!(snrs[0], expected, max_relative = 1e-6);
    }

    #[test]
    fn folded_snr_respects_padded_addressing() {
        // 2 DMs padded to 4; bins interleaved period-major then DM.
        let obs = Observation::new(4).with_dms(2, 1).with_periods(1, 2);
        let padded = obs.nr_padded_dms(false) as usize;
        let mut folded = vec![0.0f32; 2 * padded];
        // bin 0: dm0 = 1, dm1 = 3; bin 1: dm0 = 3, dm1 = 5.
        folded[0] = 1.0;
        folded[1] = 3.0;
        folded[padded] = 3.0;
        folded[padded + 1] = 5.0;

        let snrs = folded_snr(&obs, &folded);
        let rms0 = (10.0f32 / 2.0).sqrt();
        assert_relative_eq!(snrs[0], (3.0 - 2.0) / rms0, max_relative = 1e-6);
        let rms1 = (34.0f32 / 2.0).sqrt();
        assert_relative_eq!(snrs[1], (5.0 - 4.0) / rms1, max_relative = 1e-6);
    }

    #[test]
    fn sequential_and_merge_paths_agree() {
        // Cross-path equivalence: fold a single window sequentially and
        // evaluate the merge-based oracle over the same samples. The running
        // path tracks the mean square (sum(x^2)/n); reconcile it with the
        // central moment through rms = m2/n + mean^2.
        let obs = Observation::new(1).with_dms(2, 1).with_samples(128, 128);
        let data = sequence();
        let mut running = RunningSnr::new(&obs);
        running.fold_window(0, &obs, &data[..256]);

        for dm in 0..2 {
            let lane = partial_of(&data[dm * 128..(dm + 1) * 128]).unwrap();
            assert_relative_eq!(
                running.mean()[dm] as f64,
                lane.mean,
                max_relative = 1e-5
            );
            assert_relative_eq!(
                running.rms()[dm] as f64,
                lane.variance(0) + lane.mean * lane.mean,
                max_relative = 1e-5
            );
            assert_relative_eq!(running.max()[dm] as f64, lane.max, max_relative = 1e-6);
        }
    }
}
