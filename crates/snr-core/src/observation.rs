// SPDX-License-Identifier: Apache-2.0

//! Read-only observation metadata consumed by the kernel generators and the
//! sequential reference statistics.
//!
//! The model is owned by the host pipeline; this crate only reads array
//! cardinalities from it. Padded counts are derived from a padding multiple
//! (in elements) and are used exclusively for memory addressing, never for
//! iteration bounds.

use serde::{Deserialize, Serialize};

/// Dimensions of one observation: dispersion-measure trials, time samples,
/// period trials, and phase bins, plus the padding multiple applied to
/// addressed strides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    padding: u32,
    nr_dms: u32,
    nr_dms_subbanding: u32,
    nr_samples_per_second: u32,
    nr_samples_per_batch: u32,
    nr_periods: u32,
    nr_bins: u32,
}

impl Observation {
    /// Create an observation with the given padding multiple (in elements).
    /// A padding of 1 disables alignment padding.
    pub fn new(padding: u32) -> Self {
        Self {
            padding: padding.max(1),
            nr_dms: 0,
            nr_dms_subbanding: 1,
            nr_samples_per_second: 0,
            nr_samples_per_batch: 0,
            nr_periods: 0,
            nr_bins: 0,
        }
    }

    /// Set the DM trial count and the subbanding step count. Subbanding
    /// multiplies the effective DM range when enabled.
    pub fn with_dms(mut self, nr_dms: u32, nr_dms_subbanding: u32) -> Self {
        self.nr_dms = nr_dms;
        self.nr_dms_subbanding = nr_dms_subbanding.max(1);
        self
    }

    pub fn with_samples(mut self, per_second: u32, per_batch: u32) -> Self {
        self.nr_samples_per_second = per_second;
        self.nr_samples_per_batch = per_batch;
        self
    }

    pub fn with_periods(mut self, nr_periods: u32, nr_bins: u32) -> Self {
        self.nr_periods = nr_periods;
        self.nr_bins = nr_bins;
        self
    }

    fn pad(&self, count: u32) -> u32 {
        count.div_ceil(self.padding) * self.padding
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Number of DM trials. With `subbanding` the count covers the full
    /// subband-dedispersed range.
    pub fn nr_dms(&self, subbanding: bool) -> u32 {
        if subbanding {
            self.nr_dms_subbanding * self.nr_dms
        } else {
            self.nr_dms
        }
    }

    /// DM stride rounded up to the padding multiple.
    pub fn nr_padded_dms(&self, subbanding: bool) -> u32 {
        self.pad(self.nr_dms(subbanding))
    }

    pub fn nr_dms_subbanding(&self) -> u32 {
        self.nr_dms_subbanding
    }

    pub fn nr_samples_per_second(&self) -> u32 {
        self.nr_samples_per_second
    }

    pub fn nr_samples_per_padded_second(&self) -> u32 {
        self.pad(self.nr_samples_per_second)
    }

    pub fn nr_samples_per_batch(&self) -> u32 {
        self.nr_samples_per_batch
    }

    pub fn nr_samples_per_padded_batch(&self) -> u32 {
        self.pad(self.nr_samples_per_batch)
    }

    pub fn nr_periods(&self) -> u32 {
        self.nr_periods
    }

    pub fn nr_bins(&self) -> u32 {
        self.nr_bins
    }
}
