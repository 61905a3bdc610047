// SPDX-License-Identifier: Apache-2.0

//! Per-kernel parallelization parameters and the registry of tuned
//! configurations.
//!
//! The registry is populated once, at process start, from records an external
//! collaborator has read off disk; after that it is only looked up. Keys are
//! a single composite record instead of nested per-field maps so a lookup is
//! one hash probe.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};

/// Parallelization parameters for one kernel variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Work-items per group along the primary parallel axis.
    pub nr_threads_d0: u32,
    /// Elements processed sequentially per work-item before any group-level
    /// reduction.
    pub nr_items_d0: u32,
    /// Layout switch: address the subband-dedispersed DM range.
    pub subband_dedispersion: bool,
}

impl KernelConfig {
    pub fn new(nr_threads_d0: u32, nr_items_d0: u32) -> Self {
        Self {
            nr_threads_d0,
            nr_items_d0,
            subband_dedispersion: false,
        }
    }

    pub fn subband(mut self, enabled: bool) -> Self {
        self.subband_dedispersion = enabled;
        self
    }

    /// Total elements covered by one work-group before striding.
    pub fn span_d0(&self) -> u32 {
        self.nr_threads_d0 * self.nr_items_d0
    }

    /// Reject configurations the generators cannot turn into a correct
    /// kernel. The thread count must be a power of two so the tree reduction
    /// terminates at a single element, and the work split must fit inside and
    /// evenly divide the axis being reduced: with a partial final stride the
    /// offset slots would read past the raw axis into the padding region and
    /// fold padding garbage into the statistics.
    pub fn validate(&self, axis_len: u32) -> Result<()> {
        if self.nr_threads_d0 == 0 || !self.nr_threads_d0.is_power_of_two() {
            return Err(Error::ThreadsNotPowerOfTwo(self.nr_threads_d0));
        }
        if self.nr_items_d0 == 0 || self.span_d0() > axis_len {
            return Err(Error::WorkExceedsAxis {
                threads: self.nr_threads_d0,
                items: self.nr_items_d0,
                axis: axis_len,
            });
        }
        if axis_len % self.span_d0() != 0 {
            return Err(Error::UnevenWorkSplit {
                threads: self.nr_threads_d0,
                items: self.nr_items_d0,
                axis: axis_len,
            });
        }
        Ok(())
    }
}

/// Composite lookup key for a tuned configuration: element-type tag plus the
/// two axis cardinalities the kernel was tuned for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigKey {
    pub data_type: String,
    pub primary: u32,
    pub secondary: u32,
}

impl ConfigKey {
    pub fn new(data_type: impl Into<String>, primary: u32, secondary: u32) -> Self {
        Self {
            data_type: data_type.into(),
            primary,
            secondary,
        }
    }
}

/// One persisted tuning record, as the configuration file yields them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunedRecord {
    pub key: ConfigKey,
    pub config: KernelConfig,
}

/// Lookup table from [`ConfigKey`] to [`KernelConfig`]. Immutable for the
/// lifetime of a generation session once populated.
#[derive(Debug, Clone, Default)]
pub struct TuningRegistry {
    entries: HashMap<ConfigKey, KernelConfig>,
}

impl TuningRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate a registry from persisted records. Later records win over
    /// earlier ones with the same key.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = TunedRecord>,
    {
        let mut registry = Self::new();
        for record in records {
            registry.insert(record.key, record.config);
        }
        registry
    }

    pub fn insert(&mut self, key: ConfigKey, config: KernelConfig) {
        self.entries.insert(key, config);
    }

    pub fn get(&self, key: &ConfigKey) -> Option<&KernelConfig> {
        let found = self.entries.get(key);
        trace!(
            data_type = %key.data_type,
            primary = key.primary,
            secondary = key.secondary,
            hit = found.is_some(),
            "tuning registry lookup"
        );
        found
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
