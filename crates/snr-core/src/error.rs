// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared across the SNR workspace. Generation is deterministic and
/// side-effect free, so every failure is an immediate, caller-visible
/// rejection; nothing here is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The tree reduction only terminates at a single element when the thread
    /// count along D0 is a power of two.
    #[error("nr_threads_d0 must be a power of two, got {0}")]
    ThreadsNotPowerOfTwo(u32),
    /// The work split must fit inside the axis being reduced.
    #[error("work split of {threads} threads x {items} items exceeds axis length {axis}")]
    WorkExceedsAxis { threads: u32, items: u32, axis: u32 },
    /// A partial final stride would make the offset slots read past the raw
    /// axis into the padding region, so the split must divide the axis.
    #[error("work split of {threads} threads x {items} items does not evenly divide axis length {axis}")]
    UnevenWorkSplit { threads: u32, items: u32, axis: u32 },
    /// The variance divisor is the sample count minus one, so a batch needs
    /// at least two samples.
    #[error("at least two samples per batch are required, got {0}")]
    TooFewSamples(u32),
    /// The element-type tag did not name a supported OpenCL scalar. Failing
    /// here is preferable to emitting malformed kernel text.
    #[error("unsupported element type tag '{0}'")]
    UnsupportedDataType(String),
}
