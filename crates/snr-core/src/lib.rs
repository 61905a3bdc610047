// SPDX-License-Identifier: Apache-2.0

//! Core types for the pulsar-search SNR toolkit: the observation model, the
//! tuned-configuration registry, and the sequential reference statistics the
//! generated kernels are validated against.
//!
//! Everything in this crate is a pure value computation; there is no device,
//! file, or global state.

pub mod error;
pub mod observation;
pub mod stats;
pub mod tuning;

pub use error::{Error, Result};
pub use observation::Observation;
pub use stats::{folded_snr, partial_of, tree_reduce, LanePartial, RunningSnr};
pub use tuning::{ConfigKey, KernelConfig, TunedRecord, TuningRegistry};
