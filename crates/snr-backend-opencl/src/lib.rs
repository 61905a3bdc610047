// SPDX-License-Identifier: Apache-2.0

//! OpenCL kernel-source generators for pulsar-search SNR statistics.
//!
//! Four generators cover the statistic/layout combinations of the pipeline:
//! [`dms_samples`] (DM-major input, work-group tree reduction),
//! [`samples_dms`] (samples-major input, independent DM lanes),
//! [`folded`] (folded pulse profiles), and [`dedispersed`] (per-second
//! running statistics). Each is a pure function of the observation snapshot,
//! the tuning configuration, and the element type; the result is an owned
//! block of kernel text ready for an external OpenCL runtime to compile.

pub mod dedispersed;
pub mod dms_samples;
pub mod folded;
pub mod lane;
pub mod samples_dms;
pub mod scalar;
pub mod template;

pub use dedispersed::dedispersed;
pub use dms_samples::dms_samples;
pub use folded::folded;
pub use samples_dms::samples_dms;
pub use scalar::ClScalar;
