// SPDX-License-Identifier: Apache-2.0

//! Generator for `snrSamplesDMs<N>`: samples-major layout, one thread per DM
//! slot.
//!
//! In the transposed layout the DM axis is contiguous, so a thread scans its
//! DM's samples sequentially and needs no cross-lane reduction; `nr_items_d0`
//! independent DM lanes are unrolled per thread, each offset by the thread
//! count. The per-lane update is the same Welford recurrence as the DM-major
//! kernel, and every lane writes its own output cell directly with the batch
//! sample count minus one as the normalization divisor. Batches shorter than
//! two samples cannot feed that divisor and are rejected up front.

use snr_core::{Error, KernelConfig, Observation, Result};
use tracing::debug;

use crate::lane::lane_slots;
use crate::scalar::ClScalar;
use crate::template::replace_all;

/// Emit the `snrSamplesDMs<N>` kernel source, `N` being the specialized
/// batch sample count.
pub fn samples_dms(
    config: &KernelConfig,
    scalar: ClScalar,
    observation: &Observation,
) -> Result<String> {
    let samples = observation.nr_samples_per_batch();
    if samples < 2 {
        return Err(Error::TooFewSamples(samples));
    }
    let subband = config.subband_dedispersion;
    config.validate(observation.nr_dms(subband))?;
    debug!(
        threads = config.nr_threads_d0,
        items = config.nr_items_d0,
        samples,
        subband,
        data_type = scalar.type_name(),
        "generating snrSamplesDMs"
    );

    let t = scalar.type_name();
    let zero = scalar.zero();
    let one = scalar.one();
    let padded_dms = observation.nr_padded_dms(subband);
    let beam_stride = samples * padded_dms;
    let inv_n_minus_one = scalar.literal_f(1.0 / f64::from(samples - 1));

    let skeleton = format!(
        "__kernel void snrSamplesDMs{samples}(__global const {t} * const restrict input, __global float * const restrict output) {{\n\
         const unsigned int beam = get_group_id(1);\n\
         {t} delta = {zero};\n\
         <%DEF%>\
         \n\
         for ( unsigned int sample = 1; sample < {samples}; sample++ ) {{\n\
         <%COMPUTE%>\
         }}\n\
         <%STORE%>\
         }}\n"
    );

    let def_template = format!(
        "const unsigned int dm<%NUM%> = (get_group_id(0) * {span}) + get_local_id(0) + <%OFFSET%>;\n\
         {t} counter<%NUM%> = {one};\n\
         {t} item<%NUM%> = input[(beam * {beam_stride}) + dm<%NUM%>];\n\
         {t} max<%NUM%> = item<%NUM%>;\n\
         {t} mean<%NUM%> = item<%NUM%>;\n\
         {t} variance<%NUM%> = {zero};\n",
        span = config.span_d0()
    );
    let compute_template = format!(
        "item<%NUM%> = input[(beam * {beam_stride}) + (sample * {padded_dms}) + dm<%NUM%>];\n\
         counter<%NUM%> += {one};\n\
         delta = item<%NUM%> - mean<%NUM%>;\n\
         mean<%NUM%> += delta / counter<%NUM%>;\n\
         variance<%NUM%> += delta * (item<%NUM%> - mean<%NUM%>);\n\
         max<%NUM%> = fmax(max<%NUM%>, item<%NUM%>);\n"
    );
    let store_template = format!(
        "output[(beam * {padded_dms}) + dm<%NUM%>] = (float)((max<%NUM%> - mean<%NUM%>) / {sqrt});\n",
        sqrt = scalar.sqrt_call(&format!("variance<%NUM%> * {inv_n_minus_one}"))
    );

    let mut defs = String::new();
    let mut computes = String::new();
    let mut stores = String::new();
    for slot in lane_slots(config.nr_items_d0, config.nr_threads_d0) {
        defs.push_str(&slot.render(&def_template));
        computes.push_str(&slot.render(&compute_template));
        stores.push_str(&slot.render(&store_template));
    }

    let code = replace_all(&skeleton, "<%DEF%>", &defs);
    let code = replace_all(&code, "<%COMPUTE%>", &computes);
    let code = replace_all(&code, "<%STORE%>", &stores);
    Ok(code)
}
