// SPDX-License-Identifier: Apache-2.0

//! Generator for `snrDedispersed`: per-second running SNR statistics over a
//! dedispersed time series.
//!
//! One thread owns `nr_items_d0` DM lanes and scans every sample of the
//! current one-second window, accumulating sum, sum of squares, and max per
//! lane, then folds them into the running totals stored in global memory.
//! The update is a weighted running average keyed by elapsed sample count and
//! assumes every window carries `nr_samples_per_second` samples.

use snr_core::{KernelConfig, Observation, Result};
use tracing::debug;

use crate::lane::lane_slots;
use crate::scalar::ClScalar;
use crate::template::replace_all;

/// Emit the `snrDedispersed` kernel source.
pub fn dedispersed(
    config: &KernelConfig,
    scalar: ClScalar,
    observation: &Observation,
) -> Result<String> {
    let subband = config.subband_dedispersion;
    config.validate(observation.nr_dms(subband))?;
    debug!(
        threads = config.nr_threads_d0,
        items = config.nr_items_d0,
        subband,
        data_type = scalar.type_name(),
        "generating snrDedispersed"
    );

    let t = scalar.type_name();
    let zero = scalar.zero();
    let samples = observation.nr_samples_per_second();
    let padded_dms = observation.nr_padded_dms(subband);
    // The running totals live in float arrays regardless of the element type.
    let samples_f = format!("{samples}.0f");

    let skeleton = format!(
        "__kernel void snrDedispersed(const float second, __global const {t} * const restrict dedispersedData, __global {t} * const restrict maxS, __global float * const restrict meanS, __global float * const restrict rmsS) {{\n\
         <%DEF_DM%>\
         {t} globalItem = {zero};\n\
         \n\
         for ( unsigned int sample = 0; sample < {samples}; sample++ ) {{\n\
         <%COMPUTE_DM%>\
         }}\n\
         <%STORE_DM%>\
         }}\n"
    );

    let def_template = format!(
        "const unsigned int dm<%NUM%> = (get_group_id(0) * {span}) + get_local_id(0) + <%OFFSET%>;\n\
         {t} meanDM<%NUM%> = {zero};\n\
         {t} rmsDM<%NUM%> = {zero};\n\
         {t} maxDM<%NUM%> = {zero};\n",
        span = config.span_d0()
    );
    let compute_template = format!(
        "globalItem = dedispersedData[(sample * {padded_dms}) + dm<%NUM%>];\n\
         meanDM<%NUM%> += globalItem;\n\
         rmsDM<%NUM%> += (globalItem * globalItem);\n\
         maxDM<%NUM%> = fmax(maxDM<%NUM%>, globalItem);\n"
    );
    let store_template = format!(
        "maxS[dm<%NUM%>] = fmax(maxS[dm<%NUM%>], maxDM<%NUM%>);\n\
         meanS[dm<%NUM%>] = ((meanS[dm<%NUM%>] * {samples_f} * second) + meanDM<%NUM%>) / ({samples_f} * (second + 1.0f));\n\
         rmsS[dm<%NUM%>] = ((rmsS[dm<%NUM%>] * {samples_f} * second) + rmsDM<%NUM%>) / ({samples_f} * (second + 1.0f));\n"
    );

    let mut defs = String::new();
    let mut computes = String::new();
    let mut stores = String::new();
    for slot in lane_slots(config.nr_items_d0, config.nr_threads_d0) {
        defs.push_str(&slot.render(&def_template));
        computes.push_str(&slot.render(&compute_template));
        stores.push_str(&slot.render(&store_template));
    }

    let code = replace_all(&skeleton, "<%DEF_DM%>", &defs);
    let code = replace_all(&code, "<%COMPUTE_DM%>", &computes);
    let code = replace_all(&code, "<%STORE_DM%>", &stores);
    Ok(code)
}
