// SPDX-License-Identifier: Apache-2.0

//! Generator for `snrDMsSamples<N>`: one work-group per (beam, DM) cell,
//! cooperatively reducing every sample of that cell.
//!
//! Each lane seeds `nr_items_d0` partial-statistic slots (count, online mean,
//! variance accumulator, max) from its first strided elements, streams the
//! remaining samples with the Welford update, merges its slots with the exact
//! pairwise combine, and publishes the result to local memory. A binary tree
//! of `log2(nr_threads_d0)` barrier-separated rounds then merges lane `i`
//! with lane `i + threshold`, halving the threshold each round, until lane 0
//! holds the cell statistic and writes
//! `(max - mean) / sqrt(variance / (N - 1))`.
//!
//! The `N - 1` divisor needs at least two samples; shorter batches are
//! rejected before any text is emitted.

use snr_core::{Error, KernelConfig, Observation, Result};
use tracing::debug;

use crate::lane::lane_slots;
use crate::scalar::ClScalar;
use crate::template::replace_all;

/// Emit the `snrDMsSamples<N>` kernel source, `N` being the specialized
/// batch sample count.
pub fn dms_samples(
    config: &KernelConfig,
    scalar: ClScalar,
    observation: &Observation,
) -> Result<String> {
    let samples = observation.nr_samples_per_batch();
    if samples < 2 {
        return Err(Error::TooFewSamples(samples));
    }
    config.validate(samples)?;
    let subband = config.subband_dedispersion;
    debug!(
        threads = config.nr_threads_d0,
        items = config.nr_items_d0,
        samples,
        subband,
        data_type = scalar.type_name(),
        "generating snrDMsSamples"
    );

    let t = scalar.type_name();
    let zero = scalar.zero();
    let one = scalar.one();
    let span = config.span_d0();
    let padded_samples = observation.nr_samples_per_padded_batch();
    let beam_stride = observation.nr_dms(subband) * padded_samples;
    let padded_dms = observation.nr_padded_dms(subband);
    // Local buffers hold one partial per lane, padded to the alignment
    // multiple the rest of the pipeline uses.
    let local_len = config
        .nr_threads_d0
        .div_ceil(observation.padding())
        * observation.padding();
    let inv_n_minus_one = scalar.literal_f(1.0 / f64::from(samples - 1));

    let skeleton = format!(
        "__kernel void snrDMsSamples{samples}(__global const {t} * const restrict input, __global float * const restrict output) {{\n\
         const unsigned int dm = get_group_id(0);\n\
         const unsigned int beam = get_group_id(1);\n\
         {t} delta = {zero};\n\
         __local {t} reductionCOU[{local_len}];\n\
         __local {t} reductionMAX[{local_len}];\n\
         __local {t} reductionMEA[{local_len}];\n\
         __local {t} reductionVAR[{local_len}];\n\
         <%DEF%>\
         \n\
         for ( unsigned int sample = get_local_id(0) + {span}; sample < {samples}; sample += {span} ) {{\n\
         <%COMPUTE%>\
         }}\n\
         <%MERGE%>\
         reductionCOU[get_local_id(0)] = counter0;\n\
         reductionMAX[get_local_id(0)] = max0;\n\
         reductionMEA[get_local_id(0)] = mean0;\n\
         reductionVAR[get_local_id(0)] = variance0;\n\
         <%REDUCE%>\
         if ( get_local_id(0) == 0 ) {{\n\
         output[(beam * {padded_dms}) + dm] = (float)((max0 - mean0) / {sqrt});\n\
         }}\n\
         }}\n",
        sqrt = scalar.sqrt_call(&format!("variance0 * {inv_n_minus_one}"))
    );

    let def_template = format!(
        "{t} counter<%NUM%> = {one};\n\
         {t} item<%NUM%> = input[(beam * {beam_stride}) + (dm * {padded_samples}) + get_local_id(0) + <%OFFSET%>];\n\
         {t} max<%NUM%> = item<%NUM%>;\n\
         {t} mean<%NUM%> = item<%NUM%>;\n\
         {t} variance<%NUM%> = {zero};\n"
    );
    let compute_template = format!(
        "item<%NUM%> = input[(beam * {beam_stride}) + (dm * {padded_samples}) + sample + <%OFFSET%>];\n\
         counter<%NUM%> += {one};\n\
         delta = item<%NUM%> - mean<%NUM%>;\n\
         mean<%NUM%> += delta / counter<%NUM%>;\n\
         variance<%NUM%> += delta * (item<%NUM%> - mean<%NUM%>);\n\
         max<%NUM%> = fmax(max<%NUM%>, item<%NUM%>);\n"
    );
    // Pairwise combine of slot <%NUM%> into slot 0; the variance and mean
    // lines must read the pre-merge counters, so counter0 is updated last.
    let merge_template = "\
         delta = mean0 - mean<%NUM%>;\n\
         variance0 += variance<%NUM%> + ((delta * delta) * ((counter0 * counter<%NUM%>) / (counter0 + counter<%NUM%>)));\n\
         mean0 = ((counter0 * mean0) + (counter<%NUM%> * mean<%NUM%>)) / (counter0 + counter<%NUM%>);\n\
         counter0 += counter<%NUM%>;\n\
         max0 = fmax(max0, max<%NUM%>);\n";
    // One tree round: every lane hits the barrier, the surviving half merges
    // in the sibling's published partial and republishes its own.
    let round_template = "\
         barrier(CLK_LOCAL_MEM_FENCE);\n\
         if ( get_local_id(0) < <%THRESHOLD%> ) {\n\
         delta = mean0 - reductionMEA[get_local_id(0) + <%THRESHOLD%>];\n\
         variance0 += reductionVAR[get_local_id(0) + <%THRESHOLD%>] + ((delta * delta) * ((counter0 * reductionCOU[get_local_id(0) + <%THRESHOLD%>]) / (counter0 + reductionCOU[get_local_id(0) + <%THRESHOLD%>])));\n\
         mean0 = ((counter0 * mean0) + (reductionCOU[get_local_id(0) + <%THRESHOLD%>] * reductionMEA[get_local_id(0) + <%THRESHOLD%>])) / (counter0 + reductionCOU[get_local_id(0) + <%THRESHOLD%>]);\n\
         counter0 += reductionCOU[get_local_id(0) + <%THRESHOLD%>];\n\
         max0 = fmax(max0, reductionMAX[get_local_id(0) + <%THRESHOLD%>]);\n\
         reductionCOU[get_local_id(0)] = counter0;\n\
         reductionMAX[get_local_id(0)] = max0;\n\
         reductionMEA[get_local_id(0)] = mean0;\n\
         reductionVAR[get_local_id(0)] = variance0;\n\
         }\n";

    let mut defs = String::new();
    let mut computes = String::new();
    let mut merges = String::new();
    for slot in lane_slots(config.nr_items_d0, config.nr_threads_d0) {
        defs.push_str(&slot.render(&def_template));
        computes.push_str(&slot.render(&compute_template));
        if slot.index > 0 {
            merges.push_str(&slot.render(merge_template));
        }
    }

    let mut rounds = String::new();
    let mut threshold = config.nr_threads_d0 / 2;
    while threshold > 0 {
        rounds.push_str(&replace_all(
            round_template,
            "<%THRESHOLD%>",
            &threshold.to_string(),
        ));
        threshold /= 2;
    }

    let code = replace_all(&skeleton, "<%DEF%>", &defs);
    let code = replace_all(&code, "<%COMPUTE%>", &computes);
    let code = replace_all(&code, "<%MERGE%>", &merges);
    let code = replace_all(&code, "<%REDUCE%>", &rounds);
    Ok(code)
}
