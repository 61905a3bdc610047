// SPDX-License-Identifier: Apache-2.0

//! Generator for `snrFolded`: SNR of folded pulse profiles.
//!
//! One 2-D work-group covers a block of (DM, period) cells with unrolled
//! per-thread DM and period lanes. Profile lengths are small and fixed, so a
//! direct sum / sum-of-squares accumulation over the phase bins replaces the
//! online update: `SNR = (max - sum/bins) / sqrt(sum_sq/bins)`. Folded
//! profiles are produced after dedispersion, so the plain (non-subbanded) DM
//! range applies.

use snr_core::{KernelConfig, Observation, Result};
use tracing::debug;

use crate::lane::lane_slots;
use crate::scalar::ClScalar;
use crate::template::replace_all;

/// Emit the `snrFolded` kernel source. `dm_config` splits the DM axis over
/// dimension 0 of the grid, `period_config` the period axis over dimension 1.
pub fn folded(
    dm_config: &KernelConfig,
    period_config: &KernelConfig,
    scalar: ClScalar,
    observation: &Observation,
) -> Result<String> {
    dm_config.validate(observation.nr_dms(false))?;
    period_config.validate(observation.nr_periods())?;
    debug!(
        dm_threads = dm_config.nr_threads_d0,
        dm_items = dm_config.nr_items_d0,
        period_threads = period_config.nr_threads_d0,
        period_items = period_config.nr_items_d0,
        data_type = scalar.type_name(),
        "generating snrFolded"
    );

    let t = scalar.type_name();
    let zero = scalar.zero();
    let bins = observation.nr_bins();
    let padded_dms = observation.nr_padded_dms(false);
    let bin_stride = observation.nr_periods() * padded_dms;
    let inv_bins = scalar.literal_f(1.0 / f64::from(bins));

    let skeleton = format!(
        "__kernel void snrFolded(__global const {t} * const restrict foldedData, __global {t} * const restrict snrs) {{\n\
         {t} globalItem = {zero};\n\
         <%DEF_DM%>\
         <%DEF_PERIOD%>\
         <%DEF_DM_PERIOD%>\
         \n\
         for ( unsigned int bin = 0; bin < {bins}; bin++ ) {{\n\
         <%COMPUTE%>\
         }}\n\
         <%STORE%>\
         }}\n"
    );

    let def_dm_template = format!(
        "const unsigned int dm<%NUM%> = (get_group_id(0) * {span}) + get_local_id(0) + <%OFFSET%>;\n",
        span = dm_config.span_d0()
    );
    let def_period_template = format!(
        "const unsigned int period<%NUM%> = (get_group_id(1) * {span}) + get_local_id(1) + <%OFFSET%>;\n",
        span = period_config.span_d0()
    );
    let def_dm_period_template = format!(
        "{t} averageDM<%NUM%>p<%PNUM%> = {zero};\n\
         {t} rmsDM<%NUM%>p<%PNUM%> = {zero};\n\
         {t} maxDM<%NUM%>p<%PNUM%> = {zero};\n"
    );
    let compute_template = format!(
        "globalItem = foldedData[(bin * {bin_stride}) + (period<%PNUM%> * {padded_dms}) + dm<%NUM%>];\n\
         averageDM<%NUM%>p<%PNUM%> += globalItem;\n\
         rmsDM<%NUM%>p<%PNUM%> += (globalItem * globalItem);\n\
         maxDM<%NUM%>p<%PNUM%> = fmax(maxDM<%NUM%>p<%PNUM%>, globalItem);\n"
    );
    let store_template = format!(
        "averageDM<%NUM%>p<%PNUM%> *= {inv_bins};\n\
         rmsDM<%NUM%>p<%PNUM%> *= {inv_bins};\n\
         snrs[(period<%PNUM%> * {padded_dms}) + dm<%NUM%>] = (maxDM<%NUM%>p<%PNUM%> - averageDM<%NUM%>p<%PNUM%>) / {sqrt};\n",
        sqrt = scalar.sqrt_call("rmsDM<%NUM%>p<%PNUM%>")
    );

    let dm_slots = lane_slots(dm_config.nr_items_d0, dm_config.nr_threads_d0);
    let period_slots = lane_slots(period_config.nr_items_d0, period_config.nr_threads_d0);

    let mut def_dms = String::new();
    for slot in &dm_slots {
        def_dms.push_str(&slot.render(&def_dm_template));
    }
    let mut def_periods = String::new();
    let mut def_dm_periods = String::new();
    let mut computes = String::new();
    let mut stores = String::new();
    for period in &period_slots {
        def_periods.push_str(&period.render(&def_period_template));
        let pnum = period.index.to_string();
        for dm in &dm_slots {
            def_dm_periods.push_str(&dm.render(&replace_all(
                &def_dm_period_template,
                "<%PNUM%>",
                &pnum,
            )));
            computes.push_str(&dm.render(&replace_all(&compute_template, "<%PNUM%>", &pnum)));
            stores.push_str(&dm.render(&replace_all(&store_template, "<%PNUM%>", &pnum)));
        }
    }

    let code = replace_all(&skeleton, "<%DEF_DM%>", &def_dms);
    let code = replace_all(&code, "<%DEF_PERIOD%>", &def_periods);
    let code = replace_all(&code, "<%DEF_DM_PERIOD%>", &def_dm_periods);
    let code = replace_all(&code, "<%COMPUTE%>", &computes);
    let code = replace_all(&code, "<%STORE%>", &stores);
    Ok(code)
}
