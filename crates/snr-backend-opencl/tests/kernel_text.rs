// SPDX-License-Identifier: Apache-2.0

//! Structural checks over whole generated kernels. OpenCL has no in-process
//! validator to hand the text to, so these verify the properties a compiler
//! would trip over: balanced braces, no leftover placeholders, the advertised
//! entry names, and the barrier structure of the tree reduction.

use snr_backend_opencl::{dedispersed, dms_samples, folded, samples_dms, ClScalar};
use snr_core::{KernelConfig, Observation};

fn observation() -> Observation {
    Observation::new(32)
        .with_dms(1024, 1)
        .with_samples(4096, 4096)
        .with_periods(64, 128)
}

fn generate_all(scalar: ClScalar) -> Vec<(&'static str, String)> {
    let obs = observation();
    vec![
        (
            "dms_samples",
            dms_samples(&KernelConfig::new(32, 4), scalar, &obs).unwrap(),
        ),
        (
            "samples_dms",
            samples_dms(&KernelConfig::new(32, 4), scalar, &obs).unwrap(),
        ),
        (
            "folded",
            folded(
                &KernelConfig::new(16, 2),
                &KernelConfig::new(4, 2),
                scalar,
                &obs,
            )
            .unwrap(),
        ),
        (
            "dedispersed",
            dedispersed(&KernelConfig::new(64, 2), scalar, &obs).unwrap(),
        ),
    ]
}

fn brace_balance(source: &str) -> i64 {
    source
        .chars()
        .map(|c| match c {
            '{' => 1,
            '}' => -1,
            _ => 0,
        })
        .sum()
}

#[test]
fn every_kernel_is_structurally_closed() {
    for scalar in [ClScalar::F32, ClScalar::F64] {
        for (name, source) in generate_all(scalar) {
            assert_eq!(brace_balance(&source), 0, "{name} braces unbalanced");
            assert!(!source.contains("<%"), "{name} leaked a placeholder");
            assert!(!source.contains("%>"), "{name} leaked a placeholder");
            assert!(source.starts_with("__kernel void snr"), "{name} entry point");
            assert!(source.ends_with("}\n"), "{name} truncated");
        }
    }
}

#[test]
fn entry_names_encode_the_specialized_cardinality() {
    let kernels = generate_all(ClScalar::F32);
    assert!(kernels[0].1.contains("__kernel void snrDMsSamples4096("));
    assert!(kernels[1].1.contains("__kernel void snrSamplesDMs4096("));
    assert!(kernels[2].1.contains("__kernel void snrFolded("));
    assert!(kernels[3].1.contains("__kernel void snrDedispersed("));
}

#[test]
fn generation_is_deterministic() {
    let obs = observation();
    let config = KernelConfig::new(32, 4);
    let a = dms_samples(&config, ClScalar::F32, &obs).unwrap();
    let b = dms_samples(&config, ClScalar::F32, &obs).unwrap();
    assert_eq!(a, b);
}

#[test]
fn tree_reduction_emits_one_barrier_per_round() {
    let obs = observation();
    for threads in [2u32, 8, 32, 128] {
        let src = dms_samples(&KernelConfig::new(threads, 1), ClScalar::F32, &obs).unwrap();
        let rounds = src.matches("barrier(CLK_LOCAL_MEM_FENCE);").count();
        assert_eq!(rounds, threads.ilog2() as usize, "threads = {threads}");
        // The first round halves the group, the last merges lanes 0 and 1.
        assert!(src.contains(&format!("if ( get_local_id(0) < {} )", threads / 2)));
        assert!(src.contains("if ( get_local_id(0) < 1 )"));
    }
}

#[test]
fn only_the_reduction_kernel_uses_local_memory() {
    for (name, source) in generate_all(ClScalar::F32) {
        let uses_local = source.contains("__local");
        assert_eq!(uses_local, name == "dms_samples", "{name}");
    }
}

#[test]
fn element_type_tag_is_threaded_end_to_end() {
    let obs = observation();
    let scalar = ClScalar::parse("double").unwrap();
    let src = samples_dms(&KernelConfig::new(32, 1), scalar, &obs).unwrap();
    assert!(src.contains("__global const double * const restrict input"));
    assert!(ClScalar::parse("char4").is_err());
}
