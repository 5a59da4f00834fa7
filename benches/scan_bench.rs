// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Benchmarks for scan cycle generation.
//!
//! Measures a full beam sweep (ray casting plus point recording) over the
//! demo test course at several pattern densities.
//!
//! Run with: cargo bench --bench scan_bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::{vec3, Quat};
use lidarsim::{
    config::{PointFrame, ScanConfig},
    lidar::Pose,
    scene::World,
    sim::SimLidar,
};

/// Pattern densities: (label, resolutions, vertical FOV).
const PATTERNS: &[(&str, f32, f32, f32, f32)] = &[
    ("single_ring", 1.0, 1.0, 0.0, 0.0),
    ("coarse", 2.0, 2.0, -30.0, 30.0),
    ("mid360_full", 1.0, 1.0, -30.0, 30.0),
];

fn scan_cycle_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_cycle");
    let scene = World::test_course();
    let pose = Pose::new(vec3(0.0, 1.5, 0.0), Quat::IDENTITY);

    for &(label, h_res, v_res, min_v, max_v) in PATTERNS {
        let config = ScanConfig {
            horizontal_resolution_deg: h_res,
            vertical_resolution_deg: v_res,
            min_vertical_deg: min_v,
            max_vertical_deg: max_v,
            ..Default::default()
        }
        .validated()
        .unwrap();
        let beams = config.beams_per_cycle();
        let mut lidar = SimLidar::new(config, PointFrame::Sensor);

        group.throughput(Throughput::Elements(beams as u64));
        group.bench_with_input(BenchmarkId::from_parameter(label), &beams, |b, _| {
            b.iter(|| lidar.scan_cycle(&scene, pose))
        });
    }

    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = scan_cycle_bench
);
criterion_main!(benches);
