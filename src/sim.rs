// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Simulated LiDAR driver: one full ray-cast sweep per scan cycle.
//!
//! For each beam of the canonical scan pattern the driver rotates the
//! beam's sensor-local direction into the world by the sampled sensor pose
//! and issues exactly one read-only ray query against the scene. Hits
//! inside the `[min_range, max_range]` window are appended in beam order;
//! misses contribute nothing. A cycle either completes over all beams or,
//! when the scene collaborator is unavailable, degrades to an empty cycle
//! with a warning. Partial sweeps are never surfaced.

use crate::buffer::{PointBuffer, ScanCycle};
use crate::config::{PointFrame, ScanConfig};
use crate::lidar::{timestamp, Pose};
use crate::msg::Time;
use crate::scan::ScanPattern;
use crate::scene::SceneQuery;
use tracing::{debug, warn};

/// Simulated multi-beam rotating LiDAR.
///
/// Owns the scan geometry and the cycle sequence counter. The scheduler
/// calls [`SimLidar::scan_cycle`] once per scan period.
pub struct SimLidar {
    config: ScanConfig,
    point_frame: PointFrame,
    seq: u32,
}

impl SimLidar {
    /// Create a driver for a validated scan configuration.
    pub fn new(config: ScanConfig, point_frame: PointFrame) -> Self {
        Self {
            config,
            point_frame,
            seq: 0,
        }
    }

    /// The scan configuration this driver was built with.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Perform one complete sweep of all beams at the given sensor pose.
    ///
    /// Returns the finished cycle; the caller publishes it into the
    /// [`crate::buffer::CloudBuffer`]. Scene unavailability is non-fatal:
    /// the returned cycle is empty and the next cycle probes again.
    pub fn scan_cycle(&mut self, scene: &dyn SceneQuery, pose: Pose) -> ScanCycle {
        let stamp = timestamp().unwrap_or(Time { sec: 0, nanosec: 0 });
        let seq = self.seq;
        self.seq = self.seq.wrapping_add(1);

        let total = self.config.beams_per_cycle();
        let mut points = PointBuffer::with_capacity(total);
        let mut range_min = f32::INFINITY;
        let mut range_max = 0.0f32;
        let mut range_sum = 0.0f32;

        for beam in ScanPattern::new(&self.config) {
            let direction = pose.orientation * beam.direction();
            let hit = match scene.cast_ray(pose.position, direction, self.config.max_range) {
                Ok(hit) => hit,
                Err(err) => {
                    warn!("scan cycle {} degraded to empty: {}", seq, err);
                    points.clear();
                    return ScanCycle { stamp, seq, points };
                }
            };

            if let Some(hit) = hit {
                if hit.distance >= self.config.min_range && hit.distance <= self.config.max_range {
                    let p = match self.point_frame {
                        PointFrame::World => hit.point,
                        PointFrame::Sensor => pose.inverse_transform_point(hit.point),
                    };
                    points.push(p.x, p.y, p.z, hit.distance);
                    range_min = range_min.min(hit.distance);
                    range_max = range_max.max(hit.distance);
                    range_sum += hit.distance;
                }
            }
        }

        if points.is_empty() {
            debug!("scan cycle {}: 0/{} beams hit", seq, total);
        } else {
            debug!(
                "scan cycle {}: {}/{} beams hit, range min/avg/max {:.2}/{:.2}/{:.2} m",
                seq,
                points.len(),
                total,
                range_min,
                range_sum / points.len() as f32,
                range_max
            );
        }

        ScanCycle { stamp, seq, points }
    }
}
