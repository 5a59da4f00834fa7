// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Deterministic scan pattern generation.
//!
//! A scan pattern is a pure function of the [`ScanConfig`]: the same config
//! always yields the same beam sequence, in the same order. The ordering is
//! part of the wire contract since points are appended, published, and
//! truncated in beam order.
//!
//! Canonical ordering: the outer loop walks vertical rings ascending from
//! `min_vertical_deg`, the inner loop walks horizontal angles ascending
//! from 0 degrees, each stepping by the configured resolution.

use crate::config::ScanConfig;
use glam::Vec3;

/// One beam direction of a scan cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Beam {
    /// Elevation angle in degrees, positive up
    pub vertical_deg: f32,
    /// Azimuth angle in degrees, clockwise from forward around the up axis
    pub horizontal_deg: f32,
}

impl Beam {
    /// Unit direction vector in the sensor-local frame.
    ///
    /// The sensor frame is X right, Y up, Z forward; a beam with both
    /// angles at zero points along +Z. This is the composition of the
    /// elevation rotation about the pitch axis and the azimuth rotation
    /// about the yaw axis applied to the canonical forward vector.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        let v = self.vertical_deg.to_radians();
        let h = self.horizontal_deg.to_radians();
        Vec3::new(v.cos() * h.sin(), v.sin(), v.cos() * h.cos())
    }
}

/// Iterator over the canonical beam sequence for a scan configuration.
///
/// Repeatable and side-effect free: two patterns built from identical
/// configs yield identical sequences.
#[derive(Clone, Debug)]
pub struct ScanPattern {
    min_vertical_deg: f32,
    vertical_resolution_deg: f32,
    horizontal_resolution_deg: f32,
    horizontal_steps: usize,
    total: usize,
    index: usize,
}

impl ScanPattern {
    /// Build the beam sequence for a validated configuration.
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            min_vertical_deg: config.min_vertical_deg,
            vertical_resolution_deg: config.vertical_resolution_deg,
            horizontal_resolution_deg: config.horizontal_resolution_deg,
            horizontal_steps: config.horizontal_steps(),
            total: config.beams_per_cycle(),
            index: 0,
        }
    }
}

impl Iterator for ScanPattern {
    type Item = Beam;

    fn next(&mut self) -> Option<Beam> {
        if self.index >= self.total {
            return None;
        }
        let v = self.index / self.horizontal_steps;
        let h = self.index % self.horizontal_steps;
        self.index += 1;
        Some(Beam {
            vertical_deg: self.min_vertical_deg + v as f32 * self.vertical_resolution_deg,
            horizontal_deg: h as f32 * self.horizontal_resolution_deg,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ScanPattern {}

#[cfg(test)]
mod tests {
    use super::*;

    fn coarse_config() -> ScanConfig {
        ScanConfig {
            horizontal_resolution_deg: 2.0,
            vertical_resolution_deg: 2.0,
            min_vertical_deg: -4.0,
            max_vertical_deg: 4.0,
            ..Default::default()
        }
        .validated()
        .unwrap()
    }

    #[test]
    fn test_emits_exact_beam_count() {
        let config = coarse_config();
        let beams: Vec<_> = ScanPattern::new(&config).collect();
        assert_eq!(beams.len(), config.beams_per_cycle());
        assert_eq!(beams.len(), 180 * 5);
    }

    #[test]
    fn test_canonical_ordering() {
        let beams: Vec<_> = ScanPattern::new(&coarse_config()).collect();

        // Outer loop is vertical ascending from min, inner is horizontal
        // ascending from zero.
        assert_eq!(beams[0].vertical_deg, -4.0);
        assert_eq!(beams[0].horizontal_deg, 0.0);
        assert_eq!(beams[1].vertical_deg, -4.0);
        assert_eq!(beams[1].horizontal_deg, 2.0);
        assert_eq!(beams[180].vertical_deg, -2.0);
        assert_eq!(beams[180].horizontal_deg, 0.0);
        assert_eq!(beams.last().unwrap().vertical_deg, 4.0);
        assert_eq!(beams.last().unwrap().horizontal_deg, 358.0);
    }

    #[test]
    fn test_determinism() {
        let config = coarse_config();
        let first: Vec<_> = ScanPattern::new(&config).collect();
        let second: Vec<_> = ScanPattern::new(&config).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_ring_sweep() {
        let config = ScanConfig {
            min_vertical_deg: 0.0,
            max_vertical_deg: 0.0,
            ..Default::default()
        }
        .validated()
        .unwrap();

        let beams: Vec<_> = ScanPattern::new(&config).collect();
        assert_eq!(beams.len(), 360);
        assert!(beams.iter().all(|b| b.vertical_deg == 0.0));
    }

    #[test]
    fn test_mid360_beam_count() {
        let config = ScanConfig::default();
        assert_eq!(ScanPattern::new(&config).len(), 21_960);
        assert_eq!(ScanPattern::new(&config).count(), 21_960);
    }

    #[test]
    fn test_direction_forward() {
        let beam = Beam {
            vertical_deg: 0.0,
            horizontal_deg: 0.0,
        };
        let dir = beam.direction();
        assert!((dir - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_direction_unit_length() {
        for beam in ScanPattern::new(&coarse_config()) {
            assert!((beam.direction().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_direction_elevation_and_azimuth() {
        // Straight up
        let up = Beam {
            vertical_deg: 90.0,
            horizontal_deg: 0.0,
        };
        assert!((up.direction() - Vec3::Y).length() < 1e-6);

        // 90 degrees clockwise from forward is +X (right) in this frame
        let right = Beam {
            vertical_deg: 0.0,
            horizontal_deg: 90.0,
        };
        assert!((right.direction() - Vec3::X).length() < 1e-6);
    }
}
