// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Validated scan and publish configuration.
//!
//! All parameters are range-checked once, at construction, and the derived
//! step counts are computed accessors rather than stored fields so they can
//! never drift from the inputs they are derived from. Invalid values fail
//! with [`Error::Config`] before the pipeline starts; nothing is silently
//! clamped at use time.

use crate::lidar::Error;
use clap::ValueEnum;
use std::fmt;
use std::time::Duration;

/// Scan geometry and timing for one sensor, modeled on the Livox Mid-360.
///
/// Use [`ScanConfig::validated`] before handing the config to the pipeline;
/// the pipeline constructor re-validates as a safety net.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanConfig {
    /// Maximum detection range in meters
    pub max_range: f32,
    /// Minimum detection range in meters
    pub min_range: f32,
    /// Horizontal angular resolution in degrees
    pub horizontal_resolution_deg: f32,
    /// Vertical angular resolution in degrees
    pub vertical_resolution_deg: f32,
    /// Lowest vertical beam angle in degrees (negative is down)
    pub min_vertical_deg: f32,
    /// Highest vertical beam angle in degrees
    pub max_vertical_deg: f32,
    /// Full sweeps per second
    pub scan_frequency_hz: f32,
}

impl ScanConfig {
    /// Validate all parameters, returning the config unchanged on success.
    ///
    /// Checks, per the sensor datasheet limits:
    /// - `0 < min_range < max_range`
    /// - resolutions in `(0, 2]` degrees
    /// - vertical angles in `[-45, 45]` with `min <= max`
    ///   (equal angles produce a single-ring 2D sweep)
    /// - scan frequency in `[1, 50]` Hz
    pub fn validated(self) -> Result<Self, Error> {
        if !(self.min_range > 0.0 && self.min_range < self.max_range) {
            return Err(Error::Config(format!(
                "range window must satisfy 0 < min < max, got [{}, {}]",
                self.min_range, self.max_range
            )));
        }
        for (name, res) in [
            ("horizontal", self.horizontal_resolution_deg),
            ("vertical", self.vertical_resolution_deg),
        ] {
            if !(res > 0.0 && res <= 2.0) {
                return Err(Error::Config(format!(
                    "{} resolution must be in (0, 2] degrees, got {}",
                    name, res
                )));
            }
        }
        if !(-45.0..=45.0).contains(&self.min_vertical_deg)
            || !(-45.0..=45.0).contains(&self.max_vertical_deg)
            || self.min_vertical_deg > self.max_vertical_deg
        {
            return Err(Error::Config(format!(
                "vertical FOV must be within [-45, 45] with min <= max, got [{}, {}]",
                self.min_vertical_deg, self.max_vertical_deg
            )));
        }
        if !(1.0..=50.0).contains(&self.scan_frequency_hz) {
            return Err(Error::Config(format!(
                "scan frequency must be in [1, 50] Hz, got {}",
                self.scan_frequency_hz
            )));
        }
        Ok(self)
    }

    /// Number of horizontal steps in one 360 degree sweep.
    #[inline]
    pub fn horizontal_steps(&self) -> usize {
        (360.0 / self.horizontal_resolution_deg).round() as usize
    }

    /// Number of vertical rings, inclusive of both FOV limits.
    #[inline]
    pub fn vertical_steps(&self) -> usize {
        let span = self.max_vertical_deg - self.min_vertical_deg;
        (span / self.vertical_resolution_deg).round() as usize + 1
    }

    /// Total beams fired per scan cycle.
    #[inline]
    pub fn beams_per_cycle(&self) -> usize {
        self.horizontal_steps() * self.vertical_steps()
    }

    /// Duration of one scan cycle.
    pub fn scan_period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.scan_frequency_hz)
    }
}

impl Default for ScanConfig {
    /// Mid-360 defaults: 260 m / 0.05 m range, 1 degree resolution,
    /// -30 to +30 degree vertical FOV, 10 Hz.
    fn default() -> Self {
        Self {
            max_range: 260.0,
            min_range: 0.05,
            horizontal_resolution_deg: 1.0,
            vertical_resolution_deg: 1.0,
            min_vertical_deg: -30.0,
            max_vertical_deg: 30.0,
            scan_frequency_hz: 10.0,
        }
    }
}

/// Coordinate frame for recorded hit points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PointFrame {
    /// Hit points are converted into the sensor-local frame
    #[default]
    Sensor,
    /// Hit points are kept in world coordinates
    World,
}

impl fmt::Display for PointFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PointFrame::Sensor => write!(f, "sensor"),
            PointFrame::World => write!(f, "world"),
        }
    }
}

/// Publishing cadence, message sizing, and topic naming.
#[derive(Clone, Debug, PartialEq)]
pub struct PublishConfig {
    /// Publish ticks per second (independent of the scan rate)
    pub publish_frequency_hz: f32,
    /// Hard cap on points per message; snapshots truncate to the first N
    /// points in beam order
    pub max_points_per_message: usize,
    /// Frame identifier placed in point cloud message headers
    pub frame_id: String,
    /// Frame identifier placed in pose message headers
    pub base_frame_id: String,
    /// Point cloud topic name
    pub cloud_topic: String,
    /// Sensor pose topic name
    pub pose_topic: String,
    /// Frame convention for recorded points
    pub point_frame: PointFrame,
}

impl PublishConfig {
    /// Validate the publish parameters.
    ///
    /// Publish frequency must be in `[1, 60]` Hz and the point cap in
    /// `[1, 500_000]`.
    pub fn validated(self) -> Result<Self, Error> {
        if !(1.0..=60.0).contains(&self.publish_frequency_hz) {
            return Err(Error::Config(format!(
                "publish frequency must be in [1, 60] Hz, got {}",
                self.publish_frequency_hz
            )));
        }
        if !(1..=500_000).contains(&self.max_points_per_message) {
            return Err(Error::Config(format!(
                "max points per message must be in [1, 500000], got {}",
                self.max_points_per_message
            )));
        }
        if self.frame_id.is_empty() {
            return Err(Error::Config("frame_id must not be empty".into()));
        }
        if self.base_frame_id.is_empty() {
            return Err(Error::Config("base_frame_id must not be empty".into()));
        }
        Ok(self)
    }

    /// Duration of one publish tick.
    pub fn publish_period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.publish_frequency_hz)
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            publish_frequency_hz: 10.0,
            max_points_per_message: 100_000,
            frame_id: String::from("lidar"),
            base_frame_id: String::from("base_link"),
            cloud_topic: String::from("rt/lidar/points"),
            pose_topic: String::from("rt/lidar/pose"),
            point_frame: PointFrame::Sensor,
        }
    }
}
