// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Common types and error handling for the simulated LiDAR pipeline.
//!
//! This module provides the shared error taxonomy, the sensor pose types,
//! and the monotonic timestamp helper used by the scan and publish tasks.

use crate::msg;
use glam::{Quat, Vec3};
use std::fmt;

/// Common error type for the simulation pipeline.
///
/// The variants map to distinct recovery strategies: configuration errors
/// are fatal at startup, scene and transport errors are recovered locally
/// by the scheduler, and encoding invariant violations abort the offending
/// publish tick.
#[derive(Debug)]
pub enum Error {
    /// Invalid or out-of-range configuration parameter (fatal at startup)
    Config(String),
    /// Scene collaborator cannot answer ray queries (recovered per cycle)
    SceneUnavailable,
    /// Declared and actual wire payload lengths disagree (programmer error)
    EncodingInvariant { declared: usize, actual: usize },
    /// Publish hand-off to the transport failed (recovered per tick)
    Transport(String),
    /// CDR serialization error
    Cdr(cdr::Error),
    /// I/O error (clock access)
    Io(std::io::Error),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "configuration error: {}", msg),
            Error::SceneUnavailable => write!(f, "scene collaborator unavailable"),
            Error::EncodingInvariant { declared, actual } => write!(
                f,
                "encoding invariant violation: declared {} bytes, produced {}",
                declared, actual
            ),
            Error::Transport(msg) => write!(f, "transport error: {}", msg),
            Error::Cdr(err) => write!(f, "cdr error: {}", err),
            Error::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl From<cdr::Error> for Error {
    fn from(err: cdr::Error) -> Self {
        Error::Cdr(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// World-space pose of the sensor in the simulation frame.
///
/// The simulation frame is left-handed with X right, Y up, Z forward.
/// See [`crate::frame`] for the mapping to the published (ROS) frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Sensor position in world coordinates
    pub position: Vec3,
    /// Sensor orientation (unit quaternion)
    pub orientation: Quat,
}

impl Pose {
    /// Identity pose at the world origin.
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    /// Create a pose from a position and orientation.
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Transform a point from the sensor-local frame into the world frame.
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.orientation * point + self.position
    }

    /// Transform a world-space point into the sensor-local frame.
    #[inline]
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.orientation.inverse() * (point - self.position)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::IDENTITY
    }
}

/// Source of the sensor's current world pose.
///
/// The vehicle moving the mounted sensor is an external collaborator; the
/// scan task samples this once per cycle and the pose task once per
/// publish tick.
pub trait PoseSource: Send + Sync {
    /// Sample the current sensor pose.
    fn sample(&self) -> Pose;
}

/// Fixed mount pose, for a sensor rigidly attached to a stationary base.
pub struct StaticPose {
    pose: Pose,
}

impl StaticPose {
    /// Create a pose source that always reports the given pose.
    pub fn new(pose: Pose) -> Self {
        Self { pose }
    }
}

impl PoseSource for StaticPose {
    fn sample(&self) -> Pose {
        self.pose
    }
}

/// Get the current timestamp as a ROS time.
///
/// On Linux, uses `CLOCK_MONOTONIC_RAW` for best accuracy.
/// On other platforms, falls back to `SystemTime`.
#[cfg(target_os = "linux")]
pub fn timestamp() -> Result<msg::Time, Error> {
    let mut tp = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let err = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, &mut tp) };
    if err != 0 {
        return Err(std::io::Error::last_os_error().into());
    }

    Ok(msg::Time {
        sec: tp.tv_sec as i32,
        nanosec: tp.tv_nsec as u32,
    })
}

#[cfg(not(target_os = "linux"))]
pub fn timestamp() -> Result<msg::Time, Error> {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| Error::Config(format!("system clock before epoch: {}", e)))?;
    Ok(msg::Time {
        sec: duration.as_secs() as i32,
        nanosec: duration.subsec_nanos(),
    })
}
