// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! ROS 2 message definitions for the published telemetry.
//!
//! These structs mirror the standard `builtin_interfaces`, `std_msgs`,
//! `sensor_msgs`, and `geometry_msgs` message layouts so that CDR-encoded
//! payloads are byte-compatible with ROS 2 subscribers. Field order matters:
//! serde serializes struct fields in declaration order, which must match the
//! ROS IDL order exactly.

use serde::{Deserialize, Serialize};

/// `builtin_interfaces/msg/Time`
///
/// The nanosecond component is a remainder and must be in `[0, 1e9)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    pub sec: i32,
    pub nanosec: u32,
}

/// `std_msgs/msg/Header`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub stamp: Time,
    pub frame_id: String,
}

/// `sensor_msgs/msg/PointField`
///
/// Describes one field within a packed point record. The `datatype` values
/// are defined by [`crate::formats::PointFieldType`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointField {
    pub name: String,
    pub offset: u32,
    pub datatype: u8,
    pub count: u32,
}

/// `sensor_msgs/msg/PointCloud2`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointCloud2 {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub fields: Vec<PointField>,
    pub is_bigendian: bool,
    pub point_step: u32,
    pub row_step: u32,
    pub data: Vec<u8>,
    pub is_dense: bool,
}

/// `geometry_msgs/msg/Point`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// `geometry_msgs/msg/Quaternion`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

/// `geometry_msgs/msg/Pose`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

/// `geometry_msgs/msg/PoseStamped`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseStamped {
    pub header: Header,
    pub pose: Pose,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdr::{CdrLe, Infinite};

    #[test]
    fn test_time_roundtrip() {
        let time = Time {
            sec: 1234,
            nanosec: 567_000_000,
        };
        let bytes = cdr::serialize::<_, _, CdrLe>(&time, Infinite).unwrap();
        let back: Time = cdr::deserialize(&bytes).unwrap();
        assert_eq!(back, time);
    }

    #[test]
    fn test_pose_stamped_roundtrip() {
        let msg = PoseStamped {
            header: Header {
                stamp: Time { sec: 7, nanosec: 8 },
                frame_id: String::from("base_link"),
            },
            pose: Pose {
                position: Point {
                    x: 1.0,
                    y: -2.0,
                    z: 3.5,
                },
                orientation: Quaternion::default(),
            },
        };
        let bytes = cdr::serialize::<_, _, CdrLe>(&msg, Infinite).unwrap();
        let back: PoseStamped = cdr::deserialize(&bytes).unwrap();
        assert_eq!(back, msg);
    }
}
