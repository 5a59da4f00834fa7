// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Wire encoding of point cloud snapshots and pose telemetry.
//!
//! Clouds are packed into the ROS PointCloud2 layout and CDR-serialized
//! for transport hand-off.
//!
//! # Point record layout (12-byte stride)
//!
//! ```text
//! ┌───────┬───────┬───────┐
//! │ x:f32 │ y:f32 │ z:f32 │
//! │ 4B    │ 4B    │ 4B    │
//! └───────┴───────┴───────┘
//!  offset 0       4       8, little-endian
//! ```
//!
//! The declared field offsets, `point_step`, `row_step`, and payload length
//! must agree exactly; a mismatch is a programming error surfaced as
//! [`Error::EncodingInvariant`] so a malformed message is never sent.

use crate::lidar::Error;
use crate::msg::{Header, PointCloud2, PointField, PoseStamped, Time};
use cdr::{CdrLe, Infinite};

/// Bytes per packed point record.
pub const POINT_STEP: usize = 12;

/// ROS type schema attached to point cloud payloads.
pub const CLOUD_SCHEMA: &str = "sensor_msgs/msg/PointCloud2";

/// ROS type schema attached to pose payloads.
pub const POSE_SCHEMA: &str = "geometry_msgs/msg/PoseStamped";

/// Point field data types for PointCloud2 messages.
///
/// These values correspond to the ROS sensor_msgs/PointField datatype field.
/// All variants are defined for completeness, even if not all are currently
/// used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[allow(dead_code)]
pub enum PointFieldType {
    INT8 = 1,
    UINT8 = 2,
    INT16 = 3,
    UINT16 = 4,
    INT32 = 5,
    UINT32 = 6,
    FLOAT32 = 7,
    FLOAT64 = 8,
}

/// Build the XYZ point fields (12-byte stride).
///
/// Returns PointField definitions for:
/// - x: FLOAT32 at offset 0
/// - y: FLOAT32 at offset 4
/// - z: FLOAT32 at offset 8
pub fn xyz_fields() -> Vec<PointField> {
    vec![
        PointField {
            name: String::from("x"),
            offset: 0,
            datatype: PointFieldType::FLOAT32 as u8,
            count: 1,
        },
        PointField {
            name: String::from("y"),
            offset: 4,
            datatype: PointFieldType::FLOAT32 as u8,
            count: 1,
        },
        PointField {
            name: String::from("z"),
            offset: 8,
            datatype: PointFieldType::FLOAT32 as u8,
            count: 1,
        },
    ]
}

/// Format point coordinates into 12-byte packed records.
#[inline(never)]
pub fn format_points_12byte(x: &[f32], y: &[f32], z: &[f32], n_points: usize) -> Vec<u8> {
    let mut data = vec![0u8; POINT_STEP * n_points];
    format_points_12byte_into(x, y, z, n_points, &mut data);
    data
}

/// Format point coordinates into a pre-allocated buffer (12-byte format).
///
/// # Panics
///
/// Panics if `out` is smaller than `12 * n_points` bytes or any coordinate
/// slice is shorter than `n_points`.
#[inline(never)]
pub fn format_points_12byte_into(x: &[f32], y: &[f32], z: &[f32], n_points: usize, out: &mut [u8]) {
    assert!(out.len() >= POINT_STEP * n_points);

    for index in 0..n_points {
        let offset = index * POINT_STEP;
        out[offset..offset + 4].copy_from_slice(&x[index].to_le_bytes());
        out[offset + 4..offset + 8].copy_from_slice(&y[index].to_le_bytes());
        out[offset + 8..offset + 12].copy_from_slice(&z[index].to_le_bytes());
    }
}

/// Assemble a PointCloud2 message from already-transformed coordinates.
///
/// The coordinate slices must all have the same length; `stamp` and
/// `frame_id` populate the header. Fails with
/// [`Error::EncodingInvariant`] if the packed payload length disagrees
/// with the declared `row_step`.
pub fn build_cloud(
    x: &[f32],
    y: &[f32],
    z: &[f32],
    stamp: Time,
    frame_id: &str,
) -> Result<PointCloud2, Error> {
    if x.len() != y.len() || x.len() != z.len() {
        return Err(Error::EncodingInvariant {
            declared: x.len() * POINT_STEP,
            actual: y.len().min(z.len()) * POINT_STEP,
        });
    }

    let n_points = x.len();
    let declared = n_points * POINT_STEP;
    let data = format_points_12byte(x, y, z, n_points);
    if data.len() != declared {
        return Err(Error::EncodingInvariant {
            declared,
            actual: data.len(),
        });
    }

    Ok(PointCloud2 {
        header: Header {
            stamp,
            frame_id: frame_id.to_string(),
        },
        height: 1,
        width: n_points as u32,
        fields: xyz_fields(),
        is_bigendian: false,
        point_step: POINT_STEP as u32,
        row_step: declared as u32,
        data,
        is_dense: true,
    })
}

/// CDR-encode a cloud message for transport hand-off.
pub fn encode_cloud(
    x: &[f32],
    y: &[f32],
    z: &[f32],
    stamp: Time,
    frame_id: &str,
) -> Result<Vec<u8>, Error> {
    let msg = build_cloud(x, y, z, stamp, frame_id)?;
    Ok(cdr::serialize::<_, _, CdrLe>(&msg, Infinite)?)
}

/// CDR-encode a pose message for transport hand-off.
pub fn encode_pose(
    pose: crate::msg::Pose,
    stamp: Time,
    frame_id: &str,
) -> Result<Vec<u8>, Error> {
    let msg = PoseStamped {
        header: Header {
            stamp,
            frame_id: frame_id.to_string(),
        },
        pose,
    };
    Ok(cdr::serialize::<_, _, CdrLe>(&msg, Infinite)?)
}
