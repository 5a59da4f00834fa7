// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Coordinate frame conversion between the simulation and publish frames.
//!
//! The simulation uses a left-handed frame with X right, Y up, Z forward.
//! Published messages use the ROS convention: X forward, Y left, Z up.
//! The mapping is the fixed axis permutation
//!
//! ```text
//!   ros.x =  sim.z   (forward)
//!   ros.y = -sim.x   (left is negated right)
//!   ros.z =  sim.y   (up)
//! ```
//!
//! The same permutation is applied to every cloud point and to the pose
//! telemetry published alongside, so all outputs stay mutually consistent.

use crate::lidar::Pose;
use crate::msg;
use glam::{Quat, Vec3};

/// Convert a point from the simulation frame to the ROS publish frame.
#[inline]
pub fn sim_to_ros_point(p: Vec3) -> Vec3 {
    Vec3::new(p.z, -p.x, p.y)
}

/// Convert an orientation from the simulation frame to the ROS frame.
///
/// Applies the same axis permutation to the quaternion's vector part.
#[inline]
pub fn sim_to_ros_quat(q: Quat) -> Quat {
    Quat::from_xyzw(q.z, -q.x, q.y, q.w)
}

/// Convert a sensor pose into a ROS pose message.
pub fn sim_to_ros_pose(pose: &Pose) -> msg::Pose {
    let position = sim_to_ros_point(pose.position);
    let orientation = sim_to_ros_quat(pose.orientation);
    msg::Pose {
        position: msg::Point {
            x: position.x as f64,
            y: position.y as f64,
            z: position.z as f64,
        },
        orientation: msg::Quaternion {
            x: orientation.x as f64,
            y: orientation.y as f64,
            z: orientation.z as f64,
            w: orientation.w as f64,
        },
    }
}
