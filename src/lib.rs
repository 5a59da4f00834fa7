// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Simulated LiDAR Publisher Library
//!
//! This library simulates a multi-beam rotating LiDAR sensor: on a fixed
//! schedule it sweeps a deterministic beam pattern through a scene via
//! ray casting, buffers the resulting point cloud, and publishes it as a
//! ROS 2 `PointCloud2` message together with the sensor pose.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌───────────────┐
//! │  ScanPattern │ ──► │  SimLidar    │ ──► │  CloudBuffer  │
//! │  (beam grid) │     │  (ray casts) │     │  (latest scan)│
//! └──────────────┘     └──────────────┘     └───────────────┘
//!        ▲                    │                     │
//!        │                    ▼                     ▼
//! ┌──────────────┐     ┌──────────────┐     ┌───────────────┐
//! │  ScanConfig  │     │  SceneQuery  │     │  Pipeline     │
//! │  (validated) │     │  (ray hits)  │     │  (schedulers) │
//! └──────────────┘     └──────────────┘     └───────┬───────┘
//!                                                   │
//!                                                   ▼
//!                                  ┌────────────────────────────────┐
//!                                  │  formats::encode_* (CDR)       │
//!                                  │  Transport (zenoh publish)     │
//!                                  └────────────────────────────────┘
//! ```
//!
//! Scanning and publishing run on independent clocks. A scan cycle is
//! atomic: subscribers only ever observe complete sweeps, never partial
//! ones. Points are recorded in the simulation frame (left-handed,
//! x-right / y-up / z-forward) and remapped to the ROS convention at the
//! publish boundary.
//!
//! # Modules
//!
//! - [`config`]: Validated scan and publish parameters
//! - [`scan`]: Deterministic beam pattern generation
//! - [`scene`]: Ray-castable scene abstraction and primitives
//! - [`sim`]: The simulated sensor driver
//! - [`buffer`]: Latest-cycle point buffer shared between tasks
//! - [`frame`]: Simulation-to-ROS coordinate remapping
//! - [`formats`]: PointCloud2 layout and CDR encoding
//! - [`pipeline`]: Periodic scan and publish scheduling
//! - [`transport`]: Zenoh-backed publishing
//! - [`msg`]: ROS 2 message definitions

pub mod args;
pub mod buffer;
pub mod config;
pub mod formats;
pub mod frame;
pub mod lidar;
pub mod msg;
pub mod pipeline;
pub mod scan;
pub mod scene;
pub mod sim;
pub mod transport;

// Re-exports for convenience
pub use buffer::{CloudBuffer, ScanCycle, Snapshot};
pub use config::{PointFrame, PublishConfig, ScanConfig};
pub use lidar::{Error, Pose, PoseSource, StaticPose};
pub use pipeline::{Pipeline, Transport};
pub use scan::{Beam, ScanPattern};
pub use scene::{RayHit, SceneQuery, World};
pub use sim::SimLidar;
pub use transport::ZenohTransport;
