// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use serde_json::json;
use tracing::level_filters::LevelFilter;
use zenoh::config::{Config, WhatAmI};

use crate::config::{PointFrame, PublishConfig, ScanConfig};
use crate::lidar::Error;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Maximum ray range in meters
    #[arg(long, env, default_value = "260.0")]
    pub max_range: f32,

    /// Minimum hit distance in meters, closer hits are discarded
    #[arg(long, env, default_value = "0.05")]
    pub min_range: f32,

    /// Complete scan cycles per second
    #[arg(long, env, default_value = "10.0")]
    pub scan_frequency: f32,

    /// Azimuth step between beams in degrees
    #[arg(long, env, default_value = "1.0")]
    pub horizontal_resolution: f32,

    /// Elevation step between rings in degrees
    #[arg(long, env, default_value = "1.0")]
    pub vertical_resolution: f32,

    /// Lowest beam elevation in degrees
    #[arg(long, env, default_value = "-30.0", allow_hyphen_values = true)]
    pub min_vertical: f32,

    /// Highest beam elevation in degrees
    #[arg(long, env, default_value = "30.0", allow_hyphen_values = true)]
    pub max_vertical: f32,

    /// Point cloud and pose publish ticks per second
    #[arg(long, env, default_value = "10.0")]
    pub publish_frequency: f32,

    /// Hard cap on points per point cloud message
    #[arg(long, env, default_value = "100000")]
    pub max_points: usize,

    /// Frame convention for published points
    #[arg(long, env, default_value = "sensor")]
    pub point_frame: PointFrame,

    /// Sensor mount position on the vehicle
    #[arg(
        long,
        env,
        default_value = "0 0 0",
        value_delimiter = ' ',
        num_args = 3,
        allow_hyphen_values = true
    )]
    pub tf_vec: Vec<f32>,

    /// Sensor mount orientation quaternion on the vehicle
    #[arg(
        long,
        env,
        default_value = "0 0 0 1",
        value_delimiter = ' ',
        num_args = 4,
        allow_hyphen_values = true
    )]
    pub tf_quat: Vec<f32>,

    /// The name of the base frame
    #[arg(long, env, default_value = "base_link")]
    pub base_frame_id: String,

    /// The name of the lidar frame
    #[arg(long, env, default_value = "lidar")]
    pub frame_id: String,

    /// lidar base topic
    #[arg(long, env, default_value = "rt/lidar")]
    pub lidar_topic: String,

    /// Application log level
    #[arg(long, env, default_value = "info")]
    pub rust_log: LevelFilter,

    /// zenoh connection mode
    #[arg(long, env, default_value = "peer")]
    mode: WhatAmI,

    /// connect to zenoh endpoints
    #[arg(long, env)]
    connect: Vec<String>,

    /// listen to zenoh endpoints
    #[arg(long, env)]
    listen: Vec<String>,

    /// disable zenoh multicast scouting
    #[arg(long, env)]
    no_multicast_scouting: bool,
}

impl Args {
    /// Point cloud topic derived from the base topic.
    pub fn cloud_topic(&self) -> String {
        format!("{}/points", self.lidar_topic)
    }

    /// Sensor pose topic derived from the base topic.
    pub fn pose_topic(&self) -> String {
        format!("{}/pose", self.lidar_topic)
    }
}

impl TryFrom<&Args> for ScanConfig {
    type Error = Error;

    fn try_from(args: &Args) -> Result<Self, Error> {
        ScanConfig {
            max_range: args.max_range,
            min_range: args.min_range,
            scan_frequency_hz: args.scan_frequency,
            horizontal_resolution_deg: args.horizontal_resolution,
            vertical_resolution_deg: args.vertical_resolution,
            min_vertical_deg: args.min_vertical,
            max_vertical_deg: args.max_vertical,
        }
        .validated()
    }
}

impl TryFrom<&Args> for PublishConfig {
    type Error = Error;

    fn try_from(args: &Args) -> Result<Self, Error> {
        PublishConfig {
            publish_frequency_hz: args.publish_frequency,
            max_points_per_message: args.max_points,
            frame_id: args.frame_id.clone(),
            base_frame_id: args.base_frame_id.clone(),
            cloud_topic: args.cloud_topic(),
            pose_topic: args.pose_topic(),
            point_frame: args.point_frame,
        }
        .validated()
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let mut config = Config::default();

        config
            .insert_json5("mode", &json!(args.mode).to_string())
            .unwrap();

        if !args.connect.is_empty() {
            config
                .insert_json5("connect/endpoints", &json!(args.connect).to_string())
                .unwrap();
        }

        if !args.listen.is_empty() {
            config
                .insert_json5("listen/endpoints", &json!(args.listen).to_string())
                .unwrap();
        }

        if args.no_multicast_scouting {
            config
                .insert_json5("scouting/multicast/enabled", &json!(false).to_string())
                .unwrap();
        }

        config
    }
}
