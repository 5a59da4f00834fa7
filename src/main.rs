// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use glam::{Quat, Vec3};
use lidarsim::{
    args::Args,
    config::{PublishConfig, ScanConfig},
    formats::{CLOUD_SCHEMA, POSE_SCHEMA},
    lidar::{Pose, StaticPose},
    pipeline::Pipeline,
    scene::World,
    transport::ZenohTransport,
};
use std::sync::Arc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.rust_log)
        .init();

    let scan_config = ScanConfig::try_from(&args)?;
    let publish_config = PublishConfig::try_from(&args)?;
    info!(
        "scan pattern: {} x {} beams at {} Hz, range [{}, {}] m",
        scan_config.horizontal_steps(),
        scan_config.vertical_steps(),
        scan_config.scan_frequency_hz,
        scan_config.min_range,
        scan_config.max_range,
    );

    let session = zenoh::open(zenoh::Config::from(args.clone()))
        .await
        .map_err(|e| format!("failed to open zenoh session: {}", e))?;
    debug!("opened zenoh session");

    let cloud_topic = publish_config.cloud_topic.clone();
    let pose_topic = publish_config.pose_topic.clone();
    let transport = ZenohTransport::new(
        session,
        &[
            (cloud_topic.as_str(), CLOUD_SCHEMA),
            (pose_topic.as_str(), POSE_SCHEMA),
        ],
    );

    let mount = Pose::new(
        Vec3::new(args.tf_vec[0], args.tf_vec[1], args.tf_vec[2]),
        Quat::from_xyzw(
            args.tf_quat[0],
            args.tf_quat[1],
            args.tf_quat[2],
            args.tf_quat[3],
        )
        .normalize(),
    );

    let mut pipeline = Pipeline::new(
        scan_config,
        publish_config,
        Arc::new(World::test_course()),
        Arc::new(StaticPose::new(mount)),
        Arc::new(transport),
    )?;
    pipeline.start().await;
    info!(
        "publishing point clouds on {} and poses on {}",
        cloud_topic, pose_topic
    );

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    pipeline.shutdown().await;

    Ok(())
}
