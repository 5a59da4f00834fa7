// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Periodic scan and publish scheduling.
//!
//! The pipeline runs three independent periodic tasks:
//!
//! - **scan** at the scan frequency: sweep all beams, then atomically
//!   replace the shared [`CloudBuffer`] contents.
//! - **cloud** at the publish frequency: snapshot the buffer, transform to
//!   the publish frame, encode, and hand off to the transport.
//! - **pose** at the publish frequency: sample and publish the sensor pose
//!   through the same frame mapping.
//!
//! Each task owns its timer; an overrunning body delays the next tick
//! rather than stacking ticks, and a stop request is honored at the next
//! tick boundary, so at most one in-flight cycle completes after a stop.
//! Restarting a running task waits the old task out, cancels its pending
//! tick, and restarts the timer from now. The tasks share only the
//! [`CloudBuffer`] and the driver behind it.

use crate::buffer::CloudBuffer;
use crate::config::{PublishConfig, ScanConfig};
use crate::formats;
use crate::frame::{sim_to_ros_point, sim_to_ros_pose};
use crate::lidar::{timestamp, Error, PoseSource};
use crate::msg::Time;
use crate::scene::SceneQuery;
use crate::sim::SimLidar;
use glam::vec3;
use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, trace};

/// Publish-side hand-off to the pub/sub transport.
///
/// Implementations cover live operation ([`crate::transport::ZenohTransport`])
/// and test doubles that record published payloads.
pub trait Transport: Send + Sync {
    /// Publish an encoded payload on a previously registered topic.
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;
}

/// Handle for one running periodic task.
struct TaskHandle {
    stop: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Request a stop; the task exits at its next tick boundary.
    fn request_stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Request a stop and wait for the task to exit.
    async fn halt(self) {
        let _ = self.stop.send(true);
        let _ = self.join.await;
    }
}

/// State shared by the periodic tasks.
///
/// The driver lives here rather than in the scan task so its cycle
/// sequence counter stays monotonic across task restarts. Only the scan
/// task locks it, and never across an await.
struct Shared {
    scan_config: ScanConfig,
    publish_config: PublishConfig,
    scene: Arc<dyn SceneQuery>,
    pose_source: Arc<dyn PoseSource>,
    transport: Arc<dyn Transport>,
    buffer: CloudBuffer,
    lidar: Mutex<SimLidar>,
}

/// The scan/publish scheduler.
///
/// Construction validates both configurations; the tasks are spawned by
/// [`Pipeline::start`] (or the per-task starters) and stopped by
/// [`Pipeline::shutdown`]. Stopping retains the last completed buffer
/// contents, so a final drain remains possible.
pub struct Pipeline {
    shared: Arc<Shared>,
    scan: Option<TaskHandle>,
    cloud: Option<TaskHandle>,
    pose: Option<TaskHandle>,
}

impl Pipeline {
    /// Create a pipeline over the given collaborators.
    ///
    /// Fails with [`Error::Config`] if either configuration is invalid.
    pub fn new(
        scan_config: ScanConfig,
        publish_config: PublishConfig,
        scene: Arc<dyn SceneQuery>,
        pose_source: Arc<dyn PoseSource>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, Error> {
        let scan_config = scan_config.validated()?;
        let publish_config = publish_config.validated()?;
        let lidar = SimLidar::new(scan_config, publish_config.point_frame);
        Ok(Self {
            shared: Arc::new(Shared {
                scan_config,
                publish_config,
                scene,
                pose_source,
                transport,
                buffer: CloudBuffer::new(),
                lidar: Mutex::new(lidar),
            }),
            scan: None,
            cloud: None,
            pose: None,
        })
    }

    /// The shared point cloud buffer.
    pub fn buffer(&self) -> &CloudBuffer {
        &self.shared.buffer
    }

    /// Start all periodic tasks.
    pub async fn start(&mut self) {
        self.start_scan().await;
        self.start_cloud().await;
        self.start_pose().await;
    }

    /// Start (or restart) the scan task.
    ///
    /// If the task is already running its pending tick is cancelled and
    /// the timer restarts from now. The superseded task is waited out
    /// before the replacement spawns, so a cycle it had in flight can
    /// never land after the restarted task's first cycle.
    pub async fn start_scan(&mut self) {
        if let Some(handle) = self.scan.take() {
            handle.halt().await;
        }
        self.scan = Some(spawn_scan(Arc::clone(&self.shared)));
    }

    /// Start (or restart) the cloud publish task.
    ///
    /// Restart semantics match [`Pipeline::start_scan`].
    pub async fn start_cloud(&mut self) {
        if let Some(handle) = self.cloud.take() {
            handle.halt().await;
        }
        self.cloud = Some(spawn_cloud(Arc::clone(&self.shared)));
    }

    /// Start (or restart) the pose publish task.
    ///
    /// Restart semantics match [`Pipeline::start_scan`].
    pub async fn start_pose(&mut self) {
        if let Some(handle) = self.pose.take() {
            handle.halt().await;
        }
        self.pose = Some(spawn_pose(Arc::clone(&self.shared)));
    }

    /// Stop the scan task; the buffer retains its last completed cycle.
    pub fn stop_scan(&mut self) {
        if let Some(handle) = self.scan.take() {
            handle.request_stop();
        }
    }

    /// Stop the cloud publish task.
    pub fn stop_cloud(&mut self) {
        if let Some(handle) = self.cloud.take() {
            handle.request_stop();
        }
    }

    /// Stop the pose publish task.
    pub fn stop_pose(&mut self) {
        if let Some(handle) = self.pose.take() {
            handle.request_stop();
        }
    }

    /// Returns true if the scan task is running.
    pub fn is_scanning(&self) -> bool {
        self.scan.is_some()
    }

    /// Returns true if the cloud publish task is running.
    pub fn is_publishing(&self) -> bool {
        self.cloud.is_some()
    }

    /// Stop all tasks and wait for them to exit.
    ///
    /// The last completed buffer contents are not discarded.
    pub async fn shutdown(&mut self) {
        for handle in [self.scan.take(), self.cloud.take(), self.pose.take()]
            .into_iter()
            .flatten()
        {
            handle.halt().await;
        }
    }
}

fn spawn_scan(shared: Arc<Shared>) -> TaskHandle {
    let (stop, mut stop_rx) = watch::channel(false);
    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(shared.scan_config.scan_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                _ = ticker.tick() => {
                    let pose = shared.pose_source.sample();
                    let cycle = {
                        let mut lidar =
                            shared.lidar.lock().unwrap_or_else(|e| e.into_inner());
                        lidar.scan_cycle(shared.scene.as_ref(), pose)
                    };
                    shared.buffer.replace(cycle);
                }
            }
        }
        trace!("scan task stopped");
    });
    TaskHandle { stop, join }
}

fn spawn_cloud(shared: Arc<Shared>) -> TaskHandle {
    let (stop, mut stop_rx) = watch::channel(false);
    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(shared.publish_config.publish_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                _ = ticker.tick() => cloud_tick(&shared).await,
            }
        }
        trace!("cloud publish task stopped");
    });
    TaskHandle { stop, join }
}

fn spawn_pose(shared: Arc<Shared>) -> TaskHandle {
    let (stop, mut stop_rx) = watch::channel(false);
    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(shared.publish_config.publish_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                _ = ticker.tick() => pose_tick(&shared).await,
            }
        }
        trace!("pose publish task stopped");
    });
    TaskHandle { stop, join }
}

/// One cloud publish tick: snapshot, transform, encode, hand off.
///
/// Ticks with nothing to publish are skipped silently; encoding and
/// transport failures drop this tick's message and the next tick retries
/// naturally.
async fn cloud_tick(shared: &Shared) {
    let cfg = &shared.publish_config;
    let Some(snapshot) = shared.buffer.snapshot(cfg.max_points_per_message) else {
        trace!("no completed scan cycle yet, skipping publish tick");
        return;
    };
    if snapshot.is_empty() {
        trace!("cycle {} recorded no points, skipping publish tick", snapshot.seq);
        return;
    }

    let n = snapshot.len();
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let mut z = Vec::with_capacity(n);
    for i in 0..n {
        let p = sim_to_ros_point(vec3(snapshot.x[i], snapshot.y[i], snapshot.z[i]));
        x.push(p.x);
        y.push(p.y);
        z.push(p.z);
    }

    let payload = match formats::encode_cloud(&x, &y, &z, snapshot.stamp, &cfg.frame_id) {
        Ok(payload) => payload,
        Err(err) => {
            error!("could not encode point cloud, skipping tick: {}", err);
            return;
        }
    };

    match shared.transport.publish(&cfg.cloud_topic, payload).await {
        Ok(()) => trace!(
            "{}: published {} points from cycle {}",
            cfg.cloud_topic,
            n,
            snapshot.seq
        ),
        Err(err) => error!("{} publish error: {}", cfg.cloud_topic, err),
    }
}

/// One pose publish tick: sample, transform, encode, hand off.
async fn pose_tick(shared: &Shared) {
    let cfg = &shared.publish_config;
    let pose = shared.pose_source.sample();
    let stamp = timestamp().unwrap_or(Time { sec: 0, nanosec: 0 });

    let payload = match formats::encode_pose(sim_to_ros_pose(&pose), stamp, &cfg.base_frame_id) {
        Ok(payload) => payload,
        Err(err) => {
            error!("could not encode pose, skipping tick: {}", err);
            return;
        }
    };

    match shared.transport.publish(&cfg.pose_topic, payload).await {
        Ok(()) => trace!("{}: published sensor pose", cfg.pose_topic),
        Err(err) => error!("{} publish error: {}", cfg.pose_topic, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lidar::{Pose, StaticPose};
    use crate::msg::PointCloud2;
    use crate::scene::World;
    use glam::Quat;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Transport double that records every published payload.
    struct MockTransport {
        sent: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl MockTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }

        fn count(&self, topic: &str) -> usize {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|(t, _)| t == topic)
                .count()
        }

        fn last(&self, topic: &str) -> Option<Vec<u8>> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(t, _)| t == topic)
                .map(|(_, payload)| payload.clone())
        }
    }

    impl Transport for MockTransport {
        fn publish<'a>(
            &'a self,
            topic: &'a str,
            payload: Vec<u8>,
        ) -> Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>> {
            Box::pin(async move {
                self.sent.lock().unwrap().push((topic.to_string(), payload));
                Ok(())
            })
        }
    }

    fn test_pipeline(
        scene: Arc<dyn SceneQuery>,
        transport: Arc<MockTransport>,
    ) -> Pipeline {
        // Single downward ring keeps cycles fast for scheduling tests.
        let scan_config = ScanConfig {
            min_vertical_deg: -45.0,
            max_vertical_deg: -45.0,
            horizontal_resolution_deg: 2.0,
            ..Default::default()
        };
        let pose = Pose::new(glam::vec3(0.0, 1.5, 0.0), Quat::IDENTITY);
        Pipeline::new(
            scan_config,
            PublishConfig::default(),
            scene,
            Arc::new(StaticPose::new(pose)),
            transport,
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let transport = MockTransport::new();
        let result = Pipeline::new(
            ScanConfig {
                scan_frequency_hz: 0.0,
                ..Default::default()
            },
            PublishConfig::default(),
            Arc::new(World::empty()),
            Arc::new(StaticPose::new(Pose::IDENTITY)),
            transport,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_before_scan_sends_nothing() {
        let transport = MockTransport::new();
        let mut pipeline = test_pipeline(Arc::new(World::with_ground(0.0)), transport.clone());

        // Publish task only; the scan task never runs.
        pipeline.start_cloud().await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        pipeline.shutdown().await;

        assert_eq!(transport.count("rt/lidar/points"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_steady_state_publishes_clouds() {
        let transport = MockTransport::new();
        let mut pipeline = test_pipeline(Arc::new(World::with_ground(0.0)), transport.clone());

        pipeline.start().await;
        assert!(pipeline.is_scanning());
        assert!(pipeline.is_publishing());

        tokio::time::sleep(Duration::from_millis(350)).await;
        pipeline.shutdown().await;

        let clouds = transport.count("rt/lidar/points");
        assert!(clouds >= 2, "expected repeated publishes, got {}", clouds);
        assert!(transport.count("rt/lidar/pose") >= 2);

        // Every downward beam hits flat ground: width equals the ring size.
        let bytes = transport.last("rt/lidar/points").unwrap();
        let msg: PointCloud2 = cdr::deserialize(&bytes).unwrap();
        assert_eq!(msg.width, 180);
        assert_eq!(msg.row_step, 180 * 12);
        assert_eq!(msg.data.len(), 180 * 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_cycles_skip_publish() {
        // Empty world: scans complete but record nothing, so no cloud is
        // ever sent while the pose telemetry keeps flowing.
        let transport = MockTransport::new();
        let mut pipeline = test_pipeline(Arc::new(World::empty()), transport.clone());

        pipeline.start().await;
        tokio::time::sleep(Duration::from_millis(350)).await;
        pipeline.shutdown().await;

        assert_eq!(transport.count("rt/lidar/points"), 0);
        assert!(transport.count("rt/lidar/pose") >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_freezes_publishing() {
        let transport = MockTransport::new();
        let mut pipeline = test_pipeline(Arc::new(World::with_ground(0.0)), transport.clone());

        pipeline.start().await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        pipeline.shutdown().await;

        let after_stop = transport.count("rt/lidar/points");
        assert!(after_stop > 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(transport.count("rt/lidar/points"), after_stop);

        // The buffer retains the last cycle for a potential final drain.
        assert!(pipeline.buffer().has_cycle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_pending_tick() {
        let transport = MockTransport::new();
        let mut pipeline = test_pipeline(Arc::new(World::with_ground(0.0)), transport.clone());

        pipeline.start_scan().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        // t=10: first cloud tick fires immediately, the next is due t=110.
        pipeline.start_cloud().await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(transport.count("rt/lidar/points"), 1);

        // t=60: restarting cancels the tick pending for t=110; the new
        // timer fires at once and is next due at t=160.
        pipeline.start_cloud().await;
        tokio::time::sleep(Duration::from_millis(89)).await;
        // t=149: past the superseded schedule, before the restarted one.
        assert_eq!(transport.count("rt/lidar/points"), 2);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(transport.count("rt/lidar/points"), 3);

        pipeline.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_scan_keeps_sequence() {
        let transport = MockTransport::new();
        let mut pipeline = test_pipeline(Arc::new(World::with_ground(0.0)), transport.clone());

        pipeline.start_scan().await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        // Cycles 0 and 1 completed at t=0 and t=100.
        assert_eq!(pipeline.buffer().snapshot(usize::MAX).unwrap().seq, 1);

        // The restarted task scans immediately; cycle numbering continues
        // instead of resetting, and the exposed cycle is never stale.
        pipeline.start_scan().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(pipeline.buffer().snapshot(usize::MAX).unwrap().seq, 2);

        pipeline.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_task_fills_buffer() {
        let transport = MockTransport::new();
        let mut pipeline = test_pipeline(Arc::new(World::with_ground(0.0)), transport.clone());

        pipeline.start_scan().await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        pipeline.shutdown().await;

        let snapshot = pipeline.buffer().snapshot(10_000).unwrap();
        assert_eq!(snapshot.len(), 180);
    }
}
