// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Point cloud buffering between the scan and publish tasks.
//!
//! The scan task produces one [`ScanCycle`] per sweep and hands it to the
//! shared [`CloudBuffer`] with [`CloudBuffer::replace`]. The publish task
//! takes an independently-owned [`Snapshot`] with [`CloudBuffer::snapshot`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ replace  ┌──────────────────┐ snapshot ┌────────────┐
//! │  scan task   │ ───────► │   CloudBuffer    │ ───────► │ publish    │
//! │  (SimLidar)  │  whole   │  Arc<ScanCycle>  │  capped  │ task       │
//! └──────────────┘  cycles  └──────────────────┘  copies  └────────────┘
//! ```
//!
//! `replace` and `snapshot` only swap or clone an `Arc` under the lock, so
//! neither side can block the other for longer than a pointer exchange and
//! readers always observe a complete cycle, never a partial one.

use crate::msg::Time;
use std::sync::{Arc, Mutex};

/// Pre-allocated point storage in structure-of-arrays layout.
///
/// Coordinates are stored in separate vectors; `range` keeps the hit
/// distance reported by the scene query so downstream consumers never
/// recompute it.
#[derive(Debug, Clone, Default)]
pub struct PointBuffer {
    x: Vec<f32>,
    y: Vec<f32>,
    z: Vec<f32>,
    range: Vec<f32>,
}

impl PointBuffer {
    /// Create a buffer with capacity reserved for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            range: Vec::with_capacity(capacity),
        }
    }

    /// Number of points in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if the buffer contains no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Clear all points while retaining capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.z.clear();
        self.range.clear();
    }

    /// Append a point with its hit distance.
    #[inline]
    pub fn push(&mut self, x: f32, y: f32, z: f32, range: f32) {
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
        self.range.push(range);
    }

    /// X coordinates.
    #[inline]
    pub fn x(&self) -> &[f32] {
        &self.x
    }

    /// Y coordinates.
    #[inline]
    pub fn y(&self) -> &[f32] {
        &self.y
    }

    /// Z coordinates.
    #[inline]
    pub fn z(&self) -> &[f32] {
        &self.z
    }

    /// Hit distances from the sensor.
    #[inline]
    pub fn range(&self) -> &[f32] {
        &self.range
    }
}

/// One complete scan sweep: all recorded points in beam order, plus the
/// capture timestamp and cycle sequence number.
///
/// A cycle is owned by the ray caster while it is being filled; ownership
/// transfers to the [`CloudBuffer`] on [`CloudBuffer::replace`]. Partial
/// sweeps are never placed in the buffer.
#[derive(Debug, Clone)]
pub struct ScanCycle {
    /// Capture timestamp taken at the start of the sweep
    pub stamp: Time,
    /// Cycle sequence number (wraps at `u32::MAX`)
    pub seq: u32,
    /// Recorded hit points in beam order
    pub points: PointBuffer,
}

/// Immutable capped copy of the latest scan cycle, taken at publish time.
///
/// Owns its data outright, so encoding can never race against the next
/// `replace`. When the source cycle exceeds the cap the snapshot keeps the
/// first `cap` points in beam order (truncation, not decimation).
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Capture timestamp of the underlying cycle
    pub stamp: Time,
    /// Sequence number of the underlying cycle
    pub seq: u32,
    /// X coordinates, truncated to the cap
    pub x: Vec<f32>,
    /// Y coordinates, truncated to the cap
    pub y: Vec<f32>,
    /// Z coordinates, truncated to the cap
    pub z: Vec<f32>,
}

impl Snapshot {
    /// Number of points in the snapshot.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if the snapshot contains no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Shared holder of the latest complete scan cycle.
///
/// The single piece of state shared between the scan and publish tasks.
/// The lock is held only to exchange or clone the `Arc`; point data is
/// copied outside the critical section.
#[derive(Debug, Default)]
pub struct CloudBuffer {
    latest: Mutex<Option<Arc<ScanCycle>>>,
}

impl CloudBuffer {
    /// Create an empty buffer with no stored cycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the exposed cycle with a newly completed one.
    ///
    /// The previous cycle is dropped once the last outstanding snapshot
    /// reader releases its `Arc`.
    pub fn replace(&self, cycle: ScanCycle) {
        let cycle = Arc::new(cycle);
        // Lock poisoning cannot occur: no code panics while holding it.
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        *latest = Some(cycle);
    }

    /// Take an independently-owned snapshot of the latest cycle, truncated
    /// to the first `cap` points in beam order.
    ///
    /// Returns `None` if no scan cycle has completed yet. A stored cycle
    /// with zero points yields an empty snapshot.
    pub fn snapshot(&self, cap: usize) -> Option<Snapshot> {
        let cycle = {
            let latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
            latest.as_ref().map(Arc::clone)
        }?;

        let n = cycle.points.len().min(cap);
        Some(Snapshot {
            stamp: cycle.stamp,
            seq: cycle.seq,
            x: cycle.points.x()[..n].to_vec(),
            y: cycle.points.y()[..n].to_vec(),
            z: cycle.points.z()[..n].to_vec(),
        })
    }

    /// Returns true if a completed cycle is available.
    pub fn has_cycle(&self) -> bool {
        self.latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}
