// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Scene query interface and built-in test geometry.
//!
//! The physical scene is an external collaborator: the ray caster only
//! issues read-only probes through [`SceneQuery`] and receives hit points
//! with distances. The concrete geometry here (horizontal plane,
//! axis-aligned boxes, and a composite world) exists for the demo binary
//! and tests; production deployments plug their own scene behind the trait.

use crate::lidar::Error;
use glam::Vec3;

/// Result of a successful ray query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Intersection point in world coordinates
    pub point: Vec3,
    /// Distance from the ray origin to the intersection
    pub distance: f32,
}

/// Read-only ray query interface to the physical scene.
pub trait SceneQuery: Send + Sync {
    /// Cast a ray and return the nearest intersection within `max_distance`.
    ///
    /// `direction` must be a unit vector. Returns `Ok(None)` when nothing
    /// is hit, and `Err(Error::SceneUnavailable)` when the collaborator
    /// cannot answer queries at all.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Result<Option<RayHit>, Error>;
}

/// Infinite horizontal plane at a fixed height (world Y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Height of the plane along the world up axis
    pub height: f32,
}

impl Plane {
    fn intersect(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        if direction.y.abs() < 1e-8 {
            return None;
        }
        let t = (self.height - origin.y) / direction.y;
        if t <= 0.0 || t > max_distance {
            return None;
        }
        Some(RayHit {
            point: origin + direction * t,
            distance: t,
        })
    }
}

/// Axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Build a box from its center and full extents.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Slab-method ray intersection, returning the entry distance.
    ///
    /// Zero direction components are handled per axis: the ray is parallel
    /// to that slab, so it either misses outright or the axis imposes no
    /// constraint. This includes an origin lying exactly in a face plane,
    /// which would otherwise produce `0 * inf = NaN` slab distances.
    fn intersect(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let mut near = f32::NEG_INFINITY;
        let mut far = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (t1, t2) = ((lo - o) * inv, (hi - o) * inv);
            let (t1, t2) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            near = near.max(t1);
            far = far.min(t2);
            if near > far {
                return None;
            }
        }

        if far < 0.0 || near > max_distance {
            return None;
        }
        // A ray starting inside the box hits the exit face.
        let t = if near > 0.0 { near } else { far };
        if t > max_distance {
            return None;
        }
        Some(RayHit {
            point: origin + direction * t,
            distance: t,
        })
    }
}

/// Composite scene of a ground plane and box obstacles.
#[derive(Clone, Debug, Default)]
pub struct World {
    ground: Option<Plane>,
    boxes: Vec<Aabb>,
}

impl World {
    /// Empty scene; every ray misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scene with only a ground plane at the given height.
    pub fn with_ground(height: f32) -> Self {
        Self {
            ground: Some(Plane { height }),
            boxes: Vec::new(),
        }
    }

    /// Add a box obstacle.
    pub fn add_box(&mut self, aabb: Aabb) -> &mut Self {
        self.boxes.push(aabb);
        self
    }

    /// Deterministic indoor test course: ground plane at y=0, four
    /// perimeter walls at +/-25 m, and a ring of box obstacles around the
    /// origin. Obstacle placement is a fixed pattern so scans over this
    /// course are reproducible.
    pub fn test_course() -> Self {
        let mut world = World::with_ground(0.0);

        // Perimeter walls, 50 m x 4 m
        world.add_box(Aabb::from_center_size(
            Vec3::new(0.0, 2.0, 25.0),
            Vec3::new(50.0, 4.0, 1.0),
        ));
        world.add_box(Aabb::from_center_size(
            Vec3::new(0.0, 2.0, -25.0),
            Vec3::new(50.0, 4.0, 1.0),
        ));
        world.add_box(Aabb::from_center_size(
            Vec3::new(25.0, 2.0, 0.0),
            Vec3::new(1.0, 4.0, 50.0),
        ));
        world.add_box(Aabb::from_center_size(
            Vec3::new(-25.0, 2.0, 0.0),
            Vec3::new(1.0, 4.0, 50.0),
        ));

        // Ring of ten obstacles at fixed angles and staggered distances
        for i in 0..10u32 {
            let angle = (i as f32 * 36.0).to_radians();
            let distance = 5.0 + (i as f32 * 1.7) % 15.0;
            let height = 1.0 + (i % 3) as f32;
            world.add_box(Aabb::from_center_size(
                Vec3::new(
                    angle.cos() * distance,
                    height * 0.5,
                    angle.sin() * distance,
                ),
                Vec3::new(1.5, height, 1.5),
            ));
        }

        world
    }
}

impl SceneQuery for World {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Result<Option<RayHit>, Error> {
        let mut nearest: Option<RayHit> = None;

        let mut consider = |hit: RayHit| match nearest {
            Some(best) if best.distance <= hit.distance => {}
            _ => nearest = Some(hit),
        };

        if let Some(ground) = self.ground {
            if let Some(hit) = ground.intersect(origin, direction, max_distance) {
                consider(hit);
            }
        }
        for aabb in &self.boxes {
            if let Some(hit) = aabb.intersect(origin, direction, max_distance) {
                consider(hit);
            }
        }

        Ok(nearest)
    }
}

/// Scene stand-in that always reports itself unavailable.
///
/// Used to exercise the degraded scan path: the ray caster must produce an
/// empty cycle and keep scanning rather than propagate the failure.
pub struct OfflineScene;

impl SceneQuery for OfflineScene {
    fn cast_ray(&self, _: Vec3, _: Vec3, _: f32) -> Result<Option<RayHit>, Error> {
        Err(Error::SceneUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;

    #[test]
    fn test_plane_hit_straight_down() {
        let world = World::with_ground(0.0);
        let hit = world
            .cast_ray(vec3(0.0, 1.5, 0.0), vec3(0.0, -1.0, 0.0), 260.0)
            .unwrap()
            .expect("ray pointing at the ground must hit");
        assert!((hit.distance - 1.5).abs() < 1e-6);
        assert!(hit.point.y.abs() < 1e-6);
    }

    #[test]
    fn test_plane_miss_sky() {
        let world = World::with_ground(0.0);
        let hit = world
            .cast_ray(vec3(0.0, 1.5, 0.0), vec3(0.0, 1.0, 0.0), 260.0)
            .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn test_plane_beyond_max_distance() {
        let world = World::with_ground(0.0);
        let hit = world
            .cast_ray(vec3(0.0, 10.0, 0.0), vec3(0.0, -1.0, 0.0), 5.0)
            .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn test_aabb_hit_entry_face() {
        let mut world = World::empty();
        world.add_box(Aabb::from_center_size(
            vec3(0.0, 0.0, 10.0),
            vec3(2.0, 2.0, 2.0),
        ));

        let hit = world
            .cast_ray(Vec3::ZERO, Vec3::Z, 100.0)
            .unwrap()
            .expect("ray must hit the box");
        assert!((hit.distance - 9.0).abs() < 1e-5);
        assert!((hit.point.z - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_aabb_miss_to_side() {
        let mut world = World::empty();
        world.add_box(Aabb::from_center_size(
            vec3(0.0, 0.0, 10.0),
            vec3(2.0, 2.0, 2.0),
        ));
        assert!(world.cast_ray(Vec3::ZERO, Vec3::X, 100.0).unwrap().is_none());
    }

    #[test]
    fn test_aabb_graze_along_face() {
        // Ray running exactly in the top face plane of the box still hits.
        let mut world = World::empty();
        world.add_box(Aabb::from_center_size(
            vec3(0.0, 0.0, 10.0),
            vec3(2.0, 2.0, 2.0),
        ));

        let hit = world
            .cast_ray(vec3(0.0, 1.0, 0.0), Vec3::Z, 100.0)
            .unwrap()
            .expect("ray in the face plane must hit");
        assert!((hit.distance - 9.0).abs() < 1e-5);

        // A parallel ray outside the slab misses.
        assert!(world
            .cast_ray(vec3(0.0, 2.0, 0.0), Vec3::Z, 100.0)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_nearest_of_multiple() {
        let mut world = World::empty();
        world.add_box(Aabb::from_center_size(
            vec3(0.0, 0.0, 20.0),
            vec3(2.0, 2.0, 2.0),
        ));
        world.add_box(Aabb::from_center_size(
            vec3(0.0, 0.0, 10.0),
            vec3(2.0, 2.0, 2.0),
        ));

        let hit = world.cast_ray(Vec3::ZERO, Vec3::Z, 100.0).unwrap().unwrap();
        assert!((hit.distance - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_test_course_is_deterministic() {
        let a = World::test_course();
        let b = World::test_course();
        let origin = vec3(0.0, 1.5, 0.0);
        for dir in [Vec3::Z, Vec3::X, vec3(0.0, -0.5, 0.5).normalize()] {
            assert_eq!(
                a.cast_ray(origin, dir, 260.0).unwrap(),
                b.cast_ray(origin, dir, 260.0).unwrap()
            );
        }
    }

    #[test]
    fn test_offline_scene_errors() {
        let scene = OfflineScene;
        assert!(matches!(
            scene.cast_ray(Vec3::ZERO, Vec3::Z, 1.0),
            Err(Error::SceneUnavailable)
        ));
    }
}
