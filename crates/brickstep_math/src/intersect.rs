//! Ray and volume intersection tests against the bounding primitives
//!
//! Rays run from `start` through `end` and continue past it. Distances are
//! measured from `start` in the units of the frame the inputs are expressed
//! in, so a rigid transform into an object frame leaves them unchanged.

use crate::Vec3;
use crate::bounds::{Aabb, Plane, Sphere};

/// Directions shorter than this are treated as degenerate
const RAY_EPSILON: f32 = 1e-6;

/// Result of a ray intersection test
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray start
    pub distance: f32,
    /// Hit point
    pub point: Vec3,
    /// Surface normal at the hit point (unit length)
    pub normal: Vec3,
}

/// Normalized direction of a ray, or `None` when start and end coincide
fn ray_direction(start: Vec3, end: Vec3) -> Option<Vec3> {
    let dir = end - start;
    if dir.length_squared() < RAY_EPSILON * RAY_EPSILON {
        None
    } else {
        Some(dir.normalized())
    }
}

/// Test a ray against a sphere
///
/// Returns the entry point, or the exit point when the ray starts inside.
/// Spheres entirely behind the start are missed.
pub fn sphere_ray_intersect(sphere: &Sphere, start: Vec3, end: Vec3) -> Option<RayHit> {
    let dir = ray_direction(start, end)?;

    // Solve |start + t*dir - center|^2 = r^2 for t with a unit direction
    let oc = start - sphere.center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - sphere.radius * sphere.radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let entry = -b - root;
    let exit = -b + root;
    let distance = if entry >= 0.0 {
        entry
    } else if exit >= 0.0 {
        exit
    } else {
        return None;
    };

    let point = start + dir * distance;
    let normal = (point - sphere.center).normalized();
    Some(RayHit { distance, point, normal })
}

/// Test a ray against an AABB using the slab method
///
/// The normal is that of the face the ray enters through. A ray starting
/// inside the box hits at distance zero with a normal facing back along the
/// ray.
pub fn aabb_ray_intersect(aabb: &Aabb, start: Vec3, end: Vec3) -> Option<RayHit> {
    let dir = ray_direction(start, end)?;

    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    let mut near_axis = 0;

    for axis in 0..3 {
        let origin = start.axis(axis);
        let d = dir.axis(axis);
        let min = aabb.min.axis(axis);
        let max = aabb.max.axis(axis);

        if d.abs() < RAY_EPSILON {
            // Parallel to this slab: must already be between its faces
            if origin < min || origin > max {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let t1 = (min - origin) * inv;
        let t2 = (max - origin) * inv;
        let (t_enter, t_exit) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

        if t_enter > t_near {
            t_near = t_enter;
            near_axis = axis;
        }
        t_far = t_far.min(t_exit);

        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        return None;
    }

    if t_near < 0.0 {
        return Some(RayHit { distance: 0.0, point: start, normal: -dir });
    }

    let normal = Vec3::unit_axis(near_axis) * -dir.axis(near_axis).signum();
    Some(RayHit {
        distance: t_near,
        point: start + dir * t_near,
        normal,
    })
}

/// True unless the box lies entirely on the outside of one of the planes
///
/// For each plane only the corner furthest along the negative normal is
/// checked; if even that corner is outside, so is the whole box.
pub fn aabb_intersects_volume(aabb: &Aabb, planes: &[Plane]) -> bool {
    if aabb.is_empty() {
        return false;
    }
    let center = aabb.center();
    let half_extents = aabb.half_extents();

    planes.iter().all(|plane| {
        let closest_vertex = center - half_extents.component_mul(plane.normal.sign());
        plane.signed_distance(closest_vertex) <= 0.0
    })
}

/// True unless the sphere lies entirely on the outside of one of the planes
pub fn sphere_intersects_volume(sphere: &Sphere, planes: &[Plane]) -> bool {
    planes.iter().all(|plane| {
        let reach = sphere.radius * plane.normal.length();
        plane.signed_distance(sphere.center) <= reach
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    /// Axis-aligned unit-normal box volume: inside is |x|,|y|,|z| <= half
    fn cube_volume(center: Vec3, half: f32) -> Vec<Plane> {
        let mut planes = Vec::new();
        for axis in 0..3 {
            let n = Vec3::unit_axis(axis);
            planes.push(Plane::new(n, -(center.axis(axis) + half)));
            planes.push(Plane::new(-n, center.axis(axis) - half));
        }
        planes
    }

    #[test]
    fn test_sphere_ray_hit_front() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -10.0), 5.0);
        let hit = sphere_ray_intersect(&sphere, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(approx_eq(hit.distance, 5.0));
        assert!(vec_approx_eq(hit.normal, Vec3::Z));
    }

    #[test]
    fn test_sphere_ray_continues_past_end() {
        let sphere = Sphere::new(Vec3::new(100.0, 0.0, 0.0), 5.0);
        let hit = sphere_ray_intersect(&sphere, Vec3::ZERO, Vec3::X).unwrap();
        assert!(approx_eq(hit.distance, 95.0));
    }

    #[test]
    fn test_sphere_ray_from_inside_uses_exit() {
        let sphere = Sphere::new(Vec3::ZERO, 5.0);
        let hit = sphere_ray_intersect(&sphere, Vec3::ZERO, Vec3::Y).unwrap();
        assert!(approx_eq(hit.distance, 5.0));
    }

    #[test]
    fn test_sphere_ray_behind_start_misses() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 10.0), 5.0);
        assert!(sphere_ray_intersect(&sphere, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).is_none());
    }

    #[test]
    fn test_sphere_ray_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 10.0, -10.0), 5.0);
        assert!(sphere_ray_intersect(&sphere, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).is_none());
    }

    #[test]
    fn test_degenerate_ray_misses() {
        let sphere = Sphere::new(Vec3::ZERO, 5.0);
        assert!(sphere_ray_intersect(&sphere, Vec3::ONE, Vec3::ONE).is_none());
        assert!(aabb_ray_intersect(&Aabb::cube(5.0), Vec3::ONE, Vec3::ONE).is_none());
    }

    #[test]
    fn test_aabb_ray_hit_face() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(10.0, 0.0, 0.0), Vec3::splat(2.0));
        let hit = aabb_ray_intersect(&aabb, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(approx_eq(hit.distance, 8.0));
        assert!(vec_approx_eq(hit.point, Vec3::new(8.0, 0.0, 0.0)));
        assert!(vec_approx_eq(hit.normal, -Vec3::X));
    }

    #[test]
    fn test_aabb_ray_diagonal_entry_face() {
        let aabb = Aabb::new(Vec3::new(2.0, -1.0, -1.0), Vec3::new(4.0, 10.0, 1.0));
        // Enters through the -Y face at y = -1
        let hit = aabb_ray_intersect(&aabb, Vec3::new(3.0, -5.0, 0.0), Vec3::new(3.0, 0.0, 0.0)).unwrap();
        assert!(approx_eq(hit.distance, 4.0));
        assert!(vec_approx_eq(hit.normal, -Vec3::Y));
    }

    #[test]
    fn test_aabb_ray_miss() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(10.0, 10.0, 0.0), Vec3::splat(2.0));
        assert!(aabb_ray_intersect(&aabb, Vec3::ZERO, Vec3::X).is_none());
    }

    #[test]
    fn test_aabb_ray_behind_misses() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(-10.0, 0.0, 0.0), Vec3::splat(2.0));
        assert!(aabb_ray_intersect(&aabb, Vec3::ZERO, Vec3::X).is_none());
    }

    #[test]
    fn test_aabb_ray_start_inside() {
        let hit = aabb_ray_intersect(&Aabb::cube(5.0), Vec3::ZERO, Vec3::Z).unwrap();
        assert_eq!(hit.distance, 0.0);
        assert!(vec_approx_eq(hit.normal, -Vec3::Z));
    }

    #[test]
    fn test_aabb_volume_inside_and_outside() {
        let volume = cube_volume(Vec3::ZERO, 10.0);
        let inside = Aabb::from_center_half_extents(Vec3::new(2.0, 2.0, 2.0), Vec3::ONE);
        let straddling = Aabb::from_center_half_extents(Vec3::new(10.5, 0.0, 0.0), Vec3::ONE);
        let outside = Aabb::from_center_half_extents(Vec3::new(20.0, 0.0, 0.0), Vec3::ONE);

        assert!(aabb_intersects_volume(&inside, &volume));
        assert!(aabb_intersects_volume(&straddling, &volume));
        assert!(!aabb_intersects_volume(&outside, &volume));
    }

    #[test]
    fn test_empty_aabb_never_intersects() {
        assert!(!aabb_intersects_volume(&Aabb::EMPTY, &cube_volume(Vec3::ZERO, 10.0)));
    }

    #[test]
    fn test_sphere_volume() {
        let volume = cube_volume(Vec3::ZERO, 10.0);
        assert!(sphere_intersects_volume(&Sphere::new(Vec3::ZERO, 1.0), &volume));
        assert!(sphere_intersects_volume(&Sphere::new(Vec3::new(14.0, 0.0, 0.0), 5.0), &volume));
        assert!(!sphere_intersects_volume(&Sphere::new(Vec3::new(16.0, 0.0, 0.0), 5.0), &volume));
    }

    #[test]
    fn test_empty_plane_list_accepts_everything() {
        assert!(aabb_intersects_volume(&Aabb::cube(1.0), &[]));
        assert!(sphere_intersects_volume(&Sphere::new(Vec3::ZERO, 1.0), &[]));
    }
}
