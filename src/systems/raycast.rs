use glam::Vec3;
use hecs::World;

use crate::components::{Collider, Position, Static};

pub struct RaycastHit {
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Cast a ray against all Static geometry, returning the nearest hit within max_distance.
/// Used by ground snapping to find the surface under the player.
pub fn raycast_static(
    world: &World,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<RaycastHit> {
    let dir = direction.normalize();
    let mut best: Option<RaycastHit> = None;

    for (_, (position, collider)) in world.query::<(&Position, &Collider)>().with::<&Static>().iter() {
        let hit = match *collider {
            Collider::Plane { normal, offset } => ray_plane_intersection(origin, dir, normal, offset)
                .map(|t| (t, normal)),
            Collider::Box { half_extents } => {
                ray_aabb_intersection(origin, dir, position.0, half_extents).map(|t| {
                    let point = origin + dir * t;
                    (t, aabb_face_normal(point, position.0, half_extents))
                })
            }
            Collider::Sphere { radius } => {
                ray_sphere_intersection(origin, dir, position.0, radius).map(|t| {
                    let point = origin + dir * t;
                    (t, (point - position.0).normalize_or(Vec3::Y))
                })
            }
        };

        if let Some((t, normal)) = hit {
            if t > 0.0 && t <= max_distance {
                let is_closer = best.as_ref().map_or(true, |b| t < b.distance);
                if is_closer {
                    best = Some(RaycastHit {
                        distance: t,
                        point: origin + dir * t,
                        normal,
                    });
                }
            }
        }
    }

    best
}

fn ray_plane_intersection(origin: Vec3, dir: Vec3, normal: Vec3, offset: f32) -> Option<f32> {
    let denom = dir.dot(normal);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (offset - origin.dot(normal)) / denom;
    (t > 0.0).then_some(t)
}

fn ray_sphere_intersection(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let a = dir.dot(dir);
    let b = 2.0 * oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) / (2.0 * a);
    let t2 = (-b + sqrt_d) / (2.0 * a);

    if t1 > 0.0 {
        Some(t1)
    } else if t2 > 0.0 {
        Some(t2)
    } else {
        None
    }
}

fn ray_aabb_intersection(origin: Vec3, dir: Vec3, center: Vec3, half: Vec3) -> Option<f32> {
    let min = center - half;
    let max = center + half;
    let inv_dir = Vec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);

    let t1 = (min.x - origin.x) * inv_dir.x;
    let t2 = (max.x - origin.x) * inv_dir.x;
    let t3 = (min.y - origin.y) * inv_dir.y;
    let t4 = (max.y - origin.y) * inv_dir.y;
    let t5 = (min.z - origin.z) * inv_dir.z;
    let t6 = (max.z - origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        return None;
    }
    // If tmin < 0, ray starts inside the box: return tmax
    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Outward normal of the box face closest to `point`.
fn aabb_face_normal(point: Vec3, center: Vec3, half: Vec3) -> Vec3 {
    let local = (point - center) / half;
    let abs = local.abs();
    if abs.x >= abs.y && abs.x >= abs.z {
        Vec3::X * local.x.signum()
    } else if abs.y >= abs.z {
        Vec3::Y * local.y.signum()
    } else {
        Vec3::Z * local.z.signum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downward_ray_hits_floor_plane() {
        let mut world = World::new();
        world.spawn((
            Position(Vec3::ZERO),
            Collider::Plane { normal: Vec3::Y, offset: 0.0 },
            Static,
        ));
        let hit = raycast_static(&world, Vec3::new(0.0, 0.8, 0.0), Vec3::NEG_Y, 1.0).unwrap();
        assert!((hit.distance - 0.8).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn nearest_hit_wins_and_reports_box_top_normal() {
        let mut world = World::new();
        world.spawn((
            Position(Vec3::ZERO),
            Collider::Plane { normal: Vec3::Y, offset: 0.0 },
            Static,
        ));
        world.spawn((
            Position(Vec3::new(0.0, 0.5, 0.0)),
            Collider::Box { half_extents: Vec3::splat(0.5) },
            Static,
        ));
        let hit = raycast_static(&world, Vec3::new(0.1, 2.0, 0.1), Vec3::NEG_Y, 5.0).unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn out_of_range_misses() {
        let mut world = World::new();
        world.spawn((
            Position(Vec3::ZERO),
            Collider::Plane { normal: Vec3::Y, offset: 0.0 },
            Static,
        ));
        assert!(raycast_static(&world, Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y, 1.0).is_none());
    }
}
