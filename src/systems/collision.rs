use glam::Vec3;
use hecs::World;

use crate::components::{Collider, Contacts, Position, Static, Surface, Velocity};
use crate::settings::SandboxSettings;

/// Surfaces whose normal points this far downward are ceilings and never
/// count as steep contacts.
const CEILING_DOT: f32 = -0.01;

/// One sphere-vs-static overlap. `normal` points from the static surface
/// toward the sphere center; `depth` is negative while the sphere hovers
/// within the contact skin.
#[derive(Debug, Clone, Copy)]
pub struct ContactPoint {
    pub normal: Vec3,
    pub depth: f32,
}

pub fn sphere_vs_plane(center: Vec3, radius: f32, normal: Vec3, offset: f32) -> ContactPoint {
    let dist = center.dot(normal) - offset;
    ContactPoint {
        normal,
        depth: radius - dist,
    }
}

pub fn sphere_vs_box(center: Vec3, radius: f32, box_center: Vec3, half: Vec3) -> ContactPoint {
    let min = box_center - half;
    let max = box_center + half;
    let closest = center.clamp(min, max);
    let diff = center - closest;
    let dist = diff.length();

    if dist > 1e-6 {
        return ContactPoint {
            normal: diff / dist,
            depth: radius - dist,
        };
    }

    // Center is inside the box: push out through the nearest face
    let local = center - box_center;
    let gaps = half - local.abs();
    let (axis, gap) = if gaps.x <= gaps.y && gaps.x <= gaps.z {
        (Vec3::X, gaps.x)
    } else if gaps.y <= gaps.z {
        (Vec3::Y, gaps.y)
    } else {
        (Vec3::Z, gaps.z)
    };
    let sign = if local.dot(axis) >= 0.0 { 1.0 } else { -1.0 };
    ContactPoint {
        normal: axis * sign,
        depth: radius + gap,
    }
}

/// Removes `grip` of the velocity's tangential part against `normal`.
pub fn apply_grip(velocity: &mut Vec3, normal: Vec3, grip: f32) {
    let tangent = *velocity - normal * velocity.dot(normal);
    *velocity -= tangent * grip.clamp(0.0, 1.0);
}

/// Resolve every dynamic sphere against static geometry and rebuild its
/// [`Contacts`].
pub fn collision_system(world: &mut World, settings: &SandboxSettings) {
    let statics: Vec<(Vec3, Collider)> = world
        .query::<(&Position, &Collider)>()
        .with::<&Static>()
        .iter()
        .map(|(_, (position, collider))| (position.0, *collider))
        .collect();

    let min_ground_dot = settings.min_ground_dot();

    for (_entity, (position, velocity, collider, contacts, surface)) in world
        .query_mut::<(
            &mut Position,
            &mut Velocity,
            &Collider,
            &mut Contacts,
            Option<&Surface>,
        )>()
        .without::<&Static>()
    {
        let Collider::Sphere { radius } = *collider else {
            continue;
        };
        let grip = surface.map_or(0.0, |s| s.0.grip());

        contacts.clear();
        for (static_position, static_collider) in &statics {
            let hit = match *static_collider {
                Collider::Plane { normal, offset } => {
                    sphere_vs_plane(position.0, radius, normal, offset)
                }
                Collider::Box { half_extents } => {
                    sphere_vs_box(position.0, radius, *static_position, half_extents)
                }
                Collider::Sphere { .. } => continue,
            };
            if hit.depth <= -settings.contact_skin {
                continue;
            }

            let n = hit.normal;
            if hit.depth > 0.0 {
                position.0 += n * hit.depth;
            }
            let vel_along_n = velocity.0.dot(n);
            if vel_along_n < 0.0 {
                velocity.0 -= vel_along_n * n;
            }
            if grip > 0.0 {
                apply_grip(&mut velocity.0, n, grip);
            }

            if n.y >= min_ground_dot {
                contacts.add_ground(n);
            } else if n.y > CEILING_DOT {
                contacts.add_steep(n);
            }
        }
        contacts.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::GravityAffected;
    use crate::movement::SurfaceMaterial;

    fn spawn_level(world: &mut World) {
        world.spawn((
            Position(Vec3::ZERO),
            Collider::Plane { normal: Vec3::Y, offset: 0.0 },
            Static,
        ));
        world.spawn((
            Position(Vec3::new(3.0, 2.0, 0.0)),
            Collider::Box { half_extents: Vec3::new(0.5, 2.0, 5.0) },
            Static,
        ));
    }

    fn spawn_ball(world: &mut World, at: Vec3, velocity: Vec3) -> hecs::Entity {
        world.spawn((
            Position(at),
            Velocity(velocity),
            Collider::Sphere { radius: 0.5 },
            Contacts::default(),
            Surface(SurfaceMaterial::Default),
            GravityAffected,
        ))
    }

    #[test]
    fn resting_on_plane_counts_as_ground() {
        let mut world = World::new();
        spawn_level(&mut world);
        let ball = spawn_ball(&mut world, Vec3::new(0.0, 0.45, 0.0), Vec3::new(0.0, -1.0, 0.0));
        collision_system(&mut world, &SandboxSettings::default());

        let contacts = *world.get::<&Contacts>(ball).unwrap();
        assert!(contacts.on_ground());
        assert!(!contacts.on_steep());
        assert!((world.get::<&Position>(ball).unwrap().0.y - 0.5).abs() < 1e-5);
        assert_eq!(world.get::<&Velocity>(ball).unwrap().0.y, 0.0);
    }

    #[test]
    fn wall_face_counts_as_steep() {
        let mut world = World::new();
        spawn_level(&mut world);
        let ball = spawn_ball(&mut world, Vec3::new(2.0, 2.0, 0.0), Vec3::new(1.0, 0.0, 3.0));
        collision_system(&mut world, &SandboxSettings::default());

        let contacts = *world.get::<&Contacts>(ball).unwrap();
        assert!(contacts.on_steep());
        assert!(!contacts.on_ground());
        assert!((contacts.steep_normal - Vec3::NEG_X).length() < 1e-5);
        // Into-wall component removed, along-wall component kept
        let velocity = world.get::<&Velocity>(ball).unwrap().0;
        assert_eq!(velocity.x, 0.0);
        assert_eq!(velocity.z, 3.0);
    }

    #[test]
    fn grip_material_stops_sliding_along_the_wall() {
        let mut world = World::new();
        spawn_level(&mut world);
        let ball = spawn_ball(&mut world, Vec3::new(2.0, 2.0, 0.0), Vec3::new(0.0, -2.0, 3.0));
        world.get::<&mut Surface>(ball).unwrap().0 = SurfaceMaterial::Grip;
        collision_system(&mut world, &SandboxSettings::default());

        let velocity = world.get::<&Velocity>(ball).unwrap().0;
        assert!(velocity.length() < 1e-5);
    }

    #[test]
    fn far_from_geometry_has_no_contacts() {
        let mut world = World::new();
        spawn_level(&mut world);
        let ball = spawn_ball(&mut world, Vec3::new(0.0, 3.0, 0.0), Vec3::ZERO);
        collision_system(&mut world, &SandboxSettings::default());

        let contacts = *world.get::<&Contacts>(ball).unwrap();
        assert!(!contacts.on_ground());
        assert!(!contacts.on_steep());
    }

    #[test]
    fn sphere_inside_box_exits_through_nearest_face() {
        let hit = sphere_vs_box(
            Vec3::new(2.6, 2.0, 0.0),
            0.5,
            Vec3::new(3.0, 2.0, 0.0),
            Vec3::new(0.5, 2.0, 5.0),
        );
        assert_eq!(hit.normal, Vec3::NEG_X);
        assert!((hit.depth - 0.6).abs() < 1e-5);
    }
}
