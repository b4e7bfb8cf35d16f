use glam::Vec3;
use hecs::{Entity, World};

use crate::components::*;
use crate::movement::SurfaceMaterial;

pub const PLAYER_RADIUS: f32 = 0.5;

/// Spawn the infinite ground plane at y = 0.
pub fn spawn_ground(world: &mut World) -> Entity {
    world.spawn((
        Position(Vec3::ZERO),
        Collider::Plane { normal: Vec3::Y, offset: 0.0 },
        Static,
    ))
}

/// Spawn a static box (axis-aligned). `pos` is the world-space center.
pub fn spawn_static_box(world: &mut World, pos: Vec3, half_extents: Vec3) -> Entity {
    world.spawn((Position(pos), Collider::Box { half_extents }, Static))
}

/// Spawn the player: a sphere body the movement machine drives.
pub fn spawn_player(world: &mut World, pos: Vec3) -> Entity {
    world.spawn((
        Player,
        Position(pos),
        Velocity(Vec3::ZERO),
        Collider::Sphere { radius: PLAYER_RADIUS },
        Contacts::default(),
        Surface(SurfaceMaterial::Default),
        GroundTracker::default(),
        GravityAffected,
    ))
}
