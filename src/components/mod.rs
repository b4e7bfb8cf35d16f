use glam::Vec3;

use crate::movement::SurfaceMaterial;

pub use crate::movement::Contacts;

/// World-space position of a body's center.
pub struct Position(pub Vec3);

/// Linear velocity in world space.
pub struct Velocity(pub Vec3);

/// Collision shape attached to an entity.
#[derive(Debug, Clone, Copy)]
pub enum Collider {
    Sphere { radius: f32 },
    Plane { normal: Vec3, offset: f32 },
    /// Axis-aligned box centered on the entity's position.
    Box { half_extents: Vec3 },
}

/// Marker: entity is immovable level geometry.
pub struct Static;

/// Marker: entity is affected by gravity.
pub struct GravityAffected;

/// Marker: this entity is the player.
pub struct Player;

/// Physics material the body currently uses.
pub struct Surface(pub SurfaceMaterial);

/// Physics ticks since the body last touched (or snapped to) the ground.
#[derive(Default)]
pub struct GroundTracker {
    pub ticks_since_grounded: u32,
}
