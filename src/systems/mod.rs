mod collision;
mod physics;
mod player;
mod raycast;

pub use collision::{apply_grip, collision_system, sphere_vs_box, sphere_vs_plane, ContactPoint};
pub use physics::{physics_step, GRAVITY, PHYSICS_DT};
pub use player::{player_movement_system, snap_to_ground_system, PlayerBody};
pub use raycast::{raycast_static, RaycastHit};
