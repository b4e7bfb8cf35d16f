use glam::Vec3;
use hecs::{Entity, World};

use crate::scene::prefabs::{spawn_ground, spawn_player, spawn_static_box, PLAYER_RADIUS};

/// Face of the long wall the player runs along, on the x axis.
pub const WALL_FACE_X: f32 = 2.5;

/// Build the test level: a floor, one long wall to the player's right and a
/// low ledge straight ahead. Returns the player entity, resting on the floor.
pub fn load_test_scene(world: &mut World) -> Entity {
    spawn_ground(world);

    // Long wall: x in [2.5, 3.5], 4 m tall, running along +z
    spawn_static_box(
        world,
        Vec3::new(WALL_FACE_X + 0.5, 2.0, 15.0),
        Vec3::new(0.5, 2.0, 15.0),
    );

    // Low step off to the left, for snapping over its edge
    spawn_static_box(world, Vec3::new(-4.0, 0.15, 5.0), Vec3::new(1.0, 0.15, 3.0));

    spawn_player(world, Vec3::new(0.0, PLAYER_RADIUS, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Player, Position, Static};

    #[test]
    fn scene_has_one_player_on_the_floor() {
        let mut world = World::new();
        let player = load_test_scene(&mut world);

        assert_eq!(world.query::<&Player>().iter().count(), 1);
        assert_eq!(world.query::<&Static>().iter().count(), 3);
        assert_eq!(world.get::<&Position>(player).unwrap().0.y, PLAYER_RADIUS);
    }
}
