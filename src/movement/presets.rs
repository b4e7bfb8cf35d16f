use super::machine::MovementStateMachine;
use super::registry::OptionRegistry;
use super::request::RequestTag;
use crate::error::ConfigError;
use crate::options::{jump, planar, wall_grab, wall_run};
use crate::settings::MovementSettings;

pub const GROUNDED: &str = "Grounded";
pub const AIRBORNE: &str = "Airborne";
pub const WALL_RUNNING: &str = "WallRunning";
pub const WALL_GRABBING: &str = "WallGrabbing";

/// The stock parkour graph:
///
/// ```text
/// Grounded --Jump--> Airborne --WallRun--> WallRunning
///    ^                 |  ^  \--WallGrab--> WallGrabbing
///    +------Land-------+  +------Jump------ (both wall states)
/// ```
///
/// Both wall states also return to Grounded on `Land`.
pub fn default_graph(
    registry: OptionRegistry,
    settings: MovementSettings,
) -> Result<MovementStateMachine, ConfigError> {
    let mut m = MovementStateMachine::new(registry, settings);
    for kind in [planar::KIND, jump::KIND, wall_run::KIND, wall_grab::KIND] {
        m.add_general_option(kind)?;
    }

    let grounded = m.add_state(GROUNDED);
    let airborne = m.add_state(AIRBORNE);
    let wall_running = m.add_state(WALL_RUNNING);
    let wall_grabbing = m.add_state(WALL_GRABBING);
    m.set_initial_state(grounded)?;

    for kind in [planar::KIND, jump::KIND] {
        m.add_movement_option(grounded, kind)?;
    }
    for kind in [planar::KIND, jump::KIND, wall_run::KIND, wall_grab::KIND] {
        m.add_movement_option(airborne, kind)?;
    }
    for kind in [planar::KIND, jump::KIND, wall_run::KIND, wall_grab::KIND] {
        m.add_movement_option(wall_running, kind)?;
    }
    for kind in [planar::KIND, jump::KIND, wall_grab::KIND] {
        m.add_movement_option(wall_grabbing, kind)?;
    }

    // A grab beats a run started on the same tick.
    m.set_request_priority(airborne, RequestTag::WallGrab, -1)?;

    m.add_transition(grounded, airborne, RequestTag::Jump)?;
    m.add_transition(airborne, wall_running, RequestTag::WallRun)?;
    m.add_transition(airborne, wall_grabbing, RequestTag::WallGrab)?;
    m.add_transition(airborne, grounded, RequestTag::Land)?;
    m.add_transition(wall_running, airborne, RequestTag::Jump)?;
    m.add_transition(wall_running, wall_grabbing, RequestTag::WallGrab)?;
    m.add_transition(wall_running, grounded, RequestTag::Land)?;
    m.add_transition(wall_grabbing, airborne, RequestTag::Jump)?;
    m.add_transition(wall_grabbing, grounded, RequestTag::Land)?;

    m.validate()?;
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_graph_is_valid_and_starts_grounded() {
        let mut m = default_graph(OptionRegistry::builtin(), MovementSettings::default()).unwrap();
        m.start().unwrap();
        assert_eq!(m.current_state().unwrap().name(), GROUNDED);
        assert_eq!(m.states().count(), 4);
        assert_eq!(m.options().len(), 4);
    }
}
