use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use hecs::{Entity, World};
use tracing::{debug, info};

use crate::components::{Contacts, Position, Velocity};
use crate::engine::input::InputState;
use crate::engine::time::FixedStepClock;
use crate::error::MachineError;
use crate::movement::{MovementState, MovementStateMachine, StateListener};
use crate::scene::test_scene::load_test_scene;
use crate::script::InputScript;
use crate::settings::SandboxSettings;
use crate::systems::{physics_step, player_movement_system, snap_to_ground_system, PHYSICS_DT};

/// One state change seen by the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    pub from: Option<String>,
    pub to: String,
}

/// Listener that appends every entered state to a shared list.
#[derive(Clone, Default)]
pub struct TransitionLog {
    records: Rc<RefCell<Vec<TransitionRecord>>>,
}

impl TransitionLog {
    pub fn records(&self) -> Vec<TransitionRecord> {
        self.records.borrow().clone()
    }
}

impl StateListener for TransitionLog {
    fn on_enter(&mut self, state: &MovementState, previous: Option<&MovementState>) {
        self.records.borrow_mut().push(TransitionRecord {
            from: previous.map(|p| p.name().to_string()),
            to: state.name().to_string(),
        });
    }
}

/// What a sandbox run ended with.
#[derive(Debug, Clone)]
pub struct SandboxReport {
    pub frames: u32,
    pub physics_ticks: u32,
    pub final_state: Option<String>,
    pub final_position: Vec3,
    pub final_velocity: Vec3,
    pub transitions: Vec<TransitionRecord>,
}

/// Headless world driving one player through a movement machine.
pub struct SandboxApp {
    world: World,
    player_entity: Entity,
    machine: MovementStateMachine,
    input: InputState,
    clock: FixedStepClock,
    script: InputScript,
    settings: SandboxSettings,
    elapsed: f32,
    frames: u32,
    physics_ticks: u32,
    log: TransitionLog,
}

impl SandboxApp {
    /// Build the test level and start `machine` in it. Attach listeners
    /// before calling this to see the initial state being entered.
    pub fn new(
        mut machine: MovementStateMachine,
        script: InputScript,
        settings: SandboxSettings,
    ) -> Result<Self, MachineError> {
        let mut world = World::new();
        let player_entity = load_test_scene(&mut world);

        let log = TransitionLog::default();
        machine.add_listener(Box::new(log.clone()));
        machine.start()?;

        Ok(Self {
            world,
            player_entity,
            machine,
            input: InputState::new(),
            clock: FixedStepClock::new(PHYSICS_DT),
            script,
            settings,
            elapsed: 0.0,
            frames: 0,
            physics_ticks: 0,
            log,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player_entity(&self) -> Entity {
        self.player_entity
    }

    pub fn machine(&self) -> &MovementStateMachine {
        &self.machine
    }

    pub fn transitions(&self) -> Vec<TransitionRecord> {
        self.log.records()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn player_position(&self) -> Vec3 {
        self.world
            .get::<&Position>(self.player_entity)
            .map(|p| p.0)
            .unwrap_or(Vec3::ZERO)
    }

    pub fn player_velocity(&self) -> Vec3 {
        self.world
            .get::<&Velocity>(self.player_entity)
            .map(|v| v.0)
            .unwrap_or(Vec3::ZERO)
    }

    pub fn player_contacts(&self) -> Contacts {
        self.world
            .get::<&Contacts>(self.player_entity)
            .map(|c| *c)
            .unwrap_or_default()
    }

    /// One rendered frame: scripted input, the variable tick, then as many
    /// fixed physics ticks as the clock owes.
    pub fn frame(&mut self, dt: f32) -> Result<(), MachineError> {
        self.input.begin_frame();
        self.script.apply(self.elapsed, self.elapsed + dt, &mut self.input);

        self.machine.update(&self.input, dt)?;

        let steps = self.clock.advance(dt);
        for _ in 0..steps {
            self.physics_tick()?;
        }

        self.elapsed += dt;
        self.frames += 1;
        Ok(())
    }

    fn physics_tick(&mut self) -> Result<(), MachineError> {
        let prevented = self.machine.player_action_prevents_ground_snapping();
        if snap_to_ground_system(&mut self.world, self.player_entity, &self.settings, prevented) {
            debug!(tick = self.physics_ticks, "ground_snap");
        }
        player_movement_system(
            &mut self.world,
            self.player_entity,
            &mut self.machine,
            &self.input,
            PHYSICS_DT,
        )?;
        physics_step(&mut self.world, &self.settings);
        self.physics_ticks += 1;
        Ok(())
    }

    /// Run at a fixed frame rate for `seconds` of simulated time.
    pub fn run(&mut self, seconds: f32, frame_rate: f32) -> Result<SandboxReport, MachineError> {
        let dt = 1.0 / frame_rate.max(1.0);
        let frames = (seconds.max(0.0) * frame_rate.max(1.0)).round() as u32;
        info!(frames, dt, "sandbox_start");

        for _ in 0..frames {
            self.frame(dt)?;
        }

        let report = self.report();
        info!(
            frames = report.frames,
            physics_ticks = report.physics_ticks,
            final_state = report.final_state.as_deref().unwrap_or("<none>"),
            transitions = report.transitions.len(),
            "sandbox_finished"
        );
        Ok(report)
    }

    pub fn report(&self) -> SandboxReport {
        SandboxReport {
            frames: self.frames,
            physics_ticks: self.physics_ticks,
            final_state: self.machine.current_state().map(|s| s.name().to_string()),
            final_position: self.player_position(),
            final_velocity: self.player_velocity(),
            transitions: self.transitions(),
        }
    }
}
