use std::collections::HashMap;

use super::request::RequestTag;
use crate::error::ConfigError;
use crate::options::{JumpOption, MovementOption, PlanarMovement, WallGrab, WallRun};
use crate::settings::MovementSettings;

/// Static description of a movement option kind: how to build it and which
/// requests it can raise.
#[derive(Clone, Copy)]
pub struct OptionDescriptor {
    pub kind: &'static str,
    pub display_name: &'static str,
    pub possible_requests: &'static [RequestTag],
    pub build: fn(&MovementSettings) -> Box<dyn MovementOption>,
}

impl std::fmt::Debug for OptionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionDescriptor")
            .field("kind", &self.kind)
            .field("possible_requests", &self.possible_requests)
            .finish()
    }
}

fn build_planar(settings: &MovementSettings) -> Box<dyn MovementOption> {
    Box::new(PlanarMovement::new(settings.planar.clone()))
}

fn build_jump(settings: &MovementSettings) -> Box<dyn MovementOption> {
    Box::new(JumpOption::new(settings.jump.clone()))
}

fn build_wall_grab(settings: &MovementSettings) -> Box<dyn MovementOption> {
    Box::new(WallGrab::new(settings.wall_grab.clone()))
}

fn build_wall_run(settings: &MovementSettings) -> Box<dyn MovementOption> {
    Box::new(WallRun::new(settings.wall_run.clone()))
}

pub const PLANAR: OptionDescriptor = OptionDescriptor {
    kind: crate::options::planar::KIND,
    display_name: "Planar movement",
    possible_requests: &[RequestTag::Land],
    build: build_planar,
};

pub const JUMP: OptionDescriptor = OptionDescriptor {
    kind: crate::options::jump::KIND,
    display_name: "Jump",
    possible_requests: &[RequestTag::Jump],
    build: build_jump,
};

pub const WALL_GRAB: OptionDescriptor = OptionDescriptor {
    kind: crate::options::wall_grab::KIND,
    display_name: "Wall grab",
    possible_requests: &[RequestTag::WallGrab],
    build: build_wall_grab,
};

pub const WALL_RUN: OptionDescriptor = OptionDescriptor {
    kind: crate::options::wall_run::KIND,
    display_name: "Wall run",
    possible_requests: &[RequestTag::WallRun],
    build: build_wall_run,
};

/// Maps stable option type names to constructors.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    descriptors: HashMap<&'static str, OptionDescriptor>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in option.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in [PLANAR, JUMP, WALL_GRAB, WALL_RUN] {
            registry.register(descriptor);
        }
        registry
    }

    pub fn register(&mut self, descriptor: OptionDescriptor) {
        self.descriptors.insert(descriptor.kind, descriptor);
    }

    pub fn get(&self, kind: &str) -> Result<&OptionDescriptor, ConfigError> {
        self.descriptors
            .get(kind)
            .ok_or_else(|| ConfigError::UnknownOption(kind.to_string()))
    }

    /// Construct and validate an option of `kind`.
    pub fn build(
        &self,
        kind: &str,
        settings: &MovementSettings,
    ) -> Result<Box<dyn MovementOption>, ConfigError> {
        let descriptor = self.get(kind)?;
        let mut option = (descriptor.build)(settings);
        option.validate();
        Ok(option)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.keys().copied()
    }
}
