use std::path::Path;

use serde::{Deserialize, Serialize};

use super::machine::MovementStateMachine;
use super::registry::OptionRegistry;
use super::state::{MovementState, StateData};
use crate::error::ConfigError;
use crate::settings::MovementSettings;

pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// Flat, versioned form of a whole movement graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineData {
    pub version: u32,
    pub general_options: Vec<String>,
    pub states: Vec<StateData>,
}

impl MachineData {
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            context: "movement graph".to_string(),
            source,
        })
    }

    pub fn from_json(text: &str, context: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Json {
            context: context.to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, &path.display().to_string())
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = self.to_json()?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl MovementStateMachine {
    pub fn to_data(&self) -> MachineData {
        MachineData {
            version: GRAPH_FORMAT_VERSION,
            general_options: self
                .general_options()
                .iter()
                .map(|k| k.to_string())
                .collect(),
            states: self.states().map(MovementState::to_data).collect(),
        }
    }

    /// Rebuild a machine from its saved form. The result is validated but
    /// not started.
    pub fn from_data(
        data: &MachineData,
        registry: OptionRegistry,
        settings: MovementSettings,
    ) -> Result<Self, ConfigError> {
        if data.version != GRAPH_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: data.version,
                expected: GRAPH_FORMAT_VERSION,
            });
        }

        let mut machine = MovementStateMachine::new(registry, settings);
        for kind in &data.general_options {
            machine.add_general_option(kind)?;
        }
        for state_data in &data.states {
            let state = MovementState::from_data(state_data, machine.registry())?;
            for kind in state.movement_options() {
                machine.add_general_option(kind)?;
            }
            machine.insert_loaded_state(state)?;
        }
        machine.validate()?;
        Ok(machine)
    }
}
