use std::path::PathBuf;

use thiserror::Error;

use crate::movement::StateId;

/// Fatal problems in a movement graph or its settings. Raised while loading,
/// editing or starting a machine; never recovered internally.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown transition request tag '{0}'")]
    UnknownRequest(String),
    #[error("unknown movement option type '{0}'")]
    UnknownOption(String),
    #[error("transition from state {from} targets missing state {to}")]
    UnresolvedState { from: StateId, to: StateId },
    #[error("state {0} does not exist")]
    MissingState(StateId),
    #[error("transition stored on state {owner} claims source state {claimed}")]
    MismatchedSource { owner: StateId, claimed: StateId },
    #[error("state {0} is the current state and cannot be removed")]
    StateInUse(StateId),
    #[error("duplicate state id {0}")]
    DuplicateState(StateId),
    #[error("state machine has no initial state")]
    NoInitialState,
    #[error("state machine has {count} initial states, expected exactly one")]
    MultipleInitialStates { count: usize },
    #[error("unsupported graph format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("failed to read/write file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while ticking a machine.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("state machine has not been started")]
    NotStarted,
}
