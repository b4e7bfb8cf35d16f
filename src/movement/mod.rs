//! Entity movement state machine.
//!
//! Movement options raise [`RequestTag`]s while they run; the active
//! [`MovementState`] turns the ones it has transitions for into queued
//! candidates, and the [`MovementStateMachine`] takes at most one of them at
//! each drain point.

pub mod body;
pub mod handler;
pub mod machine;
pub mod persist;
pub mod presets;
pub mod registry;
pub mod request;
pub mod state;
pub mod transition;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use body::{Contacts, PhysicsBody, SurfaceMaterial};
pub use handler::{BodySnapshot, CallbackToken, Clock, StateMovementHandler};
pub use machine::{MovementStateMachine, PendingTransition, StateListener, TransitionQueue};
pub use persist::{MachineData, GRAPH_FORMAT_VERSION};
pub use registry::{OptionDescriptor, OptionRegistry};
pub use request::{RequestCategory, RequestDescriptor, RequestTag};
pub use state::{MovementState, PriorityData, RequestPriority, StateData};
pub use transition::{Transition, TransitionData};

/// Durable id of a state, unique within its machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub u32);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
