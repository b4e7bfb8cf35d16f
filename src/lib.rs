//! Parkour movement: a data-driven movement state machine, its built-in
//! movement options, and a small headless physics sandbox to drive them.

pub mod app;
pub mod components;
pub mod engine;
pub mod error;
pub mod movement;
pub mod options;
pub mod scene;
pub mod script;
pub mod settings;
pub mod systems;
