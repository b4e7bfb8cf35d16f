use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for every built-in movement option. Missing fields fall back to
/// the compiled-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    pub planar: PlanarSettings,
    pub jump: JumpSettings,
    pub wall_grab: WallGrabSettings,
    pub wall_run: WallRunSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanarSettings {
    /// m/s
    pub max_speed: f32,
    /// m/s² while grounded.
    pub max_acceleration: f32,
    /// m/s² while airborne.
    pub max_air_acceleration: f32,
}

impl Default for PlanarSettings {
    fn default() -> Self {
        Self {
            max_speed: 10.0,
            max_acceleration: 40.0,
            max_air_acceleration: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpSettings {
    /// Apex height of a ground jump, metres.
    pub height: f32,
    pub max_air_jumps: u32,
    /// Height multiplier applied once per air jump already taken.
    pub air_jump_falloff: f32,
    /// Extra height multiplier for jumps off a steep surface.
    pub wall_jump_bonus: f32,
    /// Continuous grounded physics ticks before the air jumps are refilled.
    pub grounded_ticks_to_reset: u32,
    /// Physics ticks after a jump during which ground snapping stays off.
    pub snap_cooldown_ticks: u32,
}

impl Default for JumpSettings {
    fn default() -> Self {
        Self {
            height: 1.5,
            max_air_jumps: 1,
            air_jump_falloff: 0.75,
            wall_jump_bonus: 1.25,
            grounded_ticks_to_reset: 2,
            snap_cooldown_ticks: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallGrabSettings {
    /// Require the grab key; otherwise any wall contact grips.
    pub require_key: bool,
}

impl Default for WallGrabSettings {
    fn default() -> Self {
        Self { require_key: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallRunSettings {
    /// Minimum planar speed to start or keep running, m/s.
    pub min_speed: f32,
    /// How far past parallel (into the wall) the run direction may point, degrees.
    pub max_angle_degrees: f32,
    /// Seconds for the counter-gravity multiplier to decay from 1 to 0.
    pub duration: f32,
    /// Shape of the decay curve; 1 is linear.
    pub decay_exponent: f32,
}

impl Default for WallRunSettings {
    fn default() -> Self {
        Self {
            min_speed: 4.0,
            max_angle_degrees: 30.0,
            duration: 1.5,
            decay_exponent: 2.0,
        }
    }
}

impl MovementSettings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_json(path)
    }

    pub fn from_json(text: &str, context: &str) -> Result<Self, ConfigError> {
        parse_json(text, context)
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&text, &path.display().to_string())
}

fn parse_json<T: DeserializeOwned>(text: &str, context: &str) -> Result<T, ConfigError> {
    serde_json::from_str(text).map_err(|source| ConfigError::Json {
        context: context.to_string(),
        source,
    })
}

/// Tunables for the headless sandbox world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    /// Steepest slope still counted as ground, degrees.
    pub max_ground_angle_degrees: f32,
    /// Contacts closer than this count as touching without being pushed out.
    pub contact_skin: f32,
    /// Length of the downward ray used for ground snapping.
    pub snap_ray_distance: f32,
    /// Above this speed the body is allowed to leave the ground.
    pub max_snap_speed: f32,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            max_ground_angle_degrees: 40.0,
            contact_skin: 0.01,
            snap_ray_distance: 1.0,
            max_snap_speed: 12.0,
        }
    }
}

impl SandboxSettings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_json(path)
    }

    pub fn from_json(text: &str, context: &str) -> Result<Self, ConfigError> {
        parse_json(text, context)
    }

    pub fn min_ground_dot(&self) -> f32 {
        self.max_ground_angle_degrees.to_radians().cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let s = MovementSettings::from_json(r#"{"jump": {"height": 3.0}}"#, "test").unwrap();
        assert_eq!(s.jump.height, 3.0);
        assert_eq!(s.jump.max_air_jumps, JumpSettings::default().max_air_jumps);
        assert_eq!(s.wall_run, WallRunSettings::default());
    }

    #[test]
    fn malformed_json_reports_context() {
        let err = MovementSettings::from_json("{", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Json { ref context, .. } if context == "inline"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = MovementSettings::load(Path::new("/nonexistent/parkour.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn sandbox_settings_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sandbox.json");
        std::fs::write(&path, r#"{"max_snap_speed": 20.0}"#).unwrap();

        let s = SandboxSettings::load(&path).unwrap();
        assert_eq!(s.max_snap_speed, 20.0);
        assert_eq!(s.contact_skin, SandboxSettings::default().contact_skin);
    }
}
