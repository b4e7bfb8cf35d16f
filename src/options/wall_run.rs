use glam::Vec2;

use super::{Clocks, MovementOption, Registrations, TickContext};
use crate::movement::body::Contacts;
use crate::movement::RequestTag;
use crate::settings::WallRunSettings;

pub const KIND: &str = "wall_run";

// Contact resolution leaves the into-wall component at roughly zero, not
// exactly zero.
const PARALLEL_TOLERANCE: f32 = 1e-3;

/// Observable wall-run progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallRunState {
    pub running: bool,
    /// Seconds the run condition has held without interruption.
    pub timer: f32,
    pub multiplier: f32,
}

/// Counters gravity while running along a wall, fading out over
/// `duration` seconds.
pub struct WallRun {
    settings: WallRunSettings,
    registrations: Registrations,
    /// `cos(90° + max_angle)`: lowest allowed dot between the planar run
    /// direction and the wall normal.
    min_wall_dot: f32,
    min_speed_sq: f32,
    state: WallRunState,
}

impl WallRun {
    pub fn new(settings: WallRunSettings) -> Self {
        let mut option = Self {
            settings,
            registrations: Registrations::default(),
            min_wall_dot: 0.0,
            min_speed_sq: 0.0,
            state: WallRunState {
                running: false,
                timer: 0.0,
                multiplier: 0.0,
            },
        };
        option.validate();
        option
    }

    pub fn state(&self) -> WallRunState {
        self.state
    }

    /// 1 at the start of a run, 0 once `duration` has elapsed.
    pub fn multiplier_at(&self, timer: f32) -> f32 {
        if self.settings.duration <= 0.0 {
            return 0.0;
        }
        (1.0 - timer / self.settings.duration)
            .clamp(0.0, 1.0)
            .powf(self.settings.decay_exponent)
    }

    fn condition(&self, velocity_xz: Vec2, contacts: &Contacts) -> bool {
        if contacts.on_ground() || !contacts.on_steep() {
            return false;
        }
        if velocity_xz.length_squared() < self.min_speed_sq {
            return false;
        }
        let wall_xz = Vec2::new(contacts.steep_normal.x, contacts.steep_normal.z);
        let dot = velocity_xz.normalize_or_zero().dot(wall_xz.normalize_or_zero());
        dot >= self.min_wall_dot && dot <= PARALLEL_TOLERANCE
    }
}

impl MovementOption for WallRun {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn name(&self) -> &str {
        "Wall run"
    }

    fn clocks(&self) -> Clocks {
        Clocks::Fixed
    }

    fn registrations_mut(&mut self) -> &mut Registrations {
        &mut self.registrations
    }

    fn transition_request(&self) -> RequestTag {
        RequestTag::WallRun
    }

    fn validate(&mut self) {
        let angle = self.settings.max_angle_degrees.clamp(0.0, 90.0);
        self.min_wall_dot = (90.0 + angle).to_radians().cos();
        self.min_speed_sq = self.settings.min_speed.max(0.0).powi(2);
    }

    fn fixed_update(&mut self, ctx: &mut TickContext<'_>) {
        let velocity = ctx.handler.velocity();
        let running = self.condition(Vec2::new(velocity.x, velocity.z), ctx.handler.contacts());

        if running {
            self.state.timer += ctx.dt;
            self.state.multiplier = self.multiplier_at(self.state.timer);
            let gravity = ctx.handler.gravity();
            ctx.handler
                .add_velocity(-gravity * self.state.multiplier * ctx.dt);
            if !self.state.running {
                self.request_state_change(ctx.handler);
            }
        } else {
            self.state.timer = 0.0;
            self.state.multiplier = 0.0;
        }
        self.state.running = running;
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::engine::input::InputState;
    use crate::movement::handler::StateMovementHandler;

    const DT: f32 = 0.08;

    fn wall_on_left() -> Contacts {
        // Wall at -X, so its normal points +X.
        let mut c = Contacts::default();
        c.add_steep(Vec3::X);
        c.finish();
        c
    }

    fn step(option: &mut WallRun, handler: &mut StateMovementHandler, contacts: Contacts) {
        handler.set_contacts(contacts);
        let input = InputState::new();
        let mut ctx = TickContext {
            handler,
            input: &input,
            dt: DT,
        };
        option.fixed_update(&mut ctx);
    }

    #[test]
    fn band_limit_is_cos_of_ninety_plus_angle() {
        let option = WallRun::new(WallRunSettings {
            max_angle_degrees: 30.0,
            ..WallRunSettings::default()
        });
        assert!((option.min_wall_dot - (-0.5)).abs() < 1e-5);
    }

    #[test]
    fn timer_resets_on_the_first_false_tick() {
        let mut option = WallRun::new(WallRunSettings::default());
        let mut handler = StateMovementHandler::new();
        handler.set_velocity(Vec3::new(0.0, 0.0, 8.0));

        for _ in 0..5 {
            step(&mut option, &mut handler, wall_on_left());
            handler.set_velocity(Vec3::new(0.0, 0.0, 8.0));
        }
        assert!((option.state().timer - 0.4).abs() < 1e-5);
        assert!(option.state().running);

        step(&mut option, &mut handler, Contacts::default());
        assert_eq!(option.state().timer, 0.0);
        assert!(!option.state().running);
    }

    #[test]
    fn requests_once_per_run() {
        let mut option = WallRun::new(WallRunSettings::default());
        let mut handler = StateMovementHandler::new();
        let mut seen = Vec::new();
        for contacts in [wall_on_left(), wall_on_left(), Contacts::default(), wall_on_left()] {
            handler.set_velocity(Vec3::new(0.0, 0.0, 8.0));
            step(&mut option, &mut handler, contacts);
            seen.push(handler.take_requests().len());
        }
        assert_eq!(seen, vec![1, 0, 0, 1]);
    }

    #[test]
    fn too_slow_or_away_from_wall_does_not_run() {
        let mut option = WallRun::new(WallRunSettings::default());
        let mut handler = StateMovementHandler::new();

        handler.set_velocity(Vec3::new(0.0, 0.0, 1.0));
        step(&mut option, &mut handler, wall_on_left());
        assert!(!option.state().running);

        // Moving away from the wall (along its normal).
        handler.set_velocity(Vec3::new(6.0, 0.0, 6.0));
        step(&mut option, &mut handler, wall_on_left());
        assert!(!option.state().running);

        // Angled 20° into the wall is inside the 30° band.
        let angle = 20f32.to_radians();
        handler.set_velocity(Vec3::new(-angle.sin(), 0.0, angle.cos()) * 8.0);
        step(&mut option, &mut handler, wall_on_left());
        assert!(option.state().running);
    }

    #[test]
    fn counter_gravity_fades_out() {
        let option = WallRun::new(WallRunSettings {
            duration: 1.0,
            decay_exponent: 1.0,
            ..WallRunSettings::default()
        });
        assert_eq!(option.multiplier_at(0.0), 1.0);
        assert!((option.multiplier_at(0.25) - 0.75).abs() < 1e-6);
        assert_eq!(option.multiplier_at(2.0), 0.0);
    }
}
