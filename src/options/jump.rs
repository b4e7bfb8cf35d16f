use glam::Vec3;

use super::{Clocks, MovementOption, OptionId, Registrations, TickContext};
use crate::engine::input::Key;
use crate::movement::handler::StateMovementHandler;
use crate::movement::RequestTag;
use crate::settings::JumpSettings;

pub const KIND: &str = "jump";

/// Blend a contact normal toward world-up so that even jumps off a vertical
/// wall gain some height. A flat-ground normal comes back unchanged.
pub fn jump_direction(raw: Vec3, up: Vec3) -> Vec3 {
    (raw + up * (1.0 - raw.dot(up))).normalize_or(up)
}

/// Launch speed reaching `height` under `gravity_y` (negative is down).
pub fn jump_speed(gravity_y: f32, height: f32, multiplier: f32) -> f32 {
    (-2.0 * gravity_y * height * multiplier).max(0.0).sqrt()
}

/// Velocity to add for a jump. Speed already carried along `direction`
/// counts toward the jump, and the boost never goes negative.
pub fn jump_velocity_delta(velocity: Vec3, direction: Vec3, speed: f32) -> Vec3 {
    let aligned = velocity.dot(direction);
    let speed = if aligned > 0.0 {
        (speed - aligned).max(0.0)
    } else {
        speed
    };
    direction * speed
}

/// Ground, wall and air jumps.
///
/// `phase` counts jumps since the last refill: 0 on the ground, 1 after the
/// first jump (or after walking off a ledge), and so on up to
/// `max_air_jumps + 1`. Touching a wall or staying grounded for
/// `grounded_ticks_to_reset` physics ticks refills it.
pub struct JumpOption {
    settings: JumpSettings,
    registrations: Registrations,
    phase_multipliers: Vec<f32>,
    desired_jump: bool,
    phase: u32,
    grounded_ticks: u32,
    ticks_since_jump: u32,
}

impl JumpOption {
    pub fn new(settings: JumpSettings) -> Self {
        let mut option = Self {
            settings,
            registrations: Registrations::default(),
            phase_multipliers: Vec::new(),
            desired_jump: false,
            phase: 0,
            grounded_ticks: 0,
            ticks_since_jump: u32::MAX,
        };
        option.validate();
        option
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Latch a jump to be performed on the next physics tick.
    pub fn queue_jump(&mut self) {
        self.desired_jump = true;
    }

    fn phase_multiplier(&self, phase: u32) -> f32 {
        let last = self.phase_multipliers.len().saturating_sub(1);
        self.phase_multipliers
            .get((phase as usize).min(last))
            .copied()
            .unwrap_or(1.0)
    }

    /// Returns true if a jump happened.
    fn jump(&mut self, handler: &mut StateMovementHandler) -> bool {
        let contacts = *handler.contacts();
        let (raw, wall) = if contacts.on_ground() {
            (contacts.ground_normal, false)
        } else if contacts.on_steep() {
            self.phase = 0;
            (contacts.steep_normal, true)
        } else if self.settings.max_air_jumps > 0 && self.phase <= self.settings.max_air_jumps {
            if self.phase == 0 {
                self.phase = 1;
            }
            (contacts.last_normal, false)
        } else {
            return false;
        };

        let mut multiplier = self.phase_multiplier(self.phase);
        if wall {
            multiplier *= self.settings.wall_jump_bonus;
        }
        let speed = jump_speed(handler.gravity().y, self.settings.height, multiplier);
        let direction = jump_direction(raw, Vec3::Y);
        handler.add_velocity(jump_velocity_delta(handler.velocity(), direction, speed));

        self.ticks_since_jump = 0;
        self.phase += 1;
        true
    }
}

impl MovementOption for JumpOption {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn name(&self) -> &str {
        "Jump"
    }

    fn clocks(&self) -> Clocks {
        Clocks::Both
    }

    fn registrations_mut(&mut self) -> &mut Registrations {
        &mut self.registrations
    }

    fn transition_request(&self) -> RequestTag {
        RequestTag::Jump
    }

    fn validate(&mut self) {
        let falloff = self.settings.air_jump_falloff.max(0.0);
        self.phase_multipliers = (0..=self.settings.max_air_jumps + 1)
            .map(|phase| if phase <= 1 { 1.0 } else { falloff.powi(phase as i32 - 1) })
            .collect();
    }

    fn initialize(&mut self, id: OptionId, handler: &mut StateMovementHandler) {
        handler.set_snap_guard(Some(id));
        let clocks = self.clocks();
        self.registrations.register(id, clocks, handler);
    }

    fn stop(&mut self, handler: &mut StateMovementHandler) {
        if self.registrations.is_bound() {
            handler.set_snap_guard(None);
        }
        self.registrations.unregister_all(handler);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        if ctx.input.key_down(Key::Jump) {
            self.desired_jump = true;
        }
    }

    fn fixed_update(&mut self, ctx: &mut TickContext<'_>) {
        self.ticks_since_jump = self.ticks_since_jump.saturating_add(1);

        let contacts = *ctx.handler.contacts();
        if contacts.on_ground() {
            self.grounded_ticks = self.grounded_ticks.saturating_add(1);
            if self.grounded_ticks >= self.settings.grounded_ticks_to_reset
                && self.ticks_since_jump > 1
            {
                self.phase = 0;
            }
        } else {
            self.grounded_ticks = 0;
            if contacts.on_steep() {
                self.phase = 0;
            }
        }

        if std::mem::take(&mut self.desired_jump) && self.jump(ctx.handler) {
            self.request_state_change(ctx.handler);
        }
    }

    fn suppresses_ground_snap(&self) -> bool {
        self.ticks_since_jump <= self.settings.snap_cooldown_ticks
    }
}
