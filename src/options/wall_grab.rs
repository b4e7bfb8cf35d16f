use super::{Clocks, MovementOption, Registrations, TickContext};
use crate::engine::input::Key;
use crate::movement::body::SurfaceMaterial;
use crate::movement::handler::StateMovementHandler;
use crate::movement::RequestTag;
use crate::settings::WallGrabSettings;

pub const KIND: &str = "wall_grab";

/// Switches the body to a gripping material while holding onto a wall.
pub struct WallGrab {
    settings: WallGrabSettings,
    registrations: Registrations,
    grab_held: bool,
    grabbing: bool,
}

impl WallGrab {
    pub fn new(settings: WallGrabSettings) -> Self {
        Self {
            settings,
            registrations: Registrations::default(),
            grab_held: false,
            grabbing: false,
        }
    }

    pub fn is_grabbing(&self) -> bool {
        self.grabbing
    }
}

impl MovementOption for WallGrab {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn name(&self) -> &str {
        "Wall grab"
    }

    fn clocks(&self) -> Clocks {
        Clocks::Both
    }

    fn registrations_mut(&mut self) -> &mut Registrations {
        &mut self.registrations
    }

    fn transition_request(&self) -> RequestTag {
        RequestTag::WallGrab
    }

    fn stop(&mut self, handler: &mut StateMovementHandler) {
        if self.registrations.is_bound() {
            handler.set_material(SurfaceMaterial::Default);
        }
        self.registrations.unregister_all(handler);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        self.grab_held = !self.settings.require_key || ctx.input.key_held(Key::Grab);
    }

    fn fixed_update(&mut self, ctx: &mut TickContext<'_>) {
        let grabbing = self.grab_held && ctx.handler.contacts().on_steep();
        ctx.handler.set_material(if grabbing {
            SurfaceMaterial::Grip
        } else {
            SurfaceMaterial::Default
        });

        if grabbing && !self.grabbing {
            self.request_state_change(ctx.handler);
        }
        self.grabbing = grabbing;
    }
}
