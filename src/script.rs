//! Timed input scripts that stand in for a player at the keyboard.

use glam::Vec2;

use crate::engine::input::{InputState, Key};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptAction {
    Press(Key),
    Release(Key),
    Move(Vec2),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptEvent {
    pub at: f32,
    pub action: ScriptAction,
}

/// Input events ordered by time.
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    events: Vec<ScriptEvent>,
}

impl InputScript {
    pub fn new(mut events: Vec<ScriptEvent>) -> Self {
        events.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { events }
    }

    pub fn events(&self) -> &[ScriptEvent] {
        &self.events
    }

    /// Apply every event in `[from, to)` to `input`, in order.
    pub fn apply(&self, from: f32, to: f32, input: &mut InputState) {
        for event in self.events.iter().filter(|e| e.at >= from && e.at < to) {
            match event.action {
                ScriptAction::Press(key) => input.press(key),
                ScriptAction::Release(key) => input.release(key),
                ScriptAction::Move(axis) => input.set_move_axis(axis),
            }
        }
    }
}

/// Canned scripts for the sandbox binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Scenario {
    /// Stand still.
    Idle,
    /// Jump in place once.
    Hop,
    /// Run along the wall, jump and drift into it.
    WallRun,
    /// Same approach as `wall-run` while holding grab.
    WallGrab,
}

impl Scenario {
    pub fn script(self) -> InputScript {
        use ScriptAction::*;

        let event = |at: f32, action| ScriptEvent { at, action };
        let approach = |grab: bool| {
            let mut events = vec![
                event(0.0, Move(Vec2::new(0.0, 1.0))),
                event(0.6, Move(Vec2::new(0.6, 0.8))),
                event(0.6, Press(Key::Jump)),
                event(0.7, Release(Key::Jump)),
            ];
            if grab {
                events.push(event(0.6, Press(Key::Grab)));
            }
            events
        };

        match self {
            Scenario::Idle => InputScript::default(),
            Scenario::Hop => InputScript::new(vec![
                event(0.5, Press(Key::Jump)),
                event(0.6, Release(Key::Jump)),
            ]),
            Scenario::WallRun => InputScript::new(approach(false)),
            Scenario::WallGrab => InputScript::new(approach(true)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::InputSource;

    #[test]
    fn apply_fires_events_in_window_only() {
        let script = Scenario::Hop.script();
        let mut input = InputState::new();

        script.apply(0.0, 0.5, &mut input);
        assert!(!input.key_held(Key::Jump));

        script.apply(0.5, 0.55, &mut input);
        assert!(input.key_down(Key::Jump));
        assert!(input.key_held(Key::Jump));

        input.begin_frame();
        script.apply(0.55, 0.65, &mut input);
        assert!(!input.key_held(Key::Jump));
    }

    #[test]
    fn events_are_sorted() {
        let script = Scenario::WallGrab.script();
        assert!(script.events().windows(2).all(|w| w[0].at <= w[1].at));
        assert!(script
            .events()
            .iter()
            .any(|e| e.action == ScriptAction::Press(Key::Grab)));
    }
}
