//! Button actions and the bindings that attach them to keypad buttons.
//!
//! A button carries at most one action. Binding a button again replaces the
//! previous action, so one physical press never runs two actions.

use std::collections::HashMap;
use std::fmt;

use hearth_core::{ButtonNumber, SourceNumber, ZoneNumber};
use serde::{Deserialize, Serialize};

/// A transport cue sent to the controlled equipment.
///
/// Cues follow the button: they act on press and again on release, on the
/// port matching the button number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Up,
    Down,
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "Up"),
            Self::Down => write!(f, "Down"),
        }
    }
}

/// A one-shot action with no arguments of its own. Runs on press only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Route a source to a zone on the audio switcher.
    RouteSource { zone: ZoneNumber, source: SourceNumber },

    /// Mute every zone on the audio switcher.
    AllOff,
}

/// What a keypad button does.
///
/// In TOML:
///
/// ```toml
/// action = { cue = "up" }
/// action = { trigger = "all_off" }
/// action = { trigger = { route_source = { zone = 1, source = 3 } } }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    Trigger(Trigger),
    Cue(Cue),
}

impl From<Cue> for ButtonAction {
    fn from(cue: Cue) -> Self {
        Self::Cue(cue)
    }
}

impl From<Trigger> for ButtonAction {
    fn from(trigger: Trigger) -> Self {
        Self::Trigger(trigger)
    }
}

/// Identifies one registration in [`ButtonBindings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingToken(u64);

#[derive(Debug, Clone)]
struct Binding {
    token: BindingToken,
    action: ButtonAction,
}

/// Button number to action table.
///
/// # Examples
///
/// ```
/// use hearth_control::actions::{ButtonAction, ButtonBindings, Cue};
/// use hearth_core::ButtonNumber;
///
/// let mut bindings = ButtonBindings::new();
/// let up = ButtonNumber::new(1).unwrap();
///
/// let token = bindings.register(up, Cue::Up);
/// assert_eq!(bindings.action_for(up), Some(&ButtonAction::Cue(Cue::Up)));
///
/// assert!(bindings.release(token));
/// assert_eq!(bindings.action_for(up), None);
/// ```
#[derive(Debug, Default)]
pub struct ButtonBindings {
    bindings: HashMap<ButtonNumber, Binding>,
    next_token: u64,
}

impl ButtonBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `action` to `button`, replacing any earlier binding.
    pub fn register(
        &mut self,
        button: ButtonNumber,
        action: impl Into<ButtonAction>,
    ) -> BindingToken {
        let token = BindingToken(self.next_token);
        self.next_token += 1;
        self.bindings.insert(
            button,
            Binding {
                token,
                action: action.into(),
            },
        );
        token
    }

    /// Remove the binding made with `token`.
    ///
    /// Returns `false` if the binding was already released or replaced.
    pub fn release(&mut self, token: BindingToken) -> bool {
        let button = self
            .bindings
            .iter()
            .find_map(|(button, binding)| (binding.token == token).then_some(*button));

        match button {
            Some(button) => self.bindings.remove(&button).is_some(),
            None => false,
        }
    }

    /// Action bound to `button`, if any.
    pub fn action_for(&self, button: ButtonNumber) -> Option<&ButtonAction> {
        self.bindings.get(&button).map(|binding| &binding.action)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
