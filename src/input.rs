use crate::scale::ScaleLevel;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};

/// Navigation command produced by a key binding, UI button or script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleCommand {
    ScaleUp,
    ScaleDown,
    GoBack,
    JumpTo(ScaleLevel),
    JumpToMagnitude(i32),
    QualityUp,
    QualityDown,
}

/// Collects window input for one frame and turns bound key presses into commands.
pub struct ScaleInput {
    bindings: ScaleBindings,
    commands: Vec<ScaleCommand>,
    wheel: f32,
}

impl ScaleInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(path: impl AsRef<Path>) -> Self {
        Self::with_bindings(ScaleBindings::load_or_default(path))
    }

    fn with_bindings(bindings: ScaleBindings) -> Self {
        Self { bindings, commands: Vec::new(), wheel: 0.0 }
    }

    pub fn push(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key { key, pressed } => {
                if !pressed {
                    return;
                }
                if let Some(binding) = KeyBinding::from_event_key(&key) {
                    self.commands.extend(self.bindings.actions_for_key(&binding).map(InputAction::command));
                }
            }
            InputEvent::Wheel { delta } => {
                self.wheel += delta;
            }
            InputEvent::Other => {}
        }
    }

    /// Commands in the order their keys were pressed.
    pub fn drain_commands(&mut self) -> Vec<ScaleCommand> {
        self.commands.drain(..).collect()
    }

    pub fn consume_wheel_delta(&mut self) -> Option<f32> {
        if self.wheel.abs() > 0.0 {
            let d = self.wheel;
            self.wheel = 0.0;
            Some(d)
        } else {
            None
        }
    }

    pub fn clear_frame(&mut self) {
        self.commands.clear();
        self.wheel = 0.0;
    }
}

impl Default for ScaleInput {
    fn default() -> Self {
        Self::with_bindings(ScaleBindings::default())
    }
}

#[derive(Debug, Clone)]
struct ScaleBindings {
    key_to_actions: HashMap<KeyBinding, Vec<InputAction>>,
}

impl ScaleBindings {
    fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<BindingsFile>(&contents) {
                Ok(config) => Self::with_overrides(config.into_overrides(&path.display().to_string())),
                Err(err) => {
                    log::warn!(
                        target: "scale::input",
                        "[input] Failed to parse {}: {err}. Falling back to default bindings.",
                        path.display()
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    target: "scale::input",
                    "[input] Failed to read {}: {err}. Falling back to default bindings.",
                    path.display()
                );
                Self::default()
            }
        }
    }

    fn with_overrides(overrides: HashMap<InputAction, Vec<KeyBinding>>) -> Self {
        let mut action_map = Self::default_action_map();
        for (action, keys) in overrides {
            if keys.is_empty() {
                continue;
            }
            action_map.insert(action, keys);
        }
        Self::from_action_map(action_map)
    }

    fn default_action_map() -> HashMap<InputAction, Vec<KeyBinding>> {
        use InputAction::*;
        let mut map = HashMap::new();
        map.insert(
            ScaleUp,
            vec![KeyBinding::character("="), KeyBinding::character("+"), KeyBinding::Named(NamedKeyCode::PageUp)],
        );
        map.insert(ScaleDown, vec![KeyBinding::character("-"), KeyBinding::Named(NamedKeyCode::PageDown)]);
        map.insert(GoBack, vec![KeyBinding::Named(NamedKeyCode::Backspace)]);
        map.insert(QualityUp, vec![KeyBinding::character("]")]);
        map.insert(QualityDown, vec![KeyBinding::character("[")]);
        for (index, level) in ScaleLevel::ALL.into_iter().enumerate() {
            let digit = ((index + 1) % 10).to_string();
            map.insert(Jump(level), vec![KeyBinding::character(&digit)]);
        }
        map
    }

    fn from_action_map(action_map: HashMap<InputAction, Vec<KeyBinding>>) -> Self {
        let mut key_to_actions: HashMap<KeyBinding, Vec<InputAction>> = HashMap::new();
        for (action, keys) in action_map {
            for key in keys {
                key_to_actions.entry(key).or_default().push(action);
            }
        }
        Self { key_to_actions }
    }

    fn actions_for_key(&self, key: &KeyBinding) -> impl Iterator<Item = InputAction> + '_ {
        self.key_to_actions.get(key).into_iter().flatten().copied()
    }
}

impl Default for ScaleBindings {
    fn default() -> Self {
        Self::from_action_map(Self::default_action_map())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyBinding {
    Character(String),
    Named(NamedKeyCode),
}

impl KeyBinding {
    fn character(ch: &str) -> Self {
        Self::Character(ch.to_lowercase())
    }

    fn from_event_key(key: &Key) -> Option<Self> {
        match key {
            Key::Character(ch) => {
                let s = ch.to_string();
                if s.is_empty() {
                    None
                } else {
                    Some(Self::Character(s.to_lowercase()))
                }
            }
            Key::Named(named) => NamedKeyCode::from_named_key(named).map(Self::Named),
            _ => None,
        }
    }

    fn from_config_value(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = trimmed.to_lowercase();
        if let Some(named) = NamedKeyCode::parse(&normalized) {
            return Some(Self::Named(named));
        }
        if normalized.chars().count() == 1 {
            return Some(Self::Character(normalized));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NamedKeyCode {
    PageUp,
    PageDown,
    ArrowUp,
    ArrowDown,
    Backspace,
}

impl NamedKeyCode {
    fn from_named_key(key: &NamedKey) -> Option<Self> {
        match key {
            NamedKey::PageUp => Some(Self::PageUp),
            NamedKey::PageDown => Some(Self::PageDown),
            NamedKey::ArrowUp => Some(Self::ArrowUp),
            NamedKey::ArrowDown => Some(Self::ArrowDown),
            NamedKey::Backspace => Some(Self::Backspace),
            _ => None,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "page_up" | "pageup" => Some(Self::PageUp),
            "page_down" | "pagedown" => Some(Self::PageDown),
            "up" | "arrow_up" => Some(Self::ArrowUp),
            "down" | "arrow_down" => Some(Self::ArrowDown),
            "backspace" => Some(Self::Backspace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum InputAction {
    ScaleUp,
    ScaleDown,
    GoBack,
    QualityUp,
    QualityDown,
    Jump(ScaleLevel),
}

impl InputAction {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "scale_up" => Some(Self::ScaleUp),
            "scale_down" => Some(Self::ScaleDown),
            "go_back" => Some(Self::GoBack),
            "quality_up" => Some(Self::QualityUp),
            "quality_down" => Some(Self::QualityDown),
            other => other.strip_prefix("jump_").and_then(|level| level.parse().ok()).map(Self::Jump),
        }
    }

    fn command(self) -> ScaleCommand {
        match self {
            InputAction::ScaleUp => ScaleCommand::ScaleUp,
            InputAction::ScaleDown => ScaleCommand::ScaleDown,
            InputAction::GoBack => ScaleCommand::GoBack,
            InputAction::QualityUp => ScaleCommand::QualityUp,
            InputAction::QualityDown => ScaleCommand::QualityDown,
            InputAction::Jump(level) => ScaleCommand::JumpTo(level),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BindingsFile {
    #[serde(default)]
    bindings: HashMap<String, Vec<String>>,
}

impl BindingsFile {
    fn into_overrides(self, origin: &str) -> HashMap<InputAction, Vec<KeyBinding>> {
        let mut overrides = HashMap::new();
        for (action_name, keys) in self.bindings {
            let action_key = action_name.trim().to_lowercase();
            let Some(action) = InputAction::parse(&action_key) else {
                log::warn!(target: "scale::input", "[input] {origin}: unknown action '{action_name}', ignoring.");
                continue;
            };
            let mut parsed = Vec::new();
            for key in keys {
                match KeyBinding::from_config_value(&key) {
                    Some(binding) => parsed.push(binding),
                    None => log::warn!(
                        target: "scale::input",
                        "[input] {origin}: unknown key '{key}' for action '{action_name}', ignoring."
                    ),
                }
            }
            if parsed.is_empty() {
                log::warn!(
                    target: "scale::input",
                    "[input] {origin}: action '{action_name}' has no valid keys, keeping defaults."
                );
                continue;
            }
            overrides.insert(action, parsed);
        }
        overrides
    }
}

pub enum InputEvent {
    Key { key: Key, pressed: bool },
    Wheel { delta: f32 },
    Other,
}

impl InputEvent {
    pub fn from_window_event(ev: &WindowEvent) -> Self {
        match ev {
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                InputEvent::Wheel { delta: d }
            }
            WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
                key: event.logical_key.clone(),
                pressed: event.state == ElementState::Pressed,
            },
            _ => InputEvent::Other,
        }
    }
}
