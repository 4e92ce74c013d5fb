use winit::event::MouseButton;
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ToggleRun,
    Reload,
    Melee,
    SpawnExplosion,
    SpawnFlame,
    DamageSoldier,
    NewGame,
    ToggleOverlay,
    Quit,
}

const ACTION_COUNT: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButtonKind {
    Primary,
    Secondary,
    Other,
}

impl From<MouseButton> for MouseButtonKind {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => MouseButtonKind::Primary,
            MouseButton::Right => MouseButtonKind::Secondary,
            _ => MouseButtonKind::Other,
        }
    }
}

/// Discrete input delivered to the game session, already stripped of key
/// repeats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(InputAction),
    KeyUp(InputAction),
    MouseDown(MouseButtonKind),
    MouseUp(MouseButtonKind),
    MouseMove { x: f32, y: f32 },
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::ToggleRun => 4,
            InputAction::Reload => 5,
            InputAction::Melee => 6,
            InputAction::SpawnExplosion => 7,
            InputAction::SpawnFlame => 8,
            InputAction::DamageSoldier => 9,
            InputAction::NewGame => 10,
            InputAction::ToggleOverlay => 11,
            InputAction::Quit => 12,
        }
    }
}

pub(crate) fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let action = match code {
        KeyCode::KeyW | KeyCode::ArrowUp => InputAction::MoveUp,
        KeyCode::KeyS | KeyCode::ArrowDown => InputAction::MoveDown,
        KeyCode::KeyA | KeyCode::ArrowLeft => InputAction::MoveLeft,
        KeyCode::KeyD | KeyCode::ArrowRight => InputAction::MoveRight,
        KeyCode::ControlLeft | KeyCode::ControlRight => InputAction::ToggleRun,
        KeyCode::KeyR => InputAction::Reload,
        KeyCode::KeyE => InputAction::Melee,
        KeyCode::Digit1 => InputAction::SpawnExplosion,
        KeyCode::Digit2 => InputAction::SpawnFlame,
        KeyCode::KeyK => InputAction::DamageSoldier,
        KeyCode::KeyN => InputAction::NewGame,
        KeyCode::F3 => InputAction::ToggleOverlay,
        KeyCode::Escape => InputAction::Quit,
        _ => return None,
    };
    Some(action)
}
