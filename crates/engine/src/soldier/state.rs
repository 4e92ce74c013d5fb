use crate::clock::{elapsed_ms, Millis};

/// The single visible action of a soldier, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionState {
    Meleeing,
    Reloading,
    Firing,
    Moving(MoveMode),
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveMode {
    Walk,
    Run,
}

impl ActionState {
    pub fn resolve(meleeing: bool, reloading: bool, firing: bool, moving: bool, running: bool) -> Self {
        if meleeing {
            ActionState::Meleeing
        } else if reloading {
            ActionState::Reloading
        } else if firing {
            ActionState::Firing
        } else if moving {
            ActionState::Moving(if running { MoveMode::Run } else { MoveMode::Walk })
        } else {
            ActionState::Idle
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionState::Meleeing => "meleeing",
            ActionState::Reloading => "reloading",
            ActionState::Firing => "firing",
            ActionState::Moving(MoveMode::Walk) => "walking",
            ActionState::Moving(MoveMode::Run) => "running",
            ActionState::Idle => "idle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementKeys {
    pub fn set(&mut self, direction: MoveDirection, is_down: bool) {
        match direction {
            MoveDirection::Up => self.up = is_down,
            MoveDirection::Down => self.down = is_down,
            MoveDirection::Left => self.left = is_down,
            MoveDirection::Right => self.right = is_down,
        }
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Which looping sheet drives the base (non-action) animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum BaseSequence {
    #[default]
    Walk,
    Run,
    Idle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FrameCursor {
    pub frame: usize,
    pub last_advance: Millis,
}

impl FrameCursor {
    pub(crate) fn restart(&mut self, now: Millis) {
        self.frame = 0;
        self.last_advance = now;
    }

    /// Advances one frame of a looping sequence when `interval_ms` has passed.
    pub(crate) fn advance_looping(&mut self, now: Millis, interval_ms: Millis, len: usize) -> bool {
        if elapsed_ms(now, self.last_advance) < interval_ms {
            return false;
        }
        self.last_advance = now;
        if len > 0 {
            self.frame = (self.frame + 1) % len;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FireState {
    pub active: bool,
    pub cursor: FrameCursor,
    pub last_shot: Option<Millis>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ReloadState {
    pub active: bool,
    pub cursor: FrameCursor,
    pub started_at: Millis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MeleeState {
    pub active: bool,
    pub cursor: FrameCursor,
    pub last_swing: Option<Millis>,
    pub hit_resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_follows_priority_order() {
        assert_eq!(ActionState::resolve(true, true, true, true, true), ActionState::Meleeing);
        assert_eq!(ActionState::resolve(false, true, true, true, true), ActionState::Reloading);
        assert_eq!(ActionState::resolve(false, false, true, true, true), ActionState::Firing);
        assert_eq!(
            ActionState::resolve(false, false, false, true, true),
            ActionState::Moving(MoveMode::Run)
        );
        assert_eq!(
            ActionState::resolve(false, false, false, true, false),
            ActionState::Moving(MoveMode::Walk)
        );
        assert_eq!(ActionState::resolve(false, false, false, false, true), ActionState::Idle);
    }

    #[test]
    fn frame_cursor_waits_for_interval_and_wraps() {
        let mut cursor = FrameCursor::default();
        cursor.restart(1_000);
        assert!(!cursor.advance_looping(1_099, 100, 3));
        assert!(cursor.advance_looping(1_100, 100, 3));
        assert_eq!(cursor.frame, 1);
        cursor.advance_looping(1_200, 100, 3);
        cursor.advance_looping(1_300, 100, 3);
        assert_eq!(cursor.frame, 0);
    }

    #[test]
    fn empty_sequence_keeps_frame_at_zero() {
        let mut cursor = FrameCursor::default();
        assert!(cursor.advance_looping(500, 100, 0));
        assert_eq!(cursor.frame, 0);
    }

    #[test]
    fn movement_keys_track_each_direction() {
        let mut keys = MovementKeys::default();
        assert!(!keys.any());
        keys.set(MoveDirection::Left, true);
        assert!(keys.left && keys.any());
        keys.set(MoveDirection::Left, false);
        assert!(!keys.any());
    }
}
