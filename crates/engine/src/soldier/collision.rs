use crate::geometry::{Facing, Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionBoxKey {
    Walk,
    Run,
    Fire,
    Idle,
    Reload,
    Melee,
    MeleeAttack,
}

/// Unscaled box relative to the soldier's feet. `offset_x` is mirrored by facing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionBox {
    pub width: f32,
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl CollisionBox {
    pub const fn new(width: f32, height: f32, offset_x: f32, offset_y: f32) -> Self {
        Self {
            width,
            height,
            offset_x,
            offset_y,
        }
    }

    pub fn world_rect(&self, anchor: Vec2, facing: Facing, scale: f32) -> Rect {
        let center_x = anchor.x + self.offset_x * facing.sign() * scale;
        let width = self.width * scale;
        let height = self.height * scale;
        Rect {
            left: center_x - width / 2.0,
            top: anchor.y - height + self.offset_y * scale,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionBoxes {
    pub walk: CollisionBox,
    pub run: CollisionBox,
    pub fire: CollisionBox,
    pub idle: CollisionBox,
    pub reload: CollisionBox,
    pub melee: CollisionBox,
    pub melee_attack: CollisionBox,
}

impl Default for CollisionBoxes {
    fn default() -> Self {
        Self {
            walk: CollisionBox::new(20.0, 68.0, -5.0, 0.0),
            run: CollisionBox::new(28.0, 60.0, -5.0, 0.0),
            fire: CollisionBox::new(25.0, 63.0, -13.0, 0.0),
            idle: CollisionBox::new(20.0, 68.0, -5.0, 0.0),
            reload: CollisionBox::new(20.0, 68.0, -8.0, 0.0),
            melee: CollisionBox::new(20.0, 68.0, -8.0, 0.0),
            melee_attack: CollisionBox::new(20.0, 68.0, 12.0, 0.0),
        }
    }
}

impl CollisionBoxes {
    pub fn get(&self, key: CollisionBoxKey) -> CollisionBox {
        match key {
            CollisionBoxKey::Walk => self.walk,
            CollisionBoxKey::Run => self.run,
            CollisionBoxKey::Fire => self.fire,
            CollisionBoxKey::Idle => self.idle,
            CollisionBoxKey::Reload => self.reload,
            CollisionBoxKey::Melee => self.melee,
            CollisionBoxKey::MeleeAttack => self.melee_attack,
        }
    }
}

/// Body box priority: reload, fire, run, walk, idle. Melee never selects a
/// body box of its own; the melee strike uses `MeleeAttack` explicitly.
pub fn select_body_box(reloading: bool, firing: bool, running: bool, moving: bool) -> CollisionBoxKey {
    if reloading {
        CollisionBoxKey::Reload
    } else if firing {
        CollisionBoxKey::Fire
    } else if running {
        CollisionBoxKey::Run
    } else if moving {
        CollisionBoxKey::Walk
    } else {
        CollisionBoxKey::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_rect_anchors_box_above_feet() {
        let boxes = CollisionBoxes::default();
        let rect = boxes
            .get(CollisionBoxKey::Walk)
            .world_rect(Vec2::new(200.0, 300.0), Facing::Right, 2.0);
        assert_eq!(rect.left, 200.0 - 10.0 - 20.0);
        assert_eq!(rect.top, 300.0 - 136.0);
        assert_eq!(rect.width, 40.0);
        assert_eq!(rect.bottom(), 300.0);
    }

    #[test]
    fn facing_mirrors_horizontal_offset() {
        let fire = CollisionBoxes::default().fire;
        let right = fire.world_rect(Vec2::new(100.0, 100.0), Facing::Right, 1.0);
        let left = fire.world_rect(Vec2::new(100.0, 100.0), Facing::Left, 1.0);
        assert_eq!(right.left + right.width / 2.0, 87.0);
        assert_eq!(left.left + left.width / 2.0, 113.0);
    }

    #[test]
    fn body_box_priority_prefers_reload_then_fire() {
        assert_eq!(select_body_box(true, true, true, true), CollisionBoxKey::Reload);
        assert_eq!(select_body_box(false, true, true, true), CollisionBoxKey::Fire);
        assert_eq!(select_body_box(false, false, true, false), CollisionBoxKey::Run);
        assert_eq!(select_body_box(false, false, false, true), CollisionBoxKey::Walk);
        assert_eq!(select_body_box(false, false, false, false), CollisionBoxKey::Idle);
    }
}
