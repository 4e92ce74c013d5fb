use tracing::debug;

use crate::app::{Canvas, Rgba};
use crate::config::TargetConfig;
use crate::geometry::{Rect, Vec2};

use super::hud::health_color;

const TARGET_BODY_COLOR: Rgba = [139, 69, 19, 255];
const TARGET_DEAD_COLOR: Rgba = [90, 90, 90, 255];
const TARGET_OUTLINE_COLOR: Rgba = [0, 0, 0, 255];
const TARGET_BAR_BACK_COLOR: Rgba = [60, 60, 60, 255];
const TARGET_BAR_HEIGHT: f32 = 5.0;
const TARGET_BAR_GAP: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Ignored,
    Damaged { remaining: u32 },
    Defeated,
}

/// Stationary dummy hit by projectiles and melee strikes.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    center: Vec2,
    width: f32,
    height: f32,
    health: u32,
    max_health: u32,
    alive: bool,
}

impl Target {
    pub fn new(config: &TargetConfig) -> Self {
        Self {
            center: Vec2::new(config.x, config.y),
            width: config.width,
            height: config.height,
            health: config.max_health,
            max_health: config.max_health,
            alive: config.max_health > 0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.width, self.height)
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.rect().contains_point(point)
    }

    /// Only damage path for the target. Health floors at zero and the
    /// defeat transition happens exactly once.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Ignored;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.alive = false;
            debug!(damage = amount, "target_defeated");
            DamageOutcome::Defeated
        } else {
            debug!(damage = amount, remaining = self.health, "target_hit");
            DamageOutcome::Damaged {
                remaining: self.health,
            }
        }
    }

    pub fn draw(&self, canvas: &mut Canvas<'_>) {
        let body = self.rect();
        let color = if self.alive {
            TARGET_BODY_COLOR
        } else {
            TARGET_DEAD_COLOR
        };
        canvas.fill_rect(body, color);
        canvas.stroke_rect(body, 2.0, TARGET_OUTLINE_COLOR);

        if !self.alive {
            return;
        }
        let bar = Rect {
            left: body.left,
            top: body.top - TARGET_BAR_GAP - TARGET_BAR_HEIGHT,
            width: body.width,
            height: TARGET_BAR_HEIGHT,
        };
        canvas.fill_rect(bar, TARGET_BAR_BACK_COLOR);
        let ratio = self.health as f32 / self.max_health.max(1) as f32;
        canvas.fill_rect(
            Rect {
                width: bar.width * ratio,
                ..bar
            },
            health_color(ratio),
        );
    }
}
