use thiserror::Error;
use tracing::{debug, warn};

use crate::app::{Canvas, Rgba};
use crate::clock::{IntervalTimer, Millis};
use crate::config::ProjectileTuning;
use crate::geometry::{Facing, Rect, Vec2};

use super::target::{DamageOutcome, Target};

const PROJECTILE_COLOR: Rgba = [255, 215, 0, 255];

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    position: Vec2,
    direction: Facing,
    speed: f32,
    damage: u32,
    width: f32,
    height: f32,
    active: bool,
}

impl Projectile {
    pub fn new(position: Vec2, direction: Facing, speed: f32, damage: u32, width: f32, height: f32) -> Self {
        Self {
            position,
            direction,
            speed,
            damage,
            width,
            height,
            active: true,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn direction(&self) -> Facing {
        self.direction
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn velocity_x(&self) -> f32 {
        self.speed * self.direction.sign()
    }

    fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.width, self.height)
    }
}

/// Playfield extents; projectiles further than `margin` outside are expired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayfieldBounds {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PlayfieldBounds {
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= -self.margin
            && point.x <= self.width + self.margin
            && point.y >= -self.margin
            && point.y <= self.height + self.margin
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectileFault {
    #[error("projectile {index} reached non-finite position ({x}, {y})")]
    NonFinitePosition { index: usize, x: f32, y: f32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub moved: usize,
    pub hits: usize,
    pub expired: usize,
    pub pruned: usize,
    pub faults: Vec<ProjectileFault>,
}

/// Live bullets of one soldier plus the fixed cadence that advances them,
/// independent of the soldier's own update.
#[derive(Debug, Clone)]
pub struct ProjectileSystem {
    projectiles: Vec<Projectile>,
    cadence: IntervalTimer,
    max_catch_up_steps: u32,
}

impl ProjectileSystem {
    pub fn new(tuning: &ProjectileTuning) -> Self {
        Self {
            projectiles: Vec::new(),
            cadence: IntervalTimer::new(tuning.step_ms),
            max_catch_up_steps: tuning.max_catch_up_steps.max(1),
        }
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.projectiles.iter().filter(|p| p.active).count()
    }

    pub fn is_cadence_running(&self) -> bool {
        self.cadence.is_running()
    }

    /// Adds a projectile and lazily starts the cadence.
    pub fn spawn(&mut self, projectile: Projectile, now: Millis) {
        self.projectiles.push(projectile);
        if self.cadence.start(now) {
            debug!(step_ms = self.cadence.interval_ms(), "projectile_cadence_started");
        }
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
        self.cadence.cancel();
    }

    /// Runs every cadence step that came due by `now`. Faults are logged per
    /// step and never stop the cadence.
    pub fn pump(&mut self, now: Millis, target: &mut Target, bounds: PlayfieldBounds) -> u32 {
        let steps = self.cadence.due_steps(now, self.max_catch_up_steps);
        let mut executed = 0;
        for _ in 0..steps {
            let report = self.step(target, bounds);
            executed += 1;
            for fault in &report.faults {
                warn!(error = %fault, "projectile_step_fault");
            }
            if !self.cadence.is_running() {
                break;
            }
        }
        executed
    }

    /// One cadence step: prune inactive projectiles, move the rest, resolve
    /// target hits, expire projectiles outside the bounds. Stops the cadence
    /// once nothing is left.
    pub fn step(&mut self, target: &mut Target, bounds: PlayfieldBounds) -> StepReport {
        let mut report = StepReport::default();
        let before = self.projectiles.len();
        self.projectiles.retain(|projectile| projectile.active);
        report.pruned = before - self.projectiles.len();

        for (index, projectile) in self.projectiles.iter_mut().enumerate() {
            projectile.position.x += projectile.velocity_x();
            report.moved += 1;

            if !projectile.position.is_finite() {
                projectile.active = false;
                report.faults.push(ProjectileFault::NonFinitePosition {
                    index,
                    x: projectile.position.x,
                    y: projectile.position.y,
                });
                continue;
            }

            if target.is_alive()
                && target.contains_point(projectile.position)
                && target.apply_damage(projectile.damage) != DamageOutcome::Ignored
            {
                projectile.active = false;
                report.hits += 1;
                continue;
            }

            if !bounds.contains(projectile.position) {
                projectile.active = false;
                report.expired += 1;
            }
        }

        if self.projectiles.is_empty() && self.cadence.cancel() {
            debug!("projectile_cadence_stopped");
        }
        report
    }

    pub fn draw(&self, canvas: &mut Canvas<'_>) {
        for projectile in self.projectiles.iter().filter(|p| p.active) {
            canvas.fill_rect(projectile.rect(), PROJECTILE_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetConfig;

    fn bounds() -> PlayfieldBounds {
        PlayfieldBounds {
            width: 1920.0,
            height: 1080.0,
            margin: 100.0,
        }
    }

    fn far_target() -> Target {
        Target::new(&TargetConfig {
            x: 5_000.0,
            y: 5_000.0,
            ..TargetConfig::default()
        })
    }

    fn bullet_at(x: f32, y: f32, direction: Facing) -> Projectile {
        Projectile::new(Vec2::new(x, y), direction, 15.0, 25, 10.0, 4.0)
    }

    #[test]
    fn moves_speed_per_step_without_changing_y() {
        let mut system = ProjectileSystem::new(&ProjectileTuning::default());
        let mut target = far_target();
        system.spawn(bullet_at(100.0, 200.0, Facing::Right), 0);
        for _ in 0..4 {
            system.step(&mut target, bounds());
        }
        let position = system.projectiles()[0].position();
        assert!((position.x - 160.0).abs() < 1e-4);
        assert_eq!(position.y, 200.0);

        system.spawn(bullet_at(100.0, 200.0, Facing::Left), 0);
        system.step(&mut target, bounds());
        assert!((system.projectiles()[1].position().x - 85.0).abs() < 1e-4);
    }

    #[test]
    fn hit_damages_once_then_prunes_next_step() {
        let mut system = ProjectileSystem::new(&ProjectileTuning::default());
        let mut target = Target::new(&TargetConfig::default());
        system.spawn(bullet_at(380.0, 480.0, Facing::Right), 0);

        let report = system.step(&mut target, bounds());
        assert_eq!(report.hits, 1);
        assert_eq!(target.health(), 75);
        assert!(!system.projectiles()[0].is_active());
        assert!(system.is_cadence_running());

        let report = system.step(&mut target, bounds());
        assert_eq!(report.pruned, 1);
        assert_eq!(report.hits, 0);
        assert_eq!(target.health(), 75);
        assert!(system.is_empty());
        assert!(!system.is_cadence_running());
    }

    #[test]
    fn projectile_passes_through_defeated_target() {
        let mut system = ProjectileSystem::new(&ProjectileTuning::default());
        let mut target = Target::new(&TargetConfig::default());
        target.apply_damage(100);
        system.spawn(bullet_at(380.0, 480.0, Facing::Right), 0);
        let report = system.step(&mut target, bounds());
        assert_eq!(report.hits, 0);
        assert!(system.projectiles()[0].is_active());
    }

    #[test]
    fn offscreen_projectiles_expire_past_margin() {
        let mut system = ProjectileSystem::new(&ProjectileTuning::default());
        let mut target = far_target();
        system.spawn(bullet_at(2_010.0, 500.0, Facing::Right), 0);
        let report = system.step(&mut target, bounds());
        assert_eq!(report.expired, 1);
        system.step(&mut target, bounds());
        assert!(system.is_empty());
    }

    #[test]
    fn non_finite_projectile_is_faulted_and_cadence_survives() {
        let mut system = ProjectileSystem::new(&ProjectileTuning::default());
        let mut target = far_target();
        system.spawn(bullet_at(f32::NAN, 10.0, Facing::Right), 0);
        system.spawn(bullet_at(100.0, 10.0, Facing::Right), 0);
        let report = system.step(&mut target, bounds());
        assert_eq!(report.faults.len(), 1);
        assert!(system.is_cadence_running());
        assert!(system.projectiles()[1].is_active());
    }

    #[test]
    fn pump_runs_due_steps_and_stops_when_empty() {
        let mut system = ProjectileSystem::new(&ProjectileTuning::default());
        let mut target = far_target();
        system.spawn(bullet_at(100.0, 10.0, Facing::Right), 0);
        assert_eq!(system.pump(15, &mut target, bounds()), 0);
        assert_eq!(system.pump(48, &mut target, bounds()), 3);
        assert!((system.projectiles()[0].position().x - 145.0).abs() < 1e-4);

        system.clear();
        assert!(!system.is_cadence_running());
        assert_eq!(system.pump(1_000, &mut target, bounds()), 0);
    }

    #[test]
    fn spawn_restarts_cadence_lazily() {
        let mut system = ProjectileSystem::new(&ProjectileTuning::default());
        let mut target = far_target();
        system.spawn(bullet_at(100.0, 10.0, Facing::Right), 0);
        system.clear();
        system.spawn(bullet_at(100.0, 10.0, Facing::Right), 500);
        assert!(system.is_cadence_running());
        assert_eq!(system.pump(515, &mut target, bounds()), 0);
        assert_eq!(system.pump(516, &mut target, bounds()), 1);
    }
}
