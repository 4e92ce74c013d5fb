//! The player-controlled soldier: movement, firing, reloading and melee with
//! strict mutual exclusion, frame-cadence animation, its bullets and the
//! practice target they are aimed at.
//!
//! Action priority for drawing: melee, reload, fire, moving, idle. Only one of
//! melee, reload or fire animation logic runs per update, in that order.

mod collision;
mod hud;
mod projectile;
mod sprites;
mod state;
mod target;

pub use collision::{select_body_box, CollisionBox, CollisionBoxKey, CollisionBoxes};
pub use hud::{ammo_color, health_color};
pub use projectile::{PlayfieldBounds, Projectile, ProjectileFault, ProjectileSystem, StepReport};
pub use sprites::{SoldierFrameCounts, SoldierSprites};
pub use state::{ActionState, MoveDirection, MoveMode, MovementKeys};
pub use target::{DamageOutcome, Target};

use std::rc::Rc;

use tracing::{debug, info};

use crate::app::{Canvas, Rgba};
use crate::assets::{FrameRect, SpriteSheet};
use crate::clock::{elapsed_ms, Millis};
use crate::config::{SoldierTuning, TargetConfig};
use crate::geometry::{Facing, Rect, Vec2};
use crate::pool::Animated;

use sprites::SoldierFrames;
use state::{BaseSequence, FireState, MeleeState, ReloadState};

const REFERENCE_SURFACE_WIDTH: f32 = 1920.0;
const DESKTOP_SCALE: f32 = 2.5;
const COMPACT_SURFACE_WIDTH: f32 = 720.0;
const COMPACT_SCALE: f32 = 1.2;
const COMPACT_MIN_SCALE: f32 = 1.5;
const FALLBACK_FIRE_CYCLE_FRAMES: usize = 4;

const FEET_MARKER_COLOR: Rgba = [255, 0, 0, 255];
const FRAME_OUTLINE_COLOR: Rgba = [0, 255, 0, 128];
const CENTER_LINE_COLOR: Rgba = [255, 255, 0, 160];
const COLLISION_OUTLINE_COLOR: Rgba = [255, 0, 0, 255];
const COLLISION_ANCHOR_COLOR: Rgba = [0, 0, 255, 255];
const DAMAGE_FLASH_COLOR: Rgba = [255, 0, 0, 255];

/// Render scale for a surface width: proportional to a 1920 px reference,
/// with a readable floor on narrow surfaces.
pub fn scale_for_surface_width(width: f32) -> f32 {
    let base = width / REFERENCE_SURFACE_WIDTH;
    if width <= COMPACT_SURFACE_WIDTH {
        (base * COMPACT_SCALE).max(COMPACT_MIN_SCALE)
    } else {
        base * DESKTOP_SCALE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
pub struct Soldier {
    tuning: SoldierTuning,
    position: Vec2,
    facing: Facing,
    health: u32,
    alive: bool,
    damage_flash_remaining: u32,
    keys: MovementKeys,
    moving: bool,
    running: bool,
    playing: bool,
    trigger_held: bool,
    cursor: Option<Vec2>,
    ammo: u32,
    sprites: SoldierSprites,
    frames: SoldierFrames,
    base_sequence: BaseSequence,
    base: state::FrameCursor,
    fire: FireState,
    reload: ReloadState,
    melee: MeleeState,
    surface: SurfaceSize,
    scale: f32,
    collision_boxes: CollisionBoxes,
    projectiles: ProjectileSystem,
    target: Target,
}

impl Soldier {
    pub fn new(
        tuning: &SoldierTuning,
        target: &TargetConfig,
        sprites: SoldierSprites,
        surface: SurfaceSize,
        position: Vec2,
        now: Millis,
    ) -> Self {
        let frames = SoldierFrames::slice(&sprites, tuning.frame_size);
        let base_sequence = if frames.idle.is_empty() {
            BaseSequence::Walk
        } else {
            BaseSequence::Idle
        };
        let mut base = state::FrameCursor::default();
        base.restart(now);
        Self {
            position,
            facing: Facing::Right,
            health: tuning.max_health,
            alive: true,
            damage_flash_remaining: 0,
            keys: MovementKeys::default(),
            moving: false,
            running: false,
            playing: false,
            trigger_held: false,
            cursor: None,
            ammo: tuning.magazine_size,
            sprites,
            frames,
            base_sequence,
            base,
            fire: FireState::default(),
            reload: ReloadState::default(),
            melee: MeleeState::default(),
            surface,
            scale: scale_for_surface_width(surface.width as f32),
            collision_boxes: CollisionBoxes::default(),
            projectiles: ProjectileSystem::new(&tuning.projectile),
            target: Target::new(target),
            tuning: tuning.clone(),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.tuning.max_health
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn magazine_size(&self) -> u32 {
        self.tuning.magazine_size
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_firing(&self) -> bool {
        self.fire.active
    }

    pub fn is_reloading(&self) -> bool {
        self.reload.active
    }

    pub fn is_meleeing(&self) -> bool {
        self.melee.active
    }

    pub fn trigger_held(&self) -> bool {
        self.trigger_held
    }

    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn damage_flash_remaining(&self) -> u32 {
        self.damage_flash_remaining
    }

    pub fn projectiles(&self) -> &ProjectileSystem {
        &self.projectiles
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn action_state(&self) -> ActionState {
        ActionState::resolve(
            self.melee.active,
            self.reload.active,
            self.fire.active,
            self.moving,
            self.running,
        )
    }

    pub fn collision_box_key(&self) -> CollisionBoxKey {
        select_body_box(self.reload.active, self.fire.active, self.running, self.moving)
    }

    pub fn collision_rect(&self) -> Rect {
        self.collision_boxes
            .get(self.collision_box_key())
            .world_rect(self.position, self.facing, self.scale)
    }

    pub fn melee_strike_rect(&self) -> Rect {
        self.collision_boxes
            .get(CollisionBoxKey::MeleeAttack)
            .world_rect(self.position, self.facing, self.scale)
    }

    pub fn check_collision(&self, point: Vec2) -> bool {
        self.collision_rect().contains_point(point)
    }

    pub fn playfield_bounds(&self) -> PlayfieldBounds {
        PlayfieldBounds {
            width: self.surface.width as f32,
            height: self.surface.height as f32,
            margin: self.tuning.projectile.offscreen_margin,
        }
    }

    pub fn set_surface_size(&mut self, surface: SurfaceSize) {
        self.surface = surface;
        self.scale = scale_for_surface_width(surface.width as f32);
    }

    pub fn set_cursor(&mut self, point: Vec2) {
        self.cursor = Some(point);
    }

    /// Key state is always recorded; the movement state only follows it while
    /// alive and not mid-swing.
    pub fn set_movement_key(&mut self, direction: MoveDirection, is_down: bool, now: Millis) {
        self.keys.set(direction, is_down);
        self.refresh_movement(now);
    }

    pub fn toggle_run(&mut self, now: Millis) {
        self.running = !self.running;
        if self.base_sequence != BaseSequence::Idle {
            let sequence = if self.running {
                BaseSequence::Run
            } else {
                BaseSequence::Walk
            };
            self.switch_base_sequence(sequence, now);
        }
        debug!(running = self.running, "soldier_run_toggled");
    }

    pub fn press_trigger(&mut self, now: Millis) {
        self.trigger_held = true;
        if self.alive && !self.melee.active {
            self.start_firing(now);
        }
    }

    pub fn release_trigger(&mut self, now: Millis) {
        self.trigger_held = false;
        self.stop_firing();
        if self.alive && self.ammo == 0 {
            self.start_reloading(now);
        }
    }

    /// Debug helper flipping the held trigger.
    pub fn toggle_firing(&mut self, now: Millis) -> bool {
        if self.trigger_held {
            self.release_trigger(now);
        } else {
            self.press_trigger(now);
        }
        self.trigger_held
    }

    pub fn start_firing(&mut self, now: Millis) -> bool {
        if !self.alive || self.melee.active || self.reload.active || self.fire.active {
            return false;
        }
        if self.ammo == 0 {
            self.start_reloading(now);
            return false;
        }
        if !self.fire_cooldown_elapsed(now) {
            return false;
        }
        self.fire.active = true;
        self.fire.cursor.restart(now);
        self.fire.last_shot = Some(now);
        self.playing = true;
        self.fire(now);
        true
    }

    pub fn stop_firing(&mut self) {
        self.fire.active = false;
        self.fire.cursor.frame = 0;
    }

    /// Spends one round and launches a projectile from the muzzle. An empty
    /// magazine ends the fire state and starts a reload instead.
    pub fn fire(&mut self, now: Millis) -> bool {
        if !self.alive {
            return false;
        }
        if self.ammo == 0 {
            self.stop_firing();
            self.start_reloading(now);
            return false;
        }
        self.ammo -= 1;

        let bullet = &self.tuning.projectile;
        let body = self.collision_boxes.get(self.collision_box_key());
        let origin = Vec2::new(
            self.position.x + self.facing.sign() * bullet.muzzle_offset * self.scale,
            self.position.y - body.height * self.scale * bullet.muzzle_height_ratio,
        );
        let projectile = Projectile::new(
            origin,
            self.facing,
            bullet.speed,
            bullet.damage,
            bullet.width * self.scale,
            bullet.height * self.scale,
        );
        self.projectiles.spawn(projectile, now);
        debug!(ammo = self.ammo, x = origin.x, y = origin.y, "soldier_fired");
        true
    }

    pub fn start_reloading(&mut self, now: Millis) -> bool {
        if self.reload.active || self.fire.active || !self.alive || self.melee.active {
            return false;
        }
        if self.ammo >= self.tuning.magazine_size {
            return false;
        }
        self.reload.active = true;
        self.reload.cursor.restart(now);
        self.reload.started_at = now;
        self.playing = true;
        info!(ammo = self.ammo, "soldier_reload_started");
        true
    }

    /// Ends an active reload with a full magazine. Returns whether a reload
    /// was running.
    pub fn stop_reloading(&mut self) -> bool {
        if !self.reload.active {
            return false;
        }
        self.reload.active = false;
        self.reload.cursor.frame = 0;
        self.ammo = self.tuning.magazine_size;
        true
    }

    pub fn start_melee(&mut self, now: Millis) -> bool {
        if !self.alive || self.melee.active {
            return false;
        }
        if let Some(last_swing) = self.melee.last_swing {
            if elapsed_ms(now, last_swing) < self.tuning.melee_cooldown_ms {
                return false;
            }
        }
        self.stop_firing();
        if self.stop_reloading() {
            debug!(ammo = self.ammo, "soldier_reload_interrupted");
        }
        self.melee.active = true;
        self.melee.cursor.restart(now);
        self.melee.last_swing = Some(now);
        self.melee.hit_resolved = false;
        self.playing = true;
        debug!("soldier_melee_started");
        true
    }

    /// Only damage path for the soldier. Health floors at zero; reaching it
    /// ends every action.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        self.damage_flash_remaining = self.tuning.damage_flash_draws;
        info!(damage = amount, remaining = self.health, "soldier_damaged");
        if self.health == 0 {
            self.alive = false;
            self.playing = false;
            self.moving = false;
            self.stop_firing();
            self.reload.active = false;
            self.melee.active = false;
            info!("soldier_died");
        }
        true
    }

    pub fn set_ammo(&mut self, count: u32) {
        self.ammo = count.min(self.tuning.magazine_size);
    }

    pub fn clear_projectiles(&mut self) {
        self.projectiles.clear();
    }

    /// Advances the projectile cadence; runs whether or not the soldier itself
    /// is being updated.
    pub fn pump_projectiles(&mut self, now: Millis) -> u32 {
        let bounds = self.playfield_bounds();
        self.projectiles.pump(now, &mut self.target, bounds)
    }

    pub fn reload_progress(&self, now: Millis) -> Option<f32> {
        self.reload.active.then(|| {
            let elapsed = elapsed_ms(now, self.reload.started_at) as f32;
            (elapsed / self.tuning.reload_time_ms.max(1) as f32).min(1.0)
        })
    }

    fn fire_cooldown_elapsed(&self, now: Millis) -> bool {
        self.fire
            .last_shot
            .map_or(true, |last| elapsed_ms(now, last) >= self.tuning.fire_cooldown_ms)
    }

    fn fire_cycle_len(&self) -> usize {
        if self.frames.fire.is_empty() {
            FALLBACK_FIRE_CYCLE_FRAMES
        } else {
            self.frames.fire.len()
        }
    }

    fn base_frames(&self) -> &[FrameRect] {
        match self.base_sequence {
            BaseSequence::Walk => &self.frames.walk,
            BaseSequence::Run => &self.frames.run,
            BaseSequence::Idle => &self.frames.idle,
        }
    }

    fn switch_base_sequence(&mut self, sequence: BaseSequence, now: Millis) {
        if self.base_sequence != sequence {
            self.base_sequence = sequence;
            self.base.restart(now);
        }
    }

    fn refresh_movement(&mut self, now: Millis) {
        if !self.alive || self.melee.active {
            return;
        }
        self.moving = self.keys.any();
        if self.moving {
            if self.keys.left != self.keys.right {
                self.facing = if self.keys.left {
                    Facing::Left
                } else {
                    Facing::Right
                };
            }
            let sequence = if self.running {
                BaseSequence::Run
            } else {
                BaseSequence::Walk
            };
            self.switch_base_sequence(sequence, now);
            self.playing = true;
        } else if !self.fire.active {
            if !self.frames.idle.is_empty() {
                self.switch_base_sequence(BaseSequence::Idle, now);
                self.playing = true;
            } else if !self.reload.active {
                self.playing = false;
            }
        }
    }

    fn advance_fire(&mut self, now: Millis) {
        let interval = self
            .tuning
            .fire_frame_ms
            .max(self.tuning.fire_frame_floor_ms);
        let len = self.fire_cycle_len();
        if !self.fire.cursor.advance_looping(now, interval, len) {
            return;
        }
        let frame = self.fire.cursor.frame;
        if frame == self.tuning.fire_release_frame && self.trigger_held {
            self.fire(now);
        }
        if frame == 0 && self.trigger_held && self.fire_cooldown_elapsed(now) {
            self.fire.last_shot = Some(now);
        }
    }

    fn advance_reload(&mut self, now: Millis) {
        if elapsed_ms(now, self.reload.started_at) >= self.tuning.reload_time_ms {
            self.stop_reloading();
            info!(ammo = self.ammo, "soldier_reload_completed");
            return;
        }
        let len = self.frames.reload.len();
        self.reload
            .cursor
            .advance_looping(now, self.tuning.reload_frame_ms, len);
    }

    fn advance_melee(&mut self, now: Millis) {
        let cursor = &mut self.melee.cursor;
        if elapsed_ms(now, cursor.last_advance) < self.tuning.melee_frame_ms {
            return;
        }
        cursor.frame += 1;
        cursor.last_advance = now;
        let frame = cursor.frame;

        if !self.melee.hit_resolved && frame >= self.tuning.melee_hit_frame {
            self.melee.hit_resolved = true;
            self.resolve_melee_hit();
        }
        if frame >= self.frames.melee.len() {
            self.finish_melee(now);
        }
    }

    fn resolve_melee_hit(&mut self) {
        let strike = self.melee_strike_rect();
        if self.target.is_alive() && strike.intersects(&self.target.rect()) {
            self.target.apply_damage(self.tuning.melee_damage);
        }
    }

    fn finish_melee(&mut self, now: Millis) {
        self.melee.active = false;
        self.melee.cursor.frame = 0;
        self.base.restart(now);
        self.playing = true;
        debug!("soldier_melee_finished");
        self.refresh_movement(now);
        if self.trigger_held && self.ammo > 0 {
            self.start_firing(now);
        }
    }

    fn advance_base(&mut self, now: Millis) {
        let interval = if self.running {
            self.tuning.run_frame_ms
        } else {
            self.tuning.walk_frame_ms
        };
        let len = self.base_frames().len();
        self.base.advance_looping(now, interval, len);
    }

    fn apply_movement(&mut self) {
        if self.moving {
            let speed = if self.fire.active {
                if self.tuning.strafe_while_firing {
                    self.tuning.firing_speed
                } else {
                    0.0
                }
            } else if self.running {
                self.tuning.run_speed
            } else {
                self.tuning.walk_speed
            };
            if self.keys.left {
                self.position.x -= speed;
            }
            if self.keys.right {
                self.position.x += speed;
            }
            if self.keys.up {
                self.position.y -= speed;
            }
            if self.keys.down {
                self.position.y += speed;
            }
        }
        self.clamp_to_surface();
    }

    fn clamp_to_surface(&mut self) {
        let sprite_size = self.tuning.frame_size as f32 * self.scale;
        let half_width = sprite_size / 2.0;
        let padding = self.tuning.edge_padding;
        let width = self.surface.width as f32;
        let height = self.surface.height as f32;
        self.position.x =
            (padding + half_width).max((width - padding - half_width).min(self.position.x));
        self.position.y = (padding + sprite_size).max((height - padding).min(self.position.y));
    }

    fn current_frame(&self) -> Option<(&SpriteSheet, FrameRect)> {
        fn looping<'a>(
            sheet: &'a Option<Rc<SpriteSheet>>,
            frames: &[FrameRect],
            index: usize,
        ) -> Option<(&'a SpriteSheet, FrameRect)> {
            let sheet = sheet.as_deref()?;
            let frame = *frames.get(index % frames.len().max(1))?;
            Some((sheet, frame))
        }

        let sprites = &self.sprites;
        let frames = &self.frames;
        if self.melee.active && !frames.melee.is_empty() {
            let index = self.melee.cursor.frame.min(frames.melee.len() - 1);
            if let Some(found) = looping(&sprites.melee, &frames.melee, index) {
                return Some(found);
            }
        }
        if self.reload.active {
            if let Some(found) = looping(&sprites.reload, &frames.reload, self.reload.cursor.frame) {
                return Some(found);
            }
        }
        if self.fire.active {
            if let Some(found) = looping(&sprites.fire, &frames.fire, self.fire.cursor.frame) {
                return Some(found);
            }
        }
        let (travel_sheet, travel_frames) = if self.running {
            (&sprites.run, &frames.run)
        } else {
            (&sprites.walk, &frames.walk)
        };
        if self.moving {
            return looping(travel_sheet, travel_frames, self.base.frame);
        }
        looping(&sprites.idle, &frames.idle, self.base.frame)
            .or_else(|| looping(travel_sheet, travel_frames, self.base.frame))
    }

    fn sprite_rect(&self) -> Rect {
        let size = self.tuning.frame_size as f32 * self.scale;
        Rect {
            left: self.position.x - size / 2.0,
            top: self.position.y - size,
            width: size,
            height: size,
        }
    }

    fn draw_debug_geometry(&self, canvas: &mut Canvas<'_>, sprite_rect: Rect) {
        canvas.stroke_rect(sprite_rect, 1.0, FRAME_OUTLINE_COLOR);
        canvas.fill_rect(
            Rect {
                left: self.position.x,
                top: sprite_rect.top,
                width: 1.0,
                height: sprite_rect.height,
            },
            CENTER_LINE_COLOR,
        );

        let body = self.collision_rect();
        canvas.stroke_rect(body, 2.0, COLLISION_OUTLINE_COLOR);
        canvas.fill_rect(
            Rect::from_center(Vec2::new(body.left + body.width / 2.0, body.bottom()), 4.0, 4.0),
            COLLISION_ANCHOR_COLOR,
        );
        canvas.fill_rect(Rect::from_center(self.position, 4.0, 4.0), FEET_MARKER_COLOR);
    }
}

impl Animated for Soldier {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn is_loaded(&self) -> bool {
        self.sprites.is_loaded()
    }

    /// Dead soldiers stay registered so the body and HUD keep rendering.
    fn update(&mut self, now: Millis) -> bool {
        if !self.is_loaded() || !self.alive {
            return true;
        }
        if self.melee.active {
            self.advance_melee(now);
        } else if self.reload.active {
            self.advance_reload(now);
        } else if self.fire.active {
            self.advance_fire(now);
        }
        self.advance_base(now);
        self.apply_movement();
        true
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, now: Millis) {
        if !self.is_loaded() {
            return;
        }
        self.set_surface_size(SurfaceSize {
            width: canvas.width(),
            height: canvas.height(),
        });
        let flashing = self.damage_flash_remaining > 0;
        if flashing {
            self.damage_flash_remaining -= 1;
        }

        let sprite_rect = self.sprite_rect();
        if let Some((sheet, frame)) = self.current_frame() {
            canvas.draw_sprite(sheet, frame, sprite_rect, self.facing.is_left());
        }
        if flashing {
            canvas.stroke_rect(sprite_rect, 2.0, DAMAGE_FLASH_COLOR);
        }
        self.draw_debug_geometry(canvas, sprite_rect);
        self.projectiles.draw(canvas);
        self.target.draw(canvas);
        hud::draw_health_bar(
            canvas,
            self.position,
            self.scale,
            sprite_rect.height,
            self.health,
            self.tuning.max_health,
        );
        hud::draw_ammo_counter(canvas, self.ammo, self.tuning.magazine_size);
        if let Some(progress) = self.reload_progress(now) {
            hud::draw_reload_progress(canvas, self.position, self.scale, progress);
        }
    }

    fn cleanup(&mut self) {
        self.projectiles.clear();
        self.trigger_held = false;
        self.stop_firing();
        debug!("soldier_cleaned_up");
    }
}
