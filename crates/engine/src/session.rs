//! Game-level orchestration: owns the clock, the animation pool and the
//! current soldier, routes input and drives one scheduling frame per tick.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::app::{Canvas, InputAction, InputEvent, MouseButtonKind};
use crate::assets::{SpriteStore, BACKGROUND_KEY};
use crate::clock::{Clock, Millis, Timeout};
use crate::config::GameConfig;
use crate::effects::{
    load_effect_frames, Explosion, Flame, FramePlayback, EXPLOSION_KEY_PREFIX, FLAME_KEY_PREFIX,
};
use crate::geometry::Vec2;
use crate::pool::{AnimationId, Animated, AnimationPool, PoolCategory};
use crate::soldier::{MoveDirection, Soldier, SoldierSprites, SurfaceSize};

pub struct GameSession {
    clock: Box<dyn Clock>,
    config: GameConfig,
    sprites: SpriteStore,
    pool: AnimationPool,
    current_soldier: Option<AnimationId>,
    pending_spawn: Timeout<Vec2>,
    surface: SurfaceSize,
    rng: StdRng,
}

impl GameSession {
    pub fn new(
        clock: Box<dyn Clock>,
        config: GameConfig,
        mut sprites: SpriteStore,
        surface: SurfaceSize,
    ) -> Self {
        let mut pool = AnimationPool::new(&config.pool);
        pool.set_background(sprites.get(BACKGROUND_KEY));
        Self {
            clock,
            config,
            sprites,
            pool,
            current_soldier: None,
            pending_spawn: Timeout::default(),
            surface,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic effect placement, for tests and replays.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn pool(&self) -> &AnimationPool {
        &self.pool
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn current_soldier_id(&self) -> Option<AnimationId> {
        self.current_soldier
    }

    pub fn has_pending_spawn(&self) -> bool {
        self.pending_spawn.is_pending()
    }

    pub fn create_soldier(&mut self, position: Vec2) -> AnimationId {
        let now = self.now();
        let sprites = SoldierSprites::load(&mut self.sprites);
        let soldier = Soldier::new(
            &self.config.soldier,
            &self.config.target,
            sprites,
            self.surface,
            position,
            now,
        );
        let loaded = soldier.is_loaded();
        let id = self.pool.register(soldier);
        self.current_soldier = Some(id);
        info!(id = id.0, x = position.x, y = position.y, loaded, "soldier_spawned");
        id
    }

    /// Discards everything and schedules a fresh soldier.
    pub fn new_game(&mut self) {
        let now = self.now();
        self.clear_all(None);
        let [x, y] = self.config.session.new_game_spawn;
        self.pending_spawn
            .schedule(now, self.config.session.new_game_delay_ms, Vec2::new(x, y));
        self.pool.start_loop();
        info!(delay_ms = self.config.session.new_game_delay_ms, "new_game_started");
    }

    /// Schedules a soldier without discarding running effects.
    pub fn start_game(&mut self) {
        let now = self.now();
        let [x, y] = self.config.session.start_game_spawn;
        self.pending_spawn
            .schedule(now, self.config.session.start_game_delay_ms, Vec2::new(x, y));
        self.pool.start_loop();
        info!(delay_ms = self.config.session.start_game_delay_ms, "game_started");
    }

    pub fn spawn_explosion(&mut self) -> AnimationId {
        let now = self.now();
        let session = &self.config.session;
        let center = random_point(&mut self.rng, self.surface, session.effect_spawn_margin);
        let scale = self
            .rng
            .gen_range(session.explosion_min_scale..=session.explosion_max_scale);
        let interval = self
            .rng
            .gen_range(session.explosion_min_frame_ms..=session.explosion_max_frame_ms);
        let frames = load_effect_frames(
            &mut self.sprites,
            EXPLOSION_KEY_PREFIX,
            session.explosion_frame_count,
        );
        let mut explosion = Explosion::new(center, scale, FramePlayback::new(frames, interval));
        explosion.start(now);
        let id = self.pool.register(explosion);
        debug!(id = id.0, x = center.x, y = center.y, scale, interval, "explosion_spawned");
        id
    }

    pub fn spawn_flame(&mut self) -> AnimationId {
        let now = self.now();
        let session = &self.config.session;
        let center = random_point(&mut self.rng, self.surface, session.effect_spawn_margin);
        let frames = load_effect_frames(&mut self.sprites, FLAME_KEY_PREFIX, session.flame_frame_count);
        let mut flame = Flame::new(center, FramePlayback::new(frames, session.flame_frame_ms));
        flame.start(now);
        let id = self.pool.register(flame);
        debug!(id = id.0, x = center.x, y = center.y, "flame_spawned");
        id
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        let now = self.now();
        match event {
            InputEvent::KeyDown(action) => self.handle_action(action, true, now),
            InputEvent::KeyUp(action) => self.handle_action(action, false, now),
            InputEvent::MouseDown(MouseButtonKind::Primary) => {
                if let Some(soldier) = self.soldier_mut() {
                    soldier.press_trigger(now);
                }
            }
            InputEvent::MouseUp(MouseButtonKind::Primary) => {
                if let Some(soldier) = self.soldier_mut() {
                    soldier.release_trigger(now);
                }
            }
            InputEvent::MouseMove { x, y } => {
                if let Some(soldier) = self.soldier_mut() {
                    soldier.set_cursor(Vec2::new(x, y));
                }
            }
            InputEvent::MouseDown(_) | InputEvent::MouseUp(_) => {}
        }
    }

    fn handle_action(&mut self, action: InputAction, is_down: bool, now: Millis) {
        let direction = match action {
            InputAction::MoveUp => Some(MoveDirection::Up),
            InputAction::MoveDown => Some(MoveDirection::Down),
            InputAction::MoveLeft => Some(MoveDirection::Left),
            InputAction::MoveRight => Some(MoveDirection::Right),
            _ => None,
        };
        if let Some(direction) = direction {
            if let Some(soldier) = self.soldier_mut() {
                soldier.set_movement_key(direction, is_down, now);
            }
            return;
        }
        if !is_down {
            return;
        }
        match action {
            InputAction::ToggleRun => {
                if let Some(soldier) = self.soldier_mut() {
                    soldier.toggle_run(now);
                }
            }
            InputAction::Reload => {
                self.force_reload();
            }
            InputAction::Melee => {
                if let Some(soldier) = self.soldier_mut() {
                    soldier.start_melee(now);
                }
            }
            InputAction::SpawnExplosion => {
                self.spawn_explosion();
            }
            InputAction::SpawnFlame => {
                self.spawn_flame();
            }
            InputAction::DamageSoldier => {
                let amount = self.config.session.debug_damage;
                self.damage_current_soldier(amount);
            }
            InputAction::NewGame => self.new_game(),
            _ => {}
        }
    }

    /// One frame: fire the deferred spawn if due, advance every soldier's
    /// projectile cadence, then run the pool.
    pub fn tick(&mut self, canvas: Option<&mut Canvas<'_>>) -> bool {
        let now = self.now();
        if let Some(position) = self.pending_spawn.fire_if_due(now) {
            self.create_soldier(position);
        }
        for soldier in self.pool.soldiers_mut() {
            soldier.pump_projectiles(now);
        }
        self.pool.tick(canvas, now)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface = SurfaceSize { width, height };
        for soldier in self.pool.soldiers_mut() {
            soldier.set_surface_size(self.surface);
        }
        debug!(width, height, "session_resized");
    }

    pub fn clear_all(&mut self, canvas: Option<&mut Canvas<'_>>) {
        self.pending_spawn.cancel();
        self.current_soldier = None;
        self.pool.clear_all(canvas);
    }

    pub fn soldier(&self) -> Option<&Soldier> {
        self.pool.find(self.current_soldier?)?.as_soldier()
    }

    fn soldier_mut(&mut self) -> Option<&mut Soldier> {
        self.pool.find_mut(self.current_soldier?)?.as_soldier_mut()
    }

    pub fn soldier_alive(&self) -> bool {
        self.soldier().is_some_and(Soldier::is_alive)
    }

    pub fn active_animation_count(&self) -> usize {
        self.pool.total_len()
    }

    pub fn category_count(&self, category: PoolCategory) -> usize {
        self.pool.len(category)
    }

    pub fn live_projectile_count(&self) -> usize {
        self.pool.live_projectile_count()
    }

    pub fn damage_current_soldier(&mut self, amount: u32) -> bool {
        match self.soldier_mut() {
            Some(soldier) => soldier.take_damage(amount),
            None => {
                debug!("damage_without_soldier");
                false
            }
        }
    }

    pub fn force_reload(&mut self) -> bool {
        let now = self.now();
        self.soldier_mut()
            .is_some_and(|soldier| soldier.start_reloading(now))
    }

    pub fn set_ammo(&mut self, count: u32) {
        if let Some(soldier) = self.soldier_mut() {
            soldier.set_ammo(count);
        }
    }

    pub fn clear_bullets(&mut self) {
        if let Some(soldier) = self.soldier_mut() {
            soldier.clear_projectiles();
        }
    }

    /// Flips the held trigger; `None` when there is no soldier.
    pub fn toggle_firing(&mut self) -> Option<bool> {
        let now = self.now();
        self.soldier_mut().map(|soldier| soldier.toggle_firing(now))
    }
}

fn random_point(rng: &mut StdRng, surface: SurfaceSize, margin: f32) -> Vec2 {
    let axis = |rng: &mut StdRng, extent: u32| {
        let extent = extent as f32;
        if extent > margin * 2.0 {
            rng.gen_range(margin..extent - margin)
        } else {
            extent / 2.0
        }
    };
    let x = axis(rng, surface.width);
    let y = axis(rng, surface.height);
    Vec2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{
        SpriteSheet, SOLDIER_FIRE_KEY, SOLDIER_IDLE_KEY, SOLDIER_MELEE_KEY, SOLDIER_RELOAD_KEY,
        SOLDIER_RUN_KEY, SOLDIER_WALK_KEY,
    };
    use crate::clock::ManualClock;

    const WIDTH: u32 = 320;
    const HEIGHT: u32 = 240;

    fn soldier_store() -> SpriteStore {
        let mut store = SpriteStore::in_memory();
        for (key, frames) in [
            (SOLDIER_WALK_KEY, 7),
            (SOLDIER_RUN_KEY, 8),
            (SOLDIER_FIRE_KEY, 4),
            (SOLDIER_IDLE_KEY, 7),
            (SOLDIER_RELOAD_KEY, 13),
            (SOLDIER_MELEE_KEY, 5),
        ] {
            store.insert(key, SpriteSheet::solid(128 * frames, 128, [0; 4]));
        }
        store
    }

    fn session(clock: &ManualClock) -> GameSession {
        GameSession::new(
            Box::new(clock.clone()),
            GameConfig::default(),
            soldier_store(),
            SurfaceSize {
                width: WIDTH,
                height: HEIGHT,
            },
        )
        .with_rng_seed(7)
    }

    fn frame() -> Vec<u8> {
        vec![0u8; (WIDTH * HEIGHT * 4) as usize]
    }

    #[test]
    fn new_game_spawns_soldier_after_delay() {
        let clock = ManualClock::new(1_000);
        let mut session = session(&clock);
        session.spawn_flame();
        session.new_game();
        assert_eq!(session.active_animation_count(), 0);
        assert!(session.has_pending_spawn());

        clock.advance(499);
        session.tick(None);
        assert!(session.soldier().is_none());

        clock.advance(1);
        session.tick(None);
        let soldier = session.soldier().expect("soldier spawned");
        assert_eq!(soldier.position(), Vec2::new(150.0, 900.0));
        assert!(session.soldier_alive());
        assert!(!session.has_pending_spawn());
    }

    #[test]
    fn start_game_keeps_running_effects() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        session.spawn_explosion();
        session.start_game();
        clock.advance(100);
        session.tick(None);
        assert_eq!(session.category_count(PoolCategory::Explosions), 1);
        assert_eq!(session.category_count(PoolCategory::Soldiers), 1);
        assert_eq!(
            session.soldier().map(Soldier::position),
            Some(Vec2::new(50.0, 450.0))
        );
    }

    #[test]
    fn clear_all_cancels_pending_spawn() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        session.new_game();
        session.clear_all(None);
        clock.advance(1_000);
        session.tick(None);
        assert!(session.soldier().is_none());
        assert!(!session.pool().is_loop_running());
    }

    #[test]
    fn effects_spawn_inside_margin() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        for _ in 0..20 {
            let id = session.spawn_explosion();
            let Some(crate::pool::Animation::Explosion(explosion)) = session.pool().find(id) else {
                panic!("explosion registered");
            };
            let center = explosion.center();
            assert!((100.0..=220.0).contains(&center.x));
            assert!((100.0..=140.0).contains(&center.y));
            assert!((0.5..=1.5).contains(&explosion.scale()));
            let interval = explosion.playback().interval_ms();
            assert!((50..=150).contains(&interval));
            assert_eq!(explosion.playback().frame_count(), 27);
        }
        let flame = session.spawn_flame();
        assert!(session.pool().find(flame).is_some());
    }

    #[test]
    fn keyboard_and_mouse_drive_current_soldier() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        session.create_soldier(Vec2::new(200.0, 200.0));

        session.handle_input(InputEvent::KeyDown(InputAction::MoveLeft));
        assert!(session.soldier().is_some_and(Soldier::is_moving));
        session.handle_input(InputEvent::KeyUp(InputAction::MoveLeft));
        assert!(!session.soldier().is_some_and(Soldier::is_moving));

        session.handle_input(InputEvent::MouseDown(MouseButtonKind::Primary));
        assert_eq!(session.soldier().map(Soldier::ammo), Some(29));
        assert_eq!(session.live_projectile_count(), 1);
        session.handle_input(InputEvent::MouseUp(MouseButtonKind::Primary));
        assert!(!session.soldier().is_some_and(Soldier::is_firing));

        session.handle_input(InputEvent::KeyDown(InputAction::Reload));
        assert!(session.soldier().is_some_and(Soldier::is_reloading));

        session.handle_input(InputEvent::KeyDown(InputAction::DamageSoldier));
        assert_eq!(session.soldier().map(Soldier::health), Some(90));

        session.handle_input(InputEvent::MouseMove { x: 12.0, y: 34.0 });
        assert_eq!(
            session.soldier().and_then(Soldier::cursor),
            Some(Vec2::new(12.0, 34.0))
        );
    }

    #[test]
    fn projectiles_advance_even_when_pool_loop_is_stopped() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        session.create_soldier(Vec2::new(200.0, 200.0));
        session.handle_input(InputEvent::MouseDown(MouseButtonKind::Primary));
        session.pool.stop_loop();
        let start_x = session.soldier().expect("soldier").projectiles().projectiles()[0]
            .position()
            .x;

        clock.advance(32);
        assert!(!session.tick(None));
        let x = session.soldier().expect("soldier").projectiles().projectiles()[0]
            .position()
            .x;
        assert!((x - start_x - 30.0).abs() < 1e-3);
    }

    #[test]
    fn tick_renders_into_canvas() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        session.create_soldier(Vec2::new(160.0, 200.0));
        let mut buffer = frame();
        let mut canvas = Canvas::new(&mut buffer, WIDTH, HEIGHT).expect("canvas");
        clock.advance(16);
        assert!(session.tick(Some(&mut canvas)));
        assert_eq!(canvas.pixel(0, HEIGHT as i32 - 1), Some([255, 255, 255, 255]));
    }

    #[test]
    fn debug_helpers_follow_current_soldier() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        assert!(!session.damage_current_soldier(10));
        assert_eq!(session.toggle_firing(), None);

        session.create_soldier(Vec2::new(200.0, 200.0));
        session.set_ammo(3);
        assert_eq!(session.soldier().map(Soldier::ammo), Some(3));
        assert_eq!(session.toggle_firing(), Some(true));
        assert_eq!(session.soldier().map(Soldier::ammo), Some(2));
        session.clear_bullets();
        assert_eq!(session.live_projectile_count(), 0);
        assert_eq!(session.toggle_firing(), Some(false));
        assert!(session.force_reload());

        assert!(session.damage_current_soldier(1_000));
        assert!(!session.soldier_alive());
    }

    #[test]
    fn resize_updates_soldier_scale() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        session.create_soldier(Vec2::new(200.0, 200.0));
        session.resize(1920, 1080);
        assert!((session.soldier().expect("soldier").scale() - 2.5).abs() < 1e-4);
        session.resize(0, 10);
        assert_eq!(session.surface().width, 1920);
    }
}
