//! Shared scheduler for everything that animates on the playfield. Entries
//! are grouped by category, processed in registration order and retired as
//! soon as their update reports completion.

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::app::{Canvas, Rgba};
use crate::assets::SpriteSheet;
use crate::clock::Millis;
use crate::config::PoolConfig;
use crate::effects::{Explosion, Flame};
use crate::soldier::Soldier;

const FALLBACK_BACKGROUND: Rgba = [255, 255, 255, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolCategory {
    Explosions,
    Flames,
    Soldiers,
}

impl PoolCategory {
    pub const ALL: [PoolCategory; 3] = [
        PoolCategory::Explosions,
        PoolCategory::Flames,
        PoolCategory::Soldiers,
    ];

    const fn index(self) -> usize {
        match self {
            PoolCategory::Explosions => 0,
            PoolCategory::Flames => 1,
            PoolCategory::Soldiers => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PoolCategory::Explosions => "explosions",
            PoolCategory::Flames => "flames",
            PoolCategory::Soldiers => "soldiers",
        }
    }
}

/// Capability set shared by every pooled animation.
pub trait Animated {
    /// Playback has started and has not finished.
    fn is_playing(&self) -> bool;

    /// Resources are present; a loaded animation that is not playing is still
    /// drawn so its first frame shows before playback begins.
    fn is_loaded(&self) -> bool;

    /// Advances by wall-clock time. `false` retires the animation.
    fn update(&mut self, now: Millis) -> bool;

    fn draw(&mut self, canvas: &mut Canvas<'_>, now: Millis);

    fn cleanup(&mut self) {}
}

#[derive(Debug)]
pub enum Animation {
    Soldier(Box<Soldier>),
    Explosion(Explosion),
    Flame(Flame),
}

impl Animation {
    pub fn category(&self) -> PoolCategory {
        match self {
            Animation::Soldier(_) => PoolCategory::Soldiers,
            Animation::Explosion(_) => PoolCategory::Explosions,
            Animation::Flame(_) => PoolCategory::Flames,
        }
    }

    pub fn as_animated_mut(&mut self) -> &mut dyn Animated {
        match self {
            Animation::Soldier(soldier) => soldier.as_mut(),
            Animation::Explosion(explosion) => explosion,
            Animation::Flame(flame) => flame,
        }
    }

    pub fn as_soldier(&self) -> Option<&Soldier> {
        match self {
            Animation::Soldier(soldier) => Some(soldier),
            _ => None,
        }
    }

    pub fn as_soldier_mut(&mut self) -> Option<&mut Soldier> {
        match self {
            Animation::Soldier(soldier) => Some(soldier),
            _ => None,
        }
    }
}

impl From<Soldier> for Animation {
    fn from(soldier: Soldier) -> Self {
        Animation::Soldier(Box::new(soldier))
    }
}

impl From<Explosion> for Animation {
    fn from(explosion: Explosion) -> Self {
        Animation::Explosion(explosion)
    }
}

impl From<Flame> for Animation {
    fn from(flame: Flame) -> Self {
        Animation::Flame(flame)
    }
}

#[derive(Debug)]
struct PoolEntry {
    id: AnimationId,
    animation: Animation,
}

#[derive(Debug)]
pub struct AnimationPool {
    categories: [Vec<PoolEntry>; 3],
    next_id: u64,
    soldier_capacity: usize,
    loop_running: bool,
    background: Option<Rc<SpriteSheet>>,
}

impl AnimationPool {
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            categories: Default::default(),
            next_id: 1,
            soldier_capacity: config.soldier_capacity.max(1),
            loop_running: false,
            background: None,
        }
    }

    pub fn set_background(&mut self, background: Option<Rc<SpriteSheet>>) {
        self.background = background;
    }

    /// Only soldiers are bounded; effects are unbounded.
    pub fn capacity(&self, category: PoolCategory) -> Option<usize> {
        match category {
            PoolCategory::Soldiers => Some(self.soldier_capacity),
            PoolCategory::Explosions | PoolCategory::Flames => None,
        }
    }

    /// Appends to the animation's category, evicting the oldest entry when a
    /// bounded category is full, and starts the loop.
    pub fn register(&mut self, animation: impl Into<Animation>) -> AnimationId {
        let animation = animation.into();
        let category = animation.category();
        let capacity = self.capacity(category);
        let entries = &mut self.categories[category.index()];
        if let Some(capacity) = capacity {
            while entries.len() >= capacity {
                let mut evicted = entries.remove(0);
                evicted.animation.as_animated_mut().cleanup();
                warn!(
                    category = category.as_str(),
                    id = evicted.id.0,
                    capacity,
                    "animation_evicted"
                );
            }
        }

        let id = AnimationId(self.next_id);
        self.next_id += 1;
        entries.push(PoolEntry { id, animation });
        info!(category = category.as_str(), id = id.0, "animation_registered");
        self.start_loop();
        id
    }

    pub fn start_loop(&mut self) {
        if !self.loop_running {
            self.loop_running = true;
            debug!("animation_loop_started");
        }
    }

    pub fn stop_loop(&mut self) {
        if self.loop_running {
            self.loop_running = false;
            debug!("animation_loop_stopped");
        }
    }

    pub fn is_loop_running(&self) -> bool {
        self.loop_running
    }

    /// One scheduling frame. Returns `false` when nothing was processed,
    /// either because the loop is stopped or no surface is available.
    pub fn tick(&mut self, canvas: Option<&mut Canvas<'_>>, now: Millis) -> bool {
        if !self.loop_running {
            return false;
        }
        let Some(canvas) = canvas else {
            return false;
        };

        match self.background.as_deref() {
            Some(background) => canvas.draw_backdrop(background),
            None => canvas.clear(FALLBACK_BACKGROUND),
        }

        for category in PoolCategory::ALL {
            let entries = &mut self.categories[category.index()];
            let mut index = 0;
            while index < entries.len() {
                let animated = entries[index].animation.as_animated_mut();
                if animated.is_playing() {
                    if animated.update(now) {
                        animated.draw(canvas, now);
                    } else {
                        let mut finished = entries.remove(index);
                        finished.animation.as_animated_mut().cleanup();
                        debug!(
                            category = category.as_str(),
                            id = finished.id.0,
                            "animation_finished"
                        );
                        continue;
                    }
                } else if animated.is_loaded() {
                    animated.draw(canvas, now);
                }
                index += 1;
            }
        }

        if self.total_len() == 0 {
            self.stop_loop();
        }
        true
    }

    /// Cleans up and discards every entry, stops the loop and blanks the
    /// surface when one is available.
    pub fn clear_all(&mut self, canvas: Option<&mut Canvas<'_>>) {
        let mut cleared = 0usize;
        for entries in &mut self.categories {
            for mut entry in entries.drain(..) {
                entry.animation.as_animated_mut().cleanup();
                cleared += 1;
            }
        }
        self.stop_loop();
        if let Some(canvas) = canvas {
            canvas.clear([0, 0, 0, 0]);
        }
        info!(cleared, "animation_pool_cleared");
    }

    pub fn len(&self, category: PoolCategory) -> usize {
        self.categories[category.index()].len()
    }

    pub fn total_len(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    pub fn ids(&self, category: PoolCategory) -> Vec<AnimationId> {
        self.categories[category.index()]
            .iter()
            .map(|entry| entry.id)
            .collect()
    }

    pub fn find(&self, id: AnimationId) -> Option<&Animation> {
        self.categories
            .iter()
            .flatten()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.animation)
    }

    pub fn find_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        self.categories
            .iter_mut()
            .flatten()
            .find(|entry| entry.id == id)
            .map(|entry| &mut entry.animation)
    }

    pub fn soldiers_mut(&mut self) -> impl Iterator<Item = &mut Soldier> {
        self.categories[PoolCategory::Soldiers.index()]
            .iter_mut()
            .filter_map(|entry| entry.animation.as_soldier_mut())
    }

    pub fn live_projectile_count(&self) -> usize {
        self.categories[PoolCategory::Soldiers.index()]
            .iter()
            .filter_map(|entry| entry.animation.as_soldier())
            .map(|soldier| soldier.projectiles().active_count())
            .sum()
    }
}
