//! Transient one-shot effects played frame by frame and retired by the pool
//! after their last frame.

mod explosion;
mod flame;

pub use explosion::{Explosion, EXPLOSION_KEY_PREFIX};
pub use flame::{Flame, FLAME_KEY_PREFIX};

use std::rc::Rc;

use crate::assets::{SpriteSheet, SpriteStore};
use crate::clock::{elapsed_ms, Millis};

const PLACEHOLDER_SIZE: u32 = 100;
const PLACEHOLDER_COLOR: [u8; 4] = [51, 51, 51, 255];

/// Sprite key of frame `index` (zero based) in an effect sequence.
pub fn effect_frame_key(prefix: &str, index: usize) -> String {
    format!("{prefix}/frame_{:02}", index + 1)
}

/// Loads `count` frames, substituting a dark placeholder square for every
/// frame that cannot be loaded so the sequence keeps its length.
pub fn load_effect_frames(store: &mut SpriteStore, prefix: &str, count: usize) -> Vec<Rc<SpriteSheet>> {
    let mut placeholder: Option<Rc<SpriteSheet>> = None;
    (0..count)
        .map(|index| {
            store.get(&effect_frame_key(prefix, index)).unwrap_or_else(|| {
                placeholder
                    .get_or_insert_with(|| {
                        Rc::new(SpriteSheet::solid(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, PLACEHOLDER_COLOR))
                    })
                    .clone()
            })
        })
        .collect()
}

/// Frame sequence with its own cadence. Reaching past the last frame ends
/// playback.
#[derive(Debug, Clone)]
pub struct FramePlayback {
    frames: Vec<Rc<SpriteSheet>>,
    interval_ms: Millis,
    current: usize,
    last_advance: Millis,
    playing: bool,
}

impl FramePlayback {
    pub fn new(frames: Vec<Rc<SpriteSheet>>, interval_ms: Millis) -> Self {
        Self {
            frames,
            interval_ms: interval_ms.max(1),
            current: 0,
            last_advance: 0,
            playing: false,
        }
    }

    pub fn start(&mut self, now: Millis) {
        if !self.is_loaded() {
            return;
        }
        self.playing = true;
        self.current = 0;
        self.last_advance = now;
    }

    pub fn is_loaded(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_frame(&self) -> usize {
        self.current
    }

    pub fn interval_ms(&self) -> Millis {
        self.interval_ms
    }

    /// Fraction of the sequence already shown, in `0.0..1.0`.
    pub fn progress(&self) -> f32 {
        if self.frames.is_empty() {
            0.0
        } else {
            self.current as f32 / self.frames.len() as f32
        }
    }

    pub fn current_sheet(&self) -> Option<&SpriteSheet> {
        self.frames.get(self.current).map(Rc::as_ref)
    }

    /// `false` once playback is over (or never started).
    pub fn advance(&mut self, now: Millis) -> bool {
        if !self.playing || !self.is_loaded() {
            return false;
        }
        if elapsed_ms(now, self.last_advance) >= self.interval_ms {
            self.current += 1;
            self.last_advance = now;
            if self.current >= self.frames.len() {
                self.current = self.frames.len() - 1;
                self.playing = false;
                return false;
            }
        }
        true
    }
}
