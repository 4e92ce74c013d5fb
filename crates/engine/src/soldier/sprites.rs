use std::rc::Rc;

use crate::assets::{
    frames_from_sheet, FrameRect, SpriteSheet, SpriteStore, SOLDIER_FIRE_KEY, SOLDIER_IDLE_KEY,
    SOLDIER_MELEE_KEY, SOLDIER_RELOAD_KEY, SOLDIER_RUN_KEY, SOLDIER_WALK_KEY,
};

/// One sheet per action. Only the walk sheet is required; a missing sheet
/// removes that animation.
#[derive(Debug, Clone, Default)]
pub struct SoldierSprites {
    pub walk: Option<Rc<SpriteSheet>>,
    pub run: Option<Rc<SpriteSheet>>,
    pub fire: Option<Rc<SpriteSheet>>,
    pub idle: Option<Rc<SpriteSheet>>,
    pub reload: Option<Rc<SpriteSheet>>,
    pub melee: Option<Rc<SpriteSheet>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoldierFrameCounts {
    pub walk: usize,
    pub run: usize,
    pub fire: usize,
    pub idle: usize,
    pub reload: usize,
    pub melee: usize,
}

impl Default for SoldierFrameCounts {
    fn default() -> Self {
        Self {
            walk: 7,
            run: 8,
            fire: 4,
            idle: 7,
            reload: 13,
            melee: 5,
        }
    }
}

impl SoldierSprites {
    pub fn load(store: &mut SpriteStore) -> Self {
        Self {
            walk: store.get(SOLDIER_WALK_KEY),
            run: store.get(SOLDIER_RUN_KEY),
            fire: store.get(SOLDIER_FIRE_KEY),
            idle: store.get(SOLDIER_IDLE_KEY),
            reload: store.get(SOLDIER_RELOAD_KEY),
            melee: store.get(SOLDIER_MELEE_KEY),
        }
    }

    /// Transparent sheets with the given frame counts, for headless runs.
    pub fn blank(frame_size: u32, counts: SoldierFrameCounts) -> Self {
        let sheet = |count: usize| {
            (count > 0).then(|| Rc::new(SpriteSheet::solid(frame_size * count as u32, frame_size, [0; 4])))
        };
        Self {
            walk: sheet(counts.walk),
            run: sheet(counts.run),
            fire: sheet(counts.fire),
            idle: sheet(counts.idle),
            reload: sheet(counts.reload),
            melee: sheet(counts.melee),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.walk.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SoldierFrames {
    pub walk: Vec<FrameRect>,
    pub run: Vec<FrameRect>,
    pub fire: Vec<FrameRect>,
    pub idle: Vec<FrameRect>,
    pub reload: Vec<FrameRect>,
    pub melee: Vec<FrameRect>,
}

impl SoldierFrames {
    pub(crate) fn slice(sprites: &SoldierSprites, frame_size: u32) -> Self {
        let frames = |sheet: &Option<Rc<SpriteSheet>>| {
            sheet
                .as_deref()
                .map(|sheet| frames_from_sheet(sheet, frame_size, frame_size))
                .unwrap_or_default()
        };
        Self {
            walk: frames(&sprites.walk),
            run: frames(&sprites.run),
            fire: frames(&sprites.fire),
            idle: frames(&sprites.idle),
            reload: frames(&sprites.reload),
            melee: frames(&sprites.melee),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_sprites_slice_to_requested_counts() {
        let counts = SoldierFrameCounts {
            idle: 0,
            ..SoldierFrameCounts::default()
        };
        let sprites = SoldierSprites::blank(128, counts);
        let frames = SoldierFrames::slice(&sprites, 128);
        assert!(sprites.is_loaded());
        assert!(sprites.idle.is_none());
        assert_eq!(frames.walk.len(), 7);
        assert_eq!(frames.reload.len(), 13);
        assert!(frames.idle.is_empty());
    }

    #[test]
    fn empty_store_leaves_soldier_unloaded() {
        let mut store = SpriteStore::in_memory();
        let sprites = SoldierSprites::load(&mut store);
        assert!(!sprites.is_loaded());
        assert!(SoldierFrames::slice(&sprites, 128).walk.is_empty());
    }
}
