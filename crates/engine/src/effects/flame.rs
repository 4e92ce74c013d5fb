use crate::app::Canvas;
use crate::clock::Millis;
use crate::geometry::{Rect, Vec2};
use crate::pool::Animated;

use super::FramePlayback;

pub const FLAME_KEY_PREFIX: &str = "effects/flame";

/// Burning sequence drawn at native frame size, centred on its position.
#[derive(Debug, Clone)]
pub struct Flame {
    center: Vec2,
    playback: FramePlayback,
}

impl Flame {
    pub fn new(center: Vec2, playback: FramePlayback) -> Self {
        Self { center, playback }
    }

    pub fn start(&mut self, now: Millis) {
        self.playback.start(now);
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn playback(&self) -> &FramePlayback {
        &self.playback
    }
}

impl Animated for Flame {
    fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    fn is_loaded(&self) -> bool {
        self.playback.is_loaded()
    }

    fn update(&mut self, now: Millis) -> bool {
        self.playback.advance(now)
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, _now: Millis) {
        let Some(sheet) = self.playback.current_sheet() else {
            return;
        };
        let dst = Rect::from_center(self.center, sheet.width() as f32, sheet.height() as f32);
        canvas.draw_sprite(sheet, sheet.full_rect(), dst, false);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::assets::SpriteSheet;

    #[test]
    fn plays_each_frame_for_its_interval() {
        let frames = (0..3)
            .map(|_| Rc::new(SpriteSheet::solid(10, 10, [255, 60, 0, 255])))
            .collect();
        let mut flame = Flame::new(Vec2::new(50.0, 50.0), FramePlayback::new(frames, 100));
        flame.start(0);
        assert!(flame.update(99));
        assert_eq!(flame.playback().current_frame(), 0);
        assert!(flame.update(100));
        assert!(flame.update(200));
        assert!(!flame.update(300));
    }

    #[test]
    fn draws_at_native_size() {
        let frames = vec![Rc::new(SpriteSheet::solid(10, 6, [255, 60, 0, 255]))];
        let mut flame = Flame::new(Vec2::new(50.0, 50.0), FramePlayback::new(frames, 100));
        flame.start(0);
        let mut frame = vec![0u8; 100 * 100 * 4];
        let mut canvas = Canvas::new(&mut frame, 100, 100).expect("canvas");
        flame.draw(&mut canvas, 0);
        assert_eq!(canvas.pixel(45, 47), Some([255, 60, 0, 255]));
        assert_eq!(canvas.pixel(55, 50), Some([0; 4]));
        assert_eq!(canvas.pixel(50, 53), Some([0; 4]));
    }
}
