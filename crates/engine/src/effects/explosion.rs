use crate::app::Canvas;
use crate::clock::Millis;
use crate::geometry::{Rect, Vec2};
use crate::pool::Animated;

use super::FramePlayback;

pub const EXPLOSION_KEY_PREFIX: &str = "effects/explosion";

const START_SIZE: f32 = 0.3;
const GROWTH: f32 = 1.7;

/// Centred burst that grows from 0.3x to 2x its scaled frame size over the
/// sequence.
#[derive(Debug, Clone)]
pub struct Explosion {
    center: Vec2,
    scale: f32,
    playback: FramePlayback,
}

impl Explosion {
    pub fn new(center: Vec2, scale: f32, playback: FramePlayback) -> Self {
        Self {
            center,
            scale,
            playback,
        }
    }

    pub fn start(&mut self, now: Millis) {
        self.playback.start(now);
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn playback(&self) -> &FramePlayback {
        &self.playback
    }

    fn draw_rect(&self, frame_width: u32, frame_height: u32) -> Rect {
        let multiplier = START_SIZE + self.playback.progress() * GROWTH;
        Rect::from_center(
            self.center,
            frame_width as f32 * self.scale * multiplier,
            frame_height as f32 * self.scale * multiplier,
        )
    }
}

impl Animated for Explosion {
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
        let dst = self.draw_rect(sheet.width(), sheet.height());
        canvas.draw_sprite(sheet, sheet.full_rect(), dst, false);
    }
}
