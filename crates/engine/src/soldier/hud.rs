use crate::app::{text_width, Canvas, Rgba};
use crate::geometry::{Rect, Vec2};

const HEALTH_GOOD_COLOR: Rgba = [0, 200, 0, 255];
const HEALTH_WARN_COLOR: Rgba = [255, 165, 0, 255];
const HEALTH_LOW_COLOR: Rgba = [220, 0, 0, 255];
const BAR_BACK_COLOR: Rgba = [51, 51, 51, 255];
const BAR_BORDER_COLOR: Rgba = [0, 0, 0, 255];
const AMMO_TEXT_COLOR: Rgba = [255, 255, 255, 255];
const AMMO_LOW_COLOR: Rgba = [255, 60, 60, 255];
const AMMO_LABEL_COLOR: Rgba = [0, 255, 0, 255];
const RELOAD_FILL_COLOR: Rgba = [255, 215, 0, 255];
const RELOAD_LABEL_COLOR: Rgba = [255, 255, 255, 255];

const HEALTH_BAR_WIDTH: f32 = 50.0;
const HEALTH_BAR_HEIGHT: f32 = 6.0;
const HEALTH_BAR_GAP: f32 = 10.0;
const RELOAD_BAR_WIDTH: f32 = 60.0;
const RELOAD_BAR_HEIGHT: f32 = 5.0;
const RELOAD_BAR_GAP: f32 = 5.0;
const AMMO_MARGIN: f32 = 20.0;
const LOW_AMMO_THRESHOLD: u32 = 5;

pub fn health_color(ratio: f32) -> Rgba {
    if ratio > 0.5 {
        HEALTH_GOOD_COLOR
    } else if ratio > 0.25 {
        HEALTH_WARN_COLOR
    } else {
        HEALTH_LOW_COLOR
    }
}

pub fn ammo_color(ammo: u32) -> Rgba {
    if ammo <= LOW_AMMO_THRESHOLD {
        AMMO_LOW_COLOR
    } else {
        AMMO_TEXT_COLOR
    }
}

fn hud_text_scale(canvas_width: u32) -> i32 {
    if canvas_width <= 720 {
        2
    } else {
        3
    }
}

/// Drawn above the sprite only once the soldier has taken damage.
pub(crate) fn draw_health_bar(
    canvas: &mut Canvas<'_>,
    feet: Vec2,
    scale: f32,
    sprite_height: f32,
    health: u32,
    max_health: u32,
) {
    if health >= max_health || max_health == 0 {
        return;
    }
    let width = HEALTH_BAR_WIDTH * scale;
    let bar = Rect {
        left: feet.x - width / 2.0,
        top: feet.y - sprite_height - HEALTH_BAR_GAP * scale,
        width,
        height: HEALTH_BAR_HEIGHT * scale,
    };
    let ratio = health as f32 / max_health as f32;
    canvas.fill_rect(bar, BAR_BACK_COLOR);
    canvas.fill_rect(
        Rect {
            width: bar.width * ratio,
            ..bar
        },
        health_color(ratio),
    );
    canvas.stroke_rect(bar, 1.0, BAR_BORDER_COLOR);
}

/// `N/M` in the top-right corner with an `AMMO` label above it.
pub(crate) fn draw_ammo_counter(canvas: &mut Canvas<'_>, ammo: u32, magazine: u32) {
    let scale = hud_text_scale(canvas.width());
    let right = canvas.width() as f32 - AMMO_MARGIN;
    let label = "AMMO";
    canvas.draw_text(
        right - text_width(label, scale) as f32,
        AMMO_MARGIN,
        label,
        scale,
        AMMO_LABEL_COLOR,
    );
    let count = format!("{ammo}/{magazine}");
    canvas.draw_text(
        right - text_width(&count, scale) as f32,
        AMMO_MARGIN + (7 * scale) as f32,
        &count,
        scale,
        ammo_color(ammo),
    );
}

pub(crate) fn draw_reload_progress(canvas: &mut Canvas<'_>, feet: Vec2, scale: f32, progress: f32) {
    let width = RELOAD_BAR_WIDTH * scale;
    let bar = Rect {
        left: feet.x - width / 2.0,
        top: feet.y + RELOAD_BAR_GAP * scale,
        width,
        height: RELOAD_BAR_HEIGHT * scale,
    };
    canvas.fill_rect(bar, BAR_BACK_COLOR);
    canvas.fill_rect(
        Rect {
            width: bar.width * progress.clamp(0.0, 1.0),
            ..bar
        },
        RELOAD_FILL_COLOR,
    );
    canvas.stroke_rect(bar, 1.0, BAR_BORDER_COLOR);

    let label = "RELOADING";
    let text_scale = hud_text_scale(canvas.width()) - 1;
    canvas.draw_text(
        feet.x - text_width(label, text_scale) as f32 / 2.0,
        bar.bottom() + 3.0 * scale,
        label,
        text_scale,
        RELOAD_LABEL_COLOR,
    );
}
