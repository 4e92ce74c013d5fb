use crate::geometry::Rect;

use super::rendering::{glyph_advance, line_advance, Canvas, Rgba};
use super::LoopMetricsSnapshot;

const TEXT_SCALE: i32 = 2;
const OVERLAY_PADDING: f32 = 12.0;
const OVERLAY_PANEL_INSET: f32 = 6.0;
const OVERLAY_TEXT_PRIMARY_COLOR: Rgba = [244, 248, 252, 255];
const OVERLAY_TEXT_DIM_COLOR: Rgba = [176, 198, 220, 255];
const OVERLAY_PANEL_BG_COLOR: Rgba = [10, 12, 16, 210];
const OVERLAY_PANEL_BORDER_COLOR: Rgba = [92, 106, 126, 255];

#[derive(Debug, Clone, Default)]
pub(crate) struct OverlayData {
    pub metrics: LoopMetricsSnapshot,
    pub render_fps_cap: Option<u32>,
    pub slow_frame_delay_ms: u64,
    pub explosions: usize,
    pub flames: usize,
    pub soldiers: usize,
    pub live_projectiles: usize,
    pub soldier_state: Option<&'static str>,
}

pub(crate) fn build_overlay_lines(data: &OverlayData) -> Vec<String> {
    let cap = match data.render_fps_cap {
        Some(cap) => cap.to_string(),
        None => "OFF".to_string(),
    };
    let mut lines = vec![
        format!("FPS: {:.1}  TPS: {:.1}", data.metrics.fps, data.metrics.tps),
        format!("FRAME: {:.2} MS  CAP: {cap}", data.metrics.frame_time_ms),
        format!(
            "POOL: {} EXPL  {} FLAME  {} SOLDIER",
            data.explosions, data.flames, data.soldiers
        ),
        format!("BULLETS: {}", data.live_projectiles),
    ];
    if data.slow_frame_delay_ms > 0 {
        lines.push(format!("SLOW FRAME: {} MS", data.slow_frame_delay_ms));
    }
    if let Some(state) = data.soldier_state {
        lines.push(format!("SOLDIER: {}", state.to_uppercase()));
    }
    lines
}

pub(crate) fn draw_overlay(canvas: &mut Canvas<'_>, data: &OverlayData) {
    let lines = build_overlay_lines(data);
    let longest_line_chars = lines
        .iter()
        .map(|line| line.chars().count() as i32)
        .max()
        .unwrap_or(0);
    let panel = Rect {
        left: OVERLAY_PADDING - OVERLAY_PANEL_INSET,
        top: OVERLAY_PADDING - OVERLAY_PANEL_INSET,
        width: (longest_line_chars * glyph_advance(TEXT_SCALE)) as f32 + OVERLAY_PANEL_INSET * 2.0,
        height: (lines.len() as i32 * line_advance(TEXT_SCALE)) as f32 + OVERLAY_PANEL_INSET * 2.0,
    };
    canvas.fill_rect(panel, OVERLAY_PANEL_BG_COLOR);
    canvas.stroke_rect(panel, 1.0, OVERLAY_PANEL_BORDER_COLOR);

    let mut y = OVERLAY_PADDING;
    for (index, line) in lines.iter().enumerate() {
        let color = if index == 0 {
            OVERLAY_TEXT_PRIMARY_COLOR
        } else {
            OVERLAY_TEXT_DIM_COLOR
        };
        canvas.draw_text(OVERLAY_PADDING, y, line, TEXT_SCALE, color);
        y += line_advance(TEXT_SCALE) as f32;
    }
}
