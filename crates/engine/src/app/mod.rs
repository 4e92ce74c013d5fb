mod input;
mod loop_runner;
mod metrics;
mod overlay;
mod rendering;

pub use input::{InputAction, InputEvent, MouseButtonKind};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{glyph_advance, line_advance, text_width, Canvas, Renderer, Rgba};
