mod canvas;
mod glyphs;
mod renderer;

pub use canvas::{Canvas, Rgba};
pub use glyphs::{glyph_advance, line_advance, text_width};
pub use renderer::Renderer;
