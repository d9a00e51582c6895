mod palette;
mod png;
mod renderer;

pub use palette::{color, hue};
pub use png::PngRenderer;
pub use renderer::ChartRenderer;
