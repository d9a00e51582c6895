use crate::error::Result;
use crate::model::Point;

/// Draws measurement series into an image.
pub trait ChartRenderer: Send + Sync {
    /// One line per key in `visible_keys`; other keys are left out. An empty
    /// selection still yields an image, saying there is no data.
    fn render_series(&self, points: &[Point], visible_keys: &[String]) -> Result<Vec<u8>>;

    fn content_type(&self) -> &'static str;
}
