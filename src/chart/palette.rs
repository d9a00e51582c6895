use std::hash::Hasher;

use plotters::style::{Color, HSLColor, RGBColor};
use twox_hash::XxHash64;

use crate::store::series_key;

/// A stable hue in degrees for a metric, the same for every render.
pub fn hue(key: &str) -> u16 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(series_key(key).as_bytes());
    (hasher.finish() % 360) as u16
}

pub fn color(key: &str) -> RGBColor {
    let (r, g, b) = HSLColor(f64::from(hue(key)) / 360.0, 0.65, 0.42).rgb();
    RGBColor(r, g, b)
}
