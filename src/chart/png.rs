use std::collections::BTreeMap;
use std::ops::Range;

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::palette::color;
use super::renderer::ChartRenderer;
use crate::error::Result;
use crate::model::{Point, SampleValue, Timestamp, TimestampTrait};
use crate::store::series_key;

const MIN_WIDTH: u32 = 200;
const MIN_HEIGHT: u32 = 120;
const DAY_MS: Timestamp = 24 * 60 * 60 * 1000;
const FONT: &str = "sans-serif";
const PLACEHOLDER: RGBColor = RGBColor(136, 136, 136);

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Plots series as lines over time into a PNG image.
pub struct PngRenderer {
    width: u32,
    height: u32,
}

impl PngRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            return Err(format!("chart size {}x{} is too small", width, height).into());
        }
        Ok(Self { width, height })
    }

    fn draw(&self, series: &BTreeMap<String, Vec<&Point>>) -> Result<Vec<u8>> {
        let mut pixels = vec![0u8; self.width as usize * self.height as usize * 3];
        {
            let root =
                BitMapBackend::with_buffer(&mut pixels, (self.width, self.height)).into_drawing_area();
            let drawn = if series.is_empty() {
                self.no_data(&root)
            } else {
                self.chart(&root, series)
            };
            drawn
                .and_then(|_| root.present())
                .map_err(|e| ("couldn't draw chart", e))?;
        }

        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(&pixels, self.width, self.height, ColorType::Rgb8)
            .map_err(|e| ("couldn't encode chart", e))?;
        Ok(png)
    }

    fn no_data(&self, root: &Area) -> DrawResult<(), BitMapBackend> {
        root.fill(&WHITE)?;
        let style = (FONT, 24)
            .into_font()
            .color(&PLACEHOLDER)
            .pos(Pos::new(HPos::Center, VPos::Center));
        root.draw_text(
            "No data",
            &style,
            (self.width as i32 / 2, self.height as i32 / 2),
        )
    }

    fn chart(
        &self,
        root: &Area,
        series: &BTreeMap<String, Vec<&Point>>,
    ) -> DrawResult<(), BitMapBackend> {
        root.fill(&WHITE)?;
        let (x_range, y_range) = bounds(series.values().flatten().copied());

        let mut chart = ChartBuilder::on(root)
            .margin(16)
            .x_label_area_size(32)
            .y_label_area_size(56)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_labels(5)
            .y_labels(5)
            .x_label_formatter(&|ts: &Timestamp| ts.to_date_string())
            .y_label_formatter(&|v: &SampleValue| format_value(*v))
            .label_style((FONT, 12))
            .draw()?;

        for (name, points) in series {
            let stroke = color(name);
            chart
                .draw_series(LineSeries::new(
                    points.iter().map(|p| (p.timestamp, p.value)),
                    stroke.stroke_width(2),
                ))?
                .label(name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], stroke.filled()));
            chart.draw_series(
                points
                    .iter()
                    .map(|p| Circle::new((p.timestamp, p.value), 3, stroke.filled())),
            )?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font((FONT, 12))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
    }
}

impl ChartRenderer for PngRenderer {
    fn render_series(&self, points: &[Point], visible_keys: &[String]) -> Result<Vec<u8>> {
        let visible: Vec<String> = visible_keys.iter().map(|k| series_key(k)).collect();

        // Grouped by folded key, drawn under the first spelling seen.
        let mut names: BTreeMap<String, String> = BTreeMap::new();
        let mut grouped: BTreeMap<String, Vec<&Point>> = BTreeMap::new();
        for point in points.iter().filter(|p| p.value.is_finite()) {
            let key = series_key(&point.key);
            if !visible.contains(&key) {
                continue;
            }
            names.entry(key.clone()).or_insert_with(|| point.key.clone());
            grouped.entry(key).or_default().push(point);
        }

        let mut series = BTreeMap::new();
        for (key, mut points) in grouped {
            points.sort_by_key(|p| p.timestamp);
            let name = names.remove(&key).unwrap_or(key);
            series.insert(name, points);
        }

        self.draw(&series)
    }

    fn content_type(&self) -> &'static str {
        "image/png"
    }
}

/// Plot ranges for the points, widened so a single instant or a flat line
/// still spans the plotting area.
fn bounds<'a, I: Iterator<Item = &'a Point>>(points: I) -> (Range<Timestamp>, Range<SampleValue>) {
    let (mut min_ts, mut max_ts) = (Timestamp::MAX, Timestamp::MIN);
    let (mut min_value, mut max_value) = (SampleValue::INFINITY, SampleValue::NEG_INFINITY);

    for p in points {
        min_ts = min_ts.min(p.timestamp);
        max_ts = max_ts.max(p.timestamp);
        min_value = min_value.min(p.value);
        max_value = max_value.max(p.value);
    }

    if min_ts >= max_ts {
        min_ts -= DAY_MS;
        max_ts += DAY_MS;
    }
    let pad = if max_value > min_value {
        (max_value - min_value) * 0.05
    } else {
        1.0
    };

    (min_ts..max_ts, (min_value - pad)..(max_value + pad))
}

fn format_value(v: SampleValue) -> String {
    let s = format!("{:.2}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_owned()
}
