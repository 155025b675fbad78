//! Box-and-whisker plots of numeric groups.
//!
//! Boxes span the first to third quartile with a line at the median. Whiskers
//! reach the most extreme observation within 1.5 IQR of the box and anything
//! beyond is drawn as an outlier point.

use std::path::Path;

use plotters::{coord::Shift, prelude::*};
use serde::Serialize;

use crate::{calc, Error};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    q1: f64,
    median: f64,
    q3: f64,
    whisker_lo: f64,
    whisker_hi: f64,
    outliers: Vec<f64>,
}

impl BoxStats {
    pub fn new(data: &[f64]) -> Result<Self, Error> {
        let sorted = calc::sorted_finite(data);
        if sorted.is_empty() {
            return Err(Error::InsufficientData { needed: 1, got: 0 });
        }
        let q1 = calc::quantile_sorted(&sorted, 0.25);
        let median = calc::quantile_sorted(&sorted, 0.5);
        let q3 = calc::quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let lo_fence = q1 - 1.5 * iqr;
        let hi_fence = q3 + 1.5 * iqr;
        // the quartiles always lie inside the fences, so both searches succeed
        let whisker_lo = sorted
            .iter()
            .copied()
            .find(|x| *x >= lo_fence)
            .unwrap_or(q1);
        let whisker_hi = sorted
            .iter()
            .rev()
            .copied()
            .find(|x| *x <= hi_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|x| *x < lo_fence || *x > hi_fence)
            .collect();
        Ok(Self {
            q1,
            median,
            q3,
            whisker_lo,
            whisker_hi,
            outliers,
        })
    }

    pub fn q1(&self) -> f64 {
        self.q1
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    pub fn q3(&self) -> f64 {
        self.q3
    }

    pub fn whiskers(&self) -> (f64, f64) {
        (self.whisker_lo, self.whisker_hi)
    }

    pub fn outliers(&self) -> &[f64] {
        &self.outliers
    }

    fn lowest(&self) -> f64 {
        self.outliers
            .first()
            .copied()
            .unwrap_or(self.whisker_lo)
            .min(self.whisker_lo)
    }

    fn highest(&self) -> f64 {
        self.outliers
            .last()
            .copied()
            .unwrap_or(self.whisker_hi)
            .max(self.whisker_hi)
    }
}

/// Plot configuration options.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
    pub y_label: Option<String>,
    pub font_size: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            title: None,
            y_label: None,
            font_size: 16,
        }
    }
}

const BOX_COLOR: RGBColor = RGBColor(31, 119, 180);
const MEDIAN_COLOR: RGBColor = RGBColor(255, 127, 14);

/// Render one box per `(label, data)` group as an SVG file at `path`.
#[tracing::instrument(skip(groups, config))]
pub fn render(path: &Path, groups: &[(&str, &[f64])], config: &PlotConfig) -> Result<(), Error> {
    let stats = groups
        .iter()
        .map(|(label, data)| BoxStats::new(data).map(|s| (*label, s)))
        .collect::<Result<Vec<_>, _>>()?;
    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    draw(root, &stats, config)
}

/// Render into an in-memory SVG document.
pub fn render_to_string(groups: &[(&str, &[f64])], config: &PlotConfig) -> Result<String, Error> {
    let stats = groups
        .iter()
        .map(|(label, data)| BoxStats::new(data).map(|s| (*label, s)))
        .collect::<Result<Vec<_>, _>>()?;
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        draw(root, &stats, config)?;
    }
    Ok(svg)
}

fn plot_err(e: impl std::fmt::Display) -> Error {
    Error::Plot(e.to_string())
}

fn draw<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    stats: &[(&str, BoxStats)],
    config: &PlotConfig,
) -> Result<(), Error> {
    if stats.is_empty() {
        return Err(Error::InsufficientData { needed: 1, got: 0 });
    }
    root.fill(&WHITE).map_err(plot_err)?;

    let lo = stats.iter().map(|(_, s)| s.lowest()).fold(f64::INFINITY, f64::min);
    let hi = stats
        .iter()
        .map(|(_, s)| s.highest())
        .fold(f64::NEG_INFINITY, f64::max);
    let pad = ((hi - lo) * 0.05).max(0.5);

    let y_label_area = 60;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            config.title.as_deref().unwrap_or(""),
            ("sans-serif", config.font_size).into_font(),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(y_label_area)
        .build_cartesian_2d((0..stats.len()).into_segmented(), (lo - pad)..(hi + pad))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc(config.y_label.as_deref().unwrap_or(""))
        .x_label_formatter(&|x| {
            if let SegmentValue::CenterOf(idx) = x {
                stats.get(*idx).map(|(l, _)| l.to_string()).unwrap_or_default()
            } else {
                String::new()
            }
        })
        .draw()
        .map_err(plot_err)?;

    // a box takes half of its segment
    let segment_px = config.width.saturating_sub(y_label_area + 20) / stats.len() as u32;
    let box_margin = segment_px / 4;
    let cap_margin = segment_px * 3 / 8;

    for (i, (_, s)) in stats.iter().enumerate() {
        let span = |y: f64, margin: u32, style: ShapeStyle| {
            let mut r = Rectangle::new(
                [(SegmentValue::Exact(i), y), (SegmentValue::Exact(i + 1), y)],
                style,
            );
            r.set_margin(0, 0, margin, margin);
            r
        };
        let mut body = Rectangle::new(
            [
                (SegmentValue::Exact(i), s.q3),
                (SegmentValue::Exact(i + 1), s.q1),
            ],
            BOX_COLOR.mix(0.3).filled(),
        );
        body.set_margin(0, 0, box_margin, box_margin);
        let mut outline = Rectangle::new(
            [
                (SegmentValue::Exact(i), s.q3),
                (SegmentValue::Exact(i + 1), s.q1),
            ],
            BOX_COLOR.stroke_width(2),
        );
        outline.set_margin(0, 0, box_margin, box_margin);
        chart.draw_series([body, outline]).map_err(plot_err)?;
        chart
            .draw_series([
                span(s.median, box_margin, MEDIAN_COLOR.stroke_width(2)),
                span(s.whisker_lo, cap_margin, BLACK.stroke_width(1)),
                span(s.whisker_hi, cap_margin, BLACK.stroke_width(1)),
            ])
            .map_err(plot_err)?;
        chart
            .draw_series([
                PathElement::new(
                    vec![
                        (SegmentValue::CenterOf(i), s.q3),
                        (SegmentValue::CenterOf(i), s.whisker_hi),
                    ],
                    BLACK,
                ),
                PathElement::new(
                    vec![
                        (SegmentValue::CenterOf(i), s.q1),
                        (SegmentValue::CenterOf(i), s.whisker_lo),
                    ],
                    BLACK,
                ),
            ])
            .map_err(plot_err)?;
        chart
            .draw_series(
                s.outliers
                    .iter()
                    .map(|y| Circle::new((SegmentValue::CenterOf(i), *y), 3, BLACK)),
            )
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    macro_rules! assert_float_eq {
        ($a:expr, $b:expr, $tol:expr) => {
            assert!(($a - $b).abs() < $tol, "{:.22} != {:.22}", $a, $b);
        };
    }

    macro_rules! float_eq {
        ($a:expr, $b:expr) => {
            assert_float_eq!($a, $b, 1e-12);
        };
    }

    #[test]
    fn test_box_stats() {
        let s = BoxStats::new(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        float_eq!(s.q1(), 2.0);
        float_eq!(s.median(), 3.0);
        float_eq!(s.q3(), 4.0);
        assert_eq!(s.whiskers(), (1.0, 5.0));
        assert!(s.outliers().is_empty());
    }

    #[test]
    fn test_box_stats_outliers() {
        // fences at -3 and 9
        let s = BoxStats::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 20.0, -5.0]).unwrap();
        float_eq!(s.q1(), 1.5);
        float_eq!(s.q3(), 4.5);
        assert_eq!(s.whiskers(), (1.0, 5.0));
        assert_eq!(s.outliers(), [-5.0, 20.0]);
        float_eq!(s.lowest(), -5.0);
        float_eq!(s.highest(), 20.0);
    }

    #[test]
    fn test_box_stats_empty() {
        assert!(matches!(
            BoxStats::new(&[]),
            Err(Error::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_render_to_string() {
        let a = [7.53, 7.48, 8.08, 8.09, 10.15];
        let b = [9.21, 11.51, 12.79, 11.85];
        let svg = render_to_string(
            &[("lean", &a), ("obese", &b)],
            &PlotConfig {
                title: Some("Energy expenditure".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("lean"));
        assert!(svg.contains("obese"));
    }

    #[test]
    fn test_render_file() {
        let path = std::env::temp_dir().join(format!(".lmdemo.{}.svg", rand::random::<u64>()));
        render(&path, &[("a", &[1.0, 2.0, 3.0])], &PlotConfig::default()).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_render_empty_group() {
        assert!(matches!(
            render_to_string(&[("a", &[1.0]), ("b", &[])], &PlotConfig::default()),
            Err(Error::InsufficientData { .. })
        ));
        assert!(matches!(
            render_to_string(&[], &PlotConfig::default()),
            Err(Error::InsufficientData { .. })
        ));
    }
}
