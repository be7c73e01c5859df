//! Histogram PNG rendering.
//!
//! Each [`HistogramSpec`] names one distribution of [`AnnotationStats`] and
//! how to draw it. Bars, grid and axes are always drawn; the title, axis
//! labels and tick labels need a TrueType font (`--font`).

mod histogram;

pub use histogram::Histogram;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::{AnnotationStats, Distribution};
use crate::error::PrepError;

/// Aspect ratios are clipped to this range before binning.
pub const ASPECT_RATIO_RANGE: (f64, f64) = (0.0, 10.0);
pub const ASPECT_RATIO_BINS: usize = 100;

const BAR_FILL: Rgb<u8> = Rgb([205, 92, 92]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);
const GRID: Rgb<u8> = Rgb([220, 220, 220]);
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

const MARGIN_LEFT: f32 = 80.0;
const MARGIN_RIGHT: f32 = 30.0;
const MARGIN_TOP: f32 = 60.0;
const MARGIN_BOTTOM: f32 = 70.0;

/// Lowest value shown on a log-scaled count axis.
const LOG_FLOOR: f64 = 0.5;

/// What to plot and how.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistogramSpec {
    pub distribution: Distribution,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bins: usize,
    pub log_scale: bool,
    pub filename: String,
}

/// The four standard plots.
pub fn default_histograms() -> Vec<HistogramSpec> {
    vec![
        HistogramSpec {
            distribution: Distribution::Area,
            title: "Object Area Distribution (Normalized, Log Scale)".to_string(),
            x_label: "Normalized Area (W * H)".to_string(),
            y_label: "Frequency (Log Scale)".to_string(),
            bins: 100,
            log_scale: true,
            filename: "1_area_distribution.png".to_string(),
        },
        HistogramSpec {
            distribution: Distribution::AspectRatio,
            title: "Object Aspect Ratio Distribution".to_string(),
            x_label: "Aspect Ratio (W / H)".to_string(),
            y_label: "Frequency".to_string(),
            bins: ASPECT_RATIO_BINS,
            log_scale: false,
            filename: "2_aspect_ratio_distribution.png".to_string(),
        },
        HistogramSpec {
            distribution: Distribution::Width,
            title: "Normalized Object Width Distribution".to_string(),
            x_label: "Normalized Width".to_string(),
            y_label: "Frequency".to_string(),
            bins: 50,
            log_scale: false,
            filename: "3_normalized_width_distribution.png".to_string(),
        },
        HistogramSpec {
            distribution: Distribution::Height,
            title: "Normalized Object Height Distribution".to_string(),
            x_label: "Normalized Height".to_string(),
            y_label: "Frequency".to_string(),
            bins: 50,
            log_scale: false,
            filename: "4_normalized_height_distribution.png".to_string(),
        },
    ]
}

/// Values and bin count actually plotted for `spec`.
///
/// Aspect ratios are clipped into [`ASPECT_RATIO_RANGE`] on a copy and always
/// use [`ASPECT_RATIO_BINS`]; the caller's values are never modified.
pub fn prepare_series(spec: &HistogramSpec, values: &[f64]) -> (Vec<f64>, usize) {
    match spec.distribution {
        Distribution::AspectRatio => {
            let (lo, hi) = ASPECT_RATIO_RANGE;
            let clipped = values.iter().map(|v| v.clamp(lo, hi)).collect();
            (clipped, ASPECT_RATIO_BINS)
        }
        _ => (values.to_vec(), spec.bins),
    }
}

/// Canvas size and optional font.
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    font: Option<FontVec>,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            font: None,
        }
    }
}

impl PlotStyle {
    /// Default canvas, with the TrueType/OpenType font at `font` if given.
    pub fn load(font: Option<&Path>) -> Result<Self, PrepError> {
        let mut style = Self::default();
        if let Some(path) = font {
            let bytes = fs::read(path).map_err(|err| PrepError::FontLoad {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
            let font = FontVec::try_from_vec(bytes).map_err(|err| PrepError::FontLoad {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
            style.font = Some(font);
        }
        Ok(style)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

/// A rendered plot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlotArtifact {
    pub distribution: Distribution,
    pub path: PathBuf,
    pub bins: usize,
    pub values: usize,
    pub max_count: usize,
}

/// Render one histogram to `out_dir/spec.filename`, replacing any existing file.
pub fn render_histogram(
    spec: &HistogramSpec,
    values: &[f64],
    out_dir: &Path,
    style: &PlotStyle,
) -> Result<PlotArtifact, PrepError> {
    fs::create_dir_all(out_dir)?;

    let (series, bins) = prepare_series(spec, values);
    let hist = Histogram::compute(&series, bins);
    let image = draw_histogram(&hist, spec, style);

    let path = out_dir.join(&spec.filename);
    image.save(&path).map_err(|source| PrepError::PlotWrite {
        path: path.clone(),
        source,
    })?;
    log::info!("Plot saved: {}", path.display());

    Ok(PlotArtifact {
        distribution: spec.distribution,
        path,
        bins: hist.bins(),
        values: hist.total(),
        max_count: hist.max_count(),
    })
}

/// Render every spec against the matching distribution in `stats`.
pub fn render_all(
    specs: &[HistogramSpec],
    stats: &AnnotationStats,
    out_dir: &Path,
    style: &PlotStyle,
) -> Result<Vec<PlotArtifact>, PrepError> {
    specs
        .iter()
        .map(|spec| render_histogram(spec, stats.series(spec.distribution), out_dir, style))
        .collect()
}

/// Vertical mapping from counts to the unit interval.
#[derive(Clone, Copy, Debug, PartialEq)]
enum CountAxis {
    Linear { top: f64, step: f64 },
    Log { top: f64 },
}

impl CountAxis {
    fn new(max_count: usize, log_scale: bool) -> Self {
        let max = max_count.max(1) as f64;
        if log_scale {
            let top = 10f64.powf(max.log10().ceil()).max(10.0);
            CountAxis::Log { top }
        } else {
            let step = nice_step(max / 5.0).max(1.0);
            CountAxis::Linear {
                top: (max / step).ceil() * step,
                step,
            }
        }
    }

    fn fraction(&self, count: f64) -> f64 {
        let f = match *self {
            CountAxis::Linear { top, .. } => count / top,
            CountAxis::Log { top } => {
                if count <= 0.0 {
                    return 0.0;
                }
                (count.log10() - LOG_FLOOR.log10()) / (top.log10() - LOG_FLOOR.log10())
            }
        };
        f.clamp(0.0, 1.0)
    }

    fn ticks(&self) -> Vec<f64> {
        match *self {
            CountAxis::Linear { top, step } => {
                let n = (top / step).round() as usize;
                (0..=n).map(|i| i as f64 * step).collect()
            }
            CountAxis::Log { top } => {
                let n = top.log10().round() as i32;
                (0..=n).map(|e| 10f64.powi(e)).collect()
            }
        }
    }
}

/// 1, 2 or 5 times a power of ten, at least `raw`.
fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn format_tick(value: f64) -> String {
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn draw_histogram(hist: &Histogram, spec: &HistogramSpec, style: &PlotStyle) -> RgbImage {
    let width = style.width.max(320);
    let height = style.height.max(240);
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    let left = MARGIN_LEFT;
    let right = width as f32 - MARGIN_RIGHT;
    let top = MARGIN_TOP;
    let bottom = height as f32 - MARGIN_BOTTOM;
    let plot_h = bottom - top;

    let axis = CountAxis::new(hist.max_count(), spec.log_scale);
    let tick_y = |count: f64| bottom - axis.fraction(count) as f32 * plot_h;

    for tick in axis.ticks() {
        let y = tick_y(tick);
        draw_line_segment_mut(&mut img, (left, y), (right, y), GRID);
    }

    let bar_w = (right - left) / hist.bins() as f32;
    for (i, &count) in hist.counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let x0 = (left + bar_w * i as f32).round();
        let x1 = (left + bar_w * (i + 1) as f32).round();
        let y0 = tick_y(count as f64).round();
        let w = (x1 - x0) as u32;
        let h = (bottom.round() - y0) as u32;
        if w == 0 || h == 0 {
            continue;
        }
        let rect = Rect::at(x0 as i32, y0 as i32).of_size(w, h);
        draw_filled_rect_mut(&mut img, rect, BAR_FILL);
        draw_hollow_rect_mut(&mut img, rect, INK);
    }

    draw_line_segment_mut(&mut img, (left, top), (left, bottom), INK);
    draw_line_segment_mut(&mut img, (left, bottom), (right, bottom), INK);

    if let Some(font) = &style.font {
        let label = PxScale::from(16.0);
        let heading = PxScale::from(22.0);

        let (tw, _) = text_size(heading, font, &spec.title);
        let title_x = (width as i32 - tw as i32) / 2;
        draw_text_mut(&mut img, INK, title_x.max(0), 18, heading, font, &spec.title);

        let (xw, _) = text_size(label, font, &spec.x_label);
        let x_label_x = (left + right) as i32 / 2 - xw as i32 / 2;
        draw_text_mut(&mut img, INK, x_label_x, height as i32 - 30, label, font, &spec.x_label);
        draw_text_mut(&mut img, INK, 8, top as i32 - 24, label, font, &spec.y_label);

        for tick in axis.ticks() {
            let text = format_tick(tick);
            let (w, h) = text_size(label, font, &text);
            let y = tick_y(tick) as i32 - h as i32 / 2;
            draw_text_mut(&mut img, INK, left as i32 - 6 - w as i32, y, label, font, &text);
        }

        let n = hist.bins();
        for edge in [0, n / 2, n] {
            let x = left + bar_w * edge as f32;
            draw_line_segment_mut(&mut img, (x, bottom), (x, bottom + 5.0), INK);
            let text = format_tick(hist.edges[edge]);
            let (w, _) = text_size(label, font, &text);
            draw_text_mut(&mut img, INK, x as i32 - w as i32 / 2, bottom as i32 + 8, label, font, &text);
        }
    }

    img
}
