use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use chrono::NaiveDate;
use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::RangedCoordusize;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::series::{DeltaSeries, Metric, TimeSeries};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
/// Dense date axes stay readable with at most this many labels.
pub const MAX_X_LABELS: usize = 10;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("no data to plot")]
    NoData,
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("chart file not accessible: {0}")]
    Io(#[from] std::io::Error),
    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn draw_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Draw(e.to_string())
}

// ab_glyph does not look up system fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        if plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../assets/DejaVuSans.ttf"),
        )
        .is_err()
        {
            log::error!("Bundled chart font could not be loaded");
        }
    });
}

struct Line {
    label: String,
    color: RGBAColor,
    points: Vec<(String, i64)>,
}

struct Chart {
    title: String,
    lines: Vec<Line>,
}

/// Renders line charts into a single image file that is overwritten on each
/// call. Renders are serialized so the bytes returned always belong to the
/// chart that was requested.
#[derive(Clone)]
pub struct ChartRenderer {
    path: Arc<Mutex<PathBuf>>,
}

impl ChartRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(Mutex::new(path.into())),
        }
    }

    /// Cumulative series of a single metric.
    pub async fn render_single(
        &self,
        series: &TimeSeries,
        label: &str,
        color: Option<RGBColor>,
    ) -> Result<Vec<u8>, ChartError> {
        let chart = Chart {
            title: format!("Total No. of Covid-19 cases - {label}"),
            lines: vec![Line {
                label: label.to_string(),
                color: color.unwrap_or(BLUE).to_rgba(),
                points: series.points().to_vec(),
            }],
        };
        self.render(chart).await
    }

    /// Daily increments of two metrics on the same axes.
    pub async fn render_comparison(
        &self,
        series_a: &DeltaSeries,
        label_a: &str,
        series_b: &DeltaSeries,
        label_b: &str,
    ) -> Result<Vec<u8>, ChartError> {
        let lines = [(series_a, label_a), (series_b, label_b)]
            .into_iter()
            .enumerate()
            .map(|(idx, (series, label))| Line {
                label: label.to_string(),
                color: Palette99::pick(idx).to_rgba(),
                points: series.points().to_vec(),
            })
            .collect();

        let chart = Chart {
            title: format!("New {label_a} vs New {label_b}"),
            lines,
        };
        self.render(chart).await
    }

    async fn render(&self, chart: Chart) -> Result<Vec<u8>, ChartError> {
        if chart.lines.iter().all(|line| line.points.is_empty()) {
            return Err(ChartError::NoData);
        }

        let path = self.path.lock().await;
        let target = path.clone();
        log::debug!("Rendering \"{}\" to {}", chart.title, target.display());

        let bytes = tokio::task::spawn_blocking(move || {
            draw_chart(&target, &chart)?;
            Ok::<_, ChartError>(std::fs::read(&target)?)
        })
        .await??;

        drop(path);
        Ok(bytes)
    }
}

/// Color used when a metric is plotted on its own.
pub fn metric_color(metric: Metric) -> RGBColor {
    match metric {
        Metric::Cases => BLUE,
        Metric::Recovered => GREEN,
        Metric::Deaths => RED,
    }
}

/// Day indices that get a date label, never more than [`MAX_X_LABELS`].
fn x_label_positions(days: usize) -> Vec<usize> {
    let last = days.saturating_sub(1).max(1);
    RangedCoordusize::from(0..last).key_points(MAX_X_LABELS)
}

/// API dates look like `3/22/20`; anything else is shown unchanged.
fn date_label(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%m/%d/%y") {
        Ok(d) => d.format("%d %b %y").to_string(),
        Err(_) => date.to_string(),
    }
}

fn value_range(chart: &Chart) -> (i64, i64) {
    let values = chart
        .lines
        .iter()
        .flat_map(|line| line.points.iter().map(|(_, v)| *v));
    let (min, max) = values.fold((i64::MAX, i64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min >= max {
        (min.saturating_sub(1), max.saturating_add(1))
    } else {
        (min, max)
    }
}

fn draw_chart(path: &Path, chart: &Chart) -> Result<(), ChartError> {
    ensure_fonts_registered();

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    // Dates of the longest line label the shared x axis.
    let dates: Vec<String> = chart
        .lines
        .iter()
        .max_by_key(|line| line.points.len())
        .map(|line| line.points.iter().map(|(d, _)| date_label(d)).collect())
        .unwrap_or_default();
    let last = dates.len().saturating_sub(1).max(1);
    let (min_val, max_val) = value_range(chart);

    let mut ctx = ChartBuilder::on(&root)
        .margin(20)
        .caption(&chart.title, ("sans-serif", 24))
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(0usize..last, min_val..max_val)
        .map_err(draw_err)?;

    let labelled = x_label_positions(dates.len());
    let x_label_fmt = |x: &usize| {
        if labelled.contains(x) {
            dates.get(*x).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };

    ctx.configure_mesh()
        .x_labels(MAX_X_LABELS)
        .x_label_formatter(&x_label_fmt)
        .y_desc("No. of Cases")
        .label_style(("sans-serif", 13))
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(draw_err)?;

    for line in &chart.lines {
        let color = line.color.clone();
        let style = ShapeStyle {
            color: color.clone(),
            filled: false,
            stroke_width: 2,
        };
        ctx.draw_series(LineSeries::new(
            line.points.iter().enumerate().map(|(i, (_, v))| (i, *v)),
            style,
        ))
        .map_err(draw_err)?
        .label(line.label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color.clone()));
    }

    ctx.configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.85))
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}
