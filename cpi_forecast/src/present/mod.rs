//! Chart composition for the raw series, its inflation rates and the forecast
//!
//! [`Figure::compose`] turns the pipeline outputs into plain chart
//! descriptions with no terminal dependency; [`render`] draws them with
//! ratatui and [`terminal`] shows them on screen.

pub mod render;
pub mod terminal;

use crate::data::{DerivedSeries, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::forecast::ForecastResult;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub use render::render_figure;
pub use terminal::{show, TerminalSession};

pub const YOY_TITLE: &str = "U.S. YoY Inflation Rate";
pub const QOQ_TITLE: &str = "U.S. QoQ Inflation Rate";
pub const CPI_TITLE: &str = "U.S. Consumer Price Index";
pub const FORECAST_TITLE: &str = "CPI Forecast (ARIMA)";
pub const RECENT_TITLE: &str = "Recent CPI and Forecast";

pub const YEAR_LABEL: &str = "Year";
pub const RATE_LABEL: &str = "Inflation Rate (%)";
pub const CPI_LABEL: &str = "CPI Index";

pub const ACTUAL_LEGEND: &str = "CPI (Actual)";
pub const FORECAST_LEGEND: &str = "CPI Forecast";
pub const PERIOD_LEGEND: &str = "Forecast Period";

/// Most year labels drawn on a time axis
pub const MAX_YEAR_LABELS: usize = 12;

/// Months of history in the forecast detail panel
const RECENT_WINDOW_MONTHS: usize = 24;
/// Months of history in the annotated forecast panel
const ANNOTATED_WINDOW_MONTHS: usize = 60;
/// Share of the value range added above and below the data
const VALUE_PADDING: f64 = 0.05;

/// Arrangement of the chart panels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// YoY rate next to the CPI forecast
    #[default]
    SideBySide,
    /// YoY | QoQ, CPI | recent forecast detail, then a full-width annotated
    /// forecast with its confidence band
    Grid,
}

impl Layout {
    /// Number of derived series the layout plots
    pub fn derived_needed(self) -> usize {
        match self {
            Self::SideBySide => 1,
            Self::Grid => 2,
        }
    }
}

/// What a plotted line represents; the renderer picks colors from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesRole {
    Rate,
    Actual,
    Forecast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

/// A labelled line in chart coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub role: SeriesRole,
    pub style: LineStyle,
    pub points: Vec<(f64, f64)>,
}

/// A filled area behind the lines
#[derive(Debug, Clone, PartialEq)]
pub enum Shading {
    /// Full-height band between two x positions
    Period { label: String, start: f64, end: f64 },
    /// Area between two curves sharing x positions
    Band {
        label: String,
        lower: Vec<(f64, f64)>,
        upper: Vec<(f64, f64)>,
    },
}

/// Time axis labelled by year, bounded by January 1st of its first and last year
#[derive(Debug, Clone, PartialEq)]
pub struct YearAxis {
    pub title: String,
    pub bounds: [f64; 2],
    /// Evenly spaced year labels
    pub labels: Vec<String>,
}

impl YearAxis {
    /// Axis covering `first..=last`, thinned to at most [`MAX_YEAR_LABELS`] labels
    pub fn covering(title: &str, first: NaiveDate, last: NaiveDate) -> Result<Self> {
        let first_year = first.year();
        let last_year = if last.ordinal() == 1 {
            last.year()
        } else {
            last.year() + 1
        };

        let span = u32::try_from(last_year - first_year).unwrap_or(0).max(1);
        let step = span.div_ceil(MAX_YEAR_LABELS as u32 - 1);
        let intervals = span.div_ceil(step);
        let end_year = first_year + (intervals * step) as i32;

        let labels = (0..=intervals)
            .map(|i| (first_year + (i * step) as i32).to_string())
            .collect();

        Ok(Self {
            title: title.to_string(),
            bounds: [january_first(first_year)?, january_first(end_year)?],
            labels,
        })
    }
}

/// Value axis with labels at the bottom, middle and top
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAxis {
    pub title: String,
    pub bounds: [f64; 2],
    pub labels: Vec<String>,
}

impl ValueAxis {
    fn spanning(title: &str, min: f64, max: f64) -> Self {
        let range = max - min;
        let pad = if range > 0.0 {
            range * VALUE_PADDING
        } else {
            (max.abs() * VALUE_PADDING).max(1.0)
        };
        let bounds = [min - pad, max + pad];
        let labels = [bounds[0], (bounds[0] + bounds[1]) / 2.0, bounds[1]]
            .iter()
            .map(|v| format!("{:.1}", v))
            .collect();

        Self {
            title: title.to_string(),
            bounds,
            labels,
        }
    }
}

/// One chart: title, axes, lines and shaded areas
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    pub title: String,
    pub x_axis: YearAxis,
    pub y_axis: ValueAxis,
    pub lines: Vec<LineSeries>,
    pub shading: Vec<Shading>,
}

impl ChartPanel {
    fn new(
        title: impl Into<String>,
        y_title: &str,
        lines: Vec<LineSeries>,
        shading: Vec<Shading>,
    ) -> Result<Self> {
        let title = title.into();
        let mut xs = lines.iter().flat_map(|l| l.points.iter().map(|p| p.0));
        let first_x = xs
            .next()
            .ok_or_else(|| ForecastError::RenderFailure(format!("Chart '{}' has no data", title)))?;
        let (x_min, x_max) = xs.fold((first_x, first_x), |(lo, hi), x| (lo.min(x), hi.max(x)));

        let mut ys: Vec<f64> = lines
            .iter()
            .flat_map(|l| l.points.iter().map(|p| p.1))
            .collect();
        for shade in &shading {
            if let Shading::Band { lower, upper, .. } = shade {
                ys.extend(lower.iter().chain(upper).map(|p| p.1));
            }
        }
        let y_min = ys.iter().copied().fold(f64::INFINITY, f64::min);
        let y_max = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            x_axis: YearAxis::covering(YEAR_LABEL, x_to_date(x_min)?, x_to_date(x_max)?)?,
            y_axis: ValueAxis::spanning(y_title, y_min, y_max),
            title,
            lines,
            shading,
        })
    }

    /// Line with the given legend label
    pub fn line(&self, label: &str) -> Option<&LineSeries> {
        self.lines.iter().find(|l| l.label == label)
    }
}

/// A set of panels and the layout to arrange them in
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    layout: Layout,
    panels: Vec<ChartPanel>,
}

impl Figure {
    /// Build every panel of `layout`.
    ///
    /// `derived` supplies the rate series in display order (YoY first); the
    /// layout decides how many are shown. Empty input is a
    /// [`ForecastError::RenderFailure`].
    pub fn compose(
        layout: Layout,
        raw: &TimeSeries,
        derived: &[DerivedSeries],
        forecast: &ForecastResult,
    ) -> Result<Self> {
        if raw.is_empty() {
            return Err(ForecastError::RenderFailure(
                "Nothing to plot: the CPI series is empty".to_string(),
            ));
        }
        if forecast.points().is_empty() {
            return Err(ForecastError::RenderFailure(
                "Nothing to plot: the forecast is empty".to_string(),
            ));
        }
        if derived.len() < layout.derived_needed() {
            return Err(ForecastError::RenderFailure(format!(
                "{:?} layout needs {} derived series, got {}",
                layout,
                layout.derived_needed(),
                derived.len()
            )));
        }

        let panels = match layout {
            Layout::SideBySide => vec![
                rate_panel(YOY_TITLE, &derived[0])?,
                forecast_panel(FORECAST_TITLE, raw, forecast, true)?,
            ],
            Layout::Grid => vec![
                rate_panel(YOY_TITLE, &derived[0])?,
                rate_panel(QOQ_TITLE, &derived[1])?,
                actual_panel(raw)?,
                forecast_panel(RECENT_TITLE, &raw.tail(RECENT_WINDOW_MONTHS), forecast, false)?,
                forecast_panel(
                    annotation(forecast),
                    &raw.tail(ANNOTATED_WINDOW_MONTHS),
                    forecast,
                    true,
                )?,
            ],
        };

        Ok(Self { layout, panels })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Panels in reading order
    pub fn panels(&self) -> &[ChartPanel] {
        &self.panels
    }
}

/// Chart x coordinate of a date
pub fn date_to_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn x_to_date(x: f64) -> Result<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .ok_or_else(|| ForecastError::RenderFailure(format!("x position {} is not a date", x)))
}

fn january_first(year: i32) -> Result<f64> {
    NaiveDate::from_yo_opt(year, 1)
        .map(date_to_x)
        .ok_or_else(|| ForecastError::RenderFailure(format!("Year {} is out of range", year)))
}

fn rate_panel(title: &str, series: &DerivedSeries) -> Result<ChartPanel> {
    let points: Vec<(f64, f64)> = series
        .defined()
        .map(|o| (date_to_x(o.date), o.value))
        .collect();
    if points.is_empty() {
        return Err(ForecastError::RenderFailure(format!(
            "'{}' has no defined values; the range is shorter than its {}-month lag",
            series.label(),
            series.lag()
        )));
    }

    let line = LineSeries {
        label: series.label().to_string(),
        role: SeriesRole::Rate,
        style: LineStyle::Solid,
        points,
    };
    ChartPanel::new(title, RATE_LABEL, vec![line], Vec::new())
}

fn actual_line(raw: &TimeSeries) -> LineSeries {
    LineSeries {
        label: ACTUAL_LEGEND.to_string(),
        role: SeriesRole::Actual,
        style: LineStyle::Solid,
        points: raw
            .observations()
            .map(|o| (date_to_x(o.date), o.value))
            .collect(),
    }
}

fn actual_panel(raw: &TimeSeries) -> Result<ChartPanel> {
    ChartPanel::new(CPI_TITLE, CPI_LABEL, vec![actual_line(raw)], Vec::new())
}

/// Actual values, the dashed forecast continuing from the last actual point,
/// the forecast period and optionally the confidence band
fn forecast_panel(
    title: impl Into<String>,
    raw: &TimeSeries,
    forecast: &ForecastResult,
    with_band: bool,
) -> Result<ChartPanel> {
    let anchor = (date_to_x(raw.last_date()), raw.last_value());
    let forecast_points: Vec<(f64, f64)> = std::iter::once(anchor)
        .chain(forecast.points().iter().map(|p| (date_to_x(p.date), p.value)))
        .collect();
    let end = forecast_points.last().map_or(anchor.0, |p| p.0);

    let mut shading = vec![Shading::Period {
        label: PERIOD_LEGEND.to_string(),
        start: anchor.0,
        end,
    }];

    if let (true, Some(bounds), Some(level)) = (with_band, forecast.bounds(), forecast.level()) {
        let (lower, upper): (Vec<(f64, f64)>, Vec<(f64, f64)>) = std::iter::once(((anchor.0, anchor.1), (anchor.0, anchor.1)))
            .chain(forecast.points().iter().zip(bounds).map(|(p, b)| {
                let x = date_to_x(p.date);
                ((x, b.lower), (x, b.upper))
            }))
            .unzip();
        shading.push(Shading::Band {
            label: format!("{:.0}% Confidence Interval", level * 100.0),
            lower,
            upper,
        });
    }

    let lines = vec![
        actual_line(raw),
        LineSeries {
            label: FORECAST_LEGEND.to_string(),
            role: SeriesRole::Forecast,
            style: LineStyle::Dashed,
            points: forecast_points,
        },
    ];
    ChartPanel::new(title, CPI_LABEL, lines, shading)
}

/// Forecast title naming the final forecast month, its value and bounds
fn annotation(forecast: &ForecastResult) -> String {
    let Some(last) = forecast.points().last() else {
        return FORECAST_TITLE.to_string();
    };
    let month = last.date.format("%b %Y");
    match (forecast.bounds().and_then(|b| b.last()), forecast.level()) {
        (Some(bound), Some(level)) => format!(
            "{}: {} at {:.2} ({:.0}% CI {:.2} to {:.2})",
            FORECAST_TITLE,
            month,
            last.value,
            level * 100.0,
            bound.lower,
            bound.upper
        ),
        _ => format!("{}: {} at {:.2}", FORECAST_TITLE, month, last.value),
    }
}
