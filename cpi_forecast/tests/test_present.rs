use chrono::NaiveDate;
use cpi_forecast::fetch::{InMemorySource, CPI_SERIES_ID};
use cpi_forecast::pipeline::{Pipeline, PipelineConfig};
use cpi_forecast::present::{
    render_figure, Figure, Layout, Shading, CPI_LABEL, FORECAST_TITLE, PERIOD_LEGEND, YEAR_LABEL,
};
use cpi_forecast::utils::add_months;
use cpi_forecast::{ForecastError, Horizon, IntervalMode, TimeSeries};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_source(months: u32) -> InMemorySource {
    let dates = (0..months)
        .map(|i| add_months(ymd(2016, 1, 1), i).unwrap())
        .collect();
    let values = (0..months)
        .map(|i| 237.0 + 0.2 * i as f64 + 0.4 * ((i % 4) as f64 - 1.5))
        .collect();
    InMemorySource::new(TimeSeries::new(CPI_SERIES_ID, dates, values).unwrap())
}

#[test]
fn test_side_by_side_renders_to_buffer() {
    let config = PipelineConfig::new(ymd(2016, 1, 1), ymd(2020, 12, 1))
        .with_horizon(Horizon::new(9).unwrap())
        .with_interval(IntervalMode::PointOnly);
    let output = Pipeline::new(sample_source(60), config).run().unwrap();
    let figure = output.figure(Layout::SideBySide).unwrap();

    let cpi = &figure.panels()[1];
    assert_eq!(cpi.title, FORECAST_TITLE);
    assert_eq!(cpi.x_axis.title, YEAR_LABEL);
    assert_eq!(cpi.y_axis.title, CPI_LABEL);
    assert!(matches!(&cpi.shading[..], [Shading::Period { label, .. }] if label == PERIOD_LEGEND));

    let mut terminal = Terminal::new(TestBackend::new(180, 45)).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            render_figure(frame, area, &figure)
        })
        .unwrap();
    let text: String = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect();

    assert!(text.contains(FORECAST_TITLE));
    assert!(text.contains("2016"));
}

#[test]
fn test_range_shorter_than_lag_cannot_be_drawn() {
    let config = PipelineConfig::new(ymd(2016, 1, 1), ymd(2016, 11, 1))
        .with_horizon(Horizon::new(3).unwrap())
        .with_arima(cpi_forecast::AutoArimaConfig::default().with_max_orders(1, 1, 1));
    let output = Pipeline::new(sample_source(60), config).run().unwrap();

    assert_eq!(output.raw.len(), 11);
    assert_eq!(output.derived[0].defined_count(), 0);
    assert!(matches!(
        output.figure(Layout::SideBySide),
        Err(ForecastError::RenderFailure(_))
    ));
}
