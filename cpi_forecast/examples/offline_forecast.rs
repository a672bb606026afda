//! Runs the whole pipeline on a synthetic CPI-like series, without network
//! access. Charts are shown when stdout is a terminal.

use chrono::NaiveDate;
use cpi_forecast::fetch::{InMemorySource, CPI_SERIES_ID};
use cpi_forecast::forecast::Horizon;
use cpi_forecast::pipeline::{Pipeline, PipelineConfig};
use cpi_forecast::present::{self, Layout};
use cpi_forecast::utils::add_months;
use cpi_forecast::TimeSeries;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::io::IsTerminal;

fn synthetic_cpi(start: NaiveDate, months: u32) -> Result<TimeSeries, Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(2024);
    let noise = Normal::new(0.0, 0.15)?;

    let mut dates = Vec::with_capacity(months as usize);
    let mut values = Vec::with_capacity(months as usize);
    for t in 0..months {
        let seasonal = 0.3 * (t as f64 * std::f64::consts::PI / 6.0).sin();
        dates.push(add_months(start, t)?);
        values.push(234.0 * 1.0018_f64.powi(t as i32) + seasonal + noise.sample(&mut rng));
    }

    Ok(TimeSeries::new(CPI_SERIES_ID, dates, values)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2012, 1, 1).ok_or("invalid start date")?;
    let end = NaiveDate::from_ymd_opt(2023, 12, 1).ok_or("invalid end date")?;
    let cpi = synthetic_cpi(start, 144)?;
    println!("Generated {} monthly observations", cpi.len());

    let config = PipelineConfig::new(start, end)
        .with_horizon(Horizon::new(18)?)
        .with_layout(Layout::Grid);
    let pipeline = Pipeline::new(InMemorySource::new(cpi), config);
    let output = pipeline.run()?;

    println!("Best ARIMA model: {}", output.model);
    if let Some(report) = output.model.search() {
        println!(
            "Searched {} candidates with d = {}",
            report.fits(),
            report.d
        );
    }
    println!();
    print!("{}", output.forecast);

    if std::io::stdout().is_terminal() {
        let figure = output.figure(pipeline.config().layout)?;
        present::show(&figure)?;
    }

    Ok(())
}
