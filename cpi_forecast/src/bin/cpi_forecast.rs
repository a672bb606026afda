//! Interactive CPI forecast: prompts for a date range, fits an ARIMA model to
//! FRED's CPIAUCSL series, prompts for a horizon and charts the result.

use anyhow::Context;
use cpi_forecast::fetch::FredClient;
use cpi_forecast::pipeline::{Pipeline, PipelineConfig};
use cpi_forecast::present::{self, Figure};
use cpi_forecast::prompt::Prompter;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    let start = prompter.start_date()?;
    let end = prompter.end_date()?;

    let client = FredClient::new()?;
    let pipeline = Pipeline::new(client, PipelineConfig::new(start, end));

    let raw = pipeline.fetch().context("Could not load CPI data")?;
    let derived = pipeline.transform(&raw)?;
    let model = pipeline.fit(&raw).context("Could not fit an ARIMA model")?;
    println!("Best ARIMA model: {}", model);

    let horizon = prompter.horizon()?;
    let forecast = pipeline.forecast(&model, horizon)?;
    println!();
    print!("{}", forecast);

    let figure = Figure::compose(pipeline.config().layout, &raw, &derived, &forecast)?;
    present::show(&figure).context("Could not display the charts")?;

    Ok(())
}
