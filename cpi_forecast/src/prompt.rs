//! Interactive prompts for the run parameters

use crate::error::{ForecastError, Result};
use crate::forecast::Horizon;
use crate::utils::parse_iso_date;
use chrono::NaiveDate;
use std::io::{BufRead, Write};

pub const START_PROMPT: &str = "Enter start date (YYYY-MM-DD): ";
pub const END_PROMPT: &str = "Enter end date (YYYY-MM-DD): ";
pub const HORIZON_PROMPT: &str = "Enter forecast period in months: ";

/// Reads answers from `input` after writing each prompt to `output`
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Write `prompt` and read one line, without its line ending
    pub fn ask(&mut self, prompt: &str) -> Result<String> {
        let io_error = |e: std::io::Error| ForecastError::InvalidInput(format!("Prompt failed: {}", e));

        self.output.write_all(prompt.as_bytes()).map_err(io_error)?;
        self.output.flush().map_err(io_error)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Err(ForecastError::InvalidInput(format!(
                "Input closed before answering '{}'",
                prompt.trim()
            )));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    pub fn start_date(&mut self) -> Result<NaiveDate> {
        parse_iso_date(&self.ask(START_PROMPT)?)
    }

    pub fn end_date(&mut self) -> Result<NaiveDate> {
        parse_iso_date(&self.ask(END_PROMPT)?)
    }

    pub fn horizon(&mut self) -> Result<Horizon> {
        self.ask(HORIZON_PROMPT)?.parse()
    }

    /// Consume the prompter, returning the output writer
    pub fn into_output(self) -> W {
        self.output
    }
}
