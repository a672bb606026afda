//! On-screen display of a [`Figure`]

use super::{render_figure, Figure};
use crate::error::{ForecastError, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use tracing::{debug, warn};

fn render_error(context: &str, err: io::Error) -> ForecastError {
    ForecastError::RenderFailure(format!("{}: {}", context, err))
}

/// Raw mode and the alternate screen, held for the lifetime of the value.
///
/// Dropping the session restores the terminal, including on early returns
/// and panics.
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().map_err(|e| render_error("Failed to enable raw mode", e))?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(render_error("Failed to enter the alternate screen", e));
        }

        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => {
                debug!("terminal session started");
                Ok(Self { terminal })
            }
            Err(e) => {
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
                Err(render_error("Failed to initialize the terminal", e))
            }
        }
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "failed to disable raw mode");
        }
        if let Err(e) = execute!(self.terminal.backend_mut(), LeaveAlternateScreen) {
            warn!(error = %e, "failed to leave the alternate screen");
        }
        if let Err(e) = self.terminal.show_cursor() {
            warn!(error = %e, "failed to show the cursor");
        }
    }
}

/// Keys that dismiss the charts
pub fn is_close_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Show `figure` full screen until the user closes it; redraws on resize
pub fn show(figure: &Figure) -> Result<()> {
    let mut session = TerminalSession::enter()?;

    loop {
        session
            .terminal_mut()
            .draw(|frame| {
                let area = frame.area();
                render_figure(frame, area, figure)
            })
            .map_err(|e| render_error("Failed to draw charts", e))?;

        match event::read().map_err(|e| render_error("Failed to read terminal input", e))? {
            Event::Key(key) if is_close_key(&key) => break,
            Event::Resize(width, height) => debug!(width, height, "terminal resized"),
            _ => {}
        }
    }

    Ok(())
}
