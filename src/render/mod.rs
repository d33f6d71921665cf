//! External rendering collaborators: large numerals and terminal charts.

pub mod figlet;
pub mod gnuplot;

use crate::error::Result;
use crate::models::display::{ChartData, TermSize};
use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use std::io::Write;

pub use figlet::{block_width, concat_blocks, Figlet, Justification};
pub use gnuplot::Gnuplot;

/// Turns short text into oversized ASCII digits. Pure: no state between calls.
pub trait NumeralRenderer {
    fn render(&self, text: &str, width: Option<usize>, justification: Justification) -> Result<String>;
}

/// Draws a chart of the dataset onto the terminal.
pub trait ChartSink {
    fn render(&mut self, chart: &ChartData, size: TermSize) -> Result<()>;
}

impl TermSize {
    /// `COLUMNS`/`LINES` first, then the attached terminal, then 80x20.
    pub fn detect() -> Self {
        let fallback = crossterm::terminal::size()
            .ok()
            .filter(|(columns, rows)| *columns > 0 && *rows > 0)
            .map(|(columns, rows)| TermSize { columns, rows })
            .unwrap_or_default();

        TermSize {
            columns: env_dimension("COLUMNS").unwrap_or(fallback.columns),
            rows: env_dimension("LINES").unwrap_or(fallback.rows),
        }
    }
}

/// Blank the terminal and home the cursor before a fresh render.
pub fn clear_screen(out: &mut impl Write) -> Result<()> {
    crossterm::execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(())
}

fn env_dimension(name: &str) -> Option<u16> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
}
