use std::io::{self, Write};

use terminal_size::{Width, terminal_size};

use crate::errors::EnvironmentError;

/// Iteration progress reporting for the search loop. The driver does not care
/// whether anything is rendered.
pub trait ProgressSink {
    fn render(&mut self, iteration: usize, total: usize, best_cost: f64);
    fn finish(&mut self) {}
}

/// Default sink: renders nothing.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn render(&mut self, _iteration: usize, _total: usize, _best_cost: f64) {}
}

/// Carriage-return progress line with a `#`-bar sized to the terminal. When
/// the width probe fails the bar is silently dropped and only the prefix is
/// printed.
pub struct ConsoleProgress;

impl ConsoleProgress {
    const EXCESS: usize = 10;

    fn _width() -> Result<usize, EnvironmentError> {
        match terminal_size() {
            Some((Width(columns), _)) => Ok(columns as usize),
            None => Err(EnvironmentError {
                message: "Unable to query the terminal size",
            }),
        }
    }
}

impl ProgressSink for ConsoleProgress {
    fn render(&mut self, iteration: usize, total: usize, best_cost: f64) {
        let mut line = format!("Iteration #{}/{}({:.2}) ", iteration + 1, total, best_cost);

        if let Ok(width) = Self::_width() {
            if line.len() + Self::EXCESS < width {
                let cells = width - line.len() - Self::EXCESS;
                let cover = if total == 0 {
                    cells
                } else {
                    ((iteration * cells + total - 1) / total).min(cells)
                };

                line.push('[');
                line.push_str(&"#".repeat(cover));
                line.push_str(&" ".repeat(cells - cover));
                line.push(']');
            }
        }

        eprint!("{line}\r");
        let _ = io::stderr().flush();
    }

    fn finish(&mut self) {
        eprintln!();
    }
}
