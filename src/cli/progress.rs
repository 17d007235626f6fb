//! Console progress for the `scan` command.
//!
//! Renders each forwarded [`ProgressEvent`] as one status line on stderr so that
//! stdout stays clean for `--format json`.

use console::{Term, style};

use crate::scan::{ProgressEvent, ProgressSink, ScanPhase};

const BAR_WIDTH: usize = 30;

/// [`ProgressSink`] that redraws a single line on the terminal
pub struct ConsoleProgress {
    term: Term,
    interactive: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let term = Term::stderr();
        let interactive = term.is_term();
        Self { term, interactive }
    }

    /// Status line for one event
    pub fn render(event: &ProgressEvent) -> String {
        let phase = match event.phase {
            ScanPhase::Done => style(event.phase.to_string()).green().to_string(),
            ScanPhase::Failed => style(event.phase.to_string()).red().to_string(),
            _ => style(event.phase.to_string()).cyan().to_string(),
        };
        let message = event.message.as_deref().unwrap_or("");
        format!(
            "{} {:>3}% {} {}",
            render_progress_bar(event.percent, BAR_WIDTH),
            event.percent,
            phase,
            message
        )
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        let line = Self::render(&event);
        if self.interactive {
            let _ = self.term.clear_line();
            let _ = self.term.write_str(&line);
            if event.phase.is_terminal() {
                let _ = self.term.write_line("");
            }
        } else {
            let _ = self.term.write_line(&line);
        }
    }
}

/// Render a simple progress bar
fn render_progress_bar(percent: u8, width: usize) -> String {
    let progress = (percent.min(100) as f32) / 100.0;
    let filled = (progress * width as f32) as usize;
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}
