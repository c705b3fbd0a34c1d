//! Terminal status sink.

use console::style;
use indicatif::{HumanBytes, ProgressBar};

use crate::download::Phase;
use crate::output::console::print_info;
use crate::output::progress::{create_spinner, set_download_style};
use crate::status::StatusSink;

/// Renders pipeline state on the terminal.
///
/// Shows a spinner once the fetch starts (never over a permission prompt),
/// switching to a byte bar when the fetch reports a total. In quiet mode
/// only the status line is printed.
pub struct ConsoleSink {
    quiet: bool,
    busy: bool,
    bar: Option<ProgressBar>,
    sized: bool,
    last_status: Option<String>,
}

impl ConsoleSink {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            busy: false,
            bar: None,
            sized: false,
            last_status: None,
        }
    }

    /// Last status line shown.
    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    fn with_bar_hidden(&self, f: impl FnOnce()) {
        match &self.bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }
}

impl StatusSink for ConsoleSink {
    fn update(&mut self, text: &str) {
        self.last_status = Some(text.to_string());
        self.with_bar_hidden(|| print_info(text));
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        if !busy {
            if let Some(bar) = self.bar.take() {
                bar.finish_and_clear();
            }
            self.sized = false;
        }
    }

    fn show_dialog(&mut self, title: &str, message: &str) {
        if self.quiet {
            return;
        }
        self.with_bar_hidden(|| {
            println!();
            println!("  {}", style(title).bold());
            println!("  {}", message);
            println!();
        });
    }

    fn phase_changed(&mut self, phase: &Phase) {
        tracing::debug!("Phase: {}", phase);
        if let Some(bar) = &self.bar {
            bar.set_message(phase.to_string());
        } else if self.busy && !self.quiet && *phase != Phase::RequestingPermission {
            self.bar = Some(create_spinner(&phase.to_string()));
        }
    }

    fn progress(&mut self, done: u64, total: Option<u64>) {
        let Some(bar) = &self.bar else {
            return;
        };
        match total {
            Some(total) => {
                if !self.sized {
                    set_download_style(bar, total);
                    self.sized = true;
                }
                bar.set_position(done);
            }
            None => bar.set_message(format!("fetching {}", HumanBytes(done))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_sink_keeps_status_without_bar() {
        let mut sink = ConsoleSink::new(true);
        sink.set_busy(true);
        sink.phase_changed(&Phase::Fetching);
        assert!(sink.bar.is_none());

        sink.progress(10, Some(100));
        sink.show_dialog("Download complete", "saved");
        sink.update("Download complete: a.mp4");
        sink.set_busy(false);

        assert_eq!(sink.last_status(), Some("Download complete: a.mp4"));
    }

    #[test]
    fn test_spinner_waits_for_fetch_and_clears_when_idle() {
        let mut sink = ConsoleSink::new(false);
        sink.set_busy(true);
        sink.phase_changed(&Phase::RequestingPermission);
        assert!(sink.bar.is_none());

        sink.phase_changed(&Phase::Fetching);
        sink.progress(5, Some(10));
        assert!(sink.sized);

        sink.set_busy(false);
        assert!(sink.bar.is_none());
    }
}
