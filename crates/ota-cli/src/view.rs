//! Terminal rendering of the upload panel
//!
//! The progress region maps to an `indicatif` bar, the status line to a
//! colored message. Only changes between frames are printed.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;

use ota_client::{StatusKind, StatusMessage, UploadPanel, UploadView};

#[derive(Default)]
struct ViewState {
    bar: Option<ProgressBar>,
    status: StatusMessage,
}

/// [`UploadView`] drawing to the terminal
pub struct TerminalView {
    quiet: bool,
    state: Mutex<ViewState>,
}

impl TerminalView {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            state: Mutex::new(ViewState::default()),
        }
    }

    fn new_bar(&self) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);
        bar
    }

    fn print_status(&self, status: &StatusMessage) {
        match status.kind {
            StatusKind::Success if !self.quiet => println!("{}", status.text.green()),
            StatusKind::Success => {}
            StatusKind::Error => eprintln!("{}", status.text.red()),
            StatusKind::Neutral if !self.quiet => println!("{}", status.text),
            StatusKind::Neutral => {}
        }
    }
}

impl UploadView for TerminalView {
    fn render(&self, panel: &UploadPanel) {
        let mut state = self.state.lock();

        if panel.progress_visible() {
            let bar = state.bar.get_or_insert_with(|| self.new_bar());
            bar.set_position(panel.progress.percent.round() as u64);
            bar.set_message(panel.progress.label());
        } else if let Some(bar) = state.bar.take() {
            bar.abandon();
        }

        if panel.status != state.status {
            if !panel.status.is_empty() {
                if let Some(bar) = &state.bar {
                    bar.finish();
                }
                self.print_status(&panel.status);
            }
            state.status = panel.status.clone();
        }
    }
}
