//! Upload panel state
//!
//! The panel is what a front end shows while an upload runs: either the
//! submission form or the progress view, a status line, and a progress bar.
//! Each transition method corresponds to one request lifecycle event.

use serde::{Deserialize, Serialize};

/// Shown when a submission has no file attached
pub const MSG_NO_FILE: &str = "Please select a file!";
/// Shown when the device accepted the image
pub const MSG_SUCCESS: &str = "Upload complete! Rebooting...";
/// Prefix for every failure message
pub const MSG_FAILED_PREFIX: &str = "Upload failed! ";
/// Shown when no response arrived at all
pub const MSG_NETWORK_ERROR: &str = "Upload failed! A network error occurred.";

/// Which region of the panel is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiPhase {
    /// Submission form shown, progress hidden
    #[default]
    FormVisible,
    /// Form hidden, progress container shown
    UploadInProgress,
}

/// Styling of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    #[default]
    Neutral,
    Success,
    Error,
}

/// Status line text and styling
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }

    /// Empty text with neutral styling
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Progress bar state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressState {
    /// Bar width in percent (unrounded)
    pub percent: f64,
}

impl ProgressState {
    /// Label shown on the bar, e.g. `"42%"`
    pub fn label(&self) -> String {
        format!("{}%", self.percent.round() as u64)
    }
}

/// Percentage of `loaded` over `total`, or `None` when the total is unknown
pub fn progress_percent(loaded: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(loaded as f64 / total as f64 * 100.0)
}

/// Complete visible state of an upload front end
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UploadPanel {
    pub phase: UiPhase,
    pub status: StatusMessage,
    pub progress: ProgressState,
}

impl UploadPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form_visible(&self) -> bool {
        self.phase == UiPhase::FormVisible
    }

    pub fn progress_visible(&self) -> bool {
        self.phase == UiPhase::UploadInProgress
    }

    /// Submission without a file: error message, phase unchanged
    pub fn reject_missing_file(&mut self) {
        self.status = StatusMessage::error(MSG_NO_FILE);
    }

    /// Request started: switch to the progress view and reset it
    pub fn begin_upload(&mut self) {
        self.phase = UiPhase::UploadInProgress;
        self.status = StatusMessage::cleared();
        self.progress = ProgressState::default();
    }

    /// Bytes sent so far. Ignored when the total is unknown or zero; senders
    /// of an empty file report the request body instead.
    pub fn update_progress(&mut self, loaded: u64, total: u64) {
        if let Some(percent) = progress_percent(loaded, total) {
            self.progress.percent = percent;
        }
    }

    /// Device answered 200: success message, progress view stays
    pub fn complete(&mut self) {
        self.status = StatusMessage::success(MSG_SUCCESS);
    }

    /// Device answered with any other status: show its body, back to the form
    pub fn fail_with_response(&mut self, body: &str) {
        self.status = StatusMessage::error(format!("{}{}", MSG_FAILED_PREFIX, body));
        self.phase = UiPhase::FormVisible;
    }

    /// No response at all: generic message, back to the form
    pub fn fail_network(&mut self) {
        self.status = StatusMessage::error(MSG_NETWORK_ERROR);
        self.phase = UiPhase::FormVisible;
    }
}
