//! Presentation view model
//!
//! The state machine never touches a rendering surface. It hands the
//! presentation layer a complete `ViewModel` every time something changes.

use serde::{Deserialize, Serialize};

use crate::domain::status::{Status, StatusSnapshot};

/// Progress shown before any snapshot has been decoded
pub const PROGRESS_UNKNOWN: u8 = 10;
pub const PROGRESS_PENDING: u8 = 25;
pub const PROGRESS_PROCESSING: u8 = 75;
pub const PROGRESS_DONE: u8 = 100;

const NOT_AVAILABLE: &str = "N/A";

/// Visual style of the progress indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressStyle {
    InProgress,
    Done,
}

/// Everything the presentation surface shows for a tracked job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub status_text: String,
    pub progress: u8,
    pub progress_style: ProgressStyle,
    pub position_text: String,
    pub estimated_time_text: String,
    pub spinner_visible: bool,
    pub home_visible: bool,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            status_text: headline(Status::Unknown, None, None),
            progress: PROGRESS_UNKNOWN,
            progress_style: ProgressStyle::InProgress,
            position_text: NOT_AVAILABLE.to_string(),
            estimated_time_text: NOT_AVAILABLE.to_string(),
            spinner_visible: true,
            home_visible: false,
        }
    }
}

impl ViewModel {
    /// Refresh every snapshot-derived field
    ///
    /// `dots` trailing periods are appended to active headlines only.
    pub fn apply_snapshot(&mut self, snapshot: &StatusSnapshot, dots: u8) {
        let mut text = headline(
            snapshot.status,
            snapshot.position,
            snapshot.estimated_time_seconds,
        );
        if snapshot.status.is_active() {
            text.push_str(&".".repeat(usize::from(dots)));
        }

        self.status_text = text;
        self.set_progress(progress_for(snapshot.status));
        self.position_text = snapshot
            .position
            .map(|p| format!("Position: {}", p))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        self.estimated_time_text = snapshot
            .estimated_time_seconds
            .map(|t| format!("Estimated Time: {}s", t))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    }

    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(PROGRESS_DONE);
        self.progress_style = if self.progress == PROGRESS_DONE {
            ProgressStyle::Done
        } else {
            ProgressStyle::InProgress
        };
    }
}

/// Fixed progress milestone for a status
pub fn progress_for(status: Status) -> u8 {
    match status {
        Status::Pending => PROGRESS_PENDING,
        Status::Processing => PROGRESS_PROCESSING,
        Status::Completed | Status::Failed | Status::Cancelled => PROGRESS_DONE,
        Status::Unknown => PROGRESS_UNKNOWN,
    }
}

/// Headline text for a status, without animation dots
pub fn headline(status: Status, position: Option<i64>, estimated: Option<u64>) -> String {
    match status {
        Status::Pending => {
            let mut message = String::from("In queue");
            if let Some(position) = position.filter(|p| *p > 0) {
                message.push_str(&format!(", position {}", position));
                if let Some(estimated) = estimated {
                    message.push_str(&format!(" (Est. {}s)", estimated));
                }
            }
            message
        }
        Status::Processing => "Processing your request".to_string(),
        Status::Completed => "Request completed! Redirecting...".to_string(),
        Status::Failed => "Request failed. Please try again.".to_string(),
        Status::Cancelled => "Request cancelled.".to_string(),
        Status::Unknown => "Checking status...".to_string(),
    }
}
