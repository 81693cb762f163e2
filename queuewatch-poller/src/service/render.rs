//! Presentation sinks
//!
//! Turn a `ViewModel` into output. The terminal renderer prints one coloured
//! status line per render; the JSON renderer prints one object per line for
//! scripts that watch the poller.

use chrono::Utc;
use colored::*;
use queuewatch_core::{ProgressStyle, ViewModel};

/// Shows the current view of a tracked job
pub trait Renderer: Send + Sync {
    fn render(&self, view: &ViewModel);
}

/// Coloured, timestamped status lines on stdout
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl TerminalRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TerminalRenderer {
    fn render(&self, view: &ViewModel) {
        let timestamp = Utc::now().format("%H:%M:%S").to_string();
        let progress = format!("[{:>3}%]", view.progress);
        let progress = match view.progress_style {
            ProgressStyle::InProgress => progress.blue(),
            ProgressStyle::Done => progress.green(),
        };

        let mut line = format!(
            "{} {} {}",
            timestamp.dimmed(),
            progress,
            view.status_text.bold()
        );
        line.push_str(&format!("  {}", readouts(view).dimmed()));
        if view.home_visible {
            line.push_str(&format!("  {}", "[Back to home]".yellow()));
        }

        println!("{}", line);
    }
}

/// One JSON object per render on stdout
#[derive(Debug, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, view: &ViewModel) {
        let line = serde_json::json!({
            "at": Utc::now(),
            "view": view,
        });
        println!("{}", line);
    }
}

/// Position and estimate readouts, plus the spinner marker
fn readouts(view: &ViewModel) -> String {
    let spinner = if view.spinner_visible { "… " } else { "" };
    format!(
        "{}{} | {}",
        spinner, view.position_text, view.estimated_time_text
    )
}
