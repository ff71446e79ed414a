//! Progress reporting for one push event.
//!
//! Handling an event produces an append-only sequence of [StatusUpdate]s:
//! one or more `InProgress` updates followed by exactly one `Completed` update.

use tracing::{info, warn};

use crate::error::Result;
use crate::ui;

/// Final verdict of a completed status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conclusion {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusState {
    InProgress,
    Completed(Conclusion),
}

/// One immutable progress record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub title: String,
    pub summary: String,
    pub text: String,
    pub state: StatusState,
}

impl StatusUpdate {
    pub fn in_progress(title: impl Into<String>, summary: impl Into<String>) -> Self {
        StatusUpdate {
            title: title.into(),
            summary: summary.into(),
            text: String::new(),
            state: StatusState::InProgress,
        }
    }

    pub fn success(title: impl Into<String>, summary: impl Into<String>) -> Self {
        StatusUpdate {
            title: title.into(),
            summary: summary.into(),
            text: String::new(),
            state: StatusState::Completed(Conclusion::Success),
        }
    }

    pub fn failure(title: impl Into<String>, summary: impl Into<String>) -> Self {
        StatusUpdate {
            title: title.into(),
            summary: summary.into(),
            text: String::new(),
            state: StatusState::Completed(Conclusion::Failure),
        }
    }

    /// Attach a longer detail body
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn conclusion(&self) -> Option<Conclusion> {
        match self.state {
            StatusState::Completed(conclusion) => Some(conclusion),
            StatusState::InProgress => None,
        }
    }
}

/// Sink for status updates
pub trait StatusReporter {
    fn report(&mut self, update: &StatusUpdate) -> Result<()>;
}

/// Report an update, logging rather than propagating reporter errors
pub(crate) fn emit<S: StatusReporter + ?Sized>(reporter: &mut S, update: StatusUpdate) {
    if let Err(e) = reporter.report(&update) {
        warn!(title = %update.title, error = %e, "failed to report status");
    }
}

/// Keeps every update in order
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    updates: Vec<StatusUpdate>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> &[StatusUpdate] {
        &self.updates
    }

    pub fn titles(&self) -> Vec<&str> {
        self.updates.iter().map(|u| u.title.as_str()).collect()
    }

    pub fn last(&self) -> Option<&StatusUpdate> {
        self.updates.last()
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&mut self, update: &StatusUpdate) -> Result<()> {
        self.updates.push(update.clone());
        Ok(())
    }
}

/// Prints updates to the terminal and logs them
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl StatusReporter for ConsoleReporter {
    fn report(&mut self, update: &StatusUpdate) -> Result<()> {
        info!(title = %update.title, state = ?update.state, "{}", update.summary);

        match update.state {
            StatusState::InProgress => ui::display_status(&update.title, &update.summary),
            StatusState::Completed(Conclusion::Success) => {
                ui::display_success(&update.title, &update.summary)
            }
            StatusState::Completed(Conclusion::Failure) => {
                ui::display_error(&update.title, &update.summary)
            }
        }
        if !update.text.is_empty() {
            ui::display_details(&update.text);
        }
        Ok(())
    }
}
