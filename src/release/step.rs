use tracing::{error, info_span};

use crate::error::{ReleaseError, Result};
use crate::ui;

/// One named operation of the release pipeline.
///
/// Running a step echoes its label, executes the operation and, on failure,
/// wraps the cause in [ReleaseError::StepFailure] tagged with the step's
/// failure message.
pub struct ReleaseStep {
    label: String,
    failure: String,
    echo: bool,
}

impl ReleaseStep {
    pub fn new(label: impl Into<String>, failure: impl Into<String>) -> Self {
        ReleaseStep {
            label: label.into(),
            failure: failure.into(),
            echo: true,
        }
    }

    /// Don't echo the label; for in-process steps that aren't commands
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn run<T>(self, op: impl FnOnce() -> Result<T>) -> Result<T> {
        if self.echo {
            ui::display_command(&self.label);
        }

        let _span = info_span!("step", label = %self.label).entered();
        op().map_err(|e| {
            error!(error = %e, "{}", self.failure);
            ReleaseError::step(self.failure, e)
        })
    }
}
