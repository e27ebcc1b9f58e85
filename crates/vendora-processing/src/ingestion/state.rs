//! Per-image lifecycle
//!
//! ```text
//! Uploaded → Validating → Rejected
//!                       → Validated → Compressing → Failed
//!                                                 → Compressed → Attached
//! ```

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    Uploaded,
    Validating,
    Validated,
    Rejected(String),
    Compressing,
    Compressed,
    Failed(String),
    Attached,
}

impl ImageState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ImageState::Rejected(_) | ImageState::Failed(_) | ImageState::Attached
        )
    }

    pub fn can_transition_to(&self, next: &ImageState) -> bool {
        matches!(
            (self, next),
            (ImageState::Uploaded, ImageState::Validating)
                | (ImageState::Validating, ImageState::Validated)
                | (ImageState::Validating, ImageState::Rejected(_))
                | (ImageState::Validated, ImageState::Compressing)
                | (ImageState::Compressing, ImageState::Compressed)
                | (ImageState::Compressing, ImageState::Failed(_))
                | (ImageState::Compressed, ImageState::Attached)
        )
    }

    fn label(&self) -> &'static str {
        match self {
            ImageState::Uploaded => "uploaded",
            ImageState::Validating => "validating",
            ImageState::Validated => "validated",
            ImageState::Rejected(_) => "rejected",
            ImageState::Compressing => "compressing",
            ImageState::Compressed => "compressed",
            ImageState::Failed(_) => "failed",
            ImageState::Attached => "attached",
        }
    }

    /// Failure reason for `Rejected` / `Failed`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ImageState::Rejected(reason) | ImageState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for ImageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal image state transition {from} -> {to}")]
pub struct IllegalTransition {
    pub from: ImageState,
    pub to: ImageState,
}

/// Tracks one uploaded image through the pipeline.
#[derive(Debug, Clone)]
pub struct ImageLifecycle {
    filename: String,
    state: ImageState,
}

impl ImageLifecycle {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            state: ImageState::Uploaded,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn state(&self) -> &ImageState {
        &self.state
    }

    pub fn advance(&mut self, next: ImageState) -> Result<(), IllegalTransition> {
        if !self.state.can_transition_to(&next) {
            return Err(IllegalTransition {
                from: self.state.clone(),
                to: next,
            });
        }
        tracing::trace!(filename = %self.filename, from = %self.state, to = %next, "Image state change");
        self.state = next;
        Ok(())
    }
}
