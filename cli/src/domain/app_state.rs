//! Observable application state.
//!
//! `NoData → Loading → {DataAvailable, Error}`, re-entering `Loading` on every
//! user action. There is no terminal state.

use crate::domain::error::ErrorKind;

/// Failure details shown by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    pub title: String,
    pub message: String,
    /// Underlying cause, when the failure carries one (service errors).
    pub cause: Option<String>,
}

impl From<&ErrorKind> for AppError {
    fn from(kind: &ErrorKind) -> Self {
        let cause = match kind {
            ErrorKind::ServiceError { detail, .. } => Some(detail.clone()),
            _ => None,
        };
        Self {
            title: kind.title().to_string(),
            message: kind.message().to_string(),
            cause,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    NoData,
    Loading,
    DataAvailable,
    Error(AppError),
}

impl AppState {
    /// Build the error state for a classified failure.
    #[must_use]
    pub fn error(kind: &ErrorKind) -> Self {
        Self::Error(AppError::from(kind))
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Whether the machine may move from `self` to `next`.
    ///
    /// Every operation goes through `Loading`; results only leave `Loading`.
    #[must_use]
    pub fn can_transition_to(&self, next: &AppState) -> bool {
        match (self, next) {
            (Self::Loading, Self::DataAvailable | Self::Error(_)) => true,
            (Self::Loading, Self::Loading) => false,
            (_, Self::Loading) => true,
            _ => false,
        }
    }
}
