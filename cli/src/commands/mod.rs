//! Command implementations

pub mod config;
pub mod describe;
pub mod lifecycle;
pub mod list;
pub mod version;

use crate::application::services::CommandOutcome;
use crate::domain::ErrorKind;

/// Turn a non-successful outcome into the error the binary reports.
///
/// Classified failures stay downcastable to [`ErrorKind`] so `--json` can
/// print their code.
pub(crate) fn outcome_error(outcome: &CommandOutcome, subject: &str) -> anyhow::Error {
    match outcome {
        CommandOutcome::Failed(kind) => anyhow::Error::new(kind.clone()),
        CommandOutcome::Inconsistent(defect) => {
            anyhow::Error::new(ErrorKind::Unknown(defect.describe(subject)))
        }
        CommandOutcome::Superseded => {
            anyhow::anyhow!("{subject}: superseded by a newer operation")
        }
        other => anyhow::anyhow!("{subject}: unexpected outcome {other:?}"),
    }
}
