// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Final per-scenario outcome handed to the host test runner.
//!
//! Everything up to here is propagated as data; translating an outcome into
//! the host's native signaling (skip API, failure call, panic) is the
//! adapter's business and stays outside this crate.

use crate::error::ExecutionError;

/// Reason tag reported to the host for scenarios ignored as a whole.
pub const IGNORED_REASON: &str = "Scenario ignored using @Ignore tag";

/// The engine's single user-visible verdict for one scenario.
#[derive(Clone, Debug)]
pub enum ScenarioOutcome {
    /// Every step executed and passed.
    Passed,

    /// The scenario was skipped; not an error.
    Ignored {
        /// Fixed reason tag for the host's skip API.
        reason: &'static str,
    },

    /// One or more step definitions are not implemented yet.
    Pending {
        /// Aggregate message enumerating the pending steps.
        message: String,
    },

    /// One or more steps matched no registered operation.
    Undefined {
        /// Aggregate message enumerating the unmatched steps.
        message: String,
    },

    /// The scenario failed; carries the first recorded error with its
    /// original context preserved.
    Failed(ExecutionError),
}

impl ScenarioOutcome {
    /// Whether this outcome must be reported as a failure by the host.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Passed | Self::Ignored { .. })
    }

    /// Translates into a plain [`Result`] for hosts without dedicated
    /// skip/pending signaling: ignored scenarios count as passing, pending
    /// and undefined ones as failing with their aggregate message.
    ///
    /// [`Result`]: std::result::Result
    pub fn into_result(self) -> Result<(), ExecutionError> {
        match self {
            Self::Passed | Self::Ignored { .. } => Ok(()),
            Self::Pending { message } => Err(ExecutionError::Pending(message)),
            Self::Undefined { message } => {
                Err(ExecutionError::Undefined { step: message })
            }
            Self::Failed(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_passed_and_ignored_are_not_failures() {
        assert!(!ScenarioOutcome::Passed.is_failure());
        assert!(
            !ScenarioOutcome::Ignored { reason: IGNORED_REASON }.is_failure()
        );
        assert!(ScenarioOutcome::Pending { message: "p".into() }.is_failure());
        assert!(
            ScenarioOutcome::Undefined { message: "u".into() }.is_failure()
        );
        assert!(ScenarioOutcome::Failed(ExecutionError::InvariantViolation(
            "x".into()
        ))
        .is_failure());
    }

    #[test]
    fn into_result_preserves_the_original_error() {
        let err = ExecutionError::BindingMisconfiguration("bad".into());
        let out = ScenarioOutcome::Failed(err);
        assert!(matches!(
            out.into_result(),
            Err(ExecutionError::BindingMisconfiguration(m)) if m == "bad",
        ));
    }
}
