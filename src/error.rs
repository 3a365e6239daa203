// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Failure taxonomy of the execution engine.
//!
//! The first five variants of [`ExecutionError`] are deterministic outcomes
//! of matching and registry state: they never require the bound operation to
//! run and are never retried. [`ExecutionError::UserCode`] is whatever a
//! bound operation or hook raised. [`ExecutionError::InvariantViolation`]
//! must be unreachable in correct operation and is surfaced as an
//! assertion-style failure, never converted into a generic one.

use std::sync::Arc;

use derive_more::with_trait::{Display, Error};

use crate::status::ExecutionStatus;

/// Failure raised by user code (a bound operation or a lifecycle hook).
///
/// Held behind an [`Arc`] so the engine can both retain the first error in
/// the scenario state and re-raise it with its original context preserved.
pub type UserError = Arc<dyn std::error::Error + Send + Sync>;

/// Alias for a [`Result`] with an [`ExecutionError`].
///
/// [`Result`]: std::result::Result
pub type Result<T> = std::result::Result<T, ExecutionError>;

/// Any failure the engine can classify into the [`ExecutionStatus`] lattice.
#[derive(Clone, Debug, Display, Error)]
pub enum ExecutionError {
    /// A resolved operation declared itself not implemented yet.
    #[display("step definition is pending: {_0}")]
    Pending(#[error(not(source))] String),

    /// No registered operation matched the step's text.
    #[display("no matching step definition found for: {step}")]
    Undefined {
        /// Formatted text of the unmatched step.
        #[error(not(source))]
        step: String,
    },

    /// Multiple equally valid operations matched the step's text, so no
    /// arbitrary pick is made.
    #[display(
        "ambiguous step definitions for '{step}': [{}]",
        candidates.join(", ")
    )]
    AmbiguousExact {
        /// Text of the ambiguous step.
        step: String,

        /// Descriptions of the competing operations.
        candidates: Vec<String>,
    },

    /// Every candidate operation matched the text but failed argument-shape
    /// validation. Distinct from [`ExecutionError::Undefined`]: definitions
    /// exist, they just cannot be used.
    #[display(
        "multiple step definitions match '{step}', but none fits the \
         parameters: [{}]",
        candidates.join(", ")
    )]
    AmbiguousParameterMismatch {
        /// Text of the step.
        step: String,

        /// Descriptions of the rejected operations.
        candidates: Vec<String>,
    },

    /// A registered operation is unusable as declared (parameter count
    /// mismatch, failed argument conversion, unresolvable step kind).
    #[display("binding misconfiguration: {_0}")]
    BindingMisconfiguration(#[error(not(source))] String),

    /// A bound operation or hook raised; carried unmodified.
    #[display("{_0}")]
    UserCode(UserError),

    /// A failing status with no retained error, or a similar state the
    /// engine must never reach. Indicates a bug in the engine or its
    /// collaborators, not in the scenario under test.
    #[display("execution engine invariant violated: {_0}")]
    InvariantViolation(#[error(not(source))] String),
}

impl ExecutionError {
    /// Wraps an error raised by user code.
    #[must_use]
    pub fn user(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserCode(Arc::new(err))
    }

    /// Classifies this error into the [`ExecutionStatus`] lattice,
    /// first match wins.
    #[must_use]
    pub fn status(&self) -> ExecutionStatus {
        match self {
            Self::Pending(_) => ExecutionStatus::StepDefinitionPending,
            Self::Undefined { .. } => ExecutionStatus::UndefinedStep,
            Self::AmbiguousExact { .. }
            | Self::AmbiguousParameterMismatch { .. }
            | Self::BindingMisconfiguration(_) => ExecutionStatus::BindingError,
            Self::UserCode(_) | Self::InvariantViolation(_) => {
                ExecutionStatus::TestError
            }
        }
    }

    /// Whether this error belongs to the binding-level family (registry or
    /// declaration problems rather than failing user code).
    #[must_use]
    pub fn is_binding_level(&self) -> bool {
        self.status() == ExecutionStatus::BindingError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Display, Error)]
    #[display("boom")]
    struct Boom;

    #[test]
    fn classification_follows_the_taxonomy() {
        assert_eq!(
            ExecutionError::Pending("x".into()).status(),
            ExecutionStatus::StepDefinitionPending,
        );
        assert_eq!(
            ExecutionError::Undefined { step: "x".into() }.status(),
            ExecutionStatus::UndefinedStep,
        );
        assert_eq!(
            ExecutionError::AmbiguousExact {
                step: "x".into(),
                candidates: vec![],
            }
            .status(),
            ExecutionStatus::BindingError,
        );
        assert_eq!(
            ExecutionError::user(Boom).status(),
            ExecutionStatus::TestError,
        );
        assert_eq!(
            ExecutionError::InvariantViolation("bug".into()).status(),
            ExecutionStatus::TestError,
        );
    }

    #[test]
    fn user_error_round_trips_its_message() {
        let err = ExecutionError::user(Boom);
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn only_user_code_carries_a_source() {
        use std::error::Error as _;

        assert!(ExecutionError::Pending("x".into()).source().is_none());
        assert!(ExecutionError::Undefined { step: "x".into() }
            .source()
            .is_none());
        assert!(ExecutionError::BindingMisconfiguration("x".into())
            .source()
            .is_none());
        assert!(ExecutionError::InvariantViolation("x".into())
            .source()
            .is_none());

        let user = ExecutionError::user(Boom);
        assert_eq!(user.source().map(ToString::to_string), Some("boom".into()));
    }

    #[test]
    fn ambiguous_display_enumerates_candidates() {
        let err = ExecutionError::AmbiguousExact {
            step: "I eat a cuke".into(),
            candidates: vec!["EatCuke".into(), "EatOneCuke".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("I eat a cuke"));
        assert!(msg.contains("EatCuke, EatOneCuke"));
    }
}
