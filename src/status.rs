// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution status severity lattice.
//!
//! Every failure path of the engine funnels through
//! [`ExecutionStatus::escalated()`]: a scenario's status only ever moves
//! towards more severe values, never back.

use derive_more::with_trait::Display;

/// Outcome severity of a scenario or of a single step within it.
///
/// The declaration order is the total severity order relied upon by
/// [`ExecutionStatus::escalated()`], so the derived [`Ord`] is load-bearing.
#[derive(Clone, Copy, Debug, Display, Eq, Ord, PartialEq, PartialOrd)]
#[display("{self:?}")]
pub enum ExecutionStatus {
    /// Everything executed and passed so far.
    Ok,

    /// Execution was skipped without being attempted.
    Skipped,

    /// A resolved operation declared itself not implemented yet.
    StepDefinitionPending,

    /// No registered operation matched a step's text.
    UndefinedStep,

    /// A registered operation exists, but is unusable (ambiguous match,
    /// parameter shape mismatch, failed argument conversion).
    BindingError,

    /// An operation or lifecycle hook raised.
    TestError,
}

impl ExecutionStatus {
    /// Applies the monotonic escalation rule: returns `candidate` if it is
    /// strictly more severe than `self`, otherwise `self` unchanged.
    #[must_use]
    pub fn escalated(self, candidate: Self) -> Self {
        self.max(candidate)
    }

    /// Whether this status represents a healthy execution so far.
    #[must_use]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::ExecutionStatus as S;

    #[test]
    fn severity_order_is_total_and_as_documented() {
        let ordered = [
            S::Ok,
            S::Skipped,
            S::StepDefinitionPending,
            S::UndefinedStep,
            S::BindingError,
            S::TestError,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0] < pair[1], "{} must rank below {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn escalation_never_downgrades() {
        assert_eq!(S::TestError.escalated(S::Skipped), S::TestError);
        assert_eq!(S::UndefinedStep.escalated(S::Ok), S::UndefinedStep);
        assert_eq!(S::BindingError.escalated(S::BindingError), S::BindingError);
    }

    #[test]
    fn escalation_upgrades_to_more_severe() {
        assert_eq!(S::Ok.escalated(S::Skipped), S::Skipped);
        assert_eq!(S::Skipped.escalated(S::TestError), S::TestError);
        assert_eq!(
            S::StepDefinitionPending.escalated(S::UndefinedStep),
            S::UndefinedStep,
        );
    }
}
