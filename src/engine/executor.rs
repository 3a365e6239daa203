// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution of a single step: resolution, skip-or-execute routing,
//! classification and bookkeeping of its outcome.

use std::{sync::Arc, time::Duration};

use either::Either;
use tracing::{debug, error, warn};

use crate::{
    context::StepContext,
    engine::Engine,
    error::{ExecutionError, Result},
    event::Event,
    hook::HookType,
    status::ExecutionStatus,
    step::{
        BlockType, MatchFailureReason, MatchResult, RawArgument, StepInfo,
        StepMatch,
    },
};

impl Engine {
    /// Executes one step of the open scenario.
    ///
    /// Matched step-started/step-finished notifications are always published
    /// around the execution, symmetric even on failure. All status changes
    /// funnel through the status lattice and a previously retained error is
    /// never replaced.
    ///
    /// # Errors
    ///
    /// Only when the stop-at-first-error policy is active and the step
    /// failed: the error is re-raised synchronously so the host aborts the
    /// remaining steps of this scenario. Without that policy, failures are
    /// recorded in the scenario state and `Ok` is returned, letting
    /// subsequent steps proceed through the skip path.
    pub fn execute_step(&mut self, step: StepInfo) -> Result<()> {
        let Some(title) = self.scenario.as_ref().map(|s| s.title.clone())
        else {
            return Err(ExecutionError::InvariantViolation(
                "execute_step without an open scenario".into(),
            ));
        };

        self.publish(Event::step_started(title.clone(), step.display_text()));
        let mut ctx = StepContext::new();
        let mut elapsed = None;
        let result = self.run_step(&step, &mut ctx, &mut elapsed);
        let outcome = self.classify(&step, result, &mut ctx, elapsed);
        self.publish(Event::step_finished(
            title,
            step.display_text(),
            ctx.status,
        ));
        outcome
    }

    /// Drives one step up to (but not including) outcome classification.
    fn run_step(
        &mut self,
        step: &StepInfo,
        ctx: &mut StepContext,
        elapsed: &mut Option<Duration>,
    ) -> Result<()> {
        let target = step
            .kind
            .block()
            .or_else(|| self.scenario.as_ref().map(|s| s.current_block))
            .unwrap_or(BlockType::None);
        self.switch_block(target)?;

        debug!(step = %step.display_text(), "step started");
        let skipped =
            self.scenario.as_ref().map_or(false, |s| !s.status.is_ok());

        let def_kind = target.definition_kind().ok_or_else(|| {
            ExecutionError::BindingMisconfiguration(format!(
                "cannot resolve the definition kind of '{}': no \
                 Given/When/Then block is open",
                step.display_text(),
            ))
        })?;
        let culture = self
            .feature
            .as_ref()
            .map(|f| f.binding_culture.clone())
            .unwrap_or_else(|| self.config.default_culture.clone());

        // Matching always runs, even in an already-unhealthy scenario, so
        // undefined steps keep accumulating in `missing_steps`.
        let routed: Either<(), StepMatch> =
            match self.matcher.resolve(def_kind, &step.text, &culture) {
                MatchResult::Success(m) => {
                    // Recorded before the skip routing: a skipped step still
                    // knows which operation it would have run.
                    ctx.resolved = Some(m.operation.clone());
                    if skipped {
                        Either::Left(())
                    } else {
                        Either::Right(m)
                    }
                }
                MatchResult::Failure {
                    reason: MatchFailureReason::NoCandidates,
                    ..
                } => {
                    if let Some(sc) = self.scenario.as_mut() {
                        sc.escalate(ExecutionStatus::UndefinedStep, None);
                        sc.missing_steps.push(step.display_text());
                    }
                    Either::Left(())
                }
                MatchResult::Failure {
                    reason: MatchFailureReason::AmbiguousExact,
                    candidates,
                } => {
                    return Err(ExecutionError::AmbiguousExact {
                        step: step.text.clone(),
                        candidates,
                    });
                }
                MatchResult::Failure {
                    reason: MatchFailureReason::AmbiguousParameterMismatch,
                    candidates,
                } => {
                    return Err(ExecutionError::AmbiguousParameterMismatch {
                        step: step.text.clone(),
                        candidates,
                    });
                }
            };

        let matched = match routed {
            Either::Left(()) => {
                ctx.status = ExecutionStatus::Skipped;
                debug!(step = %step.display_text(), "step skipped");
                if let Some(sc) = self.scenario.as_ref() {
                    for observer in &self.skipped_observers {
                        observer.step_skipped(sc);
                    }
                }
                return Ok(());
            }
            Either::Right(m) => m,
        };

        // The step's multiline and table arguments follow the captured ones.
        let mut raw_args = matched.arguments;
        if let Some(doc) = &step.doc_string {
            raw_args.push(RawArgument::DocString(doc.clone()));
        }
        if let Some(table) = &step.table {
            raw_args.push(RawArgument::Table(table.clone()));
        }

        // A shape mismatch between the match and the declaration is a fatal
        // configuration error, raised immediately and never retried.
        if raw_args.len() != matched.operation.parameters.len() {
            return Err(ExecutionError::BindingMisconfiguration(format!(
                "operation '{}' declares {} parameter(s), but the step \
                 supplies {} argument(s)",
                matched.operation.id,
                matched.operation.parameters.len(),
                raw_args.len(),
            )));
        }
        let args = raw_args
            .iter()
            .zip(matched.operation.parameters.iter().copied())
            .map(|(raw, target)| {
                self.converter.convert(raw, target, &culture).map_err(|e| {
                    ExecutionError::BindingMisconfiguration(e.to_string())
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(message) = matched.operation.obsolete.as_deref() {
            warn!(
                operation = %matched.operation.id,
                message,
                "step bound to an obsolete definition",
            );
            self.obsolete.obsolete_step(&matched.operation, message);
        }

        let before = self.fire_hooks(HookType::BeforeStep);
        let invoked = if before.is_ok() {
            let invoker = Arc::clone(&self.invoker);
            match self.scenario.as_mut() {
                Some(sc) => {
                    let (res, duration) =
                        invoker.invoke(&matched.operation, args, sc);
                    *elapsed = Some(duration);
                    res
                }
                None => Err(ExecutionError::InvariantViolation(
                    "scenario scope vanished mid-step".into(),
                )),
            }
        } else {
            Ok(())
        };
        // The finally-equivalent: AfterStep fires even when BeforeStep or
        // the operation failed. The earliest error wins below.
        let after = self.fire_hooks(HookType::AfterStep);
        before.and(invoked).and(after)?;

        debug!(step = %step.display_text(), elapsed = ?elapsed, "step passed");
        Ok(())
    }

    /// Classifies a raised step error into the lattice, records the
    /// bookkeeping for it and decides whether to re-raise.
    fn classify(
        &mut self,
        step: &StepInfo,
        result: Result<()>,
        ctx: &mut StepContext,
        elapsed: Option<Duration>,
    ) -> Result<()> {
        let err = match result {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        let status = err.status();
        ctx.status = status;
        match &err {
            ExecutionError::Pending(_) => {
                if let Some(sc) = self.scenario.as_mut() {
                    sc.pending_steps.push(step.display_text());
                }
            }
            ExecutionError::Undefined { .. } => {
                if let Some(sc) = self.scenario.as_mut() {
                    sc.missing_steps.push(step.display_text());
                }
            }
            _ => {}
        }
        if err.is_binding_level() {
            error!(step = %step.display_text(), error = %err, "binding error");
        } else {
            error!(
                step = %step.display_text(),
                error = %err,
                elapsed = ?elapsed,
                "step failed",
            );
        }
        if let Some(sc) = self.scenario.as_mut() {
            sc.escalate(status, Some(err.clone()));
        }

        if self.config.stop_at_first_error {
            Err(err)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Culture,
        context::{ScenarioInfo, StepContext},
        engine::Engine,
        status::ExecutionStatus,
        step::{
            MatchResult, Matcher, OperationHandle, StepDefinitionKind,
            StepInfo, StepKind, StepMatch,
        },
    };

    struct SingleOp;

    impl Matcher for SingleOp {
        fn resolve(
            &self,
            _: StepDefinitionKind,
            _: &str,
            _: &Culture,
        ) -> MatchResult {
            MatchResult::Success(StepMatch {
                operation: OperationHandle {
                    id: "noop".into(),
                    parameters: vec![],
                    obsolete: None,
                },
                arguments: vec![],
            })
        }
    }

    #[test]
    fn skipped_step_still_records_its_resolved_operation() {
        let mut engine = Engine::builder().matcher(SingleOp).build();
        engine.skip_scenario(ScenarioInfo {
            title: "skipped".into(),
            tags: vec![],
        });

        let step = StepInfo::new(StepKind::Given, "Given ", "a noop");
        let mut ctx = StepContext::new();
        let mut elapsed = None;
        engine.run_step(&step, &mut ctx, &mut elapsed).unwrap();

        assert_eq!(ctx.status, ExecutionStatus::Skipped);
        assert_eq!(ctx.resolved.map(|op| op.id), Some("noop".into()));
    }
}
