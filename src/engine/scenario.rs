// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Scenario-level lifecycle: begin, skip, outcome evaluation, end.

use itertools::Itertools as _;
use tracing::{debug, info};

use crate::{
    context::{ScenarioContext, ScenarioInfo},
    engine::Engine,
    error::{ExecutionError, Result},
    event::Event,
    hook::HookType,
    outcome::{ScenarioOutcome, IGNORED_REASON},
    status::ExecutionStatus,
    step::BlockType,
};

impl Engine {
    /// Begins a scenario scope and fires `BeforeScenario` hooks.
    ///
    /// A hook failure is caught here, not propagated: the scenario status is
    /// escalated to [`ExecutionStatus::TestError`] with the error retained,
    /// and the rest of the lifecycle proceeds normally (all steps will take
    /// the skip path, `AfterScenario` hooks still fire).
    pub fn begin_scenario(&mut self, info: ScenarioInfo) {
        let ctx = ScenarioContext::new(info);
        self.publish(Event::scenario_started(ctx.title.clone()));
        self.scenario = Some(ctx);
        if let Err(e) = self.fire_hooks(HookType::BeforeScenario) {
            // Recorded against the scenario by the dispatcher already.
            debug!(
                error = %e,
                "BeforeScenario hook failed; steps will be skipped",
            );
        }
    }

    /// Starts a scenario scope directly in the skipped state.
    ///
    /// The status is `Skipped` before any `BeforeScenario` hook could fire;
    /// neither `BeforeScenario` nor `AfterScenario` hooks run on this path.
    pub fn skip_scenario(&mut self, info: ScenarioInfo) {
        let mut ctx = ScenarioContext::new(info);
        ctx.escalate(ExecutionStatus::Skipped, None);
        self.publish(Event::scenario_started(ctx.title.clone()));
        self.publish(Event::scenario_skipped(ctx.title.clone()));
        self.scenario = Some(ctx);
    }

    /// Evaluates the final scenario status into the single outcome signal
    /// for the hosting test runner.
    ///
    /// Forces the block switch back to the [`BlockType::None`] sentinel
    /// first (closing any open block), then reports the scenario duration if
    /// timing is enabled.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::InvariantViolation`] when no scenario is open, or
    /// when the status says failure but no error was retained. Both are
    /// engine bugs, not scenario failures, and are surfaced as such.
    pub fn after_last_step(&mut self) -> Result<ScenarioOutcome> {
        if let Err(e) = self.switch_block(BlockType::None) {
            // Already escalated and retained; reported via the status below.
            debug!(error = %e, "AfterScenarioBlock hook failed");
        }

        let Some(scenario) = self.scenario.as_ref() else {
            return Err(ExecutionError::InvariantViolation(
                "after_last_step without an open scenario".into(),
            ));
        };
        if self.config.report_timings {
            info!(
                scenario = %scenario.title,
                elapsed = %humantime::format_duration(
                    scenario.started_at.elapsed(),
                ),
                "scenario finished",
            );
        }

        match scenario.status {
            ExecutionStatus::Ok => Ok(ScenarioOutcome::Passed),
            ExecutionStatus::Skipped => {
                Ok(ScenarioOutcome::Ignored { reason: IGNORED_REASON })
            }
            ExecutionStatus::StepDefinitionPending => {
                Ok(ScenarioOutcome::Pending {
                    message: format!(
                        "One or more step definitions are not implemented \
                         yet.\n  {}",
                        scenario.pending_steps.iter().join("\n  "),
                    ),
                })
            }
            ExecutionStatus::UndefinedStep => Ok(ScenarioOutcome::Undefined {
                message: format!(
                    "No matching step definition found for one or more \
                     steps.\n  {}",
                    scenario.missing_steps.iter().join("\n  "),
                ),
            }),
            ExecutionStatus::BindingError | ExecutionStatus::TestError => {
                match scenario.retained_error.clone() {
                    Some(err) => Ok(ScenarioOutcome::Failed(err)),
                    // Unreachable in correct operation: every escalation
                    // past `UndefinedStep` records an error first.
                    None => Err(ExecutionError::InvariantViolation(
                        "scenario failed with unknown error".into(),
                    )),
                }
            }
        }
    }

    /// Ends the scenario scope.
    ///
    /// `AfterScenario` hooks are always attempted unless the scenario was
    /// skipped as a whole, independent of whether its body failed. The scope
    /// is destroyed on every exit path, including when the hooks themselves
    /// raise.
    ///
    /// # Errors
    ///
    /// If an `AfterScenario` hook raises.
    pub fn end_scenario(&mut self) -> Result<()> {
        let fire = self
            .scenario
            .as_ref()
            .is_some_and(|s| s.status != ExecutionStatus::Skipped);
        let hooks = if fire {
            self.fire_hooks(HookType::AfterScenario)
        } else {
            Ok(())
        };

        if let Some(ctx) = self.scenario.take() {
            self.publish(Event::scenario_finished(ctx.title, ctx.status));
        }
        hooks
    }
}
