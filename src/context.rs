// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Nested run/feature/scenario/step state, with strict create/use/destroy
//! lifetimes owned by the [`Engine`].
//!
//! [`Engine`]: crate::Engine

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
    time::Instant,
};

use crate::{
    config::{Culture, TargetLanguage},
    error::ExecutionError,
    status::ExecutionStatus,
    step::{BlockType, OperationHandle},
};

/// Process-wide run state, shared between workers via an [`Arc`].
///
/// Run start and run end are the only two points of the engine which must
/// tolerate concurrent first-caller races (see [`Engine::begin_run()`] and
/// [`Engine::end_run()`]), so both are guarded here rather than in any
/// per-worker state.
///
/// [`Arc`]: std::sync::Arc
/// [`Engine::begin_run()`]: crate::Engine::begin_run()
/// [`Engine::end_run()`]: crate::Engine::end_run()
#[derive(Debug, Default)]
pub struct RunLatch {
    /// Check-and-set latch flipped by the first [`Engine::begin_run()`].
    ///
    /// [`Engine::begin_run()`]: crate::Engine::begin_run()
    started: AtomicBool,

    /// Mutex-protected latch guaranteeing exactly one caller performs the
    /// run teardown body.
    ended: Mutex<bool>,

    /// First error raised by a run-scoped hook, if any.
    retained_error: Mutex<Option<ExecutionError>>,
}

impl RunLatch {
    /// Creates a fresh, un-started latch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the started latch, returning whether this caller won the race.
    pub(crate) fn try_start(&self) -> bool {
        !self.started.swap(true, Ordering::SeqCst)
    }

    /// Whether the run has started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Runs `body` if and only if the run hasn't ended yet, holding the end
    /// latch for the whole duration, so racing callers wait and then no-op.
    pub(crate) fn end_once<T>(&self, body: impl FnOnce() -> T) -> Option<T> {
        let mut ended = self.ended.lock().unwrap_or_else(|e| e.into_inner());
        if *ended {
            return None;
        }
        *ended = true;
        Some(body())
    }

    /// Records the first run-scoped hook error; later ones only surface
    /// through the dispatcher's re-raise, never here.
    pub(crate) fn retain_error(&self, err: ExecutionError) {
        let mut slot =
            self.retained_error.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    /// Returns a copy of the retained run-scoped hook error, if any.
    #[must_use]
    pub fn retained_error(&self) -> Option<ExecutionError> {
        self.retained_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Description of a feature about to start, provided by the host.
#[derive(Clone, Debug)]
pub struct FeatureInfo {
    /// Feature title.
    pub title: String,

    /// Tags applying to every scenario of the feature.
    pub tags: Vec<String>,

    /// Culture the feature's steps were authored in, if declared.
    pub culture: Option<Culture>,

    /// Language hint for unmatched-step diagnostics, if declared.
    pub target_language: Option<TargetLanguage>,
}

/// Description of a scenario about to start, provided by the host.
#[derive(Clone, Debug)]
pub struct ScenarioInfo {
    /// Scenario title.
    pub title: String,

    /// Tags of this scenario (not including feature-level ones).
    pub tags: Vec<String>,
}

/// State of the feature currently being executed.
///
/// Spans one or more scenarios; destroyed at feature end.
#[derive(Debug)]
pub struct FeatureContext {
    /// Feature title.
    pub title: String,

    /// Feature-level tags.
    pub tags: Vec<String>,

    /// Culture used for matching and conversion within this feature.
    pub binding_culture: Culture,

    /// Language hint for unmatched-step diagnostics.
    pub target_language: TargetLanguage,

    /// Moment the feature scope was opened.
    pub started_at: Instant,

    /// First error raised by a feature-scoped hook, if any.
    pub(crate) retained_error: Option<ExecutionError>,
}

impl FeatureContext {
    pub(crate) fn new(info: FeatureInfo, default_culture: &Culture) -> Self {
        Self {
            title: info.title,
            tags: info.tags,
            binding_culture: info
                .culture
                .unwrap_or_else(|| default_culture.clone()),
            target_language: info.target_language.unwrap_or_default(),
            started_at: Instant::now(),
            retained_error: None,
        }
    }

    /// First error raised by a feature-scoped hook, if any.
    #[must_use]
    pub fn retained_error(&self) -> Option<&ExecutionError> {
        self.retained_error.as_ref()
    }
}

/// State of the scenario currently being executed.
#[derive(Debug)]
pub struct ScenarioContext {
    /// Scenario title.
    pub title: String,

    /// Scenario-level tags.
    pub tags: Vec<String>,

    /// Current severity; only ever escalated, never downgraded.
    pub(crate) status: ExecutionStatus,

    /// Block the most recent step belonged to.
    ///
    /// Keeps tracking even after the scenario turns unhealthy; only the
    /// block-boundary hooks get suppressed then.
    pub(crate) current_block: BlockType,

    /// First error recorded against this scenario. Never overwritten.
    pub(crate) retained_error: Option<ExecutionError>,

    /// Texts of steps whose operations declared themselves pending, in
    /// execution order.
    pub(crate) pending_steps: Vec<String>,

    /// Texts of steps no operation matched, in execution order.
    pub(crate) missing_steps: Vec<String>,

    /// Moment the scenario scope was opened.
    pub started_at: Instant,
}

impl ScenarioContext {
    pub(crate) fn new(info: ScenarioInfo) -> Self {
        Self {
            title: info.title,
            tags: info.tags,
            status: ExecutionStatus::Ok,
            current_block: BlockType::None,
            retained_error: None,
            pending_steps: Vec::new(),
            missing_steps: Vec::new(),
            started_at: Instant::now(),
        }
    }

    /// Current severity of this scenario.
    #[must_use]
    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    /// Block the most recent step belonged to.
    #[must_use]
    pub fn current_block(&self) -> BlockType {
        self.current_block
    }

    /// First error recorded against this scenario, if any.
    #[must_use]
    pub fn retained_error(&self) -> Option<&ExecutionError> {
        self.retained_error.as_ref()
    }

    /// Texts of the steps that resolved to pending operations so far.
    #[must_use]
    pub fn pending_steps(&self) -> &[String] {
        &self.pending_steps
    }

    /// Texts of the steps no operation matched so far.
    #[must_use]
    pub fn missing_steps(&self) -> &[String] {
        &self.missing_steps
    }

    /// Applies the status lattice: escalates to `candidate` if it is more
    /// severe, and retains `err` if no earlier error is recorded yet.
    ///
    /// This is the single entry point for all scenario failure paths.
    pub(crate) fn escalate(
        &mut self,
        candidate: ExecutionStatus,
        err: Option<ExecutionError>,
    ) {
        self.status = self.status.escalated(candidate);
        if let (None, Some(e)) = (&self.retained_error, err) {
            self.retained_error = Some(e);
        }
    }
}

/// Transient state of the step currently being executed.
///
/// Created fresh per step and discarded after it, so nothing here survives
/// into the next step.
#[derive(Debug)]
pub struct StepContext {
    /// Outcome severity of this single step.
    pub status: ExecutionStatus,

    /// Operation the step's text resolved to, if resolution succeeded.
    pub resolved: Option<OperationHandle>,
}

impl StepContext {
    pub(crate) fn new() -> Self {
        Self { status: ExecutionStatus::Ok, resolved: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ScenarioContext {
        ScenarioContext::new(ScenarioInfo {
            title: "cukes get eaten".into(),
            tags: vec![],
        })
    }

    #[test]
    fn escalate_is_monotonic() {
        let mut ctx = scenario();
        ctx.escalate(ExecutionStatus::UndefinedStep, None);
        ctx.escalate(ExecutionStatus::Skipped, None);
        assert_eq!(ctx.status(), ExecutionStatus::UndefinedStep);
    }

    #[test]
    fn first_retained_error_wins() {
        let mut ctx = scenario();
        ctx.escalate(
            ExecutionStatus::TestError,
            Some(ExecutionError::BindingMisconfiguration("first".into())),
        );
        ctx.escalate(
            ExecutionStatus::TestError,
            Some(ExecutionError::BindingMisconfiguration("second".into())),
        );
        assert!(matches!(
            ctx.retained_error(),
            Some(ExecutionError::BindingMisconfiguration(m)) if m == "first",
        ));
    }

    #[test]
    fn run_latch_start_races_have_one_winner() {
        let latch = RunLatch::new();
        assert!(latch.try_start());
        assert!(!latch.try_start());
        assert!(latch.is_started());
    }

    #[test]
    fn run_latch_end_body_runs_once() {
        let latch = RunLatch::new();
        assert_eq!(latch.end_once(|| 1), Some(1));
        assert_eq!(latch.end_once(|| 2), None);
    }
}
