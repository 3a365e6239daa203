// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key occurrences in the lifecycle of an engine execution.
//!
//! The top-level enum here is [`Event`]. The engine guarantees a matched
//! started/finished pair is published on every path, success or failure.

use crate::{hook::HookType, status::ExecutionStatus};

/// Top-level lifecycle event.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Run-level event.
    Run(Run),

    /// Event of the feature with the given title.
    Feature(String, Feature),

    /// Event of the scenario with the given title.
    Scenario(String, Scenario),

    /// Event of firing all hooks of one [`HookType`].
    Hook(HookType, Hook),
}

/// Event of the test run as a whole.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Run {
    /// Run execution started.
    Started,

    /// Run execution finished.
    Finished,
}

/// Event specific to a particular feature.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Feature {
    /// Feature execution started.
    Started,

    /// Feature execution finished.
    Finished,
}

/// Event specific to a particular scenario.
#[derive(Clone, Debug, PartialEq)]
pub enum Scenario {
    /// Scenario execution started.
    Started,

    /// Scenario was skipped as a whole, without firing its hooks.
    Skipped,

    /// Event of the step with the given display text.
    Step(String, Step),

    /// Scenario execution finished with the given status.
    Finished(ExecutionStatus),
}

/// Event specific to a particular step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    /// Step execution started.
    Started,

    /// Step execution finished with the given status.
    Finished(ExecutionStatus),
}

/// Event of firing the hook sequence of one [`HookType`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Hook {
    /// Hook sequence started.
    Started,

    /// Every matching hook completed.
    Passed,

    /// A hook in the sequence raised.
    Failed,
}

impl Event {
    /// Constructs an event of a started feature.
    #[must_use]
    pub fn feature_started(title: impl Into<String>) -> Self {
        Self::Feature(title.into(), Feature::Started)
    }

    /// Constructs an event of a finished feature.
    #[must_use]
    pub fn feature_finished(title: impl Into<String>) -> Self {
        Self::Feature(title.into(), Feature::Finished)
    }

    /// Constructs an event of a started scenario.
    #[must_use]
    pub fn scenario_started(title: impl Into<String>) -> Self {
        Self::Scenario(title.into(), Scenario::Started)
    }

    /// Constructs an event of a skipped scenario.
    #[must_use]
    pub fn scenario_skipped(title: impl Into<String>) -> Self {
        Self::Scenario(title.into(), Scenario::Skipped)
    }

    /// Constructs an event of a finished scenario.
    #[must_use]
    pub fn scenario_finished(
        title: impl Into<String>,
        status: ExecutionStatus,
    ) -> Self {
        Self::Scenario(title.into(), Scenario::Finished(status))
    }

    /// Constructs an event of a started step.
    #[must_use]
    pub fn step_started(
        scenario: impl Into<String>,
        step: impl Into<String>,
    ) -> Self {
        Self::Scenario(
            scenario.into(),
            Scenario::Step(step.into(), Step::Started),
        )
    }

    /// Constructs an event of a finished step.
    #[must_use]
    pub fn step_finished(
        scenario: impl Into<String>,
        step: impl Into<String>,
        status: ExecutionStatus,
    ) -> Self {
        Self::Scenario(
            scenario.into(),
            Scenario::Step(step.into(), Step::Finished(status)),
        )
    }
}

/// Fire-and-forget sink for lifecycle [`Event`]s.
///
/// Implementations must not fail; whatever they do with an event (format,
/// forward, count) stays invisible to the engine.
pub trait EventPublisher {
    /// Publishes a single lifecycle `event`.
    fn publish(&self, event: Event);
}

/// No-op publisher.
impl EventPublisher for () {
    fn publish(&self, _: Event) {}
}
