// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Best-effort collaborators the engine notifies but never depends on.
//!
//! All of these are outward-facing advisory channels: plugins, analytics,
//! skipped-step listeners. None of them may influence execution, and a
//! failure inside one of them must never fail the run.

use crate::{
    context::ScenarioContext,
    error::UserError,
    hook::HookType,
    step::OperationHandle,
};

/// Best-effort analytics channel.
///
/// Whatever the implementation transmits, the engine discards its failures:
/// analytics must never fail the run.
pub trait AnalyticsNotifier {
    /// Notifies that a project's test run is starting.
    fn project_running(&self) -> Result<(), UserError>;
}

/// No-op analytics.
impl AnalyticsNotifier for () {
    fn project_running(&self) -> Result<(), UserError> {
        Ok(())
    }
}

/// Plugin lifecycle channel, invoked once per hook-kind firing, after the
/// hook sequence ran (fully or aborted by a failing hook).
///
/// The engine never skips this notification because of a hook failure.
pub trait PluginEmitter {
    /// Notifies that the hook sequence of `kind` has been fired.
    fn hooks_fired(&self, kind: HookType, scenario: Option<&ScenarioContext>);
}

/// No-op plugin emitter.
impl PluginEmitter for () {
    fn hooks_fired(&self, _: HookType, _: Option<&ScenarioContext>) {}
}

/// Listener invoked whenever a step takes the skip path.
pub trait SkippedStepObserver {
    /// Notifies that a step was skipped, with the scenario state as of the
    /// moment of skipping.
    fn step_skipped(&self, scenario: &ScenarioContext);
}

/// Advisory channel for steps bound to operations marked obsolete.
///
/// Purely informational; the step still executes.
pub trait ObsoleteStepHandler {
    /// Notifies that `operation` is marked obsolete with `message`.
    fn obsolete_step(&self, operation: &OperationHandle, message: &str);
}

/// No-op obsolete-step handler.
impl ObsoleteStepHandler for () {
    fn obsolete_step(&self, _: &OperationHandle, _: &str) {}
}
