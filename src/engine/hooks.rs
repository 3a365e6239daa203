// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Hook dispatching: selection, deduplication, ordering and invocation of
//! the lifecycle hooks of one boundary kind.

use itertools::Itertools as _;
use linked_hash_map::LinkedHashMap;
use tracing::warn;

use crate::{
    engine::Engine,
    error::{ExecutionError, Result},
    event::{self, Event},
    hook::{HookDescriptor, HookScope, HookType, ScopeLevel},
    scope::ActiveScope,
    status::ExecutionStatus,
};

impl Engine {
    /// Fires all registered hooks of `kind` matching the active scope.
    ///
    /// Matching descriptors are deduplicated by identity (first one
    /// encountered wins, so an operation reachable through several
    /// overlapping scope predicates runs once), then ordered by ascending
    /// order key with ties keeping registration order.
    ///
    /// Invocation is sequential and synchronous. The first hook that raises
    /// aborts the rest of this firing; its error is recorded against the
    /// owning scope and re-raised only after the plugin lifecycle emitter
    /// has been notified, which happens on every firing regardless of hook
    /// failures.
    ///
    /// # Errors
    ///
    /// The first error a hook of this firing raised.
    pub(crate) fn fire_hooks(&mut self, kind: HookType) -> Result<()> {
        self.publish(Event::Hook(kind, event::Hook::Started));

        let mut failed: Option<ExecutionError> = None;
        for hook in self.select_hooks(kind) {
            let mut scope = HookScope {
                feature: self.feature.as_mut(),
                scenario: self.scenario.as_mut(),
            };
            if let Err(e) = (hook.callback)(&mut scope) {
                warn!(
                    kind = %kind,
                    hook = %hook.identity,
                    error = %e,
                    "hook failed; aborting remaining hooks of this firing",
                );
                self.set_hook_error(kind, e.clone());
                failed = Some(e);
                break;
            }
        }

        // Plugin notification is never skipped by a user hook's failure.
        self.plugins.hooks_fired(kind, self.scenario.as_ref());

        match failed {
            None => {
                self.publish(Event::Hook(kind, event::Hook::Passed));
                Ok(())
            }
            Some(e) => {
                self.publish(Event::Hook(kind, event::Hook::Failed));
                Err(e)
            }
        }
    }

    /// Selects the descriptors of `kind` applying to the active scope:
    /// filtered by predicate, deduplicated by identity, stably ordered.
    fn select_hooks(&self, kind: HookType) -> Vec<HookDescriptor> {
        let tags = self
            .feature
            .iter()
            .flat_map(|f| &f.tags)
            .chain(self.scenario.iter().flat_map(|s| &s.tags))
            .map(String::as_str)
            .collect::<Vec<_>>();
        let scope = ActiveScope {
            tags: &tags,
            feature: self.feature.as_ref().map(|f| f.title.as_str()),
            scenario: self.scenario.as_ref().map(|s| s.title.as_str()),
        };

        let mut by_identity = LinkedHashMap::new();
        for hook in self.registry.hooks(kind) {
            let applies =
                hook.scope.as_ref().map_or(true, |expr| expr.eval(&scope));
            if applies && !by_identity.contains_key(&hook.identity) {
                by_identity.insert(hook.identity.clone(), hook);
            }
        }

        by_identity
            .into_iter()
            .map(|(_, hook)| hook)
            .sorted_by_key(|hook| hook.order)
            .collect()
    }

    /// Records a hook error against the scope owning `kind`.
    ///
    /// The scope's retained error is only set if still unset; a
    /// scenario-scoped error additionally escalates the scenario status to
    /// [`ExecutionStatus::TestError`] through the status lattice.
    pub(crate) fn set_hook_error(&mut self, kind: HookType, err: ExecutionError) {
        match kind.scope_level() {
            ScopeLevel::Run => self.run.retain_error(err),
            ScopeLevel::Feature => match self.feature.as_mut() {
                Some(feature) => {
                    if feature.retained_error.is_none() {
                        feature.retained_error = Some(err);
                    }
                }
                None => warn!(
                    kind = %kind,
                    error = %err,
                    "feature-scoped hook error with no open feature",
                ),
            },
            ScopeLevel::Scenario => match self.scenario.as_mut() {
                Some(scenario) => {
                    scenario.escalate(ExecutionStatus::TestError, Some(err));
                }
                None => warn!(
                    kind = %kind,
                    error = %err,
                    "scenario-scoped hook error with no open scenario",
                ),
            },
        }
    }
}
