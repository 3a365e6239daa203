// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Lifecycle hook descriptors and their registry contract.
//!
//! Descriptors are already resolved: a separate discovery phase turns
//! whatever attribute/reflection machinery the host has into plain
//! [`HookDescriptor`] values, and the engine consumes only those.

use std::{
    fmt,
    sync::Arc,
};

use derive_more::with_trait::Display;

use crate::{
    context::{FeatureContext, ScenarioContext},
    error::Result,
    scope::ScopeExpr,
};

/// Boundary kind a hook fires at.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("{self:?}")]
pub enum HookType {
    /// Before any feature of the run.
    BeforeTestRun,

    /// After the last feature of the run.
    AfterTestRun,

    /// Before the first scenario of a feature.
    BeforeFeature,

    /// After the last scenario of a feature.
    AfterFeature,

    /// Before the first step of a scenario.
    BeforeScenario,

    /// After the last step of a scenario.
    AfterScenario,

    /// Before the first step of a Given/When/Then block.
    BeforeScenarioBlock,

    /// After the last step of a Given/When/Then block.
    AfterScenarioBlock,

    /// Before each step.
    BeforeStep,

    /// After each step.
    AfterStep,
}

/// Scope owning the errors of hooks of a given [`HookType`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScopeLevel {
    /// Whole test run.
    Run,

    /// Currently open feature.
    Feature,

    /// Currently open scenario.
    Scenario,
}

impl HookType {
    /// Scope a failing hook of this type is recorded against.
    ///
    /// Everything below feature level is scenario-scoped.
    #[must_use]
    pub fn scope_level(self) -> ScopeLevel {
        match self {
            Self::BeforeTestRun | Self::AfterTestRun => ScopeLevel::Run,
            Self::BeforeFeature | Self::AfterFeature => ScopeLevel::Feature,
            Self::BeforeScenario
            | Self::AfterScenario
            | Self::BeforeScenarioBlock
            | Self::AfterScenarioBlock
            | Self::BeforeStep
            | Self::AfterStep => ScopeLevel::Scenario,
        }
    }
}

/// Identity of the underlying operation a [`HookDescriptor`] points at.
///
/// Two descriptors sharing an identity are the same operation reachable
/// through different scope predicates, and run at most once per firing.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[display("{_0}")]
pub struct HookId(String);

impl From<&str> for HookId {
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

impl From<String> for HookId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Contexts a hook callback may touch, borrowed from the engine for the
/// duration of a single invocation.
#[derive(Debug)]
pub struct HookScope<'a> {
    /// Feature scope, if one is open.
    pub feature: Option<&'a mut FeatureContext>,

    /// Scenario scope, if one is open.
    pub scenario: Option<&'a mut ScenarioContext>,
}

/// Alias for a resolved hook callback.
pub type HookFn = Arc<dyn Fn(&mut HookScope<'_>) -> Result<()> + Send + Sync>;

/// Already-resolved description of one lifecycle hook.
#[derive(Clone)]
pub struct HookDescriptor {
    /// Boundary this hook fires at.
    pub kind: HookType,

    /// Scope predicate; [`None`] makes the hook global (always matching).
    pub scope: Option<ScopeExpr>,

    /// Ordering key; lower fires earlier, ties keep registration order.
    pub order: i32,

    /// Identity used for per-firing deduplication.
    pub identity: HookId,

    /// The callback itself.
    pub callback: HookFn,
}

// Implemented manually to omit the non-`Debug` callback.
impl fmt::Debug for HookDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDescriptor")
            .field("kind", &self.kind)
            .field("scope", &self.scope)
            .field("order", &self.order)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl HookDescriptor {
    /// Creates a global hook with the default order.
    #[must_use]
    pub fn new(
        kind: HookType,
        identity: impl Into<HookId>,
        callback: impl Fn(&mut HookScope<'_>) -> Result<()>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            kind,
            scope: None,
            order: 0,
            identity: identity.into(),
            callback: Arc::new(callback),
        }
    }

    /// Restricts this hook to scopes matching `expr`.
    #[must_use]
    pub fn scoped(mut self, expr: ScopeExpr) -> Self {
        self.scope = Some(expr);
        self
    }

    /// Sets the ordering key.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

/// Read-only source of resolved [`HookDescriptor`]s.
///
/// Populated by a separate discovery phase; the engine never mutates it.
pub trait HookRegistry {
    /// All registered hooks of the given `kind`, in registration order.
    fn hooks(&self, kind: HookType) -> Vec<HookDescriptor>;
}

/// Plain in-memory [`HookRegistry`].
#[derive(Clone, Debug, Default)]
pub struct Collection {
    hooks: Vec<HookDescriptor>,
}

impl Collection {
    /// Creates an empty [`Collection`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resolved `hook`, keeping registration order.
    #[must_use]
    pub fn with(mut self, hook: HookDescriptor) -> Self {
        self.hooks.push(hook);
        self
    }
}

impl HookRegistry for Collection {
    fn hooks(&self, kind: HookType) -> Vec<HookDescriptor> {
        self.hooks.iter().filter(|h| h.kind == kind).cloned().collect()
    }
}

/// Empty registry.
impl HookRegistry for () {
    fn hooks(&self, _: HookType) -> Vec<HookDescriptor> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_levels_default_to_scenario() {
        assert_eq!(HookType::BeforeTestRun.scope_level(), ScopeLevel::Run);
        assert_eq!(HookType::AfterFeature.scope_level(), ScopeLevel::Feature);
        assert_eq!(HookType::BeforeStep.scope_level(), ScopeLevel::Scenario);
        assert_eq!(
            HookType::AfterScenarioBlock.scope_level(),
            ScopeLevel::Scenario,
        );
    }

    #[test]
    fn collection_filters_by_kind_preserving_order() {
        let reg = Collection::new()
            .with(HookDescriptor::new(HookType::BeforeStep, "a", |_| Ok(())))
            .with(HookDescriptor::new(HookType::AfterStep, "b", |_| Ok(())))
            .with(HookDescriptor::new(HookType::BeforeStep, "c", |_| Ok(())));

        let before = reg.hooks(HookType::BeforeStep);
        let ids =
            before.iter().map(|h| h.identity.to_string()).collect::<Vec<_>>();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(reg.hooks(HookType::AfterStep).len(), 1);
    }
}
