// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The lifecycle controller: public surface of the execution engine.
//!
//! One [`Engine`] drives one worker. Scenarios never share state across
//! workers; the only process-wide pieces are the [`RunLatch`] and the
//! collaborator [`Arc`]s handed to every worker's builder.

mod block;
mod executor;
mod hooks;
mod scenario;

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    context::{FeatureContext, FeatureInfo, RunLatch, ScenarioContext},
    error::{ExecutionError, Result},
    event::{self, Event, EventPublisher},
    hook::{HookRegistry, HookType},
    observer::{
        AnalyticsNotifier, ObsoleteStepHandler, PluginEmitter,
        SkippedStepObserver,
    },
    step::{ArgumentConverter, Matcher, StepInvoker},
};

/// Execution engine for one worker.
///
/// Sequences run → feature → scenario → block → step lifecycle boundaries,
/// fires the matching hooks at each of them, resolves steps against the
/// registered operations and escalates the scenario status under partial
/// failure. Fully synchronous: once a bound operation is invoked, it runs to
/// completion or raises before control returns here.
pub struct Engine {
    /// Per-run configuration.
    config: EngineConfig,

    /// Process-wide start/end latch, shared between workers.
    run: Arc<RunLatch>,

    /// Source of resolved hook descriptors.
    registry: Arc<dyn HookRegistry + Send + Sync>,

    /// Resolves step texts to operations.
    matcher: Arc<dyn Matcher + Send + Sync>,

    /// Converts captured arguments to declared parameter types.
    converter: Arc<dyn ArgumentConverter + Send + Sync>,

    /// Invokes bound operations.
    invoker: Arc<dyn StepInvoker + Send + Sync>,

    /// Sink for lifecycle events.
    publisher: Arc<dyn EventPublisher + Send + Sync>,

    /// Plugin lifecycle channel.
    plugins: Arc<dyn PluginEmitter + Send + Sync>,

    /// Best-effort analytics channel.
    analytics: Arc<dyn AnalyticsNotifier + Send + Sync>,

    /// Advisory channel for obsolete operations.
    obsolete: Arc<dyn ObsoleteStepHandler + Send + Sync>,

    /// Listeners notified whenever a step takes the skip path.
    skipped_observers: Vec<Arc<dyn SkippedStepObserver + Send + Sync>>,

    /// Feature scope, open between `begin_feature` and `end_feature`.
    feature: Option<FeatureContext>,

    /// Scenario scope, open between `begin_scenario`/`skip_scenario` and
    /// `end_scenario`.
    scenario: Option<ScenarioContext>,
}

// Implemented manually to omit the non-`Debug` collaborators.
impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("run", &self.run)
            .field("feature", &self.feature)
            .field("scenario", &self.scenario)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Starts building an [`Engine`] with no-op collaborators.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Currently open feature scope, if any.
    #[must_use]
    pub fn feature(&self) -> Option<&FeatureContext> {
        self.feature.as_ref()
    }

    /// Currently open scenario scope, if any.
    #[must_use]
    pub fn scenario(&self) -> Option<&ScenarioContext> {
        self.scenario.as_ref()
    }

    /// Begins the test run. Idempotent: only the first caller (across all
    /// workers sharing the [`RunLatch`]) performs the body.
    ///
    /// The analytics notification is best-effort: its failure is discarded
    /// and must never fail the run.
    ///
    /// # Errors
    ///
    /// If a `BeforeTestRun` hook raises.
    pub fn begin_run(&mut self) -> Result<()> {
        if !self.run.try_start() {
            return Ok(());
        }
        if let Err(e) = self.analytics.project_running() {
            debug!(error = %e, "analytics notification failed; ignoring");
        }
        self.publisher.publish(Event::Run(event::Run::Started));
        self.fire_hooks(HookType::BeforeTestRun)
    }

    /// Ends the test run. Idempotent under concurrent callers: exactly one
    /// performs the `AfterTestRun` hooks and the finish notification, racing
    /// callers wait on the latch and then no-op.
    ///
    /// # Errors
    ///
    /// If an `AfterTestRun` hook raises (only for the caller that performed
    /// the body).
    pub fn end_run(&mut self) -> Result<()> {
        let run = Arc::clone(&self.run);
        run.end_once(|| {
            let hooks = self.fire_hooks(HookType::AfterTestRun);
            self.publisher.publish(Event::Run(event::Run::Finished));
            hooks
        })
        .unwrap_or(Ok(()))
    }

    /// Begins a feature scope.
    ///
    /// In deferred-teardown mode, a still-open feature scope is auto-closed
    /// first, for hosts which only run fixture teardown at the very end.
    ///
    /// # Errors
    ///
    /// If a `BeforeFeature` hook raises, or auto-closing the previous
    /// feature fails.
    pub fn begin_feature(&mut self, info: FeatureInfo) -> Result<()> {
        if self.config.deferred_fixture_teardown && self.feature.is_some() {
            self.end_feature()?;
        }
        let ctx = FeatureContext::new(info, &self.config.default_culture);
        self.publisher.publish(Event::feature_started(ctx.title.clone()));
        self.feature = Some(ctx);
        self.fire_hooks(HookType::BeforeFeature)
    }

    /// Ends the open feature scope: fires `AfterFeature` hooks, reports the
    /// elapsed duration if timing is enabled, publishes feature-finished and
    /// destroys the scope.
    ///
    /// With no feature open, deferred-teardown mode treats the call as a
    /// legitimate double close and ignores it; in normal mode it is a host
    /// sequencing bug and raises.
    ///
    /// # Errors
    ///
    /// If an `AfterFeature` hook raises (the scope is destroyed regardless),
    /// or on a close without an open feature outside deferred-teardown mode.
    pub fn end_feature(&mut self) -> Result<()> {
        if self.feature.is_none() {
            if self.config.deferred_fixture_teardown {
                debug!("end_feature without an open feature; ignoring");
                return Ok(());
            }
            return Err(ExecutionError::InvariantViolation(
                "end_feature without an open feature".into(),
            ));
        }
        let hooks = self.fire_hooks(HookType::AfterFeature);
        if let Some(ctx) = self.feature.take() {
            if self.config.report_timings {
                info!(
                    feature = %ctx.title,
                    elapsed = %humantime::format_duration(
                        ctx.started_at.elapsed(),
                    ),
                    "feature finished",
                );
            }
            self.publisher.publish(Event::feature_finished(ctx.title));
        }
        hooks
    }

    pub(crate) fn publish(&self, event: Event) {
        self.publisher.publish(event);
    }
}

/// Builder of an [`Engine`].
///
/// Every collaborator defaults to the corresponding `()` no-op, so the
/// smallest configuration that executes real steps is a matcher, a converter
/// and an invoker.
#[must_use]
pub struct EngineBuilder {
    config: EngineConfig,
    run: Arc<RunLatch>,
    registry: Arc<dyn HookRegistry + Send + Sync>,
    matcher: Arc<dyn Matcher + Send + Sync>,
    converter: Arc<dyn ArgumentConverter + Send + Sync>,
    invoker: Arc<dyn StepInvoker + Send + Sync>,
    publisher: Arc<dyn EventPublisher + Send + Sync>,
    plugins: Arc<dyn PluginEmitter + Send + Sync>,
    analytics: Arc<dyn AnalyticsNotifier + Send + Sync>,
    obsolete: Arc<dyn ObsoleteStepHandler + Send + Sync>,
    skipped_observers: Vec<Arc<dyn SkippedStepObserver + Send + Sync>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            run: Arc::new(RunLatch::new()),
            registry: Arc::new(()),
            matcher: Arc::new(()),
            converter: Arc::new(()),
            invoker: Arc::new(()),
            publisher: Arc::new(()),
            plugins: Arc::new(()),
            analytics: Arc::new(()),
            obsolete: Arc::new(()),
            skipped_observers: Vec::new(),
        }
    }
}

impl EngineBuilder {
    /// Sets the per-run configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares an existing [`RunLatch`], tying this worker's engine into the
    /// same run as the latch's other workers.
    pub fn run_latch(mut self, run: Arc<RunLatch>) -> Self {
        self.run = run;
        self
    }

    /// Sets the hook registry.
    pub fn registry(
        mut self,
        registry: impl HookRegistry + Send + Sync + 'static,
    ) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Sets the step matcher.
    pub fn matcher(
        mut self,
        matcher: impl Matcher + Send + Sync + 'static,
    ) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    /// Sets the argument converter.
    pub fn converter(
        mut self,
        converter: impl ArgumentConverter + Send + Sync + 'static,
    ) -> Self {
        self.converter = Arc::new(converter);
        self
    }

    /// Sets the operation invoker.
    pub fn invoker(
        mut self,
        invoker: impl StepInvoker + Send + Sync + 'static,
    ) -> Self {
        self.invoker = Arc::new(invoker);
        self
    }

    /// Sets the lifecycle event publisher.
    pub fn publisher(
        mut self,
        publisher: impl EventPublisher + Send + Sync + 'static,
    ) -> Self {
        self.publisher = Arc::new(publisher);
        self
    }

    /// Sets the plugin lifecycle emitter.
    pub fn plugins(
        mut self,
        plugins: impl PluginEmitter + Send + Sync + 'static,
    ) -> Self {
        self.plugins = Arc::new(plugins);
        self
    }

    /// Sets the analytics notifier.
    pub fn analytics(
        mut self,
        analytics: impl AnalyticsNotifier + Send + Sync + 'static,
    ) -> Self {
        self.analytics = Arc::new(analytics);
        self
    }

    /// Sets the obsolete-step handler.
    pub fn obsolete_handler(
        mut self,
        handler: impl ObsoleteStepHandler + Send + Sync + 'static,
    ) -> Self {
        self.obsolete = Arc::new(handler);
        self
    }

    /// Registers an additional skipped-step observer.
    pub fn observe_skipped(
        mut self,
        observer: impl SkippedStepObserver + Send + Sync + 'static,
    ) -> Self {
        self.skipped_observers.push(Arc::new(observer));
        self
    }

    /// Finishes building the [`Engine`].
    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            config: self.config,
            run: self.run,
            registry: self.registry,
            matcher: self.matcher,
            converter: self.converter,
            invoker: self.invoker,
            publisher: self.publisher,
            plugins: self.plugins,
            analytics: self.analytics,
            obsolete: self.obsolete,
            skipped_observers: self.skipped_observers,
            feature: None,
            scenario: None,
        }
    }
}
