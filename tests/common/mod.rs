//! Shared fakes for the integration tests: a regex-backed matcher, a
//! behavior-map invoker, a plain converter and recording observers.

// Not every test binary uses every fake.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::AtomicUsize,
        Arc, Mutex,
    },
    time::Duration,
};

use cornichon::{
    context::ScenarioContext,
    error::Result,
    event::{Event, EventPublisher},
    hook::HookType,
    observer::{PluginEmitter, SkippedStepObserver},
    step::{
        ArgumentConverter, MatchFailureReason, MatchResult, Matcher,
        OperationHandle, ParameterType, RawArgument, StepDefinitionKind,
        StepInfo, StepInvoker, StepKind, StepMatch, Value,
    },
    Culture, ExecutionError, FeatureInfo, ScenarioInfo,
};
use regex::Regex;

/// Builds a [`StepInfo`] with the conventional keyword for its kind.
pub fn step(kind: StepKind, text: &str) -> StepInfo {
    let keyword = match kind {
        StepKind::Given => "Given ",
        StepKind::When => "When ",
        StepKind::Then => "Then ",
        StepKind::And => "And ",
        StepKind::But => "But ",
    };
    StepInfo::new(kind, keyword, text)
}

/// Builds a [`FeatureInfo`] without tags or declared culture.
pub fn feature(title: &str) -> FeatureInfo {
    FeatureInfo {
        title: title.into(),
        tags: vec![],
        culture: None,
        target_language: None,
    }
}

/// Builds a [`FeatureInfo`] with tags.
pub fn tagged_feature(title: &str, tags: &[&str]) -> FeatureInfo {
    FeatureInfo {
        title: title.into(),
        tags: tags.iter().map(ToString::to_string).collect(),
        culture: None,
        target_language: None,
    }
}

/// Builds a [`ScenarioInfo`] without tags.
pub fn scenario(title: &str) -> ScenarioInfo {
    ScenarioInfo { title: title.into(), tags: vec![] }
}

/// Builds a [`ScenarioInfo`] with tags.
pub fn tagged_scenario(title: &str, tags: &[&str]) -> ScenarioInfo {
    ScenarioInfo {
        title: title.into(),
        tags: tags.iter().map(ToString::to_string).collect(),
    }
}

/// Matcher resolving step texts against regex patterns, one pattern per
/// registered operation. Capture groups become the operation's arguments.
///
/// Resolution rules mirror the engine's contract: no matching pattern is
/// `NoCandidates`; several patterns whose capture count fits their declared
/// parameters is `AmbiguousExact`; patterns matching the text but all
/// failing the parameter-shape check is `AmbiguousParameterMismatch`.
#[derive(Default)]
pub struct RegexMatcher {
    defs: Vec<(StepDefinitionKind, Regex, OperationHandle)>,
}

impl RegexMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an operation with string parameters, one per capture group.
    #[must_use]
    pub fn def(
        mut self,
        kind: StepDefinitionKind,
        pattern: &str,
        id: &str,
        params: usize,
    ) -> Self {
        self.defs.push((
            kind,
            Regex::new(pattern).unwrap(),
            OperationHandle {
                id: id.into(),
                parameters: vec![ParameterType::String; params],
                obsolete: None,
            },
        ));
        self
    }

    /// Registers an operation with an explicit parameter shape.
    #[must_use]
    pub fn typed_def(
        mut self,
        kind: StepDefinitionKind,
        pattern: &str,
        id: &str,
        params: &[ParameterType],
    ) -> Self {
        self.defs.push((
            kind,
            Regex::new(pattern).unwrap(),
            OperationHandle {
                id: id.into(),
                parameters: params.to_vec(),
                obsolete: None,
            },
        ));
        self
    }

    /// Registers an operation carrying an obsolete marker.
    #[must_use]
    pub fn obsolete_def(
        mut self,
        kind: StepDefinitionKind,
        pattern: &str,
        id: &str,
        message: &str,
    ) -> Self {
        self.defs.push((
            kind,
            Regex::new(pattern).unwrap(),
            OperationHandle {
                id: id.into(),
                parameters: vec![],
                obsolete: Some(message.into()),
            },
        ));
        self
    }
}

impl Matcher for RegexMatcher {
    fn resolve(
        &self,
        kind: StepDefinitionKind,
        text: &str,
        _: &Culture,
    ) -> MatchResult {
        let hits = self
            .defs
            .iter()
            .filter(|(k, re, _)| *k == kind && re.is_match(text))
            .collect::<Vec<_>>();
        if hits.is_empty() {
            return MatchResult::Failure {
                candidates: vec![],
                reason: MatchFailureReason::NoCandidates,
            };
        }

        // Table parameters come from the step itself, not from captures.
        let fitting = hits
            .iter()
            .filter(|(_, re, op)| {
                let text_params = op
                    .parameters
                    .iter()
                    .filter(|p| **p != ParameterType::Table)
                    .count();
                re.captures(text).map_or(false, |c| c.len() - 1 == text_params)
            })
            .collect::<Vec<_>>();
        match fitting.as_slice() {
            [] => MatchResult::Failure {
                candidates: hits
                    .iter()
                    .map(|(_, _, op)| op.id.clone())
                    .collect(),
                reason: MatchFailureReason::AmbiguousParameterMismatch,
            },
            [(_, re, op)] => {
                let captures = re.captures(text).unwrap();
                let arguments = captures
                    .iter()
                    .skip(1)
                    .map(|c| {
                        RawArgument::Text(
                            c.map(|m| m.as_str().to_owned())
                                .unwrap_or_default(),
                        )
                    })
                    .collect();
                MatchResult::Success(StepMatch {
                    operation: (*op).clone(),
                    arguments,
                })
            }
            _ => MatchResult::Failure {
                candidates: fitting
                    .iter()
                    .map(|(_, _, op)| op.id.clone())
                    .collect(),
                reason: MatchFailureReason::AmbiguousExact,
            },
        }
    }
}

/// Alias for an operation behavior in a [`MapInvoker`].
pub type StepFn = Box<dyn Fn() -> Result<()> + Send + Sync>;

/// Invoker running per-operation behaviors and logging every invocation.
#[derive(Default)]
pub struct MapInvoker {
    behaviors: HashMap<String, StepFn>,
    invoked: Arc<Mutex<Vec<String>>>,
}

impl MapInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the behavior of the operation with the given `id`; operations
    /// without one just pass.
    #[must_use]
    pub fn on(
        mut self,
        id: &str,
        behavior: impl Fn() -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.behaviors.insert(id.into(), Box::new(behavior));
        self
    }

    /// Shared log of invoked operation ids, in order.
    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.invoked)
    }
}

impl StepInvoker for MapInvoker {
    fn invoke(
        &self,
        operation: &OperationHandle,
        _: Vec<Value>,
        _: &mut ScenarioContext,
    ) -> (Result<()>, Duration) {
        self.invoked.lock().unwrap().push(operation.id.clone());
        let result =
            self.behaviors.get(&operation.id).map_or(Ok(()), |f| f());
        (result, Duration::from_millis(1))
    }
}

/// Converter parsing captured text into the declared parameter types.
pub struct BasicConverter;

impl ArgumentConverter for BasicConverter {
    fn convert(
        &self,
        raw: &RawArgument,
        target: ParameterType,
        culture: &Culture,
    ) -> std::result::Result<Value, cornichon::step::ConversionError> {
        let fail = |value: &str| cornichon::step::ConversionError {
            value: value.into(),
            target,
            culture: culture.clone(),
        };
        match (raw, target) {
            (
                RawArgument::Text(s) | RawArgument::DocString(s),
                ParameterType::String,
            ) => Ok(Value::String(s.clone())),
            (RawArgument::Text(s), ParameterType::Integer) => {
                s.parse().map(Value::Integer).map_err(|_| fail(s))
            }
            (RawArgument::Text(s), ParameterType::Float) => {
                s.parse().map(Value::Float).map_err(|_| fail(s))
            }
            (RawArgument::Text(s), ParameterType::Boolean) => {
                s.parse().map(Value::Boolean).map_err(|_| fail(s))
            }
            (RawArgument::Table(t), ParameterType::Table) => {
                Ok(Value::Table(t.clone()))
            }
            (RawArgument::Text(s) | RawArgument::DocString(s), _) => {
                Err(fail(s))
            }
            (RawArgument::Table(_), _) => Err(fail("<table>")),
        }
    }
}

/// Publisher recording every event it sees.
#[derive(Clone, Default)]
pub struct RecordingPublisher(pub Arc<Mutex<Vec<Event>>>);

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }
}

/// Skipped-step observer counting its notifications.
#[derive(Clone, Default)]
pub struct CountingObserver(pub Arc<AtomicUsize>);

impl SkippedStepObserver for CountingObserver {
    fn step_skipped(&self, _: &ScenarioContext) {
        self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

/// Plugin emitter recording every hook-kind firing it is told about.
#[derive(Clone, Default)]
pub struct RecordingPlugins(pub Arc<Mutex<Vec<HookType>>>);

impl RecordingPlugins {
    pub fn fired(&self) -> Vec<HookType> {
        self.0.lock().unwrap().clone()
    }
}

impl PluginEmitter for RecordingPlugins {
    fn hooks_fired(&self, kind: HookType, _: Option<&ScenarioContext>) {
        self.0.lock().unwrap().push(kind);
    }
}

/// Error type for failing test operations.
#[derive(Clone, Copy, Debug)]
pub struct Boom(pub &'static str);

impl std::fmt::Display for Boom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Boom {}

/// Shorthand for a user-code failure.
pub fn boom(message: &'static str) -> ExecutionError {
    ExecutionError::user(Boom(message))
}
