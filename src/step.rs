// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step descriptions, the resolution contract against registered operations,
//! and the external collaborator interfaces the engine drives per step.
//!
//! The matching algorithm itself lives behind [`Matcher`]: the engine only
//! relies on the [`MatchResult`] contract (exactly one operation, or a
//! classified failure to resolve one).

use std::time::Duration;

use derive_more::with_trait::{Display, Error};

use crate::{
    config::Culture, context::ScenarioContext, data_table::DataTable,
    error::Result,
};

/// Keyword kind of a single step line.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[display("{self:?}")]
pub enum StepKind {
    /// Arranges preconditions.
    Given,

    /// Performs the action under test.
    When,

    /// Asserts the outcome.
    Then,

    /// Continues the most recent explicit [`Given`]/[`When`]/[`Then`] block.
    ///
    /// [`Given`]: StepKind::Given
    /// [`Then`]: StepKind::Then
    /// [`When`]: StepKind::When
    And,

    /// Same as [`And`], with contrasting phrasing.
    ///
    /// [`And`]: StepKind::And
    But,
}

/// Definition kind a step resolves against, after [`StepKind::And`]/
/// [`StepKind::But`] inheritance is applied.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[display("{self:?}")]
pub enum StepDefinitionKind {
    /// Precondition definition.
    Given,

    /// Action definition.
    When,

    /// Assertion definition.
    Then,
}

/// Contiguous run of same-kind steps within a scenario.
///
/// [`BlockType::None`] is the sentinel a scenario starts in and is forced
/// back to after its last step, closing any open block.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
#[display("{self:?}")]
pub enum BlockType {
    /// No block open.
    #[default]
    None,

    /// Given block.
    Given,

    /// When block.
    When,

    /// Then block.
    Then,
}

impl BlockType {
    /// Definition kind steps of this block resolve against, if any.
    #[must_use]
    pub fn definition_kind(self) -> Option<StepDefinitionKind> {
        match self {
            Self::None => None,
            Self::Given => Some(StepDefinitionKind::Given),
            Self::When => Some(StepDefinitionKind::When),
            Self::Then => Some(StepDefinitionKind::Then),
        }
    }
}

impl StepKind {
    /// Block this step kind opens, or [`None`] for [`StepKind::And`]/
    /// [`StepKind::But`], which inherit the most recent explicit block.
    #[must_use]
    pub fn block(self) -> Option<BlockType> {
        match self {
            Self::Given => Some(BlockType::Given),
            Self::When => Some(BlockType::When),
            Self::Then => Some(BlockType::Then),
            Self::And | Self::But => None,
        }
    }
}

/// One step line as provided by the host.
#[derive(Clone, Debug)]
pub struct StepInfo {
    /// Keyword kind of this step.
    pub kind: StepKind,

    /// Literal keyword as written, e.g. `"Given "` or a localized one.
    pub keyword: String,

    /// Step text after the keyword.
    pub text: String,

    /// Multiline string argument, if present.
    pub doc_string: Option<String>,

    /// Table argument, if present.
    pub table: Option<DataTable>,
}

impl StepInfo {
    /// Creates a plain step without extra arguments.
    #[must_use]
    pub fn new(kind: StepKind, keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            keyword: keyword.into(),
            text: text.into(),
            doc_string: None,
            table: None,
        }
    }

    /// Step text prefixed by its keyword, as reported in diagnostics.
    #[must_use]
    pub fn display_text(&self) -> String {
        format!("{}{}", self.keyword, self.text)
    }
}

/// Declared parameter type of a registered operation.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[display("{self:?}")]
pub enum ParameterType {
    /// Plain string.
    String,

    /// Integer number.
    Integer,

    /// Floating-point number.
    Float,

    /// Boolean.
    Boolean,

    /// [`DataTable`] argument.
    Table,
}

/// Raw argument captured from the step before conversion.
#[derive(Clone, Debug, PartialEq)]
pub enum RawArgument {
    /// Text captured from the step's text by the matching pattern.
    Text(String),

    /// The step's multiline string argument.
    DocString(String),

    /// The step's table argument.
    Table(DataTable),
}

/// Converted argument value handed to the bound operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// String value.
    String(String),

    /// Integer value.
    Integer(i64),

    /// Floating-point value.
    Float(f64),

    /// Boolean value.
    Boolean(bool),

    /// Table value.
    Table(DataTable),
}

/// Already-resolved description of a registered operation.
///
/// Produced by a separate discovery phase; the engine never inspects how an
/// operation is implemented, only its declared shape.
#[derive(Clone, Debug)]
pub struct OperationHandle {
    /// Stable identity and display name of the operation.
    pub id: String,

    /// Declared parameter shape, in order.
    pub parameters: Vec<ParameterType>,

    /// Deprecation message, if the operation is marked obsolete.
    pub obsolete: Option<String>,
}

/// Successful resolution of a step to exactly one operation.
#[derive(Clone, Debug)]
pub struct StepMatch {
    /// The resolved operation.
    pub operation: OperationHandle,

    /// Raw arguments captured by the match, in declaration order.
    pub arguments: Vec<RawArgument>,
}

/// Reason a step's text could not be resolved to exactly one operation.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[display("{self:?}")]
pub enum MatchFailureReason {
    /// No registered operation matched at all.
    NoCandidates,

    /// Several equally valid operations matched; candidates may differ in
    /// priority but none outranks the others.
    AmbiguousExact,

    /// Operations matched the text, but every one failed argument-shape
    /// validation.
    AmbiguousParameterMismatch,
}

/// Outcome of resolving one step against the operation registry.
#[derive(Clone, Debug)]
pub enum MatchResult {
    /// Exactly one usable operation.
    Success(StepMatch),

    /// No usable operation; classified.
    Failure {
        /// Descriptions of the operations considered.
        candidates: Vec<String>,

        /// Failure classification.
        reason: MatchFailureReason,
    },
}

/// Error of converting a [`RawArgument`] to a declared [`ParameterType`].
///
/// Propagated as a fatal step failure; conversion is never retried.
#[derive(Clone, Debug, Display, Error)]
#[display("cannot convert '{value}' to {target} (culture: {culture})")]
pub struct ConversionError {
    /// Offending raw value, rendered for diagnostics.
    pub value: String,

    /// Requested target type.
    pub target: ParameterType,

    /// Culture the conversion ran under.
    pub culture: Culture,
}

/// Resolves a step's text against the registered operations.
///
/// The pattern-matching algorithm is the implementor's business; the engine
/// relies only on the returned [`MatchResult`] honoring the ambiguity
/// classification rules.
pub trait Matcher {
    /// Resolves `text` of the given definition `kind` under `culture`.
    fn resolve(
        &self,
        kind: StepDefinitionKind,
        text: &str,
        culture: &Culture,
    ) -> MatchResult;
}

/// Converts captured raw arguments to the bound parameters' declared types,
/// culture-aware.
pub trait ArgumentConverter {
    /// Converts a single `raw` argument to `target` under `culture`.
    fn convert(
        &self,
        raw: &RawArgument,
        target: ParameterType,
        culture: &Culture,
    ) -> std::result::Result<Value, ConversionError>;
}

/// Invokes a bound operation, timing the call.
///
/// The operation's own failure surfaces unmodified in the returned result;
/// the elapsed duration is reported on success and failure alike. A
/// non-terminating operation blocks its worker indefinitely: the engine has
/// no timeout or cancellation mechanism.
pub trait StepInvoker {
    /// Invokes `operation` with the converted `args` against the active
    /// scenario.
    fn invoke(
        &self,
        operation: &OperationHandle,
        args: Vec<Value>,
        scenario: &mut ScenarioContext,
    ) -> (Result<()>, Duration);
}

/// [`Matcher`] with no registered operations: everything is undefined.
impl Matcher for () {
    fn resolve(
        &self,
        _: StepDefinitionKind,
        _: &str,
        _: &Culture,
    ) -> MatchResult {
        MatchResult::Failure {
            candidates: Vec::new(),
            reason: MatchFailureReason::NoCandidates,
        }
    }
}

/// [`ArgumentConverter`] rejecting every conversion; unreachable as long as
/// the matcher resolves nothing.
impl ArgumentConverter for () {
    fn convert(
        &self,
        raw: &RawArgument,
        target: ParameterType,
        culture: &Culture,
    ) -> std::result::Result<Value, ConversionError> {
        let value = match raw {
            RawArgument::Text(s) | RawArgument::DocString(s) => s.clone(),
            RawArgument::Table(_) => "<table>".into(),
        };
        Err(ConversionError { value, target, culture: culture.clone() })
    }
}

/// [`StepInvoker`] rejecting every invocation; unreachable as long as the
/// matcher resolves nothing.
impl StepInvoker for () {
    fn invoke(
        &self,
        _: &OperationHandle,
        _: Vec<Value>,
        _: &mut ScenarioContext,
    ) -> (Result<()>, Duration) {
        (
            Err(crate::error::ExecutionError::BindingMisconfiguration(
                "no step invoker configured".into(),
            )),
            Duration::ZERO,
        )
    }
}
