// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution engine for declarative, example-based Given/When/Then
//! scenarios.
//!
//! The [`Engine`] drives a test-run → feature → scenario → block → step
//! lifecycle from start to finish: it selects and fires lifecycle hooks at
//! every boundary, resolves each step against a registered operation,
//! escalates the execution status under partial failure and translates the
//! final status into one [`ScenarioOutcome`] for the hosting test runner.
//!
//! Everything around it is an external collaborator consumed through a
//! trait: the step [`Matcher`], the argument converter, the operation
//! invoker, the hook registry and the lifecycle event publisher. Parsing
//! scenario descriptions, discovering operations and formatting reports are
//! explicitly someone else's business.
//!
//! # Example
//!
//! ```rust
//! use cornichon::{Engine, FeatureInfo, ScenarioInfo};
//!
//! let mut engine = Engine::builder().build();
//! engine.begin_run()?;
//! engine.begin_feature(FeatureInfo {
//!     title: "Eating cucumbers".into(),
//!     tags: vec![],
//!     culture: None,
//!     target_language: None,
//! })?;
//! engine.begin_scenario(ScenarioInfo {
//!     title: "Nothing to eat".into(),
//!     tags: vec![],
//! });
//! let outcome = engine.after_last_step()?;
//! assert!(!outcome.is_failure());
//! engine.end_scenario()?;
//! engine.end_feature()?;
//! engine.end_run()?;
//! # Ok::<(), cornichon::ExecutionError>(())
//! ```

#![forbid(non_ascii_idents, unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod data_table;
mod engine;
pub mod error;
pub mod event;
pub mod hook;
pub mod observer;
pub mod outcome;
pub mod scope;
pub mod status;
pub mod step;

pub use self::{
    config::{Culture, EngineConfig, TargetLanguage},
    context::{
        FeatureContext, FeatureInfo, RunLatch, ScenarioContext, ScenarioInfo,
        StepContext,
    },
    data_table::DataTable,
    engine::{Engine, EngineBuilder},
    error::{ExecutionError, UserError},
    event::{Event, EventPublisher},
    hook::{HookDescriptor, HookRegistry, HookType},
    outcome::ScenarioOutcome,
    scope::ScopeExpr,
    status::ExecutionStatus,
    step::{
        ArgumentConverter, BlockType, MatchResult, Matcher, StepInfo,
        StepInvoker, StepKind,
    },
};
