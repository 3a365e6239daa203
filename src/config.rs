// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-run configuration threaded through the [`Engine`].
//!
//! [`Engine`]: crate::Engine

use derive_more::with_trait::Display;
use smart_default::SmartDefault;

/// Culture (locale) tag driving step matching and argument conversion,
/// e.g. `en-US` or `de-DE`.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[display("{_0}")]
pub struct Culture(String);

impl Culture {
    /// Returns the culture tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Culture {
    fn default() -> Self {
        Self("en-US".into())
    }
}

impl From<String> for Culture {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl From<&str> for Culture {
    fn from(tag: &str) -> Self {
        Self(tag.into())
    }
}

/// Hint about the programming language the operations are authored in, used
/// only for diagnostics about unmatched steps.
#[derive(Clone, Debug, Default, Display, Eq, PartialEq)]
#[display("{_0}")]
pub struct TargetLanguage(String);

impl From<String> for TargetLanguage {
    fn from(hint: String) -> Self {
        Self(hint)
    }
}

impl From<&str> for TargetLanguage {
    fn from(hint: &str) -> Self {
        Self(hint.into())
    }
}

/// Configuration of a single test run.
///
/// Replaces any process-wide mutable defaults: every [`Engine`] owns its copy
/// and no configuration is reachable through globals.
///
/// [`Engine`]: crate::Engine
#[derive(Clone, Debug, SmartDefault)]
pub struct EngineConfig {
    /// Culture used for matching and conversion when a feature doesn't
    /// declare its own.
    pub default_culture: Culture,

    /// Whether a failing step aborts the remaining steps of its scenario
    /// immediately, instead of letting them run through the skip path.
    pub stop_at_first_error: bool,

    /// Whether elapsed durations of features and scenarios are reported.
    #[default(true)]
    pub report_timings: bool,

    /// Compatibility mode for hosts which only run fixture teardown at the
    /// very end of the run: feature scopes are auto-closed on the next
    /// feature start instead of relying on the host to close them.
    pub deferred_fixture_teardown: bool,
}
