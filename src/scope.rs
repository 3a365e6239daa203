// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Scope predicates restricting where a [`HookDescriptor`] applies.
//!
//! A hook without a predicate is global and always matches; a scoped one is
//! evaluated against the active tags and feature/scenario titles.
//!
//! [`HookDescriptor`]: crate::hook::HookDescriptor

/// Snapshot of the currently active scope a predicate is evaluated against.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActiveScope<'a> {
    /// Union of feature-level and scenario-level tags.
    pub tags: &'a [&'a str],

    /// Title of the feature currently open, if any.
    pub feature: Option<&'a str>,

    /// Title of the scenario currently open, if any.
    pub scenario: Option<&'a str>,
}

/// Predicate over the active scope, combinable with boolean operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScopeExpr {
    /// Both sub-predicates must match.
    And(Box<ScopeExpr>, Box<ScopeExpr>),

    /// Either sub-predicate must match.
    Or(Box<ScopeExpr>, Box<ScopeExpr>),

    /// Sub-predicate must not match.
    Not(Box<ScopeExpr>),

    /// The given tag must be active.
    Tag(String),

    /// The feature with the given title must be open.
    Feature(String),

    /// The scenario with the given title must be open.
    Scenario(String),
}

impl ScopeExpr {
    /// Predicate matching when `tag` is active.
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    /// Predicate matching inside the feature with the given `title`.
    #[must_use]
    pub fn feature(title: impl Into<String>) -> Self {
        Self::Feature(title.into())
    }

    /// Predicate matching inside the scenario with the given `title`.
    #[must_use]
    pub fn scenario(title: impl Into<String>) -> Self {
        Self::Scenario(title.into())
    }

    /// Combines with `other` so that both must match.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Combines with `other` so that either may match.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Negates this predicate.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluates this predicate for the given active `scope`.
    #[must_use]
    pub fn eval(&self, scope: &ActiveScope<'_>) -> bool {
        match self {
            Self::And(l, r) => l.eval(scope) & r.eval(scope),
            Self::Or(l, r) => l.eval(scope) | r.eval(scope),
            Self::Not(e) => !e.eval(scope),
            Self::Tag(t) => scope.tags.iter().any(|tag| tag == t),
            Self::Feature(title) => scope.feature == Some(title.as_str()),
            Self::Scenario(title) => scope.scenario == Some(title.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope<'a>(tags: &'a [&'a str]) -> ActiveScope<'a> {
        ActiveScope {
            tags,
            feature: Some("Eating cukes"),
            scenario: Some("Hungry Joe"),
        }
    }

    #[test]
    fn tag_matches_any_active_tag() {
        let expr = ScopeExpr::tag("slow");
        assert!(expr.eval(&scope(&["fast", "slow"])));
        assert!(!expr.eval(&scope(&["fast"])));
    }

    #[test]
    fn boolean_combinators_compose() {
        let expr = ScopeExpr::tag("a").and(ScopeExpr::tag("b").not());
        assert!(expr.eval(&scope(&["a"])));
        assert!(!expr.eval(&scope(&["a", "b"])));

        let either = ScopeExpr::tag("a").or(ScopeExpr::tag("b"));
        assert!(either.eval(&scope(&["b"])));
        assert!(!either.eval(&scope(&["c"])));
    }

    #[test]
    fn feature_and_scenario_titles_match_exactly() {
        let expr = ScopeExpr::feature("Eating cukes")
            .and(ScopeExpr::scenario("Hungry Joe"));
        assert!(expr.eval(&scope(&[])));

        let other = ScopeExpr::scenario("Full Joe");
        assert!(!other.eval(&scope(&[])));
    }
}
