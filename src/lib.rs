//! Library for inferring deterministic finite acceptors from labelled traces by state merging.
//!
//! The learner starts from a prefix tree acceptor (PTA), which is built from a [`Sample`] of
//! accepted and rejected traces by the [`PrefixTreeBuilder`]. It then repeatedly picks a pair of
//! states, one *red* (confirmed) and one *blue* (a frontier state that is exactly one transition
//! beyond the red ones), evaluates how much evidence there is for identifying the two and commits
//! the best such merge. A merge never mutates the graph it was computed on, instead it produces a
//! fresh [`TransitionGraph`], so that a run can be stopped between any two iterations without
//! leaving a half-merged hypothesis behind.
//!
//! The main building blocks are
//! - [`TransitionGraph`], a deterministic transition table over stable [`StateId`]s, where each
//!   state carries an accept flag, a [`Colour`] and its depth.
//! - [`PrefixTreeBuilder`], which turns traces into a tree-shaped graph and reports
//!   [`ConflictingLabelling`] when two traces disagree.
//! - [`passive::ScoringStrategy`], which walks both subtrees of a [`passive::StatePair`]
//!   simultaneously and produces a [`passive::PairScore`] together with an
//!   [`passive::EquivalenceMap`].
//! - [`passive::merge`], which commits a scored pair.
//! - [`passive::Learner`], the blue-fringe search loop, which can optionally consult an
//!   [`active::Oracle`] before committing a merge.
//!
//! Traces use prefix-closed semantics: a positive trace implies that all of its prefixes are
//! accepted, a negative trace implies that all proper prefixes are accepted and the full trace is
//! rejected. Consequently a missing transition in a hypothesis means rejection.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use statemerge::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        active::{
            Answer, NoOracle, Oracle, OracleUnavailable, Question, QuestionConfig,
            QuestionGenerator, ReferenceOracle,
        },
        graph::{Colour, GraphBuilder, GraphError, State, StateId, TransitionGraph},
        math,
        passive::{
            learn, merge, ContractViolation, EquivalenceMap, Explanation, LearnError, Learner,
            LearnerConfig, MergeRecord, PairScore, Phase, Promotion, ScoringStrategy, StatePair,
            Step,
        },
        prefixtree::{ConflictPolicy, ConflictingLabelling, PrefixTreeBuilder},
        sample::{Outcome, Sample, Trace},
        testset::{EquivalentStates, WMethod},
        Show, Symbol,
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

/// Defines the transition graph that holds the tentative automaton.
pub mod graph;
pub use graph::{Colour, StateId, TransitionGraph};

/// Labelled traces, the input of the learner.
pub mod sample;
pub use sample::{Outcome, Sample, Trace};

/// Construction of prefix tree acceptors.
pub mod prefixtree;
pub use prefixtree::{ConflictingLabelling, PrefixTreeBuilder};

/// Contains the passive part of the learner, that is pair scoring, merging and the search loop.
pub mod passive;

/// Interactive refinement: oracles and the questions that are posed to them.
pub mod active;

/// Generation of test suites from a reference automaton using the W-method.
pub mod testset;

/// Implements the generation of random reference automata and samples.
#[cfg(feature = "random")]
pub mod random;

use itertools::Itertools;
use std::{fmt::Debug, hash::Hash};

/// A symbol is anything that can label a transition. Labels need a total order, as the learner
/// iterates over them in a fixed order to be reproducible.
pub trait Symbol: Clone + Eq + Ord + Hash + Debug + Show + Send + Sync {}

impl<T: Clone + Eq + Ord + Hash + Debug + Show + Send + Sync> Symbol for T {}

/// Helper trait which can be used to display states, transitions and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for a state index that should be
    /// for example q0, q1, q2, ... and for a transition (q0, a, q1) it should be (q0, a, q1).
    /// Just use something that makes sense. This is mainly used for debugging purposes.
    fn show(&self) -> String;
    /// Show a collection of the thing, for a collection of states this should be {q0, q1, q2, ...}
    /// and for a collection of transitions it should be {(q0, a, q1), (q1, b, q2), ...}.
    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!("{{{}}}", iter.into_iter().map(|x| x.show()).join(", "))
    }
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for u32 {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for char {
    fn show(&self) -> String {
        self.to_string()
    }

    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!("\"{}\"", iter.into_iter().collect::<String>())
    }
}

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }

    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!("\"{}\"", iter.into_iter().join(" "))
    }
}

impl Show for str {
    fn show(&self) -> String {
        self.to_string()
    }

    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!("\"{}\"", iter.into_iter().join(" "))
    }
}

impl Show for bool {
    fn show(&self) -> String {
        match self {
            true => "+",
            false => "-",
        }
        .to_string()
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<S: Show + ?Sized> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }

    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        S::show_collection(iter.into_iter().copied())
    }
}
