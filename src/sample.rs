use std::{fmt::Debug, str::FromStr};

use itertools::Itertools;
use thiserror::Error;

use crate::{graph::TransitionGraph, Show, Symbol};

/// The classification of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// The trace and all of its prefixes are accepted.
    Accept,
    /// All proper prefixes of the trace are accepted, the trace itself is rejected.
    Reject,
}

impl Outcome {
    /// Whether this is [`Outcome::Accept`].
    pub fn is_accept(self) -> bool {
        matches!(self, Outcome::Accept)
    }
}

impl From<bool> for Outcome {
    fn from(value: bool) -> Self {
        if value {
            Outcome::Accept
        } else {
            Outcome::Reject
        }
    }
}

impl Show for Outcome {
    fn show(&self) -> String {
        self.is_accept().show()
    }
}

/// A sequence of labels together with its [`Outcome`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Trace<S> {
    word: Vec<S>,
    outcome: Outcome,
}

impl<S: Symbol> Trace<S> {
    /// Creates a new trace.
    pub fn new<W: IntoIterator<Item = S>>(word: W, outcome: impl Into<Outcome>) -> Self {
        Self {
            word: word.into_iter().collect(),
            outcome: outcome.into(),
        }
    }

    /// Creates an accepted trace.
    pub fn accept<W: IntoIterator<Item = S>>(word: W) -> Self {
        Self::new(word, Outcome::Accept)
    }

    /// Creates a rejected trace.
    pub fn reject<W: IntoIterator<Item = S>>(word: W) -> Self {
        Self::new(word, Outcome::Reject)
    }

    /// The labels of the trace.
    pub fn word(&self) -> &[S] {
        &self.word
    }

    /// The classification of the trace.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The number of labels in the trace.
    pub fn len(&self) -> usize {
        self.word.len()
    }

    /// Whether the trace consists of no labels at all.
    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }
}

impl<S: Symbol> Debug for Trace<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.outcome.show(), self.word.show())
    }
}

impl<S: Symbol> Show for Trace<S> {
    fn show(&self) -> String {
        format!("{:?}", self)
    }
}

/// Abstracts the errors that can occur when parsing traces from their textual form.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum TraceParseError {
    /// The line does not start with `+` or `-`.
    #[error("trace `{0}` does not start with `+` or `-`")]
    MissingOutcome(String),
}

impl FromStr for Trace<String> {
    type Err = TraceParseError;

    /// Parses a trace of the form `+a b c` or `-a b`, where labels are separated by whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let outcome = match s.chars().next() {
            Some('+') => Outcome::Accept,
            Some('-') => Outcome::Reject,
            _ => return Err(TraceParseError::MissingOutcome(s.to_string())),
        };
        Ok(Trace::new(s[1..].split_whitespace().map(str::to_string), outcome))
    }
}

/// An ordered collection of traces over a common alphabet.
#[derive(Clone, PartialEq, Eq)]
pub struct Sample<S> {
    traces: Vec<Trace<S>>,
}

impl<S> Default for Sample<S> {
    fn default() -> Self {
        Self { traces: vec![] }
    }
}

impl<S: Symbol> Sample<S> {
    /// Create a new sample from an iterator over pairs of words and their classification.
    pub fn new<W, J>(words: J) -> Self
    where
        W: IntoIterator<Item = S>,
        J: IntoIterator<Item = (W, bool)>,
    {
        words
            .into_iter()
            .map(|(word, accepted)| Trace::new(word, accepted))
            .collect()
    }

    /// Create a sample from separate collections of accepted and rejected words.
    pub fn from_pos_neg<W, P, N>(positive: P, negative: N) -> Self
    where
        W: IntoIterator<Item = S>,
        P: IntoIterator<Item = W>,
        N: IntoIterator<Item = W>,
    {
        positive
            .into_iter()
            .map(Trace::accept)
            .chain(negative.into_iter().map(Trace::reject))
            .collect()
    }

    /// Appends a trace.
    pub fn push(&mut self, trace: Trace<S>) {
        self.traces.push(trace);
    }

    /// Iterates over all traces in the order in which they were added.
    pub fn traces(&self) -> impl Iterator<Item = &Trace<S>> + '_ {
        self.traces.iter()
    }

    /// Iterates over the accepted traces.
    pub fn positive(&self) -> impl Iterator<Item = &Trace<S>> + '_ {
        self.traces.iter().filter(|t| t.outcome.is_accept())
    }

    /// Iterates over the rejected traces.
    pub fn negative(&self) -> impl Iterator<Item = &Trace<S>> + '_ {
        self.traces.iter().filter(|t| !t.outcome.is_accept())
    }

    /// The number of traces.
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Whether the sample contains no traces.
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Returns the maximum length of any trace in the sample, `0` if there are none.
    pub fn max_word_len(&self) -> usize {
        self.traces.iter().map(Trace::len).max().unwrap_or(0)
    }

    /// Checks that `graph` classifies every trace as the sample does and returns the first trace
    /// for which this is not the case.
    pub fn consistent_with(&self, graph: &TransitionGraph<S>) -> Result<(), &Trace<S>> {
        match self
            .traces
            .iter()
            .find(|trace| graph.accepts(trace.word()) != trace.outcome.is_accept())
        {
            Some(trace) => Err(trace),
            None => Ok(()),
        }
    }
}

impl<S: Symbol> FromIterator<Trace<S>> for Sample<S> {
    fn from_iter<T: IntoIterator<Item = Trace<S>>>(iter: T) -> Self {
        Self {
            traces: iter.into_iter().collect(),
        }
    }
}

impl<S: Symbol> Extend<Trace<S>> for Sample<S> {
    fn extend<T: IntoIterator<Item = Trace<S>>>(&mut self, iter: T) {
        self.traces.extend(iter)
    }
}

impl FromStr for Sample<String> {
    type Err = TraceParseError;

    /// Parses one trace per line, blank lines and lines starting with `#` are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(Trace::from_str)
            .collect()
    }
}

impl<S: Symbol> Debug for Sample<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.traces.iter().map(|t| format!("{t:?}")).join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_traces() {
        let trace: Trace<String> = "+a b".parse().unwrap();
        assert_eq!(trace.word(), &["a".to_string(), "b".to_string()]);
        assert_eq!(trace.outcome(), Outcome::Accept);

        let empty: Trace<String> = " - ".parse().unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.outcome(), Outcome::Reject);

        assert_eq!(
            "a b".parse::<Trace<String>>(),
            Err(TraceParseError::MissingOutcome("a b".to_string()))
        );

        let sample: Sample<String> = "# traces\n+a b\n\n+a\n-b\n".parse().unwrap();
        assert_eq!(sample.len(), 3);
        assert_eq!(sample.positive().count(), 2);
        assert_eq!(sample.negative().count(), 1);
        assert_eq!(sample.max_word_len(), 2);
    }

    #[test]
    fn consistency_check() {
        let reference = crate::tests::no_double_b();
        let sample = Sample::from_pos_neg([vec!['a', 'b', 'a']], [vec!['b', 'b']]);
        assert_eq!(sample.consistent_with(&reference), Ok(()));

        let wrong = Sample::new([(vec!['b', 'b'], true)]);
        assert!(sample.consistent_with(&reference).is_ok());
        assert_eq!(
            wrong.consistent_with(&reference).map_err(|t| t.word().to_vec()),
            Err(vec!['b', 'b'])
        );
    }
}
