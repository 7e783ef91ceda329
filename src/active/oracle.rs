use thiserror::Error;
use tracing::trace;

use crate::{graph::TransitionGraph, Show, Symbol};

/// The answer of an [`Oracle`] to a membership question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Answer {
    /// The sequence belongs to the language.
    Accept,
    /// The sequence does not belong to the language.
    Reject,
    /// The oracle does not know, which counts as neither confirmation nor contradiction.
    Unknown,
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        if value {
            Answer::Accept
        } else {
            Answer::Reject
        }
    }
}

impl Answer {
    /// Whether the answer contradicts the `expected` classification.
    pub fn contradicts(self, expected: bool) -> bool {
        match self {
            Answer::Accept => !expected,
            Answer::Reject => expected,
            Answer::Unknown => false,
        }
    }
}

/// The oracle gave no response to `question`. The learner that asked stays where it is and can be
/// resumed once the oracle is available again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("the oracle did not answer {}", .question.show())]
pub struct OracleUnavailable<S: Symbol> {
    /// The question that is still pending.
    pub question: Vec<S>,
}

/// Something that can classify sequences of labels, for example a reference automaton or a human
/// in front of a terminal. Closures of the form `FnMut(&[S]) -> Result<Answer, _>` are oracles,
/// too.
pub trait Oracle<S: Symbol> {
    /// Classifies `word`, or fails if no answer can be given right now.
    fn classify(&mut self, word: &[S]) -> Result<Answer, OracleUnavailable<S>>;
}

impl<S: Symbol, F> Oracle<S> for F
where
    F: FnMut(&[S]) -> Result<Answer, OracleUnavailable<S>>,
{
    fn classify(&mut self, word: &[S]) -> Result<Answer, OracleUnavailable<S>> {
        self(word)
    }
}

/// The oracle that knows nothing, every question is answered with [`Answer::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoOracle;

impl<S: Symbol> Oracle<S> for NoOracle {
    fn classify(&mut self, _word: &[S]) -> Result<Answer, OracleUnavailable<S>> {
        Ok(Answer::Unknown)
    }
}

/// Answers questions by running them on a known automaton and counts how many questions were
/// asked.
#[derive(Debug, Clone)]
pub struct ReferenceOracle<S> {
    reference: TransitionGraph<S>,
    asked: usize,
}

impl<S: Symbol> ReferenceOracle<S> {
    /// Creates an oracle for the language of `reference`.
    pub fn new(reference: TransitionGraph<S>) -> Self {
        Self { reference, asked: 0 }
    }

    /// The number of questions that have been answered.
    pub fn asked(&self) -> usize {
        self.asked
    }

    /// The automaton that answers the questions.
    pub fn reference(&self) -> &TransitionGraph<S> {
        &self.reference
    }
}

impl<S: Symbol> Oracle<S> for ReferenceOracle<S> {
    fn classify(&mut self, word: &[S]) -> Result<Answer, OracleUnavailable<S>> {
        self.asked += 1;
        let answer = Answer::from(self.reference.accepts(word));
        trace!("reference answers {:?} for {}", answer, word.show());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracles_answer() {
        let mut reference = ReferenceOracle::new(crate::tests::no_double_b());
        assert_eq!(reference.classify(&['a', 'b']), Ok(Answer::Accept));
        assert_eq!(reference.classify(&['b', 'b', 'a']), Ok(Answer::Reject));
        assert_eq!(reference.asked(), 2);

        assert_eq!(Oracle::<char>::classify(&mut NoOracle, &['a']), Ok(Answer::Unknown));

        let mut offline = |word: &[char]| -> Result<Answer, OracleUnavailable<char>> {
            Err(OracleUnavailable {
                question: word.to_vec(),
            })
        };
        assert_eq!(
            Oracle::<char>::classify(&mut offline, &['a']),
            Err(OracleUnavailable {
                question: vec!['a']
            })
        );
    }

    #[test]
    fn contradictions() {
        assert!(Answer::Reject.contradicts(true));
        assert!(!Answer::Accept.contradicts(true));
        assert!(!Answer::Unknown.contradicts(false));
    }
}
