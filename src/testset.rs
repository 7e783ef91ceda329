use std::collections::BTreeSet;

use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::{
    graph::{StateId, TransitionGraph},
    sample::Sample,
    Symbol,
};

/// Two states of a reference automaton accept the same language, so no characterisation set
/// exists. The W-method requires a minimal reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("states {0} and {1} accept the same language")]
pub struct EquivalentStates(pub StateId, pub StateId);

/// Generates test suites for a reference automaton with the W-method. The words of the suite
/// distinguish the reference from every automaton with at most `extra_states` additional states
/// that is not equivalent to it.
#[derive(Debug, Clone)]
pub struct WMethod<'a, S> {
    reference: &'a TransitionGraph<S>,
    extra_states: usize,
    alphabet: Vec<S>,
}

fn length_lexicographic<S: Ord>(words: impl IntoIterator<Item = Vec<S>>) -> Vec<Vec<S>> {
    words
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .sorted_by(|x, y| x.len().cmp(&y.len()).then_with(|| x.cmp(y)))
        .collect()
}

fn concatenate<S: Clone>(prefixes: &[Vec<S>], suffixes: &[Vec<S>]) -> Vec<Vec<S>> {
    prefixes
        .iter()
        .cartesian_product(suffixes)
        .map(|(prefix, suffix)| prefix.iter().chain(suffix).cloned().collect())
        .collect()
}

impl<'a, S: Symbol> WMethod<'a, S> {
    /// Prepares the generation for `reference`, allowing for `extra_states` states more in an
    /// implementation than in the reference.
    pub fn new(reference: &'a TransitionGraph<S>, extra_states: usize) -> Self {
        Self {
            reference,
            extra_states,
            alphabet: reference.alphabet().into_iter().collect(),
        }
    }

    /// The minimal access word of every reachable state, which includes the empty word.
    pub fn state_cover(&self) -> Vec<Vec<S>> {
        length_lexicographic(self.reference.minimal_representatives().map(|(word, _)| word))
    }

    /// The state cover together with every extension of a word of the state cover by a label.
    pub fn transition_cover(&self) -> Vec<Vec<S>> {
        let cover = self.state_cover();
        let mut words = cover.clone();
        words.extend(concatenate(&cover, &self.letters()));
        length_lexicographic(words)
    }

    fn letters(&self) -> Vec<Vec<S>> {
        self.alphabet.iter().map(|label| vec![label.clone()]).collect()
    }

    /// A set of words that contains, for every pair of reachable states, the shortest word on
    /// which the two differ. The empty word is always included.
    pub fn characterisation_set(&self) -> Result<Vec<Vec<S>>, EquivalentStates> {
        let states = self
            .reference
            .minimal_representatives()
            .map(|(_, q)| q)
            .sorted()
            .collect_vec();
        let mut words = vec![vec![]];
        for (p, q) in states.iter().tuple_combinations() {
            match self.reference.separate(*p, self.reference, *q) {
                Some(word) => words.push(word),
                None => return Err(EquivalentStates(*p, *q)),
            }
        }
        Ok(length_lexicographic(words))
    }

    /// The full test set `P Σ^i W` for `i` from `0` to `extra_states + 1`, where `P` is the state
    /// cover and `W` the characterisation set.
    pub fn test_set(&self) -> Result<Vec<Vec<S>>, EquivalentStates> {
        let characterisation = self.characterisation_set()?;
        let mut middle = vec![vec![]];
        let mut layer: Vec<Vec<S>> = vec![vec![]];
        for _ in 0..=self.extra_states {
            layer = concatenate(&layer, &self.letters());
            middle.extend(layer.iter().cloned());
        }
        let prefixes = concatenate(&self.state_cover(), &middle);
        Ok(length_lexicographic(concatenate(
            &prefixes,
            &characterisation,
        )))
    }

    /// Cuts `word` after the first prefix that the reference rejects, as nothing can follow a
    /// rejection.
    fn truncate(&self, mut word: Vec<S>) -> Vec<S> {
        if let Some(end) = (0..=word.len()).find(|i| !self.reference.accepts(&word[..*i])) {
            word.truncate(end);
        }
        word
    }

    /// The test set, with every word truncated after its first rejected prefix and without words
    /// that are a proper prefix of another word, each classified by the reference.
    pub fn sample(&self) -> Result<Sample<S>, EquivalentStates> {
        let truncated = length_lexicographic(
            self.test_set()?
                .into_iter()
                .map(|word| self.truncate(word)),
        );
        let maximal = truncated
            .iter()
            .filter(|word| {
                !truncated
                    .iter()
                    .any(|other| other.len() > word.len() && other.starts_with(word))
            })
            .cloned()
            .collect_vec();
        debug!(
            "W-method sample has {} of {} words",
            maximal.len(),
            truncated.len()
        );
        Ok(Sample::new(maximal.into_iter().map(|word| {
            let accepted = self.reference.accepts(&word);
            (word, accepted)
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test_log::test]
    fn covers_and_characterisation() {
        let reference = crate::tests::no_double_b();
        let method = WMethod::new(&reference, 0);
        assert_eq!(method.state_cover(), vec![vec![], vec!['b']]);
        assert_eq!(
            method.transition_cover(),
            vec![vec![], vec!['a'], vec!['b'], vec!['b', 'a'], vec!['b', 'b']]
        );
        assert_eq!(method.characterisation_set(), Ok(vec![vec![], vec!['b']]));
    }

    #[test_log::test]
    fn fundamental_sample() {
        let reference = crate::tests::no_double_b();
        let sample = WMethod::new(&reference, 0).sample().unwrap();
        assert_eq!(
            sample,
            Sample::new([
                (vec!['a', 'b'], true),
                (vec!['b', 'b'], false),
                (vec!['b', 'a', 'b'], true)
            ])
        );
    }

    #[test_log::test]
    fn learning_from_the_test_set_recovers_the_reference() {
        let reference = crate::tests::no_double_b();
        for extra in 0..2 {
            let sample = WMethod::new(&reference, extra).sample().unwrap();
            let hypothesis = learn(&sample, LearnerConfig::default()).unwrap();
            assert_eq!(sample.consistent_with(&hypothesis), Ok(()));
            assert_eq!(hypothesis.equivalent(&reference), Ok(()), "with {extra} extra states");
        }
    }

    #[test]
    fn redundant_references_have_no_characterisation() {
        let redundant = GraphBuilder::default()
            .with_transitions([(0, 'a', 1), (1, 'a', 0)])
            .into_graph(0)
            .unwrap();
        assert_eq!(
            WMethod::new(&redundant, 0).characterisation_set(),
            Err(EquivalentStates(StateId(0), StateId(1)))
        );
    }
}
