use std::collections::VecDeque;

use crate::{math::Set, Symbol};

use super::{StateId, TransitionGraph};

impl<S: Symbol> TransitionGraph<S> {
    /// Follows `word` from `origin` and returns the state that is reached, or `None` if some
    /// transition along the way is missing.
    pub fn run_from(&self, origin: StateId, word: &[S]) -> Option<StateId> {
        word.iter()
            .try_fold(origin, |state, label| self.transition(state, label))
    }

    /// Follows `word` from the initial state, see [`Self::run_from`].
    pub fn run(&self, word: &[S]) -> Option<StateId> {
        self.run_from(self.initial(), word)
    }

    /// Decides whether `word` is accepted. As languages are prefix-closed, this is the case
    /// precisely if the run on `word` exists and visits only accepting states.
    pub fn accepts(&self, word: &[S]) -> bool {
        let mut state = self.initial();
        if self.is_accept(state) != Some(true) {
            return false;
        }
        for label in word {
            match self.transition(state, label) {
                Some(next) if self.is_accept(next) == Some(true) => state = next,
                _ => return false,
            }
        }
        true
    }

    /// Normalises a state for a language comparison: rejecting states behave exactly like a
    /// missing transition, so both are represented by `None`.
    fn live(&self, state: Option<StateId>) -> Option<StateId> {
        state.filter(|q| self.is_accept(*q) == Some(true))
    }

    /// Returns the length-lexicographically minimal word that is accepted from `state` in `self`
    /// but not from `other_state` in `other`, or vice versa. If both states accept the same
    /// language, `None` is returned.
    pub fn separate(
        &self,
        state: StateId,
        other: &TransitionGraph<S>,
        other_state: StateId,
    ) -> Option<Vec<S>> {
        let alphabet = self
            .alphabet()
            .into_iter()
            .chain(other.alphabet())
            .collect::<std::collections::BTreeSet<_>>();

        let start = (self.live(Some(state)), other.live(Some(other_state)));
        let mut seen = Set::from_iter([start]);
        let mut queue = VecDeque::from([(start, vec![])]);

        while let Some(((p, q), word)) = queue.pop_front() {
            match (p, q) {
                (None, None) => continue,
                (Some(_), None) | (None, Some(_)) => return Some(word),
                (Some(p), Some(q)) => {
                    for label in &alphabet {
                        let next = (
                            self.live(self.transition(p, label)),
                            other.live(other.transition(q, label)),
                        );
                        if seen.insert(next) {
                            let mut extended = word.clone();
                            extended.push(label.clone());
                            queue.push_back((next, extended));
                        }
                    }
                }
            }
        }
        None
    }

    /// Checks whether `self` and `other` accept the same language. If they do not, the length-
    /// lexicographically minimal word on which they disagree is returned.
    pub fn equivalent(&self, other: &TransitionGraph<S>) -> Result<(), Vec<S>> {
        match self.separate(self.initial(), other, other.initial()) {
            Some(counterexample) => Err(counterexample),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn runs_and_acceptance() {
        let graph = GraphBuilder::default()
            .with_accepting([true, true, false])
            .with_transitions([(0, 'a', 1), (1, 'b', 0), (1, 'a', 2), (2, 'a', 0)])
            .into_graph(0)
            .unwrap();
        assert_eq!(graph.run(&['a', 'b', 'a']), Some(StateId(1)));
        assert_eq!(graph.run(&['b']), None);
        assert!(graph.accepts(&['a', 'b', 'a']));
        // passing through the rejecting state rejects, even though the run continues
        assert!(!graph.accepts(&['a', 'a', 'a']));
        assert!(!graph.accepts(&['a', 'a']));
    }

    #[test]
    fn equivalence_with_counterexample() {
        let reference = crate::tests::no_double_b();
        let with_sink = GraphBuilder::default()
            .with_accepting([true, true, false])
            .with_transitions([(0, 'a', 0), (0, 'b', 1), (1, 'a', 0), (1, 'b', 2)])
            .into_graph(0)
            .unwrap();
        assert_eq!(reference.equivalent(&with_sink), Ok(()));
        assert_eq!(with_sink.equivalent(&reference), Ok(()));

        let universal = GraphBuilder::default()
            .with_transitions([(0, 'a', 0), (0, 'b', 0)])
            .into_graph(0)
            .unwrap();
        assert_eq!(reference.equivalent(&universal), Err(vec!['b', 'b']));
        assert_eq!(reference.separate(StateId(0), &reference, StateId(1)), Some(vec!['b']));
        assert_eq!(reference.separate(StateId(0), &with_sink, StateId(0)), None);
    }
}
