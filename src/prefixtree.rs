use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    graph::{StateId, TransitionGraph},
    sample::{Outcome, Sample, Trace},
    Show, Symbol,
};

/// Decides what happens when a trace contradicts the outcome that an earlier trace recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConflictPolicy {
    /// Stop building and hand the conflict to the caller.
    #[default]
    Abort,
    /// Skip the conflicting trace, keeping whatever was recorded first.
    KeepFirst,
}

/// A trace disagrees with an outcome that is already recorded in the prefix tree. This happens if
/// a trace passes through a rejecting state, if it rejects a state that has successors or if it
/// assigns a different outcome to a state that was labelled before.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "trace {trace} requests {requested:?} for prefix {}, but {recorded:?} is recorded",
    .prefix.show()
)]
pub struct ConflictingLabelling<S: Symbol> {
    /// Position of the offending trace in the order in which traces were added.
    pub trace: usize,
    /// The prefix of the trace that leads to the contested state.
    pub prefix: Vec<S>,
    /// The outcome that was recorded first.
    pub recorded: Outcome,
    /// The outcome that the trace requires.
    pub requested: Outcome,
}

/// Builds a prefix tree acceptor (PTA) from traces. Every trace is validated against the tree
/// before anything is added, so a conflicting trace leaves the tree exactly as it was.
#[derive(Clone)]
pub struct PrefixTreeBuilder<S: Symbol> {
    tree: TransitionGraph<S>,
    policy: ConflictPolicy,
    traces: usize,
    root_labelled: bool,
    skipped: Vec<ConflictingLabelling<S>>,
}

impl<S: Symbol> Default for PrefixTreeBuilder<S> {
    fn default() -> Self {
        Self::new(ConflictPolicy::default())
    }
}

impl<S: Symbol> PrefixTreeBuilder<S> {
    /// Creates a builder whose tree consists only of an accepting root.
    pub fn new(policy: ConflictPolicy) -> Self {
        Self {
            tree: TransitionGraph::new(true),
            policy,
            traces: 0,
            root_labelled: false,
            skipped: vec![],
        }
    }

    /// Builds the PTA for `sample` in one go.
    pub fn from_sample(
        sample: &Sample<S>,
        policy: ConflictPolicy,
    ) -> Result<TransitionGraph<S>, ConflictingLabelling<S>> {
        let mut builder = Self::new(policy);
        builder.add_sample(sample)?;
        Ok(builder.build())
    }

    /// Adds all traces of `sample` in order. Conflicts are handled according to the
    /// [`ConflictPolicy`] of the builder.
    pub fn add_sample(&mut self, sample: &Sample<S>) -> Result<(), ConflictingLabelling<S>> {
        for trace in sample.traces() {
            match (self.add_trace(trace), self.policy) {
                (Ok(()), _) => {}
                (Err(conflict), ConflictPolicy::Abort) => return Err(conflict),
                (Err(conflict), ConflictPolicy::KeepFirst) => {
                    warn!("skipping conflicting trace: {conflict}");
                    self.skipped.push(conflict);
                }
            }
        }
        debug!(
            "prefix tree for {} traces has {} states, {} traces were skipped",
            self.traces,
            self.tree.size(),
            self.skipped.len()
        );
        Ok(())
    }

    /// Adds a single trace, regardless of the policy. On a conflict nothing is changed.
    pub fn add_trace(&mut self, trace: &Trace<S>) -> Result<(), ConflictingLabelling<S>> {
        let index = self.traces;
        self.traces += 1;
        let word = trace.word();

        let mut state = self.tree.initial();
        let mut matched = 0;
        loop {
            let requested = if matched == word.len() {
                trace.outcome()
            } else {
                Outcome::Accept
            };
            let recorded = Outcome::from(self.tree.is_accept(state) == Some(true));
            let unlabelled_root = matched == 0 && !self.root_labelled;
            if recorded != requested && !unlabelled_root {
                return Err(ConflictingLabelling {
                    trace: index,
                    prefix: word[..matched].to_vec(),
                    recorded,
                    requested,
                });
            }
            if matched == word.len() {
                break;
            }
            match self.tree.transition(state, &word[matched]) {
                Some(next) => {
                    state = next;
                    matched += 1;
                }
                None => break,
            }
        }

        if matched == 0 && word.is_empty() {
            self.tree.set_accepting(state, trace.outcome().is_accept());
        }
        self.root_labelled = true;

        for (position, label) in word.iter().enumerate().skip(matched) {
            let accepting = position + 1 < word.len() || trace.outcome().is_accept();
            let depth = position;
            state = self.tree.sprout(state, depth, label.clone(), accepting);
            trace!(
                "added {} for prefix {}",
                state,
                word[..=position].to_vec().show()
            );
        }
        Ok(())
    }

    /// The conflicts that were skipped under [`ConflictPolicy::KeepFirst`].
    pub fn skipped(&self) -> &[ConflictingLabelling<S>] {
        &self.skipped
    }

    /// Gives access to the tree that has been built so far.
    pub fn tree(&self) -> &TransitionGraph<S> {
        &self.tree
    }

    /// Consumes the builder and returns the PTA.
    pub fn build(self) -> TransitionGraph<S> {
        self.tree
    }

    /// Returns the state that is reached by `prefix`, if the tree contains it.
    pub fn state_of(&self, prefix: &[S]) -> Option<StateId> {
        self.tree.run(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use itertools::Itertools;

    fn traces(lines: &str) -> Sample<String> {
        lines.parse().unwrap()
    }

    #[test_log::test]
    fn literal_prefix_tree() {
        let sample = traces("+a b\n+a\n-b");
        let mut builder = PrefixTreeBuilder::default();
        builder.add_sample(&sample).unwrap();
        assert_eq!(
            builder.state_of(&["a".to_string(), "b".to_string()]),
            Some(StateId(2))
        );
        assert_eq!(builder.state_of(&["b".to_string(), "a".to_string()]), None);
        let pta = builder.build();

        let a = "a".to_string();
        let b = "b".to_string();
        let expected = GraphBuilder::default()
            .with_accepting([true, true, true, false])
            .with_transitions([(0, a.clone(), 1), (1, b.clone(), 2), (0, b.clone(), 3)])
            .into_graph(0)
            .unwrap();
        assert_eq!(pta, expected);

        assert_eq!(pta.is_accept(pta.run(&[a.clone()]).unwrap()), Some(true));
        assert_eq!(pta.is_accept(pta.run(&[b.clone()]).unwrap()), Some(false));
        assert_eq!(pta.is_accept(pta.initial()), Some(true));
        assert!(pta.is_tree_from(pta.initial()));
        assert_eq!(
            pta.states().map(|(_, s)| s.depth()).collect_vec(),
            vec![0, 1, 2, 1]
        );
    }

    #[test_log::test]
    fn conflicts_leave_tree_untouched() {
        let mut builder = PrefixTreeBuilder::default();
        builder.add_trace(&Trace::accept(['a', 'b'])).unwrap();
        let before = builder.tree().clone();

        let conflict = builder.add_trace(&Trace::reject(['a'])).unwrap_err();
        assert_eq!(conflict.trace, 1);
        assert_eq!(conflict.prefix, vec!['a']);
        assert_eq!(conflict.recorded, Outcome::Accept);
        assert_eq!(conflict.requested, Outcome::Reject);
        assert_eq!(builder.tree(), &before);

        builder.add_trace(&Trace::reject(['b'])).unwrap();
        // passing through a rejecting state
        let conflict = builder.add_trace(&Trace::accept(['b', 'a', 'a'])).unwrap_err();
        assert_eq!(conflict.prefix, vec!['b']);
        assert_eq!(conflict.recorded, Outcome::Reject);
        assert_eq!(builder.tree().size(), 4);
    }

    #[test_log::test]
    fn keep_first_skips() {
        let sample = Sample::new([
            (vec!['a'], true),
            (vec!['a'], false),
            (vec!['a', 'a'], true),
        ]);
        assert!(PrefixTreeBuilder::from_sample(&sample, ConflictPolicy::Abort).is_err());

        let mut builder = PrefixTreeBuilder::new(ConflictPolicy::KeepFirst);
        builder.add_sample(&sample).unwrap();
        assert_eq!(builder.skipped().len(), 1);
        assert_eq!(builder.skipped()[0].trace, 1);
        let pta = builder.build();
        assert_eq!(pta.size(), 3);
        assert!(pta.accepts(&['a', 'a']));
    }

    #[test]
    fn empty_traces_label_the_root() {
        let rejecting = Sample::new([(Vec::<char>::new(), false)]);
        let pta = PrefixTreeBuilder::from_sample(&rejecting, ConflictPolicy::Abort).unwrap();
        assert_eq!(pta.is_accept(pta.initial()), Some(false));

        let contradicting = Sample::new([(vec![], false), (vec!['a'], true)]);
        let conflict =
            PrefixTreeBuilder::from_sample(&contradicting, ConflictPolicy::Abort).unwrap_err();
        assert!(conflict.prefix.is_empty());
        assert_eq!(conflict.to_string(), "trace 1 requests Accept for prefix \"\", but Reject is recorded");
    }
}
