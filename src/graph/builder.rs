use itertools::Itertools;

use crate::Symbol;

use super::{GraphError, StateId, TransitionGraph};

/// Helper struct for the literal construction of a [`TransitionGraph`]. It stores a list of
/// transitions, a list of acceptance flags and a default flag for states without an explicit one.
/// State identities are taken over verbatim, so the graph that is produced uses precisely the
/// numbers that were given.
///
/// # Example
///
/// We want to create a graph with two states 0 and 1, where 0 accepts and 1 rejects, and a loop on
/// `a` in state 0. A `b` leads from 0 to 1.
/// ```
/// use statemerge::prelude::*;
///
/// let graph = GraphBuilder::default()
///     .with_accepting([true, false])
///     .with_transitions([(0, 'a', 0), (0, 'b', 1)])
///     .into_graph(0)
///     .unwrap();
/// assert!(graph.accepts(&['a', 'a']));
/// assert!(!graph.accepts(&['a', 'b']));
/// ```
pub struct GraphBuilder<S> {
    edges: Vec<(u32, S, u32)>,
    accepting: Vec<(u32, bool)>,
    states: Vec<u32>,
    default: bool,
}

impl<S> Default for GraphBuilder<S> {
    fn default() -> Self {
        Self {
            edges: vec![],
            accepting: vec![],
            states: vec![],
            default: true,
        }
    }
}

impl<S: Symbol> GraphBuilder<S> {
    /// Sets the acceptance of states for which none is given explicitly. By default states accept.
    pub fn default_accepting(mut self, accepting: bool) -> Self {
        self.default = accepting;
        self
    }

    /// Assigns acceptance flags to the states `0, 1, 2, ...` in the order in which they are given.
    pub fn with_accepting<I: IntoIterator<Item = bool>>(self, iter: I) -> Self {
        iter.into_iter()
            .enumerate()
            .fold(self, |acc, (i, x)| acc.accepting(i as u32, x))
    }

    /// Assigns the acceptance flag `accepting` to the state `idx`, creating it if necessary.
    pub fn accepting(mut self, idx: u32, accepting: bool) -> Self {
        self.accepting.retain(|(q, _)| *q != idx);
        self.accepting.push((idx, accepting));
        self.states.push(idx);
        self
    }

    /// Adds a list of transitions, given as `(source, label, target)` triples.
    pub fn with_transitions<I: IntoIterator<Item = (u32, S, u32)>>(mut self, iter: I) -> Self {
        for (q, a, p) in iter {
            self.states.extend([q, p]);
            self.edges.push((q, a, p));
        }
        self
    }

    /// Creates the graph with `initial` as its initial state. Fails if the transitions that were
    /// given are not deterministic.
    pub fn into_graph(self, initial: u32) -> Result<TransitionGraph<S>, GraphError> {
        let mut graph = TransitionGraph::empty(StateId(initial));
        for q in self.states.into_iter().chain([initial]).sorted().dedup() {
            let accepting = self
                .accepting
                .iter()
                .find_map(|(p, acc)| (*p == q).then_some(*acc))
                .unwrap_or(self.default);
            graph.insert_state(StateId(q), accepting);
        }
        for (q, a, p) in self.edges {
            graph.add_transition(StateId(q), a, StateId(p))?;
        }
        graph.recompute_depths();
        Ok(graph)
    }
}
