use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt::Debug,
    sync::Arc,
};

use itertools::Itertools;
use thiserror::Error;

use crate::{math::Set, Show, Symbol};

mod id;
pub use id::StateId;

mod builder;
pub use builder::GraphBuilder;

/// Iteration over reachable states together with their minimal access words.
pub mod reachable;
pub use reachable::MinimalRepresentatives;

mod language;
mod show;

/// The colour of a state during the blue-fringe search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Colour {
    /// Not yet looked at.
    #[default]
    Uncoloured,
    /// A frontier candidate, exactly one transition beyond a red state.
    Blue,
    /// Confirmed to be distinct from all other red states.
    Red,
}

/// The data that is attached to every state of a [`TransitionGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    accepting: bool,
    colour: Colour,
    depth: usize,
}

impl State {
    fn new(accepting: bool, depth: usize) -> Self {
        Self {
            accepting,
            colour: Colour::Uncoloured,
            depth,
        }
    }

    /// Whether the state is accepting.
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// The colour that the search loop has assigned to the state.
    pub fn colour(&self) -> Colour {
        self.colour
    }

    /// The length of a shortest path from the initial state to this state.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node<S> {
    state: State,
    edges: BTreeMap<S, StateId>,
}

/// Errors that can occur when manipulating a [`TransitionGraph`] directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The state already has a transition on the label that leads somewhere else.
    #[error("{state} already moves to {existing} on {label}, cannot add a transition to {target}")]
    Nondeterministic {
        /// The state whose row would become nondeterministic.
        state: StateId,
        /// The label in question, rendered with [`Show`].
        label: String,
        /// The target that is already present.
        existing: StateId,
        /// The target that was requested.
        target: StateId,
    },
    /// A state that does not exist was referenced.
    #[error("state {0} does not exist")]
    UnknownState(StateId),
}

/// A deterministic transition graph, mapping states to a row of `label -> target` entries.
///
/// States are stored in an arena keyed by [`StateId`], rows are shared between clones of the
/// graph until one of the clones modifies them. This makes cloning cheap, which matters as every
/// merge produces a new graph rather than editing the old one.
///
/// Invariants: every target of a transition is a state of the graph and for each state and label
/// there is at most one target.
#[derive(Clone)]
pub struct TransitionGraph<S> {
    states: BTreeMap<StateId, Arc<Node<S>>>,
    initial: StateId,
    next: u32,
}

impl<S: Symbol> TransitionGraph<S> {
    /// Creates a graph that consists only of an initial state with the given acceptance.
    pub fn new(accepting: bool) -> Self {
        let mut graph = Self {
            states: BTreeMap::new(),
            initial: StateId(0),
            next: 0,
        };
        graph.initial = graph.add_state(accepting);
        graph
    }

    /// Returns the initial state.
    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Returns the number of transitions.
    pub fn transition_count(&self) -> usize {
        self.states.values().map(|node| node.edges.len()).sum()
    }

    /// Whether `state` is a state of the graph.
    pub fn contains(&self, state: StateId) -> bool {
        self.states.contains_key(&state)
    }

    /// Returns the data attached to `state`, if it exists.
    pub fn state(&self, state: StateId) -> Option<&State> {
        self.states.get(&state).map(|node| &node.state)
    }

    /// Returns whether `state` is accepting, or `None` if there is no such state.
    pub fn is_accept(&self, state: StateId) -> Option<bool> {
        self.state(state).map(State::is_accepting)
    }

    /// Iterates over all states in order of their identity.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> + '_ {
        self.states.iter().map(|(id, node)| (*id, &node.state))
    }

    /// Iterates over the identities of all states in increasing order.
    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.keys().copied()
    }

    /// Returns the states that are coloured with `colour`, in increasing order.
    pub fn coloured(&self, colour: Colour) -> Vec<StateId> {
        self.states()
            .filter(|(_, state)| state.colour == colour)
            .map(|(id, _)| id)
            .collect()
    }

    /// Adds a fresh state with depth zero and returns its identity.
    pub fn add_state(&mut self, accepting: bool) -> StateId {
        let id = StateId(self.next);
        self.next += 1;
        self.states.insert(
            id,
            Arc::new(Node {
                state: State::new(accepting, 0),
                edges: BTreeMap::new(),
            }),
        );
        id
    }

    /// Adds a fresh state which is reached from `parent` on `label`. The depth of the new state is
    /// one more than that of `parent`.
    pub fn add_child(
        &mut self,
        parent: StateId,
        label: S,
        accepting: bool,
    ) -> Result<StateId, GraphError> {
        let depth = self
            .state(parent)
            .ok_or(GraphError::UnknownState(parent))?
            .depth;
        if let Some(existing) = self.transition(parent, &label) {
            return Err(GraphError::Nondeterministic {
                state: parent,
                label: label.show(),
                existing,
                target: StateId(self.next),
            });
        }
        Ok(self.sprout(parent, depth, label, accepting))
    }

    /// Creates a child of `parent` without checking that `parent` exists and has no transition
    /// on `label` yet.
    pub(crate) fn sprout(
        &mut self,
        parent: StateId,
        parent_depth: usize,
        label: S,
        accepting: bool,
    ) -> StateId {
        let child = self.add_state(accepting);
        self.node_mut(child).state.depth = parent_depth + 1;
        self.node_mut(parent).edges.insert(label, child);
        child
    }

    /// Adds a transition from `state` to `target` on `label`. Adding a transition that is already
    /// present does nothing, adding one that would make the row of `state` nondeterministic fails.
    pub fn add_transition(
        &mut self,
        state: StateId,
        label: S,
        target: StateId,
    ) -> Result<(), GraphError> {
        if !self.contains(state) {
            return Err(GraphError::UnknownState(state));
        }
        if !self.contains(target) {
            return Err(GraphError::UnknownState(target));
        }
        match self.transition(state, &label) {
            Some(existing) if existing == target => Ok(()),
            Some(existing) => Err(GraphError::Nondeterministic {
                state,
                label: label.show(),
                existing,
                target,
            }),
            None => {
                self.node_mut(state).edges.insert(label, target);
                Ok(())
            }
        }
    }

    /// Returns the target of the transition from `state` on `label`, if there is one.
    pub fn transition(&self, state: StateId, label: &S) -> Option<StateId> {
        self.states.get(&state)?.edges.get(label).copied()
    }

    /// Iterates over the outgoing transitions of `state` ordered by label. Yields nothing if the
    /// state does not exist.
    pub fn edges(&self, state: StateId) -> impl Iterator<Item = (&S, StateId)> + '_ {
        self.states
            .get(&state)
            .into_iter()
            .flat_map(|node| node.edges.iter().map(|(label, target)| (label, *target)))
    }

    /// Whether `state` has no outgoing transitions.
    pub fn is_leaf(&self, state: StateId) -> bool {
        self.edges(state).next().is_none()
    }

    /// Returns all labels that appear on some transition.
    pub fn alphabet(&self) -> BTreeSet<S> {
        self.states
            .values()
            .flat_map(|node| node.edges.keys().cloned())
            .collect()
    }

    /// Assigns `colour` to `state`. Returns `false` if the state does not exist.
    pub fn set_colour(&mut self, state: StateId, colour: Colour) -> bool {
        if !self.contains(state) {
            return false;
        }
        self.node_mut(state).state.colour = colour;
        true
    }

    /// Resets the colour of every state to [`Colour::Uncoloured`].
    pub fn clear_colours(&mut self) {
        let coloured = self
            .states()
            .filter(|(_, state)| state.colour != Colour::Uncoloured)
            .map(|(id, _)| id)
            .collect_vec();
        for id in coloured {
            self.node_mut(id).state.colour = Colour::Uncoloured;
        }
    }

    /// Recomputes the depth of every reachable state with a breadth-first search from the
    /// initial state. Unreachable states keep their depth.
    pub fn recompute_depths(&mut self) {
        let mut seen = Set::from_iter([self.initial]);
        let mut queue = VecDeque::from([(self.initial, 0usize)]);
        let mut depths = vec![];
        while let Some((state, depth)) = queue.pop_front() {
            depths.push((state, depth));
            for (_, target) in self.edges(state) {
                if seen.insert(target) {
                    queue.push_back((target, depth + 1));
                }
            }
        }
        for (state, depth) in depths {
            if self.states[&state].state.depth != depth {
                self.node_mut(state).state.depth = depth;
            }
        }
    }

    pub(crate) fn insert_state(&mut self, id: StateId, accepting: bool) {
        self.next = self.next.max(id.0 + 1);
        self.states.insert(
            id,
            Arc::new(Node {
                state: State::new(accepting, 0),
                edges: BTreeMap::new(),
            }),
        );
    }

    pub(crate) fn empty(initial: StateId) -> Self {
        Self {
            states: BTreeMap::new(),
            initial,
            next: 0,
        }
    }

    pub(crate) fn set_accepting(&mut self, state: StateId, accepting: bool) {
        if self.is_accept(state) != Some(accepting) {
            self.node_mut(state).state.accepting = accepting;
        }
    }

    /// Points the transition from `state` on `label` to `target`, replacing any previous target.
    pub(crate) fn redirect(&mut self, state: StateId, label: S, target: StateId) {
        self.node_mut(state).edges.insert(label, target);
    }

    pub(crate) fn remove_state(&mut self, state: StateId) -> Option<State> {
        self.states.remove(&state).map(|node| node.state)
    }

    fn node_mut(&mut self, state: StateId) -> &mut Node<S> {
        let node = self
            .states
            .get_mut(&state)
            .unwrap_or_else(|| panic!("state {state} must exist"));
        Arc::make_mut(node)
    }
}

impl<S: PartialEq> PartialEq for TransitionGraph<S> {
    fn eq(&self, other: &Self) -> bool {
        self.initial == other.initial && self.states == other.states
    }
}

impl<S: Eq> Eq for TransitionGraph<S> {}

impl<S: Debug> Debug for TransitionGraph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "initial: {}", self.initial)?;
        for (id, node) in &self.states {
            writeln!(
                f,
                "{}[{}|{:?}] {}",
                id,
                node.state.accepting.show(),
                node.state.colour,
                node.edges
                    .iter()
                    .map(|(label, target)| format!("{label:?}->{target}"))
                    .join(", ")
            )?;
        }
        Ok(())
    }
}
