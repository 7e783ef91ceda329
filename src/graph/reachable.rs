use std::collections::{BTreeMap, VecDeque};

use crate::{math::Set, Symbol};

use super::{StateId, TransitionGraph};

/// Type alias for a minimal representative of a state which is its length-lexicographically minimal
/// access sequence and its identity.
pub type MinimalRepresentative<S> = (Vec<S>, StateId);

/// Iterator over the minimal representatives of the states that are reachable from a given origin.
/// A minimal representative for a state `q` is the length-lexicographically minimal word with
/// which `q` can be reached. States are produced in the order of their representatives.
#[derive(Clone)]
pub struct MinimalRepresentatives<'a, S> {
    graph: &'a TransitionGraph<S>,
    seen: Set<StateId>,
    queue: VecDeque<MinimalRepresentative<S>>,
}

impl<'a, S: Symbol> MinimalRepresentatives<'a, S> {
    /// Starts the search in `origin`.
    pub fn new(graph: &'a TransitionGraph<S>, origin: StateId) -> Self {
        let seen = Set::from_iter([origin]);
        let queue = [(vec![], origin)].into_iter().collect();
        Self { graph, seen, queue }
    }
}

impl<'a, S: Symbol> Iterator for MinimalRepresentatives<'a, S> {
    type Item = MinimalRepresentative<S>;

    fn next(&mut self) -> Option<Self::Item> {
        let (access, q) = self.queue.pop_front()?;
        for (label, p) in self.graph.edges(q) {
            if self.seen.insert(p) {
                let mut new_access = access.clone();
                new_access.push(label.clone());
                self.queue.push_back((new_access, p));
            }
        }
        Some((access, q))
    }
}

impl<S: Symbol> TransitionGraph<S> {
    /// Returns an iterator over the minimal representatives of all states reachable from the
    /// initial state.
    pub fn minimal_representatives(&self) -> MinimalRepresentatives<'_, S> {
        MinimalRepresentatives::new(self, self.initial())
    }

    /// Collects the minimal access word of every reachable state.
    pub fn access_words(&self) -> BTreeMap<StateId, Vec<S>> {
        self.minimal_representatives()
            .map(|(word, q)| (q, word))
            .collect()
    }

    /// Returns the minimal access word of `state`, or `None` if it is not reachable.
    pub fn access_word(&self, state: StateId) -> Option<Vec<S>> {
        self.minimal_representatives()
            .find_map(|(word, q)| (q == state).then_some(word))
    }

    /// Returns the set of states that are reachable from `origin`, including `origin` itself.
    pub fn reachable_from(&self, origin: StateId) -> Set<StateId> {
        MinimalRepresentatives::new(self, origin)
            .map(|(_, q)| q)
            .collect()
    }

    /// Whether every state of the graph can be reached from the initial state.
    pub fn is_trim(&self) -> bool {
        self.minimal_representatives().count() == self.size()
    }

    /// Checks whether the states reachable from `root` form a tree that hangs off `root`: each
    /// of them except `root` is entered by precisely one transition, that transition starts in the
    /// subtree, and no transition from the subtree leads back to `root`.
    pub fn is_tree_from(&self, root: StateId) -> bool {
        let mut seen = Set::from_iter([root]);
        let mut queue = VecDeque::from([root]);
        while let Some(q) = queue.pop_front() {
            for (_, p) in self.edges(q) {
                if !seen.insert(p) {
                    return false;
                }
                queue.push_back(p);
            }
        }
        self.state_ids()
            .filter(|q| !seen.contains(q))
            .all(|q| self.edges(q).all(|(_, p)| p == root || !seen.contains(&p)))
    }
}
