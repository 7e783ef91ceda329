use std::{
    cmp::Ordering,
    collections::{BTreeMap, VecDeque},
    fmt::Display,
};

use tracing::trace;

use crate::{
    graph::{StateId, TransitionGraph},
    math::{Map, OrderedMap, Partition},
    Show, Symbol,
};

use super::ContractViolation;

/// A candidate merge: `blue` is the state that disappears, `red` the representative it is merged
/// into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatePair {
    /// The state that is eliminated.
    pub blue: StateId,
    /// The state that `blue` is merged into.
    pub red: StateId,
}

impl StatePair {
    /// Creates a new pair.
    pub fn new(blue: StateId, red: StateId) -> Self {
        Self { blue, red }
    }
}

impl Display for StatePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} ~> {})", self.blue, self.red)
    }
}

/// The outcome of scoring a [`StatePair`]. A negative primary score is reserved for
/// [`PairScore::INCOMPATIBLE`], every other score means the pair may be merged and measures how
/// much evidence there is for doing so. Scores are ordered by primary and then by secondary value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairScore {
    primary: i64,
    secondary: i64,
}

impl PairScore {
    /// The sentinel for pairs that must not be merged.
    pub const INCOMPATIBLE: PairScore = PairScore {
        primary: -1,
        secondary: 0,
    };

    /// Creates a score of a compatible pair.
    pub fn new(primary: i64, secondary: i64) -> Self {
        debug_assert!(primary >= 0, "negative scores are reserved");
        Self { primary, secondary }
    }

    /// The number of state pairs that the merge subsumes.
    pub fn primary(&self) -> i64 {
        self.primary
    }

    /// The tie-break value, for EDSM the number of matched rejecting states.
    pub fn secondary(&self) -> i64 {
        self.secondary
    }

    /// Whether the pair may be merged.
    pub fn is_compatible(&self) -> bool {
        self.primary >= 0
    }
}

impl Display for PairScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_compatible() {
            write!(f, "{}/{}", self.primary, self.secondary)
        } else {
            write!(f, "incompatible")
        }
    }
}

/// Records for every state of the blue subtree that was matched during scoring the state it is
/// identified with. Entries are kept in the order in which the scorer found them, the first one
/// is always `blue -> red`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceMap {
    pair: StatePair,
    representatives: OrderedMap<StateId, StateId>,
    rejected: bool,
}

impl EquivalenceMap {
    fn new(pair: StatePair) -> Self {
        let mut representatives = OrderedMap::default();
        representatives.insert(pair.blue, pair.red);
        Self {
            pair,
            representatives,
            rejected: false,
        }
    }

    /// The pair for which the map was computed.
    pub fn pair(&self) -> StatePair {
        self.pair
    }

    /// Whether the scorer rejected the pair, in which case the map must not be used for a merge.
    pub fn is_rejected(&self) -> bool {
        self.rejected
    }

    /// Returns the representative of `state` if it was matched.
    pub fn representative(&self, state: StateId) -> Option<StateId> {
        self.representatives.get(&state).copied()
    }

    /// Iterates over `(state, representative)` entries in the order in which they were found.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, StateId)> + '_ {
        self.representatives.iter().map(|(q, r)| (*q, *r))
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.representatives.len()
    }

    /// Always `false`, as the map contains at least the scored pair itself.
    pub fn is_empty(&self) -> bool {
        self.representatives.is_empty()
    }

    /// Groups every representative together with the states that are merged into it.
    pub fn classes(&self) -> Partition<StateId> {
        let members = self
            .representatives
            .values()
            .copied()
            .chain(self.representatives.keys().copied());
        Partition::group_by(members, |q| self.representative(*q).unwrap_or(*q))
    }
}

/// The result of walking both subtrees of a pair, before a [`ScoringStrategy`] interprets it.
#[derive(Debug, Clone)]
struct Walk {
    matched: i64,
    rejecting: i64,
    map: EquivalenceMap,
    conflict: Option<(StateId, StateId)>,
}

/// Walks the subtree of `pair.blue` and the graph from `pair.red` simultaneously in breadth-first
/// order. A pair of states is recorded when both sides have a transition on the same label, a
/// label that only the blue side has is folded into the red side, so that later pairs follow it.
///
/// The subtree of `pair.blue` must only be entered through `pair.blue` itself. If the red side
/// reaches into it on any other way, the pair is refused with [`ContractViolation::NotATree`].
fn walk<S: Symbol>(
    graph: &TransitionGraph<S>,
    pair: StatePair,
) -> Result<Walk, ContractViolation> {
    let StatePair { blue, red } = pair;
    for state in [blue, red] {
        if !graph.contains(state) {
            return Err(ContractViolation::UnknownState(state));
        }
    }
    if blue == red {
        return Err(ContractViolation::SelfMerge(blue));
    }

    let subtree = graph.reachable_from(blue);
    if subtree.contains(&red) {
        return Err(ContractViolation::NotATree(blue));
    }

    let mut map = EquivalenceMap::new(pair);
    let mut folded: Map<StateId, BTreeMap<&S, StateId>> = Map::default();
    let mut queue = VecDeque::from([(blue, red)]);
    let (mut matched, mut rejecting) = (0, 0);

    while let Some((q, r)) = queue.pop_front() {
        let accepting = graph.is_accept(q);
        if accepting != graph.is_accept(r) {
            trace!("{q} and {r} disagree on acceptance, {pair} is incompatible");
            map.rejected = true;
            return Ok(Walk {
                matched,
                rejecting,
                map,
                conflict: Some((q, r)),
            });
        }
        if accepting == Some(false) {
            rejecting += 1;
        }

        for (label, q_next) in graph.edges(q) {
            let direct = graph.transition(r, label);
            if let Some(target) = direct {
                if target != blue && subtree.contains(&target) && !subtree.contains(&r) {
                    return Err(ContractViolation::NotATree(blue));
                }
            }
            let r_next =
                direct.or_else(|| folded.get(&r).and_then(|row| row.get(label).copied()));
            match r_next {
                Some(r_next) => {
                    let r_next = if r_next == blue { red } else { r_next };
                    if !map.representatives.contains_key(&q_next) {
                        trace!("matching {q_next} with {r_next} on {}", label.show());
                        map.representatives.insert(q_next, r_next);
                        matched += 1;
                        queue.push_back((q_next, r_next));
                    }
                }
                None => {
                    folded.entry(r).or_default().insert(label, q_next);
                }
            }
        }
    }

    Ok(Walk {
        matched,
        rejecting,
        map,
        conflict: None,
    })
}

/// The closed set of ways in which pairs are scored. All of them reject exactly the pairs for
/// which the walk finds two identified states that disagree on acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScoringStrategy {
    /// Evidence driven state merging: the primary score counts the subsumed pairs, the secondary
    /// one the rejecting states among them.
    #[default]
    Edsm,
    /// Every compatible pair scores zero, so the order of the candidates alone decides.
    Rpni,
    /// Like [`ScoringStrategy::Edsm`], but pairs with a primary score below `min` are treated as
    /// incompatible.
    Threshold {
        /// The smallest primary score that still counts as evidence.
        min: i64,
    },
}

impl ScoringStrategy {
    /// Scores `pair`, returning the score and the equivalence map that a merge of the pair would
    /// use. Unknown states, a pair consisting of a single state and a blue state whose subtree can
    /// be entered other than through the blue state are contract violations.
    pub fn score<S: Symbol>(
        &self,
        graph: &TransitionGraph<S>,
        pair: StatePair,
    ) -> Result<(PairScore, EquivalenceMap), ContractViolation> {
        let mut walk = walk(graph, pair)?;
        let score = self.interpret(&walk);
        if !score.is_compatible() {
            walk.map.rejected = true;
        }
        Ok((score, walk.map))
    }

    fn interpret(&self, walk: &Walk) -> PairScore {
        if walk.conflict.is_some() {
            return PairScore::INCOMPATIBLE;
        }
        match self {
            ScoringStrategy::Edsm => PairScore::new(walk.matched, walk.rejecting),
            ScoringStrategy::Rpni => PairScore::new(0, 0),
            ScoringStrategy::Threshold { min } if walk.matched < *min => PairScore::INCOMPATIBLE,
            ScoringStrategy::Threshold { .. } => PairScore::new(walk.matched, walk.rejecting),
        }
    }

    /// Scores `pair` like [`Self::score`] and returns a description of how the score came about.
    pub fn explain<S: Symbol>(
        &self,
        graph: &TransitionGraph<S>,
        pair: StatePair,
    ) -> Result<Explanation, ContractViolation> {
        let walk = walk(graph, pair)?;
        Ok(Explanation {
            strategy: *self,
            pair,
            score: self.interpret(&walk),
            matched: walk.matched,
            rejecting: walk.rejecting,
            entries: walk.map.iter().collect(),
            conflict: walk.conflict,
        })
    }
}

/// Orders candidate pairs for selection: higher scores first, then shallower and smaller blue
/// states, then shallower and smaller red states.
pub(crate) fn selection_order<S: Symbol>(
    graph: &TransitionGraph<S>,
    (left, left_score): (StatePair, PairScore),
    (right, right_score): (StatePair, PairScore),
) -> Ordering {
    let depth = |q: StateId| graph.state(q).map(|s| s.depth()).unwrap_or(usize::MAX);
    right_score
        .cmp(&left_score)
        .then_with(|| depth(left.blue).cmp(&depth(right.blue)))
        .then_with(|| left.blue.cmp(&right.blue))
        .then_with(|| depth(left.red).cmp(&depth(right.red)))
        .then_with(|| left.red.cmp(&right.red))
}

/// Describes how a [`ScoringStrategy`] arrived at the score of a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    /// The strategy that was used.
    pub strategy: ScoringStrategy,
    /// The pair that was scored.
    pub pair: StatePair,
    /// The resulting score.
    pub score: PairScore,
    /// Number of state pairs that were identified, not counting the pair itself.
    pub matched: i64,
    /// Number of identified pairs of rejecting states.
    pub rejecting: i64,
    /// The identified states in the order in which they were found.
    pub entries: Vec<(StateId, StateId)>,
    /// The first pair of identified states that disagree on acceptance, if any.
    pub conflict: Option<(StateId, StateId)>,
}

impl Display for Explanation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:?} scores {} as {} ({} matched, {} rejecting)",
            self.strategy, self.pair, self.score, self.matched, self.rejecting
        )?;
        let mut b = tabled::builder::Builder::default();
        b.push_record(["state", "merged into"]);
        for (q, r) in &self.entries {
            b.push_record([q.show(), r.show()]);
        }
        write!(f, "{}", b.build().with(tabled::settings::Style::ascii()))?;
        if let Some((q, r)) = self.conflict {
            write!(f, "\n{q} and {r} disagree on acceptance")?;
        }
        Ok(())
    }
}
