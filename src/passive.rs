use thiserror::Error;

use crate::{
    active::OracleUnavailable, graph::StateId, prefixtree::ConflictingLabelling, Show, Symbol,
};

mod score;
pub use score::{EquivalenceMap, Explanation, PairScore, ScoringStrategy, StatePair};

mod merge;
pub use merge::merge;

mod learner;
pub use learner::{learn, Learner, LearnerConfig, MergeRecord, Phase, Promotion, Step};

/// Signals that an operation was invoked on input that it must never see. These are programming
/// errors of the caller and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// The state does not exist in the graph.
    #[error("state {0} does not exist")]
    UnknownState(StateId),
    /// A state cannot be merged with itself.
    #[error("cannot merge {0} with itself")]
    SelfMerge(StateId),
    /// The scorer found the pair to be incompatible.
    #[error("the equivalence map for {0} was rejected by the scorer")]
    RejectedMap(StatePair),
    /// The equivalence map belongs to a different pair.
    #[error("the equivalence map was computed for {computed} but {requested} was requested")]
    MismatchedMap {
        /// The pair the map was computed for.
        computed: StatePair,
        /// The pair that was passed along with it.
        requested: StatePair,
    },
    /// The states reachable from the blue state do not form a tree that is disjoint from the red
    /// state.
    #[error("the states reachable from {0} do not form a tree")]
    NotATree(StateId),
}

/// Everything that can stop a [`Learner`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LearnError<S: Symbol> {
    /// The traces contradict each other.
    #[error(transparent)]
    Conflict(#[from] ConflictingLabelling<S>),
    /// Internal misuse of the scorer or the merge.
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    /// The oracle did not answer, the learner can be resumed later.
    #[error(transparent)]
    Suspended(#[from] OracleUnavailable<S>),
    /// The run was cancelled between two iterations.
    #[error("learning was cancelled after {0} iterations")]
    Cancelled(usize),
    /// The iteration limit was reached before the learner was done.
    #[error("no hypothesis after {0} iterations")]
    IterationLimit(usize),
}

impl<S: Symbol> LearnError<S> {
    /// Whether the learner may continue after this error, which is the case if the oracle was
    /// unavailable or the run was cancelled.
    pub fn is_resumable(&self) -> bool {
        matches!(self, LearnError::Suspended(_) | LearnError::Cancelled(_))
    }
}

impl Show for StatePair {
    fn show(&self) -> String {
        self.to_string()
    }
}
