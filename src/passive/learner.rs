use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::{
    active::{questions::violated_constraint, Answer, NoOracle, Oracle, QuestionConfig},
    graph::{Colour, StateId, TransitionGraph},
    math::{Map, Set},
    prefixtree::{ConflictPolicy, ConflictingLabelling, PrefixTreeBuilder},
    sample::Sample,
    Show, Symbol,
};

use super::{
    merge, score::selection_order, ContractViolation, EquivalenceMap, Explanation, LearnError,
    PairScore, ScoringStrategy, StatePair,
};

const ITERATION_THRESHOLD: usize = if cfg!(debug_assertions) { 10_000 } else { 1_000_000 };

/// Decides when a blue state is promoted to red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Promotion {
    /// Only promote if no pair of the frontier can be merged at all.
    #[default]
    WhenStuck,
    /// Promote a blue state as soon as it is incompatible with every red state, even if other
    /// pairs could be merged.
    Eager,
}

/// Configuration of a [`Learner`], created with [`Default`] and adjusted with the `with_*`
/// methods.
#[derive(Debug, Clone)]
pub struct LearnerConfig<S> {
    strategy: ScoringStrategy,
    promotion: Promotion,
    conflicts: ConflictPolicy,
    parallel: bool,
    questions: Option<QuestionConfig>,
    constraints: Vec<TransitionGraph<S>>,
    max_iterations: usize,
}

impl<S> Default for LearnerConfig<S> {
    fn default() -> Self {
        let max_iterations = std::env::var("MAX_ITERATIONS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(ITERATION_THRESHOLD);
        Self {
            strategy: ScoringStrategy::default(),
            promotion: Promotion::default(),
            conflicts: ConflictPolicy::default(),
            parallel: false,
            questions: None,
            constraints: vec![],
            max_iterations,
        }
    }
}

impl<S> LearnerConfig<S> {
    /// Sets the scoring strategy.
    pub fn with_strategy(mut self, strategy: ScoringStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the promotion policy.
    pub fn with_promotion(mut self, promotion: Promotion) -> Self {
        self.promotion = promotion;
        self
    }

    /// Sets how conflicting traces are treated when the prefix tree is built.
    pub fn with_conflicts(mut self, conflicts: ConflictPolicy) -> Self {
        self.conflicts = conflicts;
        self
    }

    /// Scores the pairs of each frontier in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Asks questions before each merge.
    pub fn with_questions(mut self, questions: QuestionConfig) -> Self {
        self.questions = Some(questions);
        self
    }

    /// Adds a domain constraint. Questions that a constraint does not accept are answered with
    /// [`Answer::Reject`] without consulting the oracle.
    pub fn with_constraint(mut self, constraint: TransitionGraph<S>) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Sets the maximal number of iterations. The default can be overridden with the
    /// `MAX_ITERATIONS` environment variable.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The scoring strategy.
    pub fn strategy(&self) -> ScoringStrategy {
        self.strategy
    }
}

/// The phases that a [`Learner`] moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The prefix tree has not been looked at.
    Initial,
    /// The frontier has to be computed and scored.
    Explore,
    /// A scored candidate is waiting to be checked and selected.
    Select,
    /// A selected candidate is ready to be merged.
    Merge,
    /// No candidate can be merged and a blue state has to be promoted.
    Promote,
    /// Every reachable state is red, the hypothesis is final.
    Done,
}

/// One entry of the history of a [`Learner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeRecord {
    /// The pair was merged and the resulting graph has `states` states.
    Merged {
        /// The merged pair.
        pair: StatePair,
        /// The score it had.
        score: PairScore,
        /// The number of states after the merge.
        states: usize,
    },
    /// The state was promoted to red.
    Promoted(StateId),
    /// The oracle contradicted the merge of the pair, so it is not considered again.
    Excluded(StatePair),
}

/// The outcome of a single [`Learner::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The frontier was scored and this many candidates were found.
    Explored(usize),
    /// Something was recorded in the history.
    Recorded(MergeRecord),
    /// The best candidate passed all questions.
    Selected(StatePair),
    /// The learner is done.
    Done,
}

struct Candidate {
    pair: StatePair,
    score: PairScore,
    equivalence: EquivalenceMap,
}

/// The blue-fringe state merging learner. It starts from the prefix tree of a sample in which
/// only the root is red, scores every pair of a red and a blue state, merges the best one and
/// repeats until every reachable state is red.
///
/// Every merge replaces the hypothesis by a new graph, so the learner can be stopped between any
/// two steps. If an [`Oracle`] is configured together with [`LearnerConfig::with_questions`], it
/// is consulted before each merge and a contradicting answer excludes the pair.
pub struct Learner<S: Symbol, O = NoOracle> {
    config: LearnerConfig<S>,
    graph: TransitionGraph<S>,
    phase: Phase,
    oracle: O,
    iterations: usize,
    history: Vec<MergeRecord>,
    excluded: Set<StatePair>,
    answers: Map<Vec<S>, Answer>,
    candidates: Vec<Candidate>,
    pending: Option<(StatePair, PairScore, TransitionGraph<S>)>,
    skipped: Vec<ConflictingLabelling<S>>,
    started: Instant,
}

impl<S: Symbol> Learner<S, NoOracle> {
    /// Builds the prefix tree of `sample` and creates a learner for it. Traces that were skipped
    /// under [`ConflictPolicy::KeepFirst`] are available through [`Learner::skipped`].
    pub fn new(sample: &Sample<S>, config: LearnerConfig<S>) -> Result<Self, LearnError<S>> {
        let mut builder = PrefixTreeBuilder::new(config.conflicts);
        builder.add_sample(sample)?;
        let skipped = builder.skipped().to_vec();
        let mut learner = Self::from_tree(builder.build(), config);
        learner.skipped = skipped;
        Ok(learner)
    }

    /// Creates a learner that starts from `tree`, which has to be a prefix tree.
    pub fn from_tree(tree: TransitionGraph<S>, config: LearnerConfig<S>) -> Self {
        Self {
            config,
            graph: tree,
            phase: Phase::Initial,
            oracle: NoOracle,
            iterations: 0,
            history: vec![],
            excluded: Set::default(),
            answers: Map::default(),
            candidates: vec![],
            pending: None,
            skipped: vec![],
            started: Instant::now(),
        }
    }
}

impl<S: Symbol, O: Oracle<S>> Learner<S, O> {
    /// Replaces the oracle.
    pub fn with_oracle<P: Oracle<S>>(self, oracle: P) -> Learner<S, P> {
        Learner {
            config: self.config,
            graph: self.graph,
            phase: self.phase,
            oracle,
            iterations: self.iterations,
            history: self.history,
            excluded: self.excluded,
            answers: self.answers,
            candidates: self.candidates,
            pending: self.pending,
            skipped: self.skipped,
            started: self.started,
        }
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The current hypothesis.
    pub fn hypothesis(&self) -> &TransitionGraph<S> {
        &self.graph
    }

    /// Consumes the learner and returns the current hypothesis.
    pub fn into_hypothesis(self) -> TransitionGraph<S> {
        self.graph
    }

    /// Everything that was merged, promoted or excluded so far, in order.
    pub fn history(&self) -> &[MergeRecord] {
        &self.history
    }

    /// The number of merges and promotions so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// The conflicting traces that were left out of the prefix tree.
    pub fn skipped(&self) -> &[ConflictingLabelling<S>] {
        &self.skipped
    }

    /// Gives access to the oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Explains the score that `pair` has in the current hypothesis.
    pub fn explain(&self, pair: StatePair) -> Result<Explanation, ContractViolation> {
        self.config.strategy.explain(&self.graph, pair)
    }

    /// Runs the learner until it is done and returns the final hypothesis. If the oracle is
    /// unavailable, the error is returned and a later call continues where this one stopped.
    pub fn run(&mut self) -> Result<&TransitionGraph<S>, LearnError<S>> {
        self.run_cancellable(&AtomicBool::new(false))
    }

    /// Like [`Self::run`], but checks `cancel` between any two steps and stops with
    /// [`LearnError::Cancelled`] once it is set. The hypothesis is never left half merged.
    pub fn run_cancellable(
        &mut self,
        cancel: &AtomicBool,
    ) -> Result<&TransitionGraph<S>, LearnError<S>> {
        while self.phase != Phase::Done {
            if cancel.load(Ordering::Relaxed) {
                debug!("cancelled after {} iterations", self.iterations);
                return Err(LearnError::Cancelled(self.iterations));
            }
            if self.iterations >= self.config.max_iterations {
                return Err(LearnError::IterationLimit(self.iterations));
            }
            self.step()?;
        }
        Ok(&self.graph)
    }

    /// Performs a single transition of the learner.
    pub fn step(&mut self) -> Result<Step, LearnError<S>> {
        match self.phase {
            Phase::Initial => {
                self.graph.clear_colours();
                self.graph.set_colour(self.graph.initial(), Colour::Red);
                self.started = Instant::now();
                self.phase = Phase::Explore;
                Ok(Step::Explored(0))
            }
            Phase::Explore => self.explore(),
            Phase::Select => self.select(),
            Phase::Merge => self.commit(),
            Phase::Promote => match self.frontier().first() {
                Some(&blue) => Ok(Step::Recorded(self.promote(blue))),
                None => self.explore(),
            },
            Phase::Done => Ok(Step::Done),
        }
    }

    /// Recolours the graph so that precisely the non-red targets of red states are blue and
    /// returns the blue states ordered by depth and identity.
    fn frontier(&mut self) -> Vec<StateId> {
        let reds = self.graph.coloured(Colour::Red);
        for blue in self.graph.coloured(Colour::Blue) {
            self.graph.set_colour(blue, Colour::Uncoloured);
        }
        let blues = reds
            .iter()
            .flat_map(|red| self.graph.edges(*red).map(|(_, target)| target))
            .filter(|q| self.graph.state(*q).map(|s| s.colour()) != Some(Colour::Red))
            .unique()
            .sorted_by_key(|q| (self.graph.state(*q).map(|s| s.depth()), *q))
            .collect_vec();
        for blue in &blues {
            self.graph.set_colour(*blue, Colour::Blue);
        }
        blues
    }

    fn explore(&mut self) -> Result<Step, LearnError<S>> {
        let blues = self.frontier();
        if blues.is_empty() {
            self.phase = Phase::Done;
            info!(
                "learned hypothesis with {} states after {} merges in {}ms",
                self.graph.size(),
                self.history
                    .iter()
                    .filter(|r| matches!(r, MergeRecord::Merged { .. }))
                    .count(),
                self.started.elapsed().as_millis()
            );
            return Ok(Step::Done);
        }
        let reds = self.graph.coloured(Colour::Red);
        trace!("exploring {} red and {} blue states\n{}", reds.len(), blues.len(), self.graph);

        let pairs = blues
            .iter()
            .cartesian_product(&reds)
            .map(|(blue, red)| StatePair::new(*blue, *red))
            .filter(|pair| !self.excluded.contains(pair))
            .collect_vec();
        let strategy = self.config.strategy;
        let graph = &self.graph;
        let scored: Vec<(StatePair, PairScore, EquivalenceMap)> = if self.config.parallel {
            pairs
                .par_iter()
                .map(|pair| strategy.score(graph, *pair).map(|(s, m)| (*pair, s, m)))
                .collect::<Result<Vec<_>, ContractViolation>>()?
        } else {
            pairs
                .iter()
                .map(|pair| strategy.score(graph, *pair).map(|(s, m)| (*pair, s, m)))
                .collect::<Result<Vec<_>, ContractViolation>>()?
        };

        if self.config.promotion == Promotion::Eager {
            let stuck = blues.iter().copied().find(|blue| {
                scored
                    .iter()
                    .filter(|(pair, _, _)| pair.blue == *blue)
                    .all(|(_, score, _)| !score.is_compatible())
            });
            if let Some(blue) = stuck {
                return Ok(Step::Recorded(self.promote(blue)));
            }
        }

        let mut candidates = scored
            .into_iter()
            .filter(|(_, score, _)| score.is_compatible())
            .map(|(pair, score, equivalence)| Candidate {
                pair,
                score,
                equivalence,
            })
            .collect_vec();
        candidates.sort_by(|left, right| {
            selection_order(
                &self.graph,
                (left.pair, left.score),
                (right.pair, right.score),
            )
        });
        let found = candidates.len();
        trace!(
            "candidates: {}",
            candidates
                .iter()
                .map(|c| format!("{} {}", c.pair, c.score))
                .join(", ")
        );
        self.candidates = candidates;
        self.phase = if found == 0 {
            Phase::Promote
        } else {
            Phase::Select
        };
        Ok(Step::Explored(found))
    }

    fn select(&mut self) -> Result<Step, LearnError<S>> {
        let Some(best) = self.candidates.first() else {
            self.phase = Phase::Explore;
            return Ok(Step::Explored(0));
        };
        let (pair, score) = (best.pair, best.score);
        let merged = merge(&self.graph, pair, &best.equivalence)?;

        if let Some(QuestionConfig { generator, limit }) = self.config.questions {
            let questions =
                generator.questions(&self.graph, &merged, pair, &best.equivalence, limit);
            for question in questions {
                let answer = match self.answers.get(&question.word) {
                    Some(answer) => *answer,
                    None => {
                        let answer =
                            if violated_constraint(&self.config.constraints, &question.word)
                                .is_some()
                            {
                                Answer::Reject
                            } else {
                                self.oracle.classify(&question.word)?
                            };
                        debug!("{} is answered with {answer:?}", question.word.show());
                        self.answers.insert(question.word.clone(), answer);
                        answer
                    }
                };
                if answer.contradicts(question.expected) {
                    debug!(
                        "{answer:?} for {} contradicts merging {pair}",
                        question.word.show()
                    );
                    self.excluded.insert(pair);
                    self.candidates.clear();
                    self.phase = Phase::Explore;
                    let record = MergeRecord::Excluded(pair);
                    self.history.push(record);
                    return Ok(Step::Recorded(record));
                }
            }
        }

        self.candidates.clear();
        self.pending = Some((pair, score, merged));
        self.phase = Phase::Merge;
        Ok(Step::Selected(pair))
    }

    fn commit(&mut self) -> Result<Step, LearnError<S>> {
        let Some((pair, score, merged)) = self.pending.take() else {
            self.phase = Phase::Explore;
            return Ok(Step::Explored(0));
        };
        self.graph = merged;
        self.iterations += 1;
        let record = MergeRecord::Merged {
            pair,
            score,
            states: self.graph.size(),
        };
        debug!("merged {pair} with score {score}, {} states remain", self.graph.size());
        self.history.push(record);
        self.phase = Phase::Explore;
        Ok(Step::Recorded(record))
    }

    fn promote(&mut self, blue: StateId) -> MergeRecord {
        debug!("promoting {blue} to red");
        self.graph.set_colour(blue, Colour::Red);
        self.iterations += 1;
        self.candidates.clear();
        let record = MergeRecord::Promoted(blue);
        self.history.push(record);
        self.phase = Phase::Explore;
        record
    }
}

/// Learns a hypothesis for `sample` without an oracle. Conflicting traces that the configured
/// [`ConflictPolicy`] skips are only logged, use a [`Learner`] to inspect them.
pub fn learn<S: Symbol>(
    sample: &Sample<S>,
    config: LearnerConfig<S>,
) -> Result<TransitionGraph<S>, LearnError<S>> {
    let mut learner = Learner::new(sample, config)?;
    learner.run()?;
    Ok(learner.into_hypothesis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use std::sync::atomic::AtomicBool;

    /// All words up to `length` whose proper prefixes are accepted by `reference`, classified by
    /// `reference`.
    fn exhaustive(reference: &TransitionGraph<char>, length: usize) -> Sample<char> {
        let mut words: Vec<Vec<char>> = vec![vec![]];
        let mut frontier: Vec<Vec<char>> = vec![vec![]];
        for _ in 0..length {
            frontier = frontier
                .into_iter()
                .filter(|word| reference.accepts(word))
                .cartesian_product(['a', 'b'])
                .map(|(mut word, label)| {
                    word.push(label);
                    word
                })
                .collect();
            words.extend(frontier.iter().cloned());
        }
        Sample::new(words.into_iter().map(|word| {
            let accepted = reference.accepts(&word);
            (word, accepted)
        }))
    }

    /// Too little evidence: without questions `b b` ends up accepted.
    fn sparse() -> Sample<char> {
        Sample::new([(vec!['a'], true), (vec!['b', 'a'], true)])
    }

    #[test_log::test]
    fn recovers_reference_from_exhaustive_sample() {
        let reference = crate::tests::no_double_b();
        let sample = exhaustive(&reference, 3);
        let hypothesis = learn(&sample, LearnerConfig::default()).unwrap();
        assert_eq!(sample.consistent_with(&hypothesis), Ok(()));
        assert_eq!(hypothesis.equivalent(&reference), Ok(()));
    }

    #[test_log::test]
    fn terminates_within_state_count() {
        let reference = crate::tests::no_double_b();
        let sample = exhaustive(&reference, 4);
        let mut learner = Learner::new(&sample, LearnerConfig::default()).unwrap();
        let initial = learner.hypothesis().size();
        learner.run().unwrap();
        assert!(learner.iterations() < initial);
        assert!(learner.history().len() < initial);
        assert_eq!(learner.phase(), Phase::Done);
        assert!(learner
            .hypothesis()
            .states()
            .all(|(_, state)| state.colour() == Colour::Red));
        assert!(matches!(learner.step(), Ok(Step::Done)));
    }

    #[test_log::test]
    fn parallel_and_sequential_agree() {
        let reference = crate::tests::no_double_b();
        let sample = exhaustive(&reference, 4);
        for strategy in [
            ScoringStrategy::Edsm,
            ScoringStrategy::Rpni,
            ScoringStrategy::Threshold { min: 1 },
        ] {
            let config = LearnerConfig::default().with_strategy(strategy);
            let mut sequential = Learner::new(&sample, config.clone()).unwrap();
            let mut parallel = Learner::new(&sample, config.with_parallel(true)).unwrap();
            assert_eq!(sequential.run().unwrap(), parallel.run().unwrap());
            assert_eq!(sequential.history(), parallel.history());
        }
    }

    #[test]
    fn eager_promotion_is_consistent() {
        let reference = crate::tests::no_double_b();
        let sample = exhaustive(&reference, 3);

        // `b` leads into `b b`, which rejects, so `b` is incompatible with the root while `a` is not
        let config = LearnerConfig::default().with_promotion(Promotion::Eager);
        let mut eager = Learner::new(&sample, config).unwrap();
        let hypothesis = eager.run().unwrap().clone();
        assert_eq!(sample.consistent_with(&hypothesis), Ok(()));
        let first_merge = eager
            .history()
            .iter()
            .position(|record| matches!(record, MergeRecord::Merged { .. }))
            .unwrap();
        assert!(matches!(eager.history()[0], MergeRecord::Promoted(_)));
        assert!(first_merge > 0);

        let mut lazy = Learner::new(&sample, LearnerConfig::default()).unwrap();
        lazy.run().unwrap();
        assert!(matches!(lazy.history()[0], MergeRecord::Merged { .. }));
    }

    #[test]
    fn explanations_use_the_configured_strategy() {
        let strategy = ScoringStrategy::Threshold { min: 1 };
        let config = LearnerConfig::default().with_strategy(strategy);
        assert_eq!(config.strategy(), strategy);
        // 0 -a-> 1, 0 -b-> 2 -a-> 3
        let learner = Learner::new(&sparse(), config).unwrap();

        let explanation = learner
            .explain(StatePair::new(StateId(2), StateId(0)))
            .unwrap();
        assert_eq!(explanation.strategy, strategy);
        assert_eq!(explanation.score, PairScore::new(1, 0));
        assert_eq!(
            explanation.entries,
            vec![(StateId(2), StateId(0)), (StateId(3), StateId(1))]
        );
        let leaf = learner
            .explain(StatePair::new(StateId(1), StateId(0)))
            .unwrap();
        assert_eq!(leaf.score, PairScore::INCOMPATIBLE);
        assert_eq!(
            learner.explain(StatePair::new(StateId(9), StateId(0))),
            Err(ContractViolation::UnknownState(StateId(9)))
        );
    }

    #[test]
    fn skipped_conflicts_are_kept() {
        let sample = Sample::new([
            (vec!['a'], true),
            (vec!['a'], false),
            (vec!['a', 'a'], true),
        ]);
        assert!(matches!(
            Learner::new(&sample, LearnerConfig::default()),
            Err(LearnError::Conflict(_))
        ));

        let config = LearnerConfig::default().with_conflicts(ConflictPolicy::KeepFirst);
        let mut learner = Learner::new(&sample, config).unwrap();
        assert_eq!(learner.skipped().len(), 1);
        assert_eq!(learner.skipped()[0].trace, 1);
        let hypothesis = learner.run().unwrap();
        assert!(hypothesis.accepts(&['a', 'a']));
    }

    #[test]
    fn cancellation_between_steps() {
        let reference = crate::tests::no_double_b();
        let sample = exhaustive(&reference, 3);
        let mut learner = Learner::new(&sample, LearnerConfig::default()).unwrap();
        let cancel = AtomicBool::new(true);
        assert_eq!(
            learner.run_cancellable(&cancel).unwrap_err(),
            LearnError::Cancelled(0)
        );
        assert_eq!(learner.phase(), Phase::Initial);
        let limited = LearnerConfig::default().with_max_iterations(1);
        let mut learner = Learner::new(&sample, limited).unwrap();
        assert!(matches!(learner.run(), Err(LearnError::IterationLimit(1))));
        assert!(learner.hypothesis().is_trim());
    }

    #[test_log::test]
    fn contradicted_merges_are_excluded() {
        let sample = sparse();
        let reference = crate::tests::no_double_b();

        let plain = learn(&sample, LearnerConfig::default()).unwrap();
        assert!(plain.equivalent(&reference).is_err());

        let config = LearnerConfig::default().with_questions(QuestionConfig::new(
            QuestionGenerator::Symmetric,
            8,
        ));
        let mut learner = Learner::new(&sample, config)
            .unwrap()
            .with_oracle(ReferenceOracle::new(reference.clone()));
        let hypothesis = learner.run().unwrap().clone();
        assert!(learner
            .history()
            .iter()
            .any(|record| matches!(record, MergeRecord::Excluded(_))));
        assert!(learner.oracle().asked() > 0);
        assert_eq!(sample.consistent_with(&hypothesis), Ok(()));
        assert_eq!(hypothesis.equivalent(&reference), Ok(()));
    }

    #[test_log::test]
    fn unavailable_oracle_suspends_and_resumes() {
        let sample = sparse();
        let config = LearnerConfig::default()
            .with_questions(QuestionConfig::new(QuestionGenerator::Symmetric, 8));
        let reference = crate::tests::no_double_b();

        let mut calls = 0;
        let mut answered = vec![];
        {
            let flaky = |word: &[char]| -> Result<Answer, OracleUnavailable<char>> {
                calls += 1;
                if calls == 1 {
                    Err(OracleUnavailable {
                        question: word.to_vec(),
                    })
                } else {
                    answered.push(word.to_vec());
                    Ok(Answer::from(reference.accepts(word)))
                }
            };
            let mut learner = Learner::new(&sample, config).unwrap().with_oracle(flaky);
            let suspended = learner.run().unwrap_err();
            assert!(suspended.is_resumable());
            assert!(matches!(suspended, LearnError::Suspended(_)));
            assert_eq!(learner.phase(), Phase::Select);
            learner.run().unwrap();
            assert_eq!(learner.phase(), Phase::Done);
        }
        assert!(calls >= 2);
        assert_eq!(answered.iter().unique().count(), answered.len());
    }

    #[test]
    fn constraints_answer_without_oracle() {
        let sample = sparse();
        let config = LearnerConfig::default()
            .with_questions(QuestionConfig::new(QuestionGenerator::Symmetric, 8))
            .with_constraint(crate::tests::no_double_b());
        let mut learner = Learner::new(&sample, config).unwrap();
        let hypothesis = learner.run().unwrap().clone();
        assert!(learner
            .history()
            .iter()
            .any(|record| matches!(record, MergeRecord::Excluded(_))));
        assert_eq!(sample.consistent_with(&hypothesis), Ok(()));
        assert_eq!(hypothesis.equivalent(&crate::tests::no_double_b()), Ok(()));
    }
}
