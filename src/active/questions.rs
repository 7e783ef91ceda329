use itertools::Itertools;
use tracing::debug;

use crate::{
    graph::{reachable::MinimalRepresentatives, StateId, TransitionGraph},
    passive::{EquivalenceMap, StatePair},
    Show, Symbol,
};

/// A sequence that is put to an oracle before a merge is committed, together with the
/// classification that the merged graph predicts for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question<S> {
    /// The sequence of labels.
    pub word: Vec<S>,
    /// Whether the merged graph accepts the sequence.
    pub expected: bool,
}

impl<S: Symbol> Show for Question<S> {
    fn show(&self) -> String {
        format!("{}{}", self.expected.show(), self.word.show())
    }
}

/// The ways in which questions about a tentative merge are generated. Each of them only asks
/// about sequences that the merge introduces, that is sequences which are possible in the merged
/// graph but do not exist in the graph before the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuestionGenerator {
    /// Prefixes the access word of the red state (before the merge) to the transition cover of
    /// the merged graph from the red state.
    #[default]
    Qsm,
    /// Like [`QuestionGenerator::Qsm`], but uses the access word of the merged state after the
    /// merge, also extended by each label that loops on the merged state.
    Improved,
    /// For every state that takes part in the merge, extends its access word (before the merge)
    /// by each label of its representative after the merge.
    Symmetric,
}

/// Configures interactive refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestionConfig {
    /// How questions are generated.
    pub generator: QuestionGenerator,
    /// The maximal number of questions per merge.
    pub limit: usize,
}

impl Default for QuestionConfig {
    fn default() -> Self {
        Self {
            generator: QuestionGenerator::default(),
            limit: 16,
        }
    }
}

impl QuestionConfig {
    /// Creates a configuration with the given generator and limit.
    pub fn new(generator: QuestionGenerator, limit: usize) -> Self {
        Self { generator, limit }
    }
}

/// The words `w` and `w a` for each word `w` that reaches some state from `origin` in a
/// length-lexicographically minimal way and each label `a` leaving that state.
fn transition_cover<S: Symbol>(graph: &TransitionGraph<S>, origin: StateId) -> Vec<Vec<S>> {
    MinimalRepresentatives::new(graph, origin)
        .flat_map(|(word, state)| {
            let extensions = graph
                .edges(state)
                .map(|(label, _)| {
                    let mut extended = word.clone();
                    extended.push(label.clone());
                    extended
                })
                .collect_vec();
            std::iter::once(word).chain(extensions)
        })
        .collect()
}

fn concatenations<S: Symbol>(prefixes: &[Vec<S>], suffixes: &[Vec<S>]) -> Vec<Vec<S>> {
    prefixes
        .iter()
        .cartesian_product(suffixes)
        .map(|(prefix, suffix)| prefix.iter().chain(suffix).cloned().collect())
        .collect()
}

impl QuestionGenerator {
    /// Computes the questions for merging `pair` with the equivalence map `equivalence`, which
    /// turned `before` into `merged`. The questions are sorted length-lexicographically, free of
    /// duplicates and there are at most `limit` of them.
    pub fn questions<S: Symbol>(
        &self,
        before: &TransitionGraph<S>,
        merged: &TransitionGraph<S>,
        pair: StatePair,
        equivalence: &EquivalenceMap,
        limit: usize,
    ) -> Vec<Question<S>> {
        let red = pair.red;
        let candidates = match self {
            QuestionGenerator::Qsm => {
                let prefixes = before.access_word(red).into_iter().collect_vec();
                concatenations(&prefixes, &transition_cover(merged, red))
            }
            QuestionGenerator::Improved => {
                let prefixes = merged
                    .access_word(red)
                    .map(|access| {
                        let loops = merged
                            .edges(red)
                            .filter(|(_, target)| *target == red)
                            .map(|(label, _)| {
                                let mut extended = access.clone();
                                extended.push(label.clone());
                                extended
                            })
                            .collect_vec();
                        std::iter::once(access).chain(loops).collect_vec()
                    })
                    .unwrap_or_default();
                concatenations(&prefixes, &transition_cover(merged, red))
            }
            QuestionGenerator::Symmetric => equivalence
                .classes()
                .iter()
                .flat_map(|class| {
                    let representative = class
                        .iter()
                        .copied()
                        .find(|q| merged.contains(*q))
                        .unwrap_or(red);
                    let labels = merged
                        .edges(representative)
                        .map(|(label, _)| vec![label.clone()])
                        .collect_vec();
                    let prefixes = class
                        .iter()
                        .filter_map(|q| before.access_word(*q))
                        .collect_vec();
                    concatenations(&prefixes, &labels)
                })
                .collect(),
        };

        let questions = candidates
            .into_iter()
            .filter(|word| before.run(word).is_none() && merged.run(word).is_some())
            .sorted_by(|x, y| x.len().cmp(&y.len()).then_with(|| x.cmp(y)))
            .dedup()
            .take(limit)
            .map(|word| Question {
                expected: merged.accepts(&word),
                word,
            })
            .collect_vec();
        debug!(
            "{:?} asks {} questions about {pair}: {}",
            self,
            questions.len(),
            questions.iter().map(Show::show).join(", ")
        );
        questions
    }
}

/// Returns the first domain constraint that does not accept `word`.
pub(crate) fn violated_constraint<'a, S: Symbol>(
    constraints: &'a [TransitionGraph<S>],
    word: &[S],
) -> Option<&'a TransitionGraph<S>> {
    constraints.iter().find(|constraint| !constraint.accepts(word))
}
