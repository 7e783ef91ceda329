use fastrand::Rng;
use tracing::trace;

use crate::{
    graph::{State, StateId, TransitionGraph},
    sample::{Sample, Trace},
};

/// Returns the first `size` lowercase letters, which serve as labels of random automata.
pub fn alphabet(size: usize) -> Vec<char> {
    ('a'..='z').take(size).collect()
}

/// Generates a random prefix-closed reference automaton over [`alphabet`]`(symbols)` with at most
/// `max_states` states.
///
/// States are processed in the order in which they are created. For each accepting state and
/// each label we first decide with `reject_probability` whether the label is rejected, in which
/// case either no transition is added or the transition leads to a fresh rejecting leaf. Otherwise
/// the transition loops back to a uniformly chosen accepting state with `probability`, and leads to
/// a fresh accepting state if it does not. Once `max_states` is reached, only back edges are added.
pub fn random_reference(
    rng: &mut Rng,
    symbols: usize,
    max_states: usize,
    probability: f64,
    reject_probability: f64,
) -> TransitionGraph<char> {
    let labels = alphabet(symbols);
    let mut graph = TransitionGraph::new(true);
    let mut accepting: Vec<StateId> = vec![graph.initial()];

    let mut current = 0;
    while current < accepting.len() {
        let state = accepting[current];
        let depth = graph.state(state).map_or(0, State::depth);
        current += 1;

        for label in &labels {
            let room = graph.size() < max_states;
            if rng.f64() < reject_probability {
                if room && rng.bool() {
                    let leaf = graph.sprout(state, depth, *label, false);
                    trace!("adding rejecting leaf {leaf} below {state} on {label}");
                }
                continue;
            }
            if !room || rng.f64() < probability {
                let target = accepting[rng.usize(..accepting.len())];
                trace!("adding back edge {state} --{label}--> {target}");
                graph.redirect(state, *label, target);
            } else {
                let child = graph.sprout(state, depth, *label, true);
                accepting.push(child);
            }
        }
    }
    graph
}

/// Draws `traces` random walks through `reference`, each of a length that is chosen uniformly
/// between zero and `max_length`. A walk ends early as soon as it uses a label that `reference`
/// rejects, so the resulting sample is consistent with `reference`.
pub fn random_sample(
    rng: &mut Rng,
    reference: &TransitionGraph<char>,
    labels: &[char],
    traces: usize,
    max_length: usize,
) -> Sample<char> {
    (0..traces)
        .map(|_| {
            let length = rng.usize(..=max_length);
            let mut state = reference.initial();
            let mut word = Vec::with_capacity(length);
            for _ in 0..length {
                let Some(label) = rng.choice(labels.iter().copied()) else {
                    break;
                };
                word.push(label);
                match reference.transition(state, &label) {
                    Some(next) if reference.is_accept(next) == Some(true) => state = next,
                    _ => break,
                }
            }
            let accepted = reference.accepts(&word);
            Trace::new(word, accepted)
        })
        .collect()
}
