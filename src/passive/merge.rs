use std::collections::VecDeque;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{graph::TransitionGraph, math::Set, Symbol};

use super::{ContractViolation, EquivalenceMap, StatePair};

/// Merges `pair.blue` into `pair.red`, using the equivalence map that scoring the pair produced.
/// The input graph is left untouched, the merged graph is returned as a new value that shares all
/// rows which the merge does not affect.
///
/// In the result
/// - every transition into `blue` leads to `red` instead,
/// - every state of the equivalence map is replaced by its representative,
/// - transitions of a replaced state on labels that its representative lacks are moved over to
///   the representative, together with the subtree they lead into,
/// - everything else that was only reachable through `blue` is removed.
///
/// The merge is refused if the map was rejected or computed for another pair, if one of the
/// states does not exist or if the states reachable from `blue` do not form a tree that avoids
/// `red`.
pub fn merge<S: Symbol>(
    graph: &TransitionGraph<S>,
    pair: StatePair,
    equivalence: &EquivalenceMap,
) -> Result<TransitionGraph<S>, ContractViolation> {
    let StatePair { blue, red } = pair;
    if equivalence.pair() != pair {
        return Err(ContractViolation::MismatchedMap {
            computed: equivalence.pair(),
            requested: pair,
        });
    }
    if equivalence.is_rejected() {
        return Err(ContractViolation::RejectedMap(pair));
    }
    if blue == red {
        return Err(ContractViolation::SelfMerge(blue));
    }
    if let Some(unknown) = equivalence
        .iter()
        .flat_map(|(q, r)| [q, r])
        .find(|q| !graph.contains(*q))
    {
        return Err(ContractViolation::UnknownState(unknown));
    }
    let subtree = graph.reachable_from(blue);
    if subtree.contains(&red) || !graph.is_tree_from(blue) {
        return Err(ContractViolation::NotATree(blue));
    }

    let mut merged = graph.clone();

    let incoming = graph
        .states()
        .flat_map(|(q, _)| {
            graph
                .edges(q)
                .filter(|(_, target)| *target == blue)
                .map(move |(label, _)| (q, label.clone()))
        })
        .collect_vec();
    for (q, label) in incoming {
        merged.redirect(q, label, red);
    }

    let mut grafted = Set::default();
    for (q, representative) in equivalence.iter() {
        for (label, target) in graph.edges(q) {
            if merged.transition(representative, label).is_none() {
                trace!(
                    "grafting {target} onto {representative} on {}",
                    label.show()
                );
                merged.redirect(representative, label.clone(), target);
                grafted.insert(target);
            }
        }
    }

    let mut removed = 0;
    let mut queue = VecDeque::from([blue]);
    while let Some(q) = queue.pop_front() {
        if grafted.contains(&q) {
            continue;
        }
        queue.extend(graph.edges(q).map(|(_, target)| target));
        merged.remove_state(q);
        removed += 1;
    }

    merged.recompute_depths();
    debug_assert!(merged
        .state_ids()
        .all(|q| merged.edges(q).all(|(_, target)| merged.contains(target))));
    debug!(
        "merged {pair}, grafted {} and removed {removed} states, {} remain",
        grafted.len(),
        merged.size()
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    /// A PTA for the traces `+a a a`, `+a b`, `-b b`, `+b a b`.
    fn pta() -> TransitionGraph<char> {
        let sample = Sample::new([
            (vec!['a', 'a', 'a'], true),
            (vec!['a', 'b'], true),
            (vec!['b', 'b'], false),
            (vec!['b', 'a', 'b'], true),
        ]);
        PrefixTreeBuilder::from_sample(&sample, ConflictPolicy::Abort).unwrap()
    }

    fn merge_pair(graph: &TransitionGraph<char>, blue: u32, red: u32) -> TransitionGraph<char> {
        let pair = StatePair::new(StateId(blue), StateId(red));
        let (score, map) = ScoringStrategy::Edsm.score(graph, pair).unwrap();
        assert!(score.is_compatible());
        merge(graph, pair, &map).unwrap()
    }

    #[test_log::test]
    fn merge_keeps_determinism_and_evidence() {
        let graph = pta();
        // 0 -a-> 1 -a-> 2 -a-> 3, 1 -b-> 4, 0 -b-> 5 -b-> 6 (reject), 5 -a-> 7 -b-> 8
        let merged = merge_pair(&graph, 1, 0);
        assert_eq!(graph, pta());

        assert_eq!(merged.transition(StateId(0), &'a'), Some(StateId(0)));
        assert_eq!(merged.transition(StateId(0), &'b'), Some(StateId(5)));
        assert!(!merged.contains(StateId(1)));
        assert!(merged.is_trim());

        for trace in [vec!['a', 'a', 'a'], vec!['a', 'b'], vec!['b', 'a', 'b']] {
            assert!(merged.accepts(&trace));
        }
        assert!(!merged.accepts(&['b', 'b']));
        // evidence of the merged state 4 (reached by `a b`) lives on in 5
        assert_eq!(merged.run(&['a', 'b']), Some(StateId(5)));
    }

    #[test_log::test]
    fn divergent_branches_are_grafted() {
        // 0 -a-> 1, 0 -b-> 2 -c-> 3 -d-> 4: merging 2 into 1 moves `c` over to 1
        let graph = GraphBuilder::default()
            .with_transitions([(0, 'a', 1), (0, 'b', 2), (2, 'c', 3), (3, 'd', 4)])
            .into_graph(0)
            .unwrap();
        let merged = merge_pair(&graph, 2, 1);
        assert_eq!(merged.transition(StateId(0), &'b'), Some(StateId(1)));
        assert_eq!(merged.transition(StateId(1), &'c'), Some(StateId(3)));
        assert_eq!(merged.transition(StateId(3), &'d'), Some(StateId(4)));
        assert_eq!(merged.size(), 4);
        assert_eq!(merged.state(StateId(4)).unwrap().depth(), 3);
    }

    #[test]
    fn every_reachable_state_survives_or_is_represented() {
        let graph = pta();
        for blue in [1u32, 5] {
            let pair = StatePair::new(StateId(blue), StateId(0));
            let (score, map) = ScoringStrategy::Edsm.score(&graph, pair).unwrap();
            if !score.is_compatible() {
                continue;
            }
            let merged = merge(&graph, pair, &map).unwrap();
            let reachable = merged.reachable_from(merged.initial());
            for q in graph.state_ids() {
                let survivor = if merged.contains(q) {
                    q
                } else {
                    map.representative(q).unwrap()
                };
                assert!(reachable.contains(&survivor), "{q} got lost");
            }
        }
    }

    #[test]
    fn merges_are_refused_on_bad_input() {
        let graph = pta();
        let pair = StatePair::new(StateId(5), StateId(0));
        let (score, rejected) = ScoringStrategy::Edsm.score(&graph, pair).unwrap();
        assert_eq!(score, PairScore::INCOMPATIBLE);
        assert_eq!(
            merge(&graph, pair, &rejected),
            Err(ContractViolation::RejectedMap(pair))
        );

        let other = StatePair::new(StateId(1), StateId(0));
        let (_, map) = ScoringStrategy::Edsm.score(&graph, other).unwrap();
        assert!(matches!(
            merge(&graph, pair, &map),
            Err(ContractViolation::MismatchedMap { .. })
        ));

        // the root reaches every state, so it can never be merged into one of them
        let cyclic = merge(&graph, other, &map).unwrap();
        let pair = StatePair::new(StateId(0), StateId(5));
        assert_eq!(
            ScoringStrategy::Rpni.score(&cyclic, pair).map(|(score, _)| score),
            Err(ContractViolation::NotATree(StateId(0)))
        );
    }

    #[test]
    fn subtrees_entered_from_outside_are_refused() {
        // 0 -b-> 2 bypasses 1, so removing the subtree of 1 would leave a dangling edge
        let shortcut = GraphBuilder::default()
            .with_transitions([(0, 'a', 1), (0, 'b', 2), (1, 'b', 2)])
            .into_graph(0)
            .unwrap();
        let pair = StatePair::new(StateId(1), StateId(0));
        assert!(!shortcut.is_tree_from(StateId(1)));
        assert_eq!(
            ScoringStrategy::Edsm.score(&shortcut, pair).map(|(score, _)| score),
            Err(ContractViolation::NotATree(StateId(1)))
        );

        // a map for the same pair, taken from the graph without the shortcut
        let tree = GraphBuilder::default()
            .with_transitions([(0, 'a', 1), (0, 'b', 2)])
            .into_graph(0)
            .unwrap();
        let (score, map) = ScoringStrategy::Edsm.score(&tree, pair).unwrap();
        assert!(score.is_compatible());
        assert_eq!(
            merge(&shortcut, pair, &map),
            Err(ContractViolation::NotATree(StateId(1)))
        );
        assert_eq!(shortcut.transition(StateId(0), &'b'), Some(StateId(2)));
    }
}
