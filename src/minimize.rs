use std::collections::{BTreeMap, BTreeSet};

use crate::dfa::{StateId, TransitionTable};
use crate::graph::Graph;

/// Groups of original states, in group order.
pub type Partition = Vec<Vec<StateId>>;

/// Result of partition refinement over a [`TransitionTable`].
#[derive(Debug, Clone)]
pub struct MinimizedDfa {
    table: TransitionTable,
    groups: Partition,
    group_of: Vec<StateId>,
    initial: Partition,
    rounds: usize,
}

fn initial_partition(dfa: &TransitionTable) -> Partition {
    let (accepting, non_accepting): (Vec<StateId>, Vec<StateId>) =
        (0..dfa.len()).partition(|&s| dfa.is_accepting(s));
    vec![non_accepting, accepting]
        .into_iter()
        .filter(|g| !g.is_empty())
        .collect()
}

fn group_index(partition: &[Vec<StateId>], len: usize) -> Vec<usize> {
    let mut group_of = vec![0; len];
    for (g, group) in partition.iter().enumerate() {
        for &s in group {
            group_of[s] = g;
        }
    }
    group_of
}

/// Splits every group by the group each symbol leads to. A missing
/// transition is its own signature value.
fn refine(dfa: &TransitionTable, partition: &[Vec<StateId>]) -> Partition {
    let group_of = group_index(partition, dfa.len());
    let mut refined = Partition::new();
    for group in partition {
        // signature -> index into refined, in first-seen order
        let mut split: BTreeMap<Vec<Option<usize>>, usize> = BTreeMap::new();
        for &s in group {
            let signature: Vec<Option<usize>> = dfa
                .alphabet()
                .symbols()
                .iter()
                .map(|&a| dfa.next(s, a).map(|t| group_of[t]))
                .collect();
            let slot = *split.entry(signature).or_insert_with(|| {
                refined.push(Vec::new());
                refined.len() - 1
            });
            refined[slot].push(s);
        }
    }
    refined
}

fn names_of(dfa: &TransitionTable, group: &[StateId]) -> String {
    let names: Vec<&str> = group.iter().filter_map(|&s| dfa.name(s)).collect();
    format!("{{{}}}", names.join(","))
}

/// Merges equivalent states with Moore-style refinement.
///
/// Starts from the accepting/non-accepting split and refines until a round
/// leaves the number of groups unchanged. The group holding the start state
/// is renamed `Q0`; the others follow in partition order.
pub fn minimize(dfa: &TransitionTable) -> MinimizedDfa {
    let initial = initial_partition(dfa);
    debug!(
        "initial partition: {}",
        initial
            .iter()
            .map(|g| names_of(dfa, g))
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut partition = initial.clone();
    let mut rounds = 0;
    loop {
        let refined = refine(dfa, &partition);
        rounds += 1;
        trace!("round {}: {} groups", rounds, refined.len());
        if refined.len() == partition.len() {
            break;
        }
        partition = refined;
    }

    if let Some(pos) = partition.iter().position(|g| g.contains(&dfa.start())) {
        let start_group = partition.remove(pos);
        partition.insert(0, start_group);
    }

    let group_of = group_index(&partition, dfa.len());
    let mut transitions = Vec::with_capacity(partition.len());
    let mut accepting = BTreeSet::new();
    for (g, group) in partition.iter().enumerate() {
        // all members agree once refinement is stable
        let representative = group[0];
        let row: BTreeMap<char, StateId> = dfa
            .alphabet()
            .symbols()
            .iter()
            .filter_map(|&a| dfa.next(representative, a).map(|t| (a, group_of[t])))
            .collect();
        transitions.push(row);
        if dfa.is_accepting(representative) {
            accepting.insert(g);
        }
    }
    let names = (0..partition.len()).map(|g| format!("Q{}", g)).collect();
    debug!(
        "minimized {} states to {} after {} rounds",
        dfa.len(),
        partition.len(),
        rounds
    );

    MinimizedDfa {
        table: TransitionTable::new(dfa.alphabet().clone(), names, transitions, accepting, 0),
        groups: partition,
        group_of,
        initial,
        rounds,
    }
}

impl MinimizedDfa {
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Original states merged into each minimized state.
    pub fn groups(&self) -> &[Vec<StateId>] {
        &self.groups
    }

    /// Minimized state holding the original `state`.
    pub fn group_of(&self, state: StateId) -> StateId {
        self.group_of[state]
    }

    /// The accepting/non-accepting split refinement started from.
    pub fn initial_partition(&self) -> &[Vec<StateId>] {
        &self.initial
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// State graph; each node lists the original states it merges.
    pub fn to_graph(&self, original: &TransitionTable) -> Graph {
        self.table
            .graph_with("min_dfa", |g| names_of(original, &self.groups[g]))
    }
}

#[cfg(test)]
use crate::alphabet::Alphabet;
#[cfg(test)]
use crate::dfa::Dfa;
#[cfg(test)]
use crate::followpos::Followpos;
#[cfg(test)]
use crate::tree::SyntaxTree;

#[cfg(test)]
fn build(postfix: &str, alphabet: &Alphabet) -> Dfa {
    let tree = SyntaxTree::from_postfix(postfix, alphabet).unwrap();
    let followpos = Followpos::compute(&tree);
    Dfa::construct(&tree, &followpos, alphabet)
}

#[cfg(test)]
fn all_strings(symbols: &[char], max_len: usize) -> Vec<String> {
    let mut out = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for s in &frontier {
            for &c in symbols {
                let mut t = s.clone();
                t.push(c);
                next.push(t);
            }
        }
        out.extend(next.iter().cloned());
        frontier = next;
    }
    out
}

#[test]
fn equivalent_accepting_states_merge() {
    // a.b* | b.b*
    let alphabet = Alphabet::new("ab".chars());
    let dfa = build("ab*.bb*.|#.", &alphabet);
    assert_eq!(dfa.table().len(), 3);
    let min = minimize(dfa.table());
    assert_eq!(min.table().len(), 2);
    assert_eq!(min.groups(), &[vec![0], vec![1, 2]]);
    assert_eq!(min.group_of(2), 1);
    assert_eq!(min.table().name(1), Some("Q1"));
    assert_eq!(min.table().name(2), None);
}

#[test]
fn inequivalent_non_accepting_states_are_split() {
    // a.b.a: a single accepting/non-accepting split would merge S0, S1, S2
    let alphabet = Alphabet::new("ab".chars());
    let dfa = build("ab.a.#.", &alphabet);
    let min = minimize(dfa.table());
    assert_eq!(min.initial_partition(), &[vec![0, 1, 2], vec![3]]);
    assert_eq!(min.table().len(), 4);
    assert!(min.table().accept("aba"));
    assert!(!min.table().accept("aa"));
    assert!(min.rounds() > 1);
}

#[test]
fn start_group_comes_first() {
    // (a.b)*: the accepting start state lands in the second group of the split
    let alphabet = Alphabet::new("ab".chars());
    let dfa = build("ab.*#.", &alphabet);
    let min = minimize(dfa.table());
    assert_eq!(min.initial_partition(), &[vec![1], vec![0]]);
    assert_eq!(min.groups(), &[vec![0], vec![1]]);
    assert_eq!(min.group_of(dfa.table().start()), 0);
    assert_eq!(min.table().start(), 0);
    assert!(min.table().is_accepting(0));
    assert!(min.table().accept(""));
    assert!(min.table().accept("abab"));
    assert!(!min.table().accept("aba"));
}

#[test]
fn minimization_preserves_language() {
    let alphabet = Alphabet::new("ab".chars());
    let patterns = [
        "ab|*a.b.b.#.",
        "ab*.bb*.|#.",
        "ab.a.#.",
        "ab|*#.",
        "aa.b|*a.#.",
        "ab.*ba.*|#.",
    ];
    for postfix in &patterns {
        let dfa = build(postfix, &alphabet);
        let min = minimize(dfa.table());
        assert!(min.table().len() <= dfa.table().len(), "{}", postfix);
        for s in all_strings(alphabet.symbols(), 7) {
            assert_eq!(
                dfa.table().accept(&s),
                min.table().accept(&s),
                "{} on {:?}",
                postfix,
                s
            );
        }
    }
}

#[test]
fn minimized_graph_labels_groups() {
    let alphabet = Alphabet::new("ab".chars());
    let dfa = build("ab*.bb*.|#.", &alphabet);
    let min = minimize(dfa.table());
    let graph = min.to_graph(dfa.table());
    assert_eq!(graph.nodes[0].label, "{S0}");
    assert_eq!(graph.nodes[1].label, "{S1,S2}");
}
