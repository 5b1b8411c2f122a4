use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;

use crate::alphabet::Alphabet;
use crate::followpos::Followpos;
use crate::graph::{Graph, Shape};
use crate::tree::{fmt_set, PosSet, Position, SyntaxTree};

pub type StateId = usize;

/// Named states and a partial transition function over an alphabet.
///
/// A missing entry means "no match"; there is no trap state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    alphabet: Alphabet,
    names: Vec<String>,
    transitions: Vec<BTreeMap<char, StateId>>,
    accepting: BTreeSet<StateId>,
    start: StateId,
}

impl TransitionTable {
    pub(crate) fn new(
        alphabet: Alphabet,
        names: Vec<String>,
        transitions: Vec<BTreeMap<char, StateId>>,
        accepting: BTreeSet<StateId>,
        start: StateId,
    ) -> Self {
        debug_assert_eq!(names.len(), transitions.len());
        TransitionTable {
            alphabet,
            names,
            transitions,
            accepting,
            start,
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, state: StateId) -> Option<&str> {
        self.names.get(state).map(|n| n.as_str())
    }

    pub fn next(&self, state: StateId, symbol: char) -> Option<StateId> {
        self.transitions
            .get(state)
            .and_then(|t| t.get(&symbol))
            .cloned()
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(&state)
    }

    pub fn accepting(&self) -> &BTreeSet<StateId> {
        &self.accepting
    }

    /// `(from, symbol, to)` triples ordered by state, then alphabet order.
    pub fn edges(&self) -> Vec<(StateId, char, StateId)> {
        let mut edges = Vec::new();
        for state in 0..self.len() {
            for &symbol in self.alphabet.symbols() {
                if let Some(to) = self.next(state, symbol) {
                    edges.push((state, symbol, to));
                }
            }
        }
        edges
    }

    /// Runs a string of abstract symbols from the start state.
    pub fn accept(&self, symbols: &str) -> bool {
        let mut state = self.start;
        for c in symbols.chars() {
            match self.next(state, c) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_accepting(state)
    }

    pub(crate) fn graph_with<F>(&self, name: &str, label: F) -> Graph
    where
        F: Fn(StateId) -> String,
    {
        let mut graph = Graph::new(name);
        graph.left_to_right = true;
        graph.start = Some(self.names[self.start].clone());
        for state in 0..self.len() {
            let shape = if self.is_accepting(state) {
                Shape::DoubleCircle
            } else {
                Shape::Circle
            };
            graph.add_node(self.names[state].clone(), label(state), shape);
        }
        for (from, symbol, to) in self.edges() {
            graph.add_edge(
                self.names[from].clone(),
                self.names[to].clone(),
                Some(symbol.to_string()),
            );
        }
        graph
    }

    pub fn to_graph(&self) -> Graph {
        self.graph_with("dfa", |state| self.names[state].clone())
    }
}

impl fmt::Display for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (from, symbol, to) in self.edges() {
            writeln!(
                f,
                "{} --({})--> {}",
                self.names[from], symbol, self.names[to]
            )?;
        }
        Ok(())
    }
}

/// DFA built directly from followpos. Each state is a set of positions.
#[derive(Debug, Clone)]
pub struct Dfa {
    table: TransitionTable,
    states: Vec<PosSet>,
    accepting_position: Position,
}

impl Dfa {
    /// Worklist construction. The start state is `firstpos(root)`; the
    /// successor of `S` on `a` is the union of `followpos(p)` over the
    /// positions `p` in `S` labelled `a`. States are named `S0, S1, ...` in
    /// the order they are discovered, and the empty set never becomes a state.
    pub fn construct(tree: &SyntaxTree, followpos: &Followpos, alphabet: &Alphabet) -> Self {
        let accepting_position = tree.accepting_position();
        let start = tree.node(tree.root()).firstpos.clone();

        let mut states: Vec<PosSet> = vec![start.clone()];
        let mut state_set_to_id: HashMap<PosSet, StateId> = HashMap::new();
        state_set_to_id.insert(start, 0);
        let mut transitions: Vec<BTreeMap<char, StateId>> = vec![BTreeMap::new()];
        let mut queue = VecDeque::new();
        queue.push_back(0);

        while let Some(id) = queue.pop_front() {
            let current = states[id].clone();
            for &symbol in alphabet.symbols() {
                let mut target = PosSet::new();
                for &p in current.iter().filter(|&&p| tree.symbol_at(p) == Some(symbol)) {
                    if let Some(follow) = followpos.get(p) {
                        target.extend(follow.iter().cloned());
                    }
                }
                if target.is_empty() {
                    continue;
                }
                let next = match state_set_to_id.get(&target) {
                    Some(&next) => next,
                    None => {
                        let next = states.len();
                        trace!("discovered S{} = {}", next, fmt_set(&target));
                        state_set_to_id.insert(target.clone(), next);
                        states.push(target);
                        transitions.push(BTreeMap::new());
                        queue.push_back(next);
                        next
                    }
                };
                transitions[id].insert(symbol, next);
            }
        }

        let accepting = states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.contains(&accepting_position))
            .map(|(id, _)| id)
            .collect();
        let names = (0..states.len()).map(|id| format!("S{}", id)).collect();
        debug!("constructed DFA with {} states", states.len());

        Dfa {
            table: TransitionTable::new(alphabet.clone(), names, transitions, accepting, 0),
            states,
            accepting_position,
        }
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Positions making up `state`.
    pub fn state_set(&self, state: StateId) -> &PosSet {
        &self.states[state]
    }

    pub fn state_sets(&self) -> &[PosSet] {
        &self.states
    }

    pub fn accepting_position(&self) -> Position {
        self.accepting_position
    }

    /// State graph; each node shows its name and position set.
    pub fn to_graph(&self) -> Graph {
        self.table.graph_with("dfa", |state| {
            format!("{}\n{}", self.table.names[state], fmt_set(&self.states[state]))
        })
    }
}

#[cfg(test)]
fn build(postfix: &str, alphabet: &Alphabet) -> Dfa {
    let tree = SyntaxTree::from_postfix(postfix, alphabet).unwrap();
    let followpos = Followpos::compute(&tree);
    Dfa::construct(&tree, &followpos, alphabet)
}

#[cfg(test)]
fn set(items: &[Position]) -> PosSet {
    items.iter().cloned().collect()
}

#[test]
fn identifier_dfa() {
    let dfa = build("LLD|*.#.", &Alphabet::identifier());
    let table = dfa.table();
    assert_eq!(table.len(), 2);
    assert_eq!(dfa.state_set(0), &set(&[1]));
    assert_eq!(dfa.state_set(1), &set(&[2, 3, 4]));
    assert!(!table.is_accepting(table.start()));
    assert!(table.is_accepting(1));
    assert_eq!(table.next(0, 'L'), Some(1));
    assert_eq!(table.next(0, 'D'), None);
    assert_eq!(table.next(1, 'L'), Some(1));
    assert_eq!(table.next(1, 'D'), Some(1));
}

#[test]
fn textbook_dfa_names_states_in_discovery_order() {
    let alphabet = Alphabet::new("ab".chars());
    let dfa = build("ab|*a.b.b.#.", &alphabet);
    assert_eq!(
        dfa.state_sets(),
        &[
            set(&[1, 2, 3]),
            set(&[1, 2, 3, 4]),
            set(&[1, 2, 3, 5]),
            set(&[1, 2, 3, 6]),
        ]
    );
    let table = dfa.table();
    assert_eq!(table.accepting().iter().cloned().collect::<Vec<_>>(), vec![3]);
    assert!(table.accept("abb"));
    assert!(table.accept("babaabb"));
    assert!(!table.accept("ab"));
    assert!(!table.accept(""));
}

#[test]
fn construction_is_deterministic() {
    let alphabet = Alphabet::new("ab".chars());
    let first = build("ab|*a.b.b.#.", &alphabet);
    let second = build("ab|*a.b.b.#.", &alphabet);
    assert_eq!(first.table(), second.table());
    assert_eq!(first.state_sets(), second.state_sets());
}

#[test]
fn no_state_is_empty() {
    let alphabet = Alphabet::new("ab".chars());
    for postfix in &["a#.", "a*#.", "ab|*a.#.", "ab.*b.#."] {
        let dfa = build(postfix, &alphabet);
        assert!(dfa.state_sets().iter().all(|s| !s.is_empty()));
    }
}

#[test]
fn names_out_of_range_are_none() {
    let dfa = build("LLD|*.#.", &Alphabet::identifier());
    let table = dfa.table();
    assert_eq!(table.name(0), Some("S0"));
    assert_eq!(table.name(1), Some("S1"));
    assert_eq!(table.name(2), None);
    assert_eq!(table.next(2, 'L'), None);
}

#[test]
fn transition_listing() {
    let dfa = build("LLD|*.#.", &Alphabet::identifier());
    assert_eq!(
        dfa.table().to_string(),
        "S0 --(L)--> S1\nS1 --(L)--> S1\nS1 --(D)--> S1\n"
    );
}

#[test]
fn dfa_graph_shows_position_sets() {
    let dfa = build("LLD|*.#.", &Alphabet::identifier());
    let graph = dfa.to_graph();
    assert_eq!(graph.start.as_ref().map(|s| s.as_str()), Some("S0"));
    assert_eq!(graph.nodes[0].label, "S0\n{1}");
    assert_eq!(graph.nodes[1].shape, Shape::DoubleCircle);
    assert_eq!(graph.edges.len(), 3);
}
