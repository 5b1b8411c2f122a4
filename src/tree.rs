use std::collections::BTreeSet;

use crate::alphabet::{Alphabet, END_MARKER};
use crate::error::{Error, Result};
use crate::graph::{Graph, Shape};
use crate::postfix::{CONCAT, STAR, UNION};

/// 1-based id of one leaf occurrence in a pattern.
pub type Position = usize;

/// Ordered set of positions. Ordering makes equality and hashing
/// independent of insertion order.
pub type PosSet = BTreeSet<Position>;

/// Index of a node in the [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Leaf { symbol: char, position: Position },
    Concat(NodeId, NodeId),
    Alternation(NodeId, NodeId),
    Closure(NodeId),
}

/// A syntax tree node with its attributes, fixed at construction.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub nullable: bool,
    pub firstpos: PosSet,
    pub lastpos: PosSet,
}

impl Node {
    pub fn children(&self) -> Vec<NodeId> {
        match self.kind {
            NodeKind::Leaf { .. } => Vec::new(),
            NodeKind::Concat(l, r) | NodeKind::Alternation(l, r) => vec![l, r],
            NodeKind::Closure(c) => vec![c],
        }
    }

    /// Symbol-or-operator label, e.g. `'L' (1)` for a leaf or `.` for a
    /// concatenation.
    pub fn label(&self) -> String {
        match self.kind {
            NodeKind::Leaf { symbol, position } => format!("'{}' ({})", symbol, position),
            NodeKind::Concat(..) => CONCAT.to_string(),
            NodeKind::Alternation(..) => UNION.to_string(),
            NodeKind::Closure(..) => STAR.to_string(),
        }
    }
}

pub(crate) fn fmt_set(set: &PosSet) -> String {
    let items: Vec<String> = set.iter().map(|p| p.to_string()).collect();
    format!("{{{}}}", items.join(", "))
}

/// Annotated syntax tree of a postfix pattern, stored as an arena.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
    // symbols[p - 1] is the symbol at position p
    symbols: Vec<char>,
    accepting: Position,
}

struct Builder<'a> {
    alphabet: &'a Alphabet,
    nodes: Vec<Node>,
    symbols: Vec<char>,
    stack: Vec<NodeId>,
}

impl<'a> Builder<'a> {
    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.stack.push(id);
        id
    }

    fn pop(&mut self, op: char, offset: usize) -> Result<NodeId> {
        self.stack.pop().ok_or(Error::MissingOperand { op, offset })
    }

    fn leaf(&mut self, symbol: char) {
        self.symbols.push(symbol);
        let position = self.symbols.len();
        let mut set = PosSet::new();
        set.insert(position);
        self.alloc(Node {
            kind: NodeKind::Leaf { symbol, position },
            nullable: false,
            firstpos: set.clone(),
            lastpos: set,
        });
    }

    fn closure(&mut self, offset: usize) -> Result<()> {
        let child = self.pop(STAR, offset)?;
        let (firstpos, lastpos) = {
            let c = &self.nodes[child.0];
            (c.firstpos.clone(), c.lastpos.clone())
        };
        self.alloc(Node {
            kind: NodeKind::Closure(child),
            nullable: true,
            firstpos,
            lastpos,
        });
        Ok(())
    }

    fn concat(&mut self, offset: usize) -> Result<()> {
        let right = self.pop(CONCAT, offset)?;
        let left = self.pop(CONCAT, offset)?;
        let node = {
            let l = &self.nodes[left.0];
            let r = &self.nodes[right.0];
            let firstpos = if l.nullable {
                l.firstpos.union(&r.firstpos).cloned().collect()
            } else {
                l.firstpos.clone()
            };
            let lastpos = if r.nullable {
                l.lastpos.union(&r.lastpos).cloned().collect()
            } else {
                r.lastpos.clone()
            };
            Node {
                kind: NodeKind::Concat(left, right),
                nullable: l.nullable && r.nullable,
                firstpos,
                lastpos,
            }
        };
        self.alloc(node);
        Ok(())
    }

    fn alternation(&mut self, offset: usize) -> Result<()> {
        let right = self.pop(UNION, offset)?;
        let left = self.pop(UNION, offset)?;
        let node = {
            let l = &self.nodes[left.0];
            let r = &self.nodes[right.0];
            Node {
                kind: NodeKind::Alternation(left, right),
                nullable: l.nullable || r.nullable,
                firstpos: l.firstpos.union(&r.firstpos).cloned().collect(),
                lastpos: l.lastpos.union(&r.lastpos).cloned().collect(),
            }
        };
        self.alloc(node);
        Ok(())
    }

    fn finish(mut self) -> Result<SyntaxTree> {
        let root = match self.stack.len() {
            0 => return Err(Error::EmptyPattern),
            1 => self.stack.pop().ok_or(Error::EmptyPattern)?,
            count => return Err(Error::DanglingOperands { count }),
        };
        if self.symbols.last() != Some(&END_MARKER) {
            return Err(Error::MissingEndMarker);
        }
        let accepting = self.symbols.len();
        debug!(
            "syntax tree: {} nodes, {} positions over {:?}, accepting position {}",
            self.nodes.len(),
            accepting,
            self.alphabet.symbols(),
            accepting
        );
        Ok(SyntaxTree {
            nodes: self.nodes,
            root,
            symbols: self.symbols,
            accepting,
        })
    }
}

impl SyntaxTree {
    /// Builds the tree from a postfix pattern in one left-to-right scan.
    ///
    /// The pattern must end with the `#` leaf; its position becomes the
    /// accepting position. Nothing is returned on error.
    pub fn from_postfix(postfix: &str, alphabet: &Alphabet) -> Result<Self> {
        let mut builder = Builder {
            alphabet,
            nodes: Vec::new(),
            symbols: Vec::new(),
            stack: Vec::new(),
        };
        for (offset, c) in postfix.chars().enumerate() {
            match c {
                _ if c.is_whitespace() => {}
                _ if alphabet.is_operand(c) => builder.leaf(c),
                STAR => builder.closure(offset)?,
                CONCAT => builder.concat(offset)?,
                UNION => builder.alternation(offset)?,
                _ => return Err(Error::UnexpectedChar { ch: c, offset }),
            }
        }
        builder.finish()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of leaf positions, `#` included.
    pub fn position_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbol_at(&self, position: Position) -> Option<char> {
        position
            .checked_sub(1)
            .and_then(|i| self.symbols.get(i))
            .cloned()
    }

    /// `(position, symbol)` pairs in position order.
    pub fn positions<'a>(&'a self) -> impl Iterator<Item = (Position, char)> + 'a {
        self.symbols.iter().enumerate().map(|(i, &s)| (i + 1, s))
    }

    /// Position of the terminating `#` leaf.
    pub fn accepting_position(&self) -> Position {
        self.accepting
    }

    /// Node graph for rendering: one table-shaped node per tree node,
    /// edges from parent to child.
    pub fn to_graph(&self) -> Graph {
        let mut graph = Graph::new("tree");
        for (i, node) in self.nodes.iter().enumerate() {
            let label = format!(
                "nullable: {}\nfirstpos: {} lastpos: {}\n{}",
                if node.nullable { "T" } else { "F" },
                fmt_set(&node.firstpos),
                fmt_set(&node.lastpos),
                node.label()
            );
            graph.add_node(format!("n{}", i), label, Shape::Plaintext);
        }
        for (i, node) in self.nodes.iter().enumerate() {
            for child in node.children() {
                graph.add_edge(format!("n{}", i), format!("n{}", child.0), None);
            }
        }
        graph
    }
}

#[cfg(test)]
fn identifier_tree() -> SyntaxTree {
    SyntaxTree::from_postfix("LLD|*.#.", &Alphabet::identifier()).unwrap()
}

#[cfg(test)]
fn set(items: &[Position]) -> PosSet {
    items.iter().cloned().collect()
}

#[test]
fn positions_are_numbered_left_to_right() {
    let tree = identifier_tree();
    let positions: Vec<_> = tree.positions().collect();
    assert_eq!(positions, vec![(1, 'L'), (2, 'L'), (3, 'D'), (4, '#')]);
    assert_eq!(tree.accepting_position(), 4);
    assert_eq!(tree.symbol_at(0), None);
    assert_eq!(tree.symbol_at(3), Some('D'));
}

#[test]
fn root_attributes_of_identifier_pattern() {
    let tree = identifier_tree();
    let root = tree.node(tree.root());
    assert!(!root.nullable);
    assert_eq!(root.firstpos, set(&[1]));
    assert_eq!(root.lastpos, set(&[4]));
    match root.kind {
        NodeKind::Concat(_, right) => assert_eq!(tree.node(right).label(), "'#' (4)"),
        ref other => panic!("unexpected root {:?}", other),
    }
}

#[test]
fn closure_is_always_nullable() {
    let alphabet = Alphabet::new("ab".chars());
    for postfix in &["a*#.", "ab.*#.", "ab|*#.", "a*b*.*#."] {
        let tree = SyntaxTree::from_postfix(postfix, &alphabet).unwrap();
        for node in tree.nodes() {
            if let NodeKind::Closure(child) = node.kind {
                assert!(node.nullable);
                assert_eq!(node.firstpos, tree.node(child).firstpos);
                assert_eq!(node.lastpos, tree.node(child).lastpos);
            }
        }
    }
}

#[test]
fn nullable_left_operand_widens_firstpos() {
    let alphabet = Alphabet::new("ab".chars());
    let tree = SyntaxTree::from_postfix("a*b.#.", &alphabet).unwrap();
    let root = tree.node(tree.root());
    assert_eq!(root.firstpos, set(&[1, 2]));
    assert_eq!(root.lastpos, set(&[3]));
}

#[test]
fn attributes_stay_within_subtree() {
    let tree = identifier_tree();
    fn leaves(tree: &SyntaxTree, id: NodeId, out: &mut PosSet) {
        let node = tree.node(id);
        if let NodeKind::Leaf { position, .. } = node.kind {
            out.insert(position);
        }
        for child in node.children() {
            leaves(tree, child, out);
        }
    }
    for i in 0..tree.nodes().len() {
        let mut below = PosSet::new();
        leaves(&tree, NodeId(i), &mut below);
        let node = tree.node(NodeId(i));
        assert!(node.firstpos.is_subset(&below));
        assert!(node.lastpos.is_subset(&below));
    }
}

#[test]
fn malformed_postfix_is_rejected() {
    let alphabet = Alphabet::identifier();
    match SyntaxTree::from_postfix("L.#", &alphabet) {
        Err(Error::MissingOperand { op, offset }) => {
            assert_eq!(op, '.');
            assert_eq!(offset, 1);
        }
        other => panic!("unexpected {:?}", other),
    }
    match SyntaxTree::from_postfix("*", &alphabet) {
        Err(Error::MissingOperand { op: '*', .. }) => {}
        other => panic!("unexpected {:?}", other),
    }
    match SyntaxTree::from_postfix("LD#.", &alphabet) {
        Err(Error::DanglingOperands { count }) => assert_eq!(count, 2),
        other => panic!("unexpected {:?}", other),
    }
    match SyntaxTree::from_postfix("", &alphabet) {
        Err(Error::EmptyPattern) => {}
        other => panic!("unexpected {:?}", other),
    }
    match SyntaxTree::from_postfix("LD.", &alphabet) {
        Err(Error::MissingEndMarker) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn tree_graph_has_an_edge_per_child() {
    let tree = identifier_tree();
    let graph = tree.to_graph();
    assert_eq!(graph.nodes.len(), tree.nodes().len());
    assert_eq!(graph.edges.len(), tree.nodes().len() - 1);
    assert!(graph.nodes.iter().all(|n| n.shape == Shape::Plaintext));
}
