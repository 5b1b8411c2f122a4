use std::fmt;

use crate::tree::{fmt_set, NodeKind, PosSet, Position, SyntaxTree};

/// Position → positions that can immediately follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Followpos {
    // table[p - 1] = followpos(p)
    table: Vec<PosSet>,
    symbols: Vec<char>,
}

impl Followpos {
    /// Applies the concatenation and closure rules at every node.
    ///
    /// Uses an explicit stack instead of recursion, so nesting depth is
    /// bounded only by memory. The table is set-additive and the visiting
    /// order does not change the result.
    pub fn compute(tree: &SyntaxTree) -> Self {
        let mut table = vec![PosSet::new(); tree.position_count()];
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            let node = tree.node(id);
            match node.kind {
                NodeKind::Concat(left, right) => {
                    let (l, r) = (tree.node(left), tree.node(right));
                    for &p in &l.lastpos {
                        table[p - 1].extend(r.firstpos.iter().cloned());
                    }
                }
                NodeKind::Closure(child) => {
                    let c = tree.node(child);
                    for &p in &c.lastpos {
                        table[p - 1].extend(c.firstpos.iter().cloned());
                    }
                }
                NodeKind::Alternation(..) | NodeKind::Leaf { .. } => {}
            }
            stack.extend(node.children());
        }

        let followpos = Followpos {
            table,
            symbols: tree.positions().map(|(_, s)| s).collect(),
        };
        for (p, symbol, follow) in followpos.rows() {
            trace!("followpos({} '{}') = {}", p, symbol, fmt_set(follow));
        }
        followpos
    }

    pub fn get(&self, position: Position) -> Option<&PosSet> {
        position.checked_sub(1).and_then(|i| self.table.get(i))
    }

    /// `(position, symbol, followpos)` rows in position order.
    pub fn rows<'a>(&'a self) -> impl Iterator<Item = (Position, char, &'a PosSet)> + 'a {
        self.table
            .iter()
            .zip(self.symbols.iter())
            .enumerate()
            .map(|(i, (follow, &symbol))| (i + 1, symbol, follow))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Display for Followpos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (p, symbol, follow) in self.rows() {
            writeln!(f, "{:<5} | {:<5} | {}", p, symbol, fmt_set(follow))?;
        }
        Ok(())
    }
}

#[cfg(test)]
use crate::alphabet::Alphabet;

#[cfg(test)]
fn set(items: &[Position]) -> PosSet {
    items.iter().cloned().collect()
}

#[test]
fn identifier_followpos_table() {
    let tree = SyntaxTree::from_postfix("LLD|*.#.", &Alphabet::identifier()).unwrap();
    let followpos = Followpos::compute(&tree);
    assert_eq!(followpos.len(), 4);
    assert_eq!(followpos.get(1), Some(&set(&[2, 3, 4])));
    assert_eq!(followpos.get(2), Some(&set(&[2, 3, 4])));
    assert_eq!(followpos.get(3), Some(&set(&[2, 3, 4])));
    assert_eq!(followpos.get(4), Some(&set(&[])));
    assert_eq!(followpos.get(5), None);
}

#[test]
fn textbook_followpos_table() {
    // (a|b)*.a.b.b.#
    let alphabet = Alphabet::new("ab".chars());
    let tree = SyntaxTree::from_postfix("ab|*a.b.b.#.", &alphabet).unwrap();
    let followpos = Followpos::compute(&tree);
    let expected = vec![
        set(&[1, 2, 3]),
        set(&[1, 2, 3]),
        set(&[4]),
        set(&[5]),
        set(&[6]),
        set(&[]),
    ];
    let rows: Vec<PosSet> = followpos.rows().map(|(_, _, f)| f.clone()).collect();
    assert_eq!(rows, expected);
}

#[test]
fn deeply_nested_closures_do_not_overflow() {
    let alphabet = Alphabet::identifier();
    let mut postfix = String::from("L");
    for _ in 0..100_000 {
        postfix.push('*');
    }
    postfix.push_str("#.");
    let tree = SyntaxTree::from_postfix(&postfix, &alphabet).unwrap();
    let followpos = Followpos::compute(&tree);
    assert_eq!(followpos.get(1), Some(&set(&[1, 2])));
}

#[test]
fn display_lists_rows_in_order() {
    let tree = SyntaxTree::from_postfix("LD.#.", &Alphabet::identifier()).unwrap();
    let text = Followpos::compute(&tree).to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("1 "));
    assert!(lines[0].ends_with("{2}"));
    assert!(lines[2].ends_with("{}"));
}
