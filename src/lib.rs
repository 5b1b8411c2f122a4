//! Regular expression to minimal DFA, by direct construction.
//!
//! The pattern is converted to postfix, turned into a syntax tree annotated
//! with `nullable`, `firstpos` and `lastpos`, and the followpos table is
//! derived from the tree. DFA states are sets of leaf positions, built
//! straight from followpos without an intermediate NFA, and the result is
//! minimized by partition refinement.
//!
//! ```
//! use regdfa::{compile, Alphabet};
//!
//! let id = compile("L . ( L | D )* . #", &Alphabet::identifier()).unwrap();
//! assert!(id.matches("PotionBrewer"));
//! assert!(!id.matches("3x"));
//! ```

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod alphabet;
pub mod dfa;
pub mod error;
pub mod followpos;
pub mod graph;
pub mod minimize;
pub mod postfix;
pub mod simulate;
pub mod tree;

pub use alphabet::{java_class, Alphabet, DIGIT, END_MARKER, LETTER};
pub use dfa::{Dfa, StateId, TransitionTable};
pub use error::{Error, Result};
pub use followpos::Followpos;
pub use graph::Graph;
pub use minimize::{minimize, MinimizedDfa};
pub use postfix::to_postfix;
pub use simulate::{simulate, Outcome, Rejection, Simulation};
pub use tree::{PosSet, Position, SyntaxTree};

/// Every stage of one pipeline run.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub alphabet: Alphabet,
    pub postfix: String,
    pub tree: SyntaxTree,
    pub followpos: Followpos,
    pub dfa: Dfa,
    pub minimized: MinimizedDfa,
}

/// Runs the whole pipeline on an infix pattern ending in `#`.
///
/// Either every stage succeeds or an error is returned; there is no
/// partial result.
pub fn compile(infix: &str, alphabet: &Alphabet) -> Result<Compiled> {
    let postfix = to_postfix(infix, alphabet)?;
    compile_postfix(&postfix, alphabet)
}

/// Same as [`compile`] for a pattern already in postfix form.
pub fn compile_postfix(postfix: &str, alphabet: &Alphabet) -> Result<Compiled> {
    let tree = SyntaxTree::from_postfix(postfix, alphabet)?;
    let followpos = Followpos::compute(&tree);
    let dfa = Dfa::construct(&tree, &followpos, alphabet);
    let minimized = minimize(dfa.table());
    Ok(Compiled {
        alphabet: alphabet.clone(),
        postfix: postfix.to_owned(),
        tree,
        followpos,
        dfa,
        minimized,
    })
}

impl Compiled {
    /// Runs `lexeme` through the minimized DFA.
    pub fn simulate<F>(&self, lexeme: &str, classify: F) -> Simulation<'_>
    where
        F: Fn(char) -> Option<char>,
    {
        simulate(self.minimized.table(), lexeme, classify)
    }

    /// Whether `lexeme` matches, classifying characters with [`java_class`].
    ///
    /// `java_class` only produces `L` and `D`, so this is meant for patterns
    /// over [`Alphabet::identifier`]; for any other alphabet every lexeme
    /// with at least one character is rejected. Use [`Compiled::simulate`]
    /// with a matching classifier instead.
    pub fn matches(&self, lexeme: &str) -> bool {
        self.simulate(lexeme, java_class).is_accepted()
    }
}
