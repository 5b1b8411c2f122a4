use std::fmt;

use crate::dfa::{StateId, TransitionTable};

/// One consumed character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub from: StateId,
    pub ch: char,
    pub symbol: char,
    pub to: StateId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Input ran out in a non-accepting state.
    NotAccepting,
    /// The character at `index` belongs to no alphabet class.
    UnmappedCharacter { index: usize, ch: char },
    /// No transition from the current state on the character's class.
    UndefinedTransition { index: usize, ch: char, symbol: char },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected(Rejection),
}

/// Transcript of running one lexeme through a transition table.
#[derive(Debug, Clone)]
pub struct Simulation<'a> {
    table: &'a TransitionTable,
    lexeme: String,
    steps: Vec<Step>,
    state: StateId,
    outcome: Outcome,
}

/// Walks `lexeme` through `table` one character at a time.
///
/// `classify` maps each character to its abstract symbol. Stops at the
/// first unmapped character or undefined transition; both are rejections,
/// not errors. The table is only read.
pub fn simulate<'a, F>(table: &'a TransitionTable, lexeme: &str, classify: F) -> Simulation<'a>
where
    F: Fn(char) -> Option<char>,
{
    let mut state = table.start();
    let mut steps = Vec::new();
    let mut rejection = None;

    for (index, ch) in lexeme.chars().enumerate() {
        let symbol = match classify(ch) {
            Some(symbol) => symbol,
            None => {
                rejection = Some(Rejection::UnmappedCharacter { index, ch });
                break;
            }
        };
        match table.next(state, symbol) {
            Some(to) => {
                trace!(
                    "{} --('{}' as {})--> {}",
                    table.name(state).unwrap_or("?"),
                    ch,
                    symbol,
                    table.name(to).unwrap_or("?")
                );
                steps.push(Step {
                    from: state,
                    ch,
                    symbol,
                    to,
                });
                state = to;
            }
            None => {
                rejection = Some(Rejection::UndefinedTransition { index, ch, symbol });
                break;
            }
        }
    }

    let outcome = match rejection {
        Some(r) => Outcome::Rejected(r),
        None if table.is_accepting(state) => Outcome::Accepted,
        None => Outcome::Rejected(Rejection::NotAccepting),
    };
    debug!("{:?}: {:?} after {} steps", lexeme, outcome, steps.len());

    Simulation {
        table,
        lexeme: lexeme.to_owned(),
        steps,
        state,
        outcome,
    }
}

impl<'a> Simulation<'a> {
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// State the walk stopped in.
    pub fn final_state(&self) -> StateId {
        self.state
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_accepted(&self) -> bool {
        self.outcome == Outcome::Accepted
    }
}

impl<'a> fmt::Display for Simulation<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = |s: StateId| self.table.name(s).unwrap_or("?");
        for step in &self.steps {
            writeln!(
                f,
                "{} --('{}' as {})--> {}",
                name(step.from),
                step.ch,
                step.symbol,
                name(step.to)
            )?;
        }
        match self.outcome {
            Outcome::Accepted => write!(f, "final state {}: ACCEPTED", name(self.state)),
            Outcome::Rejected(Rejection::NotAccepting) => {
                write!(f, "final state {}: REJECTED", name(self.state))
            }
            Outcome::Rejected(Rejection::UnmappedCharacter { ch, .. }) => write!(
                f,
                "{} --('{}')--> REJECTED (unmapped character)",
                name(self.state),
                ch
            ),
            Outcome::Rejected(Rejection::UndefinedTransition { ch, symbol, .. }) => write!(
                f,
                "{} --('{}' as {})--> REJECTED (pattern break)",
                name(self.state),
                ch,
                symbol
            ),
        }
    }
}

#[cfg(test)]
use crate::alphabet::{java_class, Alphabet};
#[cfg(test)]
use crate::dfa::Dfa;
#[cfg(test)]
use crate::followpos::Followpos;
#[cfg(test)]
use crate::tree::SyntaxTree;

#[cfg(test)]
fn identifier_dfa() -> Dfa {
    let alphabet = Alphabet::identifier();
    let tree = SyntaxTree::from_postfix("LLD|*.#.", &alphabet).unwrap();
    let followpos = Followpos::compute(&tree);
    Dfa::construct(&tree, &followpos, &alphabet)
}

#[test]
fn identifier_is_accepted() {
    let dfa = identifier_dfa();
    let run = simulate(dfa.table(), "PotionBrewer", java_class);
    assert!(run.is_accepted());
    assert_eq!(run.steps().len(), 12);
    assert!(run.steps().iter().all(|s| s.symbol == 'L'));
    assert_eq!(run.final_state(), 1);
    assert!(run.to_string().ends_with("final state S1: ACCEPTED"));
}

#[test]
fn leading_digit_breaks_the_pattern() {
    let dfa = identifier_dfa();
    let run = simulate(dfa.table(), "3x", java_class);
    assert!(run.steps().is_empty());
    assert_eq!(
        run.outcome(),
        Outcome::Rejected(Rejection::UndefinedTransition {
            index: 0,
            ch: '3',
            symbol: 'D'
        })
    );
    assert_eq!(run.to_string(), "S0 --('3' as D)--> REJECTED (pattern break)");
}

#[test]
fn unmapped_character_rejects() {
    let dfa = identifier_dfa();
    let run = simulate(dfa.table(), "ab.c", java_class);
    assert_eq!(run.steps().len(), 2);
    assert_eq!(
        run.outcome(),
        Outcome::Rejected(Rejection::UnmappedCharacter { index: 2, ch: '.' })
    );
}

#[test]
fn empty_lexeme_stops_in_start_state() {
    let dfa = identifier_dfa();
    let run = simulate(dfa.table(), "", java_class);
    assert_eq!(run.final_state(), 0);
    assert_eq!(run.outcome(), Outcome::Rejected(Rejection::NotAccepting));
    assert_eq!(run.to_string(), "final state S0: REJECTED");
}
