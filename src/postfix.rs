use std::collections::HashMap;

use crate::alphabet::Alphabet;
use crate::error::{Error, Result};

pub const STAR: char = '*';
pub const CONCAT: char = '.';
pub const UNION: char = '|';
const LPAREN: char = '(';
const RPAREN: char = ')';

lazy_static! {
    static ref PRECEDENCE: HashMap<char, u8> = {
        let mut m = HashMap::new();
        m.insert(STAR, 3);
        m.insert(CONCAT, 2);
        m.insert(UNION, 1);
        m.insert(LPAREN, 0);
        m
    };
}

fn precedence(op: char) -> u8 {
    PRECEDENCE.get(&op).cloned().unwrap_or(0)
}

/// Converts an infix pattern to postfix with the shunting-yard algorithm.
///
/// Operands are the members of `alphabet` and `#`. Concatenation is written
/// explicitly with `.`; whitespace is ignored. Operators of equal or higher
/// precedence are popped before a new one is pushed, so every binary
/// operator is left-associative.
///
/// Operands and operators must alternate: an operator where an operand is
/// expected is a `MissingOperand` error and two adjacent operands are a
/// `MissingOperator` error, both with offsets into `infix`.
pub fn to_postfix(infix: &str, alphabet: &Alphabet) -> Result<String> {
    let mut output = String::with_capacity(infix.len());
    // (operator, offset in the infix text)
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut expect_operand = true;
    let mut last: Option<(char, usize)> = None;

    for (offset, c) in infix.chars().enumerate() {
        if c.is_whitespace() {
            continue;
        }
        if alphabet.is_operand(c) {
            if !expect_operand {
                return Err(Error::MissingOperator { offset });
            }
            output.push(c);
            expect_operand = false;
            last = Some((c, offset));
            continue;
        }
        match c {
            LPAREN => {
                if !expect_operand {
                    return Err(Error::MissingOperator { offset });
                }
                stack.push((c, offset));
            }
            RPAREN => {
                if expect_operand {
                    return Err(Error::MissingOperand { op: c, offset });
                }
                loop {
                    match stack.pop() {
                        Some((LPAREN, _)) => break,
                        Some((op, _)) => output.push(op),
                        None => return Err(Error::UnbalancedParen { offset }),
                    }
                }
            }
            STAR | CONCAT | UNION => {
                if expect_operand {
                    return Err(Error::MissingOperand { op: c, offset });
                }
                while let Some(&(top, _)) = stack.last() {
                    if precedence(top) < precedence(c) {
                        break;
                    }
                    output.push(top);
                    stack.pop();
                }
                stack.push((c, offset));
                // closure is postfix and leaves an operand behind
                expect_operand = c != STAR;
            }
            _ => return Err(Error::UnexpectedChar { ch: c, offset }),
        }
        last = Some((c, offset));
    }

    if expect_operand {
        if let Some((op, offset)) = last {
            return Err(Error::MissingOperand { op, offset });
        }
    }

    while let Some((op, offset)) = stack.pop() {
        if op == LPAREN {
            return Err(Error::UnbalancedParen { offset });
        }
        output.push(op);
    }

    debug!("postfix of {:?} is {:?}", infix, output);
    Ok(output)
}

#[test]
fn identifier_pattern_to_postfix() {
    let alphabet = Alphabet::identifier();
    let postfix = to_postfix("L . ( L | D )* . #", &alphabet).unwrap();
    assert_eq!(postfix, "LLD|*.#.");
}

#[test]
fn binary_operators_are_left_associative() {
    let alphabet = Alphabet::new("ab".chars());
    assert_eq!(to_postfix("a.b.a", &alphabet).unwrap(), "ab.a.");
    assert_eq!(to_postfix("a|b|a", &alphabet).unwrap(), "ab|a|");
    assert_eq!(to_postfix("a|b.a*", &alphabet).unwrap(), "aba*.|");
}

#[test]
fn parentheses_override_precedence() {
    let alphabet = Alphabet::new("ab".chars());
    assert_eq!(to_postfix("(a|b).a", &alphabet).unwrap(), "ab|a.");
    assert_eq!(to_postfix("(a.b)*", &alphabet).unwrap(), "ab.*");
}

#[test]
fn unbalanced_parentheses_are_rejected() {
    let alphabet = Alphabet::identifier();
    match to_postfix("(L.D", &alphabet) {
        Err(Error::UnbalancedParen { offset }) => assert_eq!(offset, 0),
        other => panic!("unexpected {:?}", other),
    }
    match to_postfix("L.D)", &alphabet) {
        Err(Error::UnbalancedParen { offset }) => assert_eq!(offset, 3),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn misplaced_operators_are_rejected() {
    let alphabet = Alphabet::identifier();
    match to_postfix("* L . #", &alphabet) {
        Err(Error::MissingOperand { op, offset }) => assert_eq!((op, offset), ('*', 0)),
        other => panic!("unexpected {:?}", other),
    }
    match to_postfix("L . * D . #", &alphabet) {
        Err(Error::MissingOperand { op, offset }) => assert_eq!((op, offset), ('*', 4)),
        other => panic!("unexpected {:?}", other),
    }
    match to_postfix("L . D | . #", &alphabet) {
        Err(Error::MissingOperand { op, offset }) => assert_eq!((op, offset), ('.', 8)),
        other => panic!("unexpected {:?}", other),
    }
    match to_postfix("L . ( ) . #", &alphabet) {
        Err(Error::MissingOperand { op, offset }) => assert_eq!((op, offset), (')', 6)),
        other => panic!("unexpected {:?}", other),
    }
    match to_postfix("L . #  |", &alphabet) {
        Err(Error::MissingOperand { op, offset }) => assert_eq!((op, offset), ('|', 7)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn adjacent_operands_need_an_operator() {
    let alphabet = Alphabet::identifier();
    match to_postfix("L D . #", &alphabet) {
        Err(Error::MissingOperator { offset }) => assert_eq!(offset, 2),
        other => panic!("unexpected {:?}", other),
    }
    match to_postfix("L* (D) . #", &alphabet) {
        Err(Error::MissingOperator { offset }) => assert_eq!(offset, 3),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(to_postfix("", &alphabet).unwrap(), "");
}

#[test]
fn unknown_characters_are_rejected() {
    let alphabet = Alphabet::identifier();
    match to_postfix("L.x", &alphabet) {
        Err(Error::UnexpectedChar { ch, offset }) => {
            assert_eq!(ch, 'x');
            assert_eq!(offset, 2);
        }
        other => panic!("unexpected {:?}", other),
    }
}
