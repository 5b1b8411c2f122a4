/// Reserved end-of-pattern marker. Never a member of an [`Alphabet`].
pub const END_MARKER: char = '#';

const OPERATORS: &[char] = &['(', ')', '|', '.', '*'];

/// Abstract symbol for the letter class.
pub const LETTER: char = 'L';
/// Abstract symbol for the digit class.
pub const DIGIT: char = 'D';

/// The finite set of abstract symbols a pattern is written over.
///
/// Order matters: the DFA constructor visits symbols in this order, so it
/// fixes the order in which new states are discovered and named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Builds an alphabet from `symbols`, dropping duplicates, `#` and the
    /// pattern operators `( ) | . *`.
    pub fn new<I: IntoIterator<Item = char>>(symbols: I) -> Self {
        let mut out: Vec<char> = Vec::new();
        for c in symbols {
            if c != END_MARKER
                && !OPERATORS.contains(&c)
                && !c.is_whitespace()
                && !out.contains(&c)
            {
                out.push(c);
            }
        }
        Alphabet { symbols: out }
    }

    /// `L` (letter) and `D` (digit), the alphabet of identifier patterns.
    pub fn identifier() -> Self {
        Alphabet::new([LETTER, DIGIT])
    }

    pub fn contains(&self, c: char) -> bool {
        self.symbols.contains(&c)
    }

    /// True for alphabet members and for the end marker.
    pub fn is_operand(&self, c: char) -> bool {
        c == END_MARKER || self.contains(c)
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Maps a source character onto the `L`/`D` alphabet.
///
/// Letters and `_` map to `L`, decimal digits to `D`, anything else is
/// unmapped.
pub fn java_class(c: char) -> Option<char> {
    if c.is_alphabetic() || c == '_' {
        Some(LETTER)
    } else if c.is_ascii_digit() {
        Some(DIGIT)
    } else {
        None
    }
}

#[test]
fn identifier_alphabet_excludes_end_marker() {
    let alphabet = Alphabet::new("LD#L".chars());
    assert_eq!(alphabet.symbols(), &['L', 'D']);
    assert!(!alphabet.contains('#'));
    assert!(alphabet.is_operand('#'));
    assert_eq!(alphabet, Alphabet::identifier());
}

#[test]
fn operators_never_become_symbols() {
    let alphabet = Alphabet::new("a*(b)|.".chars());
    assert_eq!(alphabet.symbols(), &['a', 'b']);
    assert!(!alphabet.is_operand('*'));
}

#[test]
fn java_class_maps_letters_and_digits() {
    assert_eq!(java_class('P'), Some('L'));
    assert_eq!(java_class('_'), Some('L'));
    assert_eq!(java_class('7'), Some('D'));
    assert_eq!(java_class('.'), None);
    assert_eq!(java_class(' '), None);
}
