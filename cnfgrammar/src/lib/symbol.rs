use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::description::quote_literal;

/// A literal value in the language being defined. Two terminals are equal iff their values are
/// equal.
#[derive(Clone, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Terminal(String);

impl Terminal {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Terminal(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Renders as a quoted, escaped literal, e.g. `"a"`.
impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&quote_literal(&self.0))
    }
}

/// A named placeholder which expands via productions. Equality and ordering are by name, using
/// ordinal (byte) comparison.
#[derive(Clone, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NonTerminal(String);

impl NonTerminal {
    pub fn new<S: Into<String>>(name: S) -> Self {
        NonTerminal(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Renders as `<name>`.
impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

#[derive(Clone, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }

    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Symbol::Terminal(t) => Some(t),
            Symbol::NonTerminal(_) => None,
        }
    }

    pub fn as_non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::Terminal(_) => None,
            Symbol::NonTerminal(nt) => Some(nt),
        }
    }
}

impl From<Terminal> for Symbol {
    fn from(t: Terminal) -> Self {
        Symbol::Terminal(t)
    }
}

impl From<NonTerminal> for Symbol {
    fn from(nt: NonTerminal) -> Self {
        Symbol::NonTerminal(nt)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => t.fmt(f),
            Symbol::NonTerminal(nt) => nt.fmt(f),
        }
    }
}

/// A single rewrite rule: `pattern` may be replaced by the symbols in `body`. Productions are
/// immutable once created; two productions are equal iff their patterns and (ordered) bodies
/// are equal.
#[derive(Clone, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Production {
    pattern: NonTerminal,
    body: Vec<Symbol>,
}

impl Production {
    pub fn new(pattern: NonTerminal, body: Vec<Symbol>) -> Self {
        Production { pattern, body }
    }

    pub fn pattern(&self) -> &NonTerminal {
        &self.pattern
    }

    pub fn body(&self) -> &[Symbol] {
        &self.body
    }

    /// Does this production's body consist of exactly one terminal and nothing else?
    pub fn is_final(&self) -> bool {
        matches!(self.body.as_slice(), [Symbol::Terminal(_)])
    }

    /// Is this an empty (epsilon) production?
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// How many terminals does the body contain?
    pub fn terminal_count(&self) -> usize {
        self.body.iter().filter(|sym| sym.is_terminal()).count()
    }

    /// How many non-terminals does the body contain?
    pub fn non_terminal_count(&self) -> usize {
        self.body.iter().filter(|sym| sym.is_non_terminal()).count()
    }

    /// Iterate over the non-terminals of the body, in order (duplicates included).
    pub fn non_terminals(&self) -> impl Iterator<Item = &NonTerminal> {
        self.body.iter().filter_map(Symbol::as_non_terminal)
    }

    /// Render the body alone: symbols separated by a single space, with an empty body rendered
    /// as `""`.
    pub fn pp_body(&self) -> String {
        if self.body.is_empty() {
            return quote_literal("");
        }
        self.body
            .iter()
            .map(|sym| sym.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Renders as `<pattern> ::= body`.
impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ::= {}", self.pattern, self.pp_body())
    }
}

#[cfg(test)]
mod test {
    use super::{NonTerminal, Production, Symbol, Terminal};

    fn nt(n: &str) -> Symbol {
        Symbol::NonTerminal(NonTerminal::new(n))
    }

    fn t(v: &str) -> Symbol {
        Symbol::Terminal(Terminal::new(v))
    }

    fn prod(pattern: &str, body: Vec<Symbol>) -> Production {
        Production::new(NonTerminal::new(pattern), body)
    }

    #[test]
    fn test_is_final() {
        assert!(prod("A", vec![t("a")]).is_final());
        assert!(!prod("A", vec![t("a"), t("b")]).is_final());
        assert!(!prod("A", vec![nt("B")]).is_final());
        assert!(!prod("A", vec![]).is_final());
    }

    #[test]
    fn test_counts() {
        let p = prod("S", vec![nt("S"), t("+"), nt("S")]);
        assert_eq!(p.terminal_count(), 1);
        assert_eq!(p.non_terminal_count(), 2);
        assert_eq!(
            p.non_terminals().map(|n| n.name()).collect::<Vec<_>>(),
            vec!["S", "S"]
        );
        let e = prod("S", vec![]);
        assert!(e.is_empty());
        assert_eq!(e.terminal_count(), 0);
        assert_eq!(e.non_terminal_count(), 0);
    }

    #[test]
    fn test_equality_is_ordered() {
        assert_eq!(prod("A", vec![nt("B"), nt("C")]), prod("A", vec![nt("B"), nt("C")]));
        assert_ne!(prod("A", vec![nt("B"), nt("C")]), prod("A", vec![nt("C"), nt("B")]));
        assert_ne!(prod("A", vec![t("x")]), prod("B", vec![t("x")]));
        // A terminal and a non-terminal sharing a string are different symbols.
        assert_ne!(t("x"), nt("x"));
    }

    #[test]
    fn test_display() {
        assert_eq!(NonTerminal::new("expr").to_string(), "<expr>");
        assert_eq!(Terminal::new("+").to_string(), "\"+\"");
        assert_eq!(
            prod("S", vec![nt("S"), t("+"), nt("S")]).to_string(),
            "<S> ::= <S> \"+\" <S>"
        );
        assert_eq!(prod("S", vec![]).to_string(), "<S> ::= \"\"");
    }

    #[test]
    fn test_symbol_conversions() {
        let s = Symbol::from(NonTerminal::new("A"));
        assert_eq!(s.as_non_terminal(), Some(&NonTerminal::new("A")));
        assert_eq!(s.as_terminal(), None);
        let s = Symbol::from(Terminal::new("a"));
        assert!(s.is_terminal());
        assert_eq!(s.as_terminal().map(|t| t.value()), Some("a"));
    }
}
