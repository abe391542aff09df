//! The BNF-like textual form of a grammar. For example, the grammar with productions
//! `S -> S "+" S`, `S -> "a"`, and `A -> ` renders as:
//!
//! ```text
//! <A> ::= ""
//! <S> ::= "a" | <S> "+" <S>
//! ```
//!
//! Productions are grouped by pattern and groups are sorted by non-terminal name (ordinal
//! comparison). Within a group, alternatives are sorted by [`Production`]'s ordering (an empty
//! body first, terminals before non-terminals) and duplicates are dropped. Equal grammars
//! therefore always render identically, whatever order their productions were supplied in.
//! This format is output only: nothing in this crate parses it back.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::{Grammar, NonTerminal, Production};

/// Quote `s` as a literal. The delimiter is `"` unless `s` contains a `"`, in which case it is
/// `'`. Backslashes and the delimiter are escaped with a backslash; newlines, carriage returns,
/// and tabs are written as `\n`, `\r`, and `\t` so that a literal never spans lines.
pub fn quote_literal(s: &str) -> String {
    let delim = if s.contains('"') { '\'' } else { '"' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

/// Group `prods` by pattern. Groups are ordered by name, and each group's alternatives are
/// deduplicated and sorted.
fn groups(prods: &[Production]) -> BTreeMap<&NonTerminal, BTreeSet<&Production>> {
    let mut groups = BTreeMap::<&NonTerminal, BTreeSet<&Production>>::new();
    for prod in prods {
        groups.entry(prod.pattern()).or_default().insert(prod);
    }
    groups
}

/// Write `<name> ::= alt1 | alt2 | ...` for `nt`.
fn write_group(
    f: &mut fmt::Formatter,
    nt: &NonTerminal,
    alts: &BTreeSet<&Production>,
) -> fmt::Result {
    write!(f, "{} ::=", nt)?;
    for (i, prod) in alts.iter().enumerate() {
        if i > 0 {
            f.write_str(" |")?;
        }
        write!(f, " {}", prod.pp_body())?;
    }
    Ok(())
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, (nt, alts)) in groups(self.prods()).iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write_group(f, nt, alts)?;
        }
        Ok(())
    }
}

impl Grammar {
    /// The textual form of this grammar. Identical to its `Display` output.
    pub fn description(&self) -> String {
        self.to_string()
    }
}
