//! A library for representing and validating Context Free Grammars (CFG), intended as the layer
//! beneath recognisers which need a grammar in a known shape (e.g. CYK-style recognisers, which
//! require Chomsky Normal Form). Parsing grammar source text, normalising grammars, and
//! recognising input are left to other crates: this library only provides the data model they
//! share and the checks they build upon.
//!
//! We use some basic terminology guidelines for major concepts:
//!
//!   * A *grammar* is an ordered sequence of *productions* plus a *start* non-terminal.
//!   * A *production* maps a *pattern* (a non-terminal) to a *body*: an ordered sequence of
//!     *symbols*.
//!   * A *symbol* is either a *terminal* (a literal value) or a *non-terminal* (a name).
//!
//! For example, in the following grammar:
//!
//! ```text
//!   <S> ::= <A> <B> | "c"
//!   <A> ::= "a"
//!   <B> ::= "b"
//! ```
//!
//! the following statements are true:
//!
//!   * There are 4 productions. 0: `<S> ::= <A> <B>` 1: `<S> ::= "c"` 2: `<A> ::= "a"`
//!     3: `<B> ::= "b"`.
//!   * Productions sharing a pattern are alternatives: `<S>` has two.
//!   * The grammar is in Chomsky Normal Form.
//!
//! cnfgrammar makes the following guarantees about grammars:
//!
//!   * Productions are numbered from `0` to `prods_len() - 1` (inclusive) in declaration order.
//!   * Non-terminals are numbered from `0` to `non_terminals_len() - 1` (inclusive); the start
//!     non-terminal is always `NIdx(0)`.
//!   * A [`Grammar`] never changes after construction.
//!
//! For most uses, the main function to investigate is [`Grammar::new()`], and
//! [`SyntaxError`] for reporting recognition failures.

pub mod analysis;
pub mod description;
pub mod diagnostics;
pub mod grammar;
mod idxnewtype;
pub mod info;
pub mod newlinecache;
pub mod span;
pub mod symbol;
pub mod warning;

pub use crate::{
    diagnostics::{DiagnosticFormatter, SyntaxError, SyntaxErrorKind},
    grammar::Grammar,
    idxnewtype::{NIdx, PIdx},
    info::{GrammarInfo, GrammarInfoBuilder},
    newlinecache::NewlineCache,
    span::Span,
    symbol::{NonTerminal, Production, Symbol, Terminal},
    warning::{GrammarError, GrammarErrorKind, GrammarWarning, GrammarWarningKind},
};
