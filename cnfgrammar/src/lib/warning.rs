use std::{error::Error, fmt};

use crate::NonTerminal;

/// The various different possible structural grammar warnings. None of these prevent a
/// [`Grammar`](crate::Grammar) from being constructed: a non-terminal may be dormant on
/// purpose, e.g. while a grammar is being written incrementally.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum GrammarWarningKind {
    /// No production has the start non-terminal as its pattern.
    MissingStartProduction,
    /// A non-terminal is referenced in a body but has no productions.
    UndefinedNonTerminal,
    /// A non-terminal with productions can not be reached from the start non-terminal.
    UnreachableNonTerminal,
    /// A non-terminal with productions can not derive any finite string of terminals.
    UnterminatedNonTerminal,
    /// A normalization non-terminal does not appear anywhere in the grammar's productions.
    UnknownNormalizationNonTerminal,
}

/// A structural warning about a grammar, naming the non-terminal it concerns.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct GrammarWarning {
    pub(crate) kind: GrammarWarningKind,
    pub(crate) non_terminal: NonTerminal,
}

impl GrammarWarning {
    pub(crate) fn new(kind: GrammarWarningKind, non_terminal: NonTerminal) -> Self {
        GrammarWarning { kind, non_terminal }
    }

    pub fn kind(&self) -> GrammarWarningKind {
        self.kind
    }

    pub fn non_terminal(&self) -> &NonTerminal {
        &self.non_terminal
    }
}

impl fmt::Display for GrammarWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let nt = &self.non_terminal;
        match self.kind {
            GrammarWarningKind::MissingStartProduction => {
                write!(f, "Start non-terminal {} has no productions", nt)
            }
            GrammarWarningKind::UndefinedNonTerminal => {
                write!(f, "Non-terminal {} is used but has no productions", nt)
            }
            GrammarWarningKind::UnreachableNonTerminal => write!(
                f,
                "Non-terminal {} is unreachable from the start non-terminal",
                nt
            ),
            GrammarWarningKind::UnterminatedNonTerminal => write!(
                f,
                "Non-terminal {} cannot derive a finite string of terminals",
                nt
            ),
            GrammarWarningKind::UnknownNormalizationNonTerminal => write!(
                f,
                "Normalization non-terminal {} does not appear in the grammar",
                nt
            ),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum GrammarErrorKind {
    /// A warning which [`GrammarInfo`](crate::GrammarInfo) was configured to treat as an error.
    Warning(GrammarWarningKind),
}

/// Any error from grammar construction returns an instance of this struct.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GrammarError {
    pub kind: GrammarErrorKind,
    pub non_terminal: NonTerminal,
}

impl Error for GrammarError {}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            GrammarErrorKind::Warning(kind) => {
                GrammarWarning::new(kind, self.non_terminal.clone()).fmt(f)
            }
        }
    }
}

impl From<GrammarWarning> for GrammarError {
    fn from(w: GrammarWarning) -> GrammarError {
        GrammarError {
            kind: GrammarErrorKind::Warning(w.kind),
            non_terminal: w.non_terminal,
        }
    }
}
