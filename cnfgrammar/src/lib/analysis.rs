use std::{collections::BTreeSet, ops::Deref};

use vob::Vob;

use crate::{Grammar, GrammarWarning, GrammarWarningKind, NIdx, NonTerminal, Symbol};

/// Performs an analysis on a given `Subject`, the given subject may be known to have
/// pre-existing problems.
pub trait Analysis<Subject> {
    /// Perform an analysis on a given subject. The mechanisms by which you retrieve the results
    /// of an analysis are not specified by the trait, and particular to the types that
    /// implement the trait.
    fn analyse(&mut self, subject: &Subject);
}

/// Which non-terminals can be reached from the start non-terminal? A non-terminal `N` is
/// reachable if it is the start non-terminal, or if it appears in the body of a production of
/// a reachable non-terminal.
#[derive(Debug)]
pub struct Reachability {
    reachable: Vob,
}

impl Reachability {
    pub fn new(grm: &Grammar) -> Self {
        let mut r = Reachability {
            reachable: Vob::new(),
        };
        r.analyse(grm);
        r
    }

    /// Is `nidx` reachable from the start non-terminal? Panics if `nidx` doesn't exist.
    pub fn is_reachable(&self, nidx: NIdx) -> bool {
        self.reachable[usize::from(nidx)]
    }
}

impl Analysis<Grammar> for Reachability {
    fn analyse(&mut self, grm: &Grammar) {
        self.reachable = Vob::from_elem(false, grm.non_terminals_len());
        let start = grm.start_nidx();
        self.reachable.set(usize::from(start), true);
        let mut todo = vec![start];
        while let Some(nidx) = todo.pop() {
            for &pidx in grm.nt_to_prods(nidx) {
                for nt in grm.prod(pidx).non_terminals() {
                    // Every non-terminal in a body is in the grammar's index.
                    let Some(s_nidx) = grm.nidx(nt) else {
                        continue;
                    };
                    if !self.reachable[usize::from(s_nidx)] {
                        self.reachable.set(usize::from(s_nidx), true);
                        todo.push(s_nidx);
                    }
                }
            }
        }
    }
}

/// Which non-terminals are productive, i.e. can derive at least one finite string of
/// terminals? A non-terminal is productive if one of its productions contains only terminals
/// (an empty production counts) or only terminals and productive non-terminals.
#[derive(Debug)]
pub struct Productivity {
    productive: Vob,
}

impl Productivity {
    pub fn new(grm: &Grammar) -> Self {
        let mut p = Productivity {
            productive: Vob::new(),
        };
        p.analyse(grm);
        p
    }

    /// Is `nidx` productive? Panics if `nidx` doesn't exist.
    pub fn is_productive(&self, nidx: NIdx) -> bool {
        self.productive[usize::from(nidx)]
    }
}

impl Analysis<Grammar> for Productivity {
    fn analyse(&mut self, grm: &Grammar) {
        self.productive = Vob::from_elem(false, grm.non_terminals_len());
        // Keep passing over the productions of not-yet-productive non-terminals until no new
        // non-terminal becomes productive.
        loop {
            let mut changed = false;
            for pidx in grm.iter_pidxs() {
                let nidx = grm.prod_to_nt(pidx);
                if self.productive[usize::from(nidx)] {
                    continue;
                }
                let all_productive = grm.prod(pidx).body().iter().all(|sym| match sym {
                    Symbol::Terminal(_) => true,
                    Symbol::NonTerminal(nt) => grm
                        .nidx(nt)
                        .is_some_and(|s_nidx| self.productive[usize::from(s_nidx)]),
                });
                if all_productive {
                    self.productive.set(usize::from(nidx), true);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }
}

/// Which non-terminals are nullable, i.e. can derive the empty string? A non-terminal is
/// nullable if one of its productions is empty or consists only of nullable non-terminals.
#[derive(Debug)]
pub struct Nullability {
    nullable: Vob,
}

impl Nullability {
    pub fn new(grm: &Grammar) -> Self {
        let mut n = Nullability {
            nullable: Vob::new(),
        };
        n.analyse(grm);
        n
    }

    /// Is `nidx` nullable? Panics if `nidx` doesn't exist.
    pub fn is_nullable(&self, nidx: NIdx) -> bool {
        self.nullable[usize::from(nidx)]
    }
}

impl Analysis<Grammar> for Nullability {
    fn analyse(&mut self, grm: &Grammar) {
        self.nullable = Vob::from_elem(false, grm.non_terminals_len());
        loop {
            let mut changed = false;
            for pidx in grm.iter_pidxs() {
                let nidx = grm.prod_to_nt(pidx);
                if self.nullable[usize::from(nidx)] {
                    continue;
                }
                let all_nullable = grm.prod(pidx).body().iter().all(|sym| match sym {
                    Symbol::Terminal(_) => false,
                    Symbol::NonTerminal(nt) => grm
                        .nidx(nt)
                        .is_some_and(|s_nidx| self.nullable[usize::from(s_nidx)]),
                });
                if all_nullable {
                    self.nullable.set(usize::from(nidx), true);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }
}

/// Collects the structural warnings for a grammar. The warnings are ordered by kind (in the
/// order of [`GrammarWarningKind`]'s variants) and then by non-terminal name.
///
/// For the results, this `Analysis` can be dereferenced into a slice of `GrammarWarning`s.
#[derive(Debug, Default)]
pub struct GrammarWarningAnalysis {
    warnings: Vec<GrammarWarning>,
}

impl GrammarWarningAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_warnings(self) -> Vec<GrammarWarning> {
        self.warnings
    }

    fn push_all<'a, I>(&mut self, kind: GrammarWarningKind, nts: I)
    where
        I: IntoIterator<Item = &'a NonTerminal>,
    {
        self.warnings
            .extend(nts.into_iter().map(|nt| GrammarWarning::new(kind, nt.clone())));
    }
}

impl Deref for GrammarWarningAnalysis {
    type Target = Vec<GrammarWarning>;

    fn deref(&self) -> &Self::Target {
        &self.warnings
    }
}

impl Analysis<Grammar> for GrammarWarningAnalysis {
    fn analyse(&mut self, grm: &Grammar) {
        if grm.nt_to_prods(grm.start_nidx()).is_empty() {
            self.push_all(GrammarWarningKind::MissingStartProduction, [grm.start()]);
        }

        let undefined = grm
            .iter_nidxs()
            .filter(|&nidx| nidx != grm.start_nidx() && grm.nt_to_prods(nidx).is_empty())
            .map(|nidx| grm.non_terminal(nidx))
            .collect::<BTreeSet<_>>();
        self.push_all(GrammarWarningKind::UndefinedNonTerminal, undefined);

        self.push_all(
            GrammarWarningKind::UnreachableNonTerminal,
            grm.unreachable_non_terminals(),
        );
        self.push_all(
            GrammarWarningKind::UnterminatedNonTerminal,
            grm.unterminated_non_terminals(),
        );

        let unknown = grm
            .normalization_non_terminals()
            .iter()
            .filter(|nt| !grm.mentions(nt))
            .collect::<BTreeSet<_>>();
        self.push_all(GrammarWarningKind::UnknownNormalizationNonTerminal, unknown);
    }
}

#[cfg(test)]
mod test {
    use super::{Analysis, GrammarWarningAnalysis, Nullability, Productivity, Reachability};
    use crate::{Grammar, GrammarWarningKind, NonTerminal, Production, Symbol, Terminal};

    fn nt(n: &str) -> Symbol {
        Symbol::NonTerminal(NonTerminal::new(n))
    }

    fn t(v: &str) -> Symbol {
        Symbol::Terminal(Terminal::new(v))
    }

    fn prod(pattern: &str, body: Vec<Symbol>) -> Production {
        Production::new(NonTerminal::new(pattern), body)
    }

    fn grammar(start: &str, prods: Vec<Production>) -> Grammar {
        Grammar::new(prods, NonTerminal::new(start))
    }

    #[test]
    fn test_reachability() {
        let grm = grammar(
            "S",
            vec![
                prod("S", vec![nt("A")]),
                prod("A", vec![nt("A"), t("a")]),
                prod("B", vec![t("z")]),
            ],
        );
        let r = Reachability::new(&grm);
        let idx = |n: &str| grm.nidx(&NonTerminal::new(n)).unwrap();
        assert!(r.is_reachable(idx("S")));
        assert!(r.is_reachable(idx("A")));
        assert!(!r.is_reachable(idx("B")));
    }

    #[test]
    fn test_productivity() {
        let grm = grammar(
            "S",
            vec![
                prod("S", vec![nt("A"), nt("B")]),
                prod("A", vec![t("a")]),
                prod("B", vec![nt("B"), t("b")]),
                prod("C", vec![]),
            ],
        );
        let p = Productivity::new(&grm);
        let idx = |n: &str| grm.nidx(&NonTerminal::new(n)).unwrap();
        assert!(p.is_productive(idx("A")));
        assert!(p.is_productive(idx("C")));
        assert!(!p.is_productive(idx("B")));
        assert!(!p.is_productive(idx("S")));
    }

    #[test]
    fn test_productivity_chain() {
        // Productivity only propagates backwards through several passes.
        let grm = grammar(
            "S",
            vec![
                prod("S", vec![nt("A"), nt("A")]),
                prod("A", vec![nt("B")]),
                prod("B", vec![nt("C"), t("x")]),
                prod("C", vec![t("c")]),
            ],
        );
        let p = Productivity::new(&grm);
        assert!(grm.iter_nidxs().all(|nidx| p.is_productive(nidx)));
    }

    #[test]
    fn test_nullability() {
        let grm = grammar(
            "S",
            vec![
                prod("S", vec![nt("A"), nt("B")]),
                prod("A", vec![]),
                prod("B", vec![nt("A")]),
                prod("B", vec![t("b")]),
                prod("C", vec![nt("A"), t("c")]),
            ],
        );
        let n = Nullability::new(&grm);
        let idx = |s: &str| grm.nidx(&NonTerminal::new(s)).unwrap();
        assert!(n.is_nullable(idx("A")));
        assert!(n.is_nullable(idx("B")));
        assert!(n.is_nullable(idx("S")));
        assert!(!n.is_nullable(idx("C")));
    }

    #[test]
    fn test_reanalyse() {
        let small = grammar("S", vec![prod("S", vec![t("a")])]);
        let mut r = Reachability::new(&small);
        assert!(r.is_reachable(small.start_nidx()));
        let bigger = grammar("S", vec![prod("S", vec![t("a")]), prod("X", vec![t("x")])]);
        r.analyse(&bigger);
        assert!(!r.is_reachable(bigger.nidx(&NonTerminal::new("X")).unwrap()));
    }

    #[test]
    fn test_warning_order() {
        let grm = grammar(
            "S",
            vec![
                prod("Z", vec![nt("Y")]),
                prod("A", vec![t("a")]),
                prod("S", vec![nt("S"), nt("U")]),
            ],
        );
        let mut analysis = GrammarWarningAnalysis::new();
        analysis.analyse(&grm);
        let found = analysis
            .iter()
            .map(|w| (w.kind(), w.non_terminal().name()))
            .collect::<Vec<_>>();
        assert_eq!(
            found,
            vec![
                (GrammarWarningKind::UndefinedNonTerminal, "U"),
                (GrammarWarningKind::UndefinedNonTerminal, "Y"),
                (GrammarWarningKind::UnreachableNonTerminal, "A"),
                (GrammarWarningKind::UnreachableNonTerminal, "Z"),
                (GrammarWarningKind::UnterminatedNonTerminal, "S"),
                (GrammarWarningKind::UnterminatedNonTerminal, "Z"),
            ]
        );
    }

    #[test]
    fn test_missing_start() {
        let grm = grammar("S", vec![prod("A", vec![t("a")])]);
        let mut analysis = GrammarWarningAnalysis::new();
        analysis.analyse(&grm);
        assert_eq!(analysis[0].kind(), GrammarWarningKind::MissingStartProduction);
        assert_eq!(analysis[0].non_terminal(), &NonTerminal::new("S"));
        assert_eq!(analysis[1].kind(), GrammarWarningKind::UnreachableNonTerminal);
        assert_eq!(analysis.len(), 2);
    }

    #[test]
    fn test_unknown_normalization() {
        let grm = Grammar::new_normalized(
            vec![
                prod("S", vec![nt("A"), nt("S_1")]),
                prod("S_1", vec![nt("A"), nt("A")]),
                prod("A", vec![t("a")]),
            ],
            NonTerminal::new("S"),
            [NonTerminal::new("S_1"), NonTerminal::new("Q_9")],
        );
        let mut analysis = GrammarWarningAnalysis::new();
        analysis.analyse(&grm);
        assert_eq!(analysis.len(), 1);
        assert_eq!(
            analysis[0].kind(),
            GrammarWarningKind::UnknownNormalizationNonTerminal
        );
        assert_eq!(analysis[0].non_terminal(), &NonTerminal::new("Q_9"));
    }
}
