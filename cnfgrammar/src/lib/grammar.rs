use std::{
    collections::BTreeSet,
    hash::{Hash, Hasher},
};

use indexmap::IndexSet;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use vob::Vob;

use crate::{
    GrammarError, GrammarInfo, GrammarWarning, NIdx, NonTerminal, PIdx, Production, Symbol,
    Terminal,
    analysis::{Analysis, GrammarWarningAnalysis, Nullability, Productivity, Reachability},
};

/// Representation of a context free grammar. See the [top-level documentation](../index.html)
/// for the guarantees this struct makes about productions and non-terminals.
///
/// Multiple productions may share a pattern: these are alternative expansions of that
/// non-terminal, so a grammar may be ambiguous. A `Grammar` is immutable once constructed: any
/// transformation (e.g. normalization) must build a new `Grammar`, which also means that a
/// single `Grammar` can be read from several threads at once without locking.
///
/// Equality (and hashing) is structural: two grammars are equal iff their start non-terminals
/// are equal and they contain the same set of productions, regardless of the order or
/// duplication of those productions. Normalization bookkeeping is not part of equality.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "SerializedGrammar", into = "SerializedGrammar")
)]
pub struct Grammar {
    /// All productions, in declaration order.
    prods: Vec<Production>,
    start: NonTerminal,
    /// Non-terminals synthesized by a normalization pass rather than written by a grammar author.
    normalization_nts: IndexSet<NonTerminal>,
    /// A mapping from `NIdx` -> `NonTerminal`. The start non-terminal is always first, followed
    /// by every other non-terminal in the order it first appears in `prods` (as a pattern or in
    /// a body).
    nts: IndexSet<NonTerminal>,
    /// A mapping from non-terminals to their productions, in declaration order. Non-terminals
    /// which only appear in bodies (and possibly the start non-terminal) have no productions.
    nts_prods: Vec<Vec<PIdx>>,
    /// A mapping from productions to the `NIdx` of their pattern.
    prods_nts: Vec<NIdx>,
    warnings: Vec<GrammarWarning>,
}

impl Grammar {
    /// Create a grammar from `prods` with start non-terminal `start`.
    ///
    /// Construction never fails: reachability and productivity problems are recorded as
    /// warnings, available from [`warnings()`](#method.warnings). Use
    /// [`new_with_info`](#method.new_with_info) to collect warnings elsewhere or to treat them
    /// as errors.
    pub fn new(prods: Vec<Production>, start: NonTerminal) -> Self {
        Grammar::new_normalized(prods, start, [])
    }

    /// As [`new`](#method.new), but hands every warning to `info`. If `info` treats warnings
    /// as errors, the first warning is returned as an error.
    pub fn new_with_info(
        prods: Vec<Production>,
        start: NonTerminal,
        info: &mut GrammarInfo,
    ) -> Result<Self, GrammarError> {
        let grm = Grammar::new(prods, start);
        for w in grm.warnings() {
            if let Some(e) = info.add_warning(w.clone()) {
                return Err(e);
            }
        }
        Ok(grm)
    }

    /// Create a grammar produced by a normalization pass. `normalization_nts` lists the
    /// non-terminals the pass synthesized; it is trusted rather than re-derived, though any
    /// entry which does not appear in `prods` is reported as a warning.
    pub fn new_normalized<I>(prods: Vec<Production>, start: NonTerminal, normalization_nts: I) -> Self
    where
        I: IntoIterator<Item = NonTerminal>,
    {
        let mut nts = IndexSet::new();
        nts.insert(start.clone());
        let mut prods_nts = Vec::with_capacity(prods.len());
        for prod in &prods {
            let (nidx, _) = nts.insert_full(prod.pattern().clone());
            prods_nts.push(NIdx(nidx));
            for nt in prod.non_terminals() {
                nts.insert(nt.clone());
            }
        }
        let mut nts_prods = vec![Vec::new(); nts.len()];
        for (pidx, nidx) in prods_nts.iter().enumerate() {
            nts_prods[usize::from(*nidx)].push(PIdx(pidx));
        }

        let mut grm = Grammar {
            prods,
            start,
            normalization_nts: normalization_nts.into_iter().collect(),
            nts,
            nts_prods,
            prods_nts,
            warnings: Vec::new(),
        };
        let mut analysis = GrammarWarningAnalysis::new();
        analysis.analyse(&grm);
        grm.warnings = analysis.into_warnings();
        grm
    }

    /// The warnings found when this grammar was constructed.
    pub fn warnings(&self) -> &[GrammarWarning] {
        &self.warnings
    }

    /// How many productions does this grammar have?
    pub fn prods_len(&self) -> usize {
        self.prods.len()
    }

    /// All productions, in declaration order.
    pub fn prods(&self) -> &[Production] {
        &self.prods
    }

    /// Return an iterator which produces (in order from `0..self.prods_len()`) all this
    /// grammar's valid `PIdx`s.
    pub fn iter_pidxs(&self) -> impl Iterator<Item = PIdx> + use<> {
        (0..self.prods.len()).map(PIdx)
    }

    /// Get production `pidx`. Panics if `pidx` doesn't exist.
    pub fn prod(&self, pidx: PIdx) -> &Production {
        &self.prods[usize::from(pidx)]
    }

    /// Return the `NIdx` of production `pidx`'s pattern. Panics if `pidx` doesn't exist.
    pub fn prod_to_nt(&self, pidx: PIdx) -> NIdx {
        self.prods_nts[usize::from(pidx)]
    }

    pub fn start(&self) -> &NonTerminal {
        &self.start
    }

    /// The index of the start non-terminal, which is always `NIdx(0)`.
    pub fn start_nidx(&self) -> NIdx {
        NIdx(0)
    }

    /// How many distinct non-terminals (including the start non-terminal) does this grammar
    /// mention?
    pub fn non_terminals_len(&self) -> usize {
        self.nts.len()
    }

    /// Return an iterator which produces (in order from `0..self.non_terminals_len()`) all this
    /// grammar's valid `NIdx`s.
    pub fn iter_nidxs(&self) -> impl Iterator<Item = NIdx> + use<> {
        (0..self.nts.len()).map(NIdx)
    }

    /// Return the non-terminal `nidx`. Panics if `nidx` doesn't exist.
    pub fn non_terminal(&self, nidx: NIdx) -> &NonTerminal {
        &self.nts[usize::from(nidx)]
    }

    /// Return the index of non-terminal `nt` or `None` if the grammar doesn't mention it.
    pub fn nidx(&self, nt: &NonTerminal) -> Option<NIdx> {
        self.nts.get_index_of(nt).map(NIdx)
    }

    /// Return the productions of non-terminal `nidx`. Panics if `nidx` doesn't exist.
    pub fn nt_to_prods(&self, nidx: NIdx) -> &[PIdx] {
        &self.nts_prods[usize::from(nidx)]
    }

    /// Iterate over the productions whose pattern is `nt`, in declaration order.
    pub fn prods_for<'a>(
        &'a self,
        nt: &NonTerminal,
    ) -> impl Iterator<Item = &'a Production> + use<'a> {
        self.nidx(nt)
            .map(|nidx| self.nt_to_prods(nidx))
            .unwrap_or_default()
            .iter()
            .map(|&pidx| self.prod(pidx))
    }

    /// The distinct terminals used by this grammar, in order of first appearance.
    pub fn terminals(&self) -> IndexSet<&Terminal> {
        self.prods
            .iter()
            .flat_map(|prod| prod.body().iter().filter_map(Symbol::as_terminal))
            .collect()
    }

    /// The non-terminals synthesized by a normalization pass (empty unless this grammar was
    /// created with [`new_normalized`](#method.new_normalized)).
    pub fn normalization_non_terminals(&self) -> &IndexSet<NonTerminal> {
        &self.normalization_nts
    }

    pub fn is_normalization_non_terminal(&self, nt: &NonTerminal) -> bool {
        self.normalization_nts.contains(nt)
    }

    /// Does `nt` appear anywhere in this grammar's productions (as a pattern or in a body)?
    pub fn mentions(&self, nt: &NonTerminal) -> bool {
        match self.nidx(nt) {
            None => false,
            Some(nidx) if nidx != self.start_nidx() => true,
            // The start non-terminal is always indexed, even if no production mentions it.
            Some(nidx) => {
                !self.nt_to_prods(nidx).is_empty()
                    || self
                        .prods
                        .iter()
                        .any(|prod| prod.non_terminals().any(|s_nt| s_nt == nt))
            }
        }
    }

    /// Is this grammar in Chomsky Normal Form? That is true iff every production is one of:
    ///   1. a single terminal (`<A> ::= "a"`);
    ///   2. exactly two non-terminals (`<A> ::= <B> <C>`);
    ///   3. empty, and its pattern is the start non-terminal (`<S> ::= ""`).
    ///
    /// Recognisers which require CNF should treat `false` as a precondition failure.
    pub fn is_in_chomsky_normal_form(&self) -> bool {
        self.prods.iter().all(|prod| self.is_cnf_prod(prod))
    }

    /// Iterate over the productions which prevent this grammar from being in Chomsky Normal
    /// Form.
    pub fn non_cnf_prods(&self) -> impl Iterator<Item = PIdx> + '_ {
        self.iter_pidxs()
            .filter(move |&pidx| !self.is_cnf_prod(self.prod(pidx)))
    }

    fn is_cnf_prod(&self, prod: &Production) -> bool {
        match prod.body() {
            [Symbol::Terminal(_)] => true,
            [Symbol::NonTerminal(_), Symbol::NonTerminal(_)] => true,
            [] => prod.pattern() == &self.start,
            _ => false,
        }
    }

    /// The non-terminals which have productions but can not be reached from the start
    /// non-terminal, ordered by name.
    pub fn unreachable_non_terminals(&self) -> BTreeSet<&NonTerminal> {
        let r = Reachability::new(self);
        self.iter_nidxs()
            .filter(|&nidx| !self.nt_to_prods(nidx).is_empty() && !r.is_reachable(nidx))
            .map(|nidx| self.non_terminal(nidx))
            .collect()
    }

    /// The non-terminals which have productions but can not derive any finite string of
    /// terminals, ordered by name. Such non-terminals are dead: e.g. `<S> ::= <S>` with no
    /// other alternative.
    pub fn unterminated_non_terminals(&self) -> BTreeSet<&NonTerminal> {
        let p = Productivity::new(self);
        self.iter_nidxs()
            .filter(|&nidx| !self.nt_to_prods(nidx).is_empty() && !p.is_productive(nidx))
            .map(|nidx| self.non_terminal(nidx))
            .collect()
    }

    /// Can `nt` derive the empty string? Returns `false` if the grammar doesn't mention `nt`.
    pub fn is_nullable(&self, nt: &NonTerminal) -> bool {
        self.nidx(nt)
            .is_some_and(|nidx| Nullability::new(self).is_nullable(nidx))
    }

    /// Does the language of this grammar contain the empty string?
    pub fn accepts_empty(&self) -> bool {
        Nullability::new(self).is_nullable(self.start_nidx())
    }

    /// Is there a path from the `from` non-terminal to the `to` non-terminal? Note that
    /// recursive non-terminals return `true` for a path from themselves to themselves.
    pub fn has_path(&self, from: &NonTerminal, to: &NonTerminal) -> bool {
        let (Some(from), Some(to)) = (self.nidx(from), self.nidx(to)) else {
            return false;
        };
        let mut seen = Vob::from_elem(false, self.non_terminals_len());
        let mut todo = vec![from];
        while let Some(nidx) = todo.pop() {
            for &pidx in self.nt_to_prods(nidx) {
                for nt in self.prod(pidx).non_terminals() {
                    let Some(s_nidx) = self.nidx(nt) else {
                        continue;
                    };
                    if s_nidx == to {
                        return true;
                    }
                    if !seen[usize::from(s_nidx)] {
                        seen.set(usize::from(s_nidx), true);
                        todo.push(s_nidx);
                    }
                }
            }
        }
        false
    }

    /// The productions with duplicates removed, in a canonical order.
    fn canonical_prods(&self) -> BTreeSet<&Production> {
        self.prods.iter().collect()
    }
}

impl PartialEq for Grammar {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.canonical_prods() == other.canonical_prods()
    }
}

impl Eq for Grammar {}

impl Hash for Grammar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        for prod in self.canonical_prods() {
            prod.hash(state);
        }
    }
}

/// The serialized form of a [`Grammar`]: derived indexes and warnings are rebuilt on
/// deserialization.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct SerializedGrammar {
    productions: Vec<Production>,
    start: NonTerminal,
    normalization_non_terminals: IndexSet<NonTerminal>,
}

#[cfg(feature = "serde")]
impl From<SerializedGrammar> for Grammar {
    fn from(s: SerializedGrammar) -> Self {
        Grammar::new_normalized(s.productions, s.start, s.normalization_non_terminals)
    }
}

#[cfg(feature = "serde")]
impl From<Grammar> for SerializedGrammar {
    fn from(grm: Grammar) -> Self {
        SerializedGrammar {
            productions: grm.prods,
            start: grm.start,
            normalization_non_terminals: grm.normalization_nts,
        }
    }
}
