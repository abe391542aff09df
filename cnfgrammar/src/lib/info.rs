use std::collections::BTreeSet;

use crate::{GrammarError, GrammarWarning, GrammarWarningKind};

/// Decides what happens to the warnings found while constructing a [`Grammar`](crate::Grammar)
/// with [`Grammar::new_with_info`](crate::Grammar::new_with_info), and collects the ones that
/// are neither allowed nor fatal.
///
/// One `GrammarInfo` may be passed to the construction of several grammars, in which case
/// `warnings()` accumulates across all of them.
#[derive(Debug, Default)]
pub struct GrammarInfo {
    warnings_as_errors: bool,
    allowed: BTreeSet<GrammarWarningKind>,
    warnings: Vec<GrammarWarning>,
}

#[derive(Debug, Default)]
pub struct GrammarInfoBuilder {
    warnings_as_errors: bool,
    allowed: BTreeSet<GrammarWarningKind>,
}

impl GrammarInfoBuilder {
    /// Fail construction on the first warning which isn't allowed.
    pub fn warnings_as_errors(mut self) -> Self {
        self.warnings_as_errors = true;
        self
    }

    /// Silently drop warnings of kind `kind`. A normalizer which knowingly leaves dead
    /// non-terminals behind might, for example, allow `UnreachableNonTerminal`.
    pub fn allow(mut self, kind: GrammarWarningKind) -> Self {
        self.allowed.insert(kind);
        self
    }

    pub fn build(self) -> GrammarInfo {
        GrammarInfo {
            warnings_as_errors: self.warnings_as_errors,
            allowed: self.allowed,
            warnings: Vec::new(),
        }
    }
}

impl GrammarInfo {
    pub fn builder() -> GrammarInfoBuilder {
        GrammarInfoBuilder::default()
    }

    /// The strictest configuration: every warning is an error. What "strictest" entails may
    /// grow as new checks are added.
    pub fn cautious() -> Self {
        Self::builder().warnings_as_errors().build()
    }

    pub fn warnings_as_errors(&self) -> bool {
        self.warnings_as_errors
    }

    pub fn is_allowed(&self, kind: GrammarWarningKind) -> bool {
        self.allowed.contains(&kind)
    }

    /// Record `warning`. Returns `Some` if construction must fail because of it.
    pub(crate) fn add_warning(&mut self, warning: GrammarWarning) -> Option<GrammarError> {
        if self.is_allowed(warning.kind()) {
            None
        } else if self.warnings_as_errors {
            Some(GrammarError::from(warning))
        } else {
            self.warnings.push(warning);
            None
        }
    }

    /// The warnings recorded so far. Always empty when warnings are errors.
    pub fn warnings(&self) -> &[GrammarWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod test {
    use super::GrammarInfo;
    use crate::{GrammarErrorKind, GrammarWarning, GrammarWarningKind, NonTerminal};

    fn unreachable(name: &str) -> GrammarWarning {
        GrammarWarning::new(
            GrammarWarningKind::UnreachableNonTerminal,
            NonTerminal::new(name),
        )
    }

    #[test]
    fn test_collects_by_default() {
        let mut info = GrammarInfo::default();
        assert!(!info.warnings_as_errors());
        assert!(info.add_warning(unreachable("X")).is_none());
        assert!(info.add_warning(unreachable("Y")).is_none());
        assert_eq!(info.warnings(), &[unreachable("X"), unreachable("Y")]);
    }

    #[test]
    fn test_cautious() {
        let mut info = GrammarInfo::cautious();
        assert!(info.warnings_as_errors());
        match info.add_warning(unreachable("X")) {
            Some(e) => assert_eq!(
                e.kind,
                GrammarErrorKind::Warning(GrammarWarningKind::UnreachableNonTerminal)
            ),
            None => panic!("Warning should have been converted to an error"),
        }
        assert!(info.warnings().is_empty());
    }

    #[test]
    fn test_allowed() {
        let mut info = GrammarInfo::builder()
            .warnings_as_errors()
            .allow(GrammarWarningKind::UnreachableNonTerminal)
            .build();
        assert!(info.is_allowed(GrammarWarningKind::UnreachableNonTerminal));
        assert!(!info.is_allowed(GrammarWarningKind::UnterminatedNonTerminal));
        assert!(info.add_warning(unreachable("X")).is_none());
        assert!(info.warnings().is_empty());
        let w = GrammarWarning::new(
            GrammarWarningKind::UnterminatedNonTerminal,
            NonTerminal::new("X"),
        );
        assert!(info.add_warning(w).is_some());
    }
}
