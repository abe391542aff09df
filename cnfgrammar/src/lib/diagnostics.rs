use std::{cell::OnceCell, error::Error, fmt, path::Path};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::{NewlineCache, NonTerminal, Span};

/// Why recognition or tokenization of an input failed. Recognisers must pick one of these:
/// there is no catch-all variant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SyntaxErrorKind {
    /// The input is empty but the grammar does not accept the empty string.
    EmptyNotAllowed,
    /// No terminal matched at this position.
    UnknownToken,
    /// A candidate match could not be combined into a derivation.
    UnmatchedPattern,
    /// No expected non-terminal can accept the token here.
    UnexpectedToken,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SyntaxErrorKind::EmptyNotAllowed => "Empty input not allowed",
            SyntaxErrorKind::UnknownToken => "Unknown token",
            SyntaxErrorKind::UnmatchedPattern => "Unmatched pattern",
            SyntaxErrorKind::UnexpectedToken => "Unexpected token",
        };
        f.write_str(s)
    }
}

/// A failure to recognise (or tokenize) `src`. The span locates the offending text and
/// `context` lists the non-terminals which could have been accepted at that point, most
/// relevant first.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SerializedSyntaxError"))]
pub struct SyntaxError {
    span: Span,
    kind: SyntaxErrorKind,
    context: Vec<NonTerminal>,
    src: String,
}

fn span_fits(src: &str, span: Span) -> bool {
    span.start() <= span.end()
        && span.end() <= src.len()
        && src.is_char_boundary(span.start())
        && src.is_char_boundary(span.end())
}

impl SyntaxError {
    /// Create a new syntax error.
    ///
    /// # Panics
    ///
    /// If `span` extends past the end of `src` or does not start and end on character
    /// boundaries.
    pub fn new<S: Into<String>>(
        span: Span,
        kind: SyntaxErrorKind,
        context: Vec<NonTerminal>,
        src: S,
    ) -> Self {
        let src = src.into();
        if !span_fits(&src, span) {
            panic!(
                "Span {} does not fit a source of {} bytes on character boundaries",
                span,
                src.len()
            );
        }
        SyntaxError {
            span,
            kind,
            context,
            src,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn kind(&self) -> SyntaxErrorKind {
        self.kind
    }

    pub fn context(&self) -> &[NonTerminal] {
        &self.context
    }

    /// The complete source text this error refers to.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// The portion of the source covered by this error's span.
    pub fn offending_str(&self) -> &str {
        &self.src[self.span.start()..self.span.end()]
    }

    /// The 1-based `(line, column)` of the start and end of this error's span. Columns count
    /// characters.
    pub fn line_col(&self) -> ((usize, usize), (usize, usize)) {
        let nlc = NewlineCache::new(&self.src);
        let line_col = |byte| {
            nlc.byte_to_line_num_and_col_num(&self.src, byte)
                .expect("Span must correlate to a line in source")
        };
        (line_col(self.span.start()), line_col(self.span.end()))
    }

    fn write_expected(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, nt) in self.context.iter().enumerate() {
            f.write_str(if i == 0 { ", expected: " } else { " | " })?;
            write!(f, "{}", nt)?;
        }
        Ok(())
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Error: {} at {}: '{}'",
            self.kind,
            self.span,
            self.offending_str()
        )?;
        self.write_expected(f)
    }
}

impl Error for SyntaxError {}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct SerializedSyntaxError {
    span: Span,
    kind: SyntaxErrorKind,
    context: Vec<NonTerminal>,
    src: String,
}

#[cfg(feature = "serde")]
impl TryFrom<SerializedSyntaxError> for SyntaxError {
    type Error = String;

    fn try_from(s: SerializedSyntaxError) -> Result<Self, Self::Error> {
        if !span_fits(&s.src, s.span) {
            return Err(format!(
                "Span {} does not fit a source of {} bytes",
                s.span,
                s.src.len()
            ));
        }
        Ok(SyntaxError {
            span: s.span,
            kind: s.kind,
            context: s.context,
            src: s.src,
        })
    }
}

/// Renders [`SyntaxError`]s (and arbitrary spans) over a source string for humans, e.g.:
///
/// ```text
/// Unknown token at 1:4, expected: <B>
/// 1| ab x
///       ^ Unknown token
/// ```
pub struct DiagnosticFormatter<'a> {
    src: &'a str,
    path: Option<&'a Path>,
    nlc: OnceCell<NewlineCache>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            path: None,
            nlc: OnceCell::new(),
        }
    }

    /// Name `path` as the origin of the source in location messages.
    pub fn with_path(mut self, path: &'a Path) -> Self {
        self.path = Some(path);
        self
    }

    pub fn nlc(&self) -> &NewlineCache {
        self.nlc.get_or_init(|| NewlineCache::new(self.src))
    }

    /// If a span is given returns "msg at path/file.txt:5:6" (or "msg at 5:6" without a path),
    /// otherwise returns "msg in path/file.txt" (or just "msg").
    pub fn location_msg(&self, msg: &str, span: Option<Span>) -> String {
        match (span, self.path) {
            (Some(span), path) => {
                let (line, col) = self
                    .nlc()
                    .byte_to_line_num_and_col_num(self.src, span.start())
                    .unwrap_or((0, 0));
                match path {
                    Some(path) => format!("{} at {}:{line}:{col}", msg, path.display()),
                    None => format!("{} at {line}:{col}", msg),
                }
            }
            (None, Some(path)) => format!("{} in {}", msg, path.display()),
            (None, None) => msg.to_owned(),
        }
    }

    /// Print the line number and source text of every line intersecting `span`, underlining the
    /// part covered by the span with `underline_c`. `msg` follows the last underline.
    ///
    /// # Panics
    ///
    /// If `span` extends past the end of the source or does not start and end on character
    /// boundaries.
    pub fn underline_span_with_text(&self, span: Span, msg: &str, underline_c: char) -> String {
        assert!(
            span_fits(self.src, span),
            "Span {} does not fit a source of {} bytes on character boundaries",
            span,
            self.src.len()
        );
        let (start_byte, end_byte) = self.nlc().span_line_bytes(span);
        let mut line_num = self
            .nlc()
            .byte_to_line_num(start_byte)
            .expect("Span must correlate to a line in source");
        let mut line_start = start_byte;
        let mut out = String::new();
        let mut lines = self.src[start_byte..end_byte].split('\n').peekable();
        while let Some(line) = lines.next() {
            let text = line.strip_suffix('\r').unwrap_or(line);
            let ul_start = span.start().max(line_start);
            let ul_end = span.end().min(line_start + text.len()).max(ul_start);
            out.push_str(&format!("{}| {}\n", line_num, text));
            out.push_str(&" ".repeat(
                UnicodeWidthStr::width(&self.src[line_start..ul_start])
                    + line_num.to_string().len()
                    + "| ".len(),
            ));
            out.push_str(
                &underline_c
                    .to_string()
                    .repeat(UnicodeWidthStr::width(&self.src[ul_start..ul_end]).max(1)),
            );
            if lines.peek().is_none() {
                out.push_str(&format!(" {}", msg));
            } else {
                out.push('\n');
            }
            line_start += line.len() + 1;
            line_num += 1;
        }
        out
    }

    /// Format `e` as a location message followed by the underlined source excerpt.
    ///
    /// # Panics
    ///
    /// If `e` was not created over this formatter's source.
    pub fn format_error(&self, e: &SyntaxError) -> String {
        assert_eq!(e.src(), self.src, "Error refers to a different source");
        let mut header = self.location_msg(&e.kind().to_string(), Some(e.span()));
        for (i, nt) in e.context().iter().enumerate() {
            header.push_str(if i == 0 { ", expected: " } else { " | " });
            header.push_str(&nt.to_string());
        }
        format!(
            "{}\n{}",
            header,
            self.underline_span_with_text(e.span(), &e.kind().to_string(), '^')
        )
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::*;

    fn unknown_token(span: Span, src: &str) -> SyntaxError {
        SyntaxError::new(span, SyntaxErrorKind::UnknownToken, vec![], src)
    }

    #[test]
    fn test_display_without_context() {
        let e = unknown_token(Span::new(0, 1), "x");
        assert_eq!(e.offending_str(), "x");
        assert_eq!(e.to_string(), "Error: Unknown token at 0..1: 'x'");
    }

    #[test]
    fn test_display_with_context() {
        let e = SyntaxError::new(
            Span::new(2, 4),
            SyntaxErrorKind::UnexpectedToken,
            vec![NonTerminal::new("A"), NonTerminal::new("B")],
            "a bc",
        );
        assert_eq!(
            e.to_string(),
            "Error: Unexpected token at 2..4: 'bc', expected: <A> | <B>"
        );
        let e = SyntaxError::new(
            Span::new(0, 0),
            SyntaxErrorKind::EmptyNotAllowed,
            vec![NonTerminal::new("S")],
            "",
        );
        assert_eq!(
            e.to_string(),
            "Error: Empty input not allowed at 0..0: '', expected: <S>"
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(
            SyntaxErrorKind::UnmatchedPattern.to_string(),
            "Unmatched pattern"
        );
        assert_eq!(
            SyntaxErrorKind::EmptyNotAllowed.to_string(),
            "Empty input not allowed"
        );
    }

    #[test]
    #[should_panic]
    fn test_span_past_end() {
        unknown_token(Span::new(1, 3), "ab");
    }

    #[test]
    #[should_panic]
    fn test_span_not_on_char_boundary() {
        unknown_token(Span::new(0, 1), "♠");
    }

    #[test]
    fn test_line_col() {
        let e = unknown_token(Span::new(4, 8), "ab\nc♠d\n");
        assert_eq!(e.offending_str(), "♠d");
        assert_eq!(e.line_col(), ((2, 2), (2, 4)));
    }

    #[test]
    fn test_location_msg() {
        let src = "ab\ncd";
        let formatter = DiagnosticFormatter::new(src);
        assert_eq!(
            formatter.location_msg("Oops", Some(Span::new(4, 5))),
            "Oops at 2:2"
        );
        assert_eq!(formatter.location_msg("Oops", None), "Oops");
        let path = PathBuf::from("test");
        let formatter = DiagnosticFormatter::new(src).with_path(&path);
        assert_eq!(
            formatter.location_msg("Oops", Some(Span::new(4, 5))),
            "Oops at test:2:2"
        );
        assert_eq!(formatter.location_msg("Oops", None), "Oops in test");
    }

    #[test]
    fn test_underline_multiline_span() {
        let s = "\naaaaaabbb\nbbb\nbbbb\n";
        let formatter = DiagnosticFormatter::new(s);
        let out = format!(
            "\n{}",
            formatter.underline_span_with_text(Span::new(7, 19), "Test message", '-')
        );
        assert_eq!(
            out,
            r"
2| aaaaaabbb
         ---
3| bbb
   ---
4| bbbb
   ---- Test message"
        );
    }

    #[test]
    fn test_underline_wide_chars() {
        let s = "a 漢字 b";
        let formatter = DiagnosticFormatter::new(s);
        assert_eq!(
            formatter.underline_span_with_text(Span::new(2, 8), "here", '^'),
            "1| a 漢字 b\n     ^^^^ here"
        );
    }

    #[test]
    fn test_underline_empty_span() {
        let formatter = DiagnosticFormatter::new("ab");
        assert_eq!(
            formatter.underline_span_with_text(Span::new(2, 2), "end", '^'),
            "1| ab\n     ^ end"
        );
    }

    #[test]
    fn test_underline_span_ending_at_line_start() {
        let formatter = DiagnosticFormatter::new("ab\ncd");
        assert_eq!(
            formatter.underline_span_with_text(Span::new(1, 3), "here", '^'),
            "1| ab\n    ^ here"
        );
    }

    #[test]
    #[should_panic]
    fn test_underline_span_not_on_char_boundary() {
        DiagnosticFormatter::new("a♠b").underline_span_with_text(Span::new(1, 2), "here", '^');
    }

    #[test]
    fn test_format_error() {
        let src = "ab x\ncd";
        let e = SyntaxError::new(
            Span::new(3, 4),
            SyntaxErrorKind::UnknownToken,
            vec![NonTerminal::new("B")],
            src,
        );
        let formatter = DiagnosticFormatter::new(src);
        assert_eq!(
            formatter.format_error(&e),
            "Unknown token at 1:4, expected: <B>\n1| ab x\n      ^ Unknown token"
        );
    }
}
