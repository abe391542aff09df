use crate::Span;

/// Maps byte offsets in a source string to 1-based line and column numbers. Columns count
/// characters rather than bytes, and a `\r\n` pair occupies a single column.
///
/// The cache records only where each line starts, so methods which need the text itself take
/// the same `src` the cache was built from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewlineCache {
    /// The byte offset at which each line starts. Always contains at least `0`.
    line_starts: Vec<usize>,
    src_len: usize,
}

impl NewlineCache {
    pub fn new(src: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            src.char_indices()
                .filter(|&(_, c)| c == '\n')
                .map(|(off, _)| off + 1),
        );
        NewlineCache {
            line_starts,
            src_len: src.len(),
        }
    }

    /// How many lines does the source have? A trailing newline starts a new (empty) line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to a line number. Returns `None` if `byte` is past the end of the
    /// source. The offset of a newline belongs to the line that newline ends.
    pub fn byte_to_line_num(&self, byte: usize) -> Option<usize> {
        if byte > self.src_len {
            return None;
        }
        Some(self.line_starts.partition_point(|&start| start <= byte))
    }

    /// The byte range of line `line_num`, excluding its terminating `\n`. Returns `None` if
    /// the line does not exist.
    pub fn line_bytes(&self, line_num: usize) -> Option<(usize, usize)> {
        if line_num == 0 || line_num > self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[line_num - 1];
        let end = match self.line_starts.get(line_num) {
            Some(next) => next - 1,
            None => self.src_len,
        };
        Some((start, end))
    }

    /// Convert a byte offset in `src` to a `(line, column)` pair. Returns `None` if `src` is
    /// not the string this cache was built from (judged by length), if `byte` is past its end,
    /// or if `byte` is not on a character boundary.
    pub fn byte_to_line_num_and_col_num(&self, src: &str, byte: usize) -> Option<(usize, usize)> {
        if src.len() != self.src_len || !src.is_char_boundary(byte) {
            return None;
        }
        let line_num = self.byte_to_line_num(byte)?;
        let line_start = self.line_starts[line_num - 1];
        let mut col = 1;
        let mut chars = src[line_start..byte].chars().peekable();
        while let Some(c) = chars.next() {
            // `\r` immediately before `\n` shares its column.
            let crlf = c == '\r'
                && chars
                    .peek()
                    .copied()
                    .or_else(|| src[byte..].chars().next())
                    == Some('\n');
            if !crlf {
                col += 1;
            }
        }
        Some((line_num, col))
    }

    /// The byte range from the start of the line containing `span.start()` to the end of the
    /// line containing the last byte `span` covers, excluding the final `\n`. A span ending
    /// just after a newline thus does not extend onto the following line. An empty span
    /// yields the line it sits on.
    ///
    /// # Panics
    ///
    /// If `span` extends past the end of the source.
    pub fn span_line_bytes(&self, span: Span) -> (usize, usize) {
        if span.end() > self.src_len {
            panic!("Span {} is outside the source", span);
        }
        let lookup = |byte| {
            self.byte_to_line_num(byte)
                .and_then(|line_num| self.line_bytes(line_num))
                .unwrap_or_else(|| panic!("Span {} is outside the source", span))
        };
        let last = if span.is_empty() {
            span.start()
        } else {
            span.end() - 1
        };
        let (start, _) = lookup(span.start());
        let (_, end) = lookup(last);
        (start, end)
    }
}
