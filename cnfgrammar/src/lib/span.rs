use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A half-open range of byte offsets `[start, end)` into some input. A `Span` does not hold the
/// input itself: callers pair it with the source it was taken from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SerializedSpan"))]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create the span `[start, end)`.
    ///
    /// # Panics
    ///
    /// If `end` is less than `start`.
    pub fn new(start: usize, end: usize) -> Self {
        if end < start {
            panic!("Span end ({}) precedes its start ({})", end, start);
        }
        Span { start, end }
    }

    /// Byte offset of the start of the span.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset of the end of the span.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Length in bytes of the span.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if this `Span` covers 0 bytes, or `false` otherwise.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct SerializedSpan {
    start: usize,
    end: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<SerializedSpan> for Span {
    type Error = String;

    fn try_from(s: SerializedSpan) -> Result<Self, Self::Error> {
        if s.end < s.start {
            return Err(format!(
                "Span end ({}) precedes its start ({})",
                s.end, s.start
            ));
        }
        Ok(Span {
            start: s.start,
            end: s.end,
        })
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod test {
    use super::Span;

    #[test]
    fn test_span_len() {
        let span = Span::new(2, 5);
        assert_eq!(span.len(), 3);
        assert!(!span.is_empty());
        assert!(Span::new(4, 4).is_empty());
    }

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(0, 1).to_string(), "0..1");
        assert_eq!(Span::new(7, 7).to_string(), "7..7");
    }

    #[test]
    #[should_panic]
    fn test_span_backwards() {
        Span::new(3, 2);
    }
}
