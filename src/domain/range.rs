use std::{fmt, ops, path::PathBuf};

use serde::Serialize;

/// A position in a source file.
///
/// Lines and columns are 1-based, the byte offset is 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Pos {
    /// The line number.
    pub line: usize,
    /// The column, counted in characters.
    pub column: usize,
    /// The byte offset from the start of the file.
    pub byte: usize,
}

impl Pos {
    /// Creates a position.
    #[must_use]
    pub const fn new(line: usize, column: usize, byte: usize) -> Self {
        Self { line, column, byte }
    }
}

/// A span of source text within a named file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Range {
    /// The file the range refers to, relative to the module directory.
    pub filename: PathBuf,
    /// The first position covered by the range.
    pub start: Pos,
    /// The position just past the end of the range.
    pub end: Pos,
}

impl Range {
    /// Returns a range spanning from the start of `self` to the end of
    /// `other`.
    ///
    /// Both ranges are expected to refer to the same file.
    #[must_use]
    pub fn to(&self, other: &Self) -> Self {
        Self {
            filename: self.filename.clone(),
            start: self.start,
            end: other.end,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{},{}-{},{}",
            self.filename.display(),
            self.start.line,
            self.start.column,
            self.end.line,
            self.end.column
        )
    }
}

/// Maps byte offsets of a single file onto line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    filename: PathBuf,
    source: String,
    /// Byte offset of the first character of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Indexes the given source text.
    #[must_use]
    pub fn new(filename: PathBuf, source: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            filename,
            source,
            line_starts,
        }
    }

    /// The file this index belongs to.
    #[must_use]
    pub const fn filename(&self) -> &PathBuf {
        &self.filename
    }

    /// Converts a byte offset into a position.
    ///
    /// Offsets past the end of the file are clamped to the end.
    #[must_use]
    pub fn pos(&self, byte: usize) -> Pos {
        let byte = byte.min(self.source.len());
        let line = self.line_starts.partition_point(|&start| start <= byte);
        let line_start = self.line_starts[line - 1];
        let column = self
            .source
            .get(line_start..byte)
            .map_or(byte - line_start, |text| text.chars().count())
            + 1;
        Pos::new(line, column, byte)
    }

    /// Converts a parser span into a [`Range`].
    ///
    /// Nodes without a span (built programmatically rather than parsed) map
    /// to the start of the file.
    #[must_use]
    pub fn range(&self, span: Option<ops::Range<usize>>) -> Range {
        let span = span.unwrap_or_default();
        Range {
            filename: self.filename.clone(),
            start: self.pos(span.start),
            end: self.pos(span.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn index() -> LineIndex {
        LineIndex::new("main.tf".into(), "terraform {\n  backend \"http\" {}\n}\n".into())
    }

    #[test_case(0, 1, 1; "start of file")]
    #[test_case(10, 1, 11; "end of first line")]
    #[test_case(12, 2, 1; "start of second line")]
    #[test_case(14, 2, 3; "inside second line")]
    #[test_case(1000, 4, 1; "clamped past end")]
    fn pos_maps_offsets(byte: usize, line: usize, column: usize) {
        let pos = index().pos(byte);
        assert_eq!((pos.line, pos.column), (line, column));
    }

    #[test]
    fn columns_count_characters() {
        let index = LineIndex::new("main.tf".into(), "# é\nx".into());
        // "é" is two bytes but one column
        assert_eq!(index.pos(4).column, 4);
    }

    #[test]
    fn missing_span_maps_to_file_start() {
        let range = index().range(None);
        assert_eq!(range.start, Pos::new(1, 1, 0));
        assert_eq!(range.end, Pos::new(1, 1, 0));
    }

    #[test]
    fn range_displays_file_and_positions() {
        let range = index().range(Some(14..28));
        assert_eq!(range.to_string(), "main.tf:2,3-2,17");
    }
}
