// This file is part of clam, a POSIX-compatible shell.
// Copyright (C) 2026 The clam developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Shell script source code
//!
//! This module defines [`Span`], the byte range a token or AST node occupies
//! in the source code, and [`SourceCode`], a wrapper around the source text
//! that resolves spans to line/column pairs and renders caret snippets for
//! diagnostics.

use std::fmt;
use std::ops::Range;

/// Byte range `[start, end)` in the source code
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Span {
    /// Offset of the first byte
    pub start: usize,
    /// Offset just past the last byte
    pub end: usize,
}

impl Span {
    /// Creates a span from a start and end offset.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Returns the number of bytes the span covers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Tests whether the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the smallest span containing both `self` and `other`.
    #[must_use]
    pub fn merge(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Converts the span to a `Range<usize>`.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// Source text with a precomputed line table
///
/// A `SourceCode` owns one script and answers position queries about it.
/// Lines and columns are 1-based; columns count characters, not bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceCode {
    text: String,
    line_starts: Vec<usize>,
}

impl SourceCode {
    /// Wraps the given source text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        SourceCode {
            text: text.to_string(),
            line_starts,
        }
    }

    /// Returns the whole source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the 1-based line and column of a byte offset.
    ///
    /// Offsets past the end of the text resolve to the position just after
    /// the last character.
    #[must_use]
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .max(1);
        let line_start = self.line_starts[line - 1];
        let column = self.text[line_start..offset].chars().count() + 1;
        (line, column)
    }

    /// Returns the text of the 1-based line number, without the newline.
    #[must_use]
    pub fn line_text(&self, line: usize) -> &str {
        let Some(&start) = self.line_starts.get(line.wrapping_sub(1)) else {
            return "";
        };
        let rest = &self.text[start..];
        rest.split('\n').next().unwrap_or(rest)
    }

    /// Renders the line containing `span` with a caret marker under the
    /// spanned columns.
    #[must_use]
    pub fn snippet(&self, span: Span) -> String {
        let (line, column) = self.line_column(span.start);
        let line_text = self.line_text(line);
        let width = self.text[span.range()]
            .split('\n')
            .next()
            .map_or(1, |s| s.chars().count().max(1));
        let mut out = String::new();
        out.push_str(line_text);
        out.push('\n');
        out.extend(std::iter::repeat_n(' ', column - 1));
        out.extend(std::iter::repeat_n('^', width));
        out
    }
}

/// Conversion of diagnostics to `annotate_snippets` groups
///
/// This module is only available when the crate is built with the
/// `annotate-snippets` feature enabled.
#[cfg(feature = "annotate-snippets")]
pub mod pretty {
    use super::{SourceCode, Span};
    use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

    /// Renders a titled annotation on the source code as a printable string.
    #[must_use]
    pub fn render(code: &SourceCode, title: &str, label: &str, span: Span) -> String {
        let annotation = AnnotationKind::Primary.span(span.range()).label(label);
        let snippet = Snippet::source(code.text())
            .line_start(1)
            .annotations(vec![annotation]);
        let group: Group = Level::ERROR
            .primary_title(title)
            .elements(std::iter::once(snippet));
        Renderer::plain().render(&[group]).to_string()
    }
}
