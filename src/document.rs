//! Document abstraction - source text plus line addressing

/// An immutable markup document with offset-to-line lookup.
///
/// The scanner works on byte offsets; everything user-facing (diagnostics,
/// fixes) is line-addressed. Line numbers are 1-based.
#[derive(Debug, Clone)]
pub struct XamlDocument {
    source: String,
    /// Byte offset of the first character of each line
    line_starts: Vec<usize>,
}

impl XamlDocument {
    /// Create a document from source text
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    /// The full source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Document length in bytes
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Whether the document is empty
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Number of lines in the document
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 1-based line number containing the given byte offset.
    /// Offsets past the end map to the last line.
    pub fn line_at(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset)
    }

    /// The 1-based column of a byte offset within its line
    pub fn column_at(&self, offset: usize) -> usize {
        let line = self.line_at(offset);
        offset - self.line_starts[line - 1] + 1
    }

    /// Get the content of a 1-based line, without its line ending
    pub fn source_line(&self, line: usize) -> Option<&str> {
        if line == 0 || line > self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map(|&next| next - 1)
            .unwrap_or(self.source.len());
        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// Slice the source by byte span
    pub fn slice(&self, start: usize, length: usize) -> &str {
        &self.source[start..start + length]
    }
}
