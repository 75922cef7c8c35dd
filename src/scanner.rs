//! Single-pass XAML element scanner
//!
//! Walks the document text character by character, never building a DOM.
//! Opening tags of interest are pushed onto a tracking stack; each closing
//! tag resolves the open entry with the same name and the greatest start
//! offset. Elements are emitted in the order their closing tags resolve,
//! so children come before their parents.

use crate::document::XamlDocument;
use crate::element::{strip_namespace, ElementSpan};

/// Scanner state. One state at a time, one transition function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Between tags, or inside a tag after the name has been identified
    Scanning,
    /// Accumulating an element name right after `<`
    InTagName,
    /// Accumulating a closing tag name right after `/`
    InClosingName,
    /// Inside `<!-- -->`; everything is ignored until the terminator
    InComment,
}

/// An element-of-interest whose opening tag has been seen but whose closing
/// tag has not yet resolved.
#[derive(Debug, Clone)]
struct TrackingEntry {
    name: String,
    start: usize,
    of_interest: bool,
}

/// One resolved element, emitted as its closing tag is reached.
#[derive(Debug, Clone)]
pub struct ScannedElement {
    pub name: String,
    pub span: ElementSpan,
    /// Whether the name matched the interest set (in bare or qualified
    /// form). Uninteresting elements are still emitted for catch-all
    /// bookkeeping; their text is only sliced once a close actually
    /// resolves.
    pub of_interest: bool,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == ':' || c == '_'
}

/// Scan the document in a single forward pass and return every resolved
/// element in closing order.
///
/// `interest` is consulted with the element name exactly as written;
/// namespace stripping happens before the call, so the predicate only needs
/// to know bare names unless it cares about specific prefixes.
pub fn scan<F>(doc: &XamlDocument, interest: F) -> Vec<ScannedElement>
where
    F: Fn(&str) -> bool,
{
    let source = doc.source();
    let bytes = source.as_bytes();

    let mut state = ScanState::Scanning;
    let mut current_name = String::new();
    let mut closing_name = String::new();
    let mut element_start: Option<usize> = None;
    let mut tracking: Vec<TrackingEntry> = Vec::new();
    let mut resolved = Vec::new();

    let track = |tracking: &mut Vec<TrackingEntry>, name: &str, start: Option<usize>| {
        let Some(start) = start else { return };
        if name.is_empty() {
            return;
        }
        tracking.push(TrackingEntry {
            name: name.to_string(),
            start,
            of_interest: interest(name) || interest(strip_namespace(name)),
        });
    };

    for (i, c) in source.char_indices() {
        match state {
            ScanState::InComment => {
                if c == '>' && bytes[..=i].ends_with(b"-->") {
                    state = ScanState::Scanning;
                }
            }
            ScanState::InTagName => match c {
                c if is_name_char(c) => current_name.push(c),
                c if c.is_whitespace() => {
                    // Name complete; attributes follow and are not tokenized
                    track(&mut tracking, &current_name, element_start);
                    state = ScanState::Scanning;
                }
                '/' => {
                    // Self-closing with no attributes, e.g. `<Grid/>`
                    track(&mut tracking, &current_name, element_start);
                    closing_name.clear();
                    state = ScanState::InClosingName;
                }
                '>' => {
                    // No attributes, e.g. `<Grid>`
                    track(&mut tracking, &current_name, element_start);
                    state = ScanState::Scanning;
                }
                '-' if bytes[..=i].ends_with(b"<!--") => {
                    element_start = None;
                    state = ScanState::InComment;
                }
                _ => {}
            },
            ScanState::InClosingName => match c {
                c if is_name_char(c) => closing_name.push(c),
                '/' => closing_name.clear(),
                '>' => {
                    resolve(
                        &mut tracking,
                        &closing_name,
                        &current_name,
                        i,
                        doc,
                        &mut resolved,
                    );
                    state = ScanState::Scanning;
                }
                '<' => {
                    // Malformed markup; abandon the closing tag
                    current_name.clear();
                    element_start = Some(i);
                    state = ScanState::InTagName;
                }
                _ => {}
            },
            ScanState::Scanning => match c {
                '<' => {
                    current_name.clear();
                    element_start = Some(i);
                    state = ScanState::InTagName;
                }
                '/' => {
                    // Either `</Name>` or the slash of ` />`; a slash in an
                    // attribute value also lands here and is discarded when
                    // the next slash resets the name
                    closing_name.clear();
                    state = ScanState::InClosingName;
                }
                _ => {}
            },
        }
    }

    resolved
}

/// Match a closing tag against the open entries. A blank closing name means
/// the self-closing form; the just-identified opening name stands in for it.
fn resolve(
    tracking: &mut Vec<TrackingEntry>,
    closing_name: &str,
    current_name: &str,
    close_pos: usize,
    doc: &XamlDocument,
    resolved: &mut Vec<ScannedElement>,
) {
    let name = if closing_name.is_empty() {
        current_name
    } else {
        closing_name
    };
    if name.is_empty() {
        return;
    }

    // Greatest start offset wins among same-named open entries. Names are
    // compared exactly as written; prefix stripping only happens at
    // registry lookup, never here.
    let found = tracking
        .iter()
        .enumerate()
        .filter(|(_, t)| t.name == name)
        .max_by_key(|(_, t)| t.start)
        .map(|(idx, _)| idx);

    if let Some(idx) = found {
        let entry = tracking.remove(idx);
        let length = close_pos - entry.start + 1;
        debug_assert!(doc.source().is_char_boundary(entry.start + length));
        resolved.push(ScannedElement {
            name: entry.name,
            span: ElementSpan::new(entry.start, length),
            of_interest: entry.of_interest,
        });
    }
}
