//! Matched elements and their attributes

use once_cell::sync::Lazy;
use regex::Regex;

/// Byte span of an element within its document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSpan {
    /// Byte offset of the opening `<`
    pub start: usize,
    /// Length in bytes, inclusive of the closing `>`
    pub length: usize,
}

impl ElementSpan {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Byte offset one past the end of the span
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// An element attribute, in either syntax form.
///
/// `is_inline` distinguishes `Attr="v"` from the property-element form
/// `<Owner.Attr>v</Owner.Attr>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XamlAttribute {
    pub name: String,
    pub value: String,
    pub is_inline: bool,
    /// Byte offset of the attribute within the element's raw text
    pub offset: usize,
    /// Byte length of the attribute's full text
    pub length: usize,
}

/// An element located by the scanner: name, span, and the exact raw slice
/// of document text from `<Name` to the matching `>` inclusive.
///
/// Attribute extraction is done on demand from the raw text; the scanner
/// itself never tokenizes attributes.
#[derive(Debug, Clone)]
pub struct XamlElement {
    pub name: String,
    pub span: ElementSpan,
    pub raw_text: String,
    /// Leading whitespace of the line the element starts on, used to
    /// re-indent inserted markup
    pub line_padding: String,
}

static INLINE_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z0-9_:.]+)\s*=\s*"([^"]*)""#).unwrap());

impl XamlElement {
    pub fn new(
        name: impl Into<String>,
        span: ElementSpan,
        raw_text: impl Into<String>,
        line_padding: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            span,
            raw_text: raw_text.into(),
            line_padding: line_padding.into(),
        }
    }

    /// The element name with any namespace prefix removed
    pub fn name_without_namespace(&self) -> &str {
        strip_namespace(&self.name)
    }

    /// The opening tag text, from `<` to its closing `>` inclusive. A `>`
    /// inside a quoted attribute value does not end the tag.
    pub fn opening_tag(&self) -> &str {
        let mut in_quotes = false;
        for (i, c) in self.raw_text.char_indices() {
            match c {
                '"' => in_quotes = !in_quotes,
                '>' if !in_quotes => return &self.raw_text[..=i],
                _ => {}
            }
        }
        &self.raw_text
    }

    /// Whether the element is written in self-closing form
    pub fn is_self_closing(&self) -> bool {
        self.opening_tag().trim_end().ends_with("/>")
    }

    /// All attributes, inline ones first (in source order), then
    /// property-element ones
    pub fn attributes(&self) -> Vec<XamlAttribute> {
        let mut attrs = self.inline_attributes();
        attrs.extend(self.property_elements());
        attrs
    }

    /// Inline attributes from the opening tag
    pub fn inline_attributes(&self) -> Vec<XamlAttribute> {
        let opening = self.opening_tag();
        INLINE_ATTRIBUTE
            .captures_iter(opening)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let name = cap.get(1)?.as_str();
                // Property-element names never appear inline; a dotted name
                // here is an attached property like Grid.Row, which is fine.
                Some(XamlAttribute {
                    name: name.to_string(),
                    value: cap.get(2)?.as_str().to_string(),
                    is_inline: true,
                    offset: whole.start(),
                    length: whole.len(),
                })
            })
            .collect()
    }

    /// Property-element attributes: `<Name.Attr> ... </Name.Attr>` children
    pub fn property_elements(&self) -> Vec<XamlAttribute> {
        let mut found = Vec::new();
        let open_marker = format!("<{}.", self.name);
        let mut search_from = self.opening_tag().len();

        while let Some(rel) = self.raw_text[search_from..].find(&open_marker) {
            let start = search_from + rel;
            let name_start = start + open_marker.len();
            let name_end = self.raw_text[name_start..]
                .find(|c: char| c == '>' || c == '/' || c.is_whitespace())
                .map(|i| name_start + i);

            let Some(name_end) = name_end else { break };
            let attr_name = &self.raw_text[name_start..name_end];

            let close_marker = format!("</{}.{}>", self.name, attr_name);
            let Some(body_start) = self.raw_text[name_end..].find('>').map(|i| name_end + i + 1)
            else {
                break;
            };

            match self.raw_text[body_start..].find(&close_marker) {
                Some(rel_close) => {
                    let close_start = body_start + rel_close;
                    let end = close_start + close_marker.len();
                    found.push(XamlAttribute {
                        name: attr_name.to_string(),
                        value: self.raw_text[body_start..close_start].trim().to_string(),
                        is_inline: false,
                        offset: start,
                        length: end - start,
                    });
                    search_from = end;
                }
                None => {
                    // Unterminated property element; tolerate and stop
                    break;
                }
            }
        }

        found
    }

    /// Look up an attribute by name, inline form first
    pub fn attribute(&self, name: &str) -> Option<XamlAttribute> {
        self.attributes().into_iter().find(|a| a.name == name)
    }

    /// Whether the element carries an attribute with this name, in either form
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Default text content: the trimmed text between the opening and closing
    /// tags. `None` for self-closing elements or empty content. Content that
    /// starts with markup is returned as-is; callers filter on the first
    /// character.
    pub fn content(&self) -> Option<String> {
        if self.is_self_closing() {
            return None;
        }
        let body_start = self.opening_tag().len();
        let body_end = self.raw_text.rfind("</")?;
        if body_end < body_start {
            return None;
        }
        let content = self.raw_text[body_start..body_end].trim();
        if content.is_empty() {
            None
        } else {
            Some(content.to_string())
        }
    }
}

/// Strip a leading `prefix:` from an element or attribute name
pub fn strip_namespace(name: &str) -> &str {
    match name.find(':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(raw: &str) -> XamlElement {
        let name_end = raw[1..]
            .find(|c: char| !(c.is_alphanumeric() || c == ':' || c == '_'))
            .map(|i| i + 1)
            .unwrap_or(raw.len());
        XamlElement::new(
            &raw[1..name_end],
            ElementSpan::new(0, raw.len()),
            raw,
            "    ",
        )
    }

    #[test]
    fn test_inline_attributes() {
        let el = element(r#"<TextBlock Text="Hello" FontSize="12" />"#);
        let attrs = el.inline_attributes();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name, "Text");
        assert_eq!(attrs[0].value, "Hello");
        assert!(attrs[0].is_inline);
        assert_eq!(attrs[1].name, "FontSize");
        assert_eq!(attrs[1].value, "12");
    }

    #[test]
    fn test_attribute_span_within_raw() {
        let el = element(r#"<TextBlock Text="Hello" />"#);
        let attr = el.attribute("Text").unwrap();
        assert_eq!(&el.raw_text[attr.offset..attr.offset + attr.length], r#"Text="Hello""#);
    }

    #[test]
    fn test_angle_bracket_in_attribute_value() {
        let el = element(r#"<TextBlock Text="a>b" Foo="1" />"#);
        assert_eq!(el.opening_tag(), r#"<TextBlock Text="a>b" Foo="1" />"#);
        assert_eq!(el.attribute("Foo").unwrap().value, "1");
        assert!(el.is_self_closing());
    }

    #[test]
    fn test_namespaced_attribute() {
        let el = element(r#"<TextBlock x:Uid="Greeting" Text="Hi" />"#);
        assert_eq!(el.attribute("x:Uid").unwrap().value, "Greeting");
    }

    #[test]
    fn test_property_element() {
        let el = element("<TextBlock>\n  <TextBlock.Text>Hello</TextBlock.Text>\n</TextBlock>");
        let attrs = el.property_elements();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name, "Text");
        assert_eq!(attrs[0].value, "Hello");
        assert!(!attrs[0].is_inline);
    }

    #[test]
    fn test_property_element_span() {
        let el = element("<Button><Button.Content>Go</Button.Content></Button>");
        let attr = el.attribute("Content").unwrap();
        assert_eq!(
            &el.raw_text[attr.offset..attr.offset + attr.length],
            "<Button.Content>Go</Button.Content>"
        );
    }

    #[test]
    fn test_content_default_value() {
        let el = element("<TextBlock>Hello there</TextBlock>");
        assert_eq!(el.content().as_deref(), Some("Hello there"));
    }

    #[test]
    fn test_content_self_closing() {
        let el = element(r#"<TextBlock Text="x" />"#);
        assert_eq!(el.content(), None);
    }

    #[test]
    fn test_content_child_markup_starts_with_angle() {
        let el = element("<Grid><TextBlock /></Grid>");
        let content = el.content().unwrap();
        assert!(content.starts_with('<'));
    }

    #[test]
    fn test_self_closing_detection() {
        assert!(element(r#"<Grid />"#).is_self_closing());
        assert!(element(r#"<Grid/>"#).is_self_closing());
        assert!(!element("<Grid></Grid>").is_self_closing());
    }

    #[test]
    fn test_opening_tag() {
        let el = element("<Grid Background=\"Red\"><TextBlock /></Grid>");
        assert_eq!(el.opening_tag(), "<Grid Background=\"Red\">");
    }

    #[test]
    fn test_strip_namespace() {
        assert_eq!(strip_namespace("x:Bind"), "Bind");
        assert_eq!(strip_namespace("Grid"), "Grid");
        assert_eq!(strip_namespace("myns:Grid"), "Grid");
    }

    #[test]
    fn test_name_without_namespace() {
        let el = element("<myns:Grid></myns:Grid>");
        assert_eq!(el.name, "myns:Grid");
        assert_eq!(el.name_without_namespace(), "Grid");
    }

    #[test]
    fn test_namespaced_property_element() {
        let el = element(
            "<myns:Grid>\n  <myns:Grid.RowDefinitions>\n    <RowDefinition />\n  </myns:Grid.RowDefinitions>\n</myns:Grid>",
        );
        let attrs = el.property_elements();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name, "RowDefinitions");
        assert!(attrs[0].value.contains("<RowDefinition"));
    }

    #[test]
    fn test_attribute_prefers_inline() {
        let el = element(r#"<TextBlock Text="inline"><TextBlock.Tag>el</TextBlock.Tag></TextBlock>"#);
        let attr = el.attribute("Text").unwrap();
        assert!(attr.is_inline);
        assert_eq!(attr.value, "inline");
    }

    #[test]
    fn test_unterminated_property_element_tolerated() {
        let el = element("<Grid><Grid.RowDefinitions></Grid>");
        assert!(el.property_elements().is_empty());
    }
}
