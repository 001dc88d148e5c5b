//! Span-preserving view over XML-like MSBuild files
//!
//! The document keeps the original text and records, for every start tag, the
//! byte span of each attribute value. Edits splice new values into the text,
//! so comments, indentation, attribute order and quoting of untouched nodes
//! stay byte-for-byte identical.

use crate::error::ManifestError;
use regex::Regex;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Attribute inside a start tag: name, `=`, quoted value
static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// A parsed attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified attribute name
    pub name: String,
    /// Decoded value
    pub value: String,
    /// Byte span of the raw value between the quotes
    span: Range<usize>,
    quote: char,
}

/// A start tag (or self-closing tag)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name as written
    pub name: String,
    /// Nesting depth, zero for the root
    pub depth: usize,
    /// Byte span of the whole start tag, `<` through `>`
    span: Range<usize>,
    attributes: Vec<Attribute>,
}

impl Element {
    /// Tag name without a namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Decoded value of an attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// All attributes in source order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

/// An XML-like document that can be edited in place
#[derive(Debug, Clone)]
pub struct XmlDocument {
    text: String,
    elements: Vec<Element>,
}

impl XmlDocument {
    /// Tokenize text into a document
    ///
    /// Errors carry an empty path; callers attach one with
    /// [`ManifestError::with_path`].
    pub fn parse(text: impl Into<String>) -> Result<Self, ManifestError> {
        let text = text.into();
        let elements = scan_elements(&text)?;
        if elements.is_empty() {
            return Err(ManifestError::MissingRoot {
                path: PathBuf::new(),
            });
        }
        Ok(Self { text, elements })
    }

    /// Current text, including any edits
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the document and return its text
    pub fn into_text(self) -> String {
        self.text
    }

    /// All elements in document order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Element by index
    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Indexes and elements whose local name matches
    pub fn elements_named<'a>(
        &'a self,
        local_name: &'a str,
    ) -> impl Iterator<Item = (usize, &'a Element)> + 'a {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.local_name() == local_name)
    }

    /// Replace the value of an existing attribute
    ///
    /// Returns false if the element or attribute does not exist. The value is
    /// escaped for the attribute's quote character; later spans are shifted.
    pub fn set_attribute(&mut self, index: usize, name: &str, value: &str) -> bool {
        let Some(element) = self.elements.get(index) else {
            return false;
        };
        let Some(position) = element.attributes.iter().position(|a| a.name == name) else {
            return false;
        };
        let attribute = &element.attributes[position];
        let span = attribute.span.clone();
        let encoded = escape_attribute(value, attribute.quote);

        self.text.replace_range(span.clone(), &encoded);
        let delta = encoded.len() as isize - span.len() as isize;

        let attribute = &mut self.elements[index].attributes[position];
        attribute.value = value.to_string();
        attribute.span = span.start..span.start + encoded.len();

        let shift = |r: &mut Range<usize>| {
            r.start = (r.start as isize + delta) as usize;
            r.end = (r.end as isize + delta) as usize;
        };
        self.elements[index].span.end = (self.elements[index].span.end as isize + delta) as usize;
        for attr in &mut self.elements[index].attributes[position + 1..] {
            shift(&mut attr.span);
        }
        for element in &mut self.elements[index + 1..] {
            shift(&mut element.span);
            for attr in &mut element.attributes {
                shift(&mut attr.span);
            }
        }
        true
    }
}

fn scan_elements(text: &str) -> Result<Vec<Element>, ManifestError> {
    let malformed = |offset: usize, message: &str| ManifestError::malformed("", offset, message);

    let mut elements = Vec::new();
    let mut depth = 0usize;
    let mut pos = 0usize;

    while let Some(rel) = text[pos..].find('<') {
        let start = pos + rel;
        let rest = &text[start..];

        let skip_to = |open: usize, close: &str, message: &str| {
            text[start + open..]
                .find(close)
                .map(|i| start + open + i + close.len())
                .ok_or_else(|| malformed(start, message))
        };

        if rest.starts_with("<!--") {
            pos = skip_to(4, "-->", "unterminated comment")?;
        } else if rest.starts_with("<![CDATA[") {
            pos = skip_to(9, "]]>", "unterminated CDATA section")?;
        } else if rest.starts_with("<?") {
            pos = skip_to(2, "?>", "unterminated processing instruction")?;
        } else if rest.starts_with("<!") {
            pos = skip_to(2, ">", "unterminated declaration")?;
        } else if rest.starts_with("</") {
            pos = skip_to(2, ">", "unterminated end tag")?;
            depth = depth.saturating_sub(1);
        } else {
            let end = find_tag_end(text, start).ok_or_else(|| malformed(start, "unterminated tag"))?;
            let element = parse_start_tag(text, start, end, depth)?;
            let self_closing = text[start..end].ends_with('/');
            elements.push(element);
            if !self_closing {
                depth += 1;
            }
            pos = end + 1;
        }
    }

    Ok(elements)
}

/// Index of the `>` closing the tag at `start`, honouring quoted values
fn find_tag_end(text: &str, start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in text.as_bytes().iter().enumerate().skip(start + 1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some(i),
                b'<' => return None,
                _ => {}
            },
        }
    }
    None
}

fn parse_start_tag(
    text: &str,
    start: usize,
    end: usize,
    depth: usize,
) -> Result<Element, ManifestError> {
    let inner_start = start + 1;
    let inner = &text[inner_start..end];
    let name_len = inner
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let name = &inner[..name_len];
    if name.is_empty() {
        return Err(ManifestError::malformed("", start, "missing element name"));
    }

    let body_start = inner_start + name_len;
    let body = &text[body_start..end];
    let mut attributes = Vec::new();
    let mut cursor = 0usize;

    for caps in ATTRIBUTE_RE.captures_iter(body) {
        let Some(whole) = caps.get(0) else { continue };
        if !body[cursor..whole.start()].trim().is_empty() {
            return Err(ManifestError::malformed(
                "",
                body_start + cursor,
                "malformed attribute",
            ));
        }
        let (value, quote) = match (caps.get(2), caps.get(3)) {
            (Some(v), _) => (v, '"'),
            (None, Some(v)) => (v, '\''),
            (None, None) => continue,
        };
        attributes.push(Attribute {
            name: caps[1].to_string(),
            value: unescape(value.as_str()),
            span: body_start + value.start()..body_start + value.end(),
            quote,
        });
        cursor = whole.end();
    }

    let tail = body[cursor..].trim();
    if !(tail.is_empty() || tail == "/") {
        return Err(ManifestError::malformed(
            "",
            body_start + cursor,
            "malformed attribute",
        ));
    }

    Ok(Element {
        name: name.to_string(),
        depth,
        span: start..end + 1,
        attributes,
    })
}

/// Decode the predefined entities and character references
fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];
        let decoded = after.find(';').and_then(|semi| {
            let entity = &after[1..semi];
            let c = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, semi + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &after[consumed..];
            }
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_attribute(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROPS: &str = r#"<Project>
  <!-- <PackageVersion Include="Commented.Out" Version="1.0.0" /> -->
  <PropertyGroup>
    <ManagePackageVersionsCentrally>true</ManagePackageVersionsCentrally>
  </PropertyGroup>
  <ItemGroup>
    <PackageVersion Include="Serilog" Version="2.10.0" />
    <PackageVersion Include='Newtonsoft.Json'   Version='13.0.1'/>
  </ItemGroup>
</Project>
"#;

    #[test]
    fn test_parse_elements_and_depth() {
        let doc = XmlDocument::parse(PROPS).unwrap();
        let names: Vec<_> = doc.elements().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Project",
                "PropertyGroup",
                "ManagePackageVersionsCentrally",
                "ItemGroup",
                "PackageVersion",
                "PackageVersion"
            ]
        );
        assert_eq!(doc.elements()[0].depth, 0);
        assert_eq!(doc.elements()[4].depth, 2);
        assert_eq!(doc.elements()[5].depth, 2);
    }

    #[test]
    fn test_commented_elements_are_ignored() {
        let doc = XmlDocument::parse(PROPS).unwrap();
        assert!(doc
            .elements_named("PackageVersion")
            .all(|(_, e)| e.attribute("Include") != Some("Commented.Out")));
    }

    #[test]
    fn test_attribute_lookup_both_quote_styles() {
        let doc = XmlDocument::parse(PROPS).unwrap();
        let versions: Vec<_> = doc
            .elements_named("PackageVersion")
            .map(|(_, e)| (e.attribute("Include").unwrap(), e.attribute("Version").unwrap()))
            .collect();
        assert_eq!(
            versions,
            vec![("Serilog", "2.10.0"), ("Newtonsoft.Json", "13.0.1")]
        );
    }

    #[test]
    fn test_set_attribute_preserves_everything_else() {
        let mut doc = XmlDocument::parse(PROPS).unwrap();
        let (first, _) = doc.elements_named("PackageVersion").next().unwrap();
        assert!(doc.set_attribute(first, "Version", "3.1.1"));

        let expected = PROPS.replace(r#"Version="2.10.0""#, r#"Version="3.1.1""#);
        assert_eq!(doc.text(), expected);
    }

    #[test]
    fn test_set_attribute_shifts_later_spans() {
        let mut doc = XmlDocument::parse(PROPS).unwrap();
        let indexes: Vec<_> = doc.elements_named("PackageVersion").map(|(i, _)| i).collect();

        assert!(doc.set_attribute(indexes[0], "Include", "Serilog.AspNetCore.Extended"));
        assert!(doc.set_attribute(indexes[0], "Version", "8.0.0"));
        assert!(doc.set_attribute(indexes[1], "Version", "13.0.3"));

        let text = doc.text();
        assert!(text.contains(r#"<PackageVersion Include="Serilog.AspNetCore.Extended" Version="8.0.0" />"#));
        assert!(text.contains("<PackageVersion Include='Newtonsoft.Json'   Version='13.0.3'/>"));

        let reparsed = XmlDocument::parse(text.to_string()).unwrap();
        assert_eq!(reparsed.elements(), doc.elements());
    }

    #[test]
    fn test_set_missing_attribute_returns_false() {
        let mut doc = XmlDocument::parse(PROPS).unwrap();
        assert!(!doc.set_attribute(0, "Version", "1.0.0"));
        assert!(!doc.set_attribute(99, "Version", "1.0.0"));
        assert_eq!(doc.text(), PROPS);
    }

    #[test]
    fn test_entities_round_trip() {
        let mut doc = XmlDocument::parse(r#"<Project A="x &amp; y &#65;&#x42;" />"#).unwrap();
        assert_eq!(doc.elements()[0].attribute("A"), Some("x & y AB"));

        doc.set_attribute(0, "A", r#"a<"b"#);
        assert_eq!(doc.text(), r#"<Project A="a&lt;&quot;b" />"#);
        assert_eq!(doc.elements()[0].attribute("A"), Some(r#"a<"b"#));
    }

    #[test]
    fn test_quoted_gt_inside_attribute() {
        let doc = XmlDocument::parse(r#"<Project><Item Condition="'$(A)' > '1'" /></Project>"#).unwrap();
        assert_eq!(doc.elements()[1].attribute("Condition"), Some("'$(A)' > '1'"));
    }

    #[test]
    fn test_declaration_and_namespace_prefix() {
        let doc = XmlDocument::parse(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<msb:Project><msb:PackageVersion Include=\"A\" Version=\"1.0\" /></msb:Project>",
        )
        .unwrap();
        assert_eq!(doc.elements_named("PackageVersion").count(), 1);
    }

    #[test]
    fn test_malformed_inputs() {
        let err = XmlDocument::parse("<Project><!-- never closed").unwrap_err();
        assert!(err.to_string().contains("unterminated comment"));

        let err = XmlDocument::parse("<Project><Item Include=\"A\"").unwrap_err();
        assert!(err.to_string().contains("unterminated tag"));

        let err = XmlDocument::parse("<Project><Item Include=A /></Project>").unwrap_err();
        assert!(err.to_string().contains("malformed attribute"));

        let err = XmlDocument::parse("just text").unwrap_err();
        assert!(matches!(err, ManifestError::MissingRoot { .. }));
    }
}
