//! Rich-text content tree.
//!
//! Note bodies are stored as an explicit tree of block and inline elements
//! rather than raw markup, so that checklist toggling and wire encoding work
//! on structure instead of string patterns.

use serde::{Deserialize, Serialize};

/// Element kinds understood by the editor.
///
/// Every kind maps to exactly one tag name, so a tree rendered to markup and
/// parsed back yields the same kinds. Unknown tags are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Paragraph,
    /// `h1`..`h6`
    Heading(u8),
    UnorderedList,
    OrderedList,
    ListItem,
    Span,
    Bold,
    Strong,
    Italic,
    Emphasis,
    Strike,
    Underline,
    /// Legacy `<font color=..>` produced by older editors
    Font,
    Division,
    LineBreak,
    Image,
    /// Any other tag, stored lowercase
    Other(String),
}

impl ElementKind {
    /// Maps a (lowercase) tag name to its kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "p" => Self::Paragraph,
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "ul" => Self::UnorderedList,
            "ol" => Self::OrderedList,
            "li" => Self::ListItem,
            "span" => Self::Span,
            "b" => Self::Bold,
            "strong" => Self::Strong,
            "i" => Self::Italic,
            "em" => Self::Emphasis,
            "s" => Self::Strike,
            "u" => Self::Underline,
            "font" => Self::Font,
            "div" => Self::Division,
            "br" => Self::LineBreak,
            "img" => Self::Image,
            other => Self::Other(other.to_ascii_lowercase()),
        }
    }

    /// Returns the tag name used when rendering this kind.
    pub fn tag_name(&self) -> &str {
        match self {
            Self::Paragraph => "p",
            Self::Heading(1) => "h1",
            Self::Heading(2) => "h2",
            Self::Heading(3) => "h3",
            Self::Heading(4) => "h4",
            Self::Heading(5) => "h5",
            Self::Heading(_) => "h6",
            Self::UnorderedList => "ul",
            Self::OrderedList => "ol",
            Self::ListItem => "li",
            Self::Span => "span",
            Self::Bold => "b",
            Self::Strong => "strong",
            Self::Italic => "i",
            Self::Emphasis => "em",
            Self::Strike => "s",
            Self::Underline => "u",
            Self::Font => "font",
            Self::Division => "div",
            Self::LineBreak => "br",
            Self::Image => "img",
            Self::Other(tag) => tag,
        }
    }

    /// Void elements never have children or an end tag.
    pub fn is_void(&self) -> bool {
        match self {
            Self::LineBreak | Self::Image => true,
            Self::Other(tag) => matches!(
                tag.as_str(),
                "hr" | "wbr" | "input" | "meta" | "link" | "area" | "col" | "source"
            ),
            _ => false,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::UnorderedList | Self::OrderedList)
    }
}

/// Ordered CSS declarations of a `style` attribute.
///
/// Order is preserved so that `set` on an existing property edits it in
/// place and rendering is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSet {
    declarations: Vec<(String, String)>,
}

impl StyleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `"color: red; text-decoration: line-through"`.
    ///
    /// Declarations without a colon or with an empty property are dropped.
    pub fn parse(style: &str) -> Self {
        let declarations = style
            .split(';')
            .filter_map(|decl| {
                let (property, value) = decl.split_once(':')?;
                let property = property.trim().to_ascii_lowercase();
                if property.is_empty() {
                    return None;
                }
                Some((property, value.trim().to_string()))
            })
            .collect();
        Self { declarations }
    }

    /// Renders declarations in order, `"a: b; c: d"`.
    pub fn render(&self) -> String {
        self.declarations
            .iter()
            .map(|(property, value)| format!("{}: {}", property, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a property, replacing an existing declaration in place.
    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let value = value.into();
        match self.declarations.iter_mut().find(|(p, _)| p == property) {
            Some(existing) => existing.1 = value,
            None => self.declarations.push((property.to_string(), value)),
        }
    }

    /// Removes a property and returns its previous value.
    pub fn remove(&mut self, property: &str) -> Option<String> {
        let index = self.declarations.iter().position(|(p, _)| p == property)?;
        Some(self.declarations.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(p, v)| (p.as_str(), v.as_str()))
    }
}

/// An element node with its attributes, style and children.
///
/// The `style` attribute is held separately in `style`; `attrs` never
/// contains a `style` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub kind: ElementKind,
    pub attrs: Vec<(String, String)>,
    pub style: StyleSet,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attrs: Vec::new(),
            style: StyleSet::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_children(vec![Node::Text(text.into())])
    }

    pub fn with_style(mut self, style: StyleSet) -> Self {
        self.style = style;
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attrs.iter().position(|(n, _)| n == name)?;
        Some(self.attrs.remove(index).1)
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

/// A node of the content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

/// A rich-text fragment: the body of one note card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    pub nodes: Vec<Node>,
}

impl RichText {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// A single paragraph of plain text.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(vec![Element::new(ElementKind::Paragraph).with_text(text).into()])
    }

    /// An unordered list with one item per entry.
    pub fn bullet_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = items
            .into_iter()
            .map(|item| Element::new(ElementKind::ListItem).with_text(item).into())
            .collect();
        Self::new(vec![
            Element::new(ElementKind::UnorderedList)
                .with_children(items)
                .into(),
        ])
    }

    /// Concatenated text content, ignoring markup.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.nodes, &mut out);
        out
    }

    /// True when the fragment has no visible text and no images.
    pub fn is_blank(&self) -> bool {
        self.plain_text().trim().is_empty() && !contains_kind(&self.nodes, &ElementKind::Image)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

fn contains_kind(nodes: &[Node], kind: &ElementKind) -> bool {
    nodes.iter().any(|node| match node {
        Node::Element(el) => el.kind == *kind || contains_kind(&el.children, kind),
        Node::Text(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_mapping_is_one_to_one() {
        for tag in [
            "p", "h1", "h3", "h6", "ul", "ol", "li", "span", "b", "strong", "i", "em", "s", "u",
            "font", "div", "br", "img", "mark",
        ] {
            assert_eq!(ElementKind::from_tag(tag).tag_name(), tag);
        }
    }

    #[test]
    fn test_style_parse_and_render() {
        let style = StyleSet::parse(" color : red;background-color: #fff ;; bogus");
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("background-color"), Some("#fff"));
        assert_eq!(style.render(), "color: red; background-color: #fff");
    }

    #[test]
    fn test_style_set_replaces_in_place() {
        let mut style = StyleSet::parse("color: red; font-weight: bold");
        style.set("color", "blue");
        assert_eq!(style.render(), "color: blue; font-weight: bold");
        assert_eq!(style.remove("color"), Some("blue".to_string()));
        assert_eq!(style.render(), "font-weight: bold");
    }

    #[test]
    fn test_blank_detection() {
        assert!(RichText::default().is_blank());
        assert!(RichText::paragraph("   ").is_blank());
        assert!(!RichText::paragraph("x").is_blank());

        let image = RichText::new(vec![Element::new(ElementKind::Image).into()]);
        assert!(!image.is_blank());
    }

    #[test]
    fn test_plain_text() {
        let content = RichText::bullet_list(["one", "two"]);
        assert_eq!(content.plain_text(), "onetwo");
    }
}
