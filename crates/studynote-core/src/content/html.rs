//! Markup conversion for the rich-text tree.
//!
//! Parsing uses the html5ever tokenizer and rebuilds nesting with a simple
//! open-element stack: end tags close back to the nearest matching open
//! element, unmatched end tags are ignored and anything left open at the end
//! is closed. Comments and doctypes are dropped.

use super::tree::{Element, ElementKind, Node, RichText, StyleSet};
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use std::cell::RefCell;

enum MarkupToken {
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
}

struct TokenCollector {
    tokens: RefCell<Vec<MarkupToken>>,
}

impl TokenSink for TokenCollector {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => {
                let name = tag.name.to_string();
                match tag.kind {
                    TagKind::StartTag => {
                        let attrs = tag
                            .attrs
                            .iter()
                            .map(|a| (a.name.local.to_string(), a.value.to_string()))
                            .collect();
                        self.tokens.borrow_mut().push(MarkupToken::StartTag {
                            name,
                            attrs,
                            self_closing: tag.self_closing,
                        });
                    }
                    TagKind::EndTag => self.tokens.borrow_mut().push(MarkupToken::EndTag(name)),
                }
            }
            Token::CharacterTokens(text) => {
                self.tokens
                    .borrow_mut()
                    .push(MarkupToken::Text(text.to_string()));
            }
            Token::NullCharacterToken => {
                self.tokens
                    .borrow_mut()
                    .push(MarkupToken::Text("\0".to_string()));
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

fn tokenize(markup: &str) -> Vec<MarkupToken> {
    let sink = TokenCollector {
        tokens: RefCell::new(Vec::new()),
    };
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let mut queue = BufferQueue::default();
    queue.push_back(StrTendril::from(markup));
    let _ = tokenizer.feed(&mut queue);
    tokenizer.end();
    tokenizer.sink.tokens.into_inner()
}

/// Builds the tree, merging adjacent text runs.
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            root: Vec::new(),
            open: Vec::new(),
        }
    }

    fn children_mut(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root,
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let children = self.children_mut();
        if let Some(Node::Text(previous)) = children.last_mut() {
            previous.push_str(text);
        } else {
            children.push(Node::Text(text.to_string()));
        }
    }

    fn start(&mut self, name: &str, attrs: Vec<(String, String)>, self_closing: bool) {
        let mut element = Element::new(ElementKind::from_tag(name));
        for (attr, value) in attrs {
            if attr == "style" {
                element.style = StyleSet::parse(&value);
            } else {
                element.attrs.push((attr, value));
            }
        }

        if element.kind.is_void() || self_closing {
            self.children_mut().push(Node::Element(element));
        } else {
            self.open.push(element);
        }
    }

    fn end(&mut self, name: &str) {
        let Some(position) = self
            .open
            .iter()
            .rposition(|el| el.kind.tag_name() == name)
        else {
            return;
        };
        while self.open.len() > position {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        if let Some(element) = self.open.pop() {
            self.children_mut().push(Node::Element(element));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close_top();
        }
        self.root
    }
}

/// Parses a markup fragment into a content tree.
pub fn parse(markup: &str) -> RichText {
    let mut builder = TreeBuilder::new();
    for token in tokenize(markup) {
        match token {
            MarkupToken::StartTag {
                name,
                attrs,
                self_closing,
            } => builder.start(&name, attrs, self_closing),
            MarkupToken::EndTag(name) => builder.end(&name),
            MarkupToken::Text(text) => builder.push_text(&text),
        }
    }
    RichText::new(builder.finish())
}

/// Renders a content tree to markup.
///
/// Text and attribute values are escaped so that `parse(&render(x))`
/// reproduces `x` exactly. Carriage returns are written as character
/// references because the tokenizer normalizes literal ones to `\n`.
pub fn render(content: &RichText) -> String {
    let mut out = String::new();
    render_nodes(&content.nodes, &mut out);
    out
}

fn render_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => escape_text(text, out),
            Node::Element(element) => render_element(element, out),
        }
    }
}

fn render_element(element: &Element, out: &mut String) {
    let tag = element.kind.tag_name();
    out.push('<');
    out.push_str(tag);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_attr(value, out);
        out.push('"');
    }
    if !element.style.is_empty() {
        out.push_str(" style=\"");
        escape_attr(&element.style.render(), out);
        out.push('"');
    }
    out.push('>');

    if element.kind.is_void() {
        return;
    }

    render_nodes(&element.children, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            other => out.push(other),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\r' => out.push_str("&#13;"),
            other => out.push(other),
        }
    }
}

impl RichText {
    /// Parses a markup fragment. See [`parse`].
    pub fn from_html(markup: &str) -> Self {
        parse(markup)
    }

    /// Renders the fragment to markup. See [`render`].
    pub fn to_html(&self) -> String {
        render(self)
    }
}
