//! Lenient HTML fragment tree.
//!
//! Markdown output and hand-written templates are HTML, not XML, so the
//! quick-xml reader runs with every well-formedness check disabled and the
//! tree builder papers over the rest:
//!
//! - void elements (`<br>`, `<img>`, ...) never open a scope
//! - an end tag closes every element opened after its match
//! - a stray end tag is kept as opaque markup
//! - `<script>`/`<style>` bodies are raw text
//! - a block element start closes an open `<p>`, `<li>` closes an open `<li>`
//! - a `&` that starts no reference is plain text
//! - a `<` that starts no tag is plain text, as is the first character of
//!   anything else the tokenizer rejects; tokenizing resumes right after it
//!
//! Nodes only record byte ranges into the source. Rewrites build a new string
//! from those ranges and leave the parsed tree untouched.

use quick_xml::{Reader, events::BytesStart, events::Event};
use std::ops::Range;

/// Elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose body is not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Block elements that implicitly close an open paragraph.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "nav", "ol", "p", "pre", "section", "table",
    "ul",
];

// ============================================================================
// Tree
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Range<usize>),
    /// Comments, doctypes, stray end tags and anything else kept verbatim
    Other(Range<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lower-cased tag name
    pub name: String,
    /// From `<` of the start tag to `>` of the end tag (or wherever it was closed)
    pub outer: Range<usize>,
    /// Between the start and end tags
    pub inner: Range<usize>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn span(&self) -> Range<usize> {
        match self {
            Self::Element(el) => el.outer.clone(),
            Self::Text(range) | Self::Other(range) => range.clone(),
        }
    }
}

/// A parsed fragment borrowing its source.
#[derive(Debug)]
pub struct Fragment<'a> {
    source: &'a str,
    pub nodes: Vec<Node>,
}

impl<'a> Fragment<'a> {
    /// Parse a fragment. Never fails.
    pub fn parse(source: &'a str) -> Self {
        let nodes = TreeBuilder::new(source).build();
        Self { source, nodes }
    }

    #[inline]
    pub fn slice(&self, range: &Range<usize>) -> &'a str {
        &self.source[range.clone()]
    }

    /// Inner HTML of an element.
    #[inline]
    pub fn inner_html(&self, el: &Element) -> &'a str {
        self.slice(&el.inner)
    }

    /// Outer HTML of an element.
    #[inline]
    pub fn outer_html(&self, el: &Element) -> &'a str {
        self.slice(&el.outer)
    }

    /// Concatenated raw text of an element's descendants, tags stripped.
    pub fn text(&self, el: &Element) -> String {
        let mut out = String::new();
        self.collect_text(&el.children, &mut out);
        out
    }

    /// Concatenated raw text of the whole fragment, tags stripped.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&self.nodes, &mut out);
        out
    }

    fn collect_text(&self, nodes: &[Node], out: &mut String) {
        for node in nodes {
            match node {
                Node::Text(range) => out.push_str(self.slice(range)),
                Node::Element(el) if !is_raw_text(&el.name) => self.collect_text(&el.children, out),
                _ => {}
            }
        }
    }

    /// First element with the given name in document order.
    pub fn find_first(&self, name: &str) -> Option<&Element> {
        fn find<'n>(nodes: &'n [Node], name: &str) -> Option<&'n Element> {
            nodes.iter().find_map(|node| match node {
                Node::Element(el) if el.name == name => Some(el),
                Node::Element(el) => find(&el.children, name),
                _ => None,
            })
        }
        find(&self.nodes, name)
    }

    /// Visit every element in document order.
    pub fn for_each_element(&self, mut visit: impl FnMut(&Element)) {
        fn walk(nodes: &[Node], visit: &mut impl FnMut(&Element)) {
            for node in nodes {
                if let Node::Element(el) = node {
                    visit(el);
                    walk(&el.children, visit);
                }
            }
        }
        walk(&self.nodes, &mut visit);
    }

    /// Re-serialize top-level nodes, substituting where `replace` returns `Some`.
    ///
    /// Bytes of untouched nodes (and any gap between nodes) are copied as-is.
    pub fn rebuild_top_level(&self, mut replace: impl FnMut(&Node) -> Option<String>) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for node in &self.nodes {
            let span = node.span();
            out.push_str(&self.source[cursor..span.start]);
            match replace(node) {
                Some(replacement) => out.push_str(&replacement),
                None => out.push_str(&self.source[span.clone()]),
            }
            cursor = span.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}

/// Apply non-overlapping byte-range edits to a string.
///
/// Edits may come in any order; duplicates of the same range are applied once.
pub fn apply_edits(source: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by_key(|(range, _)| (range.start, range.end));
    edits.dedup_by(|a, b| a.0 == b.0);

    let mut out = String::with_capacity(source.len() + edits.len() * 8);
    let mut cursor = 0;
    for (range, replacement) in edits {
        if range.start < cursor {
            continue;
        }
        out.push_str(&source[cursor..range.start]);
        out.push_str(&replacement);
        cursor = range.end;
    }
    out.push_str(&source[cursor..]);
    out
}

#[inline]
pub fn is_raw_text(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

// ============================================================================
// Builder
// ============================================================================

struct TreeBuilder<'a> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
    /// Offset of the reader's input within `source`
    base: usize,
    stack: Vec<Element>,
    roots: Vec<Node>,
}

fn reader_at(source: &str, offset: usize) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(&source[offset..]);
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);
    reader.config_mut().allow_dangling_amp = true;
    reader
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            reader: reader_at(source, 0),
            base: 0,
            stack: Vec::new(),
            roots: Vec::new(),
        }
    }

    fn build(mut self) -> Vec<Node> {
        let mut pos = 0;
        loop {
            let event = self.reader.read_event();
            let end = self.position();
            match event {
                Ok(Event::Start(elem) | Event::Empty(elem)) if !starts_tag(&elem) => {
                    pos = self.resume_after(pos);
                    continue;
                }
                Ok(Event::Start(elem)) => {
                    let (name, id, classes) = element_info(&elem);
                    self.implicit_close(&name, pos);
                    if VOID_ELEMENTS.contains(&name.as_str()) {
                        self.push(Node::Element(leaf(name, pos..end, id, classes)));
                    } else if is_raw_text(&name) {
                        self.raw_text_element(elem.name().as_ref().to_vec(), name, pos, end, id, classes);
                    } else {
                        self.stack.push(Element {
                            name,
                            outer: pos..end,
                            inner: end..end,
                            id,
                            classes,
                            children: Vec::new(),
                        });
                    }
                }
                Ok(Event::Empty(elem)) => {
                    let (name, id, classes) = element_info(&elem);
                    self.implicit_close(&name, pos);
                    self.push(Node::Element(leaf(name, pos..end, id, classes)));
                }
                Ok(Event::End(elem)) => {
                    let name = String::from_utf8_lossy(elem.name().as_ref()).to_ascii_lowercase();
                    self.close(&name, pos, end);
                }
                Ok(Event::Text(_) | Event::CData(_) | Event::GeneralRef(_)) => {
                    self.push(Node::Text(pos..end));
                }
                Ok(Event::Eof) => break,
                Ok(_) => self.push(Node::Other(pos..end)),
                Err(_) if pos < self.source.len() => {
                    pos = self.resume_after(pos);
                    continue;
                }
                Err(_) => break,
            }
            pos = end;
        }

        let len = self.source.len();
        while let Some(mut el) = self.stack.pop() {
            el.inner.end = len;
            el.outer.end = len;
            self.push(Node::Element(el));
        }
        self.roots
    }

    #[inline]
    fn position(&self) -> usize {
        let len = self.source.len();
        usize::try_from(self.reader.buffer_position())
            .map_or(len, |offset| self.base + offset)
            .min(len)
    }

    /// Keep the character at `pos` as text and restart the reader just after it.
    fn resume_after(&mut self, pos: usize) -> usize {
        let width = self.source[pos..].chars().next().map_or(1, char::len_utf8);
        let next = pos + width;
        self.push(Node::Text(pos..next));
        self.base = next;
        self.reader = reader_at(self.source, next);
        next
    }

    fn push(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    /// Close elements that HTML closes implicitly when `name` starts.
    fn implicit_close(&mut self, name: &str, at: usize) {
        let closes = match self.stack.last() {
            Some(open) if open.name == "p" => CLOSES_PARAGRAPH.contains(&name),
            Some(open) if open.name == "li" => name == "li",
            _ => false,
        };
        if closes && let Some(mut el) = self.stack.pop() {
            el.inner.end = at;
            el.outer.end = at;
            self.push(Node::Element(el));
        }
    }

    /// Close the innermost open element named `name`, and everything opened after it.
    fn close(&mut self, name: &str, start: usize, end: usize) {
        let Some(index) = self.stack.iter().rposition(|el| el.name == name) else {
            self.push(Node::Other(start..end));
            return;
        };
        while self.stack.len() > index + 1 {
            if let Some(mut el) = self.stack.pop() {
                el.inner.end = start;
                el.outer.end = start;
                self.push(Node::Element(el));
            }
        }
        if let Some(mut el) = self.stack.pop() {
            el.inner.end = start;
            el.outer.end = end;
            self.push(Node::Element(el));
        }
    }

    fn raw_text_element(
        &mut self,
        raw_name: Vec<u8>,
        name: String,
        start: usize,
        body_start: usize,
        id: Option<String>,
        classes: Vec<String>,
    ) {
        let end_name = quick_xml::name::QName(&raw_name);
        let (inner_end, outer_end) = match self.reader.read_to_end(end_name) {
            Ok(_) => {
                let after = self.position();
                let close = self.source[body_start..after]
                    .rfind("</")
                    .map_or(after, |i| body_start + i);
                (close, after)
            }
            Err(_) => (self.source.len(), self.source.len()),
        };

        let mut el = leaf(name, start..outer_end, id, classes);
        el.inner = body_start..inner_end;
        if body_start < inner_end {
            el.children.push(Node::Text(body_start..inner_end));
        }
        self.push(Node::Element(el));
    }
}

fn leaf(name: String, outer: Range<usize>, id: Option<String>, classes: Vec<String>) -> Element {
    let end = outer.end;
    Element {
        name,
        outer,
        inner: end..end,
        id,
        classes,
        children: Vec::new(),
    }
}

/// A start tag needs a name beginning with a letter; `a < b` is text.
fn starts_tag(elem: &BytesStart<'_>) -> bool {
    elem.name().as_ref().first().is_some_and(u8::is_ascii_alphabetic)
}

fn element_info(elem: &BytesStart<'_>) -> (String, Option<String>, Vec<String>) {
    let name = String::from_utf8_lossy(elem.name().as_ref()).to_ascii_lowercase();
    let mut id = None;
    let mut classes = Vec::new();
    for attr in elem.html_attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => id = Some(String::from_utf8_lossy(&attr.value).into_owned()),
            b"class" => classes.extend(
                String::from_utf8_lossy(&attr.value)
                    .split_whitespace()
                    .map(str::to_owned),
            ),
            _ => {}
        }
    }
    (name, id, classes)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &Node) -> &Element {
        match node {
            Node::Element(el) => el,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_nested() {
        let html = "<p>Hello <em>world</em></p>\n<p>Second</p>";
        let frag = Fragment::parse(html);

        assert_eq!(frag.nodes.len(), 3);
        let first = element(&frag.nodes[0]);
        assert_eq!(first.name, "p");
        assert_eq!(frag.inner_html(first), "Hello <em>world</em>");
        assert_eq!(frag.outer_html(first), "<p>Hello <em>world</em></p>");
        assert_eq!(frag.text(first), "Hello world");
    }

    #[test]
    fn test_rebuild_identity() {
        let html = "<p>a &amp; b</p><!-- note --><br><div class=\"x\">y</div> tail";
        let frag = Fragment::parse(html);
        assert_eq!(frag.rebuild_top_level(|_| None), html);
    }

    #[test]
    fn test_void_elements_do_not_nest() {
        let frag = Fragment::parse("<p>one<br>two</p><p>three</p>");
        assert_eq!(frag.nodes.len(), 2);
        assert_eq!(frag.text(element(&frag.nodes[0])), "onetwo");
    }

    #[test]
    fn test_unclosed_elements_close_at_end() {
        let html = "<p>open <em>never closed";
        let frag = Fragment::parse(html);
        let p = element(&frag.nodes[0]);
        assert_eq!(p.outer, 0..html.len());
        assert_eq!(frag.text(p), "open never closed");
    }

    #[test]
    fn test_stray_end_tag_is_kept() {
        let html = "text</span><p>x</p>";
        let frag = Fragment::parse(html);
        assert!(matches!(frag.nodes[1], Node::Other(_)));
        assert_eq!(frag.rebuild_top_level(|_| None), html);
    }

    #[test]
    fn test_paragraph_closed_by_block() {
        let frag = Fragment::parse("<p>one<div>two</div>");
        assert_eq!(frag.nodes.len(), 2);
        assert_eq!(element(&frag.nodes[0]).name, "p");
        assert_eq!(element(&frag.nodes[1]).name, "div");
    }

    #[test]
    fn test_script_body_is_raw() {
        let html = "<script>if (a < b) { x(); }</script><p>after</p>";
        let frag = Fragment::parse(html);
        let script = element(&frag.nodes[0]);
        assert_eq!(frag.inner_html(script), "if (a < b) { x(); }");
        assert_eq!(frag.full_text(), "after");
    }

    #[test]
    fn test_ids_and_classes() {
        let frag = Fragment::parse(r#"<nav id="top" class="navbar  navbar-default"></nav>"#);
        let nav = element(&frag.nodes[0]);
        assert_eq!(nav.id.as_deref(), Some("top"));
        assert_eq!(nav.classes, vec!["navbar", "navbar-default"]);
    }

    #[test]
    fn test_find_first_depth_first() {
        let frag = Fragment::parse("<div><p>inner</p></div><p>outer</p>");
        let p = frag.find_first("p").unwrap();
        assert_eq!(frag.outer_html(p), "<p>inner</p>");
    }

    #[test]
    fn test_bare_ampersand_is_text() {
        let html = "<h1>R&D</h1><nav class=navbar><a href=/ id=brand>Tom & Jerry</a></nav>";
        let frag = Fragment::parse(html);

        assert_eq!(frag.nodes.len(), 2);
        let h1 = element(&frag.nodes[0]);
        assert_eq!(frag.text(h1), "R&D");
        assert_eq!(frag.outer_html(h1), "<h1>R&D</h1>");

        let nav = element(&frag.nodes[1]);
        assert_eq!(nav.classes, vec!["navbar"]);
        let a = frag.find_first("a").unwrap();
        assert_eq!(a.id.as_deref(), Some("brand"));
        assert_eq!(frag.text(a), "Tom & Jerry");
        assert_eq!(frag.rebuild_top_level(|_| None), html);
    }

    #[test]
    fn test_bare_less_than_is_text() {
        let html = "<p>1 < 2 and 3 <4</p><p>after</p>";
        let frag = Fragment::parse(html);

        assert_eq!(frag.nodes.len(), 2);
        assert_eq!(frag.text(element(&frag.nodes[0])), "1 < 2 and 3 <4");
        assert_eq!(frag.text(element(&frag.nodes[1])), "after");
    }

    #[test]
    fn test_apply_edits() {
        let out = apply_edits("a b c", vec![(3..4, "&nbsp;".into()), (1..2, "_".into())]);
        assert_eq!(out, "a_b&nbsp;c");

        let out = apply_edits("a b", vec![(1..2, "X".into()), (1..2, "X".into())]);
        assert_eq!(out, "aXb");
    }
}
