//! HTML-shaped document tree built from markdown events

use std::collections::HashMap;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, LinkType, Tag, TagEnd};

/// A node of the rendered document
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Markup emitted verbatim (inline/block HTML, highlighted code)
    Raw(String),
}

/// An HTML element with ordered attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
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
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    fn is_void(&self) -> bool {
        matches!(self.tag.as_str(), "img" | "br" | "hr" | "input")
    }

    fn is_block(&self) -> bool {
        matches!(
            self.tag.as_str(),
            "p" | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "blockquote"
                | "pre"
                | "ul"
                | "ol"
                | "li"
                | "table"
                | "thead"
                | "tbody"
                | "tr"
                | "hr"
                | "div"
                | "dl"
                | "dt"
                | "dd"
                | "figure"
        )
    }

    /// Containers whose first child starts on its own line
    fn opens_line(&self) -> bool {
        matches!(
            self.tag.as_str(),
            "blockquote" | "ul" | "ol" | "table" | "thead" | "tbody" | "dl"
        )
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Raw(_) => {}
        }
    }
}

/// Rebuild a tree bottom-up, letting `f` replace every element.
///
/// Children are rewritten before their parent is handed to `f`, and a node
/// returned by `f` is not visited again, so replacements keep the original
/// position among their siblings.
pub fn try_map_elements<E, F>(nodes: Vec<Node>, f: &mut F) -> Result<Vec<Node>, E>
where
    F: FnMut(Element) -> Result<Node, E>,
{
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Element(mut el) => {
                el.children = try_map_elements(std::mem::take(&mut el.children), f)?;
                f(el)
            }
            other => Ok(other),
        })
        .collect()
}

/// Image whose alt text is still being collected
struct PendingImage {
    element: Element,
    alt: String,
    depth: usize,
}

/// Builds the element tree from a markdown event stream
#[derive(Default)]
pub struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Element>,
    /// Number of elements each open markdown tag pushed
    frames: Vec<usize>,
    image: Option<PendingImage>,
    alignments: Vec<Alignment>,
    cell_index: usize,
    in_table_head: bool,
    footnotes: HashMap<String, usize>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a full event stream and return the top-level nodes
    pub fn build<'a, I>(mut self, events: I) -> Result<Vec<Node>, String>
    where
        I: IntoIterator<Item = Event<'a>>,
    {
        for event in events {
            self.push_event(event)?;
        }
        self.finish()
    }

    pub fn push_event(&mut self, event: Event<'_>) -> Result<(), String> {
        if let Some(image) = self.image.as_mut() {
            match event {
                Event::Start(_) => image.depth += 1,
                Event::End(_) if image.depth > 0 => image.depth -= 1,
                Event::End(_) => self.finish_image(),
                Event::Text(text) | Event::Code(text) => image.alt.push_str(&text),
                Event::SoftBreak | Event::HardBreak => image.alt.push(' '),
                _ => {}
            }
            return Ok(());
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(end) => self.end(end)?,
            Event::Text(text) => self.append(Node::Text(text.into_string())),
            Event::Code(code) => {
                self.append(Node::Element(
                    Element::new("code").with_child(Node::Text(code.into_string())),
                ));
            }
            // Raw HTML never reaches the output, only authored markdown does
            Event::Html(html) | Event::InlineHtml(html) => {
                tracing::debug!("Dropping raw HTML {:?}", html);
            }
            Event::FootnoteReference(label) => {
                let number = self.footnote_number(&label);
                let link = Element::new("a")
                    .with_attr("href", format!("#{}", label))
                    .with_child(Node::Text(number.to_string()));
                self.append(Node::Element(
                    Element::new("sup")
                        .with_attr("class", "footnote-reference")
                        .with_child(Node::Element(link)),
                ));
            }
            Event::SoftBreak => self.append(Node::Text("\n".to_string())),
            Event::HardBreak => self.append(Node::Element(Element::new("br"))),
            Event::Rule => self.append(Node::Element(Element::new("hr"))),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attr("disabled", "")
                    .with_attr("type", "checkbox");
                if checked {
                    input.set_attr("checked", "");
                }
                self.append(Node::Element(input));
            }
            other => tracing::debug!("Ignoring unsupported markdown event {:?}", other),
        }
        Ok(())
    }

    fn start(&mut self, tag: Tag<'_>) {
        let opened = match tag {
            Tag::Paragraph => self.open(Element::new("p")),
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let mut el = Element::new(&level.to_string());
                if let Some(id) = id {
                    el.set_attr("id", id.into_string());
                }
                if !classes.is_empty() {
                    let classes: Vec<String> = classes.iter().map(|c| c.to_string()).collect();
                    el.set_attr("class", classes.join(" "));
                }
                for (name, value) in attrs {
                    el.set_attr(&name, value.map(|v| v.into_string()).unwrap_or_default());
                }
                self.open(el)
            }
            Tag::BlockQuote(_) => self.open(Element::new("blockquote")),
            Tag::CodeBlock(kind) => {
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(info) = kind {
                    if let Some(lang) = fence_language(&info) {
                        code.set_attr("class", format!("language-{}", lang));
                    }
                }
                self.open(Element::new("pre")) + self.open(code)
            }
            Tag::HtmlBlock => 0,
            Tag::List(Some(1)) => self.open(Element::new("ol")),
            Tag::List(Some(start)) => {
                self.open(Element::new("ol").with_attr("start", start.to_string()))
            }
            Tag::List(None) => self.open(Element::new("ul")),
            Tag::Item => self.open(Element::new("li")),
            Tag::FootnoteDefinition(label) => {
                let number = self.footnote_number(&label);
                let mut div = Element::new("div")
                    .with_attr("class", "footnote-definition")
                    .with_attr("id", label.into_string());
                div.children.push(Node::Element(
                    Element::new("sup")
                        .with_attr("class", "footnote-definition-label")
                        .with_child(Node::Text(number.to_string())),
                ));
                self.open(div)
            }
            Tag::DefinitionList => self.open(Element::new("dl")),
            Tag::DefinitionListTitle => self.open(Element::new("dt")),
            Tag::DefinitionListDefinition => self.open(Element::new("dd")),
            Tag::Table(alignments) => {
                self.alignments = alignments;
                self.open(Element::new("table"))
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell_index = 0;
                self.open(Element::new("thead")) + self.open(Element::new("tr"))
            }
            Tag::TableRow => {
                self.cell_index = 0;
                self.open(Element::new("tr"))
            }
            Tag::TableCell => {
                let mut cell = Element::new(if self.in_table_head { "th" } else { "td" });
                let align = match self.alignments.get(self.cell_index) {
                    Some(Alignment::Left) => Some("left"),
                    Some(Alignment::Center) => Some("center"),
                    Some(Alignment::Right) => Some("right"),
                    _ => None,
                };
                if let Some(align) = align {
                    cell.set_attr("style", format!("text-align: {}", align));
                }
                self.open(cell)
            }
            Tag::Emphasis => self.open(Element::new("em")),
            Tag::Strong => self.open(Element::new("strong")),
            Tag::Strikethrough => self.open(Element::new("del")),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let href = match link_type {
                    LinkType::Email => format!("mailto:{}", dest_url),
                    _ => dest_url.into_string(),
                };
                let mut a = Element::new("a").with_attr("href", href);
                if !title.is_empty() {
                    a.set_attr("title", title.into_string());
                }
                self.open(a)
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut img = Element::new("img").with_attr("src", dest_url.into_string());
                if !title.is_empty() {
                    img.set_attr("title", title.into_string());
                }
                self.image = Some(PendingImage {
                    element: img,
                    alt: String::new(),
                    depth: 0,
                });
                return;
            }
            other => {
                tracing::debug!("Ignoring unsupported markdown tag {:?}", other);
                0
            }
        };
        self.frames.push(opened);
    }

    fn end(&mut self, end: TagEnd) -> Result<(), String> {
        let count = self
            .frames
            .pop()
            .ok_or_else(|| format!("unexpected end of {:?}", end))?;
        for _ in 0..count {
            self.close()?;
        }

        match end {
            TagEnd::TableHead => {
                self.in_table_head = false;
                // Rows after the head live in a tbody closed together with the table
                let tbody = self.open(Element::new("tbody"));
                if let Some(table) = self.frames.last_mut() {
                    *table += tbody;
                }
            }
            TagEnd::TableCell => self.cell_index += 1,
            TagEnd::Table => self.alignments.clear(),
            _ => {}
        }
        Ok(())
    }

    fn finish_image(&mut self) {
        if let Some(PendingImage {
            element, alt, ..
        }) = self.image.take()
        {
            // alt goes right after src to match conventional markup
            let mut img = Element::new("img");
            let mut attrs = element.attrs.into_iter();
            if let Some(src) = attrs.next() {
                img.attrs.push(src);
            }
            img.attrs.push(("alt".to_string(), alt));
            img.attrs.extend(attrs);
            self.append(Node::Element(img));
        }
    }

    fn finish(self) -> Result<Vec<Node>, String> {
        if self.image.is_some() {
            return Err("image left open at end of document".to_string());
        }
        if !self.stack.is_empty() || !self.frames.is_empty() {
            return Err(format!(
                "{} element(s) left open at end of document",
                self.stack.len()
            ));
        }
        Ok(self.root)
    }

    fn open(&mut self, element: Element) -> usize {
        self.stack.push(element);
        1
    }

    fn close(&mut self) -> Result<(), String> {
        let element = self
            .stack
            .pop()
            .ok_or_else(|| "closing tag without an open element".to_string())?;
        self.append(Node::Element(element));
        Ok(())
    }

    fn append(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn footnote_number(&mut self, label: &str) -> usize {
        let next = self.footnotes.len() + 1;
        *self.footnotes.entry(label.to_string()).or_insert(next)
    }
}

/// First token of a fence info string (` ```rust,ignore ` → `rust`)
fn fence_language(info: &str) -> Option<&str> {
    info.split(|c: char| c.is_whitespace() || c == ',')
        .find(|token| !token.is_empty())
}

/// Serialize nodes to an HTML string
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_nodes(nodes, &mut out);
    out
}

fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => escape_into(text, out),
            Node::Raw(html) => out.push_str(html),
            Node::Element(el) => write_element(el, out),
        }
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(value, out);
        out.push('"');
    }

    if el.is_void() {
        out.push_str(" />");
        if el.is_block() {
            out.push('\n');
        }
        return;
    }

    out.push('>');
    if el.opens_line() {
        out.push('\n');
    }
    write_nodes(&el.children, out);
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
    if el.is_block() {
        out.push('\n');
    }
}

fn escape_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{Options, Parser};

    fn build(markdown: &str) -> Vec<Node> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        TreeBuilder::new()
            .build(Parser::new_ext(markdown, options))
            .unwrap()
    }

    #[test]
    fn test_paragraph_and_heading() {
        let html = to_html(&build("# Title\n\nSome *emphasis* & `code`."));
        assert_eq!(
            html,
            "<h1>Title</h1>\n<p>Some <em>emphasis</em> &amp; <code>code</code>.</p>\n"
        );
    }

    #[test]
    fn test_image_collects_alt_text() {
        let nodes = build("![A *bold* photo](x.png \"Caption\")");
        let Node::Element(p) = &nodes[0] else {
            panic!("expected paragraph");
        };
        let Node::Element(img) = &p.children[0] else {
            panic!("expected image");
        };
        assert_eq!(img.tag, "img");
        assert_eq!(img.attr("src"), Some("x.png"));
        assert_eq!(img.attr("alt"), Some("A bold photo"));
        assert_eq!(img.attr("title"), Some("Caption"));
        assert_eq!(
            to_html(&nodes),
            "<p><img src=\"x.png\" alt=\"A bold photo\" title=\"Caption\" /></p>\n"
        );
    }

    #[test]
    fn test_fenced_code_keeps_language() {
        let nodes = build("```rust,ignore\nfn main() {}\n```");
        assert_eq!(
            to_html(&nodes),
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_table_structure() {
        let html = to_html(&build("| a | b |\n|:--|--:|\n| 1 | 2 |\n"));
        assert!(html.contains("<thead>\n<tr><th style=\"text-align: left\">a</th>"));
        assert!(html.contains("<tbody>\n<tr><td style=\"text-align: left\">1</td><td style=\"text-align: right\">2</td></tr>"));
        assert!(html.ends_with("</tbody>\n</table>\n"));
    }

    #[test]
    fn test_task_list_and_footnote() {
        let html = to_html(&build("- [x] done\n\nNote[^n].\n\n[^n]: The note."));
        assert!(html.contains("<input disabled=\"\" type=\"checkbox\" checked=\"\" />"));
        assert!(html.contains("<sup class=\"footnote-reference\"><a href=\"#n\">1</a></sup>"));
        assert!(html.contains("<div class=\"footnote-definition\" id=\"n\">"));
    }

    #[test]
    fn test_unbalanced_events_fail() {
        let events = vec![Event::End(TagEnd::Paragraph)];
        assert!(TreeBuilder::new().build(events).is_err());

        let events = vec![Event::Start(Tag::Paragraph), Event::Text("open".into())];
        assert!(TreeBuilder::new().build(events).is_err());
    }

    #[test]
    fn test_try_map_elements_replaces_in_place() {
        let nodes = build("a\n\nb\n\nc");
        let mapped: Result<Vec<Node>, ()> = try_map_elements(nodes, &mut |el| {
            if el.text_content() == "b" {
                Ok(Node::Raw("<hr />".to_string()))
            } else {
                Ok(Node::Element(el))
            }
        });
        assert_eq!(to_html(&mapped.unwrap()), "<p>a</p>\n<hr /><p>c</p>\n");
    }
}
