//! Syntax highlighting for fenced code blocks

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::tree::{try_map_elements, Element, Node};
use crate::config::HighlightConfig;

/// Highlights `<pre><code class="language-*">` blocks with syntect
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    line_numbers: bool,
    auto_detect: bool,
}

impl Highlighter {
    /// Create a highlighter; `None` when no theme at all is available
    pub fn new(config: &HighlightConfig) -> Option<Self> {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(&config.theme) {
            Some(theme) => theme,
            None => {
                tracing::warn!(
                    "Unknown highlight theme {:?}, falling back to a default theme",
                    config.theme
                );
                themes.into_values().next()?
            }
        };

        Some(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            line_numbers: config.line_numbers,
            auto_detect: config.auto_detect,
        })
    }

    /// Replace every recognised code block in the tree with highlighted markup
    pub fn highlight(&self, nodes: Vec<Node>) -> Result<Vec<Node>, syntect::Error> {
        try_map_elements(nodes, &mut |el| self.highlight_block(el))
    }

    fn highlight_block(&self, pre: Element) -> Result<Node, syntect::Error> {
        let Some(code) = code_child(&pre) else {
            return Ok(Node::Element(pre));
        };

        let declared = code
            .attr("class")
            .and_then(|class| class.split_whitespace().find_map(|c| c.strip_prefix("language-")));
        let source = code.text_content();

        let Some(syntax) = self.find_syntax(declared, &source) else {
            return Ok(Node::Element(pre));
        };
        let lang = declared.unwrap_or(&syntax.name).to_lowercase();

        let lines = self.highlight_lines(&source, syntax)?;
        let html = if self.line_numbers {
            self.with_line_numbers(&lines, &lang)
        } else {
            format!(
                r#"<pre class="highlight language-{}"{}><code>{}</code></pre>"#,
                lang,
                self.background_style(),
                lines.iter().map(|line| format!("{}\n", line)).collect::<String>()
            )
        };
        Ok(Node::Raw(html + "\n"))
    }

    /// Resolve the syntax for a block; plain text and unknown languages are skipped
    fn find_syntax(&self, declared: Option<&str>, source: &str) -> Option<&SyntaxReference> {
        let syntax = match declared {
            Some(lang) => self
                .syntax_set
                .find_syntax_by_token(lang)
                .or_else(|| self.syntax_set.find_syntax_by_extension(lang)),
            None if self.auto_detect => source
                .lines()
                .next()
                .and_then(|first| self.syntax_set.find_syntax_by_first_line(first)),
            None => None,
        };

        match syntax {
            Some(syntax) if syntax.name != self.syntax_set.find_syntax_plain_text().name => {
                Some(syntax)
            }
            Some(_) => None,
            None => {
                if let Some(lang) = declared {
                    tracing::debug!("No syntax for language {:?}, leaving block as is", lang);
                }
                None
            }
        }
    }

    /// Highlighted markup per source line, without line endings
    fn highlight_lines(
        &self,
        source: &str,
        syntax: &SyntaxReference,
    ) -> Result<Vec<String>, syntect::Error> {
        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        LinesWithEndings::from(source)
            .map(|line| {
                // The parser needs the ending; the markup must not carry it
                let regions: Vec<_> = highlighter
                    .highlight_line(line, &self.syntax_set)?
                    .into_iter()
                    .map(|(style, text)| (style, text.trim_end_matches(['\n', '\r'])))
                    .filter(|(_, text)| !text.is_empty())
                    .collect();
                styled_line_to_highlighted_html(&regions[..], IncludeBackground::No)
            })
            .collect()
    }

    /// Gutter/code table layout for numbered blocks
    fn with_line_numbers(&self, lines: &[String], lang: &str) -> String {
        let mut gutter = String::new();
        let mut code = String::new();

        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                gutter.push('\n');
                code.push('\n');
            }
            gutter.push_str(&format!(r#"<span class="line-number">{}</span>"#, i + 1));
            code.push_str(line);
        }

        format!(
            r#"<div class="highlight language-{}"{}><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></div>"#,
            lang,
            self.background_style(),
            gutter,
            code
        )
    }

    fn background_style(&self) -> String {
        match self.theme.settings.background {
            Some(c) => format!(r#" style="background-color:#{:02x}{:02x}{:02x};""#, c.r, c.g, c.b),
            None => String::new(),
        }
    }
}

/// The lone `<code>` child of a `<pre>` element
fn code_child(pre: &Element) -> Option<&Element> {
    if pre.tag != "pre" || pre.children.len() != 1 {
        return None;
    }
    match &pre.children[0] {
        Node::Element(code) if code.tag == "code" => Some(code),
        _ => None,
    }
}
