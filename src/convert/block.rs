//! Block-level passes: fenced code, headings, block quotes and paragraphs.
//!
//! Every converted block is hidden behind a placeholder until the paragraph
//! pass restores it, so later passes never see Zim markup.

use super::lexer::indent_lines;
use super::{Converter, WHITESPACE_ONLY_LINE};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Zim headings use up to six `=` on each side, fewer for deeper levels.
const HEADING_MARKS: usize = 6;

static FENCED_CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)(?:\n\n|\A\n?)^```[\w+-]*[ \t]*\n(.*?)^```[ \t]*\n")
        .expect("valid fenced code regex")
});

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(.+)[ \t]*\n(=+|-+)[ \t]*\n+|^(#{1,6})[ \t]*(.+?)[ \t]*(#*)\n+",
    )
    .expect("valid heading regex")
});

static BLOCK_QUOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^[ \t]*>[ \t]?.+\n(?:.+\n)*\n*)+").expect("valid block quote regex")
});

static BLOCK_QUOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").expect("valid quote marker regex"));

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid paragraph regex"));

impl Converter {
    pub(crate) fn block_gamut(&mut self, text: &str) -> String {
        let text = self.do_fenced_code_blocks(text);
        let text = self.do_headings(&text);
        let text = self.do_lists(&text);
        let text = self.do_block_quotes(&text);
        self.form_paragraphs(&text)
    }

    /// Fenced code becomes a bare ``` block; the language tag is dropped.
    pub(crate) fn do_fenced_code_blocks(&mut self, text: &str) -> String {
        FENCED_CODE_BLOCK
            .replace_all(text, |caps: &Captures| {
                let code = &caps[1];
                let code = code.strip_suffix('\n').unwrap_or(code);
                let block = format!("```\n{code}\n```");
                format!("\n\n{}\n\n", self.placeholders.hide(&block))
            })
            .into_owned()
    }

    fn do_headings(&mut self, text: &str) -> String {
        HEADING
            .replace_all(text, |caps: &Captures| self.heading_sub(caps))
            .into_owned()
    }

    fn heading_sub(&mut self, caps: &Captures) -> String {
        let (level, title) = match caps.get(2) {
            Some(underline) => {
                let level = if underline.as_str().starts_with('=') { 1 } else { 2 };
                (level, caps[1].trim_end().to_string())
            }
            None => {
                let mut title = caps[4].to_string();
                // `\#` before the closing hashes is part of the title.
                if title.ends_with('\\') && !caps[5].is_empty() {
                    title.push('#');
                }
                (caps[3].len(), title)
            }
        };

        let marks = "=".repeat(HEADING_MARKS.saturating_sub(level).max(1));
        let heading = format!("{marks} {} {marks}", self.run_span_gamut(&title));
        format!("{}\n\n", self.placeholders.hide(&heading))
    }

    fn do_block_quotes(&mut self, text: &str) -> String {
        if !text.contains('>') {
            return text.to_string();
        }
        BLOCK_QUOTE
            .replace_all(text, |caps: &Captures| self.block_quote_sub(&caps[0]))
            .into_owned()
    }

    fn block_quote_sub(&mut self, quote: &str) -> String {
        let inner = BLOCK_QUOTE_MARKER.replace_all(quote, "");
        let inner = WHITESPACE_ONLY_LINE.replace_all(&inner, "");

        match self.run_block_gamut(&inner) {
            Ok(body) => {
                let block = format!("'''\n{}\n'''", indent_lines(&body, "  "));
                format!("{}\n\n", self.placeholders.hide(&block))
            }
            Err(e) => {
                log::debug!("Block quote left as text: {e}");
                quote.to_string()
            }
        }
    }

    fn form_paragraphs(&mut self, text: &str) -> String {
        let text = text.trim_matches('\n');
        let paragraphs: Vec<&str> = PARAGRAPH_BREAK.split(text).collect();
        paragraphs
            .into_iter()
            .map(|paragraph| self.run_span_gamut(paragraph.trim_start_matches([' ', '\t'])))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
