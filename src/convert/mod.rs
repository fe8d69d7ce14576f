//! Markdown to Zim conversion engine.
//!
//! A [`Converter`] holds everything one document needs while it is being
//! converted: the link and footnote tables collected from definitions, the
//! placeholder table and the nesting counters. The passes are split over the
//! submodules, each adding methods to [`Converter`]:
//!
//! - [`definitions`]: strip link and footnote definitions into the tables
//! - [`block`]: fenced code, headings, block quotes and paragraphs
//! - [`lists`]: ordered and unordered lists
//! - [`inline`]: code spans, escapes, emphasis and strike-through
//! - [`links`]: inline, reference and image links, footnote references
//! - [`footnotes`]: the trailing footnote section

pub mod lexer;

mod block;
mod definitions;
mod footnotes;
mod inline;
mod links;
mod lists;

use crate::config::Config;
use crate::error::{ConvertError, Result};
use crate::placeholder::PlaceholderTable;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static LINE_ENDINGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r").expect("valid line ending regex"));

static WHITESPACE_ONLY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]+$").expect("valid blank line regex"));

/// Converts Markdown documents to Zim wiki markup.
///
/// One converter can be reused for any number of documents; all
/// per-document state is reset at the start of [`Converter::convert`].
///
/// # Example
///
/// ```
/// use md2zim::{Config, Converter};
///
/// let mut converter = Converter::new(Config::default()).unwrap();
/// assert_eq!(converter.convert("# Title\n"), "===== Title =====\n");
/// ```
#[derive(Debug)]
pub struct Converter {
    config: Config,
    link_definition: Regex,
    placeholders: PlaceholderTable,
    urls: HashMap<String, String>,
    titles: HashMap<String, String>,
    footnotes: HashMap<String, String>,
    footnote_ids: Vec<String>,
    list_level: usize,
    depth: usize,
    last_item_two_eols: bool,
}

impl Converter {
    /// Create a converter, validating the configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let link_definition = definitions::link_definition_pattern(config.tab_width)?;
        Ok(Self {
            config,
            link_definition,
            placeholders: PlaceholderTable::new(),
            urls: HashMap::new(),
            titles: HashMap::new(),
            footnotes: HashMap::new(),
            footnote_ids: Vec::new(),
            list_level: 0,
            depth: 0,
            last_item_two_eols: false,
        })
    }

    /// The validated configuration this converter runs with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert one Markdown document to Zim markup.
    pub fn convert(&mut self, markdown: &str) -> String {
        self.reset();

        let text = self.normalize(markdown);
        let text = self.do_fenced_code_blocks(&text);
        let text = self.strip_footnote_definitions(&text);
        let text = self.strip_link_definitions(&text);
        log::debug!(
            "Collected {} link and {} footnote definitions",
            self.urls.len(),
            self.footnotes.len()
        );

        let text = match self.run_block_gamut(&text) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Block conversion skipped: {e}");
                text
            }
        };
        let mut text = self.add_footnotes(text);
        text.push('\n');

        debug_assert!(
            !self.placeholders.contains_token(&text),
            "placeholder token left in output"
        );
        debug_assert_eq!(self.list_level, 0);
        debug_assert_eq!(self.depth, 0);

        text
    }

    fn reset(&mut self) {
        self.placeholders = PlaceholderTable::new();
        self.urls.clear();
        self.titles.clear();
        self.footnotes.clear();
        self.footnote_ids.clear();
        self.list_level = 0;
        self.depth = 0;
        self.last_item_two_eols = false;
    }

    /// Unify line endings, pad the end, and empty whitespace-only lines.
    fn normalize(&self, markdown: &str) -> String {
        let mut text = LINE_ENDINGS.replace_all(markdown, "\n").into_owned();
        text.push_str("\n\n");
        WHITESPACE_ONLY_LINE.replace_all(&text, "").into_owned()
    }

    /// Run the block passes one level deeper. Fails once `max_depth` levels
    /// are open; the caller then leaves its construct as it was.
    pub(crate) fn run_block_gamut(&mut self, text: &str) -> Result<String> {
        if self.depth >= self.config.max_depth {
            return Err(ConvertError::StructuralLimit {
                limit: self.config.max_depth,
            }
            .into());
        }
        self.depth += 1;
        let result = self.block_gamut(text);
        self.depth -= 1;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn convert(markdown: &str) -> String {
        let _ = env_logger::builder().is_test(true).try_init();
        Converter::new(Config::default()).unwrap().convert(markdown)
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert(""), "\n");
    }

    #[test]
    fn test_plain_paragraphs() {
        assert_eq!(convert("one\n\n\n\ntwo"), "one\n\ntwo\n");
    }

    #[test]
    fn test_line_endings_normalized() {
        assert_eq!(convert("a\r\nb\rc"), convert("a\nb\nc"));
        assert_eq!(convert("a\r\n\r\nb"), "a\n\nb\n");
    }

    #[test]
    fn test_whitespace_only_lines_separate_paragraphs() {
        assert_eq!(convert("a\n   \nb"), "a\n\nb\n");
    }

    #[test]
    fn test_converter_is_reusable() {
        let mut converter = Converter::new(Config::default()).unwrap();
        let first = converter.convert("[a][x]\n\n[x]: http://x.com\n");
        assert_eq!(first, "[[http://x.com|a]]\n");
        // Definitions from the previous document are gone.
        assert_eq!(converter.convert("[a][x]\n"), "[a][x]\n");
    }

    #[test]
    fn test_config_is_kept() {
        let config = Config {
            max_depth: 8,
            ..Config::default()
        };
        let converter = Converter::new(config.clone()).unwrap();
        assert_eq!(converter.config(), &config);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            tab_width: 0,
            ..Config::default()
        };
        assert!(Converter::new(config).is_err());
    }

    #[test]
    fn test_deep_block_quotes_stay_bounded() {
        let config = Config {
            max_depth: 3,
            ..Config::default()
        };
        let markdown = format!("{} deep\n", ">".repeat(10));
        let out = Converter::new(config).unwrap().convert(&markdown);
        assert!(out.contains("deep"));
        assert!(out.starts_with("'''"));
    }

    #[test]
    fn test_no_placeholder_leaks() {
        let out = convert("\\* `a_b` **[x](http://a_b.com)** ![i](p*q.png)\n");
        assert!(!out.contains("md2z"));
        assert_eq!(out, "* `a_b` **[[http://a_b.com|x]]** {{p*q.png}}\n");
    }
}
