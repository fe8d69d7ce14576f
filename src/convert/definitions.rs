//! Extraction of link and footnote definitions.

use super::lexer::{dedent, footnote_definition_start, normalize_footnote_id};
use super::Converter;
use crate::error::Result;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static BARE_AMPERSAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#?[xX]?(?:[0-9a-fA-F]+|\w+);)?").expect("valid ampersand regex")
});

/// Build the link definition pattern for a given tab width:
///
/// ```text
/// [id]: url "optional title"
/// ```
///
/// indented by less than one tab. The url may be wrapped in `<>` and the
/// title may sit on the next line, quoted with `"`, `'` or `()`.
pub(crate) fn link_definition_pattern(tab_width: usize) -> Result<Regex> {
    let max_indent = tab_width.saturating_sub(1);
    let pattern = format!(
        r#"(?m)^[ ]{{0,{max_indent}}}\[(.+)\]:[ \t]*\n?[ \t]*<?(.+?)>?(?:(?:[ \t]+|[ \t]*\n[ \t]*)['"(]([^\n]*)['")])?[ \t]*(?:\n+|\z)"#
    );
    Ok(Regex::new(&pattern)?)
}

/// Encode `&`, `<` and `>` that do not already start an entity or a tag.
pub(crate) fn encode_amps_and_angles(text: &str) -> String {
    let text = BARE_AMPERSAND.replace_all(text, |caps: &Captures| match caps.get(1) {
        Some(entity) => format!("&{}", entity.as_str()),
        None => "&amp;".to_string(),
    });

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '<' if !chars
                .peek()
                .is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '?' | '$' | '!')) =>
            {
                out.push_str("&lt;");
            }
            '>' if !out.chars().next_back().is_some_and(|p| {
                p.is_ascii_alphanumeric() || matches!(p, '?' | '!' | '/' | '\'' | '"' | '-')
            }) =>
            {
                out.push_str("&gt;");
            }
            _ => out.push(c),
        }
    }
    out
}

fn is_continuation(line: &str, tab_width: usize) -> bool {
    line.starts_with('\t')
        || (line.len() >= tab_width && line.bytes().take(tab_width).all(|b| b == b' '))
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

impl Converter {
    /// Remove `[id]: url "title"` lines, recording the url and title under
    /// the lowercased id.
    pub(crate) fn strip_link_definitions(&mut self, text: &str) -> String {
        let urls = &mut self.urls;
        let titles = &mut self.titles;
        self.link_definition
            .replace_all(text, |caps: &Captures| {
                let id = caps[1].to_lowercase();
                log::trace!("Link definition: {id}");
                urls.insert(id.clone(), encode_amps_and_angles(&caps[2]));
                if let Some(title) = caps.get(3).filter(|t| !t.as_str().is_empty()) {
                    titles.insert(id, title.as_str().to_string());
                }
                ""
            })
            .into_owned()
    }

    /// Remove `[^id]: body` definitions, recording each body under its
    /// normalized id. The body runs over following lines indented by one
    /// tab, blank lines between them included.
    pub(crate) fn strip_footnote_definitions(&mut self, text: &str) -> String {
        let tab_width = self.config.tab_width;
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let head = footnote_definition_start(line.trim_end_matches('\n'), tab_width - 1);
            let Ok((rest, raw_id)) = head else {
                out.push_str(line);
                i += 1;
                continue;
            };

            let mut body = String::new();
            let mut next = i + 1;
            if rest.trim().is_empty() {
                // Body starts on the next non-blank line.
                body.push('\n');
                while next < lines.len() && is_blank(lines[next]) {
                    next += 1;
                }
                if let Some(first) = lines.get(next) {
                    body.push_str(first);
                    next += 1;
                }
            } else {
                body.push_str(rest);
                body.push('\n');
            }

            loop {
                let mut after_blanks = next;
                while after_blanks < lines.len() && is_blank(lines[after_blanks]) {
                    after_blanks += 1;
                }
                match lines.get(after_blanks) {
                    Some(line) if is_continuation(line, tab_width) => {
                        for blank in &lines[next..after_blanks] {
                            body.push_str(blank);
                        }
                        body.push_str(line);
                        next = after_blanks + 1;
                    }
                    _ => {
                        next = after_blanks;
                        break;
                    }
                }
            }

            let skip_first_line = !body.starts_with('\n');
            let body = dedent(&body, 8, skip_first_line);
            let id = normalize_footnote_id(raw_id);
            log::trace!("Footnote definition: {id}");
            self.footnotes.insert(id, format!("{}\n\n", body.trim()));
            i = next;
        }

        out
    }
}
