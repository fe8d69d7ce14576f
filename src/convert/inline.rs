//! Span-level passes: code spans, backslash escapes, strike-through and
//! emphasis. Links live in [`super::links`].

use super::lexer::backtick_run_len;
use super::Converter;
use crate::placeholder::ESCAPE_CHARS;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static STRIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)~~(\S|\S.*?\S)~~").expect("valid strike regex"));

static STRONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\*\*(\S(?:.*?\S)??[*_]*)\*\*|__(\S(?:.*?\S)??[*_]*)__")
        .expect("valid strong regex")
});

static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\*(\S(?:.*?\S)??)\*|_(\S(?:.*?\S)??)_").expect("valid emphasis regex")
});

/// Inner text of whichever alternative matched.
fn either<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map_or("", |m| m.as_str())
}

fn do_strike(text: &str) -> String {
    STRIKE
        .replace_all(text, |caps: &Captures| format!("~~{}~~", &caps[1]))
        .into_owned()
}

impl Converter {
    pub(crate) fn run_span_gamut(&mut self, text: &str) -> String {
        let text = self.do_code_spans(text);
        let text = self.encode_backslash_escapes(&text);
        let text = self.resolve_links(&text);
        let text = do_strike(&text);
        let text = self.do_italics_and_bold(&text);
        self.placeholders.restore(&text).replace('\u{feff}', "")
    }

    /// Hide code spans. A span opened by N backticks closes at the next run
    /// of exactly N; its content is trimmed of spaces and tabs.
    fn do_code_spans(&mut self, text: &str) -> String {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        let mut cursor = 0;

        while let Some(offset) = text[cursor..].find('`') {
            let open = cursor + offset;
            let run = backtick_run_len(&text[open..]);
            let content_start = open + run;

            if open > 0 && bytes[open - 1] == b'\\' {
                cursor = content_start;
                continue;
            }

            let mut search = content_start;
            let mut close = None;
            while let Some(offset) = text[search..].find('`') {
                let candidate = search + offset;
                let candidate_run = backtick_run_len(&text[candidate..]);
                if candidate_run == run {
                    close = Some(candidate);
                    break;
                }
                search = candidate + candidate_run;
            }

            match close {
                Some(close) if close > content_start => {
                    let ticks = &text[open..content_start];
                    let code = text[content_start..close].trim_matches([' ', '\t']);
                    out.push_str(&text[copied..open]);
                    out.push_str(&self.placeholders.hide(&format!("{ticks}{code}{ticks}")));
                    cursor = close + run;
                    copied = cursor;
                }
                _ => cursor = content_start,
            }
        }

        out.push_str(&text[copied..]);
        out
    }

    /// `\X` for a Markdown punctuation character X becomes a literal X.
    fn encode_backslash_escapes(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();
        let mut buf = [0u8; 4];

        while let Some(c) = chars.next() {
            if c == '\\' {
                let token = chars
                    .peek()
                    .filter(|next| ESCAPE_CHARS.contains(**next))
                    .and_then(|next| self.placeholders.token_for(next.encode_utf8(&mut buf)));
                if let Some(token) = token {
                    out.push_str(token);
                    chars.next();
                    continue;
                }
            }
            out.push(c);
        }
        out
    }

    fn do_italics_and_bold(&mut self, text: &str) -> String {
        // Bold is wrapped in a placeholder so the emphasis pass cannot see it.
        let bold = self.placeholders.hide("**");
        let text = STRONG.replace_all(text, |caps: &Captures| {
            format!("{bold}{}{bold}", either(caps))
        });
        EMPHASIS
            .replace_all(&text, |caps: &Captures| format!("//{}//", either(caps)))
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;

    fn span(text: &str) -> String {
        Converter::new(Config::default()).unwrap().run_span_gamut(text)
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(span("*a* and _b_"), "//a// and //b//");
        assert_eq!(span("**a** and __b__"), "**a** and **b**");
    }

    #[test]
    fn test_bold_italic() {
        assert_eq!(span("***word***"), "**//word//**");
    }

    #[test]
    fn test_bold_with_inner_star() {
        assert_eq!(span("**a*b**"), "**a*b**");
    }

    #[test]
    fn test_emphasis_needs_non_space_edges() {
        assert_eq!(span("a * b * c"), "a * b * c");
        assert_eq!(span("2 * 3 = 6"), "2 * 3 = 6");
    }

    #[test]
    fn test_strike() {
        assert_eq!(span("~~gone~~ and ~~ no ~~"), "~~gone~~ and ~~ no ~~");
    }

    #[test]
    fn test_code_span_verbatim() {
        assert_eq!(span("run `a_b *c*` now"), "run `a_b *c*` now");
        assert_eq!(span("`` a`b ``"), "``a`b``");
        assert_eq!(span("```x```"), "```x```");
    }

    #[test]
    fn test_unclosed_code_span() {
        assert_eq!(span("a `b *c*"), "a `b //c//");
    }

    #[test]
    fn test_backslash_escapes() {
        assert_eq!(span("\\*not em\\*"), "*not em*");
        assert_eq!(span("\\`not code`"), "`not code`");
        assert_eq!(span("C:\\path"), "C:\\path");
        assert_eq!(span("a\\\\b"), "a\\b");
    }

    #[test]
    fn test_byte_order_mark_removed() {
        assert_eq!(span("\u{feff}text"), "text");
    }
}
