//! Link resolution: inline links, reference links, images and footnote
//! references.
//!
//! Links are found by a cursor scan rather than a pattern, since link text
//! may itself contain brackets and the url may contain parentheses.

use super::lexer::reference_tail;
use super::Converter;

/// The `(url "title")` part of an inline link.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InlineTail<'a> {
    pub url: &'a str,
    pub title: Option<&'a str>,
    /// Byte offset just past the closing `)`.
    pub end: usize,
}

/// Offset of the `]` matching the `[` at `open`, looking at no more than
/// `max_scan` bytes.
pub(crate) fn find_closing_bracket(text: &str, open: usize, max_scan: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let limit = open.saturating_add(max_scan).min(bytes.len());
    let mut depth = 0usize;
    for (pos, &b) in bytes.iter().enumerate().take(limit).skip(open + 1) {
        match b {
            b'[' => depth += 1,
            b']' if depth == 0 => return Some(pos),
            b']' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Offset just past the `close` that balances an already opened `open`,
/// or the end of the text.
fn find_balanced(bytes: &[u8], start: usize, open: u8, close: u8) -> usize {
    let mut count = 1usize;
    let mut pos = start;
    while count > 0 && pos < bytes.len() {
        if bytes[pos] == open {
            count += 1;
        } else if bytes[pos] == close {
            count -= 1;
        }
        pos += 1;
    }
    pos
}

/// Parse the inline tail starting at the `(` at `paren`.
pub(crate) fn parse_inline_tail(text: &str, paren: usize) -> Option<InlineTail<'_>> {
    let bytes = text.as_bytes();
    let start = text
        .get(paren + 1..)?
        .find(|c: char| !c.is_whitespace())
        .map(|offset| paren + 1 + offset)?;

    let has_angle = bytes[start] == b'<';
    let mut end = start;
    if has_angle {
        end = find_balanced(bytes, start + 1, b'<', b'>');
    }
    end = find_balanced(bytes, end, b'(', b')');

    let body = text[start..end].strip_suffix(')')?;
    let (url, title) = split_title(body);
    let url = url.trim_end();
    let url = if has_angle { strip_angle(url) } else { url };

    Some(InlineTail { url, title, end })
}

/// Split `url "title"` at the first whitespace run followed by the quote
/// that also ends the body.
fn split_title(body: &str) -> (&str, Option<&str>) {
    let bytes = body.as_bytes();
    let quote = match bytes.last() {
        Some(&q @ (b'"' | b'\'')) => q,
        _ => return (body, None),
    };
    let last = bytes.len() - 1;

    let mut pos = 0;
    while pos < last {
        if bytes[pos] == b' ' || bytes[pos] == b'\t' {
            let mut after = pos;
            while after < last && (bytes[after] == b' ' || bytes[after] == b'\t') {
                after += 1;
            }
            if after < last && bytes[after] == quote {
                return (&body[..pos], Some(&body[after + 1..last]));
            }
            pos = after;
        } else {
            pos += 1;
        }
    }
    (body, None)
}

fn strip_angle(url: &str) -> &str {
    match (url.find('<'), url.rfind('>')) {
        (Some(open), Some(close)) if open < close => &url[open + 1..close],
        _ => url,
    }
}

/// Parse a reference tail at `pos`. Returns the id and the offset past `]`.
pub(crate) fn parse_reference_tail(text: &str, pos: usize) -> Option<(&str, usize)> {
    let input = text.get(pos..)?;
    let (rest, id) = reference_tail(input).ok()?;
    Some((id, text.len() - rest.len()))
}

impl Converter {
    /// Rewrite every link in `text` into Zim form.
    pub(crate) fn resolve_links(&mut self, text: &str) -> String {
        let max_scan = self.config.max_link_text_scan;
        let mut text = text.to_string();
        let mut anchor_allowed_pos = 0;
        let mut cursor = 0;

        while let Some(offset) = text.get(cursor..).and_then(|rest| rest.find('[')) {
            let mut start = cursor + offset;
            let Some(close) = find_closing_bracket(&text, start, max_scan) else {
                log::trace!("No `]` within {max_scan} bytes of offset {start}");
                cursor = start + 1;
                continue;
            };
            let link_text = text[start + 1..close].to_string();
            let after = close + 1;

            if let Some(id) = link_text.strip_prefix('^') {
                match self.footnote_reference(id) {
                    Some(marker) => {
                        text.replace_range(start..after, &marker);
                        cursor = start + marker.len();
                    }
                    None => cursor = after,
                }
                continue;
            }

            if after == text.len() {
                break;
            }

            let (url, tail_end) = if text.as_bytes()[after] == b'(' {
                match parse_inline_tail(&text, after) {
                    Some(tail) => {
                        if let Some(title) = tail.title {
                            log::trace!("Dropping link title {title:?}");
                        }
                        (tail.url.to_string(), tail.end)
                    }
                    None => {
                        cursor = start + 1;
                        continue;
                    }
                }
            } else if let Some((id, end)) = parse_reference_tail(&text, after) {
                let key = if id.is_empty() {
                    link_text.to_lowercase()
                } else {
                    id.to_lowercase()
                };
                match self.urls.get(&key) {
                    Some(url) => {
                        if let Some(title) = self.titles.get(&key) {
                            log::trace!("Dropping title {title:?} of reference {key}");
                        }
                        (url.clone(), end)
                    }
                    None => {
                        log::debug!("Undefined link reference: {key}");
                        cursor = end;
                        continue;
                    }
                }
            } else {
                cursor = start + 1;
                continue;
            };

            let is_image = start > 0 && text.as_bytes()[start - 1] == b'!';
            let url = self.protect_url(&url);

            if is_image {
                start -= 1;
                let image = format!("{{{{{url}}}}}");
                text.replace_range(start..tail_end, &image);
                cursor = start + image.len();
            } else if start >= anchor_allowed_pos {
                let head = format!("[[{url}|");
                let anchor = format!("{head}{link_text}]]");
                text.replace_range(start..tail_end, &anchor);
                cursor = start + head.len();
                anchor_allowed_pos = start + anchor.len();
            } else {
                // Already inside a link: no nested anchors.
                cursor = start + 1;
            }
        }

        text
    }

    /// Hide `*` and `_` in a url so the emphasis passes leave it alone.
    fn protect_url(&mut self, url: &str) -> String {
        let star = self.placeholders.hide("*");
        let underscore = self.placeholders.hide("_");
        url.replace('*', &star).replace('_', &underscore)
    }
}
