//! Ordered and unordered lists.
//!
//! A list region starts at a marker line and runs to the end of the text or
//! to a blank line followed by something that is not an item of the same
//! kind. Inside a region, items are split at lines carrying a marker at the
//! first item's indentation; anything more indented belongs to the item
//! above and is converted recursively.

use super::lexer::{
    indent_lines, item_start, line_starts, newline_run_len, outdent, region_start, MarkerKind,
};
use super::Converter;
use crate::error::{ConvertError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
struct ListRegion {
    /// Start of the replaced span.
    start: usize,
    /// Start of the first item line.
    list_start: usize,
    end: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct ListItem<'a> {
    /// Item preceded by a blank line.
    leading_line: bool,
    marker: &'a str,
    kind: MarkerKind,
    /// Item content after the marker, trailing newlines included.
    text: &'a str,
    /// Trailing newlines kept with the item (1 or 2).
    eols: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment<'a> {
    Text(&'a str),
    Item(ListItem<'a>),
}

fn find_list(
    text: &str,
    from: usize,
    kind: MarkerKind,
    max_indent: usize,
    nested: bool,
) -> Option<ListRegion> {
    let bytes = text.as_bytes();
    line_starts(text, from).find_map(|line| {
        let start = if nested || line == 0 {
            line
        } else if line == 1 && from == 0 && bytes[0] == b'\n' {
            0
        } else if line >= 2 && bytes[line - 2] == b'\n' {
            line
        } else {
            // Top-level lists must follow a blank line.
            return None;
        };
        let (rest, _) = region_start(&text[line..], max_indent, kind).ok()?;
        let content = text.len() - rest.len();
        Some(ListRegion {
            start,
            list_start: line,
            end: find_list_end(text, content, kind),
        })
    })
}

fn find_list_end(text: &str, content: usize, kind: MarkerKind) -> usize {
    let bytes = text.as_bytes();
    let mut pos = content + 1;
    while pos < bytes.len() {
        if bytes[pos] != b'\n' {
            pos += 1;
            continue;
        }
        let run = newline_run_len(&text[pos..]);
        let next = pos + run;
        if run >= 2 {
            let ends_here = text[next..].chars().next().is_some_and(|c| !c.is_whitespace())
                && !item_start(&text[next..]).is_ok_and(|(_, item)| item.kind == kind);
            if ends_here {
                return next;
            }
        }
        pos = next;
    }
    bytes.len()
}

fn split_items(list: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut copied = 0;

    while copied < list.len() {
        let Some((item, start, end)) = next_item(list, copied) else {
            break;
        };
        if copied < start {
            segments.push(Segment::Text(&list[copied..start]));
        }
        segments.push(Segment::Item(item));
        copied = end;
    }

    if copied < list.len() {
        segments.push(Segment::Text(&list[copied..]));
    }
    segments
}

fn next_item(list: &str, from: usize) -> Option<(ListItem<'_>, usize, usize)> {
    line_starts(list, from).find_map(|line| {
        let (rest, start) = item_start(&list[line..]).ok()?;
        let content = list.len() - rest.len();
        let (end, eols) = find_item_end(list, content, start.indent)?;
        let leading_line = line > from;
        let item = ListItem {
            leading_line,
            marker: start.marker,
            kind: start.kind,
            text: &list[content..end],
            eols,
        };
        let match_start = if leading_line { line - 1 } else { line };
        Some((item, match_start, end))
    })
}

/// End of the item whose content starts at `content`: the first newline
/// run followed by the end of the list or by a sibling marker line.
fn find_item_end(list: &str, content: usize, indent: &str) -> Option<(usize, usize)> {
    let bytes = list.as_bytes();
    let mut pos = content + 1;
    while pos < bytes.len() {
        if bytes[pos] != b'\n' {
            pos += 1;
            continue;
        }
        let run = newline_run_len(&list[pos..]);
        let next = pos + run;
        let sibling = list[next..]
            .strip_prefix(indent)
            .is_some_and(|line| item_start(line).is_ok_and(|(_, item)| item.indent.is_empty()));
        if next == list.len() || sibling {
            let eols = run.min(2);
            return Some((pos + eols, eols));
        }
        pos = next;
    }
    None
}

impl Converter {
    pub(crate) fn do_lists(&mut self, text: &str) -> String {
        let max_indent = self.config.tab_width - 1;
        let nested = self.list_level > 0;
        let mut text = text.to_string();
        let mut pos = 0;

        loop {
            let region = [MarkerKind::Unordered, MarkerKind::Ordered]
                .into_iter()
                .filter_map(|kind| find_list(&text, pos, kind, max_indent, nested))
                .min_by_key(|region| region.start);
            let Some(region) = region else {
                break;
            };

            let replacement = self.list_sub(&text[region.start..region.end], region);
            text.replace_range(region.start..region.end, &replacement);
            pos = region.start + replacement.len();
        }

        text
    }

    fn list_sub(&mut self, matched: &str, region: ListRegion) -> String {
        let list = &matched[region.list_start - region.start..];
        let items = match self.process_list_items(list) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("List left as text: {e}");
                return matched.to_string();
            }
        };
        let items = items.trim_end_matches('\n');

        if self.list_level > 0 {
            // Zim nests list items by tab indentation.
            let token = self.placeholders.hide(&indent_lines(items, "\t"));
            let trailing = &list[list.trim_end_matches('\n').len()..];
            let trailing = if trailing.is_empty() { "\n" } else { trailing };
            format!("{token}{trailing}")
        } else {
            format!("\n{}\n\n", self.placeholders.hide(items))
        }
    }

    fn process_list_items(&mut self, list: &str) -> Result<String> {
        if self.list_level >= self.config.max_depth {
            return Err(ConvertError::StructuralLimit {
                limit: self.config.max_depth,
            }
            .into());
        }

        self.list_level += 1;
        self.last_item_two_eols = false;

        let list = format!("{}\n", list.trim_end_matches('\n'));
        let mut out = String::with_capacity(list.len());
        for segment in split_items(&list) {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Item(item) => {
                    let converted = self.list_item_sub(&item);
                    out.push_str(&converted);
                }
            }
        }

        self.list_level -= 1;
        Ok(out)
    }

    fn list_item_sub(&mut self, item: &ListItem<'_>) -> String {
        let loose = item.leading_line || item.text.contains("\n\n") || self.last_item_two_eols;
        let outdented = outdent(item.text, self.config.tab_width);

        let body = if loose {
            match self.run_block_gamut(&outdented) {
                Ok(body) => body,
                Err(e) => {
                    log::debug!("List item left unparsed: {e}");
                    self.run_span_gamut(outdented.trim_end_matches('\n'))
                }
            }
        } else {
            let nested = self.do_lists(&outdented);
            let nested = nested.strip_suffix('\n').unwrap_or(nested.as_str());
            self.run_span_gamut(nested)
        };
        self.last_item_two_eols = item.eols == 2;

        let bullet = match item.kind {
            MarkerKind::Unordered => "*",
            MarkerKind::Ordered => item.marker,
        };
        format!("{bullet} {body}\n")
    }
}
