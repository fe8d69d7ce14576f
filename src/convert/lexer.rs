//! Scanners and line helpers shared by the conversion passes.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1, take_while_m_n},
    character::complete::{char, digit1, one_of},
    combinator::{opt, recognize, verify},
    sequence::pair,
    IResult, Parser,
};

/// The two list flavours, matched separately so adjacent lists of
/// different styles are not merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `*`, `+` or `-`
    Unordered,
    /// `1.`, `2.`, ...
    Ordered,
}

/// The opening of a list item line: `indent marker whitespace`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStart<'a> {
    pub indent: &'a str,
    pub marker: &'a str,
    pub kind: MarkerKind,
}

fn is_inline_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Parse a list marker.
pub fn list_marker(input: &str) -> IResult<&str, (&str, MarkerKind)> {
    alt((
        recognize(one_of("*+-")).map(|m| (m, MarkerKind::Unordered)),
        recognize(pair(digit1, char('.'))).map(|m| (m, MarkerKind::Ordered)),
    ))
    .parse(input)
}

/// Parse the start of a list item with any indentation and any marker.
pub fn item_start(input: &str) -> IResult<&str, ItemStart<'_>> {
    let (input, indent) = take_while(is_inline_space).parse(input)?;
    let (input, (marker, kind)) = list_marker(input)?;
    let (input, _) = take_while1(is_inline_space).parse(input)?;
    Ok((input, ItemStart { indent, marker, kind }))
}

/// Parse the first line of a list region: at most `max_indent` spaces, a
/// marker of the requested kind and whitespace. A horizontal rule written
/// with the marker (`- - -`, `* * *`) is rejected.
pub fn region_start(input: &str, max_indent: usize, kind: MarkerKind) -> IResult<&str, &str> {
    let (input, _) = take_while_m_n(0, max_indent, |c: char| c == ' ').parse(input)?;
    let (input, marker) = verify(list_marker, |(_, k): &(&str, MarkerKind)| *k == kind)
        .map(|(m, _)| m)
        .parse(input)?;
    let (rest, _) = take_while1(is_inline_space).parse(input)?;

    let after_spaces = rest.trim_start_matches(' ');
    if after_spaces
        .strip_prefix(marker)
        .is_some_and(|tail| tail.starts_with(' '))
    {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }

    Ok((rest, marker))
}

/// Parse the tail of a reference link, `[id]`, allowing one space or one
/// newline plus indentation before it. Returns the id.
pub fn reference_tail(input: &str) -> IResult<&str, &str> {
    let (input, _) = opt(char(' ')).parse(input)?;
    let (input, _) = opt(pair(char('\n'), take_while(|c: char| c == ' '))).parse(input)?;
    let (input, _) = char('[').parse(input)?;
    let (input, id) = take_until("]").parse(input)?;
    let (input, _) = char(']').parse(input)?;
    Ok((input, id))
}

/// Parse the head of a footnote definition line, `[^id]:`, indented by at
/// most `max_indent` spaces. Returns the raw id; the rest of the line is the
/// first line of the body.
pub fn footnote_definition_start(input: &str, max_indent: usize) -> IResult<&str, &str> {
    let (input, _) = take_while_m_n(0, max_indent, |c: char| c == ' ').parse(input)?;
    let (input, _) = tag("[^").parse(input)?;
    let (input, id) = verify(take_until("]:"), |id: &str| !id.is_empty()).parse(input)?;
    let (input, _) = tag("]:").parse(input)?;
    let (input, _) = take_while(is_inline_space).parse(input)?;
    Ok((input, id))
}

/// Parse a run of backticks.
pub fn backtick_run(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c == '`').parse(input)
}

/// Length in bytes of the backtick run at the start of `input` (0 if none).
pub fn backtick_run_len(input: &str) -> usize {
    backtick_run(input).map_or(0, |(_, run)| run.len())
}

/// Number of consecutive `\n` at the start of `input`.
pub fn newline_run_len(input: &str) -> usize {
    input.bytes().take_while(|&b| b == b'\n').count()
}

/// Whether a byte offset is at the start of a line.
pub fn is_line_start(text: &str, pos: usize) -> bool {
    pos == 0 || text.as_bytes().get(pos - 1) == Some(&b'\n')
}

/// Byte offsets of every line start at or after `from`.
pub fn line_starts(text: &str, from: usize) -> impl Iterator<Item = usize> + '_ {
    let first = (from <= text.len() && is_line_start(text, from)).then_some(from);
    let rest = text
        .get(from..)
        .unwrap_or("")
        .match_indices('\n')
        .map(move |(i, _)| from + i + 1)
        .filter(move |&ls| ls < text.len());
    first.into_iter().chain(rest)
}

/// Remove one level of indentation (a tab or up to `tab_width` spaces)
/// from every line.
pub fn outdent(text: &str, tab_width: usize) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            if let Some(rest) = line.strip_prefix('\t') {
                return rest;
            }
            let spaces = line.bytes().take(tab_width).take_while(|&b| b == b' ').count();
            &line[spaces..]
        })
        .collect()
}

/// Prefix every non-empty line with `prefix`.
pub fn indent_lines(text: &str, prefix: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            if line.trim_end_matches('\n').is_empty() {
                line.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect()
}

/// Remove the common leading whitespace of all non-blank lines. Tabs count
/// to the next multiple of `tab_size` columns. With `skip_first_line`, the
/// first line neither takes part in the margin nor gets dedented.
pub fn dedent(text: &str, tab_size: usize, skip_first_line: bool) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let skip = usize::from(skip_first_line);

    let margin = lines
        .iter()
        .skip(skip)
        .filter_map(|line| leading_columns(line, tab_size))
        .min();

    let Some(margin) = margin.filter(|&m| m > 0) else {
        return text.to_string();
    };

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i < skip {
                (*line).to_string()
            } else {
                strip_columns(line, margin, tab_size)
            }
        })
        .collect()
}

/// Indentation width of a line, or `None` for a blank line.
fn leading_columns(line: &str, tab_size: usize) -> Option<usize> {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += tab_size - (width % tab_size),
            '\n' | '\r' => return None,
            _ => return Some(width),
        }
    }
    None
}

fn strip_columns(line: &str, margin: usize, tab_size: usize) -> String {
    let mut removed = 0;
    for (i, c) in line.char_indices() {
        match c {
            ' ' => removed += 1,
            '\t' => removed += tab_size - (removed % tab_size),
            _ => return line[i..].to_string(),
        }
        if removed == margin {
            return line[i + 1..].to_string();
        }
        if removed > margin {
            return format!("{}{}", " ".repeat(removed - margin), &line[i + 1..]);
        }
    }
    String::new()
}

/// Footnote ids: anything that is not a word character becomes `-`.
pub fn normalize_footnote_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_item_start() {
        let (rest, item) = item_start("  12. text").unwrap();
        assert_eq!(item.indent, "  ");
        assert_eq!(item.marker, "12.");
        assert_eq!(item.kind, MarkerKind::Ordered);
        assert_eq!(rest, "text");

        assert!(item_start("-text").is_err());
        assert!(item_start("1 text").is_err());
    }

    #[test]
    fn test_region_start() {
        assert_eq!(region_start("- a", 3, MarkerKind::Unordered).unwrap().1, "-");
        assert!(region_start("- a", 3, MarkerKind::Ordered).is_err());
        assert!(region_start("    - a", 3, MarkerKind::Unordered).is_err());
        assert!(region_start("- - -", 3, MarkerKind::Unordered).is_err());
        assert!(region_start("* * *", 3, MarkerKind::Unordered).is_err());
        assert_eq!(region_start("3. x", 3, MarkerKind::Ordered).unwrap().1, "3.");
    }

    #[test]
    fn test_reference_tail() {
        assert_eq!(reference_tail("[id] rest").unwrap(), (" rest", "id"));
        assert_eq!(reference_tail(" [id]").unwrap().1, "id");
        assert_eq!(reference_tail("\n   [id]").unwrap().1, "id");
        assert_eq!(reference_tail("[]").unwrap().1, "");
        assert!(reference_tail("  [id]").is_err());
        assert!(reference_tail("(url)").is_err());
    }

    #[test]
    fn test_footnote_definition_start() {
        assert_eq!(
            footnote_definition_start("[^note 1]: Body", 3).unwrap(),
            ("Body", "note 1")
        );
        assert!(footnote_definition_start("[^]: Body", 3).is_err());
        assert!(footnote_definition_start("    [^a]: Body", 3).is_err());
    }

    #[test]
    fn test_backtick_run_len() {
        assert_eq!(backtick_run_len("``code``"), 2);
        assert_eq!(backtick_run_len("code"), 0);
    }

    #[test]
    fn test_line_starts() {
        let text = "ab\ncd\n\nef";
        assert_eq!(line_starts(text, 0).collect::<Vec<_>>(), vec![0, 3, 6, 7]);
        assert_eq!(line_starts(text, 4).collect::<Vec<_>>(), vec![6, 7]);
    }

    #[test]
    fn test_outdent() {
        assert_eq!(outdent("a\n    b\n\tc\n  d\n", 4), "a\nb\nc\nd\n");
        assert_eq!(outdent("      e\n", 4), "  e\n");
    }

    #[test]
    fn test_indent_lines_skips_blank() {
        assert_eq!(indent_lines("a\n\nb", "  "), "  a\n\n  b");
    }

    #[test]
    fn test_dedent() {
        assert_eq!(dedent("first\n    a\n      b\n", 8, true), "first\na\n  b\n");
        assert_eq!(dedent("\n    a\n    b\n", 8, false), "\na\nb\n");
        assert_eq!(dedent("\ta\n    b\n", 8, false), "    a\nb\n");
    }

    #[test]
    fn test_normalize_footnote_id() {
        assert_eq!(normalize_footnote_id("my note.1"), "my-note-1");
        assert_eq!(normalize_footnote_id("a_b"), "a_b");
    }
}
