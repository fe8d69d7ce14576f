//! Footnote references and the footnote section appended to the document.

use super::lexer::normalize_footnote_id;
use super::Converter;

/// Rule separating the body from the footnote section.
const SEPARATOR: &str = "--------------------";

impl Converter {
    /// Number a reference to footnote `raw_id`, in order of first reference.
    /// The first reference also carries the `fnref-{id}` anchor that the
    /// footnote's back link targets. Returns `None` when no such footnote is
    /// defined.
    pub(crate) fn footnote_reference(&mut self, raw_id: &str) -> Option<String> {
        let id = normalize_footnote_id(raw_id);
        if !self.footnotes.contains_key(&id) {
            log::debug!("Reference to undefined footnote: {id}");
            return None;
        }
        let marker = match self.footnote_ids.iter().position(|known| *known == id) {
            Some(index) => format!("^{{{}}}", index + 1),
            None => {
                let marker = format!("{{{{id:fnref-{id}}}}}^{{{}}}", self.footnote_ids.len() + 1);
                self.footnote_ids.push(id);
                marker
            }
        };
        // Ids may contain `_`, which the emphasis pass must not see.
        Some(self.placeholders.hide(&marker))
    }

    /// Append the referenced footnotes, numbered as referenced, after a
    /// separator rule.
    pub(crate) fn add_footnotes(&mut self, text: String) -> String {
        if self.footnote_ids.is_empty() {
            return text;
        }

        let mut entries = Vec::new();
        // Footnote bodies may reference further footnotes, which grows the list.
        let mut index = 0;
        while index < self.footnote_ids.len() {
            let id = self.footnote_ids[index].clone();
            let number = index + 1;
            let body = self.footnotes.get(&id).cloned().unwrap_or_default();
            let rendered = match self.run_block_gamut(&body) {
                Ok(rendered) => rendered,
                Err(e) => {
                    log::warn!("Footnote {id} left unconverted: {e}");
                    body.trim().to_string()
                }
            };
            entries.push(format!(
                "^{{{number}}} {} [[#fnref-{id}|↩ {number}]]",
                rendered.trim_end()
            ));
            index += 1;
        }

        log::debug!("Appended {} footnotes", entries.len());
        format!("{text}\n\n{SEPARATOR}\n\n{}", entries.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::convert::Converter;
    use pretty_assertions::assert_eq;

    fn convert(markdown: &str) -> String {
        Converter::new(Config::default()).unwrap().convert(markdown)
    }

    #[test]
    fn test_numbered_by_first_reference() {
        let out = convert("Text[^b] and[^a].\n\n[^a]: Alpha\n[^b]: Beta\n");
        assert_eq!(
            out,
            "Text{{id:fnref-b}}^{1} and{{id:fnref-a}}^{2}.\n\n--------------------\n\n\
             ^{1} Beta [[#fnref-b|↩ 1]]\n\n\
             ^{2} Alpha [[#fnref-a|↩ 2]]\n"
        );
    }

    #[test]
    fn test_repeated_reference_reuses_number() {
        let out = convert("x[^n] y[^n]\n\n[^n]: Note\n");
        assert!(out.starts_with("x{{id:fnref-n}}^{1} y^{1}\n"));
        assert_eq!(out.matches("{{id:fnref-n}}").count(), 1);
        assert_eq!(out.matches("[[#fnref-n|").count(), 1);
    }

    #[test]
    fn test_unreferenced_and_undefined() {
        let out = convert("a[^missing]\n\n[^unused]: Never shown\n");
        assert_eq!(out, "a[^missing]\n");
    }

    #[test]
    fn test_footnote_body_is_converted() {
        let out = convert("a[^f]\n\n[^f]: Some *emphasis* here.\n");
        assert!(out.ends_with("^{1} Some //emphasis// here. [[#fnref-f|↩ 1]]\n"));
    }

    #[test]
    fn test_footnote_referenced_from_footnote() {
        let out = convert("a[^one]\n\n[^one]: See[^two]\n[^two]: Inner\n");
        assert!(out.contains("^{1} See{{id:fnref-two}}^{2} [[#fnref-one|↩ 1]]"));
        assert!(out.ends_with("^{2} Inner [[#fnref-two|↩ 2]]\n"));
    }

    #[test]
    fn test_back_link_target_is_anchored() {
        let out = convert("See[^my_note].\n\n[^my_note]: Body\n");
        assert_eq!(
            out,
            "See{{id:fnref-my_note}}^{1}.\n\n--------------------\n\n\
             ^{1} Body [[#fnref-my_note|↩ 1]]\n"
        );
    }
}
