//! Heading-delimited note sections and emphasis hints.

use std::sync::OnceLock;

use regex::Regex;

/// Title given to content that precedes the first heading.
pub const NO_TITLE: &str = "no title";

/// One heading-bounded span of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// The heading line as written, markers included, trimmed.
    pub title: String,
    pub content: String,
    pub hints: Vec<String>,
}

impl Section {
    fn new(title: &str, raw: &str) -> Self {
        let content = raw.trim().to_string();
        let hints = extract_hints(&content);
        Self {
            title: title.to_string(),
            content,
            hints,
        }
    }
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}#{1,6}[ \t]+\S").expect("heading pattern"))
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})").expect("fence pattern"))
}

fn hint_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\*\*(.*?)\*\*|__(.*?)__").expect("hint pattern"))
}

/// A heading line located in the source: `start..end` excludes the newline.
struct Heading {
    start: usize,
    end: usize,
}

/// ATX headings outside fenced code blocks, in document order.
fn find_headings(source: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut fence: Option<String> = None;
    let mut offset = 0;

    for raw_line in source.split_inclusive('\n') {
        let line = raw_line.trim_end_matches(['\n', '\r']);
        let start = offset;
        offset += raw_line.len();

        if let Some(caps) = fence_re().captures(line) {
            let marker = &caps[1];
            match &fence {
                None => fence = Some(marker.to_string()),
                Some(open) if marker.starts_with(open.as_str()) && line.trim().len() == marker.len() => {
                    fence = None
                }
                Some(_) => {}
            }
            continue;
        }
        if fence.is_none() && heading_re().is_match(line) {
            headings.push(Heading {
                start,
                end: start + line.len(),
            });
        }
    }
    headings
}

/// Split `source` into sections at every heading.
///
/// Text before the first heading becomes a section titled [`NO_TITLE`]. Spans
/// holding only whitespace yield nothing, so a heading immediately followed
/// by another heading has no section of its own. A document without headings
/// is always exactly one [`NO_TITLE`] section, even when blank.
pub fn parse_sections(source: &str) -> Vec<Section> {
    let headings = find_headings(source);
    if headings.is_empty() {
        return vec![Section::new(NO_TITLE, source)];
    }

    let mut sections = Vec::new();
    let mut title = NO_TITLE.to_string();
    let mut last = 0;

    for heading in headings {
        let span = &source[last..heading.start];
        if !span.trim().is_empty() {
            sections.push(Section::new(&title, span));
        }
        title = source[heading.start..heading.end].trim().to_string();
        last = heading.end;
    }

    let tail = &source[last..];
    if !tail.trim().is_empty() {
        sections.push(Section::new(&title, tail));
    }
    sections
}

/// Inner text of every `**bold**` or `__bold__` span, in order, skipping
/// empty ones.
pub fn extract_hints(content: &str) -> Vec<String> {
    hint_re()
        .captures_iter(content)
        .filter_map(|caps| {
            caps.get(1)
                .filter(|m| !m.as_str().is_empty())
                .or_else(|| caps.get(2).filter(|m| !m.as_str().is_empty()))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_headed_sections() {
        let src = "# Title 1\nContent 1 with **hint1**.\n\n# Title 2\nContent 2 with __hint2__.\n";
        let sections = parse_sections(src);
        assert_eq!(
            sections,
            vec![
                Section {
                    title: "# Title 1".into(),
                    content: "Content 1 with **hint1**.".into(),
                    hints: vec!["hint1".into()],
                },
                Section {
                    title: "# Title 2".into(),
                    content: "Content 2 with __hint2__.".into(),
                    hints: vec!["hint2".into()],
                },
            ]
        );
    }

    #[test]
    fn no_heading_is_one_untitled_section() {
        let sections = parse_sections("just plain text with **one hint**.");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, NO_TITLE);
        assert_eq!(sections[0].content, "just plain text with **one hint**.");
        assert_eq!(sections[0].hints, vec!["one hint"]);
    }

    #[test]
    fn preamble_before_first_heading_is_untitled() {
        let sections = parse_sections("intro line\n\n## Next\nbody");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, NO_TITLE);
        assert_eq!(sections[0].content, "intro line");
        assert_eq!(sections[1].title, "## Next");
        assert_eq!(sections[1].content, "body");
    }

    #[test]
    fn adjacent_headings_emit_nothing_between() {
        let sections = parse_sections("# A\n# B\n\n### C\nbody of c");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "### C");
        assert_eq!(sections[0].content, "body of c");
    }

    #[test]
    fn heading_at_end_of_file_emits_nothing() {
        assert!(parse_sections("# Only").is_empty());
        assert!(parse_sections("# Only\n\n").is_empty());
    }

    #[test]
    fn blank_document_is_one_empty_untitled_section() {
        for src in ["", "  \n\n"] {
            let sections = parse_sections(src);
            assert_eq!(sections.len(), 1);
            assert_eq!(sections[0].title, NO_TITLE);
            assert_eq!(sections[0].content, "");
            assert!(sections[0].hints.is_empty());
        }
    }

    #[test]
    fn bare_hash_line_is_content() {
        let sections = parse_sections("# A\nfoo\n#\nbar\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "# A");
        assert_eq!(sections[0].content, "foo\n#\nbar");

        let sections = parse_sections("##   \ntext");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, NO_TITLE);
    }

    #[test]
    fn headings_inside_fences_are_content() {
        let src = "# Code\n```sh\n# not a heading\n```\nafter";
        let sections = parse_sections(src);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].content.contains("# not a heading"));
        assert!(sections[0].content.ends_with("after"));
    }

    #[test]
    fn hashtag_without_space_is_not_a_heading() {
        let sections = parse_sections("#tag line\ntext");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, NO_TITLE);
    }

    #[test]
    fn crlf_line_endings() {
        let sections = parse_sections("# One\r\nfirst\r\n# Two\r\nsecond\r\n");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "# One");
        assert_eq!(sections[0].content, "first");
        assert_eq!(sections[1].content, "second");
    }

    #[test]
    fn hints_in_order_and_mixed() {
        assert_eq!(
            extract_hints("**one** and __two__ then **three**"),
            vec!["one", "two", "three"]
        );
    }

    #[test]
    fn hints_skip_empty_spans() {
        assert_eq!(extract_hints("**** and ____ and **x**"), vec!["x"]);
    }

    #[test]
    fn hints_span_lines() {
        assert_eq!(extract_hints("**multi\nline**"), vec!["multi\nline"]);
    }

    #[test]
    fn hints_none() {
        assert!(extract_hints("plain *italic* _also_").is_empty());
    }
}
