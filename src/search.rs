//! Name and content search over the notes below a root folder.

use std::path::{Path, PathBuf};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tracing::{debug, warn};

use crate::fs::operations::FsGateway;

/// Bytes of context kept on each side of a content match.
const SNIPPET_CONTEXT: usize = 40;

const NAME_SCORE: i64 = 100;
const EXACT_NAME_BONUS: i64 = 100;
const NAME_WORD_BONUS: i64 = 50;
const CONTENT_SCORE: i64 = 10;
const CONTENT_WORD_BONUS: i64 = 20;

/// One ranked hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub path: PathBuf,
    /// Path relative to the root, note extension stripped.
    pub display: String,
    /// Surrounding text for content matches, empty otherwise.
    pub snippet: String,
    pub score: i64,
    pub is_folder: bool,
    /// Char positions in `display` to highlight.
    pub match_indices: Vec<usize>,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    path: PathBuf,
    display: String,
    name: String,
    content: String,
    content_lower: String,
    is_folder: bool,
}

/// In-memory index of folders and notes.
#[derive(Debug, Default)]
pub struct SearchEngine {
    entries: Vec<IndexEntry>,
}

impl SearchEngine {
    /// Index every non-hidden folder and note below `root`. Unreadable
    /// entries are skipped.
    pub fn index(gateway: &dyn FsGateway, root: &Path, note_extension: &str) -> Self {
        let mut engine = Self::default();
        engine.walk(gateway, root, root, note_extension);
        debug!(root = %root.display(), entries = engine.entries.len(), "indexed notes");
        engine
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn walk(&mut self, gateway: &dyn FsGateway, root: &Path, dir: &Path, ext: &str) {
        let listing = match gateway.list_directory(dir) {
            Ok(listing) => listing,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable folder");
                return;
            }
        };
        let suffix = format!(".{}", ext);

        for entry in listing {
            if entry.name.starts_with('.') {
                continue;
            }
            let relative = entry
                .path
                .strip_prefix(root)
                .unwrap_or(&entry.path)
                .to_string_lossy()
                .to_string();

            if entry.is_dir {
                self.entries.push(IndexEntry {
                    path: entry.path.clone(),
                    display: relative,
                    name: entry.name.clone(),
                    content: String::new(),
                    content_lower: String::new(),
                    is_folder: true,
                });
                self.walk(gateway, root, &entry.path, ext);
                continue;
            }

            let Some(name) = entry.name.strip_suffix(&suffix) else {
                continue;
            };
            let content = match gateway.read_file(&entry.path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(_) => continue,
            };
            self.entries.push(IndexEntry {
                display: relative
                    .strip_suffix(&suffix)
                    .unwrap_or(&relative)
                    .to_string(),
                name: name.to_string(),
                content_lower: content.to_lowercase(),
                content,
                path: entry.path,
                is_folder: false,
            });
        }
    }

    /// Rank entries against `query`, best first. Names beat content, and
    /// content beats a fuzzy name match.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        if query.is_empty() {
            return Vec::new();
        }
        let query_lower = query.to_lowercase();
        let matcher = SkimMatcherV2::default();
        let mut results = Vec::new();

        for entry in &self.entries {
            let name_lower = entry.name.to_lowercase();

            if let Some(pos) = name_lower.find(&query_lower) {
                let mut score = NAME_SCORE;
                if name_lower == query_lower {
                    score += EXACT_NAME_BONUS;
                } else if is_word_match(&name_lower, pos, query_lower.len()) {
                    score += NAME_WORD_BONUS;
                }
                let indices = name_indices(entry, &name_lower, pos, &query_lower);
                results.push(entry.result(score, String::new(), indices));
                continue;
            }

            if entry.is_folder {
                continue;
            }

            if let Some(pos) = entry.content_lower.find(&query_lower) {
                let mut score = CONTENT_SCORE;
                if is_word_match(&entry.content_lower, pos, query_lower.len()) {
                    score += CONTENT_WORD_BONUS;
                }
                // Byte offsets only line up when lowercasing kept the length.
                let source = if entry.content.len() == entry.content_lower.len() {
                    &entry.content
                } else {
                    &entry.content_lower
                };
                let snippet = extract_snippet(source, pos, SNIPPET_CONTEXT);
                results.push(entry.result(score, snippet, Vec::new()));
                continue;
            }

            if let Some((fuzzy, indices)) = matcher.fuzzy_indices(&entry.name, &query_lower) {
                let offset = entry.display.chars().count() - entry.name.chars().count();
                let score = (fuzzy / 10).clamp(1, 9);
                results.push(entry.result(
                    score,
                    String::new(),
                    indices.into_iter().map(|i| i + offset).collect(),
                ));
            }
        }

        results.sort_by(|a, b| b.score.cmp(&a.score));
        results
    }
}

impl IndexEntry {
    fn result(&self, score: i64, snippet: String, match_indices: Vec<usize>) -> SearchResult {
        SearchResult {
            path: self.path.clone(),
            display: self.display.clone(),
            snippet,
            score,
            is_folder: self.is_folder,
            match_indices,
        }
    }
}

/// Char positions of a name match, shifted into the display path.
fn name_indices(entry: &IndexEntry, name_lower: &str, pos: usize, query_lower: &str) -> Vec<usize> {
    let offset = entry.display.chars().count() - entry.name.chars().count();
    let start = name_lower[..pos].chars().count();
    let len = query_lower.chars().count();
    (offset + start..offset + start + len).collect()
}

/// The match at `pos..pos+len` has a space, newline, or string edge on both sides.
fn is_word_match(target: &str, pos: usize, len: usize) -> bool {
    let bytes = target.as_bytes();
    let is_gap = |i: Option<usize>| match i.and_then(|i| bytes.get(i)) {
        None => true,
        Some(b) => *b == b' ' || *b == b'\n',
    };
    is_gap(pos.checked_sub(1)) && is_gap(Some(pos + len))
}

/// Text around `pos`, widened to whitespace, newlines flattened, with `...`
/// marking truncation.
fn extract_snippet(content: &str, pos: usize, context: usize) -> String {
    let bytes = content.as_bytes();
    let is_gap = |i: usize| bytes[i] == b' ' || bytes[i] == b'\n';

    let mut start = pos.saturating_sub(context);
    let mut end = (pos + context).min(bytes.len());
    while start > 0 && !is_gap(start) {
        start -= 1;
    }
    while end < bytes.len() && !is_gap(end) {
        end += 1;
    }

    let snippet = content[start..end].trim().replace('\n', " ");
    let prefix = if start > 0 { "..." } else { "" };
    let suffix = if end < bytes.len() { "..." } else { "" };
    format!("{}{}{}", prefix, snippet, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::operations::LocalFs;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SearchEngine) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("rust/async")).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config.md"), "rust").unwrap();
        fs::write(dir.path().join("rust/ownership.md"), "# Ownership\nborrow checker rules").unwrap();
        fs::write(dir.path().join("rust/async/tokio.md"), "runtime notes about rust futures").unwrap();
        fs::write(dir.path().join("trust issues.md"), "nothing here").unwrap();
        fs::write(dir.path().join("readme.txt"), "rust").unwrap();
        let engine = SearchEngine::index(&LocalFs, dir.path(), "md");
        (dir, engine)
    }

    fn displays(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.display.as_str()).collect()
    }

    #[test]
    fn index_skips_hidden_and_foreign_files() {
        let (_dir, engine) = setup();
        // rust, rust/async, ownership, tokio, trust issues
        assert_eq!(engine.len(), 5);
    }

    #[test]
    fn empty_query_has_no_results() {
        let (_dir, engine) = setup();
        assert!(engine.search("").is_empty());
    }

    #[test]
    fn exact_name_ranks_first() {
        let (_dir, engine) = setup();
        let results = engine.search("RUST");
        assert_eq!(results[0].display, "rust");
        assert_eq!(results[0].score, 200);
        assert!(results[0].is_folder);
    }

    #[test]
    fn word_boundary_bonus_for_names() {
        let (_dir, engine) = setup();
        let results = engine.search("issues");
        assert_eq!(results[0].display, "trust issues");
        assert_eq!(results[0].score, 150);
        let results = engine.search("rus");
        let trust = results.iter().find(|r| r.display == "trust issues").unwrap();
        assert_eq!(trust.score, 100);
    }

    #[test]
    fn name_match_skips_content_check() {
        let (_dir, engine) = setup();
        let results = engine.search("ownership");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 200);
        assert!(results[0].snippet.is_empty());
    }

    #[test]
    fn content_match_has_snippet() {
        let (_dir, engine) = setup();
        let results = engine.search("futures");
        assert_eq!(displays(&results), vec!["rust/async/tokio"]);
        assert_eq!(results[0].score, 30);
        assert_eq!(results[0].snippet, "runtime notes about rust futures");
    }

    #[test]
    fn results_sorted_by_score() {
        let (_dir, engine) = setup();
        let results = engine.search("rust");
        let scores: Vec<i64> = results.iter().map(|r| r.score).collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(scores, sorted);
        // tokio matches on content only
        assert!(results.iter().any(|r| r.display == "rust/async/tokio" && r.score == 30));
    }

    #[test]
    fn name_match_indices_point_into_display() {
        let (_dir, engine) = setup();
        let results = engine.search("own");
        let hit = &results[0];
        assert_eq!(hit.display, "rust/ownership");
        assert_eq!(hit.match_indices, vec![5, 6, 7]);
    }

    #[test]
    fn fuzzy_fallback_scores_low() {
        let (_dir, engine) = setup();
        let results = engine.search("tko");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].display, "rust/async/tokio");
        assert!((1..=9).contains(&results[0].score));
    }

    #[test]
    fn word_match_edges() {
        assert!(is_word_match("rust", 0, 4));
        assert!(is_word_match("a rust\nb", 2, 4));
        assert!(!is_word_match("trust", 1, 4));
        assert!(!is_word_match("rusty", 0, 4));
    }

    #[test]
    fn snippet_truncates_with_ellipsis() {
        let text = format!("{} needle {}", "word ".repeat(20), "tail ".repeat(20));
        let pos = text.find("needle").unwrap();
        let snippet = extract_snippet(&text, pos, 10);
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert!(snippet.contains("needle"));
    }

    #[test]
    fn snippet_flattens_newlines() {
        assert_eq!(extract_snippet("one\ntwo", 4, 40), "one two");
    }
}
