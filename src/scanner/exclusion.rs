//! Exclusion patterns: glob expressions protecting repository paths from deletion.
//!
//! Patterns come from a declarative file with a single top-level `exclude`
//! list. JSON is the default format; a `.toml` extension selects TOML:
//!
//! ```json
//! { "exclude": ["libs-release/keep/*", "*-SNAPSHOT/maven-metadata.xml"] }
//! ```
//!
//! Matching follows `fnmatch` rules on the whole path: `*` matches any run of
//! characters including `/`, `?` matches one character, `[seq]` and `[!seq]`
//! are character classes. Matching is case-sensitive on Unix. On Windows the
//! candidate and pattern are case-folded and `\` is treated as `/`, matching
//! the host's own glob convention (remote paths are not host paths, so this
//! is a portability hazard for patterns shared across platforms).

#![allow(missing_docs)]

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::core::errors::{Result, SweepError};

/// On-disk shape of the exclusion file. A missing key means no exclusions.
#[derive(Debug, Default, Deserialize)]
struct ExclusionFile {
    #[serde(default)]
    exclude: Vec<String>,
}

/// Compiled glob pattern.
#[derive(Debug, Clone)]
struct GlobPattern {
    original: String,
    /// `None` for a glob that can match nothing, e.g. the empty range `[z-a]`.
    compiled: Option<Regex>,
}

/// Immutable set of exclusion patterns, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    patterns: Vec<GlobPattern>,
}

impl ExclusionSet {
    /// Load patterns from a JSON (or `.toml`) exclusion file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SweepError::MissingFile {
                what: "exclusions",
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|e| SweepError::io(path, e))?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let file: ExclusionFile = if is_toml {
            toml::from_str(&raw)?
        } else {
            serde_json::from_str(&raw)?
        };
        Ok(Self::from_patterns(file.exclude))
    }

    /// Compile an in-memory list of glob strings.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pat| {
                let original = pat.into();
                let compiled = compile_glob(&original);
                GlobPattern { original, compiled }
            })
            .collect();
        Self { patterns }
    }

    /// True iff `candidate` matches at least one pattern.
    pub fn matches(&self, candidate: &str) -> bool {
        self.matching_pattern(candidate).is_some()
    }

    /// The first pattern that matches `candidate`, if any.
    pub fn matching_pattern(&self, candidate: &str) -> Option<&str> {
        let normalized = normalize_for_host(candidate);
        self.patterns
            .iter()
            .find(|p| p.compiled.as_ref().is_some_and(|re| re.is_match(&normalized)))
            .map(|p| p.original.as_str())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.original.as_str())
    }
}

/// Free-function form of [`ExclusionSet::matches`].
pub fn matches(candidate: &str, patterns: &ExclusionSet) -> bool {
    patterns.matches(candidate)
}

/// Compile a glob. `None` means the glob can match nothing, as `fnmatch`
/// treats a class whose only ranges are reversed (`[z-a]`).
fn compile_glob(pattern: &str) -> Option<Regex> {
    let normalized = normalize_for_host(pattern);
    Regex::new(&glob_to_regex(&normalized)?).ok()
}

/// Translate an fnmatch-style glob to an anchored regex.
///
/// - `*` → any run of characters (separators included)
/// - `?` → exactly one character
/// - `[...]` / `[!...]` → character class; an unterminated `[` is literal
///
/// Returns `None` when a class is left empty after dropping reversed ranges.
fn glob_to_regex(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 8);
    out.push_str("(?s)^");

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                // Collapse runs of `*`; they all mean the same thing.
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => {
                out.push('.');
                i += 1;
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    push_class(&mut out, &chars[i + 1..end])?;
                    i = end + 1;
                }
                None => {
                    out.push_str(r"\[");
                    i += 1;
                }
            },
            c => {
                push_escaped(&mut out, c);
                i += 1;
            }
        }
    }

    out.push('$');
    Some(out)
}

/// Index of the `]` closing the class opened at `open`, if there is one.
/// A `]` directly after `[` or `[!` is a literal member, not the terminator.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

/// Append the regex form of one class body. Reversed ranges are dropped.
/// `None` if nothing is left of a plain class; an emptied `[!...]` matches
/// any single character.
fn push_class(out: &mut String, body: &[char]) -> Option<()> {
    let (negated, rest) = match body.split_first() {
        Some(('!', tail)) => (true, tail),
        _ => (false, body),
    };

    let mut members = String::new();
    let mut i = 0;
    while i < rest.len() {
        if i + 2 < rest.len() && rest[i + 1] == '-' {
            let (lo, hi) = (rest[i], rest[i + 2]);
            if lo <= hi {
                push_class_char(&mut members, lo);
                members.push('-');
                push_class_char(&mut members, hi);
            }
            i += 3;
        } else {
            push_class_char(&mut members, rest[i]);
            i += 1;
        }
    }

    match (members.is_empty(), negated) {
        (true, true) => out.push('.'),
        (true, false) => return None,
        (false, negated) => {
            out.push('[');
            if negated {
                out.push('^');
            }
            out.push_str(&members);
            out.push(']');
        }
    }
    Some(())
}

fn push_class_char(out: &mut String, c: char) {
    if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~' | '-') {
        out.push('\\');
    }
    out.push(c);
}

fn push_escaped(out: &mut String, c: char) {
    out.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4])));
}

#[cfg(windows)]
fn normalize_for_host(s: &str) -> String {
    s.replace('\\', "/").to_lowercase()
}

#[cfg(not(windows))]
fn normalize_for_host(s: &str) -> String {
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn set(patterns: &[&str]) -> ExclusionSet {
        ExclusionSet::from_patterns(patterns.iter().copied())
    }

    #[test]
    fn star_matches_within_directory() {
        let s = set(&["releases/keep/*"]);
        assert!(s.matches("releases/keep/v1.jar"));
        assert!(!s.matches("releases/other/v1.jar"));
    }

    #[test]
    fn star_crosses_separators() {
        let s = set(&["releases/*"]);
        assert!(s.matches("releases/keep/deep/v1.jar"));
        assert!(matches("releases/x", &s));
    }

    #[test]
    fn match_is_anchored_to_whole_path() {
        let s = set(&["keep/*.jar"]);
        assert!(!s.matches("libs/keep/a.jar"));
        assert!(!s.matches("keep/a.jar.sha1"));
    }

    #[test]
    fn question_mark_matches_single_char() {
        let s = set(&["build-?"]);
        assert!(s.matches("build-A"));
        assert!(!s.matches("build-AB"));
        assert!(!s.matches("build-"));
    }

    #[test]
    fn character_classes_and_negation() {
        let s = set(&["v[0-9].jar", "r[!a-c].txt"]);
        assert!(s.matches("v7.jar"));
        assert!(!s.matches("vx.jar"));
        assert!(s.matches("rz.txt"));
        assert!(!s.matches("rb.txt"));
    }

    #[test]
    fn unterminated_bracket_is_literal() {
        let s = set(&["odd[name"]);
        assert!(s.matches("odd[name"));
        assert!(!s.matches("oddn"));
    }

    #[test]
    fn closing_bracket_first_in_class_is_member() {
        let s = set(&["x[]]"]);
        assert!(s.matches("x]"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let s = set(&["libs/a+b (1).jar", "^$|.pom"]);
        assert!(s.matches("libs/a+b (1).jar"));
        assert!(!s.matches("libs/aab (1).jar"));
        assert!(s.matches("^$|.pom"));
    }

    #[test]
    fn reversed_range_matches_nothing() {
        let s = set(&["[z-a]", "libs/[9-0].jar"]);
        assert!(!s.matches("[z-a]"));
        assert!(!s.matches("m"));
        assert!(!s.matches("libs/5.jar"));
        assert!(!s.matches("libs/[9-0].jar"));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn reversed_range_is_dropped_from_mixed_class() {
        let s = set(&["v[z-a0-3].jar", "r[!z-a]"]);
        assert!(s.matches("v2.jar"));
        assert!(!s.matches("vm.jar"));
        assert!(s.matches("rq"));
    }

    #[test]
    fn dash_at_class_edge_is_literal() {
        let s = set(&["a[-x]", "b[x-]"]);
        assert!(s.matches("a-"));
        assert!(s.matches("b-"));
        assert!(!s.matches("bw"));
    }

    #[test]
    fn empty_range_does_not_shadow_later_patterns() {
        let s = set(&["[z-a]", "keep/*"]);
        assert_eq!(s.matching_pattern("keep/a.jar"), Some("keep/*"));
    }

    #[cfg(not(windows))]
    #[test]
    fn matching_is_case_sensitive_on_unix() {
        let s = set(&["Release/*"]);
        assert!(!s.matches("release/a.jar"));
    }

    #[test]
    fn empty_set_matches_nothing() {
        let s = ExclusionSet::default();
        assert!(s.is_empty());
        assert!(!s.matches("anything"));
    }

    #[test]
    fn matching_pattern_reports_first_hit() {
        let s = set(&["a/*", "*"]);
        assert_eq!(s.matching_pattern("a/1.jar"), Some("a/*"));
        assert_eq!(s.matching_pattern("b/2.jar"), Some("*"));
    }

    #[test]
    fn load_json_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("exclusions.json");
        fs::write(&path, r#"{"exclude": ["a/*", "b/keep/*"]}"#).unwrap();

        let s = ExclusionSet::load(&path).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.patterns().collect::<Vec<_>>(), vec!["a/*", "b/keep/*"]);
    }

    #[test]
    fn load_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("exclusions.toml");
        fs::write(&path, "exclude = [\"docker/base/*\"]\n").unwrap();

        let s = ExclusionSet::load(&path).unwrap();
        assert!(s.matches("docker/base/sha256__abc"));
    }

    #[test]
    fn load_without_exclude_key_yields_empty_set() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("exclusions.json");
        fs::write(&path, r#"{"comment": "nothing protected"}"#).unwrap();

        assert!(ExclusionSet::load(&path).unwrap().is_empty());
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = ExclusionSet::load(Path::new("/nonexistent/exclusions.json")).unwrap_err();
        assert!(matches!(err, SweepError::MissingFile { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn load_malformed_file_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("exclusions.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ExclusionSet::load(&path).unwrap_err();
        assert_eq!(err.code(), "ASW-1003");
    }
}
