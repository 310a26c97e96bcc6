//! Content globs: compiled patterns identifying the files scanned for class usage.
//!
//! Patterns are relative to the project root. Brace alternation
//! (`*.{rs,html}`) is expanded before compilation since [`glob::Pattern`]
//! has no notion of it; a leading `./` is normalised away.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::ConfigError;

/// `*` never crosses a `/`; only `**` spans directories.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

// ---------------------------------------------------------------------------
// ContentGlob
// ---------------------------------------------------------------------------

/// A single `content` entry: the source text plus its compiled alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentGlob {
    source: String,
    patterns: Vec<Pattern>,
}

impl ContentGlob {
    /// Compile a glob as written in the config source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGlob`] naming `source` if the pattern is
    /// empty, absolute, has unbalanced braces, or fails glob compilation.
    pub fn compile(source: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidGlob {
            pattern: source.to_string(),
            reason,
        };

        if source.trim().is_empty() {
            return Err(invalid("pattern is empty".to_string()));
        }

        let mut patterns = Vec::new();
        for alternative in expand_braces(source).map_err(invalid)? {
            if Path::new(&alternative).is_absolute() {
                return Err(invalid("pattern must be relative to the project root".to_string()));
            }
            let normalised = strip_current_dir(&alternative);
            let pattern = Pattern::new(normalised).map_err(|e| invalid(e.to_string()))?;
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }

        Ok(Self {
            source: source.to_string(),
            patterns,
        })
    }

    /// The pattern exactly as written in the source.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The brace-expanded, normalised patterns this glob compiled to.
    pub fn expanded(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }

    /// Whether a project-relative path is covered by this glob.
    pub fn matches(&self, path: &Path) -> bool {
        let path = path.strip_prefix(".").unwrap_or(path);
        self.patterns
            .iter()
            .any(|p| p.matches_path_with(path, MATCH_OPTIONS))
    }
}

// ---------------------------------------------------------------------------
// ContentSet
// ---------------------------------------------------------------------------

/// All `content` globs of a config, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSet {
    globs: Vec<ContentGlob>,
}

impl ContentSet {
    /// Compile every source pattern, failing on the first invalid one.
    pub fn compile<I, S>(sources: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let globs = sources
            .into_iter()
            .map(|s| ContentGlob::compile(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { globs })
    }

    /// The compiled globs, in source order.
    pub fn globs(&self) -> &[ContentGlob] {
        &self.globs
    }

    /// The source strings, in source order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.globs.iter().map(ContentGlob::as_str)
    }

    /// Number of globs.
    pub fn len(&self) -> usize {
        self.globs.len()
    }

    /// Returns `true` if there are no globs.
    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }

    /// Whether any glob covers a project-relative path.
    pub fn matches(&self, path: &Path) -> bool {
        self.globs.iter().any(|g| g.matches(path))
    }

    /// Enumerate the files under `root` matched by any glob.
    ///
    /// Returned paths are relative to `root`, sorted and de-duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Scan`] if a directory cannot be read.
    pub fn scan(&self, root: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        let base = Pattern::escape(&root.to_string_lossy());
        let base = base.trim_end_matches('/');
        let mut found = BTreeSet::new();

        for glob in &self.globs {
            for pattern in glob.expanded() {
                let full = format!("{base}/{pattern}");
                let paths =
                    glob::glob_with(&full, MATCH_OPTIONS).map_err(|e| ConfigError::InvalidGlob {
                        pattern: glob.as_str().to_string(),
                        reason: e.to_string(),
                    })?;
                for entry in paths {
                    let path = entry.map_err(ConfigError::Scan)?;
                    if !path.is_file() {
                        continue;
                    }
                    let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                    found.insert(relative);
                }
            }
        }

        log::debug!("Scanned {} content files under {}", found.len(), root.display());
        Ok(found.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Brace expansion
// ---------------------------------------------------------------------------

fn strip_current_dir(mut pattern: &str) -> &str {
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest;
    }
    pattern
}

/// Upper bound on the patterns one glob may expand to.
const MAX_EXPANSIONS: usize = 1024;

/// Expand `{a,b}` alternation, innermost groups included, left to right.
fn expand_braces(pattern: &str) -> Result<Vec<String>, String> {
    let Some(open) = first_open_brace(pattern)? else {
        return Ok(vec![pattern.to_string()]);
    };
    let close = matching_close_brace(pattern, open)?;
    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];

    let mut expanded = Vec::new();
    for alternative in split_alternatives(&pattern[open + 1..close]) {
        expanded.extend(expand_braces(&format!("{prefix}{alternative}{suffix}"))?);
        if expanded.len() > MAX_EXPANSIONS {
            return Err(format!(
                "brace expansion exceeds {MAX_EXPANSIONS} patterns"
            ));
        }
    }
    Ok(expanded)
}

/// Index just past a `[...]` character class starting at `start`, if it closes.
fn skip_class(bytes: &[u8], start: usize) -> Option<usize> {
    // `[]` and `[!]` treat the first `]` as a literal member.
    let mut i = start + 1;
    if bytes.get(i) == Some(&b'!') {
        i += 1;
    }
    i += 1;
    while i < bytes.len() {
        if bytes[i] == b']' {
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

fn first_open_brace(pattern: &str) -> Result<Option<usize>, String> {
    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                if let Some(next) = skip_class(bytes, i) {
                    i = next;
                    continue;
                }
            }
            b'{' => return Ok(Some(i)),
            b'}' => return Err(format!("unbalanced `}}` at position {i}")),
            _ => {}
        }
        i += 1;
    }
    Ok(None)
}

fn matching_close_brace(pattern: &str, open: usize) -> Result<usize, String> {
    let bytes = pattern.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                if let Some(next) = skip_class(bytes, i) {
                    i = next;
                    continue;
                }
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(format!("unbalanced `{{` at position {open}"))
}

fn split_alternatives(inner: &str) -> Vec<&str> {
    let bytes = inner.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                if let Some(next) = skip_class(bytes, i) {
                    i = next;
                    continue;
                }
            }
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&inner[start..]);
    parts
}
