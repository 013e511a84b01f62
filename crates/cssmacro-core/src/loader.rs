use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{LoadError, Span};

/// A stylesheet with its imports inlined.
///
/// Every line of `text` remembers the file and line it was read from, so
/// positions reported against the merged text can be traced back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Source {
    pub text: String,
    files: Vec<PathBuf>,
    lines: Vec<(usize, usize)>,
}

impl Source {
    /// Map a position in `text` to the file and position it came from.
    /// `None` for unknown spans and lines past the end.
    pub fn locate(&self, span: Span) -> Option<(&Path, Span)> {
        let &(file, line) = self.lines.get(span.line.checked_sub(1)?)?;
        Some((&self.files[file], Span::new(line, span.column)))
    }

    fn push_line(&mut self, file: usize, line: usize, text: &str) {
        self.text.push_str(text);
        self.text.push('\n');
        self.lines.push((file, line));
    }
}

/// Load a stylesheet with its `@import "file";` lines inlined, recursively.
///
/// Each file is inlined at most once; an import cycle is an error. Imports
/// inside `/* */` comments are left as they are.
pub fn load_with_imports(path: &Path) -> Result<Source, LoadError> {
    let mut loader = Loader::default();
    loader.load(path)?;
    Ok(loader.source)
}

#[derive(Default)]
struct Loader {
    visited: HashSet<PathBuf>,
    stack: Vec<PathBuf>,
    source: Source,
}

impl Loader {
    fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        let canonical = path.canonicalize().map_err(|source| LoadError::Resolve {
            path: path.to_path_buf(),
            source,
        })?;

        if self.stack.contains(&canonical) {
            return Err(LoadError::RecursiveImport { path: canonical });
        }
        if !self.visited.insert(canonical.clone()) {
            return Ok(());
        }

        debug!(path = %path.display(), "loading stylesheet");
        let data = fs::read_to_string(&canonical).map_err(|source| LoadError::Read {
            path: canonical.clone(),
            source,
        })?;

        let file = self.source.files.len();
        self.source.files.push(path.to_path_buf());
        self.stack.push(canonical);

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut in_comment = false;
        for (idx, line) in data.lines().enumerate() {
            let import = if in_comment {
                None
            } else {
                parse_import_line(line)
            };
            in_comment = comment_open_after(line, in_comment);

            match import {
                Some(target) => self.load(&dir.join(target))?,
                None => self.source.push_line(file, idx + 1, line),
            }
        }

        self.stack.pop();
        Ok(())
    }
}

fn parse_import_line(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("@import")?.trim_start();
    let path_literal = rest.strip_suffix(';')?.trim();
    if path_literal.len() < 2 {
        return None;
    }

    let bytes = path_literal.as_bytes();
    let first = bytes[0];
    let last = bytes[bytes.len() - 1];
    if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
        Some(&path_literal[1..path_literal.len() - 1])
    } else {
        None
    }
}

/// Whether a `/* */` comment is still open at the end of `line`.
fn comment_open_after(line: &str, mut in_comment: bool) -> bool {
    let mut chars = line.chars().peekable();
    let mut quote = None;

    while let Some(c) = chars.next() {
        if in_comment {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_comment = false;
            }
        } else if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
        } else {
            match c {
                '"' | '\'' => quote = Some(c),
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    in_comment = true;
                }
                _ => {}
            }
        }
    }

    in_comment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/imports")
    }

    #[test]
    fn inline_nested_imports_once() {
        let path = fixture_dir().join("button.css");
        let combined = load_with_imports(&path).expect("load imports").text;
        assert!(combined.contains("--spectrum-button-height"));
        assert!(combined.contains("@component Button"));
        assert!(combined.contains("@component Icon"));
        assert!(!combined.contains("@import"));
    }

    #[test]
    fn skip_duplicate_imports() {
        let path = fixture_dir().join("button-dup.css");
        let combined = load_with_imports(&path).expect("load imports").text;
        assert_eq!(combined.matches("--spectrum-button-height").count(), 1);
    }

    #[test]
    fn detect_cycles() {
        let path = fixture_dir().join("cycle-a.css");
        let err = load_with_imports(&path).unwrap_err();
        assert!(matches!(err, LoadError::RecursiveImport { .. }));
    }

    #[test]
    fn missing_file_error() {
        let path = fixture_dir().join("missing.css");
        let err = load_with_imports(&path).unwrap_err();
        assert!(matches!(err, LoadError::Resolve { .. }));
    }

    #[test]
    fn only_quoted_imports_are_inlined() {
        assert_eq!(parse_import_line("@import \"a.css\";"), Some("a.css"));
        assert_eq!(parse_import_line("  @import 'a.css' ;"), Some("a.css"));
        assert_eq!(parse_import_line("@import url(a.css);"), None);
        assert_eq!(parse_import_line("@import \"a.css\""), None);
    }

    #[test]
    fn commented_out_imports_stay_as_text() {
        let path = fixture_dir().join("commented.css");
        let combined = load_with_imports(&path).expect("load imports").text;
        assert!(combined.contains("@import \"vars.css\";"));
        assert!(!combined.contains("--spectrum-button-height"));
        assert!(combined.contains("@component Note"));
    }

    #[test]
    fn tracks_comment_state_across_lines() {
        assert!(comment_open_after("/* start", false));
        assert!(comment_open_after("@import \"a.css\";", true));
        assert!(!comment_open_after("end */ .a {", true));
        assert!(!comment_open_after("/* one line */", false));
        assert!(!comment_open_after("content: \"/*\";", false));
    }

    #[test]
    fn locate_maps_merged_lines_to_their_file() {
        let path = fixture_dir().join("button.css");
        let source = load_with_imports(&path).expect("load imports");

        let (file, span) = source.locate(Span::new(2, 3)).expect("first line");
        assert!(file.ends_with("vars.css"));
        assert_eq!(span, Span::new(2, 3));

        let merged = source
            .text
            .lines()
            .position(|line| line.starts_with("@component Button"))
            .expect("button block")
            + 1;
        let (file, span) = source.locate(Span::new(merged, 1)).expect("button line");
        assert!(file.ends_with("button.css"));
        assert_eq!(span, Span::new(4, 1));

        assert_eq!(source.locate(Span::default()), None);
        assert_eq!(source.locate(Span::new(merged + 100, 1)), None);
    }
}
