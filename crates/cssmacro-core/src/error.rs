use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::expand::Diagnostic;
use crate::macros::MacroKind;

/// 1-based source position of a node in the input stylesheet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 && self.column == 0 {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("{span}: missing selector before '{{'")]
    EmptySelector { span: Span },

    #[error("{span}: block is never closed")]
    UnclosedBlock { span: Span },

    #[error("{span}: unexpected '}}'")]
    UnexpectedClose { span: Span },

    #[error("{span}: invalid declaration '{text}'")]
    InvalidDeclaration { text: String, span: Span },

    #[error("{span}: unterminated comment")]
    UnterminatedComment { span: Span },

    #[error("{span}: unterminated string")]
    UnterminatedString { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::EmptySelector { span }
            | ParseError::UnclosedBlock { span }
            | ParseError::UnexpectedClose { span }
            | ParseError::InvalidDeclaration { span, .. }
            | ParseError::UnterminatedComment { span }
            | ParseError::UnterminatedString { span } => *span,
        }
    }
}

/// Failure while expanding one selector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MacroError {
    #[error("{0}() requires a parameter")]
    MissingParameter(MacroKind),
}

#[derive(Debug, Error)]
pub enum ExpandError {
    /// A selector macro could not be expanded and the policy is to abort.
    #[error("{diagnostic}")]
    Macro {
        diagnostic: Diagnostic,
        diagnostics: Vec<Diagnostic>,
    },

    /// `@component` inside another `@component`.
    #[error("{diagnostic}")]
    NestedComponent {
        diagnostic: Diagnostic,
        diagnostics: Vec<Diagnostic>,
    },
}

impl ExpandError {
    /// Every diagnostic recorded before and including the fatal one.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ExpandError::Macro { diagnostics, .. }
            | ExpandError::NestedComponent { diagnostics, .. } => diagnostics,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to resolve {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("recursive import detected: {}", path.display())]
    RecursiveImport { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Expand(#[from] ExpandError),
}
