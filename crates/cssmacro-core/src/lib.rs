//! Expansion of `@component` blocks and selector macros.
//!
//! ```text
//! @component Button {
//!   :host { ... }
//!   content(label) { ... }
//!   variant(quiet) state(hover) { ... }
//! }
//! ```
//!
//! is rewritten into either flat BEM-style classes or web-component
//! selectors, depending on the chosen [`Dialect`].

pub mod ast;
pub mod case;
pub mod dialect;
pub mod emitter;
pub mod error;
pub mod expand;
pub mod loader;
pub mod macros;
pub mod normalize;
pub mod parser;
pub mod selector;

pub use dialect::Dialect;
pub use error::{CompileError, ExpandError, Span};
pub use expand::{expand, Diagnostic, ErrorPolicy, ExpandOptions, Expansion};

/// Output of [`compile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub css: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse, expand and print a stylesheet in one go.
pub fn compile(source: &str, options: &ExpandOptions) -> Result<Compiled, CompileError> {
    let stylesheet = parser::parse(source)?;
    let expansion = expand::expand(stylesheet, options)?;

    Ok(Compiled {
        css: emitter::emit_css(&expansion.stylesheet),
        diagnostics: expansion.diagnostics,
    })
}
