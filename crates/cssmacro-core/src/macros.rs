use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use tracing::trace;

use crate::dialect::{MacroContext, MacroResolver};
use crate::error::MacroError;
use crate::selector::{self, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    Content,
    Component,
    Attribute,
    Variant,
    State,
}

impl MacroKind {
    pub const ALL: [MacroKind; 5] = [
        MacroKind::Content,
        MacroKind::Component,
        MacroKind::Attribute,
        MacroKind::Variant,
        MacroKind::State,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MacroKind::Content => "content",
            MacroKind::Component => "component",
            MacroKind::Attribute => "attribute",
            MacroKind::Variant => "variant",
            MacroKind::State => "state",
        }
    }
}

impl fmt::Display for MacroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MacroKind {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        MacroKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or(())
    }
}

/// A macro call-site located in selector text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCall {
    pub kind: MacroKind,
    /// Raw text between the parentheses, untrimmed.
    pub params: String,
    /// Byte range of `name(params)` in the scanned selector.
    pub span: Range<usize>,
}

/// Does any recognised macro appear in `selector`?
pub fn contains_macro(selector: &str) -> bool {
    !matches!(find_macro(selector, &MacroKind::ALL), Ok(None))
}

/// Locate the leftmost call of one of `kinds`.
///
/// Calls nested inside functional pseudo-classes and unknown functions are
/// found too. Unknown function names are never reported.
pub fn find_macro(selector: &str, kinds: &[MacroKind]) -> Result<Option<MacroCall>, MacroError> {
    find_in(selector, 0..selector.len(), kinds)
}

fn find_in(
    source: &str,
    range: Range<usize>,
    kinds: &[MacroKind],
) -> Result<Option<MacroCall>, MacroError> {
    let offset = range.start;
    let text = &source[range];

    for token in selector::tokenize(text) {
        let nested = match &token.kind {
            TokenKind::Function { name, args } => {
                let kind = name.parse::<MacroKind>().ok().filter(|k| kinds.contains(k));
                match (kind, args) {
                    (Some(kind), None) => return Err(MacroError::MissingParameter(kind)),
                    (Some(kind), Some(args)) => {
                        let params = &text[args.clone()];
                        if params.trim().is_empty() {
                            return Err(MacroError::MissingParameter(kind));
                        }
                        return Ok(Some(MacroCall {
                            kind,
                            params: params.to_string(),
                            span: offset + token.span.start..offset + token.span.end,
                        }));
                    }
                    (None, args) => args.clone(),
                }
            }
            TokenKind::PseudoClass { args, .. } | TokenKind::PseudoElement { args, .. } => {
                args.clone()
            }
            _ => None,
        };

        if let Some(args) = nested {
            let inner = offset + args.start..offset + args.end;
            if let Some(call) = find_in(source, inner, kinds)? {
                return Ok(Some(call));
            }
        }
    }

    Ok(None)
}

/// Expand every macro call in one selector (no top-level commas expected).
///
/// Each pass of the resolver is run to a fixed point: find the leftmost
/// call, splice in its expansion, rescan. Every substitution removes one
/// macro name and expansions never introduce a new one, so this terminates.
pub fn expand_selector(
    selector: &str,
    resolver: &dyn MacroResolver,
    ctx: &MacroContext<'_>,
) -> Result<String, MacroError> {
    let mut out = selector.to_string();

    for pass in resolver.passes() {
        while let Some(call) = find_macro(&out, pass)? {
            let replacement = resolver.resolve(&call, ctx)?;
            trace!(
                kind = %call.kind,
                call = &out[call.span.clone()],
                replacement = %replacement,
                "expanded selector macro"
            );
            out.replace_range(call.span, &replacement);
        }
    }

    Ok(out)
}
