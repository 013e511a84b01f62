//! Output dialects for selector macros.
//!
//! Both dialects share one vocabulary (`content`, `component`, `attribute`,
//! `variant`, `state`) and differ only in the selector text each macro
//! expands to, the order macros are resolved in, and whether plain class,
//! id and `:host` selectors are rewritten first.

use serde::Deserialize;

use crate::case::dash_case;
use crate::error::MacroError;
use crate::macros::{MacroCall, MacroKind};
use crate::selector::{self, TokenKind};

/// Class prefix shared by every generated selector.
pub const PREFIX: &str = "spectrum";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Dialect {
    /// BEM-style class names: `.spectrum-Button-label`.
    #[default]
    Flat,
    /// Custom-element selectors: `:host`, slots and attributes.
    WebComponent,
}

impl Dialect {
    pub fn resolver(self) -> &'static dyn MacroResolver {
        match self {
            Dialect::Flat => &FlatDialect,
            Dialect::WebComponent => &WebComponentDialect,
        }
    }
}

/// Values a macro may depend on besides its own parameters.
#[derive(Debug, Clone, Copy)]
pub struct MacroContext<'a> {
    /// Name of the `@component` block being expanded.
    pub component: &'a str,
    /// Selector of the rule enclosing the rule being rewritten, if any.
    pub parent_selector: Option<&'a str>,
}

impl MacroContext<'_> {
    fn parent_is_host(&self) -> bool {
        self.parent_selector.is_some_and(|sel| sel.trim() == ":host")
    }
}

pub trait MacroResolver: Sync {
    /// Macro kinds resolved per pass, in order.
    fn passes(&self) -> &'static [&'static [MacroKind]];

    /// Whether plain class, id and `:host` selectors are prefixed before
    /// macro expansion.
    fn normalizes(&self) -> bool {
        false
    }

    fn content(&self, slot: &str, slotted: Option<&str>, ctx: &MacroContext<'_>) -> String;
    fn component(&self, name: &str, ctx: &MacroContext<'_>) -> String;
    fn attribute(&self, name: &str, ctx: &MacroContext<'_>) -> String;
    fn variant(&self, name: &str, ctx: &MacroContext<'_>) -> String;
    fn state(&self, state: &str, ctx: &MacroContext<'_>) -> String;

    /// Parse the call's parameters and dispatch to the per-macro method.
    fn resolve(&self, call: &MacroCall, ctx: &MacroContext<'_>) -> Result<String, MacroError> {
        let params = call.params.trim();
        if params.is_empty() {
            return Err(MacroError::MissingParameter(call.kind));
        }

        let resolved = match call.kind {
            MacroKind::Content => {
                let (slot, slotted) = split_pair(params);
                if slot.is_empty() {
                    return Err(MacroError::MissingParameter(call.kind));
                }
                self.content(slot, slotted, ctx)
            }
            MacroKind::Component => self.component(params, ctx),
            MacroKind::Attribute => self.attribute(params, ctx),
            MacroKind::Variant => self.variant(params, ctx),
            MacroKind::State => self.state(params, ctx),
        };
        Ok(resolved)
    }
}

/// Split `a, b` at the first top-level comma. An empty second half is
/// treated as absent.
fn split_pair(params: &str) -> (&str, Option<&str>) {
    let comma = selector::tokenize(params)
        .into_iter()
        .find(|token| token.kind == TokenKind::Comma);

    match comma {
        Some(comma) => {
            let second = params[comma.span.end..].trim();
            (
                params[..comma.span.start].trim(),
                (!second.is_empty()).then_some(second),
            )
        }
        None => (params, None),
    }
}

const FLAT_PASSES: &[&[MacroKind]] = &[&MacroKind::ALL];

const WEB_COMPONENT_PASSES: &[&[MacroKind]] = &[
    &[
        MacroKind::Component,
        MacroKind::Attribute,
        MacroKind::Variant,
        MacroKind::State,
    ],
    // content() wraps its subject in ::slotted(), so the others go first
    &[MacroKind::Content],
];

pub struct FlatDialect;

impl MacroResolver for FlatDialect {
    fn passes(&self) -> &'static [&'static [MacroKind]] {
        FLAT_PASSES
    }

    fn normalizes(&self) -> bool {
        true
    }

    fn content(&self, slot: &str, _slotted: Option<&str>, ctx: &MacroContext<'_>) -> String {
        format!(".{PREFIX}-{}-{slot}", ctx.component)
    }

    fn component(&self, name: &str, _ctx: &MacroContext<'_>) -> String {
        format!(".{PREFIX}-{name}")
    }

    fn attribute(&self, name: &str, ctx: &MacroContext<'_>) -> String {
        format!(".{PREFIX}-{}-{name}", ctx.component)
    }

    fn variant(&self, name: &str, ctx: &MacroContext<'_>) -> String {
        format!(".{PREFIX}-{}--{name}", ctx.component)
    }

    fn state(&self, state: &str, _ctx: &MacroContext<'_>) -> String {
        if state.starts_with(':') {
            format!("&{state}")
        } else {
            format!("&.is-{state}")
        }
    }
}

pub struct WebComponentDialect;

impl MacroResolver for WebComponentDialect {
    fn passes(&self) -> &'static [&'static [MacroKind]] {
        WEB_COMPONENT_PASSES
    }

    fn content(&self, slot: &str, slotted: Option<&str>, _ctx: &MacroContext<'_>) -> String {
        format!("slot[name=\"{slot}\"]::slotted({})", slotted.unwrap_or("*"))
    }

    fn component(&self, name: &str, _ctx: &MacroContext<'_>) -> String {
        format!("{PREFIX}-{}", dash_case(name))
    }

    fn attribute(&self, name: &str, ctx: &MacroContext<'_>) -> String {
        // same form as the flat dialect; deliberately not `[name]`
        format!(".{PREFIX}-{}-{name}", ctx.component)
    }

    fn variant(&self, name: &str, _ctx: &MacroContext<'_>) -> String {
        format!(":host([{name}])")
    }

    fn state(&self, state: &str, ctx: &MacroContext<'_>) -> String {
        let selector = if state.starts_with(':') {
            state.to_string()
        } else {
            format!("[{state}]")
        };

        if ctx.parent_is_host() {
            format!("&({selector})")
        } else {
            format!("&{selector}")
        }
    }
}
