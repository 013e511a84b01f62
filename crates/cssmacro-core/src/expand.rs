//! `@component` scope resolution.
//!
//! Every `@component <Name> { ... }` block is expanded in isolation: its
//! rules are normalized (flat dialect) and their selector macros resolved
//! against the block's name, then its children are appended to the parent
//! node list after the parent's own children.

use std::fmt;
use std::fs;
use std::mem;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::ast::{AtRule, Node, Rule, Stylesheet};
use crate::dialect::{Dialect, MacroContext};
use crate::error::{ConfigError, ExpandError, MacroError, Span};
use crate::macros::{self, MacroKind};
use crate::normalize::normalize_selector;

/// What to do when a selector macro cannot be expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ErrorPolicy {
    /// Fail the whole transform.
    #[default]
    Abort,
    /// Drop the offending rule, record an error and keep going.
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ExpandOptions {
    pub dialect: Dialect,
    pub on_error: ErrorPolicy,
}

impl ExpandOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            on_error: ErrorPolicy::default(),
        }
    }

    pub fn continue_on_error(mut self) -> Self {
        self.on_error = ErrorPolicy::Continue;
        self
    }

    /// Load options from a JSON file such as
    /// `{ "dialect": "web-component", "onError": "continue" }`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&data).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The component a block's contents are expanded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentScope {
    pub name: String,
    pub dialect: Dialect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// `@component` without a name; the block is dropped.
    MissingComponentName,
    /// `@component Name;` without a block; the statement is dropped.
    MissingComponentBlock,
    /// A macro called with empty or unterminated parameters.
    MissingMacroParameter(MacroKind),
    /// `@component` inside another `@component`.
    NestedComponent,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::MissingComponentName | DiagnosticKind::MissingComponentBlock => {
                Severity::Warning
            }
            DiagnosticKind::MissingMacroParameter(_) | DiagnosticKind::NestedComponent => {
                Severity::Error
            }
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::MissingComponentName => "missing-component-name",
            DiagnosticKind::MissingComponentBlock => "missing-component-block",
            DiagnosticKind::MissingMacroParameter(_) => "missing-macro-parameter",
            DiagnosticKind::NestedComponent => "nested-component",
        }
    }
}

impl From<&MacroError> for DiagnosticKind {
    fn from(err: &MacroError) -> Self {
        match err {
            MacroError::MissingParameter(kind) => DiagnosticKind::MissingMacroParameter(*kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub location: Span,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {}: {}",
            self.severity,
            self.kind.code(),
            self.location,
            self.message
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub stylesheet: Stylesheet,
    pub diagnostics: Vec<Diagnostic>,
}

/// Expand every `@component` block in `stylesheet`.
///
/// The stylesheet is consumed: when the transform aborts no partially
/// expanded tree is handed back.
pub fn expand(stylesheet: Stylesheet, options: &ExpandOptions) -> Result<Expansion, ExpandError> {
    let mut expander = Expander {
        options,
        diagnostics: Vec::new(),
    };
    let nodes = expander.visit_nodes(stylesheet.nodes)?;

    Ok(Expansion {
        stylesheet: Stylesheet { nodes },
        diagnostics: expander.diagnostics,
    })
}

struct Expander<'o> {
    options: &'o ExpandOptions,
    diagnostics: Vec<Diagnostic>,
}

impl Expander<'_> {
    fn report(&mut self, kind: DiagnosticKind, message: String, location: Span) -> Diagnostic {
        let diagnostic = Diagnostic {
            kind,
            severity: kind.severity(),
            message,
            location,
        };
        warn!(%location, code = kind.code(), "{}", diagnostic.message);
        self.diagnostics.push(diagnostic.clone());
        diagnostic
    }

    /// Walk nodes outside any component block, looking for blocks. Expanded
    /// block contents go after every other node of the same parent, in the
    /// order the blocks appear.
    fn visit_nodes(&mut self, nodes: Vec<Node>) -> Result<Vec<Node>, ExpandError> {
        let mut out = Vec::with_capacity(nodes.len());
        let mut hoisted = Vec::new();

        for node in nodes {
            match node {
                Node::AtRule(at_rule) if at_rule.is_component() => {
                    hoisted.extend(self.expand_component(at_rule)?);
                }
                Node::AtRule(mut at_rule) => {
                    if let Some(children) = at_rule.nodes.take() {
                        at_rule.nodes = Some(self.visit_nodes(children)?);
                    }
                    out.push(Node::AtRule(at_rule));
                }
                Node::Rule(mut rule) => {
                    rule.nodes = self.visit_nodes(mem::take(&mut rule.nodes))?;
                    out.push(Node::Rule(rule));
                }
                other => out.push(other),
            }
        }

        out.append(&mut hoisted);
        Ok(out)
    }

    /// Expand one block and return the nodes that replace it.
    fn expand_component(&mut self, at_rule: AtRule) -> Result<Vec<Node>, ExpandError> {
        let Some(name) = at_rule.params.split_whitespace().next() else {
            self.report(
                DiagnosticKind::MissingComponentName,
                "@component rule without component name".to_string(),
                at_rule.span,
            );
            return Ok(Vec::new());
        };

        let scope = ComponentScope {
            name: name.to_string(),
            dialect: self.options.dialect,
        };

        let Some(children) = at_rule.nodes else {
            self.report(
                DiagnosticKind::MissingComponentBlock,
                format!("@component {} has no block", scope.name),
                at_rule.span,
            );
            return Ok(Vec::new());
        };

        debug!(component = %scope.name, dialect = ?scope.dialect, "expanding @component");
        self.rewrite_nodes(children, &scope, None)
    }

    /// Rewrite nodes inside a component block.
    fn rewrite_nodes(
        &mut self,
        nodes: Vec<Node>,
        scope: &ComponentScope,
        parent_selector: Option<&str>,
    ) -> Result<Vec<Node>, ExpandError> {
        let mut out = Vec::with_capacity(nodes.len());

        for node in nodes {
            match node {
                Node::Rule(rule) => {
                    if let Some(rule) = self.rewrite_rule(rule, scope, parent_selector)? {
                        out.push(Node::Rule(rule));
                    }
                }
                Node::AtRule(at_rule) if at_rule.is_component() => {
                    let diagnostic = self.report(
                        DiagnosticKind::NestedComponent,
                        format!(
                            "@component {} is nested inside @component {}",
                            at_rule.params, scope.name
                        ),
                        at_rule.span,
                    );
                    if self.options.on_error == ErrorPolicy::Abort {
                        return Err(ExpandError::NestedComponent {
                            diagnostic,
                            diagnostics: mem::take(&mut self.diagnostics),
                        });
                    }
                }
                Node::AtRule(mut at_rule) => {
                    if let Some(children) = at_rule.nodes.take() {
                        at_rule.nodes = Some(self.rewrite_nodes(children, scope, parent_selector)?);
                    }
                    out.push(Node::AtRule(at_rule));
                }
                other => out.push(other),
            }
        }

        Ok(out)
    }

    /// Normalize and expand one rule, then its descendants. `None` means the
    /// rule was dropped under [`ErrorPolicy::Continue`].
    fn rewrite_rule(
        &mut self,
        mut rule: Rule,
        scope: &ComponentScope,
        parent_selector: Option<&str>,
    ) -> Result<Option<Rule>, ExpandError> {
        let resolver = scope.dialect.resolver();

        if resolver.normalizes() {
            rule.selector = normalize_selector(&rule.selector, &scope.name);
        }

        let ctx = MacroContext {
            component: &scope.name,
            parent_selector,
        };
        match expand_rule_selector(&rule, &ctx, scope.dialect) {
            Ok(Some(selectors)) => rule.set_selectors(&selectors),
            Ok(None) => {}
            Err(err) => {
                let diagnostic = self.report(
                    DiagnosticKind::from(&err),
                    format!("{} in selector `{}`", err, rule.selector),
                    rule.span,
                );
                return match self.options.on_error {
                    ErrorPolicy::Abort => Err(ExpandError::Macro {
                        diagnostic,
                        diagnostics: mem::take(&mut self.diagnostics),
                    }),
                    ErrorPolicy::Continue => Ok(None),
                };
            }
        }

        let children = mem::take(&mut rule.nodes);
        rule.nodes = self.rewrite_nodes(children, scope, Some(rule.selector.as_str()))?;
        Ok(Some(rule))
    }
}

/// Expand each selector of the list. `None` when the rule holds no macros,
/// so its selector text is kept as written.
fn expand_rule_selector(
    rule: &Rule,
    ctx: &MacroContext<'_>,
    dialect: Dialect,
) -> Result<Option<Vec<String>>, MacroError> {
    if !macros::contains_macro(&rule.selector) {
        return Ok(None);
    }

    let resolver = dialect.resolver();
    rule.selectors()
        .iter()
        .map(|selector| macros::expand_selector(selector, resolver, ctx))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
