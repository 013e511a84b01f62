use crate::error::Span;
use crate::selector;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Declaration(Declaration),
    Comment(Comment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub nodes: Vec<Node>,
    pub span: Span,
}

impl Rule {
    /// The comma-separated selector list, split outside of parentheses,
    /// brackets and strings.
    pub fn selectors(&self) -> Vec<String> {
        selector::split_list(&self.selector)
    }

    pub fn set_selectors(&mut self, selectors: &[String]) {
        self.selector = selectors.join(",\n");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: String,
    pub params: String,
    /// `None` for statement at-rules such as `@import "a.css";`.
    pub nodes: Option<Vec<Node>>,
    pub span: Span,
}

impl AtRule {
    pub fn is_component(&self) -> bool {
        self.name == "component"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}
