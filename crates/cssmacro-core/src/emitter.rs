use crate::ast::{AtRule, Declaration, Node, Rule, Stylesheet};

const INDENT: &str = "    ";

pub fn emit_css(stylesheet: &Stylesheet) -> String {
    let mut out = String::new();

    for (idx, node) in stylesheet.nodes.iter().enumerate() {
        if idx > 0 && is_block(node) {
            out.push('\n');
        }
        emit_node(node, 0, &mut out);
    }
    out
}

fn is_block(node: &Node) -> bool {
    match node {
        Node::Rule(_) => true,
        Node::AtRule(at_rule) => at_rule.nodes.is_some(),
        _ => false,
    }
}

fn emit_node(node: &Node, depth: usize, out: &mut String) {
    match node {
        Node::Rule(rule) => emit_rule(rule, depth, out),
        Node::AtRule(at_rule) => emit_at_rule(at_rule, depth, out),
        Node::Declaration(decl) => emit_declaration(decl, depth, out),
        Node::Comment(comment) => {
            indent(depth, out);
            out.push_str("/* ");
            out.push_str(&comment.text);
            out.push_str(" */\n");
        }
    }
}

fn emit_rule(rule: &Rule, depth: usize, out: &mut String) {
    for (idx, line) in rule.selector.lines().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        indent(depth, out);
        out.push_str(line.trim());
    }
    out.push_str(" {\n");
    emit_children(&rule.nodes, depth, out);
}

fn emit_at_rule(at_rule: &AtRule, depth: usize, out: &mut String) {
    indent(depth, out);
    out.push('@');
    out.push_str(&at_rule.name);
    if !at_rule.params.is_empty() {
        out.push(' ');
        out.push_str(&at_rule.params);
    }

    match &at_rule.nodes {
        Some(nodes) => {
            out.push_str(" {\n");
            emit_children(nodes, depth, out);
        }
        None => out.push_str(";\n"),
    }
}

fn emit_children(nodes: &[Node], depth: usize, out: &mut String) {
    for node in nodes {
        emit_node(node, depth + 1, out);
    }
    indent(depth, out);
    out.push_str("}\n");
}

fn emit_declaration(decl: &Declaration, depth: usize, out: &mut String) {
    indent(depth, out);
    out.push_str(&decl.property);
    out.push_str(": ");
    out.push_str(&decl.value);
    if decl.important {
        out.push_str(" !important");
    }
    out.push_str(";\n");
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn emits_canonical_formatting() {
        let sheet = parse(".a{color:red;margin:0!important}\n\n\n.b{top:0}").unwrap();
        assert_eq!(
            emit_css(&sheet),
            ".a {\n    color: red;\n    margin: 0 !important;\n}\n\n.b {\n    top: 0;\n}\n"
        );
    }

    #[test]
    fn emits_nested_blocks_and_statements() {
        let sheet =
            parse("@import \"x.css\";\n@media (min-width: 10px) { .a { &:hover { top: 0 } } }")
                .unwrap();
        assert_eq!(
            emit_css(&sheet),
            "@import \"x.css\";\n\n@media (min-width: 10px) {\n    .a {\n        &:hover {\n            top: 0;\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn indents_each_line_of_a_selector_list() {
        let mut sheet = parse("@media print { .a, .b { top: 0 } }").unwrap();
        if let Node::AtRule(media) = &mut sheet.nodes[0] {
            if let Some(Node::Rule(rule)) = media.nodes.as_mut().and_then(|n| n.first_mut()) {
                let selectors = rule.selectors();
                rule.set_selectors(&selectors);
            }
        }
        assert_eq!(
            emit_css(&sheet),
            "@media print {\n    .a,\n    .b {\n        top: 0;\n    }\n}\n"
        );
    }
}
