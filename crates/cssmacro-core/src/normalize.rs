use crate::dialect::PREFIX;
use crate::selector::{apply_edits, starts_compound, tokenize, TokenKind};

/// Rewrite a rule selector into the flat naming scheme of `component`.
///
/// * a class that begins a compound selector is prefixed:
///   `.label` becomes `.spectrum-Button-label`. Arguments of functional
///   pseudo-classes such as `:not(.a .b)` are left as written.
/// * an id becomes a prefixed class: `#icon` becomes `.spectrum-Button-icon`
/// * `:host` becomes `.spectrum-Button`, and `:host(.x)` becomes
///   `.spectrum-Button.x`
///
/// All edits come from a single tokenization, so text produced by one
/// rewrite is never seen by another. Classes already carrying the component
/// prefix are left alone, which makes the pass idempotent.
pub fn normalize_selector(selector: &str, component: &str) -> String {
    let block = format!("{PREFIX}-{component}");
    let element_prefix = format!("{block}-");

    let tokens = tokenize(selector);
    let mut edits = Vec::new();

    for (idx, token) in tokens.iter().enumerate() {
        match &token.kind {
            TokenKind::Class(name)
                if starts_compound(&tokens, idx)
                    && name != &block
                    && !name.starts_with(&element_prefix) =>
            {
                edits.push((token.span.clone(), format!(".{element_prefix}{name}")));
            }
            TokenKind::Id(name) => {
                edits.push((token.span.clone(), format!(".{element_prefix}{name}")));
            }
            TokenKind::PseudoClass { name, args } if name == "host" => {
                let inner = args.clone().map_or("", |args| selector[args].trim());
                edits.push((token.span.clone(), format!(".{block}{inner}")));
            }
            _ => {}
        }
    }

    if edits.is_empty() {
        return selector.to_string();
    }
    apply_edits(selector, edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(".label", ".spectrum-Button-label")]
    #[case(".a .b", ".spectrum-Button-a .spectrum-Button-b")]
    #[case(".a.b", ".spectrum-Button-a.b")]
    #[case(".a > .b", ".spectrum-Button-a > .spectrum-Button-b")]
    #[case(".a, .b", ".spectrum-Button-a, .spectrum-Button-b")]
    #[case("&.is-open", "&.is-open")]
    #[case("div .a", "div .spectrum-Button-a")]
    #[case(".a:not(.b)", ".spectrum-Button-a:not(.b)")]
    #[case(":not(.a .b)", ":not(.a .b)")]
    #[case(":is(.a, .b) .c", ":is(.a, .b) .spectrum-Button-c")]
    #[case(".a>.b", ".spectrum-Button-a>.spectrum-Button-b")]
    #[case(".a~.b+.c", ".spectrum-Button-a~.spectrum-Button-b+.spectrum-Button-c")]
    #[case("#icon", ".spectrum-Button-icon")]
    #[case("#icon:hover", ".spectrum-Button-icon:hover")]
    #[case(".a #icon .b", ".spectrum-Button-a .spectrum-Button-icon .spectrum-Button-b")]
    #[case(":host", ".spectrum-Button")]
    #[case(":host:hover", ".spectrum-Button:hover")]
    #[case(":host .a", ".spectrum-Button .spectrum-Button-a")]
    #[case(":host(.quiet)", ".spectrum-Button.quiet")]
    #[case("content(label)", "content(label)")]
    #[case("a[href] span", "a[href] span")]
    fn rewrites_flat_selectors(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_selector(input, "Button"), expected);
    }

    #[test]
    fn does_not_double_prefix() {
        let once = normalize_selector(".x", "C");
        assert_eq!(once, ".spectrum-C-x");
        assert_eq!(normalize_selector(&once, "C"), ".spectrum-C-x");

        let host = normalize_selector(":host .x", "C");
        assert_eq!(normalize_selector(&host, "C"), ".spectrum-C .spectrum-C-x");
    }

    #[test]
    fn other_component_prefixes_are_still_prefixed() {
        assert_eq!(
            normalize_selector(".spectrum-Icon", "Button"),
            ".spectrum-Button-spectrum-Icon"
        );
    }
}
