use std::fs;
use std::path::PathBuf;

use cssmacro_core::expand::{DiagnosticKind, Severity};
use cssmacro_core::macros::MacroKind;
use cssmacro_core::{compile, CompileError, Dialect, ExpandError, ExpandOptions, Span};
use rstest::rstest;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/expand")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e))
}

#[rstest]
#[case(Dialect::Flat, "button.flat.css")]
#[case(Dialect::WebComponent, "button.web-component.css")]
fn expands_button_fixture(#[case] dialect: Dialect, #[case] expected: &str) {
    let compiled = compile(&fixture("button.css"), &ExpandOptions::new(dialect)).unwrap();
    assert_eq!(compiled.css, fixture(expected));
    assert!(compiled.diagnostics.is_empty());
}

#[test]
fn missing_parameter_aborts_the_transform() {
    let err = compile(
        &fixture("missing-parameter.css"),
        &ExpandOptions::new(Dialect::Flat),
    )
    .unwrap_err();

    let CompileError::Expand(ExpandError::Macro { diagnostic, .. }) = err else {
        panic!("expected expansion failure, got {:?}", err);
    };
    assert_eq!(
        diagnostic.kind,
        DiagnosticKind::MissingMacroParameter(MacroKind::Content)
    );
    assert_eq!(diagnostic.location, Span::new(6, 3));
    assert!(diagnostic.message.contains("content()"));
}

#[test]
fn missing_parameter_skips_the_rule_when_continuing() {
    let compiled = compile(
        &fixture("missing-parameter.css"),
        &ExpandOptions::new(Dialect::Flat).continue_on_error(),
    )
    .unwrap();

    assert_eq!(
        compiled.css,
        ".spectrum-Field-input {\n    border: 1px solid;\n}\n\n.spectrum-Field-help {\n    font-size: 12px;\n}\n"
    );
    assert!(!compiled.css.contains("content("));
    assert_eq!(compiled.diagnostics.len(), 1);
    assert_eq!(compiled.diagnostics[0].severity, Severity::Error);
    assert_eq!(
        compiled.diagnostics[0].to_string(),
        "error[missing-macro-parameter] 6:3: content() requires a parameter in selector `content()`"
    );
}

#[test]
fn parse_errors_surface_through_compile() {
    let err = compile("@component A { .x { top: 0; }", &ExpandOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::Parse(_)));
}

#[test]
fn expanded_output_has_no_macro_calls_left() {
    for dialect in [Dialect::Flat, Dialect::WebComponent] {
        let css = compile(&fixture("button.css"), &ExpandOptions::new(dialect))
            .unwrap()
            .css;
        for name in ["content(", "component(", "attribute(", "variant(", "state(", "@component"] {
            assert!(!css.contains(name), "{:?} output still contains {}", dialect, name);
        }
    }
}
