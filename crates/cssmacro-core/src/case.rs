/// Convert an identifier such as `ActionButton` into `action-button`.
///
/// A dash goes before every uppercase letter that follows a lowercase one;
/// the result is lowercased and runs of dashes collapse to one.
pub fn dash_case(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    let mut prev_lowercase = false;

    for ch in identifier.chars() {
        if ch.is_uppercase() && prev_lowercase {
            out.push('-');
        }
        prev_lowercase = ch.is_lowercase();

        if ch == '-' && out.ends_with('-') {
            continue;
        }
        out.extend(ch.to_lowercase());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Icon", "icon")]
    #[case("ActionButton", "action-button")]
    #[case("actionButton", "action-button")]
    #[case("HTMLElement", "htmlelement")]
    #[case("Action--Button", "action-button")]
    #[case("Action-Button", "action-button")]
    #[case("Button2Group", "button2group")]
    #[case("already-dashed", "already-dashed")]
    fn converts_identifiers(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(dash_case(input), expected);
    }
}
