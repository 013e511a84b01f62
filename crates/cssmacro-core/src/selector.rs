//! Lexical model of selector text.
//!
//! Selectors are split into simple selectors, combinators and commas, each
//! carrying the byte range it was read from. Rewrites are expressed as
//! edits against those ranges so that untouched text survives verbatim.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: ancestor descendant
    Descendant,
    /// `>`
    Child,
    /// `+`
    NextSibling,
    /// `~`
    SubsequentSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Type(String),
    Universal,
    /// `&`
    Nesting,
    Class(String),
    Id(String),
    /// Raw text between `[` and `]`.
    Attribute(String),
    /// `:name` or `:name(args)`; `args` is the byte range inside the parens.
    PseudoClass {
        name: String,
        args: Option<Range<usize>>,
    },
    /// `::name` or `::name(args)`.
    PseudoElement {
        name: String,
        args: Option<Range<usize>>,
    },
    /// An identifier directly followed by `(`. `args` is `None` when the
    /// closing paren is missing.
    Function {
        name: String,
        args: Option<Range<usize>>,
    },
    Combinator(Combinator),
    Comma,
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Whether the token at `idx` is the first simple selector of its compound.
pub fn starts_compound(tokens: &[Token], idx: usize) -> bool {
    match idx.checked_sub(1).map(|prev| &tokens[prev].kind) {
        None => true,
        Some(TokenKind::Combinator(_)) | Some(TokenKind::Comma) => true,
        Some(_) => false,
    }
}

pub fn tokenize(selector: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        src: selector,
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run();
    lexer.tokens
}

/// Split a selector list on top-level commas. Entries are trimmed and
/// empty entries dropped.
pub fn split_list(selector: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;

    for token in tokenize(selector) {
        if token.kind == TokenKind::Comma {
            parts.push(&selector[start..token.span.start]);
            start = token.span.end;
        }
    }
    parts.push(&selector[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Apply non-overlapping replacements to `src`.
pub fn apply_edits(src: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by_key(|(range, _)| range.start);

    let mut out = String::with_capacity(src.len());
    let mut cursor = 0;
    for (range, replacement) in edits {
        out.push_str(&src[cursor..range.start]);
        out.push_str(&replacement);
        cursor = range.end;
    }
    out.push_str(&src[cursor..]);
    out
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl Lexer<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(offset)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            span: start..self.pos,
        });
    }

    fn previous_allows_descendant(&self) -> bool {
        !matches!(
            self.tokens.last().map(|t| &t.kind),
            None | Some(TokenKind::Comma) | Some(TokenKind::Combinator(_))
        )
    }

    fn run(&mut self) {
        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                c if c.is_whitespace() => self.whitespace(),
                '>' | '+' | '~' => {
                    self.pos += 1;
                    self.skip_whitespace();
                    let combinator = match ch {
                        '>' => Combinator::Child,
                        '+' => Combinator::NextSibling,
                        _ => Combinator::SubsequentSibling,
                    };
                    self.push(TokenKind::Combinator(combinator), start);
                }
                ',' => {
                    self.pos += 1;
                    self.push(TokenKind::Comma, start);
                }
                '*' => {
                    self.pos += 1;
                    self.push(TokenKind::Universal, start);
                }
                '&' => {
                    self.pos += 1;
                    self.push(TokenKind::Nesting, start);
                }
                '.' | '#' if self.peek_at(1).is_some_and(is_ident_char) => {
                    self.pos += 1;
                    let name = self.ident();
                    let kind = if ch == '.' {
                        TokenKind::Class(name)
                    } else {
                        TokenKind::Id(name)
                    };
                    self.push(kind, start);
                }
                '[' => match self.balanced('[', ']') {
                    Some(inner) => {
                        let text = self.src[inner].to_string();
                        self.push(TokenKind::Attribute(text), start);
                    }
                    None => self.raw_rest(start),
                },
                ':' => self.pseudo(start),
                c if is_ident_char(c) => {
                    let name = self.ident();
                    if self.peek() == Some('(') {
                        let args = self.balanced('(', ')');
                        if args.is_none() {
                            self.pos = self.src.len();
                        }
                        self.push(TokenKind::Function { name, args }, start);
                    } else {
                        self.push(TokenKind::Type(name), start);
                    }
                }
                other => {
                    self.pos += other.len_utf8();
                    self.push(TokenKind::Raw(other.to_string()), start);
                }
            }
        }
    }

    fn whitespace(&mut self) {
        let start = self.pos;
        self.skip_whitespace();
        match self.peek() {
            None | Some(',' | '>' | '+' | '~') => {}
            Some(_) if self.previous_allows_descendant() => {
                self.push(TokenKind::Combinator(Combinator::Descendant), start);
            }
            Some(_) => {}
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += self.peek().map_or(1, char::len_utf8);
        }
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.pos += 1;
                if let Some(escaped) = self.peek() {
                    self.pos += escaped.len_utf8();
                }
            } else if is_ident_char(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    fn pseudo(&mut self, start: usize) {
        self.pos += 1;
        let element = self.peek() == Some(':');
        if element {
            self.pos += 1;
        }
        let name = self.ident();

        let mut args = None;
        if self.peek() == Some('(') {
            match self.balanced('(', ')') {
                Some(inner) => args = Some(inner),
                None => return self.raw_rest(start),
            }
        }

        let kind = if element {
            TokenKind::PseudoElement { name, args }
        } else {
            TokenKind::PseudoClass { name, args }
        };
        self.push(kind, start);
    }

    /// Consume a bracketed group starting at `open`, returning the inner
    /// range. Quotes are honoured. Returns `None` (position unchanged) if the
    /// group never closes.
    fn balanced(&mut self, open: char, close: char) -> Option<Range<usize>> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut escaped = false;

        for (offset, ch) in self.src[start..].char_indices() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
                continue;
            }
            match ch {
                '"' | '\'' => quote = Some(ch),
                c if c == open => depth += 1,
                c if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        let end = start + offset;
                        self.pos = end + close.len_utf8();
                        return Some(start + open.len_utf8()..end);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn raw_rest(&mut self, start: usize) {
        self.pos = self.src.len();
        let text = self.src[start..].to_string();
        self.push(TokenKind::Raw(text), start);
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_' || ch == '\\' || !ch.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(selector: &str) -> Vec<TokenKind> {
        tokenize(selector).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_compound_and_combinators() {
        assert_eq!(
            kinds("div.a#b > .c"),
            vec![
                TokenKind::Type("div".into()),
                TokenKind::Class("a".into()),
                TokenKind::Id("b".into()),
                TokenKind::Combinator(Combinator::Child),
                TokenKind::Class("c".into()),
            ]
        );
    }

    #[test]
    fn whitespace_is_a_descendant_combinator_only_between_compounds() {
        let tokens = tokenize("  .a   .b  ");
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens[1].kind,
            TokenKind::Combinator(Combinator::Descendant)
        );
        assert_eq!(tokens[2].span, 7..9);
    }

    #[test]
    fn functions_keep_argument_ranges() {
        let src = "content(label, span) state(:focus)";
        let tokens = tokenize(src);
        let TokenKind::Function { name, args } = &tokens[0].kind else {
            panic!("expected function");
        };
        assert_eq!(name, "content");
        assert_eq!(&src[args.clone().unwrap()], "label, span");
        assert_eq!(
            tokens[1].kind,
            TokenKind::Combinator(Combinator::Descendant)
        );
        assert!(matches!(&tokens[2].kind, TokenKind::Function { name, .. } if name == "state"));
    }

    #[test]
    fn unterminated_function_has_no_args() {
        assert_eq!(
            kinds("content(label"),
            vec![TokenKind::Function {
                name: "content".into(),
                args: None
            }]
        );
    }

    #[test]
    fn pseudo_classes_and_elements() {
        let src = ":host(.quiet)::slotted(*)";
        let tokens = tokenize(src);
        let TokenKind::PseudoClass { name, args } = &tokens[0].kind else {
            panic!("expected pseudo-class");
        };
        assert_eq!(name, "host");
        assert_eq!(&src[args.clone().unwrap()], ".quiet");
        assert!(matches!(&tokens[1].kind, TokenKind::PseudoElement { name, .. } if name == "slotted"));
    }

    #[test]
    fn attribute_values_may_contain_brackets_and_commas() {
        assert_eq!(
            kinds("a[title=\"x,]\"]"),
            vec![
                TokenKind::Type("a".into()),
                TokenKind::Attribute("title=\"x,]\"".into()),
            ]
        );
    }

    #[test]
    fn splits_on_top_level_commas_only() {
        assert_eq!(
            split_list(".a, content(label, span),\n:not(.b, .c)"),
            vec![".a", "content(label, span)", ":not(.b, .c)"]
        );
    }

    #[test]
    fn compound_boundaries() {
        let tokens = tokenize(".a.b, &.c .d");
        let starts: Vec<bool> = (0..tokens.len())
            .map(|idx| starts_compound(&tokens, idx))
            .collect();
        // .a .b , & .c ' ' .d
        assert_eq!(starts, vec![true, false, false, true, false, false, true]);
    }

    #[test]
    fn edits_apply_in_source_order() {
        let edits = vec![(3..5, "Y".to_string()), (0..2, "X".to_string())];
        assert_eq!(apply_edits(".a .b", edits), "X Y");
    }
}
