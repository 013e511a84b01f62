use crate::ast::{AtRule, Comment, Declaration, Node, Rule, Stylesheet};
use crate::error::{ParseError, Span};

/// Parse stylesheet source into an owned node tree.
///
/// Nested rules, block and statement at-rules, declarations and comments
/// are recognised at any depth. Formatting is not retained; the emitter
/// prints every node canonically.
pub fn parse(input: &str) -> Result<Stylesheet, ParseError> {
    let mut cursor = Cursor::new(input);
    let nodes = parse_nodes(&mut cursor, None)?;
    Ok(Stylesheet { nodes })
}

/// Parse nodes until end of input (top level) or the `}` closing `block`.
fn parse_nodes(cursor: &mut Cursor<'_>, block: Option<Span>) -> Result<Vec<Node>, ParseError> {
    let mut nodes = Vec::new();

    loop {
        cursor.skip_whitespace();
        let span = cursor.span();

        let Some(ch) = cursor.peek() else {
            return match block {
                Some(open) => Err(ParseError::UnclosedBlock { span: open }),
                None => Ok(nodes),
            };
        };

        if cursor.starts_with("/*") {
            let text = cursor.read_comment()?;
            nodes.push(Node::Comment(Comment { text, span }));
            continue;
        }

        if ch == '}' {
            if block.is_none() {
                return Err(ParseError::UnexpectedClose { span });
            }
            cursor.bump();
            return Ok(nodes);
        }

        if ch == '@' {
            cursor.bump();
            nodes.push(Node::AtRule(parse_at_rule(cursor, span)?));
            continue;
        }

        let (prelude, terminator) = cursor.read_prelude()?;
        match terminator {
            Some('{') => {
                let selector = prelude.trim().to_string();
                if selector.is_empty() {
                    return Err(ParseError::EmptySelector { span });
                }
                let children = parse_nodes(cursor, Some(span))?;
                nodes.push(Node::Rule(Rule {
                    selector,
                    nodes: children,
                    span,
                }));
            }
            _ => {
                if prelude.trim().is_empty() {
                    // stray ';'
                    continue;
                }
                nodes.push(Node::Declaration(parse_declaration(&prelude, span)?));
            }
        }
    }
}

fn parse_at_rule(cursor: &mut Cursor<'_>, span: Span) -> Result<AtRule, ParseError> {
    let name = cursor.read_ident();
    let (prelude, terminator) = cursor.read_prelude()?;
    let params = prelude.trim().to_string();

    let nodes = match terminator {
        Some('{') => Some(parse_nodes(cursor, Some(span))?),
        _ => None,
    };

    Ok(AtRule {
        name,
        params,
        nodes,
        span,
    })
}

fn parse_declaration(text: &str, span: Span) -> Result<Declaration, ParseError> {
    let trimmed = text.trim();
    let Some((property, value)) = trimmed.split_once(':') else {
        return Err(ParseError::InvalidDeclaration {
            text: trimmed.to_string(),
            span,
        });
    };

    let property = property.trim();
    if property.is_empty() {
        return Err(ParseError::InvalidDeclaration {
            text: trimmed.to_string(),
            span,
        });
    }

    let mut value = value.trim();
    let mut important = false;
    if let Some(bang) = value.rfind('!') {
        if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
            important = true;
            value = value[..bang].trim_end();
        }
    }

    Ok(Declaration {
        property: property.to_string(),
        value: value.to_string(),
        important,
        span,
    })
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.src[self.pos..].starts_with(pat)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn read_ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                out.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        out
    }

    /// Consumes `/* ... */` and returns the trimmed comment body.
    fn read_comment(&mut self) -> Result<String, ParseError> {
        let span = self.span();
        self.bump();
        self.bump();
        let start = self.pos;
        loop {
            if self.starts_with("*/") {
                let text = self.src[start..self.pos].trim().to_string();
                self.bump();
                self.bump();
                return Ok(text);
            }
            if self.bump().is_none() {
                return Err(ParseError::UnterminatedComment { span });
            }
        }
    }

    /// Reads up to the next top-level `;`, `{` or `}`.
    ///
    /// `;` and `{` are consumed and returned as the terminator; `}` is left
    /// for the enclosing block. Comments inside the prelude are dropped.
    fn read_prelude(&mut self) -> Result<(String, Option<char>), ParseError> {
        let mut out = String::new();
        let mut depth = 0usize;

        while let Some(ch) = self.peek() {
            if self.starts_with("/*") {
                self.read_comment()?;
                continue;
            }
            match ch {
                '"' | '\'' => {
                    self.read_string(ch, &mut out)?;
                    continue;
                }
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                ';' | '{' if depth == 0 => {
                    self.bump();
                    return Ok((out, Some(ch)));
                }
                '}' if depth == 0 => return Ok((out, None)),
                _ => {}
            }
            out.push(ch);
            self.bump();
        }

        Ok((out, None))
    }

    fn read_string(&mut self, quote: char, out: &mut String) -> Result<(), ParseError> {
        let span = self.span();
        out.push(quote);
        self.bump();
        while let Some(ch) = self.bump() {
            out.push(ch);
            if ch == '\\' {
                if let Some(escaped) = self.bump() {
                    out.push(escaped);
                }
                continue;
            }
            if ch == quote {
                return Ok(());
            }
            if ch == '\n' {
                break;
            }
        }
        Err(ParseError::UnterminatedString { span })
    }
}
