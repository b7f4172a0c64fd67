use thiserror::Error;

/// Element-name part of a compound selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSelector {
    Universal,
    Type(String), // element/tag selector, lowercase
}

/// `[name]` or `[name=value]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub value: Option<String>,
}

/// One compound selector: `type`, `*`, attribute tests and `:not(type)` negations,
/// all applying to the same element. Combinators are not supported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    pub element: TypeSelector,
    pub attributes: Vec<AttributeSelector>,
    pub negations: Vec<TypeSelector>,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected {found:?} at offset {offset} in {selector:?}")]
    Unexpected {
        selector: String,
        offset: usize,
        found: char,
    },
    #[error("unterminated {what} in {selector:?}")]
    Unterminated { selector: String, what: &'static str },
    #[error("unsupported selector syntax in {0:?}")]
    Unsupported(String),
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

// input: "input[type=email]", ":not(body):not(frameset)[onload]", "*[hidden]"
// output: Selector { element, attributes, negations }
pub fn parse_selector(input: &str) -> Result<Selector, SelectorError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(SelectorError::Empty);
    }
    let mut cursor = Cursor { s, pos: 0 };
    let mut selector = Selector {
        element: TypeSelector::Universal,
        attributes: Vec::new(),
        negations: Vec::new(),
    };

    if cursor.eat('*') {
        // explicit universal
    } else if let Some(name) = cursor.ident() {
        selector.element = TypeSelector::Type(name.to_ascii_lowercase());
    }

    while let Some(c) = cursor.peek() {
        match c {
            '[' => {
                cursor.bump();
                selector.attributes.push(parse_attribute(&mut cursor)?);
            }
            ':' => {
                cursor.bump();
                if !cursor.eat_keyword("not(") {
                    return Err(SelectorError::Unsupported(s.to_string()));
                }
                cursor.skip_whitespace();
                let negated = if cursor.eat('*') {
                    TypeSelector::Universal
                } else {
                    let name = cursor.ident().ok_or_else(|| cursor.unexpected())?;
                    TypeSelector::Type(name.to_ascii_lowercase())
                };
                cursor.skip_whitespace();
                if !cursor.eat(')') {
                    return Err(match cursor.peek() {
                        Some(_) => cursor.unexpected(),
                        None => cursor.unterminated(":not("),
                    });
                }
                selector.negations.push(negated);
            }
            c if c.is_whitespace() || c == '>' || c == '+' || c == '~' || c == ',' => {
                return Err(SelectorError::Unsupported(s.to_string()));
            }
            _ => return Err(cursor.unexpected()),
        }
    }
    Ok(selector)
}

fn parse_attribute(cursor: &mut Cursor<'_>) -> Result<AttributeSelector, SelectorError> {
    cursor.skip_whitespace();
    let name = cursor.ident().ok_or_else(|| cursor.unexpected_or_eof("["))?;
    cursor.skip_whitespace();
    let value = if cursor.eat('=') {
        cursor.skip_whitespace();
        let value = match cursor.peek() {
            Some(q @ ('"' | '\'')) => {
                cursor.bump();
                cursor.until(q).ok_or_else(|| cursor.unterminated("string"))?
            }
            Some(_) => cursor.ident().ok_or_else(|| cursor.unexpected())?,
            None => return Err(cursor.unterminated("[")),
        };
        cursor.skip_whitespace();
        Some(value.to_string())
    } else {
        None
    };
    if !cursor.eat(']') {
        return Err(cursor.unexpected_or_eof("["));
    }
    Ok(AttributeSelector {
        name: name.to_ascii_lowercase(),
        value,
    })
}

struct Cursor<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.s[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        let rest = &self.s[self.pos..];
        if rest.len() >= kw.len() && rest.is_char_boundary(kw.len()) && rest[..kw.len()].eq_ignore_ascii_case(kw) {
            self.pos += kw.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        (self.pos > start).then(|| &self.s[start..self.pos])
    }

    fn until(&mut self, end: char) -> Option<&'a str> {
        let rest = &self.s[self.pos..];
        let idx = rest.find(end)?;
        self.pos += idx + end.len_utf8();
        Some(&rest[..idx])
    }

    fn unexpected(&self) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.s.to_string(),
            offset: self.pos,
            found: self.peek().unwrap_or('\0'),
        }
    }

    fn unterminated(&self, what: &'static str) -> SelectorError {
        SelectorError::Unterminated {
            selector: self.s.to_string(),
            what,
        }
    }

    fn unexpected_or_eof(&self, what: &'static str) -> SelectorError {
        match self.peek() {
            Some(_) => self.unexpected(),
            None => self.unterminated(what),
        }
    }
}

impl std::fmt::Display for TypeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeSelector::Universal => f.write_str("*"),
            TypeSelector::Type(name) => f.write_str(name),
        }
    }
}
