/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Parser for key condition expressions.
//!
//! ```text
//! condition := predicate [ AND predicate ]
//! predicate := name op value
//!            | name BETWEEN value AND value
//!            | begins_with ( name , value )
//! op        := = | < | <= | > | >=
//! ```
//!
//! Names are attribute names or `#placeholders`. Values are always
//! `:placeholders`. Keywords are case-insensitive, `begins_with` is not.
//! The parser checks syntax only; which attributes may appear is up to the caller.

use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
enum ParseErrorKind {
    InvalidCharacter(char),
    EmptyPlaceholder(char),
    UnexpectedToken(String, &'static str),
    UnexpectedEnd(&'static str),
    TooManyPredicates,
}

/// A syntax error in a key condition expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    offset: usize,
}

impl ParseError {
    fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// Byte offset of the error in the expression.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ParseErrorKind::*;
        write!(f, "error at offset {}: ", self.offset)?;
        match &self.kind {
            InvalidCharacter(c) => write!(f, "invalid character '{}'", c),
            EmptyPlaceholder(c) => write!(f, "'{}' must be followed by a name", c),
            UnexpectedToken(token, expected) => {
                write!(f, "unexpected '{}', expected {}", token, expected)
            }
            UnexpectedEnd(expected) => write!(f, "unexpected end of expression, expected {}", expected),
            TooManyPredicates => write!(f, "a key condition has at most two predicates"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Comparison operators allowed on a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComparisonOperator {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Ge => ">=",
        })
    }
}

/// One predicate on a key attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyPredicate {
    /// `name op value`
    Comparison {
        /// Attribute name or `#placeholder`.
        name: String,
        /// The operator.
        operator: ComparisonOperator,
        /// `:placeholder` of the operand.
        value: String,
    },
    /// `name BETWEEN low AND high`, inclusive.
    Between {
        /// Attribute name or `#placeholder`.
        name: String,
        /// `:placeholder` of the lower bound.
        low: String,
        /// `:placeholder` of the upper bound.
        high: String,
    },
    /// `begins_with(name, prefix)`
    BeginsWith {
        /// Attribute name or `#placeholder`.
        name: String,
        /// `:placeholder` of the prefix.
        prefix: String,
    },
}

impl KeyPredicate {
    /// The attribute name or `#placeholder` the predicate applies to.
    pub fn name(&self) -> &str {
        match self {
            KeyPredicate::Comparison { name, .. }
            | KeyPredicate::Between { name, .. }
            | KeyPredicate::BeginsWith { name, .. } => name,
        }
    }

    /// The value placeholders the predicate references, in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            KeyPredicate::Comparison { value, .. } => vec![value],
            KeyPredicate::Between { low, high, .. } => vec![low, high],
            KeyPredicate::BeginsWith { prefix, .. } => vec![prefix],
        }
    }

    /// True for `name = value`.
    pub fn is_equality(&self) -> bool {
        matches!(
            self,
            KeyPredicate::Comparison {
                operator: ComparisonOperator::Eq,
                ..
            }
        )
    }
}

/// A parsed key condition: one or two predicates joined by `AND`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyConditionExpression {
    predicates: Vec<KeyPredicate>,
}

impl KeyConditionExpression {
    /// The predicates, in source order.
    pub fn predicates(&self) -> &[KeyPredicate] {
        &self.predicates
    }

    /// Consume the expression, returning its predicates.
    pub fn into_predicates(self) -> Vec<KeyPredicate> {
        self.predicates
    }
}

/// Resolve `name` through `ExpressionAttributeNames` if it is a `#placeholder`.
///
/// Returns `None` for an unbound placeholder.
pub fn resolve_name<'a>(
    name: &'a str,
    names: Option<&'a HashMap<String, String>>,
) -> Option<&'a str> {
    if name.starts_with('#') {
        names?.get(name).map(String::as_str)
    } else {
        Some(name)
    }
}

/// Parse a key condition expression.
pub fn parse(expression: &str) -> Result<KeyConditionExpression, ParseError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        tokens,
        position: 0,
        end: expression.len(),
    };
    let mut predicates = vec![parser.predicate()?];
    if parser.keyword("AND") {
        predicates.push(parser.predicate()?);
    }
    if let Some(token) = parser.peek() {
        let kind = if token.kind.is_keyword("AND") {
            ParseErrorKind::TooManyPredicates
        } else {
            ParseErrorKind::UnexpectedToken(token.kind.to_string(), "AND or end of expression")
        };
        return Err(ParseError::new(kind, token.offset));
    }
    Ok(KeyConditionExpression { predicates })
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum TokenKind {
    Word(String),
    Name(String),
    Value(String),
    Operator(ComparisonOperator),
    OpenParen,
    CloseParen,
    Comma,
}

impl TokenKind {
    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, TokenKind::Word(word) if word.eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word(s) | TokenKind::Name(s) | TokenKind::Value(s) => f.write_str(s),
            TokenKind::Operator(op) => write!(f, "{}", op),
            TokenKind::OpenParen => f.write_str("("),
            TokenKind::CloseParen => f.write_str(")"),
            TokenKind::Comma => f.write_str(","),
        }
    }
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize(expression: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Operator(ComparisonOperator::Eq),
            '<' | '>' => {
                let or_equal = chars.next_if(|&(_, next)| next == '=').is_some();
                TokenKind::Operator(match (c, or_equal) {
                    ('<', false) => ComparisonOperator::Lt,
                    ('<', true) => ComparisonOperator::Le,
                    (_, false) => ComparisonOperator::Gt,
                    (_, true) => ComparisonOperator::Ge,
                })
            }
            ':' | '#' => {
                let mut word = String::from(c);
                while let Some((_, next)) = chars.next_if(|&(_, next)| is_word_char(next)) {
                    word.push(next);
                }
                if word.len() == 1 {
                    return Err(ParseError::new(ParseErrorKind::EmptyPlaceholder(c), offset));
                }
                if c == ':' {
                    TokenKind::Value(word)
                } else {
                    TokenKind::Name(word)
                }
            }
            c if is_word_char(c) => {
                let mut word = String::from(c);
                while let Some((_, next)) = chars.next_if(|&(_, next)| is_word_char(next)) {
                    word.push(next);
                }
                TokenKind::Word(word)
            }
            c => return Err(ParseError::new(ParseErrorKind::InvalidCharacter(c), offset)),
        };
        tokens.push(Token { kind, offset });
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self, expected: &'static str) -> Result<Token, ParseError> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnexpectedEnd(expected), self.end))?;
        self.position += 1;
        Ok(token)
    }

    fn unexpected(token: Token, expected: &'static str) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken(token.kind.to_string(), expected),
            token.offset,
        )
    }

    fn keyword(&mut self, keyword: &str) -> bool {
        let matched = self
            .peek()
            .map(|token| token.kind.is_keyword(keyword))
            .unwrap_or(false);
        if matched {
            self.position += 1;
        }
        matched
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), ParseError> {
        let token = self.next(expected)?;
        if token.kind == kind {
            Ok(())
        } else {
            Err(Self::unexpected(token, expected))
        }
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> Result<(), ParseError> {
        let token = self.next(keyword)?;
        if token.kind.is_keyword(keyword) {
            Ok(())
        } else {
            Err(Self::unexpected(token, keyword))
        }
    }

    fn name(&mut self) -> Result<String, ParseError> {
        const EXPECTED: &str = "an attribute name";
        let token = self.next(EXPECTED)?;
        let keyword = token.kind.is_keyword("AND") || token.kind.is_keyword("BETWEEN");
        match token.kind {
            TokenKind::Name(name) => Ok(name),
            TokenKind::Word(word) if !keyword => Ok(word),
            _ => Err(Self::unexpected(token, EXPECTED)),
        }
    }

    fn value(&mut self) -> Result<String, ParseError> {
        const EXPECTED: &str = "a :value placeholder";
        let token = self.next(EXPECTED)?;
        match token.kind {
            TokenKind::Value(value) => Ok(value),
            _ => Err(Self::unexpected(token, EXPECTED)),
        }
    }

    fn predicate(&mut self) -> Result<KeyPredicate, ParseError> {
        let is_function = matches!(
            (self.tokens.get(self.position), self.tokens.get(self.position + 1)),
            (Some(Token { kind: TokenKind::Word(word), .. }), Some(Token { kind: TokenKind::OpenParen, .. }))
                if word == "begins_with"
        );
        if is_function {
            self.position += 2;
            let name = self.name()?;
            self.expect(TokenKind::Comma, "','")?;
            let prefix = self.value()?;
            self.expect(TokenKind::CloseParen, "')'")?;
            return Ok(KeyPredicate::BeginsWith { name, prefix });
        }

        let name = self.name()?;
        if self.keyword("BETWEEN") {
            let low = self.value()?;
            self.expect_keyword("AND")?;
            let high = self.value()?;
            return Ok(KeyPredicate::Between { name, low, high });
        }
        const EXPECTED: &str = "a comparison operator or BETWEEN";
        let token = self.next(EXPECTED)?;
        let operator = match token.kind {
            TokenKind::Operator(operator) => operator,
            _ => return Err(Self::unexpected(token, EXPECTED)),
        };
        let value = self.value()?;
        Ok(KeyPredicate::Comparison {
            name,
            operator,
            value,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn comparison(name: &str, operator: ComparisonOperator, value: &str) -> KeyPredicate {
        KeyPredicate::Comparison {
            name: name.into(),
            operator,
            value: value.into(),
        }
    }

    #[test]
    fn partition_key_only() {
        let parsed = parse("pk = :pk").unwrap();
        assert_eq!(parsed.predicates(), &[comparison("pk", ComparisonOperator::Eq, ":pk")]);
        assert!(parsed.predicates()[0].is_equality());
    }

    #[test]
    fn sort_key_predicates() {
        let parsed = parse("#p = :p and sk<=:max").unwrap();
        assert_eq!(
            parsed.into_predicates(),
            vec![
                comparison("#p", ComparisonOperator::Eq, ":p"),
                comparison("sk", ComparisonOperator::Le, ":max"),
            ]
        );

        let between = parse("pk = :p AND sk BETWEEN :lo AND :hi").unwrap();
        assert_eq!(
            between.predicates()[1],
            KeyPredicate::Between {
                name: "sk".into(),
                low: ":lo".into(),
                high: ":hi".into()
            }
        );
        assert_eq!(between.predicates()[1].values(), vec![":lo", ":hi"]);

        let prefix = parse("pk = :p AND begins_with ( sk , :prefix )").unwrap();
        assert_eq!(
            prefix.predicates()[1],
            KeyPredicate::BeginsWith {
                name: "sk".into(),
                prefix: ":prefix".into()
            }
        );
    }

    #[test]
    fn syntax_errors() {
        let err = parse("pk = ").unwrap_err();
        assert_eq!(err.offset(), 5);
        assert!(err.to_string().contains("unexpected end"), "{}", err);

        let err = parse("pk = :a AND sk = :b AND x = :c").unwrap_err();
        assert_eq!(err.to_string(), "error at offset 20: a key condition has at most two predicates");

        assert!(parse("pk <> :a").is_err());
        assert!(parse("pk = 5").is_err());
        assert!(parse("pk = :").is_err());
        assert!(parse("BEGINS_WITH(sk, :p)").is_err());
    }

    #[test]
    fn names_resolve_through_placeholders() {
        let mut names = HashMap::new();
        names.insert("#p".to_string(), "pk".to_string());
        assert_eq!(resolve_name("#p", Some(&names)), Some("pk"));
        assert_eq!(resolve_name("#q", Some(&names)), None);
        assert_eq!(resolve_name("#p", None), None);
        assert_eq!(resolve_name("pk", None), Some("pk"));
    }
}
