//! Lexer and parser for SELECT statements.
//!
//! Keywords are matched case-insensitively. Identifiers are either bare
//! (`Data`) or double-quoted (`"table-with-hash"`); string literals are
//! single-quoted with `''` as an escaped quote.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use dynamock_model::AttributeValue;
use dynamock_model::attribute_value::is_valid_number;
use dynamock_model::types::{ComparisonOperator, Condition, ConditionalOperator};

use super::ast::{SelectProjection, SelectStatement};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced while parsing a statement.
#[derive(Debug, thiserror::Error)]
pub enum StatementError {
    /// An unexpected token was encountered.
    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },
    /// The statement ended prematurely.
    #[error("Unexpected end of statement: expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: String,
    },
    /// A bare value that is not a numeric literal.
    #[error("Invalid number literal: {literal}")]
    InvalidNumber {
        /// The offending text.
        literal: String,
    },
    /// A quoted string or identifier without its closing quote.
    #[error("Unterminated literal starting with {quote}{fragment}")]
    UnterminatedLiteral {
        /// The opening quote character.
        quote: char,
        /// Text read before input ran out.
        fragment: String,
    },
}

// ---------------------------------------------------------------------------
// Token type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// A bare identifier.
    Identifier(String),
    /// A double-quoted identifier.
    QuotedIdentifier(String),
    /// A single-quoted string literal, unescaped.
    Str(String),
    /// A numeric literal, as written.
    Number(String),
    Star,
    Comma,
    Dot,
    LBracket,
    RBracket,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Keywords
    Select,
    From,
    Where,
    And,
    Or,
    In,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(s) => write!(f, "identifier '{s}'"),
            Self::QuotedIdentifier(s) => write!(f, "identifier \"{s}\""),
            Self::Str(s) => write!(f, "string '{s}'"),
            Self::Number(n) => write!(f, "number {n}"),
            Self::Star => write!(f, "'*'"),
            Self::Comma => write!(f, "','"),
            Self::Dot => write!(f, "'.'"),
            Self::LBracket => write!(f, "'['"),
            Self::RBracket => write!(f, "']'"),
            Self::Eq => write!(f, "'='"),
            Self::Ne => write!(f, "'<>'"),
            Self::Lt => write!(f, "'<'"),
            Self::Le => write!(f, "'<='"),
            Self::Gt => write!(f, "'>'"),
            Self::Ge => write!(f, "'>='"),
            Self::Select => write!(f, "SELECT"),
            Self::From => write!(f, "FROM"),
            Self::Where => write!(f, "WHERE"),
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::In => write!(f, "IN"),
            Self::Eof => write!(f, "EOF"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn tokenize(&mut self) -> Result<Vec<Token>, StatementError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            if tok == Token::Eof {
                tokens.push(Token::Eof);
                break;
            }
            tokens.push(tok);
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(char::is_ascii_whitespace) {
            self.chars.next();
        }
    }

    fn next_token(&mut self) -> Result<Token, StatementError> {
        self.skip_whitespace();

        let Some(&ch) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        match ch {
            '*' => Ok(self.single(Token::Star)),
            ',' => Ok(self.single(Token::Comma)),
            '[' => Ok(self.single(Token::LBracket)),
            ']' => Ok(self.single(Token::RBracket)),
            '=' => Ok(self.single(Token::Eq)),
            '.' if !self.next_is_digit() => Ok(self.single(Token::Dot)),
            '<' => Ok(self.read_lt_family()),
            '>' => Ok(self.read_gt_family()),
            '!' => self.read_bang_eq(),
            '\'' => self.read_quoted('\'').map(Token::Str),
            '"' => self.read_quoted('"').map(Token::QuotedIdentifier),
            c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.read_number(),
            c if is_ident_start(c) => Ok(self.read_identifier_or_keyword()),
            _ => Err(StatementError::UnexpectedToken {
                expected: "valid token".to_owned(),
                found: format!("'{ch}'"),
            }),
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.chars.next();
        token
    }

    /// Whether the character after the current one is an ASCII digit.
    fn next_is_digit(&self) -> bool {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.peek().is_some_and(char::is_ascii_digit)
    }

    fn read_lt_family(&mut self) -> Token {
        self.chars.next(); // consume '<'
        if self.chars.peek() == Some(&'=') {
            self.chars.next();
            Token::Le
        } else if self.chars.peek() == Some(&'>') {
            self.chars.next();
            Token::Ne
        } else {
            Token::Lt
        }
    }

    fn read_gt_family(&mut self) -> Token {
        self.chars.next(); // consume '>'
        if self.chars.peek() == Some(&'=') {
            self.chars.next();
            Token::Ge
        } else {
            Token::Gt
        }
    }

    fn read_bang_eq(&mut self) -> Result<Token, StatementError> {
        self.chars.next(); // consume '!'
        if self.chars.peek() == Some(&'=') {
            self.chars.next();
            Ok(Token::Ne)
        } else {
            Err(StatementError::UnexpectedToken {
                expected: "'!='".to_owned(),
                found: "'!'".to_owned(),
            })
        }
    }

    /// Read a quoted run; a doubled quote inside stands for one quote.
    fn read_quoted(&mut self, quote: char) -> Result<String, StatementError> {
        self.chars.next(); // consume opening quote
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => {
                    if self.chars.peek() == Some(&quote) {
                        self.chars.next();
                        s.push(quote);
                    } else {
                        return Ok(s);
                    }
                }
                Some(c) => s.push(c),
                None => {
                    return Err(StatementError::UnterminatedLiteral { quote, fragment: s });
                }
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, StatementError> {
        let mut s = String::new();
        if matches!(self.chars.peek(), Some('-' | '+')) {
            s.extend(self.chars.next());
        }
        while let Some(&c) = self.chars.peek() {
            let after_exponent = matches!(s.chars().last(), Some('e' | 'E'));
            if c.is_ascii_alphanumeric() || c == '.' || (after_exponent && matches!(c, '-' | '+'))
            {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if is_valid_number(&s) {
            Ok(Token::Number(s))
        } else {
            Err(StatementError::InvalidNumber { literal: s })
        }
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if is_ident_continue(c) {
                ident.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        match ident.to_ascii_lowercase().as_str() {
            "select" => Token::Select,
            "from" => Token::From,
            "where" => Token::Where,
            "and" => Token::And,
            "or" => Token::Or,
            "in" => Token::In,
            _ => Token::Identifier(ident),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<Token, StatementError> {
        let tok = self.advance();
        if std::mem::discriminant(&tok) == std::mem::discriminant(expected) {
            Ok(tok)
        } else {
            Err(unexpected(&expected.to_string(), &tok))
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn parse_select(&mut self) -> Result<SelectStatement, StatementError> {
        self.expect(&Token::Select)?;
        let projection = self.parse_projection()?;

        self.expect(&Token::From)?;
        let table_name = self.parse_name()?;
        let index_name = if matches!(self.peek(), Token::Dot) {
            self.advance();
            Some(self.parse_name()?)
        } else {
            None
        };

        let (combinator, conditions) = if matches!(self.peek(), Token::Where) {
            self.advance();
            self.parse_conditions()?
        } else {
            (ConditionalOperator::And, Vec::new())
        };

        if !self.at_end() {
            return Err(unexpected("end of statement", self.peek()));
        }

        Ok(SelectStatement {
            table_name,
            index_name,
            projection,
            combinator,
            conditions,
        })
    }

    fn parse_projection(&mut self) -> Result<SelectProjection, StatementError> {
        if matches!(self.peek(), Token::Star) {
            self.advance();
            return Ok(SelectProjection::All);
        }
        let mut names = vec![self.parse_name()?];
        while matches!(self.peek(), Token::Comma) {
            self.advance();
            names.push(self.parse_name()?);
        }
        Ok(SelectProjection::Attributes(names))
    }

    fn parse_name(&mut self) -> Result<String, StatementError> {
        match self.advance() {
            Token::Identifier(name) => Ok(name),
            Token::QuotedIdentifier(name) if !name.is_empty() => Ok(name),
            other => Err(unexpected("identifier", &other)),
        }
    }

    /// Conditions joined by AND/OR. Any OR switches the whole clause to OR.
    fn parse_conditions(
        &mut self,
    ) -> Result<(ConditionalOperator, Vec<(String, Condition)>), StatementError> {
        let mut combinator = ConditionalOperator::And;
        let mut conditions = vec![self.parse_condition()?];
        loop {
            match self.peek() {
                Token::And => {}
                Token::Or => combinator = ConditionalOperator::Or,
                _ => break,
            }
            self.advance();
            conditions.push(self.parse_condition()?);
        }
        Ok((combinator, conditions))
    }

    fn parse_condition(&mut self) -> Result<(String, Condition), StatementError> {
        let name = self.parse_name()?;
        let operator = match self.advance() {
            Token::Eq => ComparisonOperator::Eq,
            Token::Ne => ComparisonOperator::Ne,
            Token::Lt => ComparisonOperator::Lt,
            Token::Le => ComparisonOperator::Le,
            Token::Gt => ComparisonOperator::Gt,
            Token::Ge => ComparisonOperator::Ge,
            Token::In => ComparisonOperator::In,
            other => return Err(unexpected("comparison operator", &other)),
        };
        let operands = self.parse_operands()?;
        Ok((name, Condition::new(operator, operands)))
    }

    /// A single value, or a bracketed non-empty list of values.
    fn parse_operands(&mut self) -> Result<Vec<AttributeValue>, StatementError> {
        if !matches!(self.peek(), Token::LBracket) {
            return Ok(vec![self.parse_value()?]);
        }
        self.advance();
        let mut values = vec![self.parse_value()?];
        while matches!(self.peek(), Token::Comma) {
            self.advance();
            values.push(self.parse_value()?);
        }
        self.expect(&Token::RBracket)?;
        Ok(values)
    }

    fn parse_value(&mut self) -> Result<AttributeValue, StatementError> {
        match self.advance() {
            Token::Str(s) => Ok(AttributeValue::S(s)),
            Token::Number(n) => Ok(AttributeValue::N(n)),
            other => Err(unexpected("string or number", &other)),
        }
    }
}

fn unexpected(expected: &str, found: &Token) -> StatementError {
    if *found == Token::Eof {
        StatementError::UnexpectedEof {
            expected: expected.to_owned(),
        }
    } else {
        StatementError::UnexpectedToken {
            expected: expected.to_owned(),
            found: found.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a SELECT statement.
pub fn parse_select(input: &str) -> Result<SelectStatement, StatementError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser::new(tokens);
    parser.parse_select()
}
