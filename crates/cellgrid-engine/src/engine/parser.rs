//! Formula parser
//!
//! A recursive descent parser for formula bodies (the text after `=`).
//! Children are always evaluated before their parents, so nested function
//! calls resolve innermost-first.
//!
//! Precedence (lowest to highest):
//! 1. Comparison: `=`, `==`, `<>`, `!=`, `<`, `<=`, `>`, `>=`
//! 2. Addition/Subtraction: `+`, `-`
//! 3. Multiplication/Division: `*`, `/`
//! 4. Unary: `-`, `+`
//! 5. Range: `:`
//! 6. Primary: literals, references, function calls, parentheses

use thiserror::Error;

use super::ast::{BinaryOperator, Expr, UnaryOperator};
use super::cell_ref::CellRef;
use super::functions::Function;

/// Maximum nesting of parentheses, calls and unary operators.
pub const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Unexpected {found} at {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("Unexpected end of formula")]
    UnexpectedEnd,

    #[error("Unterminated string literal starting at {0}")]
    UnterminatedString(usize),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Range bounds must be cell references")]
    InvalidRange,

    #[error("Formula nested deeper than {MAX_NESTING} levels")]
    TooDeep,
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Parse a formula body into an expression tree.
///
/// ```
/// use cellgrid_engine::engine::parse_formula;
///
/// assert!(parse_formula("SUM(A1:A3) / 2").is_ok());
/// assert!(parse_formula("A1+").is_err());
/// ```
pub fn parse_formula(body: &str) -> ParseResult<Expr> {
    let tokens = tokenize(body)?;
    let mut parser = FormulaParser {
        source: body,
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_expression()?;
    match parser.current() {
        Token::Eof => Ok(expr),
        _ => Err(parser.unexpected()),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Colon,
    Comma,
    LeftParen,
    RightParen,

    /// Malformed input, kept so a call argument can recover from it.
    Bad(ParseError),

    Eof,
}

// === Token scanning ===

fn tokenize(input: &str) -> ParseResult<Vec<(Token, usize)>> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        let next = chars.get(i + 1).map(|&(_, c)| c);

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let (token, width) = match (c, next) {
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            (':', _) => (Token::Colon, 1),
            (',', _) => (Token::Comma, 1),
            ('(', _) => (Token::LeftParen, 1),
            (')', _) => (Token::RightParen, 1),
            ('=', Some('=')) => (Token::Equal, 2),
            ('=', _) => (Token::Equal, 1),
            ('!', Some('=')) => (Token::NotEqual, 2),
            ('<', Some('>')) => (Token::NotEqual, 2),
            ('<', Some('=')) => (Token::LessEqual, 2),
            ('<', _) => (Token::LessThan, 1),
            ('>', Some('=')) => (Token::GreaterEqual, 2),
            ('>', _) => (Token::GreaterThan, 1),
            ('"' | '\'', _) => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&(_, ch)| ch == c)
                    .ok_or(ParseError::UnterminatedString(pos))?;
                let text: String = chars[i + 1..i + 1 + close].iter().map(|&(_, ch)| ch).collect();
                (Token::Text(text), close + 2)
            }
            (c, _) if c.is_ascii_digit() || c == '.' => {
                let len = number_len(&chars[i..]);
                let text: String = chars[i..i + len].iter().map(|&(_, ch)| ch).collect();
                let token = match text.parse::<f64>() {
                    Ok(n) => Token::Number(n),
                    Err(_) => Token::Bad(ParseError::UnexpectedToken { found: text, pos }),
                };
                (token, len)
            }
            (c, _) if c.is_ascii_alphabetic() || c == '_' => {
                let len = chars[i..]
                    .iter()
                    .take_while(|&&(_, ch)| ch.is_ascii_alphanumeric() || ch == '_')
                    .count();
                let text: String = chars[i..i + len].iter().map(|&(_, ch)| ch).collect();
                (Token::Ident(text), len)
            }
            (ch, _) => (Token::Bad(ParseError::UnexpectedChar { ch, pos }), 1),
        };

        tokens.push((token, pos));
        i += width;
    }

    tokens.push((Token::Eof, input.len()));
    Ok(tokens)
}

/// Length of a numeric literal: digits and dots, then an optional exponent.
fn number_len(chars: &[(usize, char)]) -> usize {
    let mantissa = chars
        .iter()
        .take_while(|&&(_, ch)| ch.is_ascii_digit() || ch == '.')
        .count();
    let rest = &chars[mantissa..];
    let sign = match rest.get(1) {
        Some(&(_, '+' | '-')) => 1,
        _ => 0,
    };
    let exp_digits = rest
        .iter()
        .skip(1 + sign)
        .take_while(|&&(_, ch)| ch.is_ascii_digit())
        .count();
    match rest.first() {
        Some(&(_, 'e' | 'E')) if exp_digits > 0 => mantissa + 1 + sign + exp_digits,
        _ => mantissa,
    }
}

/// Cell reference pattern: letters followed by digits, nothing else.
fn is_cell_reference(text: &str) -> bool {
    let letters = text.bytes().take_while(u8::is_ascii_alphabetic).count();
    let digits = text.bytes().skip(letters).take_while(u8::is_ascii_digit).count();
    letters > 0 && digits > 0 && letters + digits == text.len()
}

struct FormulaParser<'a> {
    source: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl FormulaParser<'_> {
    // === Helper methods ===

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).map_or(&Token::Eof, |(t, _)| t)
    }

    fn consume(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self) -> ParseError {
        match self.tokens.get(self.pos) {
            None | Some((Token::Eof, _)) => ParseError::UnexpectedEnd,
            Some((Token::Bad(e), _)) => e.clone(),
            Some((token, pos)) => ParseError::UnexpectedToken {
                found: format!("{:?}", token),
                pos: *pos,
            },
        }
    }

    fn expect(&mut self, expected: &Token) -> ParseResult<()> {
        if self.current() == expected {
            self.consume();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn descend(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::TooDeep);
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    // === Expression parsing with precedence ===

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current() {
                Token::Equal => BinaryOperator::Equal,
                Token::NotEqual => BinaryOperator::NotEqual,
                Token::LessThan => BinaryOperator::LessThan,
                Token::LessEqual => BinaryOperator::LessEqual,
                Token::GreaterThan => BinaryOperator::GreaterThan,
                Token::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };

            self.consume();
            let right = self.parse_additive()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.current() {
            Token::Minus => UnaryOperator::Negate,
            Token::Plus => UnaryOperator::Plus,
            _ => return self.parse_range(),
        };

        self.consume();
        self.descend()?;
        let operand = self.parse_unary()?;
        self.ascend();
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_range(&mut self) -> ParseResult<Expr> {
        let left = self.parse_primary()?;

        if matches!(self.current(), Token::Colon) {
            self.consume();
            let right = self.parse_primary()?;

            return match (left, right) {
                (Expr::Ref(start), Expr::Ref(end)) => Ok(Expr::Range(start, end)),
                _ => Err(ParseError::InvalidRange),
            };
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.consume() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Text(s) => Ok(Expr::Text(s)),
            Token::LeftParen => {
                self.descend()?;
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                self.ascend();
                Ok(expr)
            }
            Token::Ident(name) => self.parse_identifier(name),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.unexpected())
            }
        }
    }

    fn parse_identifier(&mut self, name: String) -> ParseResult<Expr> {
        if matches!(self.current(), Token::LeftParen) {
            let function =
                Function::from_name(&name).ok_or(ParseError::UnknownFunction(name))?;
            self.consume();
            return self.parse_call(function);
        }

        if is_cell_reference(&name) {
            // Row 0 lies outside every sheet, so it reads as an empty cell.
            return Ok(match CellRef::from_str(&name) {
                Some(cell) => Expr::Ref(cell),
                None => Expr::Number(0.0),
            });
        }

        Ok(Expr::Word(name))
    }

    /// Parse call arguments after the opening parenthesis. Empty arguments
    /// (`SUM(1,,2)`) are skipped. An argument that does not parse becomes
    /// [`Expr::Malformed`] and parsing resumes at the next `,` or `)`.
    fn parse_call(&mut self, function: Function) -> ParseResult<Expr> {
        self.descend()?;
        let mut args = Vec::new();

        loop {
            match self.current() {
                Token::RightParen => {
                    self.consume();
                    break;
                }
                Token::Comma => {
                    self.consume();
                    continue;
                }
                Token::Eof => return Err(ParseError::UnexpectedEnd),
                _ => {}
            }

            let start = self.pos;
            let depth = self.depth;
            let arg = match self.parse_expression() {
                Ok(expr) if matches!(self.current(), Token::Comma | Token::RightParen) => expr,
                Err(ParseError::TooDeep) => return Err(ParseError::TooDeep),
                _ => self.skip_argument(start, depth)?,
            };
            args.push(arg);
        }

        self.ascend();
        Ok(Expr::Call { function, args })
    }

    /// Rewind to the token at `start` and skip to the `,` or `)` that ends
    /// the argument, returning the skipped source text.
    fn skip_argument(&mut self, start: usize, depth: usize) -> ParseResult<Expr> {
        self.pos = start;
        self.depth = depth;
        let mut open = 0usize;
        loop {
            match self.current() {
                Token::Eof => return Err(ParseError::UnexpectedEnd),
                Token::Comma | Token::RightParen if open == 0 => break,
                Token::LeftParen => open += 1,
                Token::RightParen => open -= 1,
                _ => {}
            }
            self.consume();
        }
        let from = self.tokens.get(start).map_or(0, |&(_, pos)| pos);
        let to = self.tokens.get(self.pos).map_or(self.source.len(), |&(_, pos)| pos);
        let text = self.source.get(from..to).unwrap_or_default().trim();
        Ok(Expr::Malformed(text.to_string()))
    }
}
