//! Expression Evaluator
//!
//! Evaluates the single-line arithmetic expressions the calculator prompt
//! asks the model to produce.
//!
//! Supported: numbers (`12`, `3.5`, `1e-3`), `+ - * / %`, `**` and `^` for
//! powers (right associative), unary signs, parentheses, the constants
//! `pi` and `e`, and one-argument functions (`sqrt`, `abs`, `exp`, `log`,
//! `log10`, `sin`, `cos`, `tan`, `arcsin`, `arccos`, `arctan`, `floor`,
//! `ceil`, `round`).

use crate::error::{ExpressionError, Result};

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Pow,
    LParen,
    RParen,
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Ident(name) => write!(f, "{name}"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::Pow => write!(f, "**"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::Comma => write!(f, ","),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // scientific notation
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExpressionError::UnexpectedToken(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Pow);
                i += 2;
            }
            _ => {
                let token = match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' | '×' => Token::Star,
                    '/' | '÷' => Token::Slash,
                    '%' => Token::Percent,
                    '^' => Token::Pow,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    ch => return Err(ExpressionError::UnexpectedChar { ch, pos: i }),
                };
                tokens.push(token);
                i += 1;
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.next() {
            Some(ref t) if t == expected => Ok(()),
            Some(t) => Err(ExpressionError::UnexpectedToken(t.to_string())),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<f64> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    value /= rhs;
                }
                Some(Token::Percent) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    // Floored: the result takes the sign of the divisor
                    value -= rhs * (value / rhs).floor();
                }
                _ => return Ok(value),
            }
        }
    }

    // unary := ('+' | '-') unary | power
    fn unary(&mut self) -> Result<f64> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    // power := primary ('**' unary)?
    fn power(&mut self) -> Result<f64> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Pow) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let args = self.arguments()?;
                    call(&name, &args)
                } else {
                    constant(&name)
                }
            }
            Some(t) => Err(ExpressionError::UnexpectedToken(t.to_string())),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }

    fn arguments(&mut self) -> Result<Vec<f64>> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            match self.next() {
                Some(Token::Comma) => {}
                Some(Token::RParen) => return Ok(args),
                Some(t) => return Err(ExpressionError::UnexpectedToken(t.to_string())),
                None => return Err(ExpressionError::UnexpectedEnd),
            }
        }
    }
}

fn constant(name: &str) -> Result<f64> {
    match name {
        "pi" => Ok(std::f64::consts::PI),
        "e" => Ok(std::f64::consts::E),
        _ => Err(ExpressionError::UnknownName(name.to_string())),
    }
}

fn call(name: &str, args: &[f64]) -> Result<f64> {
    let f: fn(f64) -> f64 = match name {
        "sqrt" => f64::sqrt,
        "abs" => f64::abs,
        "exp" => f64::exp,
        "log" => f64::ln,
        "log10" => f64::log10,
        "sin" => f64::sin,
        "cos" => f64::cos,
        "tan" => f64::tan,
        "arcsin" => f64::asin,
        "arccos" => f64::acos,
        "arctan" => f64::atan,
        "floor" => f64::floor,
        "ceil" => f64::ceil,
        "round" => f64::round,
        _ => return Err(ExpressionError::UnknownName(name.to_string())),
    };

    match args {
        [x] => Ok(f(*x)),
        _ => Err(ExpressionError::Arity {
            name: name.to_string(),
            expected: 1,
            got: args.len(),
        }),
    }
}

/// Evaluate an expression to a number
pub fn evaluate(input: &str) -> Result<f64> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExpressionError::UnexpectedEnd);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if let Some(extra) = parser.peek() {
        return Err(ExpressionError::UnexpectedToken(extra.to_string()));
    }
    if !value.is_finite() {
        return Err(ExpressionError::NonFinite);
    }
    Ok(value)
}

/// Render a result the way a person would write it: integral values
/// without a trailing `.0`.
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str) -> f64 {
        evaluate(expr).unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert!((eval("2 + 2") - 4.0).abs() < f64::EPSILON);
        assert!((eval("10 * 5") - 50.0).abs() < f64::EPSILON);
        assert!((eval("(2 + 3) * 4") - 20.0).abs() < f64::EPSILON);
        assert!((eval("2 ^ 8") - 256.0).abs() < f64::EPSILON);
        assert!((eval("2 ** 3 ** 2") - 512.0).abs() < f64::EPSILON);
        assert!((eval("7 % 3") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_modulo_follows_divisor_sign() {
        assert!((eval("7 % -3") + 2.0).abs() < f64::EPSILON);
        assert!((eval("-7 % 3") - 2.0).abs() < f64::EPSILON);
        assert!((eval("-7 % -3") + 1.0).abs() < f64::EPSILON);
        assert!((eval("7.5 % 2") - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_precedence_and_signs() {
        assert!((eval("1 + 2 * 3") - 7.0).abs() < f64::EPSILON);
        assert!((eval("-2 ** 2") + 4.0).abs() < f64::EPSILON);
        assert!((eval("2 ** -1") - 0.5).abs() < f64::EPSILON);
        assert!((eval("10 - 4 - 3") - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fruit_problem() {
        // bananas + grapes + apples + blueberries
        assert!((eval("(5 - 2) + (7 - 3) + 12 + 2 * 25") - 69.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_functions_and_constants() {
        assert!((eval("sqrt(16) + 5") - 9.0).abs() < f64::EPSILON);
        assert!((eval("sin(pi / 2)") - 1.0).abs() < 1e-12);
        assert!((eval("1.5e3") - 1500.0).abs() < f64::EPSILON);
        assert!((eval("37593**(1/5)") - 8.222_831_614_237_718).abs() < 1e-9);
    }

    #[test]
    fn test_errors() {
        assert_eq!(evaluate("1 / 0"), Err(ExpressionError::DivisionByZero));
        assert_eq!(evaluate(""), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(evaluate("2 +"), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(evaluate("bananas + 2"), Err(ExpressionError::UnknownName("bananas".into())));
        assert!(matches!(evaluate("2 $ 2"), Err(ExpressionError::UnexpectedChar { ch: '$', .. })));
        assert!(matches!(evaluate("sqrt(1, 2)"), Err(ExpressionError::Arity { got: 2, .. })));
        assert_eq!(evaluate("(1 + 2"), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(evaluate("1 2"), Err(ExpressionError::UnexpectedToken("2".into())));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(2_518_731.0), "2518731");
    }
}
