//! Safe arithmetic evaluator shared by the MATH route and the `CALCULUS`
//! Φ-operator (spec.md §4.6, §4.7). The grammar allows only numeric
//! literals, binary `+ - * / // %`, unary `+ -`, and parentheses — no
//! identifiers, no function calls, no control flow. Division by zero yields
//! `0` (spec.md §9 Open Question (a), resolved in favor of the source's
//! behavior rather than surfacing an evaluator error).

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub enum MathError {
    Parse(String),
    TrailingInput,
}

impl std::fmt::Display for MathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MathError::Parse(s) => write!(f, "parse error: {s}"),
            MathError::TrailingInput => write!(f, "trailing input after expression"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    DSlash,
    Percent,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, MathError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    tokens.push(Token::DSlash);
                    i += 2;
                } else {
                    tokens.push(Token::Slash);
                    i += 1;
                }
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let lit: String = chars[start..i].iter().collect();
                let v: f64 = lit
                    .parse()
                    .map_err(|_| MathError::Parse(format!("invalid number literal {lit:?}")))?;
                tokens.push(Token::Number(v));
            }
            other => return Err(MathError::Parse(format!("unexpected character {other:?}"))),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }

    fn expr(&mut self) -> Result<f64, MathError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.advance();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, MathError> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    value *= self.factor()?;
                }
                Some(Token::Slash) => {
                    self.advance();
                    let rhs = self.factor()?;
                    value = if rhs == 0.0 { 0.0 } else { value / rhs };
                }
                Some(Token::DSlash) => {
                    self.advance();
                    let rhs = self.factor()?;
                    value = if rhs == 0.0 { 0.0 } else { (value / rhs).floor() };
                }
                Some(Token::Percent) => {
                    self.advance();
                    let rhs = self.factor()?;
                    value = if rhs == 0.0 { 0.0 } else { value.rem_euclid(rhs) };
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, MathError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.advance();
                self.factor()
            }
            Some(Token::Minus) => {
                self.advance();
                Ok(-self.factor()?)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, MathError> {
        match self.advance() {
            Some(Token::Number(v)) => Ok(*v),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(MathError::Parse("expected ')'".to_string())),
                }
            }
            other => Err(MathError::Parse(format!("unexpected token {other:?}"))),
        }
    }
}

/// Evaluates `expr` in full (the whole string must parse, no trailing junk).
pub fn eval(expr: &str) -> Result<f64, MathError> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != tokens.len() {
        return Err(MathError::TrailingInput);
    }
    Ok(value)
}

/// Cheap pre-check used by route classification: a digit and an operator
/// must both be present before we try the full parse.
pub fn looks_like_math(text: &str) -> bool {
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    let has_op = text.chars().any(|c| "+-*/%()".contains(c));
    has_digit && has_op
}

fn embedded_expr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"-?\d+(?:\.\d+)?\s*(?:[-+*/%]\s*-?\d+(?:\.\d+)?\s*)+")
            .expect("static regex is valid")
    })
}

/// Scans free-form text for the first embedded arithmetic expression (used
/// by `CALCULUS`, which runs over natural-language input rather than a
/// string that is purely an expression).
pub fn extract_embedded_expression(text: &str) -> Option<(String, f64)> {
    let m = embedded_expr_regex().find(text)?;
    let candidate = m.as_str().trim().trim_end_matches(|c: char| "+-*/%".contains(c)).trim();
    let value = eval(candidate).ok()?;
    Some((candidate.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_simple_addition() {
        assert_eq!(eval("2+2").unwrap(), 4.0);
    }

    #[test]
    fn respects_precedence_and_parens() {
        assert_eq!(eval("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(eval("(2 + 3) * 4").unwrap(), 20.0);
    }

    #[test]
    fn division_by_zero_yields_zero() {
        assert_eq!(eval("5 / 0").unwrap(), 0.0);
        assert_eq!(eval("5 % 0").unwrap(), 0.0);
    }

    #[test]
    fn extracts_embedded_expression_from_sentence() {
        let (text, value) = extract_embedded_expression("Quanto é 10 + 5?").unwrap();
        assert_eq!(text, "10 + 5");
        assert_eq!(value, 15.0);
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(eval("2+2x").is_err());
    }
}
