//! Recursive-descent parser turning a text expression into an [`Expr`] tree.
//!
//! Accepted grammar (usual precedence, `^` and `**` both mean power):
//! ```text
//! expr   := term  (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := '-' unary | power
//! power  := atom ('^' unary)?
//! atom   := number | ident | ident '(' expr ')' | '(' expr ')'
//! ```
//! Known functions: sin, cos, sinh, cosh, exp, ln, log.

use crate::symbolic::symbolic_engine::Expr;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                // "**" is accepted as an alias of "^"
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    tokens.push(Token::Caret);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
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
            _ if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_digit()
                        || chars[i] == '.'
                        || chars[i] == 'e'
                        || chars[i] == 'E'
                        || ((chars[i] == '+' || chars[i] == '-')
                            && i > start
                            && (chars[i - 1] == 'e' || chars[i - 1] == 'E')))
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| format!("cannot parse number `{}`", text))?;
                tokens.push(Token::Number(value));
            }
            _ if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            _ => return Err(format!("unexpected character `{}`", c)),
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
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: Token) -> Result<(), String> {
        match self.next() {
            Some(ref t) if *t == token => Ok(()),
            other => Err(format!("expected {:?}, found {:?}", token, other)),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.next();
                    lhs = lhs + self.parse_term()?;
                }
                Some(Token::Minus) => {
                    self.next();
                    lhs = lhs - self.parse_term()?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_term(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.next();
                    lhs = lhs * self.parse_unary()?;
                }
                Some(Token::Slash) => {
                    self.next();
                    lhs = lhs / self.parse_unary()?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        if let Some(Token::Minus) = self.peek() {
            self.next();
            let inner = self.parse_unary()?;
            return Ok(Expr::Const(-1.0) * inner);
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, String> {
        let base = self.parse_atom()?;
        if let Some(Token::Caret) = self.peek() {
            self.next();
            let exp = self.parse_unary()?;
            return Ok(Expr::Pow(base.boxed(), exp.boxed()));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Number(value)) => Ok(Expr::Const(value)),
            Some(Token::Ident(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.next();
                    let arg = self.parse_expr()?;
                    self.expect(Token::RParen)?;
                    match name.as_str() {
                        "sin" => Ok(Expr::Sin(arg.boxed())),
                        "cos" => Ok(Expr::Cos(arg.boxed())),
                        "sinh" => Ok(Expr::Sinh(arg.boxed())),
                        "cosh" => Ok(Expr::Cosh(arg.boxed())),
                        "exp" => Ok(Expr::Exp(arg.boxed())),
                        "ln" | "log" => Ok(Expr::Ln(arg.boxed())),
                        _ => Err(format!("unknown function `{}`", name)),
                    }
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            other => Err(format!("unexpected token {:?}", other)),
        }
    }
}

/// fallible parsing entry point
pub fn try_parse_expression(input: &str) -> Result<Expr, String> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!(
            "trailing input after position {} in `{}`",
            parser.pos, input
        ));
    }
    Ok(expr)
}

impl Expr {
    /// parse a text expression, panicking on malformed input.
    /// Use [`try_parse_expression`] when the input is not trusted.
    pub fn parse_expression(input: &str) -> Expr {
        match try_parse_expression(input) {
            Ok(expr) => expr,
            Err(e) => panic!("failed to parse `{}`: {}", input, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_polynomial() {
        let f = Expr::parse_expression("x^2 + 2*x - 3");
        let value = f.eval_expression(vec!["x"], &[2.0]);
        assert_relative_eq!(value, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_double_star_power() {
        let f = Expr::parse_expression("x**3");
        let value = f.eval_expression(vec!["x"], &[2.0]);
        assert_relative_eq!(value, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_trig() {
        let f = Expr::parse_expression("sin(k*x) + cos(k*x)");
        let value = f.eval_expression(vec!["k", "x"], &[2.0, 0.25]);
        assert_relative_eq!(value, (0.5f64).sin() + (0.5f64).cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_parse_unary_minus() {
        let f = Expr::parse_expression("-x^2");
        let value = f.eval_expression(vec!["x"], &[3.0]);
        assert_relative_eq!(value, -9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_scientific_number() {
        let f = Expr::parse_expression("1.5e-3 * x");
        let value = f.eval_expression(vec!["x"], &[2.0]);
        assert_relative_eq!(value, 3.0e-3, epsilon = 1e-15);
    }

    #[test]
    fn test_parse_errors() {
        assert!(try_parse_expression("sin(").is_err());
        assert!(try_parse_expression("2 +* 3").is_err());
        assert!(try_parse_expression("foo(x)").is_err());
    }
}
