use super::token::Token;
use std::collections::HashMap;
use tracing::debug;

/// Precedence reported for anything that is not a declared binary operator.
pub const NOT_AN_OPERATOR: i32 = -1;

pub const MIN_PRECEDENCE: i32 = 1;
pub const MAX_PRECEDENCE: i32 = 100;

/// Precedence of a `binary` operator declared without an explicit one.
pub const DEFAULT_BINARY_PRECEDENCE: i32 = 30;

pub const BUILTIN_OPERATORS: [(char, i32); 4] = [('<', 10), ('+', 20), ('-', 20), ('*', 40)];

/// The mutable binary-operator precedence table of one parse run.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    bin_op_precedence: HashMap<char, i32>,
}

impl Session {
    pub fn new() -> Self {
        Session::with_operators(BUILTIN_OPERATORS.iter().copied())
    }

    /// A table with no binary operators at all.
    pub fn empty() -> Self {
        Session {
            bin_op_precedence: HashMap::new(),
        }
    }

    pub fn with_operators<I>(operators: I) -> Self
    where
        I: IntoIterator<Item = (char, i32)>,
    {
        Session {
            bin_op_precedence: operators.into_iter().collect(),
        }
    }

    pub fn precedence_of(&self, token: &Token) -> i32 {
        match token {
            Token::Char(c) if c.is_ascii() => self
                .bin_op_precedence
                .get(c)
                .copied()
                .unwrap_or(NOT_AN_OPERATOR),
            _ => NOT_AN_OPERATOR,
        }
    }

    /// Overwrites any earlier precedence for `op`.
    pub fn declare_operator(&mut self, op: char, precedence: i32) {
        debug!(%op, precedence, "declaring binary operator");
        self.bin_op_precedence.insert(op, precedence);
    }

    pub fn is_declared(&self, op: char) -> bool {
        self.bin_op_precedence.contains_key(&op)
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builtin_precedence() {
        let session = Session::new();
        assert_eq!(session.precedence_of(&Token::Char('<')), 10);
        assert_eq!(session.precedence_of(&Token::Char('+')), 20);
        assert_eq!(session.precedence_of(&Token::Char('-')), 20);
        assert_eq!(session.precedence_of(&Token::Char('*')), 40);
    }

    #[test]
    fn test_not_an_operator() {
        let session = Session::new();
        assert_eq!(session.precedence_of(&Token::Char('|')), NOT_AN_OPERATOR);
        assert_eq!(session.precedence_of(&Token::Char('→')), NOT_AN_OPERATOR);
        assert_eq!(session.precedence_of(&Token::Number(1.0)), NOT_AN_OPERATOR);
        assert_eq!(session.precedence_of(&Token::Eof), NOT_AN_OPERATOR);
        assert_eq!(
            session.precedence_of(&Token::Ident("x".to_owned())),
            NOT_AN_OPERATOR
        );
    }

    #[test]
    fn test_declare_overwrites() {
        let mut session = Session::new();
        session.declare_operator('|', 5);
        assert_eq!(session.precedence_of(&Token::Char('|')), 5);
        session.declare_operator('|', 5);
        assert_eq!(session.precedence_of(&Token::Char('|')), 5);
        session.declare_operator('+', 60);
        assert_eq!(session.precedence_of(&Token::Char('+')), 60);
    }

    #[test]
    fn test_empty() {
        let session = Session::empty();
        assert!(!session.is_declared('+'));
        assert_eq!(session.precedence_of(&Token::Char('+')), NOT_AN_OPERATOR);
    }
}
