use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Def,
    Extern,
    If,
    Then,
    Else,
    For,
    In,
    Var,
    Unary,
    Binary,
    Ident(String),
    Number(f64),
    /// Any other character, taken verbatim as operator or punctuation.
    Char(char),
    Eof,
}

impl Token {
    pub(crate) fn keyword(word: &str) -> Option<Token> {
        let token = match word {
            "def" => Token::Def,
            "extern" => Token::Extern,
            "if" => Token::If,
            "then" => Token::Then,
            "else" => Token::Else,
            "for" => Token::For,
            "in" => Token::In,
            "var" => Token::Var,
            "unary" => Token::Unary,
            "binary" => Token::Binary,
            _ => return None,
        };
        Some(token)
    }

    pub fn is_char(&self, c: char) -> bool {
        *self == Token::Char(c)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Def => f.write_str("'def'"),
            Token::Extern => f.write_str("'extern'"),
            Token::If => f.write_str("'if'"),
            Token::Then => f.write_str("'then'"),
            Token::Else => f.write_str("'else'"),
            Token::For => f.write_str("'for'"),
            Token::In => f.write_str("'in'"),
            Token::Var => f.write_str("'var'"),
            Token::Unary => f.write_str("'unary'"),
            Token::Binary => f.write_str("'binary'"),
            Token::Ident(id) => write!(f, "identifier '{}'", id),
            Token::Number(n) => write!(f, "number {}", n),
            Token::Char(c) => write!(f, "'{}'", c),
            Token::Eof => f.write_str("end of input"),
        }
    }
}
