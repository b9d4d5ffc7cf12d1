use combine::stream::position::SourcePosition;
use failure::{Backtrace, Context, Fail};
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    inner: Context<ErrorKind>,
}

#[derive(Clone, Debug, PartialEq, Fail)]
pub enum ErrorKind {
    #[fail(display = "malformed number literal '{}'", _0)]
    MalformedNumber(String),

    #[fail(display = "expected {}, found {}", expected, found)]
    Expected {
        expected: &'static str,
        found: String,
    },

    #[fail(display = "unknown token {} when expecting an expression", _0)]
    UnknownToken(String),

    #[fail(display = "invalid precedence {}: must be between 1 and 100", _0)]
    InvalidPrecedence(f64),

    #[fail(
        display = "invalid number of operands for operator '{}': expected {}, found {}",
        name, expected, found
    )]
    OperatorArity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[fail(display = "duplicate parameter '{}' in prototype '{}'", param, name)]
    DuplicateParameter { name: String, param: String },

    #[fail(display = "expression nested deeper than {} levels", _0)]
    NestingTooDeep(usize),

    #[fail(display = "internal error: {}", _0)]
    Internal(String),

    #[fail(display = "unknown variable name '{}'", _0)]
    UnknownVariable(String),

    #[fail(display = "unknown function referenced: '{}'", _0)]
    UnknownFunction(String),

    #[fail(
        display = "incorrect number of arguments passed to '{}': expected {}, found {}",
        callee, expected, found
    )]
    ArityMismatch {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[fail(display = "unknown unary operator '{}'", _0)]
    UnknownUnaryOperator(char),

    #[fail(display = "unknown binary operator '{}'", _0)]
    UnknownBinaryOperator(char),

    #[fail(display = "function '{}' cannot be redefined", _0)]
    Redefinition(String),
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Context::new(kind),
        }
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(inner: Context<ErrorKind>) -> Error {
        Error { inner }
    }
}

/// A reported failure together with the start of the token it was detected at.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub position: SourcePosition,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, position: SourcePosition) -> Self {
        Diagnostic { kind, position }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.position.line, self.position.column, self.kind
        )
    }
}
