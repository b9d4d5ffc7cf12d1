//! Front end for the Kaleidoscope language: a lexer, a precedence-climbing
//! parser whose operator table grows as `binary` definitions are parsed,
//! the syntax tree with its visitors, and the scope stack and listener
//! bridge that semantic consumers plug into.
//!
//! ```ignore
//! let mut session = Session::new();
//! let mut forms: Vec<Form> = Vec::new();
//! let diagnostics = parse("def binary| 5 (a b) a; 1 | 2", &mut session, &mut forms);
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod listener;
pub mod parser;
pub mod printer;
pub mod resolve;
pub mod scope;
pub mod session;
pub mod token;
mod toplevel;
pub mod visit;


pub use ast::{Expr, Function, OperatorKind, Prototype};
pub use error::{Diagnostic, Error, ErrorKind, Result};
pub use lexer::Lexer;
pub use listener::{Form, FormKind, Listener};
pub use parser::Parser;
pub use resolve::Resolver;
pub use scope::{ScopeGuard, ScopeStack};
pub use session::Session;
pub use token::Token;
pub use visit::{Visit, Visitor};

/// Parses every top-level form of `source`, handing each completed form to
/// `listener`. Returns the diagnostics of the forms that were skipped.
pub fn parse(source: &str, session: &mut Session, listener: &mut dyn Listener) -> Vec<Diagnostic> {
    let mut parser = Parser::new(source, session).with_listener(listener);
    parser.run();
    parser.into_diagnostics()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let mut session = Session::new();
        let mut forms: Vec<Form> = Vec::new();
        let diagnostics = parse("def binary| 5 (a b) a; 1 | 2; )", &mut session, &mut forms);
        assert_eq!(forms.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].kind,
            ErrorKind::UnknownToken("end of input".to_owned())
        );
    }
}
