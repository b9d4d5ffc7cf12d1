use super::ast::{
    binary_function_name, unary_function_name, Call, Expr, For, Function, If, OperatorKind,
    Prototype, VarBinding, Variable, ANONYMOUS_FUNCTION_NAME,
};
use super::error::{Diagnostic, Error, ErrorKind, Result};
use super::lexer::Lexer;
use super::listener::{Listener, ParseEvents};
use super::session::{Session, DEFAULT_BINARY_PRECEDENCE, MAX_PRECEDENCE, MIN_PRECEDENCE};
use super::token::Token;
use tracing::warn;

/// Deepest chain of prefix operators and nested sub-expressions accepted
/// before the parser gives up on an expression.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Recursive-descent parser with precedence climbing over a mutable
/// operator table.
///
/// Every `parse_*` entry point expects the look-ahead token to be the first
/// token of its construct and leaves the first token after it.
pub struct Parser<'a, 'ctx> {
    pub(crate) lexer: Lexer<'a>,
    pub(crate) session: &'ctx mut Session,
    pub(crate) events: ParseEvents<'ctx>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    nesting: usize,
}

impl<'a, 'ctx> Parser<'a, 'ctx> {
    /// Creates a parser and reads the first token.
    pub fn new(source: &'a str, session: &'ctx mut Session) -> Self {
        let mut parser = Parser {
            lexer: Lexer::new(source),
            session,
            events: ParseEvents::new(None),
            diagnostics: Vec::new(),
            nesting: 0,
        };
        parser.bump();
        parser
    }

    pub fn with_listener(mut self, listener: &'ctx mut dyn Listener) -> Self {
        self.events.set_listener(listener);
        self
    }

    pub fn current(&self) -> &Token {
        self.lexer.current()
    }

    pub fn session(&self) -> &Session {
        &*self.session
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn advance(&mut self) -> Result<()> {
        self.lexer.next().map(|_| ())
    }

    /// Advances, reporting and stepping over malformed lexemes.
    pub(crate) fn bump(&mut self) {
        loop {
            let result = self.lexer.next().map(|_| ());
            match result {
                Ok(()) => return,
                Err(e) => self.report(e),
            }
        }
    }

    pub(crate) fn report(&mut self, e: Error) {
        let diagnostic = Diagnostic::new(e.kind().clone(), self.lexer.position());
        warn!(
            line = diagnostic.position.line,
            column = diagnostic.position.column,
            "{}",
            diagnostic.kind
        );
        self.diagnostics.push(diagnostic);
    }

    fn unexpected(&self, expected: &'static str) -> Error {
        ErrorKind::Expected {
            expected,
            found: self.current().to_string(),
        }
        .into()
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<()> {
        if self.current() != token {
            return Err(self.unexpected(expected));
        }
        self.advance()
    }

    fn expect_char(&mut self, c: char, expected: &'static str) -> Result<()> {
        if !self.current().is_char(c) {
            return Err(self.unexpected(expected));
        }
        self.advance()
    }

    fn ident(&mut self, expected: &'static str) -> Result<String> {
        let name = match self.current() {
            Token::Ident(name) => name.clone(),
            _ => return Err(self.unexpected(expected)),
        };
        self.advance()?;
        Ok(name)
    }

    fn operator_char(&mut self, expected: &'static str) -> Result<char> {
        let op = match self.current() {
            Token::Char(c) if c.is_ascii() => *c,
            _ => return Err(self.unexpected(expected)),
        };
        self.advance()?;
        Ok(op)
    }

    // identifierexpr
    //   ::= identifier
    //   ::= identifier '(' expression (',' expression)* ')'
    fn parse_identifier_expr(&mut self, name: String) -> Result<Expr> {
        self.advance()?; // eat identifier

        if !self.current().is_char('(') {
            return Ok(Expr::Variable(Variable { name }));
        }

        self.advance()?; // eat (
        let mut args = Vec::new();
        if !self.current().is_char(')') {
            loop {
                args.push(self.parse_expression()?);

                if self.current().is_char(')') {
                    break;
                }
                if !self.current().is_char(',') {
                    return Err(self.unexpected("')' or ',' in argument list"));
                }
                self.advance()?;
            }
        }
        self.advance()?; // eat )

        Ok(Expr::Call(Call { callee: name, args }))
    }

    // parenexpr ::= '(' expression ')'
    fn parse_paren_expr(&mut self) -> Result<Expr> {
        self.advance()?; // eat (
        let e = self.parse_expression()?;
        self.expect_char(')', "')'")?;
        Ok(e)
    }

    pub fn parse_primary(&mut self) -> Result<Expr> {
        match self.current() {
            Token::Ident(name) => {
                let name = name.clone();
                self.parse_identifier_expr(name)
            }
            Token::Number(value) => {
                let value = *value;
                self.advance()?;
                Ok(Expr::number(value))
            }
            Token::Char('(') => self.parse_paren_expr(),
            Token::If => self.parse_if(),
            Token::For => self.parse_for(),
            Token::Var => self.parse_var(),
            other => Err(ErrorKind::UnknownToken(other.to_string()).into()),
        }
    }

    /// Any single ASCII character other than `(` and `,` is taken as a prefix
    /// operator; whether it is actually declared is left to the consumer.
    pub fn parse_unary(&mut self) -> Result<Expr> {
        // Every nested expression passes through here.
        if self.nesting >= MAX_NESTING_DEPTH {
            return Err(ErrorKind::NestingTooDeep(MAX_NESTING_DEPTH).into());
        }
        self.nesting += 1;
        let result = self.parse_prefix();
        self.nesting -= 1;
        result
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        let op = match self.current() {
            Token::Char(c) if c.is_ascii() && *c != '(' && *c != ',' => *c,
            _ => return self.parse_primary(),
        };
        self.advance()?;
        let operand = self.parse_unary()?;
        Ok(Expr::unary(op, operand))
    }

    pub fn parse_bin_op_rhs(&mut self, min_precedence: i32, mut lhs: Expr) -> Result<Expr> {
        loop {
            let precedence = self.session.precedence_of(self.current());

            // Binds less tightly than the caller's operator: leave it there.
            if precedence < min_precedence {
                return Ok(lhs);
            }

            let op = match self.current() {
                Token::Char(c) => *c,
                other => {
                    return Err(ErrorKind::Internal(format!(
                        "{} has precedence {} but is not an operator",
                        other, precedence
                    ))
                    .into())
                }
            };
            self.advance()?; // eat binop

            let mut rhs = self.parse_unary()?;

            // A tighter operator after rhs takes rhs as its lhs.
            let next_precedence = self.session.precedence_of(self.current());
            if precedence < next_precedence {
                rhs = self.parse_bin_op_rhs(precedence + 1, rhs)?;
            }

            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    pub fn parse_expression(&mut self) -> Result<Expr> {
        let lhs = self.parse_unary()?;
        self.parse_bin_op_rhs(0, lhs)
    }

    // ifexpr ::= 'if' expression 'then' expression 'else' expression
    pub fn parse_if(&mut self) -> Result<Expr> {
        self.advance()?; // eat if

        let cond = self.parse_expression()?;
        self.expect(&Token::Then, "'then'")?;
        let then = self.parse_expression()?;
        self.expect(&Token::Else, "'else'")?;
        let otherwise = self.parse_expression()?;

        Ok(Expr::If(If {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }))
    }

    // forexpr ::= 'for' identifier '=' expr ',' expr (',' expr)? 'in' expression
    pub fn parse_for(&mut self) -> Result<Expr> {
        self.advance()?; // eat for

        let var = self.ident("identifier after 'for'")?;
        self.expect_char('=', "'=' after for variable")?;
        let start = self.parse_expression()?;
        self.expect_char(',', "',' after for start value")?;
        let end = self.parse_expression()?;

        let step = if self.current().is_char(',') {
            self.advance()?;
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        self.expect(&Token::In, "'in' after for")?;
        let body = self.parse_expression()?;

        Ok(Expr::For(For {
            var,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
        }))
    }

    // varexpr ::= 'var' identifier ('=' expression)?
    //                   (',' identifier ('=' expression)?)* 'in' expression
    pub fn parse_var(&mut self) -> Result<Expr> {
        self.advance()?; // eat var

        let mut bindings = Vec::new();
        loop {
            let name = self.ident("identifier after 'var'")?;
            let init = if self.current().is_char('=') {
                self.advance()?;
                Some(self.parse_expression()?)
            } else {
                None
            };
            bindings.push((name, init));

            if !self.current().is_char(',') {
                break;
            }
            self.advance()?;
        }

        self.expect(&Token::In, "'in' after 'var'")?;
        let body = self.parse_expression()?;

        Ok(Expr::Var(VarBinding {
            bindings,
            body: Box::new(body),
        }))
    }

    // prototype
    //   ::= identifier '(' identifier* ')'
    //   ::= 'unary' LETTER '(' identifier ')'
    //   ::= 'binary' LETTER number? '(' identifier identifier ')'
    pub fn parse_prototype(&mut self) -> Result<Prototype> {
        let (name, kind, precedence) = match self.current() {
            Token::Ident(name) => {
                let name = name.clone();
                self.advance()?;
                (name, OperatorKind::None, DEFAULT_BINARY_PRECEDENCE)
            }
            Token::Unary => {
                self.advance()?;
                let op = self.operator_char("unary operator")?;
                (
                    unary_function_name(op),
                    OperatorKind::Prefix,
                    DEFAULT_BINARY_PRECEDENCE,
                )
            }
            Token::Binary => {
                self.advance()?;
                let op = self.operator_char("binary operator")?;
                let mut precedence = DEFAULT_BINARY_PRECEDENCE;
                if let Token::Number(n) = self.current() {
                    let n = *n;
                    if n < f64::from(MIN_PRECEDENCE) || n > f64::from(MAX_PRECEDENCE) {
                        return Err(ErrorKind::InvalidPrecedence(n).into());
                    }
                    precedence = n as i32;
                    self.advance()?;
                }
                (binary_function_name(op), OperatorKind::Infix, precedence)
            }
            _ => return Err(self.unexpected("function name in prototype")),
        };

        self.expect_char('(', "'(' in prototype")?;

        let mut params: Vec<String> = Vec::new();
        while let Token::Ident(param) = self.current() {
            let param = param.clone();
            if params.contains(&param) {
                return Err(ErrorKind::DuplicateParameter { name, param }.into());
            }
            params.push(param);
            self.advance()?;
        }

        self.expect_char(')', "')' in prototype")?;

        let proto = Prototype {
            name,
            params,
            kind,
            precedence,
        };

        if let Some(expected) = proto.operand_count() {
            if proto.params.len() != expected {
                return Err(ErrorKind::OperatorArity {
                    name: proto.name,
                    expected,
                    found: proto.params.len(),
                }
                .into());
            }
        }

        Ok(proto)
    }

    fn declare(&mut self, proto: &Prototype) {
        if !proto.is_binary_op() {
            return;
        }
        if let Some(op) = proto.operator_name() {
            self.session.declare_operator(op, proto.precedence);
        }
    }

    // definition ::= 'def' prototype expression
    pub fn parse_definition(&mut self) -> Result<Function> {
        self.advance()?; // eat def
        let proto = self.parse_prototype()?;
        let body = self.parse_expression()?;
        self.declare(&proto);
        Ok(Function { proto, body })
    }

    // external ::= 'extern' prototype
    pub fn parse_extern(&mut self) -> Result<Prototype> {
        self.advance()?; // eat extern
        let proto = self.parse_prototype()?;
        self.declare(&proto);
        Ok(proto)
    }

    // toplevelexpr ::= expression
    pub fn parse_top_level_expr(&mut self) -> Result<Function> {
        let body = self.parse_expression()?;
        let proto = Prototype::new(ANONYMOUS_FUNCTION_NAME.to_owned(), Vec::new());
        Ok(Function { proto, body })
    }
}
