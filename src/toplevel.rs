use super::error::Result;
use super::listener::{Form, FormKind};
use super::parser::Parser;
use super::token::Token;
use tracing::debug;

impl<'a, 'ctx> Parser<'a, 'ctx> {
    /// Parses top-level forms until end of input.
    ///
    /// top ::= definition | external | expression | ';'
    pub fn run(&mut self) {
        loop {
            match self.current() {
                Token::Eof => return,
                Token::Char(';') => self.bump(), // ignore top-level semicolons.
                Token::Def => self.handle_definition(),
                Token::Extern => self.handle_extern(),
                _ => self.handle_top_level_expression(),
            }
        }
    }

    pub fn handle_definition(&mut self) {
        self.events.enter_rule(FormKind::Definition);
        let result = self.parse_definition().map(Form::Definition);
        self.finish_rule(result);
    }

    pub fn handle_extern(&mut self) {
        self.events.enter_rule(FormKind::Extern);
        let result = self.parse_extern().map(Form::Extern);
        self.finish_rule(result);
    }

    pub fn handle_top_level_expression(&mut self) {
        self.events.enter_rule(FormKind::TopLevelExpression);
        let result = self
            .parse_top_level_expr()
            .map(Form::TopLevelExpression);
        self.finish_rule(result);
    }

    fn finish_rule(&mut self, result: Result<Form>) {
        match result {
            Ok(form) => {
                debug!(kind = ?form.kind(), "parsed top-level form");
                match self.events.exit_rule(Some(form)) {
                    Ok(()) => self.events.listen(),
                    Err(e) => {
                        self.report(e);
                        self.bump();
                    }
                }
            }
            Err(e) => {
                self.report(e);
                if let Err(e) = self.events.exit_rule(None) {
                    self.report(e);
                }
                // Skip token for error recovery.
                self.bump();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::error::ErrorKind;
    use super::super::session::Session;
    use super::*;
    use combine::stream::position::SourcePosition;

    fn run(source: &str, session: &mut Session) -> (Vec<Form>, Vec<ErrorKind>) {
        let mut forms = Vec::new();
        let diagnostics = {
            let mut parser = Parser::new(source, session).with_listener(&mut forms);
            parser.run();
            parser.into_diagnostics()
        };
        (forms, diagnostics.into_iter().map(|d| d.kind).collect())
    }

    fn render(forms: &[Form]) -> Vec<String> {
        forms
            .iter()
            .map(|form| match form {
                Form::Definition(f) => f.to_string(),
                Form::Extern(p) => format!("(extern {})", p),
                Form::TopLevelExpression(f) => f.body.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_all_forms() {
        let mut session = Session::new();
        let (forms, errors) = run(
            r#"
# comment
extern sin(x);
def foo(a b) a * sin(b);
foo(1, 2);;
"#,
            &mut session,
        );
        assert!(errors.is_empty());
        assert_eq!(
            render(&forms),
            vec![
                "(extern (proto sin (x)))",
                "(def (proto foo (a b)) (* a (call sin b)))",
                "(call foo 1 2)",
            ]
        );
        assert_eq!(forms[0].kind(), FormKind::Extern);
        assert_eq!(forms[1].kind(), FormKind::Definition);
        assert_eq!(forms[2].kind(), FormKind::TopLevelExpression);
    }

    #[test]
    fn test_operator_declaration_applies_afterwards() {
        let mut session = Session::new();
        let (forms, errors) = run(
            "1 | 2; def binary| 5 (a b) if a then 1 else if b then 1 else 0; 1 | 2 + 3;",
            &mut session,
        );
        assert!(errors.is_empty());
        assert_eq!(
            render(&forms),
            vec![
                "1",
                "(| 2)",
                "(def (proto binary| 5 (a b)) (if a 1 (if b 1 0)))",
                "(| 1 (+ 2 3))",
            ]
        );
    }

    #[test]
    fn test_session_outlives_parser() {
        let mut session = Session::new();
        run("def binary: 1 (x y) y;", &mut session);
        assert_eq!(session.precedence_of(&Token::Char(':')), 1);
        let (forms, _) = run("a : b + c", &mut session);
        assert_eq!(render(&forms), vec!["(: a (+ b c))"]);
    }

    #[test]
    fn test_user_unary_operator() {
        let mut session = Session::new();
        let (forms, errors) = run("def unary!(v) if v then 0 else 1; !!5", &mut session);
        assert!(errors.is_empty());
        assert_eq!(render(&forms)[1], "(! (! 5))");
    }

    #[test]
    fn test_recovery_skips_one_token() {
        let mut session = Session::new();
        let mut forms = Vec::new();
        let mut parser = Parser::new("def foo( (", &mut session).with_listener(&mut forms);
        parser.run();
        assert_eq!(parser.current(), &Token::Eof);
        assert_eq!(parser.diagnostics().len(), 1);
        assert_eq!(
            parser.diagnostics()[0].position,
            SourcePosition { line: 1, column: 10 }
        );
        drop(parser);
        assert!(forms.is_empty());
    }

    #[test]
    fn test_valid_input_after_recovery() {
        let mut session = Session::new();
        let (forms, errors) = run("def foo( ( def bar(x) x + 1", &mut session);
        assert_eq!(errors.len(), 1);
        assert_eq!(render(&forms), vec!["(def (proto bar (x)) (+ x 1))"]);
    }

    #[test]
    fn test_failed_definition_declares_nothing() {
        let mut session = Session::new();
        let (forms, errors) = run("def binary| 5 (a b) if a then b; 1 | 2", &mut session);
        assert_eq!(
            errors,
            vec![ErrorKind::Expected {
                expected: "'else'",
                found: "';'".to_owned()
            }]
        );
        assert!(!session.is_declared('|'));
        assert_eq!(render(&forms), vec!["1", "(| 2)"]);
    }

    #[test]
    fn test_malformed_number_is_reported() {
        let mut session = Session::new();
        let (forms, errors) = run("1.2.3; 4", &mut session);
        assert_eq!(errors, vec![ErrorKind::MalformedNumber("1.2.3".to_owned())]);
        assert_eq!(render(&forms), vec!["4"]);
    }

    #[test]
    fn test_deep_nesting_is_recoverable() {
        let mut session = Session::new();
        let source = format!("{}5; 1 + 2", "!".repeat(5_000));
        let (forms, errors) = run(&source, &mut session);
        assert!(!errors.is_empty());
        assert!(errors
            .iter()
            .all(|e| *e == ErrorKind::NestingTooDeep(super::super::parser::MAX_NESTING_DEPTH)));
        assert_eq!(forms.len(), 2);
        assert_eq!(render(&forms)[1], "(+ 1 2)");
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let source = "def binary% 35 (a b) a - b; extern cos(x); var y = 2 in for i = 0, 5, y in cos(i) % 2";
        let (first, _) = run(source, &mut Session::new());
        let (second, _) = run(source, &mut Session::new());
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }
}
