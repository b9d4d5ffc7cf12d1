use super::error::{Error, ErrorKind, Result};
use super::token::Token;
use combine::error::ParseError;
use combine::parser::char::{alpha_num, digit, letter, space};
use combine::parser::choice::or;
use combine::stream::easy;
use combine::stream::position::{self, SourcePosition};
use combine::stream::{Positioned, Stream};
use combine::{any, choice, eof, many, many1, satisfy, skip_many, token, EasyParser, Parser};

type Source<'a> = position::Stream<&'a str, SourcePosition>;

enum Lexeme {
    Word(String),
    Number(String),
    Char(char),
    Eof,
}

fn number<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    many1(choice((digit(), token('.'))))
}

fn word<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (letter(), many::<String, _, _>(alpha_num())).map(|(first, rest)| {
        let mut word = String::with_capacity(rest.len() + 1);
        word.push(first);
        word.push_str(&rest);
        word
    })
}

fn comment<Input>() -> impl Parser<Input, Output = ()>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (token('#'), skip_many(satisfy(|c| c != '\n' && c != '\r'))).map(|_| ())
}

fn trivia<Input>() -> impl Parser<Input, Output = ()>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    skip_many(or(space().map(|_| ()), comment()))
}

fn lexeme<Input>() -> impl Parser<Input, Output = Lexeme>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    choice((
        word().map(Lexeme::Word),
        number().map(Lexeme::Number),
        eof().map(|_| Lexeme::Eof),
        any().map(Lexeme::Char),
    ))
}

fn stream_failure(e: easy::Errors<char, &str, SourcePosition>) -> Error {
    Error::from(ErrorKind::Internal(format!(
        "lexer stalled at line {}, column {}",
        e.position.line, e.position.column
    )))
}

/// Pull-based tokenizer holding exactly one token of look-ahead.
///
/// `current` is `Eof` until the first call to `next`.
pub struct Lexer<'a> {
    input: Source<'a>,
    current: Token,
    position: SourcePosition,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let input = position::Stream::new(source);
        let position = input.position();
        Lexer {
            input,
            current: Token::Eof,
            position,
        }
    }

    /// Reads the next token into the look-ahead slot.
    ///
    /// A malformed number literal is consumed and reported as an error; the
    /// look-ahead slot keeps its previous token in that case.
    pub fn next(&mut self) -> Result<&Token> {
        let ((), rest) = trivia()
            .easy_parse(self.input.clone())
            .map_err(stream_failure)?;
        self.input = rest;
        self.position = self.input.position();

        let (lexeme, rest) = lexeme()
            .easy_parse(self.input.clone())
            .map_err(stream_failure)?;
        self.input = rest;

        self.current = match lexeme {
            Lexeme::Word(word) => Token::keyword(&word).unwrap_or_else(|| Token::Ident(word)),
            Lexeme::Number(text) => match text.parse::<f64>() {
                Ok(n) => Token::Number(n),
                Err(_) => return Err(ErrorKind::MalformedNumber(text).into()),
            },
            Lexeme::Char(c) => Token::Char(c),
            Lexeme::Eof => Token::Eof,
        };
        Ok(&self.current)
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Start of the current token.
    pub fn position(&self) -> SourcePosition {
        self.position
    }
}

#[cfg(test)]
mod test {
    use super::super::token::Token::*;
    use super::*;
    use rstest::rstest;

    fn lex_tokens(s: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(s);
        let mut tokens = Vec::new();
        loop {
            match lexer.next() {
                Ok(Eof) => break,
                Ok(token) => tokens.push(token.clone()),
                Err(e) => panic!("error: {}", e),
            }
        }
        tokens
    }

    #[rstest]
    #[case("def", Def)]
    #[case("extern", Extern)]
    #[case("if", If)]
    #[case("then", Then)]
    #[case("else", Else)]
    #[case("for", For)]
    #[case("in", In)]
    #[case("var", Var)]
    #[case("unary", Unary)]
    #[case("binary", Binary)]
    #[case("define", Ident("define".to_owned()))]
    #[case("x1y2", Ident("x1y2".to_owned()))]
    fn test_word(#[case] source: &str, #[case] expected: Token) {
        assert_eq!(lex_tokens(source), vec![expected]);
    }

    #[rstest]
    #[case("1.0", 1.0)]
    #[case("42", 42.0)]
    #[case(".5", 0.5)]
    #[case("3.", 3.0)]
    fn test_number(#[case] source: &str, #[case] expected: f64) {
        assert_eq!(lex_tokens(source), vec![Number(expected)]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            lex_tokens("a+b*(c<d)|!e;"),
            vec![
                Ident("a".to_owned()),
                Char('+'),
                Ident("b".to_owned()),
                Char('*'),
                Char('('),
                Ident("c".to_owned()),
                Char('<'),
                Ident("d".to_owned()),
                Char(')'),
                Char('|'),
                Char('!'),
                Ident("e".to_owned()),
                Char(';'),
            ]
        );
    }

    #[test]
    fn test_identifier_stops_at_operator() {
        assert_eq!(
            lex_tokens("binary|"),
            vec![Binary, Char('|')]
        );
    }

    #[test]
    fn test_comment() {
        assert_eq!(
            lex_tokens(
                r#"#comment
1.0 # trailing
# last line without newline"#
            ),
            vec![Number(1.0)]
        );
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("  ");
        assert_eq!(lexer.next().unwrap(), &Eof);
        assert_eq!(lexer.next().unwrap(), &Eof);
        assert_eq!(lexer.current(), &Eof);
    }

    #[test]
    fn test_malformed_number() {
        let mut lexer = Lexer::new("def 1.2.3 foo");
        assert_eq!(lexer.next().unwrap(), &Def);
        let err = lexer.next().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedNumber("1.2.3".to_owned()));
        assert_eq!(lexer.current(), &Def);
        assert_eq!(lexer.next().unwrap(), &Ident("foo".to_owned()));
    }

    #[test]
    fn test_position() {
        let mut lexer = Lexer::new("def\n  foo # c\n\tbar");
        lexer.next().unwrap();
        assert_eq!(lexer.position(), SourcePosition { line: 1, column: 1 });
        lexer.next().unwrap();
        assert_eq!(lexer.position(), SourcePosition { line: 2, column: 3 });
        lexer.next().unwrap();
        assert_eq!(lexer.current(), &Ident("bar".to_owned()));
        assert_eq!(lexer.position().line, 3);
    }
}
