use chumsky::{prelude::*, text};

use crate::diagnostic::{Diagnostic, Label, Span};
use crate::token::Token;

pub fn lexer<'a>()
-> impl Parser<'a, &'a str, Vec<(Token, SimpleSpan)>, extra::Err<Simple<'a, char>>> {
    let number = text::int(10)
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .map(|s: &str| Token::Number(s.parse().unwrap()));

    let escape = just('\\').ignore_then(choice((
        just('\\'),
        just('/'),
        just('"'),
        just('n').to('\n'),
        just('r').to('\r'),
        just('t').to('\t'),
    )));

    let string = just('"')
        .ignore_then(
            none_of("\\\"")
                .or(escape)
                .repeated()
                .collect::<String>(),
        )
        .then_ignore(just('"'))
        .map(Token::String);

    let ident = text::ident().map(|s: &str| match s {
        "and" => Token::And,
        "class" => Token::Class,
        "else" => Token::Else,
        "false" => Token::False,
        "for" => Token::For,
        "fun" => Token::Fun,
        "if" => Token::If,
        "nil" => Token::Nil,
        "or" => Token::Or,
        "print" => Token::Print,
        "return" => Token::Return,
        "true" => Token::True,
        "var" => Token::Var,
        "while" => Token::While,
        _ => Token::Ident(s.to_string()),
    });

    let multi_char_operators = choice((
        just("==").to(Token::Eq),
        just("!=").to(Token::NotEq),
        just(">=").to(Token::GreaterEq),
        just("<=").to(Token::LessEq),
    ));

    let single_char_operators = choice((
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('*').to(Token::Star),
        just('/').to(Token::Slash),
        just('>').to(Token::Greater),
        just('<').to(Token::Less),
        just('!').to(Token::Bang),
        just('=').to(Token::Assign),
        just('?').to(Token::Question),
        just(':').to(Token::Colon),
        just(',').to(Token::Comma),
        just(';').to(Token::Semicolon),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('{').to(Token::LBrace),
        just('}').to(Token::RBrace),
    ));

    let operators = multi_char_operators.or(single_char_operators);

    let line_comment = just('/')
        .then(just('/'))
        .ignore_then(any().and_is(just('\n').not()).repeated())
        .then_ignore(just('\n').or_not())
        .ignored();

    let multi_line_comment = just('/')
        .then(just('*'))
        .ignore_then(any().and_is(just('*').then(just('/')).not()).repeated())
        .then_ignore(just('*'))
        .then_ignore(just('/'))
        .ignored();

    let comment = line_comment.or(multi_line_comment);

    let token = choice((number, string, ident, operators))
        .map_with(|tok, e| (tok, e.span()))
        .padded_by(
            choice((comment, any().filter(|c: &char| c.is_whitespace()).ignored())).repeated(),
        );

    choice((comment, any().filter(|c: &char| c.is_whitespace()).ignored()))
        .repeated()
        .ignore_then(token.repeated().collect())
        .then_ignore(end())
}

/// Tokenizes a whole source text. The returned stream always ends with a
/// single `Eof` token, which is what the parser's contract expects.
pub fn scan(source: &str) -> Result<Vec<(Token, Span)>, Vec<Diagnostic>> {
    match lexer().parse(source).into_result() {
        Ok(tokens) => {
            let mut scanned: Vec<(Token, Span)> = tokens
                .into_iter()
                .map(|(tok, span)| (tok, Span::new(span.start, span.end)))
                .collect();
            scanned.push((Token::Eof, Span::new(source.len(), source.len())));
            Ok(scanned)
        }
        Err(errors) => Err(errors
            .into_iter()
            .map(|e| {
                let span = e.span();
                Diagnostic::error("Unexpected character.")
                    .with_code("E0001")
                    .with_label(Label::primary(
                        Span::new(span.start, span.end),
                        "could not scan this input",
                    ))
            })
            .collect()),
    }
}
