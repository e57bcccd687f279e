use treelox::scanner::Scanner;
use treelox::token::{Token, TokenType};

fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
    let scanner = Scanner::new(source.as_bytes());
    let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

    assert_eq!(tokens.len(), expected.len());

    for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
        assert_eq!(actual.token_type, *expected_type);
        assert_eq!(actual.lexeme, *expected_lexeme);
    }
}

#[test]
fn symbols() {
    assert_token_sequence(
        "({*.,+*})",
        &[
            (TokenType::LEFT_PAREN, "("),
            (TokenType::LEFT_BRACE, "{"),
            (TokenType::STAR, "*"),
            (TokenType::DOT, "."),
            (TokenType::COMMA, ","),
            (TokenType::PLUS, "+"),
            (TokenType::STAR, "*"),
            (TokenType::RIGHT_BRACE, "}"),
            (TokenType::RIGHT_PAREN, ")"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn two_character_operators_win_over_prefixes() {
    assert_token_sequence(
        "! != = == > >= < <=",
        &[
            (TokenType::BANG, "!"),
            (TokenType::BANG_EQUAL, "!="),
            (TokenType::EQUAL, "="),
            (TokenType::EQUAL_EQUAL, "=="),
            (TokenType::GREATER, ">"),
            (TokenType::GREATER_EQUAL, ">="),
            (TokenType::LESS, "<"),
            (TokenType::LESS_EQUAL, "<="),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn keywords_and_identifiers() {
    assert_token_sequence(
        "class classy _fun fun returner return",
        &[
            (TokenType::CLASS, "class"),
            (TokenType::IDENTIFIER, "classy"),
            (TokenType::IDENTIFIER, "_fun"),
            (TokenType::FUN, "fun"),
            (TokenType::IDENTIFIER, "returner"),
            (TokenType::RETURN, "return"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn number_literals() {
    let scanner = Scanner::new(b"12 3.5 0.25");
    let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

    let values: Vec<f64> = tokens
        .iter()
        .filter_map(|t| match t.token_type {
            TokenType::NUMBER(n) => Some(n),
            _ => None,
        })
        .collect();

    assert_eq!(values, vec![12.0, 3.5, 0.25]);
}

#[test]
fn trailing_dot_stays_outside_the_number() {
    assert_token_sequence(
        "123.",
        &[
            (TokenType::NUMBER(123.0), "123"),
            (TokenType::DOT, "."),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn string_literals_have_no_escape_processing() {
    let scanner = Scanner::new(br#""he\llo""#);
    let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

    match &tokens[0].token_type {
        TokenType::STRING(s) => assert_eq!(s, r"he\llo"),
        other => panic!("expected string token, got {:?}", other),
    }
}

#[test]
fn multiline_string_counts_lines() {
    let scanner = Scanner::new(b"\"a\nb\"\nx");
    let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

    // The embedded newline advances the counter, so the identifier after the
    // string lands on line 3.
    assert_eq!(tokens[1].lexeme, "x");
    assert_eq!(tokens[1].line, 3);
}

#[test]
fn unterminated_string_reports_at_starting_line() {
    let scanner = Scanner::new(b"\n\"oops");
    let results: Vec<_> = scanner.collect();

    let errors: Vec<String> = results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .map(|e| e.to_string())
        .collect();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0], "[line 2] Error: Unterminated string.");
}

#[test]
fn comments_and_whitespace_produce_no_tokens() {
    assert_token_sequence(
        "// full line\nvar x; // trailing\n",
        &[
            (TokenType::VAR, "var"),
            (TokenType::IDENTIFIER, "x"),
            (TokenType::SEMICOLON, ";"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn scanning_continues_past_unexpected_characters() {
    let scanner = Scanner::new(b",.$(#");
    let results: Vec<_> = scanner.collect();

    // 3 tokens, 2 errors, then EOF.
    assert_eq!(results.len(), 6);

    let error_count = results.iter().filter(|r| r.is_err()).count();
    assert_eq!(error_count, 2);

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.to_string(), "[line 1] Error: Unexpected character.");
    }

    let lexemes: Vec<&str> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|t| t.lexeme.as_str())
        .collect();
    assert_eq!(lexemes, vec![",", ".", "(", ""]);
}

#[test]
fn lexemes_round_trip_the_source_modulo_trivia() {
    let source = "fun add(a, b) { // sum\n  return a + b;\n}";

    let stripped: String = source
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .replace("//sum", "");

    let rejoined: String = Scanner::new(source.as_bytes())
        .filter_map(Result::ok)
        .map(|t| t.lexeme)
        .collect();

    assert_eq!(rejoined, stripped);
}

#[test]
fn eof_carries_the_final_line() {
    let scanner = Scanner::new(b"1;\n2;\n");
    let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

    let eof = tokens.last().expect("scanner always yields EOF");
    assert_eq!(eof.token_type, TokenType::EOF);
    assert_eq!(eof.line, 3);
}
