#[cfg(test)]
mod scanner_tests {
    use pretty_assertions::assert_eq;
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.kind, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
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
    fn test_scanner_ternary_and_two_char_operators() {
        assert_token_sequence(
            "a >= 1 ? b != c : d == e;",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::NUMBER, "1"),
                (TokenType::QUESTION, "?"),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::IDENTIFIER, "c"),
                (TokenType::COLON, ":"),
                (TokenType::IDENTIFIER, "d"),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::IDENTIFIER, "e"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_keywords_and_comments() {
        assert_token_sequence(
            "class Foo { // trailing comment\n init() { return this; } }",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "Foo"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::IDENTIFIER, "init"),
                (TokenType::LEFT_PAREN, "("),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::RETURN, "return"),
                (TokenType::THIS, "this"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_literals_carry_values_and_lines() {
        let (tokens, errors) = Scanner::new("12.5 \"multi\nline\" true\nnil").scan_all();

        assert!(errors.is_empty());
        assert_eq!(tokens[0].literal, Some(Literal::Number(12.5)));
        assert_eq!(
            tokens[1].literal,
            Some(Literal::Str("multi\nline".to_string()))
        );
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].literal, Some(Literal::Bool(true)));
        assert_eq!(tokens[3].kind, TokenType::NIL);
        assert_eq!(tokens[3].line, 3);
        assert_eq!(tokens[4].kind, TokenType::EOF);
    }

    #[test]
    fn test_token_display() {
        let (tokens, _) = Scanner::new("var x = 3; \"hi\" 2.25").scan_all();
        let rendered: Vec<String> = tokens.iter().map(ToString::to_string).collect();

        assert_eq!(
            rendered,
            vec![
                "VAR var null",
                "IDENTIFIER x null",
                "EQUAL = null",
                "NUMBER 3 3.0",
                "SEMICOLON ; null",
                "STRING \"hi\" hi",
                "NUMBER 2.25 2.25",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = Scanner::new("\"open").scan_all();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error: Unterminated string."
        );
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenType::EOF));
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#é";
        let results: Vec<_> = Scanner::new(source).collect();

        // COMMA, DOT, error '$', LEFT_PAREN, error '#', error 'é', EOF
        assert_eq!(results.len(), 7, "Expected 7 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[6], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: $",
                "[line 1] Error: Unexpected character: #",
                "[line 1] Error: Unexpected character: é",
            ]
        );

        fn assert_token_matches(
            result: &rox::error::Result<Token>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(token.kind, expected_type);
                    assert_eq!(token.lexeme, expected_lexeme);
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }
}
