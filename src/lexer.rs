use crate::token::{Token, TokenKind};

/// Pull-style scanner over a source string.
///
/// The lexer is total: stray bytes and unterminated strings surface as
/// `TokenKind::Unknown` tokens for the parser to report, never as errors.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
        }
    }

    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_trivia();

        let line = self.line;
        let Some(ch) = self.peek_char() else {
            return Token::new(TokenKind::Eof, line);
        };

        if ch.is_ascii_alphabetic() || ch == '_' {
            return self.read_identifier();
        }
        if ch.is_ascii_digit() {
            return self.read_number();
        }
        if ch == '"' {
            return self.read_string();
        }

        let start = self.pos;
        self.consume_char();
        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => {
                if self.match_char('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.match_char('=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.match_char('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.match_char('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                }
            }
            _ => TokenKind::Unknown(&self.source[start..self.pos]),
        };
        Token::new(kind, line)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(' ') | Some('\t') | Some('\r') => {
                    self.consume_char();
                }
                Some('\n') => {
                    self.consume_char();
                    self.line += 1;
                }
                Some('/') if self.peek_next_char() == Some('/') => {
                    // Line comment runs up to, but not including, the newline.
                    self.consume_while(|c| c != '\n');
                }
                _ => break,
            }
        }
    }

    fn read_identifier(&mut self) -> Token<'a> {
        let start = self.pos;
        let line = self.line;
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let text = &self.source[start..self.pos];

        let kind = match text {
            "class" => TokenKind::Class,
            "fn" => TokenKind::Fn,
            "let" => TokenKind::Let,
            "virtual" => TokenKind::Virtual,
            "override" => TokenKind::Override,
            "print" => TokenKind::Print,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            _ => TokenKind::Identifier(text),
        };
        Token::new(kind, line)
    }

    fn read_number(&mut self) -> Token<'a> {
        let start = self.pos;
        let line = self.line;
        self.consume_while(|c| c.is_ascii_digit());

        if self.peek_char() == Some('.')
            && self
                .peek_next_char()
                .is_some_and(|c| c.is_ascii_digit())
        {
            self.consume_char();
            self.consume_while(|c| c.is_ascii_digit());
        }

        Token::new(TokenKind::Number(&self.source[start..self.pos]), line)
    }

    fn read_string(&mut self) -> Token<'a> {
        let line = self.line;
        self.consume_char(); // opening quote
        let content_start = self.pos;

        loop {
            match self.peek_char() {
                Some('"') => {
                    let interior = &self.source[content_start..self.pos];
                    self.consume_char();
                    return Token::new(TokenKind::Str(interior), line);
                }
                Some('\n') => {
                    self.line += 1;
                    self.consume_char();
                }
                Some(_) => {
                    self.consume_char();
                }
                None => {
                    let interior = &self.source[content_start..];
                    return Token::new(TokenKind::Unknown(interior), line);
                }
            }
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.consume_char();
            true
        } else {
            false
        }
    }

    fn consume_while<P>(&mut self, keep_predicate: P)
    where
        P: Fn(char) -> bool,
    {
        while let Some(c) = self.peek_char() {
            if !keep_predicate(c) {
                break;
            }
            self.consume_char();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Token {
                kind: TokenKind::Eof,
                ..
            } => None,
            token => Some(token),
        }
    }
}

/// Collects every token up to and including the end-of-input sentinel.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = matches!(token.kind, TokenKind::Eof);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn kinds(source: &str) -> Vec<TokenKind<'_>> {
        tokenize(source).into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn scans_simple_program() {
        let input = indoc! {r#"
            let x = 1 + 2;
            print x;
        "#};
        let expected = vec![
            TokenKind::Let,
            TokenKind::Identifier("x"),
            TokenKind::Assign,
            TokenKind::Number("1"),
            TokenKind::Plus,
            TokenKind::Number("2"),
            TokenKind::Semicolon,
            TokenKind::Print,
            TokenKind::Identifier("x"),
            TokenKind::Semicolon,
            TokenKind::Eof,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn scans_keywords_and_identifiers() {
        let input = "class fn let virtual override print if else while classy";
        let expected = vec![
            TokenKind::Class,
            TokenKind::Fn,
            TokenKind::Let,
            TokenKind::Virtual,
            TokenKind::Override,
            TokenKind::Print,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Identifier("classy"),
            TokenKind::Eof,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn scans_one_and_two_character_operators() {
        let input = "= == ! != < <= > >=";
        let expected = vec![
            TokenKind::Assign,
            TokenKind::EqualEqual,
            TokenKind::Bang,
            TokenKind::BangEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Eof,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn scans_fractional_numbers() {
        assert_eq!(
            kinds("3.5 10 2."),
            vec![
                TokenKind::Number("3.5"),
                TokenKind::Number("10"),
                TokenKind::Number("2"),
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_lexeme_excludes_quotes() {
        let tokens = tokenize(r#"print "hi there";"#);
        assert_eq!(tokens[1].kind, TokenKind::Str("hi there"));
    }

    #[test]
    fn unterminated_string_becomes_unknown() {
        let tokens = tokenize(r#"let s = "abc"#);
        assert_eq!(tokens[3].kind, TokenKind::Unknown("abc"));
        assert_eq!(tokens[4].kind, TokenKind::Eof);
    }

    #[test]
    fn stray_byte_becomes_unknown() {
        let tokens = tokenize("let x @ 1;");
        assert_eq!(tokens[2].kind, TokenKind::Unknown("@"));
    }

    #[test]
    fn skips_line_comments() {
        let input = indoc! {r#"
            // leading comment
            print 1; // trailing comment
            print 2;
        "#};
        let expected = vec![
            TokenKind::Print,
            TokenKind::Number("1"),
            TokenKind::Semicolon,
            TokenKind::Print,
            TokenKind::Number("2"),
            TokenKind::Semicolon,
            TokenKind::Eof,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn tracks_lines_across_newlines_and_strings() {
        let input = "let a = 1;\nlet b = \"x\ny\";\nprint b;";
        let tokens = tokenize(input);
        // `let b` opens on line 2; the string spans into line 3.
        assert_eq!(tokens[5].line, 2);
        assert_eq!(tokens[8].kind, TokenKind::Str("x\ny"));
        assert_eq!(tokens[8].line, 2);
        let print_token = tokens
            .iter()
            .find(|token| token.kind == TokenKind::Print)
            .expect("print token");
        assert_eq!(print_token.line, 4);
    }

    #[test]
    fn empty_source_yields_only_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   \t\r\n// just a comment"), vec![TokenKind::Eof]);
    }
}
