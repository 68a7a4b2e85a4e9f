use crate::diagnostic::Diagnostic;
use crate::lexeme::Token;
use crate::span::{Span, Spanned};

/// Maximum value of a Jack integer constant.
const MAX_INT: u32 = 32767;

/// Tokenizer for Jack source text.
///
/// Comments and string literals are recognized in a single pass, so `//`
/// inside a string constant is literal text rather than a comment start.
pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> (Vec<Spanned<Token>>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.node == Token::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn next_token(&mut self) -> Spanned<Token> {
        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.source.len() {
                return self.make_token(Token::Eof, self.pos, self.pos);
            }

            let start = self.pos;
            let ch = self.source[self.pos];

            if ch == b'"' {
                return self.scan_string();
            }

            if Token::is_symbol_char(ch) {
                self.pos += 1;
                return self.make_token(Token::Sym(ch as char), start, self.pos);
            }

            if ch.is_ascii_digit() {
                return self.scan_number();
            }

            if is_ident_start(ch) {
                return self.scan_ident_or_keyword();
            }

            // Not part of any token class: record and skip.
            self.pos += 1;
            self.diagnostics.push(Diagnostic::error(
                format!("unexpected character '{}'", ch as char),
                Span::new(start as u32, self.pos as u32),
            ));
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }

            // Line comment: // ... EOL
            if self.pos + 1 < self.source.len()
                && self.source[self.pos] == b'/'
                && self.source[self.pos + 1] == b'/'
            {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            // Block comment: /* ... */, may span lines
            if self.pos + 1 < self.source.len()
                && self.source[self.pos] == b'/'
                && self.source[self.pos + 1] == b'*'
            {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos + 1 >= self.source.len() {
                        self.pos = self.source.len();
                        self.diagnostics.push(Diagnostic::error(
                            "unterminated block comment".to_string(),
                            Span::new(start as u32, start as u32 + 2),
                        ));
                        break;
                    }
                    if self.source[self.pos] == b'*' && self.source[self.pos + 1] == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }

            break;
        }
    }

    fn scan_string(&mut self) -> Spanned<Token> {
        let start = self.pos;
        self.pos += 1; // opening quote
        let content_start = self.pos;
        while self.pos < self.source.len() {
            match self.source[self.pos] {
                b'"' => {
                    let text = std::str::from_utf8(&self.source[content_start..self.pos])
                        .unwrap_or_default()
                        .to_string();
                    self.pos += 1; // closing quote
                    return self.make_token(Token::Str(text), start, self.pos);
                }
                b'\n' => break,
                _ => self.pos += 1,
            }
        }
        self.diagnostics.push(Diagnostic::error(
            "unterminated string constant".to_string(),
            Span::new(start as u32, self.pos as u32),
        ));
        let text = std::str::from_utf8(&self.source[content_start..self.pos])
            .unwrap_or_default()
            .to_string();
        self.make_token(Token::Str(text), start, self.pos)
    }

    fn scan_number(&mut self) -> Spanned<Token> {
        let start = self.pos;
        let mut value: u32 = 0;
        while self.pos < self.source.len() && self.source[self.pos].is_ascii_digit() {
            value = value
                .saturating_mul(10)
                .saturating_add((self.source[self.pos] - b'0') as u32);
            self.pos += 1;
        }
        if value > MAX_INT {
            self.diagnostics.push(Diagnostic::error(
                format!("integer constant {} out of range (maximum {})", value, MAX_INT),
                Span::new(start as u32, self.pos as u32),
            ));
            value = MAX_INT;
        }
        self.make_token(Token::Int(value as u16), start, self.pos)
    }

    fn scan_ident_or_keyword(&mut self) -> Spanned<Token> {
        let start = self.pos;
        while self.pos < self.source.len() && is_ident_continue(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        let token = Token::from_keyword(text).unwrap_or_else(|| Token::Ident(text.to_string()));
        self.make_token(token, start, self.pos)
    }

    fn make_token(&self, token: Token, start: usize, end: usize) -> Spanned<Token> {
        Spanned::new(token, Span::new(start as u32, end as u32))
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexeme::Keyword;

    fn lex(source: &str) -> Vec<Token> {
        let (tokens, diags) = Lexer::new(source).tokenize();
        assert!(diags.is_empty(), "unexpected errors: {:?}", diags);
        tokens.into_iter().map(|t| t.node).collect()
    }

    #[test]
    fn test_keywords_and_idents() {
        let tokens = lex("class Main field int x");
        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Class),
                Token::Ident("Main".to_string()),
                Token::Keyword(Keyword::Field),
                Token::Keyword(Keyword::Int),
                Token::Ident("x".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_symbols_and_ints() {
        let tokens = lex("let x = a[3] + 42;");
        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Let),
                Token::Ident("x".to_string()),
                Token::Sym('='),
                Token::Ident("a".to_string()),
                Token::Sym('['),
                Token::Int(3),
                Token::Sym(']'),
                Token::Sym('+'),
                Token::Int(42),
                Token::Sym(';'),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_constant() {
        let tokens = lex("do Output.printString(\"Hello, world\");");
        assert!(tokens.contains(&Token::Str("Hello, world".to_string())));
    }

    #[test]
    fn test_comment_marker_inside_string() {
        // A line-oriented comment stripper would corrupt this; the
        // single-pass scanner keeps the slashes.
        let tokens = lex("let url = \"http://example.com\";");
        assert!(tokens.contains(&Token::Str("http://example.com".to_string())));
    }

    #[test]
    fn test_line_comment() {
        let tokens = lex("let x = 1; // set x\nlet y = 2;");
        assert_eq!(tokens.iter().filter(|t| matches!(t, Token::Int(_))).count(), 2);
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let tokens = lex("let /* a\n   multi-line\n   comment */ x = 1;");
        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Let),
                Token::Ident("x".to_string()),
                Token::Sym('='),
                Token::Int(1),
                Token::Sym(';'),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_doc_comment() {
        // /** ... */ is an ordinary block comment
        let tokens = lex("/** API doc */ class Main {}");
        assert_eq!(tokens[0], Token::Keyword(Keyword::Class));
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let (_, diags) = Lexer::new("let s = \"oops;\n").tokenize();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("unterminated string"));
    }

    #[test]
    fn test_unterminated_block_comment_is_error() {
        let (_, diags) = Lexer::new("let x = 1; /* no end").tokenize();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("unterminated block comment"));
    }

    #[test]
    fn test_int_range() {
        let tokens = lex("32767");
        assert_eq!(tokens[0], Token::Int(32767));
        let (_, diags) = Lexer::new("32768").tokenize();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("out of range"));
    }

    #[test]
    fn test_unexpected_character() {
        let (tokens, diags) = Lexer::new("let x = 1 # 2;").tokenize();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("unexpected character '#'"));
        // scanning continues past the bad character
        assert!(tokens.iter().any(|t| t.node == Token::Int(2)));
    }
}
