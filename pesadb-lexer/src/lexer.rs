#[cfg(not(feature = "std"))]
use alloc::{
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};
use core::{iter::Peekable, str::Chars};

use crate::{
    error::{LexerError, Location},
    tokens::Token,
};

/// Query lexer.
pub struct Lexer<'a> {
    input: &'a str,
    iter: Peekable<Chars<'a>>,
    location: Location,
    // Count of chars consumed so far, for context snippets.
    consumed: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            iter: input.chars().peekable(),
            location: Location::default(),
            consumed: 0,
        }
    }

    /// Returns the current location scanned by the lexer.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Tokenizes the statement and produces a sequence of tokens.
    ///
    /// Whitespace is skipped; any character that starts no token fails
    /// with a [`LexerError`] carrying its location and a context snippet.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = vec![];
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        while self
            .iter
            .peek()
            .map(|ch| ch.is_whitespace())
            .unwrap_or(false)
        {
            self.next_char();
        }
        match self.iter.peek() {
            Some(&ch) => match ch {
                // string literal
                '\'' => {
                    self.next_char(); // consume the open quote
                    let s = self.tokenize_string_literal()?;
                    Ok(Some(Token::String(s)))
                }
                // identifier or keyword
                ch if is_identifier_start(ch) => {
                    self.next_char(); // consume the identifier start character
                    let word = self.tokenize_ident(ch);
                    Ok(Some(Token::word(word)))
                }
                // number or period
                ch if ch.is_ascii_digit() || ch == '.' => self.tokenize_number(None),
                // signed number
                sign @ '+' | sign @ '-' => {
                    self.next_char(); // consume the sign and check the next one
                    if self
                        .iter
                        .peek()
                        .map(|ch| ch.is_ascii_digit())
                        .unwrap_or(false)
                    {
                        self.tokenize_number(Some(sign))
                    } else {
                        self.tokenize_error(format!("Unexpected character '{}'", sign))
                    }
                }
                _ => self.tokenize_symbol(),
            },
            None => Ok(None),
        }
    }

    fn tokenize_string_literal(&mut self) -> Result<String, LexerError> {
        let s = self.next_while(|&ch| ch != '\'');
        // consume the close quote.
        if self.next_char() == Some('\'') {
            Ok(s)
        } else {
            self.tokenize_error("Unterminated string literal")
        }
    }

    fn tokenize_ident(&mut self, first: char) -> String {
        let mut ident = first.to_string();
        let rest = self.next_while(|&ch| is_identifier_part(ch));
        ident.push_str(&rest);
        ident
    }

    fn tokenize_number(&mut self, sign: Option<char>) -> Result<Option<Token>, LexerError> {
        let mut s = match sign {
            Some(sign) => sign.to_string(),
            None => String::new(),
        };
        s += &self.next_while(|ch| ch.is_ascii_digit());

        // match one period
        if self.next_if_is('.') {
            s.push('.');
        }
        s += &self.next_while(|ch| ch.is_ascii_digit());

        // No digits at all -> Token::Period
        if s == "." {
            return Ok(Some(Token::Period));
        }
        Ok(Some(Token::Number(s)))
    }

    fn tokenize_symbol(&mut self) -> Result<Option<Token>, LexerError> {
        let token = self.next_if_token(|ch| {
            Some(match ch {
                ',' => Token::Comma,
                ';' => Token::SemiColon,

                '(' => Token::LeftParen,
                ')' => Token::RightParen,

                '*' => Token::Asterisk,

                '=' => Token::Equal,
                '<' => Token::LessThan,
                '>' => Token::GreaterThan,
                '!' => Token::NotEqual, // provisional, must be followed by `=`
                _ => return None,
            })
        });
        match token {
            Some(token) => Ok(Some(match token {
                Token::LessThan if self.next_if_is('>') => Token::NotEqual,
                Token::LessThan if self.next_if_is('=') => Token::LessThanOrEqual,
                Token::GreaterThan if self.next_if_is('=') => Token::GreaterThanOrEqual,
                Token::NotEqual => {
                    if self.next_if_is('=') {
                        Token::NotEqual
                    } else {
                        return self.tokenize_error("Unexpected character '!'");
                    }
                }
                token => token,
            })),
            None => {
                let ch = *self.iter.peek().expect("caller checked a char is pending");
                self.tokenize_error(format!("Unexpected character '{}'", ch))
            }
        }
    }

    fn tokenize_error<R>(&self, message: impl Into<String>) -> Result<R, LexerError> {
        let mut message = message.into();
        let snippet = self.context_snippet();
        if !snippet.is_empty() {
            message.push_str(&format!(" in '{}'", snippet));
        }
        Err(self.location.into_error(message))
    }

    /// A one-line snippet of the input around the current position.
    fn context_snippet(&self) -> String {
        let start = self.consumed.saturating_sub(15);
        self.input
            .chars()
            .skip(start)
            .take(30)
            .map(|ch| if ch == '\n' { ' ' } else { ch })
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Grabs the next single-character token if the tokenizer function returns one.
    fn next_if_token<F: Fn(char) -> Option<Token>>(&mut self, tokenizer: F) -> Option<Token> {
        let token = self.iter.peek().and_then(|&c| tokenizer(c))?;
        self.next_char();
        Some(token)
    }

    /// Consumes the next character and records the current location.
    fn next_char(&mut self) -> Option<char> {
        if let Some(ch) = self.iter.next() {
            self.location.advance(ch);
            self.consumed += 1;
            Some(ch)
        } else {
            None
        }
    }

    /// Consumes the next character and records the current location
    /// if it matches the character `ch`, and returns true if it matches.
    #[inline]
    fn next_if_is(&mut self, ch: char) -> bool {
        if self.iter.peek() == Some(&ch) {
            self.next_char();
            true
        } else {
            false
        }
    }

    /// Grabs the next characters that match the predicate, as a string.
    fn next_while<F: Fn(&char) -> bool>(&mut self, predicate: F) -> String {
        let mut value = String::new();
        while let Some(&ch) = self.iter.peek() {
            if !predicate(&ch) {
                break;
            }
            self.next_char();
            value.push(ch);
        }
        value
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
