//! Lexer for assembly source text.
//!
//! [`Lexer::next`] pulls one [`Token`] at a time from an in-memory source
//! string, tracking line/column positions so later stages can point
//! diagnostics at the exact character. Token text is borrowed from the
//! source (`Cow::Borrowed`) in every case except the two synthetic
//! radix-prefix diagnostics, which are static strings.
//!
//! The lexer never fails: malformed input becomes [`TokenKind::Illegal`]
//! tokens and scanning continues. At or past end of input it returns
//! [`TokenKind::Eof`] tokens indefinitely.

use alloc::borrow::Cow;

use crate::error::Position;
use crate::ir::{Mnemonic, Register};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'src> {
    /// Token classification.
    pub kind: TokenKind,
    /// Source text of the token — borrowed from the input in the common
    /// case. A `Newline` carries the two-character escape `\n`.
    pub text: Cow<'src, str>,
    /// Source location of the token's first character.
    pub pos: Position,
}

impl<'src> Token<'src> {
    /// Returns the token text as a `&str`.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The type of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    /// End of input.
    Eof,
    /// An unrecognized character or malformed literal; the token text is
    /// the character itself or a diagnostic message.
    Illegal,
    /// An instruction mnemonic.
    Instruction(Mnemonic),
    /// A register name.
    Register(Register),
    /// The keyword `section`.
    Section,
    /// Comma separator.
    Comma,
    /// Colon (label definitions).
    Colon,
    /// A newline (statement separator).
    Newline,
    /// An identifier: label or section name.
    Identifier,
    /// A hexadecimal literal; the token text is the digit body without the
    /// `0x` prefix.
    Hex,
    /// An octal literal; the token text is the digit body without the
    /// `0o` prefix.
    Octal,
    /// A decimal literal (leading zeros are kept).
    Decimal,
}

/// Zero-allocation ASCII-lowercase into a caller-provided stack buffer.
/// Returns `&str` of the lowered text. Inputs longer than `buf` are
/// truncated, which cannot turn a non-keyword into a keyword.
#[inline]
fn to_lower_buf<'b>(s: &str, buf: &'b mut [u8]) -> &'b str {
    let len = s.len().min(buf.len());
    buf[..len].copy_from_slice(&s.as_bytes()[..len]);
    buf[..len].make_ascii_lowercase();
    // Truncation may split a multi-byte character; such identifiers are
    // never keywords, so the empty fallback classifies them correctly.
    core::str::from_utf8(&buf[..len]).unwrap_or("")
}

/// A pull-based tokenizer over a source string.
#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src str,
    /// Byte offset of the next unread character.
    pos: usize,
    line: u32,
    /// 0-based column of the next unread character, counted in characters.
    col: u32,
}

impl<'src> Lexer<'src> {
    /// Create a lexer over `source`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rexasm::{Lexer, Register, TokenKind};
    ///
    /// let mut lexer = Lexer::new("mov rax, 50123");
    /// assert!(matches!(lexer.next().kind, TokenKind::Instruction(_)));
    /// assert_eq!(lexer.next().kind, TokenKind::Register(Register::Rax));
    /// assert_eq!(lexer.next().kind, TokenKind::Comma);
    /// assert_eq!(lexer.next().kind, TokenKind::Decimal);
    /// assert_eq!(lexer.next().kind, TokenKind::Eof);
    /// ```
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            src: source,
            pos: 0,
            line: 1,
            col: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        self.col += 1;
        Some(ch)
    }

    #[inline]
    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
    }

    fn token(&self, kind: TokenKind, start: usize, pos: Position) -> Token<'src> {
        Token {
            kind,
            text: Cow::Borrowed(&self.src[start..self.pos]),
            pos,
        }
    }

    /// Lex and return the next token. At or past end of input this keeps
    /// returning [`TokenKind::Eof`] tokens.
    pub fn next(&mut self) -> Token<'src> {
        loop {
            let pos = Position::new(self.line, self.col);
            let start = self.pos;

            let Some(ch) = self.bump() else {
                return Token {
                    kind: TokenKind::Eof,
                    text: Cow::Borrowed(""),
                    pos,
                };
            };

            match ch {
                ',' => return self.token(TokenKind::Comma, start, pos),
                ':' => return self.token(TokenKind::Colon, start, pos),
                '\n' => {
                    let tok = Token {
                        kind: TokenKind::Newline,
                        text: Cow::Borrowed("\\n"),
                        pos,
                    };
                    self.line += 1;
                    self.col = 0;
                    return tok;
                }
                '0' => return self.lex_zero(start, pos),
                _ if ch.is_whitespace() => continue,
                _ if ch.is_ascii_digit() => return self.lex_decimal(start, pos),
                _ if ch.is_alphabetic() || ch == '_' || ch == '.' => {
                    return self.lex_identifier(start, pos)
                }
                _ => return self.token(TokenKind::Illegal, start, pos),
            }
        }
    }

    /// A leading `0` opens a radix prefix, a zero-padded decimal, or the
    /// lone literal `0`.
    fn lex_zero(&mut self, start: usize, pos: Position) -> Token<'src> {
        match self.peek() {
            Some('x' | 'X') => {
                self.bump();
                self.lex_radix_body(pos, |c| c.is_ascii_hexdigit(), TokenKind::Hex)
            }
            Some('o' | 'O') => {
                self.bump();
                self.lex_radix_body(pos, |c| matches!(c, '0'..='7'), TokenKind::Octal)
            }
            Some(c) if c.is_ascii_digit() => self.lex_decimal(start, pos),
            _ => self.token(TokenKind::Decimal, start, pos),
        }
    }

    fn lex_radix_body(
        &mut self,
        pos: Position,
        digit: impl Fn(char) -> bool,
        kind: TokenKind,
    ) -> Token<'src> {
        let body_start = self.pos;
        self.eat_while(digit);
        if self.pos == body_start {
            let msg = match kind {
                TokenKind::Octal => "octal prefix without logical continuation",
                _ => "hex prefix without logical continuation",
            };
            return Token {
                kind: TokenKind::Illegal,
                text: Cow::Borrowed(msg),
                pos,
            };
        }
        self.token(kind, body_start, pos)
    }

    fn lex_decimal(&mut self, start: usize, pos: Position) -> Token<'src> {
        self.eat_while(|c| c.is_ascii_digit());
        self.token(TokenKind::Decimal, start, pos)
    }

    fn lex_identifier(&mut self, start: usize, pos: Position) -> Token<'src> {
        self.eat_while(|c| c.is_alphanumeric() || c == '_' || c == '.');
        let text = &self.src[start..self.pos];

        let mut buf = [0u8; 64];
        let lowered = to_lower_buf(text, &mut buf);
        let kind = if lowered == "section" {
            TokenKind::Section
        } else if let Some(mnemonic) = Mnemonic::from_name(lowered) {
            TokenKind::Instruction(mnemonic)
        } else if let Some(register) = Register::from_name(lowered) {
            TokenKind::Register(register)
        } else {
            TokenKind::Identifier
        };

        self.token(kind, start, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn lex_all(src: &str) -> Vec<Token<'_>> {
        let mut lexer = Lexer::new(src);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next();
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                return tokens;
            }
        }
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex_all(src).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input() {
        let tokens = lex_all("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!(tokens[0].pos, Position::new(1, 0));
    }

    #[test]
    fn eof_repeats_indefinitely() {
        let mut lexer = Lexer::new("mov");
        assert_eq!(lexer.next().kind, TokenKind::Instruction(Mnemonic::Mov));
        for _ in 0..4 {
            assert_eq!(lexer.next().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn whitespace_only() {
        let tokens = lex_all("   ");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].pos, Position::new(1, 3));
    }

    #[test]
    fn identifier_with_dots_and_underscores() {
        let tokens = lex_all("_lo_._hi_bit ");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "_lo_._hi_bit");
        assert_eq!(tokens[0].pos, Position::new(1, 0));
    }

    #[test]
    fn mnemonic_case_insensitive() {
        let tokens = lex_all("mOv");
        assert_eq!(tokens[0].kind, TokenKind::Instruction(Mnemonic::Mov));
        assert_eq!(tokens[0].text, "mOv");
    }

    #[test]
    fn register_case_insensitive() {
        let tokens = lex_all("bPl");
        assert_eq!(tokens[0].kind, TokenKind::Register(Register::Bpl));
        assert_eq!(tokens[0].text, "bPl");
    }

    #[test]
    fn section_keyword() {
        let tokens = lex_all("sEcTiOn");
        assert_eq!(tokens[0].kind, TokenKind::Section);
        assert_eq!(tokens[0].text, "sEcTiOn");
    }

    #[test]
    fn lone_zero() {
        for src in ["0", "0 "] {
            let tokens = lex_all(src);
            assert_eq!(tokens[0].kind, TokenKind::Decimal, "{:?}", src);
            assert_eq!(tokens[0].text, "0");
            assert_eq!(tokens[0].pos, Position::new(1, 0));
        }
    }

    #[test]
    fn decimal_numbers() {
        let tokens = lex_all("1234567890");
        assert_eq!(tokens[0].kind, TokenKind::Decimal);
        assert_eq!(tokens[0].text, "1234567890");
    }

    #[test]
    fn decimal_keeps_leading_zeros() {
        for src in ["0123456789", "00000"] {
            let tokens = lex_all(src);
            assert_eq!(tokens[0].kind, TokenKind::Decimal);
            assert_eq!(tokens[0].text, src);
        }
    }

    #[test]
    fn decimal_stops_before_letters() {
        let tokens = lex_all("512hello");
        assert_eq!(tokens[0].kind, TokenKind::Decimal);
        assert_eq!(tokens[0].text, "512");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].text, "hello");
    }

    #[test]
    fn hex_literal_body() {
        for src in ["0x0123456789AbCdEfGhIjKl", "0X0123456789AbCdEfGhIjKl"] {
            let tokens = lex_all(src);
            assert_eq!(tokens[0].kind, TokenKind::Hex);
            assert_eq!(tokens[0].text, "0123456789AbCdEf");
            assert_eq!(tokens[0].pos, Position::new(1, 0));
        }
    }

    #[test]
    fn octal_literal_body() {
        for src in ["0o0123456789", "0O0123456789"] {
            let tokens = lex_all(src);
            assert_eq!(tokens[0].kind, TokenKind::Octal);
            assert_eq!(tokens[0].text, "01234567");
        }
    }

    #[test]
    fn hex_at_end_of_input() {
        let tokens = lex_all("0xFF");
        assert_eq!(tokens[0].kind, TokenKind::Hex);
        assert_eq!(tokens[0].text, "FF");
    }

    #[test]
    fn hex_prefix_without_digits() {
        for src in ["0x", "0xzz"] {
            let tokens = lex_all(src);
            assert_eq!(tokens[0].kind, TokenKind::Illegal, "{:?}", src);
            assert_eq!(tokens[0].text, "hex prefix without logical continuation");
        }
    }

    #[test]
    fn octal_prefix_without_digits() {
        let tokens = lex_all("0o");
        assert_eq!(tokens[0].kind, TokenKind::Illegal);
        assert_eq!(tokens[0].text, "octal prefix without logical continuation");
    }

    #[test]
    fn zero_b_is_not_a_prefix() {
        // Only 0x and 0o open radix literals; "0b1" is the decimal zero
        // followed by an identifier.
        let tokens = lex_all("0b1");
        assert_eq!(tokens[0].kind, TokenKind::Decimal);
        assert_eq!(tokens[0].text, "0");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].text, "b1");
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            kinds(",:"),
            vec![TokenKind::Comma, TokenKind::Colon, TokenKind::Eof]
        );
    }

    #[test]
    fn newline_token_and_position_reset() {
        let tokens = lex_all("mov\nadd");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[1].text, "\\n");
        assert_eq!(tokens[2].kind, TokenKind::Instruction(Mnemonic::Add));
        assert_eq!(tokens[2].pos, Position::new(2, 0));
    }

    #[test]
    fn instruction_with_operands() {
        let tokens = lex_all("mov rax, 50123");
        assert_eq!(tokens[0].kind, TokenKind::Instruction(Mnemonic::Mov));
        assert_eq!(tokens[1].kind, TokenKind::Register(Register::Rax));
        assert_eq!(tokens[1].pos, Position::new(1, 4));
        assert_eq!(tokens[2].kind, TokenKind::Comma);
        assert_eq!(tokens[3].kind, TokenKind::Decimal);
        assert_eq!(tokens[3].text, "50123");
    }

    #[test]
    fn illegal_character() {
        let tokens = lex_all("\\");
        assert_eq!(tokens[0].kind, TokenKind::Illegal);
        assert_eq!(tokens[0].text, "\\");
    }

    #[test]
    fn non_ascii_input_is_illegal_not_fatal() {
        let tokens = lex_all("mov ★, 1");
        assert_eq!(tokens[0].kind, TokenKind::Instruction(Mnemonic::Mov));
        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].text, "★");
        assert_eq!(tokens[2].kind, TokenKind::Comma);
    }

    #[test]
    fn unicode_letters_lex_as_identifier() {
        let tokens = lex_all("début:");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "début");
        assert_eq!(tokens[1].kind, TokenKind::Colon);
        // Columns count characters, not bytes.
        assert_eq!(tokens[1].pos, Position::new(1, 5));
    }

    #[test]
    fn all_register_names_lex() {
        for reg in Register::ALL {
            let tokens = lex_all(reg.name());
            assert_eq!(tokens[0].kind, TokenKind::Register(reg), "{}", reg);
        }
    }

    #[test]
    fn all_register_names_lex_uppercase() {
        for reg in Register::ALL {
            let upper = reg.name().to_uppercase();
            let tokens = lex_all(&upper);
            assert_eq!(tokens[0].kind, TokenKind::Register(reg), "{}", upper);
        }
    }

    #[test]
    fn token_after_radix_literal() {
        let tokens = lex_all("0xff, 12");
        assert_eq!(tokens[0].kind, TokenKind::Hex);
        assert_eq!(tokens[1].kind, TokenKind::Comma);
        // "0xff" spans columns 0..4, the comma sits at 4.
        assert_eq!(tokens[1].pos, Position::new(1, 4));
        assert_eq!(tokens[2].kind, TokenKind::Decimal);
        assert_eq!(tokens[2].pos, Position::new(1, 6));
    }

    #[test]
    fn radix_prefix_error_before_newline() {
        let tokens = lex_all("0x\nmov");
        assert_eq!(tokens[0].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[2].kind, TokenKind::Instruction(Mnemonic::Mov));
        assert_eq!(tokens[2].pos, Position::new(2, 0));
    }

    #[test]
    fn consecutive_newlines_advance_lines() {
        let tokens = lex_all("\n\n\nmov");
        assert_eq!(tokens[0].pos, Position::new(1, 0));
        assert_eq!(tokens[1].pos, Position::new(2, 0));
        assert_eq!(tokens[2].pos, Position::new(3, 0));
        assert_eq!(tokens[3].pos, Position::new(4, 0));
    }

    #[test]
    fn label_statement_token_stream() {
        let tokens = lex_all("_start:");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "_start");
        assert_eq!(tokens[1].kind, TokenKind::Colon);
        assert_eq!(tokens[1].pos, Position::new(1, 6));
    }

    #[test]
    fn register_name_with_suffix_is_identifier() {
        // "raxx" and "r15www" are not registers.
        for src in ["raxx", "r15www", "mov2"] {
            let tokens = lex_all(src);
            assert_eq!(tokens[0].kind, TokenKind::Identifier, "{:?}", src);
        }
    }

    #[test]
    fn tabs_and_carriage_returns_are_whitespace() {
        let tokens = lex_all("\tmov\r rax");
        assert_eq!(tokens[0].kind, TokenKind::Instruction(Mnemonic::Mov));
        assert_eq!(tokens[0].pos, Position::new(1, 1));
        assert_eq!(tokens[1].kind, TokenKind::Register(Register::Rax));
    }

    #[test]
    fn zero_then_x_at_end_is_illegal() {
        let tokens = lex_all("mov rax, 0x");
        assert_eq!(tokens[3].kind, TokenKind::Illegal);
        assert_eq!(tokens[3].pos, Position::new(1, 9));
    }
}
