//! Parser producing statement expressions from the token stream.
//!
//! [`Parser::next`] pulls tokens from the lexer and shapes them into the
//! four statement forms of the source language: section directives, label
//! definitions, instructions with operand lists, and end of input. The
//! parser itself never fails — malformed statements come back as
//! [`Expr::Illegal`] carrying a diagnostic and the offending token, and the
//! code generator turns those into errors.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::Position;
use crate::ir::Mnemonic;
use crate::lexer::{Lexer, Token, TokenKind};

/// A statement expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'src> {
    /// `section NAME` — switch the current section.
    Section {
        /// The section name.
        name: String,
        /// Position of the `section` keyword.
        pos: Position,
    },
    /// `NAME:` — define a label at the current offset.
    Label {
        /// The label name.
        name: String,
        /// Position of the label identifier.
        pos: Position,
    },
    /// `MNEMONIC op, op, ...` — an instruction with raw operand tokens.
    Instr {
        /// The instruction mnemonic.
        mnemonic: Mnemonic,
        /// Operand tokens in source order; may be empty.
        operands: Vec<Token<'src>>,
        /// Position of the mnemonic.
        pos: Position,
    },
    /// A malformed statement.
    Illegal {
        /// The diagnostic message.
        detail: &'static str,
        /// The token that broke the production.
        found: Token<'src>,
    },
    /// End of input.
    Eof,
}

/// A pull-based statement parser.
#[derive(Debug)]
pub struct Parser<'src> {
    lexer: Lexer<'src>,
}

impl<'src> Parser<'src> {
    /// Create a parser over `source`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rexasm::{Expr, Mnemonic, Parser};
    ///
    /// let mut parser = Parser::new("start:\nadd rcx, rax");
    /// assert!(matches!(parser.next(), Expr::Label { name, .. } if name == "start"));
    /// assert!(matches!(
    ///     parser.next(),
    ///     Expr::Instr { mnemonic: Mnemonic::Add, .. }
    /// ));
    /// assert_eq!(parser.next(), Expr::Eof);
    /// ```
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(source),
        }
    }

    /// Create a parser over an existing lexer.
    #[must_use]
    pub fn from_lexer(lexer: Lexer<'src>) -> Self {
        Self { lexer }
    }

    /// Parse and return the next statement expression. Past end of input
    /// this returns [`Expr::Eof`] indefinitely.
    pub fn next(&mut self) -> Expr<'src> {
        loop {
            let tok = self.lexer.next();
            return match tok.kind {
                TokenKind::Newline => continue,
                TokenKind::Eof => Expr::Eof,
                TokenKind::Section => self.parse_section(&tok),
                TokenKind::Instruction(mnemonic) => self.parse_instruction(mnemonic, tok.pos),
                TokenKind::Identifier => self.parse_label(tok),
                _ => Expr::Illegal {
                    detail: "unexpected token",
                    found: tok,
                },
            };
        }
    }

    fn parse_section(&mut self, section_tok: &Token<'src>) -> Expr<'src> {
        let ident = self.lexer.next();
        if ident.kind != TokenKind::Identifier {
            return Expr::Illegal {
                detail: "expected identifier",
                found: ident,
            };
        }
        Expr::Section {
            name: ident.text.into_owned(),
            pos: section_tok.pos,
        }
    }

    fn parse_label(&mut self, ident: Token<'src>) -> Expr<'src> {
        let colon = self.lexer.next();
        if colon.kind != TokenKind::Colon {
            return Expr::Illegal {
                detail: "expected ':'",
                found: colon,
            };
        }
        Expr::Label {
            name: ident.text.into_owned(),
            pos: ident.pos,
        }
    }

    fn parse_instruction(&mut self, mnemonic: Mnemonic, pos: Position) -> Expr<'src> {
        let mut operands = Vec::new();

        loop {
            let op = self.lexer.next();
            match op.kind {
                TokenKind::Newline | TokenKind::Eof => {
                    return Expr::Instr {
                        mnemonic,
                        operands,
                        pos,
                    }
                }
                TokenKind::Identifier
                | TokenKind::Decimal
                | TokenKind::Hex
                | TokenKind::Octal
                | TokenKind::Register(_) => operands.push(op),
                _ => {
                    return Expr::Illegal {
                        detail: "expected operand or '\\n'",
                        found: op,
                    }
                }
            }

            let delim = self.lexer.next();
            match delim.kind {
                TokenKind::Newline | TokenKind::Eof => {
                    return Expr::Instr {
                        mnemonic,
                        operands,
                        pos,
                    }
                }
                TokenKind::Comma => {}
                _ => {
                    return Expr::Illegal {
                        detail: "expected '\\n' or ','",
                        found: delim,
                    }
                }
            }
        }
    }
}
