//! GLSL tokenizer.
//!
//! Whitespace other than newlines is discarded; newlines, comments and
//! preprocessor directives are preserved as tokens so callers that need
//! verbatim reconstruction (the codegen stage) can slice the original
//! source by byte offset instead of reassembling text from lexemes.

use crate::token::{Token, TokenKind, classify_word};

const MULTI_CHAR_PUNCT: &[&str] = &[
    "+=", "-=", "*=", "/=", "==", "<=", ">=", "!=", "&&", "||", "++", "--", "<<", ">>",
];

pub fn tokenize(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut line = 1usize;
    let mut column = 1usize;
    let mut offset = 0usize;

    // Walks one char forward, keeping line/column/offset in sync.
    let mut advance = |i: &mut usize,
                       line: &mut usize,
                       column: &mut usize,
                       offset: &mut usize| {
        let c = chars[*i];
        *offset += c.len_utf8();
        if c == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
        *i += 1;
    };

    while i < chars.len() {
        let c = chars[i];
        let start_line = line;
        let start_col = column;
        let start_off = offset;

        if c == '\n' {
            advance(&mut i, &mut line, &mut column, &mut offset);
            tokens.push(Token {
                kind: TokenKind::Newline,
                lexeme: "\n".to_string(),
                line: start_line,
                column: start_col,
                offset: start_off,
                end_offset: offset,
            });
            continue;
        }

        if c.is_whitespace() {
            advance(&mut i, &mut line, &mut column, &mut offset);
            continue;
        }

        // Preprocessor directive: the whole rest of the line is one opaque token.
        if c == '#' {
            let mut lexeme = String::new();
            while i < chars.len() && chars[i] != '\n' {
                lexeme.push(chars[i]);
                advance(&mut i, &mut line, &mut column, &mut offset);
            }
            tokens.push(Token {
                kind: TokenKind::Preprocessor,
                lexeme,
                line: start_line,
                column: start_col,
                offset: start_off,
                end_offset: offset,
            });
            continue;
        }

        // Line comment.
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            let mut lexeme = String::new();
            while i < chars.len() && chars[i] != '\n' {
                lexeme.push(chars[i]);
                advance(&mut i, &mut line, &mut column, &mut offset);
            }
            tokens.push(Token {
                kind: TokenKind::Comment,
                lexeme,
                line: start_line,
                column: start_col,
                offset: start_off,
                end_offset: offset,
            });
            continue;
        }

        // Block comment, possibly multi-line.
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            let mut lexeme = String::new();
            lexeme.push(chars[i]);
            advance(&mut i, &mut line, &mut column, &mut offset);
            lexeme.push(chars[i]);
            advance(&mut i, &mut line, &mut column, &mut offset);
            while i < chars.len() {
                if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                    lexeme.push(chars[i]);
                    advance(&mut i, &mut line, &mut column, &mut offset);
                    lexeme.push(chars[i]);
                    advance(&mut i, &mut line, &mut column, &mut offset);
                    break;
                }
                lexeme.push(chars[i]);
                advance(&mut i, &mut line, &mut column, &mut offset);
            }
            tokens.push(Token {
                kind: TokenKind::Comment,
                lexeme,
                line: start_line,
                column: start_col,
                offset: start_off,
                end_offset: offset,
            });
            continue;
        }

        // String literal.
        if c == '"' {
            let mut lexeme = String::new();
            lexeme.push(chars[i]);
            advance(&mut i, &mut line, &mut column, &mut offset);
            while i < chars.len() && chars[i] != '"' {
                lexeme.push(chars[i]);
                advance(&mut i, &mut line, &mut column, &mut offset);
            }
            if i < chars.len() {
                lexeme.push(chars[i]);
                advance(&mut i, &mut line, &mut column, &mut offset);
            }
            tokens.push(Token {
                kind: TokenKind::StringLit,
                lexeme,
                line: start_line,
                column: start_col,
                offset: start_off,
                end_offset: offset,
            });
            continue;
        }

        // Identifiers / keywords / types.
        if c.is_alphabetic() || c == '_' {
            let mut lexeme = String::new();
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                lexeme.push(chars[i]);
                advance(&mut i, &mut line, &mut column, &mut offset);
            }
            let kind = classify_word(&lexeme);
            tokens.push(Token {
                kind,
                lexeme,
                line: start_line,
                column: start_col,
                offset: start_off,
                end_offset: offset,
            });
            continue;
        }

        // Numbers: integer, float, leading-dot float, exponents.
        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()))
        {
            let mut lexeme = String::new();
            while i < chars.len() && chars[i].is_ascii_digit() {
                lexeme.push(chars[i]);
                advance(&mut i, &mut line, &mut column, &mut offset);
            }
            if i < chars.len() && chars[i] == '.' {
                lexeme.push(chars[i]);
                advance(&mut i, &mut line, &mut column, &mut offset);
                while i < chars.len() && chars[i].is_ascii_digit() {
                    lexeme.push(chars[i]);
                    advance(&mut i, &mut line, &mut column, &mut offset);
                }
            }
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut lookahead = i + 1;
                if chars.get(lookahead) == Some(&'+') || chars.get(lookahead) == Some(&'-') {
                    lookahead += 1;
                }
                if chars.get(lookahead).is_some_and(|d| d.is_ascii_digit()) {
                    lexeme.push(chars[i]);
                    advance(&mut i, &mut line, &mut column, &mut offset);
                    if chars[i] == '+' || chars[i] == '-' {
                        lexeme.push(chars[i]);
                        advance(&mut i, &mut line, &mut column, &mut offset);
                    }
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        lexeme.push(chars[i]);
                        advance(&mut i, &mut line, &mut column, &mut offset);
                    }
                }
            }
            // Trailing type suffix (f, F, u, U, lf, LF).
            while i < chars.len() && matches!(chars[i], 'f' | 'F' | 'u' | 'U' | 'l' | 'L') {
                lexeme.push(chars[i]);
                advance(&mut i, &mut line, &mut column, &mut offset);
            }
            tokens.push(Token {
                kind: TokenKind::Number,
                lexeme,
                line: start_line,
                column: start_col,
                offset: start_off,
                end_offset: offset,
            });
            continue;
        }

        // Multi-char punctuation, longest match first.
        let two: String = chars
            .get(i..i + 2)
            .map(|s| s.iter().collect())
            .unwrap_or_default();
        if MULTI_CHAR_PUNCT.contains(&two.as_str()) {
            advance(&mut i, &mut line, &mut column, &mut offset);
            advance(&mut i, &mut line, &mut column, &mut offset);
            tokens.push(Token {
                kind: TokenKind::Punct,
                lexeme: two,
                line: start_line,
                column: start_col,
                offset: start_off,
                end_offset: offset,
            });
            continue;
        }

        // Single-char punctuation (covers braces, parens, operators, etc.)
        advance(&mut i, &mut line, &mut column, &mut offset);
        tokens.push(Token {
            kind: TokenKind::Punct,
            lexeme: c.to_string(),
            line: start_line,
            column: start_col,
            offset: start_off,
            end_offset: offset,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        line,
        column,
        offset,
        end_offset: offset,
    });

    tokens
}
