//! Lexer and scanning helpers for single source lines
//!
//! Two layers live here:
//!
//! - [`Lexer`] turns an expression string into a flat [`Lexeme`] stream for the
//!   expression evaluator.
//! - Free helpers ([`unquoted`], [`strip_comment`], [`identifiers`],
//!   [`split_top_level`], ...) answer questions about a raw line while ignoring
//!   the contents of string and character literals. The classifier and the
//!   syntax validator are built on these; neither needs a full token stream.

use super::ast::{Dialect, TemplatePart};
use std::fmt;
use std::str::CharIndices;

/// All token variants produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    IntLiteral(i64),
    FloatLiteral(f64),
    CharLiteral(char),
    StringLiteral(String),

    // Identifiers (keywords such as `and`, `true` are resolved by the parser)
    Ident(String),

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Punctuation
    Amp,    // &
    Eq,     // =
    LParen, // (
    RParen, // )
    Comma,  // ,

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n) => write!(f, "{}", n),
            Token::FloatLiteral(x) => write!(f, "{}", x),
            Token::CharLiteral(c) => write!(f, "'{}'", c),
            Token::StringLiteral(s) => write!(f, "\"{}\"", s),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::Bang => write!(f, "!"),
            Token::Amp => write!(f, "&"),
            Token::Eq => write!(f, "="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Eof => write!(f, "end of expression"),
        }
    }
}

/// A token plus the 1-indexed column it starts at
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub column: usize,
}

/// Lexer error
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub column: usize,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at column {}", self.message, self.column)
    }
}

impl std::error::Error for LexError {}

/// Lexer for expression text
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Lexeme>, LexError> {
        let mut tokens = Vec::new();

        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            let column = self.position + 1;
            if self.is_at_end() {
                tokens.push(Lexeme {
                    token: Token::Eof,
                    column,
                });
                break;
            }

            let token = self.next_token()?;
            tokens.push(Lexeme { token, column });
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let column = self.position + 1;
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of expression".to_string(),
            column,
        })?;

        match ch {
            '"' => self.string_literal(column),
            '\'' => self.char_literal(column),
            '0'..='9' => self.number_literal(ch, column),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal(ch, column)
            }
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier(ch)),

            '+' => Ok(Token::Plus),
            '-' => Ok(Token::Minus),
            '*' => Ok(Token::Star),
            '/' => Ok(Token::Slash),
            '%' => Ok(Token::Percent),
            '(' => Ok(Token::LParen),
            ')' => Ok(Token::RParen),
            ',' => Ok(Token::Comma),
            '=' => Ok(self.pick('=', Token::EqEq, Token::Eq)),
            '!' => Ok(self.pick('=', Token::NotEq, Token::Bang)),
            '<' => Ok(self.pick('=', Token::Le, Token::Lt)),
            '>' => Ok(self.pick('=', Token::Ge, Token::Gt)),
            '&' => Ok(self.pick('&', Token::AndAnd, Token::Amp)),
            '|' if self.peek() == Some('|') => {
                self.advance();
                Ok(Token::OrOr)
            }

            _ => Err(LexError {
                message: format!("Unexpected character '{}'", ch),
                column,
            }),
        }
    }

    /// Consume `next` if it follows, choosing between a two- and a one-char token
    fn pick(&mut self, next: char, double: Token, single: Token) -> Token {
        if self.peek() == Some(next) {
            self.advance();
            double
        } else {
            single
        }
    }

    fn string_literal(&mut self, column: usize) -> Result<Token, LexError> {
        let mut value = String::new();

        loop {
            match self.advance() {
                Some('"') => return Ok(Token::StringLiteral(value)),
                Some('\\') => value.push(self.escape(column)?),
                Some(ch) => value.push(ch),
                None => {
                    return Err(LexError {
                        message: "Unterminated string literal".to_string(),
                        column,
                    })
                }
            }
        }
    }

    fn char_literal(&mut self, column: usize) -> Result<Token, LexError> {
        let ch = match self.advance() {
            Some('\'') => return Ok(Token::StringLiteral(String::new())),
            Some('\\') => self.escape(column)?,
            Some(ch) => ch,
            None => {
                return Err(LexError {
                    message: "Unterminated character literal".to_string(),
                    column,
                })
            }
        };

        if self.advance() != Some('\'') {
            // Single-quoted strings are plain strings in Python and JavaScript
            let mut value = String::from(ch);
            self.position -= 1;
            loop {
                match self.advance() {
                    Some('\'') => return Ok(Token::StringLiteral(value)),
                    Some('\\') => value.push(self.escape(column)?),
                    Some(c) => value.push(c),
                    None => {
                        return Err(LexError {
                            message: "Unterminated character literal".to_string(),
                            column,
                        })
                    }
                }
            }
        }

        Ok(Token::CharLiteral(ch))
    }

    fn escape(&mut self, column: usize) -> Result<char, LexError> {
        match self.advance() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('0') => Ok('\0'),
            Some(ch) => Ok(ch),
            None => Err(LexError {
                message: "Unterminated escape sequence".to_string(),
                column,
            }),
        }
    }

    fn number_literal(&mut self, first: char, column: usize) -> Result<Token, LexError> {
        let mut text = String::from(first);
        let mut is_float = first == '.';

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
            } else if ch == '.' && !is_float {
                is_float = true;
                text.push(ch);
            } else {
                break;
            }
            self.advance();
        }

        // C suffixes: 2.5f, 10L, 3u
        while self
            .peek()
            .is_some_and(|c| matches!(c, 'f' | 'F' | 'l' | 'L' | 'u' | 'U'))
        {
            if matches!(self.peek(), Some('f' | 'F')) {
                is_float = true;
            }
            self.advance();
        }

        if is_float {
            text.parse::<f64>()
                .map(Token::FloatLiteral)
                .map_err(|_| LexError {
                    message: format!("Invalid number '{}'", text),
                    column,
                })
        } else {
            text.parse::<i64>()
                .map(Token::IntLiteral)
                .map_err(|_| LexError {
                    message: format!("Integer literal '{}' is too large", text),
                    column,
                })
        }
    }

    fn identifier(&mut self, first: char) -> Token {
        let mut name = String::from(first);
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Token::Ident(name)
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied();
        if ch.is_some() {
            self.position += 1;
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}

/// Characters of a line that sit outside string literals.
///
/// Yields `(byte_index, char, depth)` where `depth` is the bracket nesting
/// level the character belongs to (a closing bracket reports the level of
/// its opener). Opening and closing quotes are yielded so that callers still
/// see a separator where a literal was; the literal's contents are not.
pub struct Unquoted<'a> {
    chars: CharIndices<'a>,
    quote: Option<char>,
    escaped: bool,
    depth: usize,
}

pub fn unquoted(text: &str) -> Unquoted<'_> {
    Unquoted {
        chars: text.char_indices(),
        quote: None,
        escaped: false,
        depth: 0,
    }
}

impl Iterator for Unquoted<'_> {
    type Item = (usize, char, usize);

    fn next(&mut self) -> Option<Self::Item> {
        for (i, ch) in self.chars.by_ref() {
            if let Some(q) = self.quote {
                if self.escaped {
                    self.escaped = false;
                } else if ch == '\\' {
                    self.escaped = true;
                } else if ch == q {
                    self.quote = None;
                    return Some((i, ch, self.depth));
                }
                continue;
            }

            return match ch {
                '"' | '\'' | '`' => {
                    self.quote = Some(ch);
                    Some((i, ch, self.depth))
                }
                '(' | '[' | '{' => {
                    self.depth += 1;
                    Some((i, ch, self.depth - 1))
                }
                ')' | ']' | '}' => {
                    self.depth = self.depth.saturating_sub(1);
                    Some((i, ch, self.depth))
                }
                _ => Some((i, ch, self.depth)),
            };
        }
        None
    }
}

/// Remove a trailing comment, leaving string literals intact
pub fn strip_comment(line: &str, dialect: Dialect) -> &str {
    for (i, ch, _) in unquoted(line) {
        let rest = &line[i..];
        if dialect.slash_is_comment() && rest.starts_with("//") {
            return &line[..i];
        }
        // A leading `#` is a directive in C; only Python has trailing `#` comments
        if ch == '#' && (dialect == Dialect::Python || line[..i].trim().is_empty()) {
            return &line[..i];
        }
    }
    line
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Leading identifier of `text` and the remainder after it
pub fn leading_identifier(text: &str) -> Option<(&str, &str)> {
    let end = text
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '_'))
        .map_or(text.len(), |(i, _)| i);
    let ident = &text[..end];
    is_identifier(ident).then(|| (ident, &text[end..]))
}

/// Whether `text` begins with `word` as a whole word
pub fn starts_with_word(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_'))
}

/// Bare identifiers outside literals, with 1-indexed columns.
///
/// Number literals (with any suffix), member names after `.`, and string
/// prefixes such as the `f` of `f"..."` are not reported.
pub fn identifiers(text: &str) -> Vec<(String, usize)> {
    let visible: Vec<(usize, char)> = unquoted(text).map(|(i, c, _)| (i, c)).collect();
    let mut found = Vec::new();
    let mut k = 0;

    while k < visible.len() {
        let (start, ch) = visible[k];
        if ch.is_ascii_digit() {
            while k < visible.len() && (visible[k].1.is_ascii_alphanumeric() || visible[k].1 == '.')
            {
                k += 1;
            }
            continue;
        }
        if !(ch.is_ascii_alphabetic() || ch == '_') {
            k += 1;
            continue;
        }

        let mut name = String::new();
        let first = k;
        while k < visible.len() && (visible[k].1.is_ascii_alphanumeric() || visible[k].1 == '_') {
            name.push(visible[k].1);
            k += 1;
        }

        let after_dot = first > 0 && visible[first - 1].1 == '.';
        let string_prefix = matches!(name.as_str(), "f" | "r" | "b" | "F" | "R" | "fr" | "rf")
            && visible.get(k).is_some_and(|&(_, c)| c == '"' || c == '\'');
        if !after_dot && !string_prefix {
            found.push((name, text[..start].chars().count() + 1));
        }
    }

    found
}

/// Split on `sep` where it appears outside literals and brackets
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut start = 0;
    for (i, ch, depth) in unquoted(text) {
        if ch == sep && depth == 0 {
            parts.push(text[start..i].trim());
            start = i + ch.len_utf8();
        }
    }
    parts.push(text[start..].trim());
    parts
}

/// Byte index of the bracket closing the one at `open`
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let base = unquoted(&text[open..]).next().map(|(_, _, d)| d)?;
    unquoted(&text[open..])
        .skip(1)
        .find(|&(_, ch, depth)| matches!(ch, ')' | ']' | '}') && depth == base)
        .map(|(i, _, _)| open + i)
}

/// First top-level occurrence of `ch` outside literals and brackets
pub fn find_top_level(text: &str, ch: char) -> Option<usize> {
    unquoted(text)
        .find(|&(_, c, depth)| c == ch && depth == 0)
        .map(|(i, _, _)| i)
}

/// First top-level occurrence of `word` as a whole word
pub fn find_keyword(text: &str, word: &str) -> Option<usize> {
    let visible: Vec<(usize, char, usize)> = unquoted(text).collect();
    let is_word_char = |c: char| c.is_ascii_alphanumeric() || c == '_';

    visible.iter().enumerate().find_map(|(k, &(i, _, depth))| {
        if depth != 0 || !text[i..].starts_with(word) {
            return None;
        }
        let before_ok = k == 0 || !is_word_char(visible[k - 1].1);
        let after_ok = text[i + word.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        (before_ok && after_ok).then_some(i)
    })
}

/// Body of a lone quoted literal (`"..."`, `'...'` or `` `...` ``), escapes kept raw
pub fn literal_body(text: &str) -> Option<&str> {
    let text = text.trim();
    let quote = text.chars().next().filter(|c| matches!(c, '"' | '\'' | '`'))?;
    if text.len() < 2 || !text.ends_with(quote) {
        return None;
    }

    // The closing quote must be the last character, not an inner one
    let closing = unquoted(text).filter(|&(_, c, _)| c == quote).nth(1)?;
    (closing.0 == text.len() - 1).then(|| &text[1..text.len() - 1])
}

/// Split an f-string (`{expr}`) or template literal (`${expr}`) body
pub fn template_parts(body: &str, dollar: bool) -> Vec<TemplatePart> {
    let chars: Vec<char> = body.chars().collect();
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut k = 0;

    while k < chars.len() {
        let ch = chars[k];
        let opens = if dollar {
            ch == '$' && chars.get(k + 1) == Some(&'{')
        } else {
            ch == '{' && chars.get(k + 1) != Some(&'{')
        };

        if !dollar && ch == '{' && chars.get(k + 1) == Some(&'{') {
            text.push('{');
            k += 2;
            continue;
        }
        if !dollar && ch == '}' && chars.get(k + 1) == Some(&'}') {
            text.push('}');
            k += 2;
            continue;
        }

        if opens {
            let start = if dollar { k + 2 } else { k + 1 };
            if let Some(len) = chars[start..].iter().position(|&c| c == '}') {
                if !text.is_empty() {
                    parts.push(TemplatePart::Text(std::mem::take(&mut text)));
                }
                let expr: String = chars[start..start + len].iter().collect();
                parts.push(TemplatePart::Expr(expr.trim().to_string()));
                k = start + len + 1;
                continue;
            }
        }

        text.push(ch);
        k += 1;
    }

    if !text.is_empty() {
        parts.push(TemplatePart::Text(text));
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("x + 2 * (y - 1.5)");
        let tokens: Vec<Token> = lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|l| l.token)
            .collect();

        assert_eq!(tokens[0], Token::Ident("x".to_string()));
        assert_eq!(tokens[1], Token::Plus);
        assert_eq!(tokens[2], Token::IntLiteral(2));
        assert_eq!(tokens[3], Token::Star);
        assert_eq!(tokens[4], Token::LParen);
        assert_eq!(tokens[7], Token::FloatLiteral(1.5));
        assert_eq!(tokens[8], Token::RParen);
        assert_eq!(tokens[9], Token::Eof);
    }

    #[test]
    fn test_operators() {
        let mut lexer = Lexer::new("== != <= >= && || ! &");
        let tokens: Vec<Token> = lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|l| l.token)
            .collect();

        assert_eq!(
            tokens,
            vec![
                Token::EqEq,
                Token::NotEq,
                Token::Le,
                Token::Ge,
                Token::AndAnd,
                Token::OrOr,
                Token::Bang,
                Token::Amp,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_literals() {
        let mut lexer = Lexer::new(r#""hi\n" 'a' 'abc' 2.5f 10L"#);
        let tokens: Vec<Token> = lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|l| l.token)
            .collect();

        assert_eq!(tokens[0], Token::StringLiteral("hi\n".to_string()));
        assert_eq!(tokens[1], Token::CharLiteral('a'));
        assert_eq!(tokens[2], Token::StringLiteral("abc".to_string()));
        assert_eq!(tokens[3], Token::FloatLiteral(2.5));
        assert_eq!(tokens[4], Token::IntLiteral(10));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("\"abc").tokenize().unwrap_err();
        assert!(err.message.contains("Unterminated"));
        assert_eq!(err.column, 1);
    }

    #[test]
    fn test_strip_comment_keeps_strings() {
        let line = r#"printf("a // b"); // trailing"#;
        assert_eq!(strip_comment(line, Dialect::C).trim(), r#"printf("a // b");"#);
        assert_eq!(strip_comment("x = 1  # note", Dialect::Python).trim(), "x = 1");
        assert_eq!(strip_comment("#include <stdio.h>", Dialect::C), "");
    }

    #[test]
    fn test_identifiers_skip_literals_and_members() {
        let names: Vec<String> = identifiers(r#"printf("Age %d", age + 2); console.log(x)"#)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["printf", "age", "console", "x"]);

        let with_col = identifiers("int y = z;");
        assert_eq!(with_col[2], ("z".to_string(), 9));
    }

    #[test]
    fn test_split_top_level() {
        let parts = split_top_level(r#""a, b", f(x, y), z"#, ',');
        assert_eq!(parts, vec![r#""a, b""#, "f(x, y)", "z"]);
        assert!(split_top_level("  ", ',').is_empty());
    }

    #[test]
    fn test_matching_paren_and_keyword() {
        let line = r#"if (f(a) > 0) printf(")"); else x = 1;"#;
        assert_eq!(matching_paren(line, 3), Some(12));
        assert_eq!(find_keyword(line, "else"), Some(27));
        assert_eq!(find_keyword("elsewhere = 1", "else"), None);
    }

    #[test]
    fn test_find_keyword_with_non_ascii_text() {
        assert_eq!(find_keyword(r#"printf("aé");"#, "else"), None);
        assert_eq!(find_keyword("x = 1; /* é */ else", "else"), Some(16));
        assert_eq!(find_keyword(r#"puts("ééé"); else y = 2;"#, "else"), Some(16));
    }

    #[test]
    fn test_literal_body() {
        assert_eq!(literal_body(r#""Age: %d\n""#), Some(r"Age: %d\n"));
        assert_eq!(literal_body(r#""a" + "b""#), None);
        assert_eq!(literal_body("age"), None);
    }

    #[test]
    fn test_template_parts() {
        assert_eq!(
            template_parts("Age: {age + 1}{{x}}", false),
            vec![
                TemplatePart::Text("Age: ".to_string()),
                TemplatePart::Expr("age + 1".to_string()),
                TemplatePart::Text("{x}".to_string()),
            ]
        );
        assert_eq!(
            template_parts("n=${n}!", true),
            vec![
                TemplatePart::Text("n=".to_string()),
                TemplatePart::Expr("n".to_string()),
                TemplatePart::Text("!".to_string()),
            ]
        );
    }
}
