//! A deliberately small lexer for class-declaration extraction.
//!
//! It only distinguishes what the extractor needs: declaration keywords,
//! identifiers, whitespace runs, and the constructs that must never yield a
//! declaration (comments, string literals, variables). Everything else is a
//! one-character `Other` token. Heredocs are not recognized.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Class,
    Extends,
    Implements,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("class") {
            Some(Self::Class)
        } else if word.eq_ignore_ascii_case("extends") {
            Some(Self::Extends)
        } else if word.eq_ignore_ascii_case("implements") {
            Some(Self::Implements)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    Whitespace,
    Comment,
    Variable,
    String,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn bump_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        let len = self
            .rest()
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(self.rest().len(), |(i, _)| i);
        self.pos += len;
    }

    fn bump_until(&mut self, terminator: &str, inclusive: bool) {
        match self.rest().find(terminator) {
            Some(i) if inclusive => self.pos += i + terminator.len(),
            Some(i) => self.pos += i,
            None => self.pos = self.source.len(),
        }
    }

    fn bump_string(&mut self, quote: char) {
        let mut escaped = false;
        let mut end = self.source.len();
        for (i, c) in self.rest().char_indices().skip(1) {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                end = self.pos + i + c.len_utf8();
                break;
            }
        }
        self.pos = end;
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let start = self.pos;
        let mut chars = self.rest().chars();
        let first = chars.next()?;
        let second = chars.next();

        let kind = if first.is_whitespace() {
            self.bump_while(char::is_whitespace);
            TokenKind::Whitespace
        } else if first == '/' && second == Some('/') || first == '#' && second != Some('[') {
            self.bump_until("\n", false);
            TokenKind::Comment
        } else if first == '/' && second == Some('*') {
            self.pos += 2;
            self.bump_until("*/", true);
            TokenKind::Comment
        } else if first == '\'' || first == '"' {
            self.bump_string(first);
            TokenKind::String
        } else if first == '$' && second.is_some_and(is_ident_start) {
            self.pos += 1;
            self.bump_while(is_ident_continue);
            TokenKind::Variable
        } else if is_ident_start(first) {
            self.bump_while(is_ident_continue);
            match Keyword::from_word(&self.source[start..self.pos]) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Identifier,
            }
        } else {
            self.pos += first.len_utf8();
            TokenKind::Other
        };

        Some(Token {
            kind,
            text: &self.source[start..self.pos],
        })
    }
}

pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    Lexer::new(source).collect()
}
