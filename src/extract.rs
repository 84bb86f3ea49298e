use crate::lexer::{Keyword, Lexer, Token, TokenKind};

/// Returns the class names declared in `source`, in order of appearance.
///
/// A declaration is the `class` keyword, exactly one whitespace token, then an
/// identifier. Namespaces are not resolved, and interfaces, traits and enums
/// are not declarations. `class /* note */ Foo` is missed on purpose.
pub fn extract_class_names(source: &str) -> Vec<String> {
    let tokens: Vec<Token<'_>> = Lexer::new(source).collect();

    tokens
        .windows(3)
        .filter_map(|w| match (w[0].kind, w[1].kind, w[2].kind) {
            (TokenKind::Keyword(Keyword::Class), TokenKind::Whitespace, TokenKind::Identifier) => {
                Some(w[2].text.to_string())
            }
            _ => None,
        })
        .collect()
}

/// Lossily decodes file bytes before extraction; invalid UTF-8 never fails.
pub fn extract_class_names_from_bytes(bytes: &[u8]) -> Vec<String> {
    extract_class_names(&String::from_utf8_lossy(bytes))
}
