//! Reserved-word tables shared by every stage.
//!
//! Kept in one place so the simplified-if, optional-parens, pipe and atom
//! rules agree on which identifiers are keywords.

/// Words that never act as a juxtaposition callee or argument.
pub const RESERVED: &[&str] = &[
    // zenoscript surface keywords
    "let", "match", "struct", "trait",
    // statements
    "if", "else", "for", "while", "do", "switch", "case", "default", "break", "continue",
    "return", "throw", "try", "catch", "finally", "debugger", "with",
    // declarations
    "const", "var", "function", "class", "type", "interface", "enum", "namespace", "module",
    "declare", "global", "import", "export", "from",
    // operators spelled as words
    "new", "delete", "typeof", "void", "instanceof", "in", "of", "as", "is", "satisfies",
    "keyof", "infer", "asserts", "unique", "await", "yield", "async",
    // modifiers
    "extends", "implements", "public", "private", "protected", "static", "readonly",
    "abstract", "override", "accessor", "get", "set",
    // literals
    "true", "false", "null", "undefined", "this", "super",
];

/// Keywords after which an expression (and therefore a call) may begin.
pub const CALL_POSITION: &[&str] = &["return", "throw", "await", "yield", "else", "do"];

/// Reserved words that still denote values, so they can end an operand.
pub const VALUE_WORDS: &[&str] = &["true", "false", "null", "undefined", "this", "super"];

/// Keywords that end the value side of a pipe chain when scanning left.
pub const CHAIN_BOUNDARY: &[&str] = &[
    "return", "throw", "yield", "case", "else", "do", "const", "let", "var", "export",
    "default", "in", "of", "if", "while", "for", "switch", "match",
];

/// Leading keywords of tail statements that cannot take an implicit `return`.
pub const NON_EXPRESSION_STATEMENT: &[&str] = &[
    "return", "if", "else", "for", "while", "do", "switch", "try", "throw", "const", "let",
    "var", "function", "class", "break", "continue", "type", "interface", "enum", "import",
    "export", "debugger", "yield", "async", "declare", "namespace",
];

pub fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

pub fn is_call_position_keyword(word: &str) -> bool {
    CALL_POSITION.contains(&word)
}

pub fn is_value_word(word: &str) -> bool {
    VALUE_WORDS.contains(&word)
}

pub fn is_chain_boundary(word: &str) -> bool {
    CHAIN_BOUNDARY.contains(&word)
}

pub fn is_non_expression_statement(word: &str) -> bool {
    NON_EXPRESSION_STATEMENT.contains(&word)
}
