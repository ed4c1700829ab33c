//! Span edits and token navigation shared by the stages.
//!
//! A stage tokenizes its input, collects `Edit`s against byte spans of
//! that input, and `apply_edits` splices them in one pass. Edits never
//! touch the inside of an opaque token; every helper here moves over whole
//! tokens.

use zs_ast::{keywords, Span};
use zs_lexer::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Edit {
    pub span: Span,
    pub text: String,
}

impl Edit {
    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::replace(Span::point(offset), text)
    }
}

/// Splice `edits` into `source`. Edits are ordered by position; inserts at
/// the same offset keep the order they were pushed in. An edit overlapping
/// an earlier one is dropped.
pub(crate) fn apply_edits(source: &str, edits: Vec<Edit>) -> String {
    splice(source, edits).0
}

/// [`apply_edits`], also returning the edits that were applied, in order.
pub(crate) fn splice(source: &str, mut edits: Vec<Edit>) -> (String, Vec<Edit>) {
    if edits.is_empty() {
        return (source.to_string(), edits);
    }
    edits.sort_by_key(|e| (e.span.start, e.span.end));

    let extra: usize = edits.iter().map(|e| e.text.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    let mut applied = Vec::with_capacity(edits.len());
    let mut cursor = 0;
    for edit in edits {
        if edit.span.start < cursor {
            continue;
        }
        out.push_str(&source[cursor..edit.span.start]);
        out.push_str(&edit.text);
        cursor = edit.span.end;
        applied.push(edit);
    }
    out.push_str(&source[cursor..]);
    (out, applied)
}

/// Map `offset` in the output of [`splice`] back to its input. An offset
/// inside inserted text maps to the start of the span that text replaced.
pub(crate) fn origin_offset(applied: &[Edit], offset: usize) -> usize {
    let mut shift = 0isize;
    for edit in applied {
        let out_start = edit.span.start.saturating_add_signed(shift);
        if offset < out_start {
            break;
        }
        if offset < out_start + edit.text.len() {
            return edit.span.start;
        }
        shift += edit.text.len() as isize - edit.span.len() as isize;
    }
    offset.saturating_add_signed(-shift)
}

/// First significant token at or after `from`.
pub(crate) fn sig_from(toks: &[Token], from: usize) -> Option<usize> {
    (from..toks.len()).find(|&i| toks[i].is_significant())
}

/// First significant token after `i`.
pub(crate) fn next_sig(toks: &[Token], i: usize) -> Option<usize> {
    sig_from(toks, i + 1)
}

/// Last significant token before `i`.
pub(crate) fn prev_sig(toks: &[Token], i: usize) -> Option<usize> {
    (0..i.min(toks.len())).rev().find(|&j| toks[j].is_significant())
}

/// Last token before `i` that is not whitespace or a comment. Line breaks
/// are returned.
pub(crate) fn prev_code(toks: &[Token], i: usize) -> Option<usize> {
    (0..i.min(toks.len())).rev().find(|&j| !toks[j].is_trivia())
}

/// Index of the closer matching the opener at `open`.
pub(crate) fn matching_close(toks: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in toks.iter().enumerate().skip(open) {
        if tok.is_opener() {
            depth += 1;
        } else if tok.is_closer() {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Index of the opener matching the closer at `close`.
pub(crate) fn matching_open(toks: &[Token], close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..=close).rev() {
        let tok = &toks[i];
        if tok.is_closer() {
            depth += 1;
        } else if tok.is_opener() {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Index of the `>` closing the generic list opened at `open`. Bracket
/// groups inside the list are skipped whole; a `;` aborts.
pub(crate) fn matching_angle(toks: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < toks.len() {
        let tok = &toks[i];
        if tok.is_punct("<") {
            depth += 1;
        } else if tok.is_punct(">") {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        } else if tok.is_opener() {
            i = matching_close(toks, i)?;
        } else if tok.is_closer() || tok.is_punct(";") {
            return None;
        }
        i += 1;
    }
    None
}

/// Operators that leave an expression unfinished at the end of a line.
const TRAILING_OPERATORS: &[&str] = &[
    "|>", "=", "=>", "+", "-", "*", "/", "%", "**", "&&", "||", "??", "?", ",", "==", "===",
    "!=", "!==", "&", "|", "^", ".", "?.", "+=", "-=", "*=", "/=", "%=", "**=", "&&=", "||=",
    "??=", "&=", "|=", "^=",
];

/// Operators that continue the previous line when they start a line.
const LEADING_OPERATORS: &[&str] = &[
    "|>", ".", "?.", "&&", "||", "??", "?", "==", "===", "!=", "!==",
];

/// Whether the line break at `nl` sits inside a statement rather than
/// ending it.
pub(crate) fn continues(toks: &[Token], nl: usize) -> bool {
    let trailing = prev_sig(toks, nl).is_some_and(|p| {
        toks[p].kind == TokenKind::Punct && TRAILING_OPERATORS.contains(&toks[p].text)
    });
    if trailing {
        return true;
    }
    next_sig(toks, nl).is_some_and(|n| {
        let tok = &toks[n];
        tok.kind == TokenKind::Punct
            && (LEADING_OPERATORS.contains(&tok.text) || (tok.text == ":" && !is_atom_start(toks, n)))
    })
}

/// End (exclusive token index) of the statement running from `from`: the
/// first depth-0 `;`, unmatched closer, or line break that does not
/// continue, bounded by `hi`.
pub(crate) fn statement_end(toks: &[Token], from: usize, hi: usize) -> usize {
    let mut depth = 0usize;
    for i in from..hi {
        let tok = &toks[i];
        if tok.is_opener() {
            depth += 1;
        } else if tok.is_closer() {
            if depth == 0 {
                return i;
            }
            depth -= 1;
        } else if depth == 0 {
            if tok.is_punct(";") || (tok.is_newline() && !continues(toks, i)) {
                return i;
            }
        }
    }
    hi
}

/// Words after which an atom may start an expression.
fn introduces_expression(word: &str) -> bool {
    keywords::is_call_position_keyword(word)
        || matches!(word, "case" | "in" | "of" | "typeof" | "void" | "delete" | "instanceof")
}

/// Whether the `:` at `i` begins an atom literal `:name` rather than a
/// type annotation, object key separator or ternary branch.
pub(crate) fn is_atom_start(toks: &[Token], i: usize) -> bool {
    let Some(tok) = toks.get(i) else {
        return false;
    };
    if !tok.is_punct(":") || !toks.get(i + 1).is_some_and(|n| n.kind == TokenKind::Ident) {
        return false;
    }
    // `a?:T` optional member
    if i > 0 && toks[i - 1].is_punct("?") {
        return false;
    }
    match prev_code(toks, i) {
        None => true,
        Some(p) => {
            let prev = &toks[p];
            match prev.kind {
                TokenKind::Newline => true,
                TokenKind::Punct => !prev.ends_operand(),
                TokenKind::Ident => introduces_expression(prev.text),
                _ => false,
            }
        }
    }
}

/// If a match-arm pattern (`_` or `:tag`) followed by `=>` starts at `i`,
/// the index of that `=>`.
pub(crate) fn arm_pattern_at(toks: &[Token], i: usize) -> Option<usize> {
    let tok = toks.get(i)?;
    let last = if tok.is_ident("_") {
        i
    } else if tok.is_punct(":") && toks.get(i + 1)?.kind == TokenKind::Ident {
        i + 1
    } else {
        return None;
    };
    next_sig(toks, last).filter(|&a| toks[a].is_punct("=>"))
}

/// Leading horizontal whitespace of the line containing `offset`.
pub(crate) fn line_indent(source: &str, offset: usize) -> &str {
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let rest = &source[line_start..];
    let width = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    &rest[..width]
}

/// Whether the token at `i` is a member name (`x.if`, `x?.match`).
pub(crate) fn follows_dot(toks: &[Token], i: usize) -> bool {
    prev_sig(toks, i).is_some_and(|p| toks[p].is_punct(".") || toks[p].is_punct("?."))
}

/// Whether the token at `i` begins a statement.
pub(crate) fn at_statement_start(toks: &[Token], i: usize) -> bool {
    match prev_code(toks, i) {
        None => true,
        Some(p) => {
            let prev = &toks[p];
            prev.is_newline()
                || prev.is_punct(";")
                || prev.is_punct("{")
                || prev.is_punct("}")
                || prev.is_ident("export")
        }
    }
}

/// Source text covered by tokens `from..to`.
pub(crate) fn slice<'a>(source: &'a str, toks: &[Token], from: usize, to: usize) -> &'a str {
    if from >= to {
        return "";
    }
    &source[toks[from].span.start..toks[to - 1].span.end]
}
