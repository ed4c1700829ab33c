//! Implicit `return` for the tail expression of a function body.
//!
//! Applies to `function` bodies, `=>` block bodies and class method
//! bodies. The last statement gets a `return ` prefix unless it is a
//! declaration or control-flow statement, a block, already contains a
//! `return`, or reads like a type member (`name: T`). Bodies declared to
//! return `void`, `Promise<void>` or `never` are left alone, as are
//! generators, constructors and setters. Runs last, so tail pipes, matches
//! and atoms are already plain TypeScript.

use zs_ast::keywords;
use zs_lexer::{tokenize, Token, TokenKind};

use crate::error::Result;
use crate::rewrite::{
    apply_edits, follows_dot, matching_angle, matching_close, matching_open, next_sig, prev_sig,
    sig_from, statement_end, Edit,
};

pub(crate) const NAME: &str = "return";

/// Class member modifiers that may precede a method name.
const MEMBER_MODIFIERS: &[&str] = &[
    "static", "async", "public", "private", "protected", "override", "readonly", "declare",
    "abstract", "accessor", "get", "set",
];

pub fn rewrite_optional_return(source: &str) -> Result<String> {
    Ok(apply_edits(source, collect_edits(source)?))
}

/// Edits against `source` that perform this rewrite.
pub(crate) fn collect_edits(source: &str) -> Result<Vec<Edit>> {
    let toks = tokenize(source)?;
    let mut bodies = Vec::new();

    for i in 0..toks.len() {
        if toks[i].is_punct("=>") {
            let body = next_sig(&toks, i).filter(|&b| toks[b].is_punct("{"));
            if !arrow_returns_nothing(&toks, i) {
                bodies.extend(body);
            }
        } else if toks[i].is_ident("function") && !follows_dot(&toks, i) {
            bodies.extend(function_body(&toks, i));
        } else if toks[i].is_ident("class") && !follows_dot(&toks, i) {
            bodies.extend(method_bodies(&toks, i));
        }
    }

    let mut edits = Vec::new();
    for open in bodies {
        let Some(close) = matching_close(&toks, open) else {
            continue;
        };
        if let Some(tail) = tail_expression(&toks, open, close) {
            edits.push(Edit::insert(toks[tail].span.start, "return "));
        }
    }
    Ok(edits)
}

/// Opening brace of the body of the `function` at `kw`. Generators, bodies
/// declared to return `void`, and overload signatures have none.
fn function_body(toks: &[Token], kw: usize) -> Option<usize> {
    let mut cur = next_sig(toks, kw)?;
    if toks[cur].is_punct("*") {
        return None;
    }
    if toks[cur].is_plain_ident() {
        cur = next_sig(toks, cur)?;
    }
    if toks[cur].is_punct("<") {
        cur = next_sig(toks, matching_angle(toks, cur)?)?;
    }
    if !toks[cur].is_punct("(") {
        return None;
    }
    body_after_params(toks, matching_close(toks, cur)?)
}

/// Opening brace following the parameter list closed at `params`, past an
/// optional return type.
fn body_after_params(toks: &[Token], params: usize) -> Option<usize> {
    let cur = next_sig(toks, params)?;
    if toks[cur].is_punct("{") {
        return Some(cur);
    }
    if !toks[cur].is_punct(":") {
        return None;
    }

    let type_start = next_sig(toks, cur)?;
    let mut type_text = String::new();
    let mut i = type_start;
    loop {
        let tok = toks.get(i)?;
        if tok.is_punct("{") && i > type_start && !expects_type(toks, i) {
            break;
        }
        if tok.is_punct(";") {
            return None;
        }
        let end = if tok.is_opener() {
            matching_close(toks, i)?
        } else if tok.is_punct("<") {
            matching_angle(toks, i)?
        } else {
            i
        };
        push_significant(&mut type_text, &toks[i..=end]);
        i = end + 1;
    }
    (!returns_nothing(&type_text)).then_some(i)
}

/// Whether the arrow at `arrow` is annotated `(…): void =>` or similar.
fn arrow_returns_nothing(toks: &[Token], arrow: usize) -> bool {
    let Some(end) = prev_sig(toks, arrow) else {
        return false;
    };
    let mut i = end;
    loop {
        let tok = &toks[i];
        if tok.is_punct(":") {
            let annotated = prev_sig(toks, i).is_some_and(|p| toks[p].is_punct(")"));
            let mut type_text = String::new();
            push_significant(&mut type_text, &toks[i + 1..=end]);
            return annotated && returns_nothing(&type_text);
        }
        if tok.is_closer() {
            // `(x) =>` without a return type
            if i == end && tok.is_punct(")") {
                return false;
            }
            let Some(open) = matching_open(toks, i) else {
                return false;
            };
            i = open;
        } else if tok.is_punct(">") {
            let Some(open) = matching_angle_back(toks, i) else {
                return false;
            };
            i = open;
        } else if !(tok.kind == TokenKind::Ident || tok.is_punct(".") || tok.is_punct("|")) {
            return false;
        }
        let Some(prev) = prev_sig(toks, i) else {
            return false;
        };
        i = prev;
    }
}

/// Index of the `<` opening the generic list closed at `close`.
fn matching_angle_back(toks: &[Token], close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..=close).rev() {
        if toks[i].is_punct(">") {
            depth += 1;
        } else if toks[i].is_punct("<") {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        } else if toks[i].is_punct(";") || toks[i].is_punct("{") {
            return None;
        }
    }
    None
}

fn returns_nothing(type_text: &str) -> bool {
    matches!(type_text, "void" | "Promise<void>" | "never")
}

fn push_significant(out: &mut String, toks: &[Token]) {
    for t in toks.iter().filter(|t| t.is_significant()) {
        out.push_str(t.text);
    }
}

/// Opening braces of the method bodies of the class declared at `kw`.
/// Constructors, setters and generators are skipped.
fn method_bodies(toks: &[Token], kw: usize) -> Vec<usize> {
    let mut bodies = Vec::new();
    let Some((open, close)) = class_body(toks, kw) else {
        return bodies;
    };

    let mut i = open + 1;
    while let Some(start) = sig_from(toks, i).filter(|&s| s < close) {
        if toks[start].is_punct(";") {
            i = start + 1;
            continue;
        }
        let mut cur = start;
        let mut setter = false;
        while toks[cur].kind == TokenKind::Ident && MEMBER_MODIFIERS.contains(&toks[cur].text) {
            let Some(next) = next_sig(toks, cur) else {
                return bodies;
            };
            // `get() { … }` is a method named `get`
            if ["(", "<", "=", ":", ";", "?", "!"].iter().any(|p| toks[next].is_punct(p)) {
                break;
            }
            setter |= toks[cur].is_ident("set");
            cur = next;
        }
        let generator = toks[cur].is_punct("*");
        if generator {
            cur = next_sig(toks, cur).unwrap_or(close);
        }
        let constructor = toks[cur].is_ident("constructor");

        match member_body(toks, cur, close) {
            Some(body) => {
                if !(setter || generator || constructor) {
                    bodies.push(body);
                }
                i = matching_close(toks, body).map_or(close, |c| c + 1);
            }
            None => i = statement_end(toks, start, close).max(start + 1),
        }
    }
    bodies
}

/// `{` and `}` of the class body after `class` at `kw`.
fn class_body(toks: &[Token], kw: usize) -> Option<(usize, usize)> {
    let mut i = next_sig(toks, kw)?;
    loop {
        let tok = toks.get(i)?;
        if tok.is_punct("{") {
            return Some((i, matching_close(toks, i)?));
        }
        if tok.is_punct(";") {
            return None;
        }
        if tok.is_punct("<") {
            i = matching_angle(toks, i)?;
        } else if tok.is_opener() {
            i = matching_close(toks, i)?;
        }
        i = next_sig(toks, i)?;
    }
}

/// Body brace of a method whose name starts at `name`, if the member is a
/// method with a body.
fn member_body(toks: &[Token], name: usize, close: usize) -> Option<usize> {
    let mut cur = name;
    if toks[cur].is_punct("#") {
        cur = next_sig(toks, cur)?;
    }
    let name_tok = &toks[cur];
    if name_tok.is_punct("[") {
        cur = matching_close(toks, cur)?;
    } else if !matches!(name_tok.kind, TokenKind::Ident | TokenKind::Str | TokenKind::Number) {
        return None;
    }
    cur = next_sig(toks, cur)?;
    if toks[cur].is_punct("?") || toks[cur].is_punct("!") {
        cur = next_sig(toks, cur)?;
    }
    if toks[cur].is_punct("<") {
        cur = next_sig(toks, matching_angle(toks, cur)?)?;
    }
    if !toks[cur].is_punct("(") {
        return None;
    }
    body_after_params(toks, matching_close(toks, cur)?).filter(|&b| b < close)
}

/// Whether a `{` at `i` inside a return type continues the type (`A | {…}`).
fn expects_type(toks: &[Token], i: usize) -> bool {
    let Some(p) = prev_sig(toks, i) else {
        return true;
    };
    ["|", "&", "=>", ",", ":", "<"].iter().any(|op| toks[p].is_punct(op))
        || toks[p].is_ident("keyof")
}

/// First token of the body's final statement when it can take a `return`.
fn tail_expression(toks: &[Token], open: usize, close: usize) -> Option<usize> {
    let mut tail = None;
    let mut i = open + 1;
    while let Some(start) = sig_from(toks, i).filter(|&s| s < close) {
        if toks[start].is_punct(";") {
            i = start + 1;
            continue;
        }
        let end = statement_end(toks, start, close);
        tail = Some((start, end));
        i = end.max(start + 1);
    }
    let (start, end) = tail?;

    let first = &toks[start];
    let declares = first.kind == TokenKind::Ident && keywords::is_non_expression_statement(first.text);
    if first.is_punct("{") || declares {
        return None;
    }

    let mut seen_question = false;
    let mut j = start;
    while j < end {
        let tok = &toks[j];
        if tok.is_opener() {
            j = matching_close(toks, j)?;
        } else if tok.is_ident("return") {
            return None;
        } else if tok.is_punct("?") {
            seen_question = true;
        } else if tok.is_punct(":") && !seen_question {
            return None;
        }
        j += 1;
    }
    Some(start)
}
