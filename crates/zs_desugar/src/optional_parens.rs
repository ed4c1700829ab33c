//! Juxtaposition calls: `greet "World"` → `greet("World")`.
//!
//! The rewrite only fires in call position: the callee must start an
//! expression (line start, after an opening bracket, separator, operator,
//! or one of the keywords in [`keywords::CALL_POSITION`]) and the argument
//! must end one (line end, `;`, `,`, or a closing bracket). Two plain
//! words in the middle of an expression are left as they are.

use zs_ast::keywords;
use zs_lexer::{tokenize, Token, TokenKind};

use crate::error::Result;
use crate::rewrite::{apply_edits, matching_close, prev_code, Edit};

pub(crate) const NAME: &str = "parens";

/// Punctuation after which an expression may begin.
const EXPRESSION_PREFIX: &[&str] = &[
    "{", "}", ";", "(", "[", ",", "=", "=>", "?", "&&", "||", "??", "!", "+", "-", "*", "/", "%",
    "==", "===", "!=", "!==", "+=", "-=",
];

pub fn rewrite_optional_parens(source: &str) -> Result<String> {
    Ok(apply_edits(source, collect_edits(source)?))
}

/// Edits against `source` that perform this rewrite.
pub(crate) fn collect_edits(source: &str) -> Result<Vec<Edit>> {
    let toks = tokenize(source)?;
    let mut edits = Vec::new();

    let mut i = 0;
    while i < toks.len() {
        match juxtaposed_call(&toks, i) {
            Some(call) => {
                edits.push(Edit::replace(toks[call.gap].span, "("));
                edits.push(Edit::insert(toks[call.arg_end].span.end, ")"));
                i = call.arg_end + 1;
            }
            None => i += 1,
        }
    }

    Ok(edits)
}

struct Call {
    /// The whitespace token between callee and argument.
    gap: usize,
    arg_end: usize,
}

fn juxtaposed_call(toks: &[Token], i: usize) -> Option<Call> {
    if !toks[i].is_plain_ident() || !in_call_position(toks, i) {
        return None;
    }
    let callee_end = member_path_end(toks, i);
    let gap = callee_end + 1;
    if toks.get(gap)?.kind != TokenKind::Whitespace {
        return None;
    }
    let arg = gap + 1;
    let arg_end = argument_end(toks, arg)?;
    ends_expression(toks, arg_end).then_some(Call { gap, arg_end })
}

fn in_call_position(toks: &[Token], i: usize) -> bool {
    let Some(p) = prev_code(toks, i) else {
        return true;
    };
    let prev = &toks[p];
    match prev.kind {
        TokenKind::Newline => true,
        TokenKind::Punct => EXPRESSION_PREFIX.contains(&prev.text),
        TokenKind::Ident => keywords::is_call_position_keyword(prev.text),
        _ => false,
    }
}

/// Last token of `a.b?.c` starting at `i`, with no spaces in between.
fn member_path_end(toks: &[Token], mut i: usize) -> usize {
    while let (Some(dot), Some(name)) = (toks.get(i + 1), toks.get(i + 2)) {
        if (dot.is_punct(".") || dot.is_punct("?.")) && name.kind == TokenKind::Ident {
            i += 2;
        } else {
            break;
        }
    }
    i
}

/// Last token of a single argument starting at `arg`.
fn argument_end(toks: &[Token], arg: usize) -> Option<usize> {
    let tok = toks.get(arg)?;
    match tok.kind {
        TokenKind::Number => Some(arg),
        TokenKind::Ident if tok.is_plain_ident() || keywords::is_value_word(tok.text) => {
            Some(postfix_end(toks, arg))
        }
        TokenKind::Str => Some(postfix_end(toks, arg)),
        TokenKind::Punct if tok.is_punct("[") => {
            let close = matching_close(toks, arg)?;
            Some(postfix_end(toks, close))
        }
        TokenKind::Punct if tok.is_punct("{") => matching_close(toks, arg),
        _ => None,
    }
}

/// Extend `end` over adjacent member accesses, calls and index operations.
fn postfix_end(toks: &[Token], mut end: usize) -> usize {
    loop {
        let Some(next) = toks.get(end + 1) else {
            return end;
        };
        if (next.is_punct(".") || next.is_punct("?."))
            && toks.get(end + 2).is_some_and(|t| t.kind == TokenKind::Ident)
        {
            end += 2;
        } else if next.is_punct("(") || next.is_punct("[") {
            match matching_close(toks, end + 1) {
                Some(close) => end = close,
                None => return end,
            }
        } else {
            return end;
        }
    }
}

/// Whether the argument ending at `end` also ends its expression.
fn ends_expression(toks: &[Token], end: usize) -> bool {
    let Some(next) = toks[end + 1..].iter().find(|t| !t.is_trivia()) else {
        return true;
    };
    next.is_newline() || next.is_closer() || next.is_punct(";") || next.is_punct(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parens(src: &str) -> String {
        rewrite_optional_parens(src).unwrap()
    }

    #[test]
    fn single_argument_forms() {
        assert_eq!(parens("greet \"World\""), "greet(\"World\")");
        assert_eq!(parens("double 21"), "double(21)");
        assert_eq!(parens("show name"), "show(name)");
        assert_eq!(parens("sum [1, 2]"), "sum([1, 2])");
        assert_eq!(parens("save { id: 1 }"), "save({ id: 1 })");
    }

    #[test]
    fn dotted_callee_and_postfix_argument() {
        assert_eq!(parens("console.log user.name"), "console.log(user.name)");
        assert_eq!(parens("print items[0]"), "print(items[0])");
        assert_eq!(parens("show format(x)"), "show(format(x))");
    }

    #[test]
    fn call_position_after_keywords_and_operators() {
        assert_eq!(parens("return double x"), "return double(x)");
        assert_eq!(parens("const y = inc 1;"), "const y = inc(1);");
        assert_eq!(parens("f(a, wrap b)"), "f(a, wrap(b))");
    }

    #[test]
    fn keywords_and_declarations_untouched() {
        let src = "const x = 1\nlet y\nreturn value\nimport a from \"b\"\nnew Foo\ntypeof x\nx as T\nexport default thing\nawait task";
        assert_eq!(parens(src), src);
    }

    #[test]
    fn mid_expression_words_untouched() {
        let src = "const a = b c d\nfoo bar + 1\nfor (const k of keys) {}";
        assert_eq!(parens(src), src);
    }

    #[test]
    fn opaque_spans_untouched() {
        let src = "const s = \"greet world\"; // greet world\nhtml `x`";
        assert_eq!(parens(src), src);
    }
}
