//! `if cond {` → `if (cond) {`.
//!
//! Conditions that are already one parenthesized group are left alone.

use zs_lexer::{tokenize, Token};

use crate::error::Result;
use crate::rewrite::{apply_edits, continues, follows_dot, matching_close, next_sig, Edit};

pub(crate) const NAME: &str = "if";

pub fn rewrite_simplified_if(source: &str) -> Result<String> {
    Ok(apply_edits(source, collect_edits(source)?))
}

/// Edits against `source` that perform this rewrite.
pub(crate) fn collect_edits(source: &str) -> Result<Vec<Edit>> {
    let toks = tokenize(source)?;
    let mut edits = Vec::new();

    for i in 0..toks.len() {
        if !toks[i].is_ident("if") || follows_dot(&toks, i) {
            continue;
        }
        let Some((first, last)) = bare_condition(&toks, i) else {
            continue;
        };
        edits.push(Edit::insert(toks[first].span.start, "("));
        edits.push(Edit::insert(toks[last].span.end, ")"));
    }

    Ok(edits)
}

/// First and last token of an unparenthesized condition after `if`.
fn bare_condition(toks: &[Token], kw: usize) -> Option<(usize, usize)> {
    let first = next_sig(toks, kw)?;
    if toks[first].is_punct("(") {
        let close = matching_close(toks, first)?;
        if next_sig(toks, close).is_some_and(|n| toks[n].is_punct("{")) {
            return None;
        }
    }

    let mut last = None;
    let mut i = first;
    while i < toks.len() {
        let tok = &toks[i];
        if tok.is_punct("{") {
            return last.map(|l| (first, l));
        }
        if tok.is_opener() {
            let close = matching_close(toks, i)?;
            last = Some(close);
            i = close + 1;
            continue;
        }
        if tok.is_closer() || tok.is_punct(";") || tok.is_punct("=") || tok.is_punct("=>") {
            return None;
        }
        if tok.is_newline() && !continues(toks, i) {
            return None;
        }
        if tok.is_significant() {
            last = Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_condition_is_wrapped() {
        assert_eq!(
            rewrite_simplified_if("if x > 5 {\n  go()\n}").unwrap(),
            "if (x > 5) {\n  go()\n}"
        );
    }

    #[test]
    fn else_if_and_calls_in_condition() {
        assert_eq!(
            rewrite_simplified_if("if ok(a) { } else if a.b && (c || d) { }").unwrap(),
            "if (ok(a)) { } else if (a.b && (c || d)) { }"
        );
    }

    #[test]
    fn parenthesized_condition_not_doubled() {
        let src = "if (x) { y }";
        assert_eq!(rewrite_simplified_if(src).unwrap(), src);
        assert_eq!(
            rewrite_simplified_if("if (a) && b { }").unwrap(),
            "if ((a) && b) { }"
        );
    }

    #[test]
    fn longer_identifiers_and_opaque_spans_untouched() {
        let src = "const iffy = 1; obj.if = 2; // if x {\nconst s = \"if y {\"";
        assert_eq!(rewrite_simplified_if(src).unwrap(), src);
    }
}
