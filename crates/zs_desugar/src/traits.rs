//! `trait Name<G> [extends …] {` → `interface Name<G> [extends …] {`.
//!
//! Only the keyword changes; the body is already interface-member syntax.

use zs_lexer::{tokenize, Token, TokenKind};

use crate::error::Result;
use crate::rewrite::{
    apply_edits, at_statement_start, follows_dot, matching_angle, matching_close, next_sig, Edit,
};

pub(crate) const NAME: &str = "trait";

pub fn rewrite_traits(source: &str) -> Result<String> {
    Ok(apply_edits(source, collect_edits(source)?))
}

/// Edits against `source` that perform this rewrite.
pub(crate) fn collect_edits(source: &str) -> Result<Vec<Edit>> {
    let toks = tokenize(source)?;
    let mut edits = Vec::new();

    for i in 0..toks.len() {
        if toks[i].is_ident("trait")
            && !follows_dot(&toks, i)
            && at_statement_start(&toks, i)
            && has_interface_header(&toks, i)
        {
            edits.push(Edit::replace(toks[i].span, "interface"));
        }
    }

    Ok(edits)
}

/// `trait` at `kw` is followed by a name, optional generics, an optional
/// `extends` list, then `{`.
fn has_interface_header(toks: &[Token], kw: usize) -> bool {
    let Some(name) = next_sig(toks, kw).filter(|&n| toks[n].is_plain_ident()) else {
        return false;
    };
    let mut cur = next_sig(toks, name);
    if let Some(lt) = cur.filter(|&c| toks[c].is_punct("<")) {
        let Some(gt) = matching_angle(toks, lt) else {
            return false;
        };
        cur = next_sig(toks, gt);
    }
    if let Some(ext) = cur.filter(|&c| toks[c].is_ident("extends")) {
        cur = next_sig(toks, ext);
        // Supertypes: dotted names with optional generic arguments.
        while let Some(c) = cur {
            let tok = &toks[c];
            if tok.is_punct("{") {
                break;
            }
            if tok.is_punct("<") {
                let Some(gt) = matching_angle(toks, c) else {
                    return false;
                };
                cur = next_sig(toks, gt);
            } else if tok.kind == TokenKind::Ident || tok.is_punct(",") || tok.is_punct(".") {
                cur = next_sig(toks, c);
            } else {
                return false;
            }
        }
    }
    cur.is_some_and(|open| toks[open].is_punct("{") && matching_close(toks, open).is_some())
}
