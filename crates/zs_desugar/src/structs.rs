//! `struct` declarations become object type aliases.
//!
//! ```text
//! struct User<T> { name: string; data: T; }   →   type User<T> = { name: string; data: T; };
//! struct Empty;                               →   type Empty = {};
//! ```
//!
//! The body is copied verbatim. Its extent is found by depth-tracked brace
//! matching, so nested type literals inside the body are kept whole.

use zs_lexer::tokenize;

use crate::error::{Result, SyntaxError};
use crate::rewrite::{
    apply_edits, at_statement_start, follows_dot, matching_angle, matching_close, next_sig, slice,
    Edit,
};
use zs_ast::Span;

pub(crate) const NAME: &str = "struct";

pub fn rewrite_structs(source: &str) -> Result<String> {
    Ok(apply_edits(source, collect_edits(source)?))
}

/// Edits against `source` that perform this rewrite.
pub(crate) fn collect_edits(source: &str) -> Result<Vec<Edit>> {
    let toks = tokenize(source)?;
    let mut edits = Vec::new();

    let mut i = 0;
    while i < toks.len() {
        if !toks[i].is_ident("struct") || follows_dot(&toks, i) || !at_statement_start(&toks, i) {
            i += 1;
            continue;
        }
        let Some(name) = next_sig(&toks, i).filter(|&n| toks[n].is_plain_ident()) else {
            i += 1;
            continue;
        };

        let mut header_end = name + 1;
        let mut after = next_sig(&toks, name);
        if let Some(lt) = after.filter(|&a| toks[a].is_punct("<")) {
            let Some(gt) = matching_angle(&toks, lt) else {
                i += 1;
                continue;
            };
            header_end = gt + 1;
            after = next_sig(&toks, gt);
        }
        let alias = format!(
            "type {}{} = ",
            toks[name].text,
            slice(source, &toks, name + 1, header_end).trim_start()
        );

        match after {
            Some(semi) if toks[semi].is_punct(";") => {
                let span = Span::new(toks[i].span.start, toks[semi].span.end);
                edits.push(Edit::replace(span, format!("{alias}{{}};")));
                i = semi + 1;
            }
            Some(open) if toks[open].is_punct("{") => {
                let Some(close) = matching_close(&toks, open) else {
                    return Err(SyntaxError::new(
                        NAME,
                        source,
                        toks[i].span.start,
                        format!("unterminated body of struct `{}`", toks[name].text),
                    )
                    .into());
                };
                edits.push(Edit::replace(
                    Span::new(toks[i].span.start, toks[open].span.start),
                    alias,
                ));
                let terminated = next_sig(&toks, close).is_some_and(|n| toks[n].is_punct(";"));
                if !terminated {
                    edits.push(Edit::insert(toks[close].span.end, ";"));
                }
                i = close + 1;
            }
            _ => i += 1,
        }
    }

    Ok(edits)
}
