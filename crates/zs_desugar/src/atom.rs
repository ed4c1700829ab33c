//! Atoms: `:name` → `Symbol.for("name")`.

use zs_ast::{atom_literal, Span};
use zs_lexer::tokenize;

use crate::error::Result;
use crate::rewrite::{apply_edits, is_atom_start, Edit};

pub(crate) const NAME: &str = "atom";

pub fn rewrite_atoms(source: &str) -> Result<String> {
    Ok(apply_edits(source, collect_edits(source)?))
}

/// Edits against `source` that perform this rewrite.
pub(crate) fn collect_edits(source: &str) -> Result<Vec<Edit>> {
    let toks = tokenize(source)?;
    let edits = (0..toks.len())
        .filter(|&i| is_atom_start(&toks, i))
        .map(|i| {
            let name = &toks[i + 1];
            Edit::replace(
                Span::new(toks[i].span.start, name.span.end),
                atom_literal(name.text),
            )
        })
        .collect();
    Ok(edits)
}
