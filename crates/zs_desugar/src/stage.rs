//! The fixed stage order.
//!
//! Later stages depend on the text earlier ones produce:
//! - Match before Atom, so `:tag` patterns are consumed as arms.
//! - SimplifiedIf before OptionalParens, so `if cond {` is not read as a call.
//! - Impl before OptionalReturn, so `impl` methods get implicit returns.
//! - OptionalReturn last, so tail expressions are already TypeScript.

use zs_ast::ZsSyntax;

use crate::error::Result;
use crate::rewrite::{apply_edits, Edit};
use crate::{
    atom, impls, let_binding, match_expr, optional_parens, optional_return, pipeline, simplified_if,
    structs, traits,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Struct,
    Trait,
    Impl,
    Let,
    Pipe,
    Match,
    Atom,
    SimplifiedIf,
    OptionalParens,
    OptionalReturn,
}

impl Stage {
    pub const ORDER: [Stage; 10] = [
        Stage::Struct,
        Stage::Trait,
        Stage::Impl,
        Stage::Let,
        Stage::Pipe,
        Stage::Match,
        Stage::Atom,
        Stage::SimplifiedIf,
        Stage::OptionalParens,
        Stage::OptionalReturn,
    ];

    /// Name used in logs and in `SyntaxError::stage`.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Struct => structs::NAME,
            Stage::Trait => traits::NAME,
            Stage::Impl => impls::NAME,
            Stage::Let => let_binding::NAME,
            Stage::Pipe => pipeline::NAME,
            Stage::Match => match_expr::NAME,
            Stage::Atom => atom::NAME,
            Stage::SimplifiedIf => simplified_if::NAME,
            Stage::OptionalParens => optional_parens::NAME,
            Stage::OptionalReturn => optional_return::NAME,
        }
    }

    pub fn is_enabled(self, syntax: &ZsSyntax) -> bool {
        match self {
            Stage::Struct => syntax.structs,
            Stage::Trait => syntax.traits,
            Stage::Impl => syntax.impls,
            Stage::Let => syntax.let_bindings,
            Stage::Pipe => syntax.pipes,
            Stage::Match => syntax.matches,
            Stage::Atom => syntax.atoms,
            Stage::SimplifiedIf => syntax.simplified_if,
            Stage::OptionalParens => syntax.optional_parens,
            Stage::OptionalReturn => syntax.optional_return,
        }
    }

    /// Run this stage alone over `source`.
    pub fn run(self, source: &str) -> Result<String> {
        Ok(apply_edits(source, self.collect_edits(source)?))
    }

    pub(crate) fn collect_edits(self, source: &str) -> Result<Vec<Edit>> {
        match self {
            Stage::Struct => structs::collect_edits(source),
            Stage::Trait => traits::collect_edits(source),
            Stage::Impl => impls::collect_edits(source),
            Stage::Let => let_binding::collect_edits(source),
            Stage::Pipe => pipeline::collect_edits(source),
            Stage::Match => match_expr::collect_edits(source),
            Stage::Atom => atom::collect_edits(source),
            Stage::SimplifiedIf => simplified_if::collect_edits(source),
            Stage::OptionalParens => optional_parens::collect_edits(source),
            Stage::OptionalReturn => optional_return::collect_edits(source),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
