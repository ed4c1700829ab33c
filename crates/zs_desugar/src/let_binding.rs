//! `let x = value` → `const x = value;`
//!
//! A binding is recognized at a statement start (line start, after `;`,
//! `{`, `}` or `export`). The statement runs to the first depth-0 `;`, an
//! unmatched closer, or a line break that does not continue the
//! expression; a `;` is added after its last code token when the statement
//! is not already terminated by one.

use zs_lexer::{tokenize, Token};

use crate::error::{Result, SyntaxError};
use crate::rewrite::{
    apply_edits, at_statement_start, follows_dot, matching_close, next_sig, prev_sig, statement_end,
    Edit,
};

pub(crate) const NAME: &str = "let";

pub fn rewrite_let_bindings(source: &str) -> Result<String> {
    Ok(apply_edits(source, collect_edits(source)?))
}

/// Edits against `source` that perform this rewrite.
pub(crate) fn collect_edits(source: &str) -> Result<Vec<Edit>> {
    let toks = tokenize(source)?;
    let mut edits = Vec::new();

    for i in 0..toks.len() {
        if !toks[i].is_ident("let") || follows_dot(&toks, i) || !at_statement_start(&toks, i) {
            continue;
        }
        let Some(eq) = initializer_eq(&toks, i) else {
            continue;
        };

        let end = statement_end(&toks, eq + 1, toks.len());
        let Some(last) = prev_sig(&toks, end).filter(|&l| l > eq) else {
            return Err(SyntaxError::new(
                NAME,
                source,
                toks[eq].span.start,
                "missing initializer after `=`",
            )
            .into());
        };

        edits.push(Edit::replace(toks[i].span, "const"));
        let terminated = toks.get(end).is_some_and(|t| t.is_punct(";"));
        if !terminated {
            edits.push(Edit::insert(toks[last].span.end, ";"));
        }
    }

    Ok(edits)
}

/// The `=` of `let <target>[: Type] =`, if the binding has an initializer.
fn initializer_eq(toks: &[Token], kw: usize) -> Option<usize> {
    let target = next_sig(toks, kw)?;
    let target_end = if toks[target].is_punct("{") || toks[target].is_punct("[") {
        matching_close(toks, target)?
    } else if toks[target].is_plain_ident() {
        target
    } else {
        return None;
    };

    let after = next_sig(toks, target_end)?;
    if toks[after].is_punct("=") {
        return Some(after);
    }
    if !toks[after].is_punct(":") {
        return None;
    }
    // Skip the annotation up to a depth-0 `=` on the same statement.
    let end = statement_end(toks, after + 1, toks.len());
    let mut j = after + 1;
    while j < end {
        let tok = &toks[j];
        if tok.is_opener() {
            j = matching_close(toks, j)?;
        } else if tok.is_punct("=") {
            return Some(j);
        }
        j += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranspileError;

    #[test]
    fn binding_becomes_const() {
        assert_eq!(
            rewrite_let_bindings("let message = \"Hello World\"").unwrap(),
            "const message = \"Hello World\";"
        );
    }

    #[test]
    fn existing_semicolon_kept() {
        assert_eq!(
            rewrite_let_bindings("let a = 1; let b = 2").unwrap(),
            "const a = 1; const b = 2;"
        );
    }

    #[test]
    fn semicolon_goes_before_trailing_comment() {
        assert_eq!(
            rewrite_let_bindings("let x = 1 // one\nlet y = x").unwrap(),
            "const x = 1; // one\nconst y = x;"
        );
    }

    #[test]
    fn multiline_initializer() {
        let src = "let total = a +\n  b\nlog(total)";
        assert_eq!(
            rewrite_let_bindings(src).unwrap(),
            "const total = a +\n  b;\nlog(total)"
        );
        let src = "let user = {\n  name: \"x\",\n}\n";
        assert_eq!(
            rewrite_let_bindings(src).unwrap(),
            "const user = {\n  name: \"x\",\n};\n"
        );
    }

    #[test]
    fn annotated_and_destructured() {
        assert_eq!(
            rewrite_let_bindings("let m: Map<string, number> = new Map()").unwrap(),
            "const m: Map<string, number> = new Map();"
        );
        assert_eq!(
            rewrite_let_bindings("let { a, b } = obj\nlet [x] = xs").unwrap(),
            "const { a, b } = obj;\nconst [x] = xs;"
        );
    }

    #[test]
    fn nested_scopes_rewrite_each_binding_once() {
        let src = "let f = () => {\n  let y = 2\n  y\n}";
        assert_eq!(
            rewrite_let_bindings(src).unwrap(),
            "const f = () => {\n  const y = 2;\n  y\n};"
        );
    }

    #[test]
    fn declarations_without_initializer_untouched() {
        let src = "let x;\nlet y: number\nfor (let i = 0; i < n; i++) {}";
        assert_eq!(rewrite_let_bindings(src).unwrap(), src);
    }

    #[test]
    fn opaque_spans_untouched() {
        let src = "const s = \"let x = 1\"; // let y = 2";
        assert_eq!(rewrite_let_bindings(src).unwrap(), src);
    }

    #[test]
    fn missing_initializer_is_an_error() {
        let err = rewrite_let_bindings("let x =").unwrap_err();
        assert!(matches!(err, TranspileError::Syntax(ref e) if e.stage == "let"));
        assert_eq!(err.position().column, 7);
    }
}
