//! `impl` blocks.
//!
//! - `impl Show for User { show() { … } }` becomes an object of functions
//!   taking the value first: `const UserShow = { show: (obj: User) => { … } };`
//! - `impl<T> Stack { push(x: T) { … } }` becomes a class:
//!   `class StackImpl<T> { push(x: T) { … } }`
//!
//! Method bodies, parameter lists and return types are kept as written.

use zs_ast::Span;
use zs_lexer::{tokenize, Token, TokenKind};

use crate::error::{Result, SyntaxError, TranspileError};
use crate::rewrite::{
    apply_edits, at_statement_start, follows_dot, matching_angle, matching_close, next_sig,
    prev_sig, sig_from, slice, Edit,
};

pub(crate) const NAME: &str = "impl";

/// Name of the receiver parameter added to trait implementation methods.
pub const RECEIVER: &str = "obj";

pub fn rewrite_impls(source: &str) -> Result<String> {
    Ok(apply_edits(source, collect_edits(source)?))
}

/// Edits against `source` that perform this rewrite.
pub(crate) fn collect_edits(source: &str) -> Result<Vec<Edit>> {
    let toks = tokenize(source)?;
    let mut edits = Vec::new();

    for i in 0..toks.len() {
        if !toks[i].is_ident("impl") || follows_dot(&toks, i) || !at_statement_start(&toks, i) {
            continue;
        }
        let Some(header) = header(&toks, i) else {
            continue;
        };
        let error = |at: usize, message: &str| -> TranspileError {
            SyntaxError::new(NAME, source, toks[at].span.start, message).into()
        };
        let Some(close) = matching_close(&toks, header.open) else {
            return Err(error(i, "unterminated `impl` block"));
        };

        let type_name = toks[header.type_name].text;
        let Some(trait_name) = header.trait_name else {
            let generics = match header.generics {
                Some(lt) => match matching_angle(&toks, lt) {
                    Some(gt) => slice(source, &toks, lt, gt + 1),
                    None => "",
                },
                None => "",
            };
            let head = Span::new(toks[i].span.start, toks[header.type_name].span.end);
            edits.push(Edit::replace(head, format!("class {type_name}Impl{generics}")));
            continue;
        };

        if let Some(lt) = header.generics {
            return Err(error(lt, "generic parameters are not supported on `impl … for`"));
        }
        let head = Span::new(toks[i].span.start, toks[header.open].span.end);
        let trait_name = toks[trait_name].text;
        edits.push(Edit::replace(head, format!("const {type_name}{trait_name} = {{")));

        let methods = methods(&toks, header.open, close)
            .map_err(|at| error(at, "expected method declaration in `impl` block"))?;
        for (k, method) in methods.iter().enumerate() {
            let separator = if method.has_params { ", " } else { "" };
            edits.push(Edit::replace(
                toks[method.open_paren].span,
                format!(": ({RECEIVER}: {type_name}{separator}"),
            ));
            edits.push(Edit::insert(toks[method.body].span.start, "=> "));
            if k + 1 < methods.len() {
                edits.push(Edit::insert(toks[method.body_close].span.end, ","));
            }
        }
        if !next_sig(&toks, close).is_some_and(|n| toks[n].is_punct(";")) {
            edits.push(Edit::insert(toks[close].span.end, ";"));
        }
    }

    Ok(edits)
}

struct Header {
    generics: Option<usize>,
    trait_name: Option<usize>,
    type_name: usize,
    open: usize,
}

/// `impl [<G>] Name [for Type] {` starting at `kw`.
fn header(toks: &[Token], kw: usize) -> Option<Header> {
    let mut cur = next_sig(toks, kw)?;
    let mut generics = None;
    if toks[cur].is_punct("<") {
        generics = Some(cur);
        cur = next_sig(toks, matching_angle(toks, cur)?)?;
    }
    if !toks[cur].is_plain_ident() {
        return None;
    }
    let first = cur;
    cur = next_sig(toks, cur)?;

    let (trait_name, type_name) = if toks[cur].is_ident("for") {
        let ty = next_sig(toks, cur).filter(|&t| toks[t].is_plain_ident())?;
        cur = next_sig(toks, ty)?;
        (Some(first), ty)
    } else {
        (None, first)
    };
    toks[cur].is_punct("{").then_some(Header {
        generics,
        trait_name,
        type_name,
        open: cur,
    })
}

struct Method {
    open_paren: usize,
    has_params: bool,
    body: usize,
    body_close: usize,
}

/// Methods of the block `open..close`. `Err` carries the index of the
/// first token that does not start a method.
fn methods(toks: &[Token], open: usize, close: usize) -> std::result::Result<Vec<Method>, usize> {
    let mut out = Vec::new();
    let mut i = open + 1;
    while let Some(name) = sig_from(toks, i).filter(|&n| n < close) {
        if toks[name].is_punct(";") || toks[name].is_punct(",") {
            i = name + 1;
            continue;
        }
        let method = method(toks, name).ok_or(name)?;
        i = method.body_close + 1;
        out.push(method);
    }
    Ok(out)
}

/// `name(params)[: Type] { … }` at `name`.
fn method(toks: &[Token], name: usize) -> Option<Method> {
    if toks[name].kind != TokenKind::Ident {
        return None;
    }
    let open_paren = next_sig(toks, name).filter(|&p| toks[p].is_punct("("))?;
    let close_paren = matching_close(toks, open_paren)?;
    let has_params = next_sig(toks, open_paren).is_some_and(|n| n != close_paren);

    // Return type: everything up to the first depth-0 `{` that does not
    // continue the type.
    let mut cur = next_sig(toks, close_paren)?;
    if toks[cur].is_punct(":") {
        cur = next_sig(toks, cur)?;
        let mut first = true;
        loop {
            let tok = &toks[cur];
            if tok.is_punct("{") && !first && !continues_type(toks, cur) {
                break;
            }
            let end = if tok.is_punct("<") {
                matching_angle(toks, cur)?
            } else if tok.is_opener() {
                matching_close(toks, cur)?
            } else {
                cur
            };
            first = false;
            cur = next_sig(toks, end)?;
        }
    }
    if !toks[cur].is_punct("{") {
        return None;
    }
    Some(Method {
        open_paren,
        has_params,
        body: cur,
        body_close: matching_close(toks, cur)?,
    })
}

fn continues_type(toks: &[Token], brace: usize) -> bool {
    prev_sig(toks, brace)
        .is_some_and(|p| ["|", "&", "=>", ",", ":", "<"].iter().any(|op| toks[p].is_punct(op)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imp(src: &str) -> String {
        rewrite_impls(src).unwrap()
    }

    #[test]
    fn trait_impl_becomes_function_object() {
        let src = "impl Show for User {\n  show(): string {\n    this.name\n  }\n  greet(prefix: string) {\n    prefix + obj.name\n  }\n}";
        assert_eq!(
            imp(src),
            "const UserShow = {\n  show: (obj: User): string => {\n    this.name\n  },\n  greet: (obj: User, prefix: string) => {\n    prefix + obj.name\n  }\n};"
        );
    }

    #[test]
    fn inherent_impl_becomes_class() {
        assert_eq!(
            imp("impl Point {\n  norm() { 1 }\n}"),
            "class PointImpl {\n  norm() { 1 }\n}"
        );
        assert_eq!(
            imp("impl<T> Stack {\n  peek(): T { this.items[0] }\n}"),
            "class StackImpl<T> {\n  peek(): T { this.items[0] }\n}"
        );
    }

    #[test]
    fn existing_semicolon_kept() {
        assert_eq!(
            imp("impl Eq for P { eq(o: P) { true } };"),
            "const PEq = { eq: (obj: P, o: P) => { true } };"
        );
    }

    #[test]
    fn identifier_named_impl_untouched() {
        let src = "const impl = make();\nimpl.run()\nimpl(x)";
        assert_eq!(imp(src), src);
    }

    #[test]
    fn non_method_member_is_an_error() {
        let err = rewrite_impls("impl Show for User {\n  name: string\n}").unwrap_err();
        assert!(matches!(err, TranspileError::Syntax(ref e) if e.stage == "impl"));
        assert_eq!(err.position().to_string(), "2:3");
    }

    #[test]
    fn unterminated_block_is_an_error() {
        assert!(rewrite_impls("impl Show for User {\n  show() { 1 }").is_err());
    }
}
