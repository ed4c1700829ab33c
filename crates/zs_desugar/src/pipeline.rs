//! Pipe chains: `value |> f |> g` → nested calls, applied left to right.
//!
//! Each segment picks its call form from its own text:
//! - a bare name is called as a method: `(acc).trim()`
//! - a bare call keeps its arguments: `(acc).map(f)`
//! - a member path or a parenthesized expression receives the value as
//!   its argument: `console.log(acc)`, `(x => x + 1)(acc)`
//!
//! A chain never crosses a statement boundary. Chains nested inside
//! brackets of another chain are rendered first and spliced into the
//! outer segment text.

use tracing::trace;
use zs_ast::{keywords, Application, PipeSegment, Span};
use zs_lexer::{tokenize, Token, TokenKind};

use crate::error::{Result, SyntaxError, TranspileError};
use crate::rewrite::{
    apply_edits, arm_pattern_at, continues, is_atom_start, line_indent, matching_close,
    matching_open, Edit,
};

pub(crate) const NAME: &str = "pipe";

/// One chain: tokens `start..end`, split at the depth-0 pipes.
#[derive(Debug)]
struct Chain {
    start: usize,
    end: usize,
    pipes: Vec<usize>,
}

pub fn rewrite_pipes(source: &str) -> Result<String> {
    Ok(apply_edits(source, collect_edits(source)?))
}

/// Edits against `source` that perform this rewrite.
pub(crate) fn collect_edits(source: &str) -> Result<Vec<Edit>> {
    let toks = tokenize(source)?;
    if !toks.iter().any(|t| t.is_punct("|>")) {
        return Ok(Vec::new());
    }

    let mut chains: Vec<Chain> = Vec::new();
    let mut claimed = vec![false; toks.len()];
    for p in 0..toks.len() {
        if !toks[p].is_punct("|>") || claimed[p] {
            continue;
        }
        let start = chain_start(&toks, p);
        let chain = chain_from(&toks, start);
        for &q in &chain.pipes {
            claimed[q] = true;
        }
        if chain.pipes.contains(&p) {
            chains.push(chain);
        } else {
            claimed[p] = true;
        }
    }
    chains.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    trace!(chains = chains.len(), "pipe chains found");

    let renderer = Renderer {
        source,
        toks: &toks,
        chains: &chains,
    };
    let mut edits = Vec::new();
    let mut covered = 0;
    for chain in &chains {
        if chain.start < covered {
            continue;
        }
        let span = Span::new(toks[chain.start].span.start, toks[chain.end - 1].span.end);
        edits.push(Edit::replace(span, renderer.chain(chain)?));
        covered = chain.end;
    }

    Ok(edits)
}

/// Tokens that end a chain in either direction.
fn is_boundary(toks: &[Token], i: usize) -> bool {
    let tok = &toks[i];
    match tok.kind {
        TokenKind::Punct => match tok.text {
            ";" | "," | "=" | "=>" | "?" | "&&" | "||" | "??" | "+=" | "-=" | "*=" | "/="
            | "%=" | "**=" | "&&=" | "||=" | "??=" | "&=" | "|=" | "^=" => true,
            ":" => !is_atom_start(toks, i),
            _ => false,
        },
        TokenKind::Ident => keywords::is_chain_boundary(tok.text),
        _ => false,
    }
}

/// First token of the value feeding the pipe at `pipe`.
fn chain_start(toks: &[Token], pipe: usize) -> usize {
    let mut start = pipe;
    let mut i = pipe;
    while let Some(j) = i.checked_sub(1) {
        let tok = &toks[j];
        if tok.is_newline() && !continues(toks, j) {
            break;
        }
        if tok.is_significant() {
            if tok.is_closer() {
                let Some(open) = matching_open(toks, j) else {
                    break;
                };
                start = open;
                i = open;
                continue;
            }
            if tok.is_opener() || is_boundary(toks, j) {
                break;
            }
            start = j;
        }
        i = j;
    }
    start
}

/// Scan forward from `start`, collecting depth-0 pipes until a boundary.
fn chain_from(toks: &[Token], start: usize) -> Chain {
    let mut pipes = Vec::new();
    let mut last = None;
    let mut i = start;
    while i < toks.len() {
        let tok = &toks[i];
        if tok.is_punct("{") && pipes.last().is_some_and(|&p| last.is_some_and(|l| l > p)) {
            // `if x |> ok {`: the block belongs to the statement.
            break;
        }
        if tok.is_opener() {
            let Some(close) = matching_close(toks, i) else {
                break;
            };
            last = Some(close);
            i = close + 1;
            continue;
        }
        if tok.is_newline() && !continues(toks, i) {
            break;
        }
        if tok.is_significant() {
            if tok.is_punct("|>") {
                pipes.push(i);
            } else if tok.is_closer() || is_boundary(toks, i) {
                break;
            } else if last.is_some() && arm_pattern_at(toks, i).is_some() {
                // `… |> f _ => …` inside a one-line match body.
                break;
            }
            last = Some(i);
        }
        i += 1;
    }
    Chain {
        start,
        end: last.map_or(start, |l| l + 1),
        pipes,
    }
}

struct Renderer<'a, 's> {
    source: &'s str,
    toks: &'a [Token<'s>],
    chains: &'a [Chain],
}

impl<'s> Renderer<'_, 's> {
    /// Text of tokens `from..to` with every chain inside it rewritten.
    fn range(&self, from: usize, to: usize) -> Result<String> {
        if from >= to {
            return Ok(String::new());
        }
        let mut out = String::new();
        let mut cursor = self.toks[from].span.start;
        let mut covered = from;
        for chain in self.chains {
            if chain.start < covered || chain.start < from || chain.end > to {
                continue;
            }
            out.push_str(&self.source[cursor..self.toks[chain.start].span.start]);
            out.push_str(&self.chain(chain)?);
            cursor = self.toks[chain.end - 1].span.end;
            covered = chain.end;
        }
        out.push_str(&self.source[cursor..self.toks[to - 1].span.end]);
        Ok(out)
    }

    fn chain(&self, chain: &Chain) -> Result<String> {
        let toks = self.toks;
        let mut comments = Vec::new();

        let first_pipe = chain.pipes[0];
        let value = self.part(chain.start, first_pipe, &mut comments);
        let Some((v_from, v_to)) = value else {
            return Err(self.error(first_pipe, "missing value before `|>`"));
        };
        let mut acc = self.range(v_from, v_to)?;

        for (k, &pipe) in chain.pipes.iter().enumerate() {
            let seg_end = chain.pipes.get(k + 1).copied().unwrap_or(chain.end);
            let Some((s_from, s_to)) = self.part(pipe + 1, seg_end, &mut comments) else {
                return Err(self.error(pipe, "missing function after `|>`"));
            };
            let segment = PipeSegment::new(self.range(s_from, s_to)?, classify(toks, s_from, s_to));
            acc = segment.apply(&acc);
        }

        if comments.is_empty() {
            return Ok(acc);
        }
        let indent = line_indent(self.source, toks[chain.start].span.start);
        let mut out = String::new();
        for comment in comments {
            out.push_str(comment.text);
            if comment.kind == TokenKind::LineComment {
                out.push('\n');
                out.push_str(indent);
            } else {
                out.push(' ');
            }
        }
        out.push_str(&acc);
        Ok(out)
    }

    /// Significant extent of tokens `from..to`. Comments outside that
    /// extent are moved to `comments`.
    fn part(
        &self,
        from: usize,
        to: usize,
        comments: &mut Vec<Token<'s>>,
    ) -> Option<(usize, usize)> {
        let toks = self.toks;
        let Some(first) = (from..to).find(|&i| toks[i].is_significant()) else {
            comments.extend(toks[from..to].iter().filter(|t| t.is_comment()));
            return None;
        };
        let last = (from..to).rev().find(|&i| toks[i].is_significant())?;
        comments.extend(toks[from..first].iter().filter(|t| t.is_comment()));
        comments.extend(toks[last + 1..to].iter().filter(|t| t.is_comment()));
        Some((first, last + 1))
    }

    fn error(&self, at: usize, message: &str) -> TranspileError {
        SyntaxError::new(NAME, self.source, self.toks[at].span.start, message).into()
    }
}

/// Call form for the segment occupying tokens `from..to`.
fn classify(toks: &[Token], from: usize, to: usize) -> Application {
    if toks[from].is_punct("(") && matching_close(toks, from) == Some(to - 1) {
        return Application::Function;
    }
    let mut i = from;
    while i < to {
        let tok = &toks[i];
        if tok.is_opener() {
            match matching_close(toks, i) {
                Some(close) => i = close,
                None => break,
            }
        } else if tok.is_punct(".") || tok.is_punct("?.") {
            return Application::Function;
        }
        i += 1;
    }
    let last = &toks[to - 1];
    if last.is_punct(")") && matching_open(toks, to - 1).is_some_and(|open| open > from) {
        Application::MethodWithArgs
    } else {
        Application::Method
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipe(src: &str) -> String {
        rewrite_pipes(src).unwrap()
    }

    #[test]
    fn mixed_method_and_function_forms() {
        assert_eq!(
            pipe("\"  hello  \" |> trim |> toUpperCase |> console.log"),
            "console.log(((\"  hello  \").trim()).toUpperCase())"
        );
        assert_eq!(pipe("\"x\" |> trim |> console.log"), "console.log((\"x\").trim())");
    }

    #[test]
    fn chain_stops_at_statement_boundaries() {
        assert_eq!(pipe("const y = x |> f; z"), "const y = (x).f(); z");
        assert_eq!(pipe("a |> f\nb |> g"), "(a).f()\n(b).g()");
        assert_eq!(pipe("return x |> f"), "return (x).f()");
    }

    #[test]
    fn method_call_keeps_arguments() {
        assert_eq!(
            pipe("xs |> filter(isEven) |> map(double)"),
            "((xs).filter(isEven)).map(double)"
        );
    }

    #[test]
    fn parenthesized_segment_is_called() {
        assert_eq!(pipe("5 |> (n => n * 2)"), "(n => n * 2)(5)");
    }

    #[test]
    fn nested_chain_inside_arguments() {
        assert_eq!(
            pipe("xs |> map(x => x |> double) |> console.log"),
            "console.log((xs).map(x => (x).double()))"
        );
        assert_eq!(pipe("log(a |> f, b)"), "log((a).f(), b)");
    }

    #[test]
    fn multiline_chain_with_comments() {
        let src = "  data\n    |> parse // decode\n    |> validate";
        assert_eq!(pipe(src), "  // decode\n  ((data).parse()).validate()");
    }

    #[test]
    fn opaque_spans_untouched() {
        let src = "const s = \"a |> b\"; /* x |> y */ const t = `${1} |> f`";
        assert_eq!(pipe(src), src);
    }

    #[test]
    fn dangling_pipe_is_an_error() {
        let err = rewrite_pipes("\"x\" |>").unwrap_err();
        match err {
            TranspileError::Syntax(e) => {
                assert_eq!(e.stage, "pipe");
                assert_eq!(e.position.offset, 4);
                assert_eq!(e.position.to_string(), "1:5");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_value_is_an_error() {
        assert!(rewrite_pipes("const a = |> f").is_err());
    }

    #[test]
    fn chain_ends_before_next_match_arm() {
        assert_eq!(
            pipe("match r { :ok => v |> f _ => 0 }"),
            "match r { :ok => (v).f() _ => 0 }"
        );
    }

    #[test]
    fn condition_chain_stops_at_the_block() {
        assert_eq!(
            pipe("if x |> isValid {\n  go()\n}"),
            "if (x).isValid() {\n  go()\n}"
        );
        assert_eq!(
            pipe("while queue |> isEmpty {\n  drain()\n}"),
            "while (queue).isEmpty() {\n  drain()\n}"
        );
        assert_eq!(
            pipe("} else if xs |> filter(ok) |> some(bad) {"),
            "} else if ((xs).filter(ok)).some(bad) {"
        );
    }

    #[test]
    fn braced_value_still_feeds_a_chain() {
        assert_eq!(pipe("const n = { a: 1 } |> keys"), "const n = ({ a: 1 }).keys()");
    }
}
