//! `match` expressions become immediately invoked arrow functions.
//!
//! ```text
//! match status {            (() => {
//!   :ok => "Success"          const __match_value = status;
//!   _ => "Unknown"            if (__match_value === Symbol.for("ok")) {
//! }                             return "Success";
//!                             } else {
//!                               return "Unknown";
//!                             }
//!                           })()
//! ```
//!
//! Arms are tested in source order and the first match wins. A wildcard
//! ends the chain; arms after it can never run and are dropped with a
//! warning. Matches nested in an action are rewritten in the same pass,
//! so no `:tag` pattern is left behind for the atom stage.

use tracing::warn;
use zs_ast::{MatchArm, Pattern, Span};
use zs_lexer::{tokenize, Token, TokenKind};

use crate::error::{Result, SyntaxError, TranspileError};
use crate::rewrite::{
    apply_edits, arm_pattern_at, continues, follows_dot, is_atom_start, line_indent, matching_close,
    next_sig, prev_sig, sig_from, Edit,
};

pub(crate) const NAME: &str = "match";

/// Name of the temporary holding the scrutinee.
pub const MATCH_VALUE: &str = "__match_value";

const NESTED_INDENT: &str = "    ";

pub fn rewrite_matches(source: &str) -> Result<String> {
    Ok(apply_edits(source, collect_edits(source)?))
}

/// Edits against `source` that perform this rewrite.
pub(crate) fn collect_edits(source: &str) -> Result<Vec<Edit>> {
    let toks = tokenize(source)?;
    let rewriter = MatchRewriter {
        source,
        toks: &toks,
    };

    let mut edits = Vec::new();
    let mut i = 0;
    while i < toks.len() {
        match rewriter.header(i)? {
            Some(header) => {
                let base = line_indent(source, toks[i].span.start);
                let text = rewriter.render(&header, base)?;
                let span = Span::new(toks[i].span.start, toks[header.close].span.end);
                edits.push(Edit::replace(span, text));
                i = header.close + 1;
            }
            None => i += 1,
        }
    }

    Ok(edits)
}

/// A recognized `match <scrutinee> { … }`.
struct Header {
    scrutinee: (usize, usize),
    open: usize,
    close: usize,
}

struct MatchRewriter<'a, 's> {
    source: &'s str,
    toks: &'a [Token<'s>],
}

impl<'s> MatchRewriter<'_, 's> {
    fn error(&self, at: usize, message: impl Into<String>) -> TranspileError {
        SyntaxError::new(NAME, self.source, self.toks[at].span.start, message).into()
    }

    fn text(&self, from: usize, to: usize) -> &'s str {
        &self.source[self.toks[from].span.start..self.toks[to - 1].span.end]
    }

    /// Recognize a `match` header at `kw`. `Ok(None)` means the token is
    /// some other use of the word.
    fn header(&self, kw: usize) -> Result<Option<Header>> {
        let toks = self.toks;
        if !toks[kw].is_ident("match") || follows_dot(toks, kw) {
            return Ok(None);
        }
        if prev_sig(toks, kw).is_some_and(|p| toks[p].is_ident("function")) {
            return Ok(None);
        }
        let Some(first) = next_sig(toks, kw) else {
            return Ok(None);
        };
        let starts_value = match toks[first].kind {
            TokenKind::Ident => toks[first].is_plain_ident() || toks[first].ends_operand(),
            TokenKind::Number | TokenKind::Str | TokenKind::Template => true,
            TokenKind::Punct => toks[first].is_punct("(") || toks[first].is_punct("["),
            _ => false,
        };
        if !starts_value {
            return Ok(None);
        }

        let mut last = first;
        let mut i = first;
        let open = loop {
            let Some(tok) = toks.get(i) else {
                return Ok(None);
            };
            if tok.is_punct("{") && i > first {
                break i;
            }
            if tok.is_opener() {
                match matching_close(toks, i) {
                    Some(close) => {
                        last = close;
                        i = close + 1;
                        continue;
                    }
                    None => return Ok(None),
                }
            }
            if tok.is_newline()
                || tok.is_closer()
                || ["=", "=>", ";", ",", "|>"].iter().any(|p| tok.is_punct(p))
            {
                return Ok(None);
            }
            if tok.is_significant() {
                last = i;
            }
            i += 1;
        };

        let Some(close) = matching_close(toks, open) else {
            return Err(self.error(kw, "unterminated `match` block"));
        };
        Ok(Some(Header {
            scrutinee: (first, last + 1),
            open,
            close,
        }))
    }

    /// Split the body into arms.
    fn arms(&self, header: &Header, base: &str) -> Result<(Vec<MatchArm>, Vec<String>)> {
        let toks = self.toks;
        let mut arms = Vec::new();
        let mut comments = Vec::new();
        let mut i = header.open + 1;

        loop {
            // separators and comments
            while i < header.close {
                let tok = &toks[i];
                if tok.is_comment() {
                    comments.push(tok.text.to_string());
                } else if tok.is_significant() && !tok.is_punct(";") && !tok.is_punct(",") {
                    break;
                }
                i += 1;
            }
            if i >= header.close {
                break;
            }

            let pattern = if toks[i].is_ident("_") {
                Pattern::Wildcard
            } else if toks[i].is_punct(":")
                && toks.get(i + 1).is_some_and(|t| t.kind == TokenKind::Ident)
            {
                Pattern::Tag(toks[i + 1].text.to_string())
            } else {
                return Err(self.error(
                    i,
                    format!("expected `_` or `:tag` pattern, found `{}`", toks[i].text),
                ));
            };
            let Some(arrow) = arm_pattern_at(toks, i) else {
                return Err(self.error(i, format!("expected `=>` after pattern `{pattern}`")));
            };
            let pattern_span = Span::new(toks[i].span.start, toks[arrow].span.start);

            let (from, to, next) = self.action(arrow, header.close);
            if from >= to {
                return Err(self.error(arrow, format!("missing action for pattern `{pattern}`")));
            }
            let nested = format!("{base}{NESTED_INDENT}");
            arms.push(MatchArm {
                pattern,
                action: self.render_range(from, to, &nested)?,
                span: pattern_span,
                comments: std::mem::take(&mut comments),
            });
            i = next;
        }

        Ok((arms, comments))
    }

    /// Extent of the action after `arrow`: `(first, end, resume)`.
    fn action(&self, arrow: usize, close: usize) -> (usize, usize, usize) {
        let toks = self.toks;
        let Some(first) = sig_from(toks, arrow + 1).filter(|&f| f < close) else {
            return (arrow + 1, arrow + 1, close);
        };
        let mut last = first;
        let mut ternaries = 0usize;
        let mut i = first;
        while i < close {
            let tok = &toks[i];
            if tok.is_opener() {
                let Some(end) = matching_close(toks, i).filter(|&e| e < close) else {
                    break;
                };
                last = end;
                i = end + 1;
                continue;
            }
            if tok.is_punct(";") || tok.is_punct(",") {
                break;
            }
            if tok.is_punct("?") {
                ternaries += 1;
            } else if tok.is_punct(":") && !is_atom_start(toks, i) {
                if ternaries > 0 {
                    ternaries -= 1;
                } else if i > first && toks.get(i + 1).is_some_and(|t| t.kind == TokenKind::Ident) {
                    // `1 :b`: a tag after a complete operand starts the next arm
                    break;
                }
            }
            if tok.is_newline() && !continues(toks, i) {
                break;
            }
            if tok.is_significant() {
                if i > first && arm_pattern_at(toks, i).is_some() {
                    break;
                }
                last = i;
            }
            i += 1;
        }
        (first, last + 1, last + 1)
    }

    /// Text of tokens `from..to` with every `match` inside it rewritten at
    /// indentation `base`.
    fn render_range(&self, from: usize, to: usize, base: &str) -> Result<String> {
        let mut out = String::new();
        let mut cursor = from;
        let mut i = from;
        while i < to {
            if let Some(header) = self.header(i)?.filter(|h| h.close < to) {
                if cursor < i {
                    out.push_str(&self.source[self.toks[cursor].span.start..self.toks[i].span.start]);
                }
                out.push_str(&self.render(&header, base)?);
                cursor = header.close + 1;
                i = header.close + 1;
            } else {
                i += 1;
            }
        }
        if cursor < to {
            out.push_str(self.text(cursor, to));
        }
        Ok(out)
    }

    fn render(&self, header: &Header, base: &str) -> Result<String> {
        let (s_from, s_to) = header.scrutinee;
        let scrutinee = self.text(s_from, s_to);
        let (arms, trailing) = self.arms(header, base)?;

        let mut out = format!("(() => {{\n{base}  const {MATCH_VALUE} = {scrutinee};\n");
        let mut opened = false;
        let mut arms = arms.into_iter();
        for arm in arms.by_ref() {
            match arm.pattern.condition(MATCH_VALUE) {
                Some(cond) => {
                    if opened {
                        out.push_str(&format!("{base}  }} else if ({cond}) {{\n"));
                    } else {
                        out.push_str(&format!("{base}  if ({cond}) {{\n"));
                    }
                    opened = true;
                    push_arm(&mut out, &arm, &format!("{base}    "));
                }
                None => {
                    if opened {
                        out.push_str(&format!("{base}  }} else {{\n"));
                        push_arm(&mut out, &arm, &format!("{base}    "));
                    } else {
                        push_arm(&mut out, &arm, &format!("{base}  "));
                    }
                    break;
                }
            }
        }
        for dropped in arms {
            warn!(pattern = %dropped.pattern, "unreachable match arm after wildcard");
        }
        if opened {
            out.push_str(&format!("{base}  }}\n"));
        }
        for comment in trailing {
            out.push_str(&format!("{base}  {comment}\n"));
        }
        out.push_str(&format!("{base}}})()"));
        Ok(out)
    }
}

fn push_arm(out: &mut String, arm: &MatchArm, indent: &str) {
    for comment in &arm.comments {
        out.push_str(&format!("{indent}{comment}\n"));
    }
    out.push_str(&format!("{indent}return {};\n", arm.action));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_match_with_wildcard() {
        let out =
            rewrite_matches("match status { :ok => \"Success\" :error => \"Failed\" _ => \"Unknown\" }")
                .unwrap();
        assert_eq!(
            out,
            "(() => {\n  const __match_value = status;\n  if (__match_value === Symbol.for(\"ok\")) {\n    return \"Success\";\n  } else if (__match_value === Symbol.for(\"error\")) {\n    return \"Failed\";\n  } else {\n    return \"Unknown\";\n  }\n})()"
        );
    }

    #[test]
    fn indentation_follows_the_match_line() {
        let src = "  const r = match v {\n    :a => 1\n  }";
        let out = rewrite_matches(src).unwrap();
        assert_eq!(
            out,
            "  const r = (() => {\n    const __match_value = v;\n    if (__match_value === Symbol.for(\"a\")) {\n      return 1;\n    }\n  })()"
        );
    }

    #[test]
    fn nested_match_in_action() {
        let src = "match a {\n  :x => match b {\n    :y => 1\n    _ => 2\n  }\n  _ => 3\n}";
        let out = rewrite_matches(src).unwrap();
        let expected = "(() => {
  const __match_value = a;
  if (__match_value === Symbol.for(\"x\")) {
    return (() => {
      const __match_value = b;
      if (__match_value === Symbol.for(\"y\")) {
        return 1;
      } else {
        return 2;
      }
    })();
  } else {
    return 3;
  }
})()";
        assert_eq!(out, expected);
        assert!(!out.contains(":y"));
    }

    #[test]
    fn leading_wildcard_returns_directly() {
        let out = rewrite_matches("match v { _ => 0 :a => 1 }").unwrap();
        assert_eq!(
            out,
            "(() => {\n  const __match_value = v;\n  return 0;\n})()"
        );
    }

    #[test]
    fn arm_comments_are_kept() {
        let src = "match v {\n  // success path\n  :ok => 1, /* end */\n}";
        let out = rewrite_matches(src).unwrap();
        assert!(out.contains("    // success path\n    return 1;\n"));
        assert!(out.contains("  /* end */\n})()"));
    }

    #[test]
    fn member_and_string_uses_untouched() {
        let src = "const m = s.match(/x/); const t = \"match v { _ => 1 }\"";
        assert_eq!(rewrite_matches(src).unwrap(), src);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = rewrite_matches("match v {\n  42 => 1\n}").unwrap_err();
        assert_eq!(err.position().to_string(), "2:3");
    }

    #[test]
    fn unterminated_match_is_an_error() {
        let err = rewrite_matches("const r = match v { :a => 1").unwrap_err();
        assert!(matches!(err, TranspileError::Syntax(ref e) if e.stage == "match"));
    }

    #[test]
    fn missing_action_is_an_error() {
        assert!(rewrite_matches("match v { :a => }").is_err());
    }

    #[test]
    fn tag_without_arrow_is_an_error() {
        let err = rewrite_matches("match v { :a => 1 :b }").unwrap_err();
        assert!(err.to_string().contains("expected `=>` after pattern `:b`"));
        assert_eq!(err.position().column, 19);
    }

    #[test]
    fn ternary_actions_keep_their_atoms() {
        let out = rewrite_matches("match v { :a => ok ? :y : :z _ => :n }").unwrap();
        assert!(out.contains("return ok ? :y : :z;"));
        assert!(out.contains("return :n;"));
    }
}
